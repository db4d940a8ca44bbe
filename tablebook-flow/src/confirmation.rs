use std::sync::Arc;
use tablebook_core::booking::{Provenance, Reservation};
use tablebook_core::calendar::{calendar_event, CalendarEvent};
use tablebook_core::repository::ReservationStore;
use tablebook_core::ClientResult;
use tablebook_gateway::resolve::{resolve_details, DetailSource};
use tablebook_gateway::{ApiClient, LocalStore, RestaurantInfo};

/// Outcome of the best-effort confirmation notifications. Failures here
/// never touch the reservation itself; they only withhold the "sent"
/// indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationDelivery {
    pub email_sent: bool,
    pub sms_logged: bool,
}

/// Everything the confirmation view does after a booking exists: detail
/// lookup, calendar export, notifications, and cancellation.
pub struct ConfirmationService {
    api: Arc<ApiClient>,
    local: Arc<LocalStore>,
}

impl ConfirmationService {
    pub fn new(api: Arc<ApiClient>, local: Arc<LocalStore>) -> Self {
        Self { api, local }
    }

    /// Resolve restaurant details for display. Total failure still yields
    /// something renderable; the view degrades to partial info.
    pub async fn details(&self, reservation: &Reservation) -> (RestaurantInfo, DetailSource) {
        resolve_details(
            &self.api,
            reservation.restaurant_id,
            Some(&reservation.restaurant),
            None,
        )
        .await
    }

    /// Cancel in the store the reservation came from, and only there: a
    /// server-confirmed reservation goes through the cancellation
    /// endpoint, a local-fallback one is removed from the cache. On error
    /// the reservation is left intact for a retry.
    pub async fn cancel(&self, reservation: &Reservation) -> ClientResult<()> {
        match reservation.provenance {
            Provenance::Server => self.api.cancel_reservation(&reservation.id).await,
            Provenance::Local => self.local.cancel(&reservation.id).await,
        }
    }

    /// Build the calendar entry for a reservation. Pure formatting; the
    /// caller opens the returned link.
    pub fn calendar(&self, reservation: &Reservation, details: &RestaurantInfo) -> CalendarEvent {
        calendar_event(
            &details.name,
            details.address.as_deref().unwrap_or(""),
            &reservation.date,
            &reservation.time,
            reservation.people,
        )
    }

    /// Trigger confirmation notifications. Email goes to the server as a
    /// best-effort request; SMS has no backend and is only logged.
    pub async fn send_confirmation(
        &self,
        reservation: &Reservation,
        email: bool,
        sms_number: Option<&str>,
    ) -> ConfirmationDelivery {
        let mut delivery = ConfirmationDelivery {
            email_sent: false,
            sms_logged: false,
        };

        if email {
            match self.api.send_confirmation_email(&reservation.id).await {
                Ok(()) => delivery.email_sent = true,
                Err(err) => {
                    tracing::warn!("confirmation email for {} failed: {}", reservation.id, err);
                }
            }
        }

        if let Some(number) = sms_number {
            tracing::info!("SMS confirmation would be sent to {}", number);
            delivery.sms_logged = true;
        }

        delivery
    }
}
