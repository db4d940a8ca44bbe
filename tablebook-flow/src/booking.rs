use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tablebook_core::booking::{Provenance, Reservation, ReservationStatus, SelectedBooking};
use tablebook_core::ClientError;
use tablebook_gateway::api::CreateReservationRequest;
use tablebook_gateway::{ApiClient, LocalStore};

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    /// A confirm is already outstanding; no second request was issued.
    #[error("a booking submission is already in flight")]
    InFlight,

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// The review-and-confirm step of the booking flow.
pub struct BookingFlow {
    api: Arc<ApiClient>,
    local: Arc<LocalStore>,
    in_flight: AtomicBool,
}

impl BookingFlow {
    pub fn new(api: Arc<ApiClient>, local: Arc<LocalStore>) -> Self {
        Self {
            api,
            local,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Submit the selected slot for booking.
    ///
    /// Validation runs before anything else, so a selection that arrived
    /// without its required fields never reaches the network. The in-flight
    /// flag rejects re-entry until the outstanding request settles, success
    /// or failure; two rapid submissions produce exactly one request.
    pub async fn confirm(&self, selected: &SelectedBooking) -> Result<Reservation, BookingError> {
        selected.validate().map_err(BookingError::Client)?;

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(BookingError::InFlight);
        }

        let result = self.submit(selected).await;
        self.in_flight.store(false, Ordering::SeqCst);
        result.map_err(BookingError::Client)
    }

    async fn submit(&self, selected: &SelectedBooking) -> Result<Reservation, ClientError> {
        let (Some(restaurant_id), Some(date), Some(time), Some(table_id)) = (
            selected.restaurant_id,
            selected.date.as_deref(),
            selected.time.as_deref(),
            selected.table_id,
        ) else {
            // validate() already rejected this; kept for the type system.
            return Err(ClientError::Validation(
                "booking selection is missing required fields".to_string(),
            ));
        };

        let request = CreateReservationRequest {
            date: date.to_string(),
            time: time.to_string(),
            number_of_people: selected.people,
            table_id,
        };

        let response = self.api.create_reservation(restaurant_id, &request).await?;

        let reservation = match response.reservation_id {
            Some(id) => Reservation {
                id: id.to_string(),
                restaurant: selected.display_name(),
                restaurant_id: Some(restaurant_id),
                date: date.to_string(),
                time: time.to_string(),
                people: selected.people,
                status: ReservationStatus::Confirmed,
                provenance: Provenance::Server,
            },
            None => {
                // The server confirmed but returned no id; synthesize a
                // clearly-marked placeholder and keep a fallback record so
                // the reservation is not lost to the list view.
                let reservation = Reservation {
                    id: format!("local-{}", Utc::now().timestamp_millis()),
                    restaurant: selected.display_name(),
                    restaurant_id: Some(restaurant_id),
                    date: date.to_string(),
                    time: time.to_string(),
                    people: selected.people,
                    status: ReservationStatus::Confirmed,
                    provenance: Provenance::Local,
                };
                if let Err(err) = self.local.record(&reservation) {
                    tracing::warn!("could not cache fallback reservation: {}", err);
                }
                reservation
            }
        };

        tracing::info!(
            "reservation {} confirmed at restaurant {}",
            reservation.id,
            restaurant_id
        );
        Ok(reservation)
    }
}
