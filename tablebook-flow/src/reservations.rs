use std::sync::Arc;
use tablebook_core::booking::{Reservation, ReservationStatus};
use tablebook_core::reconcile::merge_reservations;
use tablebook_core::repository::ReservationStore;
use tablebook_core::{ClientError, ClientResult};

/// The merged "my reservations" view over the two stores.
pub struct ReservationLedger {
    remote: Arc<dyn ReservationStore>,
    local: Arc<dyn ReservationStore>,
    entries: Vec<Reservation>,
}

impl ReservationLedger {
    pub fn new(remote: Arc<dyn ReservationStore>, local: Arc<dyn ReservationStore>) -> Self {
        Self {
            remote,
            local,
            entries: Vec::new(),
        }
    }

    /// Rebuild the merged view. A failing server fetch falls back to the
    /// local entries alone rather than an error screen; if the cache is
    /// also empty the result is simply an empty list.
    pub async fn refresh(&mut self) -> &[Reservation] {
        let local = self.local.list().await.unwrap_or_default();
        let server = match self.remote.list().await {
            Ok(list) => list,
            Err(err) => {
                tracing::warn!("server reservations unavailable, showing local only: {}", err);
                Vec::new()
            }
        };

        self.entries = merge_reservations(server, local);
        &self.entries
    }

    pub fn entries(&self) -> &[Reservation] {
        &self.entries
    }

    /// Cancel one entry, routed by the provenance it carries, then drop it
    /// from the in-memory view. A store failure leaves the entry in place.
    pub async fn cancel(&mut self, reservation_id: &str) -> ClientResult<Reservation> {
        let at = self
            .entries
            .iter()
            .position(|r| r.id == reservation_id)
            .ok_or_else(|| {
                ClientError::Validation(format!("unknown reservation: {}", reservation_id))
            })?;

        let store = if self.entries[at].is_local() {
            &self.local
        } else {
            &self.remote
        };
        store.cancel(reservation_id).await?;

        let mut cancelled = self.entries.remove(at);
        cancelled.status = ReservationStatus::Cancelled;
        Ok(cancelled)
    }
}
