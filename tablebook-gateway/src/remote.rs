use crate::api::ApiClient;
use async_trait::async_trait;
use std::sync::Arc;
use tablebook_core::booking::Reservation;
use tablebook_core::repository::ReservationStore;
use tablebook_core::ClientResult;

/// The server-side reservation store, seen through the gateway. The second
/// half of the repository pair next to [`crate::LocalStore`].
pub struct RemoteStore {
    api: Arc<ApiClient>,
}

impl RemoteStore {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ReservationStore for RemoteStore {
    async fn list(&self) -> ClientResult<Vec<Reservation>> {
        self.api.my_reservations().await
    }

    async fn cancel(&self, reservation_id: &str) -> ClientResult<()> {
        self.api.cancel_reservation(reservation_id).await
    }
}
