use crate::booking::Reservation;
use crate::ClientResult;
use async_trait::async_trait;

/// Common contract over the two reservation stores (remote API, local
/// fallback cache). The ledger works against this, so merge and cancel
/// logic never cares which side it is talking to.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// All reservations this store knows about for the signed-in user.
    async fn list(&self) -> ClientResult<Vec<Reservation>>;

    /// Remove one reservation from this store.
    async fn cancel(&self, reservation_id: &str) -> ClientResult<()>;
}
