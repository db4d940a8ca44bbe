pub mod booking;
pub mod confirmation;
pub mod reservations;
pub mod session;

pub use booking::{BookingError, BookingFlow};
pub use confirmation::{ConfirmationDelivery, ConfirmationService};
pub use reservations::ReservationLedger;
pub use session::SessionManager;
