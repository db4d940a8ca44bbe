pub mod api;
pub mod app_config;
pub mod local;
pub mod remote;
pub mod resolve;

pub use api::{ApiClient, RestaurantInfo};
pub use app_config::Config;
pub use local::LocalStore;
pub use remote::RemoteStore;
