use serde::{Deserialize, Serialize};

/// Roles as the server spells them. The client only uses these to decide
/// which views to offer; authorization itself is enforced server-side.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Role {
    Customer,
    RestaurantManager,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "Customer",
            Role::RestaurantManager => "RestaurantManager",
            Role::Admin => "Admin",
        }
    }
}

/// The signed-in principal plus the bearer token carried on its behalf.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterProfile {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

/// Tri-state session view. `Loading` means the startup token resolution has
/// not settled yet; route guards must defer on it rather than deny.
#[derive(Debug, Clone)]
pub enum SessionState {
    Loading,
    Anonymous,
    Authenticated(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Authenticated(session) => Some(session),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Loading)
    }
}
