use crate::session::{Role, SessionState};

/// The views the client can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    BookingReview,
    BookingConfirmation,
    MyReservations,
    ManagerDashboard,
    AdminDashboard,
}

impl Route {
    /// Role required to enter, if any. The server enforces authorization on
    /// every call; this only decides what to show.
    fn required_role(&self) -> Option<Role> {
        match self {
            Route::Home | Route::Login | Route::Register => None,
            Route::BookingReview | Route::BookingConfirmation | Route::MyReservations => {
                Some(Role::Customer)
            }
            Route::ManagerDashboard => Some(Role::RestaurantManager),
            Route::AdminDashboard => Some(Role::Admin),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render,
    /// Session resolution has not settled; do not deny access yet.
    Defer,
    RedirectTo(Route),
}

/// Gate a route on the current session. Loading defers, anonymous users go
/// to login, a signed-in user with the wrong role goes home.
pub fn guard(route: Route, session: &SessionState) -> RouteDecision {
    let Some(required) = route.required_role() else {
        return RouteDecision::Render;
    };

    match session {
        SessionState::Loading => RouteDecision::Defer,
        SessionState::Anonymous => RouteDecision::RedirectTo(Route::Login),
        SessionState::Authenticated(session) => {
            if session.role == required {
                RouteDecision::Render
            } else {
                RouteDecision::RedirectTo(Route::Home)
            }
        }
    }
}
