use std::sync::{Arc, RwLock};
use tablebook_core::session::{Credentials, RegisterProfile, Session, SessionState};
use tablebook_core::{ClientError, ClientResult};
use tablebook_gateway::{ApiClient, LocalStore};

/// Holds the signed-in principal and the only code allowed to change it.
/// Everything else reads the session through [`SessionManager::current`].
pub struct SessionManager {
    api: Arc<ApiClient>,
    local: Arc<LocalStore>,
    state: RwLock<SessionState>,
}

impl SessionManager {
    pub fn new(api: Arc<ApiClient>, local: Arc<LocalStore>) -> Self {
        Self {
            api,
            local,
            state: RwLock::new(SessionState::Loading),
        }
    }

    /// On startup, try to turn a persisted token back into a session. A
    /// rejected token downgrades silently to anonymous: the token is
    /// cleared and the failure only logged, never surfaced.
    pub async fn restore(&self) {
        let Some(token) = self.local.token() else {
            self.set_state(SessionState::Anonymous);
            return;
        };

        self.api.set_token(Some(token.clone()));
        match self.api.profile().await {
            Ok(profile) => {
                self.set_state(SessionState::Authenticated(Session {
                    user_id: profile.id,
                    email: profile.email,
                    full_name: profile.full_name,
                    role: profile.role,
                    token,
                }));
            }
            Err(err) => {
                tracing::warn!("stored token rejected, continuing anonymously: {}", err);
                self.local.clear_token();
                self.api.set_token(None);
                self.set_state(SessionState::Anonymous);
            }
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> ClientResult<Session> {
        let response = self.api.login(credentials).await?;
        let token = non_empty(response.access_token)
            .ok_or_else(|| ClientError::Validation("login response carried no token".to_string()))?;
        self.adopt_token(token).await
    }

    /// Registration logs the new account straight in, exactly like login.
    pub async fn register(&self, profile: &RegisterProfile) -> ClientResult<Session> {
        let response = self.api.register(profile).await?;
        let token = non_empty(response.access_token).ok_or_else(|| {
            ClientError::Validation("registration response carried no token".to_string())
        })?;
        self.adopt_token(token).await
    }

    /// Clears persisted and in-memory state unconditionally; never fails.
    pub fn logout(&self) {
        self.local.clear_token();
        self.api.set_token(None);
        self.set_state(SessionState::Anonymous);
    }

    /// Synchronous read of the current session state.
    pub fn current(&self) -> SessionState {
        match self.state.read() {
            Ok(guard) => guard.clone(),
            Err(_) => SessionState::Anonymous,
        }
    }

    async fn adopt_token(&self, token: String) -> ClientResult<Session> {
        self.api.set_token(Some(token.clone()));
        if let Err(err) = self.local.set_token(&token) {
            // A session that does not survive restart is still a session.
            tracing::warn!("could not persist token: {}", err);
        }

        let profile = self.api.profile().await?;
        let session = Session {
            user_id: profile.id,
            email: profile.email,
            full_name: profile.full_name,
            role: profile.role,
            token,
        };
        self.set_state(SessionState::Authenticated(session.clone()));
        Ok(session)
    }

    fn set_state(&self, next: SessionState) {
        if let Ok(mut guard) = self.state.write() {
            *guard = next;
        }
    }
}

fn non_empty(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.trim().is_empty())
}
