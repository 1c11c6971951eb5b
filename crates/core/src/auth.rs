//! Login and registration
//!
//! Successful calls store the returned token in the session store.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ClientError, FieldMessages, NON_FIELD_ERRORS};
use crate::gateway::{AuthResponse, TaskApi};
use crate::session::SessionStore;
use crate::Result;

pub const INVALID_CREDENTIALS: &str = "User Name or Password is wrong.";

pub struct Authenticator {
    api: Arc<dyn TaskApi>,
    session: Arc<dyn SessionStore>,
}

impl Authenticator {
    pub fn new(api: Arc<dyn TaskApi>, session: Arc<dyn SessionStore>) -> Self {
        Self { api, session }
    }

    /// Log in with a username or email
    pub async fn login(&self, identifier: &str, password: &str) -> Result<AuthResponse> {
        match self.api.login(identifier, password).await {
            Ok(auth) => {
                self.session.set(&auth.token).await?;
                info!("Logged in as {}", auth.username.as_deref().unwrap_or(identifier));
                Ok(auth)
            }
            Err(ClientError::RequestFailed { status, messages }) => {
                warn!("Login rejected ({}): {}", status, messages);
                Err(Self::invalid_credentials(status))
            }
            Err(ClientError::Unauthorized) => {
                warn!("Login rejected (401)");
                Err(Self::invalid_credentials(401))
            }
            Err(e) => Err(e),
        }
    }

    /// Create an account and start a session for it
    ///
    /// When the server hands back no token the new account is logged in with
    /// the same credentials.
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<AuthResponse> {
        let registration = self.api.register(username, email, password).await?;
        info!("Registered {}", username);

        match registration.token {
            Some(token) => {
                self.session.set(&token).await?;
                Ok(AuthResponse {
                    token,
                    user_id: registration.id,
                    username: registration.username.or_else(|| Some(username.to_string())),
                })
            }
            None => {
                debug!("Registration returned no token; logging in as {}", username);
                self.login(username, password).await
            }
        }
    }

    pub async fn is_logged_in(&self) -> Result<bool> {
        Ok(self.session.get().await?.is_some())
    }

    fn invalid_credentials(status: u16) -> ClientError {
        ClientError::RequestFailed {
            status,
            messages: FieldMessages::single(NON_FIELD_ERRORS, INVALID_CREDENTIALS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use crate::testing::{Call, FakeApi, Failure};

    fn setup() -> (Arc<FakeApi>, Arc<MemorySessionStore>, Authenticator) {
        let api = Arc::new(FakeApi::default());
        let session = Arc::new(MemorySessionStore::new());
        let auth = Authenticator::new(api.clone(), session.clone());
        (api, session, auth)
    }

    #[tokio::test]
    async fn test_login_stores_token() {
        let (api, session, auth) = setup();

        let response = auth.login("sara@example.com", "pw").await.unwrap();
        assert_eq!(response.token, "token-sara@example.com");
        assert_eq!(
            session.get().await.unwrap().as_deref(),
            Some("token-sara@example.com")
        );
        assert!(auth.is_logged_in().await.unwrap());
        assert_eq!(api.calls(), vec![Call::Login("sara@example.com".to_string())]);
    }

    #[tokio::test]
    async fn test_rejected_login_has_fixed_message() {
        let (api, session, auth) = setup();
        api.fail(
            "login",
            Failure::Status(400, r#"{"non_field_errors": ["Invalid credentials."]}"#),
        );

        let err = auth.login("sara", "nope").await.unwrap_err();
        assert_eq!(err.user_message(), INVALID_CREDENTIALS);
        assert!(session.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_unauthorized_has_fixed_message() {
        let (api, session, auth) = setup();
        api.fail("login", Failure::Unauthorized);

        let err = auth.login("sara", "nope").await.unwrap_err();
        assert!(!err.redirects_to_login());
        assert_eq!(err.user_message(), INVALID_CREDENTIALS);
        assert!(session.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_login_network_error_passes_through() {
        let (api, _session, auth) = setup();
        api.fail("login", Failure::Network);

        let err = auth.login("sara", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn test_register_stores_token_and_surfaces_field_errors() {
        let (api, session, auth) = setup();

        auth.register("sara", "sara@example.com", "pw").await.unwrap();
        assert_eq!(session.get().await.unwrap().as_deref(), Some("token-sara"));

        session.clear().await.unwrap();
        api.fail(
            "register",
            Failure::Status(
                400,
                r#"{"username": ["A user with that username already exists."]}"#,
            ),
        );
        let err = auth.register("sara", "sara@example.com", "pw").await.unwrap_err();
        assert_eq!(
            err.user_message(),
            "username: A user with that username already exists."
        );
        assert!(session.get().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_without_token_logs_in() {
        let (api, session, auth) = setup();
        api.register_without_token();

        let response = auth.register("sara", "sara@example.com", "pw").await.unwrap();
        assert_eq!(response.token, "token-sara");
        assert_eq!(session.get().await.unwrap().as_deref(), Some("token-sara"));
        assert_eq!(
            api.calls(),
            vec![
                Call::Register("sara".to_string()),
                Call::Login("sara".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_register_without_token_then_failed_login() {
        let (api, session, auth) = setup();
        api.register_without_token();
        api.fail("login", Failure::Status(400, r#"{"non_field_errors": ["Nope."]}"#));

        let err = auth.register("sara", "sara@example.com", "pw").await.unwrap_err();
        assert_eq!(err.user_message(), INVALID_CREDENTIALS);
        assert!(session.get().await.unwrap().is_none());
    }
}
