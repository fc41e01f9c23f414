//! crates/bytegurukul_core/src/session.rs
//!
//! The client-side session: holds the signed-in identity, persists it across
//! restarts, and decides where a user lands after signing in.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::Role;
use crate::storage::{load_json, save_json, DurableStorage, StorageError, TOKEN_KEY, USER_KEY};

//=========================================================================================
// Wire Types
//=========================================================================================

/// The public profile of the signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: Role,
}

/// The `data` payload of a successful register or login call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthPayload {
    #[serde(flatten)]
    pub user: SessionUser,
    pub token: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterProfile {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Message shown when the server could not be reached at all.
pub const CONNECTIVITY_MESSAGE: &str =
    "Unable to reach the server. Please check your connection and try again.";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with an error. `message` is the server's text, unchanged.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("{}", CONNECTIVITY_MESSAGE)]
    Network(String),
    #[error("Unexpected response from server: {0}")]
    Decode(String),
    #[error("Not signed in")]
    NotAuthenticated,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// The authentication endpoints of the REST API, as seen by a client.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn register(&self, profile: &RegisterProfile) -> Result<AuthPayload, ClientError>;
    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ClientError>;
    async fn me(&self, token: &str) -> Result<SessionUser, ClientError>;
}

//=========================================================================================
// Routing
//=========================================================================================

/// Where a user is sent after signing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    AdminHome,
    InstructorHome,
    StudentHome,
}

impl Destination {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Admin => Destination::AdminHome,
            Role::Instructor => Destination::InstructorHome,
            Role::Student => Destination::StudentHome,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Destination::AdminHome => "/admin-dashboard",
            Destination::InstructorHome => "/instructor-dashboard",
            Destination::StudentHome => "/dashboard",
        }
    }
}

//=========================================================================================
// Session Client
//=========================================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct StoredSession {
    pub token: String,
    pub user: SessionUser,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Anonymous,
    Authenticating,
    Authenticated(StoredSession),
}

/// The result of a successful sign-in.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub user: SessionUser,
    pub destination: Destination,
}

pub struct SessionClient {
    api: Arc<dyn AuthApi>,
    storage: Arc<dyn DurableStorage>,
    state: SessionState,
}

impl SessionClient {
    /// Creates an anonymous session. Call `restore` to pick up a saved one.
    pub fn new(api: Arc<dyn AuthApi>, storage: Arc<dyn DurableStorage>) -> Self {
        Self {
            api,
            storage,
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn current_user(&self) -> Option<&SessionUser> {
        match &self.state {
            SessionState::Authenticated(session) => Some(&session.user),
            _ => None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(session) => Some(&session.token),
            _ => None,
        }
    }

    /// Restores a saved session without contacting the server. The token's expiry is
    /// not checked here; the first authenticated call will surface a stale token.
    pub fn restore(&mut self) -> Result<Option<Destination>, ClientError> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user: Option<SessionUser> = load_json(self.storage.as_ref(), USER_KEY)?;
        match (token, user) {
            (Some(token), Some(user)) => {
                let destination = Destination::for_role(user.role);
                self.state = SessionState::Authenticated(StoredSession { token, user });
                Ok(Some(destination))
            }
            _ => {
                self.state = SessionState::Anonymous;
                Ok(None)
            }
        }
    }

    pub async fn register(&mut self, profile: RegisterProfile) -> Result<SignedIn, ClientError> {
        self.state = SessionState::Authenticating;
        let result = self.api.register(&profile).await;
        self.finish_sign_in(result)
    }

    /// On failure the server's message is returned unchanged and the session stays anonymous.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<SignedIn, ClientError> {
        self.state = SessionState::Authenticating;
        let result = self.api.login(email, password).await;
        self.finish_sign_in(result)
    }

    /// Forgets the session locally. Tokens are stateless so the server is not told.
    pub fn logout(&mut self) -> Result<(), ClientError> {
        self.state = SessionState::Anonymous;
        self.storage.remove(TOKEN_KEY)?;
        self.storage.remove(USER_KEY)?;
        Ok(())
    }

    /// Fetches the current profile from the server using the stored token.
    pub async fn profile(&self) -> Result<SessionUser, ClientError> {
        let token = self.token().ok_or(ClientError::NotAuthenticated)?;
        self.api.me(token).await
    }

    fn finish_sign_in(
        &mut self,
        result: Result<AuthPayload, ClientError>,
    ) -> Result<SignedIn, ClientError> {
        let payload = match result {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.state = SessionState::Anonymous;
                return Err(e);
            }
        };

        if let Err(e) = self.persist(&payload) {
            self.state = SessionState::Anonymous;
            return Err(e);
        }

        let destination = Destination::for_role(payload.user.role);
        info!(user_id = %payload.user.id, role = %payload.user.role, "Signed in");
        self.state = SessionState::Authenticated(StoredSession {
            token: payload.token,
            user: payload.user.clone(),
        });
        Ok(SignedIn {
            user: payload.user,
            destination,
        })
    }

    fn persist(&self, payload: &AuthPayload) -> Result<(), ClientError> {
        self.storage.set(TOKEN_KEY, &payload.token)?;
        save_json(self.storage.as_ref(), USER_KEY, &payload.user)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use std::sync::Mutex;

    /// An `AuthApi` that knows a single account.
    struct FakeApi {
        email: String,
        password: String,
        role: Role,
        calls: Mutex<u32>,
    }

    impl FakeApi {
        fn new(role: Role) -> Self {
            Self {
                email: "alice@x.com".to_string(),
                password: "secret1".to_string(),
                role,
                calls: Mutex::new(0),
            }
        }

        fn payload(&self, username: &str) -> AuthPayload {
            AuthPayload {
                user: SessionUser {
                    id: Uuid::nil(),
                    username: username.to_string(),
                    email: self.email.clone(),
                    role: self.role,
                },
                token: "signed.token.value".to_string(),
            }
        }
    }

    #[async_trait]
    impl AuthApi for FakeApi {
        async fn register(&self, profile: &RegisterProfile) -> Result<AuthPayload, ClientError> {
            *self.calls.lock().unwrap() += 1;
            Ok(self.payload(&profile.username))
        }

        async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ClientError> {
            *self.calls.lock().unwrap() += 1;
            if email == self.email && password == self.password {
                Ok(self.payload("alice"))
            } else {
                Err(ClientError::Rejected {
                    status: 401,
                    message: "Invalid credentials".to_string(),
                })
            }
        }

        async fn me(&self, token: &str) -> Result<SessionUser, ClientError> {
            assert_eq!(token, "signed.token.value");
            Ok(self.payload("alice").user)
        }
    }

    fn client(role: Role) -> (SessionClient, Arc<FakeApi>, Arc<MemoryStorage>) {
        let api = Arc::new(FakeApi::new(role));
        let storage = Arc::new(MemoryStorage::new());
        let client = SessionClient::new(api.clone(), storage.clone());
        (client, api, storage)
    }

    #[tokio::test]
    async fn login_persists_session_and_routes_by_role() {
        let (mut client, _api, storage) = client(Role::Instructor);

        let signed_in = client.login("alice@x.com", "secret1").await.unwrap();
        assert_eq!(signed_in.destination, Destination::InstructorHome);
        assert_eq!(signed_in.destination.path(), "/instructor-dashboard");
        assert_eq!(client.token(), Some("signed.token.value"));
        assert_eq!(
            storage.get(TOKEN_KEY).unwrap().as_deref(),
            Some("signed.token.value")
        );
        assert!(storage.get(USER_KEY).unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_login_surfaces_server_message_and_stays_anonymous() {
        let (mut client, _api, storage) = client(Role::Student);

        let err = client.login("alice@x.com", "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid credentials");
        assert_eq!(client.state(), &SessionState::Anonymous);
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn register_routes_admins_to_admin_home() {
        let (mut client, _api, _storage) = client(Role::Admin);
        let signed_in = client
            .register(RegisterProfile {
                username: "root".to_string(),
                email: "alice@x.com".to_string(),
                password: "secret1".to_string(),
                role: None,
            })
            .await
            .unwrap();
        assert_eq!(signed_in.destination, Destination::AdminHome);
        assert_eq!(client.current_user().map(|u| u.username.as_str()), Some("root"));
    }

    #[tokio::test]
    async fn restore_uses_storage_without_calling_the_server() {
        let (mut client, api, storage) = client(Role::Student);
        client.login("alice@x.com", "secret1").await.unwrap();

        let mut restored = SessionClient::new(api.clone(), storage.clone());
        let destination = restored.restore().unwrap();
        assert_eq!(destination, Some(Destination::StudentHome));
        assert_eq!(restored.current_user().map(|u| u.email.as_str()), Some("alice@x.com"));
        assert_eq!(*api.calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn logout_clears_storage() {
        let (mut client, api, storage) = client(Role::Student);
        client.login("alice@x.com", "secret1").await.unwrap();
        client.logout().unwrap();

        assert_eq!(client.state(), &SessionState::Anonymous);
        assert!(matches!(client.profile().await, Err(ClientError::NotAuthenticated)));

        let mut fresh = SessionClient::new(api, storage);
        assert_eq!(fresh.restore().unwrap(), None);
    }

    #[test]
    fn stored_role_strings_are_normalized() {
        let storage = MemoryStorage::new();
        storage.set(TOKEN_KEY, "t").unwrap();
        storage
            .set(
                USER_KEY,
                r#"{"id":"00000000-0000-0000-0000-000000000000","username":"a","email":"a@x.com","role":"Admin"}"#,
            )
            .unwrap();
        let mut client = SessionClient::new(Arc::new(FakeApi::new(Role::Admin)), Arc::new(storage));
        assert_eq!(client.restore().unwrap(), Some(Destination::AdminHome));
    }
}
