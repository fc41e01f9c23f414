//! crates/bytegurukul_client/src/http.rs
//!
//! The `AuthApi` port implemented over HTTP with `reqwest`.

use async_trait::async_trait;
use bytegurukul_core::session::{AuthApi, AuthPayload, ClientError, RegisterProfile, SessionUser};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

/// The `{ success, data, message }` envelope every API response uses.
#[derive(Deserialize)]
struct Envelope<T> {
    data: Option<T>,
    message: Option<String>,
}

#[derive(Clone)]
pub struct HttpAuthApi {
    client: Client,
    base_url: String,
}

impl HttpAuthApi {
    /// `base_url` is the server root, e.g. `http://localhost:5000`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        debug!(status = status.as_u16(), "Auth API responded");

        if !status.is_success() {
            let message = serde_json::from_str::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            return Err(ClientError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let envelope: Envelope<T> =
            serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("response has no data".to_string()))
    }
}

#[async_trait]
impl AuthApi for HttpAuthApi {
    async fn register(&self, profile: &RegisterProfile) -> Result<AuthPayload, ClientError> {
        let request = self.client.post(self.url("/auth/register")).json(profile);
        self.send(request).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ClientError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "email": email, "password": password }));
        self.send(request).await
    }

    async fn me(&self, token: &str) -> Result<SessionUser, ClientError> {
        let request = self.client.get(self.url("/auth/me")).bearer_auth(token);
        self.send(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytegurukul_core::Role;
    use wiremock::matchers::{bearer_token, body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn auth_body(role: &str) -> serde_json::Value {
        json!({
            "success": true,
            "data": {
                "id": "6f1c2b8e-3d4a-4c55-9a0e-1b2c3d4e5f60",
                "username": "alice",
                "email": "alice@x.com",
                "role": role,
                "token": "jwt-token"
            },
            "message": "Login successful"
        })
    }

    #[tokio::test]
    async fn login_decodes_the_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({ "email": "alice@x.com", "password": "secret1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("Instructor")))
            .expect(1)
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(server.uri());
        let payload = api.login("alice@x.com", "secret1").await.unwrap();
        assert_eq!(payload.token, "jwt-token");
        assert_eq!(payload.user.role, Role::Instructor);
    }

    #[tokio::test]
    async fn rejections_keep_the_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({ "success": false, "message": "Invalid credentials" })),
            )
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(server.uri());
        let err = api.login("alice@x.com", "nope").await.unwrap_err();
        match err {
            ClientError::Rejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid credentials");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn me_sends_the_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .and(bearer_token("jwt-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {
                    "id": "6f1c2b8e-3d4a-4c55-9a0e-1b2c3d4e5f60",
                    "username": "alice",
                    "email": "alice@x.com",
                    "role": "student",
                    "createdAt": "2024-01-01T00:00:00Z"
                }
            })))
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(format!("{}/", server.uri()));
        let user = api.me("jwt-token").await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_network_error() {
        let api = HttpAuthApi::new("http://127.0.0.1:1");
        let err = api.login("a@x.com", "pw").await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(
            err.to_string(),
            bytegurukul_core::session::CONNECTIVITY_MESSAGE
        );
    }

    #[tokio::test]
    async fn success_without_data_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/auth/me"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "success": true, "message": "ok" })),
            )
            .mount(&server)
            .await;

        let api = HttpAuthApi::new(server.uri());
        let err = api.me("jwt-token").await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)));
    }
}
