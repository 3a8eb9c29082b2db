//! Authentication endpoints
//!
//! A successful login or OTP verification stores the returned token on the
//! client, so later calls are authenticated.

use erp_common::EntityId;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Clone, Debug, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
}

/// OTP recipient: a phone number or an email address
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpTarget {
    Phone(String),
    Email(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role_id: Option<EntityId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: AuthUser,
}

#[derive(Serialize)]
struct VerifyOtp<'a> {
    #[serde(flatten)]
    target: &'a OtpTarget,
    otp: &'a str,
}

impl ApiClient {
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthSession> {
        let session: AuthSession = self.post("/api/auth/login", credentials).await?;
        self.set_token(Some(session.token.clone()));
        info!(user = %session.user.id, "logged in");
        Ok(session)
    }

    pub async fn register(&self, registration: &Registration) -> Result<AuthSession> {
        let session: AuthSession = self.post("/api/auth/register", registration).await?;
        self.set_token(Some(session.token.clone()));
        info!(user = %session.user.id, "registered");
        Ok(session)
    }

    pub async fn send_otp(&self, target: &OtpTarget) -> Result<()> {
        self.execute(reqwest::Method::POST, "/api/auth/send-otp", Some(target)).await
    }

    pub async fn verify_otp(&self, target: &OtpTarget, otp: &str) -> Result<AuthSession> {
        let session: AuthSession = self.post("/api/auth/verify-otp", &VerifyOtp { target, otp }).await?;
        self.set_token(Some(session.token.clone()));
        info!(user = %session.user.id, "verified one-time password");
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::error::ApiError;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session() -> serde_json::Value {
        json!({"success": true, "data": {"token": "jwt-1", "user": {"id": "u1", "name": "Ada"}}})
    }

    #[tokio::test]
    async fn test_login_stores_token_for_later_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .and(body_json(json!({"email": "ada@example.com", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/role"))
            .and(header("authorization", "Bearer jwt-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": []})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let credentials = Credentials { email: "ada@example.com".into(), password: "pw".into() };
        let session = client.login(&credentials).await.unwrap();
        assert_eq!(session.user.id, EntityId::from("u1"));

        let roles: Vec<serde_json::Value> = client.get("/api/role").await.unwrap();
        assert!(roles.is_empty());
    }

    #[tokio::test]
    async fn test_failed_login_keeps_previous_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"success": false, "error": "Invalid credentials"})),
            )
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri()).with_token("old")).unwrap();
        let credentials = Credentials { email: "a@b.co".into(), password: "x".into() };
        let err = client.login(&credentials).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert!(matches!(err, ApiError::Rejected { .. }));
        assert_eq!(client.token().as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_otp_flow() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/send-otp"))
            .and(body_json(json!({"phone": "+15550001"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/auth/verify-otp"))
            .and(body_json(json!({"phone": "+15550001", "otp": "123456"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(session()))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let target = OtpTarget::Phone("+15550001".into());
        client.send_otp(&target).await.unwrap();
        client.verify_otp(&target, "123456").await.unwrap();
        assert_eq!(client.token().as_deref(), Some("jwt-1"));
    }
}
