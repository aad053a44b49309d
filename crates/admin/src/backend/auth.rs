//! Hosted auth API: password sign-in, user lookup and sign-out.

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use vitrina_core::UserId;

use super::{BackendClient, BackendError, send};

/// A successful password grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: AuthUser,
}

/// The hosted service's user record, trimmed to what the admin needs.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: Value,
}

impl AuthUser {
    /// `user_metadata.name`, when the sign-up form stored one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.user_metadata
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.trim().is_empty())
    }
}

impl BackendClient {
    /// `POST /auth/v1/token?grant_type=password`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] for rejected credentials, or
    /// another [`BackendError`] if the service can't be reached.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, BackendError> {
        let request = self
            .inner
            .client
            .post(format!("{}/token", self.inner.auth_url))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.inner.anon_key)
            .json(&json!({ "email": email, "password": password }));

        match send(request, "auth/token").await {
            Ok(body) => Ok(serde_json::from_str(&body)?),
            // Wrong password comes back as 400 invalid_grant.
            Err(BackendError::Api { status, .. })
                if status == StatusCode::BAD_REQUEST.as_u16() =>
            {
                Err(BackendError::Unauthorized)
            }
            Err(err) => Err(err),
        }
    }

    /// `GET /auth/v1/user` for the holder of `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Unauthorized`] for an expired or revoked
    /// token.
    #[instrument(skip_all)]
    pub async fn user(&self, access_token: &str) -> Result<AuthUser, BackendError> {
        let request = self.authorize(
            self.inner.client.get(format!("{}/user", self.inner.auth_url)),
            Some(access_token),
        );
        let body = send(request, "auth/user").await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `POST /auth/v1/logout`, revoking the session behind `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the service rejects the call.
    #[instrument(skip_all)]
    pub async fn sign_out(&self, access_token: &str) -> Result<(), BackendError> {
        let request = self.authorize(
            self.inner
                .client
                .post(format!("{}/logout", self.inner.auth_url)),
            Some(access_token),
        );
        send(request, "auth/logout").await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use secrecy::SecretString;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_ID: &str = "0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33";

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse(&server.uri()).unwrap(),
            anon_key: SecretString::from("anon-key"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_password_grant() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "anon-key"))
            .and(body_json(json!({"email": "ana@tienda.test", "password": "hunter22"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-access",
                "token_type": "bearer",
                "expires_in": 3600,
                "refresh_token": "refresh",
                "user": {
                    "id": USER_ID,
                    "email": "ana@tienda.test",
                    "user_metadata": {"name": "Ana"}
                }
            })))
            .mount(&server)
            .await;

        let session = client(&server)
            .sign_in_with_password("ana@tienda.test", "hunter22")
            .await
            .unwrap();
        assert_eq!(session.access_token, "jwt-access");
        assert_eq!(session.expires_in, Some(3600));
        assert_eq!(session.user.id.to_string(), USER_ID);
        assert_eq!(session.user.display_name(), Some("Ana"));
    }

    #[tokio::test]
    async fn test_bad_password_is_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&server)
            .await;

        let result = client(&server)
            .sign_in_with_password("ana@tienda.test", "wrong")
            .await;
        assert!(matches!(result, Err(BackendError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_user_and_logout_use_access_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/v1/user"))
            .and(header("authorization", "Bearer jwt-access"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": USER_ID,
                "email": "ana@tienda.test"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("authorization", "Bearer jwt-access"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let client = client(&server);
        let user = client.user("jwt-access").await.unwrap();
        assert_eq!(user.email.as_deref(), Some("ana@tienda.test"));
        assert_eq!(user.display_name(), None);
        client.sign_out("jwt-access").await.unwrap();
    }
}
