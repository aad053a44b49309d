//! Admin sign-in.
//!
//! Credentials go to the hosted auth service first. When it rejects them
//! (or is unreachable) and a demo accounts file is configured, the demo
//! accounts are tried next. A hosted sign-in resolves the user's role from
//! their `owners` row and their tenants from `tenants.owner_id`.

mod demo;
mod error;

pub use demo::{DemoUsers, hash_password};
pub use error::AuthError;

use tracing::instrument;

use vitrina_core::auth::{CurrentUser, can_access_admin};
use vitrina_core::{Email, UserRole};

use crate::backend::auth::AuthUser;
use crate::backend::{BackendClient, BackendError};
use crate::db::{OwnerRepository, TenantRepository};

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub user: CurrentUser,
    /// Hosted access token; `None` for demo accounts.
    pub access_token: Option<String>,
}

/// Admin authentication service.
#[derive(Clone)]
pub struct AuthService {
    backend: BackendClient,
    demo: Option<DemoUsers>,
}

impl AuthService {
    #[must_use]
    pub const fn new(backend: BackendClient, demo: Option<DemoUsers>) -> Self {
        Self { backend, demo }
    }

    /// Whether demo accounts are loaded.
    #[must_use]
    pub fn has_demo_users(&self) -> bool {
        self.demo.as_ref().is_some_and(|demo| !demo.is_empty())
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidEmail`] for a malformed email
    /// - [`AuthError::InvalidCredentials`] when no source accepts them
    /// - [`AuthError::NoAccess`] for a tenant owner without tenants
    /// - [`AuthError::Backend`] when the hosted service fails and no demo
    ///   account matches
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignedIn, AuthError> {
        let email = Email::parse(email)?;

        let signed_in = match self
            .backend
            .sign_in_with_password(email.as_str(), password)
            .await
        {
            Ok(session) => {
                let user = self
                    .resolve_user(&session.user, &email, &session.access_token)
                    .await?;
                SignedIn {
                    user,
                    access_token: Some(session.access_token),
                }
            }
            Err(err) => {
                let demo_user = self
                    .demo
                    .as_ref()
                    .and_then(|demo| demo.verify(email.as_str(), password));
                match (demo_user, err) {
                    (Some(user), err) => {
                        tracing::info!(hosted_error = %err, "Signed in with demo account");
                        SignedIn {
                            user,
                            access_token: None,
                        }
                    }
                    (None, BackendError::Unauthorized) => {
                        return Err(AuthError::InvalidCredentials);
                    }
                    (None, err) => return Err(AuthError::Backend(err)),
                }
            }
        };

        if !can_access_admin(&signed_in.user) {
            return Err(AuthError::NoAccess);
        }
        Ok(signed_in)
    }

    /// Revoke the hosted session. Failures are logged, not returned; the
    /// local session is cleared either way.
    pub async fn sign_out(&self, access_token: Option<&str>) {
        if let Some(token) = access_token
            && let Err(e) = self.backend.sign_out(token).await
        {
            tracing::warn!(error = %e, "Failed to revoke hosted session");
        }
    }

    /// Build the session user from the hosted user, their owner row and the
    /// tenants they own.
    async fn resolve_user(
        &self,
        auth_user: &AuthUser,
        email: &Email,
        token: &str,
    ) -> Result<CurrentUser, AuthError> {
        let owner = OwnerRepository::new(&self.backend, Some(token))
            .get(auth_user.id)
            .await?;
        let tenant_ids = TenantRepository::new(&self.backend, Some(token))
            .owned_by(auth_user.id)
            .await?;

        let (name, role) = match owner {
            Some(owner) => (owner.name, owner.role),
            None => (
                auth_user
                    .display_name()
                    .map_or_else(|| default_name(email), str::to_owned),
                UserRole::TenantOwner,
            ),
        };

        Ok(CurrentUser {
            id: auth_user.id,
            email: email.clone(),
            name,
            role,
            tenant_ids,
        })
    }
}

/// Local part of the email, for users without a name on file.
fn default_name(email: &Email) -> String {
    email
        .as_str()
        .split('@')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use secrecy::SecretString;
    use serde_json::json;
    use std::time::Duration;
    use url::Url;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const USER_ID: &str = "0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33";
    const TENANT_ID: &str = "6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1";

    fn backend(server: &MockServer) -> BackendClient {
        BackendClient::new(&BackendConfig {
            url: Url::parse(&server.uri()).unwrap(),
            anon_key: SecretString::from("anon-key"),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    async fn mount_token(server: &MockServer, status: u16) {
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "jwt-access",
                "user": {"id": USER_ID, "email": "ana@tienda.test"}
            }))
        } else {
            ResponseTemplate::new(status).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }))
        };
        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn demo_users() -> DemoUsers {
        let hash = hash_password("demo-pass-123").unwrap();
        DemoUsers::from_yaml(&format!(
            r#"
users:
  - id: {USER_ID}
    email: demo@vitrina.test
    name: Demo
    role: admin
    password_hash: "{hash}"
"#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_hosted_sign_in_resolves_owner_and_tenants() {
        let server = MockServer::start().await;
        mount_token(&server, 200).await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/owners"))
            .and(query_param("id", format!("eq.{USER_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": USER_ID,
                "email": "ana@tienda.test",
                "name": "Ana",
                "role": "tenant_owner"
            }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/tenants"))
            .and(query_param("owner_id", format!("eq.{USER_ID}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": TENANT_ID}])))
            .mount(&server)
            .await;

        let service = AuthService::new(backend(&server), None);
        let signed_in = service.sign_in("Ana@Tienda.test", "hunter22").await.unwrap();

        assert_eq!(signed_in.access_token.as_deref(), Some("jwt-access"));
        assert_eq!(signed_in.user.name, "Ana");
        assert_eq!(signed_in.user.role, UserRole::TenantOwner);
        assert_eq!(signed_in.user.tenant_ids, vec![TENANT_ID.parse().unwrap()]);
    }

    #[tokio::test]
    async fn test_owner_without_tenants_has_no_access() {
        let server = MockServer::start().await;
        mount_token(&server, 200).await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let service = AuthService::new(backend(&server), None);
        let result = service.sign_in("ana@tienda.test", "hunter22").await;
        assert!(matches!(result, Err(AuthError::NoAccess)));
    }

    #[tokio::test]
    async fn test_rejected_credentials_without_demo_file() {
        let server = MockServer::start().await;
        mount_token(&server, 400).await;

        let service = AuthService::new(backend(&server), None);
        let result = service.sign_in("demo@vitrina.test", "demo-pass-123").await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_demo_fallback_after_hosted_rejection() {
        let server = MockServer::start().await;
        mount_token(&server, 400).await;

        let service = AuthService::new(backend(&server), Some(demo_users()));
        assert!(service.has_demo_users());

        let signed_in = service
            .sign_in("demo@vitrina.test", "demo-pass-123")
            .await
            .unwrap();
        assert_eq!(signed_in.user.role, UserRole::Admin);
        assert!(signed_in.access_token.is_none());

        let wrong = service.sign_in("demo@vitrina.test", "wrong").await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_outage_without_demo_match_is_backend_error() {
        let server = MockServer::start().await;
        mount_token(&server, 503).await;

        let service = AuthService::new(backend(&server), Some(demo_users()));
        let result = service.sign_in("ana@tienda.test", "hunter22").await;
        assert!(matches!(result, Err(AuthError::Backend(_))));
    }
}
