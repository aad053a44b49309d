//! Authentication extractors for admin.
//!
//! Every admin API route takes one of these:
//!
//! - [`RequireAuth`] - signed in with admin console access (401 otherwise)
//! - [`RequireSystemAccess`] - additionally a global role and a hosted
//!   session (403 otherwise)
//!
//! Per-tenant checks happen in handlers through
//! [`Authenticated::require_tenant`] once the tenant id is known, and
//! writes call [`Authenticated::require_writable`].
//!
//! Demo sessions have no hosted token, so their backend calls carry the
//! anonymous key. Row-level security lets that key read active tenants
//! and their products and nothing else, so demo sessions are read-only
//! and kept out of the system-wide views.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tower_sessions::Session;

use vitrina_core::TenantId;
use vitrina_core::auth::{CurrentUser, can_access_admin, can_manage_system, can_manage_tenant};

use crate::error::AppError;
use crate::models::session_keys;
use crate::services::SignedIn;

/// The signed-in user plus the bearer for their backend calls.
#[derive(Debug, Clone)]
pub struct Authenticated {
    pub user: CurrentUser,
    access_token: Option<String>,
}

impl Authenticated {
    /// Bearer for backend calls; `None` means the anonymous key.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] unless the user may manage `tenant_id`.
    pub fn require_tenant(&self, tenant_id: TenantId) -> Result<(), AppError> {
        if can_manage_tenant(&self.user, tenant_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "no access to tenant {tenant_id}"
            )))
        }
    }

    /// Signed in with a demo account rather than the hosted auth service.
    #[must_use]
    pub const fn is_demo(&self) -> bool {
        self.access_token.is_none()
    }

    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] for demo sessions.
    pub fn require_writable(&self) -> Result<(), AppError> {
        if self.is_demo() {
            Err(AppError::Forbidden(DEMO_READ_ONLY.to_string()))
        } else {
            Ok(())
        }
    }
}

const DEMO_READ_ONLY: &str = "Demo accounts are read-only";

/// Rejection for the auth extractors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRejection {
    /// No signed-in user in the session.
    Unauthorized,
    /// Signed in, but not allowed here.
    Forbidden,
    /// Demo session on a route that needs a hosted one.
    DemoReadOnly,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Unauthorized => (StatusCode::UNAUTHORIZED, "Sign in required"),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You don't have permission to access this resource",
            ),
            Self::DemoReadOnly => (StatusCode::FORBIDDEN, DEMO_READ_ONLY),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

async fn authenticated(parts: &Parts) -> Result<Authenticated, AuthRejection> {
    let session = parts
        .extensions
        .get::<Session>()
        .ok_or(AuthRejection::Unauthorized)?;

    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()
        .ok_or(AuthRejection::Unauthorized)?;
    let access_token: Option<String> = session
        .get(session_keys::ACCESS_TOKEN)
        .await
        .ok()
        .flatten();

    if !can_access_admin(&user) {
        return Err(AuthRejection::Forbidden);
    }
    Ok(Authenticated { user, access_token })
}

/// Extractor that requires a signed-in user with admin console access.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(RequireAuth(auth): RequireAuth) -> impl IntoResponse {
///     format!("Hola, {}!", auth.user.name)
/// }
/// ```
pub struct RequireAuth(pub Authenticated);

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        authenticated(parts).await.map(Self)
    }
}

/// Extractor for system-wide routes (owners, stats, tenant creation):
/// a signed-in user with a global role and a hosted session.
pub struct RequireSystemAccess(pub Authenticated);

impl<S> FromRequestParts<S> for RequireSystemAccess
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth = authenticated(parts).await?;
        if !can_manage_system(&auth.user) {
            return Err(AuthRejection::Forbidden);
        }
        if auth.is_demo() {
            return Err(AuthRejection::DemoReadOnly);
        }
        Ok(Self(auth))
    }
}

/// Store a fresh sign-in in the session, rotating the session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    signed_in: &SignedIn,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_USER, &signed_in.user)
        .await?;
    match &signed_in.access_token {
        Some(token) => session.insert(session_keys::ACCESS_TOKEN, token).await,
        None => session
            .remove::<String>(session_keys::ACCESS_TOKEN)
            .await
            .map(|_| ()),
    }
}

/// Remove the signed-in user from the session (logout), returning the
/// hosted access token it held.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(
    session: &Session,
) -> Result<Option<String>, tower_sessions::session::Error> {
    let token = session.remove::<String>(session_keys::ACCESS_TOKEN).await?;
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session.flush().await?;
    Ok(token)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vitrina_core::{Email, UserId, UserRole};

    fn auth(role: UserRole, tenant_ids: Vec<TenantId>) -> Authenticated {
        Authenticated {
            user: CurrentUser {
                id: UserId::generate(),
                email: Email::parse("ana@tienda.test").unwrap(),
                name: "Ana".to_string(),
                role,
                tenant_ids,
            },
            access_token: Some("jwt".to_string()),
        }
    }

    #[test]
    fn test_tenant_owner_scope() {
        let own = TenantId::generate();
        let owner = auth(UserRole::TenantOwner, vec![own]);

        assert!(owner.require_tenant(own).is_ok());
        assert!(matches!(
            owner.require_tenant(TenantId::generate()),
            Err(AppError::Forbidden(_))
        ));
        assert!(owner.require_writable().is_ok());
        assert_eq!(owner.token(), Some("jwt"));
    }

    #[test]
    fn test_admin_passes_every_check() {
        let admin = auth(UserRole::Admin, Vec::new());
        assert!(admin.require_tenant(TenantId::generate()).is_ok());
        assert!(admin.require_writable().is_ok());
    }

    #[test]
    fn test_demo_session_is_read_only() {
        let mut demo = auth(UserRole::Admin, Vec::new());
        demo.access_token = None;

        assert!(demo.is_demo());
        assert!(demo.require_tenant(TenantId::generate()).is_ok());
        assert!(matches!(demo.require_writable(), Err(AppError::Forbidden(_))));
        assert_eq!(demo.token(), None);
    }

    #[test]
    fn test_rejection_status_codes() {
        assert_eq!(
            AuthRejection::Unauthorized.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthRejection::Forbidden.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthRejection::DemoReadOnly.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
