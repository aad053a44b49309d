//! Sign-in, sign-out and the current user.

use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use vitrina_core::auth::CurrentUser;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Sign in and start an admin session.
#[instrument(skip(state, session, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<CurrentUser>> {
    let signed_in = state
        .auth()
        .sign_in(&request.email, &request.password)
        .await
        .inspect_err(|e| tracing::warn!(error = %e, "Sign-in failed"))?;

    set_current_user(&session, &signed_in).await?;
    set_sentry_user(
        &signed_in.user.id.to_string(),
        signed_in.user.email.as_str(),
    );
    tracing::info!(
        user_id = %signed_in.user.id,
        role = %signed_in.user.role,
        demo = signed_in.access_token.is_none(),
        "Admin signed in"
    );

    Ok(Json(signed_in.user))
}

/// Sign out: revoke the hosted session (best effort) and clear this one.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<StatusCode> {
    let token = clear_current_user(&session).await?;
    state.auth().sign_out(token.as_deref()).await;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in user.
pub async fn me(RequireAuth(auth): RequireAuth) -> Json<CurrentUser> {
    Json(auth.user)
}
