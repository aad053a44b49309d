//! Session keys for admin authentication data.
//!
//! The session holds the signed-in [`CurrentUser`](vitrina_core::auth::CurrentUser)
//! and, for hosted sign-ins, the access token used as the bearer on
//! backend calls.

pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the hosted access token.
    pub const ACCESS_TOKEN: &str = "access_token";
}
