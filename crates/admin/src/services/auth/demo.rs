//! Demo accounts for environments without hosted auth users.
//!
//! Loaded from the YAML file named by `ADMIN_DEMO_USERS_FILE`. Passwords are
//! stored as argon2 PHC strings; `vitrina-cli hash-password` produces them.
//!
//! ```yaml
//! users:
//!   - id: 0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33
//!     email: demo@vitrina.test
//!     name: Demo
//!     role: tenant_owner
//!     tenant_ids: [6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1]
//!     password_hash: "$argon2id$v=19$m=19456,t=2,p=1$..."
//! ```

use std::path::Path;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use serde::Deserialize;

use vitrina_core::auth::CurrentUser;
use vitrina_core::{Email, TenantId, UserId, UserRole};

use super::AuthError;

#[derive(Debug, Deserialize)]
struct DemoFile {
    users: Vec<DemoUserEntry>,
}

#[derive(Debug, Deserialize)]
struct DemoUserEntry {
    id: UserId,
    email: String,
    name: String,
    role: UserRole,
    #[serde(default)]
    tenant_ids: Vec<TenantId>,
    password_hash: String,
}

#[derive(Debug, Clone)]
struct DemoUser {
    user: CurrentUser,
    password_hash: String,
}

/// The loaded demo accounts.
#[derive(Debug, Clone, Default)]
pub struct DemoUsers {
    users: Vec<DemoUser>,
}

impl DemoUsers {
    /// Read and validate a demo accounts file.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DemoFile`] if the file can't be read, or
    /// [`AuthError::DemoParse`] for bad YAML, emails or password hashes.
    pub fn load(path: &Path) -> Result<Self, AuthError> {
        let text = std::fs::read_to_string(path).map_err(|source| AuthError::DemoFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Parse demo accounts from YAML.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::DemoParse`] for bad YAML, emails or password
    /// hashes.
    pub fn from_yaml(text: &str) -> Result<Self, AuthError> {
        let file: DemoFile =
            serde_yaml::from_str(text).map_err(|e| AuthError::DemoParse(e.to_string()))?;

        let users = file
            .users
            .into_iter()
            .map(|entry| {
                PasswordHash::new(&entry.password_hash).map_err(|e| {
                    AuthError::DemoParse(format!("password hash for {}: {e}", entry.email))
                })?;
                let email = Email::parse(&entry.email)
                    .map_err(|e| AuthError::DemoParse(format!("{}: {e}", entry.email)))?;
                Ok(DemoUser {
                    user: CurrentUser {
                        id: entry.id,
                        email,
                        name: entry.name,
                        role: entry.role,
                        tenant_ids: entry.tenant_ids,
                    },
                    password_hash: entry.password_hash,
                })
            })
            .collect::<Result<Vec<_>, AuthError>>()?;

        Ok(Self { users })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// The account matching `email` and `password`, if any.
    #[must_use]
    pub fn verify(&self, email: &str, password: &str) -> Option<CurrentUser> {
        let demo = self
            .users
            .iter()
            .find(|demo| demo.user.email.as_str().eq_ignore_ascii_case(email.trim()))?;
        let parsed = PasswordHash::new(&demo.password_hash).ok()?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .ok()
            .map(|()| demo.user.clone())
    }
}

/// Hash a password into an argon2id PHC string for the demo accounts file.
///
/// # Errors
///
/// Returns [`AuthError::Hash`] if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::encode_b64(uuid::Uuid::new_v4().as_bytes())
        .map_err(|e| AuthError::Hash(e.to_string()))?;
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn demo_yaml(hash: &str) -> String {
        format!(
            r#"
users:
  - id: 0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33
    email: Demo@Vitrina.test
    name: Demo
    role: tenant_owner
    tenant_ids: [6f1c0c2e-6a43-4c36-9a35-1f9ad2b2f6a1]
    password_hash: "{hash}"
"#
        )
    }

    #[test]
    fn test_verify_accepts_matching_password() {
        let hash = hash_password("demo-pass-123").unwrap();
        let users = DemoUsers::from_yaml(&demo_yaml(&hash)).unwrap();
        assert_eq!(users.len(), 1);

        let user = users.verify("demo@vitrina.test", "demo-pass-123").unwrap();
        assert_eq!(user.role, UserRole::TenantOwner);
        assert_eq!(user.tenant_ids.len(), 1);
    }

    #[test]
    fn test_verify_rejects_wrong_password_and_unknown_email() {
        let hash = hash_password("demo-pass-123").unwrap();
        let users = DemoUsers::from_yaml(&demo_yaml(&hash)).unwrap();

        assert!(users.verify("demo@vitrina.test", "nope").is_none());
        assert!(users.verify("otro@vitrina.test", "demo-pass-123").is_none());
    }

    #[test]
    fn test_plaintext_password_is_rejected_at_load() {
        let result = DemoUsers::from_yaml(&demo_yaml("demo-pass-123"));
        assert!(matches!(result, Err(AuthError::DemoParse(_))));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("x").unwrap(), hash_password("x").unwrap());
    }
}
