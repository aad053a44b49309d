//! Password hashing for the admin demo accounts file.
//!
//! ```bash
//! vitrina-cli hash-password 'una clave larga'
//! echo 'una clave larga' | vitrina-cli hash-password
//! ```
//!
//! Paste the output into the account's `password_hash` field.

use std::io::BufRead;

use thiserror::Error;

use vitrina_admin::services::AuthError;
use vitrina_admin::services::auth::hash_password;

/// Shortest password accepted for a demo account.
const MIN_LENGTH: usize = 8;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Failed to read password from stdin: {0}")]
    Stdin(#[from] std::io::Error),

    #[error("Password must be at least {MIN_LENGTH} characters")]
    TooShort,

    #[error(transparent)]
    Hash(#[from] AuthError),
}

/// Hash `password`, or the first line of stdin, and print the PHC string.
///
/// # Errors
///
/// Returns [`PasswordError`] if stdin can't be read, the password is too
/// short, or hashing fails.
pub fn hash(password: Option<String>) -> Result<(), PasswordError> {
    let password = match password {
        Some(password) => password,
        None => {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            line
        }
    };

    let phc = hash_checked(password.trim_end_matches(['\r', '\n']))?;

    #[allow(clippy::print_stdout)]
    {
        println!("{phc}");
    }
    Ok(())
}

fn hash_checked(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_LENGTH {
        return Err(PasswordError::TooShort);
    }
    Ok(hash_password(password)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use vitrina_admin::services::DemoUsers;

    #[test]
    fn test_short_password_is_rejected() {
        assert!(matches!(hash_checked("corta"), Err(PasswordError::TooShort)));
    }

    #[test]
    fn test_hash_verifies_in_demo_file() {
        let phc = hash_checked("clave-demo-larga").unwrap();
        assert!(phc.starts_with("$argon2"));

        let yaml = format!(
            "users:\n  - id: 0b9a5f7e-0d0b-4d43-8d4f-8f0f5c1e2a33\n    email: demo@vitrina.test\n    name: Demo\n    role: admin\n    password_hash: \"{phc}\"\n"
        );
        let demo = DemoUsers::from_yaml(&yaml).unwrap();
        assert!(demo.verify("demo@vitrina.test", "clave-demo-larga").is_some());
        assert!(demo.verify("demo@vitrina.test", "otra-clave").is_none());
    }
}
