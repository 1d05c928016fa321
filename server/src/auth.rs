//! Credential checking boundary.
//!
//! The lobby only needs a yes/no answer for a username/password pair; the
//! actual backend (database, token service) sits behind this trait.

use shared::protocol::AuthError;

pub trait Authenticator: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> Result<(), AuthError>;
}

/// Accepts any login with a non-empty username. Stands in for a real
/// backend in development and tests.
pub struct AllowAny;

impl Authenticator for AllowAny {
    fn verify(&self, username: &str, _password: &str) -> Result<(), AuthError> {
        if username.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allow_any_accepts_named_users() {
        assert!(AllowAny.verify("player1", "123").is_ok());
        assert!(AllowAny.verify("player1", "").is_ok());
    }

    #[test]
    fn allow_any_rejects_empty_usernames() {
        assert_eq!(
            AllowAny.verify("", "123"),
            Err(AuthError::InvalidCredentials)
        );
    }
}
