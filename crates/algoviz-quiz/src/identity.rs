//! Account sign-in, registration and password reset.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::AuthErrorKind;
use crate::progress::UserId;

/// Result type for identity operations.
pub type AuthResult<T> = std::result::Result<T, AuthErrorKind>;

/// Account backend used by the learning session.
pub trait IdentityProvider: Send {
    fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<UserId>;

    /// Create an account. New accounts must verify their email before
    /// signing in.
    fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> AuthResult<UserId>;

    /// Send a reset link to the account's email.
    fn reset_password(&mut self, email: &str) -> AuthResult<()>;

    fn current_user(&self) -> Option<UserId>;

    fn sign_out(&mut self);
}

/// Loose `local@domain.tld` check.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

#[derive(Debug, Clone)]
struct Account {
    id: UserId,
    name: String,
    password: String,
    verified: bool,
}

/// Accounts held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryIdentity {
    accounts: HashMap<String, Account>,
    signed_in: Option<UserId>,
    reset_requests: Vec<String>,
    next_id: u64,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an account's email as verified. Returns `false` if there is no
    /// such account.
    pub fn verify_email(&mut self, email: &str) -> bool {
        match self.accounts.get_mut(&email.trim().to_lowercase()) {
            Some(account) => {
                account.verified = true;
                true
            }
            None => false,
        }
    }

    /// Register and verify in one step.
    pub fn register_verified(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<UserId> {
        let id = self.register(name, email, password, password)?;
        self.verify_email(email);
        Ok(id)
    }

    /// Display name of an account.
    pub fn display_name(&self, user: &UserId) -> Option<&str> {
        self.accounts
            .values()
            .find(|account| &account.id == user)
            .map(|account| account.name.as_str())
    }

    /// Emails that asked for a password reset, oldest first.
    pub fn reset_requests(&self) -> &[String] {
        &self.reset_requests
    }
}

impl IdentityProvider for InMemoryIdentity {
    fn sign_in(&mut self, email: &str, password: &str) -> AuthResult<UserId> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AuthErrorKind::MissingEmail);
        }
        if password.is_empty() {
            return Err(AuthErrorKind::MissingPassword);
        }
        if !is_valid_email(&email) {
            return Err(AuthErrorKind::InvalidEmail);
        }
        let account = self
            .accounts
            .get(&email)
            .ok_or(AuthErrorKind::UserNotFound)?;
        if account.password != password {
            return Err(AuthErrorKind::WrongPassword);
        }
        if !account.verified {
            return Err(AuthErrorKind::EmailNotVerified);
        }
        info!(user = %account.id, "Signed in");
        self.signed_in = Some(account.id.clone());
        Ok(account.id.clone())
    }

    fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> AuthResult<UserId> {
        let email = email.trim().to_lowercase();
        if name.trim().is_empty() {
            return Err(AuthErrorKind::MissingName);
        }
        if email.is_empty() {
            return Err(AuthErrorKind::MissingEmail);
        }
        if password != confirm_password {
            return Err(AuthErrorKind::PasswordMismatch);
        }
        if password.is_empty() {
            return Err(AuthErrorKind::MissingPassword);
        }
        if !is_valid_email(&email) {
            return Err(AuthErrorKind::InvalidEmail);
        }
        if self.accounts.contains_key(&email) {
            return Err(AuthErrorKind::EmailAlreadyInUse);
        }

        self.next_id += 1;
        let id = UserId::new(format!("user-{}", self.next_id));
        debug!(user = %id, "Registered account, verification pending");
        self.accounts.insert(
            email,
            Account {
                id: id.clone(),
                name: name.trim().to_string(),
                password: password.to_string(),
                verified: false,
            },
        );
        Ok(id)
    }

    fn reset_password(&mut self, email: &str) -> AuthResult<()> {
        let email = email.trim().to_lowercase();
        if email.is_empty() {
            return Err(AuthErrorKind::MissingEmail);
        }
        if !self.accounts.contains_key(&email) {
            return Err(AuthErrorKind::UserNotFound);
        }
        debug!("Password reset requested");
        self.reset_requests.push(email);
        Ok(())
    }

    fn current_user(&self) -> Option<UserId> {
        self.signed_in.clone()
    }

    fn sign_out(&mut self) {
        self.signed_in = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_validation_order() {
        let mut identity = InMemoryIdentity::new();
        assert_eq!(identity.register("", "a@b.io", "pw", "pw"), Err(AuthErrorKind::MissingName));
        assert_eq!(identity.register("Ada", " ", "pw", "pw"), Err(AuthErrorKind::MissingEmail));
        assert_eq!(
            identity.register("Ada", "a@b.io", "pw", "pW"),
            Err(AuthErrorKind::PasswordMismatch)
        );
        assert_eq!(identity.register("Ada", "a@b.io", "", ""), Err(AuthErrorKind::MissingPassword));
        assert_eq!(
            identity.register("Ada", "not-an-email", "pw", "pw"),
            Err(AuthErrorKind::InvalidEmail)
        );
    }

    #[test]
    fn duplicate_email_is_rejected() {
        let mut identity = InMemoryIdentity::new();
        identity.register("Ada", "ada@example.com", "pw", "pw").unwrap();
        assert_eq!(
            identity.register("Ada", "ADA@example.com", "pw", "pw"),
            Err(AuthErrorKind::EmailAlreadyInUse)
        );
    }

    #[test]
    fn sign_in_needs_verified_email() {
        let mut identity = InMemoryIdentity::new();
        let id = identity.register("Ada", "ada@example.com", "secret", "secret").unwrap();
        assert_eq!(
            identity.sign_in("ada@example.com", "secret"),
            Err(AuthErrorKind::EmailNotVerified)
        );
        assert!(identity.current_user().is_none());

        assert!(identity.verify_email("ada@example.com"));
        assert_eq!(identity.sign_in("ada@example.com", "secret"), Ok(id.clone()));
        assert_eq!(identity.current_user(), Some(id.clone()));
        assert_eq!(identity.display_name(&id), Some("Ada"));

        identity.sign_out();
        assert!(identity.current_user().is_none());
    }

    #[test]
    fn sign_in_failures() {
        let mut identity = InMemoryIdentity::new();
        identity.register_verified("Ada", "ada@example.com", "secret").unwrap();
        assert_eq!(identity.sign_in("", "secret"), Err(AuthErrorKind::MissingEmail));
        assert_eq!(identity.sign_in("ada@example.com", ""), Err(AuthErrorKind::MissingPassword));
        assert_eq!(identity.sign_in("ada@", "secret"), Err(AuthErrorKind::InvalidEmail));
        assert_eq!(identity.sign_in("bob@example.com", "secret"), Err(AuthErrorKind::UserNotFound));
        assert_eq!(identity.sign_in("ada@example.com", "guess"), Err(AuthErrorKind::WrongPassword));
    }

    #[test]
    fn reset_password_requires_account() {
        let mut identity = InMemoryIdentity::new();
        identity.register_verified("Ada", "ada@example.com", "secret").unwrap();
        assert_eq!(identity.reset_password(""), Err(AuthErrorKind::MissingEmail));
        assert_eq!(identity.reset_password("bob@example.com"), Err(AuthErrorKind::UserNotFound));
        assert_eq!(identity.reset_password("Ada@Example.com"), Ok(()));
        assert_eq!(identity.reset_requests(), ["ada@example.com".to_string()]);
    }

    #[test]
    fn error_messages() {
        assert_eq!(AuthErrorKind::UserNotFound.to_string(), "No account found. Please register first.");
        assert_eq!(AuthErrorKind::PasswordMismatch.to_string(), "Passwords do not match.");
    }
}
