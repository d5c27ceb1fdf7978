use serde::{Deserialize, Serialize};

use super::Amount;

pub type UserId = i64;

/// A row of the `users` table. The store owns it; callers only hold a copy
/// for the duration of one operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub balance: Amount,
}

impl User {
    /// Exact, case-sensitive comparison used for name confirmation.
    pub fn is_named(&self, name: &str) -> bool {
        self.name == name
    }
}

/// Loose shape check for an email address: non-empty and containing `@`.
pub fn is_plausible_email(email: &str) -> bool {
    !email.is_empty() && email.contains('@')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> User {
        User {
            id: 1,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            balance: 100,
        }
    }

    #[test]
    fn test_name_match_is_case_sensitive() {
        let user = alice();
        assert!(user.is_named("Alice"));
        assert!(!user.is_named("alice"));
        assert!(!user.is_named("Alice "));
    }

    #[test]
    fn test_email_shape() {
        assert!(is_plausible_email("a@b"));
        assert!(!is_plausible_email("alice.example.com"));
        assert!(!is_plausible_email(""));
    }
}
