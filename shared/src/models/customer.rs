//! Customer model

use serde::{Deserialize, Serialize};

/// Customer entity
///
/// A customer with `password_hash = NULL` is a shadow identity: a record
/// created on behalf of a guest checkout, reusable the next time the same
/// email checks out as a guest. Shadow identities have no authenticated
/// owner, so their contact fields track the latest values supplied at
/// checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    /// Normalized (lower-cased, trimmed) — unique
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    /// NULL for shadow identities
    #[serde(default, skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Customer {
    /// Whether this record is a shadow identity (no credentials)
    pub fn is_shadow(&self) -> bool {
        self.password_hash.is_none()
    }
}

/// Normalize an email for lookup and storage
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana.Perez@Example.COM "), "ana.perez@example.com");
    }
}
