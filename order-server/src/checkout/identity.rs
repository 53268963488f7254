//! Guest Identity Resolver
//!
//! Maps an unauthenticated checkout onto a durable customer record,
//! detecting collisions with real (credential-bearing) accounts. Runs
//! before composition validation, which needs a customer id to check
//! address ownership.

use crate::db::repository::customer;
use crate::utils::{AppError, AppResult};
use shared::checkout::GuestInfo;
use shared::models::customer::normalize_email;
use sqlx::SqlitePool;
use validator::Validate;

/// Outcome of identity resolution for one checkout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub customer_id: i64,
    /// Guest checkouts get a single-use lookup token on their order
    pub is_guest: bool,
}

/// Resolve the customer behind a checkout.
///
/// - Authenticated session identity is used directly.
/// - Otherwise guest contact details are required; an existing shadow
///   identity with the same normalized email is reused (contact info
///   refreshed), a credential-bearing account is a conflict, and no match
///   creates a fresh shadow record.
pub async fn resolve(
    pool: &SqlitePool,
    authenticated: Option<i64>,
    guest: Option<&GuestInfo>,
) -> AppResult<ResolvedIdentity> {
    if let Some(customer_id) = authenticated {
        let customer = customer::find_by_id(pool, customer_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        return Ok(ResolvedIdentity {
            customer_id: customer.id,
            is_guest: false,
        });
    }

    let info = guest.ok_or(AppError::Unauthorized)?;
    info.validate()
        .map_err(|e| AppError::Validation(format!("Invalid guest details: {e}")))?;

    let email = normalize_email(&info.email);

    match customer::find_by_email(pool, &email).await? {
        Some(existing) => attach_to_existing(pool, existing, info).await,
        None => match customer::create_shadow(
            pool,
            &email,
            &info.first_name,
            &info.last_name,
            &info.phone,
        )
        .await
        {
            Ok(created) => {
                tracing::info!(customer_id = created.id, "Created shadow identity for guest checkout");
                Ok(ResolvedIdentity {
                    customer_id: created.id,
                    is_guest: true,
                })
            }
            // Lost a race to a concurrent checkout with the same email
            Err(e) if e.is_duplicate() => {
                let existing = customer::find_by_email(pool, &email)
                    .await?
                    .ok_or_else(|| {
                        AppError::Database("Customer vanished after duplicate email".into())
                    })?;
                attach_to_existing(pool, existing, info).await
            }
            Err(e) => Err(e.into()),
        },
    }
}

async fn attach_to_existing(
    pool: &SqlitePool,
    existing: shared::models::Customer,
    info: &GuestInfo,
) -> AppResult<ResolvedIdentity> {
    if !existing.is_shadow() {
        // Never silently attach an order to someone else's account
        return Err(AppError::Conflict(
            "An account with this email already exists. Please sign in to place your order."
                .to_string(),
        ));
    }

    customer::refresh_shadow_contact(
        pool,
        existing.id,
        &info.first_name,
        &info.last_name,
        &info.phone,
    )
    .await?;

    Ok(ResolvedIdentity {
        customer_id: existing.id,
        is_guest: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    fn guest(email: &str, first: &str) -> GuestInfo {
        GuestInfo {
            email: email.to_string(),
            first_name: first.to_string(),
            last_name: "Pérez".to_string(),
            phone: "600111222".to_string(),
        }
    }

    async fn insert_real_account(pool: &SqlitePool, email: &str) -> i64 {
        let id = shared::util::snowflake_id();
        sqlx::query(
            "INSERT INTO customer (id, email, first_name, last_name, phone, password_hash, created_at, updated_at) \
             VALUES (?1, ?2, 'Ana', 'Pérez', NULL, 'argon2-hash', 0, 0)",
        )
        .bind(id)
        .bind(email)
        .execute(pool)
        .await
        .unwrap();
        id
    }

    #[tokio::test]
    async fn test_new_guest_creates_shadow_identity() {
        let pool = test_pool().await;
        let resolved = resolve(&pool, None, Some(&guest("ana@example.com", "Ana")))
            .await
            .unwrap();
        assert!(resolved.is_guest);

        let customer = customer::find_by_id(&pool, resolved.customer_id)
            .await
            .unwrap()
            .unwrap();
        assert!(customer.is_shadow());
        assert_eq!(customer.email, "ana@example.com");
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent_per_email() {
        let pool = test_pool().await;
        let first = resolve(&pool, None, Some(&guest("Ana@Example.com ", "Ana")))
            .await
            .unwrap();
        let second = resolve(&pool, None, Some(&guest("ana@example.com", "Anita")))
            .await
            .unwrap();
        assert_eq!(first.customer_id, second.customer_id);

        // Shadow identities track the latest supplied contact info
        let customer = customer::find_by_id(&pool, second.customer_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.first_name, "Anita");
    }

    #[tokio::test]
    async fn test_real_account_collision_is_a_conflict() {
        let pool = test_pool().await;
        insert_real_account(&pool, "ana@example.com").await;

        let err = resolve(&pool, None, Some(&guest("ana@example.com", "Ana")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_authenticated_identity_used_directly() {
        let pool = test_pool().await;
        let id = insert_real_account(&pool, "ana@example.com").await;

        let resolved = resolve(&pool, Some(id), None).await.unwrap();
        assert_eq!(resolved.customer_id, id);
        assert!(!resolved.is_guest);
    }

    #[tokio::test]
    async fn test_unknown_authenticated_identity_rejected() {
        let pool = test_pool().await;
        let err = resolve(&pool, Some(42), None).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_missing_guest_info_requires_auth() {
        let pool = test_pool().await;
        let err = resolve(&pool, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn test_malformed_email_rejected() {
        let pool = test_pool().await;
        let err = resolve(&pool, None, Some(&guest("not-an-email", "Ana")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
