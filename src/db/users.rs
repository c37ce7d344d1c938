//! User accounts: registration, password verification, tier changes.
//! Accounts are soft-disabled via the `active` flag, never deleted.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::password_hash::rand_core::OsRng;
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, Row, params};
use tracing::info;

use crate::core::tier::SubscriptionTier;
use crate::db::pool::DbPool;
use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub tier: SubscriptionTier,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<(User, String)> {
    let tier_str: String = row.get("tier")?;
    let created_at: String = row.get("created_at")?;
    let user = User {
        id: row.get("id")?,
        email: row.get("email")?,
        tier: tier_str.parse().unwrap_or(SubscriptionTier::Free),
        active: row.get::<_, i64>("active")? != 0,
        created_at: created_at
            .parse::<DateTime<Utc>>()
            .unwrap_or_else(|_| Utc::now()),
    };
    Ok((user, row.get("password")?))
}

#[derive(Clone)]
pub struct UserStore {
    pool: DbPool,
}

impl UserStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Register a new account at the Free tier.
    pub fn create(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = email.trim().to_lowercase();
        let malformed = email.is_empty()
            || !email.contains('@')
            || email
                .chars()
                .any(|c| c.is_whitespace() || matches!(c, '<' | '>' | '"' | '\'' | '&'));
        if malformed {
            return Err(AppError::BadRequest("invalid email address".to_string()));
        }
        if password.len() < 8 {
            return Err(AppError::BadRequest(
                "password must be at least 8 characters".to_string(),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(e.to_string()))?
            .to_string();

        let conn = self.pool.get()?;
        let created_at = Utc::now();
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO users (email, password, tier, active, created_at)
             VALUES (?1, ?2, ?3, 1, ?4)",
            params![
                email,
                hash,
                SubscriptionTier::Free.to_string(),
                created_at.to_rfc3339()
            ],
        )?;
        if inserted == 0 {
            return Err(AppError::BadRequest("email already registered".to_string()));
        }

        info!(email, "Registered new user");
        Ok(User {
            id: conn.last_insert_rowid(),
            email,
            tier: SubscriptionTier::Free,
            active: true,
            created_at,
        })
    }

    /// Verify credentials. Inactive accounts never authenticate.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Option<User>, AppError> {
        let email = email.trim().to_lowercase();
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT id, email, password, tier, active, created_at FROM users WHERE email = ?1",
                params![email],
                user_from_row,
            )
            .optional()?;

        let Some((user, stored_hash)) = row else {
            return Ok(None);
        };
        if !user.active {
            return Ok(None);
        }

        let parsed = match PasswordHash::new(&stored_hash) {
            Ok(parsed) => parsed,
            Err(_) => return Ok(None),
        };
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub fn find(&self, id: i64) -> Result<Option<User>, AppError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT id, email, password, tier, active, created_at FROM users WHERE id = ?1",
                params![id],
                user_from_row,
            )
            .optional()?;
        Ok(row.map(|(user, _)| user))
    }

    pub fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT id, email, password, tier, active, created_at FROM users WHERE email = ?1",
                params![email.trim().to_lowercase()],
                user_from_row,
            )
            .optional()?;
        Ok(row.map(|(user, _)| user))
    }

    /// Total and active account counts, for the admin stats endpoint.
    pub fn count(&self) -> Result<(i64, i64), AppError> {
        let conn = self.pool.get()?;
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        let active: i64 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE active = 1",
            [],
            |row| row.get(0),
        )?;
        Ok((total, active))
    }

    /// Admin operation: change a user's subscription tier.
    pub fn set_tier(&self, id: i64, tier: SubscriptionTier) -> Result<(), AppError> {
        let conn = self.pool.get()?;
        let updated = conn.execute(
            "UPDATE users SET tier = ?1 WHERE id = ?2",
            params![tier.to_string(), id],
        )?;
        if updated == 0 {
            return Err(AppError::NotFound(format!("no user with id {id}")));
        }
        info!(user_id = id, %tier, "Updated subscription tier");
        Ok(())
    }

    /// Soft-disable an account. The row is kept.
    pub fn deactivate(&self, id: i64) -> Result<(), AppError> {
        let conn = self.pool.get()?;
        let updated = conn.execute("UPDATE users SET active = 0 WHERE id = ?1", params![id])?;
        if updated == 0 {
            return Err(AppError::NotFound(format!("no user with id {id}")));
        }
        info!(user_id = id, "Deactivated user");
        Ok(())
    }
}
