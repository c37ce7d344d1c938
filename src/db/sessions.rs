//! Server-side sessions: opaque uuid tokens stored in SQLite with an
//! absolute expiry.

use chrono::{DateTime, Duration, Utc};
use rusqlite::{OptionalExtension, params};
use tracing::debug;
use uuid::Uuid;

use crate::core::tier::SubscriptionTier;
use crate::db::pool::DbPool;
use crate::db::users::User;
use crate::error::AppError;

#[derive(Clone)]
pub struct SessionStore {
    pool: DbPool,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(pool: DbPool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    pub fn create(&self, user_id: i64) -> Result<String, AppError> {
        let token = Uuid::new_v4().simple().to_string();
        let expires_at = Utc::now() + self.ttl;
        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id, expires_at.to_rfc3339()],
        )?;
        // Opportunistic cleanup of expired rows.
        conn.execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![Utc::now().to_rfc3339()],
        )?;
        debug!(user_id, "Created session");
        Ok(token)
    }

    /// Resolve a token to its user. Expired sessions and deactivated
    /// users resolve to `None`.
    pub fn resolve(&self, token: &str) -> Result<Option<User>, AppError> {
        let conn = self.pool.get()?;
        let row = conn
            .query_row(
                "SELECT u.id, u.email, u.tier, u.active, u.created_at, s.expires_at
                 FROM sessions s JOIN users u ON u.id = s.user_id
                 WHERE s.token = ?1",
                params![token],
                |row| {
                    let tier: String = row.get("tier")?;
                    let created_at: String = row.get("created_at")?;
                    let expires_at: String = row.get("expires_at")?;
                    Ok((
                        User {
                            id: row.get("id")?,
                            email: row.get("email")?,
                            tier: tier.parse().unwrap_or(SubscriptionTier::Free),
                            active: row.get::<_, i64>("active")? != 0,
                            created_at: created_at
                                .parse::<DateTime<Utc>>()
                                .unwrap_or_else(|_| Utc::now()),
                        },
                        expires_at,
                    ))
                },
            )
            .optional()?;

        let Some((user, expires_at)) = row else {
            return Ok(None);
        };
        let expired = expires_at
            .parse::<DateTime<Utc>>()
            .map(|t| t < Utc::now())
            .unwrap_or(true);
        if expired || !user.active {
            return Ok(None);
        }
        Ok(Some(user))
    }

    pub fn delete(&self, token: &str) -> Result<(), AppError> {
        let conn = self.pool.get()?;
        conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::open_pool;
    use crate::db::users::UserStore;

    fn stores(ttl: Duration) -> (UserStore, SessionStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let pool = open_pool(&dir.path().join("test.db"), 2).unwrap();
        (
            UserStore::new(pool.clone()),
            SessionStore::new(pool, ttl),
            dir,
        )
    }

    #[test]
    fn test_session_round_trip() {
        let (users, sessions, _dir) = stores(Duration::hours(1));
        let user = users.create("kari@example.no", "password123").unwrap();

        let token = sessions.create(user.id).unwrap();
        let resolved = sessions.resolve(&token).unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.email, "kari@example.no");

        sessions.delete(&token).unwrap();
        assert!(sessions.resolve(&token).unwrap().is_none());
    }

    #[test]
    fn test_unknown_token_resolves_to_none() {
        let (_users, sessions, _dir) = stores(Duration::hours(1));
        assert!(sessions.resolve("no-such-token").unwrap().is_none());
    }

    #[test]
    fn test_expired_session_resolves_to_none() {
        let (users, sessions, _dir) = stores(Duration::seconds(-1));
        let user = users.create("kari@example.no", "password123").unwrap();
        let token = sessions.create(user.id).unwrap();
        assert!(sessions.resolve(&token).unwrap().is_none());
    }

    #[test]
    fn test_deactivated_user_session_resolves_to_none() {
        let (users, sessions, _dir) = stores(Duration::hours(1));
        let user = users.create("kari@example.no", "password123").unwrap();
        let token = sessions.create(user.id).unwrap();
        users.deactivate(user.id).unwrap();
        assert!(sessions.resolve(&token).unwrap().is_none());
    }
}
