use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use rusqlite::Connection;
use tracing::warn;

use jobhawk_core::types::{Credential, UserId};

use crate::error::Result;

/// Durable user → bearer credential mapping. One row per user, full-row
/// upsert on save (the provider rotates the refresh token on every grant).
pub struct CredentialStore {
    db: Mutex<Connection>,
}

impl CredentialStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    pub fn get(&self, user_id: UserId) -> Result<Option<Credential>> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                "SELECT user_id, access_token, refresh_token, expires_at
                 FROM credentials WHERE user_id = ?1",
                [user_id],
                row_to_parts,
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;
        Ok(row.and_then(parts_to_credential))
    }

    /// Upsert the credential for `user_id`; `expires_in_secs` is the TTL the
    /// provider returned with the grant.
    pub fn save(
        &self,
        user_id: UserId,
        access_token: &str,
        refresh_token: &str,
        expires_in_secs: i64,
    ) -> Result<()> {
        let expires_at = (Utc::now() + Duration::seconds(expires_in_secs)).to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO credentials (user_id, access_token, refresh_token, expires_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(user_id) DO UPDATE SET
                 access_token = excluded.access_token,
                 refresh_token = excluded.refresh_token,
                 expires_at = excluded.expires_at",
            rusqlite::params![user_id, access_token, refresh_token, expires_at],
        )?;
        Ok(())
    }

    /// Snapshot of every stored credential — the sweep's user enumeration.
    pub fn all(&self) -> Result<Vec<Credential>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT user_id, access_token, refresh_token, expires_at
             FROM credentials ORDER BY user_id",
        )?;
        let creds = stmt
            .query_map([], row_to_parts)?
            .filter_map(|r| r.ok())
            .filter_map(parts_to_credential)
            .collect();
        Ok(creds)
    }
}

type CredentialParts = (UserId, String, String, String);

fn row_to_parts(row: &rusqlite::Row<'_>) -> rusqlite::Result<CredentialParts> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

/// Rows with an unparseable expiry are dropped with a warning rather than
/// failing the whole enumeration.
fn parts_to_credential(
    (user_id, access_token, refresh_token, expires_at): CredentialParts,
) -> Option<Credential> {
    match DateTime::parse_from_rfc3339(&expires_at) {
        Ok(dt) => Some(Credential {
            user_id,
            access_token,
            refresh_token,
            expires_at: dt.with_timezone(&Utc),
        }),
        Err(e) => {
            warn!(user_id, %expires_at, "credential row has bad expiry: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn store() -> CredentialStore {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        CredentialStore::new(conn)
    }

    #[test]
    fn get_missing_is_none() {
        assert!(store().get(42).unwrap().is_none());
    }

    #[test]
    fn save_then_get_round_trips() {
        let store = store();
        store.save(7, "acc", "ref", 3600).unwrap();
        let cred = store.get(7).unwrap().expect("credential stored");
        assert_eq!(cred.access_token, "acc");
        assert_eq!(cred.refresh_token, "ref");
        assert!(!cred.is_expired(Utc::now()));
    }

    #[test]
    fn save_replaces_whole_row() {
        let store = store();
        store.save(7, "acc1", "ref1", 3600).unwrap();
        store.save(7, "acc2", "ref2", 3600).unwrap();
        let cred = store.get(7).unwrap().unwrap();
        assert_eq!(cred.access_token, "acc2");
        // Refresh tokens rotate: the old one must not survive.
        assert_eq!(cred.refresh_token, "ref2");
        assert_eq!(store.all().unwrap().len(), 1);
    }

    #[test]
    fn zero_ttl_is_expired() {
        let store = store();
        store.save(7, "acc", "ref", 0).unwrap();
        let cred = store.get(7).unwrap().unwrap();
        assert!(cred.is_expired(Utc::now()));
    }

    #[test]
    fn all_enumerates_every_user() {
        let store = store();
        store.save(1, "a", "r", 3600).unwrap();
        store.save(2, "a", "r", 3600).unwrap();
        store.save(3, "a", "r", 3600).unwrap();
        let ids: Vec<_> = store.all().unwrap().iter().map(|c| c.user_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
