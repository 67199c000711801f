use std::sync::Mutex;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use rusqlite::Connection;
use tracing::warn;

use jobhawk_core::types::UserId;

use crate::error::Result;

/// Durable record of submissions already made, plus the per-user
/// applied-today tracker.
///
/// The `(user_id, posting_id)` primary key is the single source of truth
/// for "already submitted"; `mark_applied` is an idempotent insert so a
/// sweep abandoned mid-flight is safe to resume.
pub struct SubmissionLedger {
    db: Mutex<Connection>,
}

impl SubmissionLedger {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    pub fn is_applied(&self, user_id: UserId, posting_id: &str) -> Result<bool> {
        let db = self.db.lock().unwrap();
        let found = db
            .query_row(
                "SELECT 1 FROM submissions WHERE user_id = ?1 AND posting_id = ?2",
                rusqlite::params![user_id, posting_id],
                |_| Ok(()),
            )
            .map(|_| true)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(false),
                other => Err(other),
            })?;
        Ok(found)
    }

    /// Idempotent: a duplicate insert is a no-op, never an error.
    pub fn mark_applied(&self, user_id: UserId, posting_id: &str) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT OR IGNORE INTO submissions (user_id, posting_id) VALUES (?1, ?2)",
            rusqlite::params![user_id, posting_id],
        )?;
        Ok(())
    }

    /// Raw tracker state: `(count, last_applied)`, or `(0, now)` when the
    /// user has no tracker row yet. Callers apply [`effective_count`] before
    /// comparing against a quota.
    pub fn applied_count(&self, user_id: UserId) -> Result<(u32, DateTime<Utc>)> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                "SELECT count, last_applied FROM applied_counts WHERE user_id = ?1",
                [user_id],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, String>(1)?)),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(other),
            })?;

        match row {
            Some((count, stamp)) => match DateTime::parse_from_rfc3339(&stamp) {
                Ok(dt) => Ok((count, dt.with_timezone(&Utc))),
                Err(e) => {
                    warn!(user_id, %stamp, "tracker row has bad timestamp: {e}");
                    Ok((0, Utc::now()))
                }
            },
            None => Ok((0, Utc::now())),
        }
    }

    /// Upsert the tracker, stamping `last_applied` to the current instant.
    /// Called after every successful submission so a crash mid-sweep does
    /// not lose quota accounting.
    pub fn set_applied_count(&self, user_id: UserId, count: u32) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO applied_counts (user_id, count, last_applied)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(user_id) DO UPDATE SET
                 count = excluded.count,
                 last_applied = excluded.last_applied",
            rusqlite::params![user_id, count, now],
        )?;
        Ok(())
    }
}

/// Lazy day-rollover rule: the stored count is honored only when
/// `last_applied` falls on *today* (UTC, boundary at 00:00). Anything from
/// yesterday-or-earlier reads as 0; the row itself is untouched until the
/// next successful submission rewrites it.
pub fn effective_count(count: u32, last_applied: DateTime<Utc>, now: DateTime<Utc>) -> u32 {
    let today_boundary = now.date_naive().and_time(NaiveTime::MIN).and_utc();
    let yesterday_boundary = today_boundary - Duration::hours(24);
    let last_day = last_applied.date_naive().and_time(NaiveTime::MIN).and_utc();
    if last_day <= yesterday_boundary {
        0
    } else {
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use chrono::TimeZone;

    fn ledger() -> SubmissionLedger {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        SubmissionLedger::new(conn)
    }

    #[test]
    fn mark_applied_is_idempotent() {
        let ledger = ledger();
        ledger.mark_applied(1, "v-100").unwrap();
        ledger.mark_applied(1, "v-100").unwrap();
        assert!(ledger.is_applied(1, "v-100").unwrap());

        let db = ledger.db.lock().unwrap();
        let n: u32 = db
            .query_row("SELECT COUNT(*) FROM submissions", [], |r| r.get(0))
            .unwrap();
        assert_eq!(n, 1);
    }

    #[test]
    fn pairs_are_scoped_per_user() {
        let ledger = ledger();
        ledger.mark_applied(1, "v-100").unwrap();
        assert!(!ledger.is_applied(2, "v-100").unwrap());
        assert!(!ledger.is_applied(1, "v-200").unwrap());
    }

    #[test]
    fn missing_tracker_reads_zero_now() {
        let ledger = ledger();
        let (count, last_applied) = ledger.applied_count(5).unwrap();
        assert_eq!(count, 0);
        assert!((Utc::now() - last_applied).num_seconds() < 5);
    }

    #[test]
    fn tracker_upsert_round_trips() {
        let ledger = ledger();
        ledger.set_applied_count(5, 3).unwrap();
        ledger.set_applied_count(5, 4).unwrap();
        let (count, last_applied) = ledger.applied_count(5).unwrap();
        assert_eq!(count, 4);
        assert!((Utc::now() - last_applied).num_seconds() < 5);
    }

    #[test]
    fn rollover_same_day_keeps_count() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 15, 30, 0).unwrap();
        let ten_min_ago = now - Duration::minutes(10);
        assert_eq!(effective_count(7, ten_min_ago, now), 7);
    }

    #[test]
    fn rollover_midnight_same_day_keeps_count() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 23, 59, 0).unwrap();
        let this_morning = Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap();
        assert_eq!(effective_count(7, this_morning, now), 7);
    }

    #[test]
    fn rollover_yesterday_resets() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 0, 5, 0).unwrap();
        let last_night = Utc.with_ymd_and_hms(2025, 6, 9, 23, 55, 0).unwrap();
        assert_eq!(effective_count(7, last_night, now), 0);
    }

    #[test]
    fn rollover_two_days_ago_resets() {
        let now = Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap();
        let two_days_ago = now - Duration::days(2);
        assert_eq!(effective_count(7, two_days_ago, now), 0);
    }
}
