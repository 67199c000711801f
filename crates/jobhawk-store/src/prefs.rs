use std::sync::Mutex;

use rusqlite::Connection;

use jobhawk_core::types::{Preferences, UserId, MAX_DAILY_QUOTA, MIN_DAILY_QUOTA};

use crate::error::{Result, StoreError};

/// Sentinel experience id meaning "no filter" — selecting it clears the
/// stored bucket list.
pub const EXPERIENCE_ALL: &str = "all";

/// Durable user → search/apply preferences mapping.
///
/// Rows are created lazily with defaults on first read and are never
/// deleted — `clear` resets the row in place. This is also the edit
/// layer: enabling auto-apply and changing the quota are validated here,
/// so the engine can assume `enabled == true` implies a usable row.
pub struct PreferenceStore {
    db: Mutex<Connection>,
}

impl PreferenceStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Never fails with "not found": an absent row reads as defaults.
    pub fn get(&self, user_id: UserId) -> Result<Preferences> {
        let db = self.db.lock().unwrap();
        let row = db
            .query_row(
                "SELECT enabled, resume_id, cover_letter, keywords,
                        min_salary, experience, daily_quota
                 FROM preferences WHERE user_id = ?1",
                [user_id],
                |row| {
                    Ok(Preferences {
                        enabled: row.get::<_, i64>(0)? != 0,
                        resume_id: row.get(1)?,
                        cover_letter: row.get(2)?,
                        keywords: split_list(&row.get::<_, String>(3)?),
                        min_salary: row.get(4)?,
                        experience: row.get::<_, Option<String>>(5)?.map(|s| split_list(&s)),
                        daily_quota: row.get(6)?,
                    })
                },
            )
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(Preferences::default()),
                other => Err(other),
            })?;
        Ok(row)
    }

    /// Upsert the whole row.
    pub fn set(&self, user_id: UserId, prefs: &Preferences) -> Result<()> {
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO preferences
             (user_id, enabled, resume_id, cover_letter, keywords, min_salary, experience, daily_quota)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(user_id) DO UPDATE SET
                 enabled = excluded.enabled,
                 resume_id = excluded.resume_id,
                 cover_letter = excluded.cover_letter,
                 keywords = excluded.keywords,
                 min_salary = excluded.min_salary,
                 experience = excluded.experience,
                 daily_quota = excluded.daily_quota",
            rusqlite::params![
                user_id,
                prefs.enabled as i64,
                prefs.resume_id,
                prefs.cover_letter,
                join_list(&prefs.keywords),
                prefs.min_salary,
                prefs.experience.as_deref().map(join_list),
                prefs.daily_quota,
            ],
        )?;
        Ok(())
    }

    /// Flip the auto-apply switch. Enabling is rejected until the row can
    /// actually drive a submission (resume + keywords present).
    pub fn set_enabled(&self, user_id: UserId, enabled: bool) -> Result<Preferences> {
        let mut prefs = self.get(user_id)?;
        if enabled && !prefs.ready_to_apply() {
            return Err(StoreError::NotReadyToApply);
        }
        prefs.enabled = enabled;
        self.set(user_id, &prefs)?;
        Ok(prefs)
    }

    pub fn set_resume(&self, user_id: UserId, resume_id: &str) -> Result<()> {
        let mut prefs = self.get(user_id)?;
        prefs.resume_id = Some(resume_id.to_string());
        self.set(user_id, &prefs)
    }

    /// Keywords may arrive whitespace- or comma-separated from the front
    /// end; both split into the same set.
    pub fn set_keywords(&self, user_id: UserId, raw: &str) -> Result<()> {
        let mut prefs = self.get(user_id)?;
        prefs.keywords = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        self.set(user_id, &prefs)
    }

    pub fn set_cover_letter(&self, user_id: UserId, text: &str) -> Result<()> {
        let mut prefs = self.get(user_id)?;
        prefs.cover_letter = text.to_string();
        self.set(user_id, &prefs)
    }

    pub fn set_min_salary(&self, user_id: UserId, min_salary: Option<u32>) -> Result<()> {
        let mut prefs = self.get(user_id)?;
        prefs.min_salary = min_salary;
        self.set(user_id, &prefs)
    }

    /// Replace the experience filter. The [`EXPERIENCE_ALL`] sentinel (or
    /// an empty selection) clears it.
    pub fn set_experience(&self, user_id: UserId, buckets: Vec<String>) -> Result<()> {
        let mut prefs = self.get(user_id)?;
        prefs.experience = if buckets.is_empty() || buckets.iter().any(|b| b == EXPERIENCE_ALL) {
            None
        } else {
            Some(buckets)
        };
        self.set(user_id, &prefs)
    }

    pub fn set_daily_quota(&self, user_id: UserId, quota: u32) -> Result<()> {
        if !(MIN_DAILY_QUOTA..=MAX_DAILY_QUOTA).contains(&quota) {
            return Err(StoreError::QuotaOutOfRange(quota));
        }
        let mut prefs = self.get(user_id)?;
        prefs.daily_quota = quota;
        self.set(user_id, &prefs)
    }

    /// Reset the row to defaults (the row itself is kept).
    pub fn clear(&self, user_id: UserId) -> Result<()> {
        self.set(user_id, &Preferences::default())
    }
}

fn join_list(items: &[String]) -> String {
    items.join(",")
}

fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|x| !x.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;

    fn store() -> PreferenceStore {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        PreferenceStore::new(conn)
    }

    #[test]
    fn missing_row_reads_as_defaults() {
        let prefs = store().get(1).unwrap();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn set_then_get_round_trips() {
        let store = store();
        let prefs = Preferences {
            enabled: true,
            resume_id: Some("res-1".into()),
            cover_letter: "hi".into(),
            keywords: vec!["rust".into(), "backend".into()],
            min_salary: Some(200_000),
            experience: Some(vec!["between1And3".into()]),
            daily_quota: 25,
        };
        store.set(9, &prefs).unwrap();
        assert_eq!(store.get(9).unwrap(), prefs);
    }

    #[test]
    fn enable_rejected_without_resume_and_keywords() {
        let store = store();
        assert!(matches!(
            store.set_enabled(1, true),
            Err(StoreError::NotReadyToApply)
        ));

        store.set_resume(1, "res-1").unwrap();
        assert!(matches!(
            store.set_enabled(1, true),
            Err(StoreError::NotReadyToApply)
        ));

        store.set_keywords(1, "rust").unwrap();
        let prefs = store.set_enabled(1, true).unwrap();
        assert!(prefs.enabled);
    }

    #[test]
    fn disable_always_allowed() {
        let store = store();
        let prefs = store.set_enabled(1, false).unwrap();
        assert!(!prefs.enabled);
    }

    #[test]
    fn keywords_split_on_commas_and_whitespace() {
        let store = store();
        store.set_keywords(1, "rust, backend  tokio,").unwrap();
        assert_eq!(
            store.get(1).unwrap().keywords,
            vec!["rust", "backend", "tokio"]
        );
    }

    #[test]
    fn experience_all_sentinel_clears_filter() {
        let store = store();
        store
            .set_experience(1, vec!["between1And3".into()])
            .unwrap();
        assert!(store.get(1).unwrap().experience.is_some());

        store
            .set_experience(1, vec![EXPERIENCE_ALL.to_string()])
            .unwrap();
        assert!(store.get(1).unwrap().experience.is_none());
    }

    #[test]
    fn quota_range_is_enforced() {
        let store = store();
        assert!(matches!(
            store.set_daily_quota(1, 0),
            Err(StoreError::QuotaOutOfRange(0))
        ));
        assert!(matches!(
            store.set_daily_quota(1, 101),
            Err(StoreError::QuotaOutOfRange(101))
        ));
        store.set_daily_quota(1, 100).unwrap();
        assert_eq!(store.get(1).unwrap().daily_quota, 100);
    }

    #[test]
    fn clear_resets_to_defaults() {
        let store = store();
        store.set_resume(1, "res-1").unwrap();
        store.set_keywords(1, "rust").unwrap();
        store.set_enabled(1, true).unwrap();
        store.clear(1).unwrap();
        assert_eq!(store.get(1).unwrap(), Preferences::default());
    }
}
