use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Telegram numeric user id — the key every store and adapter shares.
pub type UserId = i64;

/// Default daily submission cap for a freshly created preferences row.
pub const DEFAULT_DAILY_QUOTA: u32 = 10;
/// Inclusive bounds accepted when a user edits their daily quota.
pub const MIN_DAILY_QUOTA: u32 = 1;
pub const MAX_DAILY_QUOTA: u32 = 100;

/// Cover letter sent with a response when the user has not written one.
pub const DEFAULT_COVER_LETTER: &str = "Hello! I would like to apply for this vacancy.";

/// Bearer credential for one user against the job provider.
///
/// One row per user; a refresh replaces the whole row including
/// `refresh_token` (the provider rotates it on every grant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    /// True when the access token can no longer be used as-is.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Per-user search and auto-apply preferences.
///
/// `get` on the store never fails: a user without a row gets these
/// defaults, and a "clear" resets the row back to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Master switch — disabled users cost the sweep nothing past the
    /// credential lookup.
    pub enabled: bool,
    /// Provider-side resume id. Required before `enabled` can be set.
    pub resume_id: Option<String>,
    pub cover_letter: String,
    /// Search keywords; order-irrelevant, stored comma-joined.
    pub keywords: Vec<String>,
    pub min_salary: Option<u32>,
    /// Provider experience-bucket ids. `None` means no filter.
    pub experience: Option<Vec<String>>,
    /// Submissions allowed per UTC day, 1–100.
    pub daily_quota: u32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            enabled: false,
            resume_id: None,
            cover_letter: DEFAULT_COVER_LETTER.to_string(),
            keywords: Vec::new(),
            min_salary: None,
            experience: None,
            daily_quota: DEFAULT_DAILY_QUOTA,
        }
    }
}

impl Preferences {
    /// A row may only be enabled once it can actually drive a submission.
    pub fn ready_to_apply(&self) -> bool {
        self.resume_id.is_some() && !self.keywords.is_empty()
    }
}

/// One vacancy as returned by the provider's search endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub id: String,
    /// Display name shown to the user in notifications.
    pub name: String,
    /// Canonical web URL of the posting.
    pub url: String,
    /// Postings with a mandatory prescreening test are never auto-submitted.
    pub requires_test: bool,
}

/// Errors surfaced by the remote job API adapter.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The provider demands a prescreening test for this vacancy.
    #[error("prescreening test required")]
    TestRequired,

    #[error("provider API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("unexpected response shape: {0}")]
    Parse(String),
}

/// Remote job-provider operations the engine consumes.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Search vacancies matching `prefs`, in provider relevance order.
    async fn search(
        &self,
        access_token: &str,
        prefs: &Preferences,
    ) -> Result<Vec<Posting>, ApiError>;

    /// Submit a response to one vacancy.
    async fn apply(
        &self,
        access_token: &str,
        posting_id: &str,
        resume_id: &str,
        message: &str,
    ) -> Result<(), ApiError>;
}

/// Obtains a fresh credential for a user whose token has expired.
///
/// `None` means unrecoverable for this sweep: no stored credential to
/// refresh from, or the provider rejected the refresh. The caller skips
/// the user and retries implicitly on the next sweep.
#[async_trait]
pub trait CredentialRefresher: Send + Sync {
    async fn refresh(&self, user_id: UserId) -> Option<Credential>;
}

/// Fire-and-forget user notification channel. Failures are the
/// implementation's problem; the engine never depends on delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, user_id: UserId, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn credential_expiry_is_inclusive() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let cred = Credential {
            user_id: 1,
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: at,
        };
        assert!(cred.is_expired(at));
        assert!(cred.is_expired(at + chrono::Duration::seconds(1)));
        assert!(!cred.is_expired(at - chrono::Duration::seconds(1)));
    }

    #[test]
    fn defaults_are_not_ready_to_apply() {
        let prefs = Preferences::default();
        assert!(!prefs.enabled);
        assert_eq!(prefs.daily_quota, DEFAULT_DAILY_QUOTA);
        assert!(!prefs.ready_to_apply());
    }

    #[test]
    fn ready_needs_both_resume_and_keywords() {
        let mut prefs = Preferences {
            resume_id: Some("res-1".into()),
            ..Preferences::default()
        };
        assert!(!prefs.ready_to_apply());
        prefs.keywords = vec!["rust".into()];
        assert!(prefs.ready_to_apply());
    }
}
