use thiserror::Error;

/// Errors from the persistence layer, including the preference edit rules.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Underlying SQLite / rusqlite error.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Auto-apply cannot be enabled before a resume and keywords are set.
    #[error("cannot enable auto-apply: resume and search keywords must be set first")]
    NotReadyToApply,

    /// Daily quota outside the accepted 1–100 range.
    #[error("daily quota {0} out of range (1-100)")]
    QuotaOutOfRange(u32),
}

pub type Result<T> = std::result::Result<T, StoreError>;
