//! `jobhawk-store` — SQLite persistence for credentials, preferences and
//! the submission ledger.
//!
//! Each store wraps its own `Mutex<Connection>` so subsystems can run on
//! separate connections against the same database file. All instants are
//! stored as RFC-3339 strings in UTC.
//!
//! The ledger carries the idempotency guarantee of the whole system: a
//! `(user_id, posting_id)` pair is inserted at most once, and the per-user
//! applied-count tracker resets lazily at read time when its UTC day has
//! rolled over (no midnight cron).

pub mod credentials;
pub mod db;
pub mod error;
pub mod ledger;
pub mod prefs;

pub use credentials::CredentialStore;
pub use error::{Result, StoreError};
pub use ledger::SubmissionLedger;
pub use prefs::PreferenceStore;
