//! `jobhawk-engine` — the application scheduling and submission engine.
//!
//! [`engine::ApplicationEngine::run_once`] performs one sweep over every
//! user with a stored credential: refresh the credential if needed, fetch
//! matching postings, filter by ledger / quota / eligibility, submit, and
//! record outcomes. No single user's failure ever aborts the sweep.
//!
//! [`sweeper::Sweeper`] drives `run_once` on a fixed interval,
//! run → sleep → run, so sweeps can overrun their interval but never
//! overlap.

pub mod engine;
pub mod error;
pub mod sweeper;

pub use engine::ApplicationEngine;
pub use error::{EngineError, Result};
pub use sweeper::Sweeper;
