//! `jobhawk-core` — shared types, port traits and configuration.
//!
//! Everything the other crates agree on lives here: the domain types
//! ([`types::Credential`], [`types::Preferences`], [`types::Posting`]),
//! the seams the engine is wired through ([`types::JobApi`],
//! [`types::CredentialRefresher`], [`types::Notifier`]) and the
//! figment-backed [`config::JobhawkConfig`].

pub mod config;
pub mod error;
pub mod types;

pub use error::{JobhawkError, Result};
