//! `jobhawk-hh` — hh.ru API adapter.
//!
//! [`HhClient`] implements the engine's [`jobhawk_core::types::JobApi`]
//! seam: paginated vacancy search, multipart negotiation submit, plus the
//! resume and experience-dictionary listings the front end needs.
//! [`refresh::HhRefresher`] implements the credential-refresh half of the
//! OAuth lifecycle (the authorization-code web flow is out of scope).

pub mod client;
pub mod error;
pub mod refresh;
pub mod types;

pub use client::HhClient;
pub use error::{HhError, Result};
pub use refresh::HhRefresher;
