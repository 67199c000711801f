use thiserror::Error;

use jobhawk_core::types::ApiError;
use jobhawk_store::StoreError;

/// Errors inside one user's sweep. Always caught at the per-user
/// boundary — `run_once` itself never fails.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("job API error: {0}")]
    Api(#[from] ApiError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
