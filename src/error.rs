//! Crate-level error taxonomy.
//!
//! Unknown neighborhoods are not errors (they resolve to the fallback point)
//! and an empty schedule is a normal branch, so neither appears here.

use crate::config::ConfigError;
use crate::storage::StorageError;

#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Bad time/date format or a missing required field.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    #[error("unknown client '{0}'")]
    UnknownClient(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
