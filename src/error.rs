//! Error types surfaced by the matching engine.

use thiserror::Error;

/// The closed set of failures the engine can report.
///
/// `Remove`, `Sweep` and `Match` never fail: they tolerate absent or
/// state-incompatible players by silently skipping them. Only the
/// operations in the API contract table below return one of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    #[error("player already exists: {0}")]
    PlayerAlreadyExists(String),

    #[error("player does not exist: {0}")]
    PlayerNotExists(String),

    #[error("player already matched: {0}")]
    PlayerAlreadyMatched(String),

    #[error("player not matched: {0}")]
    PlayerNotMatched(String),

    #[error("configuration rejected: {0}")]
    ConfigurationRejected(String),
}

pub type Result<T> = std::result::Result<T, MatchError>;
