//! Error types for filament
//!
//! Every fallible operation in the crate returns [`Result<T>`], an alias over
//! [`FilamentError`]. Collaborator implementations map their backend failures
//! onto [`FilamentError::StoreUnavailable`]; the engine itself never retries,
//! it propagates.

use thiserror::Error;

/// Errors surfaced by lineage operations and the bundled in-memory stores.
#[derive(Error, Debug)]
pub enum FilamentError {
    /// A collaborator backing store could not be reached or failed mid-query.
    #[error("relation store unavailable: {0}")]
    StoreUnavailable(String),

    /// A rollup selector string was not recognized.
    #[error("unknown rollup type '{0}'")]
    UnknownRollup(String),

    /// A relation's data entity and program belong to different namespaces.
    #[error("namespace mismatch: data entity '{data}' vs program '{program}'")]
    NamespaceMismatch {
        /// Display form of the offending data entity.
        data: String,
        /// Display form of the offending program.
        program: String,
    },
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FilamentError>;
