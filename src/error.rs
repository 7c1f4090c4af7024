use thiserror::Error;

/// Errors surfaced by schema accumulation, reference tracing, and planning.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("entry not found: {0}")]
    EntryNotFound(String),

    #[error("referenced entry was dropped: {0}")]
    ReentryDropped(String),

    #[error("foreign key reference not found: {table}.{column}")]
    ReferenceNotFound { table: String, column: String },

    #[error("tables reference each other: {0} <-> {1}")]
    ReferenceEachOther(String, String),

    #[error("value type does not match column `{0}`")]
    TypeNotMatch(String),

    #[error("operation not supported by dialect `{0}`")]
    NotSupported(String),

    #[error("cannot mutate static/shared data: {0}")]
    StaticData(String),
}

pub type Result<T> = std::result::Result<T, Error>;
