use thiserror::Error;

use crate::level::SpecificityLevel;

/// Errors raised while building a pattern catalog.
///
/// These abort process startup; they are never produced at decision time.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("invalid pattern regex '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("duplicate catalog entry '{pattern}' at level {level}")]
    DuplicateEntry {
        pattern: String,
        level: SpecificityLevel,
    },
}

pub type Result<A> = std::result::Result<A, CatalogError>;
