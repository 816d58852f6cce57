use thiserror::Error;

/// Errors raised while building a router.
///
/// Matching never fails: a pathname that fits no route is reported as
/// `None`, not as an error.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The expression generated for a pattern was rejected by the regex engine.
    #[error("Invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}
