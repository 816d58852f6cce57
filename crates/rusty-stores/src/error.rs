// File: rusty-stores/src/error.rs
// Purpose: Error type shared by all store helpers

use thiserror::Error;

/// Errors returned by store helpers
#[derive(Debug, Error)]
pub enum StoreError {
    /// An href could not be parsed or resolved
    #[error("Invalid URL '{href}': {source}")]
    InvalidUrl {
        href: String,
        #[source]
        source: url::ParseError,
    },

    /// A value could not be (de)serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A shallow merge was attempted on something other than an object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// The storage backend refused an operation
    #[error("Storage error: {0}")]
    Storage(String),

    /// A writable store was required but a read-only one was supplied
    #[error("Store is read-only")]
    ReadOnly,

    /// A route table could not be built
    #[error(transparent)]
    Router(#[from] rusty_router::RouterError),
}
