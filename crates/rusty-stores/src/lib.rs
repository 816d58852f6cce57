//! # Rusty Stores
//!
//! Reactive store helpers built on one small primitive:
//! - [`Writable`] values with `get` / `set` / `update` / `subscribe`
//! - Derived, lens and read-only views ([`derived`], [`lens`], [`immutable`](immutable::immutable))
//! - Location stores bound to the current URL ([`location`])
//! - Stores persisted as JSON in a storage backend ([`storage`])
//! - Validated, merge and array helpers
//! - Routed stores that follow the pathname through a [`rusty_router::Router`]
//!
//! ## Example
//!
//! ```
//! use rusty_stores::location::{pathname, LocationContext};
//! use rusty_stores::route::routes;
//! use rusty_stores::Readable;
//!
//! let ctx = LocationContext::new("http://localhost/blog/42").unwrap();
//! let page = routes([("/blog/:id", "Post"), ("/blog", "Blog")], pathname(&ctx)).unwrap();
//!
//! assert_eq!(page.get().unwrap().params["id"], "42");
//!
//! ctx.navigate("/blog").unwrap();
//! assert_eq!(page.get().unwrap().value, "Blog");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
pub mod array;
pub mod config;
pub mod immutable;
pub mod location;
pub mod merge;
pub mod route;
pub mod storage;
pub mod store;
pub mod validate;

pub use config::StoresConfig;
pub use error::StoreError;
pub use store::{
    derived, lens, readable, Callback, Constant, Derived, Lens, Readable, StoreSource,
    Subscription, Writable, WritableStore,
};
