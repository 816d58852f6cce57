//! # Rusty Router
//!
//! A small path-pattern router:
//! - Static routes (`/about`)
//! - Named parameters (`/users/:id`, `/users/:user_id/posts/:post_id`)
//! - Path normalization on both sides (`/blog/./x/../42` is `/blog/42`)
//! - Opaque values carried with each route (component references, handlers, ...)
//!
//! ## Matching Order
//!
//! Routes are tried longest pattern first, measured in characters of the
//! pattern string as written. Ties keep the order the routes were supplied
//! in. The first route whose anchored expression accepts the pathname wins.
//!
//! Length is not specificity: `/x/:a` is tried before `/xx` simply because
//! it is longer.
//!
//! Length counts Unicode scalar values (`char`s), not bytes and not UTF-16
//! code units. `/😀😀` is three characters long, so `/abc` is tried first.
//!
//! ## Example
//!
//! ```
//! use rusty_router::make_router;
//!
//! let router = make_router([
//!     ("/about", "About"),
//!     ("/blog/:id", "Post"),
//!     ("/blog", "Blog"),
//! ])
//! .unwrap();
//!
//! let found = router.route("/blog/42").unwrap();
//! assert_eq!(found.params.get("id"), Some(&"42".to_string()));
//! assert_eq!(*found.value, "Post");
//!
//! assert!(router.route("/missing").is_none());
//! ```

use std::collections::HashMap;

// ============================================================================
// Module Declarations
// ============================================================================

mod error;
pub mod path;
pub mod route;

pub use error::RouterError;
pub use path::normalize_path;
pub use route::pattern::{RouteCompiler, RouteMatcher};

// ============================================================================
// Core Types
// ============================================================================

/// Parameters extracted from a matched pathname (name → segment)
pub type RouterParameters = HashMap<String, String>;

/// A compiled route paired with its value
#[derive(Debug, Clone)]
pub struct CompiledRoute<V> {
    matcher: RouteMatcher,
    value: V,
}

impl<V> CompiledRoute<V> {
    /// The pattern exactly as supplied
    pub fn pattern(&self) -> &str {
        self.matcher.pattern()
    }

    /// Parameter names in order of appearance
    pub fn param_names(&self) -> &[String] {
        self.matcher.param_names()
    }

    /// The value registered for this route
    pub fn value(&self) -> &V {
        &self.value
    }

    /// The underlying matcher
    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    /// Matches this route against a pathname
    pub fn matches(&self, pathname: &str) -> Option<RouterParameters> {
        self.matcher.matches(pathname)
    }
}

/// Result of routing a pathname
#[derive(Debug, Clone, PartialEq)]
pub struct RouteMatch<'a, V> {
    /// Pattern of the route that matched
    pub pattern: &'a str,
    /// Extracted parameters
    pub params: RouterParameters,
    /// Value registered for the route
    pub value: &'a V,
}

// ============================================================================
// Route Compilation
// ============================================================================

/// Compiles a single pattern into a matcher
///
/// # Examples
///
/// ```
/// use rusty_router::compile_route;
///
/// let matcher = compile_route("/users/:user_id/posts/:post_id").unwrap();
/// let params = matcher.matches("/users/7/posts/hello-world").unwrap();
///
/// assert_eq!(params.get("user_id"), Some(&"7".to_string()));
/// assert_eq!(params.get("post_id"), Some(&"hello-world".to_string()));
///
/// // Static patterns match exactly and return no parameters
/// let about = compile_route("/about").unwrap();
/// assert!(about.matches("/about").unwrap().is_empty());
/// assert!(about.matches("/about/extra").is_none());
/// ```
pub fn compile_route(pattern: &str) -> Result<RouteMatcher, RouterError> {
    RouteCompiler::new().compile(pattern)
}

/// Builds a router from `(pattern, value)` pairs
///
/// Any collection of pairs works: an array, a `Vec`, a `HashMap` or a
/// `BTreeMap`. A pattern that cannot be compiled aborts the whole build.
pub fn make_router<I, K, V>(route_map: I) -> Result<Router<V>, RouterError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
{
    Router::with_compiler(route_map, &RouteCompiler::new())
}

// ============================================================================
// Router
// ============================================================================

/// Frozen routing table
///
/// Built once from a route map; every query takes `&self`, so a router can
/// be shared across threads behind an `Arc` when `V: Sync`.
#[derive(Debug, Clone)]
pub struct Router<V> {
    routes: Vec<CompiledRoute<V>>,
}

impl<V> Router<V> {
    /// Builds a router using a specific compiler
    ///
    /// Entries are stable-sorted by descending pattern length (in
    /// characters) before compilation.
    pub fn with_compiler<I, K>(route_map: I, compiler: &RouteCompiler) -> Result<Self, RouterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
    {
        let mut entries: Vec<(K, V)> = route_map.into_iter().collect();

        // sort_by is stable: equal lengths keep input order
        entries.sort_by(|(a, _), (b, _)| {
            b.as_ref().chars().count().cmp(&a.as_ref().chars().count())
        });

        let routes = entries
            .into_iter()
            .map(|(pattern, value)| {
                compiler
                    .compile(pattern.as_ref())
                    .map(|matcher| CompiledRoute { matcher, value })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            "Built router with {} routes: {:?}",
            routes.len(),
            routes.iter().map(|r| r.pattern()).collect::<Vec<_>>()
        );

        Ok(Self { routes })
    }

    /// Routes a pathname to the first matching route
    ///
    /// Returns `None` when no route matches. A static route that matches
    /// returns an empty parameter map, which is distinct from `None`.
    pub fn route(&self, pathname: &str) -> Option<RouteMatch<'_, V>> {
        let normalized = normalize_path(pathname);

        let found = self.routes.iter().find_map(|route| {
            route
                .matcher
                .matches_normalized(&normalized)
                .map(|params| RouteMatch {
                    pattern: route.pattern(),
                    params,
                    value: &route.value,
                })
        });

        match &found {
            Some(m) => tracing::debug!("Routed {:?} to {:?}", pathname, m.pattern),
            None => tracing::debug!("No route for {:?}", pathname),
        }

        found
    }

    /// Compiled routes in the order they are tried
    pub fn routes(&self) -> impl Iterator<Item = &CompiledRoute<V>> {
        self.routes.iter()
    }

    /// Patterns in the order they are tried
    pub fn patterns(&self) -> Vec<&str> {
        self.routes.iter().map(|r| r.pattern()).collect()
    }

    /// Number of routes
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns true if the router has no routes
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
