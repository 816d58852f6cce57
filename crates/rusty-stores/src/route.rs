// File: rusty-stores/src/route.rs
// Purpose: Stores that follow the route matching the current pathname

use std::sync::Arc;

use rusty_router::{make_router, Router, RouterParameters};

use crate::store::{derived, Derived, Readable};
use crate::StoreError;

/// Owned copy of a route match, as held by a routed store
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedMatch<V> {
    pub pattern: String,
    pub params: RouterParameters,
    pub value: V,
}

/// Store of the route matching a pathname store (`None` when nothing matches)
pub type Routed<V> = Derived<String, Option<RoutedMatch<V>>>;

/// Follows `pathname` through an existing router
///
/// # Examples
///
/// ```
/// use rusty_router::make_router;
/// use rusty_stores::location::{pathname, LocationContext};
/// use rusty_stores::route::routed;
/// use rusty_stores::Readable;
/// use std::sync::Arc;
///
/// let router = Arc::new(make_router([("/", "Home"), ("/users/:id", "User")]).unwrap());
/// let ctx = LocationContext::new("http://localhost/users/7").unwrap();
/// let current = routed(router, pathname(&ctx));
///
/// let m = current.get().unwrap();
/// assert_eq!(m.value, "User");
/// assert_eq!(m.params["id"], "7");
///
/// ctx.navigate("/nowhere/at/all").unwrap();
/// assert!(current.get().is_none());
/// ```
pub fn routed<V, R>(router: Arc<Router<V>>, pathname: R) -> Routed<V>
where
    V: Clone + Send + Sync + 'static,
    R: Readable<String> + 'static,
{
    derived(pathname, move |path: &String| {
        router.route(path).map(|m| RoutedMatch {
            pattern: m.pattern.to_string(),
            params: m.params,
            value: m.value.clone(),
        })
    })
}

/// Builds a router from `(pattern, value)` pairs and follows `pathname`
pub fn routes<I, K, V, R>(route_map: I, pathname: R) -> Result<Routed<V>, StoreError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Clone + Send + Sync + 'static,
    R: Readable<String> + 'static,
{
    let router = make_router(route_map)?;
    Ok(routed(Arc::new(router), pathname))
}
