// File: rusty-stores/src/location.rs
// Purpose: Two-way bindings between stores and the current URL

use std::collections::BTreeMap;
use std::fmt;

use url::Url;

use crate::store::{lens, Lens, Readable, Writable, WritableStore};
use crate::StoreError;

/// Query parameters by name (the last duplicate wins)
pub type QueryParams = BTreeMap<String, String>;

/// The current URL, passed explicitly to every location store
///
/// Clones share the same URL. Nothing here is global: an application creates
/// one context (usually from its configured initial href) and threads it
/// through the stores that need it.
///
/// # Examples
///
/// ```
/// use rusty_stores::location::{pathname, LocationContext};
/// use rusty_stores::{Readable, WritableStore};
///
/// let ctx = LocationContext::new("https://example.com/blog?page=2#top").unwrap();
/// let path = pathname(&ctx);
///
/// assert_eq!(path.get(), "/blog");
/// path.set("/about".to_string());
/// assert_eq!(ctx.href(), "https://example.com/about?page=2#top");
/// ```
#[derive(Clone)]
pub struct LocationContext {
    url: Writable<Url>,
}

impl LocationContext {
    /// Creates a context from an absolute href
    pub fn new(href: &str) -> Result<Self, StoreError> {
        let url = parse_href(href)?;
        Ok(Self {
            url: Writable::new(url),
        })
    }

    /// The full current href
    pub fn href(&self) -> String {
        self.url.get().to_string()
    }

    /// The origin (`scheme://host[:port]`) of the current URL
    pub fn origin(&self) -> String {
        self.url.get().origin().ascii_serialization()
    }

    /// The current URL
    pub fn url(&self) -> Url {
        self.url.get()
    }

    /// The underlying store, for subscribing to every URL change
    pub fn store(&self) -> &Writable<Url> {
        &self.url
    }

    /// Replaces the current URL with an absolute href
    pub fn set_href(&self, href: &str) -> Result<(), StoreError> {
        let url = parse_href(href)?;
        tracing::debug!("Location set to {}", url);
        self.url.set(url);
        Ok(())
    }

    /// Resolves `href` against the current URL, like following a link
    pub fn navigate(&self, href: &str) -> Result<(), StoreError> {
        let next = self
            .url
            .get()
            .join(href)
            .map_err(|source| StoreError::InvalidUrl {
                href: href.to_string(),
                source,
            })?;

        tracing::debug!("Navigating to {}", next);
        self.url.set(next);
        Ok(())
    }
}

impl fmt::Debug for LocationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationContext")
            .field("href", &self.href())
            .finish()
    }
}

fn parse_href(href: &str) -> Result<Url, StoreError> {
    Url::parse(href).map_err(|source| StoreError::InvalidUrl {
        href: href.to_string(),
        source,
    })
}

// ============================================================================
// Stores
// ============================================================================

/// Store bound to the URL path
pub fn pathname(ctx: &LocationContext) -> Lens<Url, String> {
    lens(
        ctx.store(),
        |url: &Url| url.path().to_string(),
        |url: &Url, path: String| {
            let mut next = url.clone();
            next.set_path(&path);
            next
        },
    )
}

/// Store bound to the URL fragment, without the leading `#`
///
/// Setting an empty string removes the fragment.
pub fn hash(ctx: &LocationContext) -> Lens<Url, String> {
    lens(
        ctx.store(),
        |url: &Url| url.fragment().unwrap_or_default().to_string(),
        |url: &Url, hash: String| {
            let mut next = url.clone();
            let hash = hash.trim_start_matches('#');
            next.set_fragment(if hash.is_empty() { None } else { Some(hash) });
            next
        },
    )
}

/// Store bound to all query parameters
///
/// Setting an empty map removes the query string.
pub fn query(ctx: &LocationContext) -> Lens<Url, QueryParams> {
    lens(ctx.store(), parse_query, |url: &Url, params: QueryParams| {
        with_query(url, &params)
    })
}

/// Store bound to a single query parameter
///
/// Writing `None` removes the parameter. Writing goes through
/// [`QueryParams`], so the query string is rewritten in key order with
/// duplicates collapsed.
pub fn query_param(ctx: &LocationContext, name: impl Into<String>) -> Lens<Url, Option<String>> {
    let name = name.into();
    let key = name.clone();

    lens(
        ctx.store(),
        move |url: &Url| parse_query(url).remove(&name),
        move |url: &Url, value: Option<String>| {
            let mut params = parse_query(url);
            match value {
                Some(value) => params.insert(key.clone(), value),
                None => params.remove(&key),
            };
            with_query(url, &params)
        },
    )
}

/// Parses the query string of a URL
pub fn parse_query(url: &Url) -> QueryParams {
    url.query_pairs().into_owned().collect()
}

fn with_query(url: &Url, params: &QueryParams) -> Url {
    let mut next = url.clone();
    if params.is_empty() {
        next.set_query(None);
    } else {
        next.query_pairs_mut().clear().extend_pairs(params.iter());
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn ctx() -> LocationContext {
        LocationContext::new("http://localhost:3000/users/7?tab=posts&sort=new#comments").unwrap()
    }

    #[test]
    fn test_context_accessors() {
        let ctx = ctx();
        assert_eq!(ctx.origin(), "http://localhost:3000");
        assert_eq!(ctx.url().path(), "/users/7");
    }

    #[test]
    fn test_invalid_href() {
        assert!(matches!(
            LocationContext::new("not a url"),
            Err(StoreError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_navigate_relative() {
        let ctx = ctx();
        ctx.navigate("../about").unwrap();
        assert_eq!(ctx.href(), "http://localhost:3000/about");

        ctx.navigate("?q=1").unwrap();
        assert_eq!(ctx.href(), "http://localhost:3000/about?q=1");
    }

    #[test]
    fn test_set_href_replaces() {
        let ctx = ctx();
        ctx.set_href("https://example.com/").unwrap();
        assert_eq!(ctx.origin(), "https://example.com");
        assert!(ctx.set_href("/relative").is_err());
    }

    #[test]
    fn test_hash_store() {
        let ctx = ctx();
        let hash = hash(&ctx);
        assert_eq!(hash.get(), "comments");

        hash.set("#top".to_string());
        assert_eq!(ctx.url().fragment(), Some("top"));

        hash.set(String::new());
        assert_eq!(ctx.url().fragment(), None);
    }

    #[test]
    fn test_query_store() {
        let ctx = ctx();
        let query = query(&ctx);
        let params = query.get();
        assert_eq!(params.get("tab").map(String::as_str), Some("posts"));
        assert_eq!(params.get("sort").map(String::as_str), Some("new"));

        query.set(QueryParams::new());
        assert_eq!(ctx.url().query(), None);
    }

    #[test]
    fn test_query_param_store() {
        let ctx = ctx();
        let tab = query_param(&ctx, "tab");
        assert_eq!(tab.get(), Some("posts".to_string()));

        tab.set(Some("likes".to_string()));
        assert_eq!(ctx.url().query(), Some("sort=new&tab=likes"));

        tab.set(None);
        assert_eq!(ctx.url().query(), Some("sort=new"));
        assert_eq!(tab.get(), None);
    }

    #[test]
    fn test_query_duplicate_last_wins() {
        let ctx = LocationContext::new("http://localhost/?a=1&a=2").unwrap();
        assert_eq!(query_param(&ctx, "a").get(), Some("2".to_string()));
    }

    #[test]
    fn test_pathname_only_notifies_on_path_change() {
        let ctx = ctx();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let _sub = pathname(&ctx).subscribe(move |p| sink.lock().unwrap().push(p.clone()));

        hash(&ctx).set("elsewhere".to_string());
        ctx.navigate("/users/8").unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["/users/7", "/users/8"]);
    }
}
