/// Path utilities for normalization
///
/// All functions are **pure**: given same input, always produce same output with no side effects.

use once_cell::sync::Lazy;
use url::Url;

/// Fixed authority every path is resolved against.
///
/// Only the path component of the resolved URL is ever read, so the host
/// is irrelevant beyond making the URL absolute.
pub const BASE_URL: &str = "http://localhost/";

static BASE: Lazy<Url> = Lazy::new(|| Url::parse(BASE_URL).expect("BASE_URL is a valid absolute URL"));

/// Normalize a path to canonical form
///
/// The path is resolved as a reference relative to [`BASE_URL`] and the
/// path component of the result is returned. Patterns and candidate
/// pathnames both go through this function, so `.` and `..` segments
/// compare identically on both sides.
///
/// # Rules
///
/// - `.` segments are dropped: `/a/./b` → `/a/b`
/// - `..` segments pop the previous segment: `/a/b/../c` → `/a/c`
/// - `..` above the root is clamped: `/../a` → `/a`
/// - A missing leading slash is added: `about` → `/about`
/// - Backslashes are separators: `\users\123` → `/users/123`
/// - Query and fragment are not part of the pathname: `/a?x=1#top` → `/a`
/// - Characters outside the URL path set are percent-encoded: `/a b` → `/a%20b`
///
/// # Examples
///
/// ```
/// use rusty_router::path::normalize_path;
///
/// assert_eq!(normalize_path("/about"), "/about");
/// assert_eq!(normalize_path("/blog/./posts/../42"), "/blog/42");
/// assert_eq!(normalize_path("about"), "/about");
/// assert_eq!(normalize_path(""), "/");
/// ```
pub fn normalize_path(path: &str) -> String {
    let relative = to_root_relative(path);

    match BASE.join(&relative) {
        Ok(url) => url.path().to_string(),
        Err(err) => {
            tracing::debug!("Path {:?} could not be resolved ({}), using it verbatim", path, err);
            relative
        }
    }
}

/// Rewrites any input into a root-relative reference.
///
/// Leading separators are collapsed to a single `/` so that `//host/x`
/// is read as a path and never as a scheme-relative URL with its own
/// authority. Inputs without a leading separator get one, which also keeps
/// `name:rest` from being read as a URL scheme.
fn to_root_relative(path: &str) -> String {
    let rest = path.trim_start_matches(|c: char| c == '/' || c == '\\');
    format!("/{}", rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_valid() {
        assert_eq!(normalize_path("/"), "/");
        assert_eq!(normalize_path("/about"), "/about");
        assert_eq!(normalize_path("/users/123"), "/users/123");
    }

    #[test]
    fn test_normalize_path_dot_segments() {
        assert_eq!(normalize_path("/a/./b"), "/a/b");
        assert_eq!(normalize_path("/a/b/../c"), "/a/c");
        assert_eq!(normalize_path("/a/b/.."), "/a/");
        assert_eq!(normalize_path("/../../a"), "/a");
    }

    #[test]
    fn test_normalize_path_relative() {
        assert_eq!(normalize_path("about"), "/about");
        assert_eq!(normalize_path("./about"), "/about");
        assert_eq!(normalize_path(""), "/");
    }

    #[test]
    fn test_normalize_path_leading_double_slash_stays_a_path() {
        assert_eq!(normalize_path("//evil.example/x"), "/evil.example/x");
        assert_eq!(normalize_path("\\\\evil.example\\x"), "/evil.example/x");
    }

    #[test]
    fn test_normalize_path_backslash() {
        assert_eq!(normalize_path("\\users\\123"), "/users/123");
        assert_eq!(normalize_path("/about\\page"), "/about/page");
    }

    #[test]
    fn test_normalize_path_drops_query_and_fragment() {
        assert_eq!(normalize_path("/search?q=rust"), "/search");
        assert_eq!(normalize_path("/docs#intro"), "/docs");
    }

    #[test]
    fn test_normalize_path_keeps_tokens() {
        assert_eq!(normalize_path("/users/:id"), "/users/:id");
        assert_eq!(normalize_path("/users/:user_id/../:id"), "/users/:id");
    }

    #[test]
    fn test_normalize_path_percent_encodes() {
        assert_eq!(normalize_path("/a b"), "/a%20b");
    }

    #[test]
    fn test_normalize_path_idempotent() {
        for path in ["/a/./b/../c", "x/y", "/", "/a%20b", "/users/:id"] {
            let once = normalize_path(path);
            assert_eq!(normalize_path(&once), once);
        }
    }
}
