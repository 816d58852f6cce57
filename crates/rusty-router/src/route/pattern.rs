/// Pattern compilation for route templates
///
/// Turns `/users/:id` style templates into anchored regular expressions.
/// All functions are **pure**: same input → same output, no side effects.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::path::normalize_path;
use crate::{RouterError, RouterParameters};

/// A `:name` token: colon followed by anything up to whitespace or `/`
static PARAM_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r":([^\s/]+)").expect("PARAM_TOKEN is a valid expression"));

/// Capture group substituted for every `:name` token.
///
/// Word characters and hyphens only, so a capture never spans a `/`.
pub const PARAM_CAPTURE: &str = r"([\w-]+)";

/// Default compiled size limit handed to the regex engine (10 MiB, the
/// engine's own default).
pub const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

/// Extracts parameter names from a pattern, left to right
///
/// Names are returned without the leading colon and are not deduplicated.
///
/// # Examples
///
/// ```
/// use rusty_router::route::pattern::param_names;
///
/// assert_eq!(param_names("/users/:user_id/posts/:post_id"), vec!["user_id", "post_id"]);
/// assert!(param_names("/about").is_empty());
/// ```
pub fn param_names(pattern: &str) -> Vec<String> {
    PARAM_TOKEN
        .captures_iter(pattern)
        .filter_map(|caps| caps.get(1))
        .map(|name| name.as_str().to_string())
        .collect()
}

/// Builds the anchored expression source for a pattern
///
/// Literal text between tokens is escaped; every token becomes
/// [`PARAM_CAPTURE`].
///
/// # Examples
///
/// ```
/// use rusty_router::route::pattern::pattern_to_regex;
///
/// assert_eq!(pattern_to_regex("/blog/:id"), r"^/blog/([\w-]+)$");
/// assert_eq!(pattern_to_regex("/a.b"), r"^/a\.b$");
/// ```
pub fn pattern_to_regex(pattern: &str) -> String {
    let mut source = String::with_capacity(pattern.len() + 16);
    source.push('^');

    let mut last = 0;
    for token in PARAM_TOKEN.find_iter(pattern) {
        source.push_str(&regex::escape(&pattern[last..token.start()]));
        source.push_str(PARAM_CAPTURE);
        last = token.end();
    }
    source.push_str(&regex::escape(&pattern[last..]));

    source.push('$');
    source
}

/// Compiled matcher for a single pattern
///
/// Holds the pattern as written, its normalized form, the ordered
/// parameter names and the anchored expression built from them.
#[derive(Debug, Clone)]
pub struct RouteMatcher {
    pattern: String,
    normalized: String,
    param_names: Vec<String>,
    regex: Regex,
}

impl RouteMatcher {
    /// The pattern exactly as supplied
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The pattern after path normalization
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Parameter names in order of appearance
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns true if the pattern declares no parameters
    pub fn is_static(&self) -> bool {
        self.param_names.is_empty()
    }

    /// Matches a pathname against this pattern
    ///
    /// The pathname is normalized the same way the pattern was. Returns the
    /// extracted parameters on a match (an empty map for static patterns),
    /// `None` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use rusty_router::compile_route;
    ///
    /// let matcher = compile_route("/blog/:id").unwrap();
    ///
    /// let params = matcher.matches("/blog/42").unwrap();
    /// assert_eq!(params.get("id"), Some(&"42".to_string()));
    ///
    /// assert!(matcher.matches("/blog/42/comments").is_none());
    /// ```
    pub fn matches(&self, pathname: &str) -> Option<RouterParameters> {
        self.matches_normalized(&normalize_path(pathname))
    }

    /// Matches an already-normalized pathname.
    pub(crate) fn matches_normalized(&self, normalized: &str) -> Option<RouterParameters> {
        let caps = self.regex.captures(normalized)?;

        // Later duplicates overwrite earlier ones on insert
        let params = self
            .param_names
            .iter()
            .zip(caps.iter().skip(1))
            .filter_map(|(name, value)| value.map(|v| (name.clone(), v.as_str().to_string())))
            .collect();

        Some(params)
    }
}

/// Route compiler with tunable regex limits
///
/// [`compile_route`](crate::compile_route) and [`make_router`](crate::make_router)
/// use the defaults; build a `RouteCompiler` to change them.
///
/// # Examples
///
/// ```
/// use rusty_router::RouteCompiler;
///
/// let compiler = RouteCompiler::new().with_size_limit(1 << 16);
/// let matcher = compiler.compile("/users/:id").unwrap();
/// assert_eq!(matcher.param_names(), &["id".to_string()]);
/// ```
#[derive(Debug, Clone)]
pub struct RouteCompiler {
    size_limit: usize,
}

impl RouteCompiler {
    /// Creates a compiler with default limits
    pub fn new() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    /// Sets the compiled size limit for each route's expression
    pub fn with_size_limit(mut self, size_limit: usize) -> Self {
        self.size_limit = size_limit;
        self
    }

    /// Compiles one pattern into a matcher
    ///
    /// The pattern is normalized, its tokens collected, and an anchored
    /// expression built. Fails only if the regex engine rejects the result.
    pub fn compile(&self, pattern: &str) -> Result<RouteMatcher, RouterError> {
        let normalized = normalize_path(pattern);
        let param_names = param_names(&normalized);
        let source = pattern_to_regex(&normalized);

        let regex = RegexBuilder::new(&source)
            .size_limit(self.size_limit)
            .build()
            .map_err(|source| RouterError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        tracing::debug!(
            "Compiled route {:?} as {:?} with params {:?}",
            pattern,
            regex.as_str(),
            param_names
        );

        Ok(RouteMatcher {
            pattern: pattern.to_string(),
            normalized,
            param_names,
            regex,
        })
    }
}

impl Default for RouteCompiler {
    fn default() -> Self {
        Self::new()
    }
}
