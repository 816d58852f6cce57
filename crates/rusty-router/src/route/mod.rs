/// Route module for pattern-based routing
///
/// Contains pure functional components for compiling route patterns:
/// - Pure functions (same input → same output)
/// - Immutable compiled matchers
/// - Anchored matching on normalized paths

pub mod pattern;

// Re-export commonly used types
pub use pattern::{param_names, pattern_to_regex, RouteCompiler, RouteMatcher};
