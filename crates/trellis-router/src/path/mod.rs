//! Path utilities for validation, normalization and segment splitting
//!
//! All functions are **pure**: given same input, always produce same output with no side effects.

use std::borrow::Cow;

/// Validates if a path is in canonical form
///
/// # Rules
///
/// - Must start with `/`
/// - Must not contain `//` or `\`
/// - Must not end with `/` (except root `/`)
/// - Must not be empty
///
/// # Examples
///
/// ```
/// use trellis_router::path::is_valid_path;
///
/// assert!(is_valid_path("/"));
/// assert!(is_valid_path("/products/7"));
///
/// assert!(!is_valid_path(""));
/// assert!(!is_valid_path("products"));
/// assert!(!is_valid_path("/products/"));
/// assert!(!is_valid_path("/products//7"));
/// ```
pub fn is_valid_path(path: &str) -> bool {
    if path.is_empty() || !path.starts_with('/') {
        return false;
    }

    if path.contains("//") || path.contains('\\') {
        return false;
    }

    path == "/" || !path.ends_with('/')
}

/// Normalize a path to canonical form
///
/// Returns `Cow::Borrowed` when input is already valid (zero allocations)
/// and `Cow::Owned` when normalization was needed.
///
/// Handles trailing slashes, doubled slashes and backslashes.
///
/// # Examples
///
/// ```
/// use trellis_router::path::normalize_path;
/// use std::borrow::Cow;
///
/// assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
/// assert_eq!(normalize_path("/about/"), "/about");
/// assert_eq!(normalize_path("\\users\\123"), "/users/123");
/// assert_eq!(normalize_path("/path//to///page"), "/path/to/page");
/// ```
pub fn normalize_path(path: &str) -> Cow<'_, str> {
    if is_valid_path(path) {
        return Cow::Borrowed(path);
    }

    let normalized = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    if normalized.is_empty() {
        Cow::Borrowed("/")
    } else {
        Cow::Owned(format!("/{}", normalized))
    }
}

/// Splits a request path into its non-empty, percent-decoded segments
///
/// Segments that are not valid percent-encoded UTF-8 are kept verbatim.
///
/// # Examples
///
/// ```
/// use trellis_router::path::split_segments;
///
/// assert_eq!(split_segments("/filter/a/b/"), vec!["filter", "a", "b"]);
/// assert_eq!(split_segments("/products/smart%20tv"), vec!["products", "smart tv"]);
/// assert!(split_segments("/").is_empty());
/// ```
pub fn split_segments(path: &str) -> Vec<String> {
    normalize_path(path)
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| match urlencoding::decode(segment) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => segment.to_string(),
        })
        .collect()
}

/// Compares a declared static segment with a request segment
pub(crate) fn segment_eq(expected: &str, actual: &str, case_insensitive: bool) -> bool {
    if case_insensitive {
        expected.eq_ignore_ascii_case(actual)
    } else {
        expected == actual
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_valid_path() {
        assert!(is_valid_path("/"));
        assert!(is_valid_path("/about"));
        assert!(is_valid_path("/metadata-example/2"));

        assert!(!is_valid_path(""));
        assert!(!is_valid_path("about"));
        assert!(!is_valid_path("/about/"));
        assert!(!is_valid_path("/about//page"));
        assert!(!is_valid_path("/about\\page"));
    }

    #[test]
    fn test_normalize_path_valid_is_borrowed() {
        assert!(matches!(normalize_path("/about"), Cow::Borrowed("/about")));
        assert!(matches!(normalize_path("/"), Cow::Borrowed("/")));
    }

    #[test]
    fn test_normalize_path_fixes_mistakes() {
        assert_eq!(normalize_path("/about/"), "/about");
        assert_eq!(normalize_path("/about//page"), "/about/page");
        assert_eq!(normalize_path("\\users\\123"), "/users/123");
        assert_eq!(normalize_path(""), "/");
        assert_eq!(normalize_path("about"), "/about");
    }

    #[test]
    fn test_split_segments_decodes() {
        assert_eq!(split_segments("/a%2Fb"), vec!["a/b"]);
        assert_eq!(split_segments("/caf%C3%A9"), vec!["café"]);
        assert_eq!(split_segments("/bad%FF"), vec!["bad%FF"]);
    }

    #[test]
    fn test_segment_eq() {
        assert!(segment_eq("About", "About", false));
        assert!(!segment_eq("About", "about", false));
        assert!(segment_eq("About", "about", true));
    }
}
