// File: src/navigation.rs
// Purpose: Request-scoped view of the current location and navigation intents

use std::fmt;

use tokio::sync::mpsc;
use tracing::debug;
use url::form_urlencoded;

use crate::NavigationError;

/// Immutable, ordered multimap of query parameters
///
/// Keys may repeat; every value is kept in the order it appeared.
///
/// # Examples
///
/// ```
/// use trellis::SearchParams;
///
/// let params = SearchParams::parse("?name=betty&name=sofia&name=sandra&age=3");
///
/// assert_eq!(params.get("name"), Some("betty"));
/// assert_eq!(params.get_all("name"), vec!["betty", "sofia", "sandra"]);
/// assert_eq!(params.keys(), vec!["name", "age"]);
/// assert!(!params.has("missing"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pairs: Vec<(String, String)>,
}

impl SearchParams {
    /// Parses a query string, with or without a leading `?`
    ///
    /// Decoded as `application/x-www-form-urlencoded`: `+` is a space and
    /// invalid escapes are replaced lossily.
    pub fn parse(query: &str) -> Self {
        let pairs = form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        Self { pairs }
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value for `key`, in order
    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn has(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Distinct keys in order of first appearance
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for (key, _) in &self.pairs {
            if !keys.contains(&key.as_str()) {
                keys.push(key.as_str());
            }
        }
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of key/value pairs, counting repeats
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// A new snapshot with one more pair at the end
    pub fn with_appended(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut pairs = self.pairs.clone();
        pairs.push((key.into(), value.into()));
        Self { pairs }
    }

    /// A new snapshot with every value for `key` removed
    pub fn without(&self, key: &str) -> Self {
        Self {
            pairs: self
                .pairs
                .iter()
                .filter(|(k, _)| k != key)
                .cloned()
                .collect(),
        }
    }

    /// Encodes back to `a=1&b=2` form, without a leading `?`
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl fmt::Display for SearchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_query_string())
    }
}

/// Splits an href into its path and query, dropping any fragment
pub fn split_href(href: &str) -> (&str, &str) {
    let href = href.split('#').next().unwrap_or_default();
    match href.split_once('?') {
        Some((path, query)) => (path, query),
        None => (href, ""),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationMode {
    /// Adds a history entry
    Push,
    /// Replaces the current history entry
    Replace,
}

/// A request to move to another location, handled by the surrounding runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub href: String,
    pub mode: NavigationMode,
}

pub type IntentSender = mpsc::UnboundedSender<NavigationIntent>;
pub type IntentReceiver = mpsc::UnboundedReceiver<NavigationIntent>;

/// Read-only view of the current location for one render
///
/// ```
/// use trellis::NavigationContext;
///
/// let nav = NavigationContext::from_href("/profile?name=betty&name=sofia");
/// assert_eq!(nav.pathname(), "/profile");
/// assert_eq!(nav.search_params().get_all("name"), vec!["betty", "sofia"]);
/// ```
#[derive(Debug, Clone)]
pub struct NavigationContext {
    pathname: String,
    search_params: SearchParams,
    intents: Option<IntentSender>,
}

impl NavigationContext {
    /// A context with no runtime attached; navigation attempts fail
    pub fn from_href(href: &str) -> Self {
        let (path, query) = split_href(href);
        let pathname = if path.is_empty() { "/" } else { path };

        Self {
            pathname: pathname.to_string(),
            search_params: SearchParams::parse(query),
            intents: None,
        }
    }

    /// Attaches the channel `navigate` and `replace` send on
    pub fn with_intents(mut self, intents: IntentSender) -> Self {
        self.intents = Some(intents);
        self
    }

    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    pub fn search_params(&self) -> &SearchParams {
        &self.search_params
    }

    /// The current location as an href
    pub fn href(&self) -> String {
        if self.search_params.is_empty() {
            self.pathname.clone()
        } else {
            format!("{}?{}", self.pathname, self.search_params)
        }
    }

    /// Asks the runtime to push `href`; the current render is not touched
    pub fn navigate(&self, href: impl Into<String>) -> Result<(), NavigationError> {
        self.send(href.into(), NavigationMode::Push)
    }

    /// Asks the runtime to replace the current entry with `href`
    pub fn replace(&self, href: impl Into<String>) -> Result<(), NavigationError> {
        self.send(href.into(), NavigationMode::Replace)
    }

    fn send(&self, href: String, mode: NavigationMode) -> Result<(), NavigationError> {
        let Some(intents) = &self.intents else {
            return Err(NavigationError { href });
        };

        debug!(from = %self.pathname, to = %href, ?mode, "navigation intent");
        intents
            .send(NavigationIntent { href, mode })
            .map_err(|err| NavigationError { href: err.0.href })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn test_multiplicity_preserved() {
        let params = SearchParams::parse("name=betty&name=sofia&name=sandra");
        assert_eq!(params.get_all("name"), vec!["betty", "sofia", "sandra"]);
        assert_eq!(params.get("name"), Some("betty"));
        assert_eq!(params.len(), 3);
        assert_eq!(params.keys(), vec!["name"]);
    }

    #[rstest]
    #[case("", 0)]
    #[case("?", 0)]
    #[case("a=1&&b=2", 2)]
    #[case("flag", 1)]
    fn test_parse_counts(#[case] query: &str, #[case] expected: usize) {
        assert_eq!(SearchParams::parse(query).len(), expected);
    }

    #[test]
    fn test_decoding() {
        let params = SearchParams::parse("q=smart+tv&city=S%C3%A3o%20Paulo&flag");
        assert_eq!(params.get("q"), Some("smart tv"));
        assert_eq!(params.get("city"), Some("São Paulo"));
        assert_eq!(params.get("flag"), Some(""));
    }

    #[test]
    fn test_derived_snapshots_leave_original_untouched() {
        let original = SearchParams::parse("name=betty");
        let appended = original.with_appended("name", "sofia");
        let removed = appended.without("name");

        assert_eq!(original.get_all("name"), vec!["betty"]);
        assert_eq!(appended.get_all("name"), vec!["betty", "sofia"]);
        assert!(removed.is_empty());
    }

    #[test]
    fn test_query_string_round_trip() {
        let params = SearchParams::parse("q=smart%20tv&name=a&name=b&city=S%C3%A3o");
        assert_eq!(params.to_query_string(), "q=smart+tv&name=a&name=b&city=S%C3%A3o");
        assert_eq!(SearchParams::parse(&params.to_query_string()), params);
    }

    #[rstest]
    #[case("/profile?name=betty#top", "/profile", "name=betty")]
    #[case("/profile", "/profile", "")]
    #[case("?x=1", "", "x=1")]
    fn test_split_href(#[case] href: &str, #[case] path: &str, #[case] query: &str) {
        assert_eq!(split_href(href), (path, query));
    }

    #[test]
    fn test_navigate_sends_intent() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let nav = NavigationContext::from_href("/profile").with_intents(tx);

        nav.navigate("/").unwrap();
        nav.replace("/products").unwrap();

        assert_eq!(
            rx.try_recv().unwrap(),
            NavigationIntent {
                href: "/".into(),
                mode: NavigationMode::Push
            }
        );
        assert_eq!(rx.try_recv().unwrap().mode, NavigationMode::Replace);
    }

    #[test]
    fn test_navigate_without_runtime_fails() {
        let nav = NavigationContext::from_href("/profile");
        assert_eq!(
            nav.navigate("/").unwrap_err(),
            NavigationError { href: "/".into() }
        );
    }

    #[test]
    fn test_href_reassembles_location() {
        let nav = NavigationContext::from_href("/profile?name=betty");
        assert_eq!(nav.href(), "/profile?name=betty");
        assert_eq!(NavigationContext::from_href("").pathname(), "/");
    }
}
