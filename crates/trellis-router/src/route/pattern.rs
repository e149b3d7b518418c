//! Route patterns and the path segment matcher
//!
//! A pattern is parsed from file-path syntax (`products/[slug]`,
//! `filter/[[...slug]]`, `(marketing)/about`) into typed segments and
//! validated once, when the route table is built.

use std::cmp::Ordering;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::path::{normalize_path, segment_eq, split_segments};
use crate::{ParamBindings, ParamValue, PatternError};

static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("parameter name regex"));

/// A single segment of a route pattern
///
/// # Examples
///
/// ```
/// use trellis_router::route::{classify_segment, RouteSegment};
///
/// assert_eq!(classify_segment("about").unwrap(), RouteSegment::Static("about".into()));
/// assert_eq!(classify_segment("[id]").unwrap(), RouteSegment::Dynamic("id".into()));
/// assert_eq!(
///     classify_segment("[[...slug]]").unwrap(),
///     RouteSegment::OptionalCatchAll("slug".into())
/// );
/// assert_eq!(classify_segment("(marketing)").unwrap(), RouteSegment::Group("marketing".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteSegment {
    /// Literal text, compared exactly
    Static(String),
    /// `(name)`: organizes files, consumes no path segment
    Group(String),
    /// `[name]`: binds exactly one path segment
    Dynamic(String),
    /// `[[...name]]`: binds zero or more trailing path segments
    OptionalCatchAll(String),
}

impl RouteSegment {
    pub fn param_name(&self) -> Option<&str> {
        match self {
            RouteSegment::Dynamic(name) | RouteSegment::OptionalCatchAll(name) => Some(name),
            RouteSegment::Static(_) | RouteSegment::Group(_) => None,
        }
    }

    /// Whether this segment appears in URLs
    pub fn consumes_path(&self) -> bool {
        !matches!(self, RouteSegment::Group(_))
    }

    /// Match precedence at one position: lower wins
    pub(crate) fn rank(&self) -> u8 {
        match self {
            RouteSegment::Static(_) => 0,
            RouteSegment::Group(_) => 1,
            RouteSegment::Dynamic(_) => 2,
            RouteSegment::OptionalCatchAll(_) => 3,
        }
    }
}

impl fmt::Display for RouteSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteSegment::Static(name) => f.write_str(name),
            RouteSegment::Group(name) => write!(f, "({})", name),
            RouteSegment::Dynamic(name) => write!(f, "[{}]", name),
            RouteSegment::OptionalCatchAll(name) => write!(f, "[[...{}]]", name),
        }
    }
}

/// Classifies one file-path segment
///
/// # Parsing Rules (evaluated in order)
///
/// 1. **Optional catch-all**: `[[...name]]`
/// 2. **Dynamic**: `[name]`
/// 3. **Group**: `(name)`
/// 4. **Static**: any other text without brackets
///
/// Required catch-alls (`[...name]`) and optional dynamic segments
/// (`[[name]]`) are rejected.
pub fn classify_segment(segment: &str) -> Result<RouteSegment, PatternError> {
    if segment.is_empty() {
        return Err(PatternError::EmptySegment);
    }

    if let Some(inner) = segment.strip_prefix("[[") {
        let inner = inner
            .strip_suffix("]]")
            .ok_or_else(|| unbalanced(segment))?;
        let name = inner.strip_prefix("...").ok_or_else(|| unsupported(segment))?;
        return param_name(segment, name).map(RouteSegment::OptionalCatchAll);
    }

    if let Some(inner) = segment.strip_prefix('[') {
        let inner = inner.strip_suffix(']').ok_or_else(|| unbalanced(segment))?;
        if inner.starts_with("...") {
            return Err(unsupported(segment));
        }
        return param_name(segment, inner).map(RouteSegment::Dynamic);
    }

    if segment.contains(['[', ']']) {
        return Err(unbalanced(segment));
    }

    if let Some(name) = segment.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
        if name.is_empty() {
            return Err(PatternError::EmptyGroup {
                segment: segment.to_string(),
            });
        }
        return Ok(RouteSegment::Group(name.to_string()));
    }

    Ok(RouteSegment::Static(segment.to_string()))
}

fn param_name(segment: &str, name: &str) -> Result<String, PatternError> {
    if name.is_empty() {
        return Err(PatternError::EmptyParamName {
            segment: segment.to_string(),
        });
    }
    if !PARAM_NAME.is_match(name) {
        return Err(PatternError::InvalidParamName {
            name: name.to_string(),
        });
    }
    Ok(name.to_string())
}

fn unbalanced(segment: &str) -> PatternError {
    PatternError::UnbalancedBrackets {
        segment: segment.to_string(),
    }
}

fn unsupported(segment: &str) -> PatternError {
    PatternError::UnsupportedSegment {
        segment: segment.to_string(),
    }
}

/// Ordering key for competing patterns: more specific compares lower
///
/// Compares position by position: static before dynamic before catch-all.
/// A pattern that ends where another continues with a catch-all is more
/// specific than that catch-all.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Specificity(Vec<u8>);

/// A validated, immutable route pattern
///
/// # Examples
///
/// ```
/// use trellis_router::RoutePattern;
///
/// let pattern = RoutePattern::parse("/products/[slug]").unwrap();
///
/// let params = pattern.matches_path("/products/7").unwrap();
/// assert_eq!(params.get_one("slug"), Some("7"));
/// assert!(pattern.matches_path("/products").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoutePattern {
    segments: Vec<RouteSegment>,
}

impl RoutePattern {
    /// The root pattern `/`
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Parses a pattern written in file-path syntax
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let normalized = normalize_path(pattern);
        let segments = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(classify_segment)
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_segments(segments)
    }

    /// Validates already classified segments
    pub fn from_segments(segments: Vec<RouteSegment>) -> Result<Self, PatternError> {
        let mut seen: Vec<&str> = Vec::new();

        for (index, segment) in segments.iter().enumerate() {
            if let RouteSegment::OptionalCatchAll(name) = segment {
                if index + 1 != segments.len() {
                    return Err(PatternError::CatchAllNotLast { name: name.clone() });
                }
            }
            if let Some(name) = segment.param_name() {
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateParam {
                        name: name.to_string(),
                    });
                }
                seen.push(name);
            }
        }

        Ok(Self { segments })
    }

    /// Returns a new pattern with `segment` appended
    pub fn child(&self, segment: RouteSegment) -> Result<Self, PatternError> {
        let mut segments = self.segments.clone();
        segments.push(segment);
        Self::from_segments(segments)
    }

    pub fn segments(&self) -> &[RouteSegment] {
        &self.segments
    }

    pub fn params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(RouteSegment::param_name)
    }

    pub fn has_catch_all(&self) -> bool {
        matches!(self.segments.last(), Some(RouteSegment::OptionalCatchAll(_)))
    }

    /// The pattern as it applies to URLs, groups omitted
    ///
    /// ```
    /// use trellis_router::RoutePattern;
    ///
    /// let pattern = RoutePattern::parse("(marketing)/about").unwrap();
    /// assert_eq!(pattern.url_pattern(), "/about");
    /// assert_eq!(pattern.to_string(), "/(marketing)/about");
    /// ```
    pub fn url_pattern(&self) -> String {
        let visible: Vec<String> = self
            .segments
            .iter()
            .filter(|s| s.consumes_path())
            .map(ToString::to_string)
            .collect();
        format!("/{}", visible.join("/"))
    }

    pub fn specificity(&self) -> Specificity {
        Specificity(
            self.segments
                .iter()
                .filter(|s| s.consumes_path())
                .map(|s| match s {
                    RouteSegment::Static(_) => 1,
                    RouteSegment::Dynamic(_) => 2,
                    _ => 3,
                })
                .collect(),
        )
    }

    /// Orders two patterns by specificity, most specific first
    pub fn cmp_specificity(&self, other: &Self) -> Ordering {
        self.specificity().cmp(&other.specificity())
    }

    /// Matches this pattern against pre-split path segments (case-sensitive)
    pub fn matches(&self, path: &[&str]) -> Option<ParamBindings> {
        self.matches_with_options(path, false)
    }

    /// Matches this pattern against pre-split path segments
    ///
    /// Walks pattern and path together. The only non-trivial step is the
    /// trailing catch-all, which greedily takes whatever remains.
    pub fn matches_with_options(
        &self,
        path: &[&str],
        case_insensitive: bool,
    ) -> Option<ParamBindings> {
        fn match_segments(
            pattern: &[RouteSegment],
            path: &[&str],
            mut bindings: ParamBindings,
            case_insensitive: bool,
        ) -> Option<ParamBindings> {
            let Some((segment, rest)) = pattern.split_first() else {
                return path.is_empty().then_some(bindings);
            };

            match segment {
                RouteSegment::Group(_) => match_segments(rest, path, bindings, case_insensitive),
                RouteSegment::OptionalCatchAll(name) => {
                    bindings.insert_many(name.as_str(), path.iter().copied());
                    Some(bindings)
                }
                RouteSegment::Dynamic(name) => {
                    let (first, tail) = path.split_first()?;
                    bindings.insert_one(name.as_str(), *first);
                    match_segments(rest, tail, bindings, case_insensitive)
                }
                RouteSegment::Static(expected) => {
                    let (first, tail) = path.split_first()?;
                    if !segment_eq(expected, first, case_insensitive) {
                        return None;
                    }
                    match_segments(rest, tail, bindings, case_insensitive)
                }
            }
        }

        match_segments(&self.segments, path, ParamBindings::new(), case_insensitive)
    }

    /// Normalizes, splits and decodes `path`, then matches it
    pub fn matches_path(&self, path: &str) -> Option<ParamBindings> {
        let segments = split_segments(path);
        let refs: Vec<&str> = segments.iter().map(String::as_str).collect();
        self.matches(&refs)
    }

    /// Builds a concrete URL from bindings
    ///
    /// Returns `None` when a required binding is missing or has the wrong kind.
    /// An absent catch-all binding is treated as empty.
    ///
    /// ```
    /// use trellis_router::{ParamBindings, RoutePattern};
    ///
    /// let pattern = RoutePattern::parse("/filter/[[...slug]]").unwrap();
    /// let params = ParamBindings::new().with_many("slug", ["a", "b"]);
    /// assert_eq!(pattern.generate_url(&params).unwrap(), "/filter/a/b");
    /// assert_eq!(pattern.generate_url(&ParamBindings::new()).unwrap(), "/filter");
    /// ```
    pub fn generate_url(&self, params: &ParamBindings) -> Option<String> {
        let parts: Option<Vec<Vec<String>>> = self
            .segments
            .iter()
            .map(|segment| match segment {
                RouteSegment::Group(_) => Some(Vec::new()),
                RouteSegment::Static(name) => Some(vec![name.clone()]),
                RouteSegment::Dynamic(name) => params
                    .get_one(name)
                    .map(|value| vec![urlencoding::encode(value).into_owned()]),
                RouteSegment::OptionalCatchAll(name) => match params.get(name) {
                    None => Some(Vec::new()),
                    Some(ParamValue::Many(values)) => Some(
                        values
                            .iter()
                            .map(|v| urlencoding::encode(v).into_owned())
                            .collect(),
                    ),
                    Some(ParamValue::One(_)) => None,
                },
            })
            .collect();

        parts.map(|parts| format!("/{}", parts.concat().join("/")))
    }
}

impl fmt::Display for RoutePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.segments.is_empty() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
