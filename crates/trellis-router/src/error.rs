//! Errors raised while declaring routes and while resolving paths.

use thiserror::Error;

use crate::route::FileRole;

/// A route pattern that cannot be accepted.
///
/// Raised while the route table is built, never at request time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("route pattern contains an empty segment")]
    EmptySegment,

    #[error("segment `{segment}` has unbalanced brackets")]
    UnbalancedBrackets { segment: String },

    #[error("segment `{segment}` declares an empty parameter name")]
    EmptyParamName { segment: String },

    #[error("`{name}` is not a valid parameter name")]
    InvalidParamName { name: String },

    #[error("segment `{segment}` uses an unsupported form (only `[name]` and `[[...name]]` are accepted)")]
    UnsupportedSegment { segment: String },

    #[error("segment `{segment}` declares an empty route group")]
    EmptyGroup { segment: String },

    #[error("catch-all parameter `{name}` must be the last segment")]
    CatchAllNotLast { name: String },

    #[error("parameter `{name}` is declared more than once")]
    DuplicateParam { name: String },
}

/// A route table that cannot be built from the declared files.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("invalid route file `{file}`: {source}")]
    Pattern {
        file: String,
        #[source]
        source: PatternError,
    },

    #[error("`{file}` is not a route file (expected page, layout, loading, error or not-found)")]
    UnknownFileRole { file: String },

    #[error("route `{pattern}` declares more than one {role} file")]
    DuplicateFile { pattern: String, role: FileRole },

    #[error("routes `{first}` and `{second}` resolve to the same path")]
    AmbiguousRoute { first: String, second: String },

    #[error("route `{pattern}` uses different parameter names (`{first}` and `{second}`) at the same position")]
    ConflictingParamNames {
        pattern: String,
        first: String,
        second: String,
    },
}

/// Resolution failure that no not-found fallback can absorb.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    #[error("no route matches `{path}` and no not-found fallback is declared")]
    NoRoute { path: String },
}
