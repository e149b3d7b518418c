//! Route files: the declaration surface of the route table
//!
//! Every route is declared by a file-path-shaped id such as
//! `app/products/[slug]/page` or `app/(marketing)/layout.rsx`. The directory
//! part is the route pattern, the file stem names the role.

use std::fmt;

use crate::{classify_segment, BuildError, RoutePattern};

/// What a route file contributes to its route node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileRole {
    Page,
    Layout,
    Loading,
    Error,
    NotFound,
}

impl FileRole {
    pub const ALL: [FileRole; 5] = [
        FileRole::Page,
        FileRole::Layout,
        FileRole::Loading,
        FileRole::Error,
        FileRole::NotFound,
    ];

    /// Maps a file stem (`page`, `layout`, `loading`, `error`, `not-found`) to a role
    pub fn from_stem(stem: &str) -> Option<Self> {
        match stem {
            "page" => Some(FileRole::Page),
            "layout" => Some(FileRole::Layout),
            "loading" => Some(FileRole::Loading),
            "error" => Some(FileRole::Error),
            "not-found" => Some(FileRole::NotFound),
            _ => None,
        }
    }

    pub fn stem(&self) -> &'static str {
        match self {
            FileRole::Page => "page",
            FileRole::Layout => "layout",
            FileRole::Loading => "loading",
            FileRole::Error => "error",
            FileRole::NotFound => "not-found",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// A declared route file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteFile {
    /// The id the file was declared with; handlers are keyed by it
    pub id: String,
    /// Directory pattern of the file
    pub pattern: RoutePattern,
    pub role: FileRole,
}

impl RouteFile {
    /// Creates a route file from a file-system-shaped path
    ///
    /// `app_dir` is stripped from the front. Backslashes are accepted and an
    /// extension on the file stem is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_router::{FileRole, RouteFile};
    ///
    /// let file = RouteFile::from_path("app/products/[slug]/page.rsx", "app").unwrap();
    /// assert_eq!(file.role, FileRole::Page);
    /// assert_eq!(file.pattern.to_string(), "/products/[slug]");
    ///
    /// let layout = RouteFile::from_path("app/(marketing)/layout", "app").unwrap();
    /// assert_eq!(layout.role, FileRole::Layout);
    /// assert_eq!(layout.pattern.url_pattern(), "/");
    /// ```
    pub fn from_path(file_path: &str, app_dir: &str) -> Result<Self, BuildError> {
        let unified = file_path.replace('\\', "/");
        let app_dir = app_dir.replace('\\', "/");
        let app_dir = app_dir.trim_matches('/');

        let relative = if app_dir.is_empty() {
            unified.trim_start_matches('/')
        } else {
            let trimmed = unified.trim_start_matches('/');
            trimmed
                .strip_prefix(app_dir)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(trimmed)
                .trim_start_matches('/')
        };

        let mut parts: Vec<&str> = relative.split('/').filter(|s| !s.is_empty()).collect();
        let file_name = parts.pop().ok_or_else(|| BuildError::UnknownFileRole {
            file: file_path.to_string(),
        })?;

        let stem = file_name.split('.').next().unwrap_or(file_name);
        let role = FileRole::from_stem(stem).ok_or_else(|| BuildError::UnknownFileRole {
            file: file_path.to_string(),
        })?;

        let pattern = parts
            .into_iter()
            .map(classify_segment)
            .collect::<Result<Vec<_>, _>>()
            .and_then(RoutePattern::from_segments)
            .map_err(|source| BuildError::Pattern {
                file: file_path.to_string(),
                source,
            })?;

        Ok(Self {
            id: file_path.to_string(),
            pattern,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PatternError, RouteSegment};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("app/page", "/", FileRole::Page)]
    #[case("app/not-found.tsx", "/", FileRole::NotFound)]
    #[case("app/error-example/error", "/error-example", FileRole::Error)]
    #[case("app/loading-example/loading", "/loading-example", FileRole::Loading)]
    #[case("app/dashboard/layout.rsx", "/dashboard", FileRole::Layout)]
    #[case(
        "app/optional-catch-all-route/[[...slug]]/page",
        "/optional-catch-all-route/[[...slug]]",
        FileRole::Page
    )]
    #[case("app\\metadata-example\\[slug]\\page", "/metadata-example/[slug]", FileRole::Page)]
    fn test_from_path(#[case] path: &str, #[case] pattern: &str, #[case] role: FileRole) {
        let file = RouteFile::from_path(path, "app").unwrap();
        assert_eq!(file.pattern.to_string(), pattern);
        assert_eq!(file.role, role);
        assert_eq!(file.id, path);
    }

    #[test]
    fn test_app_dir_only_strips_whole_segment() {
        let file = RouteFile::from_path("application/page", "app").unwrap();
        assert_eq!(
            file.pattern.segments(),
            &[RouteSegment::Static("application".into())]
        );
    }

    #[test]
    fn test_unknown_role_rejected() {
        let err = RouteFile::from_path("app/products/index", "app").unwrap_err();
        assert_eq!(
            err,
            BuildError::UnknownFileRole {
                file: "app/products/index".into()
            }
        );
    }

    #[test]
    fn test_pattern_errors_carry_file() {
        let err = RouteFile::from_path("app/[[...slug]]/edit/page", "app").unwrap_err();
        assert_eq!(
            err,
            BuildError::Pattern {
                file: "app/[[...slug]]/edit/page".into(),
                source: PatternError::CatchAllNotLast { name: "slug".into() },
            }
        );
    }

    #[test]
    fn test_role_stems_round_trip() {
        for role in FileRole::ALL {
            assert_eq!(FileRole::from_stem(role.stem()), Some(role));
        }
    }
}
