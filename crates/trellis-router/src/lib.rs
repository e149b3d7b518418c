//! File-system-shaped routing for nested app layouts
//!
//! Routes are declared by file ids that look like paths inside an app
//! directory. The directory part is the route pattern and the file stem is
//! the role the file plays for that route:
//!
//! | File                         | Role                                   |
//! |------------------------------|----------------------------------------|
//! | `app/page`                   | page answering `/`                     |
//! | `app/products/[slug]/page`   | page binding one segment to `slug`     |
//! | `app/filter/[[...slug]]/page`| page binding zero or more segments     |
//! | `app/(marketing)/layout`     | layout for a group, no URL segment     |
//! | `app/dashboard/layout`       | layout wrapping everything below       |
//! | `app/loading-example/loading`| placeholder while the page is pending  |
//! | `app/error-example/error`    | fallback when content below fails      |
//! | `app/not-found`              | fallback when no page matches          |
//!
//! Matching precedence at each position: static, then group, then dynamic,
//! then optional catch-all.
//!
//! # Example
//!
//! ```
//! use trellis_router::{Resolution, Router};
//!
//! let router = Router::builder()
//!     .with_path("app/layout", "app").unwrap()
//!     .with_path("app/page", "app").unwrap()
//!     .with_path("app/not-found", "app").unwrap()
//!     .with_path("app/products/page", "app").unwrap()
//!     .with_path("app/products/[slug]/page", "app").unwrap()
//!     .with_path("app/filter/[[...slug]]/page", "app").unwrap()
//!     .build()
//!     .unwrap();
//!
//! let Resolution::Matched(m) = router.resolve("/products/7").unwrap() else {
//!     panic!("expected a match");
//! };
//! assert_eq!(m.params.get_one("slug"), Some("7"));
//! assert_eq!(m.chain.len(), 3);
//!
//! let Resolution::Matched(m) = router.resolve("/filter").unwrap() else {
//!     panic!("expected a match");
//! };
//! assert!(m.params.get_many("slug").unwrap().is_empty());
//!
//! assert!(!router.resolve("/nope/nothing").unwrap().is_matched());
//! ```

mod error;
mod params;
pub mod path;
pub mod route;
mod table;

pub use error::{BuildError, MatchError, PatternError};
pub use params::{ParamBindings, ParamValue};
pub use route::{classify_segment, FileRole, RouteFile, RoutePattern, RouteSegment, Specificity};
pub use table::{
    NotFoundMatch, Resolution, RouteFiles, RouteMatch, RouteNode, Router, RouterBuilder,
};
