//! Route module for file-based routing
//!
//! - `pattern`: typed segments, validation and the path segment matcher
//! - `file`: route file ids and their roles

pub mod file;
pub mod pattern;

pub use file::{FileRole, RouteFile};
pub use pattern::{classify_segment, RoutePattern, RouteSegment, Specificity};
