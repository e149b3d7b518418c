//! Page metadata and the sequential resolver that merges it down a route chain
//!
//! Metadata is an ordered set of string fields (`title`, `description`,
//! `keywords`, ...). Every layout and page on a chain may contribute a
//! source; sources are merged root to leaf, child fields overriding parent
//! fields and unset fields inheriting.
//!
//! Two fields steer titles instead of being emitted:
//!
//! - `title.template`: a pattern containing `%s`; a title set by a
//!   descendant is rendered through the nearest ancestor's template
//! - `title.default`: the title used when the declaring node sets none

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use trellis_router::ParamBindings;

use crate::config::MetadataConfig;
use crate::handlers::{BoxFuture, MetadataFn};
use crate::MetadataResolutionError;

pub const TITLE: &str = "title";
pub const DESCRIPTION: &str = "description";
pub const TITLE_TEMPLATE: &str = "title.template";
pub const TITLE_DEFAULT: &str = "title.default";

/// Ordered mapping of metadata field to value
///
/// # Examples
///
/// ```
/// use trellis::Metadata;
///
/// let mut metadata = Metadata::new()
///     .with("title", "Metadata example")
///     .with("description", "This is my example of writing static metadata");
///
/// metadata.merge(&Metadata::new().with("title", "Page Un"));
/// assert_eq!(metadata.title(), Some("Page Un"));
/// assert_eq!(metadata.description(), Some("This is my example of writing static metadata"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    fields: Vec<(String, String)>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Sets `key`, keeping its original position when already present
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.fields.iter().position(|(k, _)| k == key)?;
        Some(self.fields.remove(index).1)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TITLE)
    }

    pub fn description(&self) -> Option<&str> {
        self.get(DESCRIPTION)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Overrides fields with those set in `child`; fields `child` leaves unset are kept
    pub fn merge(&mut self, child: &Metadata) {
        for (key, value) in child.iter() {
            self.set(key, value);
        }
    }
}

impl From<&MetadataConfig> for Metadata {
    fn from(config: &MetadataConfig) -> Self {
        let mut metadata = Metadata::new();
        if let Some(title) = &config.title {
            metadata.set(TITLE, title);
        }
        if let Some(description) = &config.description {
            metadata.set(DESCRIPTION, description);
        }
        metadata
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut metadata = Metadata::new();
        for (key, value) in iter {
            metadata.set(key, value);
        }
        metadata
    }
}

/// Where a page or layout gets its metadata from
#[derive(Clone)]
pub enum MetadataSource {
    /// Fixed at registration
    Static(Metadata),
    /// Computed from the route's parameter bindings
    Dynamic(MetadataFn),
}

impl MetadataSource {
    /// Wraps an async resolver
    pub fn dynamic<F, Fut>(resolver: F) -> Self
    where
        F: Fn(ParamBindings) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Metadata, MetadataResolutionError>> + Send + 'static,
    {
        MetadataSource::Dynamic(Arc::new(move |params| -> BoxFuture<'static, _> {
            Box::pin(resolver(params))
        }))
    }

    pub async fn resolve(&self, params: &ParamBindings) -> Result<Metadata, MetadataResolutionError> {
        match self {
            MetadataSource::Static(metadata) => Ok(metadata.clone()),
            MetadataSource::Dynamic(resolver) => resolver(params.clone()).await,
        }
    }
}

impl From<Metadata> for MetadataSource {
    fn from(metadata: Metadata) -> Self {
        MetadataSource::Static(metadata)
    }
}

impl fmt::Debug for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSource::Static(metadata) => f.debug_tuple("Static").field(metadata).finish(),
            MetadataSource::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Resolves merged metadata for a route chain
///
/// `sources` lists `(file, source)` pairs root to leaf: each layout's source,
/// then the page's. Dynamic sources are awaited one at a time. The first
/// failure stops the walk and is tagged with the failing file.
///
/// ```
/// use trellis::{resolve_metadata, Metadata, MetadataSource};
/// use trellis_router::ParamBindings;
///
/// # tokio_test_runtime(async {
/// let root = MetadataSource::from(
///     Metadata::new().with("title.template", "%s | Acme").with("title.default", "Acme"),
/// );
/// let page = MetadataSource::dynamic(|params: ParamBindings| async move {
///     Ok(Metadata::new().with("title", format!("Product {}", params.get_one("slug").unwrap_or("?"))))
/// });
///
/// let params = ParamBindings::new().with_one("slug", "7");
/// let metadata = resolve_metadata(
///     &Metadata::new(),
///     &[("app/layout", &root), ("app/products/[slug]/page", &page)],
///     &params,
/// )
/// .await
/// .unwrap();
///
/// assert_eq!(metadata.title(), Some("Product 7 | Acme"));
/// # });
/// # fn tokio_test_runtime(f: impl std::future::Future<Output = ()>) {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub async fn resolve_metadata(
    base: &Metadata,
    sources: &[(&str, &MetadataSource)],
    params: &ParamBindings,
) -> Result<Metadata, MetadataResolutionError> {
    let mut merged = base.clone();
    let mut template: Option<String> = None;

    for (file, source) in sources {
        let mut own = source
            .resolve(params)
            .await
            .map_err(|err| err.at(*file))?;

        let own_template = own.remove(TITLE_TEMPLATE);
        let own_default = own.remove(TITLE_DEFAULT);

        if let Some(title) = own.remove(TITLE) {
            let rendered = match &template {
                Some(pattern) => pattern.replace("%s", &title),
                None => title,
            };
            merged.set(TITLE, rendered);
        } else if let Some(default) = own_default {
            merged.set(TITLE, default);
        }

        merged.merge(&own);

        if own_template.is_some() {
            template = own_template;
        }

        debug!(file, fields = merged.len(), "metadata merged");
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixed(pairs: &[(&str, &str)]) -> MetadataSource {
        MetadataSource::Static(pairs.iter().copied().collect())
    }

    #[tokio::test]
    async fn test_child_overrides_and_parent_inherits() {
        let layout = fixed(&[("title", "Site"), ("description", "Everything")]);
        let page = fixed(&[("title", "Products")]);

        let metadata = resolve_metadata(
            &Metadata::new(),
            &[("app/layout", &layout), ("app/products/page", &page)],
            &ParamBindings::new(),
        )
        .await
        .unwrap();

        assert_eq!(metadata.title(), Some("Products"));
        assert_eq!(metadata.description(), Some("Everything"));
    }

    #[tokio::test]
    async fn test_base_seeds_accumulator() {
        let base = Metadata::new().with("title", "Acme").with("keywords", "rust");
        let page = fixed(&[("description", "About us")]);

        let metadata = resolve_metadata(&base, &[("app/page", &page)], &ParamBindings::new())
            .await
            .unwrap();

        let fields: Vec<(&str, &str)> = metadata.iter().collect();
        assert_eq!(
            fields,
            vec![("title", "Acme"), ("keywords", "rust"), ("description", "About us")]
        );
    }

    #[tokio::test]
    async fn test_template_applies_to_descendants_only() {
        let layout = fixed(&[("title.template", "%s | Acme"), ("title", "Acme Home")]);
        let page = fixed(&[("title", "About")]);

        let only_layout =
            resolve_metadata(&Metadata::new(), &[("app/layout", &layout)], &ParamBindings::new())
                .await
                .unwrap();
        assert_eq!(only_layout.title(), Some("Acme Home"));
        assert_eq!(only_layout.get("title.template"), None);

        let with_page = resolve_metadata(
            &Metadata::new(),
            &[("app/layout", &layout), ("app/about/page", &page)],
            &ParamBindings::new(),
        )
        .await
        .unwrap();
        assert_eq!(with_page.title(), Some("About | Acme"));
    }

    #[tokio::test]
    async fn test_title_default_when_unset() {
        let layout = fixed(&[("title.template", "%s | Acme"), ("title.default", "Acme")]);
        let page = fixed(&[("description", "No title here")]);

        let metadata = resolve_metadata(
            &Metadata::new(),
            &[("app/layout", &layout), ("app/page", &page)],
            &ParamBindings::new(),
        )
        .await
        .unwrap();

        assert_eq!(metadata.title(), Some("Acme"));
        assert_eq!(metadata.get("title.default"), None);
    }

    #[tokio::test]
    async fn test_failure_is_tagged_with_file() {
        let layout = fixed(&[("title", "Site")]);
        let page = MetadataSource::dynamic(|_params| async {
            Err(MetadataResolutionError::new("unknown slug"))
        });

        let err = resolve_metadata(
            &Metadata::new(),
            &[("app/layout", &layout), ("app/[slug]/page", &page)],
            &ParamBindings::new(),
        )
        .await
        .unwrap_err();

        assert_eq!(err.node, "app/[slug]/page");
        assert_eq!(err.message, "unknown slug");
    }

    #[test]
    fn test_serializes_in_order() {
        let metadata = Metadata::new().with("title", "A").with("description", "B");
        let json = serde_json::to_string(&metadata).unwrap();
        assert_eq!(json, r#"{"fields":[["title","A"],["description","B"]]}"#);
    }
}
