// File: src/handlers.rs
// Purpose: Handler contracts for route files

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use maud::Markup;
use trellis_router::ParamBindings;

use crate::lifecycle::Retry;
use crate::navigation::NavigationContext;
use crate::{ContentError, Metadata, MetadataResolutionError};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Async page content: the only handler allowed to fetch data
pub type PageFn =
    Arc<dyn Fn(PageContext) -> BoxFuture<'static, Result<Markup, ContentError>> + Send + Sync>;

/// Pure wrapper around already-rendered child content
pub type LayoutFn = Arc<dyn Fn(LayoutProps) -> Markup + Send + Sync>;

/// Placeholder shown while content is pending
pub type LoadingFn = Arc<dyn Fn() -> Result<Markup, ContentError> + Send + Sync>;

/// Fallback shown when content below it fails
pub type ErrorFn = Arc<dyn Fn(&ContentError, Retry) -> Markup + Send + Sync>;

/// Fallback shown when no page matches
pub type NotFoundFn = Arc<dyn Fn(&NavigationContext) -> Markup + Send + Sync>;

pub type MetadataFn = Arc<
    dyn Fn(ParamBindings) -> BoxFuture<'static, Result<Metadata, MetadataResolutionError>>
        + Send
        + Sync,
>;

/// Input handed to a page
#[derive(Debug, Clone)]
pub struct PageContext {
    pub params: ParamBindings,
    pub navigation: NavigationContext,
}

/// Input handed to a layout
#[derive(Debug, Clone)]
pub struct LayoutProps {
    /// Rendered output of everything beneath this layout
    pub children: Markup,
    pub params: ParamBindings,
    pub pathname: String,
}

pub(crate) fn page_fn<F, Fut>(handler: F) -> PageFn
where
    F: Fn(PageContext) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Markup, ContentError>> + Send + 'static,
{
    Arc::new(move |ctx| -> BoxFuture<'static, _> { Box::pin(handler(ctx)) })
}
