//! Trellis: nested layouts and supervised async rendering over a file-path route table
//!
//! An [`App`] is declared from route files, each bound to a handler:
//!
//! - **page**: async content for a route; the only place data is fetched
//! - **layout**: pure wrapper around everything beneath it
//! - **loading**: placeholder shown while the content step is pending
//! - **error**: fallback shown with a [`Retry`] handle when content fails
//! - **not-found**: fallback for paths no page answers
//!
//! Pages and layouts may carry a [`MetadataSource`]; metadata is merged
//! root to leaf before the page runs.
//!
//! # Example
//!
//! ```
//! use maud::html;
//! use trellis::{App, Frame};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let app = App::builder()
//!     .layout("app/layout", |props| html! { main { (props.children) } })
//!     .page("app/products/[slug]/page", |ctx| async move {
//!         let slug = ctx.params.get_one("slug").unwrap_or_default().to_string();
//!         Ok(html! { h1 { "Product " (slug) } })
//!     })
//!     .build()
//!     .unwrap();
//!
//! let render = app.render("/products/7");
//! let Frame::Ready(doc) = render.settle().await else {
//!     panic!("expected the page to render");
//! };
//! assert_eq!(doc.body.into_string(), "<main><h1>Product 7</h1></main>");
//! # });
//! ```

pub mod app;
pub mod compose;
pub mod config;
pub mod document;
mod error;
pub mod handlers;
pub mod lifecycle;
pub mod metadata;
pub mod navigation;
pub mod render;
pub mod session;

pub use app::{App, AppBuilder};
pub use config::Config;
pub use document::Document;
pub use error::{AppError, ContentError, MetadataResolutionError, NavigationError};
pub use handlers::{LayoutProps, PageContext};
pub use lifecycle::{
    AttemptInfo, ErrorReporter, RenderController, RenderState, Rendered, Retry, Snapshot,
    TracingReporter,
};
pub use metadata::{resolve_metadata, Metadata, MetadataSource};
pub use navigation::{NavigationContext, NavigationIntent, NavigationMode, SearchParams};
pub use render::{Frame, Render};
pub use session::Session;

pub use trellis_router as router;
