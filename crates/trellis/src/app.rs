// File: src/app.rs
// Purpose: Route declaration surface and per-request render setup

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use maud::Markup;
use tracing::{debug, info};
use trellis_router::{
    FileRole, MatchError, ParamBindings, Resolution, RouteFile, RouteNode, Router,
};

use crate::compose::{generic_error_fallback, generic_not_found, Boundary, ComposePlan, LayoutSlot};
use crate::config::Config;
use crate::handlers::{
    page_fn, BoxFuture, ErrorFn, LayoutFn, LayoutProps, LoadingFn, NotFoundFn, PageContext, PageFn,
};
use crate::lifecycle::{ContentJob, ErrorReporter, RenderController, Rendered, Retry, TracingReporter};
use crate::metadata::resolve_metadata;
use crate::navigation::NavigationContext;
use crate::render::Render;
use crate::{AppError, ContentError, Document, Metadata, MetadataSource};

/// A registered route file handler
#[derive(Clone)]
enum Handler {
    Page(PageFn),
    Layout(LayoutFn),
    Loading(LoadingFn),
    Error(ErrorFn),
    NotFound(NotFoundFn),
}

impl Handler {
    fn role(&self) -> FileRole {
        match self {
            Handler::Page(_) => FileRole::Page,
            Handler::Layout(_) => FileRole::Layout,
            Handler::Loading(_) => FileRole::Loading,
            Handler::Error(_) => FileRole::Error,
            Handler::NotFound(_) => FileRole::NotFound,
        }
    }
}

/// Collects route files with their handlers
///
/// Declaration errors are collected and reported by [`AppBuilder::build`].
///
/// # Examples
///
/// ```
/// use maud::html;
/// use trellis::App;
///
/// let app = App::builder()
///     .layout("app/layout", |props| html! { main { (props.children) } })
///     .page("app/page", |_ctx| async { Ok(html! { h1 { "Home" } }) })
///     .build()
///     .unwrap();
///
/// assert_eq!(app.router().routes().len(), 1);
/// ```
pub struct AppBuilder {
    app_dir: String,
    case_insensitive: bool,
    files: Vec<(String, Handler)>,
    metadata: Vec<(String, MetadataSource)>,
    base_metadata: Metadata,
    generic_error_message: String,
    not_found_message: String,
    reporter: Arc<dyn ErrorReporter>,
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl AppBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the routing, render and metadata sections of `config`
    pub fn from_config(config: &Config) -> Self {
        Self {
            app_dir: config.routing.app_dir.clone(),
            case_insensitive: config.routing.case_insensitive,
            files: Vec::new(),
            metadata: Vec::new(),
            base_metadata: Metadata::from(&config.metadata),
            generic_error_message: config.render.generic_error_message.clone(),
            not_found_message: config.render.not_found_message.clone(),
            reporter: Arc::new(TracingReporter),
        }
    }

    pub fn app_dir(mut self, app_dir: impl Into<String>) -> Self {
        self.app_dir = app_dir.into();
        self
    }

    pub fn case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    /// Metadata every route starts from
    pub fn base_metadata(mut self, metadata: Metadata) -> Self {
        self.base_metadata = metadata;
        self
    }

    /// Replaces the default `TracingReporter`
    pub fn reporter(mut self, reporter: Arc<dyn ErrorReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn page<F, Fut>(mut self, file: impl Into<String>, handler: F) -> Self
    where
        F: Fn(PageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Markup, ContentError>> + Send + 'static,
    {
        self.files.push((file.into(), Handler::Page(page_fn(handler))));
        self
    }

    pub fn layout<F>(mut self, file: impl Into<String>, handler: F) -> Self
    where
        F: Fn(LayoutProps) -> Markup + Send + Sync + 'static,
    {
        self.files.push((file.into(), Handler::Layout(Arc::new(handler))));
        self
    }

    pub fn loading<F>(mut self, file: impl Into<String>, handler: F) -> Self
    where
        F: Fn() -> Result<Markup, ContentError> + Send + Sync + 'static,
    {
        self.files.push((file.into(), Handler::Loading(Arc::new(handler))));
        self
    }

    pub fn error<F>(mut self, file: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&ContentError, Retry) -> Markup + Send + Sync + 'static,
    {
        self.files.push((file.into(), Handler::Error(Arc::new(handler))));
        self
    }

    pub fn not_found<F>(mut self, file: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&NavigationContext) -> Markup + Send + Sync + 'static,
    {
        self.files.push((file.into(), Handler::NotFound(Arc::new(handler))));
        self
    }

    /// Attaches a metadata source to a page or layout file
    pub fn metadata(mut self, file: impl Into<String>, source: impl Into<MetadataSource>) -> Self {
        self.metadata.push((file.into(), source.into()));
        self
    }

    pub fn build(self) -> Result<App, AppError> {
        let mut router = Router::builder().case_insensitive(self.case_insensitive);
        let mut handlers: HashMap<String, Handler> = HashMap::new();

        for (file, handler) in self.files {
            let route_file = RouteFile::from_path(&file, &self.app_dir)?;
            if route_file.role != handler.role() {
                return Err(AppError::RoleMismatch {
                    file,
                    expected: handler.role(),
                    found: route_file.role,
                });
            }
            if handlers.contains_key(&file) {
                return Err(AppError::DuplicateHandler {
                    file,
                    role: route_file.role,
                });
            }
            router = router.with_file(route_file);
            handlers.insert(file, handler);
        }

        let mut metadata = HashMap::new();
        for (file, source) in self.metadata {
            let target = matches!(
                handlers.get(&file),
                Some(Handler::Page(_)) | Some(Handler::Layout(_))
            );
            if !target {
                return Err(AppError::MetadataTarget { file });
            }
            metadata.insert(file, source);
        }

        let router = router.build()?;
        info!(
            routes = router.routes().len(),
            files = handlers.len(),
            "app built"
        );

        Ok(App {
            router,
            handlers,
            metadata,
            base_metadata: self.base_metadata,
            generic_error: generic_error_fallback(self.generic_error_message),
            not_found_message: self.not_found_message,
            reporter: self.reporter,
        })
    }
}

/// An immutable set of routes with their handlers
///
/// Shared freely between concurrent renders.
pub struct App {
    router: Router,
    handlers: HashMap<String, Handler>,
    metadata: HashMap<String, MetadataSource>,
    base_metadata: Metadata,
    generic_error: ErrorFn,
    not_found_message: String,
    reporter: Arc<dyn ErrorReporter>,
}

impl App {
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn base_metadata(&self) -> &Metadata {
        &self.base_metadata
    }

    /// Opens a render for `href` with no navigation runtime attached
    ///
    /// Must be called inside a tokio runtime.
    pub fn render(&self, href: &str) -> Render {
        self.render_with(NavigationContext::from_href(href))
    }

    /// Opens a render for the location in `navigation`
    pub fn render_with(&self, navigation: NavigationContext) -> Render {
        let href = navigation.href();
        let path = navigation.pathname().to_string();

        match self.router.resolve(&path) {
            Ok(Resolution::Matched(matched)) => {
                let plan = self.plan(&matched.chain, &matched.params, &path);
                let job = self.content_job(
                    &matched.chain,
                    matched.page_file(),
                    matched.params.clone(),
                    navigation,
                );
                let controller = RenderController::start(path, job, Arc::clone(&self.reporter));
                Render::page(href, controller, plan, self.base_metadata.clone())
            }
            Ok(Resolution::NotFound(not_found)) => {
                let body = match self.handlers.get(not_found.not_found_file()) {
                    Some(Handler::NotFound(handler)) => handler(&navigation),
                    _ => generic_not_found(&self.not_found_message),
                };
                let plan = self.plan(&not_found.chain, &ParamBindings::new(), &path);
                debug!(path = %path, "rendering not-found fallback");
                Render::not_found(href, Document::new(self.base_metadata.clone(), plan.compose(body)))
            }
            Err(MatchError::NoRoute { .. }) => {
                debug!(path = %path, "rendering generic not-found");
                Render::not_found(
                    href,
                    Document::new(self.base_metadata.clone(), generic_not_found(&self.not_found_message)),
                )
            }
        }
    }

    /// Collects layouts and the deepest boundaries along `chain`
    fn plan(&self, chain: &[Arc<RouteNode>], params: &ParamBindings, pathname: &str) -> ComposePlan {
        let mut layouts = Vec::new();
        let mut loading = None;
        let mut error = Boundary {
            depth: 0,
            file: String::new(),
            handler: Arc::clone(&self.generic_error),
        };

        for (depth, node) in chain.iter().enumerate() {
            if let Some(file) = node.file(FileRole::Layout) {
                if let Some(Handler::Layout(handler)) = self.handlers.get(file) {
                    layouts.push(LayoutSlot {
                        depth,
                        file: file.to_string(),
                        handler: Arc::clone(handler),
                    });
                }
            }
            if let Some(file) = node.file(FileRole::Loading) {
                if let Some(Handler::Loading(handler)) = self.handlers.get(file) {
                    loading = Some(Boundary {
                        depth,
                        file: file.to_string(),
                        handler: Arc::clone(handler),
                    });
                }
            }
            if let Some(file) = node.file(FileRole::Error) {
                if let Some(Handler::Error(handler)) = self.handlers.get(file) {
                    error = Boundary {
                        depth,
                        file: file.to_string(),
                        handler: Arc::clone(handler),
                    };
                }
            }
        }

        ComposePlan {
            layouts,
            loading,
            error,
            params: params.clone(),
            pathname: pathname.to_string(),
        }
    }

    /// Metadata resolution followed by the page, re-run by every attempt
    fn content_job(
        &self,
        chain: &[Arc<RouteNode>],
        page_file: &str,
        params: ParamBindings,
        navigation: NavigationContext,
    ) -> ContentJob {
        let mut sources: Vec<(String, MetadataSource)> = Vec::new();
        for node in chain {
            if let Some(file) = node.file(FileRole::Layout) {
                if let Some(source) = self.metadata.get(file) {
                    sources.push((file.to_string(), source.clone()));
                }
            }
        }
        if let Some(source) = self.metadata.get(page_file) {
            sources.push((page_file.to_string(), source.clone()));
        }

        let page = match self.handlers.get(page_file) {
            Some(Handler::Page(page)) => Some(Arc::clone(page)),
            _ => None,
        };
        let page_file = page_file.to_string();
        let base = self.base_metadata.clone();

        Arc::new(move || -> BoxFuture<'static, Result<Rendered, ContentError>> {
            let sources = sources.clone();
            let page = page.clone();
            let page_file = page_file.clone();
            let base = base.clone();
            let ctx = PageContext {
                params: params.clone(),
                navigation: navigation.clone(),
            };

            Box::pin(async move {
                let refs: Vec<(&str, &MetadataSource)> =
                    sources.iter().map(|(file, source)| (file.as_str(), source)).collect();
                let metadata = resolve_metadata(&base, &refs, &ctx.params).await?;

                let page = page.ok_or_else(|| {
                    ContentError::new(format!("no page handler registered for `{}`", page_file))
                })?;
                let content = page(ctx).await?;

                Ok::<_, ContentError>(Rendered { metadata, content })
            })
        })
    }
}
