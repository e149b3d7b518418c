//! Layout composition around a page or a boundary fallback
//!
//! A route chain contributes layouts (outermost first), at most one page
//! and optional loading and error boundaries. The composer wraps content
//! inside out: the page (or fallback) sits innermost and each ancestor
//! layout wraps what is below it.
//!
//! A boundary declared at depth `i` replaces everything beneath the layout
//! at depth `i`, deeper layouts included. Layouts at depth `<= i` keep
//! rendering around it.

use std::sync::Arc;

use maud::{html, Markup};
use trellis_router::ParamBindings;

use crate::handlers::{ErrorFn, LayoutFn, LayoutProps, LoadingFn};
use crate::lifecycle::Retry;
use crate::ContentError;

/// A layout on the chain
#[derive(Clone)]
pub struct LayoutSlot {
    /// Index of the declaring node in the chain; the root is 0
    pub depth: usize,
    pub file: String,
    pub handler: LayoutFn,
}

/// A loading or error fallback on the chain
#[derive(Clone)]
pub struct Boundary<H> {
    pub depth: usize,
    pub file: String,
    pub handler: H,
}

/// Everything needed to compose one route's output
#[derive(Clone)]
pub struct ComposePlan {
    pub layouts: Vec<LayoutSlot>,
    /// Deepest loading fallback on the chain
    pub loading: Option<Boundary<LoadingFn>>,
    /// Deepest error fallback on the chain, or the built-in one at the root
    pub error: Boundary<ErrorFn>,
    pub params: ParamBindings,
    pub pathname: String,
}

impl ComposePlan {
    /// Wraps page output in every layout on the chain
    pub fn compose(&self, content: Markup) -> Markup {
        self.wrap(content, |_| true)
    }

    /// Wraps a boundary region in the layouts at depth `<= depth`
    pub fn compose_shell(&self, depth: usize, region: Markup) -> Markup {
        self.wrap(region, |layout| layout.depth <= depth)
    }

    fn wrap(&self, inner: Markup, keep: impl Fn(&LayoutSlot) -> bool) -> Markup {
        self.layouts
            .iter()
            .rev()
            .filter(|layout| keep(layout))
            .fold(inner, |children, layout| {
                (layout.handler)(LayoutProps {
                    children,
                    params: self.params.clone(),
                    pathname: self.pathname.clone(),
                })
            })
    }

    /// The loading fallback in its shell
    ///
    /// `None` when the chain declares no loading fallback.
    pub fn loading_frame(&self) -> Option<Result<Markup, ContentError>> {
        let boundary = self.loading.as_ref()?;
        Some((boundary.handler)().map(|region| self.compose_shell(boundary.depth, region)))
    }

    /// The error fallback for `error` in its shell
    pub fn error_frame(&self, error: &ContentError, retry: Retry) -> Markup {
        let region = (self.error.handler)(error, retry);
        self.compose_shell(self.error.depth, region)
    }
}

/// Error fallback used when a chain declares none
pub fn generic_error_fallback(message: impl Into<String>) -> ErrorFn {
    let message = message.into();
    Arc::new(move |error: &ContentError, _retry: Retry| {
        html! {
            div class="error" {
                h2 { (message) }
                p { (error.message()) }
            }
        }
    })
}

/// Not-found document body used when a chain declares no not-found fallback
pub fn generic_not_found(message: &str) -> Markup {
    html! {
        div class="not-found" {
            h1 { "404" }
            p { (message) }
        }
    }
}
