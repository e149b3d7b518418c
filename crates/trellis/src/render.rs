// File: src/render.rs
// Purpose: A single open render and what it shows at each point in time

use tracing::warn;

use crate::compose::ComposePlan;
use crate::lifecycle::{RenderController, RenderState, Retry, Snapshot};
use crate::{Document, Metadata};

/// What a render shows right now
#[derive(Debug, Clone)]
pub enum Frame {
    /// Content is pending and no loading fallback is declared
    Blocked,
    /// Loading fallback inside the layouts above it
    Loading(Document),
    /// Page content inside every layout
    Ready(Document),
    /// Error fallback inside the layouts above it
    Errored(Document),
    /// Not-found fallback, or the generic not-found document
    NotFound(Document),
}

impl Frame {
    pub fn document(&self) -> Option<&Document> {
        match self {
            Frame::Blocked => None,
            Frame::Loading(doc) | Frame::Ready(doc) | Frame::Errored(doc) | Frame::NotFound(doc) => {
                Some(doc)
            }
        }
    }

    /// HTTP-style status for the frame
    pub fn status(&self) -> u16 {
        match self {
            Frame::Blocked | Frame::Loading(_) | Frame::Ready(_) => 200,
            Frame::Errored(_) => 500,
            Frame::NotFound(_) => 404,
        }
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, Frame::Ready(_) | Frame::Errored(_) | Frame::NotFound(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Frame::Blocked => "blocked",
            Frame::Loading(_) => "loading",
            Frame::Ready(_) => "ready",
            Frame::Errored(_) => "errored",
            Frame::NotFound(_) => "not-found",
        }
    }
}

enum RenderKind {
    Page {
        controller: RenderController,
        plan: ComposePlan,
        base: Metadata,
    },
    NotFound(Document),
}

/// An open render for one href
///
/// Dropping it abandons any in-flight attempt.
pub struct Render {
    href: String,
    kind: RenderKind,
}

impl Render {
    pub(crate) fn page(
        href: String,
        controller: RenderController,
        plan: ComposePlan,
        base: Metadata,
    ) -> Self {
        Self {
            href,
            kind: RenderKind::Page {
                controller,
                plan,
                base,
            },
        }
    }

    pub(crate) fn not_found(href: String, document: Document) -> Self {
        Self {
            href,
            kind: RenderKind::NotFound(document),
        }
    }

    pub fn href(&self) -> &str {
        &self.href
    }

    /// The lifecycle controller; `None` for not-found renders
    pub fn controller(&self) -> Option<&RenderController> {
        match &self.kind {
            RenderKind::Page { controller, .. } => Some(controller),
            RenderKind::NotFound(_) => None,
        }
    }

    pub fn current_frame(&self) -> Frame {
        match &self.kind {
            RenderKind::Page {
                controller,
                plan,
                base,
            } => frame_for(&controller.snapshot(), controller, plan, base),
            RenderKind::NotFound(document) => Frame::NotFound(document.clone()),
        }
    }

    /// Waits for the current attempt to settle and returns its frame
    pub async fn settle(&self) -> Frame {
        match &self.kind {
            RenderKind::Page {
                controller,
                plan,
                base,
            } => {
                let snapshot = controller.settle().await;
                frame_for(&snapshot, controller, plan, base)
            }
            RenderKind::NotFound(document) => Frame::NotFound(document.clone()),
        }
    }

    /// Starts a fresh attempt if the render is errored
    pub fn retry(&self) -> bool {
        self.controller().map(RenderController::retry).unwrap_or(false)
    }

    pub fn retry_handle(&self) -> Retry {
        self.controller()
            .map(RenderController::retry_handle)
            .unwrap_or_else(Retry::detached)
    }

    pub fn abandon(&self) {
        if let Some(controller) = self.controller() {
            controller.abandon();
        }
    }
}

fn frame_for(
    snapshot: &Snapshot,
    controller: &RenderController,
    plan: &ComposePlan,
    base: &Metadata,
) -> Frame {
    match &snapshot.state {
        RenderState::Pending => match plan.loading_frame() {
            None => Frame::Blocked,
            Some(Ok(body)) => Frame::Loading(Document::new(base.clone(), body)),
            Some(Err(error)) => {
                warn!(path = %plan.pathname, "loading fallback failed: {}", error);
                let body = plan.error_frame(&error, controller.retry_handle());
                Frame::Errored(Document::new(base.clone(), body))
            }
        },
        RenderState::Ready(rendered) => Frame::Ready(Document::new(
            rendered.metadata.clone(),
            plan.compose(rendered.content.clone()),
        )),
        RenderState::Errored(error) => {
            let body = plan.error_frame(error, controller.retry_handle());
            Frame::Errored(Document::new(base.clone(), body))
        }
    }
}
