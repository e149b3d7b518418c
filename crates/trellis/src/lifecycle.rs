//! Render lifecycle: one supervised content step per attempt
//!
//! A controller runs the content step (metadata resolution, then the page) as
//! a tokio task and publishes its state through a `watch` channel:
//!
//! ```text
//!            retry()
//!   ┌──────────────────────────┐
//!   v                          │
//! Pending ──> Ready(content)   │
//!   │                          │
//!   └──────> Errored(error) ───┘
//! ```
//!
//! Each attempt transitions exactly once. A completion that arrives for an
//! attempt that is no longer current is dropped. Abandoning aborts the task
//! and freezes the state where it is.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use maud::Markup;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, error, info_span, Instrument};
use uuid::Uuid;

use crate::handlers::BoxFuture;
use crate::{ContentError, Metadata};

/// The content step re-run by every attempt
pub type ContentJob =
    Arc<dyn Fn() -> BoxFuture<'static, Result<Rendered, ContentError>> + Send + Sync>;

/// Output of a successful content step
#[derive(Debug, Clone)]
pub struct Rendered {
    pub metadata: Metadata,
    pub content: Markup,
}

#[derive(Debug, Clone)]
pub enum RenderState {
    Pending,
    Ready(Rendered),
    Errored(ContentError),
}

impl RenderState {
    pub fn is_pending(&self) -> bool {
        matches!(self, RenderState::Pending)
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, RenderState::Errored(_))
    }
}

/// Identity of one attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptInfo {
    /// 1 for the first attempt, incremented by each retry
    pub number: u32,
    pub id: Uuid,
    pub path: String,
}

/// What subscribers observe
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub attempt: AttemptInfo,
    pub state: RenderState,
    pub abandoned: bool,
}

/// Receives every content failure before its fallback is shown
pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &ContentError, attempt: &AttemptInfo);
}

/// Logs failures through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, error: &ContentError, attempt: &AttemptInfo) {
        error!(
            attempt = attempt.number,
            id = %attempt.id,
            path = %attempt.path,
            "content failed: {}",
            error
        );
    }
}

struct Shared {
    job: ContentJob,
    reporter: Arc<dyn ErrorReporter>,
    runtime: Handle,
    state: watch::Sender<Snapshot>,
    task: Mutex<Option<AbortHandle>>,
}

impl Shared {
    fn spawn_attempt(self: &Arc<Self>, attempt: AttemptInfo) {
        let weak = Arc::downgrade(self);
        let job = Arc::clone(&self.job);
        let number = attempt.number;
        let span = info_span!(
            "attempt",
            id = %attempt.id,
            number = attempt.number,
            path = %attempt.path
        );

        let handle = self.runtime.spawn(
            async move {
                debug!("attempt started");
                let result = job().await;
                if let Some(shared) = weak.upgrade() {
                    shared.complete(number, result);
                }
            }
            .instrument(span),
        );

        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle.abort_handle());
    }

    /// Applies the outcome of attempt `number` if it is still the pending one
    ///
    /// The check, the report and the transition happen under the channel's
    /// write lock, so a concurrent `abandon` either wins outright or comes
    /// after the transition. Reporters must not call back into the render.
    fn complete(&self, number: u32, result: Result<Rendered, ContentError>) {
        let settled = self.state.send_if_modified(|snapshot| {
            let current = snapshot.attempt.number == number
                && snapshot.state.is_pending()
                && !snapshot.abandoned;
            if !current {
                return false;
            }
            if let Err(error) = &result {
                self.reporter.report(error, &snapshot.attempt);
            }
            snapshot.state = match result {
                Ok(rendered) => RenderState::Ready(rendered),
                Err(error) => RenderState::Errored(error),
            };
            true
        });

        if settled {
            debug!(number, errored = self.state.borrow().state.is_errored(), "attempt settled");
        } else {
            debug!(number, "stale completion ignored");
        }
    }

    fn retry(self: &Arc<Self>) -> bool {
        let mut next = None;

        self.state.send_if_modified(|snapshot| {
            if snapshot.abandoned || !snapshot.state.is_errored() {
                return false;
            }
            snapshot.attempt = AttemptInfo {
                number: snapshot.attempt.number + 1,
                id: Uuid::new_v4(),
                path: snapshot.attempt.path.clone(),
            };
            snapshot.state = RenderState::Pending;
            next = Some(snapshot.attempt.clone());
            true
        });

        match next {
            Some(attempt) => {
                debug!(number = attempt.number, id = %attempt.id, "retrying");
                self.spawn_attempt(attempt);
                true
            }
            None => false,
        }
    }

    fn abandon(&self) {
        let changed = self.state.send_if_modified(|snapshot| {
            if snapshot.abandoned {
                return false;
            }
            snapshot.abandoned = true;
            true
        });

        if let Some(task) = self.task.lock().unwrap_or_else(PoisonError::into_inner).take() {
            task.abort();
        }

        if changed {
            debug!(path = %self.state.borrow().attempt.path, "render abandoned");
        }
    }
}

/// Handle given to error fallbacks to start a fresh attempt
///
/// Holds no ownership over the render: once the controller is gone,
/// `retry` does nothing.
#[derive(Clone)]
pub struct Retry {
    shared: Weak<Shared>,
}

impl Retry {
    /// Starts a new attempt if the render is currently errored
    pub fn retry(&self) -> bool {
        match self.shared.upgrade() {
            Some(shared) => shared.retry(),
            None => false,
        }
    }

    /// A handle attached to nothing
    pub fn detached() -> Self {
        Self { shared: Weak::new() }
    }

    /// Number of the attempt that is current right now
    pub fn attempt(&self) -> Option<u32> {
        let shared = self.shared.upgrade()?;
        let number = shared.state.borrow().attempt.number;
        Some(number)
    }
}

impl fmt::Debug for Retry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("attached", &(self.shared.strong_count() > 0))
            .finish()
    }
}

/// Drives one render through its attempts
///
/// Dropping the controller abandons the render.
pub struct RenderController {
    shared: Arc<Shared>,
}

impl RenderController {
    /// Starts the first attempt on the current tokio runtime
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn start(path: impl Into<String>, job: ContentJob, reporter: Arc<dyn ErrorReporter>) -> Self {
        let attempt = AttemptInfo {
            number: 1,
            id: Uuid::new_v4(),
            path: path.into(),
        };
        let (state, _) = watch::channel(Snapshot {
            attempt: attempt.clone(),
            state: RenderState::Pending,
            abandoned: false,
        });

        let shared = Arc::new(Shared {
            job,
            reporter,
            runtime: Handle::current(),
            state,
            task: Mutex::new(None),
        });
        shared.spawn_attempt(attempt);

        Self { shared }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.shared.state.borrow().clone()
    }

    pub fn state(&self) -> RenderState {
        self.shared.state.borrow().state.clone()
    }

    pub fn attempt(&self) -> AttemptInfo {
        self.shared.state.borrow().attempt.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.shared.state.subscribe()
    }

    /// Waits until the current attempt settles or the render is abandoned
    ///
    /// Never times out: a content step that never finishes keeps this pending.
    pub async fn settle(&self) -> Snapshot {
        let mut updates = self.subscribe();
        let settled = match updates
            .wait_for(|snapshot| snapshot.abandoned || !snapshot.state.is_pending())
            .await
        {
            Ok(snapshot) => snapshot.clone(),
            Err(_) => self.snapshot(),
        };
        settled
    }

    pub fn retry_handle(&self) -> Retry {
        Retry {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Discards an errored attempt and starts a new one; no-op otherwise
    pub fn retry(&self) -> bool {
        self.shared.retry()
    }

    /// Aborts the in-flight attempt without transitioning
    pub fn abandon(&self) {
        self.shared.abandon();
    }

    pub fn is_abandoned(&self) -> bool {
        self.shared.state.borrow().abandoned
    }
}

impl Drop for RenderController {
    fn drop(&mut self) {
        self.shared.abandon();
    }
}

impl fmt::Debug for RenderController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderController")
            .field("snapshot", &*self.shared.state.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maud::html;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(u32, String)>>,
    }

    impl ErrorReporter for Recorder {
        fn report(&self, error: &ContentError, attempt: &AttemptInfo) {
            self.seen
                .lock()
                .unwrap()
                .push((attempt.number, error.message().to_string()));
        }
    }

    fn job<F>(f: F) -> ContentJob
    where
        F: Fn() -> Result<Rendered, ContentError> + Send + Sync + 'static,
    {
        Arc::new(move || -> BoxFuture<'static, _> {
            let result = f();
            Box::pin(async move { result })
        })
    }

    fn rendered(text: &str) -> Rendered {
        Rendered {
            metadata: Metadata::new(),
            content: html! { p { (text) } },
        }
    }

    #[tokio::test]
    async fn test_success_settles_ready() {
        let controller = RenderController::start("/", job(|| Ok(rendered("hi"))), Arc::new(TracingReporter));

        let snapshot = controller.settle().await;
        match snapshot.state {
            RenderState::Ready(r) => assert_eq!(r.content.into_string(), "<p>hi</p>"),
            other => panic!("expected ready, got {other:?}"),
        }
        assert_eq!(snapshot.attempt.number, 1);
    }

    #[tokio::test]
    async fn test_retry_is_noop_unless_errored() {
        let controller = RenderController::start("/", job(|| Ok(rendered("ok"))), Arc::new(TracingReporter));
        controller.settle().await;

        assert!(!controller.retry());
        assert_eq!(controller.attempt().number, 1);
    }

    #[tokio::test]
    async fn test_failure_reports_then_retry_starts_fresh_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let recorder = Arc::new(Recorder::default());

        let controller = RenderController::start(
            "/error-example",
            job(move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ContentError::new("Failed to fetch products"))
                } else {
                    Ok(rendered("One"))
                }
            }),
            recorder.clone(),
        );

        let first = controller.settle().await;
        assert!(first.state.is_errored());
        let first_id = first.attempt.id;

        assert!(controller.retry_handle().retry());
        let second = controller.settle().await;

        assert!(matches!(second.state, RenderState::Ready(_)));
        assert_eq!(second.attempt.number, 2);
        assert_ne!(second.attempt.id, first_id);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            *recorder.seen.lock().unwrap(),
            vec![(1, "Failed to fetch products".to_string())]
        );
    }

    #[tokio::test]
    async fn test_stale_completion_ignored() {
        let controller = RenderController::start(
            "/",
            job(|| Err(ContentError::new("boom"))),
            Arc::new(TracingReporter),
        );
        controller.settle().await;
        assert!(controller.retry());
        controller.settle().await;

        // attempt 1 already settled; a late result for it changes nothing
        controller.shared.complete(1, Ok(rendered("late")));
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.attempt.number, 2);
        assert!(snapshot.state.is_errored());
    }

    #[tokio::test]
    async fn test_abandon_aborts_without_transition() {
        let job: ContentJob = Arc::new(|| -> BoxFuture<'static, Result<Rendered, ContentError>> {
            Box::pin(async {
                std::future::pending::<()>().await;
                Ok(rendered("never"))
            })
        });
        let controller = RenderController::start("/slow", job, Arc::new(TracingReporter));

        controller.abandon();
        let snapshot = controller.settle().await;

        assert!(snapshot.abandoned);
        assert!(snapshot.state.is_pending());
        assert!(!controller.retry());
    }

    #[tokio::test]
    async fn test_abandoned_attempt_neither_settles_nor_reports() {
        let recorder = Arc::new(Recorder::default());
        let job: ContentJob = Arc::new(|| -> BoxFuture<'static, Result<Rendered, ContentError>> {
            Box::pin(std::future::pending())
        });
        let controller = RenderController::start("/slow", job, recorder.clone());

        controller.abandon();
        controller.shared.complete(1, Err(ContentError::new("late failure")));
        controller.shared.complete(1, Ok(rendered("late")));

        let snapshot = controller.snapshot();
        assert!(snapshot.abandoned);
        assert!(snapshot.state.is_pending());
        assert!(recorder.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_retry_handle_detached_after_drop() {
        let controller = RenderController::start(
            "/",
            job(|| Err(ContentError::new("boom"))),
            Arc::new(TracingReporter),
        );
        controller.settle().await;
        let retry = controller.retry_handle();
        assert_eq!(retry.attempt(), Some(1));

        drop(controller);
        assert!(!retry.retry());
        assert_eq!(retry.attempt(), None);
        assert!(!Retry::detached().retry());
    }
}
