// File: src/session.rs
// Purpose: Runtime side of navigation: owns the intent channel and the open render

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::navigation::{
    IntentReceiver, IntentSender, NavigationContext, NavigationIntent, NavigationMode,
};
use crate::render::Render;
use crate::App;

/// A browsing session over one app
///
/// Every render opened here gets a navigation context wired to the
/// session's channel. Following an intent opens a new, independent render
/// and abandons the previous one.
pub struct Session {
    app: Arc<App>,
    intents_tx: IntentSender,
    intents_rx: IntentReceiver,
    history: Vec<String>,
    current: Option<Render>,
}

impl Session {
    pub fn new(app: Arc<App>) -> Self {
        let (intents_tx, intents_rx) = mpsc::unbounded_channel();
        Self {
            app,
            intents_tx,
            intents_rx,
            history: Vec::new(),
            current: None,
        }
    }

    /// Opens `href` as a new history entry
    pub fn open(&mut self, href: &str) -> &Render {
        self.load(href, NavigationMode::Push)
    }

    /// Opens the target of `intent`
    pub fn follow(&mut self, intent: NavigationIntent) -> &Render {
        self.load(&intent.href, intent.mode)
    }

    /// Waits for the next intent and follows it
    pub async fn follow_next(&mut self) -> Option<&Render> {
        let intent = self.intents_rx.recv().await?;
        Some(self.follow(intent))
    }

    /// The next pending intent, if one was already sent
    pub fn try_next_intent(&mut self) -> Option<NavigationIntent> {
        self.intents_rx.try_recv().ok()
    }

    pub fn current(&self) -> Option<&Render> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    fn load(&mut self, href: &str, mode: NavigationMode) -> &Render {
        if let Some(previous) = self.current.take() {
            previous.abandon();
        }

        let navigation = NavigationContext::from_href(href).with_intents(self.intents_tx.clone());
        let href = navigation.href();
        match mode {
            NavigationMode::Push => self.history.push(href.clone()),
            NavigationMode::Replace => match self.history.last_mut() {
                Some(last) => *last = href.clone(),
                None => self.history.push(href.clone()),
            },
        }

        debug!(href = %href, ?mode, entries = self.history.len(), "session navigated");
        self.current.insert(self.app.render_with(navigation))
    }
}
