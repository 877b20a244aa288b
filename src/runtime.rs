//! Tokio driver for a [`SearchWidget`].
//!
//! The widget itself is synchronous. [`Driver`] carries out its commands:
//! timers become `tokio::time::sleep` tasks, searches run on a
//! [`SearchBackend`], and render, dialog and avatar requests go to a
//! [`Presenter`]. Completions are fed back through one event channel so
//! the widget only ever sees one event at a time.

use crate::config::SearchConfig;
use crate::coordinator::SequenceToken;
use crate::dialog::DialogDirective;
use crate::fetch::{FetchRequest, SearchBackend};
use crate::geometry::RenderDirective;
use crate::widget::{Command, SearchWidget, TimerId, WidgetEvent};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Receives what the widget wants shown.
pub trait Presenter: Send {
    /// Start animating toward `directive`. A non-repeating animation is
    /// considered finished once its duration has elapsed.
    fn animate(&mut self, token: SequenceToken, directive: &RenderDirective);

    fn dialog(&mut self, directive: &DialogDirective);

    /// Fetch an avatar image and call [`AvatarLoad::finish`] once it is
    /// ready. Hosts without an image pipeline can finish immediately.
    fn load_avatar(&mut self, load: AvatarLoad) {
        load.finish();
    }
}

/// A pending avatar image load.
#[derive(Debug)]
pub struct AvatarLoad {
    key: String,
    source: String,
    events: mpsc::UnboundedSender<WidgetEvent>,
}

impl AvatarLoad {
    /// Row key the avatar belongs to.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Report the image as loaded.
    pub fn finish(self) {
        let _ = self.events.send(WidgetEvent::AvatarLoaded {
            key: self.key,
            source: self.source,
        });
    }
}

pub struct Driver<B, P> {
    widget: SearchWidget,
    search: Arc<SearchConfig>,
    backend: Arc<B>,
    presenter: P,
    timers: HashMap<TimerId, JoinHandle<()>>,
    animation: Option<JoinHandle<()>>,
    events_tx: mpsc::UnboundedSender<WidgetEvent>,
    events_rx: mpsc::UnboundedReceiver<WidgetEvent>,
}

impl<B: SearchBackend, P: Presenter> Driver<B, P> {
    pub fn new(widget: SearchWidget, backend: B, presenter: P) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            search: Arc::new(widget.config().search.clone()),
            widget,
            backend: Arc::new(backend),
            presenter,
            timers: HashMap::new(),
            animation: None,
            events_tx,
            events_rx,
        }
    }

    pub fn widget(&self) -> &SearchWidget {
        &self.widget
    }

    /// Drive the widget until `keystrokes` closes, then hand it back.
    ///
    /// Pending timers, animations and searches are abandoned on return.
    pub async fn run(mut self, mut keystrokes: mpsc::Receiver<String>) -> SearchWidget {
        debug!(widget = %self.widget.id(), "driver started");

        loop {
            tokio::select! {
                value = keystrokes.recv() => match value {
                    Some(value) => self.dispatch(WidgetEvent::Keystroke(value)),
                    None => break,
                },
                // The driver holds a sender itself, so this never yields `None`.
                Some(event) = self.events_rx.recv() => self.dispatch(event),
            }
        }

        self.shutdown();
        self.widget
    }

    fn dispatch(&mut self, event: WidgetEvent) {
        if let WidgetEvent::TimerFired(id) = &event {
            self.timers.remove(id);
        }
        for command in self.widget.handle(event) {
            self.execute(command);
        }
    }

    fn execute(&mut self, command: Command) {
        trace!(widget = %self.widget.id(), ?command, "executing");
        match command {
            Command::ScheduleTimer { id, after } => {
                let handle = self.notify_after(after, WidgetEvent::TimerFired(id));
                if let Some(previous) = self.timers.insert(id, handle) {
                    previous.abort();
                }
            }
            Command::CancelTimer(id) => {
                if let Some(handle) = self.timers.remove(&id) {
                    handle.abort();
                }
            }
            Command::Fetch(FetchRequest { ticket, request }) => {
                let backend = Arc::clone(&self.backend);
                let search = Arc::clone(&self.search);
                let events = self.events_tx.clone();
                tokio::spawn(async move {
                    let outcome = backend.search(&search, &request).await;
                    // The driver may already be gone.
                    let _ = events.send(WidgetEvent::FetchResolved { ticket, outcome });
                });
            }
            Command::Animate { token, directive } => {
                if let Some(previous) = self.animation.take() {
                    previous.abort();
                }
                self.presenter.animate(token, &directive);
                if !directive.repeat {
                    let after = Duration::from_millis(directive.duration_ms.max(0.0) as u64);
                    self.animation =
                        Some(self.notify_after(after, WidgetEvent::AnimationFinished { token }));
                }
            }
            Command::Dialog(directive) => self.presenter.dialog(&directive),
            Command::LoadAvatar { key, source } => self.presenter.load_avatar(AvatarLoad {
                key,
                source,
                events: self.events_tx.clone(),
            }),
        }
    }

    fn notify_after(&self, after: Duration, event: WidgetEvent) -> JoinHandle<()> {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(event);
        })
    }

    fn shutdown(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
        if let Some(handle) = self.animation.take() {
            handle.abort();
        }
        debug!(widget = %self.widget.id(), "driver stopped");
    }
}
