//! The search widget: debounced input, search tracking, dialog and
//! coordinator wired together behind one event handler.
//!
//! `SearchWidget` never sleeps or performs I/O. Each call to
//! [`SearchWidget::handle`] returns the commands the host must carry out
//! (start a timer, send a search, play an animation, show a dialog) and
//! the host reports back through later events.

use crate::avatar::{AvatarPhase, LazyAvatar, RevealToken};
use crate::config::WidgetConfig;
use crate::coordinator::{Coordinator, Effect, Event, Observation, Phase, SequenceToken};
use crate::debounce::{DebounceAction, DebounceToken, DebouncedInput};
use crate::dialog::{DialogClosed, DialogController, DialogDirective, DialogTicket};
use crate::fetch::{FetchError, FetchRequest, FetchTicket, FetchTracker, SearchPayload};
use crate::filter::UserResult;
use crate::geometry::{AnimationTarget, RenderDirective};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Distinguishes widget instances in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetId(Uuid);

impl WidgetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for WidgetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    Debounce(DebounceToken),
    DialogExpiry(DialogTicket),
    Grace(SequenceToken),
    AvatarReveal { row: usize, token: RevealToken },
}

#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    Keystroke(String),
    TimerFired(TimerId),
    FetchResolved {
        ticket: FetchTicket,
        outcome: Result<SearchPayload, FetchError>,
    },
    AnimationFinished {
        token: SequenceToken,
    },
    /// The image requested by `Command::LoadAvatar` finished loading.
    AvatarLoaded {
        key: String,
        source: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ScheduleTimer { id: TimerId, after: Duration },
    CancelTimer(TimerId),
    Fetch(FetchRequest),
    Animate {
        token: SequenceToken,
        directive: RenderDirective,
    },
    Dialog(DialogDirective),
    /// Load the avatar image for the row with this key, then report
    /// `WidgetEvent::AvatarLoaded`.
    LoadAvatar { key: String, source: String },
}

/// One rendered result row.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView<'a> {
    pub key: String,
    pub result: &'a UserResult,
    pub avatar: AvatarPhase,
    /// Image to display; `None` while the placeholder icon shows.
    pub avatar_source: Option<&'a str>,
}

/// Everything the presentation layer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetView<'a> {
    pub value: &'a str,
    pub rows: Vec<RowView<'a>>,
    /// Rows are dimmed while a search is in flight.
    pub loading: bool,
    pub dialog: DialogDirective,
    pub target: AnimationTarget,
}

#[derive(Debug)]
pub struct SearchWidget {
    id: WidgetId,
    config: WidgetConfig,
    input: DebouncedInput,
    fetch: FetchTracker,
    dialog: DialogController,
    coordinator: Coordinator,
    /// Dialog currently shown on the coordinator's behalf.
    dialog_owner: Option<(DialogTicket, SequenceToken)>,
    /// One avatar per result row, in row order, keyed by row key.
    avatars: Vec<(String, LazyAvatar)>,
}

impl SearchWidget {
    pub fn new(config: WidgetConfig) -> Self {
        let id = WidgetId::new();
        info!(widget = %id, "search widget mounted");
        Self {
            id,
            input: DebouncedInput::new(config.timings.debounce()),
            fetch: FetchTracker::new(config.search.page_size),
            dialog: DialogController::new(config.timings.dialog()),
            coordinator: Coordinator::new(config.dimensions.clone(), config.timings.clone()),
            dialog_owner: None,
            avatars: Vec::new(),
            config,
        }
    }

    pub fn id(&self) -> WidgetId {
        self.id
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn value(&self) -> &str {
        self.input.raw()
    }

    pub fn committed_query(&self) -> &str {
        self.input.committed()
    }

    pub fn results(&self) -> &[UserResult] {
        &self.fetch.state().results
    }

    pub fn phase(&self) -> Phase {
        self.coordinator.phase()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    pub fn dialog(&self) -> DialogDirective {
        self.dialog.directive()
    }

    pub fn view(&self) -> WidgetView<'_> {
        WidgetView {
            value: self.input.raw(),
            rows: self
                .results()
                .iter()
                .enumerate()
                .map(|(index, result)| {
                    let avatar = self.avatars.get(index).map(|(_, avatar)| avatar);
                    RowView {
                        key: result.row_key(index),
                        result,
                        avatar: avatar.map_or(AvatarPhase::Pending, LazyAvatar::phase),
                        avatar_source: avatar.and_then(LazyAvatar::image_source),
                    }
                })
                .collect(),
            loading: self.fetch.state().loading,
            dialog: self.dialog.directive(),
            target: self.coordinator.target(),
        }
    }

    pub fn handle(&mut self, event: WidgetEvent) -> Vec<Command> {
        let mut commands = Vec::new();

        match event {
            WidgetEvent::Keystroke(value) => self.keystroke(value, &mut commands),
            WidgetEvent::TimerFired(TimerId::Debounce(token)) => {
                if let Some(query) = self.input.on_quiet_period_elapsed(token) {
                    self.commit(&query, &mut commands);
                    self.observe(&mut commands);
                }
            }
            WidgetEvent::TimerFired(TimerId::DialogExpiry(ticket)) => {
                if let Some(closed) = self.dialog.on_expired(ticket) {
                    self.dialog_closed(closed, &mut commands);
                }
            }
            WidgetEvent::TimerFired(TimerId::Grace(token)) => {
                self.coordinate(Event::GraceElapsed { token }, &mut commands);
            }
            WidgetEvent::TimerFired(TimerId::AvatarReveal { row, token }) => {
                if let Some((key, avatar)) = self.avatars.get_mut(row) {
                    if avatar.on_reveal(token) {
                        debug!(widget = %self.id, key = %key, "avatar revealed");
                    }
                }
            }
            WidgetEvent::FetchResolved { ticket, outcome } => {
                if self.fetch.resolve(ticket, outcome) {
                    self.sync_avatars(&mut commands);
                    self.observe(&mut commands);
                }
            }
            WidgetEvent::AnimationFinished { token } => {
                self.coordinate(Event::AnimationFinished { token }, &mut commands);
            }
            WidgetEvent::AvatarLoaded { key, source } => {
                let row = self.avatars.iter().position(|(k, _)| *k == key);
                let reveal = row.and_then(|row| {
                    let (token, after) = self.avatars[row].1.on_loaded(&source)?;
                    Some((row, token, after))
                });
                if let Some((row, token, after)) = reveal {
                    commands.push(Command::ScheduleTimer {
                        id: TimerId::AvatarReveal { row, token },
                        after,
                    });
                }
            }
        }

        commands
    }

    fn keystroke(&mut self, value: String, commands: &mut Vec<Command>) {
        if let Some(closed) = self.dialog.dismiss() {
            commands.push(Command::CancelTimer(TimerId::DialogExpiry(closed.ticket)));
            self.dialog_closed(closed, commands);
        }

        let outcome = self.input.on_keystroke(value);
        if let Some(token) = outcome.cancelled {
            commands.push(Command::CancelTimer(TimerId::Debounce(token)));
        }
        match outcome.action {
            DebounceAction::Schedule { token, after } => commands.push(Command::ScheduleTimer {
                id: TimerId::Debounce(token),
                after,
            }),
            DebounceAction::Commit(query) => self.commit(&query, commands),
            DebounceAction::Nothing => {}
        }

        self.observe(commands);
    }

    fn commit(&mut self, query: &str, commands: &mut Vec<Command>) {
        debug!(widget = %self.id, query, "query committed");
        if let Some(request) = self.fetch.begin(query) {
            commands.push(Command::Fetch(request));
        }
        self.sync_avatars(commands);
    }

    /// Line avatars up with the current rows. Rows that keep their key keep
    /// their avatar; reveals of dropped or re-pointed avatars are cancelled.
    fn sync_avatars(&mut self, commands: &mut Vec<Command>) {
        let mut previous: HashMap<String, (usize, LazyAvatar)> = self
            .avatars
            .drain(..)
            .enumerate()
            .map(|(row, (key, avatar))| (key, (row, avatar)))
            .collect();
        let reveal_after = self.config.timings.avatar_reveal();

        for (row, result) in self.fetch.state().results.iter().enumerate() {
            let key = result.row_key(row);
            let mut avatar = match previous.remove(&key) {
                Some((_, avatar)) => avatar,
                None => LazyAvatar::new(reveal_after),
            };
            let pending = avatar.pending_reveal();
            if avatar.set_source(&result.avatar_url) {
                if let Some(token) = pending {
                    commands.push(Command::CancelTimer(TimerId::AvatarReveal { row, token }));
                }
                commands.push(Command::LoadAvatar {
                    key: key.clone(),
                    source: result.avatar_url.clone(),
                });
            }
            self.avatars.push((key, avatar));
        }

        for (row, avatar) in previous.into_values() {
            if let Some(token) = avatar.pending_reveal() {
                commands.push(Command::CancelTimer(TimerId::AvatarReveal { row, token }));
            }
        }
    }

    fn observe(&mut self, commands: &mut Vec<Command>) {
        let state = self.fetch.state();
        let observation = Observation {
            field_empty: self.input.raw().is_empty(),
            loading: state.loading,
            results: state.results.len(),
            error: state.error,
        };
        self.coordinate(Event::Observed(observation), commands);
    }

    fn dialog_closed(&mut self, closed: DialogClosed, commands: &mut Vec<Command>) {
        commands.push(Command::Dialog(self.dialog.directive()));
        match self.dialog_owner {
            Some((ticket, token)) if ticket == closed.ticket => {
                self.dialog_owner = None;
                self.coordinate(Event::DialogClosed { token }, commands);
            }
            _ => {}
        }
    }

    fn coordinate(&mut self, event: Event, commands: &mut Vec<Command>) {
        for effect in self.coordinator.handle(event) {
            match effect {
                Effect::Animate {
                    token, directive, ..
                } => commands.push(Command::Animate { token, directive }),
                Effect::ShowDialog {
                    token,
                    level,
                    message,
                } => {
                    let shown = self.dialog.show(message, level);
                    if let Some(superseded) = shown.superseded {
                        commands.push(Command::CancelTimer(TimerId::DialogExpiry(
                            superseded.ticket,
                        )));
                    }
                    self.dialog_owner = Some((shown.ticket, token));
                    commands.push(Command::ScheduleTimer {
                        id: TimerId::DialogExpiry(shown.ticket),
                        after: shown.expires_after,
                    });
                    commands.push(Command::Dialog(self.dialog.directive()));
                }
                Effect::DismissDialog => {
                    if let Some(closed) = self.dialog.dismiss() {
                        self.dialog_owner = None;
                        commands.push(Command::CancelTimer(TimerId::DialogExpiry(closed.ticket)));
                        commands.push(Command::Dialog(self.dialog.directive()));
                    }
                }
                Effect::StartGrace { token, after } => commands.push(Command::ScheduleTimer {
                    id: TimerId::Grace(token),
                    after,
                }),
            }
        }
    }
}

impl Default for SearchWidget {
    fn default() -> Self {
        Self::new(WidgetConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{RecoveryStep, RetractStage};
    use crate::core::State;
    use crate::dialog::{DialogLevel, ERROR_MESSAGE, NO_RESULTS_MESSAGE};
    use crate::filter::{UserResultRaw, USER_KIND};
    use crate::geometry::geometry_scale;

    fn users(logins: &[&str]) -> SearchPayload {
        SearchPayload {
            user_count: logins.len() as u64,
            nodes: logins
                .iter()
                .map(|login| UserResultRaw {
                    kind: Some(USER_KIND.to_string()),
                    name: Some(format!("{login} name")),
                    login: Some(login.to_string()),
                    url: Some(format!("https://github.com/{login}")),
                    ..UserResultRaw::default()
                })
                .collect(),
        }
    }

    fn scheduled(commands: &[Command], pick: fn(&TimerId) -> bool) -> Option<(TimerId, Duration)> {
        commands.iter().find_map(|c| match c {
            Command::ScheduleTimer { id, after } if pick(id) => Some((*id, *after)),
            _ => None,
        })
    }

    fn debounce_timer(commands: &[Command]) -> TimerId {
        scheduled(commands, |id| matches!(id, TimerId::Debounce(_)))
            .map(|(id, _)| id)
            .expect("debounce timer")
    }

    fn fetch_of(commands: &[Command]) -> FetchRequest {
        commands
            .iter()
            .find_map(|c| match c {
                Command::Fetch(request) => Some(request.clone()),
                _ => None,
            })
            .expect("fetch command")
    }

    fn animation(commands: &[Command]) -> Option<(SequenceToken, RenderDirective)> {
        commands.iter().rev().find_map(|c| match c {
            Command::Animate { token, directive } => Some((*token, directive.clone())),
            _ => None,
        })
    }

    /// Type a query and let the debounce fire.
    fn search(widget: &mut SearchWidget, query: &str) -> FetchRequest {
        let typed = widget.handle(WidgetEvent::Keystroke(query.to_string()));
        let fired = widget.handle(WidgetEvent::TimerFired(debounce_timer(&typed)));
        fetch_of(&fired)
    }

    fn finish_animation(widget: &mut SearchWidget) -> Vec<Command> {
        let token = widget.coordinator().token();
        widget.handle(WidgetEvent::AnimationFinished { token })
    }

    #[test]
    fn burst_of_keystrokes_fetches_once() {
        let mut widget = SearchWidget::default();
        let mut timers = Vec::new();
        for value in ["o", "oc", "oct", "octo"] {
            let commands = widget.handle(WidgetEvent::Keystroke(value.to_string()));
            assert_eq!(widget.value(), value);
            timers.push(debounce_timer(&commands));
        }

        let mut fetches = Vec::new();
        for timer in timers {
            let commands = widget.handle(WidgetEvent::TimerFired(timer));
            fetches.extend(commands.into_iter().filter(|c| matches!(c, Command::Fetch(_))));
        }

        assert_eq!(fetches.len(), 1);
        match &fetches[0] {
            Command::Fetch(request) => assert_eq!(request.request.text(), "octo"),
            other => panic!("Expected fetch, got {other:?}"),
        }
        assert_eq!(widget.committed_query(), "octo");
    }

    #[test]
    fn octo_expands_then_clearing_retracts() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "octo");
        assert_eq!(widget.phase(), Phase::Breathing { rows: 0 });
        assert!(widget.view().loading);

        let commands = widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(users(&["octocat", "octokit", "octavia"])),
        });
        let (_, directive) = animation(&commands).unwrap();
        assert!((directive.target.scale_y - geometry_scale(3)).abs() < 1e-9);
        assert_eq!(widget.phase(), Phase::Expanded { rows: 3 });

        let view = widget.view();
        let keys: Vec<_> = view.rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["octocat-0", "octokit-1", "octavia-2"]);
        assert!(!view.loading);

        finish_animation(&mut widget);
        widget.handle(WidgetEvent::Keystroke(String::new()));
        assert!(widget.coordinator().retract_in_flight());
        assert_eq!(widget.committed_query(), "");

        finish_animation(&mut widget);
        assert!(widget.coordinator().retract_in_flight());
        finish_animation(&mut widget);
        assert!(!widget.coordinator().retract_in_flight());
        assert_eq!(widget.phase(), Phase::Idle);
        assert_eq!(widget.view().target, AnimationTarget::COLLAPSED);
    }

    #[test]
    fn no_results_shows_dialog_then_retracts() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "zzzznonexistentuser");
        widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(SearchPayload::default()),
        });
        assert_eq!(
            widget.phase(),
            Phase::Emptying {
                step: RecoveryStep::Collapsing
            }
        );

        let commands = finish_animation(&mut widget);
        let (expiry, after) =
            scheduled(&commands, |id| matches!(id, TimerId::DialogExpiry(_))).unwrap();
        assert_eq!(after, Duration::from_millis(2750));
        assert_eq!(
            widget.dialog(),
            DialogDirective {
                visible: true,
                level: DialogLevel::Default,
                text: NO_RESULTS_MESSAGE.to_string(),
            }
        );

        let commands = widget.handle(WidgetEvent::TimerFired(expiry));
        assert!(!widget.dialog().visible);
        let (grace, after) = scheduled(&commands, |id| matches!(id, TimerId::Grace(_))).unwrap();
        assert_eq!(after, Duration::from_millis(300));

        widget.handle(WidgetEvent::TimerFired(grace));
        assert_eq!(
            widget.phase(),
            Phase::Retracting {
                stage: RetractStage::Overshoot
            }
        );
    }

    #[test]
    fn failed_search_shows_error_dialog() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "octo");
        widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Err(FetchError::Transport("connection reset".to_string())),
        });
        assert!(widget.phase().is_error());

        finish_animation(&mut widget);
        let dialog = widget.dialog();
        assert!(dialog.visible);
        assert_eq!(dialog.level, DialogLevel::Error);
        assert_eq!(dialog.text, ERROR_MESSAGE);
    }

    #[test]
    fn keystroke_dismisses_dialog() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "nobody");
        widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(SearchPayload::default()),
        });
        finish_animation(&mut widget);
        assert!(widget.dialog().visible);

        let commands = widget.handle(WidgetEvent::Keystroke("nobod".to_string()));
        assert!(!widget.dialog().visible);
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::CancelTimer(TimerId::DialogExpiry(_)))));
        assert!(commands
            .iter()
            .any(|c| matches!(c, Command::Dialog(d) if !d.visible)));
    }

    #[test]
    fn clearing_while_retracting_starts_no_second_retract() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "nobody");
        widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(SearchPayload::default()),
        });
        let shown = finish_animation(&mut widget);
        let (expiry, _) = scheduled(&shown, |id| matches!(id, TimerId::DialogExpiry(_))).unwrap();

        let cleared = widget.handle(WidgetEvent::Keystroke(String::new()));
        assert!(widget.coordinator().retract_in_flight());
        let retract_animations = |commands: &[Command]| {
            commands
                .iter()
                .filter(|c| matches!(c, Command::Animate { .. }))
                .count()
        };
        assert_eq!(retract_animations(&cleared), 1);

        // Late timers and repeated clears while guarded do nothing.
        assert!(widget.handle(WidgetEvent::TimerFired(expiry)).is_empty());
        let again = widget.handle(WidgetEvent::Keystroke(String::new()));
        assert_eq!(retract_animations(&again), 0);
    }

    #[test]
    fn stale_search_response_is_ignored() {
        let mut widget = SearchWidget::default();
        let old = search(&mut widget, "oc");
        let new = search(&mut widget, "octo");

        assert!(widget
            .handle(WidgetEvent::FetchResolved {
                ticket: old.ticket,
                outcome: Ok(users(&["ocaml"])),
            })
            .is_empty());
        assert!(widget.results().is_empty());

        widget.handle(WidgetEvent::FetchResolved {
            ticket: new.ticket,
            outcome: Ok(users(&["octocat"])),
        });
        assert_eq!(widget.results()[0].login, "octocat");
    }

    fn users_with_avatars(logins: &[&str]) -> SearchPayload {
        let mut payload = users(logins);
        for node in &mut payload.nodes {
            node.avatar_url = node
                .login
                .as_ref()
                .map(|login| format!("https://avatars.example/{login}"));
        }
        payload
    }

    fn avatar_loads(commands: &[Command]) -> Vec<(String, String)> {
        commands
            .iter()
            .filter_map(|c| match c {
                Command::LoadAvatar { key, source } => Some((key.clone(), source.clone())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn avatars_load_then_reveal_per_row() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "octo");
        let commands = widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(users_with_avatars(&["octocat", "octokit"])),
        });

        let loads = avatar_loads(&commands);
        assert_eq!(
            loads,
            vec![
                (
                    "octocat-0".to_string(),
                    "https://avatars.example/octocat".to_string()
                ),
                (
                    "octokit-1".to_string(),
                    "https://avatars.example/octokit".to_string()
                ),
            ]
        );
        assert!(widget
            .view()
            .rows
            .iter()
            .all(|row| row.avatar == AvatarPhase::Pending && row.avatar_source.is_none()));

        let (key, source) = loads[0].clone();
        let commands = widget.handle(WidgetEvent::AvatarLoaded { key, source });
        let (reveal, after) =
            scheduled(&commands, |id| matches!(id, TimerId::AvatarReveal { .. })).unwrap();
        assert_eq!(after, Duration::from_millis(300));

        let view = widget.view();
        assert_eq!(view.rows[0].avatar, AvatarPhase::Loaded);
        assert_eq!(
            view.rows[0].avatar_source,
            Some("https://avatars.example/octocat")
        );
        assert_eq!(view.rows[1].avatar, AvatarPhase::Pending);

        widget.handle(WidgetEvent::TimerFired(reveal));
        assert_eq!(widget.view().rows[0].avatar, AvatarPhase::Displayed);
    }

    #[test]
    fn unknown_avatar_load_is_ignored() {
        let mut widget = SearchWidget::default();
        let commands = widget.handle(WidgetEvent::AvatarLoaded {
            key: "ghost-0".to_string(),
            source: "https://avatars.example/ghost".to_string(),
        });
        assert!(commands.is_empty());
    }

    #[test]
    fn new_search_cancels_pending_avatar_reveal() {
        let mut widget = SearchWidget::default();
        let request = search(&mut widget, "octo");
        let commands = widget.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(users_with_avatars(&["octocat"])),
        });
        let (key, source) = avatar_loads(&commands).remove(0);
        let loaded = widget.handle(WidgetEvent::AvatarLoaded { key, source });
        let (reveal, _) =
            scheduled(&loaded, |id| matches!(id, TimerId::AvatarReveal { .. })).unwrap();

        let typed = widget.handle(WidgetEvent::Keystroke("octa".to_string()));
        let fired = widget.handle(WidgetEvent::TimerFired(debounce_timer(&typed)));
        assert!(fired.contains(&Command::CancelTimer(reveal)));
        assert!(widget.view().rows.is_empty());
    }

    #[test]
    fn widgets_do_not_share_state() {
        let mut first = SearchWidget::default();
        let second = SearchWidget::default();
        let request = search(&mut first, "octo");
        first.handle(WidgetEvent::FetchResolved {
            ticket: request.ticket,
            outcome: Ok(users(&["octocat"])),
        });
        first.handle(WidgetEvent::Keystroke(String::new()));

        assert!(first.coordinator().retract_in_flight());
        assert!(!second.coordinator().retract_in_flight());
        assert_ne!(first.id(), second.id());
    }
}
