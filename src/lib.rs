//! Searchpulse: an animated GitHub user search widget core
//!
//! The widget is built the "pure core, imperative shell" way. Everything
//! that decides what the widget looks like is a pure function or a small
//! synchronous state holder; timers, network calls and rendering are left
//! to the host, which executes the [`Command`]s the widget returns.
//!
//! # Components
//!
//! - **Debounce**: raw keystrokes become a committed query after a quiet period
//! - **Fetch**: committed queries become GitHub searches; stale responses are dropped
//! - **Filter**: search nodes that are not complete users are discarded
//! - **Dialog**: a single advisory message that expires on its own
//! - **Coordinator**: the phase machine choosing breathe, expand, collapse and retract
//! - **Runtime**: an optional tokio driver executing the widget's commands
//!
//! # Example
//!
//! ```rust
//! use searchpulse::{Command, SearchWidget, TimerId, WidgetEvent};
//!
//! let mut widget = SearchWidget::default();
//! let commands = widget.handle(WidgetEvent::Keystroke("octo".to_string()));
//!
//! // Nothing is fetched until the debounce timer fires.
//! let timer = commands
//!     .iter()
//!     .find_map(|c| match c {
//!         Command::ScheduleTimer { id: id @ TimerId::Debounce(_), .. } => Some(*id),
//!         _ => None,
//!     })
//!     .unwrap();
//!
//! let commands = widget.handle(WidgetEvent::TimerFired(timer));
//! assert!(commands.iter().any(|c| matches!(c, Command::Fetch(_))));
//! assert_eq!(widget.committed_query(), "octo");
//! ```

pub mod avatar;
pub mod builder;
pub mod config;
pub mod coordinator;
pub mod core;
pub mod debounce;
pub mod dialog;
pub mod fetch;
pub mod filter;
pub mod geometry;
pub mod runtime;
pub mod widget;

// Re-export commonly used types
pub use builder::{BuildError, WidgetBuilder};
pub use config::WidgetConfig;
pub use coordinator::{Coordinator, Phase};
pub use core::{Guard, State, StateHistory, StateTransition};
pub use fetch::{FetchError, SearchBackend};
pub use runtime::{AvatarLoad, Driver, Presenter};
pub use widget::{Command, SearchWidget, TimerId, WidgetEvent};
