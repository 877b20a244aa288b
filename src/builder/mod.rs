//! Builder API for constructing search widgets.
//!
//! The builder starts from a default or parsed [`WidgetConfig`](crate::config::WidgetConfig),
//! lets callers override individual settings, and validates the result
//! before a widget is created.

pub mod error;
pub mod widget;

pub use error::BuildError;
pub use widget::WidgetBuilder;
