//! Transient advisory dialog.
//!
//! At most one dialog is up at a time. Showing a new one supersedes the
//! old one and restarts the expiry window. Each shown dialog gets a ticket
//! that resolves exactly once, when the dialog closes for any reason.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const NO_RESULTS_MESSAGE: &str = "No results found";
pub const ERROR_MESSAGE: &str = "Shit happened";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DialogLevel {
    #[default]
    Default,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    pub level: DialogLevel,
    pub message: String,
}

/// Deferred signal for one shown dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DialogTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    Expired,
    Dismissed,
    Superseded,
}

/// A ticket resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogClosed {
    pub ticket: DialogTicket,
    pub reason: CloseReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogShown {
    pub ticket: DialogTicket,
    /// Call `on_expired(ticket)` after this long.
    pub expires_after: Duration,
    pub superseded: Option<DialogClosed>,
}

/// What the presentation layer shows in place of the result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogDirective {
    pub visible: bool,
    pub level: DialogLevel,
    pub text: String,
}

impl DialogDirective {
    pub fn hidden() -> Self {
        Self {
            visible: false,
            level: DialogLevel::Default,
            text: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DialogController {
    active: Option<(DialogTicket, Dialog)>,
    next_ticket: u64,
    expiry: Duration,
}

impl DialogController {
    pub fn new(expiry: Duration) -> Self {
        Self {
            active: None,
            next_ticket: 0,
            expiry,
        }
    }

    pub fn current(&self) -> Option<&Dialog> {
        self.active.as_ref().map(|(_, dialog)| dialog)
    }

    pub fn ticket(&self) -> Option<DialogTicket> {
        self.active.as_ref().map(|(ticket, _)| *ticket)
    }

    /// Show a dialog, superseding any active one.
    pub fn show(&mut self, message: impl Into<String>, level: DialogLevel) -> DialogShown {
        let superseded = self.close(CloseReason::Superseded);

        self.next_ticket += 1;
        let ticket = DialogTicket(self.next_ticket);
        let dialog = Dialog {
            level,
            message: message.into(),
        };
        debug!(?ticket, ?level, message = %dialog.message, "showing dialog");
        self.active = Some((ticket, dialog));

        DialogShown {
            ticket,
            expires_after: self.expiry,
            superseded,
        }
    }

    /// Close the active dialog now. Does nothing when none is up.
    pub fn dismiss(&mut self) -> Option<DialogClosed> {
        self.close(CloseReason::Dismissed)
    }

    /// The expiry timer for `ticket` fired.
    pub fn on_expired(&mut self, ticket: DialogTicket) -> Option<DialogClosed> {
        if self.ticket() != Some(ticket) {
            return None;
        }
        self.close(CloseReason::Expired)
    }

    pub fn directive(&self) -> DialogDirective {
        match self.current() {
            Some(dialog) => DialogDirective {
                visible: true,
                level: dialog.level,
                text: dialog.message.clone(),
            },
            None => DialogDirective::hidden(),
        }
    }

    fn close(&mut self, reason: CloseReason) -> Option<DialogClosed> {
        let (ticket, _) = self.active.take()?;
        debug!(?ticket, ?reason, "dialog closed");
        Some(DialogClosed { ticket, reason })
    }
}
