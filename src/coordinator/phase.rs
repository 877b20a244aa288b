//! Coordinator phases.

use crate::core::State;
use serde::{Deserialize, Serialize};

/// Steps of the collapse, advise, wait, retract sequence shared by the
/// empty-result and error paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecoveryStep {
    /// Shrinking to one row to make room for the dialog.
    Collapsing,
    /// Dialog is up; waiting for it to close.
    Advising,
    /// Dialog closed; waiting out the grace period before retracting.
    Grace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetractStage {
    Overshoot,
    Settle,
}

/// Which visual sequence the widget is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum Phase {
    /// Collapsed, nothing pending.
    #[default]
    Idle,
    /// Search in flight; oscillating around the last known height.
    Breathing { rows: usize },
    /// Showing `rows` result rows.
    Expanded { rows: usize },
    /// A search came back empty.
    Emptying { step: RecoveryStep },
    /// A search failed.
    ErrorShown { step: RecoveryStep },
    /// Returning to the collapsed geometry. Nothing else may start meanwhile.
    Retracting { stage: RetractStage },
}

impl Phase {
    pub fn is_retracting(&self) -> bool {
        matches!(self, Self::Retracting { .. })
    }

    /// Recovery step, for the empty-result and error phases.
    pub fn recovery_step(&self) -> Option<RecoveryStep> {
        match self {
            Self::Emptying { step } | Self::ErrorShown { step } => Some(*step),
            _ => None,
        }
    }

    /// Same phase kind with the recovery step replaced.
    pub(crate) fn with_step(self, step: RecoveryStep) -> Self {
        match self {
            Self::Emptying { .. } => Self::Emptying { step },
            Self::ErrorShown { .. } => Self::ErrorShown { step },
            other => other,
        }
    }
}

impl State for Phase {
    fn name(&self) -> &str {
        match self {
            Self::Idle => "Idle",
            Self::Breathing { .. } => "Breathing",
            Self::Expanded { .. } => "Expanded",
            Self::Emptying { .. } => "Emptying",
            Self::ErrorShown { .. } => "ErrorShown",
            Self::Retracting { .. } => "Retracting",
        }
    }

    fn is_settled(&self) -> bool {
        matches!(self, Self::Idle | Self::Expanded { .. })
    }

    fn is_error(&self) -> bool {
        matches!(self, Self::ErrorShown { .. })
    }
}
