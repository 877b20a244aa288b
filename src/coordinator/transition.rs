//! The pure transition function `(machine, event) -> (machine, effects)`.

use super::phase::{Phase, RecoveryStep, RetractStage};
use crate::config::Timings;
use crate::core::Guard;
use crate::dialog::{DialogLevel, ERROR_MESSAGE, NO_RESULTS_MESSAGE};
use crate::geometry::{AnimationTarget, Dimensions, RenderDirective, TransitionKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Identifies the step of the animation sequence an effect belongs to.
/// Events carrying an older token are ignored.
pub type SequenceToken = u64;

/// What the coordinator looks at after every change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub field_empty: bool,
    pub loading: bool,
    /// Number of filtered results.
    pub results: usize,
    pub error: bool,
}

impl Default for Observation {
    fn default() -> Self {
        Self {
            field_empty: true,
            loading: false,
            results: 0,
            error: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Observed(Observation),
    AnimationFinished { token: SequenceToken },
    DialogClosed { token: SequenceToken },
    GraceElapsed { token: SequenceToken },
}

impl Event {
    /// Sequence token carried by completion events.
    pub fn token(&self) -> Option<SequenceToken> {
        match *self {
            Self::Observed(_) => None,
            Self::AnimationFinished { token }
            | Self::DialogClosed { token }
            | Self::GraceElapsed { token } => Some(token),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Animate {
        token: SequenceToken,
        kind: TransitionKind,
        directive: RenderDirective,
    },
    /// Show a dialog; report `DialogClosed { token }` once it closes.
    ShowDialog {
        token: SequenceToken,
        level: DialogLevel,
        message: String,
    },
    DismissDialog,
    /// Report `GraceElapsed { token }` after `after`.
    StartGrace {
        token: SequenceToken,
        after: Duration,
    },
}

/// Latest observation held back while a retract runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deferred {
    pub observation: Observation,
    /// Whether any held-back observation was loading.
    pub saw_loading: bool,
}

/// Everything the transition function reads and writes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Machine {
    pub phase: Phase,
    pub token: SequenceToken,
    pub observed: Observation,
    /// Last non-zero result count; sizes the breathing oscillation.
    pub last_rows: usize,
    pub deferred: Option<Deferred>,
    pub target: AnimationTarget,
}

pub struct Context<'a> {
    pub dimensions: &'a Dimensions,
    pub timings: &'a Timings,
    /// Fails while a retract is in flight.
    pub retract_gate: &'a Guard<Phase>,
}

/// Outcome of the priority list for one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Rule {
    Failed,
    Breathe,
    Expand,
    Empty,
    Retract,
    Hold,
}

pub(crate) fn select_rule(prev: &Observation, obs: &Observation) -> Rule {
    let typed = !obs.field_empty;
    let just_failed = obs.error && !prev.error;
    let just_completed = prev.loading && !obs.loading;

    if typed && just_failed {
        Rule::Failed
    } else if typed && obs.loading {
        Rule::Breathe
    } else if typed && obs.results > 0 {
        Rule::Expand
    } else if typed && !obs.error && obs.results == 0 && (prev.results > 0 || just_completed) {
        Rule::Empty
    } else if obs.field_empty {
        Rule::Retract
    } else {
        Rule::Hold
    }
}

pub fn transition(machine: &Machine, event: &Event, ctx: &Context<'_>) -> (Machine, Vec<Effect>) {
    let mut next = machine.clone();
    let mut effects = Vec::new();

    match *event {
        Event::Observed(observation) => observe(&mut next, observation, ctx, &mut effects),
        Event::AnimationFinished { token } if token == machine.token => {
            animation_finished(&mut next, ctx, &mut effects)
        }
        Event::DialogClosed { token } if token == machine.token => {
            dialog_closed(&mut next, ctx, &mut effects)
        }
        Event::GraceElapsed { token } if token == machine.token => {
            if next.phase.recovery_step() == Some(RecoveryStep::Grace) {
                start_retract(&mut next, ctx, &mut effects);
            }
        }
        _ => {}
    }

    (next, effects)
}

fn observe(m: &mut Machine, obs: Observation, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    if !ctx.retract_gate.check(&m.phase) {
        let saw_loading = obs.loading || m.deferred.is_some_and(|d| d.saw_loading);
        m.deferred = Some(Deferred {
            observation: obs,
            saw_loading,
        });
        return;
    }

    let prev = m.observed;
    m.observed = obs;
    apply_rule(m, &prev, &obs, ctx, effects);
}

fn apply_rule(
    m: &mut Machine,
    prev: &Observation,
    obs: &Observation,
    ctx: &Context<'_>,
    effects: &mut Vec<Effect>,
) {
    if obs.results > 0 {
        m.last_rows = obs.results;
    }

    match select_rule(prev, obs) {
        Rule::Failed => enter(
            m,
            Phase::ErrorShown {
                step: RecoveryStep::Collapsing,
            },
            TransitionKind::CollapseToOneRow,
            ctx,
            effects,
        ),
        Rule::Breathe => {
            let rows = ctx.dimensions.visible_rows(m.last_rows);
            let phase = Phase::Breathing { rows };
            if m.phase != phase {
                enter(m, phase, TransitionKind::Breathe { rows }, ctx, effects);
            }
        }
        Rule::Expand => {
            let rows = ctx.dimensions.visible_rows(obs.results);
            let phase = Phase::Expanded { rows };
            if m.phase != phase {
                enter(m, phase, TransitionKind::Expand { rows }, ctx, effects);
            }
        }
        Rule::Empty => enter(
            m,
            Phase::Emptying {
                step: RecoveryStep::Collapsing,
            },
            TransitionKind::CollapseToOneRow,
            ctx,
            effects,
        ),
        Rule::Retract => {
            if m.phase != Phase::Idle {
                start_retract(m, ctx, effects);
            }
        }
        Rule::Hold => {}
    }
}

/// Start a new sequence step, superseding whatever ran before.
fn enter(
    m: &mut Machine,
    phase: Phase,
    kind: TransitionKind,
    ctx: &Context<'_>,
    effects: &mut Vec<Effect>,
) {
    if m.phase.recovery_step() == Some(RecoveryStep::Advising) {
        effects.push(Effect::DismissDialog);
    }

    let directive = kind.directive(ctx.dimensions, ctx.timings);
    m.token += 1;
    m.phase = phase;
    m.target = directive.target;
    effects.push(Effect::Animate {
        token: m.token,
        kind,
        directive,
    });
}

fn start_retract(m: &mut Machine, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    if !ctx.retract_gate.check(&m.phase) {
        return;
    }
    m.last_rows = 0;
    enter(
        m,
        Phase::Retracting {
            stage: RetractStage::Overshoot,
        },
        TransitionKind::RetractOvershoot,
        ctx,
        effects,
    );
}

fn animation_finished(m: &mut Machine, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    match m.phase {
        Phase::Emptying {
            step: RecoveryStep::Collapsing,
        } => advise(m, DialogLevel::Default, NO_RESULTS_MESSAGE, effects),
        Phase::ErrorShown {
            step: RecoveryStep::Collapsing,
        } => advise(m, DialogLevel::Error, ERROR_MESSAGE, effects),
        Phase::Retracting {
            stage: RetractStage::Overshoot,
        } => enter(
            m,
            Phase::Retracting {
                stage: RetractStage::Settle,
            },
            TransitionKind::RetractSettle,
            ctx,
            effects,
        ),
        Phase::Retracting {
            stage: RetractStage::Settle,
        } => {
            m.token += 1;
            m.phase = Phase::Idle;
            if let Some(deferred) = m.deferred.take() {
                // A held-back loading observation means a new search started,
                // which clears the previous error.
                let prev = Observation {
                    loading: m.observed.loading || deferred.saw_loading,
                    error: m.observed.error && !deferred.saw_loading,
                    ..m.observed
                };
                m.observed = deferred.observation;
                apply_rule(m, &prev, &deferred.observation, ctx, effects);
            }
        }
        _ => {}
    }
}

fn advise(m: &mut Machine, level: DialogLevel, message: &str, effects: &mut Vec<Effect>) {
    m.token += 1;
    m.phase = m.phase.with_step(RecoveryStep::Advising);
    effects.push(Effect::ShowDialog {
        token: m.token,
        level,
        message: message.to_string(),
    });
}

fn dialog_closed(m: &mut Machine, ctx: &Context<'_>, effects: &mut Vec<Effect>) {
    if m.phase.recovery_step() != Some(RecoveryStep::Advising) {
        return;
    }
    m.token += 1;
    m.phase = m.phase.with_step(RecoveryStep::Grace);
    effects.push(Effect::StartGrace {
        token: m.token,
        after: ctx.timings.grace(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(field_empty: bool, loading: bool, results: usize, error: bool) -> Observation {
        Observation {
            field_empty,
            loading,
            results,
            error,
        }
    }

    #[test]
    fn failure_outranks_everything() {
        let prev = obs(false, true, 0, false);
        assert_eq!(select_rule(&prev, &obs(false, false, 0, true)), Rule::Failed);
    }

    #[test]
    fn loading_outranks_results() {
        let prev = obs(false, false, 3, false);
        assert_eq!(select_rule(&prev, &obs(false, true, 3, false)), Rule::Breathe);
    }

    #[test]
    fn results_expand() {
        let prev = obs(false, true, 0, false);
        assert_eq!(select_rule(&prev, &obs(false, false, 2, false)), Rule::Expand);
    }

    #[test]
    fn losing_results_empties() {
        let prev = obs(false, false, 2, false);
        assert_eq!(select_rule(&prev, &obs(false, false, 0, false)), Rule::Empty);
    }

    #[test]
    fn completing_with_nothing_empties() {
        let prev = obs(false, true, 0, false);
        assert_eq!(select_rule(&prev, &obs(false, false, 0, false)), Rule::Empty);
    }

    #[test]
    fn repeated_empty_observation_holds() {
        let quiet = obs(false, false, 0, false);
        assert_eq!(select_rule(&quiet, &quiet), Rule::Hold);
    }

    #[test]
    fn persisting_error_holds() {
        let failed = obs(false, false, 0, true);
        assert_eq!(select_rule(&failed, &failed), Rule::Hold);
    }

    #[test]
    fn empty_field_retracts() {
        let prev = obs(false, false, 3, false);
        assert_eq!(select_rule(&prev, &obs(true, false, 0, false)), Rule::Retract);
        assert_eq!(select_rule(&prev, &obs(true, true, 0, true)), Rule::Retract);
    }
}
