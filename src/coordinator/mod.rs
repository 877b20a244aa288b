//! Animation coordinator.
//!
//! Decides the widget's geometry and dialog messaging from the evolving
//! search state. The decision logic is the pure [`transition`] function;
//! [`Coordinator`] owns the machine, the retract guard and the phase
//! history for one widget instance.
//!
//! # Sequencing
//!
//! Every animation, dialog and grace timer the coordinator asks for
//! carries a [`SequenceToken`]. Starting a new step bumps the token, so a
//! completion from a superseded step is ignored instead of chaining into a
//! second animation. The one exception to "newest wins" is the retract:
//! while it runs, observations are held back and replayed when it settles.

mod phase;
mod transition;

pub use phase::{Phase, RecoveryStep, RetractStage};
pub use transition::{
    transition, Context, Deferred, Effect, Event, Machine, Observation, SequenceToken,
};

use crate::config::Timings;
use crate::core::{Guard, State, StateHistory, StateTransition};
use crate::geometry::{AnimationTarget, Dimensions};
use chrono::Utc;
use tracing::{debug, trace};

pub struct Coordinator {
    machine: Machine,
    dimensions: Dimensions,
    timings: Timings,
    retract_gate: Guard<Phase>,
    history: StateHistory<Phase>,
}

impl Coordinator {
    pub fn new(dimensions: Dimensions, timings: Timings) -> Self {
        Self {
            machine: Machine::default(),
            dimensions,
            timings,
            retract_gate: Guard::new(|phase: &Phase| !phase.is_retracting()),
            history: StateHistory::new(),
        }
    }

    /// Feed one event and collect the effects it causes.
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let ctx = Context {
            dimensions: &self.dimensions,
            timings: &self.timings,
            retract_gate: &self.retract_gate,
        };
        let (next, effects) = transition(&self.machine, &event, &ctx);

        if next.phase != self.machine.phase {
            debug!(
                from = self.machine.phase.name(),
                to = next.phase.name(),
                token = next.token,
                "phase change"
            );
            self.history.push(StateTransition {
                from: self.machine.phase,
                to: next.phase,
                timestamp: Utc::now(),
                token: next.token,
            });
        } else if event.token().is_some_and(|token| token != self.machine.token) {
            trace!(?event, current = next.token, "ignoring stale event");
        }

        self.machine = next;
        effects
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase
    }

    pub fn token(&self) -> SequenceToken {
        self.machine.token
    }

    /// The retract guard: true while a retract is in flight.
    pub fn retract_in_flight(&self) -> bool {
        !self.retract_gate.check(&self.machine.phase)
    }

    /// Geometry of the most recently issued animation.
    pub fn target(&self) -> AnimationTarget {
        self.machine.target
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }

    pub fn history(&self) -> &StateHistory<Phase> {
        &self.history
    }
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("machine", &self.machine)
            .field("transitions", &self.history.transitions().len())
            .finish_non_exhaustive()
    }
}
