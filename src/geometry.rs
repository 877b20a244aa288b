//! Widget geometry and rendering directives.
//!
//! The widget is a fixed-height box that grows by vertical scaling, so
//! result rows become visible without relayout. The scale for `n` results
//! is `(H + min(n, cap) * (R + B)) / H`.

use crate::config::Timings;
use serde::{Deserialize, Serialize};

/// Base measurements of the widget, in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dimensions {
    pub input_height: f64,
    pub row_height: f64,
    pub row_border: f64,
    /// Growth stops once this many rows are visible.
    pub max_visible_rows: usize,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            input_height: 75.0,
            row_height: 58.0,
            row_border: 1.0,
            max_visible_rows: 5,
        }
    }
}

impl Dimensions {
    /// Number of rows shown for `results` results.
    pub fn visible_rows(&self, results: usize) -> usize {
        results.min(self.max_visible_rows)
    }

    /// Vertical scale that reveals `visible_rows(results)` rows.
    pub fn scale_for(&self, results: usize) -> f64 {
        let rows = self.visible_rows(results) as f64;
        (self.input_height + rows * (self.row_height + self.row_border)) / self.input_height
    }
}

/// Vertical scale for `results` results using the default dimensions.
///
/// ```rust
/// use searchpulse::geometry::geometry_scale;
///
/// assert!((geometry_scale(3) - 3.36).abs() < 1e-9);
/// assert!((geometry_scale(10) - 4.933_333_333).abs() < 1e-6);
/// ```
pub fn geometry_scale(results: usize) -> f64 {
    Dimensions::default().scale_for(results)
}

/// Transform applied to the widget's base element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationTarget {
    pub scale_x: f64,
    pub scale_y: f64,
    /// Cosmetic rotation nudge in degrees.
    pub rotation_hint: f64,
}

impl AnimationTarget {
    /// Canonical collapsed geometry: the bare input field.
    pub const COLLAPSED: AnimationTarget = AnimationTarget {
        scale_x: 1.0,
        scale_y: 1.0,
        rotation_hint: 0.0,
    };

    pub fn vertical(scale_y: f64) -> Self {
        Self {
            scale_y,
            ..Self::COLLAPSED
        }
    }
}

impl Default for AnimationTarget {
    fn default() -> Self {
        Self::COLLAPSED
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    Spring,
    Tween,
}

/// Everything an animation backend needs to reproduce one transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderDirective {
    #[serde(flatten)]
    pub target: AnimationTarget,
    pub duration_ms: f64,
    #[serde(rename = "easingKind")]
    pub easing: Easing,
    /// Advance-and-return indefinitely instead of settling.
    pub repeat: bool,
}

/// Breathing grows the box by this fraction of its current height.
const BREATH_AMPLITUDE: f64 = 0.04;
const BREATH_WIDTH: f64 = 1.02;
const OVERSHOOT: AnimationTarget = AnimationTarget {
    scale_x: 1.04,
    scale_y: 0.92,
    rotation_hint: -1.5,
};

/// The fixed set of named geometry transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TransitionKind {
    /// Loading oscillation around the last known result height.
    Breathe { rows: usize },
    /// Spring to a height showing `rows` results.
    Expand { rows: usize },
    /// Shrink to a single row, making room for a dialog.
    CollapseToOneRow,
    /// First half of a retract: a brief squash past the collapsed size.
    RetractOvershoot,
    /// Second half of a retract: spring back to the collapsed size.
    RetractSettle,
}

impl TransitionKind {
    pub fn directive(&self, dims: &Dimensions, timings: &Timings) -> RenderDirective {
        match *self {
            Self::Breathe { rows } => {
                let base = dims.scale_for(rows);
                RenderDirective {
                    target: AnimationTarget {
                        scale_x: BREATH_WIDTH,
                        scale_y: base * (1.0 + BREATH_AMPLITUDE),
                        rotation_hint: 0.0,
                    },
                    duration_ms: timings.breathe_ms as f64,
                    easing: Easing::Tween,
                    repeat: true,
                }
            }
            Self::Expand { rows } => RenderDirective {
                target: AnimationTarget::vertical(dims.scale_for(rows)),
                duration_ms: timings.expand_ms as f64,
                easing: Easing::Spring,
                repeat: false,
            },
            Self::CollapseToOneRow => RenderDirective {
                target: AnimationTarget::vertical(dims.scale_for(1)),
                duration_ms: timings.collapse_ms as f64,
                easing: Easing::Spring,
                repeat: false,
            },
            Self::RetractOvershoot => RenderDirective {
                target: OVERSHOOT,
                duration_ms: timings.overshoot_ms as f64,
                easing: Easing::Tween,
                repeat: false,
            },
            Self::RetractSettle => RenderDirective {
                target: AnimationTarget::COLLAPSED,
                duration_ms: timings.settle_ms as f64,
                easing: Easing::Spring,
                repeat: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn scale_matches_documented_values() {
        assert!(close(geometry_scale(0), 1.0));
        assert!(close(geometry_scale(3), (75.0 + 3.0 * 59.0) / 75.0));
        assert!(close(geometry_scale(3), 3.36));
        assert!(close(geometry_scale(10), (75.0 + 5.0 * 59.0) / 75.0));
    }

    #[test]
    fn growth_is_capped() {
        assert!(close(geometry_scale(5), geometry_scale(500)));
        assert!(geometry_scale(4) < geometry_scale(5));
    }

    #[test]
    fn custom_cap_is_respected() {
        let dims = Dimensions {
            max_visible_rows: 2,
            ..Dimensions::default()
        };
        assert_eq!(dims.visible_rows(7), 2);
        assert!(close(dims.scale_for(7), dims.scale_for(2)));
    }

    #[test]
    fn breathing_repeats_around_last_height() {
        let dims = Dimensions::default();
        let timings = Timings::default();

        let idle = TransitionKind::Breathe { rows: 0 }.directive(&dims, &timings);
        let tall = TransitionKind::Breathe { rows: 3 }.directive(&dims, &timings);

        assert!(idle.repeat && tall.repeat);
        assert_eq!(tall.easing, Easing::Tween);
        assert!(tall.target.scale_y > dims.scale_for(3));
        assert!(tall.target.scale_y - dims.scale_for(3) > idle.target.scale_y - 1.0);
    }

    #[test]
    fn settling_transitions_use_springs() {
        let dims = Dimensions::default();
        let timings = Timings::default();

        let expand = TransitionKind::Expand { rows: 3 }.directive(&dims, &timings);
        assert_eq!(expand.easing, Easing::Spring);
        assert!(!expand.repeat);
        assert!(close(expand.target.scale_y, 3.36));

        let collapse = TransitionKind::CollapseToOneRow.directive(&dims, &timings);
        assert!(close(collapse.target.scale_y, geometry_scale(1)));

        let settle = TransitionKind::RetractSettle.directive(&dims, &timings);
        assert_eq!(settle.target, AnimationTarget::COLLAPSED);
    }

    #[test]
    fn directive_serializes_flat() {
        let directive = TransitionKind::RetractOvershoot
            .directive(&Dimensions::default(), &Timings::default());
        let value = serde_json::to_value(&directive).unwrap();

        assert_eq!(value["scaleX"], 1.04);
        assert_eq!(value["easingKind"], "tween");
        assert_eq!(value["repeat"], false);
        assert_eq!(value["durationMs"], 120.0);
    }
}
