//! Arc Expander
//!
//! Converts G2/G3 arc commands to G1 line moves for a plotter without arc
//! support. Each step advances the same arc length (`segment_length`), and the
//! last emitted move lands exactly on the programmed end point.

use crate::error::{ArcError, ArcResult};
use plotstream_core::{ArcDirection, Command, Position};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::iter::FusedIterator;

/// Smallest radius still treated as a real arc, in millimeters
const MIN_RADIUS: f64 = 1e-6;

/// Most moves a single arc may expand into
pub const MAX_ARC_SEGMENTS: usize = 1_000_000;

/// What to do with the Z word of an arc command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArcZHandling {
    /// Copy the arc's Z onto every emitted move, like F
    #[default]
    Carry,
    /// Emit X/Y (and F) only
    Omit,
}

/// Arc expansion configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcExpanderConfig {
    /// Arc length advanced per emitted move, in millimeters
    pub segment_length: f32,
    /// Pen height handling for the emitted moves
    #[serde(default)]
    pub z_handling: ArcZHandling,
}

impl Default for ArcExpanderConfig {
    fn default() -> Self {
        Self {
            segment_length: 0.5,
            z_handling: ArcZHandling::Carry,
        }
    }
}

/// Geometry of one arc, resolved against the pen position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcPlan {
    /// Rotation direction
    pub direction: ArcDirection,
    /// Start point (the pen position)
    pub start: Position,
    /// Center point, start + (I, J)
    pub center: (f64, f64),
    /// Programmed end point; the start point when X/Y are absent
    pub end: Position,
    /// Distance from start to center
    pub radius: f64,
    /// Start angle around the center, in [0, 2π)
    pub start_angle: f64,
    /// End angle around the center, in [0, 2π)
    pub end_angle: f64,
    /// Swept angle, in (0, 2π]
    pub sweep: f64,
    /// Number of rotated points before the exact end point
    pub steps: usize,
    /// Signed angular increment per step
    pub increment: f64,
}

impl ArcPlan {
    /// Total number of moves the arc expands into
    pub fn segment_count(&self) -> usize {
        self.steps.saturating_add(1)
    }
}

/// Converts arc commands to line segments
#[derive(Debug, Clone, Default)]
pub struct ArcExpander {
    config: ArcExpanderConfig,
}

impl ArcExpander {
    /// Create a new arc expander
    pub fn new(config: ArcExpanderConfig) -> Self {
        Self { config }
    }

    /// Create an expander with the given segment length and default Z handling
    pub fn with_segment_length(segment_length: f32) -> Self {
        Self::new(ArcExpanderConfig {
            segment_length,
            ..ArcExpanderConfig::default()
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ArcExpanderConfig {
        &self.config
    }

    /// Resolve the geometry of `arc` starting at `start`
    pub fn plan(&self, arc: &Command, start: Position) -> ArcResult<ArcPlan> {
        let direction = arc.arc_direction().ok_or(ArcError::NotAnArc)?;

        let segment_length = self.config.segment_length;
        if !(segment_length.is_finite() && segment_length > 0.0) {
            return Err(ArcError::InvalidSegmentLength {
                value: segment_length,
            });
        }

        let sx = f64::from(start.x);
        let sy = f64::from(start.y);
        let center = (
            sx + f64::from(arc.get('I').unwrap_or(0.0)),
            sy + f64::from(arc.get('J').unwrap_or(0.0)),
        );
        let end = Position::new(arc.x().unwrap_or(start.x), arc.y().unwrap_or(start.y));

        let radius = (sx - center.0).hypot(sy - center.1);
        if !radius.is_finite() || radius <= MIN_RADIUS {
            return Err(ArcError::DegenerateRadius { radius });
        }

        let start_angle = x_axis_angle(sx - center.0, sy - center.1);
        let end_angle = x_axis_angle(f64::from(end.x) - center.0, f64::from(end.y) - center.1);

        // Coinciding angles sweep a full revolution, never zero.
        let mut sweep = match direction {
            ArcDirection::Clockwise => start_angle - end_angle,
            ArcDirection::CounterClockwise => end_angle - start_angle,
        };
        if sweep <= 0.0 {
            sweep += 2.0 * PI;
        }

        let segment_length = f64::from(segment_length);
        let steps = ((sweep * radius) / segment_length).floor();
        // The end point adds one move on top of the rotated steps.
        if steps >= MAX_ARC_SEGMENTS as f64 {
            return Err(ArcError::TooManySegments {
                arc_length: sweep * radius,
                max: MAX_ARC_SEGMENTS,
            });
        }
        let steps = steps as usize;
        let increment = match direction {
            ArcDirection::Clockwise => -(segment_length / radius),
            ArcDirection::CounterClockwise => segment_length / radius,
        };

        Ok(ArcPlan {
            direction,
            start,
            center,
            end,
            radius,
            start_angle,
            end_angle,
            sweep,
            steps,
            increment,
        })
    }

    /// Expand an arc into a lazy sequence of G1 moves
    pub fn expand(&self, arc: &Command, start: Position) -> ArcResult<ArcSegments> {
        let plan = self.plan(arc, start)?;
        tracing::debug!(
            radius = plan.radius,
            sweep = plan.sweep,
            segments = plan.segment_count(),
            "Expanding arc"
        );

        let z = match self.config.z_handling {
            ArcZHandling::Carry => arc.z(),
            ArcZHandling::Omit => None,
        };

        Ok(ArcSegments {
            center: plan.center,
            offset: (
                f64::from(start.x) - plan.center.0,
                f64::from(start.y) - plan.center.1,
            ),
            increment: plan.increment,
            steps: plan.steps,
            emitted: 0,
            end: plan.end,
            feed: arc.feed(),
            z,
        })
    }
}

/// Angle of a vector against the positive X axis, normalized into [0, 2π)
fn x_axis_angle(x: f64, y: f64) -> f64 {
    let angle = y.atan2(x);
    if angle < 0.0 {
        angle + 2.0 * PI
    } else {
        angle
    }
}

/// Single-pass iterator over the moves of one expanded arc
///
/// Yields `steps` points rotated around the center by multiples of the
/// increment, then one move to the exact programmed end point.
#[derive(Debug, Clone)]
pub struct ArcSegments {
    center: (f64, f64),
    offset: (f64, f64),
    increment: f64,
    steps: usize,
    emitted: usize,
    end: Position,
    feed: Option<f32>,
    z: Option<f32>,
}

impl ArcSegments {
    fn make_move(&self, x: f32, y: f32) -> Command {
        let mut cmd = Command::line_to(x, y);
        if let Some(z) = self.z {
            cmd = cmd.with('Z', z);
        }
        if let Some(feed) = self.feed {
            cmd = cmd.with('F', feed);
        }
        cmd
    }
}

impl Iterator for ArcSegments {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        if self.emitted > self.steps {
            return None;
        }
        self.emitted += 1;

        if self.emitted > self.steps {
            return Some(self.make_move(self.end.x, self.end.y));
        }

        let angle = self.increment * self.emitted as f64;
        let (sin, cos) = angle.sin_cos();
        let (ox, oy) = self.offset;
        let x = self.center.0 + ox * cos - oy * sin;
        let y = self.center.1 + ox * sin + oy * cos;
        Some(self.make_move(x as f32, y as f32))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.steps.saturating_add(1).saturating_sub(self.emitted);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ArcSegments {}

impl FusedIterator for ArcSegments {}
