//! Progressive reveal of a crescent across the active window.
//!
//! A `Sweep` grows a sub-range of the full sector one step at a time. The
//! weapon controller drives it from its scheduler; the sweep itself only
//! knows geometry and its iteration guard.

use bevy::math::Vec2;

use super::{build_sector, ArcSpan};
use crate::constants::{MIN_SWEEP_STEP_DEGREES, SWEEP_ARRIVAL_EPSILON, SWEEP_GUARD_MARGIN};

/// Result of advancing a sweep by one step
#[derive(Debug, Clone, PartialEq)]
pub enum SweepStep {
    /// Intermediate polygon; more steps follow
    Partial(Vec<Vec2>),
    /// The full sector; the sweep is over
    Complete(Vec<Vec2>),
}

impl SweepStep {
    pub fn polygon(&self) -> &[Vec2] {
        match self {
            SweepStep::Partial(poly) | SweepStep::Complete(poly) => poly,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SweepStep::Complete(_))
    }
}

#[derive(Debug, Clone)]
pub struct Sweep {
    origin: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    segments: usize,
    target: ArcSpan,
    current: ArcSpan,
    step: f32,
    from_start: bool,
    iterations: usize,
    max_iterations: usize,
    finished: bool,
}

impl Sweep {
    /// Start a sweep over `arc` that grows from its start edge when
    /// `from_start` is set, otherwise from its end edge.
    pub fn new(
        origin: Vec2,
        inner_radius: f32,
        outer_radius: f32,
        arc: ArcSpan,
        segments: usize,
        step_deg: f32,
        from_start: bool,
    ) -> Self {
        let target = arc.normalized();
        let step = step_deg.max(MIN_SWEEP_STEP_DEGREES).to_radians();
        let current = if from_start {
            ArcSpan::new(target.start, target.start)
        } else {
            ArcSpan::new(target.end, target.end)
        };

        let span = target.width().abs();
        let steps = if span.is_finite() {
            (span / step).ceil() as usize
        } else {
            0
        };

        Self {
            origin,
            inner_radius,
            outer_radius,
            segments,
            target,
            current,
            step,
            from_start,
            iterations: 0,
            max_iterations: steps + SWEEP_GUARD_MARGIN,
            finished: false,
        }
    }

    /// Grow the revealed range by one step.
    pub fn advance(&mut self) -> SweepStep {
        if self.finished {
            return SweepStep::Complete(self.final_polygon());
        }

        self.iterations += 1;
        if self.from_start {
            self.current.end = (self.current.end + self.step).min(self.target.end);
        } else {
            self.current.start = (self.current.start - self.step).max(self.target.start);
        }

        let arrived = (self.current.end - self.target.end).abs() < SWEEP_ARRIVAL_EPSILON
            && (self.current.start - self.target.start).abs() < SWEEP_ARRIVAL_EPSILON;

        if arrived || self.iterations >= self.max_iterations {
            return SweepStep::Complete(self.finish());
        }

        SweepStep::Partial(build_sector(
            self.origin,
            self.inner_radius,
            self.outer_radius,
            self.current.start,
            self.current.end,
            self.segments,
        ))
    }

    /// Stop the sweep and return the full sector as the correction frame.
    pub fn finish(&mut self) -> Vec<Vec2> {
        self.finished = true;
        self.current = self.target;
        self.final_polygon()
    }

    pub fn final_polygon(&self) -> Vec<Vec2> {
        build_sector(
            self.origin,
            self.inner_radius,
            self.outer_radius,
            self.target.start,
            self.target.end,
            self.segments,
        )
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn current(&self) -> ArcSpan {
        self.current
    }

    pub fn target(&self) -> ArcSpan {
        self.target
    }
}
