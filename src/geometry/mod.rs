//! Crescent (ring-sector) hitbox geometry.
//!
//! Angles are radians in the usual math convention (0 = +X, counter-clockwise).
//! Polygons are returned as plain vertex lists; the caller decides whether
//! they are weapon-local or world-space by the origin it passes in.

use bevy::math::Vec2;
use std::f32::consts::TAU;

use crate::constants::{DEGENERATE_DIR_EPSILON, MIN_SEGMENTS, SEGMENT_DEGREES};

pub mod sweep;

pub use sweep::{Sweep, SweepStep};

/// Angular range of a sector, `start` to `end` in radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcSpan {
    pub start: f32,
    pub end: f32,
}

impl ArcSpan {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// Span of `width` radians centered on `center`
    pub fn centered(center: f32, width: f32) -> Self {
        let half = width * 0.5;
        Self {
            start: center - half,
            end: center + half,
        }
    }

    pub fn width(&self) -> f32 {
        self.end - self.start
    }

    pub fn center(&self) -> f32 {
        (self.start + self.end) * 0.5
    }

    /// Same span with `end >= start`, unwrapping across the 0/2π seam
    pub fn normalized(self) -> Self {
        let mut end = self.end;
        if end.is_finite() && self.start.is_finite() {
            while end < self.start {
                end += TAU;
            }
        }
        Self {
            start: self.start,
            end,
        }
    }
}

/// Number of arc segments for an arc of `arc_width_deg`: max(6, round(width / 5))
pub fn segment_count(arc_width_deg: f32) -> usize {
    let raw = (arc_width_deg.abs() / SEGMENT_DEGREES).round();
    if raw.is_finite() && raw > MIN_SEGMENTS as f32 {
        raw as usize
    } else {
        MIN_SEGMENTS
    }
}

/// Build a closed ring-sector polygon.
///
/// Produces `segments + 1` points along the outer arc from `start_angle` to
/// `end_angle`, then `segments + 1` points along the inner arc in reverse,
/// for `2 * segments + 2` vertices in total.
pub fn build_sector(
    origin: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    start_angle: f32,
    end_angle: f32,
    segments: usize,
) -> Vec<Vec2> {
    let mut points = Vec::with_capacity(segments * 2 + 2);

    for i in 0..=segments {
        let a = interpolate_angle(start_angle, end_angle, i, segments);
        points.push(origin + Vec2::from_angle(a) * outer_radius);
    }
    for i in (0..=segments).rev() {
        let a = interpolate_angle(start_angle, end_angle, i, segments);
        points.push(origin + Vec2::from_angle(a) * inner_radius);
    }

    points
}

fn interpolate_angle(start: f32, end: f32, i: usize, segments: usize) -> f32 {
    if segments == 0 {
        return start;
    }
    let t = i as f32 / segments as f32;
    start + (end - start) * t
}

/// Unit direction the wielder faces when no usable aim exists
pub fn facing_direction(facing_left: bool) -> Vec2 {
    if facing_left {
        Vec2::NEG_X
    } else {
        Vec2::X
    }
}

/// Normalized direction from `origin` to `aim`, or the facing direction if
/// the two points (nearly) coincide or the input is not finite.
pub fn aim_direction(origin: Vec2, aim: Vec2, facing_left: bool) -> Vec2 {
    let dir = aim - origin;
    if !dir.is_finite() || dir.length_squared() <= DEGENERATE_DIR_EPSILON {
        return facing_direction(facing_left);
    }
    dir.normalize()
}

/// Angle of a direction vector in radians
pub fn direction_angle(dir: Vec2) -> f32 {
    dir.y.atan2(dir.x)
}

/// Sector span for a crescent aimed from `origin` at `aim`.
///
/// The arc is centered on the aim direction and rotated by
/// `center_offset_deg`, whose sign flips when facing left so the offset
/// leads the swing on both sides.
pub fn oriented_arc(
    origin: Vec2,
    aim: Vec2,
    arc_width_deg: f32,
    center_offset_deg: f32,
    facing_left: bool,
) -> ArcSpan {
    let dir = aim_direction(origin, aim, facing_left);
    let offset_deg = if facing_left {
        -center_offset_deg
    } else {
        center_offset_deg
    };
    let center = direction_angle(dir) + offset_deg.to_radians();
    ArcSpan::centered(center, arc_width_deg.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_segment_policy() {
        assert_eq!(segment_count(10.0), 6);
        assert_eq!(segment_count(30.0), 6);
        assert_eq!(segment_count(70.0), 14);
        assert_eq!(segment_count(360.0), 72);
        assert_eq!(segment_count(f32::NAN), 6);
    }

    #[test]
    fn test_sector_vertex_count_and_radii() {
        let poly = build_sector(Vec2::ZERO, 18.0, 28.0, 0.0, FRAC_PI_2, 8);
        assert_eq!(poly.len(), 18);
        for p in &poly[..9] {
            assert!((p.length() - 28.0).abs() < 1e-3);
        }
        for p in &poly[9..] {
            assert!((p.length() - 18.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_sector_outer_then_inner_reversed() {
        let poly = build_sector(Vec2::new(5.0, 5.0), 1.0, 2.0, 0.0, PI, 6);
        // outer arc starts at the start angle
        assert!((poly[0] - Vec2::new(7.0, 5.0)).length() < 1e-4);
        // outer arc ends at the end angle
        assert!((poly[6] - Vec2::new(3.0, 5.0)).length() < 1e-4);
        // inner arc begins at the end angle
        assert!((poly[7] - Vec2::new(4.0, 5.0)).length() < 1e-4);
        // and closes back at the start angle
        assert!((poly[13] - Vec2::new(6.0, 5.0)).length() < 1e-4);
    }

    #[test]
    fn test_degenerate_aim_falls_back_to_facing() {
        let origin = Vec2::new(3.0, 4.0);
        assert_eq!(aim_direction(origin, origin, false), Vec2::X);
        assert_eq!(aim_direction(origin, origin, true), Vec2::NEG_X);
        assert_eq!(
            aim_direction(origin, Vec2::new(f32::NAN, 0.0), false),
            Vec2::X
        );
    }

    #[test]
    fn test_oriented_arc_mirrors_offset() {
        let right = oriented_arc(Vec2::ZERO, Vec2::new(10.0, 0.0), 90.0, 20.0, false);
        assert!((right.center() - 20f32.to_radians()).abs() < 1e-5);
        assert!((right.width() - FRAC_PI_2).abs() < 1e-5);

        let left = oriented_arc(Vec2::ZERO, Vec2::new(-10.0, 0.0), 90.0, 20.0, true);
        assert!((left.center() - (PI - 20f32.to_radians())).abs() < 1e-5);
    }

    #[test]
    fn test_normalized_unwraps_seam() {
        let span = ArcSpan::new(3.0, -3.0).normalized();
        assert!(span.end >= span.start);
        assert!((span.end - (-3.0 + TAU)).abs() < 1e-5);
    }
}
