//! Centralized tuning constants for the arsenal core.
//!
//! Geometry, sweep and scheduling tolerances live here so the controller,
//! the sweep progression and the tests agree on one set of numbers.
//! Per-weapon numbers (radii, timings, damage) belong to `presets` and
//! to loadout files, not here.

// =====================================================
// Crescent geometry
// =====================================================

/// Arc degrees covered by one polygon segment: segments = round(width / SEGMENT_DEGREES)
pub const SEGMENT_DEGREES: f32 = 5.0;

/// Lower bound on arc segments so narrow arcs still produce a usable ring-sector
pub const MIN_SEGMENTS: usize = 6;

/// Squared length under which an aim vector counts as degenerate
pub const DEGENERATE_DIR_EPSILON: f32 = 0.000_001;

// =====================================================
// Sweep
// =====================================================

/// Smallest sweep step accepted, in degrees
pub const MIN_SWEEP_STEP_DEGREES: f32 = 1.0;

/// Extra iterations allowed on top of ceil(span / step)
pub const SWEEP_GUARD_MARGIN: usize = 10;

/// Angular distance (radians) at which a sweep edge counts as arrived
pub const SWEEP_ARRIVAL_EPSILON: f32 = 0.0001;

// =====================================================
// Scheduling
// =====================================================

/// Remaining time (seconds) treated as elapsed for cooldowns and timers
pub const TIMER_EPSILON: f32 = 0.000_01;

/// Upper bound on timer callbacks processed in a single tick
pub const MAX_TIMER_FIRES_PER_TICK: usize = 1024;

// =====================================================
// Charge
// =====================================================

/// Default exponent when exponential life scaling is switched on without one
pub const DEFAULT_LIFE_EXPONENT: f32 = 2.0;
