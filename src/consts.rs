//! Tunable tolerances shared across the boolean operations engine.
//!
//! These are empirically chosen, not derived from any closed-form error
//! bound, and deliberately kept distinct: each plays a different role and
//! collapsing them would hide real precision mismatches (see `DESIGN.md`).

/// Proximity threshold in curve-parameter space (`t ∈ [0,1]`).
pub const CURVETIME_EPSILON: f64 = 1e-8;

/// Proximity threshold in geometric (user-space) units.
pub const GEOMETRIC_EPSILON: f64 = 1e-7;

/// Half-width of the abscissa band used by the ray-cast winding query.
pub const WINDING_EPSILON: f64 = 1e-9;

/// Safety cap on the tracer's inner loop, expressed as a multiple of the
/// total segment count across both operands (spec §5).
pub const TRACE_MAX_ITERATIONS_FACTOR: usize = 4;
