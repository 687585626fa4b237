//! Small geometric helpers shared by the monotone decomposition,
//! intersection and winding modules.
//!
//! `kurbo` supplies the curve-parametric primitives (evaluation, arc
//! length, extrema); `glam::DVec2` is reached for whenever the algorithm
//! needs raw cross/dot products, matching the split already present in
//! this corpus between `bezier-rs` (built on `glam::DVec2`) and
//! `graphite-document-legacy`'s boolean operations (built on `kurbo::Point`).

use crate::consts::GEOMETRIC_EPSILON;
use glam::DVec2;
use kurbo::{CubicBez, Point};

pub fn to_glam(p: Point) -> DVec2 {
	DVec2::new(p.x, p.y)
}

/// Signed magnitude of the 2D cross product `a × b`.
pub fn cross(a: DVec2, b: DVec2) -> f64 {
	a.x * b.y - a.y * b.x
}

/// Linear interpolation between two points; used by the de Casteljau
/// split below instead of relying on any particular point-lerp trait.
fn lerp_point(a: Point, b: Point, t: f64) -> Point {
	Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
}

/// True when the curve's handles are collinear with its anchor-to-anchor
/// chord, within `GEOMETRIC_EPSILON`. Mirrors `Curve.isStraight` from the
/// primitive layer the spec treats as external.
pub fn is_straight(curve: &CubicBez) -> bool {
	let chord = to_glam(curve.p3) - to_glam(curve.p0);
	let chord_len = chord.length();
	if chord_len < GEOMETRIC_EPSILON {
		let h1 = to_glam(curve.p1) - to_glam(curve.p0);
		let h2 = to_glam(curve.p2) - to_glam(curve.p3);
		return h1.length() < GEOMETRIC_EPSILON && h2.length() < GEOMETRIC_EPSILON;
	}
	let h1 = to_glam(curve.p1) - to_glam(curve.p0);
	let h2 = to_glam(curve.p2) - to_glam(curve.p0);
	cross(chord, h1).abs() < GEOMETRIC_EPSILON * chord_len && cross(chord, h2).abs() < GEOMETRIC_EPSILON * chord_len
}

/// de Casteljau split at an arbitrary `t ∈ (0, 1)`, returning the left and
/// right halves. `kurbo::CubicBez::subdivide` only splits at `t = 0.5`, so
/// the divider and monotone-decomposition code need this instead —
/// grounded in `graphite-document-legacy::boolean_ops::split_path_seg`.
pub fn split_cubic_at(curve: &CubicBez, t: f64) -> (CubicBez, CubicBez) {
	let a1 = lerp_point(curve.p0, curve.p1, t);
	let a2 = lerp_point(curve.p1, curve.p2, t);
	let a3 = lerp_point(curve.p2, curve.p3, t);
	let b1 = lerp_point(a1, a2, t);
	let b2 = lerp_point(a2, a3, t);
	let c1 = lerp_point(b1, b2, t);
	(CubicBez::new(curve.p0, a1, b1, c1), CubicBez::new(c1, b2, a3, curve.p3))
}

/// Squared Euclidean distance between two points, used for cheap proximity
/// checks ahead of an `f64::sqrt`.
pub fn dist_sq(a: Point, b: Point) -> f64 {
	let d = to_glam(b) - to_glam(a);
	d.length_squared()
}
