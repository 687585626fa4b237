//! Winding propagator and ray-cast winding query (spec §4.4, §4.5).
//!
//! Every segment of a "curve chain" — a maximal run with no intersection
//! between its ends — gets the same winding number and other-operand
//! containment flag, found by sampling the chain's arc-length midpoint and
//! casting a ray against the combined, monotone-decomposed curve set of
//! both operands. (The per-segment `contour` flag used by the tracer's
//! `Unite` exception is a separate thing, set by `divide` — see
//! `propagate`'s doc comment.)
//!
//! Per the Open Question the spec raises about subtract's winding mask
//! (§4.4 last paragraph, §9): this implementation takes the "clean
//! rewrite" branch recorded in `SPEC_FULL.md` — `propagate` stores the
//! unmodified combined winding plus an extra `other_contains` flag (is
//! this chain's sample point inside the *other* operand's region?) and
//! leaves the subtract-specific masking to the tracer's operator table.

use crate::arena::{Arena, SegId};
use crate::consts::WINDING_EPSILON;
use crate::intersection::Operand;
use crate::monotone::{WindingSign, monotone_pieces};
use crate::path::Path;
use kurbo::{CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv, Point};
use roots::find_roots_cubic;

const ARCLEN_ACCURACY: f64 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WindingResult {
	pub winding: i32,
	pub contour: bool,
}

/// One entry of the global monotone curve set, tagged with the operand it
/// came from (so a query can be restricted to one operand) and the
/// original pre-split curve it's a piece of (so the horizontal-piece
/// sign-inheritance rule in spec §4.5 only looks at a neighbor that came
/// from the *same* source curve).
#[derive(Clone, Copy)]
struct Entry {
	curve: CubicBez,
	sign: WindingSign,
	operand: Operand,
	source_curve: usize,
}

/// Builds the flattened, monotone-decomposed curve set for every path in
/// the arena, used both for the combined winding query and for
/// restricting a query to one operand.
fn global_entries(arena: &Arena, horizontal: bool) -> Vec<Entry> {
	let mut out = Vec::new();
	let mut source_curve = 0;
	for (path_idx, path) in arena.paths.iter().enumerate() {
		for pos in 0..path.segments.len() {
			if let Some(curve) = arena.curve_at(path_idx, pos) {
				for piece in monotone_pieces(&curve, horizontal) {
					out.push(Entry { curve: piece.curve, sign: piece.sign, operand: path.operand, source_curve });
				}
				source_curve += 1;
			}
		}
	}
	out
}

/// Ray-cast winding query (spec §4.5) restricted to `entries` matching
/// `filter`. Casts from `point` in the +abscissa direction (x normally,
/// y when `horizontal`), tracking windLeft/windRight around the abscissa
/// band `[pa - WINDING_EPSILON, pa + WINDING_EPSILON]`.
fn get_winding_filtered(point: Point, entries: &[Entry], horizontal: bool, filter: impl Fn(Operand) -> bool) -> WindingResult {
	let (pa, po) = if horizontal { (point.y, point.x) } else { (point.x, point.y) };

	let mut wind_left = 0_i32;
	let mut wind_right = 0_i32;
	let mut on_contour = false;
	// Only the immediately preceding monotone piece *of the same source
	// curve* is eligible to have its contribution canceled — pieces from
	// unrelated curves carry no such relationship.
	let mut prev_sign: Option<(WindingSign, f64, usize)> = None;

	for entry in entries {
		if !filter(entry.operand) {
			continue;
		}
		let curve = entry.curve;
		let (o0, o1) = ordinate_range(&curve, horizontal);
		if po < o0.min(o1) || po > o0.max(o1) {
			continue;
		}

		match entry.sign {
			WindingSign::Flat => {
				let (a0, a1) = abscissa_range(&curve, horizontal);
				if pa >= a0.min(a1) - WINDING_EPSILON && pa <= a0.max(a1) + WINDING_EPSILON {
					on_contour = true;
				}
				continue;
			}
			_ => {}
		}

		let Some(t) = time_at_ordinate(&curve, po, horizontal) else {
			continue;
		};
		let point_on_curve = curve.eval(t);
		let a = if horizontal { point_on_curve.y } else { point_on_curve.x };
		let winding = if entry.sign == WindingSign::Up { 1 } else { -1 };

		if let Some((prev, prev_end_a)) = prev_sign {
			if (po - o0).abs() < f64::EPSILON && prev != entry.sign {
				// The intersection lands exactly at the start of this
				// piece and the previous piece's direction differs:
				// cancel the previous piece's contribution so a
				// tangential touch at a shared endpoint isn't double
				// counted.
				if prev_end_a < pa - WINDING_EPSILON {
					wind_left -= if prev == WindingSign::Up { 1 } else { -1 };
				} else if prev_end_a > pa + WINDING_EPSILON {
					wind_right -= if prev == WindingSign::Up { 1 } else { -1 };
				} else {
					wind_left -= if prev == WindingSign::Up { 1 } else { -1 };
					wind_right -= if prev == WindingSign::Up { 1 } else { -1 };
				}
			}
		}

		if a < pa - WINDING_EPSILON {
			wind_left += winding;
		} else if a > pa + WINDING_EPSILON {
			wind_right += winding;
		} else {
			wind_left += winding;
			wind_right += winding;
			on_contour = true;
		}
		prev_sign = Some((entry.sign, a));
	}

	let fold = |w: i32| -> i32 {
		if w == 0 {
			0
		} else {
			2 - (w.unsigned_abs() % 2) as i32
		}
	};

	WindingResult { winding: fold(wind_left).max(fold(wind_right)), contour: on_contour || (wind_left != wind_right) }
}

fn ordinate_range(curve: &CubicBez, horizontal: bool) -> (f64, f64) {
	let o = |p: Point| if horizontal { p.x } else { p.y };
	(o(curve.p0), o(curve.p3))
}

fn abscissa_range(curve: &CubicBez, horizontal: bool) -> (f64, f64) {
	let a = |p: Point| if horizontal { p.y } else { p.x };
	(a(curve.p0), a(curve.p3))
}

/// Solves the cubic `ordinate(t) == target` for `t ∈ [0,1]` using the
/// `roots` crate, matching the `solveCubic` collaborator named in the
/// spec. Falls back to the nearer endpoint when `target` coincides with
/// it exactly, per spec §4.5.
fn time_at_ordinate(curve: &CubicBez, target: f64, horizontal: bool) -> Option<f64> {
	let o = |p: Point| if horizontal { p.x } else { p.y };
	let (y0, y1, y2, y3) = (o(curve.p0), o(curve.p1), o(curve.p2), o(curve.p3));

	if (target - y0).abs() < f64::EPSILON {
		return Some(0.0);
	}
	if (target - y3).abs() < f64::EPSILON {
		return Some(1.0);
	}

	// Bernstein-basis cubic in `t`: y(t) - target == 0.
	let c3 = -y0 + 3.0 * y1 - 3.0 * y2 + y3;
	let c2 = 3.0 * y0 - 6.0 * y1 + 3.0 * y2;
	let c1 = -3.0 * y0 + 3.0 * y1;
	let c0 = y0 - target;

	if c3.abs() < 1e-12 && c2.abs() < 1e-12 {
		if c1.abs() < 1e-12 {
			return None;
		}
		let t = -c0 / c1;
		return if (0.0..=1.0).contains(&t) { Some(t) } else { None };
	}

	find_roots_cubic(c3, c2, c1, c0).as_ref().iter().copied().find(|t| (0.0..=1.0).contains(t))
}

/// Full ray-cast winding against the combined monotone curve set of both
/// operands — the `globalCurves` query of spec §4.4/§4.5.
pub fn get_winding(arena: &Arena, point: Point, horizontal: bool) -> WindingResult {
	let entries = global_entries(arena, horizontal);
	get_winding_filtered(point, &entries, horizontal, |_| true)
}

/// Ray-cast winding restricted to one operand's curves, used to decide
/// whether a chain belonging to operand A lies inside operand B (or vice
/// versa) for subtract's masking rule.
fn contains_in_operand(arena: &Arena, point: Point, horizontal: bool, operand: Operand) -> bool {
	let entries = global_entries(arena, horizontal);
	get_winding_filtered(point, &entries, horizontal, |op| op == operand).winding % 2 != 0
}

/// Even-odd containment / interior-point ray-cast against a single
/// standalone path's own curves (used by `Path::contains_point` and the
/// orientation fixer's interior-point helper), independent of any arena.
pub fn get_winding_single_path(path: &Path, point: Point, horizontal: bool) -> WindingResult {
	let entries: Vec<Entry> = path
		.curves()
		.flat_map(|curve| monotone_pieces(&curve, horizontal).into_iter().map(move |piece| Entry { curve: piece.curve, sign: piece.sign, operand: Operand::A }))
		.collect();
	get_winding_filtered(point, &entries, horizontal, |_| true)
}

/// Horizontal-ray x-intercepts of `path` at ordinate `y`, sorted
/// ascending. Used by the orientation fixer's interior-point helper
/// (spec §4.8) when the bounding-box center isn't actually inside the
/// path (a concave poly-Bezier region).
pub fn x_intercepts(path: &Path, y: f64) -> Vec<f64> {
	let mut xs: Vec<f64> = path
		.curves()
		.flat_map(|curve| monotone_pieces(&curve, false).into_iter().filter_map(move |piece| x_intercept_of(&piece.curve, piece.sign, y)))
		.collect();
	xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
	xs
}

fn x_intercept_of(curve: &CubicBez, sign: WindingSign, y: f64) -> Option<f64> {
	if sign == WindingSign::Flat {
		return None;
	}
	let (y0, y3) = (curve.p0.y, curve.p3.y);
	if y < y0.min(y3) || y > y0.max(y3) {
		return None;
	}
	let t = time_at_ordinate(curve, y, false)?;
	Some(curve.eval(t).x)
}

fn sample_chain_midpoint(arena: &Arena, segs: &[(usize, usize)]) -> (Point, bool) {
	let curves: Vec<CubicBez> = segs.iter().filter_map(|&(p, i)| arena.curve_at(p, i)).collect();
	if curves.is_empty() {
		return (Point::ZERO, true);
	}
	let lengths: Vec<f64> = curves.iter().map(|c| c.arclen(ARCLEN_ACCURACY)).collect();
	let total: f64 = lengths.iter().sum();
	if total < f64::EPSILON {
		return (curves[0].eval(0.5), true);
	}

	let target = total * 0.5;
	let mut acc = 0.0;
	let last = curves.len() - 1;
	for (idx, (curve, len)) in curves.iter().zip(lengths.iter()).enumerate() {
		if acc + len >= target || idx == last {
			let local_len = if *len > f64::EPSILON { (target - acc).clamp(0.0, *len) } else { 0.0 };
			let t = curve.inv_arclen(local_len, ARCLEN_ACCURACY);
			let point = curve.eval(t);
			let tangent = curve.deriv().eval(t);
			let near_horizontal = (tangent.y / tangent.x.hypot(tangent.y)).abs() < 0.5;
			return (point, near_horizontal);
		}
		acc += len;
	}
	(curves[0].eval(0.5), true)
}

/// Collects every maximal chain of segments with no intersection between
/// its ends, as `(path_idx, pos)` runs in path order. A path with no
/// intersections at all is a single chain comprising its whole segment
/// sequence.
fn collect_chains(arena: &Arena) -> Vec<Vec<(usize, usize)>> {
	let mut chains = Vec::new();
	for (path_idx, path) in arena.paths.iter().enumerate() {
		if path.segments.len() < 2 {
			continue;
		}
		let boundary_positions: Vec<usize> = (0..path.segments.len()).filter(|&pos| arena.data(path.segments[pos]).intersection.is_some()).collect();

		if boundary_positions.is_empty() {
			let run: Vec<(usize, usize)> = (0..path.segments.len()).filter(|&pos| arena.next_pos(path_idx, pos).is_some()).map(|pos| (path_idx, pos)).collect();
			if !run.is_empty() {
				chains.push(run);
			}
			continue;
		}

		let n = boundary_positions.len();
		for (k, &start) in boundary_positions.iter().enumerate() {
			let end = boundary_positions[(k + 1) % n];
			let mut run = Vec::new();
			let mut pos = start;
			loop {
				run.push((path_idx, pos));
				let Some(next) = arena.next_pos(path_idx, pos) else { break };
				if next == end && !run.is_empty() {
					break;
				}
				pos = next;
				if pos == start {
					break;
				}
			}
			chains.push(run);
		}
	}
	chains
}

/// Assigns winding and other-operand containment to every segment of every
/// chain in the arena. The per-segment `contour` flag is *not* touched here:
/// it is set earlier, by `divide::divide_locations`, from the intersection
/// finder's overlap locations, and means "this segment's outgoing curve
/// coincides exactly with an edge of the other operand" (spec §4.6's
/// `Unite` contour exception) — a generic ray-cast hit-test would instead
/// fire on essentially every chain sample, since a chain is always sampled
/// from a point lying on its own curve, and so couldn't tell a genuine
/// coincident edge apart from an ordinary doubly-covered interior piece.
pub fn propagate(arena: &mut Arena) {
	let chains = collect_chains(arena);
	for chain in chains {
		let (point, near_horizontal) = sample_chain_midpoint(arena, &chain);
		let combined = get_winding(arena, point, near_horizontal);
		let operand = arena.paths[chain[0].0].operand;
		let other = match operand {
			Operand::A => Operand::B,
			Operand::B => Operand::A,
		};
		let other_contains = contains_in_operand(arena, point, near_horizontal, other);

		for &(p, i) in &chain {
			let seg = arena.seg_id_at(p, i);
			let data = arena.data_mut(seg);
			data.winding = Some(combined.winding);
			data.other_contains = other_contains;
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::arena::Arena;
	use crate::path::Segment;

	fn unit_square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Segment> {
		vec![Segment::new(Point::new(x0, y0)), Segment::new(Point::new(x1, y0)), Segment::new(Point::new(x1, y1)), Segment::new(Point::new(x0, y1))]
	}

	#[test]
	fn winding_inside_single_square_is_one() {
		let mut arena = Arena::new();
		arena.push_path(&unit_square(0.0, 0.0, 100.0, 100.0), true, Operand::A);
		let result = get_winding(&arena, Point::new(50.0, 50.0), false);
		assert_eq!(result.winding, 1);
	}

	#[test]
	fn winding_outside_single_square_is_zero() {
		let mut arena = Arena::new();
		arena.push_path(&unit_square(0.0, 0.0, 100.0, 100.0), true, Operand::A);
		let result = get_winding(&arena, Point::new(500.0, 500.0), false);
		assert_eq!(result.winding, 0);
	}

	#[test]
	fn winding_in_overlap_of_two_squares_is_two() {
		let mut arena = Arena::new();
		arena.push_path(&unit_square(0.0, 0.0, 100.0, 100.0), true, Operand::A);
		arena.push_path(&unit_square(50.0, 50.0, 150.0, 150.0), true, Operand::B);
		let result = get_winding(&arena, Point::new(75.0, 75.0), false);
		assert_eq!(result.winding, 2);
	}
}
