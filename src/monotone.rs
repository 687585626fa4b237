//! Monotone decomposition (spec §4.1).
//!
//! Splits a cubic at its Y-extrema (or X-extrema, when the winding query
//! is casting a vertical ray) so every piece is monotone in the chosen
//! ordinate, which is what lets the ray-cast winding query solve a single
//! cubic root per piece instead of worrying about multiple crossings.

use crate::consts::CURVETIME_EPSILON;
use crate::geom::{is_straight, split_cubic_at};
use kurbo::{CubicBez, Point};
use roots::find_roots_quadratic;
use smallvec::SmallVec;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WindingSign {
	/// Ordinate increases from `p0` to `p3`.
	Up,
	/// Ordinate decreases from `p0` to `p3`.
	Down,
	/// Ordinate does not change — a horizontal (or vertical, under a
	/// vertical ray) piece, which contributes no direct winding but must
	/// still be detected so a grazing ray can be flagged on-contour.
	Flat,
}

#[derive(Clone, Copy, Debug)]
pub struct MonoCurve {
	pub curve: CubicBez,
	pub sign: WindingSign,
}

fn ordinate(p: Point, horizontal: bool) -> f64 {
	if horizontal { p.x } else { p.y }
}

/// Splits `curve` into at most three pieces, each monotone in the chosen
/// ordinate. Straight segments are returned unsplit, matching
/// `Curve.isStraight`'s fast path in the primitive layer.
pub fn monotone_pieces(curve: &CubicBez, horizontal: bool) -> SmallVec<[MonoCurve; 3]> {
	let mut pieces = SmallVec::new();

	if is_straight(curve) {
		pieces.push(make_piece(*curve, horizontal));
		return pieces;
	}

	let y0 = ordinate(curve.p0, horizontal);
	let y1 = ordinate(curve.p1, horizontal);
	let y2 = ordinate(curve.p2, horizontal);
	let y3 = ordinate(curve.p3, horizontal);

	let a = 3.0 * (y1 - y2) - y0 + y3;
	let b = 2.0 * (y0 + y2) - 4.0 * y1;
	let c = y1 - y0;

	let mut ts: SmallVec<[f64; 2]> = SmallVec::new();
	for &t in find_roots_quadratic(a, b, c).as_ref() {
		if t > CURVETIME_EPSILON && t < 1.0 - CURVETIME_EPSILON {
			ts.push(t);
		}
	}
	ts.sort_by(|x, y| x.partial_cmp(y).unwrap());
	ts.dedup_by(|x, y| (*x - *y).abs() < CURVETIME_EPSILON);

	let mut remaining = *curve;
	let mut prev_t = 0.0;
	for &t in ts.iter() {
		let local_t = (t - prev_t) / (1.0 - prev_t);
		let (left, right) = split_cubic_at(&remaining, local_t);
		pieces.push(make_piece(left, horizontal));
		remaining = right;
		prev_t = t;
	}
	pieces.push(make_piece(remaining, horizontal));
	pieces
}

fn make_piece(curve: CubicBez, horizontal: bool) -> MonoCurve {
	let y0 = ordinate(curve.p0, horizontal);
	let y3 = ordinate(curve.p3, horizontal);
	let sign = if (y3 - y0).abs() < f64::EPSILON {
		WindingSign::Flat
	} else if y0 < y3 {
		WindingSign::Up
	} else {
		WindingSign::Down
	};
	MonoCurve { curve, sign }
}
