//! Boolean operations (union, intersection, subtraction, exclusion) on 2D
//! cubic Bezier path regions.
//!
//! Given two closed planar regions bounded by cubic Bezier paths —
//! possibly compound (multiple sub-paths with holes) and possibly
//! self-intersecting — this crate computes their union, intersection,
//! difference, or symmetric difference and returns it as a set of closed
//! cubic Bezier paths with consistent winding orientation. [`resolve_crossings`]
//! resolves the self-intersections of a single path into a clean,
//! non-self-intersecting region.
//!
//! The pipeline (see each module's docs for its piece):
//! monotone decomposition → intersection finder → location divider →
//! winding propagator → path tracer → orientation fixer.

pub mod arena;
pub mod consts;
pub mod divide;
pub mod error;
pub mod geom;
pub mod intersection;
pub mod monotone;
pub mod orient;
pub mod path;
pub mod trace;
pub mod winding;

pub use error::{BooleanOpError, Result};
pub use path::{CompoundPath, FillRule, Path, PathItem, Segment};

use arena::Arena;
use intersection::Operand;
use kurbo::Point;
use trace::Operator;

/// `A.unite(B)`: the region covered by either operand.
pub fn unite(a: &PathItem, b: &PathItem) -> Result<PathItem> {
	run(a, b, Operator::Unite)
}

/// `A.intersect(B)`: the region covered by both operands.
pub fn intersect(a: &PathItem, b: &PathItem) -> Result<PathItem> {
	run(a, b, Operator::Intersect)
}

/// `A.subtract(B)`: the region covered by `a` but not `b`.
pub fn subtract(a: &PathItem, b: &PathItem) -> Result<PathItem> {
	run(a, b, Operator::Subtract)
}

/// `A.exclude(B)`: the symmetric difference — covered by exactly one
/// operand.
pub fn exclude(a: &PathItem, b: &PathItem) -> Result<PathItem> {
	run(a, b, Operator::Exclude)
}

/// `A.divide(B)`: equivalent to a compound of `subtract(A, B)` and
/// `intersect(A, B)` (spec §6).
pub fn divide(a: &PathItem, b: &PathItem) -> Result<PathItem> {
	let sub = subtract(a, b)?;
	let int = intersect(a, b)?;
	let mut children = sub.paths().into_iter().cloned().collect::<Vec<_>>();
	children.extend(int.paths().into_iter().cloned());
	Ok(finish(children, a.fill_rule()))
}

/// Rewrites `item`'s self-intersections into a clean, non-self-intersecting
/// region. Idempotent: `resolve_crossings(&resolve_crossings(p)?)? == resolve_crossings(p)?`
/// up to path-order normalization.
pub fn resolve_crossings(item: &PathItem) -> Result<PathItem> {
	if item.is_open() {
		return Err(BooleanOpError::UnsupportedOpenPath);
	}
	let prepared = item.prepare();
	let mut arena = Arena::new();
	for path in prepared.paths() {
		arena.push_path(&path.segments, path.closed, Operand::A);
	}

	let curves_a = arena.curves_for(Operand::A);
	let mut intersections = intersection::find_intersections(&curves_a, &curves_a, true);
	divide::divide_locations(&mut arena, &mut intersections, |loc| loc.overlap || loc.crossing);
	winding::propagate(&mut arena);
	let traced = trace::trace_paths(&mut arena, &intersections, Operator::ResolveCrossings)?;
	let oriented = orient::reorient(traced, prepared.fill_rule());
	Ok(finish(oriented, prepared.fill_rule()))
}

/// The `_getWinding` external query from spec §6: winding number of
/// `item` at `point`, used for containment queries outside the engine.
pub fn winding_at(item: &PathItem, point: Point, horizontal: bool) -> i32 {
	let mut arena = Arena::new();
	for path in item.paths() {
		arena.push_path(&path.segments, path.closed, Operand::A);
	}
	winding::get_winding(&arena, point, horizontal).winding
}

/// Spec §7: an open path operand is only supported by `subtract`/
/// `intersect`, and only when paired against a closed operand — two open
/// operands, or an open operand under any other operator, is rejected
/// up front rather than left to produce a meaningless result.
fn check_preconditions(a: &PathItem, b: &PathItem, operator: Operator) -> Result<()> {
	let open_supported = matches!(operator, Operator::Subtract | Operator::Intersect);
	let either_open = a.is_open() || b.is_open();
	let both_open = a.is_open() && b.is_open();
	if either_open && (!open_supported || both_open) {
		return Err(BooleanOpError::UnsupportedOpenPath);
	}
	Ok(())
}

fn run(a: &PathItem, b: &PathItem, operator: Operator) -> Result<PathItem> {
	check_preconditions(a, b, operator)?;

	let a = a.prepare();
	let b = b.prepare();
	let mut arena = Arena::new();
	for path in a.paths() {
		arena.push_path(&path.segments, path.closed, Operand::A);
	}
	for path in b.paths() {
		arena.push_path(&path.segments, path.closed, Operand::B);
	}

	let curves_a = arena.curves_for(Operand::A);
	let curves_b = arena.curves_for(Operand::B);
	let mut intersections = intersection::find_intersections(&curves_a, &curves_b, false);
	divide::divide_locations(&mut arena, &mut intersections, |loc| loc.overlap || loc.crossing);
	winding::propagate(&mut arena);
	let traced = trace::trace_paths(&mut arena, &intersections, operator)?;

	let fill_rule = merge_fill_rule(a.fill_rule(), b.fill_rule());
	let oriented = orient::reorient(traced, fill_rule);
	Ok(finish(oriented, fill_rule))
}

fn merge_fill_rule(a: FillRule, b: FillRule) -> FillRule {
	if a == FillRule::EvenOdd || b == FillRule::EvenOdd { FillRule::EvenOdd } else { FillRule::NonZero }
}

fn finish(paths: Vec<Path>, fill_rule: FillRule) -> PathItem {
	if paths.is_empty() {
		return PathItem::Path(Path::empty());
	}
	PathItem::Compound(CompoundPath::new(paths, fill_rule)).reduce()
}

#[cfg(test)]
mod tests {
	use super::*;
	use kurbo::Point;

	fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> PathItem {
		PathItem::Path(Path::new(vec![Segment::new(Point::new(x0, y0)), Segment::new(Point::new(x1, y0)), Segment::new(Point::new(x1, y1)), Segment::new(Point::new(x0, y1))], true))
	}

	#[test]
	fn unite_disjoint_squares_scenario() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		let b = square(200.0, 0.0, 300.0, 100.0);
		let result = unite(&a, &b).unwrap();
		assert!((result.area().abs() - 20000.0).abs() < 1.0);
		match result {
			PathItem::Compound(c) => {
				assert_eq!(c.children.len(), 2);
				assert!(c.children.iter().all(Path::is_clockwise));
			}
			PathItem::Path(_) => panic!("expected a compound path for two disjoint squares"),
		}
	}

	#[test]
	fn unite_overlapping_squares_scenario() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		let b = square(50.0, 50.0, 150.0, 150.0);
		let result = unite(&a, &b).unwrap();
		assert!((result.area().abs() - 17500.0).abs() < 1.0);
		match result {
			PathItem::Path(p) => assert_eq!(p.segments.len(), 8),
			PathItem::Compound(_) => panic!("overlap union should reduce to a single path"),
		}
	}

	#[test]
	fn intersect_overlapping_squares_scenario() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		let b = square(50.0, 50.0, 150.0, 150.0);
		let result = intersect(&a, &b).unwrap();
		assert!((result.area().abs() - 2500.0).abs() < 1.0);
		match result {
			PathItem::Path(p) => assert!(p.is_clockwise()),
			PathItem::Compound(_) => panic!("expected a single path"),
		}
	}

	#[test]
	fn subtract_overlapping_squares_scenario() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		let b = square(50.0, 50.0, 150.0, 150.0);
		let result = subtract(&a, &b).unwrap();
		assert!((result.area().abs() - 7500.0).abs() < 1.0);
	}

	#[test]
	fn exclude_overlapping_squares_scenario() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		let b = square(50.0, 50.0, 150.0, 150.0);
		let result = exclude(&a, &b).unwrap();
		assert!((result.area().abs() - 15000.0).abs() < 1.0);
	}

	#[test]
	fn subtract_self_is_empty() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		let result = subtract(&a, &a).unwrap();
		assert!(result.area().abs() < 1.0);
	}

	#[test]
	fn winding_at_reports_containment() {
		let a = square(0.0, 0.0, 100.0, 100.0);
		assert_eq!(winding_at(&a, Point::new(50.0, 50.0), false), 1);
		assert_eq!(winding_at(&a, Point::new(500.0, 500.0), false), 0);
	}
}
