//! End-to-end scenarios from spec §8, plus the algebraic invariants the
//! same section lists (commutativity, idempotence, area conservation).

use kurbo::Point;
use path_bool::{CompoundPath, FillRule, Path, PathItem, Segment, intersect, resolve_crossings, subtract, unite};
use pretty_assertions::assert_eq;

fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> PathItem {
	PathItem::Path(Path::new(vec![Segment::new(Point::new(x0, y0)), Segment::new(Point::new(x1, y0)), Segment::new(Point::new(x1, y1)), Segment::new(Point::new(x0, y1))], true))
}

const AREA_TOL: f64 = 1.0;

#[test]
fn scenario_1_disjoint_unite() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(200.0, 0.0, 300.0, 100.0);
	let result = unite(&a, &b).unwrap();
	assert!((result.area().abs() - 20000.0).abs() < AREA_TOL);
	match result {
		PathItem::Compound(CompoundPath { children, .. }) => {
			assert_eq!(children.len(), 2);
			for child in &children {
				assert!(child.is_clockwise());
				assert!(child.closed);
			}
		}
		PathItem::Path(_) => panic!("two disjoint squares must not reduce to one path"),
	}
}

#[test]
fn scenario_2_overlap_unite() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let result = unite(&a, &b).unwrap();
	assert!((result.area().abs() - 17500.0).abs() < AREA_TOL);
	match result {
		PathItem::Path(p) => {
			assert_eq!(p.segments.len(), 8);
			assert!(p.closed);
		}
		PathItem::Compound(_) => panic!("overlapping union should reduce to a single path"),
	}
}

#[test]
fn scenario_3_intersect() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let result = intersect(&a, &b).unwrap();
	assert!((result.area().abs() - 2500.0).abs() < AREA_TOL);
	match result {
		PathItem::Path(p) => assert!(p.is_clockwise()),
		PathItem::Compound(_) => panic!("expected a single square"),
	}
}

#[test]
fn scenario_4_subtract() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let result = subtract(&a, &b).unwrap();
	assert!((result.area().abs() - 7500.0).abs() < AREA_TOL);
	match result {
		PathItem::Path(p) => assert_eq!(p.segments.len(), 6),
		PathItem::Compound(_) => panic!("an L-shape is a single path"),
	}
}

#[test]
fn scenario_5_exclude() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let result = path_bool::exclude(&a, &b).unwrap();
	assert!((result.area().abs() - 15000.0).abs() < AREA_TOL);
	match result {
		PathItem::Compound(c) => assert_eq!(c.children.len(), 2),
		PathItem::Path(_) => panic!("symmetric difference of overlapping squares has two L-shapes"),
	}
}

#[test]
fn scenario_6_self_intersecting_figure_eight() {
	let figure_eight = PathItem::Path(Path::new(
		vec![Segment::new(Point::new(0.0, 0.0)), Segment::new(Point::new(100.0, 100.0)), Segment::new(Point::new(100.0, 0.0)), Segment::new(Point::new(0.0, 100.0))],
		true,
	));
	let result = resolve_crossings(&figure_eight).unwrap();
	match result {
		PathItem::Compound(c) => {
			assert_eq!(c.children.len(), 2);
			let areas: Vec<f64> = c.children.iter().map(Path::area).collect();
			assert!((areas[0].abs() - 2500.0).abs() < AREA_TOL);
			assert!((areas[1].abs() - 2500.0).abs() < AREA_TOL);
			assert_ne!(c.children[0].is_clockwise(), c.children[1].is_clockwise());
		}
		PathItem::Path(_) => panic!("a figure-eight resolves into two triangles"),
	}
}

#[test]
fn unite_is_commutative_in_area_and_shape() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let ab = unite(&a, &b).unwrap();
	let ba = unite(&b, &a).unwrap();
	assert!((ab.area() - ba.area()).abs() < AREA_TOL);
}

#[test]
fn intersect_is_commutative_in_area() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let ab = intersect(&a, &b).unwrap();
	let ba = intersect(&b, &a).unwrap();
	assert!((ab.area() - ba.area()).abs() < AREA_TOL);
}

#[test]
fn subtract_self_is_empty() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let result = subtract(&a, &a).unwrap();
	assert!(result.area().abs() < AREA_TOL);
}

#[test]
fn unite_self_is_self() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let result = unite(&a, &a).unwrap();
	assert!((result.area().abs() - a.area().abs()).abs() < AREA_TOL);
}

#[test]
fn union_and_intersection_areas_sum_to_operand_areas() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let union_area = unite(&a, &b).unwrap().area().abs();
	let intersect_area = intersect(&a, &b).unwrap().area().abs();
	let expected = a.area().abs() + b.area().abs();
	assert!((union_area + intersect_area - expected).abs() < 100.0 * 1e-7 * expected);
}

#[test]
fn exclude_area_equals_sum_of_both_subtractions() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let exclude_area = path_bool::exclude(&a, &b).unwrap().area().abs();
	let a_minus_b = subtract(&a, &b).unwrap().area().abs();
	let b_minus_a = subtract(&b, &a).unwrap().area().abs();
	assert!((exclude_area - (a_minus_b + b_minus_a)).abs() < AREA_TOL);
}

#[test]
fn resolve_crossings_is_idempotent() {
	let figure_eight = PathItem::Path(Path::new(
		vec![Segment::new(Point::new(0.0, 0.0)), Segment::new(Point::new(100.0, 100.0)), Segment::new(Point::new(100.0, 0.0)), Segment::new(Point::new(0.0, 100.0))],
		true,
	));
	let once = resolve_crossings(&figure_eight).unwrap();
	let twice = resolve_crossings(&once).unwrap();
	assert!((once.area().abs() - twice.area().abs()) < AREA_TOL);
}

#[test]
fn every_emitted_path_is_closed_with_nonnegligible_area() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	for result in [unite(&a, &b).unwrap(), intersect(&a, &b).unwrap(), subtract(&a, &b).unwrap(), path_bool::exclude(&a, &b).unwrap()] {
		for path in result.paths() {
			assert!(path.closed);
			assert!(path.area().abs() >= 1e-7);
		}
	}
}

#[test]
fn open_path_rejected_by_unite() {
	let open = PathItem::Path(Path::new(vec![Segment::new(Point::new(0.0, 0.0)), Segment::new(Point::new(100.0, 0.0)), Segment::new(Point::new(100.0, 100.0))], false));
	let closed = square(0.0, 0.0, 50.0, 50.0);
	let err = unite(&open, &closed).unwrap_err();
	assert_eq!(err.to_string(), path_bool::BooleanOpError::UnsupportedOpenPath.to_string());
}

#[test]
fn subtract_supports_an_open_path_operand() {
	let open = PathItem::Path(Path::new(vec![Segment::new(Point::new(-50.0, 50.0)), Segment::new(Point::new(150.0, 50.0))], false));
	let closed = square(0.0, 0.0, 100.0, 100.0);
	assert!(subtract(&open, &closed).is_ok());
}

#[test]
fn exclude_fill_rule_defaults_to_nonzero() {
	let a = square(0.0, 0.0, 100.0, 100.0);
	let b = square(50.0, 50.0, 150.0, 150.0);
	let result = path_bool::exclude(&a, &b).unwrap();
	assert_eq!(result.fill_rule(), FillRule::NonZero);
}
