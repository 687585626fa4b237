//! Location divider (spec §4.3): splits both operands' curves at every
//! intersection parameter and threads the intersection chain through the
//! segments that result.

use crate::arena::{Arena, SegId};
use crate::consts::CURVETIME_EPSILON;
use crate::intersection::{Intersections, LocId, Operand};
use rustc_hash::FxHashSet;

/// Maps a finder's flat `curve_index` (per operand) back to the working
/// `(path_idx, pos)` it originally denoted. This mapping never changes
/// during division: a split always inserts the new segment *after* the
/// position that started the curve, so that position keeps denoting
/// "the not-yet-divided remainder of this curve, from t=0 up to whatever
/// has already been split off at its far end".
struct CurveIndex {
	table_a: Vec<(usize, usize)>,
	table_b: Vec<(usize, usize)>,
}

impl CurveIndex {
	fn build(arena: &Arena) -> Self {
		let mut table_a = Vec::new();
		let mut table_b = Vec::new();
		for (path_idx, path) in arena.paths.iter().enumerate() {
			let count = if path.closed { path.segments.len() } else { path.segments.len().saturating_sub(1) };
			let table = match path.operand {
				Operand::A => &mut table_a,
				Operand::B => &mut table_b,
			};
			for pos in 0..count {
				table.push((path_idx, pos));
			}
		}
		CurveIndex { table_a, table_b }
	}

	fn lookup(&self, operand: Operand, curve_index: usize) -> (usize, usize) {
		match operand {
			Operand::A => self.table_a[curve_index],
			Operand::B => self.table_b[curve_index],
		}
	}
}

/// Divides every location in `intersections` into the working arena,
/// splicing a new segment wherever a location's `time` falls strictly
/// inside a curve, and re-pointing the location at the resulting (or
/// pre-existing) segment. After this call, `loc.time == 0.0` for every
/// location passing `include`, `loc.segment` names that segment, and
/// `arena.data(seg).intersection` reaches the chain of every location
/// sharing that segment.
///
/// Locations rejected by `include` (spec §4.3: e.g. a tangential touch
/// that isn't a genuine crossing or overlap) are left in place — not
/// divided, not linked into any segment's chain.
pub fn divide_locations(arena: &mut Arena, intersections: &mut Intersections, include: impl Fn(&crate::intersection::CurveLocation) -> bool) {
	let index = CurveIndex::build(arena);

	// Sort by (operand, curve_index, time) descending: walking a curve's
	// locations back-to-front means each split only ever shortens the
	// *already-processed* tail, so earlier (smaller-time) locations keep
	// referring to a valid, not-yet-divided prefix. Descending on
	// curve_index matters just as much as descending on time: `divide_at`
	// inserts the new segment right after the split position in the same
	// path's live `Vec`, shifting every later position in that path by one,
	// so a not-yet-processed curve_index in the same path must still be
	// higher than the one just split, or its snapshot position is stale.
	let mut ids: Vec<LocId> = intersections.locations.keys().filter(|&id| include(&intersections.locations[id])).collect();
	ids.sort_by(|&a, &b| {
		let la = &intersections.locations[a];
		let lb = &intersections.locations[b];
		let key_a = (op_rank(la.operand), la.curve_index);
		let key_b = (op_rank(lb.operand), lb.curve_index);
		key_b.cmp(&key_a).then(lb.time.partial_cmp(&la.time).unwrap())
	});

	let mut last_curve: Option<(Operand, usize)> = None;
	let mut prev_raw_time = 1.0_f64;

	for id in ids {
		let (operand, curve_index, raw_time) = {
			let loc = &intersections.locations[id];
			(loc.operand, loc.curve_index, loc.time)
		};

		let same_curve = last_curve == Some((operand, curve_index));
		let local_time = if same_curve && prev_raw_time > CURVETIME_EPSILON { raw_time / prev_raw_time } else { raw_time };

		let (path_idx, pos) = index.lookup(operand, curve_index);

		let seg = if local_time < CURVETIME_EPSILON {
			arena.seg_id_at(path_idx, pos)
		} else if local_time > 1.0 - CURVETIME_EPSILON {
			let next_pos = arena.next_pos(path_idx, pos).unwrap_or(pos);
			arena.seg_id_at(path_idx, next_pos)
		} else {
			arena.divide_at(path_idx, pos, local_time)
		};

		// The first location of an overlap pair (raw time 0, per the
		// whole-curve overlap detection in `intersection::overlap_range`)
		// names the segment whose outgoing curve *is* the coincident run —
		// flag it so the tracer can admit a unite-operator winding-2
		// boundary that only exists because two input edges coincide
		// exactly (spec §4.6's `Unite` contour exception).
		if intersections.locations[id].overlap && raw_time < CURVETIME_EPSILON {
			arena.data_mut(seg).contour = true;
		}

		intersections.locations[id].time = 0.0;
		intersections.locations[id].segment = Some(seg);
		link_segment_chain(arena, intersections, seg, id);

		last_curve = Some((operand, curve_index));
		prev_raw_time = raw_time;
	}
}

fn op_rank(op: Operand) -> u8 {
	match op {
		Operand::A => 0,
		Operand::B => 1,
	}
}

/// Splices `loc` into the intersection chain anchored at `segment`'s side
/// table, fanning it out across every location already in that chain so
/// every pair becomes mutually reachable (`linkIntersections`'s closure
/// requirement in the spec).
fn link_segment_chain(arena: &mut Arena, intersections: &mut Intersections, segment: SegId, loc: LocId) {
	match arena.data(segment).intersection {
		None => {
			arena.data_mut(segment).intersection = Some(loc);
		}
		Some(head) => {
			link_intersections(intersections, head, loc);
			let mut cursor = Some(head);
			let mut seen = FxHashSet::default();
			while let Some(cur) = cursor {
				if !seen.insert(cur) {
					break;
				}
				if let Some(partner) = intersections.locations[cur].intersection {
					if partner != loc {
						link_intersections(intersections, partner, head);
					}
				}
				cursor = intersections.locations[cur].next;
			}
		}
	}
}

/// No-op if `from == to` or `to` is already reachable from `from` by
/// walking `next`. Otherwise splices `to`'s chain onto the end of
/// `from`'s chain.
fn link_intersections(intersections: &mut Intersections, from: LocId, to: LocId) {
	if from == to {
		return;
	}
	let mut cursor = Some(from);
	while let Some(cur) = cursor {
		if cur == to {
			return;
		}
		cursor = intersections.locations[cur].next;
	}

	let mut end = from;
	while let Some(next) = intersections.locations[end].next {
		end = next;
	}
	let mut start = to;
	while let Some(prev) = intersections.locations[start].previous {
		start = prev;
	}
	if end == start {
		return;
	}
	intersections.locations[end].next = Some(start);
	intersections.locations[start].previous = Some(end);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::intersection::find_intersections;
	use crate::path::Segment;
	use kurbo::{ParamCurveArclen, Point};

	fn unit_square(x0: f64, y0: f64, x1: f64, y1: f64) -> Vec<Segment> {
		vec![Segment::new(Point::new(x0, y0)), Segment::new(Point::new(x1, y0)), Segment::new(Point::new(x1, y1)), Segment::new(Point::new(x0, y1))]
	}

	/// Regression test for a sort-order bug: two overlapping squares
	/// produce two intersections on the *same* path of operand A (on its
	/// curve_index 1 and curve_index 2, per spec scenario 2). Dividing
	/// curve_index 1 before curve_index 2 shifts curve_index 2's
	/// snapshotted position in the live segment `Vec`, corrupting which
	/// curve the second location actually splits. A correct descending
	/// sort keeps operand A's perimeter and bounding box intact after
	/// division; the bug would shorten the perimeter and shrink the box.
	#[test]
	fn dividing_two_locations_on_the_same_path_does_not_corrupt_later_curves() {
		let a = unit_square(0.0, 0.0, 100.0, 100.0);
		let b = unit_square(50.0, 50.0, 150.0, 150.0);

		let mut arena = Arena::new();
		arena.push_path(&a, true, Operand::A);
		arena.push_path(&b, true, Operand::B);

		let curves_a = arena.curves_for(Operand::A);
		let curves_b = arena.curves_for(Operand::B);
		let mut intersections = find_intersections(&curves_a, &curves_b, false);
		divide_locations(&mut arena, &mut intersections, |loc| loc.overlap || loc.crossing);

		let path_a = arena.to_path(0);
		let bounds = path_a.bounds();
		assert!((bounds.x0 - 0.0).abs() < 1e-6, "operand A's left edge must stay at x=0, got {bounds:?}");
		assert!((bounds.y0 - 0.0).abs() < 1e-6, "operand A's bottom edge must stay at y=0, got {bounds:?}");
		assert!((bounds.x1 - 100.0).abs() < 1e-6, "operand A's right edge must stay at x=100, got {bounds:?}");
		assert!((bounds.y1 - 100.0).abs() < 1e-6, "operand A's top edge must stay at y=100, got {bounds:?}");

		let perimeter: f64 = path_a.curves().map(|c| c.arclen(1e-9)).sum();
		assert!((perimeter - 400.0).abs() < 1e-3, "dividing should not change operand A's perimeter, got {perimeter}");
	}
}
