//! The engine's private, per-operation mutable state.
//!
//! The spec's design notes call for packaging `_intersection`, `_winding`,
//! `_contour` and `_visited` "as a parallel side-table keyed by segment
//! id for the duration of one boolean operation, not as permanent fields
//! on the public segment type" — that's exactly what `Arena` is. It owns
//! a `slotmap::SlotMap` of working segments (so a curve can be split and
//! a fresh segment spliced in without invalidating existing references)
//! plus a `SecondaryMap` of the mutable traversal flags, and is dropped
//! at the end of `BooleanOp::run`.

use crate::intersection::{LocId, Operand};
use kurbo::{CubicBez, Point, Vec2};
use slotmap::{SecondaryMap, SlotMap, new_key_type};

new_key_type! { pub struct SegId; }

/// One segment of a working path: anchor plus relative handle offsets,
/// same shape as the public `Segment` but living in the arena so it can
/// be spliced during division.
#[derive(Clone, Copy, Debug)]
pub struct WorkSegment {
	pub anchor: Point,
	pub handle_in: Vec2,
	pub handle_out: Vec2,
	pub path: usize,
}

/// Mutable traversal flags for one segment, valid for one boolean
/// operation. Absent (default) until the propagator or divider first
/// touches a segment.
#[derive(Clone, Copy, Debug, Default)]
pub struct SegmentData {
	pub intersection: Option<LocId>,
	pub winding: Option<i32>,
	pub contour: bool,
	pub visited: bool,
	/// Does this segment's chain sample point lie inside the *other*
	/// operand's region? Feeds the subtract operator's masking rule
	/// (spec §4.4's Open Question, resolved in `SPEC_FULL.md` §4.4).
	pub other_contains: bool,
}

/// One working path: an ordered sequence of `SegId`s plus closedness and
/// which operand it came from. Segment order is a `Vec` rather than an
/// intrusive linked list — division shifts a slice, which is simpler to
/// reason about than splicing pointers and is not a hot path relative to
/// the O(n²) curve-intersection search.
#[derive(Clone, Debug)]
pub struct WorkPath {
	pub segments: Vec<SegId>,
	pub closed: bool,
	pub operand: Operand,
}

pub struct Arena {
	pub segs: SlotMap<SegId, WorkSegment>,
	pub data: SecondaryMap<SegId, SegmentData>,
	pub paths: Vec<WorkPath>,
}

impl Arena {
	pub fn new() -> Self {
		Arena { segs: SlotMap::with_key(), data: SecondaryMap::new(), paths: Vec::new() }
	}

	pub fn push_path(&mut self, segments: &[crate::path::Segment], closed: bool, operand: Operand) -> usize {
		let path_index = self.paths.len();
		let ids: Vec<SegId> = segments
			.iter()
			.map(|s| self.segs.insert(WorkSegment { anchor: s.anchor, handle_in: s.handle_in, handle_out: s.handle_out, path: path_index }))
			.collect();
		self.paths.push(WorkPath { segments: ids, closed, operand });
		path_index
	}

	pub fn data_mut(&mut self, id: SegId) -> &mut SegmentData {
		if !self.data.contains_key(id) {
			self.data.insert(id, SegmentData::default());
		}
		&mut self.data[id]
	}

	pub fn data(&self, id: SegId) -> SegmentData {
		self.data.get(id).copied().unwrap_or_default()
	}

	/// The curve starting at the segment at `pos` within `path_idx`.
	/// Returns `None` at the last segment of an open path.
	pub fn curve_at(&self, path_idx: usize, pos: usize) -> Option<CubicBez> {
		let path = &self.paths[path_idx];
		let next_pos = self.next_pos(path_idx, pos)?;
		let a = self.segs[path.segments[pos]];
		let b = self.segs[path.segments[next_pos]];
		Some(CubicBez::new(a.anchor, a.anchor + a.handle_out, b.anchor + b.handle_in, b.anchor))
	}

	pub fn next_pos(&self, path_idx: usize, pos: usize) -> Option<usize> {
		let path = &self.paths[path_idx];
		if pos + 1 < path.segments.len() {
			Some(pos + 1)
		} else if path.closed && !path.segments.is_empty() {
			Some(0)
		} else {
			None
		}
	}

	pub fn seg_id_at(&self, path_idx: usize, pos: usize) -> SegId {
		self.paths[path_idx].segments[pos]
	}

	pub fn pos_of(&self, path_idx: usize, seg: SegId) -> Option<usize> {
		self.paths[path_idx].segments.iter().position(|&s| s == seg)
	}

	/// Splits the curve starting at `(path_idx, pos)` at parameter `t`,
	/// inserting a freshly created segment immediately after `pos` and
	/// returning its `SegId`. If the original segment had no handles
	/// (a straight corner), both resulting halves are also left
	/// handle-free, per the divider's rule for polygonal input.
	pub fn divide_at(&mut self, path_idx: usize, pos: usize, t: f64) -> SegId {
		let next_pos = self.next_pos(path_idx, pos).unwrap();
		let next_id = self.seg_id_at(path_idx, next_pos);

		// A curve with no handles at either endpoint was a straight
		// polygon edge; keep both halves handle-free after the split
		// rather than introducing curvature that wasn't there.
		let path_was_straight = {
			let a = self.segs[self.seg_id_at(path_idx, pos)];
			let b = self.segs[next_id];
			a.handle_out == Vec2::ZERO && b.handle_in == Vec2::ZERO
		};
		let curve = self.curve_at(path_idx, pos).expect("divide_at called on the open end of a path");
		let (left, right) = crate::geom::split_cubic_at(&curve, t);

		let new_anchor = left.p3;
		let new_handle_in = if path_was_straight { Vec2::ZERO } else { left.p2 - new_anchor };
		let new_handle_out = if path_was_straight { Vec2::ZERO } else { right.p1 - new_anchor };
		let new_id = self.segs.insert(WorkSegment { anchor: new_anchor, handle_in: new_handle_in, handle_out: new_handle_out, path: path_idx });

		{
			let a = &mut self.segs[self.seg_id_at(path_idx, pos)];
			a.handle_out = if path_was_straight { Vec2::ZERO } else { left.p1 - a.anchor };
		}
		{
			let b = &mut self.segs[next_id];
			b.handle_in = if path_was_straight { Vec2::ZERO } else { right.p2 - b.anchor };
		}

		let path = &mut self.paths[path_idx];
		path.segments.insert(pos + 1, new_id);
		new_id
	}

	/// Flattens every curve belonging to `operand`, in the same
	/// `(path, pos)` enumeration order `divide::CurveIndex` uses to map a
	/// finder curve index back to a working position — the two must stay
	/// in lockstep or the divider would divide the wrong curve.
	pub fn curves_for(&self, operand: Operand) -> Vec<CubicBez> {
		let mut out = Vec::new();
		for (path_idx, path) in self.paths.iter().enumerate() {
			if path.operand != operand {
				continue;
			}
			let count = if path.closed { path.segments.len() } else { path.segments.len().saturating_sub(1) };
			for pos in 0..count {
				if let Some(curve) = self.curve_at(path_idx, pos) {
					out.push(curve);
				}
			}
		}
		out
	}

	pub fn to_path(&self, path_idx: usize) -> crate::path::Path {
		let path = &self.paths[path_idx];
		let segments = path.segments.iter().map(|&id| {
			let s = self.segs[id];
			crate::path::Segment::with_handles(s.anchor, s.handle_in, s.handle_out)
		});
		crate::path::Path::new(segments.collect(), path.closed)
	}
}

impl Default for Arena {
	fn default() -> Self {
		Self::new()
	}
}
