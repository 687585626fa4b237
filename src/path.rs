//! Public data model: `Segment`, `Path`, `CompoundPath`, `PathItem`.
//!
//! These types are the operands and results of every boolean operation.
//! They carry no engine-private mutable state (no `_winding`, `_visited`,
//! ...) — that state lives in a per-operation side table in the `arena`
//! module, per the design note in the spec about not polluting the public
//! segment type with fields that only make sense for one traversal.

use kurbo::{CubicBez, ParamCurveArea, Point, Vec2};

/// A node on a path: an anchor point plus two handle offsets, both
/// relative to the anchor. The segment implicitly owns the curve going
/// from itself to its successor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
	pub anchor: Point,
	/// Offset of the incoming handle, relative to `anchor`.
	pub handle_in: Vec2,
	/// Offset of the outgoing handle, relative to `anchor`.
	pub handle_out: Vec2,
}

impl Segment {
	pub fn new(anchor: Point) -> Self {
		Segment { anchor, handle_in: Vec2::ZERO, handle_out: Vec2::ZERO }
	}

	pub fn with_handles(anchor: Point, handle_in: Vec2, handle_out: Vec2) -> Self {
		Segment { anchor, handle_in, handle_out }
	}

	pub fn has_handles(&self) -> bool {
		self.handle_in != Vec2::ZERO || self.handle_out != Vec2::ZERO
	}
}

/// A fill rule for a compound path, mirroring the external `getFillRule`
/// collaborator named in the spec.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FillRule {
	#[default]
	NonZero,
	EvenOdd,
}

/// An ordered list of segments, closed or open.
#[derive(Clone, Debug, Default)]
pub struct Path {
	pub segments: Vec<Segment>,
	pub closed: bool,
}

impl Path {
	pub fn new(segments: Vec<Segment>, closed: bool) -> Self {
		Path { segments, closed }
	}

	pub fn empty() -> Self {
		Path { segments: Vec::new(), closed: true }
	}

	pub fn is_empty(&self) -> bool {
		self.segments.len() < 2
	}

	/// Number of curves: one per consecutive segment pair, plus the
	/// closing curve back to the first segment when `closed`.
	pub fn curve_count(&self) -> usize {
		if self.segments.is_empty() {
			0
		} else if self.closed {
			self.segments.len()
		} else {
			self.segments.len() - 1
		}
	}

	/// The cubic curve starting at segment `i`.
	pub fn curve(&self, i: usize) -> CubicBez {
		let a = self.segments[i];
		let b = self.segments[(i + 1) % self.segments.len()];
		CubicBez::new(a.anchor, a.anchor + a.handle_out, b.anchor + b.handle_in, b.anchor)
	}

	pub fn curves(&self) -> impl Iterator<Item = CubicBez> + '_ {
		(0..self.curve_count()).map(move |i| self.curve(i))
	}

	/// Signed area via Green's theorem over the path's curves; positive
	/// for counter-clockwise, negative for clockwise (screen coordinates
	/// with y increasing downward are handled the same way the rest of
	/// the engine treats orientation — consistently, not by a particular
	/// sign convention tied to math-textbook axes).
	pub fn area(&self) -> f64 {
		self.curves().map(|c| c.signed_area()).sum()
	}

	pub fn is_clockwise(&self) -> bool {
		self.area() < 0.0
	}

	/// Reverses point order and handle roles, flipping orientation.
	pub fn reversed(&self) -> Path {
		let segments = self
			.segments
			.iter()
			.rev()
			.map(|s| Segment::with_handles(s.anchor, s.handle_out, s.handle_in))
			.collect();
		Path::new(segments, self.closed)
	}

	pub fn set_clockwise(&mut self, clockwise: bool) {
		if self.is_clockwise() != clockwise {
			*self = self.reversed();
		}
	}

	pub fn bounds(&self) -> kurbo::Rect {
		use kurbo::ParamCurveExtrema;
		self.curves().map(|c| c.bounding_box()).reduce(|a, b| a.union(b)).unwrap_or(kurbo::Rect::ZERO)
	}

	/// Even-odd containment test via horizontal ray casting, used by the
	/// orientation fixer's nesting-depth computation.
	pub fn contains_point(&self, point: Point) -> bool {
		crate::winding::get_winding_single_path(self, point, false).winding % 2 != 0
	}
}

impl PartialEq for Path {
	fn eq(&self, other: &Path) -> bool {
		self.closed == other.closed && self.segments == other.segments
	}
}

/// An ordered list of child paths sharing a fill rule — an island/hole
/// compound region.
#[derive(Clone, Debug, Default)]
pub struct CompoundPath {
	pub children: Vec<Path>,
	pub fill_rule: FillRule,
}

impl CompoundPath {
	pub fn new(children: Vec<Path>, fill_rule: FillRule) -> Self {
		CompoundPath { children, fill_rule }
	}

	pub fn area(&self) -> f64 {
		self.children.iter().map(Path::area).sum()
	}
}

/// Either a single path or a compound path — the operand and result type
/// of every public boolean operation.
#[derive(Clone, Debug)]
pub enum PathItem {
	Path(Path),
	Compound(CompoundPath),
}

impl PathItem {
	pub fn empty() -> Self {
		PathItem::Path(Path::empty())
	}

	/// Flattens to the list of component paths, in order.
	pub fn paths(&self) -> Vec<&Path> {
		match self {
			PathItem::Path(p) => vec![p],
			PathItem::Compound(c) => c.children.iter().collect(),
		}
	}

	pub fn fill_rule(&self) -> FillRule {
		match self {
			PathItem::Path(_) => FillRule::NonZero,
			PathItem::Compound(c) => c.fill_rule,
		}
	}

	pub fn area(&self) -> f64 {
		match self {
			PathItem::Path(p) => p.area(),
			PathItem::Compound(c) => c.area(),
		}
	}

	pub fn is_open(&self) -> bool {
		self.paths().iter().any(|p| !p.closed)
	}

	/// Reduces a single-child compound path down to a plain path, the
	/// way `reduce({simplify})` does in the collaborator interface.
	pub fn reduce(self) -> PathItem {
		match self {
			PathItem::Compound(c) if c.children.len() == 1 => PathItem::Path(c.children.into_iter().next().unwrap()),
			other => other,
		}
	}

	/// Fresh mutable clone with the path's transform already baked into
	/// its geometry (the engine never receives a transform here — this
	/// crate operates purely on already-flattened user-space geometry —
	/// so this is the identity clone described by the spec's
	/// `preparePath` lifecycle).
	pub fn prepare(&self) -> PathItem {
		self.clone()
	}
}
