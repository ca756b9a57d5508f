//! Point quadtree used by the many-body (Barnes-Hut) and collision forces.
//!
//! Cells live in a flat arena. Children are always pushed after their parent,
//! so walking the arena backwards visits every child before its parent, which
//! is how the aggregates are computed without recursion.

/// Deeper than this, distinct points share a leaf instead of splitting again.
const MAX_DEPTH: usize = 48;

#[derive(Clone, Debug)]
enum Kind {
	Leaf(Vec<usize>),
	Internal([Option<usize>; 4]),
}

#[derive(Clone, Debug)]
struct Cell {
	x0: f64,
	y0: f64,
	size: f64,
	kind: Kind,
	/// Sum of point strengths.
	strength: f64,
	/// Strength-weighted center.
	cx: f64,
	cy: f64,
	/// Largest point radius below this cell.
	radius: f64,
}

/// Read-only view of a cell handed to [`QuadTree::visit`] callbacks.
#[derive(Clone, Copy, Debug)]
pub struct CellView<'a> {
	/// Left edge.
	pub x0: f64,
	/// Top edge.
	pub y0: f64,
	/// Side length.
	pub size: f64,
	/// Summed charge below the cell.
	pub strength: f64,
	/// Charge-weighted centroid x.
	pub cx: f64,
	/// Charge-weighted centroid y.
	pub cy: f64,
	/// Largest point radius below the cell.
	pub radius: f64,
	/// Point indices for leaves, `None` for internal cells.
	pub points: Option<&'a [usize]>,
}

impl CellView<'_> {
	/// Right edge.
	pub fn x1(&self) -> f64 {
		self.x0 + self.size
	}

	/// Bottom edge.
	pub fn y1(&self) -> f64 {
		self.y0 + self.size
	}
}

/// Quadtree over a fixed set of points.
#[derive(Clone, Debug)]
pub struct QuadTree {
	cells: Vec<Cell>,
	points: Vec<(f64, f64)>,
}

impl QuadTree {
	/// Build a tree over `points`; point indices are positions in the slice.
	/// Non-finite points are skipped.
	pub fn new(points: &[(f64, f64)]) -> Self {
		let finite = || points.iter().filter(|(x, y)| x.is_finite() && y.is_finite());
		let (mut x0, mut y0, mut x1, mut y1) = (f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		for &(x, y) in finite() {
			x0 = x0.min(x);
			y0 = y0.min(y);
			x1 = x1.max(x);
			y1 = y1.max(y);
		}
		let mut tree = Self {
			cells: Vec::new(),
			points: points.to_vec(),
		};
		if x0 > x1 {
			return tree;
		}

		// Square cover, padded so points on the max edge fall inside.
		let size = ((x1 - x0).max(y1 - y0) * (1.0 + 1e-9)).max(1.0);
		tree.cells.push(Cell::leaf(x0, y0, size, Vec::new()));
		for (i, &(x, y)) in points.iter().enumerate() {
			if x.is_finite() && y.is_finite() {
				tree.insert(i, x, y);
			}
		}
		tree
	}

	/// True when no finite point was inserted.
	pub fn is_empty(&self) -> bool {
		self.cells.is_empty()
	}

	fn insert(&mut self, point: usize, x: f64, y: f64) {
		let mut cell = 0;
		let mut depth = 0;
		loop {
			let (x0, y0, half) = {
				let c = &self.cells[cell];
				(c.x0, c.y0, c.size / 2.0)
			};
			let (xm, ym) = (x0 + half, y0 + half);
			let quadrant_of = |x: f64, y: f64| usize::from(x >= xm) | (usize::from(y >= ym) << 1);
			let next = self.cells.len();

			match &mut self.cells[cell].kind {
				Kind::Internal(children) => {
					let quadrant = quadrant_of(x, y);
					if let Some(child) = children[quadrant] {
						cell = child;
						depth += 1;
						continue;
					}
					children[quadrant] = Some(next);
					let (cx0, cy0) = quadrant_origin(x0, y0, half, quadrant);
					self.cells.push(Cell::leaf(cx0, cy0, half, vec![point]));
					return;
				}
				Kind::Leaf(existing) => {
					let coincident = existing.first().is_none_or(|&p| self.points[p] == (x, y));
					if coincident || depth >= MAX_DEPTH {
						existing.push(point);
						return;
					}
					// Split: move the stacked points one level down, then retry.
					let moved = std::mem::take(existing);
					let (ex, ey) = self.points[moved[0]];
					let quadrant = quadrant_of(ex, ey);
					let mut children = [None; 4];
					children[quadrant] = Some(next);
					self.cells[cell].kind = Kind::Internal(children);
					let (cx0, cy0) = quadrant_origin(x0, y0, half, quadrant);
					self.cells.push(Cell::leaf(cx0, cy0, half, moved));
				}
			}
		}
	}

	/// Aggregate point strengths into every cell. Weights for the centers use
	/// the absolute strength, so mixed signs do not cancel positions.
	pub fn accumulate_strength(&mut self, strengths: &[f64]) {
		for i in (0..self.cells.len()).rev() {
			let (strength, cx, cy) = match &self.cells[i].kind {
				Kind::Leaf(points) => {
					let (x, y) = points.first().map_or((0.0, 0.0), |&p| self.points[p]);
					(points.iter().map(|&p| strengths[p]).sum(), x, y)
				}
				Kind::Internal(children) => {
					let (mut strength, mut weight, mut x, mut y) = (0.0, 0.0, 0.0, 0.0);
					for child in children.iter().flatten() {
						let c = &self.cells[*child];
						let w = c.strength.abs();
						strength += c.strength;
						weight += w;
						x += w * c.cx;
						y += w * c.cy;
					}
					let cell = &self.cells[i];
					if weight > 0.0 {
						(strength, x / weight, y / weight)
					} else {
						(strength, cell.x0 + cell.size / 2.0, cell.y0 + cell.size / 2.0)
					}
				}
			};
			let cell = &mut self.cells[i];
			cell.strength = strength;
			cell.cx = cx;
			cell.cy = cy;
		}
	}

	/// Aggregate the maximum point radius into every cell.
	pub fn accumulate_radius(&mut self, radii: &[f64]) {
		for i in (0..self.cells.len()).rev() {
			let radius = match &self.cells[i].kind {
				Kind::Leaf(points) => points.iter().map(|&p| radii[p]).fold(0.0, f64::max),
				Kind::Internal(children) => children
					.iter()
					.flatten()
					.map(|&c| self.cells[c].radius)
					.fold(0.0, f64::max),
			};
			self.cells[i].radius = radius;
		}
	}

	/// Pre-order walk. Returning `true` from `f` skips the cell's children.
	pub fn visit(&self, mut f: impl FnMut(CellView<'_>) -> bool) {
		if self.cells.is_empty() {
			return;
		}
		let mut stack = vec![0];
		while let Some(i) = stack.pop() {
			let cell = &self.cells[i];
			let points = match &cell.kind {
				Kind::Leaf(points) => Some(points.as_slice()),
				Kind::Internal(_) => None,
			};
			let skip = f(CellView {
				x0: cell.x0,
				y0: cell.y0,
				size: cell.size,
				strength: cell.strength,
				cx: cell.cx,
				cy: cell.cy,
				radius: cell.radius,
				points,
			});
			if let (false, Kind::Internal(children)) = (skip, &cell.kind) {
				stack.extend(children.iter().rev().flatten());
			}
		}
	}
}

impl Cell {
	fn leaf(x0: f64, y0: f64, size: f64, points: Vec<usize>) -> Self {
		Self {
			x0,
			y0,
			size,
			kind: Kind::Leaf(points),
			strength: 0.0,
			cx: 0.0,
			cy: 0.0,
			radius: 0.0,
		}
	}
}

fn quadrant_origin(x0: f64, y0: f64, half: f64, quadrant: usize) -> (f64, f64) {
	(
		if quadrant & 1 == 1 { x0 + half } else { x0 },
		if quadrant & 2 == 2 { y0 + half } else { y0 },
	)
}
