use eframe::egui::{Vec2, vec2};

const LEAF_BODIES: usize = 8;
const MAX_DEPTH: u8 = 12;

/// Axis-aligned square cell, stored as its minimum corner and side length.
#[derive(Clone, Copy, Debug)]
pub(super) struct Cell {
    origin: Vec2,
    pub(super) size: f32,
}

impl Cell {
    fn enclosing(positions: &[Vec2]) -> Option<Self> {
        let (first, rest) = positions.split_first()?;
        let (low, high) = rest
            .iter()
            .fold((*first, *first), |(low, high), p| (low.min(*p), high.max(*p)));
        if !(low.is_finite() && high.is_finite()) {
            return None;
        }

        let extent = high - low;
        let size = extent.x.max(extent.y).max(1.0) + 2.0;
        Some(Self {
            origin: low - vec2(1.0, 1.0),
            size,
        })
    }

    fn middle(self) -> Vec2 {
        self.origin + Vec2::splat(self.size * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let far = self.origin + Vec2::splat(self.size);
        point.x >= self.origin.x && point.y >= self.origin.y && point.x <= far.x && point.y <= far.y
    }

    /// Quadrant index: bit 0 is east, bit 1 is south.
    fn quadrant_of(self, point: Vec2) -> usize {
        let middle = self.middle();
        usize::from(point.x >= middle.x) | (usize::from(point.y >= middle.y) << 1)
    }

    fn quadrant(self, index: usize) -> Self {
        let half = self.size * 0.5;
        let step = vec2((index & 1) as f32, (index >> 1) as f32) * half;
        Self {
            origin: self.origin + step,
            size: half,
        }
    }

    /// Squared gap between two cells; zero when they touch or overlap.
    pub(super) fn gap_sq(self, other: Self) -> f32 {
        let gap = |a0: f32, a1: f32, b0: f32, b1: f32| (b0 - a1).max(a0 - b1).max(0.0);
        let dx = gap(
            self.origin.x,
            self.origin.x + self.size,
            other.origin.x,
            other.origin.x + other.size,
        );
        let dy = gap(
            self.origin.y,
            self.origin.y + self.size,
            other.origin.y,
            other.origin.y + other.size,
        );
        dx * dx + dy * dy
    }
}

/// Barnes–Hut cell over body indices. Every body carries unit charge; `reach`
/// is the largest collision radius of any body below the cell.
#[derive(Debug)]
pub(super) struct BodyTree {
    pub(super) cell: Cell,
    pub(super) centroid: Vec2,
    pub(super) count: usize,
    pub(super) reach: f32,
    /// Bodies held directly; empty for split cells.
    pub(super) bodies: Vec<usize>,
    pub(super) quadrants: [Option<Box<BodyTree>>; 4],
}

impl BodyTree {
    /// `None` for an empty or non-finite layout.
    pub(super) fn build(positions: &[Vec2], radii: &[f32]) -> Option<Self> {
        let cell = Cell::enclosing(positions)?;
        Some(Self::grow(cell, (0..positions.len()).collect(), positions, radii, 0))
    }

    fn grow(cell: Cell, bodies: Vec<usize>, positions: &[Vec2], radii: &[f32], depth: u8) -> Self {
        let count = bodies.len();
        let sum = bodies.iter().fold(Vec2::ZERO, |sum, &b| sum + positions[b]);
        let centroid = if count > 0 { sum / count as f32 } else { cell.middle() };
        let reach = bodies
            .iter()
            .map(|&b| radii.get(b).copied().unwrap_or(0.0))
            .fold(0.0_f32, f32::max);

        let mut tree = Self {
            cell,
            centroid,
            count,
            reach,
            bodies,
            quadrants: Default::default(),
        };
        if count <= LEAF_BODIES || depth >= MAX_DEPTH {
            return tree;
        }

        let mut split: [Vec<usize>; 4] = Default::default();
        for &body in &tree.bodies {
            split[cell.quadrant_of(positions[body])].push(body);
        }
        // Coincident bodies would split forever.
        if split.iter().any(|part| part.len() == count) {
            return tree;
        }

        tree.bodies.clear();
        for (index, part) in split.into_iter().enumerate() {
            if !part.is_empty() {
                let child = Self::grow(cell.quadrant(index), part, positions, radii, depth + 1);
                tree.quadrants[index] = Some(Box::new(child));
            }
        }
        tree
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.quadrants.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &BodyTree> {
        self.quadrants.iter().flatten().map(Box::as_ref)
    }
}
