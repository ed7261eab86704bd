//! The [`Grid`] type — a dense 2D board of [`Cell`]s with one Start and one
//! End.
//!
//! Cells live in a single row-major `Vec`, indexed by `y * width + x`. The
//! grid is the sole owner of its cells; everything else (the search frontier,
//! a cell's parent link) refers to cells by flat index.

use std::fmt;

use crate::cell::{Cell, CellKind};
use crate::geom::{Point, Range};

/// Neighbor offsets in the fixed expansion order N, S, E, W, NE, NW, SE, SW.
pub const NEIGHBOR_OFFSETS: [Point; 8] = [
    Point::new(0, -1),
    Point::new(0, 1),
    Point::new(1, 0),
    Point::new(-1, 0),
    Point::new(1, -1),
    Point::new(-1, -1),
    Point::new(1, 1),
    Point::new(-1, 1),
];

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// One of the two search endpoints.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => f.write_str("start"),
            Self::End => f.write_str("end"),
        }
    }
}

/// Errors raised while building or editing a [`Grid`].
#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Width or height is not strictly positive.
    InvalidSize { width: i32, height: i32 },
    /// The kind list does not cover the board exactly once.
    KindCount { expected: usize, actual: usize },
    /// An endpoint lies outside the board.
    OutOfBounds { endpoint: Endpoint, pos: Point },
    /// Start and End share a position.
    SameEndpoints(Point),
    /// No cell was marked as this endpoint.
    MissingEndpoint(Endpoint),
    /// More than one cell was marked as this endpoint.
    DuplicateEndpoint {
        endpoint: Endpoint,
        first: Point,
        second: Point,
    },
    /// Construction input contained a kind only a search may produce.
    SearchKind { pos: Point, kind: CellKind },
    /// A wall was requested on top of an endpoint or off the board.
    InvalidWall(Point),
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSize { width, height } => {
                write!(f, "grid: invalid size {width}x{height}")
            }
            Self::KindCount { expected, actual } => {
                write!(f, "grid: expected {expected} cell kinds, got {actual}")
            }
            Self::OutOfBounds { endpoint, pos } => {
                write!(f, "grid: {endpoint} {pos} is out of bounds")
            }
            Self::SameEndpoints(p) => write!(f, "grid: start and end both at {p}"),
            Self::MissingEndpoint(e) => write!(f, "grid: no {e} cell"),
            Self::DuplicateEndpoint {
                endpoint,
                first,
                second,
            } => write!(f, "grid: duplicate {endpoint} cells at {first} and {second}"),
            Self::SearchKind { pos, kind } => {
                write!(f, "grid: cell {pos} has search-only kind {kind:?}")
            }
            Self::InvalidWall(p) => write!(f, "grid: cannot place a wall at {p}"),
        }
    }
}

impl std::error::Error for GridError {}

// ---------------------------------------------------------------------------
// Grid
// ---------------------------------------------------------------------------

/// A fixed-size board of [`Cell`]s.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    cells: Vec<Cell>,
    bounds: Range,
    start: usize,
    end: usize,
}

impl Grid {
    /// Create a board with every cell empty except `start` and `end`.
    pub fn new(width: i32, height: i32, start: Point, end: Point) -> Result<Self, GridError> {
        let bounds = checked_bounds(width, height)?;
        if !bounds.contains(start) {
            return Err(GridError::OutOfBounds {
                endpoint: Endpoint::Start,
                pos: start,
            });
        }
        if !bounds.contains(end) {
            return Err(GridError::OutOfBounds {
                endpoint: Endpoint::End,
                pos: end,
            });
        }
        if start == end {
            return Err(GridError::SameEndpoints(start));
        }
        let kinds = bounds.iter().map(|p| {
            if p == start {
                CellKind::Start
            } else if p == end {
                CellKind::End
            } else {
                CellKind::Empty
            }
        });
        Self::from_kinds(width, height, kinds.collect())
    }

    /// Build a board from a complete row-major list of kinds.
    ///
    /// Exactly one `Start` and one `End` must be present; only board kinds
    /// (`Empty`, `Wall`, `Start`, `End`) are accepted.
    pub fn from_kinds(width: i32, height: i32, kinds: Vec<CellKind>) -> Result<Self, GridError> {
        let bounds = checked_bounds(width, height)?;
        if kinds.len() != bounds.len() {
            return Err(GridError::KindCount {
                expected: bounds.len(),
                actual: kinds.len(),
            });
        }

        let mut start: Option<usize> = None;
        let mut end: Option<usize> = None;
        let mut cells = Vec::with_capacity(kinds.len());
        for (i, (pos, kind)) in bounds.iter().zip(kinds).enumerate() {
            if !kind.is_board_kind() {
                return Err(GridError::SearchKind { pos, kind });
            }
            let (slot, endpoint) = match kind {
                CellKind::Start => (&mut start, Endpoint::Start),
                CellKind::End => (&mut end, Endpoint::End),
                _ => {
                    cells.push(Cell::new(pos, kind));
                    continue;
                }
            };
            if let Some(first) = *slot {
                return Err(GridError::DuplicateEndpoint {
                    endpoint,
                    first: cells[first].pos(),
                    second: pos,
                });
            }
            *slot = Some(i);
            cells.push(Cell::new(pos, kind));
        }

        let start = start.ok_or(GridError::MissingEndpoint(Endpoint::Start))?;
        let end = end.ok_or(GridError::MissingEndpoint(Endpoint::End))?;

        let mut grid = Self {
            cells,
            bounds,
            start,
            end,
        };
        grid.reset();
        log::debug!(
            "built {}x{} grid, start {} end {}",
            width,
            height,
            grid.start(),
            grid.end()
        );
        Ok(grid)
    }

    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Number of cells on the board.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false for a constructed grid; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Position of the Start cell.
    #[inline]
    pub fn start(&self) -> Point {
        self.cells[self.start].pos()
    }

    /// Position of the End cell.
    #[inline]
    pub fn end(&self) -> Point {
        self.cells[self.end].pos()
    }

    #[inline]
    pub fn start_idx(&self) -> usize {
        self.start
    }

    #[inline]
    pub fn end_idx(&self) -> usize {
        self.end
    }

    // -----------------------------------------------------------------------
    // Coordinate helpers
    // -----------------------------------------------------------------------

    /// Convert a `Point` to a flat index. Returns `None` if out of bounds.
    #[inline]
    pub fn idx(&self, p: Point) -> Option<usize> {
        if !self.bounds.contains(p) {
            return None;
        }
        Some(p.y as usize * self.width() as usize + p.x as usize)
    }

    /// Convert a flat index back to a `Point`.
    #[inline]
    pub fn point(&self, idx: usize) -> Point {
        self.cells[idx].pos()
    }

    // -----------------------------------------------------------------------
    // Cell access
    // -----------------------------------------------------------------------

    /// Cell by flat index.
    #[inline]
    pub fn cell(&self, idx: usize) -> &Cell {
        &self.cells[idx]
    }

    /// Mutable cell by flat index, for the search engine.
    ///
    /// Only search bookkeeping can change through it: [`Cell::mark`] never
    /// writes a board kind, so the one-Start/one-End shape set at
    /// construction holds.
    #[inline]
    pub fn cell_mut(&mut self, idx: usize) -> &mut Cell {
        &mut self.cells[idx]
    }

    /// Cell at `p`, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<&Cell> {
        self.idx(p).map(|i| &self.cells[i])
    }

    /// Kind at `p`, or `None` if out of bounds.
    #[inline]
    pub fn kind_at(&self, p: Point) -> Option<CellKind> {
        self.at(p).map(Cell::kind)
    }

    /// All cells in row-major order.
    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major iterator over `(Point, CellKind)` pairs: everything a
    /// renderer needs.
    pub fn iter(&self) -> impl Iterator<Item = (Point, CellKind)> + '_ {
        self.cells.iter().map(|c| (c.pos(), c.kind()))
    }

    /// Number of cells of the given kind.
    pub fn count(&self, kind: CellKind) -> usize {
        self.cells.iter().filter(|c| c.kind() == kind).count()
    }

    /// Number of cells that are not walls.
    pub fn walkable(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_wall()).count()
    }

    // -----------------------------------------------------------------------
    // Topology
    // -----------------------------------------------------------------------

    /// Append the in-bounds, non-wall neighbors of `p` into `buf`, in
    /// [`NEIGHBOR_OFFSETS`] order. The caller clears `buf` before calling.
    pub fn neighbors(&self, p: Point, buf: &mut Vec<Point>) {
        for d in NEIGHBOR_OFFSETS {
            let n = p + d;
            if let Some(cell) = self.at(n) {
                if !cell.is_wall() {
                    buf.push(n);
                }
            }
        }
    }

    /// Index flavor of [`neighbors`](Self::neighbors).
    pub fn neighbor_indices(&self, idx: usize, buf: &mut Vec<usize>) {
        let p = self.point(idx);
        for d in NEIGHBOR_OFFSETS {
            if let Some(ni) = self.idx(p + d) {
                if !self.cells[ni].is_wall() {
                    buf.push(ni);
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Turn the cell at `p` into a wall. Endpoints cannot be walled.
    pub fn set_wall(&mut self, p: Point) -> Result<(), GridError> {
        let i = self.idx(p).ok_or(GridError::InvalidWall(p))?;
        if i == self.start || i == self.end {
            return Err(GridError::InvalidWall(p));
        }
        let cell = &mut self.cells[i];
        cell.clear();
        cell.kind = CellKind::Wall;
        Ok(())
    }

    /// Forget every search result: search kinds become `Empty`, distances go
    /// back to their sentinels and parents are dropped. Walls and endpoints
    /// are kept, and Start gets distance 0.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.cells[self.start].distance_from_start = 0;
    }
}

fn checked_bounds(width: i32, height: i32) -> Result<Range, GridError> {
    if width <= 0 || height <= 0 {
        return Err(GridError::InvalidSize { width, height });
    }
    Ok(Range::sized(width, height))
}
