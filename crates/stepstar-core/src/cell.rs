//! The [`Cell`] type — one grid position with its search metadata.

use crate::geom::Point;

/// Sentinel for a `distance_from_start` that has not been reached yet.
pub const UNREACHABLE: i32 = i32::MAX;

/// Sentinel for a `distance_to_end` that has not been estimated yet.
pub const UNESTIMATED: f64 = f64::INFINITY;

/// Classification of a cell, as seen by a renderer.
///
/// `Empty`, `Wall`, `Start` and `End` describe the board itself. `Open`,
/// `Closed` and `Path` are written by the search and cleared on reset.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellKind {
    #[default]
    Empty,
    Wall,
    Start,
    End,
    Open,
    Closed,
    Path,
}

impl CellKind {
    /// Whether the kind can be handed to grid construction.
    #[inline]
    pub const fn is_board_kind(self) -> bool {
        matches!(self, Self::Empty | Self::Wall | Self::Start | Self::End)
    }

    /// Whether the kind was produced by a search step.
    #[inline]
    pub const fn is_search_kind(self) -> bool {
        matches!(self, Self::Open | Self::Closed | Self::Path)
    }

    /// Start and End never change kind during a search.
    #[inline]
    pub const fn is_endpoint(self) -> bool {
        matches!(self, Self::Start | Self::End)
    }
}

/// A grid cell: its position, kind and A* bookkeeping.
///
/// `parent` is a flat index into the owning [`Grid`](crate::Grid), never a
/// reference, so cells can be freely mutated in place.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pos: Point,
    pub(crate) kind: CellKind,
    pub(crate) distance_from_start: i32,
    pub(crate) distance_to_end: f64,
    pub(crate) parent: Option<usize>,
}

impl Cell {
    pub(crate) fn new(pos: Point, kind: CellKind) -> Self {
        Self {
            pos,
            kind,
            distance_from_start: UNREACHABLE,
            distance_to_end: UNESTIMATED,
            parent: None,
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        self.pos
    }

    #[inline]
    pub fn kind(&self) -> CellKind {
        self.kind
    }

    /// Best known cost from Start, or [`UNREACHABLE`].
    #[inline]
    pub fn distance_from_start(&self) -> i32 {
        self.distance_from_start
    }

    /// Cached heuristic to End, or [`UNESTIMATED`].
    #[inline]
    pub fn distance_to_end(&self) -> f64 {
        self.distance_to_end
    }

    /// The A* priority key, `g + h`. Infinite while either part is unset.
    #[inline]
    pub fn total(&self) -> f64 {
        if self.distance_from_start == UNREACHABLE {
            return f64::INFINITY;
        }
        f64::from(self.distance_from_start) + self.distance_to_end
    }

    /// Flat index of the predecessor on the best known path.
    #[inline]
    pub fn parent(&self) -> Option<usize> {
        self.parent
    }

    #[inline]
    pub fn is_wall(&self) -> bool {
        self.kind == CellKind::Wall
    }

    /// Draw a search result (`Open`, `Closed` or `Path`) on the cell.
    ///
    /// Board kinds are fixed once the grid is built: walls and endpoints
    /// keep their kind, and a board kind is never written. Returns whether
    /// the kind changed.
    pub fn mark(&mut self, kind: CellKind) -> bool {
        if !kind.is_search_kind() || self.is_wall() || self.kind.is_endpoint() {
            return false;
        }
        let changed = self.kind != kind;
        self.kind = kind;
        changed
    }

    /// Record `parent` as predecessor if `distance` beats the best known
    /// one. Returns whether the cell improved.
    pub fn relax(&mut self, parent: usize, distance: i32) -> bool {
        if distance >= self.distance_from_start {
            return false;
        }
        self.distance_from_start = distance;
        self.parent = Some(parent);
        true
    }

    /// Fill the heuristic the first time it is asked for; later calls keep
    /// the cached value.
    pub fn estimate_once(&mut self, estimate: impl FnOnce(Point) -> f64) -> f64 {
        if self.distance_to_end == UNESTIMATED {
            self.distance_to_end = estimate(self.pos);
        }
        self.distance_to_end
    }

    /// Drop search metadata and any search-produced kind.
    pub(crate) fn clear(&mut self) {
        if self.kind.is_search_kind() {
            self.kind = CellKind::Empty;
        }
        self.distance_from_start = UNREACHABLE;
        self.distance_to_end = UNESTIMATED;
        self.parent = None;
    }
}
