//! **stepstar-core** — the board model behind the stepstar A* engine.
//!
//! This crate provides the types every other stepstar crate builds on:
//! geometry primitives, cells carrying A* bookkeeping, and a validated
//! fixed-size [`Grid`] that answers neighbor queries and can be reset.

pub mod cell;
pub mod geom;
pub mod grid;

pub use cell::{Cell, CellKind, UNESTIMATED, UNREACHABLE};
pub use geom::{Point, Range};
pub use grid::{Endpoint, Grid, GridError, NEIGHBOR_OFFSETS};
