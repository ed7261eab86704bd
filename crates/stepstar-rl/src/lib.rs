//! Board utilities for stepstar: ASCII [`layout`]s and random board
//! generation ([`mapgen`]).

pub mod layout;
pub mod mapgen;

pub use layout::{Layout, LayoutError, glyph, kind_of};
pub use mapgen::{BoardConfig, BoardGen, generate};
