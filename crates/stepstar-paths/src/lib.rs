//! Incremental A* search over a [`stepstar_core::Grid`].
//!
//! A [`Search`] owns the grid it explores and can be driven one expansion at
//! a time with [`Search::step`] (for visualisation) or run to the end with
//! [`Search::solve`]. After every call the grid's cell kinds describe the
//! search so far, ready to be drawn:
//!
//! | Kind | Meaning |
//! |---|---|
//! | `Open` | discovered, waiting for expansion |
//! | `Closed` | expanded |
//! | `Path` | on the final Start → End route |
//!
//! Movement costs come from [`StepCosts`]; the heuristic is the Euclidean
//! distance to End in straight-cost units, computed once per cell.

mod cost;
mod frontier;
mod search;

pub use cost::{CostError, StepCosts, euclidean};
pub use search::{Search, SearchState};
