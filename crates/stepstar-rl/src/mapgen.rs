//! Random board generation.
//!
//! Every cell independently becomes a wall with probability
//! [`BoardConfig::wall_chance`]; Start and End are then dropped on two
//! distinct random positions, overwriting whatever was there. With
//! [`BoardConfig::border`] set, the outer ring is walled and the endpoints
//! stay inside it.

use rand::rngs::StdRng;
use rand::{Rng, RngExt, SeedableRng};
use stepstar_core::{CellKind, Grid, GridError, Point, Range};

/// Parameters for [`generate`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    /// Probability (0.0–1.0) that a cell is a wall.
    pub wall_chance: f64,
    /// Wall the outer ring of the board.
    pub border: bool,
    /// Fixed seed for reproducible boards; `None` picks a fresh one.
    pub seed: Option<u64>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: 30,
            height: 30,
            wall_chance: 0.5,
            border: true,
            seed: None,
        }
    }
}

impl BoardConfig {
    /// Same config, pinned to `seed`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Board generator driven by any random source.
pub struct BoardGen<R: Rng> {
    pub rng: R,
}

impl<R: Rng> BoardGen<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Generate a `width`×`height` board.
    pub fn generate(
        &mut self,
        width: i32,
        height: i32,
        wall_chance: f64,
        border: bool,
    ) -> Result<Grid, GridError> {
        let bounds = Range::sized(width.max(0), height.max(0));
        if width <= 0 || height <= 0 || bounds.len() < 2 {
            return Err(GridError::InvalidSize { width, height });
        }
        let inner = bounds.inset(1);
        let (placement, border) = if border && inner.len() >= 2 {
            (inner, true)
        } else {
            (bounds, false)
        };
        let wall_chance = wall_chance.clamp(0.0, 1.0);

        let mut kinds: Vec<CellKind> = bounds
            .iter()
            .map(|p| {
                let edge = border && !inner.contains(p);
                if edge || self.rng.random_bool(wall_chance) {
                    CellKind::Wall
                } else {
                    CellKind::Empty
                }
            })
            .collect();

        let start = self.random_point(placement);
        let end = loop {
            let p = self.random_point(placement);
            if p != start {
                break p;
            }
        };
        let w = width as usize;
        kinds[start.y as usize * w + start.x as usize] = CellKind::Start;
        kinds[end.y as usize * w + end.x as usize] = CellKind::End;

        log::debug!(
            "generated {}x{} board, start {} end {}",
            width,
            height,
            start,
            end
        );
        Grid::from_kinds(width, height, kinds)
    }

    fn random_point(&mut self, r: Range) -> Point {
        Point::new(
            self.rng.random_range(r.min.x..r.max.x),
            self.rng.random_range(r.min.y..r.max.y),
        )
    }
}

/// Generate a board from `config`, returning it with the seed that was used
/// so the same board can be produced again.
pub fn generate(config: &BoardConfig) -> Result<(Grid, u64), GridError> {
    let seed = config.seed.unwrap_or_else(rand::random);
    let mut bg = BoardGen::new(StdRng::seed_from_u64(seed));
    let grid = bg.generate(config.width, config.height, config.wall_chance, config.border)?;
    log::info!("board seed {seed}");
    Ok((grid, seed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepstar_paths::{Search, SearchState};

    fn seeded(seed: u64) -> BoardGen<StdRng> {
        BoardGen::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn generates_valid_boards() {
        for seed in 0..20 {
            let g = seeded(seed).generate(12, 9, 0.3, true).unwrap();
            assert_eq!((g.width(), g.height()), (12, 9));
            assert_eq!(g.count(CellKind::Start), 1);
            assert_eq!(g.count(CellKind::End), 1);
            assert_ne!(g.start(), g.end());
        }
    }

    #[test]
    fn border_ring_is_walled() {
        let g = seeded(7).generate(8, 6, 0.0, true).unwrap();
        for (p, kind) in g.iter() {
            let edge = p.x == 0 || p.y == 0 || p.x == 7 || p.y == 5;
            if edge {
                assert_eq!(kind, CellKind::Wall, "{p} should be border wall");
            } else {
                assert_ne!(kind, CellKind::Wall);
            }
        }
    }

    #[test]
    fn tiny_board_skips_border() {
        let g = seeded(1).generate(2, 1, 0.0, true).unwrap();
        assert_eq!(g.count(CellKind::Wall), 0);
        assert_eq!(g.count(CellKind::Start) + g.count(CellKind::End), 2);
    }

    #[test]
    fn rejects_degenerate_sizes() {
        assert!(seeded(0).generate(0, 4, 0.5, false).is_err());
        assert!(seeded(0).generate(1, 1, 0.5, false).is_err());
    }

    #[test]
    fn same_seed_same_board() {
        let config = BoardConfig::default().with_seed(42);
        let (a, seed_a) = generate(&config).unwrap();
        let (b, seed_b) = generate(&config).unwrap();
        assert_eq!(seed_a, 42);
        assert_eq!(seed_a, seed_b);
        assert_eq!(a, b);
    }

    #[test]
    fn full_walls_leave_endpoints() {
        let g = seeded(3).generate(5, 5, 1.0, false).unwrap();
        assert_eq!(g.walkable(), 2);
        let d = g.end() - g.start();
        let expected = if d.x.abs() <= 1 && d.y.abs() <= 1 {
            SearchState::Solved
        } else {
            SearchState::Exhausted
        };
        assert_eq!(Search::new(g).solve(), expected);
    }

    /// Search invariants over many random boards.
    #[test]
    fn random_boards_search_invariants() {
        for seed in 0..40 {
            let g = seeded(seed).generate(14, 10, 0.35, true).unwrap();
            let limit = g.len();
            let mut search = Search::new(g);

            let mut steps = 0;
            let mut state = search.state();
            while !state.is_terminal() {
                state = search.step();
                steps += 1;
                assert!(steps <= limit, "seed {seed}: too many steps");
            }

            match state {
                SearchState::Solved => {
                    let path = search.path().unwrap();
                    let grid = search.grid();
                    for pair in path.windows(2) {
                        let a = grid.at(pair[0]).unwrap().distance_from_start();
                        let b = grid.at(pair[1]).unwrap().distance_from_start();
                        assert!(a < b, "seed {seed}: distances must grow along the path");
                    }
                    assert_eq!(grid.count(CellKind::Path), path.len() - 2);
                }
                SearchState::Exhausted => {
                    assert_eq!(search.grid().count(CellKind::Path), 0);
                    assert!(search.path().is_none());
                }
                _ => unreachable!(),
            }

            let first = search.grid().clone();
            search.reset();
            assert_eq!(search.solve(), state);
            assert_eq!(search.grid(), &first, "seed {seed}: re-solve differs");
        }
    }
}
