use stepstar_core::{CellKind, Grid, Point};

use crate::cost::StepCosts;
use crate::frontier::{Frontier, Membership};

/// Where a [`Search`] stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchState {
    /// Start is open, nothing expanded yet.
    Ready,
    /// At least one expansion done, End not reached, cells still open.
    Running,
    /// End has been expanded and the path is marked.
    Solved,
    /// Nothing left to expand and End was never reached.
    Exhausted,
}

impl SearchState {
    /// `Solved` and `Exhausted` admit no further expansion.
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Solved | Self::Exhausted)
    }
}

/// An incremental A* search that owns its [`Grid`].
///
/// Each [`step`](Search::step) expands exactly one cell and leaves the grid
/// in a drawable state: expanded cells are `Closed`, discovered ones `Open`,
/// and once End is expanded the cells between Start and End become `Path`.
///
/// Expansion order is fully deterministic: lowest `g + h` first, then lowest
/// `h`, then whichever cell entered the open set first.
#[derive(Clone, Debug)]
pub struct Search {
    grid: Grid,
    costs: StepCosts,
    frontier: Frontier,
    nbuf: Vec<usize>,
}

impl Search {
    /// Start a search over `grid` with the default [`StepCosts`].
    ///
    /// Any earlier search results left in `grid` are cleared.
    pub fn new(grid: Grid) -> Self {
        Self::with_costs(grid, StepCosts::default())
    }

    /// Start a search over `grid` with custom movement costs.
    pub fn with_costs(grid: Grid, costs: StepCosts) -> Self {
        let mut search = Self {
            frontier: Frontier::new(grid.len()),
            grid,
            costs,
            nbuf: Vec::with_capacity(8),
        };
        search.reset();
        search
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Give the grid back, with whatever search marks it currently carries.
    pub fn into_grid(self) -> Grid {
        self.grid
    }

    #[inline]
    pub fn costs(&self) -> StepCosts {
        self.costs
    }

    /// Current state, computed without touching anything.
    pub fn state(&self) -> SearchState {
        if self.frontier.solved {
            SearchState::Solved
        } else if self.frontier.open_len() == 0 {
            SearchState::Exhausted
        } else if self.frontier.expansions.is_empty() {
            SearchState::Ready
        } else {
            SearchState::Running
        }
    }

    /// Number of cells expanded so far.
    #[inline]
    pub fn expanded(&self) -> usize {
        self.frontier.closed_len()
    }

    /// Expanded cells, in the order they were expanded.
    pub fn expansion_order(&self) -> impl Iterator<Item = Point> + '_ {
        self.frontier.expansions.iter().map(|&i| self.grid.point(i))
    }

    #[inline]
    pub fn open_len(&self) -> usize {
        self.frontier.open_len()
    }

    #[inline]
    pub fn closed_len(&self) -> usize {
        self.frontier.closed_len()
    }

    pub fn is_open(&self, p: Point) -> bool {
        self.membership(p) == Some(Membership::Open)
    }

    pub fn is_closed(&self, p: Point) -> bool {
        self.membership(p) == Some(Membership::Closed)
    }

    fn membership(&self, p: Point) -> Option<Membership> {
        self.grid.idx(p).map(|i| self.frontier.membership(i))
    }

    /// Clear all search marks and go back to [`SearchState::Ready`].
    pub fn reset(&mut self) {
        self.grid.reset();
        self.frontier.reset(&self.grid);
        log::debug!("search reset, start {} end {}", self.grid.start(), self.grid.end());
    }

    /// Advance the search by one expansion and return the new state.
    ///
    /// Once solved, further calls only re-mark the same path. Once
    /// exhausted, further calls do nothing.
    pub fn step(&mut self) -> SearchState {
        if self.frontier.solved {
            self.mark_path();
            return SearchState::Solved;
        }
        let Some(ci) = self.frontier.pop_best(&self.grid) else {
            return SearchState::Exhausted;
        };

        self.frontier.close(ci);
        self.grid.cell_mut(ci).mark(CellKind::Closed);

        let current = self.grid.cell(ci);
        let cp = current.pos();
        let current_g = current.distance_from_start();
        log::trace!(
            "expand {} g={} h={:.2}",
            cp,
            current_g,
            current.distance_to_end()
        );

        let end = self.grid.end();
        let costs = self.costs;
        let mut nbuf = std::mem::take(&mut self.nbuf);
        nbuf.clear();
        self.grid.neighbor_indices(ci, &mut nbuf);

        for &ni in nbuf.iter() {
            if self.frontier.is_closed(ni) {
                continue;
            }
            let cell = self.grid.cell_mut(ni);
            let Some(tentative) = current_g.checked_add(costs.step(cp, cell.pos())) else {
                log::warn!("distance to {} overflows, skipping", cell.pos());
                continue;
            };
            let improved = cell.relax(ci, tentative);
            cell.estimate_once(|p| costs.estimate(p, end));
            cell.mark(CellKind::Open);
            if improved {
                log::trace!("  relax {} g={}", cell.pos(), tentative);
            }
            self.frontier.open(ni, cell, improved);
        }
        self.nbuf = nbuf;

        if ci == self.grid.end_idx() {
            self.frontier.solved = true;
            self.mark_path();
            log::debug!(
                "solved after {} expansions, cost {}",
                self.expanded(),
                current_g
            );
            return SearchState::Solved;
        }

        let state = self.state();
        if state == SearchState::Exhausted {
            log::debug!("exhausted after {} expansions, no path", self.expanded());
        }
        state
    }

    /// Step until the search is solved or exhausted.
    pub fn solve(&mut self) -> SearchState {
        loop {
            let state = self.step();
            if state.is_terminal() {
                return state;
            }
        }
    }

    /// The path from Start to End (both included), once solved.
    pub fn path(&self) -> Option<Vec<Point>> {
        if !self.frontier.solved {
            return None;
        }
        let mut chain = self.parent_chain()?;
        chain.reverse();
        Some(chain.into_iter().map(|i| self.grid.point(i)).collect())
    }

    /// Total cost of the path, once solved.
    pub fn path_cost(&self) -> Option<i32> {
        if !self.frontier.solved {
            return None;
        }
        Some(self.grid.cell(self.grid.end_idx()).distance_from_start())
    }

    /// Indices from End back to Start through parent links, or `None` if
    /// the chain breaks before reaching Start.
    fn parent_chain(&self) -> Option<Vec<usize>> {
        let start = self.grid.start_idx();
        let mut cur = self.grid.end_idx();
        let mut chain = vec![cur];
        while cur != start {
            cur = self.grid.cell(cur).parent()?;
            chain.push(cur);
            if chain.len() > self.grid.len() {
                return None;
            }
        }
        Some(chain)
    }

    fn mark_path(&mut self) {
        let Some(chain) = self.parent_chain() else {
            log::warn!("end {} has no parent chain back to start", self.grid.end());
            return;
        };
        for &i in &chain[1..chain.len() - 1] {
            self.grid.cell_mut(i).mark(CellKind::Path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepstar_core::{UNESTIMATED, UNREACHABLE};

    fn kinds(search: &Search) -> Vec<CellKind> {
        search.grid().iter().map(|(_, k)| k).collect()
    }

    fn path_cells(search: &Search) -> Vec<Point> {
        search
            .grid()
            .iter()
            .filter(|&(_, k)| k == CellKind::Path)
            .map(|(p, _)| p)
            .collect()
    }

    /// Build a grid from rows of `.`, `#`, `S` and `E`.
    fn board(rows: &[&str]) -> Grid {
        let height = rows.len() as i32;
        let width = rows[0].len() as i32;
        let kinds = rows
            .iter()
            .flat_map(|r| r.chars())
            .map(|ch| match ch {
                '#' => CellKind::Wall,
                'S' => CellKind::Start,
                'E' => CellKind::End,
                _ => CellKind::Empty,
            })
            .collect();
        Grid::from_kinds(width, height, kinds).unwrap()
    }

    /// Every cell is in at most one set, and the kinds agree with the sets.
    fn assert_frontier_consistent(search: &Search) {
        for (p, kind) in search.grid().iter() {
            let open = search.is_open(p);
            let closed = search.is_closed(p);
            assert!(!(open && closed), "{p} both open and closed");
            if kind.is_endpoint() {
                continue;
            }
            match kind {
                CellKind::Open => assert!(open, "{p} drawn open but not in open set"),
                CellKind::Closed => assert!(closed, "{p} drawn closed but not closed"),
                CellKind::Path => assert!(closed, "{p} on path but never expanded"),
                CellKind::Empty | CellKind::Wall => assert!(!open && !closed),
                _ => {}
            }
        }
    }

    #[test]
    fn fresh_search_is_ready() {
        let g = Grid::new(3, 3, Point::new(0, 0), Point::new(2, 2)).unwrap();
        let s = Search::new(g);
        assert_eq!(s.state(), SearchState::Ready);
        assert_eq!(s.open_len(), 1);
        assert!(s.is_open(Point::new(0, 0)));
        assert_eq!(s.closed_len(), 0);
        assert_eq!(s.path(), None);
    }

    #[test]
    fn diagonal_three_by_three() {
        let g = Grid::new(3, 3, Point::new(0, 0), Point::new(2, 2)).unwrap();
        let mut s = Search::new(g);
        assert_eq!(s.solve(), SearchState::Solved);

        let end = s.grid().at(Point::new(2, 2)).unwrap();
        assert_eq!(end.distance_from_start(), 2 * s.costs().diagonal());
        assert_eq!(s.path_cost(), Some(28));
        assert_eq!(
            s.path(),
            Some(vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)])
        );
        assert_eq!(path_cells(&s), vec![Point::new(1, 1)]);
        assert_eq!(
            s.expansion_order().collect::<Vec<_>>(),
            vec![Point::new(0, 0), Point::new(1, 1), Point::new(2, 2)]
        );
        assert_eq!(s.grid().kind_at(Point::new(0, 0)), Some(CellKind::Start));
        assert_eq!(s.grid().kind_at(Point::new(2, 2)), Some(CellKind::End));
    }

    #[test]
    fn straight_corridor() {
        let g = Grid::new(1, 5, Point::new(0, 0), Point::new(0, 4)).unwrap();
        let mut s = Search::new(g);
        assert_eq!(s.solve(), SearchState::Solved);
        assert_eq!(
            path_cells(&s),
            vec![Point::new(0, 1), Point::new(0, 2), Point::new(0, 3)]
        );
        assert_eq!(s.path_cost(), Some(4 * s.costs().straight()));
        assert_eq!(s.expanded(), 5);
    }

    #[test]
    fn wall_row_blocks_everything() {
        let g = board(&[
            "S....", //
            "#####", //
            "....E",
        ]);
        let mut s = Search::new(g);
        assert_eq!(s.solve(), SearchState::Exhausted);
        assert!(path_cells(&s).is_empty());
        assert_eq!(s.expanded(), 5);
        assert_eq!(s.path(), None);
        assert_eq!(s.grid().count(CellKind::Path), 0);
    }

    #[test]
    fn exhausted_is_terminal_noop() {
        let g = board(&["S#E"]);
        let mut s = Search::new(g);
        assert_eq!(s.step(), SearchState::Exhausted);
        let before = kinds(&s);
        assert_eq!(s.step(), SearchState::Exhausted);
        assert_eq!(s.step(), SearchState::Exhausted);
        assert_eq!(kinds(&s), before);
        assert_eq!(s.expanded(), 1);
    }

    #[test]
    fn enclosed_end_exhausts_within_board_size() {
        let g = board(&[
            "S.....", //
            "..###.", //
            "..#E#.", //
            "..###.", //
            "......",
        ]);
        let limit = g.len();
        let mut s = Search::new(g);
        let mut steps = 0;
        let mut state = s.state();
        while !state.is_terminal() {
            state = s.step();
            steps += 1;
            assert!(steps <= limit, "search did not terminate");
        }
        assert_eq!(state, SearchState::Exhausted);
        assert_eq!(s.expanded(), s.grid().walkable() - 1);
    }

    #[test]
    fn step_states_progress() {
        let g = Grid::new(1, 3, Point::new(0, 0), Point::new(0, 2)).unwrap();
        let mut s = Search::new(g);
        assert_eq!(s.step(), SearchState::Running);
        assert_eq!(s.grid().kind_at(Point::new(0, 1)), Some(CellKind::Open));
        assert_eq!(s.step(), SearchState::Running);
        assert_eq!(s.grid().kind_at(Point::new(0, 1)), Some(CellKind::Closed));
        assert_eq!(s.step(), SearchState::Solved);
        assert_eq!(s.grid().kind_at(Point::new(0, 1)), Some(CellKind::Path));
    }

    #[test]
    fn walls_are_never_touched() {
        let g = board(&[
            "S.#..", //
            "..#..", //
            "....E",
        ]);
        let mut s = Search::new(g);
        while !s.step().is_terminal() {
            assert_frontier_consistent(&s);
            for (p, kind) in s.grid().iter() {
                if kind == CellKind::Wall {
                    assert!(!s.is_open(p) && !s.is_closed(p));
                    let c = s.grid().at(p).unwrap();
                    assert_eq!(c.distance_from_start(), UNREACHABLE);
                }
            }
        }
        assert_eq!(s.state(), SearchState::Solved);
        assert_frontier_consistent(&s);
    }

    #[test]
    fn parent_chain_strictly_decreases() {
        let g = board(&[
            "S...#....", //
            ".##.#.##.", //
            ".#..#..#.", //
            ".#.###.#.", //
            ".#.....#E",
        ]);
        let mut s = Search::new(g);
        assert_eq!(s.solve(), SearchState::Solved);

        let path = s.path().unwrap();
        assert_eq!(path.first(), Some(&s.grid().start()));
        assert_eq!(path.last(), Some(&s.grid().end()));
        for pair in path.windows(2) {
            let a = s.grid().at(pair[0]).unwrap();
            let b = s.grid().at(pair[1]).unwrap();
            let d = pair[1] - pair[0];
            assert!(d.x.abs() <= 1 && d.y.abs() <= 1, "{} -> {} not adjacent", pair[0], pair[1]);
            assert!(a.distance_from_start() < b.distance_from_start());
            assert_eq!(
                b.distance_from_start() - a.distance_from_start(),
                s.costs().step(pair[0], pair[1])
            );
            assert_eq!(b.parent(), s.grid().idx(pair[0]));
        }
        assert_eq!(path_cells(&s).len(), path.len() - 2);
    }

    #[test]
    fn stepping_after_solved_is_idempotent() {
        let g = board(&[
            "S..#.", //
            ".#.#.", //
            ".#...", //
            "...#E",
        ]);
        let mut s = Search::new(g);
        assert_eq!(s.solve(), SearchState::Solved);
        let grid_after = s.grid().clone();
        let expanded = s.expanded();
        for _ in 0..3 {
            assert_eq!(s.step(), SearchState::Solved);
            assert_eq!(s.grid(), &grid_after);
            assert_eq!(s.expanded(), expanded);
        }
        assert_eq!(s.solve(), SearchState::Solved);
        assert_eq!(s.grid(), &grid_after);
    }

    #[test]
    fn reset_then_solve_reproduces_output() {
        let g = board(&[
            "S...#...", //
            ".##.#.#.", //
            "....#.#.", //
            ".##...#E",
        ]);
        let mut s = Search::new(g.clone());
        assert_eq!(s.solve(), SearchState::Solved);
        let first = kinds(&s);
        let first_order: Vec<_> = s.expansion_order().collect();

        s.reset();
        assert_eq!(s.state(), SearchState::Ready);
        assert_eq!(s.grid(), &g);
        assert_eq!(s.grid().count(CellKind::Closed), 0);

        assert_eq!(s.solve(), SearchState::Solved);
        assert_eq!(kinds(&s), first);
        assert_eq!(s.expansion_order().collect::<Vec<_>>(), first_order);
    }

    #[test]
    fn independent_runs_agree() {
        let rows = [
            "..........", //
            ".S..#.....", //
            "....#..#..", //
            "..###..#..", //
            "......##E.", //
            "..........",
        ];
        let mut a = Search::new(board(&rows));
        let mut b = Search::new(board(&rows));
        assert_eq!(a.solve(), b.solve());
        assert_eq!(
            a.expansion_order().collect::<Vec<_>>(),
            b.expansion_order().collect::<Vec<_>>()
        );
        assert_eq!(a.path(), b.path());
        assert_eq!(a.grid(), b.grid());
    }

    #[test]
    fn heuristic_is_computed_once_on_discovery() {
        let g = Grid::new(5, 5, Point::new(0, 0), Point::new(4, 4)).unwrap();
        let mut s = Search::new(g);
        s.step();
        let costs = s.costs();
        let end = s.grid().end();
        for (p, _) in s.grid().iter() {
            let c = s.grid().at(p).unwrap();
            if s.is_open(p) {
                assert_eq!(c.distance_to_end(), costs.estimate(p, end));
            } else {
                // Start is never estimated; undiscovered cells not yet.
                assert_eq!(c.distance_to_end(), UNESTIMATED);
            }
        }
        let cached: Vec<_> = s.grid().cells().iter().map(|c| c.distance_to_end()).collect();
        s.step();
        for (c, before) in s.grid().cells().iter().zip(cached) {
            if before != UNESTIMATED {
                assert_eq!(c.distance_to_end(), before);
            }
        }
    }

    #[test]
    fn custom_costs_change_the_route() {
        // With expensive diagonals the search hugs the axes.
        let g = Grid::new(3, 3, Point::new(0, 0), Point::new(2, 2)).unwrap();
        let mut s = Search::with_costs(g, StepCosts::new(10, 25).unwrap());
        assert_eq!(s.solve(), SearchState::Solved);
        assert_eq!(s.path_cost(), Some(40));
        assert_eq!(s.path().map(|p| p.len()), Some(5));
    }

    #[test]
    fn open_cell_is_reparented_on_cheaper_route() {
        // (0,3) is first reached diagonally from (1,2) at 14 + 14 = 28, then
        // straight from (1,3) at 10 + 10 = 20 while still open.
        let g = board(&[
            "E..", //
            "##.", //
            "..#", //
            "..S",
        ]);
        let mut s = Search::new(g);
        let target = Point::new(0, 3);
        let via_diagonal = s.grid().idx(Point::new(1, 2));
        let via_straight = s.grid().idx(Point::new(1, 3));

        assert_eq!(s.step(), SearchState::Running);
        assert_eq!(s.step(), SearchState::Running);
        assert_eq!(s.expansion_order().last(), Some(Point::new(1, 2)));
        let c = s.grid().at(target).unwrap();
        assert!(s.is_open(target));
        assert_eq!(c.distance_from_start(), 28);
        assert_eq!(c.parent(), via_diagonal);

        assert_eq!(s.step(), SearchState::Running);
        assert_eq!(s.expansion_order().last(), Some(Point::new(1, 3)));
        let c = s.grid().at(target).unwrap();
        assert!(s.is_open(target));
        assert_eq!(c.distance_from_start(), 20);
        assert_eq!(c.parent(), via_straight);
        assert_eq!(s.grid().kind_at(target), Some(CellKind::Open));

        assert_eq!(s.solve(), SearchState::Solved);
        assert_eq!(s.grid().at(target).unwrap().parent(), via_straight);
    }

    #[test]
    fn host_marks_cannot_add_endpoints() {
        let mut g = Grid::new(3, 1, Point::new(0, 0), Point::new(2, 0)).unwrap();
        let mid = g.idx(Point::new(1, 0)).unwrap();
        assert!(!g.cell_mut(mid).mark(CellKind::Start));
        let mut s = Search::new(g);
        assert_eq!(s.grid().count(CellKind::Start), 1);
        assert_eq!(s.solve(), SearchState::Solved);
        assert_eq!(s.grid().count(CellKind::Start), 1);
        assert_eq!(s.path_cost(), Some(20));
    }

    #[test]
    fn huge_costs_do_not_overflow() {
        let g = Grid::new(1, 4, Point::new(0, 0), Point::new(0, 3)).unwrap();
        let costs = StepCosts::new(i32::MAX / 2, i32::MAX - 1).unwrap();
        let mut s = Search::with_costs(g, costs);
        assert_eq!(s.solve(), SearchState::Exhausted);
        assert_eq!(s.grid().count(CellKind::Path), 0);
    }

    #[test]
    fn new_clears_old_marks() {
        let g = Grid::new(1, 4, Point::new(0, 0), Point::new(0, 3)).unwrap();
        let mut s = Search::new(g);
        s.solve();
        let used = s.into_grid();
        assert_eq!(used.count(CellKind::Path), 2);
        let fresh = Search::new(used);
        assert_eq!(fresh.grid().count(CellKind::Path), 0);
        assert_eq!(fresh.state(), SearchState::Ready);
    }
}
