//! Terminal host for the stepstar engine.
//!
//! The [`Host`] model owns a generated board and its [`Search`] and maps the
//! four board controls onto them:
//!
//! | Key | Command |
//! |---|---|
//! | `q` | regenerate the board |
//! | `w` | advance one expansion |
//! | `s` | solve to the end |
//! | `e` | reset to unsolved |
//! | `Esc` | quit |
//!
//! [`draw`] renders the model with crossterm, one colored glyph per cell.
//!
//! With a board file attached, every generated board is written to it as a
//! text [`Layout`], and a session can start again from that file.

use std::io::Write;
use std::path::{Path, PathBuf};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use stepstar_core::{CellKind, Point};
use stepstar_paths::{Search, SearchState, StepCosts};
use stepstar_rl::{BoardConfig, Layout, LayoutError, glyph};

// Colours
const COL_EMPTY: Color = Color::Rgb { r: 235, g: 235, b: 235 };
const COL_WALL: Color = Color::Rgb { r: 40, g: 40, b: 50 };
const COL_START: Color = Color::Rgb { r: 60, g: 200, b: 90 };
const COL_END: Color = Color::Rgb { r: 220, g: 60, b: 60 };
const COL_OPEN: Color = Color::Rgb { r: 120, g: 190, b: 250 };
const COL_CLOSED: Color = Color::Rgb { r: 240, g: 190, b: 80 };
const COL_PATH: Color = Color::Rgb { r: 170, g: 90, b: 220 };
const COL_GLYPH: Color = Color::Rgb { r: 20, g: 20, b: 20 };
const COL_STATUS: Color = Color::Rgb { r: 200, g: 200, b: 200 };

const HELP_TEXT: &str = "q new board  w step  s solve  e reset  Esc quit";

/// Background colour for a cell kind.
pub fn color(kind: CellKind) -> Color {
    match kind {
        CellKind::Empty => COL_EMPTY,
        CellKind::Wall => COL_WALL,
        CellKind::Start => COL_START,
        CellKind::End => COL_END,
        CellKind::Open => COL_OPEN,
        CellKind::Closed => COL_CLOSED,
        CellKind::Path => COL_PATH,
    }
}

/// The host's entire action surface.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Regenerate,
    Step,
    Solve,
    Reset,
    Quit,
}

impl Command {
    /// Map a key press to a command.
    pub fn from_char(ch: char) -> Option<Self> {
        match ch.to_ascii_lowercase() {
            'q' => Some(Self::Regenerate),
            'w' => Some(Self::Step),
            's' => Some(Self::Solve),
            'e' => Some(Self::Reset),
            _ => None,
        }
    }
}

/// Whether the loop should keep going after a command.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Board, search and settings for one interactive session.
pub struct Host {
    config: BoardConfig,
    costs: StepCosts,
    /// `None` when the board came from a file.
    seed: Option<u64>,
    board_file: Option<PathBuf>,
    search: Search,
}

impl Host {
    pub fn new(config: BoardConfig) -> Result<Self, LayoutError> {
        Self::with_costs(config, StepCosts::default())
    }

    pub fn with_costs(config: BoardConfig, costs: StepCosts) -> Result<Self, LayoutError> {
        let (grid, seed) = stepstar_rl::generate(&config)?;
        Ok(Self {
            config,
            costs,
            seed: Some(seed),
            board_file: None,
            search: Search::with_costs(grid, costs),
        })
    }

    /// Resume from a board saved in `path`. Later boards are saved there
    /// too.
    pub fn load(config: BoardConfig, path: impl Into<PathBuf>) -> Result<Self, LayoutError> {
        let path = path.into();
        let grid = Layout::load(&path)?.board_only().into_grid()?;
        log::info!("board loaded from {}", path.display());
        Ok(Self {
            config,
            costs: StepCosts::default(),
            seed: None,
            board_file: Some(path),
            search: Search::new(grid),
        })
    }

    /// Save the current board to `path` now and after every regenerate.
    pub fn save_boards_to(&mut self, path: impl Into<PathBuf>) -> Result<(), LayoutError> {
        self.board_file = Some(path.into());
        self.save_board()
    }

    #[inline]
    pub fn search(&self) -> &Search {
        &self.search
    }

    /// Seed of the board currently shown, if it was generated.
    #[inline]
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    #[inline]
    pub fn board_file(&self) -> Option<&Path> {
        self.board_file.as_deref()
    }

    /// Run one command against the model.
    pub fn apply(&mut self, cmd: Command) -> Result<Flow, LayoutError> {
        match cmd {
            Command::Regenerate => self.regenerate()?,
            Command::Step => {
                self.search.step();
            }
            Command::Solve => {
                self.search.solve();
            }
            Command::Reset => self.search.reset(),
            Command::Quit => return Ok(Flow::Quit),
        }
        log::debug!("{:?} -> {:?}", cmd, self.search.state());
        Ok(Flow::Continue)
    }

    /// Throw the current board away and build a new one. A pinned seed
    /// advances by one so that successive boards differ but stay
    /// reproducible.
    fn regenerate(&mut self) -> Result<(), LayoutError> {
        let seed = match (self.config.seed, self.seed) {
            (Some(_), Some(last)) => Some(last.wrapping_add(1)),
            (pinned, _) => pinned,
        };
        let next = BoardConfig {
            seed,
            ..self.config.clone()
        };
        let (grid, seed) = stepstar_rl::generate(&next)?;
        self.seed = Some(seed);
        self.search = Search::with_costs(grid, self.costs);
        self.save_board()
    }

    fn save_board(&self) -> Result<(), LayoutError> {
        let Some(path) = &self.board_file else {
            return Ok(());
        };
        Layout::from_grid(self.search.grid()).board_only().save(path)
    }

/// One-line summary of the search.
    pub fn status_line(&self) -> String {
        let s = &self.search;
        let state = match s.state() {
            SearchState::Ready => "ready".to_string(),
            SearchState::Running => "running".to_string(),
            SearchState::Solved => match s.path_cost() {
                Some(cost) => format!("solved, cost {cost}"),
                None => "solved".to_string(),
            },
            SearchState::Exhausted => "no path".to_string(),
        };
        let board = match self.seed {
            Some(seed) => format!("seed {seed}"),
            None => "saved board".to_string(),
        };
        format!(
            "{}  {}  expanded {}  open {}",
            board,
            state,
            s.expanded(),
            s.open_len()
        )
    }
}

/// Terminal column and row of a cell, two columns per cell. `None` if the
/// cell lies beyond what a terminal can address.
pub fn screen_pos(p: Point) -> Option<(u16, u16)> {
    let col = p.x.checked_mul(2).and_then(|c| u16::try_from(c).ok())?;
    let row = u16::try_from(p.y).ok()?;
    Some((col, row))
}

/// Queue a full redraw of `host` into `out` and flush it.
///
/// Each cell takes two columns so boards look roughly square. Cells that
/// [`screen_pos`] cannot place are skipped.
pub fn draw(host: &Host, out: &mut impl Write) -> std::io::Result<()> {
    let grid = host.search().grid();
    queue!(out, Clear(ClearType::All))?;
    for (p, kind) in grid.iter() {
        let Some((col, row)) = screen_pos(p) else {
            continue;
        };
        let ch = match kind {
            CellKind::Empty | CellKind::Wall => ' ',
            other => glyph(other),
        };
        queue!(
            out,
            cursor::MoveTo(col, row),
            SetBackgroundColor(color(kind)),
            SetForegroundColor(COL_GLYPH),
            Print(ch),
            Print(' ')
        )?;
    }
    let below = u16::try_from(grid.height()).map_or(u16::MAX - 2, |h| h.min(u16::MAX - 2));
    queue!(
        out,
        ResetColor,
        SetForegroundColor(COL_STATUS),
        cursor::MoveTo(0, below + 1),
        Print(host.status_line()),
        cursor::MoveTo(0, below + 2),
        Print(HELP_TEXT),
        ResetColor
    )?;
    out.flush()
}
