//! Text layouts for boards.
//!
//! A [`Layout`] is a plain snapshot of cell kinds that can be parsed from and
//! rendered to ASCII art, one glyph per cell:
//!
//! | Glyph | Kind |
//! |---|---|
//! | `.` | `Empty` |
//! | `#` | `Wall` |
//! | `S` | `Start` |
//! | `E` | `End` |
//! | `o` | `Open` |
//! | `x` | `Closed` |
//! | `*` | `Path` |
//!
//! Only the first four are accepted when turning a layout into a [`Grid`].
//!
//! Boards are saved to disk in the same text form, see [`Layout::save`] and
//! [`Layout::load`].

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use stepstar_core::{CellKind, Grid, GridError, Point};

/// Glyph used to draw a cell kind.
pub const fn glyph(kind: CellKind) -> char {
    match kind {
        CellKind::Empty => '.',
        CellKind::Wall => '#',
        CellKind::Start => 'S',
        CellKind::End => 'E',
        CellKind::Open => 'o',
        CellKind::Closed => 'x',
        CellKind::Path => '*',
    }
}

/// Inverse of [`glyph`].
pub const fn kind_of(ch: char) -> Option<CellKind> {
    Some(match ch {
        '.' => CellKind::Empty,
        '#' => CellKind::Wall,
        'S' => CellKind::Start,
        'E' => CellKind::End,
        'o' => CellKind::Open,
        'x' => CellKind::Closed,
        '*' => CellKind::Path,
        _ => return None,
    })
}

/// A row-major snapshot of cell kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Layout {
    width: i32,
    height: i32,
    kinds: Vec<CellKind>,
}

impl Layout {
    /// Parse ASCII art. Leading/trailing whitespace is trimmed from the
    /// whole string; every line must have the same width.
    pub fn parse(s: &str) -> Result<Self, LayoutError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(LayoutError::Empty);
        }
        let mut width: Option<i32> = None;
        let mut height = 0;
        let mut kinds = Vec::with_capacity(s.len());

        for (y, line) in s.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            let mut x = 0;
            for ch in line.chars() {
                let kind = kind_of(ch).ok_or(LayoutError::InvalidGlyph {
                    ch,
                    pos: Point::new(x, y as i32),
                })?;
                kinds.push(kind);
                x += 1;
            }
            match width {
                None => width = Some(x),
                Some(w) if w != x => {
                    return Err(LayoutError::InconsistentSize {
                        line: y,
                        expected: w,
                        actual: x,
                    });
                }
                Some(_) => {}
            }
            height += 1;
        }

        Ok(Self {
            width: width.unwrap_or(0),
            height,
            kinds,
        })
    }

    /// Snapshot the current kinds of a grid, search marks included.
    pub fn from_grid(grid: &Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            kinds: grid.iter().map(|(_, k)| k).collect(),
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    pub fn kinds(&self) -> &[CellKind] {
        &self.kinds
    }

    /// Kind at `p`, or `None` outside the layout.
    pub fn at(&self, p: Point) -> Option<CellKind> {
        if p.x < 0 || p.y < 0 || p.x >= self.width || p.y >= self.height {
            return None;
        }
        self.kinds
            .get(p.y as usize * self.width as usize + p.x as usize)
            .copied()
    }

    /// The same layout with every search mark turned back into `Empty`.
    pub fn board_only(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            kinds: self
                .kinds
                .iter()
                .map(|&k| if k.is_search_kind() { CellKind::Empty } else { k })
                .collect(),
        }
    }

    /// Build a validated grid from this layout.
    pub fn into_grid(self) -> Result<Grid, LayoutError> {
        Ok(Grid::from_kinds(self.width, self.height, self.kinds)?)
    }

    /// Read a layout saved with [`save`](Self::save).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| LayoutError::io(path, e))?;
        let layout = Self::parse(&text)?;
        log::debug!(
            "loaded {}x{} layout from {}",
            layout.width,
            layout.height,
            path.display()
        );
        Ok(layout)
    }

    /// Write the layout as text, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), LayoutError> {
        let path = path.as_ref();
        fs::write(path, format!("{self}\n")).map_err(|e| LayoutError::io(path, e))?;
        log::debug!("saved layout to {}", path.display());
        Ok(())
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = self.width.max(1) as usize;
        for (y, row) in self.kinds.chunks(w).enumerate() {
            if y > 0 {
                f.write_str("\n")?;
            }
            for &k in row {
                write!(f, "{}", glyph(k))?;
            }
        }
        Ok(())
    }
}

/// Errors that can occur when reading, parsing or building a layout.
#[derive(Debug)]
pub enum LayoutError {
    /// Nothing but whitespace.
    Empty,
    /// A line's width differs from the first line's.
    InconsistentSize {
        line: usize,
        expected: i32,
        actual: i32,
    },
    /// A character with no cell kind.
    InvalidGlyph { ch: char, pos: Point },
    /// The layout parsed but is not a valid board.
    Grid(GridError),
    /// Reading or writing a layout file failed.
    Io { path: PathBuf, source: io::Error },
}

impl LayoutError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("layout: empty"),
            Self::InconsistentSize {
                line,
                expected,
                actual,
            } => write!(
                f,
                "layout: line {line} has width {actual}, expected {expected}"
            ),
            Self::InvalidGlyph { ch, pos } => {
                write!(f, "layout: invalid glyph \u{201c}{ch}\u{201d} at {pos}")
            }
            Self::Grid(e) => write!(f, "layout: {e}"),
            Self::Io { path, source } => {
                write!(f, "layout: {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Grid(e) => Some(e),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<GridError> for LayoutError {
    fn from(e: GridError) -> Self {
        Self::Grid(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepstar_core::Endpoint;
    use stepstar_paths::{Search, SearchState};

    const ROOM: &str = "\
S..#
.#.#
...E";

    #[test]
    fn parse_and_size() {
        let l = Layout::parse(ROOM).unwrap();
        assert_eq!((l.width(), l.height()), (4, 3));
        assert_eq!(l.at(Point::new(0, 0)), Some(CellKind::Start));
        assert_eq!(l.at(Point::new(3, 1)), Some(CellKind::Wall));
        assert_eq!(l.at(Point::new(4, 0)), None);
    }

    #[test]
    fn display_round_trips_text() {
        let l: Layout = ROOM.parse().unwrap();
        assert_eq!(l.to_string(), ROOM);
    }

    #[test]
    fn crlf_and_outer_whitespace_accepted() {
        let l = Layout::parse("\n  S.\r\n.E\r\n").unwrap();
        assert_eq!(l.to_string(), "S.\n.E");
        // Inner lines keep their whitespace, which is not a glyph.
        let err = Layout::parse("S.\n .E").unwrap_err();
        assert!(matches!(err, LayoutError::InvalidGlyph { ch: ' ', .. }));
    }

    #[test]
    fn inconsistent_size_error() {
        let err = Layout::parse("S.\n..E").unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InconsistentSize {
                line: 1,
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn invalid_glyph_error() {
        let err = Layout::parse("S.\n.?").unwrap_err();
        assert!(matches!(
            err,
            LayoutError::InvalidGlyph { ch: '?', pos } if pos == Point::new(1, 1)
        ));
        assert!(matches!(Layout::parse("  \n"), Err(LayoutError::Empty)));
    }

    #[test]
    fn into_grid_validates() {
        let err = Layout::parse("S..").unwrap().into_grid().unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Grid(GridError::MissingEndpoint(Endpoint::End))
        ));
        assert!(err.to_string().contains("no end cell"));

        let err = Layout::parse("So.E").unwrap().into_grid().unwrap_err();
        assert!(matches!(err, LayoutError::Grid(GridError::SearchKind { .. })));
    }

    #[test]
    fn snapshot_of_solved_board() {
        let grid = Layout::parse(ROOM).unwrap().into_grid().unwrap();
        let mut search = Search::new(grid);
        assert_eq!(search.solve(), SearchState::Solved);

        let snap = Layout::from_grid(search.grid());
        let text = snap.to_string();
        assert!(text.contains('*'));
        assert!(text.starts_with('S'));
        assert_eq!(snap.board_only().to_string(), ROOM);

        // The stripped snapshot rebuilds the original board.
        let again = snap.board_only().into_grid().unwrap();
        let mut search2 = Search::new(again);
        search2.solve();
        assert_eq!(Layout::from_grid(search2.grid()), snap);
    }

    #[test]
    fn save_and_load_through_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.txt");

        let grid = Layout::parse(ROOM).unwrap().into_grid().unwrap();
        let mut search = Search::new(grid);
        search.solve();
        let board = Layout::from_grid(search.grid()).board_only();
        board.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{ROOM}\n"));
        let back = Layout::load(&path).unwrap();
        assert_eq!(back, board);
        assert_eq!(back.into_grid().unwrap(), Layout::parse(ROOM).unwrap().into_grid().unwrap());
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nothing-here.txt");
        let err = Layout::load(&path).unwrap_err();
        match &err {
            LayoutError::Io { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("nothing-here.txt"));
    }

    #[test]
    fn glyphs_round_trip() {
        use CellKind::*;
        for k in [Empty, Wall, Start, End, Open, Closed, Path] {
            assert_eq!(kind_of(glyph(k)), Some(k));
        }
        assert_eq!(kind_of('?'), None);
    }
}
