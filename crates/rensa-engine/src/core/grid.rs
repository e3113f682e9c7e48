use std::fmt;

use rand::{Rng, distr::StandardUniform, prelude::Distribution};
use serde::{Deserialize, Serialize};

/// Number of columns in the playfield.
pub const FIELD_WIDTH: usize = 6;

/// Number of rows in the playfield.
pub const FIELD_HEIGHT: usize = 12;

/// A cell coordinate.
///
/// `x` grows rightward and `y` grows downward from the top-left cell. `y` may be
/// negative for pair cells that have not entered the field yet; the grid itself
/// only ever stores non-negative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Like [`Self::offset`], but `None` when a coordinate would overflow.
    #[must_use]
    pub const fn checked_offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self::new(x, y)),
            _ => None,
        }
    }

    /// The four orthogonal neighbors (right, left, below, above).
    #[must_use]
    pub const fn neighbors(self) -> [Self; 4] {
        [
            self.offset(1, 0),
            self.offset(-1, 0),
            self.offset(0, 1),
            self.offset(0, -1),
        ]
    }

    #[must_use]
    pub const fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

/// Color of a single puyo.
///
/// The declaration order is the palette order: a palette of size `n` uses the
/// first `n` colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PuyoColor {
    Red = 0,
    Blue = 1,
    Green = 2,
    Yellow = 3,
}

impl Distribution<PuyoColor> for StandardUniform {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> PuyoColor {
        PuyoColor::ALL[rng.random_range(0..PuyoColor::LEN)]
    }
}

impl PuyoColor {
    /// Number of defined colors (4).
    pub const LEN: usize = 4;

    pub const ALL: [Self; Self::LEN] = [Self::Red, Self::Blue, Self::Green, Self::Yellow];

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::LEN {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    /// Returns the single character representation of this color.
    ///
    /// # Examples
    ///
    /// ```
    /// use rensa_engine::PuyoColor;
    ///
    /// assert_eq!(PuyoColor::Red.as_char(), 'R');
    /// assert_eq!(PuyoColor::Yellow.as_char(), 'Y');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PuyoColor::Red => 'R',
            PuyoColor::Blue => 'B',
            PuyoColor::Green => 'G',
            PuyoColor::Yellow => 'Y',
        }
    }

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'R' => Some(PuyoColor::Red),
            'B' => Some(PuyoColor::Blue),
            'G' => Some(PuyoColor::Green),
            'Y' => Some(PuyoColor::Yellow),
            _ => None,
        }
    }
}

/// A puyo resting in the grid.
///
/// The stored position always equals the grid cell holding it. Only [`Grid`]
/// creates and moves occupants, so the two cannot drift apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Puyo {
    color: PuyoColor,
    position: Position,
}

impl Puyo {
    #[must_use]
    pub fn color(&self) -> PuyoColor {
        self.color
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }
}

type Cell = Option<Puyo>;

/// Failed to build a grid from text rows.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
pub enum GridParseError {
    #[display("expected at most {FIELD_HEIGHT} rows, got {rows}")]
    TooManyRows { rows: usize },
    #[display("row {row} must have {FIELD_WIDTH} cells, got {len}")]
    RowWidth { row: usize, len: usize },
    #[display("invalid cell {ch:?} at row {row}")]
    InvalidCell { row: usize, ch: char },
}

/// The fixed-size playfield.
///
/// Pure storage: cells are either empty or hold a [`Puyo`]. Accessors take
/// signed coordinates so that callers can pass pair positions directly, but
/// reading or writing outside `[0, W) × [0, H)` is a contract violation that
/// trips a debug assertion (release builds ignore the access).
///
/// # Example
///
/// ```
/// use rensa_engine::{Grid, PuyoColor};
///
/// let mut grid = Grid::EMPTY;
/// assert!(grid.set(0, 11, Some(PuyoColor::Red)));
///
/// let puyo = grid.get(0, 11).unwrap();
/// assert_eq!(puyo.color(), PuyoColor::Red);
/// assert_eq!((puyo.position().x, puyo.position().y), (0, 11));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: [[Cell; FIELD_WIDTH]; FIELD_HEIGHT],
}

impl Default for Grid {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Grid {
    pub const WIDTH: usize = FIELD_WIDTH;
    pub const HEIGHT: usize = FIELD_HEIGHT;

    pub const EMPTY: Self = Self {
        rows: [[None; FIELD_WIDTH]; FIELD_HEIGHT],
    };

    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    #[must_use]
    pub const fn is_inside_bounds(x: i32, y: i32) -> bool {
        x >= 0 && x < FIELD_WIDTH as i32 && y >= 0 && y < FIELD_HEIGHT as i32
    }

    #[expect(clippy::cast_sign_loss)]
    fn index(x: i32, y: i32) -> Option<(usize, usize)> {
        Self::is_inside_bounds(x, y).then_some((x as usize, y as usize))
    }

    /// Returns the occupant at `(x, y)`, or `None` for an empty cell.
    #[must_use]
    pub fn get(&self, x: i32, y: i32) -> Option<Puyo> {
        debug_assert!(
            Self::is_inside_bounds(x, y),
            "grid read out of bounds at ({x}, {y})"
        );
        let (col, row) = Self::index(x, y)?;
        self.rows[row][col]
    }

    /// Writes a puyo of `color` at `(x, y)`, or empties the cell when `color` is `None`.
    ///
    /// Returns `false` without writing when the coordinate is out of bounds.
    pub fn set(&mut self, x: i32, y: i32, color: Option<PuyoColor>) -> bool {
        debug_assert!(
            Self::is_inside_bounds(x, y),
            "grid write out of bounds at ({x}, {y})"
        );
        let Some((col, row)) = Self::index(x, y) else {
            return false;
        };
        self.rows[row][col] = color.map(|color| Puyo {
            color,
            position: Position::new(x, y),
        });
        true
    }

    /// Whether `(x, y)` is inside the grid and empty.
    ///
    /// Unlike [`Self::get`], out-of-bounds coordinates are an ordinary `false`.
    #[must_use]
    pub fn is_empty_at(&self, x: i32, y: i32) -> bool {
        Self::index(x, y).is_some_and(|(col, row)| self.rows[row][col].is_none())
    }

    /// Moves the occupant at `(col, row)` one row down, keeping its stored position in sync.
    ///
    /// The caller guarantees the source is occupied and the target is empty.
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub(crate) fn shift_down(&mut self, col: usize, row: usize) {
        debug_assert!(row + 1 < FIELD_HEIGHT);
        debug_assert!(self.rows[row + 1][col].is_none());
        if let Some(mut puyo) = self.rows[row][col].take() {
            puyo.position = Position::new(col as i32, row as i32 + 1);
            self.rows[row + 1][col] = Some(puyo);
        }
    }

    pub(crate) fn cell(&self, col: usize, row: usize) -> Cell {
        self.rows[row][col]
    }

    /// Returns an iterator over the rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell; FIELD_WIDTH]> {
        self.rows.iter()
    }

    /// Returns every occupant in row-major order.
    pub fn occupied(&self) -> impl Iterator<Item = Puyo> + '_ {
        self.rows.iter().flatten().filter_map(|cell| *cell)
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupied().next().is_none()
    }

    pub fn clear(&mut self) {
        *self = Self::EMPTY;
    }

    /// Builds a grid from text rows using `.` for empty cells and `R`/`B`/`G`/`Y` for colors.
    ///
    /// Rows are listed top to bottom and aligned to the bottom of the field, so a
    /// fixture only has to spell out the rows it cares about.
    ///
    /// ```
    /// use rensa_engine::{Grid, PuyoColor};
    ///
    /// let grid = Grid::from_rows(&["R.....", "RRB..."]).unwrap();
    /// assert_eq!(grid.get(0, 10).map(|p| p.color()), Some(PuyoColor::Red));
    /// assert_eq!(grid.get(2, 11).map(|p| p.color()), Some(PuyoColor::Blue));
    /// assert_eq!(grid.occupied_count(), 4);
    /// ```
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn from_rows(rows: &[&str]) -> Result<Self, GridParseError> {
        if rows.len() > FIELD_HEIGHT {
            return Err(GridParseError::TooManyRows { rows: rows.len() });
        }
        let mut grid = Self::EMPTY;
        let top = FIELD_HEIGHT - rows.len();
        for (i, text) in rows.iter().enumerate() {
            let row = top + i;
            let len = text.chars().count();
            if len != FIELD_WIDTH {
                return Err(GridParseError::RowWidth { row, len });
            }
            for (col, ch) in text.chars().enumerate() {
                let color = match ch {
                    '.' => None,
                    _ => Some(
                        PuyoColor::from_char(ch).ok_or(GridParseError::InvalidCell { row, ch })?,
                    ),
                };
                grid.set(col as i32, row as i32, color);
            }
        }
        Ok(grid)
    }

    /// Renders each row as text, in the format accepted by [`Self::from_rows`].
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.map_or('.', |puyo| puyo.color.as_char()))
                    .collect()
            })
            .collect()
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.to_rows() {
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}
