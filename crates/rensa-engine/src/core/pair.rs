use serde::{Deserialize, Serialize};

use super::grid::{FIELD_HEIGHT, FIELD_WIDTH, Grid, Position, PuyoColor};

/// Pivot position of a freshly spawned pair.
///
/// The secondary cell starts directly above it, one row outside the field.
pub const PAIR_SPAWN_POSITION: Position = Position::new(2, 0);

/// One of the two cells of a falling pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PairCell {
    pub position: Position,
    pub color: PuyoColor,
}

/// Direction of a single rotation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum RotateDirection {
    /// Counterclockwise (`-1`).
    Left,
    /// Clockwise (`+1`).
    Right,
}

impl RotateDirection {
    /// Parses a signed rotation step; only `-1` and `+1` are valid.
    #[must_use]
    pub const fn from_delta(delta: i32) -> Option<Self> {
        match delta {
            -1 => Some(Self::Left),
            1 => Some(Self::Right),
            _ => None,
        }
    }

    #[must_use]
    pub const fn delta(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Rotation state of a pair.
///
/// Selects where the secondary cell sits relative to the pivot:
///
/// - `0`: above (spawn orientation)
/// - `1`: right
/// - `2`: below
/// - `3`: left
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PairRotation(u8);

impl PairRotation {
    pub const UP: Self = Self(0);
    pub const RIGHT: Self = Self(1);
    pub const DOWN: Self = Self(2);
    pub const LEFT: Self = Self(3);

    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated(self, direction: RotateDirection) -> Self {
        match direction {
            RotateDirection::Left => Self((self.0 + 3) % 4),
            RotateDirection::Right => Self((self.0 + 1) % 4),
        }
    }

    /// Offset of the secondary cell from the pivot.
    #[must_use]
    pub const fn secondary_offset(self) -> (i32, i32) {
        match self.0 {
            0 => (0, -1),
            1 => (1, 0),
            2 => (0, 1),
            _ => (-1, 0),
        }
    }
}

/// The falling pair: a pivot cell and a secondary cell orbiting it.
///
/// The two cells are always orthogonally adjacent. Every mutation is checked
/// against the grid first and applied only when legal, so a failed move or
/// rotation leaves the pair exactly as it was.
///
/// # Example
///
/// ```
/// use rensa_engine::{Grid, PuyoColor, PuyoPair, RotateDirection};
///
/// let grid = Grid::EMPTY;
/// let mut pair = PuyoPair::new(PuyoColor::Red, PuyoColor::Blue);
///
/// assert!(pair.move_by(-1, 0, &grid));
/// assert!(pair.rotate(RotateDirection::Right, &grid));
/// assert_eq!(pair.secondary().position.x, pair.pivot().position.x + 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PuyoPair {
    pivot: PairCell,
    secondary: PairCell,
    rotation: PairRotation,
}

impl PuyoPair {
    /// Creates a pair at the spawn position in the spawn orientation.
    #[must_use]
    pub fn new(pivot_color: PuyoColor, secondary_color: PuyoColor) -> Self {
        Self::with_rotation(
            PAIR_SPAWN_POSITION,
            PairRotation::default(),
            pivot_color,
            secondary_color,
        )
    }

    #[must_use]
    pub fn with_rotation(
        pivot: Position,
        rotation: PairRotation,
        pivot_color: PuyoColor,
        secondary_color: PuyoColor,
    ) -> Self {
        let (dx, dy) = rotation.secondary_offset();
        Self {
            pivot: PairCell {
                position: pivot,
                color: pivot_color,
            },
            secondary: PairCell {
                position: pivot.offset(dx, dy),
                color: secondary_color,
            },
            rotation,
        }
    }

    #[must_use]
    pub fn pivot(&self) -> PairCell {
        self.pivot
    }

    #[must_use]
    pub fn secondary(&self) -> PairCell {
        self.secondary
    }

    #[must_use]
    pub fn rotation(&self) -> PairRotation {
        self.rotation
    }

    #[must_use]
    pub fn cells(&self) -> [PairCell; 2] {
        [self.pivot, self.secondary]
    }

    /// Whether both cells could sit at their current position shifted by `(dx, dy)`.
    ///
    /// Cells must stay within the side walls and above the floor. There is no
    /// ceiling: cells above the field (`y < 0`) never collide with anything.
    /// Offsets that overflow the coordinate range are never free.
    #[must_use]
    pub fn can_occupy(&self, dx: i32, dy: i32, grid: &Grid) -> bool {
        self.cells().iter().all(|cell| {
            cell.position
                .checked_offset(dx, dy)
                .is_some_and(|pos| is_free(grid, pos))
        })
    }

    /// Translates both cells by `(dx, dy)` if the target is free.
    pub fn move_by(&mut self, dx: i32, dy: i32, grid: &Grid) -> bool {
        if !self.can_occupy(dx, dy, grid) {
            return false;
        }
        self.pivot.position = self.pivot.position.offset(dx, dy);
        self.secondary.position = self.secondary.position.offset(dx, dy);
        true
    }

    /// Rotates the secondary cell one step around the pivot.
    ///
    /// No kicks are attempted: when the rotated position is blocked the
    /// rotation fails and the pair is unchanged.
    pub fn rotate(&mut self, direction: RotateDirection, grid: &Grid) -> bool {
        let candidate = self.rotated(direction);
        if !candidate.can_occupy(0, 0, grid) {
            return false;
        }
        *self = candidate;
        true
    }

    #[must_use]
    fn rotated(&self, direction: RotateDirection) -> Self {
        Self::with_rotation(
            self.pivot.position,
            self.rotation.rotated(direction),
            self.pivot.color,
            self.secondary.color,
        )
    }

    /// Returns where the pair would come to rest if it kept falling.
    #[must_use]
    pub fn drop_position(&self, grid: &Grid) -> Self {
        let mut dropped = *self;
        while dropped.move_by(0, 1, grid) {}
        dropped
    }

    /// Writes the pair's cells into the grid and returns how many were written.
    ///
    /// Cells still above the field (`y < 0`) are discarded.
    pub fn lock_into(&self, grid: &mut Grid) -> usize {
        self.cells()
            .iter()
            .filter(|cell| Grid::is_inside_bounds(cell.position.x, cell.position.y))
            .filter(|cell| grid.set(cell.position.x, cell.position.y, Some(cell.color)))
            .count()
    }
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
fn is_free(grid: &Grid, pos: Position) -> bool {
    if pos.x < 0 || pos.x >= FIELD_WIDTH as i32 || pos.y >= FIELD_HEIGHT as i32 {
        return false;
    }
    pos.y < 0 || grid.is_empty_at(pos.x, pos.y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> PuyoPair {
        PuyoPair::new(PuyoColor::Red, PuyoColor::Green)
    }

    fn assert_adjacent(pair: &PuyoPair) {
        let distance = pair
            .pivot()
            .position
            .manhattan_distance(pair.secondary().position);
        assert_eq!(distance, 1, "pair cells must stay adjacent: {pair:?}");
    }

    #[test]
    fn test_spawn_layout() {
        let pair = pair();
        assert_eq!(pair.pivot().position, Position::new(2, 0));
        assert_eq!(pair.secondary().position, Position::new(2, -1));
        assert_eq!(pair.rotation(), PairRotation::UP);
        assert_eq!(pair.pivot().color, PuyoColor::Red);
        assert_eq!(pair.secondary().color, PuyoColor::Green);
    }

    #[test]
    fn test_rotation_offsets() {
        let grid = Grid::EMPTY;
        let mut pair = pair();
        pair.move_by(0, 3, &grid);

        let expected = [
            (PairRotation::RIGHT, (1, 0)),
            (PairRotation::DOWN, (0, 1)),
            (PairRotation::LEFT, (-1, 0)),
            (PairRotation::UP, (0, -1)),
        ];
        for (rotation, (dx, dy)) in expected {
            assert!(pair.rotate(RotateDirection::Right, &grid));
            assert_eq!(pair.rotation(), rotation);
            assert_eq!(
                pair.secondary().position,
                pair.pivot().position.offset(dx, dy)
            );
            assert_adjacent(&pair);
        }
    }

    #[test]
    fn test_rotation_is_reversible_when_open() {
        let grid = Grid::EMPTY;
        let mut pair = pair();
        pair.move_by(0, 5, &grid);
        let original = pair;

        assert!(pair.rotate(RotateDirection::Right, &grid));
        assert!(pair.rotate(RotateDirection::Left, &grid));
        assert_eq!(pair, original);

        assert!(pair.rotate(RotateDirection::Left, &grid));
        assert_eq!(pair.rotation(), PairRotation::LEFT);
        assert!(pair.rotate(RotateDirection::Right, &grid));
        assert_eq!(pair, original);
    }

    #[test]
    fn test_blocked_rotation_leaves_pair_unchanged() {
        let grid = Grid::from_rows(&["...R.."]).unwrap();
        let mut pair = PuyoPair::with_rotation(
            Position::new(2, 11),
            PairRotation::UP,
            PuyoColor::Blue,
            PuyoColor::Blue,
        );
        let before = pair;

        // Right is occupied by a red puyo; no kick to another offset is tried.
        assert!(!pair.rotate(RotateDirection::Right, &grid));
        assert_eq!(pair, before);

        // Below is the floor.
        let mut down = PuyoPair::with_rotation(
            Position::new(0, 11),
            PairRotation::RIGHT,
            PuyoColor::Blue,
            PuyoColor::Blue,
        );
        let before = down;
        assert!(!down.rotate(RotateDirection::Right, &grid));
        assert_eq!(down, before);
    }

    #[test]
    fn test_rotation_against_wall_fails() {
        let grid = Grid::EMPTY;
        let mut pair = pair();
        while pair.move_by(-1, 0, &grid) {}
        assert_eq!(pair.pivot().position.x, 0);

        let before = pair;
        assert!(!pair.rotate(RotateDirection::Left, &grid));
        assert_eq!(pair, before);
        assert!(pair.rotate(RotateDirection::Right, &grid));
    }

    #[test]
    fn test_can_occupy_ignores_cells_above_field() {
        let mut grid = Grid::EMPTY;
        for y in 0..FIELD_HEIGHT as i32 {
            grid.set(3, y, Some(PuyoColor::Yellow));
        }
        let pair = pair();
        // The secondary at y = -1 never collides, but the pivot row is checked.
        assert!(pair.can_occupy(0, 0, &grid));
        assert!(!pair.can_occupy(1, 0, &grid));
        assert!(pair.can_occupy(0, -5, &grid));
    }

    #[test]
    fn test_can_occupy_bounds() {
        let grid = Grid::EMPTY;
        let pair = pair();
        assert!(pair.can_occupy(-2, 0, &grid));
        assert!(!pair.can_occupy(-3, 0, &grid));
        assert!(pair.can_occupy(3, 0, &grid));
        assert!(!pair.can_occupy(4, 0, &grid));
        assert!(pair.can_occupy(0, 11, &grid));
        assert!(!pair.can_occupy(0, 12, &grid));
    }

    #[test]
    fn test_failed_move_is_noop() {
        let grid = Grid::from_rows(&["..G..."]).unwrap();
        let mut pair = pair();
        assert!(pair.move_by(0, 10, &grid));
        let before = pair;
        assert!(!pair.move_by(0, 1, &grid));
        assert_eq!(pair, before);
    }

    #[test]
    fn test_overflowing_offsets_are_rejected() {
        let grid = Grid::EMPTY;
        let mut pair = pair();
        let before = pair;
        assert!(!pair.move_by(i32::MAX, 0, &grid));
        assert!(!pair.move_by(i32::MIN, 0, &grid));
        assert!(!pair.move_by(0, i32::MAX, &grid));
        assert!(!pair.can_occupy(0, i32::MIN, &grid));
        assert_eq!(pair, before);
    }

    #[test]
    fn test_drop_position_and_lock() {
        let mut grid = Grid::from_rows(&["..B...", "..B..."]).unwrap();
        let pair = pair().drop_position(&grid);
        assert_eq!(pair.pivot().position, Position::new(2, 9));
        assert_eq!(pair.secondary().position, Position::new(2, 8));

        assert_eq!(pair.lock_into(&mut grid), 2);
        assert_eq!(grid.get(2, 9).map(|p| p.color()), Some(PuyoColor::Red));
        assert_eq!(grid.get(2, 8).map(|p| p.color()), Some(PuyoColor::Green));
    }

    #[test]
    fn test_lock_discards_cells_above_field() {
        let mut grid = Grid::EMPTY;
        let pair = pair();
        assert_eq!(pair.lock_into(&mut grid), 1);
        assert_eq!(grid.occupied_count(), 1);
        assert_eq!(grid.get(2, 0).map(|p| p.color()), Some(PuyoColor::Red));
    }

    #[test]
    fn test_rotate_direction_from_delta() {
        assert_eq!(RotateDirection::from_delta(-1), Some(RotateDirection::Left));
        assert_eq!(RotateDirection::from_delta(1), Some(RotateDirection::Right));
        assert_eq!(RotateDirection::from_delta(0), None);
        assert_eq!(RotateDirection::from_delta(2), None);
        assert_eq!(RotateDirection::Left.delta(), -1);
    }
}
