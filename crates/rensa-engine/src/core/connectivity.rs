use arrayvec::ArrayVec;
use serde::Serialize;

use super::grid::{FIELD_HEIGHT, FIELD_WIDTH, Grid, Position, PuyoColor};

/// Minimum size of a same-color group that gets cleared.
pub const CLEAR_THRESHOLD: usize = 4;

const CELL_COUNT: usize = FIELD_WIDTH * FIELD_HEIGHT;

/// A maximal set of orthogonally connected puyos of one color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Group {
    pub color: PuyoColor,
    /// Cells in discovery order; the first one is the group's top-left-most cell.
    pub cells: Vec<Position>,
}

impl Group {
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn contains(&self, pos: Position) -> bool {
        self.cells.contains(&pos)
    }
}

/// Returns every connected component of the grid, clearable or not.
///
/// Components are reported in row-major order of their first cell, and each
/// occupied cell belongs to exactly one component.
#[must_use]
pub fn find_components(grid: &Grid) -> Vec<Group> {
    let mut visited = [[false; FIELD_WIDTH]; FIELD_HEIGHT];
    let mut components = vec![];

    for row in 0..FIELD_HEIGHT {
        for col in 0..FIELD_WIDTH {
            if visited[row][col] {
                continue;
            }
            let Some(puyo) = grid.cell(col, row) else {
                continue;
            };
            components.push(flood_fill(grid, &mut visited, col, row, puyo.color()));
        }
    }

    components
}

/// Returns the groups of at least [`CLEAR_THRESHOLD`] puyos.
///
/// ```
/// use rensa_engine::{Grid, PuyoColor, find_groups};
///
/// let grid = Grid::from_rows(&["R.....", "RRR.B."]).unwrap();
/// let groups = find_groups(&grid);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].color, PuyoColor::Red);
/// assert_eq!(groups[0].len(), 4);
/// ```
#[must_use]
pub fn find_groups(grid: &Grid) -> Vec<Group> {
    find_components(grid)
        .into_iter()
        .filter(|group| group.len() >= CLEAR_THRESHOLD)
        .collect()
}

#[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn flood_fill(
    grid: &Grid,
    visited: &mut [[bool; FIELD_WIDTH]; FIELD_HEIGHT],
    col: usize,
    row: usize,
    color: PuyoColor,
) -> Group {
    // Every cell is pushed at most once, so the stack never exceeds the field size.
    let mut stack = ArrayVec::<Position, CELL_COUNT>::new();
    let mut cells = vec![];

    visited[row][col] = true;
    stack.push(Position::new(col as i32, row as i32));

    while let Some(pos) = stack.pop() {
        cells.push(pos);
        for next in pos.neighbors() {
            if !Grid::is_inside_bounds(next.x, next.y) {
                continue;
            }
            let (nc, nr) = (next.x as usize, next.y as usize);
            if visited[nr][nc] {
                continue;
            }
            if grid.cell(nc, nr).is_some_and(|puyo| puyo.color() == color) {
                visited[nr][nc] = true;
                stack.push(next);
            }
        }
    }

    Group { color, cells }
}
