use super::grid::{FIELD_HEIGHT, FIELD_WIDTH, Grid};

/// Drops every unsupported puyo until nothing can fall, returning the number of single-row moves.
///
/// Each pass sweeps rows from the second-lowest up to the top and moves a puyo
/// one row down whenever the cell beneath it is empty. Passes repeat until one
/// moves nothing, so afterwards no puyo has an empty cell directly below it.
/// Column order and per-column stacking are preserved.
///
/// ```
/// use rensa_engine::{Grid, settle};
///
/// let mut grid = Grid::from_rows(&["R.....", "......", "B....."]).unwrap();
/// assert_eq!(settle(&mut grid), 1);
/// assert_eq!(grid.to_rows()[10..], ["R.....", "B....."]);
/// ```
pub fn settle(grid: &mut Grid) -> usize {
    let mut total = 0;
    loop {
        let moved = sweep(grid);
        if moved == 0 {
            break;
        }
        total += moved;
    }
    total
}

fn sweep(grid: &mut Grid) -> usize {
    let mut moved = 0;
    for row in (0..FIELD_HEIGHT - 1).rev() {
        for col in 0..FIELD_WIDTH {
            if grid.cell(col, row).is_some() && grid.cell(col, row + 1).is_none() {
                grid.shift_down(col, row);
                moved += 1;
            }
        }
    }
    moved
}

/// Whether some puyo rests above an empty cell.
#[must_use]
pub fn has_floating(grid: &Grid) -> bool {
    (0..FIELD_HEIGHT - 1).any(|row| {
        (0..FIELD_WIDTH).any(|col| grid.cell(col, row).is_some() && grid.cell(col, row + 1).is_none())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::grid::{Position, PuyoColor};

    #[test]
    fn test_settled_grid_is_untouched() {
        let mut grid = Grid::from_rows(&["R.....", "BG...Y"]).unwrap();
        let before = grid.clone();
        assert_eq!(settle(&mut grid), 0);
        assert_eq!(grid, before);
    }

    #[test]
    fn test_drops_to_floor() {
        let mut grid = Grid::EMPTY;
        grid.set(4, 0, Some(PuyoColor::Green));
        assert!(has_floating(&grid));

        assert_eq!(settle(&mut grid), 11);
        assert!(!has_floating(&grid));
        let puyo = grid.get(4, 11).unwrap();
        assert_eq!(puyo.color(), PuyoColor::Green);
        assert_eq!(puyo.position(), Position::new(4, 11));
    }

    #[test]
    fn test_column_order_preserved() {
        let mut grid = Grid::from_rows(&[
            "R.....", //
            "......", //
            "G.....", //
            "......", //
            "......", //
            "B.....",
        ])
        .unwrap();
        settle(&mut grid);
        let rows = grid.to_rows();
        assert_eq!(rows[9..], ["R.....", "G.....", "B....."]);
    }

    #[test]
    fn test_idempotent_and_no_floating() {
        let mut grid = Grid::from_rows(&[
            "Y..G..", //
            "......", //
            ".R..B.", //
            "..Y...", //
            "......", //
            "R....B",
        ])
        .unwrap();
        let count = grid.occupied_count();

        settle(&mut grid);
        assert!(!has_floating(&grid));
        assert_eq!(grid.occupied_count(), count);
        for puyo in grid.occupied() {
            let pos = puyo.position();
            assert_eq!(grid.get(pos.x, pos.y), Some(puyo));
        }

        let settled = grid.clone();
        assert_eq!(settle(&mut grid), 0);
        assert_eq!(grid, settled);
    }
}
