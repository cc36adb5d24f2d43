// Cell reveal propagation
// Opens a cell and cascades through connected zero cells

use crate::mns_board::{Board, Cell};

/// Result of a single reveal request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Number of non-mine cells that became visible (0 for a no-op)
    Revealed(usize),
    HitMine,
}

/// Reveal `(row, col)` and cascade through zero cells.
///
/// Out-of-bounds, already revealed and flagged cells are left untouched and
/// yield `Revealed(0)`. A mine is marked visible and reported as `HitMine`.
/// A numbered cell opens alone; a zero cell also opens every neighbour under
/// the same rules, so the cascade stops at numbered cells and skips flags.
///
/// `visible` and `flagged` are row-major and must match the board size.
pub fn reveal(board: &Board, visible: &mut [bool], flagged: &[bool], row: usize, col: usize) -> RevealOutcome {
    if !board.in_bounds(row, col) {
        return RevealOutcome::Revealed(0);
    }
    let start = board.index(row, col);
    if visible[start] || flagged[start] {
        return RevealOutcome::Revealed(0);
    }
    if board.cells()[start].is_mine() {
        visible[start] = true;
        return RevealOutcome::HitMine;
    }

    let mut count = 0;
    let mut stack = vec![(row, col)];
    while let Some((r, c)) = stack.pop() {
        let i = board.index(r, c);
        if visible[i] || flagged[i] {
            continue;
        }
        match board.cells()[i] {
            // zero cells have no mine neighbours, so a cascade never lands here
            Cell::Mine => continue,
            Cell::Clear(n) => {
                visible[i] = true;
                count += 1;
                if n == 0 {
                    stack.extend(board.neighbors(r, c).filter(|&(nr, nc)| !visible[board.index(nr, nc)]));
                }
            }
        }
    }
    RevealOutcome::Revealed(count)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grids(board: &Board) -> (Vec<bool>, Vec<bool>) {
        (vec![false; board.len()], vec![false; board.len()])
    }

    #[test]
    fn numbered_cell_opens_alone() {
        let board = Board::from_mines(3, 3, &[(0, 0)]);
        let (mut visible, flagged) = grids(&board);
        assert_eq!(reveal(&board, &mut visible, &flagged, 1, 1), RevealOutcome::Revealed(1));
        assert_eq!(visible.iter().filter(|v| **v).count(), 1);
    }

    #[test]
    fn zero_cell_cascades_to_numbered_border() {
        // mine in the corner: everything but the mine opens
        let board = Board::from_mines(4, 4, &[(3, 3)]);
        let (mut visible, flagged) = grids(&board);
        assert_eq!(reveal(&board, &mut visible, &flagged, 0, 0), RevealOutcome::Revealed(15));
        assert!(!visible[board.index(3, 3)]);
    }

    #[test]
    fn cascade_stops_at_wall_of_numbers() {
        // a column of mines splits the board; the right side stays closed
        let board = Board::from_mines(3, 5, &[(0, 2), (1, 2), (2, 2)]);
        let (mut visible, flagged) = grids(&board);
        assert_eq!(reveal(&board, &mut visible, &flagged, 1, 0), RevealOutcome::Revealed(6));
        for r in 0..3 {
            assert!(visible[board.index(r, 0)]);
            assert!(visible[board.index(r, 1)]);
            assert!(!visible[board.index(r, 3)]);
            assert!(!visible[board.index(r, 4)]);
        }
    }

    #[test]
    fn mine_reports_hit() {
        let board = Board::from_mines(2, 2, &[(0, 0)]);
        let (mut visible, flagged) = grids(&board);
        assert_eq!(reveal(&board, &mut visible, &flagged, 0, 0), RevealOutcome::HitMine);
        assert!(visible[0]);
    }

    #[test]
    fn flagged_and_revealed_are_no_ops() {
        let board = Board::from_mines(3, 3, &[(2, 2)]);
        let (mut visible, mut flagged) = grids(&board);
        flagged[board.index(0, 0)] = true;
        assert_eq!(reveal(&board, &mut visible, &flagged, 0, 0), RevealOutcome::Revealed(0));
        assert!(visible.iter().all(|v| !*v));

        assert_eq!(reveal(&board, &mut visible, &flagged, 1, 1), RevealOutcome::Revealed(1));
        assert_eq!(reveal(&board, &mut visible, &flagged, 1, 1), RevealOutcome::Revealed(0));
    }

    #[test]
    fn cascade_skips_flagged_cells() {
        let board = Board::from_mines(3, 3, &[]);
        let (mut visible, mut flagged) = grids(&board);
        flagged[board.index(2, 2)] = true;
        assert_eq!(reveal(&board, &mut visible, &flagged, 0, 0), RevealOutcome::Revealed(8));
        assert!(!visible[board.index(2, 2)]);
    }

    #[test]
    fn out_of_bounds_is_no_op() {
        let board = Board::from_mines(2, 2, &[]);
        let (mut visible, flagged) = grids(&board);
        assert_eq!(reveal(&board, &mut visible, &flagged, 2, 0), RevealOutcome::Revealed(0));
        assert_eq!(reveal(&board, &mut visible, &flagged, 0, 9), RevealOutcome::Revealed(0));
    }
}
