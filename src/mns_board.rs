// Minefield layout: mine placement and adjacency counts
// A Board is built once per game and never mutated afterwards

use rand::Rng;

/// A single cell of the minefield
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Mine,
    Clear(u8), // Adjacent mine count (0-8)
}

impl Cell {
    pub fn is_mine(self) -> bool {
        matches!(self, Cell::Mine)
    }
}

/// Row-major grid of cells
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    mines: usize,
    cells: Vec<Cell>,
}

impl Board {
    /// Place `mines` mines uniformly at random and compute adjacency counts.
    ///
    /// Mines are placed by rejection sampling: row and column are drawn
    /// independently and a draw landing on an existing mine is retried.
    ///
    /// Precondition: `mines < rows * cols`. Callers validate the configuration;
    /// a full (or overfull) board would never finish placing.
    pub fn generate<R: Rng + ?Sized>(rows: usize, cols: usize, mines: usize, rng: &mut R) -> Self {
        debug_assert!(rows > 0 && cols > 0, "board must have at least one cell");
        debug_assert!(mines < rows * cols, "mine count must be below cell count");

        let mut mine_mask = vec![false; rows * cols];
        let mut placed = 0;
        while placed < mines {
            let r = rng.gen_range(0..rows);
            let c = rng.gen_range(0..cols);
            let i = r * cols + c;
            if !mine_mask[i] {
                mine_mask[i] = true;
                placed += 1;
            }
        }
        Self::from_mask(rows, cols, &mine_mask)
    }

    /// Build a board from an explicit list of `(row, col)` mine positions.
    /// Out-of-range positions are ignored; duplicates count once.
    pub fn from_mines(rows: usize, cols: usize, mines: &[(usize, usize)]) -> Self {
        let mut mine_mask = vec![false; rows * cols];
        for &(r, c) in mines {
            if r < rows && c < cols {
                mine_mask[r * cols + c] = true;
            }
        }
        Self::from_mask(rows, cols, &mine_mask)
    }

    fn from_mask(rows: usize, cols: usize, mine_mask: &[bool]) -> Self {
        let mut cells = Vec::with_capacity(rows * cols);
        for r in 0..rows {
            for c in 0..cols {
                if mine_mask[r * cols + c] {
                    cells.push(Cell::Mine);
                    continue;
                }
                let adj = neighbors(rows, cols, r, c)
                    .filter(|&(nr, nc)| mine_mask[nr * cols + nc])
                    .count() as u8;
                cells.push(Cell::Clear(adj));
            }
        }
        let mines = mine_mask.iter().filter(|m| **m).count();
        Board { rows, cols, mines, cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn mine_count(&self) -> usize {
        self.mines
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Flat index of `(row, col)`; callers check bounds first
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        if self.in_bounds(row, col) {
            Some(self.cells[self.index(row, col)])
        } else {
            None
        }
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// In-bounds 8-directional neighbours of `(row, col)`
    pub fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        neighbors(self.rows, self.cols, row, col)
    }
}

fn neighbors(rows: usize, cols: usize, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
    let rmin = row.saturating_sub(1);
    let rmax = (row + 1).min(rows.saturating_sub(1));
    let cmin = col.saturating_sub(1);
    let cmax = (col + 1).min(cols.saturating_sub(1));
    (rmin..=rmax)
        .flat_map(move |r| (cmin..=cmax).map(move |c| (r, c)))
        .filter(move |&(r, c)| r != row || c != col)
}
