//! Board: occupancy grid, placement checks, freezing, line clears and explosions.

use crate::piece::Piece;
use crate::shapes::bounds;
use std::collections::VecDeque;
use thiserror::Error;

/// Cell value of an empty square.
pub const EMPTY: u8 = 0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BoardError {
    #[error("board must have at least one row and one column (got {rows}x{cols})")]
    ZeroDimension { rows: usize, cols: usize },
}

/// Full rows and full columns found on the board at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScan {
    pub rows: Vec<usize>,
    pub cols: Vec<usize>,
}

impl LineScan {
    pub fn count(&self) -> usize {
        self.rows.len() + self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() && self.cols.is_empty()
    }
}

/// Playfield grid. `y = 0` is the top row; cell values are colour ids.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    /// grid[y][x]; grid[0] is the top row.
    grid: VecDeque<Vec<u8>>,
}

impl Board {
    pub fn new(rows: usize, cols: usize) -> Result<Self, BoardError> {
        if rows == 0 || cols == 0 {
            return Err(BoardError::ZeroDimension { rows, cols });
        }
        Ok(Self {
            rows,
            cols,
            grid: (0..rows).map(|_| vec![EMPTY; cols]).collect(),
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<u8> {
        self.grid.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        if let Some(cell) = self.grid.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = value;
        }
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        self.grid.get(y).map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        for row in &mut self.grid {
            row.fill(EMPTY);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.grid.iter().all(|row| row.iter().all(|&c| c == EMPTY))
    }

    /// True if every occupied cell of the piece is inside the side and bottom
    /// walls and on an empty square. Cells above the top row are allowed.
    pub fn is_valid_position(&self, piece: &Piece) -> bool {
        piece.board_cells().all(|(x, y)| {
            if x < 0 || x >= self.cols as i32 || y >= self.rows as i32 {
                return false;
            }
            y < 0 || self.get(x as usize, y as usize) == Some(EMPTY)
        })
    }

    /// Write the piece's colour into every covered square. Cells above the
    /// top row are dropped.
    pub fn freeze(&mut self, piece: &Piece) {
        for (x, y) in piece.board_cells() {
            if x >= 0 && y >= 0 {
                self.set(x as usize, y as usize, piece.color);
            }
        }
    }

    /// Full rows and columns, top-to-bottom and left-to-right.
    pub fn scan_lines(&self) -> LineScan {
        let rows = (0..self.rows)
            .filter(|&y| self.grid[y].iter().all(|&c| c != EMPTY))
            .collect();
        let cols = (0..self.cols)
            .filter(|&x| self.grid.iter().all(|row| row[x] != EMPTY))
            .collect();
        LineScan { rows, cols }
    }

    /// Clear every full row and column. Full columns are zeroed in place; full
    /// rows are removed and replaced by empty rows at the top. Returns the
    /// number of rows plus the number of columns cleared.
    pub fn break_lines(&mut self) -> usize {
        let scan = self.scan_lines();
        if scan.is_empty() {
            return 0;
        }
        for &x in &scan.cols {
            for row in &mut self.grid {
                row[x] = EMPTY;
            }
        }
        // Highest index first so earlier indices stay valid.
        for &y in scan.rows.iter().rev() {
            self.grid.remove(y);
        }
        for _ in 0..scan.rows.len() {
            self.grid.push_front(vec![EMPTY; self.cols]);
        }
        scan.count()
    }

    /// Brute-force search for any anchor where the piece fits. Anchors range
    /// over every position that keeps the occupied cells on the board, so
    /// they may be negative. Moves the piece while scanning, so pass a copy.
    pub fn has_space_for_block(&self, piece: &mut Piece) -> bool {
        let (min_r, min_c, max_r, max_c) = bounds(piece.cells()).unwrap_or((0, 0, 0, 0));
        let xs = -i32::from(min_c)..=self.cols as i32 - 1 - i32::from(max_c);
        let ys = -i32::from(min_r)..=self.rows as i32 - 1 - i32::from(max_r);
        for y in ys {
            for x in xs.clone() {
                piece.x = x;
                piece.y = y;
                if self.is_valid_position(piece) {
                    return true;
                }
            }
        }
        false
    }

    /// Board squares within `radius` of the centre, clipped to the board.
    fn blast_cells(&self, center_x: i32, center_y: i32, radius: usize) -> Vec<(usize, usize)> {
        let r = radius as i32;
        let x_lo = (center_x - r).max(0);
        let y_lo = (center_y - r).max(0);
        let x_hi = (center_x + r).min(self.cols as i32 - 1);
        let y_hi = (center_y + r).min(self.rows as i32 - 1);
        (y_lo..=y_hi)
            .flat_map(|y| (x_lo..=x_hi).map(move |x| (x as usize, y as usize)))
            .collect()
    }

    fn occupied_count(&self, cells: &[(usize, usize)]) -> usize {
        cells
            .iter()
            .filter(|&&(x, y)| self.get(x, y).is_some_and(|c| c != EMPTY))
            .count()
    }

    /// Empty the square of side `2 * radius + 1` around the centre, clipped to
    /// the board. Returns how many squares were occupied.
    pub fn explode_area(&mut self, center_x: i32, center_y: i32, radius: usize) -> usize {
        let cells = self.blast_cells(center_x, center_y, radius);
        let cleared = self.occupied_count(&cells);
        for (x, y) in cells {
            self.set(x, y, EMPTY);
        }
        cleared
    }

    /// Detonate a bomb: one explosion per piece cell. Each centre counts the
    /// occupied squares in its area before anything is cleared, so squares
    /// shared by overlapping areas count once per centre. Ordinary pieces do
    /// nothing.
    pub fn explode_bomb(&mut self, piece: &Piece) -> usize {
        if !piece.special {
            return 0;
        }
        let radius = piece.explosion_radius();
        let total = piece
            .board_cells()
            .map(|(x, y)| self.occupied_count(&self.blast_cells(x, y, radius)))
            .sum();
        for (x, y) in piece.board_cells() {
            self.explode_area(x, y, radius);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::ShapeId;

    fn filled(rows: usize, cols: usize) -> Board {
        let mut b = Board::new(rows, cols).unwrap();
        for y in 0..rows {
            for x in 0..cols {
                b.set(x, y, 1);
            }
        }
        b
    }

    #[test]
    fn new_board_is_empty() {
        let b = Board::new(20, 10).unwrap();
        assert_eq!((b.rows(), b.cols()), (20, 10));
        assert!(b.is_empty());
        assert_eq!(b.get(10, 0), None);
        assert_eq!(b.get(0, 20), None);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert_eq!(
            Board::new(0, 10),
            Err(BoardError::ZeroDimension { rows: 0, cols: 10 })
        );
        assert!(Board::new(5, 0).is_err());
    }

    #[test]
    fn valid_position_on_empty_board() {
        let b = Board::new(20, 10).unwrap();
        assert!(b.is_valid_position(&Piece::new(ShapeId::I, 3, 0, 1)));
    }

    #[test]
    fn walls_reject_regardless_of_contents() {
        let b = Board::new(20, 10).unwrap();
        let mut l = Piece::new(ShapeId::L, -1, 0, 1);
        l.rotation = 1;
        assert!(!b.is_valid_position(&l));
        assert!(!b.is_valid_position(&Piece::new(ShapeId::I, 10, 0, 1)));
        assert!(!b.is_valid_position(&Piece::new(ShapeId::I, 3, 20, 1)));
        assert!(!b.is_valid_position(&Piece::new(ShapeId::I, 3, 17, 1)));
        assert!(b.is_valid_position(&Piece::new(ShapeId::I, 3, 16, 1)));
    }

    #[test]
    fn rows_above_the_top_are_allowed() {
        let b = Board::new(20, 10).unwrap();
        assert!(b.is_valid_position(&Piece::new(ShapeId::I, 3, -3, 1)));
        assert!(b.is_valid_position(&Piece::new(ShapeId::I, 3, -10, 1)));
    }

    #[test]
    fn overlap_is_invalid() {
        let mut b = Board::new(20, 10).unwrap();
        let p = Piece::new(ShapeId::I, 4, 5, 1);
        b.freeze(&p);
        assert!(!b.is_valid_position(&p));
    }

    #[test]
    fn freeze_writes_colour() {
        let mut b = Board::new(20, 10).unwrap();
        b.freeze(&Piece::new(ShapeId::I, 4, 5, 2));
        for y in 5..9 {
            assert_eq!(b.get(5, y), Some(2));
        }
        assert_eq!(b.get(4, 5), Some(EMPTY));
    }

    #[test]
    fn freeze_above_the_top_leaves_board_unchanged() {
        let mut b = Board::new(20, 10).unwrap();
        b.freeze(&Piece::new(ShapeId::I, 3, -4, 2));
        assert!(b.is_empty());
    }

    #[test]
    fn freeze_partially_above_the_top() {
        let mut b = Board::new(20, 10).unwrap();
        b.freeze(&Piece::new(ShapeId::I, 3, -1, 2));
        assert_eq!(b.get(4, 0), Some(2));
        assert_eq!(b.get(4, 2), Some(2));
        assert_eq!(b.get(4, 3), Some(EMPTY));
    }

    #[test]
    fn single_row_clear_shifts_rows_down() {
        let mut b = Board::new(5, 5).unwrap();
        for x in 0..5 {
            b.set(x, 2, 1);
        }
        b.set(1, 1, 3);
        assert_eq!(b.break_lines(), 1);
        assert!(b.row(0).unwrap().iter().all(|&c| c == EMPTY));
        assert_eq!(b.get(1, 2), Some(3));
        assert_eq!(b.get(1, 1), Some(EMPTY));
        assert_eq!(b.rows(), 5);
    }

    #[test]
    fn two_row_clear() {
        let mut b = Board::new(5, 5).unwrap();
        for y in [1, 2] {
            for x in 0..5 {
                b.set(x, y, 1);
            }
        }
        assert_eq!(b.break_lines(), 2);
        assert!(b.is_empty());
    }

    #[test]
    fn column_clear_zeroes_in_place() {
        let mut b = Board::new(5, 5).unwrap();
        for y in 0..5 {
            b.set(2, y, 1);
        }
        b.set(0, 4, 4);
        assert_eq!(b.break_lines(), 1);
        assert!((0..5).all(|y| b.get(2, y) == Some(EMPTY)));
        assert_eq!(b.get(0, 4), Some(4));
    }

    #[test]
    fn row_and_column_count_separately() {
        let mut b = Board::new(5, 5).unwrap();
        for i in 0..5 {
            b.set(i, 2, 1);
            b.set(2, i, 1);
        }
        assert_eq!(b.break_lines(), 2);
        assert!(b.row(0).unwrap().iter().all(|&c| c == EMPTY));
        assert!((0..5).all(|y| b.get(2, y) == Some(EMPTY)));
        assert!(b.is_empty());
    }

    #[test]
    fn no_full_lines_leaves_grid_unchanged() {
        let mut b = Board::new(20, 10).unwrap();
        b.set(5, 5, 1);
        b.set(0, 19, 6);
        let before = b.clone();
        assert_eq!(b.break_lines(), 0);
        assert_eq!(b, before);
    }

    #[test]
    fn scan_reports_rows_and_columns() {
        let mut b = Board::new(4, 4).unwrap();
        for i in 0..4 {
            b.set(i, 3, 1);
            b.set(0, i, 1);
        }
        let scan = b.scan_lines();
        assert_eq!(scan.rows, vec![3]);
        assert_eq!(scan.cols, vec![0]);
        assert_eq!(scan.count(), 2);
    }

    #[test]
    fn space_on_empty_board() {
        let b = Board::new(20, 10).unwrap();
        let mut candidate = Piece::new(ShapeId::I, 0, 0, 1);
        assert!(b.has_space_for_block(&mut candidate));
    }

    #[test]
    fn no_space_on_full_board() {
        let b = filled(20, 10);
        for shape in ShapeId::ALL {
            let mut candidate = Piece::new(shape, 0, 0, 1);
            assert!(!b.has_space_for_block(&mut candidate));
        }
    }

    #[test]
    fn space_found_in_single_hole() {
        let mut b = filled(6, 6);
        b.set(5, 5, EMPTY);
        assert!(b.has_space_for_block(&mut Piece::new(ShapeId::Dot, 0, 0, 1)));
        assert!(!b.has_space_for_block(&mut Piece::new(ShapeId::Pill, 0, 0, 1)));
    }

    #[test]
    fn explode_area_clamps_at_corner() {
        let mut b = filled(5, 5);
        assert_eq!(b.explode_area(0, 0, 1), 4);
        assert_eq!(b.get(0, 0), Some(EMPTY));
        assert_eq!(b.get(1, 1), Some(EMPTY));
        assert_eq!(b.get(2, 0), Some(1));
        assert_eq!(b.get(4, 4), Some(1));
    }

    #[test]
    fn explode_area_counts_only_occupied() {
        let mut b = Board::new(5, 5).unwrap();
        b.set(2, 2, 1);
        b.set(3, 3, 1);
        assert_eq!(b.explode_area(2, 2, 1), 2);
        assert!(b.is_empty());
        assert_eq!(b.explode_area(2, 2, 1), 0);
    }

    #[test]
    fn one_cell_bomb_clears_three_by_three() {
        let mut b = filled(5, 5);
        // Dot occupies local (0, 1).
        let bomb = Piece::bomb(ShapeId::Dot, 1, 2, 2);
        assert_eq!(bomb.explosion_radius(), 1);
        assert_eq!(b.explode_bomb(&bomb), 9);
        for y in 1..=3 {
            for x in 1..=3 {
                assert_eq!(b.get(x, y), Some(EMPTY));
            }
        }
        assert_eq!(b.get(0, 2), Some(1));
        assert_eq!(b.get(4, 2), Some(1));
    }

    #[test]
    fn bomb_at_edge_stays_in_bounds() {
        let mut b = filled(5, 5);
        let bomb = Piece::bomb(ShapeId::Dot, 3, 4, 2);
        assert_eq!(b.explode_bomb(&bomb), 4);
        assert_eq!(b.get(3, 4), Some(EMPTY));
        assert_eq!(b.get(4, 3), Some(EMPTY));
        assert_eq!(b.get(2, 3), Some(1));
    }

    #[test]
    fn detonations_sum_per_centre() {
        let mut b = Board::new(6, 6).unwrap();
        b.set(0, 0, 1);
        b.set(3, 1, 1);
        b.set(2, 2, 1);
        // Pill rotation 0 covers (1,0) and (2,0) with the anchor at the origin.
        let bomb = Piece::bomb(ShapeId::Pill, 0, 0, 3);
        assert_eq!(bomb.explosion_radius(), 1);
        // (1,0) reaches (0,0); (2,0) reaches (3,1); row 2 is out of range.
        assert_eq!(b.explode_bomb(&bomb), 2);
        assert_eq!(b.get(2, 2), Some(1));
    }

    #[test]
    fn overlapping_detonations_count_per_centre() {
        let mut b = filled(5, 5);
        // Centres (1,2) and (2,2): two 3x3 areas sharing columns 1..=2.
        let bomb = Piece::bomb(ShapeId::Pill, 0, 2, 3);
        assert_eq!(bomb.explosion_radius(), 1);
        assert_eq!(b.explode_bomb(&bomb), 18);
        for y in 1..=3 {
            for x in 0..=3 {
                assert_eq!(b.get(x, y), Some(EMPTY));
            }
        }
        assert_eq!(b.get(4, 2), Some(1));
        assert_eq!(b.get(1, 0), Some(1));
    }

    #[test]
    fn space_search_reaches_negative_anchors() {
        let mut b = filled(20, 10);
        b.set(0, 19, EMPTY);
        // Dot lives in local column 1, so column 0 needs anchor x = -1.
        let mut dot = Piece::new(ShapeId::Dot, 3, 0, 1);
        assert!(b.has_space_for_block(&mut dot));
        assert_eq!((dot.x, dot.y), (-1, 19));
        b.set(0, 19, 1);
        assert!(!b.has_space_for_block(&mut dot));
    }

    #[test]
    fn ordinary_piece_never_explodes() {
        let mut b = filled(5, 5);
        assert_eq!(b.explode_bomb(&Piece::new(ShapeId::Dot, 1, 1, 1)), 0);
        assert_eq!(b, filled(5, 5));
    }
}
