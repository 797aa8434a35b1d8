//! Piece: a shape at a rotation, anchored on the board, with a colour.

use crate::shapes::{Offset, ShapeId};

/// Largest area a bomb can clear around each of its cells.
const MAX_EXPLOSION_RADIUS: usize = 4;

/// Free-floating display position of a piece while it is dragged, in board
/// cell units relative to the board's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPos {
    pub x: f32,
    pub y: f32,
}

/// Active or queued piece. Position and rotation are changed without any
/// checks; the board decides whether the result is legal.
#[derive(Debug, Clone, PartialEq)]
pub struct Piece {
    pub shape: ShapeId,
    pub rotation: usize,
    /// Anchor (top-left of the local grid) in board columns.
    pub x: i32,
    /// Anchor in board rows; may be negative while spawning.
    pub y: i32,
    /// Colour id, 1.. (0 is the empty cell).
    pub color: u8,
    /// Bomb pieces explode instead of freezing.
    pub special: bool,
    /// Set only while the piece follows the pointer in drag mode.
    pub screen: Option<ScreenPos>,
}

impl Piece {
    pub fn new(shape: ShapeId, x: i32, y: i32, color: u8) -> Self {
        Self {
            shape,
            rotation: 0,
            x,
            y,
            color,
            special: false,
            screen: None,
        }
    }

    pub fn bomb(shape: ShapeId, x: i32, y: i32, color: u8) -> Self {
        Self {
            special: true,
            ..Self::new(shape, x, y, color)
        }
    }

    pub fn move_by(&mut self, dx: i32, dy: i32) {
        self.x += dx;
        self.y += dy;
    }

    /// Rotate by `times` steps; negative values rotate backwards.
    pub fn rotate(&mut self, times: i32) {
        let count = self.shape.rotation_count() as i32;
        let next = (self.rotation as i32 + times).rem_euclid(count);
        self.rotation = next as usize;
    }

    pub fn undo_rotate(&mut self) {
        self.rotate(-1);
    }

    /// Local occupied cells for the current rotation.
    pub fn cells(&self) -> &'static [Offset] {
        self.shape.cells(self.rotation)
    }

    /// Occupied cells in board coordinates, as `(x, y)` = `(col, row)`.
    pub fn board_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.cells()
            .iter()
            .map(move |&(row, col)| (self.x + i32::from(col), self.y + i32::from(row)))
    }

    pub fn cell_count(&self) -> usize {
        self.cells().len()
    }

    /// Half the cell count rounded up, clamped to 1..=4. Zero for ordinary pieces.
    pub fn explosion_radius(&self) -> usize {
        if !self.special {
            return 0;
        }
        self.cell_count().div_ceil(2).clamp(1, MAX_EXPLOSION_RADIUS)
    }

    /// Screen position, or the origin when the piece is not being dragged.
    pub fn screen_pos(&self) -> ScreenPos {
        self.screen.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_translates_anchor() {
        let mut p = Piece::new(ShapeId::T, 3, 5, 1);
        p.move_by(2, 3);
        assert_eq!((p.x, p.y), (5, 8));
        p.move_by(-7, -9);
        assert_eq!((p.x, p.y), (-2, -1));
    }

    #[test]
    fn full_turn_returns_to_start() {
        for shape in ShapeId::ALL {
            let mut p = Piece::new(shape, 0, 0, 1);
            for _ in 0..shape.rotation_count() {
                p.rotate(1);
            }
            assert_eq!(p.rotation, 0, "{}", shape.name());
        }
    }

    #[test]
    fn undo_rotate_restores_index() {
        for shape in ShapeId::ALL {
            let mut p = Piece::new(shape, 0, 0, 1);
            p.rotate(1);
            p.undo_rotate();
            assert_eq!(p.rotation, 0);
        }
    }

    #[test]
    fn undo_rotate_wraps_backwards() {
        let mut p = Piece::new(ShapeId::L, 0, 0, 1);
        p.undo_rotate();
        assert_eq!(p.rotation, 3);
        p.rotate(-9);
        assert_eq!(p.rotation, 2);
    }

    #[test]
    fn board_cells_follow_anchor_and_rotation() {
        let mut p = Piece::new(ShapeId::I, 4, 5, 2);
        let cells: Vec<_> = p.board_cells().collect();
        assert_eq!(cells, vec![(5, 5), (5, 6), (5, 7), (5, 8)]);
        p.rotate(1);
        let cells: Vec<_> = p.board_cells().collect();
        assert_eq!(cells, vec![(4, 6), (5, 6), (6, 6), (7, 6)]);
    }

    #[test]
    fn explosion_radius_from_cell_count() {
        assert_eq!(Piece::new(ShapeId::Square4, 0, 0, 1).explosion_radius(), 0);
        assert_eq!(Piece::bomb(ShapeId::Dot, 0, 0, 1).explosion_radius(), 1);
        assert_eq!(Piece::bomb(ShapeId::Pill, 0, 0, 1).explosion_radius(), 1);
        assert_eq!(Piece::bomb(ShapeId::T, 0, 0, 1).explosion_radius(), 2);
        assert_eq!(Piece::bomb(ShapeId::Square3, 0, 0, 1).explosion_radius(), 4);
        assert_eq!(Piece::bomb(ShapeId::Square4, 0, 0, 1).explosion_radius(), 4);
    }

    #[test]
    fn clone_carries_screen_position_only_when_set() {
        let mut p = Piece::new(ShapeId::S, 5, 10, 3);
        p.rotation = 1;
        let plain = p.clone();
        assert_eq!(plain.screen_pos(), ScreenPos::default());

        p.screen = Some(ScreenPos { x: 10.0, y: 20.0 });
        let copied = p.clone();
        assert_eq!(copied, p);
        assert_eq!(copied.screen_pos(), ScreenPos { x: 10.0, y: 20.0 });
    }
}
