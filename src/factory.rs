//! Piece factory: weighted shape draw, random colour, optional bombs.

use crate::piece::Piece;
use crate::shapes::ShapeId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Colour ids including the reserved empty id 0; pieces get 1..COLOR_COUNT.
pub const COLOR_COUNT: u8 = 7;

pub const SPAWN_X: i32 = 3;
pub const SPAWN_Y: i32 = 0;

#[derive(Debug, Clone)]
pub struct FactoryConfig {
    pub spawn_x: i32,
    pub spawn_y: i32,
    pub color_count: u8,
    /// Probability in 0..=1 that a new piece is a bomb.
    pub bomb_chance: f64,
    /// Fixed seed for a reproducible piece stream.
    pub seed: Option<u64>,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            spawn_x: SPAWN_X,
            spawn_y: SPAWN_Y,
            color_count: COLOR_COUNT,
            bomb_chance: 0.0,
            seed: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PieceFactory {
    rng: StdRng,
    spawn: (i32, i32),
    color_count: u8,
    bomb_chance: f64,
}

impl PieceFactory {
    pub fn new(config: &FactoryConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            rng,
            spawn: (config.spawn_x, config.spawn_y),
            color_count: config.color_count.max(2),
            bomb_chance: config.bomb_chance.clamp(0.0, 1.0),
        }
    }

    pub fn spawn_point(&self) -> (i32, i32) {
        self.spawn
    }

    /// New piece at the spawn point, canonical rotation.
    pub fn create_piece(&mut self) -> Piece {
        let (x, y) = self.spawn;
        self.create_piece_at(x, y)
    }

    pub fn create_piece_at(&mut self, x: i32, y: i32) -> Piece {
        let shape = self.draw_shape();
        let color = self.rng.gen_range(1..self.color_count);
        if self.bomb_chance > 0.0 && self.rng.gen_bool(self.bomb_chance) {
            Piece::bomb(shape, x, y, color)
        } else {
            Piece::new(shape, x, y, color)
        }
    }

    /// New piece for the drag queue: spawn point, random starting rotation.
    pub fn create_queued_piece(&mut self) -> Piece {
        let mut piece = self.create_piece();
        let turns = self.rng.gen_range(0..piece.shape.rotation_count());
        piece.rotate(turns as i32);
        piece
    }

    fn draw_shape(&mut self) -> ShapeId {
        let total: u32 = ShapeId::ALL.iter().map(|s| s.weight()).sum();
        let mut pick = self.rng.gen_range(0..total.max(1));
        for shape in ShapeId::ALL {
            let w = shape.weight();
            if pick < w {
                return shape;
            }
            pick -= w;
        }
        ShapeId::Square2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn seeded(seed: u64) -> PieceFactory {
        PieceFactory::new(&FactoryConfig {
            seed: Some(seed),
            ..FactoryConfig::default()
        })
    }

    #[test]
    fn default_spawn_point() {
        let p = seeded(1).create_piece();
        assert_eq!((p.x, p.y), (3, 0));
        assert_eq!(p.rotation, 0);
        assert!(!p.special);
    }

    #[test]
    fn custom_position() {
        let p = seeded(1).create_piece_at(5, 10);
        assert_eq!((p.x, p.y), (5, 10));
    }

    #[test]
    fn colours_skip_empty() {
        let mut f = seeded(7);
        for _ in 0..500 {
            let c = f.create_piece().color;
            assert!((1..COLOR_COUNT).contains(&c));
        }
    }

    #[test]
    fn queued_rotation_in_range() {
        let mut f = seeded(3);
        for _ in 0..200 {
            let p = f.create_queued_piece();
            assert!(p.rotation < p.shape.rotation_count());
        }
    }

    #[test]
    fn same_seed_same_stream() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..50 {
            assert_eq!(a.create_queued_piece(), b.create_queued_piece());
        }
    }

    #[test]
    fn heavy_shapes_drawn_more_often() {
        let mut f = seeded(11);
        let mut counts: HashMap<ShapeId, u32> = HashMap::new();
        for _ in 0..20_000 {
            *counts.entry(f.create_piece().shape).or_default() += 1;
        }
        assert!(counts[&ShapeId::T] > counts[&ShapeId::Square4] * 4);
        assert!(counts.len() == ShapeId::ALL.len());
    }

    #[test]
    fn bomb_chance_one_makes_only_bombs() {
        let mut f = PieceFactory::new(&FactoryConfig {
            bomb_chance: 1.0,
            seed: Some(5),
            ..FactoryConfig::default()
        });
        assert!((0..20).all(|_| f.create_piece().special));
    }
}
