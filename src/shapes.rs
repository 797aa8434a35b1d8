//! Shape catalog: every piece shape, its rotation states and its draw weight.
//!
//! Cells are `(row, col)` offsets inside the piece's local grid. Standard pieces
//! live in a 4x4 box; nothing here assumes that, so bigger shapes only need
//! more offsets.

/// A cell offset inside a piece's local grid: `(row, col)`.
pub type Offset = (u8, u8);

/// Every shape the factory can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeId {
    I,
    Z,
    S,
    L,
    J,
    T,
    Dot,
    Pill,
    Square2,
    Square3,
    Square4,
    Ring3,
    Ring4,
}

const I_ROTATIONS: &[&[Offset]] = &[
    &[(0, 1), (1, 1), (2, 1), (3, 1)],
    &[(1, 0), (1, 1), (1, 2), (1, 3)],
];

const Z_ROTATIONS: &[&[Offset]] = &[
    &[(1, 0), (1, 1), (2, 1), (2, 2)],
    &[(0, 2), (1, 1), (1, 2), (2, 1)],
];

const S_ROTATIONS: &[&[Offset]] = &[
    &[(1, 2), (1, 3), (2, 1), (2, 2)],
    &[(0, 1), (1, 1), (1, 2), (2, 2)],
];

const L_ROTATIONS: &[&[Offset]] = &[
    &[(0, 1), (0, 2), (1, 1), (2, 1)],
    &[(0, 0), (1, 0), (1, 1), (1, 2)],
    &[(0, 1), (1, 1), (2, 0), (2, 1)],
    &[(1, 0), (1, 1), (1, 2), (2, 2)],
];

const J_ROTATIONS: &[&[Offset]] = &[
    &[(0, 1), (0, 2), (1, 2), (2, 2)],
    &[(1, 1), (1, 2), (1, 3), (2, 1)],
    &[(0, 2), (1, 2), (2, 2), (2, 3)],
    &[(0, 3), (1, 1), (1, 2), (1, 3)],
];

const T_ROTATIONS: &[&[Offset]] = &[
    &[(0, 1), (1, 0), (1, 1), (1, 2)],
    &[(0, 1), (1, 0), (1, 1), (2, 1)],
    &[(1, 0), (1, 1), (1, 2), (2, 1)],
    &[(0, 1), (1, 1), (1, 2), (2, 1)],
];

const DOT_ROTATIONS: &[&[Offset]] = &[&[(0, 1)]];

const PILL_ROTATIONS: &[&[Offset]] = &[&[(0, 1), (0, 2)], &[(0, 1), (1, 1)]];

const SQUARE2_ROTATIONS: &[&[Offset]] = &[&[(0, 1), (0, 2), (1, 1), (1, 2)]];

const SQUARE3_ROTATIONS: &[&[Offset]] = &[&[
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 1),
    (1, 2),
    (2, 0),
    (2, 1),
    (2, 2),
]];

const SQUARE4_ROTATIONS: &[&[Offset]] = &[&[
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (1, 0),
    (1, 1),
    (1, 2),
    (1, 3),
    (2, 0),
    (2, 1),
    (2, 2),
    (2, 3),
    (3, 0),
    (3, 1),
    (3, 2),
    (3, 3),
]];

const RING3_ROTATIONS: &[&[Offset]] = &[&[
    (0, 0),
    (0, 1),
    (0, 2),
    (1, 0),
    (1, 2),
    (2, 0),
    (2, 1),
    (2, 2),
]];

const RING4_ROTATIONS: &[&[Offset]] = &[&[
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (1, 0),
    (1, 3),
    (2, 0),
    (2, 3),
    (3, 0),
    (3, 1),
    (3, 2),
    (3, 3),
]];

impl ShapeId {
    pub const ALL: [Self; 13] = [
        Self::I,
        Self::Z,
        Self::S,
        Self::L,
        Self::J,
        Self::T,
        Self::Dot,
        Self::Pill,
        Self::Square2,
        Self::Square3,
        Self::Square4,
        Self::Ring3,
        Self::Ring4,
    ];

    /// All rotation states, in rotation-index order.
    pub fn rotations(self) -> &'static [&'static [Offset]] {
        match self {
            Self::I => I_ROTATIONS,
            Self::Z => Z_ROTATIONS,
            Self::S => S_ROTATIONS,
            Self::L => L_ROTATIONS,
            Self::J => J_ROTATIONS,
            Self::T => T_ROTATIONS,
            Self::Dot => DOT_ROTATIONS,
            Self::Pill => PILL_ROTATIONS,
            Self::Square2 => SQUARE2_ROTATIONS,
            Self::Square3 => SQUARE3_ROTATIONS,
            Self::Square4 => SQUARE4_ROTATIONS,
            Self::Ring3 => RING3_ROTATIONS,
            Self::Ring4 => RING4_ROTATIONS,
        }
    }

    pub fn rotation_count(self) -> usize {
        self.rotations().len()
    }

    /// Occupied cells for one rotation state. The index wraps, so any
    /// `usize` is accepted.
    pub fn cells(self, rotation: usize) -> &'static [Offset] {
        let rotations = self.rotations();
        rotations[rotation % rotations.len()]
    }

    /// Cells per rotation state. Identical for every rotation of a shape.
    pub fn cell_count(self) -> usize {
        self.cells(0).len()
    }

    /// Relative draw frequency used by the factory.
    pub fn weight(self) -> u32 {
        match self {
            Self::I | Self::Z | Self::S | Self::L | Self::J | Self::T => 10,
            Self::Dot | Self::Pill => 5,
            Self::Square2 => 10,
            Self::Square3 | Self::Ring3 => 3,
            Self::Square4 | Self::Ring4 => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::I => "I",
            Self::Z => "Z",
            Self::S => "S",
            Self::L => "L",
            Self::J => "J",
            Self::T => "T",
            Self::Dot => "1x1",
            Self::Pill => "1x2",
            Self::Square2 => "2x2",
            Self::Square3 => "3x3",
            Self::Square4 => "4x4",
            Self::Ring3 => "3x3 ring",
            Self::Ring4 => "4x4 ring",
        }
    }
}

/// Bounding box of a cell set: `(min_row, min_col, max_row, max_col)`.
/// `None` for an empty set.
pub fn bounds(cells: &[Offset]) -> Option<(u8, u8, u8, u8)> {
    let (&(r0, c0), rest) = cells.split_first()?;
    Some(rest.iter().fold((r0, c0, r0, c0), |(r_lo, c_lo, r_hi, c_hi), &(r, c)| {
        (r_lo.min(r), c_lo.min(c), r_hi.max(r), c_hi.max(c))
    }))
}
