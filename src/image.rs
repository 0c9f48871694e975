use core::fmt;
use core::ops::{BitAnd, BitOr, Not};
use serde::{Deserialize, Serialize};

use crate::{GameError, Result};

/// Cells per side of a puzzle board.
pub const BOARD_SIDE: u32 = 5;

/// Total cells on a puzzle board.
pub const BOARD_CELLS: u32 = BOARD_SIDE * BOARD_SIDE;

const TOP_ROW: u32 = 0x1F;
const BOTTOM_ROW: u32 = TOP_ROW << ((BOARD_SIDE - 1) * BOARD_SIDE);
const LEFT_COL: u32 = 0x0108421;
const RIGHT_COL: u32 = LEFT_COL << (BOARD_SIDE - 1);

/// Occupancy of a 5x5 board packed into 25 bits.
///
/// Bit index is `row * 5 + col`, row-major, bit 0 at the top-left corner.
/// Equality and hashing are on the raw bits.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BoardImage(u32);

impl BoardImage {
    /// Board with no filled cells.
    pub const EMPTY: Self = Self(0);

    /// Board with all 25 cells filled.
    pub const FULL: Self = Self((1 << BOARD_CELLS) - 1);

    pub const fn new(raw: u32) -> Result<Self> {
        if raw <= Self::FULL.0 {
            Ok(Self(raw))
        } else {
            Err(GameError::InvalidBoardImage)
        }
    }

    pub(crate) const fn new_unchecked(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn count_filled_cells(self) -> u32 {
        self.0.count_ones()
    }

    pub const fn count_empty_cells(self) -> u32 {
        BOARD_CELLS - self.count_filled_cells()
    }

    /// Shift the pattern one row up, unless the top row holds a filled cell.
    pub const fn move_up(self) -> Self {
        if self.0 & TOP_ROW != 0 {
            self
        } else {
            Self(self.0 >> BOARD_SIDE)
        }
    }

    /// Shift the pattern one row down, unless the bottom row holds a filled cell.
    pub const fn move_down(self) -> Self {
        if self.0 & BOTTOM_ROW != 0 {
            self
        } else {
            Self(self.0 << BOARD_SIDE)
        }
    }

    /// Shift the pattern one column left, unless the left column holds a filled cell.
    ///
    /// With the left column empty no bit can wrap into the previous row, so a
    /// plain shift is exact.
    pub const fn move_left(self) -> Self {
        if self.0 & LEFT_COL != 0 {
            self
        } else {
            Self(self.0 >> 1)
        }
    }

    /// Shift the pattern one column right, unless the right column holds a filled cell.
    pub const fn move_right(self) -> Self {
        if self.0 & RIGHT_COL != 0 {
            self
        } else {
            Self(self.0 << 1)
        }
    }

    /// Quarter turn clockwise: cell (row, col) moves to (col, 4 - row).
    pub fn rotate_right(self) -> Self {
        self.remap(|row, col| (col, BOARD_SIDE - 1 - row))
    }

    /// Quarter turn counter-clockwise: cell (row, col) moves to (4 - col, row).
    pub fn rotate_left(self) -> Self {
        self.remap(|row, col| (BOARD_SIDE - 1 - col, row))
    }

    /// Mirror across the vertical axis: cell (row, col) moves to (row, 4 - col).
    pub fn flip_horizontally(self) -> Self {
        self.remap(|row, col| (row, BOARD_SIDE - 1 - col))
    }

    /// Mirror across the horizontal axis: cell (row, col) moves to (4 - row, col).
    pub fn flip_vertically(self) -> Self {
        self.remap(|row, col| (BOARD_SIDE - 1 - row, col))
    }

    fn remap(self, dest: fn(u32, u32) -> (u32, u32)) -> Self {
        let mut out = 0;
        for idx in 0..BOARD_CELLS {
            if self.0 & (1 << idx) != 0 {
                let (row, col) = dest(idx / BOARD_SIDE, idx % BOARD_SIDE);
                out |= 1 << (row * BOARD_SIDE + col);
            }
        }
        Self(out)
    }

    /// Slide the pattern flush against the top edge, then the left edge.
    ///
    /// Idempotent; the empty image is its own fixed point.
    pub const fn to_top_left_corner(self) -> Self {
        let mut image = self;
        while image.0 & TOP_ROW == 0 && image.0 != 0 {
            image = image.move_up();
        }
        while image.0 & LEFT_COL == 0 && image.0 != 0 {
            image = image.move_left();
        }
        image
    }
}

impl BitAnd for BoardImage {
    type Output = BoardImage;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for BoardImage {
    type Output = BoardImage;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

/// Plain bit complement, deliberately not clamped to 25 bits; mask with
/// [`BoardImage::FULL`] when a board-sized complement is wanted.
impl Not for BoardImage {
    type Output = BoardImage;

    fn not(self) -> Self::Output {
        Self(!self.0)
    }
}

impl TryFrom<u32> for BoardImage {
    type Error = GameError;

    fn try_from(raw: u32) -> Result<Self> {
        Self::new(raw)
    }
}

impl From<BoardImage> for u32 {
    fn from(image: BoardImage) -> u32 {
        image.0
    }
}

impl fmt::Display for BoardImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIDE {
            for col in 0..BOARD_SIDE {
                let filled = self.0 & (1 << (row * BOARD_SIDE + col)) != 0;
                f.write_str(if filled { "#" } else { "." })?;
            }
            if row + 1 < BOARD_SIDE {
                f.write_str("\n")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(raw: u32) -> BoardImage {
        BoardImage::new(raw).unwrap()
    }

    /// Deterministic sample spread over the whole 25-bit domain.
    fn samples() -> impl Iterator<Item = BoardImage> {
        (0..(1u32 << BOARD_CELLS)).step_by(9973).map(image)
    }

    #[test]
    fn construction_rejects_out_of_range_values() {
        assert!(BoardImage::new(0).is_ok());
        assert!(BoardImage::new((1 << 25) - 1).is_ok());
        assert_eq!(BoardImage::new(1 << 25), Err(GameError::InvalidBoardImage));
        assert_eq!(BoardImage::new(u32::MAX), Err(GameError::InvalidBoardImage));
    }

    #[test]
    fn cell_counts_are_complementary() {
        for img in samples() {
            assert_eq!(img.count_filled_cells() + img.count_empty_cells(), 25);
        }
        assert_eq!(BoardImage::EMPTY.count_empty_cells(), 25);
        assert_eq!(BoardImage::FULL.count_filled_cells(), 25);
    }

    #[test]
    fn not_is_unclamped_until_masked() {
        let complement = !BoardImage::EMPTY;
        assert_ne!(complement, BoardImage::FULL);
        assert_eq!(complement & BoardImage::FULL, BoardImage::FULL);
    }

    #[test]
    fn four_right_rotations_are_identity() {
        for img in samples() {
            let rotated = img.rotate_right().rotate_right().rotate_right().rotate_right();
            assert_eq!(rotated, img);
        }
    }

    #[test]
    fn rotate_left_inverts_rotate_right() {
        for img in samples() {
            assert_eq!(img.rotate_right().rotate_left(), img);
        }
    }

    #[test]
    fn double_flips_are_identity() {
        for img in samples() {
            assert_eq!(img.flip_horizontally().flip_horizontally(), img);
            assert_eq!(img.flip_vertically().flip_vertically(), img);
        }
    }

    #[test]
    fn rotate_right_moves_top_left_cell() {
        // Single cell at (0, 0) ends up at (0, 4).
        assert_eq!(image(1).rotate_right(), image(1 << 4));
        // And at (4, 4) after a second turn.
        assert_eq!(image(1).rotate_right().rotate_right(), image(1 << 24));
    }

    #[test]
    fn moves_stop_at_the_boundary() {
        let top_left = image(1);
        assert_eq!(top_left.move_up(), top_left);
        assert_eq!(top_left.move_left(), top_left);
        assert_eq!(top_left.move_right(), image(2));
        assert_eq!(top_left.move_down(), image(1 << 5));

        let bottom_right = image(1 << 24);
        assert_eq!(bottom_right.move_down(), bottom_right);
        assert_eq!(bottom_right.move_right(), bottom_right);
    }

    #[test]
    fn blocked_move_is_a_noop_for_the_whole_pattern() {
        // Cells at (0, 0) and (2, 2): the top row is occupied, so the whole
        // image stays put even though the other cell could move.
        let img = image(1 | (1 << 12));
        assert_eq!(img.move_up(), img);
    }

    #[test]
    fn normalization_reaches_the_corner_and_is_idempotent() {
        // Domino at (3, 2)-(3, 3).
        let img = image((1 << 17) | (1 << 18));
        let normalized = img.to_top_left_corner();
        assert_eq!(normalized, image(0b11));
        assert_eq!(normalized.to_top_left_corner(), normalized);

        for img in samples() {
            let once = img.to_top_left_corner();
            assert_eq!(once.to_top_left_corner(), once);
        }
    }

    #[test]
    fn normalization_of_empty_image_is_empty() {
        assert_eq!(BoardImage::EMPTY.to_top_left_corner(), BoardImage::EMPTY);
    }

    #[test]
    fn serde_rejects_out_of_range_raw_values() {
        let img: BoardImage = serde_json::from_str("33554431").unwrap();
        assert_eq!(img, BoardImage::FULL);
        assert!(serde_json::from_str::<BoardImage>("33554432").is_err());

        let json = serde_json::to_string(&image(0b11)).unwrap();
        assert_eq!(json, "3");
    }

    #[test]
    fn display_draws_the_grid() {
        let img = image(0b111);
        let drawn = alloc::format!("{img}");
        assert_eq!(drawn, "###..\n.....\n.....\n.....\n.....");
    }
}
