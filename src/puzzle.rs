use core::fmt;
use serde::{Deserialize, Serialize};

use crate::{BoardImage, SHAPE_COUNT, TetrominoShape};

/// Process-unique puzzle identifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PuzzleId(u32);

impl fmt::Display for PuzzleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "puzzle#{}", self.0)
    }
}

/// Hands out monotonically increasing puzzle ids.
///
/// Owned by the composition root and threaded through deck setup, so id
/// assignment stays deterministic under test.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PuzzleIdAllocator {
    next: u32,
}

impl PuzzleIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> PuzzleId {
        let id = PuzzleId(self.next);
        self.next += 1;
        id
    }
}

/// Deck a puzzle belongs to; black puzzles also drive the end-game cadence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PuzzleColor {
    White,
    Black,
}

/// Outcome of placing a piece on a puzzle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PlacementOutcome {
    Placed,
    Completed,
}

impl PlacementOutcome {
    pub const fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// A puzzle card being filled in: a 5x5 target pattern whose empty cells
/// players cover with pieces.
///
/// The image only ever grows (bitwise OR); `empty_cells` caches
/// `25 - popcount(image)` and is kept in lockstep by [`Puzzle::add_tetromino`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puzzle {
    id: PuzzleId,
    color: PuzzleColor,
    reward_score: u32,
    reward_shape: TetrominoShape,
    image: BoardImage,
    empty_cells: u32,
    used: [u8; SHAPE_COUNT],
}

impl Puzzle {
    pub fn new(
        id: PuzzleId,
        color: PuzzleColor,
        reward_score: u32,
        reward_shape: TetrominoShape,
        image: BoardImage,
    ) -> Self {
        Self {
            id,
            color,
            reward_score,
            reward_shape,
            image,
            empty_cells: image.count_empty_cells(),
            used: [0; SHAPE_COUNT],
        }
    }

    pub fn id(&self) -> PuzzleId {
        self.id
    }

    pub fn color(&self) -> PuzzleColor {
        self.color
    }

    pub fn reward_score(&self) -> u32 {
        self.reward_score
    }

    pub fn reward_shape(&self) -> TetrominoShape {
        self.reward_shape
    }

    pub fn image(&self) -> BoardImage {
        self.image
    }

    pub fn empty_cells(&self) -> u32 {
        self.empty_cells
    }

    pub fn is_finished(&self) -> bool {
        self.empty_cells == 0
    }

    /// Whether the placement covers only empty cells.
    ///
    /// Overlap is all this checks; that `position` is a genuine
    /// configuration of some shape is the caller's job (via the catalog).
    pub fn can_place_tetromino(&self, position: BoardImage) -> bool {
        (self.image & position).is_empty()
    }

    /// Record a placement: bump the shape's usage count, shrink the cached
    /// empty-cell count and fold the position into the image.
    ///
    /// The caller must have verified both non-overlap and that `position`
    /// is a real configuration of `shape`; an overlapping position is a
    /// programmer error and aborts rather than corrupting the counters.
    pub fn add_tetromino(&mut self, shape: TetrominoShape, position: BoardImage) -> PlacementOutcome {
        assert!(
            self.can_place_tetromino(position),
            "tetromino placement overlaps filled cells of {}",
            self.id
        );

        self.used[shape.index()] += 1;
        self.empty_cells -= shape.level();
        self.image = self.image | position;

        if self.is_finished() {
            log::debug!("{} completed", self.id);
            PlacementOutcome::Completed
        } else {
            PlacementOutcome::Placed
        }
    }

    /// Pieces placed so far, in shape order, each shape repeated by its
    /// usage count. Lazy and restartable.
    pub fn used_tetrominos(&self) -> impl Iterator<Item = TetrominoShape> + '_ {
        TetrominoShape::ALL
            .into_iter()
            .flat_map(|shape| core::iter::repeat_n(shape, self.used[shape.index()] as usize))
    }
}
