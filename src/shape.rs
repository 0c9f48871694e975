use alloc::vec::Vec;
use core::cell::OnceCell;
use hashbrown::HashSet;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::{BOARD_SIDE, BoardImage};

/// Number of distinct piece shapes in the game.
pub const SHAPE_COUNT: usize = 9;

/// The nine piece shapes, named by outline and cell count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoShape {
    O1,
    I2,
    I3,
    L3,
    O4,
    I4,
    L4,
    T4,
    S4,
}

const fn cells_mask(cells: &[(u32, u32)]) -> u32 {
    let mut mask = 0;
    let mut i = 0;
    while i < cells.len() {
        let (row, col) = cells[i];
        mask |= 1 << (row * BOARD_SIDE + col);
        i += 1;
    }
    mask
}

/// Canonical pattern per shape, anchored at the top-left corner.
const CANONICAL_MASKS: [u32; SHAPE_COUNT] = [
    cells_mask(&[(0, 0)]),
    cells_mask(&[(0, 0), (0, 1)]),
    cells_mask(&[(0, 0), (0, 1), (0, 2)]),
    cells_mask(&[(0, 0), (0, 1), (1, 0)]),
    cells_mask(&[(0, 0), (0, 1), (1, 0), (1, 1)]),
    cells_mask(&[(0, 0), (0, 1), (0, 2), (0, 3)]),
    cells_mask(&[(0, 0), (0, 1), (0, 2), (1, 2)]),
    cells_mask(&[(0, 0), (0, 1), (0, 2), (1, 1)]),
    cells_mask(&[(0, 1), (0, 2), (1, 0), (1, 1)]),
];

impl TetrominoShape {
    pub const ALL: [Self; SHAPE_COUNT] = [
        Self::O1,
        Self::I2,
        Self::I3,
        Self::L3,
        Self::O4,
        Self::I4,
        Self::L4,
        Self::T4,
        Self::S4,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn canonical_image(self) -> BoardImage {
        BoardImage::new_unchecked(CANONICAL_MASKS[self as usize])
    }

    /// Number of cells the shape covers, 1 through 4.
    pub const fn level(self) -> u32 {
        CANONICAL_MASKS[self as usize].count_ones()
    }
}

/// Static catalog of the nine shapes: symmetry-closed base configurations
/// and, on demand, every absolute placement on the 5x5 board.
///
/// Built once and never invalidated. The placement cache is lazily filled
/// per shape; the engine is single-threaded by contract, so a plain
/// [`OnceCell`] suffices.
#[derive(Debug)]
pub struct ShapeCatalog {
    base_configs: [SmallVec<[BoardImage; 8]>; SHAPE_COUNT],
    by_level: [SmallVec<[TetrominoShape; SHAPE_COUNT]>; 4],
    all_configs: [OnceCell<Vec<BoardImage>>; SHAPE_COUNT],
}

impl ShapeCatalog {
    pub fn new() -> Self {
        let base_configs = core::array::from_fn(|index| {
            symmetry_closure(TetrominoShape::ALL[index].canonical_image())
        });

        let mut by_level: [SmallVec<[TetrominoShape; SHAPE_COUNT]>; 4] = Default::default();
        for shape in TetrominoShape::ALL {
            by_level[shape.level() as usize - 1].push(shape);
        }

        Self {
            base_configs,
            by_level,
            all_configs: core::array::from_fn(|_| OnceCell::new()),
        }
    }

    /// All shapes covering exactly `level` cells.
    pub fn shapes_with_level(&self, level: u32) -> &[TetrominoShape] {
        assert!((1..=4).contains(&level), "shape levels range from 1 to 4");
        &self.by_level[level as usize - 1]
    }

    /// Top-left-normalized rotation/reflection variants of the shape.
    pub fn base_configurations_of(&self, shape: TetrominoShape) -> &[BoardImage] {
        &self.base_configs[shape.index()]
    }

    /// Whether the occupancy pattern is congruent to the shape under
    /// rotation, reflection and translation.
    pub fn compare_shape_to_image(&self, shape: TetrominoShape, image: BoardImage) -> bool {
        self.base_configs[shape.index()].contains(&image.to_top_left_corner())
    }

    /// Every absolute placement of the shape reachable on the board.
    ///
    /// Computed on first call and cached for the catalog's lifetime.
    pub fn all_configurations_of(&self, shape: TetrominoShape) -> &[BoardImage] {
        self.all_configs[shape.index()].get_or_init(|| {
            let mut seen = HashSet::new();
            let mut configs = Vec::new();

            for &base in &self.base_configs[shape.index()] {
                let mut vertical = base;
                loop {
                    let mut horizontal = vertical;
                    loop {
                        if seen.insert(horizontal) {
                            configs.push(horizontal);
                        }
                        let shifted = horizontal.move_right();
                        if shifted == horizontal {
                            break;
                        }
                        horizontal = shifted;
                    }
                    let shifted = vertical.move_down();
                    if shifted == vertical {
                        break;
                    }
                    vertical = shifted;
                }
            }

            configs.sort_unstable();
            configs
        })
    }
}

impl Default for ShapeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Symmetry-group closure of a canonical pattern: record the normalized
/// image for each quarter turn, mirror once, record the four turns again,
/// deduplicating as symmetric shapes collapse onto themselves.
fn symmetry_closure(canonical: BoardImage) -> SmallVec<[BoardImage; 8]> {
    let mut closure = SmallVec::new();
    let mut image = canonical;
    for _ in 0..2 {
        for _ in 0..4 {
            let normalized = image.to_top_left_corner();
            if !closure.contains(&normalized) {
                closure.push(normalized);
            }
            image = image.rotate_right();
        }
        image = image.flip_horizontally();
    }
    closure
}

#[cfg(test)]
mod tests {
    use super::*;
    use TetrominoShape::*;

    #[test]
    fn levels_match_cell_counts() {
        for shape in TetrominoShape::ALL {
            assert_eq!(shape.level(), shape.canonical_image().count_filled_cells());
        }
        assert!((1..=4).contains(&O1.level()));
    }

    #[test]
    fn level_partition_covers_all_nine_shapes() {
        let catalog = ShapeCatalog::new();
        assert_eq!(catalog.shapes_with_level(1), &[O1]);
        assert_eq!(catalog.shapes_with_level(2), &[I2]);
        assert_eq!(catalog.shapes_with_level(3), &[I3, L3]);
        assert_eq!(catalog.shapes_with_level(4), &[O4, I4, L4, T4, S4]);
    }

    #[test]
    fn base_configuration_counts_reflect_shape_symmetry() {
        let catalog = ShapeCatalog::new();
        let expected = [
            (O1, 1),
            (I2, 2),
            (I3, 2),
            (L3, 4),
            (O4, 1),
            (I4, 2),
            (L4, 8),
            (T4, 4),
            (S4, 4),
        ];
        for (shape, count) in expected {
            assert_eq!(
                catalog.base_configurations_of(shape).len(),
                count,
                "wrong closure size for {shape:?}"
            );
        }
    }

    #[test]
    fn base_configurations_are_normalized() {
        let catalog = ShapeCatalog::new();
        for shape in TetrominoShape::ALL {
            for &base in catalog.base_configurations_of(shape) {
                assert_eq!(base.to_top_left_corner(), base);
            }
        }
    }

    #[test]
    fn placement_counts_match_hand_counted_totals() {
        let catalog = ShapeCatalog::new();
        let expected = [
            (O1, 25),
            (I2, 40),
            (I3, 30),
            (L3, 64),
            (O4, 16),
            (I4, 20),
            (L4, 96),
            (T4, 48),
            (S4, 48),
        ];
        for (shape, count) in expected {
            assert_eq!(
                catalog.all_configurations_of(shape).len(),
                count,
                "wrong placement count for {shape:?}"
            );
        }
    }

    #[test]
    fn every_placement_matches_its_shape() {
        let catalog = ShapeCatalog::new();
        for shape in TetrominoShape::ALL {
            for &config in catalog.all_configurations_of(shape) {
                assert_eq!(config.count_filled_cells(), shape.level());
                assert!(catalog.compare_shape_to_image(shape, config));
            }
        }
    }

    #[test]
    fn matching_is_translation_invariant() {
        let catalog = ShapeCatalog::new();
        let centered = T4.canonical_image().move_down().move_down().move_right();
        assert!(catalog.compare_shape_to_image(T4, centered));
        assert!(!catalog.compare_shape_to_image(L4, centered));
    }

    #[test]
    fn placement_cache_is_stable_across_calls() {
        let catalog = ShapeCatalog::new();
        let first = catalog.all_configurations_of(S4).as_ptr();
        let second = catalog.all_configurations_of(S4).as_ptr();
        assert_eq!(first, second);
    }

    /// Brute force over every one- and two-cell pattern: a pattern matches
    /// iff it is one of the enumerated placements.
    #[test]
    fn small_shapes_match_exactly_their_placement_sets() {
        let catalog = ShapeCatalog::new();

        for cell in 0..25 {
            let image = BoardImage::new(1 << cell).unwrap();
            assert!(catalog.compare_shape_to_image(O1, image));
            assert_eq!(
                catalog.all_configurations_of(O1).contains(&image),
                catalog.compare_shape_to_image(O1, image)
            );
        }

        for first in 0..25u32 {
            for second in (first + 1)..25 {
                let image = BoardImage::new((1 << first) | (1 << second)).unwrap();
                let matches = catalog.compare_shape_to_image(I2, image);
                let listed = catalog.all_configurations_of(I2).contains(&image);
                assert_eq!(matches, listed, "mismatch for cells {first},{second}");
            }
        }
    }

    /// Brute force over every four-cell pattern against every level-4 shape.
    #[test]
    fn level_four_shapes_match_exactly_their_placement_sets() {
        let catalog = ShapeCatalog::new();
        let shapes = catalog.shapes_with_level(4).to_vec();

        for a in 0..25u32 {
            for b in (a + 1)..25 {
                for c in (b + 1)..25 {
                    for d in (c + 1)..25 {
                        let raw = (1 << a) | (1 << b) | (1 << c) | (1 << d);
                        let image = BoardImage::new(raw).unwrap();
                        for &shape in &shapes {
                            let matches = catalog.compare_shape_to_image(shape, image);
                            let listed = catalog.all_configurations_of(shape).contains(&image);
                            assert_eq!(matches, listed);
                        }
                    }
                }
            }
        }
    }
}
