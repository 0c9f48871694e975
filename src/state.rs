use alloc::collections::VecDeque;
use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::{GameError, Puzzle, PuzzleColor, PuzzleId, Result, SHAPE_COUNT, TetrominoShape};

/// Puzzle slots exposed per color.
pub const ROW_SIZE: usize = 4;

/// Collects the puzzle decks and rule knobs, then deals the opening state.
#[derive(Clone, Debug, Default)]
pub struct SharedGameStateBuilder {
    white: Vec<Puzzle>,
    black: Vec<Puzzle>,
    initial_tetrominos: u32,
    seed: u64,
}

impl SharedGameStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn white_puzzle(mut self, puzzle: Puzzle) -> Self {
        self.white.push(puzzle);
        self
    }

    pub fn black_puzzle(mut self, puzzle: Puzzle) -> Self {
        self.black.push(puzzle);
        self
    }

    /// Per-shape piece count the reserve starts with (and is capped at).
    pub fn initial_tetrominos(mut self, count: u32) -> Self {
        self.initial_tetrominos = count;
        self
    }

    /// Seed for the deck shuffles; fixed seed, fixed deal.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Shuffle both decks independently and deal four puzzles into each row.
    ///
    /// Fails before any state exists when either deck cannot fill its row.
    pub fn build(self) -> Result<SharedGameState> {
        use rand::prelude::*;

        if self.white.len() < ROW_SIZE || self.black.len() < ROW_SIZE {
            return Err(GameError::InsufficientPuzzles);
        }

        let mut rng = SmallRng::seed_from_u64(self.seed);
        let mut white = self.white;
        let mut black = self.black;
        white.shuffle(&mut rng);
        black.shuffle(&mut rng);

        let mut white_deck: VecDeque<_> = white.into();
        let mut black_deck: VecDeque<_> = black.into();
        let white_row = core::array::from_fn(|_| white_deck.pop_front());
        let black_row = core::array::from_fn(|_| black_deck.pop_front());

        log::debug!(
            "dealt opening rows, decks hold {} white / {} black puzzles",
            white_deck.len(),
            black_deck.len()
        );

        Ok(SharedGameState {
            white_row,
            black_row,
            white_deck,
            black_deck,
            reserve: [self.initial_tetrominos; SHAPE_COUNT],
            initial_tetrominos: self.initial_tetrominos,
        })
    }
}

/// Everything the players share: two rows of face-up puzzles, the decks
/// behind them and the bounded piece reserve.
///
/// Exactly one driving loop owns and mutates this; decision code only ever
/// sees [`GameInfo`] snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SharedGameState {
    white_row: [Option<Puzzle>; ROW_SIZE],
    black_row: [Option<Puzzle>; ROW_SIZE],
    white_deck: VecDeque<Puzzle>,
    black_deck: VecDeque<Puzzle>,
    reserve: [u32; SHAPE_COUNT],
    initial_tetrominos: u32,
}

impl SharedGameState {
    pub fn builder() -> SharedGameStateBuilder {
        SharedGameStateBuilder::new()
    }

    /// Draw the top puzzle of the white deck; an empty deck is not an error.
    pub fn take_top_white_puzzle(&mut self) -> Option<Puzzle> {
        self.white_deck.pop_front()
    }

    /// Draw the top puzzle of the black deck; an empty deck is not an error.
    pub fn take_top_black_puzzle(&mut self) -> Option<Puzzle> {
        self.black_deck.pop_front()
    }

    /// First row puzzle with this id, scanning the white row then the black.
    pub fn puzzle_with_id(&self, id: PuzzleId) -> Option<&Puzzle> {
        self.white_row
            .iter()
            .chain(self.black_row.iter())
            .flatten()
            .find(|puzzle| puzzle.id() == id)
    }

    /// Take the first row puzzle with this id out of its slot, leaving a
    /// hole. Absent ids are a normal `None`.
    pub fn remove_puzzle_with_id(&mut self, id: PuzzleId) -> Option<Puzzle> {
        self.white_row
            .iter_mut()
            .chain(self.black_row.iter_mut())
            .find(|slot| slot.as_ref().is_some_and(|puzzle| puzzle.id() == id))
            .and_then(Option::take)
    }

    /// Deal from each deck into that row's empty slots. Slots stay empty
    /// once their deck runs out; rows are never compacted, so a hole keeps
    /// its index until refilled.
    pub fn refill_puzzles(&mut self) {
        for (row, deck) in [
            (&mut self.white_row, &mut self.white_deck),
            (&mut self.black_row, &mut self.black_deck),
        ] {
            for slot in row.iter_mut() {
                if slot.is_none()
                    && let Some(puzzle) = deck.pop_front()
                {
                    log::debug!("refilled a row slot with {}", puzzle.id());
                    *slot = Some(puzzle);
                }
            }
        }
    }

    /// Return a puzzle under the deck matching its color.
    pub fn put_puzzle_to_bottom_of_deck(&mut self, puzzle: Puzzle) {
        match puzzle.color() {
            PuzzleColor::White => self.white_deck.push_back(puzzle),
            PuzzleColor::Black => self.black_deck.push_back(puzzle),
        }
    }

    /// Hand one piece of this shape to a player.
    pub fn remove_tetromino(&mut self, shape: TetrominoShape) -> Result<()> {
        let count = &mut self.reserve[shape.index()];
        if *count == 0 {
            return Err(GameError::NoTetrominosLeft);
        }
        *count -= 1;
        Ok(())
    }

    /// Return one piece of this shape to the reserve.
    pub fn add_tetromino(&mut self, shape: TetrominoShape) -> Result<()> {
        let count = &mut self.reserve[shape.index()];
        if *count == self.initial_tetrominos {
            return Err(GameError::ReserveOverflow);
        }
        *count += 1;
        Ok(())
    }

    pub fn reserve_count(&self, shape: TetrominoShape) -> u32 {
        self.reserve[shape.index()]
    }

    pub fn white_deck_size(&self) -> usize {
        self.white_deck.len()
    }

    pub fn black_deck_size(&self) -> usize {
        self.black_deck.len()
    }

    pub fn white_row(&self) -> &[Option<Puzzle>; ROW_SIZE] {
        &self.white_row
    }

    pub fn black_row(&self) -> &[Option<Puzzle>; ROW_SIZE] {
        &self.black_row
    }

    /// Immutable snapshot for decision code: deep-cloned rows, reserve
    /// counts and deck sizes, decoupled from the live aggregate.
    pub fn game_info(&self) -> GameInfo {
        GameInfo {
            white_row: self.white_row.clone(),
            black_row: self.black_row.clone(),
            reserve: self.reserve,
            white_deck_size: self.white_deck.len(),
            black_deck_size: self.black_deck.len(),
        }
    }
}

/// Frozen view of the shared state, safe to hand to concurrent or
/// asynchronous decision code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    pub white_row: [Option<Puzzle>; ROW_SIZE],
    pub black_row: [Option<Puzzle>; ROW_SIZE],
    pub reserve: [u32; SHAPE_COUNT],
    pub white_deck_size: usize,
    pub black_deck_size: usize,
}
