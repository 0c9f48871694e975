use serde::{Deserialize, Serialize};

/// Actions each player gets per regular turn.
pub const ACTIONS_PER_TURN: u32 = 3;

/// Game lifecycle phases.
///
/// Strictly forward-only:
/// - Normal -> EndOfTheGame (black deck runs out)
/// - EndOfTheGame -> FinishingTouches (after the granted final round)
/// - FinishingTouches -> Finished (every player passed)
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Normal,
    EndOfTheGame,
    FinishingTouches,
    Finished,
}

impl GamePhase {
    /// Terminal state, no outgoing transitions.
    pub const fn is_final(self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Phases driven by explicit signals instead of the action countdown.
    pub const fn bypasses_countdown(self) -> bool {
        matches!(self, Self::FinishingTouches | Self::Finished)
    }
}

impl Default for GamePhase {
    fn default() -> Self {
        Self::Normal
    }
}

/// Snapshot of whose turn it is and what they may still do.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnInfo {
    pub current_player: u32,
    pub actions_left: u32,
    pub phase: GamePhase,
    pub used_master_action: bool,
    pub took_black_puzzle: bool,
    pub last_round: bool,
}

/// Events the action-processing layer reports back to the turn machine.
///
/// Which game action maps to which signal is external policy; the machine
/// only reacts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TurnSignal {
    /// The current player claimed a black puzzle this turn.
    TookBlackPuzzle,
    /// The current player spent their once-per-turn master action.
    UsedMasterAction,
    /// The black deck just became empty. The driving loop must send this
    /// exactly once, at the transition; the shared state never signals it
    /// automatically. Ignored outside the Normal phase.
    BlackDeckEmpty,
    /// The current player finished their single finishing-touches action.
    EndedFinishingTouches,
}

/// Turn and phase progression, independent of the shared game state.
///
/// Players rotate circularly with a three-action budget; phase transitions
/// out of EndOfTheGame are evaluated once per round, at the wrap back to
/// the first player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    players: u32,
    info: TurnInfo,
}

impl TurnState {
    pub fn new(players: u32) -> Self {
        assert!(players > 0, "a game needs at least one player");
        Self {
            players,
            info: TurnInfo {
                current_player: 0,
                // One above the budget, so the very first call counts down
                // to a full turn without a special case.
                actions_left: ACTIONS_PER_TURN + 1,
                phase: GamePhase::Normal,
                used_master_action: false,
                took_black_puzzle: false,
                last_round: false,
            },
        }
    }

    pub fn players(&self) -> u32 {
        self.players
    }

    /// Advance the countdown and hand back the turn record.
    pub fn next_turn(&mut self) -> TurnInfo {
        if self.info.phase.bypasses_countdown() {
            return self.info;
        }

        if self.info.actions_left > 1 {
            self.info.actions_left -= 1;
            return self.info;
        }

        // Budget exhausted: the phase rule fires only when the round wraps.
        if self.is_last_player() {
            self.advance_phase_at_wrap();
        }
        self.info.current_player = (self.info.current_player + 1) % self.players;
        self.info.actions_left = ACTIONS_PER_TURN;
        self.info.used_master_action = false;
        self.info.took_black_puzzle = false;
        self.info
    }

    pub fn signal(&mut self, signal: TurnSignal) {
        match signal {
            TurnSignal::TookBlackPuzzle => self.info.took_black_puzzle = true,
            TurnSignal::UsedMasterAction => self.info.used_master_action = true,
            TurnSignal::BlackDeckEmpty => {
                if self.info.phase == GamePhase::Normal {
                    log::debug!("black deck exhausted, entering end of the game");
                    self.info.phase = GamePhase::EndOfTheGame;
                    self.info.last_round = false;
                }
            }
            TurnSignal::EndedFinishingTouches => {
                if self.is_last_player() {
                    log::debug!("finishing touches done, game finished");
                    self.info.phase = GamePhase::Finished;
                } else {
                    self.info.current_player += 1;
                }
            }
        }
    }

    fn is_last_player(&self) -> bool {
        self.info.current_player + 1 == self.players
    }

    fn advance_phase_at_wrap(&mut self) {
        if self.info.phase == GamePhase::EndOfTheGame {
            if self.info.last_round {
                log::debug!("final round complete, entering finishing touches");
                self.info.phase = GamePhase::FinishingTouches;
            } else {
                log::debug!("granting one final full round");
                self.info.last_round = true;
            }
        }
    }
}
