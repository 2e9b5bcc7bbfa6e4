//! Registry owning every game and dispatching operations by id.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::crypto::{Commitment, Salt};
use crate::error::GameError;
use crate::game::{Game, Move};
use crate::protocol::{GameId, GameState, GameSummary, PlayerId, Settlement};

/// Owns the `GameId -> Game` mapping.
///
/// Identifiers are allocated in strictly increasing order and never
/// reused. The registry enforces identity and existence only; every
/// game rule lives in [`Game`].
#[derive(Clone, Debug)]
pub struct GameRegistry {
    games: HashMap<GameId, Game>,
    next_id: u64,
}

impl GameRegistry {
    pub fn new() -> Self {
        Self {
            games: HashMap::new(),
            next_id: 1,
        }
    }

    /// Open a new game; the caller becomes player1 and must attach a
    /// deposit equal to the stake.
    pub fn create_game(
        &mut self,
        creator: PlayerId,
        deposit: u64,
        stake: u64,
        commit_deadline_secs: i64,
        reveal_deadline_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<GameId, GameError> {
        let id = GameId::from_raw(self.next_id);
        let game = Game::create(
            id,
            creator,
            deposit,
            stake,
            commit_deadline_secs,
            reveal_deadline_secs,
            now,
        )?;
        self.next_id += 1;
        self.games.insert(id, game);
        Ok(id)
    }

    /// Join an open game by matching its stake.
    pub fn join_game(
        &mut self,
        id: GameId,
        caller: PlayerId,
        deposit: u64,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        self.game_mut(id)?.join(caller, deposit, now)
    }

    /// Submit a move commitment; returns the state after the call so
    /// callers can see the transition to `BothCommitted`.
    pub fn commit_move(
        &mut self,
        id: GameId,
        caller: PlayerId,
        commitment: Commitment,
        now: DateTime<Utc>,
    ) -> Result<GameState, GameError> {
        self.game_mut(id)?.commit(caller, commitment, now)
    }

    /// Reveal a move byte as it arrives off the wire. Decoding happens
    /// before any hashing; the second successful reveal returns the
    /// settlement.
    pub fn reveal_move(
        &mut self,
        id: GameId,
        caller: PlayerId,
        move_byte: u8,
        salt: &Salt,
        now: DateTime<Utc>,
    ) -> Result<Option<Settlement>, GameError> {
        let game = self.game_mut(id)?;
        let mv = Move::from_byte(move_byte)?;
        game.reveal(caller, mv, salt, now)
    }

    /// Creator withdraws an unjoined game.
    pub fn cancel_game(&mut self, id: GameId, caller: PlayerId) -> Result<Settlement, GameError> {
        self.game_mut(id)?.cancel(caller)
    }

    /// Force settlement of a game whose commit window lapsed.
    pub fn claim_commit_timeout(
        &mut self,
        id: GameId,
        now: DateTime<Utc>,
    ) -> Result<Settlement, GameError> {
        self.game_mut(id)?.claim_commit_timeout(now)
    }

    /// Force settlement of a game whose reveal window lapsed.
    pub fn claim_reveal_timeout(
        &mut self,
        id: GameId,
        now: DateTime<Utc>,
    ) -> Result<Settlement, GameError> {
        self.game_mut(id)?.claim_reveal_timeout(now)
    }

    /// Read-only access to a game.
    pub fn get(&self, id: GameId) -> Result<&Game, GameError> {
        self.games.get(&id).ok_or(GameError::GameNotFound(id))
    }

    /// The basic projection: (player1, player2, stake, state).
    pub fn basic(&self, id: GameId) -> Result<GameSummary, GameError> {
        Ok(self.get(id)?.summary())
    }

    /// Games still waiting for an opponent, oldest first.
    pub fn open_games(&self) -> Vec<GameSummary> {
        let mut open: Vec<GameSummary> = self
            .games
            .values()
            .filter(|g| g.state() == GameState::Created)
            .map(|g| g.summary())
            .collect();
        open.sort_by_key(|g| g.id);
        open
    }

    fn game_mut(&mut self, id: GameId) -> Result<&mut Game, GameError> {
        self.games.get_mut(&id).ok_or(GameError::GameNotFound(id))
    }
}

impl Default for GameRegistry {
    fn default() -> Self {
        Self::new()
    }
}
