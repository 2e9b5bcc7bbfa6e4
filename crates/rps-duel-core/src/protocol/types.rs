//! Identifier and settlement types shared across the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::game::Outcome;

/// Unique game identifier, allocated by the registry in strictly
/// increasing order starting at 1.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(u64);

impl GameId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the underlying integer
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Debug for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GameId({})", self.0)
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Party address. An opaque identifier for the depositing side of a
/// stake; UUIDs here stand in for whatever addresses the surrounding
/// ledger uses.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    /// Create a new random player ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for PlayerId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Debug for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlayerId({})", self.0)
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Seat within a single game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    /// Get the opposing seat
    pub fn opponent(&self) -> Player {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player1"),
            Player::Two => write!(f, "player2"),
        }
    }
}

/// Lifecycle state of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Created,
    Joined,
    BothCommitted,
    Resolved,
    Cancelled,
}

impl GameState {
    /// Terminal states admit no further mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, GameState::Resolved | GameState::Cancelled)
    }
}

/// A single credit owed to a party.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub player: PlayerId,
    pub amount: u64,
}

/// Why a game reached its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SettlementReason {
    /// Both parties revealed; settled by the beats-relation.
    Showdown(Outcome),
    /// Commit window lapsed with a sole committer, who takes the pot.
    CommitForfeit(Player),
    /// Commit window lapsed with no commitments; stakes go back.
    CommitRefund,
    /// Reveal window lapsed with a sole revealer, who takes the pot.
    RevealForfeit(Player),
    /// Reveal window lapsed with no reveals; stakes go back.
    RevealRefund,
    /// Creator withdrew an unjoined game.
    Cancelled,
}

/// Fund movement produced by the single transition that ends a game.
///
/// The payouts always sum to exactly the pot that was held; applying
/// them is the surrounding ledger's job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub game_id: GameId,
    pub reason: SettlementReason,
    pub payouts: Vec<Payout>,
}

impl Settlement {
    /// Total amount disbursed across all payouts.
    pub fn total(&self) -> u64 {
        self.payouts.iter().map(|p| p.amount).sum()
    }
}

/// Read-only projection of a game, as returned by the registry's
/// `basic` lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub id: GameId,
    pub player1: PlayerId,
    pub player2: Option<PlayerId>,
    pub stake: u64,
    pub state: GameState,
}
