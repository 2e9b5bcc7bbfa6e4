//! Engine failure kinds.

use thiserror::Error;

use crate::protocol::{GameId, GameState};

/// Every way an engine operation can be rejected.
///
/// Rejections are total: an operation that returns one of these has made
/// no state change and moved no funds.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("game {0} not found")]
    GameNotFound(GameId),

    #[error("caller is not a participant in this game")]
    NotParticipant,

    #[error("creator cannot join their own game")]
    SelfJoin,

    #[error("operation not valid while game is {0:?}")]
    WrongState(GameState),

    #[error("deposit of {deposit} does not match the required stake of {stake}")]
    StakeMismatch { stake: u64, deposit: u64 },

    #[error("participant has already committed a move")]
    AlreadyCommitted,

    #[error("participant has already revealed a move")]
    AlreadyRevealed,

    #[error("the deadline for this operation has passed")]
    DeadlineExpired,

    #[error("the deadline has not been reached yet")]
    DeadlineNotReached,

    #[error("reveal does not match the stored commitment")]
    CommitmentMismatch,

    #[error("invalid move byte {0}, expected 0 (Rock), 1 (Paper) or 2 (Scissors)")]
    InvalidMove(u8),

    #[error("phase deadlines must be between 1 second and 10 years")]
    InvalidDeadline,
}
