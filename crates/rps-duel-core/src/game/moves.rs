//! Move encoding and winner determination.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::protocol::Player;

/// A Rock-Paper-Scissors move.
///
/// Wire encoding is a single byte: Rock = 0, Paper = 1, Scissors = 2.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Move {
    Rock,
    Paper,
    Scissors,
}

impl Move {
    /// Single-byte encoding used inside commitments
    pub fn as_byte(&self) -> u8 {
        match self {
            Move::Rock => 0,
            Move::Paper => 1,
            Move::Scissors => 2,
        }
    }

    /// Decode a wire byte, rejecting anything outside {0, 1, 2}
    pub fn from_byte(byte: u8) -> Result<Self, GameError> {
        match byte {
            0 => Ok(Move::Rock),
            1 => Ok(Move::Paper),
            2 => Ok(Move::Scissors),
            other => Err(GameError::InvalidMove(other)),
        }
    }

    /// Check if this move beats the other
    pub fn beats(&self, other: &Move) -> bool {
        matches!(
            (self, other),
            (Move::Rock, Move::Scissors)
                | (Move::Scissors, Move::Paper)
                | (Move::Paper, Move::Rock)
        )
    }
}

/// Result of a completed showdown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Player1Wins,
    Player2Wins,
    Draw,
}

impl Outcome {
    /// The winning seat, or `None` on a draw
    pub fn winner(&self) -> Option<Player> {
        match self {
            Outcome::Player1Wins => Some(Player::One),
            Outcome::Player2Wins => Some(Player::Two),
            Outcome::Draw => None,
        }
    }
}

/// Determine the outcome of two revealed moves.
pub fn judge(move1: Move, move2: Move) -> Outcome {
    if move1 == move2 {
        Outcome::Draw
    } else if move1.beats(&move2) {
        Outcome::Player1Wins
    } else {
        Outcome::Player2Wins
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rock_beats_scissors() {
        assert_eq!(judge(Move::Rock, Move::Scissors), Outcome::Player1Wins);
        assert_eq!(judge(Move::Scissors, Move::Rock), Outcome::Player2Wins);
    }

    #[test]
    fn test_scissors_beats_paper() {
        assert_eq!(judge(Move::Scissors, Move::Paper), Outcome::Player1Wins);
        assert_eq!(judge(Move::Paper, Move::Scissors), Outcome::Player2Wins);
    }

    #[test]
    fn test_paper_beats_rock() {
        assert_eq!(judge(Move::Paper, Move::Rock), Outcome::Player1Wins);
        assert_eq!(judge(Move::Rock, Move::Paper), Outcome::Player2Wins);
    }

    #[test]
    fn test_draws() {
        assert_eq!(judge(Move::Rock, Move::Rock), Outcome::Draw);
        assert_eq!(judge(Move::Paper, Move::Paper), Outcome::Draw);
        assert_eq!(judge(Move::Scissors, Move::Scissors), Outcome::Draw);
    }

    #[test]
    fn test_all_outcomes() {
        // All 9 combinations
        let moves = [Move::Rock, Move::Paper, Move::Scissors];
        let mut p1_wins = 0;
        let mut p2_wins = 0;
        let mut draws = 0;

        for m1 in &moves {
            for m2 in &moves {
                match judge(*m1, *m2) {
                    Outcome::Player1Wins => p1_wins += 1,
                    Outcome::Player2Wins => p2_wins += 1,
                    Outcome::Draw => draws += 1,
                }
            }
        }

        assert_eq!(p1_wins, 3); // Rock>Scissors, Scissors>Paper, Paper>Rock
        assert_eq!(p2_wins, 3); // Symmetric
        assert_eq!(draws, 3); // Rock=Rock, Paper=Paper, Scissors=Scissors
    }

    #[test]
    fn test_byte_round_trip() {
        for mv in [Move::Rock, Move::Paper, Move::Scissors] {
            assert_eq!(Move::from_byte(mv.as_byte()).unwrap(), mv);
        }
    }

    #[test]
    fn test_invalid_bytes_rejected() {
        for byte in [3u8, 7, 255] {
            assert_eq!(Move::from_byte(byte), Err(GameError::InvalidMove(byte)));
        }
    }

    #[test]
    fn test_winner_seat() {
        assert_eq!(Outcome::Player1Wins.winner(), Some(Player::One));
        assert_eq!(Outcome::Player2Wins.winner(), Some(Player::Two));
        assert_eq!(Outcome::Draw.winner(), None);
    }
}
