//! Time-dependent claim policy.
//!
//! Decides whether a forced settlement is currently authorized for a
//! game and which party it favors. The state machine owns what a valid
//! transition is; this module owns whether the clock permits forcing
//! one, with `now` always injected by the caller.

use chrono::{DateTime, Utc};

use crate::error::GameError;
use crate::game::Game;
use crate::protocol::{GameState, Player, SettlementReason};

/// Rule on a commit-phase timeout claim.
///
/// Authorized strictly after the commit deadline while the game is
/// still `Joined`: the sole committer (if any) is owed the whole pot,
/// otherwise both stakes go back.
pub fn rule_commit_timeout(
    game: &Game,
    now: DateTime<Utc>,
) -> Result<SettlementReason, GameError> {
    if game.state() != GameState::Joined {
        return Err(GameError::WrongState(game.state()));
    }
    let deadline = game
        .commit_deadline_at()
        .ok_or(GameError::WrongState(game.state()))?;
    if now <= deadline {
        return Err(GameError::DeadlineNotReached);
    }
    let committed = (
        game.commitment(Player::One).is_some(),
        game.commitment(Player::Two).is_some(),
    );
    match committed {
        (true, false) => Ok(SettlementReason::CommitForfeit(Player::One)),
        (false, true) => Ok(SettlementReason::CommitForfeit(Player::Two)),
        (false, false) => Ok(SettlementReason::CommitRefund),
        // a second commitment leaves `Joined` in the same step
        (true, true) => Err(GameError::WrongState(game.state())),
    }
}

/// Rule on a reveal-phase timeout claim.
///
/// Authorized strictly after the reveal deadline while the game is
/// still `BothCommitted`: the sole revealer (if any) is owed the whole
/// pot, since the non-revealer committed to a move it refuses to
/// disclose; otherwise both stakes go back.
pub fn rule_reveal_timeout(
    game: &Game,
    now: DateTime<Utc>,
) -> Result<SettlementReason, GameError> {
    if game.state() != GameState::BothCommitted {
        return Err(GameError::WrongState(game.state()));
    }
    let deadline = game
        .reveal_deadline_at()
        .ok_or(GameError::WrongState(game.state()))?;
    if now <= deadline {
        return Err(GameError::DeadlineNotReached);
    }
    let revealed = (
        game.revealed_move(Player::One).is_some(),
        game.revealed_move(Player::Two).is_some(),
    );
    match revealed {
        (true, false) => Ok(SettlementReason::RevealForfeit(Player::One)),
        (false, true) => Ok(SettlementReason::RevealForfeit(Player::Two)),
        (false, false) => Ok(SettlementReason::RevealRefund),
        // a second reveal settles the game in the same step
        (true, true) => Err(GameError::WrongState(game.state())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Commitment, Salt};
    use crate::game::Move;
    use crate::protocol::{GameId, PlayerId};
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn joined_game() -> (Game, PlayerId, PlayerId) {
        let creator = PlayerId::new();
        let opponent = PlayerId::new();
        let mut game =
            Game::create(GameId::from_raw(1), creator, 100, 100, 120, 60, t0()).unwrap();
        game.join(opponent, 100, t0()).unwrap();
        (game, creator, opponent)
    }

    #[test]
    fn test_commit_claim_before_deadline_rejected() {
        let (game, _, _) = joined_game();
        assert_eq!(
            rule_commit_timeout(&game, t0() + Duration::seconds(119)),
            Err(GameError::DeadlineNotReached)
        );
        // the boundary instant itself is still within the window
        assert_eq!(
            rule_commit_timeout(&game, t0() + Duration::seconds(120)),
            Err(GameError::DeadlineNotReached)
        );
    }

    #[test]
    fn test_commit_claim_with_no_commitments_refunds() {
        let (game, _, _) = joined_game();
        assert_eq!(
            rule_commit_timeout(&game, t0() + Duration::seconds(121)),
            Ok(SettlementReason::CommitRefund)
        );
    }

    #[test]
    fn test_commit_claim_forfeits_to_sole_committer() {
        let (mut game, creator, opponent) = joined_game();
        let commitment = Commitment::new(Move::Rock, &Salt::random());

        let mut for_one = game.clone();
        for_one.commit(creator, commitment, t0()).unwrap();
        assert_eq!(
            rule_commit_timeout(&for_one, t0() + Duration::seconds(121)),
            Ok(SettlementReason::CommitForfeit(Player::One))
        );

        game.commit(opponent, commitment, t0()).unwrap();
        assert_eq!(
            rule_commit_timeout(&game, t0() + Duration::seconds(121)),
            Ok(SettlementReason::CommitForfeit(Player::Two))
        );
    }

    #[test]
    fn test_commit_claim_wrong_state() {
        let creator = PlayerId::new();
        let game = Game::create(GameId::from_raw(1), creator, 100, 100, 120, 60, t0()).unwrap();
        assert_eq!(
            rule_commit_timeout(&game, t0() + Duration::seconds(300)),
            Err(GameError::WrongState(GameState::Created))
        );
    }

    fn both_committed_game() -> (Game, PlayerId, Salt, PlayerId, Salt) {
        let (mut game, creator, opponent) = joined_game();
        let salt1 = Salt::from_bytes(*b"salt-one");
        let salt2 = Salt::from_bytes(*b"salt-two");
        game.commit(creator, Commitment::new(Move::Rock, &salt1), t0())
            .unwrap();
        game.commit(opponent, Commitment::new(Move::Scissors, &salt2), t0())
            .unwrap();
        (game, creator, salt1, opponent, salt2)
    }

    #[test]
    fn test_reveal_claim_before_deadline_rejected() {
        let (game, ..) = both_committed_game();
        assert_eq!(
            rule_reveal_timeout(&game, t0() + Duration::seconds(60)),
            Err(GameError::DeadlineNotReached)
        );
    }

    #[test]
    fn test_reveal_claim_with_no_reveals_refunds() {
        let (game, ..) = both_committed_game();
        assert_eq!(
            rule_reveal_timeout(&game, t0() + Duration::seconds(61)),
            Ok(SettlementReason::RevealRefund)
        );
    }

    #[test]
    fn test_reveal_claim_forfeits_to_sole_revealer() {
        let (mut game, creator, salt1, _, _) = both_committed_game();
        game.reveal(creator, Move::Rock, &salt1, t0()).unwrap();
        assert_eq!(
            rule_reveal_timeout(&game, t0() + Duration::seconds(61)),
            Ok(SettlementReason::RevealForfeit(Player::One))
        );
    }

    #[test]
    fn test_reveal_claim_wrong_state() {
        let (game, _, _) = joined_game();
        assert_eq!(
            rule_reveal_timeout(&game, t0() + Duration::seconds(300)),
            Err(GameError::WrongState(GameState::Joined))
        );
    }
}
