//! One game's lifecycle: stakes, commitments, reveals, settlement.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::{Commitment, Salt};
use crate::error::GameError;
use crate::game::moves::{judge, Move, Outcome};
use crate::game::timeout;
use crate::protocol::{
    GameId, GameState, GameSummary, Payout, Player, PlayerId, Settlement, SettlementReason,
};

/// Upper bound on a phase window; keeps deadline arithmetic in range.
const MAX_DEADLINE_SECS: i64 = 315_360_000; // ten years

/// A single Rock-Paper-Scissors duel between two staked parties.
///
/// Every mutating method takes the current time from the caller and
/// either applies its transition completely or fails with a
/// [`GameError`], leaving the game untouched. A terminal transition
/// drains the pot exactly once into a [`Settlement`] whose payouts sum
/// to the drained amount.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    player1: PlayerId,
    player2: Option<PlayerId>,
    stake: u64,
    commit_deadline_secs: i64,
    reveal_deadline_secs: i64,
    commit_deadline_at: Option<DateTime<Utc>>,
    reveal_deadline_at: Option<DateTime<Utc>>,
    commitment1: Option<Commitment>,
    commitment2: Option<Commitment>,
    move1: Option<Move>,
    move2: Option<Move>,
    state: GameState,
    pot: u64,
    created_at: DateTime<Utc>,
}

impl Game {
    /// Open a new game. The creator's deposit must equal the stake and
    /// both phase windows must be positive.
    pub(crate) fn create(
        id: GameId,
        creator: PlayerId,
        deposit: u64,
        stake: u64,
        commit_deadline_secs: i64,
        reveal_deadline_secs: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, GameError> {
        if deposit != stake {
            return Err(GameError::StakeMismatch { stake, deposit });
        }
        if !(1..=MAX_DEADLINE_SECS).contains(&commit_deadline_secs)
            || !(1..=MAX_DEADLINE_SECS).contains(&reveal_deadline_secs)
        {
            return Err(GameError::InvalidDeadline);
        }
        Ok(Self {
            id,
            player1: creator,
            player2: None,
            stake,
            commit_deadline_secs,
            reveal_deadline_secs,
            commit_deadline_at: None,
            reveal_deadline_at: None,
            commitment1: None,
            commitment2: None,
            move1: None,
            move2: None,
            state: GameState::Created,
            pot: deposit,
            created_at: now,
        })
    }

    pub fn id(&self) -> GameId {
        self.id
    }

    pub fn player1(&self) -> PlayerId {
        self.player1
    }

    pub fn player2(&self) -> Option<PlayerId> {
        self.player2
    }

    pub fn stake(&self) -> u64 {
        self.stake
    }

    /// Total value currently held for this game
    pub fn pot(&self) -> u64 {
        self.pot
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// End of the commit window; set when the second party joins
    pub fn commit_deadline_at(&self) -> Option<DateTime<Utc>> {
        self.commit_deadline_at
    }

    /// End of the reveal window; set when the second commitment lands
    pub fn reveal_deadline_at(&self) -> Option<DateTime<Utc>> {
        self.reveal_deadline_at
    }

    pub fn commitment(&self, side: Player) -> Option<Commitment> {
        match side {
            Player::One => self.commitment1,
            Player::Two => self.commitment2,
        }
    }

    pub fn revealed_move(&self, side: Player) -> Option<Move> {
        match side {
            Player::One => self.move1,
            Player::Two => self.move2,
        }
    }

    /// Which seat the caller occupies, if any.
    pub fn participant(&self, caller: PlayerId) -> Option<Player> {
        if caller == self.player1 {
            Some(Player::One)
        } else if self.player2 == Some(caller) {
            Some(Player::Two)
        } else {
            None
        }
    }

    /// Read-only projection: (player1, player2, stake, state).
    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id,
            player1: self.player1,
            player2: self.player2,
            stake: self.stake,
            state: self.state,
        }
    }

    /// Second party joins by matching the stake; starts the commit window.
    pub(crate) fn join(
        &mut self,
        caller: PlayerId,
        deposit: u64,
        now: DateTime<Utc>,
    ) -> Result<(), GameError> {
        if self.state != GameState::Created {
            return Err(GameError::WrongState(self.state));
        }
        if caller == self.player1 {
            return Err(GameError::SelfJoin);
        }
        if deposit != self.stake {
            return Err(GameError::StakeMismatch {
                stake: self.stake,
                deposit,
            });
        }
        self.player2 = Some(caller);
        self.commit_deadline_at = Some(now + Duration::seconds(self.commit_deadline_secs));
        self.pot += deposit;
        self.state = GameState::Joined;
        Ok(())
    }

    /// Record a participant's move commitment.
    ///
    /// Accepted up to and including the commit deadline. The second
    /// commitment moves the game to `BothCommitted` and starts the
    /// reveal window in the same step.
    pub(crate) fn commit(
        &mut self,
        caller: PlayerId,
        commitment: Commitment,
        now: DateTime<Utc>,
    ) -> Result<GameState, GameError> {
        if self.state != GameState::Joined {
            return Err(GameError::WrongState(self.state));
        }
        let side = self.participant(caller).ok_or(GameError::NotParticipant)?;
        if now > self.commit_deadline()? {
            return Err(GameError::DeadlineExpired);
        }
        if self.commitment(side).is_some() {
            return Err(GameError::AlreadyCommitted);
        }
        match side {
            Player::One => self.commitment1 = Some(commitment),
            Player::Two => self.commitment2 = Some(commitment),
        }
        if self.commitment1.is_some() && self.commitment2.is_some() {
            self.reveal_deadline_at = Some(now + Duration::seconds(self.reveal_deadline_secs));
            self.state = GameState::BothCommitted;
        }
        Ok(self.state)
    }

    /// Reveal a previously committed move.
    ///
    /// A failed verification leaves the game unchanged, so the
    /// participant can retry with corrected inputs before the reveal
    /// deadline. The second successful reveal settles the game.
    pub(crate) fn reveal(
        &mut self,
        caller: PlayerId,
        mv: Move,
        salt: &Salt,
        now: DateTime<Utc>,
    ) -> Result<Option<Settlement>, GameError> {
        if self.state != GameState::BothCommitted {
            return Err(GameError::WrongState(self.state));
        }
        let side = self.participant(caller).ok_or(GameError::NotParticipant)?;
        if now > self.reveal_deadline()? {
            return Err(GameError::DeadlineExpired);
        }
        if self.revealed_move(side).is_some() {
            return Err(GameError::AlreadyRevealed);
        }
        if !self.stored_commitment(side)?.verify(mv, salt) {
            return Err(GameError::CommitmentMismatch);
        }
        match side {
            Player::One => self.move1 = Some(mv),
            Player::Two => self.move2 = Some(mv),
        }
        if let (Some(m1), Some(m2)) = (self.move1, self.move2) {
            let outcome = judge(m1, m2);
            let settlement = self.drain(SettlementReason::Showdown(outcome), GameState::Resolved)?;
            return Ok(Some(settlement));
        }
        Ok(None)
    }

    /// Creator withdraws an unjoined game and recovers the stake.
    pub(crate) fn cancel(&mut self, caller: PlayerId) -> Result<Settlement, GameError> {
        if self.state != GameState::Created {
            return Err(GameError::WrongState(self.state));
        }
        if caller != self.player1 {
            return Err(GameError::NotParticipant);
        }
        self.drain(SettlementReason::Cancelled, GameState::Cancelled)
    }

    /// Force settlement after the commit window lapsed.
    pub(crate) fn claim_commit_timeout(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Settlement, GameError> {
        let reason = timeout::rule_commit_timeout(self, now)?;
        self.drain(reason, GameState::Resolved)
    }

    /// Force settlement after the reveal window lapsed.
    pub(crate) fn claim_reveal_timeout(
        &mut self,
        now: DateTime<Utc>,
    ) -> Result<Settlement, GameError> {
        let reason = timeout::rule_reveal_timeout(self, now)?;
        self.drain(reason, GameState::Resolved)
    }

    fn commit_deadline(&self) -> Result<DateTime<Utc>, GameError> {
        // present in every state from Joined onward
        self.commit_deadline_at
            .ok_or(GameError::WrongState(self.state))
    }

    fn reveal_deadline(&self) -> Result<DateTime<Utc>, GameError> {
        // present in every state from BothCommitted onward
        self.reveal_deadline_at
            .ok_or(GameError::WrongState(self.state))
    }

    fn stored_commitment(&self, side: Player) -> Result<Commitment, GameError> {
        self.commitment(side)
            .ok_or(GameError::WrongState(self.state))
    }

    fn seat(&self, side: Player) -> Result<PlayerId, GameError> {
        match side {
            Player::One => Ok(self.player1),
            Player::Two => self.player2.ok_or(GameError::WrongState(self.state)),
        }
    }

    /// Drain the pot into a settlement as part of a terminal transition.
    ///
    /// Computes the payouts first and only then mutates, so a failure
    /// leaves the game untouched. Payouts always sum to the pot.
    fn drain(
        &mut self,
        reason: SettlementReason,
        terminal: GameState,
    ) -> Result<Settlement, GameError> {
        let payouts = match reason {
            SettlementReason::Cancelled => vec![Payout {
                player: self.player1,
                amount: self.pot,
            }],
            SettlementReason::Showdown(outcome) => match outcome.winner() {
                Some(winner) => vec![Payout {
                    player: self.seat(winner)?,
                    amount: self.pot,
                }],
                None => self.refund_both()?,
            },
            SettlementReason::CommitForfeit(side) | SettlementReason::RevealForfeit(side) => {
                vec![Payout {
                    player: self.seat(side)?,
                    amount: self.pot,
                }]
            }
            SettlementReason::CommitRefund | SettlementReason::RevealRefund => {
                self.refund_both()?
            }
        };
        self.pot = 0;
        self.state = terminal;
        Ok(Settlement {
            game_id: self.id,
            reason,
            payouts,
        })
    }

    fn refund_both(&self) -> Result<Vec<Payout>, GameError> {
        let player2 = self.player2.ok_or(GameError::WrongState(self.state))?;
        Ok(vec![
            Payout {
                player: self.player1,
                amount: self.stake,
            },
            Payout {
                player: player2,
                amount: self.stake,
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn created_game(creator: PlayerId) -> Game {
        Game::create(GameId::from_raw(1), creator, 100, 100, 120, 120, t0()).unwrap()
    }

    #[test]
    fn test_create_requires_matching_deposit() {
        let creator = PlayerId::new();
        let err =
            Game::create(GameId::from_raw(1), creator, 99, 100, 120, 120, t0()).unwrap_err();
        assert_eq!(
            err,
            GameError::StakeMismatch {
                stake: 100,
                deposit: 99
            }
        );
    }

    #[test]
    fn test_create_rejects_zero_windows() {
        let creator = PlayerId::new();
        let err = Game::create(GameId::from_raw(1), creator, 100, 100, 0, 120, t0()).unwrap_err();
        assert_eq!(err, GameError::InvalidDeadline);
        let err = Game::create(GameId::from_raw(1), creator, 100, 100, 120, 0, t0()).unwrap_err();
        assert_eq!(err, GameError::InvalidDeadline);
    }

    #[test]
    fn test_creator_cannot_join_own_game() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);
        assert_eq!(game.join(creator, 100, t0()), Err(GameError::SelfJoin));
    }

    #[test]
    fn test_join_requires_matching_stake() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);
        assert_eq!(
            game.join(PlayerId::new(), 50, t0()),
            Err(GameError::StakeMismatch {
                stake: 100,
                deposit: 50
            })
        );
        assert_eq!(game.state(), GameState::Created);
        assert_eq!(game.pot(), 100);
    }

    #[test]
    fn test_join_fills_pot_and_starts_commit_window() {
        let creator = PlayerId::new();
        let opponent = PlayerId::new();
        let mut game = created_game(creator);
        game.join(opponent, 100, t0()).unwrap();

        assert_eq!(game.state(), GameState::Joined);
        assert_eq!(game.pot(), 200);
        assert_eq!(game.player2(), Some(opponent));
        assert_eq!(
            game.commit_deadline_at(),
            Some(t0() + Duration::seconds(120))
        );
        assert_eq!(game.reveal_deadline_at(), None);
    }

    #[test]
    fn test_outsider_cannot_commit() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);
        game.join(PlayerId::new(), 100, t0()).unwrap();

        let salt = Salt::random();
        let commitment = Commitment::new(Move::Rock, &salt);
        assert_eq!(
            game.commit(PlayerId::new(), commitment, t0()),
            Err(GameError::NotParticipant)
        );
    }

    #[test]
    fn test_double_commit_rejected() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);
        game.join(PlayerId::new(), 100, t0()).unwrap();

        let commitment = Commitment::new(Move::Rock, &Salt::random());
        game.commit(creator, commitment, t0()).unwrap();
        assert_eq!(
            game.commit(creator, commitment, t0()),
            Err(GameError::AlreadyCommitted)
        );
    }

    #[test]
    fn test_second_commitment_starts_reveal_window() {
        let creator = PlayerId::new();
        let opponent = PlayerId::new();
        let mut game = created_game(creator);
        game.join(opponent, 100, t0()).unwrap();

        let state = game
            .commit(creator, Commitment::new(Move::Rock, &Salt::random()), t0())
            .unwrap();
        assert_eq!(state, GameState::Joined);
        assert_eq!(game.reveal_deadline_at(), None);

        let later = t0() + Duration::seconds(30);
        let state = game
            .commit(
                opponent,
                Commitment::new(Move::Paper, &Salt::random()),
                later,
            )
            .unwrap();
        assert_eq!(state, GameState::BothCommitted);
        assert_eq!(
            game.reveal_deadline_at(),
            Some(later + Duration::seconds(120))
        );
    }

    #[test]
    fn test_failed_verification_is_retryable() {
        let creator = PlayerId::new();
        let opponent = PlayerId::new();
        let mut game = created_game(creator);
        game.join(opponent, 100, t0()).unwrap();

        let salt1 = Salt::from_bytes(*b"salt-one");
        let salt2 = Salt::from_bytes(*b"salt-two");
        game.commit(creator, Commitment::new(Move::Rock, &salt1), t0())
            .unwrap();
        game.commit(opponent, Commitment::new(Move::Paper, &salt2), t0())
            .unwrap();

        // Wrong salt first, then the real one.
        assert_eq!(
            game.reveal(creator, Move::Rock, &salt2, t0()),
            Err(GameError::CommitmentMismatch)
        );
        assert_eq!(game.state(), GameState::BothCommitted);
        assert!(game.reveal(creator, Move::Rock, &salt1, t0()).unwrap().is_none());
    }

    #[test]
    fn test_cancel_refunds_creator() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);

        let settlement = game.cancel(creator).unwrap();
        assert_eq!(settlement.reason, SettlementReason::Cancelled);
        assert_eq!(settlement.payouts.len(), 1);
        assert_eq!(settlement.payouts[0].player, creator);
        assert_eq!(settlement.payouts[0].amount, 100);
        assert_eq!(game.pot(), 0);
        assert_eq!(game.state(), GameState::Cancelled);
    }

    #[test]
    fn test_only_creator_can_cancel() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);
        assert_eq!(game.cancel(PlayerId::new()), Err(GameError::NotParticipant));
    }

    #[test]
    fn test_cancelled_game_is_locked() {
        let creator = PlayerId::new();
        let mut game = created_game(creator);
        game.cancel(creator).unwrap();

        assert_eq!(
            game.join(PlayerId::new(), 100, t0()),
            Err(GameError::WrongState(GameState::Cancelled))
        );
        assert_eq!(game.cancel(creator), Err(GameError::WrongState(GameState::Cancelled)));
        assert_eq!(game.pot(), 0);
    }

    #[test]
    fn test_draw_splits_pot_stake_for_stake() {
        let creator = PlayerId::new();
        let opponent = PlayerId::new();
        let mut game = created_game(creator);
        game.join(opponent, 100, t0()).unwrap();

        let salt1 = Salt::from_bytes(*b"salt-one");
        let salt2 = Salt::from_bytes(*b"salt-two");
        game.commit(creator, Commitment::new(Move::Paper, &salt1), t0())
            .unwrap();
        game.commit(opponent, Commitment::new(Move::Paper, &salt2), t0())
            .unwrap();
        game.reveal(creator, Move::Paper, &salt1, t0()).unwrap();
        let settlement = game
            .reveal(opponent, Move::Paper, &salt2, t0())
            .unwrap()
            .unwrap();

        assert_eq!(
            settlement.reason,
            SettlementReason::Showdown(Outcome::Draw)
        );
        assert_eq!(settlement.total(), 200);
        assert_eq!(settlement.payouts.len(), 2);
        assert!(settlement
            .payouts
            .iter()
            .any(|p| p.player == creator && p.amount == 100));
        assert!(settlement
            .payouts
            .iter()
            .any(|p| p.player == opponent && p.amount == 100));
        assert_eq!(game.pot(), 0);
        assert_eq!(game.state(), GameState::Resolved);
    }
}
