//! Application state: engine registry, mock ledger, simulated clock.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use rps_duel_core::{
    Commitment, GameError, GameId, GameRegistry, GameState, GameSummary, PlayerId, Salt,
    Settlement,
};

/// Balance every freshly registered demo account starts with.
pub const STARTING_BALANCE: u64 = 100_000;

/// Service-level failures wrapping engine rejections.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("player not found")]
    PlayerNotFound,

    #[error("insufficient balance: have {balance}, need {needed}")]
    InsufficientBalance { balance: u64, needed: u64 },
}

/// A registered player account on the mock ledger.
#[derive(Clone, Debug, Serialize)]
pub struct PlayerAccount {
    pub id: PlayerId,
    pub name: String,
    pub balance: u64,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Mutex<AppStateInner>>,
}

struct AppStateInner {
    registry: GameRegistry,
    players: HashMap<PlayerId, PlayerAccount>,
    /// Simulated current time (for timeout testing)
    current_time: Option<DateTime<Utc>>,
}

impl AppStateInner {
    fn now(&self) -> DateTime<Utc> {
        self.current_time.unwrap_or_else(Utc::now)
    }

    fn balance_of(&self, player: PlayerId) -> Result<u64, ServiceError> {
        self.players
            .get(&player)
            .map(|account| account.balance)
            .ok_or(ServiceError::PlayerNotFound)
    }

    fn debit(&mut self, player: PlayerId, amount: u64) {
        if let Some(account) = self.players.get_mut(&player) {
            account.balance = account.balance.saturating_sub(amount);
        }
    }

    fn apply_settlement(&mut self, settlement: &Settlement) {
        for payout in &settlement.payouts {
            if let Some(account) = self.players.get_mut(&payout.player) {
                account.balance += payout.amount;
            }
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(AppStateInner {
                registry: GameRegistry::new(),
                players: HashMap::new(),
                current_time: None,
            })),
        }
    }

    /// Get current time (real or simulated)
    pub fn now(&self) -> DateTime<Utc> {
        self.inner.lock().unwrap().now()
    }

    /// Advance simulated time by seconds
    pub fn advance_time(&self, seconds: i64) -> DateTime<Utc> {
        let mut inner = self.inner.lock().unwrap();
        let advanced = inner.now() + chrono::Duration::seconds(seconds);
        inner.current_time = Some(advanced);
        advanced
    }

    // Player operations

    pub fn register_player(&self, name: String) -> PlayerAccount {
        let account = PlayerAccount {
            id: PlayerId::new(),
            name,
            balance: STARTING_BALANCE,
        };
        let mut inner = self.inner.lock().unwrap();
        inner.players.insert(account.id, account.clone());
        account
    }

    pub fn get_player(&self, id: PlayerId) -> Option<PlayerAccount> {
        self.inner.lock().unwrap().players.get(&id).cloned()
    }

    pub fn list_players(&self) -> Vec<PlayerAccount> {
        let inner = self.inner.lock().unwrap();
        let mut players: Vec<PlayerAccount> = inner.players.values().cloned().collect();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        players
    }

    // Game operations; each one debits or credits the mock ledger as
    // part of the same locked section that mutates the registry.

    pub fn create_game(
        &self,
        creator: PlayerId,
        deposit: u64,
        stake: u64,
        commit_deadline_secs: i64,
        reveal_deadline_secs: i64,
    ) -> Result<GameId, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        let balance = inner.balance_of(creator)?;
        if balance < deposit {
            return Err(ServiceError::InsufficientBalance {
                balance,
                needed: deposit,
            });
        }
        let id = inner.registry.create_game(
            creator,
            deposit,
            stake,
            commit_deadline_secs,
            reveal_deadline_secs,
            now,
        )?;
        inner.debit(creator, deposit);
        Ok(id)
    }

    pub fn join_game(
        &self,
        id: GameId,
        caller: PlayerId,
        deposit: u64,
    ) -> Result<(), ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        let balance = inner.balance_of(caller)?;
        if balance < deposit {
            return Err(ServiceError::InsufficientBalance {
                balance,
                needed: deposit,
            });
        }
        inner.registry.join_game(id, caller, deposit, now)?;
        inner.debit(caller, deposit);
        Ok(())
    }

    pub fn commit_move(
        &self,
        id: GameId,
        caller: PlayerId,
        commitment: Commitment,
    ) -> Result<GameState, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        Ok(inner.registry.commit_move(id, caller, commitment, now)?)
    }

    pub fn reveal_move(
        &self,
        id: GameId,
        caller: PlayerId,
        move_byte: u8,
        salt: &Salt,
    ) -> Result<Option<Settlement>, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        let settlement = inner.registry.reveal_move(id, caller, move_byte, salt, now)?;
        if let Some(ref settlement) = settlement {
            inner.apply_settlement(settlement);
        }
        Ok(settlement)
    }

    pub fn cancel_game(&self, id: GameId, caller: PlayerId) -> Result<Settlement, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let settlement = inner.registry.cancel_game(id, caller)?;
        inner.apply_settlement(&settlement);
        Ok(settlement)
    }

    pub fn claim_commit_timeout(&self, id: GameId) -> Result<Settlement, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        let settlement = inner.registry.claim_commit_timeout(id, now)?;
        inner.apply_settlement(&settlement);
        Ok(settlement)
    }

    pub fn claim_reveal_timeout(&self, id: GameId) -> Result<Settlement, ServiceError> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.now();
        let settlement = inner.registry.claim_reveal_timeout(id, now)?;
        inner.apply_settlement(&settlement);
        Ok(settlement)
    }

    pub fn basic(&self, id: GameId) -> Result<GameSummary, ServiceError> {
        Ok(self.inner.lock().unwrap().registry.basic(id)?)
    }

    pub fn open_games(&self) -> Vec<GameSummary> {
        self.inner.lock().unwrap().registry.open_games()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
