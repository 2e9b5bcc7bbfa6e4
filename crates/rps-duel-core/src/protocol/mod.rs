//! Protocol types.

mod types;

pub use types::{
    GameId, GameState, GameSummary, Payout, Player, PlayerId, Settlement, SettlementReason,
};
