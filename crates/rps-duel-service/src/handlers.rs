//! HTTP API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use rps_duel_core::{
    Commitment, GameError, GameId, GameState, GameSummary, PlayerId, Salt, Settlement,
};

use crate::state::{AppState, PlayerAccount, ServiceError};

/// Application error type mapping rejections onto status codes.
pub struct AppError(ServiceError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Game(GameError::GameNotFound(_)) | ServiceError::PlayerNotFound => {
                StatusCode::NOT_FOUND
            }
            ServiceError::Game(
                GameError::WrongState(_)
                | GameError::DeadlineExpired
                | GameError::DeadlineNotReached,
            ) => StatusCode::CONFLICT,
            _ => StatusCode::BAD_REQUEST,
        };
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        AppError(err)
    }
}

// ============ Request/Response types ============

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: String,
}

#[derive(Serialize)]
pub struct PlayersResponse {
    pub players: Vec<PlayerAccount>,
}

#[derive(Deserialize)]
pub struct CreateGameRequest {
    pub player_id: PlayerId,
    pub stake: u64,
    /// Attached value; must equal the stake.
    pub deposit: u64,
    pub commit_deadline_secs: i64,
    pub reveal_deadline_secs: i64,
}

#[derive(Serialize)]
pub struct CreateGameResponse {
    pub game_id: GameId,
}

#[derive(Deserialize)]
pub struct JoinGameRequest {
    pub player_id: PlayerId,
    pub deposit: u64,
}

#[derive(Deserialize)]
pub struct CancelRequest {
    pub player_id: PlayerId,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Deserialize)]
pub struct CommitRequest {
    pub player_id: PlayerId,
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct RevealRequest {
    pub player_id: PlayerId,
    #[serde(rename = "move")]
    pub move_byte: u8,
    pub salt: Salt,
}

#[derive(Serialize)]
pub struct RevealResponse {
    pub status: String,
    pub settlement: Option<Settlement>,
}

#[derive(Serialize)]
pub struct SettlementResponse {
    pub status: String,
    pub settlement: Settlement,
}

#[derive(Serialize)]
pub struct GameResponse {
    pub game_id: GameId,
    pub player1: PlayerId,
    pub player2: Option<PlayerId>,
    pub stake: u64,
    pub state: GameState,
}

impl From<GameSummary> for GameResponse {
    fn from(summary: GameSummary) -> Self {
        Self {
            game_id: summary.id,
            player1: summary.player1,
            player2: summary.player2,
            stake: summary.stake,
            state: summary.state,
        }
    }
}

#[derive(Serialize)]
pub struct OpenGamesResponse {
    pub games: Vec<GameResponse>,
}

#[derive(Deserialize)]
pub struct TickRequest {
    pub seconds: i64,
}

#[derive(Serialize)]
pub struct TickResponse {
    pub now: DateTime<Utc>,
}

// ============ Player handlers ============

pub async fn register_player(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Json<PlayerAccount> {
    let account = state.register_player(req.name);
    info!("Registered player {} as {}", account.name, account.id);
    Json(account)
}

pub async fn list_players(State(state): State<AppState>) -> Json<PlayersResponse> {
    Json(PlayersResponse {
        players: state.list_players(),
    })
}

// ============ Game handlers ============

pub async fn create_game(
    State(state): State<AppState>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<CreateGameResponse>, AppError> {
    let game_id = state.create_game(
        req.player_id,
        req.deposit,
        req.stake,
        req.commit_deadline_secs,
        req.reveal_deadline_secs,
    )?;
    info!(
        "Player {} created game {} with stake {}",
        req.player_id, game_id, req.stake
    );
    Ok(Json(CreateGameResponse { game_id }))
}

pub async fn get_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<GameResponse>, AppError> {
    Ok(Json(state.basic(game_id)?.into()))
}

pub async fn list_open_games(State(state): State<AppState>) -> Json<OpenGamesResponse> {
    Json(OpenGamesResponse {
        games: state.open_games().into_iter().map(Into::into).collect(),
    })
}

pub async fn join_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(req): Json<JoinGameRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    state.join_game(game_id, req.player_id, req.deposit)?;
    info!("Player {} joined game {}", req.player_id, game_id);
    Ok(Json(StatusResponse {
        status: "joined".to_string(),
    }))
}

pub async fn commit_move(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(req): Json<CommitRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let game_state = state.commit_move(game_id, req.player_id, req.commitment)?;
    info!("Player {} committed in game {}", req.player_id, game_id);
    let status = if game_state == GameState::BothCommitted {
        "both_committed"
    } else {
        "commitment_received"
    };
    Ok(Json(StatusResponse {
        status: status.to_string(),
    }))
}

pub async fn reveal_move(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(req): Json<RevealRequest>,
) -> Result<Json<RevealResponse>, AppError> {
    let settlement = state.reveal_move(game_id, req.player_id, req.move_byte, &req.salt)?;
    info!("Player {} revealed in game {}", req.player_id, game_id);
    let status = if settlement.is_some() {
        "game_complete"
    } else {
        "waiting_for_opponent"
    };
    if let Some(ref settlement) = settlement {
        info!("Game {} settled: {:?}", game_id, settlement.reason);
    }
    Ok(Json(RevealResponse {
        status: status.to_string(),
        settlement,
    }))
}

pub async fn cancel_game(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
    Json(req): Json<CancelRequest>,
) -> Result<Json<SettlementResponse>, AppError> {
    let settlement = state.cancel_game(game_id, req.player_id)?;
    info!("Player {} cancelled game {}", req.player_id, game_id);
    Ok(Json(SettlementResponse {
        status: "cancelled".to_string(),
        settlement,
    }))
}

pub async fn claim_commit_timeout(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<SettlementResponse>, AppError> {
    let settlement = state.claim_commit_timeout(game_id)?;
    info!(
        "Commit timeout claimed on game {}: {:?}",
        game_id, settlement.reason
    );
    Ok(Json(SettlementResponse {
        status: "settled".to_string(),
        settlement,
    }))
}

pub async fn claim_reveal_timeout(
    State(state): State<AppState>,
    Path(game_id): Path<GameId>,
) -> Result<Json<SettlementResponse>, AppError> {
    let settlement = state.claim_reveal_timeout(game_id)?;
    info!(
        "Reveal timeout claimed on game {}: {:?}",
        game_id, settlement.reason
    );
    Ok(Json(SettlementResponse {
        status: "settled".to_string(),
        settlement,
    }))
}

// ============ System handlers ============

pub async fn tick(
    State(state): State<AppState>,
    Json(req): Json<TickRequest>,
) -> Json<TickResponse> {
    let now = state.advance_time(req.seconds);
    info!("Simulated clock advanced {}s to {}", req.seconds, now);
    Json(TickResponse { now })
}
