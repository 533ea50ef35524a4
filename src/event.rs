//! The JSON contract with the game server. The server owns all chess
//! knowledge; these types only mirror its payloads.

use serde::{Deserialize, Serialize};

use crate::color::PlayerColor;
use crate::fen::Fen;


/// Endpoint paths. Fixed contract, reproduced exactly.
pub mod endpoints {
    pub const NEW_GAME: &str = "/new_game";
    pub const START_GAME: &str = "/start_game";
    pub const MOVE: &str = "/move";
    pub const ENGINE_MOVE: &str = "/engine_move";
    pub const SET_FEN: &str = "/set_fen";
    pub const UNDO: &str = "/undo";
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct MoveRequest {
    #[serde(rename = "fromSquare")]
    pub from_square: String,
    #[serde(rename = "toSquare")]
    pub to_square: String,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct StartGameRequest {
    pub side: PlayerColor,
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct SetFenRequest {
    pub fen: Fen,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewGameResponse {
    pub fen: Fen,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StartGameResponse {
    pub color: PlayerColor,
    pub fen: Fen,
}

/// Error payload shape used by game creation flows. The server is not
/// consistent about the field name, so both are accepted.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn from_json(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    pub fn text(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ProtocolError {
    MalformedJson(String),
    MissingField(&'static str),
}

// The server reports move verdicts as a loose `{status, fen, pgn,
// game_status}` object. Parsed here once into a tagged type so that every
// consumer handles all three cases.
#[derive(Clone, Debug, Default, Deserialize)]
struct RawGameResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    fen: Option<Fen>,
    #[serde(default)]
    pgn: Option<String>,
    #[serde(default)]
    game_status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Server verdict on a half-move (player or engine). Also the success shape
/// of `/undo`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum GameResponse {
    /// Move accepted, game continues.
    Ok { fen: Fen, pgn: String },
    /// Move accepted and it ended the game; `result` is the human-readable
    /// outcome text.
    GameOver { fen: Fen, pgn: String, result: String },
    /// Anything else. A missing or unknown status is a rejection too.
    Rejected { reason: Option<String> },
}

impl GameResponse {
    pub fn from_json(body: &str) -> Result<Self, ProtocolError> {
        let raw: RawGameResponse = serde_json::from_str(body)
            .map_err(|err| ProtocolError::MalformedJson(err.to_string()))?;
        match raw.status.as_deref() {
            Some("ok") => Ok(GameResponse::Ok {
                fen: raw.fen.ok_or(ProtocolError::MissingField("fen"))?,
                pgn: raw.pgn.ok_or(ProtocolError::MissingField("pgn"))?,
            }),
            Some("game_over") => Ok(GameResponse::GameOver {
                fen: raw.fen.ok_or(ProtocolError::MissingField("fen"))?,
                pgn: raw.pgn.ok_or(ProtocolError::MissingField("pgn"))?,
                result: raw.game_status.unwrap_or_else(|| "game over".to_owned()),
            }),
            _ => Ok(GameResponse::Rejected {
                reason: raw.error.or(raw.message),
            }),
        }
    }
}

/// Outcome of the JSON variant of `/set_fen`. The other variant signals
/// success through an HTTP redirect and never reaches this parser.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SetFenResponse {
    Ok { fen: Option<Fen> },
    Rejected { reason: Option<String> },
}

impl SetFenResponse {
    pub fn from_json(body: &str) -> Result<Self, ProtocolError> {
        let raw: RawGameResponse = serde_json::from_str(body)
            .map_err(|err| ProtocolError::MalformedJson(err.to_string()))?;
        match raw.status.as_deref() {
            Some("ok") => Ok(SetFenResponse::Ok { fen: raw.fen }),
            _ => Ok(SetFenResponse::Rejected {
                reason: raw.error.or(raw.message),
            }),
        }
    }
}
