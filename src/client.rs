//! Client-side game session: the state machine behind the live board. Owns
//! everything the view layer needs to mirror server-confirmed state, without
//! touching the DOM or the network itself. The browser glue feeds it parsed
//! server responses and renders whatever outcome it returns.

use log::{info, warn};

use crate::color::PlayerColor;
use crate::event::{GameResponse, MoveRequest};
use crate::fen::Fen;
use crate::history::PositionHistory;
use crate::pgn::{self, MoveRow, MoveToken};
use crate::session::{SessionStore, SessionStoreExt};


/// Widget name for a drop target outside the board.
pub const OFFBOARD: &str = "offboard";

/// Where the session is in the request/response cycle. Purely informational
/// between `Idle` and the awaiting states (the UI does not lock user input
/// while a request is in flight); `Terminal` is load-bearing: it keeps a
/// finished game finished.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SyncState {
    Idle,
    /// A player move is in flight; `prev_fen` is the position to snap back to
    /// if the server refuses it.
    AwaitingMove { prev_fen: Fen },
    /// The player's move was confirmed and the engine reply is due or in
    /// flight.
    AwaitingEngine,
    Terminal,
}

/// What the view layer must do after a move exchange has been applied.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum TurnOutcome {
    /// Half-move confirmed: reposition the board, rebuild the move list.
    /// After a player move the engine reply is due next.
    Accepted { fen: Fen, pgn: String, engine_reply_due: bool },
    /// The game just ended: show the final position on a static board.
    GameOver { fen: Fen, pgn: String, result: String },
    /// Move refused or the request failed in transit: snap back to `restore`
    /// when there is a pending position to restore.
    Rejected { restore: Option<Fen>, reason: Option<String> },
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum UndoOutcome {
    Undone { fen: Fen, pgn: String },
    Failed { reason: Option<String> },
}

/// How to render the board for a given position.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct BoardRender {
    pub fen: Fen,
    pub interactive: bool,
}

/// The live game session. All state is explicit here rather than spread over
/// page globals, so the whole request/response cycle is testable against an
/// in-memory store.
pub struct GameSession<S: SessionStore> {
    store: S,
    player_color: PlayerColor,
    current_fen: Fen,
    history: PositionHistory,
    sync_state: SyncState,
}

impl<S: SessionStore> GameSession<S> {
    /// Picks up the session persisted by the game creation page, or falls
    /// back to a fresh default game.
    pub fn resume(store: S) -> Self {
        let player_color = store.player_color().unwrap_or(PlayerColor::White);
        let current_fen = store.current_fen().unwrap_or_else(Fen::starting_position);
        let history = store.position_history();
        GameSession {
            store,
            player_color,
            current_fen,
            history,
            sync_state: SyncState::Idle,
        }
    }

    pub fn player_color(&self) -> PlayerColor { self.player_color }
    pub fn current_fen(&self) -> &Fen { &self.current_fen }
    pub fn history(&self) -> &PositionHistory { &self.history }
    pub fn sync_state(&self) -> &SyncState { &self.sync_state }
    pub fn store(&self) -> &S { &self.store }

    /// How the live board should be shown right now.
    pub fn live_board(&self) -> BoardRender {
        BoardRender {
            fen: self.current_fen.clone(),
            interactive: self.sync_state != SyncState::Terminal,
        }
    }

    /// Turns a drop gesture into a move request. A drop outside the board or
    /// back onto its source square is a no-op and must not reach the network;
    /// so is any gesture on a finished game.
    pub fn begin_move(&mut self, source: &str, target: &str) -> Option<MoveRequest> {
        if target == OFFBOARD || source == target {
            return None;
        }
        if self.sync_state == SyncState::Terminal {
            return None;
        }
        self.sync_state = SyncState::AwaitingMove { prev_fen: self.current_fen.clone() };
        Some(MoveRequest {
            from_square: source.to_owned(),
            to_square: target.to_owned(),
        })
    }

    /// Applies the server verdict on the player's move. Transport failures
    /// arrive here as `Rejected` with no reason: they are handled exactly
    /// like a refused move.
    pub fn apply_move_response(&mut self, response: GameResponse) -> TurnOutcome {
        let prev_fen = match &self.sync_state {
            SyncState::AwaitingMove { prev_fen } => Some(prev_fen.clone()),
            state => {
                warn!("move response arrived in state {state:?}");
                None
            }
        };
        match response {
            GameResponse::Ok { fen, pgn } => {
                self.confirm_half_move(fen.clone());
                self.sync_state = SyncState::AwaitingEngine;
                TurnOutcome::Accepted { fen, pgn, engine_reply_due: true }
            }
            GameResponse::GameOver { fen, pgn, result } => self.finish_game(fen, pgn, result),
            GameResponse::Rejected { reason } => {
                self.sync_state = SyncState::Idle;
                TurnOutcome::Rejected { restore: prev_fen, reason }
            }
        }
    }

    /// Applies the engine's reply. Same three-way handling as the player
    /// move, minus the rollback: there is no pending local move to undo.
    pub fn apply_engine_response(&mut self, response: GameResponse) -> TurnOutcome {
        match response {
            GameResponse::Ok { fen, pgn } => {
                self.confirm_half_move(fen.clone());
                self.sync_state = SyncState::Idle;
                TurnOutcome::Accepted { fen, pgn, engine_reply_due: false }
            }
            GameResponse::GameOver { fen, pgn, result } => self.finish_game(fen, pgn, result),
            GameResponse::Rejected { reason } => {
                self.sync_state = SyncState::Idle;
                TurnOutcome::Rejected { restore: None, reason }
            }
        }
    }

    /// Applies the `/undo` result. History is only truncated once the server
    /// has confirmed: a failed undo leaves it untouched.
    pub fn apply_undo_response(&mut self, response: GameResponse) -> UndoOutcome {
        match response {
            GameResponse::Ok { fen, pgn } => {
                self.history.pop_full_move();
                self.current_fen = fen.clone();
                self.sync_state = SyncState::Idle;
                self.persist();
                UndoOutcome::Undone { fen, pgn }
            }
            GameResponse::GameOver { .. } => {
                warn!("undo answered with a game-over payload");
                UndoOutcome::Failed { reason: None }
            }
            GameResponse::Rejected { reason } => UndoOutcome::Failed { reason },
        }
    }

    /// Installs a server-confirmed custom position. A custom position starts
    /// a fresh history context; the move list resets with it.
    pub fn apply_custom_fen(&mut self, fen: Fen) {
        info!("custom position installed");
        self.history.clear();
        self.current_fen = fen;
        self.sync_state = SyncState::Idle;
        self.store.clear_game();
        self.store.set_current_fen(&self.current_fen);
    }

    /// Resets the session for the fresh game the server just created.
    pub fn start_new_game(&mut self, fen: Fen) {
        info!("new game");
        self.history.clear();
        self.current_fen = fen;
        self.player_color = PlayerColor::White;
        self.sync_state = SyncState::Idle;
        self.store.clear_game();
        self.store.set_player_color(self.player_color);
        self.store.set_current_fen(&self.current_fen);
    }

    /// Parses the move list and resets the persisted button counter to match
    /// the rebuilt rows.
    pub fn rebuild_move_rows(&mut self, pgn_text: &str) -> Vec<MoveRow> {
        let rows = pgn::parse_move_rows(pgn_text);
        self.store.set_fen_index(pgn::consumed_indices(&rows));
        rows
    }

    /// Position to show when a move button is activated. Interactive exactly
    /// when it is the live position and the move did not end the game.
    pub fn replay_view(&self, token: &MoveToken) -> Option<BoardRender> {
        let fen = self.history.get(token.fen_index)?.clone();
        let interactive = fen == self.current_fen && !token.is_checkmate();
        Some(BoardRender { fen, interactive })
    }

    /// The placeholder slot is inert unless the half-move before it delivered
    /// checkmate; then it shows the final position, never interactive.
    pub fn placeholder_view(&self, preceding: &MoveToken) -> Option<BoardRender> {
        if !preceding.is_checkmate() {
            return None;
        }
        let fen = self.history.last()?.clone();
        Some(BoardRender { fen, interactive: false })
    }

    fn confirm_half_move(&mut self, fen: Fen) {
        self.history.push(fen.clone());
        self.current_fen = fen;
        self.persist();
    }

    fn finish_game(&mut self, fen: Fen, pgn: String, result: String) -> TurnOutcome {
        info!("game over: {result}");
        self.confirm_half_move(fen.clone());
        self.sync_state = SyncState::Terminal;
        TurnOutcome::GameOver { fen, pgn, result }
    }

    fn persist(&mut self) {
        self.store.set_current_fen(&self.current_fen);
        self.store.set_position_history(&self.history);
    }
}

/// Game creation bookkeeping shared by the start-game and custom-position
/// flows on the entry page: persist the assigned color and starting position,
/// drop any stale game state. The game view picks these up after navigation.
pub fn record_game_start(store: &mut impl SessionStore, color: PlayerColor, fen: &Fen) {
    store.set_player_color(color);
    store.set_current_fen(fen);
    store.clear_game();
}
