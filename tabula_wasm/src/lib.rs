//! Browser glue for the chess client: page initialization, event wiring and
//! the async request flows. All game-state decisions live in `tabula_chess`;
//! this crate translates between that session model and the page.

pub mod board;
pub mod move_list;
pub mod network;
pub mod storage;
pub mod web_document;
pub mod web_element_ext;
pub mod web_error_handling;
pub mod web_util;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use log::{error, info, warn};
use tabula_chess::client::{GameSession, TurnOutcome, UndoOutcome, record_game_start};
use tabula_chess::color::{PlayerColor, SideChoice};
use tabula_chess::event::{
    ErrorResponse, GameResponse, MoveRequest, NewGameResponse, SetFenRequest, SetFenResponse,
    StartGameRequest, StartGameResponse, endpoints,
};
use tabula_chess::fen::Fen;
use tabula_chess::session::SessionStoreExt;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::board::{BoardView, DropHandler};
use crate::move_list::MoveListActivation;
use crate::storage::LocalStore;
use crate::web_document::{web_document, web_window};
use crate::web_element_ext::add_event_listener_and_forget;
use crate::web_error_handling::{JsResult, init_runtime};


const STATUS_ID: &str = "statusEl";
const NEW_GAME_BUTTON_ID: &str = "newGameBtn";
const UNDO_BUTTON_ID: &str = "undoBtn";
const FEN_INPUT_ID: &str = "userInput";
const SET_FEN_BUTTON_ID: &str = "setFenBtn";
const PLAY_WHITE_BUTTON_ID: &str = "playWhiteBtn";
const PLAY_BLACK_BUTTON_ID: &str = "playBlackBtn";
const PLAY_RANDOM_BUTTON_ID: &str = "playRandomBtn";
const GAME_PAGE_PATH: &str = "/game";

// Pacing for the opponent reply. Long enough for the player's own move to
// finish rendering and for the reply to read as a considered move.
const ENGINE_MOVE_DELAY_MS: u32 = 500;

const STATUS_MOVE_OK: &str = "Move successful!";
const STATUS_MOVE_REJECTED: &str = "Move rejected by server.";
const STATUS_SERVER_ERROR: &str = "Server error.";
const STATUS_ENGINE_MOVED: &str = "Engine moved.";
const STATUS_ENGINE_FAILED: &str = "Engine move failed.";
const STATUS_NEW_GAME: &str = "New game started!";
const STATUS_FEN_UPDATED: &str = "Board updated to custom FEN.";
const STATUS_UNDO_OK: &str = "Move undone.";
const STATUS_UNDO_FAILED: &str = "Undo failed.";
const ALERT_EMPTY_FEN: &str = "Please enter a valid FEN string.";
const ALERT_BAD_FEN: &str = "Invalid FEN entered!";
const ALERT_FEN_REQUEST_FAILED: &str = "Failed to update board. Please check your FEN.";

struct App {
    session: GameSession<LocalStore>,
    board: Option<BoardView>,
}

// Single-threaded client; the app context is only ever borrowed synchronously,
// never across an await.
thread_local! {
    static APP: RefCell<Option<App>> = const { RefCell::new(None) };
}

fn with_app<R>(f: impl FnOnce(&mut App) -> JsResult<R>) -> JsResult<R> {
    APP.with(|cell| {
        let mut cell = cell.borrow_mut();
        let app = cell.as_mut().ok_or_else(|| rust_error!("game page is not initialized"))?;
        f(app)
    })
}

impl App {
    /// Shows `fen`, reusing the live widget when its interactivity already
    /// matches and recreating it otherwise.
    fn show_board(&mut self, fen: &Fen, interactive: bool, animate: bool) -> JsResult<()> {
        match &self.board {
            Some(board) if board.is_interactive() == interactive => board.reposition(fen, animate),
            _ => {
                let on_drop = if interactive { Some(drop_handler()) } else { None };
                self.board = Some(BoardView::render(
                    fen,
                    interactive,
                    self.session.player_color(),
                    on_drop,
                )?);
            }
        }
        Ok(())
    }

    fn show_live_board(&mut self) -> JsResult<()> {
        let view = self.session.live_board();
        self.show_board(&view.fen, view.interactive, false)
    }

    /// Replaces the widget unconditionally. Game creation flows do this: a
    /// fresh game deserves a fresh widget.
    fn rebuild_live_board(&mut self) -> JsResult<()> {
        self.board = None;
        self.show_live_board()
    }

    fn rebuild_move_list(&mut self, pgn_text: &str) -> JsResult<()> {
        let rows = self.session.rebuild_move_rows(pgn_text);
        move_list::render_move_list(&rows, &history_activation_handler())
    }

    fn resize_board(&self) {
        if let Some(board) = &self.board {
            board.resize();
        }
    }
}

/// Sets up the live-play page: board from the persisted session, empty move
/// list, and all event wiring.
#[wasm_bindgen]
pub fn init_game_page() -> JsResult<()> {
    init_runtime();
    let session = GameSession::resume(LocalStore::open()?);
    APP.with(|cell| *cell.borrow_mut() = Some(App { session, board: None }));
    with_app(|app| {
        app.show_live_board()?;
        app.rebuild_move_list("")
    })?;

    let document = web_document();
    add_event_listener_and_forget(&web_window(), "resize", |_: web_sys::Event| {
        with_app(|app| {
            app.resize_board();
            Ok(())
        })
    })?;
    let new_game_button = document.get_existing_element_by_id(NEW_GAME_BUTTON_ID)?;
    add_event_listener_and_forget(&new_game_button, "click", |_: web_sys::Event| {
        spawn_logged(start_new_game());
        Ok(())
    })?;
    let undo_button = document.get_existing_element_by_id(UNDO_BUTTON_ID)?;
    add_event_listener_and_forget(&undo_button, "click", |_: web_sys::Event| {
        spawn_logged(request_undo());
        Ok(())
    })?;
    let set_fen_button = document.get_existing_element_by_id(SET_FEN_BUTTON_ID)?;
    add_event_listener_and_forget(&set_fen_button, "click", |_: web_sys::Event| {
        spawn_logged(submit_custom_fen());
        Ok(())
    })?;
    info!("game page initialized");
    Ok(())
}

/// Sets up the entry page: resets the persisted session and wires the game
/// creation controls.
#[wasm_bindgen]
pub fn init_play_page() -> JsResult<()> {
    init_runtime();
    let mut store = LocalStore::open()?;
    store.set_player_color(PlayerColor::White);
    store.set_current_fen(&Fen::starting_position());
    store.clear_game();

    let document = web_document();
    for (button_id, side) in [
        (PLAY_WHITE_BUTTON_ID, SideChoice::White),
        (PLAY_BLACK_BUTTON_ID, SideChoice::Black),
        (PLAY_RANDOM_BUTTON_ID, SideChoice::Random),
    ] {
        let button = document.get_existing_element_by_id(button_id)?;
        add_event_listener_and_forget(&button, "click", move |_: web_sys::Event| {
            spawn_logged(start_game(side));
            Ok(())
        })?;
    }
    let set_fen_button = document.get_existing_element_by_id(SET_FEN_BUTTON_ID)?;
    add_event_listener_and_forget(&set_fen_button, "click", |_: web_sys::Event| {
        spawn_logged(submit_fen_for_new_game());
        Ok(())
    })?;
    info!("entry page initialized");
    Ok(())
}

fn drop_handler() -> DropHandler {
    Closure::new(|source: String, target: String| {
        match with_app(|app| Ok(app.session.begin_move(&source, &target))) {
            Ok(Some(request)) => spawn_logged(submit_move(request)),
            Ok(None) => {}
            Err(err) => error!("drop handling failed: {err:?}"),
        }
    })
}

fn history_activation_handler() -> move_list::ActivationHandler {
    Rc::new(|activation| {
        if let Err(err) = replay_history(activation) {
            error!("history replay failed: {err:?}");
        }
    })
}

fn replay_history(activation: MoveListActivation) -> JsResult<()> {
    with_app(|app| {
        let view = match &activation {
            MoveListActivation::Move(token) => app.session.replay_view(token),
            MoveListActivation::PendingSlot { preceding } => {
                app.session.placeholder_view(preceding)
            }
        };
        match view {
            Some(view) => app.show_board(&view.fen, view.interactive, true),
            None => Ok(()),
        }
    })
}

async fn submit_move(request: MoveRequest) -> JsResult<()> {
    let body = encode(&request)?;
    let (response, transport_failed) =
        match fetch_game_response(endpoints::MOVE, Some(body)).await {
            Ok(response) => (response, false),
            Err(err) => {
                warn!("move request failed: {err:?}");
                (GameResponse::Rejected { reason: None }, true)
            }
        };
    let outcome = with_app(|app| Ok(app.session.apply_move_response(response)))?;
    let engine_reply_due = apply_turn_outcome(TurnRole::Player, transport_failed, outcome)?;
    if engine_reply_due {
        TimeoutFuture::new(ENGINE_MOVE_DELAY_MS).await;
        request_engine_move().await?;
    }
    Ok(())
}

async fn request_engine_move() -> JsResult<()> {
    let (response, transport_failed) =
        match fetch_game_response(endpoints::ENGINE_MOVE, None).await {
            Ok(response) => (response, false),
            Err(err) => {
                warn!("engine move request failed: {err:?}");
                (GameResponse::Rejected { reason: None }, true)
            }
        };
    let outcome = with_app(|app| Ok(app.session.apply_engine_response(response)))?;
    apply_turn_outcome(TurnRole::Engine, transport_failed, outcome)?;
    Ok(())
}

async fn request_undo() -> JsResult<()> {
    let response = match fetch_game_response(endpoints::UNDO, None).await {
        Ok(response) => response,
        Err(err) => {
            warn!("undo request failed: {err:?}");
            GameResponse::Rejected { reason: None }
        }
    };
    let outcome = with_app(|app| Ok(app.session.apply_undo_response(response)))?;
    match outcome {
        UndoOutcome::Undone { fen, pgn } => {
            with_app(|app| {
                app.show_board(&fen, true, true)?;
                app.rebuild_move_list(&pgn)
            })?;
            set_status(STATUS_UNDO_OK)
        }
        UndoOutcome::Failed { reason } => {
            set_status(reason.as_deref().unwrap_or(STATUS_UNDO_FAILED))
        }
    }
}

async fn submit_custom_fen() -> JsResult<()> {
    let fen = Fen::new(fen_input_value()?);
    if fen.is_blank() {
        return alert(ALERT_EMPTY_FEN);
    }
    let body = encode(&SetFenRequest { fen: fen.clone() })?;
    let reply = match network::post_json(endpoints::SET_FEN, &body).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("set_fen request failed: {err:?}");
            return alert(ALERT_FEN_REQUEST_FAILED);
        }
    };
    match SetFenResponse::from_json(&reply.body) {
        Ok(SetFenResponse::Ok { fen: confirmed }) => {
            let fen = confirmed.unwrap_or(fen);
            with_app(|app| {
                app.session.apply_custom_fen(fen.clone());
                app.rebuild_live_board()?;
                app.rebuild_move_list("")
            })?;
            set_status(STATUS_FEN_UPDATED)
        }
        Ok(SetFenResponse::Rejected { reason }) => {
            alert(&format!("Error: {}", reason.as_deref().unwrap_or(ALERT_BAD_FEN)))
        }
        Err(err) => {
            warn!("set_fen reply unreadable: {err:?}");
            alert(ALERT_FEN_REQUEST_FAILED)
        }
    }
}

/// Entry-page flavor of the custom position flow: the server answers with a
/// redirect to the game view instead of a JSON body.
async fn submit_fen_for_new_game() -> JsResult<()> {
    let fen = Fen::new(fen_input_value()?);
    if fen.is_blank() {
        return alert(ALERT_EMPTY_FEN);
    }
    let body = encode(&SetFenRequest { fen: fen.clone() })?;
    let reply = match network::post_json(endpoints::SET_FEN, &body).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("set_fen request failed: {err:?}");
            return alert(ALERT_FEN_REQUEST_FAILED);
        }
    };
    if reply.redirected {
        let mut store = LocalStore::open()?;
        record_game_start(&mut store, fen.side_to_move(), &fen);
        navigate(&reply.url)
    } else {
        let error = ErrorResponse::from_json(&reply.body);
        alert(&format!("Error: {}", error.text().unwrap_or(ALERT_BAD_FEN)))
    }
}

async fn start_game(side: SideChoice) -> JsResult<()> {
    let color = side.resolve(&mut rand::rng());
    let body = encode(&StartGameRequest { side: color })?;
    let reply = match network::post_json(endpoints::START_GAME, &body).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("start_game request failed: {err:?}");
            return alert("Failed to start game: server unreachable.");
        }
    };
    if reply.ok {
        let response: StartGameResponse = serde_json::from_str(&reply.body)
            .map_err(|err| rust_error!("unreadable start_game reply: {err}"))?;
        let mut store = LocalStore::open()?;
        record_game_start(&mut store, response.color, &response.fen);
        navigate(GAME_PAGE_PATH)
    } else {
        let error = ErrorResponse::from_json(&reply.body);
        alert(&format!("Failed to start game: {}", error.text().unwrap_or("server error")))
    }
}

async fn start_new_game() -> JsResult<()> {
    let reply = match network::get(endpoints::NEW_GAME).await {
        Ok(reply) => reply,
        Err(err) => {
            warn!("new_game request failed: {err:?}");
            return alert(STATUS_SERVER_ERROR);
        }
    };
    let response: NewGameResponse = match serde_json::from_str(&reply.body) {
        Ok(response) => response,
        Err(err) => {
            warn!("unreadable new_game reply: {err}");
            return alert(STATUS_SERVER_ERROR);
        }
    };
    with_app(|app| {
        app.session.start_new_game(response.fen.clone());
        app.rebuild_live_board()?;
        app.rebuild_move_list("")
    })?;
    set_status(response.message.as_deref().unwrap_or(STATUS_NEW_GAME))
}

enum TurnRole {
    Player,
    Engine,
}

/// Maps a move outcome onto the page. Returns whether the engine reply should
/// be requested next.
fn apply_turn_outcome(
    role: TurnRole, transport_failed: bool, outcome: TurnOutcome,
) -> JsResult<bool> {
    match outcome {
        TurnOutcome::Accepted { fen, pgn, engine_reply_due } => {
            with_app(|app| {
                app.show_board(&fen, true, true)?;
                app.rebuild_move_list(&pgn)
            })?;
            set_status(match role {
                TurnRole::Player => STATUS_MOVE_OK,
                TurnRole::Engine => STATUS_ENGINE_MOVED,
            })?;
            Ok(engine_reply_due)
        }
        TurnOutcome::GameOver { fen, pgn, result } => {
            with_app(|app| {
                app.show_board(&fen, false, true)?;
                app.rebuild_move_list(&pgn)
            })?;
            set_status(&format!("Game Over: {result}"))?;
            Ok(false)
        }
        TurnOutcome::Rejected { restore, reason } => {
            if let Some(fen) = restore {
                with_app(|app| app.show_board(&fen, true, true))?;
            }
            if let Some(reason) = reason {
                warn!("server refused the move: {reason}");
            }
            set_status(match (transport_failed, role) {
                (true, _) => STATUS_SERVER_ERROR,
                (false, TurnRole::Player) => STATUS_MOVE_REJECTED,
                (false, TurnRole::Engine) => STATUS_ENGINE_FAILED,
            })?;
            Ok(false)
        }
    }
}

async fn fetch_game_response(
    path: &str, json_body: Option<String>,
) -> Result<GameResponse, JsValue> {
    let reply = match json_body {
        Some(body) => network::post_json(path, &body).await?,
        None => network::get(path).await?,
    };
    GameResponse::from_json(&reply.body)
        .map_err(|err| rust_error!("unreadable reply from {path}: {err:?}"))
}

fn encode(request: &impl serde::Serialize) -> JsResult<String> {
    serde_json::to_string(request).map_err(|err| rust_error!("failed to encode request: {err}"))
}

fn spawn_logged(future: impl Future<Output = JsResult<()>> + 'static) {
    spawn_local(async move {
        if let Err(err) = future.await {
            error!("background task failed: {err:?}");
        }
    });
}

fn set_status(text: &str) -> JsResult<()> {
    web_document().get_existing_element_by_id(STATUS_ID)?.set_text_content(Some(text));
    Ok(())
}

fn alert(message: &str) -> JsResult<()> { web_window().alert_with_message(message) }

fn navigate(url: &str) -> JsResult<()> { web_window().location().set_href(url) }

fn fen_input_value() -> JsResult<String> {
    let input = web_document().get_existing_element_by_id(FEN_INPUT_ID)?;
    let input: web_sys::HtmlInputElement = input
        .dyn_into()
        .map_err(|_| rust_error!("\"{FEN_INPUT_ID}\" is not an input element"))?;
    Ok(input.value().trim().to_owned())
}
