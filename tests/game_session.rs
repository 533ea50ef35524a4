use pretty_assertions::assert_eq;
use tabula_chess::client::{BoardRender, GameSession, SyncState, TurnOutcome, UndoOutcome, record_game_start};
use tabula_chess::color::PlayerColor;
use tabula_chess::event::GameResponse;
use tabula_chess::fen::Fen;
use tabula_chess::session::{MemoryStore, SessionStore, SessionStoreExt, keys};


const FEN_AFTER_E4: &str = "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1";
const FEN_AFTER_E5: &str = "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2";

fn fresh_session() -> GameSession<MemoryStore> {
    GameSession::resume(MemoryStore::new())
}

fn ok(fen: &str, pgn: &str) -> GameResponse {
    GameResponse::Ok { fen: Fen::new(fen), pgn: pgn.to_owned() }
}

fn game_over(fen: &str, pgn: &str, result: &str) -> GameResponse {
    GameResponse::GameOver {
        fen: Fen::new(fen),
        pgn: pgn.to_owned(),
        result: result.to_owned(),
    }
}

#[test]
fn valid_drop_produces_exactly_one_request() {
    let mut session = fresh_session();
    let request = session.begin_move("e2", "e4").unwrap();
    assert_eq!(request.from_square, "e2");
    assert_eq!(request.to_square, "e4");
    assert!(matches!(session.sync_state(), SyncState::AwaitingMove { .. }));
}

#[test]
fn offboard_and_zero_displacement_drops_are_no_ops() {
    let mut session = fresh_session();
    assert_eq!(session.begin_move("e2", "offboard"), None);
    assert_eq!(session.begin_move("e2", "e2"), None);
    assert_eq!(*session.sync_state(), SyncState::Idle);
    assert_eq!(*session.current_fen(), Fen::starting_position());
    assert!(session.history().is_empty());
}

#[test]
fn accepted_move_appends_exactly_one_position() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    let len_before = session.history().len();
    let outcome = session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    assert_eq!(outcome, TurnOutcome::Accepted {
        fen: Fen::new(FEN_AFTER_E4),
        pgn: "1. e4".to_owned(),
        engine_reply_due: true,
    });
    assert_eq!(session.history().len(), len_before + 1);
    assert_eq!(*session.current_fen(), Fen::new(FEN_AFTER_E4));
    assert_eq!(*session.sync_state(), SyncState::AwaitingEngine);
    // The confirmed state is persisted for the next page load.
    assert_eq!(session.store().current_fen(), Some(Fen::new(FEN_AFTER_E4)));
    assert_eq!(session.store().position_history().len(), 1);
}

#[test]
fn rejected_move_restores_previous_position_and_appends_nothing() {
    let mut session = fresh_session();
    session.begin_move("e2", "e5").unwrap();
    let outcome =
        session.apply_move_response(GameResponse::Rejected { reason: Some("illegal".to_owned()) });
    assert_eq!(outcome, TurnOutcome::Rejected {
        restore: Some(Fen::starting_position()),
        reason: Some("illegal".to_owned()),
    });
    assert!(session.history().is_empty());
    assert_eq!(*session.sync_state(), SyncState::Idle);
}

#[test]
fn transport_failure_rolls_back_like_a_rejection() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    // The network layer maps any transport or parse error to a bare rejection.
    let outcome = session.apply_move_response(GameResponse::Rejected { reason: None });
    assert_eq!(outcome, TurnOutcome::Rejected {
        restore: Some(Fen::starting_position()),
        reason: None,
    });
    assert!(session.history().is_empty());
}

#[test]
fn engine_reply_completes_the_cycle() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    let outcome = session.apply_engine_response(ok(FEN_AFTER_E5, "1. e4 e5"));
    assert_eq!(outcome, TurnOutcome::Accepted {
        fen: Fen::new(FEN_AFTER_E5),
        pgn: "1. e4 e5".to_owned(),
        engine_reply_due: false,
    });
    assert_eq!(session.history().len(), 2);
    assert_eq!(*session.sync_state(), SyncState::Idle);
}

#[test]
fn engine_failure_leaves_the_board_alone() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    let outcome = session.apply_engine_response(GameResponse::Rejected { reason: None });
    assert_eq!(outcome, TurnOutcome::Rejected { restore: None, reason: None });
    assert_eq!(session.history().len(), 1);
    assert_eq!(*session.current_fen(), Fen::new(FEN_AFTER_E4));
}

#[test]
fn game_over_is_terminal_and_requests_no_engine_move() {
    let fen_mate = "r1bqkb1r/pppp1Qpp/2n2n2/4p3/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 0 4";
    let record = "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#";
    let mut session = fresh_session();
    session.begin_move("h5", "f7").unwrap();
    let outcome = session.apply_move_response(game_over(
        fen_mate,
        record,
        "White wins by checkmate",
    ));
    assert_eq!(outcome, TurnOutcome::GameOver {
        fen: Fen::new(fen_mate),
        pgn: record.to_owned(),
        result: "White wins by checkmate".to_owned(),
    });
    assert_eq!(*session.sync_state(), SyncState::Terminal);
    assert!(!session.live_board().interactive);
    // No more gestures reach the network once the game has concluded.
    assert_eq!(session.begin_move("e2", "e4"), None);
}

#[test]
fn undo_truncates_exactly_two_positions() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    session.apply_engine_response(ok(FEN_AFTER_E5, "1. e4 e5"));
    let outcome = session.apply_undo_response(ok("start", ""));
    assert_eq!(outcome, UndoOutcome::Undone {
        fen: Fen::starting_position(),
        pgn: String::new(),
    });
    assert!(session.history().is_empty());
    assert_eq!(*session.current_fen(), Fen::starting_position());
    assert_eq!(session.store().position_history().len(), 0);
}

#[test]
fn failed_undo_leaves_history_unmodified() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    let outcome = session
        .apply_undo_response(GameResponse::Rejected { reason: Some("nothing to undo".to_owned()) });
    assert_eq!(outcome, UndoOutcome::Failed { reason: Some("nothing to undo".to_owned()) });
    assert_eq!(session.history().len(), 1);
    assert_eq!(*session.current_fen(), Fen::new(FEN_AFTER_E4));
}

#[test]
fn history_button_is_interactive_only_at_the_live_position() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    session.apply_engine_response(ok(FEN_AFTER_E5, "1. e4 e5"));
    let rows = session.rebuild_move_rows("1. e4 e5");
    let first = &rows[0].first;
    let second = rows[0].second.as_ref().unwrap();

    assert_eq!(session.replay_view(first), Some(BoardRender {
        fen: Fen::new(FEN_AFTER_E4),
        interactive: false,
    }));
    assert_eq!(session.replay_view(second), Some(BoardRender {
        fen: Fen::new(FEN_AFTER_E5),
        interactive: true,
    }));
}

#[test]
fn checkmate_button_never_yields_an_interactive_board() {
    // Fool's mate, one confirmed position per half-move.
    let fen_f3 = "rnbqkbnr/pppppppp/8/8/8/5P2/PPPPP1PP/RNBQKBNR b KQkq - 0 1";
    let fen_e5 = "rnbqkbnr/pppp1ppp/8/4p3/8/5P2/PPPPP1PP/RNBQKBNR w KQkq e6 0 2";
    let fen_g4 = "rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq g3 0 2";
    let fen_mate = "rnb1kbnr/pppp1ppp/8/4p3/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3";
    let mut session = fresh_session();
    session.begin_move("f2", "f3").unwrap();
    session.apply_move_response(ok(fen_f3, "1. f3"));
    session.apply_engine_response(ok(fen_e5, "1. f3 e5"));
    session.begin_move("g2", "g4").unwrap();
    session.apply_move_response(ok(fen_g4, "1. f3 e5 2. g4"));
    session.apply_engine_response(game_over(fen_mate, "1. f3 e5 2. g4 Qh4#", "checkmate"));
    assert_eq!(session.history().len(), 4);

    let rows = session.rebuild_move_rows("1. f3 e5 2. g4 Qh4#");
    let mate = rows[1].second.as_ref().unwrap();
    // The mate position is the live one, yet its button must stay static.
    let view = session.replay_view(mate).unwrap();
    assert_eq!(view.fen, *session.current_fen());
    assert!(!view.interactive);
    // Earlier plies replay static as usual.
    let earlier = session.replay_view(&rows[0].first).unwrap();
    assert_eq!(earlier.fen, Fen::new(fen_f3));
    assert!(!earlier.interactive);
}

#[test]
fn placeholder_replays_the_final_position_after_checkmate_only() {
    let scholars_mate = "1. e4 e5 2. Bc4 Nc6 3. Qh5 Nf6 4. Qxf7#";
    let mut session = fresh_session();
    session.begin_move("h5", "f7").unwrap();
    session.apply_move_response(game_over(FEN_AFTER_E5, scholars_mate, "checkmate"));
    let rows = session.rebuild_move_rows(scholars_mate);
    // The mate lands in the first slot of the last row, next to the
    // placeholder.
    let last_row = rows.last().unwrap();
    assert!(last_row.second.is_none());
    assert!(last_row.first.is_checkmate());
    let view = session.placeholder_view(&last_row.first).unwrap();
    assert_eq!(view, BoardRender { fen: Fen::new(FEN_AFTER_E5), interactive: false });

    // A pending ordinary reply leaves the placeholder inert.
    let rows = session.rebuild_move_rows("1. e4");
    assert_eq!(session.placeholder_view(&rows[0].first), None);
}

#[test]
fn rebuilding_the_move_list_resets_the_button_counter() {
    let mut session = fresh_session();
    let rows = session.rebuild_move_rows("1. e4 e5 2. Nf3");
    assert_eq!(rows.len(), 2);
    assert_eq!(session.store().fen_index(), 3);
    let rows = session.rebuild_move_rows("");
    assert!(rows.is_empty());
    assert_eq!(session.store().fen_index(), 0);
}

#[test]
fn custom_position_starts_a_fresh_history_context() {
    let mut session = fresh_session();
    session.begin_move("e2", "e4").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E4, "1. e4"));
    let custom = Fen::new("4k3/8/8/8/8/8/8/4K2R w K - 0 1");
    session.apply_custom_fen(custom.clone());
    assert!(session.history().is_empty());
    assert_eq!(*session.current_fen(), custom);
    assert_eq!(session.store().get(keys::FEN_LIST), None);
    assert_eq!(session.store().current_fen(), Some(custom));
}

#[test]
fn new_game_resets_session_to_initial_values() {
    let mut store = MemoryStore::new();
    store.set_player_color(PlayerColor::Black);
    let mut session = GameSession::resume(store);
    session.begin_move("e7", "e5").unwrap();
    session.apply_move_response(ok(FEN_AFTER_E5, "1. e4 e5"));
    session.start_new_game(Fen::starting_position());
    assert_eq!(session.player_color(), PlayerColor::White);
    assert_eq!(*session.current_fen(), Fen::starting_position());
    assert!(session.history().is_empty());
    assert_eq!(session.store().get(keys::FEN_LIST), None);
    assert!(session.live_board().interactive);
}

#[test]
fn session_resumes_from_persisted_state() {
    let mut store = MemoryStore::new();
    record_game_start(&mut store, PlayerColor::Black, &Fen::new(FEN_AFTER_E4));
    let session = GameSession::resume(store);
    assert_eq!(session.player_color(), PlayerColor::Black);
    assert_eq!(*session.current_fen(), Fen::new(FEN_AFTER_E4));
    assert!(session.history().is_empty());
    assert_eq!(*session.sync_state(), SyncState::Idle);
}
