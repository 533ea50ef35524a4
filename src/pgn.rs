//! Move-list parsing. The server sends the game record as a flat token
//! stream: a move number followed by up to two half-moves, repeated. This
//! module turns that stream into rows ready for rendering; it does not
//! understand chess notation beyond the checkmate mark.

use itertools::Itertools;
use log::warn;


/// Glyph shown in the second slot of the last row while the reply half-move
/// is pending.
pub const MOVE_PLACEHOLDER: &str = "—";

const CHECKMATE_MARK: char = '#';

/// A single clickable half-move in the move list. `fen_index` points into the
/// position history at the board state after this half-move was played.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveToken {
    pub text: String,
    pub fen_index: usize,
}

impl MoveToken {
    pub fn is_checkmate(&self) -> bool { self.text.contains(CHECKMATE_MARK) }
}

/// One row of the move list: the move number column plus up to two
/// half-moves. `second == None` renders as a placeholder glyph and consumes
/// no position index.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct MoveRow {
    pub number: String,
    pub first: MoveToken,
    pub second: Option<MoveToken>,
}

/// Splits the move text on whitespace and groups tokens in threes. Position
/// indices are assigned to move buttons sequentially from zero on every
/// rebuild, matching the order positions were appended to the history. Empty
/// input produces zero rows.
pub fn parse_move_rows(pgn: &str) -> Vec<MoveRow> {
    let mut rows = Vec::new();
    let mut fen_index = 0;
    let mut next_token = |text: &str| {
        let token = MoveToken { text: text.to_owned(), fen_index };
        fen_index += 1;
        token
    };
    for mut group in &pgn.split_whitespace().chunks(3) {
        let number = group.next().unwrap().to_owned();
        let Some(first) = group.next() else {
            // A trailing bare move number. The server should not produce one.
            warn!("move list ends with a dangling move number: {number}");
            continue;
        };
        rows.push(MoveRow {
            number,
            first: next_token(first),
            second: group.next().map(&mut next_token),
        });
    }
    rows
}

/// How many position indices the rendered rows consumed. Persisted after each
/// rebuild as the move-button counter.
pub fn consumed_indices(rows: &[MoveRow]) -> usize {
    rows.iter().map(|row| 1 + row.second.iter().count()).sum()
}
