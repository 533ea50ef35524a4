use serde::{Deserialize, Serialize};

use crate::fen::Fen;


/// Ordered record of server-confirmed positions, one entry per half-move.
/// `positions()[i]` is the board after the i-th half-move of the game; the
/// move list relies on this alignment to replay the right position.
#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionHistory {
    positions: Vec<Fen>,
}

impl PositionHistory {
    pub fn new() -> Self { Self::default() }

    pub fn positions(&self) -> &[Fen] { &self.positions }
    pub fn len(&self) -> usize { self.positions.len() }
    pub fn is_empty(&self) -> bool { self.positions.is_empty() }
    pub fn get(&self, index: usize) -> Option<&Fen> { self.positions.get(index) }
    pub fn last(&self) -> Option<&Fen> { self.positions.last() }

    pub fn push(&mut self, fen: Fen) { self.positions.push(fen); }

    /// Undo removes the player's half-move together with the engine reply.
    /// The server rejects undo requests it cannot honor, so a short list here
    /// just empties out.
    pub fn pop_full_move(&mut self) {
        self.positions.pop();
        self.positions.pop();
    }

    pub fn clear(&mut self) { self.positions.clear(); }
}
