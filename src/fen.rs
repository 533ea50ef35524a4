use std::fmt;

use serde::{Deserialize, Serialize};

use crate::color::PlayerColor;


// Storage and widget convention for the initial position.
pub const STARTING_POSITION: &str = "start";

/// A board position as the server reports it: either a FEN string or the
/// literal `"start"`. The client never parses piece placement; FEN validity
/// is the server's job.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fen(String);

impl Fen {
    pub fn new(s: impl Into<String>) -> Self { Fen(s.into()) }
    pub fn starting_position() -> Self { Fen(STARTING_POSITION.to_owned()) }

    pub fn as_str(&self) -> &str { &self.0 }
    pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }

    // Sniffs the side-to-move field. Good enough to choose a board orientation
    // for a custom position; not a validity check.
    pub fn side_to_move(&self) -> PlayerColor {
        if self.0.contains(" w ") {
            PlayerColor::White
        } else {
            PlayerColor::Black
        }
    }
}

impl fmt::Display for Fen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl From<&str> for Fen {
    fn from(s: &str) -> Self { Fen::new(s) }
}
