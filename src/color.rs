use rand::Rng;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};


/// The side the human plays. Assigned once per game and persisted; drives
/// board orientation and which boards accept drag gestures.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PlayerColor {
    White,
    Black,
}

impl PlayerColor {
    pub fn opponent(self) -> Self {
        match self {
            PlayerColor::White => PlayerColor::Black,
            PlayerColor::Black => PlayerColor::White,
        }
    }
}

/// What the user picked on the game creation page. `Random` never reaches the
/// server: it is resolved to a concrete color client-side first.
#[derive(
    Clone, Copy, PartialEq, Eq, Hash, Debug, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SideChoice {
    White,
    Black,
    Random,
}

impl SideChoice {
    pub fn resolve(self, rng: &mut impl Rng) -> PlayerColor {
        match self {
            SideChoice::White => PlayerColor::White,
            SideChoice::Black => PlayerColor::Black,
            SideChoice::Random => {
                if rng.random_bool(0.5) {
                    PlayerColor::White
                } else {
                    PlayerColor::Black
                }
            }
        }
    }
}
