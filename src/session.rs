use std::collections::HashMap;

use log::warn;

use crate::color::PlayerColor;
use crate::fen::Fen;
use crate::history::PositionHistory;


/// Keys in browser-local storage. Fixed contract with existing sessions, do
/// not rename.
pub mod keys {
    pub const PLAYER_COLOR: &str = "playerColor";
    pub const CURRENT_FEN: &str = "currentFen";
    pub const FEN_LIST: &str = "fenList";
    pub const FEN_INDEX: &str = "fenIndex";
}

/// Synchronous key/value persistence surviving page reloads. The browser
/// build backs this with `localStorage`; tests use [`MemoryStore`]. Pure
/// passthrough: no validation, no network.
///
/// Two tabs sharing the same origin race on these keys unguarded. Accepted
/// limitation, see DESIGN.md.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

/// Typed accessors over the persisted session fields, with JSON
/// encode/decode for the structured ones. A value that fails to decode is
/// treated as absent.
pub trait SessionStoreExt: SessionStore {
    fn player_color(&self) -> Option<PlayerColor> {
        self.get(keys::PLAYER_COLOR)?.parse().ok()
    }
    fn set_player_color(&mut self, color: PlayerColor) {
        self.set(keys::PLAYER_COLOR, &color.to_string());
    }

    fn current_fen(&self) -> Option<Fen> {
        self.get(keys::CURRENT_FEN).map(Fen::new)
    }
    fn set_current_fen(&mut self, fen: &Fen) {
        self.set(keys::CURRENT_FEN, fen.as_str());
    }

    fn position_history(&self) -> PositionHistory {
        let Some(raw) = self.get(keys::FEN_LIST) else {
            return PositionHistory::new();
        };
        serde_json::from_str(&raw).unwrap_or_else(|err| {
            warn!("discarding unreadable position history: {err}");
            PositionHistory::new()
        })
    }
    fn set_position_history(&mut self, history: &PositionHistory) {
        match serde_json::to_string(history) {
            Ok(json) => self.set(keys::FEN_LIST, &json),
            Err(err) => warn!("failed to encode position history: {err}"),
        }
    }

    fn fen_index(&self) -> usize {
        self.get(keys::FEN_INDEX).and_then(|raw| raw.parse().ok()).unwrap_or(0)
    }
    fn set_fen_index(&mut self, index: usize) {
        self.set(keys::FEN_INDEX, &index.to_string());
    }

    /// Drops the per-game derived state. Done whenever a fresh game context
    /// begins: new game, start game, custom position.
    fn clear_game(&mut self) {
        self.remove(keys::FEN_LIST);
        self.remove(keys::FEN_INDEX);
    }
}

impl<S: SessionStore + ?Sized> SessionStoreExt for S {}

/// HashMap-backed store for native tests and headless use.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self { Self::default() }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> { self.values.get(key).cloned() }
    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }
    fn remove(&mut self, key: &str) { self.values.remove(key); }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn fen_list_round_trips_through_json() {
        let mut store = MemoryStore::new();
        let mut history = PositionHistory::new();
        history.push(Fen::new("fen one"));
        history.push(Fen::new("fen two"));
        store.set_position_history(&history);
        assert_eq!(store.get(keys::FEN_LIST).unwrap(), r#"["fen one","fen two"]"#);
        assert_eq!(store.position_history(), history);
    }

    #[test]
    fn unreadable_values_fall_back_to_defaults() {
        let mut store = MemoryStore::new();
        store.set(keys::FEN_LIST, "not json");
        store.set(keys::FEN_INDEX, "many");
        store.set(keys::PLAYER_COLOR, "teal");
        assert!(store.position_history().is_empty());
        assert_eq!(store.fen_index(), 0);
        assert_eq!(store.player_color(), None);
    }

    #[test]
    fn clear_game_keeps_color_and_position() {
        let mut store = MemoryStore::new();
        store.set_player_color(PlayerColor::Black);
        store.set_current_fen(&Fen::starting_position());
        store.set_position_history(&PositionHistory::new());
        store.set_fen_index(4);
        store.clear_game();
        assert_eq!(store.get(keys::FEN_LIST), None);
        assert_eq!(store.get(keys::FEN_INDEX), None);
        assert_eq!(store.player_color(), Some(PlayerColor::Black));
        assert_eq!(store.current_fen(), Some(Fen::starting_position()));
    }
}
