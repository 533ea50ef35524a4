//! Adapter over the page's chessboard widget. The widget owns piece
//! rendering and drag visuals; we own when it is created, what position it
//! shows and whether it accepts drags at all.

use js_sys::{Object, Reflect};
use tabula_chess::color::PlayerColor;
use tabula_chess::fen::Fen;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use crate::web_error_handling::JsResult;


pub const BOARD_CONTAINER_ID: &str = "board";
const PIECE_THEME: &str = "/static/chessboardjs-1.0.0/img/chesspieces/wikipedia/{piece}.png";

/// Drop callback: (source square, target square). The widget passes more
/// arguments; only these two matter here.
pub type DropHandler = Closure<dyn FnMut(String, String)>;

#[wasm_bindgen]
extern "C" {
    type BoardWidget;

    #[wasm_bindgen(js_name = Chessboard)]
    fn chessboard_new(container_id: &str, config: &JsValue) -> BoardWidget;

    #[wasm_bindgen(method, js_name = position)]
    fn set_position(this: &BoardWidget, fen: &str, animate: bool);

    #[wasm_bindgen(method)]
    fn resize(this: &BoardWidget);

    #[wasm_bindgen(method)]
    fn destroy(this: &BoardWidget);
}

/// Owns the live widget instance. The widget cannot toggle drag behavior in
/// place, so switching between an interactive and a static board goes through
/// [`BoardView::render`], which replaces the instance wholesale.
pub struct BoardView {
    widget: BoardWidget,
    interactive: bool,
    // Kept alive for as long as the widget may call it.
    _on_drop: Option<DropHandler>,
}

impl BoardView {
    /// Creates a fresh widget showing `fen`. An interactive board forwards
    /// drop gestures to `on_drop` and snaps back drops outside the board; a
    /// static board ignores gestures entirely.
    pub fn render(
        fen: &Fen, interactive: bool, orientation: PlayerColor, on_drop: Option<DropHandler>,
    ) -> JsResult<BoardView> {
        let config = Object::new();
        set_key(&config, "position", &JsValue::from_str(fen.as_str()))?;
        set_key(&config, "draggable", &JsValue::from_bool(interactive))?;
        set_key(&config, "dropOffBoard", &JsValue::from_str("snapback"))?;
        set_key(&config, "orientation", &JsValue::from_str(&orientation.to_string()))?;
        set_key(&config, "pieceTheme", &JsValue::from_str(PIECE_THEME))?;
        if let Some(handler) = &on_drop {
            set_key(&config, "onDrop", handler.as_ref())?;
        }
        let widget = chessboard_new(BOARD_CONTAINER_ID, &config);
        Ok(BoardView { widget, interactive, _on_drop: on_drop })
    }

    pub fn is_interactive(&self) -> bool { self.interactive }

    /// Moves pieces on the live widget without recreating it.
    pub fn reposition(&self, fen: &Fen, animate: bool) {
        self.widget.set_position(fen.as_str(), animate);
    }

    /// Recomputes the widget layout. Wired to the window resize event.
    pub fn resize(&self) { self.widget.resize(); }
}

impl Drop for BoardView {
    fn drop(&mut self) { self.widget.destroy(); }
}

fn set_key(config: &Object, key: &str, value: &JsValue) -> JsResult<()> {
    Reflect::set(config, &JsValue::from_str(key), value)?;
    Ok(())
}
