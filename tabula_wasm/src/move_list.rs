//! DOM rendering for the move history panel: one row per full move, one
//! button per half-move. Which position a button replays, and whether that
//! board is interactive, is decided by the core session; buttons only report
//! activation upward.

use std::rc::Rc;

use tabula_chess::pgn::{MOVE_PLACEHOLDER, MoveRow, MoveToken};

use crate::web_document::web_document;
use crate::web_element_ext::{WebElementExt, add_event_listener_and_forget};
use crate::web_error_handling::JsResult;
use crate::web_util::scroll_to_bottom;


pub const MOVE_LIST_SELECTOR: &str = ".pgn-container";

pub enum MoveListActivation {
    Move(MoveToken),
    /// The empty reply slot of the last row. `preceding` is the half-move
    /// rendered next to it.
    PendingSlot { preceding: MoveToken },
}

pub type ActivationHandler = Rc<dyn Fn(MoveListActivation)>;

/// Clears the history panel and rebuilds it from the parsed rows. No rows
/// means an empty panel, not an empty row.
pub fn render_move_list(rows: &[MoveRow], on_activate: &ActivationHandler) -> JsResult<()> {
    let container = web_document().query_selector_existing(MOVE_LIST_SELECTOR)?;
    container.remove_all_children();
    for row in rows {
        let row_node = container.append_new_element("div")?.with_classes(["pgn-row"])?;
        row_node
            .append_new_element("div")?
            .with_classes(["pgn-column"])?
            .with_text_content(&row.number);
        append_move_button(&row_node, &row.first.text, on_activate, {
            let token = row.first.clone();
            move || MoveListActivation::Move(token.clone())
        })?;
        match &row.second {
            Some(token) => append_move_button(&row_node, &token.text, on_activate, {
                let token = token.clone();
                move || MoveListActivation::Move(token.clone())
            })?,
            None => append_move_button(&row_node, MOVE_PLACEHOLDER, on_activate, {
                let preceding = row.first.clone();
                move || MoveListActivation::PendingSlot { preceding: preceding.clone() }
            })?,
        }
    }
    scroll_to_bottom(&container);
    Ok(())
}

fn append_move_button(
    row_node: &web_sys::Element, text: &str, on_activate: &ActivationHandler,
    activation: impl Fn() -> MoveListActivation + 'static,
) -> JsResult<()> {
    let button = row_node
        .append_new_element("button")?
        .with_classes(["pgn-button"])?
        .with_text_content(text);
    let on_activate = on_activate.clone();
    add_event_listener_and_forget(&button, "click", move |_: web_sys::Event| {
        on_activate(activation());
        Ok(())
    })
}
