use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;

use crate::web_document::web_document;
use crate::web_error_handling::JsResult;


pub trait WebElementExt {
    fn with_text_content(self, text: &str) -> web_sys::Element;
    fn with_classes<'a>(
        self, classes: impl IntoIterator<Item = &'a str>,
    ) -> JsResult<web_sys::Element>;

    fn remove_all_children(&self);
    fn append_new_element(&self, local_name: &str) -> JsResult<web_sys::Element>;
}

impl WebElementExt for web_sys::Element {
    fn with_text_content(self, text: &str) -> web_sys::Element {
        self.set_text_content(Some(text));
        self
    }

    fn with_classes<'a>(
        self, classes: impl IntoIterator<Item = &'a str>,
    ) -> JsResult<web_sys::Element> {
        for class in classes {
            self.class_list().add_1(class)?;
        }
        Ok(self)
    }

    fn remove_all_children(&self) { self.replace_children_with_node_0() }

    fn append_new_element(&self, local_name: &str) -> JsResult<web_sys::Element> {
        let node = web_document().create_element(local_name)?;
        self.append_child(&node)?;
        Ok(node)
    }
}

// The closure is leaked on purpose: listeners live for the whole page, and
// web_sys provides no good hook to reclaim them when the element goes away.
pub fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
    target: &web_sys::EventTarget, event_type: &str,
    listener: impl FnMut(E) -> JsResult<()> + 'static,
) -> JsResult<()> {
    let closure: Closure<dyn FnMut(E) -> JsResult<()>> = Closure::new(listener);
    target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
