//! Thin `fetch` wrapper. Protocol interpretation stays in the core crate;
//! this module only moves JSON strings over HTTP and reports transport-level
//! facts (HTTP ok, redirect target).

use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::rust_error;
use crate::web_document::web_window;
use crate::web_error_handling::JsResult;


/// One completed HTTP exchange, before any protocol parsing.
pub struct HttpReply {
    pub ok: bool,
    pub redirected: bool,
    pub url: String,
    pub body: String,
}

pub async fn get(path: &str) -> JsResult<HttpReply> { request(path, None).await }

pub async fn post_json(path: &str, body: &str) -> JsResult<HttpReply> {
    request(path, Some(body)).await
}

async fn request(path: &str, json_body: Option<&str>) -> JsResult<HttpReply> {
    let init = RequestInit::new();
    match json_body {
        Some(body) => {
            init.set_method("POST");
            let headers = Headers::new()?;
            headers.set("Content-Type", "application/json")?;
            init.set_headers(&headers);
            init.set_body(&JsValue::from_str(body));
        }
        None => init.set_method("GET"),
    }
    let request = Request::new_with_str_and_init(path, &init)?;
    let response = JsFuture::from(web_window().fetch_with_request(&request)).await?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| rust_error!("fetch did not resolve to a Response"))?;
    let body = JsFuture::from(response.text()?).await?.as_string().unwrap_or_default();
    Ok(HttpReply {
        ok: response.ok(),
        redirected: response.redirected(),
        url: response.url(),
        body,
    })
}
