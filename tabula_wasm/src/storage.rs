use log::warn;
use tabula_chess::session::SessionStore;

use crate::rust_error;
use crate::web_document::web_window;
use crate::web_error_handling::JsResult;


/// `localStorage`-backed session store. Reads that fail (privacy mode,
/// disabled storage) report as absent; failed writes are logged and dropped,
/// since persistence here is bookkeeping, not correctness.
pub struct LocalStore {
    storage: web_sys::Storage,
}

impl LocalStore {
    pub fn open() -> JsResult<LocalStore> {
        let storage = web_window()
            .local_storage()?
            .ok_or_else(|| rust_error!("localStorage is unavailable"))?;
        Ok(LocalStore { storage })
    }
}

impl SessionStore for LocalStore {
    fn get(&self, key: &str) -> Option<String> { self.storage.get_item(key).ok().flatten() }

    fn set(&mut self, key: &str, value: &str) {
        if let Err(err) = self.storage.set_item(key, value) {
            warn!("failed to persist \"{key}\": {err:?}");
        }
    }

    fn remove(&mut self, key: &str) {
        if let Err(err) = self.storage.remove_item(key) {
            warn!("failed to remove \"{key}\": {err:?}");
        }
    }
}
