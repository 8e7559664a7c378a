// =============================================================================
// Consent Banner Web - localStorage Backend
// =============================================================================

use consent_banner_core::{ConsentError, ConsentResult, StorageBackend};
use wasm_bindgen::JsValue;

/// `window.localStorage`, holding plain strings (`"true"`, `"false"`, `"1"`)
/// rather than JSON. Blocked or missing storage surfaces as
/// `ConsentError::Storage`; nothing here throws into the host page.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorageBackend;

fn storage_error(err: JsValue) -> ConsentError {
    ConsentError::Storage(format!("{:?}", err))
}

impl LocalStorageBackend {
    /// `localStorage` throws a `SecurityError` in sandboxed frames and when
    /// the visitor disables site data.
    fn storage() -> ConsentResult<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| ConsentError::Storage("no window".to_string()))?
            .local_storage()
            .map_err(storage_error)?
            .ok_or_else(|| ConsentError::Storage("localStorage unavailable".to_string()))
    }
}

impl StorageBackend for LocalStorageBackend {
    fn get_item(&self, key: &str) -> ConsentResult<Option<String>> {
        Self::storage()?.get_item(key).map_err(storage_error)
    }

    fn set_item(&self, key: &str, value: &str) -> ConsentResult<()> {
        Self::storage()?.set_item(key, value).map_err(storage_error)
    }
}
