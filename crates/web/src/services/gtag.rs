// =============================================================================
// Consent Banner Web - Tag Manager Bridges
// =============================================================================
// Table of Contents:
// 1. JS Helpers
// 2. gtag Consent Mode
// 3. dataLayer Events
// =============================================================================

use consent_banner_core::{
    AnalyticsEvent, ConsentCommand, ConsentError, ConsentModeUpdate, ConsentResult, EventQueue,
    TagManager,
};
use js_sys::{Array, Function, Reflect, JSON};
use serde::Serialize;
use wasm_bindgen::{JsCast, JsValue};

// -----------------------------------------------------------------------------
// 1. JS Helpers
// -----------------------------------------------------------------------------

fn global(name: &str) -> ConsentResult<JsValue> {
    let window = web_sys::window()
        .ok_or_else(|| ConsentError::MissingDependency("window".to_string()))?;
    Reflect::get(&window, &JsValue::from_str(name))
        .map_err(|_| ConsentError::MissingDependency(name.to_string()))
}

/// Convert a serializable value into a plain JS object.
pub(crate) fn to_js<T: Serialize>(value: &T) -> ConsentResult<JsValue> {
    let json = serde_json::to_string(value)?;
    JSON::parse(&json).map_err(|e| ConsentError::Serialization(format!("{:?}", e)))
}

// -----------------------------------------------------------------------------
// 2. gtag Consent Mode
// -----------------------------------------------------------------------------

/// `window.gtag('consent', command, {...})`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GtagTagManager;

impl TagManager for GtagTagManager {
    fn consent(&self, command: ConsentCommand, update: &ConsentModeUpdate) -> ConsentResult<()> {
        let gtag: Function = global("gtag")?
            .dyn_into()
            .map_err(|_| ConsentError::MissingDependency("gtag".to_string()))?;
        gtag.call3(
            &JsValue::NULL,
            &JsValue::from_str("consent"),
            &JsValue::from_str(command.as_str()),
            &to_js(update)?,
        )
        .map_err(|e| ConsentError::Callback {
            name: "gtag".to_string(),
            message: format!("{:?}", e),
        })?;
        log::debug!("gtag consent {} sent: {:?}", command.as_str(), update);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// 3. dataLayer Events
// -----------------------------------------------------------------------------

/// `window.dataLayer.push({...})`, creating the array if the page has none.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataLayerQueue;

impl DataLayerQueue {
    fn data_layer() -> ConsentResult<Array> {
        let existing = global("dataLayer")?;
        if let Ok(array) = existing.dyn_into::<Array>() {
            return Ok(array);
        }
        let window = web_sys::window()
            .ok_or_else(|| ConsentError::MissingDependency("window".to_string()))?;
        let array = Array::new();
        Reflect::set(&window, &JsValue::from_str("dataLayer"), &array)
            .map_err(|e| ConsentError::Storage(format!("dataLayer: {:?}", e)))?;
        Ok(array)
    }
}

impl EventQueue for DataLayerQueue {
    fn push(&self, event: &AnalyticsEvent) -> ConsentResult<()> {
        Self::data_layer()?.push(&to_js(event)?);
        Ok(())
    }
}
