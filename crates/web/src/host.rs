// =============================================================================
// Consent Banner Web - Host Configuration
// =============================================================================
// Table of Contents:
// 1. Config Parsing
// 2. JS Function Hooks
// =============================================================================
//
// The host passes one plain JS object. Data fields go through JSON (functions
// are dropped by `JSON.stringify`); hook functions are then picked off the
// object with `Reflect`.

use anyhow::anyhow;
use consent_banner_core::{
    ChoiceHook, ConfigUpdate, ConsentError, ConsentResult, CookieCategory, Hook, LifecycleHooks,
};
use js_sys::{Array, Function, Reflect, JSON};
use wasm_bindgen::{JsCast, JsValue};

use crate::services::gtag::to_js;

// -----------------------------------------------------------------------------
// 1. Config Parsing
// -----------------------------------------------------------------------------

/// Parse a host config object. Hooks the object does not define keep their
/// value from `current`.
pub fn parse_update(config: &JsValue, current: &LifecycleHooks) -> ConsentResult<ConfigUpdate> {
    let json: String = JSON::stringify(config)
        .map_err(|e| ConsentError::InvalidConfig(format!("{:?}", e)))?
        .into();
    let mut update = ConfigUpdate::from_json(&json)?;

    if let Some(categories) = update.cookie_types.as_mut() {
        attach_category_hooks(config, categories);
    }

    let mut hooks = current.clone();
    if overlay_hooks(config, &mut hooks) {
        update.hooks = Some(hooks);
    }
    Ok(update)
}

fn attach_category_hooks(config: &JsValue, categories: &mut [CookieCategory]) {
    let Some(entries) = Reflect::get(config, &JsValue::from_str("cookieTypes"))
        .ok()
        .and_then(|v| v.dyn_into::<Array>().ok())
    else {
        return;
    };
    for (index, category) in categories.iter_mut().enumerate() {
        let entry = entries.get(index as u32);
        if let Some(f) = function(&entry, "onAccept") {
            category.on_accept = Some(js_hook(format!("{}.onAccept", category.id), f));
        }
        if let Some(f) = function(&entry, "onReject") {
            category.on_reject = Some(js_hook(format!("{}.onReject", category.id), f));
        }
    }
}

/// Returns whether any hook was found.
fn overlay_hooks(config: &JsValue, hooks: &mut LifecycleHooks) -> bool {
    let mut found = false;
    let slots: [(&str, &mut Option<Hook>); 13] = [
        ("onBannerOpen", &mut hooks.on_banner_open),
        ("onBannerClose", &mut hooks.on_banner_close),
        ("onBackdropOpen", &mut hooks.on_backdrop_open),
        ("onBackdropClose", &mut hooks.on_backdrop_close),
        ("onPreferencesOpen", &mut hooks.on_preferences_open),
        ("onPreferencesClose", &mut hooks.on_preferences_close),
        ("onClickAccept", &mut hooks.on_click_accept),
        ("onClickReject", &mut hooks.on_click_reject),
        ("onClickPreferences", &mut hooks.on_click_preferences),
        ("onAcceptAll", &mut hooks.on_accept_all),
        ("onRejectAll", &mut hooks.on_reject_all),
        ("onConsentGiven", &mut hooks.on_consent_given),
        ("onConsentRejected", &mut hooks.on_consent_rejected),
    ];
    for (key, slot) in slots {
        if let Some(f) = function(config, key) {
            *slot = Some(js_hook(key.to_string(), f));
            found = true;
        }
    }

    if let Some(f) = function(config, "saveConsentChoices") {
        hooks.save_consent_choices = Some(js_choice_hook(f));
        found = true;
    }
    if let Some(f) = function(config, "applyConsentChoices") {
        hooks.apply_consent_choices = Some(js_choice_hook(f));
        found = true;
    }
    found
}

// -----------------------------------------------------------------------------
// 2. JS Function Hooks
// -----------------------------------------------------------------------------

fn function(target: &JsValue, key: &str) -> Option<Function> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()?
        .dyn_into::<Function>()
        .ok()
}

/// A thrown JS exception becomes an `Err` for the isolation layer.
fn js_hook(name: String, f: Function) -> Hook {
    Hook::new(move || {
        f.call0(&JsValue::NULL)
            .map(|_| ())
            .map_err(|e| anyhow!("{} threw {:?}", name, e))
    })
}

fn js_choice_hook(f: Function) -> ChoiceHook {
    ChoiceHook::new(move |choice| {
        let arg = to_js(choice)?;
        f.call1(&JsValue::NULL, &arg)
            .map(|_| ())
            .map_err(|e| anyhow!("consent override threw {:?}", e))
    })
}
