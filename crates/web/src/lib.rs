// =============================================================================
// Consent Banner Web - Main Library Entry Point
// =============================================================================
// Table of Contents:
// 1. Module Declarations
// 2. Re-exports
// 3. Logging
// 4. WASM Handle
// =============================================================================

// -----------------------------------------------------------------------------
// 1. Module Declarations
// -----------------------------------------------------------------------------

pub mod components;
pub mod host;
pub mod services;
pub mod view;

// -----------------------------------------------------------------------------
// 2. Re-exports
// -----------------------------------------------------------------------------

pub use services::browser_environment;
pub use view::LeptosView;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use consent_banner_core::{
    ConfigUpdate, ConsentCommand, ConsentEnvironment, ConsentEvent, ConsentManager,
    ConsentModeUpdate,
};
use futures::FutureExt;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use services::notify::{resolve_endpoint, HttpNotifier};
use view::Dispatch;

type SharedManager = Rc<RefCell<ConsentManager<LeptosView>>>;

// -----------------------------------------------------------------------------
// 3. Logging
// -----------------------------------------------------------------------------

/// Install the panic hook and console logger (idempotent).
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}

/// `gtag('consent', 'default', …)` before any choice is known.
fn send_default_consent(env: &ConsentEnvironment) {
    if let Some(tag_manager) = &env.tag_manager {
        if let Err(err) = tag_manager.consent(ConsentCommand::Default, &ConsentModeUpdate::denied_defaults()) {
            log::warn!("Default consent not sent: {}", err);
        }
    }
}

// -----------------------------------------------------------------------------
// 4. WASM Handle
// -----------------------------------------------------------------------------

/// Page-level consent banner. Exposed to JS as `new ConsentBanner()`.
///
/// Every method logs its failures and returns a flag; nothing throws into the
/// host page.
#[wasm_bindgen]
pub struct ConsentBanner {
    manager: SharedManager,
    notifier: Rc<HttpNotifier>,
}

impl Default for ConsentBanner {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl ConsentBanner {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ConsentBanner {
        init_logging();
        let (env, notifier) = browser_environment();
        send_default_consent(&env);

        let manager = Rc::new_cyclic(|weak: &Weak<RefCell<ConsentManager<LeptosView>>>| {
            let view = LeptosView::new(dispatcher(weak.clone()));
            RefCell::new(ConsentManager::new(env, view))
        });
        log::info!("Consent banner created");
        ConsentBanner { manager, notifier }
    }

    /// Wait for the host's `ready` promise (if any), then sync the consent
    /// cookie and show the widget. Resolves to `true` on success.
    pub fn start(&self, config: JsValue, ready: Option<Promise>) -> Promise {
        let manager = self.manager.clone();
        let notifier = self.notifier.clone();
        future_to_promise(async move {
            if let Some(ready) = ready {
                if let Err(err) = JsFuture::from(ready).await {
                    log::error!("Host readiness rejected: {:?}", err);
                    return Ok(JsValue::FALSE);
                }
            }
            let Some(update) = parse(&manager, &config) else {
                return Ok(JsValue::FALSE);
            };
            Ok(JsValue::from_bool(start_now(&manager, &notifier, update)))
        })
    }

    /// Shallow-merge `config` and rebuild the widget.
    #[wasm_bindgen(js_name = updateConfig)]
    pub fn update_config(&self, config: JsValue) -> bool {
        let Some(update) = parse(&self.manager, &config) else {
            return false;
        };
        self.apply_update(update)
    }

    #[wasm_bindgen(js_name = openPreferences)]
    pub fn open_preferences(&self) -> bool {
        self.dispatch(ConsentEvent::OpenPreferences)
    }

    #[wasm_bindgen(js_name = acceptAll)]
    pub fn accept_all(&self) -> bool {
        self.dispatch(ConsentEvent::AcceptAll)
    }

    #[wasm_bindgen(js_name = rejectAll)]
    pub fn reject_all(&self) -> bool {
        self.dispatch(ConsentEvent::RejectAll)
    }

    /// Remove the widget and all of its listeners from the page.
    pub fn destroy(&self) {
        match self.manager.try_borrow_mut() {
            Ok(mut manager) => manager.destroy(),
            Err(_) => log::warn!("Cannot destroy consent banner while it is busy"),
        }
    }

    /// Current widget state name, or `undefined` before `start`.
    pub fn state(&self) -> Option<String> {
        let manager = self.manager.try_borrow().ok()?;
        manager.state().map(|s| format!("{:?}", s))
    }
}

impl ConsentBanner {
    /// Start immediately with a config built in Rust.
    pub fn start_with(&self, update: ConfigUpdate) -> bool {
        start_now(&self.manager, &self.notifier, update)
    }

    pub fn apply_update(&self, update: ConfigUpdate) -> bool {
        let Ok(mut manager) = self.manager.try_borrow_mut() else {
            log::warn!("Consent banner busy; config update dropped");
            return false;
        };
        let result = manager.update_config(update);
        self.notifier
            .set_endpoint(resolve_endpoint(manager.config().consent_endpoint.as_deref()));
        match result {
            Ok(state) => {
                log::debug!("Consent banner reinitialized in {:?}", state);
                true
            }
            Err(err) => {
                log::error!("Consent banner update failed: {}", err);
                false
            }
        }
    }

    pub fn dispatch(&self, event: ConsentEvent) -> bool {
        handle(&self.manager, event)
    }
}

fn parse(manager: &SharedManager, config: &JsValue) -> Option<ConfigUpdate> {
    let hooks = manager.try_borrow().ok()?.config().hooks.clone();
    match host::parse_update(config, &hooks) {
        Ok(update) => Some(update),
        Err(err) => {
            log::error!("Invalid consent banner config: {}", err);
            None
        }
    }
}

fn start_now(manager: &SharedManager, notifier: &HttpNotifier, update: ConfigUpdate) -> bool {
    let Ok(mut manager) = manager.try_borrow_mut() else {
        log::warn!("Consent banner busy; start ignored");
        return false;
    };
    let result = manager
        .start(update, futures::future::ready(()))
        .now_or_never();
    notifier.set_endpoint(resolve_endpoint(manager.config().consent_endpoint.as_deref()));
    match result {
        Some(Ok(state)) => {
            log::info!("Consent banner started in {:?}", state);
            true
        }
        Some(Err(err)) => {
            log::error!("Consent banner failed to start: {}", err);
            false
        }
        None => false,
    }
}

fn handle(manager: &SharedManager, event: ConsentEvent) -> bool {
    let Ok(mut manager) = manager.try_borrow_mut() else {
        log::warn!("Ignoring {:?} while the consent banner is busy", event);
        return false;
    };
    match manager.handle(event) {
        Ok(_) => true,
        Err(err) => {
            log::debug!("{}", err);
            false
        }
    }
}

/// Weak so the view's callback does not keep the manager alive.
fn dispatcher(manager: Weak<RefCell<ConsentManager<LeptosView>>>) -> Dispatch {
    Rc::new(move |event: ConsentEvent| {
        if let Some(manager) = manager.upgrade() {
            handle(&manager, event);
        }
    })
}
