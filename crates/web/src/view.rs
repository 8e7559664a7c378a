// =============================================================================
// Consent Banner Web - Leptos Widget View
// =============================================================================
// Table of Contents:
// 1. Signals
// 2. Static Copy
// 3. Leptos View
// 4. Body Scroll Lock
// =============================================================================

use std::any::Any;
use std::rc::Rc;

use consent_banner_core::config::TextConfig;
use consent_banner_core::{
    BannerConfig, CategoryId, CheckboxState, ConsentEvent, WidgetView,
};
use leptos::mount::mount_to;
use leptos::prelude::*;
use uuid::Uuid;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::components::ConsentRoot;

/// Container element inserted at the start of `<body>`.
pub const WRAPPER_ID: &str = "consentWrap";

/// Routes a UI event back into the widget that owns this view.
pub type Dispatch = Rc<dyn Fn(ConsentEvent)>;

// -----------------------------------------------------------------------------
// 1. Signals
// -----------------------------------------------------------------------------

/// Reactive state the components render from, written by the state machine.
#[derive(Clone, Copy)]
pub struct WidgetSignals {
    pub banner: RwSignal<bool>,
    pub modal: RwSignal<bool>,
    pub icon: RwSignal<bool>,
    pub backdrop: RwSignal<bool>,
    pub checkboxes: RwSignal<Vec<CheckboxState>>,
}

impl WidgetSignals {
    fn new() -> Self {
        Self {
            banner: RwSignal::new(false),
            modal: RwSignal::new(false),
            icon: RwSignal::new(false),
            backdrop: RwSignal::new(false),
            checkboxes: RwSignal::new(Vec::new()),
        }
    }

    pub fn is_checked(&self, id: &CategoryId) -> bool {
        self.checkboxes
            .with(|rows| rows.iter().any(|row| &row.id == id && row.checked))
    }
}

// -----------------------------------------------------------------------------
// 2. Static Copy
// -----------------------------------------------------------------------------

/// One row of the preferences modal.
#[derive(Clone, Debug)]
pub struct CategoryRow {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub required: bool,
}

/// Configuration the components need, stripped of the (non-`Send`) hooks.
#[derive(Clone, Debug)]
pub struct WidgetCopy {
    pub text: TextConfig,
    pub position_class: &'static str,
    pub icon_class: String,
    pub rows: Vec<CategoryRow>,
    /// Per-mount suffix keeping element ids unique across re-inits
    pub instance: String,
}

impl WidgetCopy {
    pub fn from_config(config: &BannerConfig, instance: String) -> Self {
        let icon_class = [
            config.cookie_icon.position.as_deref(),
            config.cookie_icon.color_scheme.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

        Self {
            text: config.text.clone(),
            position_class: config.position.banner.class(),
            icon_class,
            rows: config
                .cookie_types
                .iter()
                .map(|c| CategoryRow {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    description: c.description.clone(),
                    required: c.required,
                })
                .collect(),
            instance,
        }
    }
}

// -----------------------------------------------------------------------------
// 3. Leptos View
// -----------------------------------------------------------------------------

/// [`WidgetView`] backed by a Leptos tree mounted into `#consentWrap`.
pub struct LeptosView {
    dispatch: Dispatch,
    owner: Option<Owner>,
    ui: Option<WidgetSignals>,
    /// Leptos `UnmountHandle`; dropping it removes the mounted nodes
    mounted: Option<Box<dyn Any>>,
    wrapper: Option<HtmlElement>,
}

impl LeptosView {
    pub fn new(dispatch: Dispatch) -> Self {
        Self {
            dispatch,
            owner: None,
            ui: None,
            mounted: None,
            wrapper: None,
        }
    }

    fn create_wrapper() -> Option<HtmlElement> {
        let document = web_sys::window()?.document()?;
        let body = document.body()?;
        let wrapper = document.create_element("div").ok()?;
        wrapper.set_id(WRAPPER_ID);
        body.insert_before(&wrapper, body.first_child().as_ref()).ok()?;
        wrapper.dyn_into::<HtmlElement>().ok()
    }

    fn with_ui(&self, f: impl FnOnce(&WidgetSignals)) {
        if let Some(ui) = &self.ui {
            f(ui);
        }
    }
}

impl WidgetView for LeptosView {
    fn mount(&mut self, config: &BannerConfig) {
        self.teardown();

        let Some(wrapper) = Self::create_wrapper() else {
            log::error!("Could not create #{} container", WRAPPER_ID);
            return;
        };

        let instance = Uuid::new_v4().simple().to_string()[..8].to_string();
        let copy = WidgetCopy::from_config(config, instance);
        let owner = Owner::new();
        let ui = owner.with(WidgetSignals::new);
        let dispatch = self.dispatch.clone();

        let handle = owner.with(|| {
            mount_to(wrapper.clone(), move || {
                view! { <ConsentRoot ui=ui copy=copy dispatch=dispatch /> }
            })
        });

        self.mounted = Some(Box::new(handle));
        self.owner = Some(owner);
        self.ui = Some(ui);
        self.wrapper = Some(wrapper);
        log::debug!("Consent widget mounted");
    }

    fn show_banner(&mut self) {
        self.with_ui(|ui| ui.banner.set(true));
    }

    fn remove_banner(&mut self) {
        self.with_ui(|ui| ui.banner.set(false));
    }

    fn show_modal(&mut self, checkboxes: &[CheckboxState]) {
        self.with_ui(|ui| {
            ui.checkboxes.set(checkboxes.to_vec());
            ui.modal.set(true);
        });
        set_body_scroll_locked(true);
    }

    fn hide_modal(&mut self) {
        self.with_ui(|ui| ui.modal.set(false));
        set_body_scroll_locked(false);
    }

    fn show_icon(&mut self) {
        self.with_ui(|ui| ui.icon.set(true));
    }

    fn hide_icon(&mut self) {
        self.with_ui(|ui| ui.icon.set(false));
    }

    fn show_backdrop(&mut self) {
        self.with_ui(|ui| ui.backdrop.set(true));
    }

    fn hide_backdrop(&mut self) {
        self.with_ui(|ui| ui.backdrop.set(false));
    }

    fn teardown(&mut self) {
        // Unmount first so no listener outlives its signals.
        self.mounted.take();
        self.ui.take();
        if let Some(owner) = self.owner.take() {
            owner.cleanup();
        }
        if let Some(wrapper) = self.wrapper.take() {
            wrapper.remove();
        }
        set_body_scroll_locked(false);
    }
}

// -----------------------------------------------------------------------------
// 4. Body Scroll Lock
// -----------------------------------------------------------------------------

fn set_body_scroll_locked(locked: bool) {
    let Some(body) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.body())
    else {
        return;
    };
    let style = body.style();
    let result = if locked {
        style.set_property("overflow", "hidden")
    } else {
        style.remove_property("overflow").map(|_| ())
    };
    if let Err(err) = result {
        log::warn!("Could not update body scroll lock: {:?}", err);
    }
}
