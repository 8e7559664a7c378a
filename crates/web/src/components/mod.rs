// =============================================================================
// Consent Banner Web - UI Components
// =============================================================================
// Table of Contents:
// 1. Submodules
// 2. Shared Helpers
// 3. Root Component
// =============================================================================

pub mod banner;
pub mod icon;
pub mod preferences;

pub use banner::CookieBanner;
pub use icon::CookieIcon;
pub use preferences::PreferencesModal;

use consent_banner_core::ConsentEvent;
use leptos::prelude::*;

use crate::view::{Dispatch, WidgetCopy, WidgetSignals};

// -----------------------------------------------------------------------------
// 2. Shared Helpers
// -----------------------------------------------------------------------------

/// CSS `display` value for a surface.
pub(crate) fn display(visible: bool, shown: &'static str) -> &'static str {
    if visible {
        shown
    } else {
        "none"
    }
}

/// Event handler that hands `event` straight to the state machine.
pub(crate) fn emit<E>(dispatch: &Dispatch, event: ConsentEvent) -> impl Fn(E) + 'static {
    let dispatch = dispatch.clone();
    move |_| dispatch(event.clone())
}

/// An accessible label is only emitted when it adds something to the text.
pub(crate) fn distinct_label(label: &Option<String>, text: &str) -> Option<String> {
    label.clone().filter(|l| !l.is_empty() && l != text)
}

/// Gear icon shared by the banner preferences button and the floating icon.
pub(crate) fn settings_icon() -> impl IntoView {
    view! {
        <svg
            xmlns="http://www.w3.org/2000/svg"
            height="24px"
            viewBox="0 -960 960 960"
            width="24px"
            aria-hidden="true"
        >
            <path d="m370-80-16-128q-13-5-24.5-12T307-235l-119 50L78-375l103-78q-1-7-1-13.5v-27q0-6.5 1-13.5L78-585l110-190 119 50q11-8 23-15t24-12l16-128h220l16 128q13 5 24.5 12t22.5 15l119-50 110 190-103 78q1 7 1 13.5v27q0 6.5-2 13.5l103 78-110 190-118-50q-11 8-23 15t-24 12L590-80H370Zm70-80h79l14-106q31-8 57.5-23.5T639-327l99 41 39-68-86-65q5-14 7-29.5t2-31.5q0-16-2-31.5t-7-29.5l86-65-39-68-99 42q-22-23-48.5-38.5T533-694l-13-106h-79l-14 106q-31 8-57.5 23.5T321-633l-99-41-39 68 86 64q-5 15-7 30t-2 32q0 16 2 31t7 30l-86 65 39 68 99-42q22 23 48.5 38.5T427-266l13 106Zm42-180q58 0 99-41t41-99q0-58-41-99t-99-41q-59 0-99.5 41T342-480q0 58 40.5 99t99.5 41Zm-2-140Z"></path>
        </svg>
    }
}

// -----------------------------------------------------------------------------
// 3. Root Component
// -----------------------------------------------------------------------------

/// Everything the widget renders inside its `#consentWrap` container.
#[component]
pub fn ConsentRoot(ui: WidgetSignals, copy: WidgetCopy, dispatch: Dispatch) -> impl IntoView {
    view! {
        <div id="cBackdrop" style:display=move || display(ui.backdrop.get(), "block")></div>
        <CookieBanner ui=ui copy=copy.clone() dispatch=dispatch.clone() />
        <PreferencesModal ui=ui copy=copy.clone() dispatch=dispatch.clone() />
        <CookieIcon ui=ui copy=copy dispatch=dispatch />
    }
}
