// =============================================================================
// Consent Banner Web - Floating Cookie Icon
// =============================================================================

use consent_banner_core::ConsentEvent;
use leptos::prelude::*;

use super::{display, emit, settings_icon};
use crate::view::{Dispatch, WidgetCopy, WidgetSignals};

/// Resting-state button that reopens the preferences modal.
#[component]
pub fn CookieIcon(ui: WidgetSignals, copy: WidgetCopy, dispatch: Dispatch) -> impl IntoView {
    view! {
        <button
            id="cookieSetting"
            class=copy.icon_class
            aria-label=copy.text.banner.preferences_button_accessible_label
            style:display=move || display(ui.icon.get(), "flex")
            on:click=emit(&dispatch, ConsentEvent::ClickIcon)
        >
            {settings_icon()}
        </button>
    }
}
