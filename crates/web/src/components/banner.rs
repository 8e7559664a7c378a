// =============================================================================
// Consent Banner Web - Banner
// =============================================================================

use consent_banner_core::ConsentEvent;
use leptos::prelude::*;

use super::{display, distinct_label, emit, settings_icon};
use crate::view::{Dispatch, WidgetCopy, WidgetSignals};

/// First-visit banner with accept / reject / preferences actions.
#[component]
pub fn CookieBanner(ui: WidgetSignals, copy: WidgetCopy, dispatch: Dispatch) -> impl IntoView {
    let text = copy.text.banner;
    let accept_label = distinct_label(
        &text.accept_all_button_accessible_label,
        &text.accept_all_button_text,
    );
    let reject_label = distinct_label(
        &text.reject_non_essential_button_accessible_label,
        &text.reject_non_essential_button_text,
    );

    view! {
        <div
            id="webCB"
            class=copy.position_class
            role="region"
            aria-label=text.title.clone()
            style:display=move || display(ui.banner.get(), "block")
        >
            <div class="actCT">
                <h2>{text.title.clone()}</h2>
                <div inner_html=text.description></div>
            </div>
            <div class="actCC">
                <div class="actCC-setting">
                    <button
                        class="preferences"
                        title=text.preferences_button_text
                        aria-label=text.preferences_button_accessible_label
                        on:click=emit(&dispatch, ConsentEvent::OpenPreferences)
                    >
                        {settings_icon()}
                    </button>
                </div>
                <button
                    class="accept-all stB stBPaccept"
                    aria-label=accept_label
                    on:click=emit(&dispatch, ConsentEvent::AcceptAll)
                >
                    {text.accept_all_button_text}
                </button>
                <button
                    class="reject-all stB stBPreject"
                    aria-label=reject_label
                    on:click=emit(&dispatch, ConsentEvent::RejectAll)
                >
                    {text.reject_non_essential_button_text}
                </button>
            </div>
        </div>
    }
}
