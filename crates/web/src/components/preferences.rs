// =============================================================================
// Consent Banner Web - Preferences Modal
// =============================================================================
// Table of Contents:
// 1. Modal
// 2. Category Switch
// =============================================================================

use consent_banner_core::ConsentEvent;
use leptos::html;
use leptos::prelude::*;

use super::{display, distinct_label, emit};
use crate::view::{CategoryRow, Dispatch, WidgetCopy, WidgetSignals};

// -----------------------------------------------------------------------------
// 1. Modal
// -----------------------------------------------------------------------------

/// Per-category switches plus accept / reject / save. Escape closes it like
/// the X button does.
#[component]
pub fn PreferencesModal(ui: WidgetSignals, copy: WidgetCopy, dispatch: Dispatch) -> impl IntoView {
    let banner = copy.text.banner;
    let prefs = copy.text.preferences;
    let instance = copy.instance;
    let accept_label = distinct_label(
        &banner.accept_all_button_accessible_label,
        &banner.accept_all_button_text,
    );
    let reject_label = distinct_label(
        &banner.reject_non_essential_button_accessible_label,
        &banner.reject_non_essential_button_text,
    );

    // Move focus into the dialog whenever it opens.
    let close_ref = NodeRef::<html::Button>::new();
    Effect::new(move |_| {
        if ui.modal.get() {
            if let Some(button) = close_ref.get() {
                let _ = button.focus();
            }
        }
    });

    let switches = copy
        .rows
        .into_iter()
        .map(|row| {
            view! {
                <CategorySwitch ui=ui row=row instance=instance.clone() dispatch=dispatch.clone() />
            }
        })
        .collect_view();

    let credit = prefs.credit_link_text.map(|link_text| {
        view! {
            <p class="credit" aria-label=prefs.credit_link_accessible_label>
                {link_text}
            </p>
        }
    });

    let on_escape = {
        let dispatch = dispatch.clone();
        move |ev: web_sys::KeyboardEvent| {
            if ev.key() == "Escape" {
                dispatch(ConsentEvent::ClosePreferences);
            }
        }
    };

    view! {
        <div
            id="consentSetting"
            role="dialog"
            aria-modal="true"
            aria-labelledby=format!("consent-title-{}", instance)
            style:display=move || display(ui.modal.get(), "flex")
            on:keydown=on_escape
        >
            <header>
                <h1 id=format!("consent-title-{}", instance)>{prefs.title}</h1>
                <button
                    class="settingClose"
                    node_ref=close_ref
                    aria-label=banner.preferences_button_accessible_label
                    on:click=emit(&dispatch, ConsentEvent::ClosePreferences)
                >
                    <svg width="20" height="20" viewBox="0 0 20 20" fill="none" xmlns="http://www.w3.org/2000/svg">
                        <path d="M19.4081 3.41559C20.189 2.6347 20.189 1.36655 19.4081 0.585663C18.6272 -0.195221 17.3591 -0.195221 16.5782 0.585663L10 7.17008L3.41559 0.59191C2.6347 -0.188974 1.36655 -0.188974 0.585663 0.59191C-0.195221 1.37279 -0.195221 2.64095 0.585663 3.42183L7.17008 10L0.59191 16.5844C-0.188974 17.3653 -0.188974 18.6335 0.59191 19.4143C1.37279 20.1952 2.64095 20.1952 3.42183 19.4143L10 12.8299L16.5844 19.4081C17.3653 20.189 18.6335 20.189 19.4143 19.4081C20.1952 18.6272 20.1952 17.3591 19.4143 16.5782L12.8299 10L19.4081 3.41559Z"></path>
                    </svg>
                </button>
            </header>
            <div inner_html=prefs.description></div>
            <section id=format!("cookie-preferences-{}", instance)>{switches}</section>
            <footer>
                <button
                    class="preferences-accept-all stB stBPaccept"
                    aria-label=accept_label
                    on:click=emit(&dispatch, ConsentEvent::AcceptAll)
                >
                    {banner.accept_all_button_text}
                </button>
                <button
                    class="preferences-reject-all stB stBPreject"
                    aria-label=reject_label
                    on:click=emit(&dispatch, ConsentEvent::RejectAll)
                >
                    {banner.reject_non_essential_button_text}
                </button>
                <button
                    class="preferences-save stB stBPsave"
                    on:click=emit(&dispatch, ConsentEvent::SavePreferences)
                >
                    {prefs.save_preferences_button_text}
                </button>
            </footer>
            {credit}
        </div>
    }
}

// -----------------------------------------------------------------------------
// 2. Category Switch
// -----------------------------------------------------------------------------

/// One on/off switch. Required categories render checked and disabled.
#[component]
fn CategorySwitch(
    ui: WidgetSignals,
    row: CategoryRow,
    instance: String,
    dispatch: Dispatch,
) -> impl IntoView {
    let input_id = format!("cookies-{}-{}", row.id, instance);
    let label_for = input_id.clone();
    let checked_id = row.id.clone();
    let toggle_id = row.id.clone();

    view! {
        <fieldset>
            <legend>{row.name}</legend>
            <div class="cookie-type-content">
                <div class="cookie-type-description" inner_html=row.description></div>
                <label class="switch" for=label_for>
                    <input
                        type="checkbox"
                        id=input_id
                        disabled=row.required
                        prop:checked=move || ui.is_checked(&checked_id)
                        on:change=move |ev| {
                            dispatch(ConsentEvent::Toggle {
                                id: toggle_id.clone(),
                                checked: event_target_checked(&ev),
                            })
                        }
                    />
                    <span class="switch__pill" aria-hidden="true"></span>
                    <span class="switch__dot" aria-hidden="true"></span>
                    <span class="switch__off" aria-hidden="true">"Off"</span>
                    <span class="switch__on" aria-hidden="true">"On"</span>
                </label>
            </div>
        </fieldset>
    }
}
