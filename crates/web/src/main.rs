// =============================================================================
// Consent Banner Web - Demo Entry Point
// =============================================================================
// Trunk compiles this and injects it into index.html. Mounts the banner with
// the three standard categories, each forwarding its decision to gtag.
// =============================================================================

use consent_banner_core::{
    BannerConfig, ConfigUpdate, ConsentCommand, ConsentModeUpdate, ConsentSignal, CookieCategory,
    Hook, TagManager,
};
use consent_banner_web::services::GtagTagManager;
use consent_banner_web::ConsentBanner;

/// Per-category consent-mode update run from `onAccept` / `onReject`.
fn gtag_hook(label: &'static str, update: ConsentModeUpdate) -> Hook {
    Hook::new(move || {
        GtagTagManager.consent(ConsentCommand::Update, &update)?;
        log::debug!("{} cookies updated", label);
        Ok(())
    })
}

fn analytics(signal: ConsentSignal) -> ConsentModeUpdate {
    ConsentModeUpdate {
        analytics_storage: Some(signal),
        ..Default::default()
    }
}

fn advertising(signal: ConsentSignal) -> ConsentModeUpdate {
    ConsentModeUpdate {
        ad_storage: Some(signal),
        ad_user_data: Some(signal),
        ad_personalization: Some(signal),
        ..Default::default()
    }
}

fn demo_config() -> BannerConfig {
    let mut config = BannerConfig::new(vec![
        CookieCategory::new("necessary")
            .named("Necessary Cookies")
            .described("<p>These cookies are required for the website to work and cannot be switched off.</p>")
            .required()
            .on_accept(Hook::infallible(|| log::debug!("Necessary cookies enabled"))),
        CookieCategory::new("analytical")
            .named("Analytical")
            .described("<p>These cookies help us count visits and traffic sources. <b>The data is aggregated and anonymous</b>.</p>")
            .on_accept(gtag_hook("Analytical", analytics(ConsentSignal::Granted)))
            .on_reject(gtag_hook("Analytical", analytics(ConsentSignal::Denied))),
        CookieCategory::new("advertising")
            .named("Advertising")
            .described("<p>These cookies are used to show ads relevant to your interests.</p>")
            .on_accept(gtag_hook("Advertising", advertising(ConsentSignal::Granted)))
            .on_reject(gtag_hook("Advertising", advertising(ConsentSignal::Denied))),
    ]);
    config.background.show_background = true;
    config.hooks.on_consent_given = Some(Hook::infallible(|| log::info!("Consent given")));
    config.hooks.on_consent_rejected = Some(Hook::infallible(|| log::info!("Consent rejected")));
    config
}

fn main() {
    let banner = ConsentBanner::new();
    log::info!("Starting consent banner demo...");

    if !banner.start_with(ConfigUpdate::from(demo_config())) {
        log::error!("Consent banner demo failed to start");
    }

    // The banner lives for the whole page.
    std::mem::forget(banner);
}
