// =============================================================================
// Consent Banner Web - Browser Services
// =============================================================================
// Table of Contents:
// 1. Submodules
// 2. Re-exports
// 3. Environment Assembly
// =============================================================================

pub mod cookies;
pub mod gtag;
pub mod notify;
pub mod storage;

pub use cookies::DocumentCookieJar;
pub use gtag::{DataLayerQueue, GtagTagManager};
pub use notify::{HttpNotifier, NotifyError};
pub use storage::LocalStorageBackend;

use std::rc::Rc;

use consent_banner_core::ConsentEnvironment;

// -----------------------------------------------------------------------------
// 3. Environment Assembly
// -----------------------------------------------------------------------------

/// Wire every browser surface into a core environment. The notifier is
/// returned separately so its endpoint can follow config updates.
pub fn browser_environment() -> (ConsentEnvironment, Rc<HttpNotifier>) {
    let notifier = Rc::new(HttpNotifier::new(notify::resolve_endpoint(None)));
    let env = ConsentEnvironment::new(Rc::new(LocalStorageBackend))
        .with_cookies(Rc::new(DocumentCookieJar))
        .with_tag_manager(Rc::new(GtagTagManager))
        .with_events(Rc::new(DataLayerQueue))
        .with_notifier(notifier.clone());
    (env, notifier)
}
