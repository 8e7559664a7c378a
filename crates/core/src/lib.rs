//! # Consent Banner Core
//!
//! Platform-independent cookie-consent logic: category definitions, the
//! banner/modal/icon state machine, the namespaced consent store, the
//! consent broadcaster and the server-cookie synchronizer.
//!
//! Browser surfaces (localStorage, `document.cookie`, `gtag`, `dataLayer`,
//! the DOM) are reached only through the traits in [`store`], [`cookie`],
//! [`analytics`] and [`machine::WidgetView`], so everything here runs
//! natively under `cargo test`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! let config = BannerConfig::new(vec![
//!     CookieCategory::new("necessary").required(),
//!     CookieCategory::new("analytical"),
//!     CookieCategory::new("advertising"),
//! ]);
//! let mut widget = ConsentWidget::new(config, ConsentEnvironment::default(), NullView)?;
//! widget.handle(ConsentEvent::AcceptAll)?;
//! ```

pub mod analytics;
pub mod broadcaster;
pub mod category;
pub mod choice;
pub mod config;
pub mod cookie;
pub mod env;
pub mod error;
pub mod hooks;
pub mod machine;
pub mod manager;
pub mod store;

pub use analytics::{
    AnalyticsEvent, ConsentCommand, ConsentModeUpdate, ConsentNotifier, ConsentSignal, EventQueue,
    TagManager,
};
pub use broadcaster::{BroadcastReport, BroadcastStep, Broadcaster};
pub use category::{CategoryId, CookieCategory};
pub use choice::{ConsentChoice, ConsentPayload};
pub use config::{BannerConfig, ConfigUpdate, LifecycleHooks};
pub use cookie::{CookieJar, CookieSynchronizer, SyncOutcome};
pub use env::ConsentEnvironment;
pub use error::{ConsentError, ConsentResult};
pub use hooks::{ChoiceHook, Hook};
pub use machine::{CheckboxState, ConsentEvent, ConsentWidget, NullView, WidgetState, WidgetView};
pub use manager::ConsentManager;
pub use store::{ConsentStore, KeyLayout, StorageBackend};
