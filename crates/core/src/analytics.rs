//! # Analytics Surfaces
//!
//! Outbound collaborators of the broadcaster:
//!
//! 1. **TagManager** - consent-mode `update` / `default` commands
//! 2. **EventQueue** - structured analytics events (`dataLayer`)
//! 3. **ConsentNotifier** - fire-and-forget remote notification
//!
//! Each has an in-memory implementation for tests and development.

use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

use crate::category::CategoryId;
use crate::choice::{ConsentChoice, ConsentPayload};
use crate::error::ConsentResult;

// ============================================================================
// Consent Mode
// ============================================================================

/// A consent-mode signal value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsentSignal {
    Granted,
    Denied,
}

impl From<bool> for ConsentSignal {
    fn from(granted: bool) -> Self {
        if granted {
            ConsentSignal::Granted
        } else {
            ConsentSignal::Denied
        }
    }
}

/// Arguments of a consent-mode command. Absent keys are left untouched by the
/// tag manager.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConsentModeUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_storage: Option<ConsentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_storage: Option<ConsentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_user_data: Option<ConsentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ad_personalization: Option<ConsentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personalization_storage: Option<ConsentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub functionality_storage: Option<ConsentSignal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_storage: Option<ConsentSignal>,
}

impl ConsentModeUpdate {
    /// analytical → analytics_storage, advertising → the three ad signals.
    pub fn from_choice(choice: &ConsentChoice) -> Self {
        let analytical = ConsentSignal::from(choice.is_granted(&CategoryId::Analytical));
        let advertising = ConsentSignal::from(choice.is_granted(&CategoryId::Advertising));
        Self {
            analytics_storage: Some(analytical),
            ad_storage: Some(advertising),
            ad_user_data: Some(advertising),
            ad_personalization: Some(advertising),
            ..Default::default()
        }
    }

    /// Variant used when consent comes from the server cookie: also sets
    /// personalization (follows advertising), functionality and security
    /// (follow necessary).
    pub fn from_choice_extended(choice: &ConsentChoice) -> Self {
        let necessary = ConsentSignal::from(choice.is_granted(&CategoryId::Necessary));
        let advertising = ConsentSignal::from(choice.is_granted(&CategoryId::Advertising));
        Self {
            personalization_storage: Some(advertising),
            functionality_storage: Some(necessary),
            security_storage: Some(necessary),
            ..Self::from_choice(choice)
        }
    }

    /// Defaults issued before any choice is known.
    pub fn denied_defaults() -> Self {
        Self {
            analytics_storage: Some(ConsentSignal::Denied),
            ad_storage: Some(ConsentSignal::Denied),
            ad_user_data: Some(ConsentSignal::Denied),
            ad_personalization: Some(ConsentSignal::Denied),
            personalization_storage: Some(ConsentSignal::Denied),
            functionality_storage: Some(ConsentSignal::Granted),
            security_storage: Some(ConsentSignal::Granted),
        }
    }
}

/// Consent-mode command kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsentCommand {
    Default,
    Update,
}

impl ConsentCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentCommand::Default => "default",
            ConsentCommand::Update => "update",
        }
    }
}

/// Tag-manager consent API (`gtag('consent', …)` in the browser).
pub trait TagManager {
    fn consent(&self, command: ConsentCommand, update: &ConsentModeUpdate) -> ConsentResult<()>;
}

// ============================================================================
// Analytics Events
// ============================================================================

pub const EVENT_CONSENT_UPDATED: &str = "consent_updated";
pub const EVENT_CONSENT_SYNCED_FROM_COOKIE: &str = "consent_synced_from_cookie";

/// Structured event pushed to the analytics queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnalyticsEvent {
    pub event: String,
    pub consent_necessary: bool,
    pub consent_analytical: bool,
    pub consent_advertising: bool,
}

impl AnalyticsEvent {
    pub fn new(name: impl Into<String>, payload: ConsentPayload) -> Self {
        Self {
            event: name.into(),
            consent_necessary: payload.necessary,
            consent_analytical: payload.analytical,
            consent_advertising: payload.advertising,
        }
    }
}

/// Analytics event queue (`window.dataLayer` in the browser).
pub trait EventQueue {
    fn push(&self, event: &AnalyticsEvent) -> ConsentResult<()>;
}

// ============================================================================
// Remote Notification
// ============================================================================

/// Best-effort remote notification. Implementations must not block and must
/// swallow their own failures after logging them.
pub trait ConsentNotifier {
    fn notify(&self, payload: ConsentPayload);
}

// ============================================================================
// In-Memory Implementations
// ============================================================================

/// Records every consent command.
#[derive(Clone, Default)]
pub struct MemoryTagManager {
    calls: Rc<RefCell<Vec<(ConsentCommand, ConsentModeUpdate)>>>,
}

impl MemoryTagManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(ConsentCommand, ConsentModeUpdate)> {
        self.calls.borrow().clone()
    }

    pub fn last_update(&self) -> Option<ConsentModeUpdate> {
        self.calls
            .borrow()
            .iter()
            .rev()
            .find(|(command, _)| *command == ConsentCommand::Update)
            .map(|(_, update)| update.clone())
    }
}

impl TagManager for MemoryTagManager {
    fn consent(&self, command: ConsentCommand, update: &ConsentModeUpdate) -> ConsentResult<()> {
        self.calls.borrow_mut().push((command, update.clone()));
        Ok(())
    }
}

/// Records every pushed event.
#[derive(Clone, Default)]
pub struct MemoryEventQueue {
    events: Rc<RefCell<Vec<AnalyticsEvent>>>,
}

impl MemoryEventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.borrow().clone()
    }
}

impl EventQueue for MemoryEventQueue {
    fn push(&self, event: &AnalyticsEvent) -> ConsentResult<()> {
        self.events.borrow_mut().push(event.clone());
        Ok(())
    }
}

/// Records every notification payload.
#[derive(Clone, Default)]
pub struct MemoryNotifier {
    sent: Rc<RefCell<Vec<ConsentPayload>>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<ConsentPayload> {
        self.sent.borrow().clone()
    }
}

impl ConsentNotifier for MemoryNotifier {
    fn notify(&self, payload: ConsentPayload) {
        self.sent.borrow_mut().push(payload);
    }
}
