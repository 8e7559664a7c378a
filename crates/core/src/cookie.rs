//! # Cookie Synchronizer
//!
//! Seeds the local store from a consent decision recorded server-side in the
//! `cookie_consent` cookie, and formats the client-side mirror of that cookie.
//!
//! A missing cookie is a no-op. A malformed one is logged and ignored; nothing
//! here returns an error to the page-load path.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;

use crate::analytics::{
    AnalyticsEvent, ConsentCommand, ConsentModeUpdate, EVENT_CONSENT_SYNCED_FROM_COOKIE,
};
use crate::choice::{ConsentChoice, ConsentPayload};
use crate::env::ConsentEnvironment;
use crate::error::{ConsentError, ConsentResult};
use crate::store::ConsentStore;

// ============================================================================
// Cookie Jar
// ============================================================================

/// Access to the page's cookies (`document.cookie` in the browser).
pub trait CookieJar {
    /// The raw `name=value; name2=value2` header.
    fn cookie_header(&self) -> ConsentResult<String>;

    /// Write one `Set-Cookie`-style assignment.
    fn set_cookie(&self, assignment: &str) -> ConsentResult<()>;
}

/// In-memory jar for testing/development.
#[derive(Clone, Default)]
pub struct MemoryCookieJar {
    header: Rc<RefCell<String>>,
    written: Rc<RefCell<Vec<String>>>,
}

impl MemoryCookieJar {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: Rc::new(RefCell::new(header.into())),
            written: Rc::default(),
        }
    }

    pub fn written(&self) -> Vec<String> {
        self.written.borrow().clone()
    }
}

impl CookieJar for MemoryCookieJar {
    fn cookie_header(&self) -> ConsentResult<String> {
        Ok(self.header.borrow().clone())
    }

    fn set_cookie(&self, assignment: &str) -> ConsentResult<()> {
        self.written.borrow_mut().push(assignment.to_string());
        Ok(())
    }
}

/// Find `name` in a cookie header and percent-decode its value.
pub fn read_cookie(header: &str, name: &str) -> Option<String> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| match urlencoding::decode(value) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => value.to_string(),
        })
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse the cookie's JSON object. `necessary` is always forced on.
pub fn parse_consent_cookie(raw: &str) -> ConsentResult<ConsentChoice> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ConsentError::MalformedCookie(e.to_string()))?;
    let object = value
        .as_object()
        .ok_or_else(|| ConsentError::MalformedCookie(format!("expected an object, got {}", raw)))?;

    let payload = ConsentPayload {
        necessary: true,
        analytical: object.get("analytical").map(truthy).unwrap_or(false),
        advertising: object.get("advertising").map(truthy).unwrap_or(false),
    };
    Ok(ConsentChoice::from(payload))
}

/// Boolean-ish interpretation of a cookie field.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "granted"
        ),
        _ => false,
    }
}

/// Format the mirror cookie assignment for `document.cookie`.
pub fn consent_cookie_assignment(
    name: &str,
    payload: ConsentPayload,
    days: u32,
    now: DateTime<Utc>,
) -> ConsentResult<String> {
    let json = serde_json::to_string(&payload)?;
    let expires = now + Duration::days(i64::from(days));
    Ok(format!(
        "{}={}; path=/; Secure; SameSite=Lax; expires={}",
        name,
        urlencoding::encode(&json),
        expires.format("%a, %d %b %Y %H:%M:%S GMT")
    ))
}

// ============================================================================
// Synchronizer
// ============================================================================

/// What a sync attempt did.
#[derive(Clone, Debug)]
pub enum SyncOutcome {
    /// No cookie jar or no consent cookie
    NoCookie,
    Synced(ConsentChoice),
    /// Cookie present but unusable; state untouched
    Malformed(ConsentError),
}

pub struct CookieSynchronizer<'a> {
    env: &'a ConsentEnvironment,
    store: &'a ConsentStore,
    cookie_name: &'a str,
}

impl<'a> CookieSynchronizer<'a> {
    pub fn new(env: &'a ConsentEnvironment, store: &'a ConsentStore, cookie_name: &'a str) -> Self {
        Self { env, store, cookie_name }
    }

    pub fn sync(&self) -> SyncOutcome {
        let Some(jar) = &self.env.cookies else {
            return SyncOutcome::NoCookie;
        };
        let header = match jar.cookie_header() {
            Ok(header) => header,
            Err(err) => {
                log::error!("Could not read cookies: {}", err);
                return SyncOutcome::NoCookie;
            }
        };
        let Some(raw) = read_cookie(&header, self.cookie_name) else {
            return SyncOutcome::NoCookie;
        };
        let choice = match parse_consent_cookie(&raw) {
            Ok(choice) => choice,
            Err(err) => {
                log::error!("Error parsing {}: {}", self.cookie_name, err);
                return SyncOutcome::Malformed(err);
            }
        };

        if let Err(err) = self.store.save(&choice) {
            log::warn!("Could not mirror cookie consent into storage: {}", err);
        }
        if let Err(err) = self.store.mark_initial_choice_made() {
            log::warn!("Could not record initial choice from cookie: {}", err);
        }

        if let Some(tag_manager) = &self.env.tag_manager {
            let update = ConsentModeUpdate::from_choice_extended(&choice);
            if let Err(err) = tag_manager.consent(ConsentCommand::Update, &update) {
                log::warn!("Tag manager update from cookie failed: {}", err);
            }
        }

        if let Some(events) = &self.env.events {
            let event = AnalyticsEvent::new(EVENT_CONSENT_SYNCED_FROM_COOKIE, choice.payload());
            if let Err(err) = events.push(&event) {
                log::warn!("Could not push {}: {}", EVENT_CONSENT_SYNCED_FROM_COOKIE, err);
            }
        }

        log::debug!("Consent synced from cookie: {:?}", choice);
        SyncOutcome::Synced(choice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{ConsentSignal, MemoryEventQueue, MemoryTagManager};
    use crate::category::CategoryId;
    use crate::store::{KeyLayout, MemoryStorage};
    use chrono::TimeZone;

    struct Fixture {
        env: ConsentEnvironment,
        store: ConsentStore,
        tags: MemoryTagManager,
        events: MemoryEventQueue,
    }

    fn fixture(header: &str) -> Fixture {
        let storage = MemoryStorage::new();
        let tags = MemoryTagManager::new();
        let events = MemoryEventQueue::new();
        let env = ConsentEnvironment::new(Rc::new(storage))
            .with_cookies(Rc::new(MemoryCookieJar::new(header)))
            .with_tag_manager(Rc::new(tags.clone()))
            .with_events(Rc::new(events.clone()));
        let store = ConsentStore::new(env.storage.clone(), KeyLayout::default(), None);
        Fixture { env, store, tags, events }
    }

    #[test]
    fn test_read_cookie_decodes() {
        let header = "_ga=GA1.1.1; cookie_consent=%7B%22analytical%22%3Atrue%7D; lang=id";
        assert_eq!(
            read_cookie(header, "cookie_consent").as_deref(),
            Some(r#"{"analytical":true}"#)
        );
        assert_eq!(read_cookie(header, "missing"), None);
    }

    #[test]
    fn test_sync_from_cookie() {
        let f = fixture(r#"cookie_consent={"analytical":true,"advertising":false}"#);
        let outcome = CookieSynchronizer::new(&f.env, &f.store, "cookie_consent").sync();
        assert!(matches!(outcome, SyncOutcome::Synced(_)));

        assert_eq!(f.store.get(&CategoryId::Analytical), Some(true));
        assert_eq!(f.store.get(&CategoryId::Advertising), Some(false));
        assert_eq!(f.store.get(&CategoryId::Necessary), Some(true));
        assert!(f.store.has_initial_choice());

        let update = f.tags.last_update().unwrap();
        assert_eq!(update.analytics_storage, Some(ConsentSignal::Granted));
        assert_eq!(update.ad_storage, Some(ConsentSignal::Denied));

        let events = f.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "consent_synced_from_cookie");
        assert!(events[0].consent_necessary);
        assert!(events[0].consent_analytical);
        assert!(!events[0].consent_advertising);
    }

    #[test]
    fn test_boolean_ish_fields() {
        let choice = parse_consent_cookie(r#"{"analytical":"true","advertising":0}"#).unwrap();
        assert!(choice.is_granted(&CategoryId::Analytical));
        assert!(!choice.is_granted(&CategoryId::Advertising));
        assert!(choice.is_granted(&CategoryId::Necessary));
    }

    #[test]
    fn test_malformed_cookie_leaves_state() {
        let f = fixture("cookie_consent=not-json");
        let outcome = CookieSynchronizer::new(&f.env, &f.store, "cookie_consent").sync();
        assert!(matches!(outcome, SyncOutcome::Malformed(ConsentError::MalformedCookie(_))));
        assert!(!f.store.has_initial_choice());
        assert!(f.tags.calls().is_empty());
        assert!(f.events.events().is_empty());
    }

    #[test]
    fn test_non_object_is_malformed() {
        assert!(parse_consent_cookie("[true,false]").is_err());
    }

    #[test]
    fn test_missing_cookie_is_noop() {
        let f = fixture("lang=id");
        let outcome = CookieSynchronizer::new(&f.env, &f.store, "cookie_consent").sync();
        assert!(matches!(outcome, SyncOutcome::NoCookie));
    }

    #[test]
    fn test_mirror_assignment() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let payload = ConsentPayload { necessary: true, analytical: false, advertising: true };
        let cookie = consent_cookie_assignment("cookie_consent", payload, 365, now).unwrap();
        assert!(cookie.starts_with("cookie_consent=%7B%22necessary%22%3Atrue"));
        assert!(cookie.ends_with("path=/; Secure; SameSite=Lax; expires=Thu, 01 Jan 2026 00:00:00 GMT"));
    }
}
