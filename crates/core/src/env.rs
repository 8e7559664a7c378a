//! Collaborators a widget talks to, bundled so they can be swapped wholesale
//! between the browser bindings and in-memory test doubles.

use std::rc::Rc;

use crate::analytics::{ConsentNotifier, EventQueue, TagManager};
use crate::cookie::CookieJar;
use crate::store::{MemoryStorage, StorageBackend};

/// External surfaces used by the store, broadcaster and cookie synchronizer.
/// Every surface except storage is optional; an absent one is skipped.
#[derive(Clone)]
pub struct ConsentEnvironment {
    pub storage: Rc<dyn StorageBackend>,
    pub cookies: Option<Rc<dyn CookieJar>>,
    pub tag_manager: Option<Rc<dyn TagManager>>,
    pub events: Option<Rc<dyn EventQueue>>,
    pub notifier: Option<Rc<dyn ConsentNotifier>>,
}

impl ConsentEnvironment {
    pub fn new(storage: Rc<dyn StorageBackend>) -> Self {
        Self {
            storage,
            cookies: None,
            tag_manager: None,
            events: None,
            notifier: None,
        }
    }

    pub fn with_cookies(mut self, cookies: Rc<dyn CookieJar>) -> Self {
        self.cookies = Some(cookies);
        self
    }

    pub fn with_tag_manager(mut self, tag_manager: Rc<dyn TagManager>) -> Self {
        self.tag_manager = Some(tag_manager);
        self
    }

    pub fn with_events(mut self, events: Rc<dyn EventQueue>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_notifier(mut self, notifier: Rc<dyn ConsentNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }
}

impl Default for ConsentEnvironment {
    fn default() -> Self {
        Self::new(Rc::new(MemoryStorage::new()))
    }
}
