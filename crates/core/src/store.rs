//! # Consent Store
//!
//! Key-value persistence of per-category choices, namespaced by an optional
//! banner suffix so several widget instances can coexist.
//!
//! ## Layout
//!
//! - `{choice_prefix}_{category}{suffix}` → `"true"` / `"false"`
//! - `{sentinel_prefix}_IC{suffix}` → `"1"` once an initial choice was made
//!
//! where `suffix` is `"_" + banner_suffix` or empty.
//!
//! Writes are not transactional across keys. A partially written record is
//! harmless: unset categories fall back to their `default_value` on read.

use serde::Deserialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::category::{CategoryId, CookieCategory};
use crate::choice::ConsentChoice;
use crate::error::{ConsentError, ConsentResult};

// ============================================================================
// Storage Backend Trait
// ============================================================================

/// Pluggable string key-value storage (browser `localStorage` in production).
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> ConsentResult<Option<String>>;

    fn set_item(&self, key: &str, value: &str) -> ConsentResult<()>;
}

/// In-memory backend for testing/development. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored key, for assertions.
    pub fn entries(&self) -> HashMap<String, String> {
        self.data.borrow().clone()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> ConsentResult<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> ConsentResult<()> {
        self.data.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Key Layout
// ============================================================================

/// Prefixes used to build storage keys.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyLayout {
    pub choice_prefix: String,
    pub sentinel_prefix: String,
}

impl Default for KeyLayout {
    fn default() -> Self {
        Self {
            choice_prefix: "mcc".to_string(),
            sentinel_prefix: "MCB".to_string(),
        }
    }
}

// ============================================================================
// Consent Store
// ============================================================================

/// Typed view over a [`StorageBackend`] for one widget instance.
#[derive(Clone)]
pub struct ConsentStore {
    backend: Rc<dyn StorageBackend>,
    layout: KeyLayout,
    suffix: String,
}

impl ConsentStore {
    pub fn new(backend: Rc<dyn StorageBackend>, layout: KeyLayout, banner_suffix: Option<&str>) -> Self {
        let suffix = match banner_suffix {
            Some(s) if !s.is_empty() => format!("_{}", s),
            _ => String::new(),
        };
        Self { backend, layout, suffix }
    }

    /// `"_" + banner_suffix`, or empty.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn key_for(&self, id: &CategoryId) -> String {
        format!("{}_{}{}", self.layout.choice_prefix, id, self.suffix)
    }

    pub fn sentinel_key(&self) -> String {
        format!("{}_IC{}", self.layout.sentinel_prefix, self.suffix)
    }

    /// Stored value, or `None` if absent, unreadable or malformed.
    pub fn get(&self, id: &CategoryId) -> Option<bool> {
        match self.try_get(id) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Treating {} as unset: {}", id, err);
                None
            }
        }
    }

    pub fn try_get(&self, id: &CategoryId) -> ConsentResult<Option<bool>> {
        let key = self.key_for(id);
        match self.backend.get_item(&key)? {
            None => Ok(None),
            Some(value) => match value.as_str() {
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                _ => Err(ConsentError::MalformedValue { key, value }),
            },
        }
    }

    pub fn set(&self, id: &CategoryId, granted: bool) -> ConsentResult<()> {
        self.backend.set_item(&self.key_for(id), &granted.to_string())
    }

    pub fn has_initial_choice(&self) -> bool {
        match self.backend.get_item(&self.sentinel_key()) {
            Ok(value) => value.is_some_and(|v| !v.is_empty()),
            Err(err) => {
                log::warn!("Could not read initial choice sentinel: {}", err);
                false
            }
        }
    }

    pub fn mark_initial_choice_made(&self) -> ConsentResult<()> {
        self.backend.set_item(&self.sentinel_key(), "1")
    }

    /// Persist every entry of `choice`. Stops at the first backend failure.
    pub fn save(&self, choice: &ConsentChoice) -> ConsentResult<()> {
        for (id, granted) in choice.iter() {
            self.set(id, granted)?;
        }
        Ok(())
    }

    /// Stored choice for `categories`; unset categories take their default and
    /// required categories read as granted.
    pub fn load(&self, categories: &[CookieCategory]) -> ConsentChoice {
        categories
            .iter()
            .map(|c| {
                let value = c.coerce(self.get(&c.id).unwrap_or(c.default_value));
                (c.id.clone(), value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(suffix: Option<&str>) -> (MemoryStorage, ConsentStore) {
        let memory = MemoryStorage::new();
        let store = ConsentStore::new(Rc::new(memory.clone()), KeyLayout::default(), suffix);
        (memory, store)
    }

    #[test]
    fn test_key_layout() {
        let (_, plain) = store(None);
        assert_eq!(plain.key_for(&CategoryId::Analytical), "mcc_analytical");
        assert_eq!(plain.sentinel_key(), "MCB_IC");

        let (_, suffixed) = store(Some("en"));
        assert_eq!(suffixed.key_for(&CategoryId::Advertising), "mcc_advertising_en");
        assert_eq!(suffixed.sentinel_key(), "MCB_IC_en");
    }

    #[test]
    fn test_suffixes_do_not_collide() {
        let memory = MemoryStorage::new();
        let en = ConsentStore::new(Rc::new(memory.clone()), KeyLayout::default(), Some("en"));
        let id = ConsentStore::new(Rc::new(memory.clone()), KeyLayout::default(), Some("id"));

        en.set(&CategoryId::Analytical, true).unwrap();
        en.mark_initial_choice_made().unwrap();

        assert_eq!(en.get(&CategoryId::Analytical), Some(true));
        assert_eq!(id.get(&CategoryId::Analytical), None);
        assert!(en.has_initial_choice());
        assert!(!id.has_initial_choice());
    }

    #[test]
    fn test_values_stringified() {
        let (memory, store) = store(None);
        store.set(&CategoryId::Advertising, false).unwrap();
        store.mark_initial_choice_made().unwrap();
        let entries = memory.entries();
        assert_eq!(entries["mcc_advertising"], "false");
        assert_eq!(entries["MCB_IC"], "1");
    }

    #[test]
    fn test_malformed_value_is_absent() {
        let (memory, store) = store(None);
        memory.set_item("mcc_analytical", "yes").unwrap();
        assert!(store.try_get(&CategoryId::Analytical).is_err());
        assert_eq!(store.get(&CategoryId::Analytical), None);
    }

    #[test]
    fn test_load_uses_defaults_for_unset() {
        let (_, store) = store(None);
        let categories = vec![
            CookieCategory::new("necessary").required(),
            CookieCategory::new("analytical").default_value(true),
            CookieCategory::new("advertising"),
        ];
        store.set(&CategoryId::Advertising, true).unwrap();

        let choice = store.load(&categories);
        assert_eq!(choice.get(&CategoryId::Necessary), Some(true));
        assert_eq!(choice.get(&CategoryId::Analytical), Some(true));
        assert_eq!(choice.get(&CategoryId::Advertising), Some(true));
    }
}
