//! # Consent Choice
//!
//! The finalized mapping of category to granted/denied, and the payloads
//! derived from it for analytics and the remote endpoint.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::category::{CategoryId, CookieCategory};

/// Finalized consent decision: one boolean per category.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConsentChoice(BTreeMap<CategoryId, bool>);

impl ConsentChoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every category set to `accepted`, with required categories forced on.
    pub fn uniform(categories: &[CookieCategory], accepted: bool) -> Self {
        categories
            .iter()
            .map(|c| (c.id.clone(), c.coerce(accepted)))
            .collect()
    }

    /// The "closed with no choice" decision: required or default-on categories.
    pub fn closure_defaults(categories: &[CookieCategory]) -> Self {
        categories
            .iter()
            .map(|c| (c.id.clone(), c.closure_default()))
            .collect()
    }

    pub fn with(mut self, id: impl Into<CategoryId>, granted: bool) -> Self {
        self.0.insert(id.into(), granted);
        self
    }

    pub fn insert(&mut self, id: CategoryId, granted: bool) {
        self.0.insert(id, granted);
    }

    pub fn get(&self, id: &CategoryId) -> Option<bool> {
        self.0.get(id).copied()
    }

    /// Absent categories count as denied.
    pub fn is_granted(&self, id: &CategoryId) -> bool {
        self.get(id).unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CategoryId, bool)> {
        self.0.iter().map(|(id, granted)| (id, *granted))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if any category that is not required was granted.
    pub fn grants_optional(&self, categories: &[CookieCategory]) -> bool {
        categories
            .iter()
            .filter(|c| !c.required)
            .any(|c| self.is_granted(&c.id))
    }

    pub fn payload(&self) -> ConsentPayload {
        ConsentPayload {
            necessary: self.is_granted(&CategoryId::Necessary),
            analytical: self.is_granted(&CategoryId::Analytical),
            advertising: self.is_granted(&CategoryId::Advertising),
        }
    }
}

impl FromIterator<(CategoryId, bool)> for ConsentChoice {
    fn from_iter<I: IntoIterator<Item = (CategoryId, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Body sent to the consent endpoint and written to the consent cookie.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentPayload {
    pub necessary: bool,
    pub analytical: bool,
    pub advertising: bool,
}

impl From<ConsentPayload> for ConsentChoice {
    fn from(payload: ConsentPayload) -> Self {
        ConsentChoice::new()
            .with(CategoryId::Necessary, payload.necessary)
            .with(CategoryId::Analytical, payload.analytical)
            .with(CategoryId::Advertising, payload.advertising)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<CookieCategory> {
        vec![
            CookieCategory::new("necessary").required(),
            CookieCategory::new("analytical").default_value(true),
            CookieCategory::new("advertising"),
        ]
    }

    #[test]
    fn test_uniform_reject_keeps_required() {
        let choice = ConsentChoice::uniform(&categories(), false);
        assert_eq!(choice.get(&CategoryId::Necessary), Some(true));
        assert_eq!(choice.get(&CategoryId::Analytical), Some(false));
        assert_eq!(choice.get(&CategoryId::Advertising), Some(false));
        assert!(!choice.grants_optional(&categories()));
    }

    #[test]
    fn test_closure_defaults() {
        let choice = ConsentChoice::closure_defaults(&categories());
        assert_eq!(
            choice.payload(),
            ConsentPayload { necessary: true, analytical: true, advertising: false }
        );
    }

    #[test]
    fn test_serializes_as_map() {
        let choice = ConsentChoice::new()
            .with("necessary", true)
            .with("functional", false);
        let json = serde_json::to_string(&choice).unwrap();
        assert_eq!(json, r#"{"necessary":true,"functional":false}"#);
    }
}
