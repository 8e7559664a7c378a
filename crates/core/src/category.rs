//! # Cookie Categories
//!
//! Category identifiers and the host-owned category definitions, including the
//! per-category accept/reject callbacks.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::hooks::Hook;

// ============================================================================
// Category Identifier
// ============================================================================

/// Identifier of a consent category.
///
/// The three well-known categories map onto consent-mode signals; any other id
/// is carried as `Custom` and only takes part in persistence and callbacks.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CategoryId {
    Necessary,
    Analytical,
    Advertising,
    Custom(String),
}

impl CategoryId {
    pub fn as_str(&self) -> &str {
        match self {
            CategoryId::Necessary => "necessary",
            CategoryId::Analytical => "analytical",
            CategoryId::Advertising => "advertising",
            CategoryId::Custom(id) => id,
        }
    }
}

impl From<&str> for CategoryId {
    fn from(id: &str) -> Self {
        match id {
            "necessary" => CategoryId::Necessary,
            "analytical" => CategoryId::Analytical,
            "advertising" => CategoryId::Advertising,
            other => CategoryId::Custom(other.to_string()),
        }
    }
}

impl From<String> for CategoryId {
    fn from(id: String) -> Self {
        CategoryId::from(id.as_str())
    }
}

impl From<CategoryId> for String {
    fn from(id: CategoryId) -> Self {
        id.as_str().to_string()
    }
}

impl FromStr for CategoryId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CategoryId::from(s))
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Category Definition
// ============================================================================

/// A class of cookies the visitor can consent to.
///
/// Owned by the host configuration and immutable once a widget is built.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieCategory {
    pub id: CategoryId,
    /// Display name shown in the preferences modal
    #[serde(default)]
    pub name: String,
    /// Description markup shown under the name
    #[serde(default)]
    pub description: String,
    /// Required categories are always granted and never rejected
    #[serde(default)]
    pub required: bool,
    /// Value used before the visitor has made any choice
    #[serde(default)]
    pub default_value: bool,
    #[serde(skip)]
    pub on_accept: Option<Hook>,
    #[serde(skip)]
    pub on_reject: Option<Hook>,
}

impl CookieCategory {
    pub fn new(id: impl Into<CategoryId>) -> Self {
        let id = id.into();
        Self {
            name: id.to_string(),
            id,
            description: String::new(),
            required: false,
            default_value: false,
            on_accept: None,
            on_reject: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: bool) -> Self {
        self.default_value = value;
        self
    }

    pub fn on_accept(mut self, hook: Hook) -> Self {
        self.on_accept = Some(hook);
        self
    }

    pub fn on_reject(mut self, hook: Hook) -> Self {
        self.on_reject = Some(hook);
        self
    }

    /// Coerce a requested value: required categories are always granted.
    pub fn coerce(&self, requested: bool) -> bool {
        self.required || requested
    }

    /// Value applied when the modal is closed before any choice was recorded.
    pub fn closure_default(&self) -> bool {
        self.required || self.default_value
    }

    /// Run the callback matching `accepted`. Required categories never run
    /// `on_reject`. Returns `false` if the callback failed.
    pub fn run_callback(&self, accepted: bool) -> bool {
        let accepted = self.coerce(accepted);
        let hook = if accepted { &self.on_accept } else { &self.on_reject };
        match hook {
            Some(hook) => {
                let kind = if accepted { "on_accept" } else { "on_reject" };
                hook.run(&format!("{} for {}", kind, self.id)).is_ok()
            }
            None => true,
        }
    }
}
