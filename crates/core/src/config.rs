//! # Banner Configuration
//!
//! Options passed once at construction and shallow-merged on re-init.
//! Data fields deserialize from the host's camelCase JSON; hooks are attached
//! in code because they cannot be serialized.

use serde::Deserialize;
use std::collections::HashSet;

use crate::category::CookieCategory;
use crate::error::{ConsentError, ConsentResult};
use crate::hooks::{ChoiceHook, Hook};
use crate::store::KeyLayout;

// ============================================================================
// Presentation Options
// ============================================================================

/// Where the banner is anchored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum BannerPosition {
    #[default]
    BottomLeft,
}

impl BannerPosition {
    pub fn class(&self) -> &'static str {
        match self {
            BannerPosition::BottomLeft => "bottomLeft",
        }
    }
}

impl From<String> for BannerPosition {
    fn from(value: String) -> Self {
        match value.as_str() {
            "bottomLeft" => BannerPosition::BottomLeft,
            other => {
                log::warn!("Invalid banner position: {}. Using default.", other);
                BannerPosition::default()
            }
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct PositionConfig {
    pub banner: BannerPosition,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BackgroundConfig {
    pub show_background: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieIconConfig {
    /// When false the resting state is `Hidden` instead of `IconVisible`
    pub show: bool,
    pub position: Option<String>,
    pub color_scheme: Option<String>,
}

impl Default for CookieIconConfig {
    fn default() -> Self {
        Self {
            show: true,
            position: None,
            color_scheme: None,
        }
    }
}

/// Consent cookie options.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CookieConfig {
    pub name: String,
    /// Lifetime of the client-side mirror cookie; `None` disables the mirror
    pub mirror_days: Option<u32>,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "cookie_consent".to_string(),
            mirror_days: None,
        }
    }
}

// ============================================================================
// Copy Strings
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerText {
    pub title: String,
    pub description: String,
    pub accept_all_button_text: String,
    pub accept_all_button_accessible_label: Option<String>,
    pub reject_non_essential_button_text: String,
    pub reject_non_essential_button_accessible_label: Option<String>,
    pub preferences_button_text: String,
    pub preferences_button_accessible_label: Option<String>,
}

impl Default for BannerText {
    fn default() -> Self {
        Self {
            title: "Your privacy matters to us.".to_string(),
            description: "<p>We use cookies to measure and improve our site, support our marketing and personalise content and ads.</p>".to_string(),
            accept_all_button_text: "Accept all".to_string(),
            accept_all_button_accessible_label: None,
            reject_non_essential_button_text: "Reject non-essential".to_string(),
            reject_non_essential_button_accessible_label: None,
            preferences_button_text: "Preferences".to_string(),
            preferences_button_accessible_label: Some("Manage preferences".to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreferencesText {
    pub title: String,
    pub description: String,
    pub save_preferences_button_text: String,
    pub credit_link_text: Option<String>,
    pub credit_link_accessible_label: Option<String>,
}

impl Default for PreferencesText {
    fn default() -> Self {
        Self {
            title: "Manage Consent Preferences".to_string(),
            description: "<p>We respect your right to privacy. You can choose not to allow some types of cookies. Your preferences apply across our website.</p>".to_string(),
            save_preferences_button_text: "Save preferences".to_string(),
            credit_link_text: None,
            credit_link_accessible_label: None,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub banner: BannerText,
    pub preferences: PreferencesText,
}

// ============================================================================
// Hooks
// ============================================================================

/// Optional lifecycle callbacks. `None` means no callback.
#[derive(Clone, Debug, Default)]
pub struct LifecycleHooks {
    pub on_banner_open: Option<Hook>,
    pub on_banner_close: Option<Hook>,
    pub on_backdrop_open: Option<Hook>,
    pub on_backdrop_close: Option<Hook>,
    pub on_preferences_open: Option<Hook>,
    pub on_preferences_close: Option<Hook>,
    pub on_click_accept: Option<Hook>,
    pub on_click_reject: Option<Hook>,
    pub on_click_preferences: Option<Hook>,
    pub on_accept_all: Option<Hook>,
    pub on_reject_all: Option<Hook>,
    /// Completion signal after a finalized choice that grants optional categories
    pub on_consent_given: Option<Hook>,
    /// Completion signal after a finalized choice that grants nothing optional
    pub on_consent_rejected: Option<Hook>,
    /// Replaces the default persist/tag-manager/event/notify steps
    pub save_consent_choices: Option<ChoiceHook>,
    /// Replaces the default per-category callback step
    pub apply_consent_choices: Option<ChoiceHook>,
}

// ============================================================================
// Banner Config
// ============================================================================

/// Complete widget configuration.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BannerConfig {
    pub cookie_types: Vec<CookieCategory>,
    pub banner_suffix: Option<String>,
    pub show_banner: bool,
    pub position: PositionConfig,
    pub background: BackgroundConfig,
    pub cookie_icon: CookieIconConfig,
    pub text: TextConfig,
    pub consent_endpoint: Option<String>,
    pub storage: KeyLayout,
    pub cookie: CookieConfig,
    #[serde(skip)]
    pub hooks: LifecycleHooks,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            cookie_types: Vec::new(),
            banner_suffix: None,
            show_banner: true,
            position: PositionConfig::default(),
            background: BackgroundConfig::default(),
            cookie_icon: CookieIconConfig::default(),
            text: TextConfig::default(),
            consent_endpoint: None,
            storage: KeyLayout::default(),
            cookie: CookieConfig::default(),
            hooks: LifecycleHooks::default(),
        }
    }
}

impl BannerConfig {
    pub fn new(cookie_types: Vec<CookieCategory>) -> Self {
        Self {
            cookie_types,
            ..Default::default()
        }
    }

    /// Parse the data portion of a configuration from JSON.
    pub fn from_json(json: &str) -> ConsentResult<Self> {
        let config: BannerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject empty or duplicate category ids.
    pub fn validate(&self) -> ConsentResult<()> {
        let mut seen = HashSet::new();
        for category in &self.cookie_types {
            if category.id.as_str().is_empty() {
                return Err(ConsentError::InvalidConfig("category id is empty".to_string()));
            }
            if !seen.insert(category.id.clone()) {
                return Err(ConsentError::InvalidConfig(format!(
                    "duplicate category id: {}",
                    category.id
                )));
            }
        }
        Ok(())
    }

    pub fn category(&self, id: &crate::category::CategoryId) -> Option<&CookieCategory> {
        self.cookie_types.iter().find(|c| &c.id == id)
    }

    /// Shallow merge: every field present in `update` replaces the current one.
    pub fn merge(&mut self, update: ConfigUpdate) {
        if let Some(cookie_types) = update.cookie_types {
            self.cookie_types = cookie_types;
        }
        if let Some(banner_suffix) = update.banner_suffix {
            self.banner_suffix = Some(banner_suffix);
        }
        if let Some(show_banner) = update.show_banner {
            self.show_banner = show_banner;
        }
        if let Some(position) = update.position {
            self.position = position;
        }
        if let Some(background) = update.background {
            self.background = background;
        }
        if let Some(cookie_icon) = update.cookie_icon {
            self.cookie_icon = cookie_icon;
        }
        if let Some(text) = update.text {
            self.text = text;
        }
        if let Some(endpoint) = update.consent_endpoint {
            self.consent_endpoint = Some(endpoint);
        }
        if let Some(storage) = update.storage {
            self.storage = storage;
        }
        if let Some(cookie) = update.cookie {
            self.cookie = cookie;
        }
        if let Some(hooks) = update.hooks {
            self.hooks = hooks;
        }
    }
}

/// Partial configuration applied by [`BannerConfig::merge`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    pub cookie_types: Option<Vec<CookieCategory>>,
    pub banner_suffix: Option<String>,
    pub show_banner: Option<bool>,
    pub position: Option<PositionConfig>,
    pub background: Option<BackgroundConfig>,
    pub cookie_icon: Option<CookieIconConfig>,
    pub text: Option<TextConfig>,
    pub consent_endpoint: Option<String>,
    pub storage: Option<KeyLayout>,
    pub cookie: Option<CookieConfig>,
    #[serde(skip)]
    pub hooks: Option<LifecycleHooks>,
}

impl ConfigUpdate {
    pub fn from_json(json: &str) -> ConsentResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl From<BannerConfig> for ConfigUpdate {
    fn from(config: BannerConfig) -> Self {
        Self {
            cookie_types: Some(config.cookie_types),
            banner_suffix: config.banner_suffix,
            show_banner: Some(config.show_banner),
            position: Some(config.position),
            background: Some(config.background),
            cookie_icon: Some(config.cookie_icon),
            text: Some(config.text),
            consent_endpoint: config.consent_endpoint,
            storage: Some(config.storage),
            cookie: Some(config.cookie),
            hooks: Some(config.hooks),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::CategoryId;

    const HOST_CONFIG: &str = r#"{
        "cookieTypes": [
            {"id": "necessary", "name": "Necessary", "required": true},
            {"id": "analytical", "name": "Analytical"},
            {"id": "advertising", "name": "Advertising"}
        ],
        "bannerSuffix": "id",
        "text": {
            "banner": {"acceptAllButtonText": "Terima", "rejectNonEssentialButtonText": "Tolak"},
            "preferences": {"title": "Cookie Preferences"}
        },
        "position": {"banner": "bottomLeft"},
        "background": {"showBackground": true}
    }"#;

    #[test]
    fn test_parse_host_config() {
        let config = BannerConfig::from_json(HOST_CONFIG).unwrap();
        assert_eq!(config.cookie_types.len(), 3);
        assert!(config.cookie_types[0].required);
        assert_eq!(config.banner_suffix.as_deref(), Some("id"));
        assert!(config.show_banner);
        assert!(config.background.show_background);
        assert_eq!(config.text.banner.accept_all_button_text, "Terima");
        // unspecified copy keeps defaults
        assert_eq!(config.text.preferences.save_preferences_button_text, "Save preferences");
        assert_eq!(config.cookie.name, "cookie_consent");
    }

    #[test]
    fn test_unknown_position_falls_back() {
        let config = BannerConfig::from_json(r#"{"position": {"banner": "topRight"}}"#).unwrap();
        assert_eq!(config.position.banner, BannerPosition::BottomLeft);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let json = r#"{"cookieTypes": [{"id": "analytical"}, {"id": "analytical"}]}"#;
        assert!(matches!(
            BannerConfig::from_json(json),
            Err(ConsentError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut config = BannerConfig::from_json(HOST_CONFIG).unwrap();
        let update = ConfigUpdate::from_json(r#"{"showBanner": false, "bannerSuffix": "en"}"#).unwrap();
        config.merge(update);

        assert!(!config.show_banner);
        assert_eq!(config.banner_suffix.as_deref(), Some("en"));
        assert_eq!(config.cookie_types.len(), 3);
        assert!(config.category(&CategoryId::Advertising).is_some());
        assert_eq!(config.text.banner.accept_all_button_text, "Terima");
    }
}
