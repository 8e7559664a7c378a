//! # Consent State Machine
//!
//! Decides which of banner, preferences modal and floating icon is visible,
//! and turns user events into finalized consent choices.
//!
//! ```text
//!   BannerVisible ──accept/reject──────────────► IconVisible (or Hidden)
//!        │                                           │  ▲
//!   preferences                                  icon │  │ accept/reject/save/close
//!        ▼                                           ▼  │
//!   ModalVisible ◄────────────────────────────── ModalVisible
//! ```
//!
//! Rendering is delegated to a [`WidgetView`]; the machine only tells it what
//! to show.

use crate::broadcaster::{BroadcastReport, Broadcaster};
use crate::category::CategoryId;
use crate::choice::ConsentChoice;
use crate::config::BannerConfig;
use crate::env::ConsentEnvironment;
use crate::error::{ConsentError, ConsentResult};
use crate::hooks::fire;
use crate::store::ConsentStore;

// ============================================================================
// States and Events
// ============================================================================

/// Visible surface of the widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetState {
    Hidden,
    BannerVisible,
    ModalVisible,
    IconVisible,
}

/// User (or host) input to the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConsentEvent {
    AcceptAll,
    RejectAll,
    OpenPreferences,
    Toggle { id: CategoryId, checked: bool },
    SavePreferences,
    ClosePreferences,
    ClickIcon,
}

/// One checkbox row of the preferences modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckboxState {
    pub id: CategoryId,
    pub checked: bool,
    /// Required categories cannot be toggled
    pub disabled: bool,
}

// ============================================================================
// Rendering Collaborator
// ============================================================================

/// DOM side of the widget. Implementations own the subtree they create and
/// must remove it, including listeners, in `teardown`.
pub trait WidgetView {
    fn mount(&mut self, _config: &BannerConfig) {}

    fn show_banner(&mut self);

    fn remove_banner(&mut self);

    fn show_modal(&mut self, checkboxes: &[CheckboxState]);

    fn hide_modal(&mut self);

    fn show_icon(&mut self);

    fn hide_icon(&mut self);

    fn show_backdrop(&mut self);

    fn hide_backdrop(&mut self);

    fn teardown(&mut self);
}

/// View that renders nothing, for headless hosts.
#[derive(Debug, Default)]
pub struct NullView;

impl WidgetView for NullView {
    fn show_banner(&mut self) {}
    fn remove_banner(&mut self) {}
    fn show_modal(&mut self, _checkboxes: &[CheckboxState]) {}
    fn hide_modal(&mut self) {}
    fn show_icon(&mut self) {}
    fn hide_icon(&mut self) {}
    fn show_backdrop(&mut self) {}
    fn hide_backdrop(&mut self) {}
    fn teardown(&mut self) {}
}

// ============================================================================
// Widget
// ============================================================================

/// One consent widget instance. Owns its view; create with [`ConsentWidget::new`]
/// and dispose with [`ConsentWidget::destroy`].
pub struct ConsentWidget<V: WidgetView> {
    config: BannerConfig,
    env: ConsentEnvironment,
    store: ConsentStore,
    view: V,
    state: WidgetState,
    banner_present: bool,
    backdrop_visible: bool,
    checkboxes: Vec<CheckboxState>,
}

impl<V: WidgetView> ConsentWidget<V> {
    pub fn new(config: BannerConfig, env: ConsentEnvironment, mut view: V) -> ConsentResult<Self> {
        config.validate()?;
        let store = ConsentStore::new(
            env.storage.clone(),
            config.storage.clone(),
            config.banner_suffix.as_deref(),
        );
        view.mount(&config);

        let mut widget = Self {
            config,
            env,
            store,
            view,
            state: WidgetState::Hidden,
            banner_present: false,
            backdrop_visible: false,
            checkboxes: Vec::new(),
        };
        widget.checkboxes = widget.read_checkboxes();

        let has_initial_choice = widget.store.has_initial_choice();
        if !has_initial_choice && widget.config.show_banner {
            widget.view.show_banner();
            widget.banner_present = true;
            widget.state = WidgetState::BannerVisible;
            fire(&widget.config.hooks.on_banner_open, "on_banner_open");
            widget.show_backdrop();
        } else {
            widget.rest();
        }

        if has_initial_choice {
            let stored = widget.store.load(&widget.config.cookie_types);
            widget.broadcaster().apply(&stored);
        }

        log::debug!("Consent widget initialized in {:?}", widget.state);
        Ok(widget)
    }

    pub fn state(&self) -> WidgetState {
        self.state
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    pub fn store(&self) -> &ConsentStore {
        &self.store
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Current checkbox rows (what the modal shows when open).
    pub fn checkboxes(&self) -> &[CheckboxState] {
        &self.checkboxes
    }

    pub fn backdrop_visible(&self) -> bool {
        self.backdrop_visible
    }

    /// Dispatch one event. Events that make no sense in the current state are
    /// rejected with `InvalidTransition` and change nothing.
    pub fn handle(&mut self, event: ConsentEvent) -> ConsentResult<WidgetState> {
        use ConsentEvent::*;
        use WidgetState::*;

        match (self.state, event) {
            (BannerVisible | ModalVisible, AcceptAll) => self.choose(true),
            (BannerVisible | ModalVisible, RejectAll) => self.choose(false),
            (BannerVisible | IconVisible | Hidden, OpenPreferences) => {
                self.open_preferences();
                fire(&self.config.hooks.on_click_preferences, "on_click_preferences");
            }
            (IconVisible, ClickIcon) => self.open_preferences(),
            (ModalVisible, Toggle { id, checked }) => self.toggle(&id, checked)?,
            (ModalVisible, SavePreferences) => self.save_preferences(),
            (ModalVisible, ClosePreferences) => self.close_preferences(),
            (state, event) => {
                log::debug!("Ignoring {:?} while {:?}", event, state);
                return Err(ConsentError::InvalidTransition { state, event });
            }
        }
        Ok(self.state)
    }

    /// Tear down the view and hand it back for reuse.
    pub fn destroy(mut self) -> V {
        self.view.teardown();
        log::debug!("Consent widget destroyed");
        self.view
    }

    // ------------------------------------------------------------------------
    // Transitions
    // ------------------------------------------------------------------------

    fn choose(&mut self, accepted: bool) {
        self.mark_initial_choice();
        self.close_surfaces();

        let choice = ConsentChoice::uniform(&self.config.cookie_types, accepted);
        self.broadcast(&choice);

        let hooks = &self.config.hooks;
        if accepted {
            fire(&hooks.on_accept_all, "on_accept_all");
            fire(&hooks.on_consent_given, "on_consent_given");
            fire(&hooks.on_click_accept, "on_click_accept");
        } else {
            fire(&hooks.on_reject_all, "on_reject_all");
            fire(&hooks.on_consent_rejected, "on_consent_rejected");
            fire(&hooks.on_click_reject, "on_click_reject");
        }
        self.checkboxes = self.read_checkboxes();
        log::debug!("Cookie choice saved: accepted={}", accepted);
    }

    fn open_preferences(&mut self) {
        self.remove_banner();
        if self.state == WidgetState::IconVisible {
            self.view.hide_icon();
        }
        self.show_backdrop();
        self.checkboxes = self.read_checkboxes();
        self.view.show_modal(&self.checkboxes);
        self.state = WidgetState::ModalVisible;
        fire(&self.config.hooks.on_preferences_open, "on_preferences_open");
    }

    fn toggle(&mut self, id: &CategoryId, checked: bool) -> ConsentResult<()> {
        let category = self
            .config
            .category(id)
            .ok_or_else(|| ConsentError::UnknownCategory(id.to_string()))?
            .clone();
        if category.required {
            return Ok(());
        }

        if let Some(row) = self.checkboxes.iter_mut().find(|row| &row.id == id) {
            row.checked = checked;
        }

        let previous = self.store.get(id) == Some(true);
        if checked != previous {
            if let Err(err) = self.store.set(id, checked) {
                log::warn!("Could not persist toggle of {}: {}", id, err);
            }
            category.run_callback(checked);
        }
        Ok(())
    }

    fn save_preferences(&mut self) {
        let choice: ConsentChoice = self
            .config
            .cookie_types
            .iter()
            .map(|c| {
                let checked = self
                    .checkboxes
                    .iter()
                    .find(|row| row.id == c.id)
                    .map(|row| row.checked)
                    .unwrap_or(c.default_value);
                (c.id.clone(), c.coerce(checked))
            })
            .collect();

        self.mark_initial_choice();
        self.close_surfaces();
        self.broadcast(&choice);
        self.signal_completion(&choice);
        self.checkboxes = self.read_checkboxes();
        log::debug!("Preferences saved from modal: {:?}", choice);
    }

    fn close_preferences(&mut self) {
        let had_initial_choice = self.store.has_initial_choice();
        self.close_surfaces();

        if had_initial_choice {
            let stored = self.store.load(&self.config.cookie_types);
            self.broadcaster().apply(&stored);
        } else {
            // Unsaved in-modal edits are discarded in favour of the defaults.
            let choice = ConsentChoice::closure_defaults(&self.config.cookie_types);
            self.mark_initial_choice();
            self.broadcast(&choice);
            self.signal_completion(&choice);
            log::debug!("Default choice saved on close: {:?}", choice);
        }
        self.checkboxes = self.read_checkboxes();
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn broadcaster(&self) -> Broadcaster<'_> {
        Broadcaster::new(&self.env, &self.store, &self.config)
    }

    fn broadcast(&self, choice: &ConsentChoice) -> BroadcastReport {
        self.broadcaster().broadcast(choice)
    }

    fn signal_completion(&self, choice: &ConsentChoice) {
        let hooks = &self.config.hooks;
        if choice.grants_optional(&self.config.cookie_types) {
            fire(&hooks.on_consent_given, "on_consent_given");
        } else {
            fire(&hooks.on_consent_rejected, "on_consent_rejected");
        }
    }

    fn mark_initial_choice(&self) {
        if let Err(err) = self.store.mark_initial_choice_made() {
            log::warn!("Could not record initial choice: {}", err);
        }
    }

    /// Required rows are checked and disabled; others show the stored value,
    /// falling back to the category default.
    fn read_checkboxes(&self) -> Vec<CheckboxState> {
        self.config
            .cookie_types
            .iter()
            .map(|c| CheckboxState {
                id: c.id.clone(),
                checked: c.required || self.store.get(&c.id).unwrap_or(c.default_value),
                disabled: c.required,
            })
            .collect()
    }

    /// Remove banner and modal, hide the backdrop and settle in the resting state.
    fn close_surfaces(&mut self) {
        self.remove_banner();
        self.hide_backdrop();
        if self.state == WidgetState::ModalVisible {
            self.view.hide_modal();
            fire(&self.config.hooks.on_preferences_close, "on_preferences_close");
        }
        self.rest();
    }

    fn rest(&mut self) {
        if self.config.cookie_icon.show {
            self.view.show_icon();
            self.state = WidgetState::IconVisible;
        } else {
            self.state = WidgetState::Hidden;
        }
    }

    fn remove_banner(&mut self) {
        if self.banner_present {
            self.view.remove_banner();
            self.banner_present = false;
            fire(&self.config.hooks.on_banner_close, "on_banner_close");
        }
    }

    fn show_backdrop(&mut self) {
        if self.config.background.show_background && !self.backdrop_visible {
            self.view.show_backdrop();
            self.backdrop_visible = true;
            fire(&self.config.hooks.on_backdrop_open, "on_backdrop_open");
        }
    }

    fn hide_backdrop(&mut self) {
        if self.backdrop_visible {
            self.view.hide_backdrop();
            self.backdrop_visible = false;
            fire(&self.config.hooks.on_backdrop_close, "on_backdrop_close");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{ConsentSignal, MemoryEventQueue, MemoryNotifier, MemoryTagManager};
    use crate::category::CookieCategory;
    use crate::hooks::Hook;
    use crate::store::MemoryStorage;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records view calls so tests can assert on what was rendered.
    #[derive(Default)]
    struct RecordingView {
        log: Vec<String>,
        banner: bool,
        modal: Option<Vec<CheckboxState>>,
        icon: bool,
        backdrop: bool,
    }

    impl WidgetView for RecordingView {
        fn mount(&mut self, _config: &BannerConfig) {
            self.log.push("mount".into());
        }
        fn show_banner(&mut self) {
            self.banner = true;
        }
        fn remove_banner(&mut self) {
            self.banner = false;
        }
        fn show_modal(&mut self, checkboxes: &[CheckboxState]) {
            self.modal = Some(checkboxes.to_vec());
        }
        fn hide_modal(&mut self) {
            self.modal = None;
        }
        fn show_icon(&mut self) {
            self.icon = true;
        }
        fn hide_icon(&mut self) {
            self.icon = false;
        }
        fn show_backdrop(&mut self) {
            self.backdrop = true;
        }
        fn hide_backdrop(&mut self) {
            self.backdrop = false;
        }
        fn teardown(&mut self) {
            self.log.push("teardown".into());
            self.banner = false;
            self.modal = None;
            self.icon = false;
            self.backdrop = false;
        }
    }

    struct Fixture {
        env: ConsentEnvironment,
        storage: MemoryStorage,
        tags: MemoryTagManager,
        events: MemoryEventQueue,
        notifier: MemoryNotifier,
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Fixture {
        fn new() -> Self {
            let storage = MemoryStorage::new();
            let tags = MemoryTagManager::new();
            let events = MemoryEventQueue::new();
            let notifier = MemoryNotifier::new();
            let env = ConsentEnvironment::new(Rc::new(storage.clone()))
                .with_tag_manager(Rc::new(tags.clone()))
                .with_events(Rc::new(events.clone()))
                .with_notifier(Rc::new(notifier.clone()));
            Self { env, storage, tags, events, notifier, calls: Rc::default() }
        }

        fn recorder(&self, label: &str) -> Hook {
            let calls = self.calls.clone();
            let label = label.to_string();
            Hook::infallible(move || calls.borrow_mut().push(label.clone()))
        }

        fn config(&self) -> BannerConfig {
            let mut config = BannerConfig::new(vec![
                CookieCategory::new("necessary")
                    .required()
                    .on_accept(self.recorder("necessary+"))
                    .on_reject(self.recorder("necessary-")),
                CookieCategory::new("analytical")
                    .on_accept(self.recorder("analytical+"))
                    .on_reject(self.recorder("analytical-")),
                CookieCategory::new("advertising")
                    .on_accept(self.recorder("advertising+"))
                    .on_reject(self.recorder("advertising-")),
            ]);
            config.background.show_background = true;
            config.hooks.on_consent_given = Some(self.recorder("given"));
            config.hooks.on_consent_rejected = Some(self.recorder("rejected"));
            config.hooks.on_banner_close = Some(self.recorder("banner_close"));
            config
        }

        fn widget(&self, config: BannerConfig) -> ConsentWidget<RecordingView> {
            ConsentWidget::new(config, self.env.clone(), RecordingView::default()).unwrap()
        }

        fn persist(&self, entries: &[(&str, &str)]) {
            use crate::store::StorageBackend;
            for (key, value) in entries {
                self.storage.set_item(key, value).unwrap();
            }
        }

        fn count(&self, label: &str) -> usize {
            self.calls.borrow().iter().filter(|c| *c == label).count()
        }
    }

    fn row(widget: &ConsentWidget<RecordingView>, id: CategoryId) -> CheckboxState {
        widget.checkboxes().iter().find(|r| r.id == id).cloned().unwrap()
    }

    #[test]
    fn test_fresh_visitor_sees_banner() {
        let f = Fixture::new();
        let widget = f.widget(f.config());
        assert_eq!(widget.state(), WidgetState::BannerVisible);
        assert!(widget.view().banner);
        assert!(widget.view().backdrop);
        assert!(!widget.view().icon);
    }

    #[test]
    fn test_show_banner_false_rests_on_icon() {
        let f = Fixture::new();
        let mut config = f.config();
        config.show_banner = false;
        let widget = f.widget(config);
        assert_eq!(widget.state(), WidgetState::IconVisible);
        assert!(!widget.view().banner);
    }

    #[test]
    fn test_accept_all_scenario() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());

        let state = widget.handle(ConsentEvent::AcceptAll).unwrap();
        assert_eq!(state, WidgetState::IconVisible);

        let entries = f.storage.entries();
        assert_eq!(entries["mcc_necessary"], "true");
        assert_eq!(entries["mcc_analytical"], "true");
        assert_eq!(entries["mcc_advertising"], "true");
        assert_eq!(entries["MCB_IC"], "1");

        let view = widget.view();
        assert!(view.icon);
        assert!(!view.banner);
        assert!(!view.backdrop);

        let update = f.tags.last_update().unwrap();
        assert_eq!(update.analytics_storage, Some(ConsentSignal::Granted));
        assert_eq!(update.ad_storage, Some(ConsentSignal::Granted));
        assert_eq!(update.ad_user_data, Some(ConsentSignal::Granted));
        assert_eq!(update.ad_personalization, Some(ConsentSignal::Granted));

        let events = f.events.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "consent_updated");
        assert!(events[0].consent_necessary && events[0].consent_analytical && events[0].consent_advertising);

        assert_eq!(f.notifier.sent().len(), 1);
        assert_eq!(f.count("given"), 1);
        assert_eq!(f.count("banner_close"), 1);
    }

    #[test]
    fn test_reject_all_keeps_required() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::RejectAll).unwrap();

        let entries = f.storage.entries();
        assert_eq!(entries["mcc_necessary"], "true");
        assert_eq!(entries["mcc_analytical"], "false");
        assert_eq!(entries["mcc_advertising"], "false");
        assert_eq!(f.count("necessary-"), 0);
        assert_eq!(f.count("necessary+"), 1);
        assert_eq!(f.count("analytical-"), 1);
        assert_eq!(f.count("rejected"), 1);

        let update = f.tags.last_update().unwrap();
        assert_eq!(update.analytics_storage, Some(ConsentSignal::Denied));
    }

    #[test]
    fn test_returning_visitor_modal_reflects_store() {
        let f = Fixture::new();
        f.persist(&[
            ("mcc_necessary", "true"),
            ("mcc_analytical", "false"),
            ("mcc_advertising", "true"),
            ("MCB_IC", "1"),
        ]);
        let mut widget = f.widget(f.config());
        assert_eq!(widget.state(), WidgetState::IconVisible);
        assert!(!widget.view().banner);
        // stored choice re-applied on load without re-persisting
        assert_eq!(f.count("analytical-"), 1);
        assert_eq!(f.count("advertising+"), 1);
        assert!(f.tags.calls().is_empty());

        widget.handle(ConsentEvent::ClickIcon).unwrap();
        assert_eq!(widget.state(), WidgetState::ModalVisible);
        let shown = widget.view().modal.clone().unwrap();
        assert_eq!(
            shown,
            vec![
                CheckboxState { id: CategoryId::Necessary, checked: true, disabled: true },
                CheckboxState { id: CategoryId::Analytical, checked: false, disabled: false },
                CheckboxState { id: CategoryId::Advertising, checked: true, disabled: false },
            ]
        );
        assert!(!widget.view().icon);
    }

    #[test]
    fn test_modal_defaults_before_first_choice() {
        let f = Fixture::new();
        let mut config = f.config();
        config.cookie_types[1].default_value = true;
        let mut widget = f.widget(config);
        widget.handle(ConsentEvent::OpenPreferences).unwrap();

        assert!(row(&widget, CategoryId::Analytical).checked);
        assert!(!row(&widget, CategoryId::Advertising).checked);
        assert!(!widget.view().banner);
    }

    #[test]
    fn test_save_preferences_round_trip() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Advertising, checked: true })
            .unwrap();
        widget.handle(ConsentEvent::SavePreferences).unwrap();
        assert_eq!(widget.state(), WidgetState::IconVisible);

        let saved: Vec<_> = widget.checkboxes().to_vec();
        widget.handle(ConsentEvent::ClickIcon).unwrap();
        assert_eq!(widget.view().modal.clone().unwrap(), saved);
        assert!(row(&widget, CategoryId::Advertising).checked);
        assert!(!row(&widget, CategoryId::Analytical).checked);
        assert_eq!(f.count("given"), 1);
    }

    #[test]
    fn test_toggle_persists_and_fires_on_change() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::OpenPreferences).unwrap();

        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Analytical, checked: true })
            .unwrap();
        assert_eq!(f.storage.entries()["mcc_analytical"], "true");
        assert_eq!(f.count("analytical+"), 1);

        // unchanged from stored value: no callback
        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Analytical, checked: true })
            .unwrap();
        assert_eq!(f.count("analytical+"), 1);

        // required rows are not interactive
        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Necessary, checked: false })
            .unwrap();
        assert!(row(&widget, CategoryId::Necessary).checked);
        assert_eq!(f.count("necessary-"), 0);
    }

    #[test]
    fn test_toggle_unknown_category() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        let result = widget.handle(ConsentEvent::Toggle { id: "functional".into(), checked: true });
        assert!(matches!(result, Err(ConsentError::UnknownCategory(_))));
    }

    #[test]
    fn test_close_without_choice_applies_defaults() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Advertising, checked: true })
            .unwrap();
        widget.handle(ConsentEvent::ClosePreferences).unwrap();

        assert_eq!(widget.state(), WidgetState::IconVisible);
        let entries = f.storage.entries();
        assert_eq!(entries["mcc_necessary"], "true");
        assert_eq!(entries["mcc_analytical"], "false");
        assert_eq!(entries["mcc_advertising"], "false");
        assert!(widget.store().has_initial_choice());
        assert_eq!(f.count("necessary-"), 0);
        assert_eq!(f.count("rejected"), 1);
        assert!(!row(&widget, CategoryId::Advertising).checked);
    }

    #[test]
    fn test_close_discards_unsaved_toggle_off() {
        let f = Fixture::new();
        let mut config = f.config();
        config.cookie_types[2].default_value = true;
        let mut widget = f.widget(config);
        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        assert!(row(&widget, CategoryId::Advertising).checked);

        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Advertising, checked: false })
            .unwrap();
        widget.handle(ConsentEvent::ClosePreferences).unwrap();

        assert_eq!(f.storage.entries()["mcc_advertising"], "true");
        assert_eq!(f.count("given"), 1);
        assert!(row(&widget, CategoryId::Advertising).checked);
    }

    #[test]
    fn test_close_after_choice_reapplies_stored() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::AcceptAll).unwrap();
        let events_before = f.events.events().len();

        widget.handle(ConsentEvent::ClickIcon).unwrap();
        widget.handle(ConsentEvent::ClosePreferences).unwrap();

        assert_eq!(f.count("analytical+"), 2);
        assert_eq!(f.events.events().len(), events_before);
        assert_eq!(widget.state(), WidgetState::IconVisible);
    }

    #[test]
    fn test_accept_from_modal() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        widget.handle(ConsentEvent::AcceptAll).unwrap();
        assert_eq!(widget.state(), WidgetState::IconVisible);
        assert!(widget.view().modal.is_none());
        assert!(!widget.backdrop_visible());
    }

    #[test]
    fn test_invalid_transition_changes_nothing() {
        let f = Fixture::new();
        let mut widget = f.widget(f.config());
        widget.handle(ConsentEvent::AcceptAll).unwrap();

        let result = widget.handle(ConsentEvent::SavePreferences);
        assert!(matches!(result, Err(ConsentError::InvalidTransition { .. })));
        assert_eq!(widget.state(), WidgetState::IconVisible);
    }

    #[test]
    fn test_hidden_when_icon_disabled() {
        let f = Fixture::new();
        let mut config = f.config();
        config.cookie_icon.show = false;
        let mut widget = f.widget(config);
        widget.handle(ConsentEvent::RejectAll).unwrap();
        assert_eq!(widget.state(), WidgetState::Hidden);
        assert!(!widget.view().icon);

        assert!(widget.handle(ConsentEvent::ClickIcon).is_err());
        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        assert_eq!(widget.state(), WidgetState::ModalVisible);
    }

    #[test]
    fn test_failing_hook_does_not_block_persistence() {
        let f = Fixture::new();
        let mut config = f.config();
        config.cookie_types[1].on_accept = Some(Hook::infallible(|| panic!("tag error")));
        config.hooks.on_accept_all = Some(Hook::new(|| anyhow::bail!("host error")));
        let mut widget = f.widget(config);

        widget.handle(ConsentEvent::AcceptAll).unwrap();
        assert_eq!(f.storage.entries()["mcc_analytical"], "true");
        assert_eq!(f.count("advertising+"), 1);
        assert_eq!(f.count("given"), 1);
    }

    /// `localStorage` that refuses every access.
    struct BlockedStorage;

    impl crate::store::StorageBackend for BlockedStorage {
        fn get_item(&self, _key: &str) -> ConsentResult<Option<String>> {
            Err(ConsentError::Storage("SecurityError".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> ConsentResult<()> {
            Err(ConsentError::Storage("SecurityError".to_string()))
        }
    }

    #[test]
    fn test_blocked_storage_keeps_widget_usable() {
        let f = Fixture::new();
        let env = ConsentEnvironment::new(Rc::new(BlockedStorage))
            .with_tag_manager(Rc::new(f.tags.clone()))
            .with_events(Rc::new(f.events.clone()));
        let mut widget = ConsentWidget::new(f.config(), env, RecordingView::default()).unwrap();
        assert_eq!(widget.state(), WidgetState::BannerVisible);

        widget.handle(ConsentEvent::OpenPreferences).unwrap();
        widget
            .handle(ConsentEvent::Toggle { id: CategoryId::Analytical, checked: true })
            .unwrap();
        assert_eq!(f.count("analytical+"), 1);

        assert_eq!(widget.handle(ConsentEvent::AcceptAll).unwrap(), WidgetState::IconVisible);
        assert_eq!(f.events.events().len(), 1);
        assert_eq!(f.count("given"), 1);
    }

    #[test]
    fn test_suffix_isolates_instances() {
        let f = Fixture::new();
        let mut en = f.config();
        en.banner_suffix = Some("en".into());
        let mut widget = f.widget(en);
        widget.handle(ConsentEvent::AcceptAll).unwrap();

        let mut id = f.config();
        id.banner_suffix = Some("id".into());
        let other = f.widget(id);
        assert_eq!(other.state(), WidgetState::BannerVisible);
        assert_eq!(f.storage.entries()["MCB_IC_en"], "1");
    }

    #[test]
    fn test_destroy_tears_down_view() {
        let f = Fixture::new();
        let widget = f.widget(f.config());
        let view = widget.destroy();
        assert_eq!(view.log, vec!["mount", "teardown"]);
        assert!(!view.banner);
    }
}
