//! # Consent Manager
//!
//! Host-facing owner of the (at most one) live widget. Holds the merged
//! configuration, waits for the host's readiness signal once, syncs the
//! server-side consent cookie and (re)builds the widget on every config
//! update.

use std::future::Future;

use crate::config::{BannerConfig, ConfigUpdate};
use crate::cookie::{CookieSynchronizer, SyncOutcome};
use crate::env::ConsentEnvironment;
use crate::error::{ConsentError, ConsentResult};
use crate::machine::{ConsentEvent, ConsentWidget, WidgetState, WidgetView};
use crate::store::ConsentStore;

pub struct ConsentManager<V: WidgetView> {
    config: BannerConfig,
    env: ConsentEnvironment,
    widget: Option<ConsentWidget<V>>,
    /// View waiting for the next widget; `None` while a widget owns it
    idle_view: Option<V>,
}

impl<V: WidgetView> ConsentManager<V> {
    pub fn new(env: ConsentEnvironment, view: V) -> Self {
        Self {
            config: BannerConfig::default(),
            env,
            widget: None,
            idle_view: Some(view),
        }
    }

    /// Wait for `ready`, sync the consent cookie, then build the first widget.
    pub async fn start<F>(&mut self, update: ConfigUpdate, ready: F) -> ConsentResult<WidgetState>
    where
        F: Future<Output = ()>,
    {
        ready.await;
        log::debug!("Host ready; initializing consent widget");
        self.commit(update)?;
        self.sync_from_cookie();
        self.rebuild()
    }

    /// Shallow-merge `update` and rebuild the widget from scratch. A rejected
    /// update leaves the current config and widget untouched.
    pub fn update_config(&mut self, update: ConfigUpdate) -> ConsentResult<WidgetState> {
        self.commit(update)?;
        self.rebuild()
    }

    pub fn handle(&mut self, event: ConsentEvent) -> ConsentResult<WidgetState> {
        match self.widget.as_mut() {
            Some(widget) => widget.handle(event),
            None => Err(ConsentError::MissingDependency(
                "consent widget is not initialized".to_string(),
            )),
        }
    }

    /// Programmatic "open preferences", e.g. from a footer link.
    pub fn open_preferences(&mut self) -> ConsentResult<WidgetState> {
        self.handle(ConsentEvent::OpenPreferences)
    }

    /// Seed the store from the server-side consent cookie, if any.
    pub fn sync_from_cookie(&self) -> SyncOutcome {
        let store = ConsentStore::new(
            self.env.storage.clone(),
            self.config.storage.clone(),
            self.config.banner_suffix.as_deref(),
        );
        CookieSynchronizer::new(&self.env, &store, &self.config.cookie.name).sync()
    }

    /// Tear the widget down; the manager can be restarted with `update_config`.
    pub fn destroy(&mut self) {
        if let Some(widget) = self.widget.take() {
            self.idle_view = Some(widget.destroy());
        }
    }

    pub fn widget(&self) -> Option<&ConsentWidget<V>> {
        self.widget.as_ref()
    }

    pub fn config(&self) -> &BannerConfig {
        &self.config
    }

    pub fn state(&self) -> Option<WidgetState> {
        self.widget.as_ref().map(|w| w.state())
    }

    fn commit(&mut self, update: ConfigUpdate) -> ConsentResult<()> {
        let mut merged = self.config.clone();
        merged.merge(update);
        merged.validate()?;
        self.config = merged;
        Ok(())
    }

    fn rebuild(&mut self) -> ConsentResult<WidgetState> {
        self.destroy();
        let Some(view) = self.idle_view.take() else {
            return Err(ConsentError::MissingDependency("widget view".to_string()));
        };
        let widget = ConsentWidget::new(self.config.clone(), self.env.clone(), view)?;
        let state = widget.state();
        self.widget = Some(widget);
        Ok(state)
    }
}
