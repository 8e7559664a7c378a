//! # Consent Broadcaster
//!
//! Fans a finalized [`ConsentChoice`] out to every surface, in order:
//!
//! 1. Persist into the consent store (and the optional mirror cookie)
//! 2. Tag-manager consent `update`
//! 3. `consent_updated` analytics event
//! 4. Best-effort remote notification
//! 5. Per-category `on_accept` / `on_reject`
//!
//! Steps 1-4 form the *save* phase and step 5 the *apply* phase; the host may
//! replace either through `save_consent_choices` / `apply_consent_choices`.
//! Each step is isolated: a failure is logged, recorded in the
//! [`BroadcastReport`] and the remaining steps still run.

use chrono::Utc;

use crate::analytics::{AnalyticsEvent, ConsentCommand, ConsentModeUpdate, EVENT_CONSENT_UPDATED};
use crate::choice::ConsentChoice;
use crate::config::BannerConfig;
use crate::cookie::consent_cookie_assignment;
use crate::env::ConsentEnvironment;
use crate::error::ConsentError;
use crate::store::ConsentStore;

/// Broadcast step identifiers, used to attribute failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BroadcastStep {
    Persist,
    MirrorCookie,
    TagManager,
    AnalyticsEvent,
    Notify,
    SaveOverride,
    Apply,
    ApplyOverride,
}

/// Failures collected while broadcasting. Empty means every step succeeded.
#[derive(Debug, Default)]
pub struct BroadcastReport {
    pub failures: Vec<(BroadcastStep, ConsentError)>,
}

impl BroadcastReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, step: BroadcastStep) -> bool {
        self.failures.iter().any(|(s, _)| *s == step)
    }

    fn record(&mut self, step: BroadcastStep, result: Result<(), ConsentError>) {
        if let Err(err) = result {
            log::warn!("Broadcast step {:?} failed: {}", step, err);
            self.failures.push((step, err));
        }
    }

    fn extend(&mut self, other: BroadcastReport) {
        self.failures.extend(other.failures);
    }
}

pub struct Broadcaster<'a> {
    env: &'a ConsentEnvironment,
    store: &'a ConsentStore,
    config: &'a BannerConfig,
}

impl<'a> Broadcaster<'a> {
    pub fn new(env: &'a ConsentEnvironment, store: &'a ConsentStore, config: &'a BannerConfig) -> Self {
        Self { env, store, config }
    }

    /// Save then apply.
    pub fn broadcast(&self, choice: &ConsentChoice) -> BroadcastReport {
        let choice = self.normalize(choice);
        let mut report = self.save(&choice);
        report.extend(self.apply(&choice));
        log::debug!("Consent choice broadcast: {:?}", choice);
        report
    }

    /// Required categories are forced on and unknown ids dropped.
    pub fn normalize(&self, choice: &ConsentChoice) -> ConsentChoice {
        self.config
            .cookie_types
            .iter()
            .filter_map(|c| choice.get(&c.id).map(|granted| (c.id.clone(), c.coerce(granted))))
            .collect()
    }

    /// Steps 1-4, or the host's `save_consent_choices` override.
    pub fn save(&self, choice: &ConsentChoice) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        if let Some(save) = &self.config.hooks.save_consent_choices {
            report.record(BroadcastStep::SaveOverride, save.run("save_consent_choices", choice));
            return report;
        }

        report.record(BroadcastStep::Persist, self.store.save(choice));
        report.record(BroadcastStep::MirrorCookie, self.mirror_cookie(choice));

        if let Some(tag_manager) = &self.env.tag_manager {
            let update = ConsentModeUpdate::from_choice(choice);
            report.record(
                BroadcastStep::TagManager,
                tag_manager.consent(ConsentCommand::Update, &update),
            );
        } else {
            log::debug!("No tag manager; consent mode not updated");
        }

        if let Some(events) = &self.env.events {
            let event = AnalyticsEvent::new(EVENT_CONSENT_UPDATED, choice.payload());
            report.record(BroadcastStep::AnalyticsEvent, events.push(&event));
        }

        if let Some(notifier) = &self.env.notifier {
            notifier.notify(choice.payload());
        }

        report
    }

    /// Step 5, or the host's `apply_consent_choices` override. Never persists.
    pub fn apply(&self, choice: &ConsentChoice) -> BroadcastReport {
        let mut report = BroadcastReport::default();

        if let Some(apply) = &self.config.hooks.apply_consent_choices {
            report.record(BroadcastStep::ApplyOverride, apply.run("apply_consent_choices", choice));
            return report;
        }

        for category in &self.config.cookie_types {
            let Some(granted) = choice.get(&category.id) else {
                continue;
            };
            if !category.run_callback(granted) {
                report.failures.push((
                    BroadcastStep::Apply,
                    ConsentError::Callback {
                        name: category.id.to_string(),
                        message: "category callback failed".to_string(),
                    },
                ));
            }
        }
        log::debug!("Consent choice applied: {:?}", choice);
        report
    }

    fn mirror_cookie(&self, choice: &ConsentChoice) -> Result<(), ConsentError> {
        let (Some(days), Some(jar)) = (self.config.cookie.mirror_days, &self.env.cookies) else {
            return Ok(());
        };
        let assignment =
            consent_cookie_assignment(&self.config.cookie.name, choice.payload(), days, Utc::now())?;
        jar.set_cookie(&assignment)
    }
}
