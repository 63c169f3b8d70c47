use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitOutcome};
use folio_delivery_contracts::{DeliveryError, DeliveryService};
use folio_models::contact::{
    ContactField, ContactForm, ContactView, SubmissionStatus, ValidationErrors,
};
use folio_shared_contracts::time::TimeService;
use folio_utils::trace_instrument;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

pub use crate::{
    rate_limit::{RateLimitDecision, RateLimitState},
    validator::ContactLimits,
};

pub mod rate_limit;
pub mod validator;

#[cfg(test)]
mod tests;

#[derive(Debug)]
pub struct ContactFeatureServiceImpl<Time, Delivery> {
    time: Time,
    delivery: Delivery,
    config: ContactFeatureConfig,
    rate_limit: RateLimitState,
    dismiss_at: Option<DateTime<Utc>>,
    view: watch::Sender<ContactView>,
}

#[derive(Debug, Clone)]
pub struct ContactFeatureConfig {
    /// Minimum time between two submissions accepted for delivery.
    pub cooldown: Duration,
    /// How long the success notice stays before it is dismissed.
    pub success_dismiss: Duration,
    pub limits: ContactLimits,
}

impl<Time, Delivery> ContactFeatureServiceImpl<Time, Delivery>
where
    Time: TimeService,
    Delivery: DeliveryService,
{
    pub fn new(
        time: Time,
        delivery: Delivery,
        config: ContactFeatureConfig,
        rate_limit: RateLimitState,
    ) -> Self {
        let configured = delivery.is_configured();
        if !configured {
            warn!("Contact form delivery is not configured, submissions will be rejected");
        }

        let (view, _) = watch::channel(ContactView {
            configured,
            ..Default::default()
        });

        Self {
            time,
            delivery,
            config,
            rate_limit,
            dismiss_at: None,
            view,
        }
    }

    pub fn rate_limit(&self) -> &RateLimitState {
        &self.rate_limit
    }

    fn update(&self, f: impl FnOnce(&mut ContactView)) {
        self.view.send_modify(f);
    }
}

impl<Time, Delivery> ContactFeatureService for ContactFeatureServiceImpl<Time, Delivery>
where
    Time: TimeService,
    Delivery: DeliveryService,
{
    fn view(&self) -> ContactView {
        self.view.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<ContactView> {
        self.view.subscribe()
    }

    fn update_field(&mut self, field: ContactField, value: String) {
        let value = match field {
            ContactField::Message => truncate_chars(value, self.config.limits.message_max),
            ContactField::Name | ContactField::Email => value,
        };

        self.update(|view| {
            *view.form.get_mut(field) = value;
            view.errors.remove(field);
        });
    }

    #[trace_instrument(skip(self))]
    async fn submit(&mut self) -> ContactSubmitOutcome {
        let form = self.view.borrow().form.trimmed();

        let errors = validator::validate(&form, &self.config.limits);
        if !errors.is_empty() {
            debug!(?errors, "contact form is invalid");
            self.dismiss_at = None;
            self.update(|view| {
                view.status = SubmissionStatus::Idle;
                view.errors = errors.clone();
                view.rate_limited = None;
            });
            return ContactSubmitOutcome::Invalid(errors);
        }

        if !self.delivery.is_configured() {
            warn!("Rejecting contact form submission, delivery is not configured");
            self.dismiss_at = None;
            self.update(|view| {
                view.status = SubmissionStatus::Idle;
                view.configured = false;
                view.rate_limited = None;
            });
            return ContactSubmitOutcome::NotConfigured;
        }

        let now = self.time.now();
        let decision = self.rate_limit.check(now, self.config.cooldown);
        if !decision.allowed {
            debug!(retry_after = ?decision.retry_after.0, "contact form is rate limited");
            self.dismiss_at = None;
            self.update(|view| {
                view.status = SubmissionStatus::Idle;
                view.errors = ValidationErrors::new();
                view.rate_limited = Some(decision.retry_after);
            });
            return ContactSubmitOutcome::RateLimited(decision.retry_after);
        }

        self.rate_limit.record(now);
        self.dismiss_at = None;
        self.update(|view| {
            view.status = SubmissionStatus::Submitting;
            view.errors = ValidationErrors::new();
            view.rate_limited = None;
            view.configured = true;
        });

        info!("Sending contact message");
        match self.delivery.send(form.into()).await {
            Ok(()) => {
                info!("Contact message delivered");
                self.dismiss_at = deadline(self.time.now(), self.config.success_dismiss);
                self.update(|view| {
                    view.status = SubmissionStatus::Success;
                    view.form = ContactForm::default();
                });
                ContactSubmitOutcome::Delivered
            }
            Err(err) => {
                match &err {
                    DeliveryError::NotConfigured { .. } => {
                        warn!("Failed to deliver contact message: {err}")
                    }
                    DeliveryError::Rejected { .. } | DeliveryError::Other(_) => {
                        error!("Failed to deliver contact message: {err:#}")
                    }
                }
                let configured = self.delivery.is_configured();
                self.update(|view| {
                    view.status = SubmissionStatus::Error;
                    view.configured = configured;
                });
                ContactSubmitOutcome::Failed
            }
        }
    }

    fn reset(&mut self) {
        if self.view.borrow().status != SubmissionStatus::Success {
            return;
        }
        self.dismiss_at = None;
        self.update(|view| view.status = SubmissionStatus::Idle);
    }

    fn dismiss_deadline(&self) -> Option<DateTime<Utc>> {
        self.dismiss_at
    }

    fn dismiss_expired(&mut self) -> bool {
        let Some(dismiss_at) = self.dismiss_at else {
            return false;
        };
        if self.time.now() < dismiss_at {
            return false;
        }

        self.dismiss_at = None;
        let mut changed = false;
        self.update(|view| {
            if view.status == SubmissionStatus::Success {
                view.status = SubmissionStatus::Idle;
                changed = true;
            }
        });
        changed
    }
}

fn deadline(now: DateTime<Utc>, after: Duration) -> Option<DateTime<Utc>> {
    TimeDelta::from_std(after)
        .ok()
        .and_then(|after| now.checked_add_signed(after))
}

fn truncate_chars(mut value: String, max: usize) -> String {
    if let Some((idx, _)) = value.char_indices().nth(max) {
        value.truncate(idx);
    }
    value
}
