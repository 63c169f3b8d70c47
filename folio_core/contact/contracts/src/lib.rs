use std::future::Future;

use chrono::{DateTime, Utc};
use folio_models::contact::{ContactField, ContactView, RetryAfter, ValidationErrors};
use tokio::sync::watch;

/// The state machine behind the contact form.
///
/// `submit` borrows the service mutably until the message has been handed to
/// the delivery provider, so at most one submission can be in flight. Front
/// ends observe the `Submitting` state through [`ContactFeatureService::subscribe`]
/// and must disable their submit control while it lasts.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactFeatureService: Send + 'static {
    /// Returns a snapshot of the current view state.
    fn view(&self) -> ContactView;

    /// Returns a receiver that is notified on every view state change.
    fn subscribe(&self) -> watch::Receiver<ContactView>;

    /// Replaces the raw contents of `field` and clears its validation error.
    fn update_field(&mut self, field: ContactField, value: String);

    /// Validates the form and, if it is valid and the cooldown has passed,
    /// delivers it.
    fn submit(&mut self) -> impl Future<Output = ContactSubmitOutcome> + Send;

    /// Dismisses the success notice ("send another").
    fn reset(&mut self);

    /// Time at which the success notice is dismissed automatically.
    fn dismiss_deadline(&self) -> Option<DateTime<Utc>>;

    /// Dismisses the success notice if its deadline has passed. Returns
    /// whether the state changed.
    fn dismiss_expired(&mut self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactSubmitOutcome {
    /// At least one field is invalid, nothing was sent.
    Invalid(ValidationErrors),
    /// Delivery credentials are missing, nothing was sent.
    NotConfigured,
    /// The previous submission was accepted too recently, nothing was sent.
    RateLimited(RetryAfter),
    Delivered,
    /// The delivery provider failed. The form contents are preserved.
    Failed,
}
