use std::future::Future;

use folio_models::contact::TrimmedContactForm;
use serde::Serialize;
use thiserror::Error;

/// Hands a contact message to a transactional email provider.
///
/// Implementations make a single attempt per call and never retry.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait DeliveryService: Send + Sync + 'static {
    /// Whether all credentials required by [`DeliveryService::send`] are present.
    fn is_configured(&self) -> bool;

    fn send(
        &self,
        payload: DeliveryPayload,
    ) -> impl Future<Output = Result<(), DeliveryError>> + Send;
}

/// The template parameters of a contact message. All fields are trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeliveryPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl From<TrimmedContactForm> for DeliveryPayload {
    fn from(value: TrimmedContactForm) -> Self {
        Self {
            name: value.name.into_inner(),
            email: value.email.into_inner(),
            message: value.message.into_inner(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("Delivery is not configured, missing: {}", .missing.join(", "))]
    NotConfigured { missing: Vec<&'static str> },
    #[error("Delivery provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockDeliveryService {
    pub fn with_is_configured(mut self, configured: bool) -> Self {
        self.expect_is_configured().return_const(configured);
        self
    }

    pub fn with_send(mut self, payload: DeliveryPayload, result: Result<(), DeliveryError>) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(payload))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
