use std::{sync::Arc, time::Duration};

use anyhow::Context;
use folio_config::{EmailJsConfig, EMAILJS_PUBLIC_KEY, EMAILJS_SERVICE_ID, EMAILJS_TEMPLATE_ID};
use folio_delivery_contracts::{DeliveryError, DeliveryPayload, DeliveryService};
use folio_utils::trace_instrument;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::http::HttpClient;

pub mod http;

/// Delivers contact messages through the EmailJS REST API.
#[derive(Debug, Clone)]
pub struct EmailJsDeliveryServiceImpl {
    config: EmailJsDeliveryServiceConfig,
    http: HttpClient,
}

#[derive(Debug, Clone)]
pub struct EmailJsDeliveryServiceConfig {
    pub endpoint: Arc<Url>,
    pub timeout: Duration,
    pub credentials: EmailJsCredentials,
}

impl From<&EmailJsConfig> for EmailJsDeliveryServiceConfig {
    fn from(value: &EmailJsConfig) -> Self {
        Self {
            endpoint: value.endpoint.clone().into(),
            timeout: *value.timeout,
            credentials: value.into(),
        }
    }
}

#[derive(Clone, Default)]
pub struct EmailJsCredentials {
    pub service_id: Option<String>,
    pub template_id: Option<String>,
    pub public_key: Option<String>,
}

impl From<&EmailJsConfig> for EmailJsCredentials {
    fn from(value: &EmailJsConfig) -> Self {
        Self {
            service_id: value.service_id.clone(),
            template_id: value.template_id.clone(),
            public_key: value.public_key.clone(),
        }
    }
}

impl std::fmt::Debug for EmailJsCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailJsCredentials")
            .field("service_id", &self.service_id)
            .field("template_id", &self.template_id)
            .field("public_key", &self.public_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl EmailJsCredentials {
    fn entries(&self) -> [(&'static str, Option<&str>); 3] {
        let get = |value: &Option<String>| value.as_deref().filter(|value| !value.is_empty());
        [
            (EMAILJS_SERVICE_ID, get(&self.service_id)),
            (EMAILJS_TEMPLATE_ID, get(&self.template_id)),
            (EMAILJS_PUBLIC_KEY, get(&self.public_key)),
        ]
    }

    /// Names of the credentials that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        self.entries()
            .into_iter()
            .filter(|(_, value)| value.is_none())
            .map(|(name, _)| name)
            .collect()
    }

    fn resolve(&self) -> Result<ResolvedCredentials<'_>, DeliveryError> {
        match self.entries() {
            [(_, Some(service_id)), (_, Some(template_id)), (_, Some(public_key))] => {
                Ok(ResolvedCredentials {
                    service_id,
                    template_id,
                    public_key,
                })
            }
            _ => Err(DeliveryError::NotConfigured {
                missing: self.missing(),
            }),
        }
    }
}

struct ResolvedCredentials<'a> {
    service_id: &'a str,
    template_id: &'a str,
    public_key: &'a str,
}

impl EmailJsDeliveryServiceImpl {
    pub fn new(config: EmailJsDeliveryServiceConfig) -> anyhow::Result<Self> {
        let http = HttpClient::new(config.timeout).context("Failed to build http client")?;
        Ok(Self { config, http })
    }
}

impl DeliveryService for EmailJsDeliveryServiceImpl {
    fn is_configured(&self) -> bool {
        self.config.credentials.missing().is_empty()
    }

    #[trace_instrument(skip(self, payload))]
    async fn send(&self, payload: DeliveryPayload) -> Result<(), DeliveryError> {
        let credentials = self.config.credentials.resolve()?;

        let response = self
            .http
            .post((*self.config.endpoint).clone())
            .json(&SendRequest {
                service_id: credentials.service_id,
                template_id: credentials.template_id,
                user_id: credentials.public_key,
                template_params: &payload,
            })
            .send()
            .await
            .context("Failed to reach EmailJS")?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "message accepted by EmailJS");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    template_params: &'a DeliveryPayload,
}
