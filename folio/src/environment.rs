use anyhow::Context;
use folio_config::Config;
use folio_core_contact_impl::{
    ContactFeatureConfig, ContactFeatureServiceImpl, ContactLimits, RateLimitState,
};
use folio_delivery_emailjs::{EmailJsDeliveryServiceConfig, EmailJsDeliveryServiceImpl};
use folio_shared_impl::time::TimeServiceImpl;

pub type ContactService = ContactFeatureServiceImpl<TimeServiceImpl, EmailJsDeliveryServiceImpl>;

/// Builds the contact form service described by `config`, with a fresh
/// rate limit state.
pub fn contact_service(config: &Config) -> anyhow::Result<ContactService> {
    let delivery = EmailJsDeliveryServiceImpl::new(EmailJsDeliveryServiceConfig::from(
        &config.emailjs,
    ))
    .context("Failed to create EmailJS delivery service")?;

    Ok(ContactFeatureServiceImpl::new(
        TimeServiceImpl,
        delivery,
        contact_feature_config(config),
        RateLimitState::new(),
    ))
}

pub fn contact_feature_config(config: &Config) -> ContactFeatureConfig {
    ContactFeatureConfig {
        cooldown: *config.contact.cooldown,
        success_dismiss: *config.contact.success_dismiss,
        limits: ContactLimits {
            message_max: config.contact.message_max_length,
            ..Default::default()
        },
    }
}
