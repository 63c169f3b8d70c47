use std::time::Duration;

use folio_core_contact_contracts::ContactFeatureService;
use folio_delivery_contracts::MockDeliveryService;
use folio_models::contact::{ContactField, ContactForm};
use folio_shared_contracts::time::MockTimeService;

use crate::{ContactFeatureConfig, ContactFeatureServiceImpl, ContactLimits, RateLimitState};

mod submit;

type Sut = ContactFeatureServiceImpl<MockTimeService, MockDeliveryService>;

impl Default for ContactFeatureConfig {
    fn default() -> Self {
        Self {
            cooldown: Duration::from_millis(5000),
            success_dismiss: Duration::from_millis(5000),
            limits: ContactLimits::default(),
        }
    }
}

fn make_sut(time: MockTimeService, delivery: MockDeliveryService) -> Sut {
    ContactFeatureServiceImpl::new(
        time,
        delivery,
        ContactFeatureConfig::default(),
        RateLimitState::new(),
    )
}

fn fill(sut: &mut Sut, form: &ContactForm) {
    for field in ContactField::ALL {
        sut.update_field(field, form.get(field).to_owned());
    }
}
