//! Fixtures shared by the tests of the workspace.

use std::sync::LazyLock;

use chrono::{DateTime, TimeDelta, Utc};
use folio_delivery_contracts::DeliveryPayload;
use folio_models::contact::ContactForm;

/// A valid form with surrounding whitespace in every field.
pub static FORM: LazyLock<ContactForm> = LazyLock::new(|| ContactForm {
    name: "  Max Mustermann ".into(),
    email: " max.mustermann@example.de\n".into(),
    message: "Hello World! I would like to talk about a project.  ".into(),
});

/// What [`FORM`] looks like when it is handed to the delivery provider.
pub static PAYLOAD: LazyLock<DeliveryPayload> = LazyLock::new(|| DeliveryPayload {
    name: "Max Mustermann".into(),
    email: "max.mustermann@example.de".into(),
    message: "Hello World! I would like to talk about a project.".into(),
});

/// The smallest form that passes validation.
pub static MINIMAL_FORM: LazyLock<ContactForm> = LazyLock::new(|| ContactForm {
    name: "Al".into(),
    email: "a@b.co".into(),
    message: "1234567890".into(),
});

pub static NOW: LazyLock<DateTime<Utc>> = LazyLock::new(|| {
    DateTime::from_timestamp(1_735_689_600, 0).unwrap_or_default()
});

/// [`NOW`] shifted by `millis` milliseconds.
pub fn now_plus(millis: i64) -> DateTime<Utc> {
    *NOW + TimeDelta::milliseconds(millis)
}

/// Epoch based timestamp in milliseconds.
pub fn at_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}
