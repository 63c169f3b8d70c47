use std::sync::LazyLock;

use folio_models::contact::{ContactField, FieldError, TrimmedContactForm, ValidationErrors};
use regex::Regex;

/// `local@label.label...` where each domain label is alphanumeric with inner
/// hyphens and at most 63 characters long. At least two labels are required.
pub static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)+$",
    )
    .unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactLimits {
    pub name_min: usize,
    pub message_min: usize,
    pub message_max: usize,
}

impl Default for ContactLimits {
    fn default() -> Self {
        Self {
            name_min: 2,
            message_min: 10,
            message_max: 500,
        }
    }
}

/// Checks every field of `form` and reports all violations at once.
pub fn validate(form: &TrimmedContactForm, limits: &ContactLimits) -> ValidationErrors {
    [
        (ContactField::Name, check_name(&form.name, limits)),
        (ContactField::Email, check_email(&form.email)),
        (ContactField::Message, check_message(&form.message, limits)),
    ]
    .into_iter()
    .filter_map(|(field, error)| error.map(|error| (field, error)))
    .collect()
}

fn check_name(name: &str, limits: &ContactLimits) -> Option<FieldError> {
    match name.chars().count() {
        0 => Some(FieldError::Required),
        len if len < limits.name_min => Some(FieldError::TooShort {
            min: limits.name_min,
        }),
        _ => None,
    }
}

fn check_email(email: &str) -> Option<FieldError> {
    if email.is_empty() {
        Some(FieldError::Required)
    } else if !EMAIL_REGEX.is_match(email) {
        Some(FieldError::InvalidFormat)
    } else {
        None
    }
}

fn check_message(message: &str, limits: &ContactLimits) -> Option<FieldError> {
    match message.chars().count() {
        0 => Some(FieldError::Required),
        len if len < limits.message_min => Some(FieldError::TooShort {
            min: limits.message_min,
        }),
        len if len > limits.message_max => Some(FieldError::TooLong {
            max: limits.message_max,
        }),
        _ => None,
    }
}
