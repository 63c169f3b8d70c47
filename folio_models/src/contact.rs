use std::{collections::BTreeMap, fmt, str::FromStr, time::Duration};

use nutype::nutype;
use serde::{Deserialize, Serialize};

/// The raw contents of the contact form, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

impl ContactForm {
    pub fn get(&self, field: ContactField) -> &str {
        match field {
            ContactField::Name => &self.name,
            ContactField::Email => &self.email,
            ContactField::Message => &self.message,
        }
    }

    pub fn get_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Name => &mut self.name,
            ContactField::Email => &mut self.email,
            ContactField::Message => &mut self.message,
        }
    }

    /// Returns a trimmed copy of the form. The input buffer itself is left
    /// untouched.
    pub fn trimmed(&self) -> TrimmedContactForm {
        TrimmedContactForm {
            name: ContactName::new(self.name.clone()),
            email: ContactEmail::new(self.email.clone()),
            message: ContactMessageContent::new(self.message.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimmedContactForm {
    pub name: ContactName,
    pub email: ContactEmail,
    pub message: ContactMessageContent,
}

#[nutype(
    sanitize(trim),
    derive(Debug, Clone, PartialEq, Eq, Deref, AsRef, Serialize)
)]
pub struct ContactName(String);

#[nutype(
    sanitize(trim),
    derive(Debug, Clone, PartialEq, Eq, Deref, AsRef, Serialize)
)]
pub struct ContactEmail(String);

#[nutype(
    sanitize(trim),
    derive(Debug, Clone, PartialEq, Eq, Deref, AsRef, Serialize)
)]
pub struct ContactMessageContent(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactField {
    Name,
    Email,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 3] = [Self::Name, Self::Email, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }

    /// Capitalized name used in user facing messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Email => "Email",
            Self::Message => "Message",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownContactField(pub String);

impl fmt::Display for UnknownContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown field {:?}, expected one of: name, email, message",
            self.0
        )
    }
}

impl std::error::Error for UnknownContactField {}

impl FromStr for ContactField {
    type Err = UnknownContactField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|field| field.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownContactField(s.into()))
    }
}

/// Reason a single field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    Required,
    TooShort { min: usize },
    TooLong { max: usize },
    InvalidFormat,
}

impl FieldError {
    /// Renders the message shown next to `field`.
    pub fn describe(self, field: ContactField) -> String {
        match (self, field) {
            (Self::Required, field) => format!("{} is required", field.label()),
            (Self::TooShort { min }, field) => {
                format!("{} must be at least {min} characters", field.label())
            }
            (Self::TooLong { max }, field) => {
                format!("{} must be at most {max} characters", field.label())
            }
            (Self::InvalidFormat, ContactField::Email) => {
                "Please enter a valid email address".into()
            }
            (Self::InvalidFormat, field) => format!("{} is invalid", field.label()),
        }
    }
}

/// Field level validation errors. An empty set means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors(BTreeMap<ContactField, FieldError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ContactField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn insert(&mut self, field: ContactField, error: FieldError) {
        self.0.insert(field, error);
    }

    pub fn remove(&mut self, field: ContactField) -> Option<FieldError> {
        self.0.remove(&field)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, FieldError)> + '_ {
        self.0.iter().map(|(&field, &error)| (field, error))
    }

    /// The rendered message for `field`, if it has an error.
    pub fn message(&self, field: ContactField) -> Option<String> {
        self.get(field).map(|error| error.describe(field))
    }
}

impl FromIterator<(ContactField, FieldError)> for ValidationErrors {
    fn from_iter<T: IntoIterator<Item = (ContactField, FieldError)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    Idle,
    Submitting,
    Success,
    Error,
}

impl SubmissionStatus {
    pub fn is_submitting(self) -> bool {
        self == Self::Submitting
    }
}

/// Remaining time until the cooldown window of the previous submission ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RetryAfter(pub Duration);

impl RetryAfter {
    /// Whole seconds, rounded up, so a wait of 1ms is shown as 1 second.
    pub fn as_secs_ceil(self) -> u64 {
        let millis = self.0.as_millis();
        millis.div_ceil(1000).try_into().unwrap_or(u64::MAX)
    }
}

impl fmt::Display for RetryAfter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Please wait {} seconds before submitting again",
            self.as_secs_ceil()
        )
    }
}

pub const SUCCESS_NOTICE: &str =
    "Message Sent! Thanks for reaching out. I'll get back to you within 24 hours.";
pub const ERROR_NOTICE: &str = "Oops! Something went wrong. Please try again or email me directly.";
pub const NOT_CONFIGURED_NOTICE: &str =
    "EmailJS not configured. Contact form will not send emails.";

/// Everything a front end needs to render the contact form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactView {
    pub form: ContactForm,
    pub status: SubmissionStatus,
    pub errors: ValidationErrors,
    pub rate_limited: Option<RetryAfter>,
    pub configured: bool,
}

impl ContactView {
    /// The submit control must be disabled while a message is in flight or
    /// when delivery is not configured.
    pub fn can_submit(&self) -> bool {
        self.configured && !self.status.is_submitting()
    }

    /// The transient notice for the current status, if any.
    pub fn status_notice(&self) -> Option<&'static str> {
        match self.status {
            SubmissionStatus::Success => Some(SUCCESS_NOTICE),
            SubmissionStatus::Error => Some(ERROR_NOTICE),
            SubmissionStatus::Idle | SubmissionStatus::Submitting => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn trimmed_leaves_buffer_untouched() {
        let form = ContactForm {
            name: "  Max  ".into(),
            email: "\tmax@example.com\n".into(),
            message: " Hello World! ".into(),
        };

        let trimmed = form.trimmed();

        assert_eq!(trimmed.name.as_str(), "Max");
        assert_eq!(trimmed.email.as_str(), "max@example.com");
        assert_eq!(trimmed.message.as_str(), "Hello World!");
        assert_eq!(form.name, "  Max  ");
        assert_eq!(form.message, " Hello World! ");
    }

    #[test]
    fn field_error_messages() {
        for (field, error, expected) in [
            (ContactField::Name, FieldError::Required, "Name is required"),
            (
                ContactField::Name,
                FieldError::TooShort { min: 2 },
                "Name must be at least 2 characters",
            ),
            (ContactField::Email, FieldError::Required, "Email is required"),
            (
                ContactField::Email,
                FieldError::InvalidFormat,
                "Please enter a valid email address",
            ),
            (
                ContactField::Message,
                FieldError::TooShort { min: 10 },
                "Message must be at least 10 characters",
            ),
            (
                ContactField::Message,
                FieldError::TooLong { max: 500 },
                "Message must be at most 500 characters",
            ),
        ] {
            assert_eq!(error.describe(field), expected);
        }
    }

    #[test]
    fn retry_after_rounds_up() {
        for (millis, expected) in [(0, 0), (1, 1), (999, 1), (1000, 1), (1001, 2), (5000, 5)] {
            assert_eq!(
                RetryAfter(Duration::from_millis(millis)).as_secs_ceil(),
                expected
            );
        }
        assert_eq!(
            RetryAfter(Duration::from_millis(3001)).to_string(),
            "Please wait 4 seconds before submitting again"
        );
    }

    #[test]
    fn parse_field() {
        assert_eq!("Email".parse::<ContactField>(), Ok(ContactField::Email));
        assert_eq!(
            "subject".parse::<ContactField>(),
            Err(UnknownContactField("subject".into()))
        );
    }

    #[test]
    fn serialize_errors() {
        let errors = [
            (ContactField::Message, FieldError::TooShort { min: 10 }),
            (ContactField::Name, FieldError::Required),
        ]
        .into_iter()
        .collect::<ValidationErrors>();

        assert_eq!(
            serde_json::to_value(&errors).unwrap(),
            serde_json::json!({
                "name": {"kind": "required"},
                "message": {"kind": "too_short", "min": 10},
            })
        );
    }

    #[test]
    fn status_notices() {
        let notice = |status| {
            ContactView {
                status,
                ..Default::default()
            }
            .status_notice()
        };

        assert_eq!(
            notice(SubmissionStatus::Success),
            Some("Message Sent! Thanks for reaching out. I'll get back to you within 24 hours.")
        );
        assert_eq!(
            notice(SubmissionStatus::Error),
            Some("Oops! Something went wrong. Please try again or email me directly.")
        );
        assert_eq!(notice(SubmissionStatus::Idle), None);
        assert_eq!(notice(SubmissionStatus::Submitting), None);
    }
}
