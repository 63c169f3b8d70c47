use std::io::{self, Write};

use folio_models::contact::{ContactField, ContactView, NOT_CONFIGURED_NOTICE};

/// Writes a plain text rendition of the contact form.
pub fn render(view: &ContactView, message_max: usize, out: &mut impl Write) -> io::Result<()> {
    if !view.configured {
        writeln!(out, "! {NOT_CONFIGURED_NOTICE}")?;
    }

    for field in ContactField::ALL {
        let value = view.form.get(field);
        match field {
            ContactField::Message => writeln!(
                out,
                "{} ({}/{message_max}): {value}",
                field.label(),
                value.chars().count()
            )?,
            ContactField::Name | ContactField::Email => {
                writeln!(out, "{}: {value}", field.label())?
            }
        }
        if let Some(error) = view.errors.message(field) {
            writeln!(out, "  ^ {error}")?;
        }
    }

    if let Some(retry_after) = view.rate_limited {
        writeln!(out, "{retry_after}")?;
    }
    if let Some(notice) = view.status_notice() {
        writeln!(out, "{notice}")?;
    }

    Ok(())
}
