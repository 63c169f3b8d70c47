use std::io::Write;

use anyhow::bail;
use folio_config::Config;
use folio_delivery_emailjs::EmailJsCredentials;
use tracing::{error, warn};

pub fn check_config(config: &Config, verbose: bool) -> anyhow::Result<()> {
    if verbose {
        println!("{config:#?}");
    }

    for key in config.site.missing() {
        warn!("Optional setting {key} is not set");
    }

    let missing = EmailJsCredentials::from(&config.emailjs).missing();
    if missing.is_empty() {
        println!("Contact form delivery is configured");
        return Ok(());
    }

    error!(?missing, "EmailJS credentials are missing");
    write_hints(&missing, &mut std::io::stderr())?;
    bail!("The contact form cannot send messages until the credentials are set")
}

fn write_hints(missing: &[&str], out: &mut impl Write) -> std::io::Result<()> {
    writeln!(
        out,
        "Set the following environment variables or the [emailjs] section of your config:"
    )?;
    for key in missing {
        writeln!(out, "{key}=your_value_here")?;
    }
    Ok(())
}
