use std::{future, io::Write};

use anyhow::{bail, Context};
use chrono::{DateTime, Utc};
use clap::Subcommand;
use folio_config::Config;
use folio_core_contact_contracts::{ContactFeatureService, ContactSubmitOutcome};
use folio_models::contact::{ContactField, ERROR_NOTICE, SUCCESS_NOTICE};
use folio_shared_contracts::time::TimeService;
use folio_shared_impl::time::TimeServiceImpl;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::{environment, render::render};

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Send a single message through the contact form
    #[command(aliases(["s"]))]
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Fill out and submit the contact form line by line
    #[command(aliases(["i"]))]
    Interactive,
}

impl ContactCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        let mut service = environment::contact_service(&config)?;
        let message_max = config.contact.message_max_length;

        match self {
            ContactCommand::Send {
                name,
                email,
                message,
            } => send(&mut service, name, email, message).await,
            ContactCommand::Interactive => {
                let stdin = BufReader::new(tokio::io::stdin());
                run_session(
                    &mut service,
                    &TimeServiceImpl,
                    stdin,
                    &mut std::io::stdout(),
                    message_max,
                )
                .await
            }
        }
    }
}

async fn send(
    service: &mut impl ContactFeatureService,
    name: String,
    email: String,
    message: String,
) -> anyhow::Result<()> {
    service.update_field(ContactField::Name, name);
    service.update_field(ContactField::Email, email);
    service.update_field(ContactField::Message, message);

    match service.submit().await {
        ContactSubmitOutcome::Delivered => {
            println!("{SUCCESS_NOTICE}");
            Ok(())
        }
        ContactSubmitOutcome::Invalid(errors) => {
            for (field, error) in errors.iter() {
                eprintln!("{field}: {}", error.describe(field));
            }
            bail!("The contact form is invalid")
        }
        ContactSubmitOutcome::NotConfigured => {
            bail!("The contact form is not configured, run `check-config` for details")
        }
        ContactSubmitOutcome::RateLimited(retry_after) => bail!("{retry_after}"),
        ContactSubmitOutcome::Failed => bail!("{ERROR_NOTICE}"),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Set(ContactField, String),
    Submit,
    Reset,
    Show,
    Help,
    Quit,
}

const HELP: &str = "Commands:
  name <value>      set your name
  email <value>     set your email address
  message <value>   set your message
  submit            send the message
  reset             send another message after a successful one
  show              print the form
  help              print this help
  quit              leave the session";

fn parse_line(line: &str) -> Result<SessionCommand, String> {
    let (command, value) = line.split_once(' ').unwrap_or((line, ""));
    match command.trim() {
        "submit" => Ok(SessionCommand::Submit),
        "reset" => Ok(SessionCommand::Reset),
        "show" | "" => Ok(SessionCommand::Show),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => other
            .parse::<ContactField>()
            .map(|field| SessionCommand::Set(field, value.to_owned()))
            .map_err(|err| err.to_string()),
    }
}

/// Drives `service` from the lines of `input` until it ends or `quit` is
/// entered. The success notice is dismissed when its deadline passes on
/// `time`, even while waiting for input. `time` must be the clock `service`
/// checks its deadline against.
pub async fn run_session(
    service: &mut impl ContactFeatureService,
    time: &impl TimeService,
    input: impl AsyncBufRead + Unpin,
    out: &mut impl Write,
    message_max: usize,
) -> anyhow::Result<()> {
    let mut lines = input.lines();
    writeln!(out, "{HELP}")?;
    render(&service.view(), message_max, out)?;

    loop {
        let deadline = service.dismiss_deadline();
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read input")?,
            () = sleep_until(time, deadline) => {
                if service.dismiss_expired() {
                    render(&service.view(), message_max, out)?;
                }
                continue;
            }
        };
        let Some(line) = line else {
            break;
        };

        match parse_line(&line) {
            Ok(SessionCommand::Set(field, value)) => service.update_field(field, value),
            Ok(SessionCommand::Submit) => {
                if !service.view().can_submit() {
                    writeln!(out, "Submitting is currently disabled")?;
                    continue;
                }
                writeln!(out, "Sending...")?;
                service.submit().await;
                render(&service.view(), message_max, out)?;
            }
            Ok(SessionCommand::Reset) => {
                service.reset();
                render(&service.view(), message_max, out)?;
            }
            Ok(SessionCommand::Show) => render(&service.view(), message_max, out)?,
            Ok(SessionCommand::Help) => writeln!(out, "{HELP}")?,
            Ok(SessionCommand::Quit) => break,
            Err(err) => writeln!(out, "{err}")?,
        }
    }

    Ok(())
}

async fn sleep_until(time: &impl TimeService, deadline: Option<DateTime<Utc>>) {
    match deadline {
        Some(deadline) => {
            let wait = (deadline - time.now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
        }
        None => future::pending().await,
    }
}
