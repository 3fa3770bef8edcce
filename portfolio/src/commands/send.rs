use clap::Args;
use portfolio_config::Config;
use portfolio_form::{ContactFormController, ContactFormFields, SubmitOutcome, FAILURE_MESSAGE};

use crate::environment;

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Your name
    #[arg(long)]
    pub name: String,
    /// Email address replies should go to
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub subject: String,
    #[arg(long)]
    pub message: String,
}

impl From<SendArgs> for ContactFormFields {
    fn from(value: SendArgs) -> Self {
        Self {
            name: value.name,
            email: value.email,
            subject: value.subject,
            message: value.message,
        }
    }
}

/// Submits a message through the contact relay. Returns whether it was sent.
pub async fn send(config: Config, args: SendArgs) -> anyhow::Result<bool> {
    let contact = environment::contact_relay(&config)?;
    let form = ContactFormController::spawn(contact, environment::contact_form_config(&config));

    match form.submit(args.into()).await {
        SubmitOutcome::Succeeded => {
            println!("Message sent successfully!");
            Ok(true)
        }
        SubmitOutcome::Invalid(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("{field}: {message}");
            }
            Ok(false)
        }
        SubmitOutcome::Busy | SubmitOutcome::Failed => {
            eprintln!("{FAILURE_MESSAGE}");
            Ok(false)
        }
    }
}
