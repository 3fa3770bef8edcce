use std::{future::pending, pin::Pin, sync::Arc};

use anyhow::anyhow;
use portfolio_core_contact_contracts::{ContactSendMessageError, ContactService};
use portfolio_models::contact::{ContactField, ContactFormFields, ContactSubmission};
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{sleep, Sleep},
};
use tracing::{debug, warn};

use crate::{
    ContactFormConfig, ContactFormSnapshot, SubmissionState, SubmitOutcome, FAILURE_MESSAGE,
};

#[derive(Debug)]
pub(crate) enum Event {
    SetField {
        field: ContactField,
        value: String,
    },
    Submit {
        fields: ContactFormFields,
        reply: oneshot::Sender<SubmitOutcome>,
    },
    Dispatched {
        result: Result<(), ContactSendMessageError>,
    },
}

enum Step {
    Event(Event),
    ResultDisplayElapsed,
}

/// Owns the state of one form instance. All mutations happen here, one
/// event at a time.
pub(crate) struct FormTask<Contact> {
    contact: Arc<Contact>,
    config: ContactFormConfig,
    events_tx: mpsc::WeakUnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    snapshot: watch::Sender<ContactFormSnapshot>,
    pending_reply: Option<oneshot::Sender<SubmitOutcome>>,
    result_display: Option<Pin<Box<Sleep>>>,
}

impl<Contact: ContactService> FormTask<Contact> {
    pub(crate) fn new(
        contact: Arc<Contact>,
        config: ContactFormConfig,
        events_tx: mpsc::WeakUnboundedSender<Event>,
        events_rx: mpsc::UnboundedReceiver<Event>,
        snapshot: watch::Sender<ContactFormSnapshot>,
    ) -> Self {
        Self {
            contact,
            config,
            events_tx,
            events_rx,
            snapshot,
            pending_reply: None,
            result_display: None,
        }
    }

    pub(crate) async fn run(mut self) {
        loop {
            let step = tokio::select! {
                event = self.events_rx.recv() => match event {
                    Some(event) => Step::Event(event),
                    None => break,
                },
                () = elapsed(self.result_display.as_mut()) => Step::ResultDisplayElapsed,
            };

            match step {
                Step::Event(Event::SetField { field, value }) => self.set_field(field, value),
                Step::Event(Event::Submit { fields, reply }) => self.submit(fields, reply),
                Step::Event(Event::Dispatched { result }) => self.dispatched(result),
                Step::ResultDisplayElapsed => self.reset_to_idle(),
            }
        }

        debug!("contact form closed");
    }

    fn state(&self) -> SubmissionState {
        self.snapshot.borrow().state
    }

    fn set_field(&mut self, field: ContactField, value: String) {
        self.snapshot.send_modify(|snapshot| {
            *field_mut(&mut snapshot.fields, field) = value;
            // once errors are shown they follow the input
            if !snapshot.errors.is_empty() {
                snapshot.errors = snapshot.fields.validate().err().unwrap_or_default();
            }
        });
    }

    fn submit(&mut self, fields: ContactFormFields, reply: oneshot::Sender<SubmitOutcome>) {
        if self.state() == SubmissionState::Submitting {
            debug!("submission already in flight, ignoring submit");
            let _ = reply.send(SubmitOutcome::Busy);
            return;
        }

        let submission = match fields.validate() {
            Ok(submission) => submission,
            Err(errors) => {
                debug!(%errors, "contact form is invalid");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.fields = fields;
                    snapshot.errors = errors.clone();
                });
                let _ = reply.send(SubmitOutcome::Invalid(errors));
                return;
            }
        };

        let Some(events) = self.events_tx.upgrade() else {
            debug!("contact form closed before dispatch");
            return;
        };

        self.result_display = None;
        self.pending_reply = Some(reply);
        self.snapshot.send_modify(|snapshot| {
            snapshot.fields = fields;
            snapshot.errors = Default::default();
            snapshot.state = SubmissionState::Submitting;
        });

        debug!("dispatching contact form submission");
        dispatch(Arc::clone(&self.contact), submission, events);
    }

    fn dispatched(&mut self, result: Result<(), ContactSendMessageError>) {
        let outcome = match result {
            Ok(()) => {
                debug!("contact form submission succeeded");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.fields = ContactFormFields::default();
                    snapshot.state = SubmissionState::Succeeded;
                });
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                warn!("failed to send contact message: {err:#}");
                self.snapshot.send_modify(|snapshot| {
                    snapshot.state = SubmissionState::Failed {
                        message: FAILURE_MESSAGE,
                    };
                });
                SubmitOutcome::Failed
            }
        };

        self.result_display = Some(Box::pin(sleep(self.config.result_display)));

        if let Some(reply) = self.pending_reply.take() {
            let _ = reply.send(outcome);
        }
    }

    fn reset_to_idle(&mut self) {
        self.result_display = None;
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = SubmissionState::Idle;
        });
    }
}

/// Runs the dispatch in its own task and reports the result back to the form
/// instance, unless the instance is gone by then.
fn dispatch<Contact: ContactService>(
    contact: Arc<Contact>,
    submission: ContactSubmission,
    events: mpsc::UnboundedSender<Event>,
) {
    let send = tokio::spawn(async move { contact.send_message(submission).await });

    tokio::spawn(async move {
        let result = send.await.unwrap_or_else(|err| {
            Err(ContactSendMessageError::Other(anyhow!(
                "contact dispatch task failed: {err}"
            )))
        });

        if events.send(Event::Dispatched { result }).is_err() {
            debug!("contact form closed while dispatching, discarding result");
        }
    });
}

async fn elapsed(timer: Option<&mut Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}

fn field_mut(fields: &mut ContactFormFields, field: ContactField) -> &mut String {
    match field {
        ContactField::Name => &mut fields.name,
        ContactField::Email => &mut fields.email,
        ContactField::Subject => &mut fields.subject,
        ContactField::Message => &mut fields.message,
    }
}
