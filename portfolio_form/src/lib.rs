//! Client side state machine of the contact form.
//!
//! A [`ContactFormController`] owns the values, validation errors and
//! submission state of one form instance. It validates input, dispatches at
//! most one submission at a time through a [`ContactService`] and shows the
//! result for a fixed display window before returning to
//! [`SubmissionState::Idle`].

use std::{sync::Arc, time::Duration};

use portfolio_core_contact_contracts::ContactService;
pub use portfolio_models::contact::{
    ContactField, ContactFieldErrors, ContactFormFields, ContactSubmission,
};
use tokio::{
    sync::{mpsc, oneshot, watch},
    task::JoinHandle,
};

use crate::task::{Event, FormTask};

mod task;

/// The only failure text ever shown to the user. Transport details stay in
/// the logs.
pub const FAILURE_MESSAGE: &str = "Failed to send message. Please try again.";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed {
        message: &'static str,
    },
}

/// Everything the presentation layer needs to render the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFormSnapshot {
    pub fields: ContactFormFields,
    pub errors: ContactFieldErrors,
    pub state: SubmissionState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Validation failed, nothing was dispatched.
    Invalid(ContactFieldErrors),
    /// Another submission is still in flight, nothing was dispatched.
    Busy,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactFormConfig {
    /// How long a success or failure result stays visible.
    pub result_display: Duration,
}

impl Default for ContactFormConfig {
    fn default() -> Self {
        Self {
            result_display: Duration::from_secs(5),
        }
    }
}

/// Validates the raw form fields without touching any form instance.
pub fn validate(fields: &ContactFormFields) -> Result<ContactSubmission, ContactFieldErrors> {
    fields.validate()
}

/// Handle to one contact form instance.
///
/// Clones share the same instance. The instance is torn down once the last
/// handle is dropped: its display timer is cancelled and the result of a
/// dispatch still in flight is discarded.
#[derive(Debug, Clone)]
pub struct ContactFormController {
    events: mpsc::UnboundedSender<Event>,
    snapshot: watch::Receiver<ContactFormSnapshot>,
    _task: Arc<TaskGuard>,
}

impl ContactFormController {
    /// Starts a new form instance on the current tokio runtime.
    pub fn spawn<Contact: ContactService>(contact: Contact, config: ContactFormConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(ContactFormSnapshot::default());

        let task = FormTask::new(
            Arc::new(contact),
            config,
            events_tx.downgrade(),
            events_rx,
            snapshot_tx,
        );
        let handle = tokio::spawn(task.run());

        Self {
            events: events_tx,
            snapshot: snapshot_rx,
            _task: Arc::new(TaskGuard(handle)),
        }
    }

    pub fn snapshot(&self) -> ContactFormSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ContactFormSnapshot> {
        self.snapshot.clone()
    }

    /// Updates a single field. Edits are accepted in every state, including
    /// while a submission is in flight.
    pub fn set_field(&self, field: ContactField, value: impl Into<String>) {
        let event = Event::SetField {
            field,
            value: value.into(),
        };
        if self.events.send(event).is_err() {
            tracing::error!("contact form task is gone");
        }
    }

    /// Submits the given field values and waits for the result.
    ///
    /// Returns [`SubmitOutcome::Busy`] right away if a submission is already
    /// in flight.
    pub async fn submit(&self, fields: ContactFormFields) -> SubmitOutcome {
        let (reply, outcome) = oneshot::channel();
        if self.events.send(Event::Submit { fields, reply }).is_err() {
            tracing::error!("contact form task is gone");
            return SubmitOutcome::Failed;
        }
        outcome.await.unwrap_or(SubmitOutcome::Failed)
    }
}

#[derive(Debug)]
struct TaskGuard(JoinHandle<()>);

impl Drop for TaskGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

#[cfg(test)]
mod tests;
