use std::future::Future;

use portfolio_models::contact::ContactSubmission;
use thiserror::Error;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactService: Send + Sync + 'static {
    /// Delivers a validated contact form submission to its recipient.
    fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> impl Future<Output = Result<(), ContactSendMessageError>> + Send;
}

#[derive(Debug, Error)]
pub enum ContactSendMessageError {
    /// The transport was reachable but did not accept the message.
    #[error("Failed to send message.")]
    Send,
    /// The transport could not be reached or answered with garbage.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(feature = "mock")]
impl MockContactService {
    pub fn with_send_message(
        mut self,
        submission: ContactSubmission,
        result: Result<(), ContactSendMessageError>,
    ) -> Self {
        self.expect_send_message()
            .once()
            .with(mockall::predicate::eq(submission))
            .return_once(move |_| Box::pin(std::future::ready(result)));
        self
    }
}
