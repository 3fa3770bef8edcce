use std::future::Future;

use portfolio_models::contact::ContactFormFields;

#[cfg_attr(feature = "mock", mockall::automock)]
pub trait ContactRelayApiService: Send + Sync + 'static {
    /// Forwards the form fields to the contact relay server.
    fn send(
        &self,
        fields: ContactFormFields,
    ) -> impl Future<Output = anyhow::Result<ContactRelayResponse>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactRelayResponse {
    Accepted,
    Rejected { detail: String },
}

#[cfg(feature = "mock")]
impl MockContactRelayApiService {
    pub fn with_send(
        mut self,
        fields: ContactFormFields,
        result: Option<ContactRelayResponse>,
    ) -> Self {
        self.expect_send()
            .once()
            .with(mockall::predicate::eq(fields))
            .return_once(move |_| {
                Box::pin(std::future::ready(
                    result.ok_or_else(|| anyhow::anyhow!("connection refused")),
                ))
            });
        self
    }
}
