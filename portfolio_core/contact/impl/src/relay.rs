use portfolio_core_contact_contracts::{ContactSendMessageError, ContactService};
use portfolio_extern_contracts::relay::{ContactRelayApiService, ContactRelayResponse};
use portfolio_models::contact::ContactSubmission;

/// Dispatches contact form submissions through the contact relay server, so
/// the client never needs to hold transport credentials.
#[derive(Debug, Clone)]
pub struct ContactRelayServiceImpl<RelayApi> {
    relay_api: RelayApi,
}

impl<RelayApi> ContactRelayServiceImpl<RelayApi> {
    pub fn new(relay_api: RelayApi) -> Self {
        Self { relay_api }
    }
}

impl<RelayApi> ContactService for ContactRelayServiceImpl<RelayApi>
where
    RelayApi: ContactRelayApiService,
{
    async fn send_message(
        &self,
        submission: ContactSubmission,
    ) -> Result<(), ContactSendMessageError> {
        match self.relay_api.send(submission.into()).await? {
            ContactRelayResponse::Accepted => Ok(()),
            ContactRelayResponse::Rejected { detail } => {
                tracing::warn!(%detail, "contact relay rejected message");
                Err(ContactSendMessageError::Send)
            }
        }
    }
}
