use portfolio_models::contact::{ContactFieldErrors, ContactFormFields};
use serde::{Deserialize, Serialize};

/// Raw form values as typed by the visitor. Validation happens after
/// deserialization so every invalid field can be reported at once.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl From<ApiContactForm> for ContactFormFields {
    fn from(value: ApiContactForm) -> Self {
        Self {
            name: value.name,
            email: value.email,
            subject: value.subject,
            message: value.message,
        }
    }
}

#[derive(Serialize)]
pub struct ApiInvalidContactForm {
    pub detail: &'static str,
    pub errors: ContactFieldErrors,
}
