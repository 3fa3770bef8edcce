use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An email address a contact form accepts.
///
/// On top of lettre's RFC parsing, only plain `local@domain.tld` addresses are
/// allowed: the local part is unquoted and limited to letters, digits and
/// `_ ' + - .`, and the domain is a dotted host name ending in an alphabetic
/// top level domain of at least two letters. IP literals are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(lettre::Address);

#[derive(Debug, Error)]
pub enum EmailAddressError {
    #[error(transparent)]
    Invalid(#[from] lettre::address::AddressError),
    #[error("Email address must be of the form local@domain.tld")]
    Unsupported,
}

impl EmailAddress {
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EmailAddress {
    type Err = EmailAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let address = s.parse::<lettre::Address>()?;
        if !is_plain_local_part(address.user()) || !is_host_name(address.domain()) {
            return Err(EmailAddressError::Unsupported);
        }
        Ok(Self(address))
    }
}

impl TryFrom<&str> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailAddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0.to_string()
    }
}

fn is_plain_local_part(user: &str) -> bool {
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '\'' | '+' | '-' | '.');

    !user.is_empty()
        && user.chars().all(allowed)
        && !user.starts_with('.')
        && !user.contains("..")
        && !user.ends_with(['.', '\''])
}

fn is_host_name(domain: &str) -> bool {
    let Some((labels, tld)) = domain.rsplit_once('.') else {
        return false;
    };

    let valid_label = |label: &str| {
        label.starts_with(|c: char| c.is_ascii_alphanumeric())
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    };

    tld.len() >= 2
        && tld.chars().all(|c| c.is_ascii_alphabetic())
        && labels.split('.').all(valid_label)
}
