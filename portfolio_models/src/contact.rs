use std::collections::BTreeMap;

use nutype::nutype;
use serde::{Deserialize, Serialize};

use crate::email_address::EmailAddress;

/// The raw values of a contact form, exactly as typed by the user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFormFields {
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
}

/// A contact form submission whose fields have all passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactSubmission {
    pub name: ContactName,
    pub email: EmailAddress,
    pub subject: ContactSubject,
    pub message: ContactMessageBody,
}

#[nutype(
    validate(len_char_min = 2, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactName(String);

#[nutype(
    validate(len_char_min = 5, len_char_max = 256),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactSubject(String);

#[nutype(
    validate(len_char_min = 10, len_char_max = 3000),
    derive(Debug, Clone, PartialEq, Eq, TryFrom, Deref, Serialize, Deserialize)
)]
pub struct ContactMessageBody(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactField {
    Name,
    Email,
    Subject,
    Message,
}

impl ContactField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Email, Self::Subject, Self::Message];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Subject => "subject",
            Self::Message => "message",
        }
    }
}

impl std::fmt::Display for ContactField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human readable validation messages, keyed by the field they belong to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ContactFieldErrors(BTreeMap<ContactField, &'static str>);

impl ContactFieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: ContactField) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, &'static str)> + '_ {
        self.0.iter().map(|(&field, &message)| (field, message))
    }

    fn insert(&mut self, field: ContactField, message: &'static str) {
        self.0.insert(field, message);
    }
}

impl std::fmt::Display for ContactFieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

impl ContactFormFields {
    /// Checks all four fields and reports every invalid one at once.
    pub fn validate(&self) -> Result<ContactSubmission, ContactFieldErrors> {
        let mut errors = ContactFieldErrors::default();

        let name = ContactName::try_new(self.name.clone())
            .map_err(|err| {
                errors.insert(
                    ContactField::Name,
                    match err {
                        ContactNameError::LenCharMinViolated => {
                            "Name must be at least 2 characters"
                        }
                        ContactNameError::LenCharMaxViolated => {
                            "Name must be at most 256 characters"
                        }
                    },
                )
            })
            .ok();

        let email = self
            .email
            .parse::<EmailAddress>()
            .map_err(|_| errors.insert(ContactField::Email, "Please enter a valid email address"))
            .ok();

        let subject = ContactSubject::try_new(self.subject.clone())
            .map_err(|err| {
                errors.insert(
                    ContactField::Subject,
                    match err {
                        ContactSubjectError::LenCharMinViolated => {
                            "Subject must be at least 5 characters"
                        }
                        ContactSubjectError::LenCharMaxViolated => {
                            "Subject must be at most 256 characters"
                        }
                    },
                )
            })
            .ok();

        let message = ContactMessageBody::try_new(self.message.clone())
            .map_err(|err| {
                errors.insert(
                    ContactField::Message,
                    match err {
                        ContactMessageBodyError::LenCharMinViolated => {
                            "Message must be at least 10 characters"
                        }
                        ContactMessageBodyError::LenCharMaxViolated => {
                            "Message must be at most 3000 characters"
                        }
                    },
                )
            })
            .ok();

        match (name, email, subject, message) {
            (Some(name), Some(email), Some(subject), Some(message)) => Ok(ContactSubmission {
                name,
                email,
                subject,
                message,
            }),
            _ => Err(errors),
        }
    }
}

impl From<ContactSubmission> for ContactFormFields {
    fn from(value: ContactSubmission) -> Self {
        Self {
            name: value.name.into_inner(),
            email: value.email.to_string(),
            subject: value.subject.into_inner(),
            message: value.message.into_inner(),
        }
    }
}
