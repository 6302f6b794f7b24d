use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{check_identity, rules, FieldErrors, IntakeSchema, PersistedSchema, ValidationContext};
use crate::storage::Partition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Subject {
    General,
    Volunteering,
    Donating,
    Awareness,
    Tech,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: String,
    pub message: String,
}

impl Default for ContactDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            subject: Subject::General.to_string(),
            message: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: Subject,
    pub message: String,
}

pub struct ContactSchema;

impl IntakeSchema for ContactSchema {
    type Draft = ContactDraft;
    type Valid = Contact;

    fn validate(draft: &ContactDraft, _ctx: &ValidationContext) -> Result<Contact, FieldErrors> {
        let mut errors = FieldErrors::default();

        check_identity(&mut errors, &draft.name, &draft.email, &draft.phone);
        let subject = rules::one_of::<Subject>(&mut errors, "subject", &draft.subject);
        rules::min_chars(
            &mut errors,
            "message",
            &draft.message,
            10,
            "Message must be at least 10 characters.",
        );

        let Some(subject) = subject else {
            return Err(errors);
        };
        errors.check()?;

        Ok(Contact {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            subject,
            message: draft.message.clone(),
        })
    }
}

impl PersistedSchema for ContactSchema {
    const PARTITION: Partition = Partition::Contacts;
}
