//! Form intake: schemas, validation and the submit state machine.
//!
//! Every form on the site goes through the same discipline. A draft is
//! validated as a whole (every failing field reported at once), a valid
//! draft is appended to the schema's partition, and the form then sits in
//! its submitted state until the visitor asks to submit another.

mod contact;
mod donation;
mod publish;
pub(crate) mod rules;
mod volunteer;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::storage::{Partition, SubmissionRecord, SubmissionStore};

pub use contact::{Contact, ContactDraft, ContactSchema, Subject};
pub use donation::{Donation, DonationDraft, DonationSchema, DonationType};
pub use publish::{PublishDraft, PublishFields, PublishSchema, CONTENT_MAX_CHARS, CONTENT_MIN_CHARS, TITLE_MIN_CHARS};
pub use volunteer::{Skill, Volunteer, VolunteerDraft, VolunteerSchema};

/// Per-field validation messages, keyed by the field's wire name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    /// Records `message` for `field` unless the field already has one.
    pub fn insert(&mut self, field: &str, message: &str) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// `Err(self)` when any field failed.
    pub fn check(self) -> std::result::Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Facts validation depends on that are not part of the draft.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext {
    pub today: NaiveDate,
}

impl ValidationContext {
    pub fn at(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn now() -> Self {
        Self::at(Local::now().date_naive())
    }
}

impl Default for ValidationContext {
    fn default() -> Self {
        Self::now()
    }
}

/// A declarative field schema.
///
/// Rules see the whole draft, so cross-field requirements (a donation
/// amount that is only required for money donations) are expressed here
/// rather than per field.
pub trait IntakeSchema {
    /// Raw, possibly invalid, form values.
    type Draft: Default + Clone + fmt::Debug;
    /// Typed values produced by a successful validation.
    type Valid: Serialize;

    fn validate(draft: &Self::Draft, ctx: &ValidationContext) -> std::result::Result<Self::Valid, FieldErrors>;
}

/// A schema whose valid submissions are appended to a store partition.
pub trait PersistedSchema: IntakeSchema {
    const PARTITION: Partition;
}

/// Where a form is in its lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum IntakeState {
    #[default]
    Entry,
    #[serde(rename_all = "camelCase")]
    Submitted { record_id: i64 },
}

/// Drives one form from entry through submission.
pub struct IntakeController<S: PersistedSchema> {
    store: SubmissionStore,
    draft: S::Draft,
    errors: FieldErrors,
    state: IntakeState,
}

impl<S: PersistedSchema> IntakeController<S> {
    pub fn new(store: SubmissionStore) -> Self {
        Self::resume(store, IntakeState::Entry)
    }

    /// Picks a form back up in a previously saved state with an empty draft.
    pub fn resume(store: SubmissionStore, state: IntakeState) -> Self {
        Self {
            store,
            draft: S::Draft::default(),
            errors: FieldErrors::default(),
            state,
        }
    }

    pub fn draft(&self) -> &S::Draft {
        &self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn state(&self) -> IntakeState {
        self.state
    }

    /// Applies `change` to the draft and re-runs validation over the whole
    /// draft, so errors follow fields that appear or disappear with it.
    pub fn edit(&mut self, ctx: &ValidationContext, change: impl FnOnce(&mut S::Draft)) -> &FieldErrors {
        change(&mut self.draft);
        self.errors = match S::validate(&self.draft, ctx) {
            Ok(_) => FieldErrors::default(),
            Err(errors) => errors,
        };
        &self.errors
    }

    pub fn validate(&self, ctx: &ValidationContext) -> std::result::Result<S::Valid, FieldErrors> {
        S::validate(&self.draft, ctx)
    }

    /// Validates the draft and appends it to the schema's partition.
    ///
    /// Nothing is written unless validation passes. On any failure the
    /// draft is left as it was so the visitor can correct it.
    pub async fn submit(&mut self, ctx: &ValidationContext) -> Result<SubmissionRecord> {
        if let IntakeState::Submitted { .. } = self.state {
            return Err(Error::AlreadySubmitted);
        }

        let valid = match S::validate(&self.draft, ctx) {
            Ok(valid) => valid,
            Err(errors) => {
                debug!(partition = %S::PARTITION, fields = %errors, "submission rejected");
                self.errors = errors.clone();
                return Err(Error::Validation(errors));
            }
        };
        self.errors = FieldErrors::default();

        let fields = to_field_map(&valid)?;
        let record = self
            .store
            .append(S::PARTITION, SubmissionRecord::new(fields, Utc::now()))
            .await?;

        self.state = IntakeState::Submitted {
            record_id: record.id,
        };
        Ok(record)
    }

    /// Leaves the submitted state with a cleared draft.
    pub fn submit_another(&mut self) {
        self.draft = S::Draft::default();
        self.errors = FieldErrors::default();
        self.state = IntakeState::Entry;
    }
}

fn to_field_map<T: Serialize>(valid: &T) -> Result<serde_json::Map<String, serde_json::Value>> {
    match serde_json::to_value(valid) {
        Ok(serde_json::Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::Storage(format!(
            "submission must serialize to an object, got {other}"
        ))),
        Err(e) => Err(Error::Storage(e.to_string())),
    }
}

/// Shared name/email/phone block used by every public form.
pub(crate) fn check_identity(errors: &mut FieldErrors, name: &str, email: &str, phone: &str) {
    rules::min_chars(errors, "name", name.trim(), 2, "Name must be at least 2 characters.");
    rules::email(errors, "email", email);
    rules::phone(errors, "phone", phone);
}
