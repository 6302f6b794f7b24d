use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{check_identity, rules, FieldErrors, IntakeSchema, PersistedSchema, ValidationContext};
use crate::storage::Partition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Skill {
    Medical,
    Teaching,
    Creative,
    Tech,
    Manual,
}

/// Volunteer sign-up form as typed by the visitor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolunteerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skill: String,
    /// `YYYY-MM-DD`, or a full RFC 3339 timestamp as older clients sent.
    pub availability_date: String,
    pub duration: String,
    pub notes: String,
}

impl Default for VolunteerDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            skill: Skill::Medical.to_string(),
            availability_date: String::new(),
            duration: String::new(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volunteer {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub skill: Skill,
    pub availability_date: NaiveDate,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

pub struct VolunteerSchema;

impl IntakeSchema for VolunteerSchema {
    type Draft = VolunteerDraft;
    type Valid = Volunteer;

    fn validate(draft: &VolunteerDraft, ctx: &ValidationContext) -> Result<Volunteer, FieldErrors> {
        let mut errors = FieldErrors::default();

        check_identity(&mut errors, &draft.name, &draft.email, &draft.phone);
        let skill = rules::one_of::<Skill>(&mut errors, "skill", &draft.skill);
        let availability_date =
            rules::date_from(&mut errors, "availabilityDate", &draft.availability_date, ctx.today);
        rules::required(
            &mut errors,
            "duration",
            &draft.duration,
            "Please specify your availability duration.",
        );

        let (Some(skill), Some(availability_date)) = (skill, availability_date) else {
            return Err(errors);
        };
        errors.check()?;

        let notes = draft.notes.trim();
        Ok(Volunteer {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            skill,
            availability_date,
            duration: draft.duration.trim().to_string(),
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

impl PersistedSchema for VolunteerSchema {
    const PARTITION: Partition = Partition::Volunteers;
}
