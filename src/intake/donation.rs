use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::{check_identity, rules, FieldErrors, IntakeSchema, PersistedSchema, ValidationContext};
use crate::storage::Partition;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DonationType {
    Money,
    Clothes,
    Medical,
    Appliances,
}

/// Donation request form as typed by the visitor.
///
/// Only one of `amount` and `description` is shown at a time, depending on
/// `donation_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DonationDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub donation_type: String,
    pub address: String,
    pub amount: String,
    pub description: String,
}

impl Default for DonationDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            donation_type: DonationType::Money.to_string(),
            address: String::new(),
            amount: String::new(),
            description: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Donation {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub donation_type: DonationType,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub struct DonationSchema;

impl IntakeSchema for DonationSchema {
    type Draft = DonationDraft;
    type Valid = Donation;

    fn validate(draft: &DonationDraft, _ctx: &ValidationContext) -> Result<Donation, FieldErrors> {
        let mut errors = FieldErrors::default();

        check_identity(&mut errors, &draft.name, &draft.email, &draft.phone);
        let donation_type = rules::one_of::<DonationType>(&mut errors, "donationType", &draft.donation_type);
        rules::min_chars(
            &mut errors,
            "address",
            draft.address.trim(),
            10,
            "Please provide your complete address.",
        );

        // The revealed field is the required one; with an unknown type
        // neither is shown, so neither is checked.
        match donation_type {
            Some(DonationType::Money) => rules::required(
                &mut errors,
                "amount",
                &draft.amount,
                "Please enter a donation amount.",
            ),
            Some(_) => rules::required(
                &mut errors,
                "description",
                &draft.description,
                "Please describe the items you would like to donate.",
            ),
            None => {}
        }

        let Some(donation_type) = donation_type else {
            return Err(errors);
        };
        errors.check()?;

        let (amount, description) = if donation_type == DonationType::Money {
            (Some(draft.amount.trim().to_string()), None)
        } else {
            (None, Some(draft.description.trim().to_string()))
        };

        Ok(Donation {
            name: draft.name.trim().to_string(),
            email: draft.email.trim().to_string(),
            phone: draft.phone.trim().to_string(),
            donation_type,
            address: draft.address.trim().to_string(),
            amount,
            description,
        })
    }
}

impl PersistedSchema for DonationSchema {
    const PARTITION: Partition = Partition::Donations;
}
