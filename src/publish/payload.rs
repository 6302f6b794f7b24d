use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::intake::{FieldErrors, IntakeSchema, PublishDraft, PublishSchema, ValidationContext};

/// The text embedded in a published QR code.
///
/// Field order is the wire order. The image itself is never part of the
/// payload, only whether one was attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishPayload {
    pub title: String,
    pub content: String,
    pub has_image: bool,
    pub created_by: String,
    #[serde(with = "iso8601_millis")]
    pub created_at: DateTime<Utc>,
}

impl PublishPayload {
    /// Canonical compact JSON.
    pub fn to_canonical_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Validates `draft` against the publish schema and assembles a payload.
///
/// `created_at` is truncated to milliseconds, the precision of the wire
/// timestamp.
pub fn build_payload(
    draft: &PublishDraft,
    has_image: bool,
    principal: &str,
    now: DateTime<Utc>,
) -> Result<PublishPayload, FieldErrors> {
    let fields = PublishSchema::validate(draft, &ValidationContext::at(now.date_naive()))?;

    Ok(PublishPayload {
        title: fields.title,
        content: fields.content,
        has_image,
        created_by: principal.to_string(),
        created_at: now.trunc_subsecs(3),
    })
}

mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn canonical_json_has_fixed_key_order_and_millisecond_timestamp() {
        let now = Utc.with_ymd_and_hms(2026, 1, 26, 9, 30, 0).unwrap();
        let payload = build_payload(
            &PublishDraft::new("Clinic Hours", "c".repeat(50)),
            false,
            "anandwan",
            now,
        )
        .unwrap();

        let json = payload.to_canonical_json().unwrap();
        let expected = format!(
            r#"{{"title":"Clinic Hours","content":"{}","hasImage":false,"createdBy":"anandwan","createdAt":"2026-01-26T09:30:00.000Z"}}"#,
            "c".repeat(50)
        );
        assert_eq!(json, expected);
    }

    #[test]
    fn invalid_draft_never_becomes_a_payload() {
        let err = build_payload(&PublishDraft::new("Hi", "short"), true, "anandwan", Utc::now()).unwrap_err();
        assert!(err.contains("content"));
    }
}
