use serde::{Deserialize, Serialize};

use super::{rules, FieldErrors, IntakeSchema, ValidationContext};

pub const TITLE_MIN_CHARS: usize = 2;
pub const CONTENT_MIN_CHARS: usize = 50;
/// Upper bound on QR body text. Keeps payloads near the QR capacity at
/// error-correction level H; the encoder still has the final say.
pub const CONTENT_MAX_CHARS: usize = 5000;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishDraft {
    pub title: String,
    pub content: String,
}

impl PublishDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishFields {
    pub title: String,
    pub content: String,
}

/// Title and body of a QR publish request. Not persisted.
pub struct PublishSchema;

impl IntakeSchema for PublishSchema {
    type Draft = PublishDraft;
    type Valid = PublishFields;

    fn validate(draft: &PublishDraft, _ctx: &ValidationContext) -> Result<PublishFields, FieldErrors> {
        let mut errors = FieldErrors::default();

        rules::min_chars(
            &mut errors,
            "title",
            &draft.title,
            TITLE_MIN_CHARS,
            "Title must be at least 2 characters.",
        );
        rules::min_chars(
            &mut errors,
            "content",
            &draft.content,
            CONTENT_MIN_CHARS,
            "Content must be at least 50 characters.",
        );
        rules::max_chars(
            &mut errors,
            "content",
            &draft.content,
            CONTENT_MAX_CHARS,
            "Content must not exceed 5000 characters.",
        );
        errors.check()?;

        Ok(PublishFields {
            title: draft.title.clone(),
            content: draft.content.clone(),
        })
    }
}
