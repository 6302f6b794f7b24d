//! QR content publishing.
//!
//! Staff turn a title, a body and an optional image into a QR code for
//! campus signage. The flow is always [`build_payload`] → [`encode`] →
//! [`PublishedArtifact::export`]; [`PublishingPipeline`] strings the steps
//! together behind the [`SessionGate`].

mod artifact;
mod attachment;
mod payload;

use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::error::{Error, Result};
use crate::intake::PublishDraft;
use crate::session_gate::SessionGate;

pub use artifact::{encode, export_file_name, ExportedFile, PublishedArtifact, ERROR_CORRECTION, EXPORT_MIN_PIXELS};
pub use attachment::ImageAttachment;
pub use payload::{build_payload, PublishPayload};

/// Staff-only QR generation with the current attachment and artifact.
///
/// Failed operations leave the attachment and the previous artifact as they
/// were. A new artifact replaces the old one; there is no history.
#[derive(Debug)]
pub struct PublishingPipeline {
    gate: SessionGate,
    max_image_bytes: usize,
    image: Option<ImageAttachment>,
    artifact: Option<PublishedArtifact>,
}

impl PublishingPipeline {
    pub fn new(gate: SessionGate, max_image_bytes: usize) -> Self {
        Self {
            gate,
            max_image_bytes,
            image: None,
            artifact: None,
        }
    }

    pub fn attach_image(&mut self, bytes: Vec<u8>) -> Result<&ImageAttachment> {
        let attachment = ImageAttachment::from_bytes(bytes, self.max_image_bytes)?;
        Ok(&*self.image.insert(attachment))
    }

    pub async fn attach_image_file(&mut self, path: impl AsRef<Path>) -> Result<&ImageAttachment> {
        let attachment = ImageAttachment::read(path, self.max_image_bytes).await?;
        Ok(&*self.image.insert(attachment))
    }

    pub fn clear_image(&mut self) {
        self.image = None;
    }

    pub fn image(&self) -> Option<&ImageAttachment> {
        self.image.as_ref()
    }

    /// Builds, validates and encodes a new artifact from `draft`.
    pub fn generate(&mut self, draft: &PublishDraft) -> Result<&PublishedArtifact> {
        let principal = self.gate.principal().ok_or(Error::Unauthenticated)?;

        let payload = build_payload(draft, self.image.is_some(), &principal, Utc::now())?;
        let artifact = encode(&payload)?;

        info!(
            principal = %principal,
            title = %payload.title,
            has_image = payload.has_image,
            "QR code generated"
        );
        Ok(&*self.artifact.insert(artifact))
    }

    /// Re-encodes a payload generated earlier in the same staff session.
    ///
    /// Payloads minted by anyone other than the current principal are
    /// ignored, as if the artifact had expired with its session.
    pub fn resume(&mut self, payload: &PublishPayload) -> Result<()> {
        if self.gate.principal().as_deref() == Some(payload.created_by.as_str()) {
            self.artifact = Some(encode(payload)?);
        }
        Ok(())
    }

    /// The current artifact, if the session that generated it is still open.
    pub fn artifact(&self) -> Option<&PublishedArtifact> {
        let principal = self.gate.principal()?;
        self.artifact
            .as_ref()
            .filter(|artifact| artifact.created_by() == principal)
    }

    pub fn can_export(&self) -> bool {
        self.artifact().is_some()
    }

    /// Exports the current artifact. Unavailable until one has been generated.
    pub fn export(&self) -> Result<ExportedFile> {
        let artifact = self.artifact().ok_or(Error::ExportUnavailable)?;
        let file = artifact.export()?;
        info!(file_name = %file.file_name, bytes = file.bytes.len(), "QR code exported");
        Ok(file)
    }
}
