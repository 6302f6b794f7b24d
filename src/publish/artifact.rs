use std::fmt;
use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use super::PublishPayload;
use crate::error::{Error, Result};

/// Error-correction level for every published code (about 30% recovery).
pub const ERROR_CORRECTION: EcLevel = EcLevel::H;

/// Smallest edge, in pixels, of an exported PNG.
pub const EXPORT_MIN_PIXELS: u32 = 256;

const FILE_PREFIX: &str = "anandwan-qr-";

/// A rendered QR code and the title it is displayed under.
#[derive(Clone)]
pub struct PublishedArtifact {
    payload: PublishPayload,
    text: String,
    code: QrCode,
}

impl fmt::Debug for PublishedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishedArtifact")
            .field("title", &self.payload.title)
            .field("created_by", &self.payload.created_by)
            .field("text_len", &self.text.len())
            .field("width", &self.code.width())
            .finish()
    }
}

impl PublishedArtifact {
    pub fn title(&self) -> &str {
        &self.payload.title
    }

    pub fn created_by(&self) -> &str {
        &self.payload.created_by
    }

    pub fn payload(&self) -> &PublishPayload {
        &self.payload
    }

    /// Exactly the text stored in the code.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Modules per side, quiet zone excluded.
    pub fn width(&self) -> usize {
        self.code.width()
    }

    /// Renders the code as a PNG named after the title.
    pub fn export(&self) -> Result<ExportedFile> {
        let image = self
            .code
            .render::<Luma<u8>>()
            .quiet_zone(true)
            .min_dimensions(EXPORT_MIN_PIXELS, EXPORT_MIN_PIXELS)
            .build();

        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(image)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| Error::Render(e.to_string()))?;

        Ok(ExportedFile {
            file_name: export_file_name(&self.payload.title),
            bytes,
        })
    }
}

/// A PNG ready to be handed to the visitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub const CONTENT_TYPE: &'static str = "image/png";
}

/// Encodes `payload` as a QR code at [`ERROR_CORRECTION`].
///
/// Fails with [`Error::Capacity`] when the canonical text does not fit in
/// the largest code at that level.
pub fn encode(payload: &PublishPayload) -> Result<PublishedArtifact> {
    let text = payload
        .to_canonical_json()
        .map_err(|e| Error::Render(e.to_string()))?;

    let code = QrCode::with_error_correction_level(text.as_bytes(), ERROR_CORRECTION).map_err(|e| match e {
        QrError::DataTooLong => Error::Capacity(format!(
            "Content is too long to fit in a QR code ({} bytes encoded); shorten it and try again",
            text.len()
        )),
        other => Error::Render(other.to_string()),
    })?;

    debug!(title = %payload.title, bytes = text.len(), modules = code.width(), "encoded QR payload");

    Ok(PublishedArtifact {
        payload: payload.clone(),
        text,
        code,
    })
}

/// `anandwan-qr-<slug>.png`, where the slug is the title with whitespace
/// runs turned into `-` and lowercased.
pub fn export_file_name(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
        } else {
            slug.extend(ch.to_lowercase());
            in_space = false;
        }
    }

    if slug.is_empty() {
        slug.push_str("code");
    }
    format!("{FILE_PREFIX}{slug}.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_follow_the_title() {
        assert_eq!(export_file_name("Clinic Hours"), "anandwan-qr-clinic-hours.png");
        assert_eq!(export_file_name("Baba  Amte\tMemorial"), "anandwan-qr-baba-amte-memorial.png");
        assert_eq!(export_file_name(""), "anandwan-qr-code.png");
    }
}
