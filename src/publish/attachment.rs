use std::path::Path;

use image::ImageFormat;

use crate::error::{Error, Result};

/// An image attached to a publish request.
///
/// Only its presence reaches the QR payload; the bytes stay here so the
/// staff member can preview what they attached.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    format: ImageFormat,
    bytes: Vec<u8>,
}

impl std::fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageAttachment {
    /// Accepts `bytes` if they are at most `max_bytes` long and look like a
    /// known image format.
    pub fn from_bytes(bytes: Vec<u8>, max_bytes: usize) -> Result<Self> {
        if bytes.len() > max_bytes {
            return Err(too_large(max_bytes));
        }

        let format = image::guess_format(&bytes).map_err(|e| Error::UnsupportedImage(e.to_string()))?;
        Ok(Self { format, bytes })
    }

    /// Reads an image from disk, checking its size before reading it.
    pub async fn read(path: impl AsRef<Path>, max_bytes: usize) -> Result<Self> {
        let path = path.as_ref();

        let len = tokio::fs::metadata(path).await.map_err(Error::ImageRead)?.len();
        if len > max_bytes as u64 {
            return Err(too_large(max_bytes));
        }

        let bytes = tokio::fs::read(path).await.map_err(Error::ImageRead)?;
        Self::from_bytes(bytes, max_bytes)
    }

    pub fn format(&self) -> ImageFormat {
        self.format
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

fn too_large(max_bytes: usize) -> Error {
    let mib = max_bytes / (1024 * 1024);
    if mib > 0 && max_bytes % (1024 * 1024) == 0 {
        Error::Capacity(format!("Image must be less than {mib}MB"))
    } else {
        Error::Capacity(format!("Image must be less than {max_bytes} bytes"))
    }
}
