//! Image reference loading and encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use regen_core::{RegenError, Result};
use std::path::PathBuf;

use crate::transport::ContentPart;

/// MIME type assumed when the file extension gives no better answer.
const FALLBACK_MIME: &str = "image/jpeg";

/// A reference to image bytes to analyze.
///
/// Format conversion (base64 inline payload with an explicit MIME type) is
/// the client's responsibility; callers hand over a path or raw bytes.
#[derive(Debug, Clone)]
pub enum ImageRef {
    /// Image on the local filesystem; MIME is guessed from the extension.
    Path(PathBuf),
    /// In-memory image bytes with an explicit MIME type.
    Bytes { bytes: Vec<u8>, mime_type: String },
}

impl ImageRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self::Bytes {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Loads the bytes and encodes them as an inline base64 content part.
    pub async fn to_part(&self) -> Result<ContentPart> {
        let (bytes, mime_type) = match self {
            Self::Path(path) => {
                let bytes = tokio::fs::read(path).await.map_err(|err| {
                    RegenError::io(format!("Failed to read image {}: {}", path.display(), err))
                })?;
                let mime_type = mime_guess::from_path(path)
                    .first()
                    .map(|mime| mime.essence_str().to_string())
                    .unwrap_or_else(|| FALLBACK_MIME.to_string());
                (bytes, mime_type)
            }
            Self::Bytes { bytes, mime_type } => (bytes.clone(), mime_type.clone()),
        };

        Ok(ContentPart::InlineImage {
            mime_type,
            data: BASE64_STANDARD.encode(bytes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_bytes_are_base64_encoded() {
        let image = ImageRef::bytes(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        let part = image.to_part().await.unwrap();
        match part {
            ContentPart::InlineImage { mime_type, data } => {
                assert_eq!(mime_type, "image/jpeg");
                assert_eq!(data, BASE64_STANDARD.encode([0xFF, 0xD8, 0xFF]));
            }
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_path_guesses_mime_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bottle.png");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"not-really-a-png").unwrap();

        let part = ImageRef::path(&path).to_part().await.unwrap();
        match part {
            ContentPart::InlineImage { mime_type, .. } => assert_eq!(mime_type, "image/png"),
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unknown_extension_falls_back_to_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capture");
        std::fs::write(&path, b"bytes").unwrap();

        let part = ImageRef::path(&path).to_part().await.unwrap();
        match part {
            ContentPart::InlineImage { mime_type, .. } => assert_eq!(mime_type, FALLBACK_MIME),
            other => panic!("unexpected part: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let err = ImageRef::path("/nonexistent/photo.jpg").to_part().await.unwrap_err();
        assert!(matches!(err, RegenError::Io { .. }));
    }
}
