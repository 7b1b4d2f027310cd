use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::StudioError;

/// An uploaded or generated image.
///
/// Immutable once created; a new upload supersedes the old asset rather than
/// mutating it. The base64 form is derived at construction so request
/// assembly never re-encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    bytes: Vec<u8>,
    mime_type: String,
    base64: String,
}

impl ImageAsset {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        let base64 = BASE64.encode(&bytes);
        Self {
            bytes,
            mime_type: mime_type.into(),
            base64,
        }
    }

    /// Build an asset from the base64 payload of a model response part.
    pub fn from_base64(data: &str, mime_type: impl Into<String>) -> Result<Self, StudioError> {
        let bytes = BASE64
            .decode(data)
            .map_err(|e| StudioError::InvalidResponse(format!("invalid base64 image data: {}", e)))?;
        Ok(Self {
            bytes,
            mime_type: mime_type.into(),
            base64: data.to_string(),
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn base64(&self) -> &str {
        &self.base64
    }
}

/// Declared media type for a file, from its extension.
///
/// Returns `None` for anything that is not a known image kind; callers must
/// reject those before reading any bytes.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Some("image/png"),
        Some("jpg") | Some("jpeg") => Some("image/jpeg"),
        Some("webp") => Some("image/webp"),
        Some("gif") => Some("image/gif"),
        _ => None,
    }
}

/// Load a file and encode it as an [`ImageAsset`].
///
/// Fails with `UnsupportedMedia` before any read when the declared type is
/// not an image kind, and with `MediaRead` when the read itself fails.
pub async fn encode_file(path: &Path) -> Result<ImageAsset, StudioError> {
    let mime_type = mime_for_path(path).ok_or_else(|| {
        StudioError::UnsupportedMedia(
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| format!(".{}", e))
                .unwrap_or_else(|| path.display().to_string()),
        )
    })?;

    let bytes = fs::read(path)
        .await
        .map_err(|e| StudioError::MediaRead(format!("{}: {}", path.display(), e)))?;

    Ok(ImageAsset::new(bytes, mime_type))
}

/// Fixed download filename for the generate and clean-up flows.
pub const STUDIO_FILENAME: &str = "studio_photo.png";
/// Fixed download filename for the edit flow.
pub const EDITED_FILENAME: &str = "edited_photo.png";

/// Write an asset's decoded bytes into `output_dir` under `filename`.
pub async fn save_image(
    asset: &ImageAsset,
    output_dir: &Path,
    filename: &str,
) -> Result<PathBuf, StudioError> {
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(filename);
    fs::write(&path, asset.bytes()).await?;
    tracing::info!("Saved image to: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_mapping_is_case_insensitive() {
        assert_eq!(mime_for_path(Path::new("a.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("a.webp")), Some("image/webp"));
    }

    #[test]
    fn non_image_types_are_rejected() {
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("archive.tar.gz")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[test]
    fn base64_is_derived_on_construction() {
        let asset = ImageAsset::new(vec![1, 2, 3], "image/png");
        assert_eq!(asset.base64(), "AQID");
        assert_eq!(asset.mime_type(), "image/png");
    }

    #[test]
    fn from_base64_round_trips() {
        let asset = ImageAsset::from_base64("AQID", "image/jpeg").unwrap();
        assert_eq!(asset.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn from_base64_rejects_garbage() {
        let err = ImageAsset::from_base64("not base64!!", "image/png").unwrap_err();
        assert!(matches!(err, StudioError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn encode_rejects_unsupported_type_before_reading() {
        // The path does not exist; the type check must fire first.
        let err = encode_file(Path::new("/definitely/missing/file.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::UnsupportedMedia(_)));
    }

    #[tokio::test]
    async fn encode_reports_read_failure() {
        let err = encode_file(Path::new("/definitely/missing/file.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::MediaRead(_)));
    }

    #[tokio::test]
    async fn encode_reads_and_encodes() {
        let dir = std::env::temp_dir().join("studio-photo-test-media");
        tokio::fs::create_dir_all(&dir).await.unwrap();
        let path = dir.join("pixel.png");
        tokio::fs::write(&path, [0x89, 0x50, 0x4E, 0x47]).await.unwrap();

        let asset = encode_file(&path).await.unwrap();
        assert_eq!(asset.mime_type(), "image/png");
        assert_eq!(asset.bytes(), &[0x89, 0x50, 0x4E, 0x47]);

        let saved = save_image(&asset, &dir, STUDIO_FILENAME).await.unwrap();
        assert_eq!(saved.file_name().unwrap(), STUDIO_FILENAME);
        assert_eq!(tokio::fs::read(&saved).await.unwrap(), asset.bytes());
    }
}
