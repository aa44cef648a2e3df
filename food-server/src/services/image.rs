//! Image upload validation
//!
//! Shared by the generic upload endpoint and the avatar endpoint.

use std::path::Path;

use crate::utils::{AppError, ErrorCode};

/// Maximum file size (5MB)
pub const MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Supported image formats
pub const SUPPORTED_FORMATS: &[&str] = &["png", "jpg", "jpeg", "webp"];

/// A validated image, ready for the blob store
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub original_name: String,
    /// Lowercased extension
    pub extension: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    /// Validate an uploaded file
    ///
    /// Checks, in order: filename present, non-empty, size, extension,
    /// and that the bytes actually decode as an image.
    pub fn validate(original_name: Option<String>, bytes: Vec<u8>) -> Result<Self, AppError> {
        let original_name = original_name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;

        if bytes.is_empty() {
            return Err(AppError::new(ErrorCode::FileEmpty));
        }
        if bytes.len() > MAX_FILE_SIZE {
            return Err(AppError::with_message(
                ErrorCode::FileTooLarge,
                format!(
                    "File too large. Maximum size is {}MB",
                    MAX_FILE_SIZE / 1024 / 1024
                ),
            )
            .with_detail("max_bytes", MAX_FILE_SIZE)
            .with_detail("size", bytes.len()));
        }

        let extension = Path::new(&original_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if !SUPPORTED_FORMATS.contains(&extension.as_str()) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                format!(
                    "Unsupported file format '{extension}'. Supported: {}",
                    SUPPORTED_FORMATS.join(", ")
                ),
            ));
        }

        if let Err(e) = image::load_from_memory(&bytes) {
            return Err(AppError::with_message(
                ErrorCode::InvalidImageFile,
                format!("Invalid image file ({extension}): {e}"),
            ));
        }

        let content_type = mime_guess::from_ext(&extension)
            .first_or_octet_stream()
            .to_string();

        Ok(Self {
            original_name,
            extension,
            content_type,
            bytes,
        })
    }
}

#[cfg(test)]
pub(crate) fn tiny_png() -> Vec<u8> {
    let mut buffer = std::io::Cursor::new(Vec::new());
    image::RgbImage::new(2, 2)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .unwrap();
    buffer.into_inner()
}
