//! Base64 image payloads and data URLs

use crate::inference::Part;
use base64::{engine::general_purpose, Engine as _};
use xuanji_common::{Error, Result};

/// Inline request limit of the image endpoints
pub const MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

/// A validated base64 image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImagePayload {
    mime_type: String,
    data: String,
}

impl ImagePayload {
    /// Validate a MIME type and base64 body
    pub fn new(mime_type: &str, data: &str) -> Result<Self> {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        if !mime_type.starts_with("image/") || mime_type.len() <= "image/".len() {
            return Err(Error::InvalidInput(format!(
                "Unsupported image type: {}",
                mime_type
            )));
        }

        let data: String = data.split_whitespace().collect();
        if data.is_empty() {
            return Err(Error::InvalidInput("Image data is empty".to_string()));
        }

        let decoded = general_purpose::STANDARD
            .decode(&data)
            .map_err(|e| Error::InvalidInput(format!("Image data is not valid base64: {}", e)))?;
        if decoded.len() > MAX_IMAGE_BYTES {
            return Err(Error::InvalidInput(format!(
                "Image is {} bytes; limit is {}",
                decoded.len(),
                MAX_IMAGE_BYTES
            )));
        }

        Ok(Self { mime_type, data })
    }

    /// Parse `data:<mime>;base64,<body>`
    pub fn from_data_url(url: &str) -> Result<Self> {
        let invalid = || Error::InvalidInput("Expected a data:<mime>;base64,<data> URL".to_string());

        let rest = url.trim().strip_prefix("data:").ok_or_else(invalid)?;
        let (header, body) = rest.split_once(',').ok_or_else(invalid)?;
        let mime_type = header.strip_suffix(";base64").ok_or_else(invalid)?;
        Self::new(mime_type, body)
    }

    /// Accept either a data URL, or a bare base64 body with a separate MIME type
    pub fn from_request(image: &str, mime_type: Option<&str>) -> Result<Self> {
        if image.trim_start().starts_with("data:") {
            Self::from_data_url(image)
        } else {
            Self::new(mime_type.unwrap_or("image/png"), image)
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    pub fn to_part(&self) -> Part {
        Part::InlineData {
            mime_type: self.mime_type.clone(),
            data: self.data.clone(),
        }
    }
}
