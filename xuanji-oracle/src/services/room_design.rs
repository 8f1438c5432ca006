//! Room photo editing through the image model

use super::image::ImagePayload;
use super::GenerationError;
use crate::inference::{InferenceClient, InferenceError, InferenceRequest};
use crate::prompts::room_edit_instruction;
use std::sync::Arc;
use tracing::info;
use xuanji_common::Error;

pub struct RoomDesigner {
    client: Arc<dyn InferenceClient>,
}

impl RoomDesigner {
    pub fn new(client: Arc<dyn InferenceClient>) -> Self {
        Self { client }
    }

    /// Apply a free-text edit to a room photo
    ///
    /// Returns the first image of the reply as a data URL, or
    /// `InferenceError::NoImage` when the reply carried none.
    pub async fn edit(&self, image: &ImagePayload, instruction: &str) -> Result<String, GenerationError> {
        if !self.client.has_credential() {
            return Err(InferenceError::MissingCredential.into());
        }
        if instruction.trim().is_empty() {
            return Err(Error::InvalidInput("Edit instruction is empty".to_string()).into());
        }

        let request = InferenceRequest::image_edit(image.to_part(), room_edit_instruction(instruction));
        let response = self.client.generate(request).await?;

        let (mime_type, data) = response.first_image().ok_or(InferenceError::NoImage)?;
        let edited = ImagePayload::new(mime_type, data).map_err(|e| {
            InferenceError::ParseError(format!("Model returned an unusable image: {}", e))
        })?;

        info!(mime = edited.mime_type(), "Room image edited");
        Ok(edited.to_data_url())
    }
}
