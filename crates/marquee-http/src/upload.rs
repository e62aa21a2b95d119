//! Image upload.

use tracing::{info, instrument};

use marquee_core::Result;
use marquee_core::error::{AuthError, DecodeError};

use crate::authed::AuthenticatedClient;
use crate::client::{ApiRequest, ImageUpload};
use crate::endpoints::{UPLOAD_IMAGE, image_url};

/// Multipart form field the backend reads the file from.
pub const IMAGE_FIELD: &str = "image";

/// Uploads poster images and returns their public URL.
#[derive(Debug, Clone)]
pub struct UploadService {
    client: AuthenticatedClient,
}

impl UploadService {
    pub fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Upload an image and return the URL the backend stored it at.
    ///
    /// # Errors
    ///
    /// - [`AuthError::NotAuthenticated`] without sending anything if no
    ///   access token is held
    /// - [`DecodeError::MissingField`] if the response names no URL
    #[instrument(skip(self, bytes), fields(len = bytes.len()))]
    pub async fn upload_image(
        &self,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String> {
        if self.client.store().access_token().is_none() {
            return Err(AuthError::NotAuthenticated.into());
        }

        let request = ApiRequest::post(UPLOAD_IMAGE).image(ImageUpload {
            field: IMAGE_FIELD.to_string(),
            file_name: file_name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        let response = self.client.send(&request).await?;

        let url = image_url(&response.value()?).ok_or(DecodeError::MissingField("imageUrl"))?;
        info!(url = %url, "Image uploaded");
        Ok(url)
    }
}
