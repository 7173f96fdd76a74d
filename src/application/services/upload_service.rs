use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::models::media::{ConfigureResponse, UploadAck};
use crate::error::UploadError;
use crate::session::session::SessionContext;
use crate::transport::http_client::RequestDispatcher;
use crate::transport::model::{ApiRequest, MultipartPart};

/// Longest vendor body fragment kept on a rejection.
const FRAGMENT_LIMIT: usize = 512;

/// Two-phase media publishing: raw bytes first, then a configure call that
/// turns the upload into a post or story.
#[async_trait]
pub trait UploadService: Send + Sync {
    async fn upload_photo(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<ConfigureResponse, UploadError>;

    async fn upload_story(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<ConfigureResponse, UploadError>;
}

pub struct UploadServiceImpl<T: RequestDispatcher> {
    client: Arc<T>,
}

impl<T: RequestDispatcher> UploadServiceImpl<T> {
    pub fn new(client: Arc<T>) -> Self {
        Self { client }
    }

    /// Phase one: push the bytes and collect the upload id the configure
    /// step refers back to.
    async fn upload_raw(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
    ) -> Result<UploadAck, UploadError> {
        if photo.is_empty() {
            return Err(UploadError::EncodingFailed("empty photo payload".to_string()));
        }

        let upload_id = Utc::now().timestamp_millis().to_string();
        debug!("Uploading {} bytes as upload {upload_id}", photo.len());

        let request = ApiRequest::post("/create/upload/photo/").with_multipart(vec![
            MultipartPart::text("upload_id", &upload_id),
            MultipartPart::text("media_type", "1"),
            MultipartPart::bytes("photo", photo, "photo.jpg", "image/jpeg"),
        ]);
        let response = self.client.execute(context, request).await?;

        if !response.status.is_success() {
            return Err(vendor_rejection(response.status, response.text()));
        }
        let ack: UploadAck = response
            .json()
            .map_err(|_| vendor_rejection(response.status, response.text()))?;
        if ack.status.as_deref() != Some("ok") {
            return Err(vendor_rejection(response.status, response.text()));
        }
        Ok(ack)
    }

    /// Phase two: attach the caption and publish.
    async fn configure(
        &self,
        context: &SessionContext,
        path: &str,
        upload_id: &str,
        caption: &str,
    ) -> Result<ConfigureResponse, UploadError> {
        let request = ApiRequest::post(path).with_form(vec![
            ("upload_id".to_string(), upload_id.to_string()),
            ("caption".to_string(), caption.to_string()),
        ]);
        let response = self.client.execute(context, request).await?;

        if !response.status.is_success() {
            return Err(vendor_rejection(response.status, response.text()));
        }
        let configured: ConfigureResponse = response
            .json()
            .map_err(|_| vendor_rejection(response.status, response.text()))?;
        if configured.status.as_deref() != Some("ok") {
            return Err(vendor_rejection(response.status, response.text()));
        }
        Ok(configured)
    }
}

fn vendor_rejection(status: reqwest::StatusCode, body: &str) -> UploadError {
    let fragment: String = body.chars().take(FRAGMENT_LIMIT).collect();
    UploadError::VendorRejected { status, fragment }
}

#[async_trait]
impl<T: RequestDispatcher + 'static> UploadService for UploadServiceImpl<T> {
    async fn upload_photo(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<ConfigureResponse, UploadError> {
        info!("Uploading photo post");
        let ack = self.upload_raw(context, photo).await?;
        self.configure(context, "/create/configure/", &ack.upload_id, caption)
            .await
    }

    async fn upload_story(
        &self,
        context: &SessionContext,
        photo: Vec<u8>,
        caption: &str,
    ) -> Result<ConfigureResponse, UploadError> {
        info!("Uploading story");
        let ack = self.upload_raw(context, photo).await?;
        self.configure(
            context,
            "/create/configure_to_story/",
            &ack.upload_id,
            caption,
        )
        .await
    }
}
