use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::{StorageError, StoragePort, StorageResult};
use crate::{
    config::PinningConfig,
    document::{ContentPointer, DocumentFile, UploadMetadata},
    http_request::Request,
};

/// Response from the pin-file endpoint. Only the CID is of interest.
#[derive(Deserialize, Debug, Eq, PartialEq)]
struct PinFileResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// Pinata-backed content-addressed storage.
///
/// Uploads go to the pin-file endpoint authenticated by two static credential headers; retrieval URLs are
/// the gateway base followed by the CID.
pub struct PinataStorage {
    endpoint: String,
    gateway_base: String,
    api_key: SecretString,
    secret_api_key: SecretString,
    request: Request,
}

impl PinataStorage {
    /// Creates a storage client from pinning settings.
    #[must_use]
    pub fn new(config: &PinningConfig) -> Self {
        let mut gateway_base = config.gateway_base.trim().to_string();
        if !gateway_base.ends_with('/') {
            gateway_base.push('/');
        }

        Self {
            endpoint: config.endpoint.clone(),
            gateway_base,
            api_key: SecretString::from(config.api_key.expose_secret()),
            secret_api_key: SecretString::from(config.secret_api_key.expose_secret()),
            request: Request::new(),
        }
    }

    fn build_form(file: &DocumentFile, metadata: &UploadMetadata) -> StorageResult<Form> {
        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type).map_err(|e| StorageError::Rejected {
                status: None,
                reason: format!("invalid content type {content_type}: {e}"),
            })?;
        }

        let mut form = Form::new().part("file", part);
        if metadata.name.is_some() {
            let metadata = serde_json::to_string(metadata).map_err(|e| {
                StorageError::Rejected {
                    status: None,
                    reason: format!("failed to encode pin metadata: {e}"),
                }
            })?;
            form = form.text("pinataMetadata", metadata);
        }
        Ok(form)
    }

    async fn parse_pin_response(
        response: reqwest::Response,
    ) -> StorageResult<ContentPointer> {
        let status = response.status();
        let body = response.text().await.map_err(|e| {
            StorageError::Unavailable(format!("failed to read pin response: {e}"))
        })?;

        let pin = serde_json::from_str::<PinFileResponse>(&body).map_err(|e| {
            StorageError::Rejected {
                status: Some(status.as_u16()),
                reason: format!("Failed to parse pin response: {e}"),
            }
        })?;

        let pointer = ContentPointer::new(pin.ipfs_hash);
        if pointer.is_empty() {
            return Err(StorageError::Rejected {
                status: Some(status.as_u16()),
                reason: "Missing IpfsHash in successful response".to_string(),
            });
        }
        Ok(pointer)
    }
}

impl StoragePort for PinataStorage {
    async fn upload(
        &self,
        file: &DocumentFile,
        metadata: &UploadMetadata,
    ) -> StorageResult<ContentPointer> {
        let form = Self::build_form(file, metadata)?;

        let request = self
            .request
            .post(&self.endpoint)
            .header("pinata_api_key", self.api_key.expose_secret())
            .header("pinata_secret_api_key", self.secret_api_key.expose_secret())
            .multipart(form);

        log::debug!(
            "pinning {} ({} bytes)",
            file.file_name,
            file.bytes.len()
        );
        let response = self.request.handle(request).await?;
        let pointer = Self::parse_pin_response(response).await?;
        log::debug!("pinned {} as {pointer}", file.file_name);
        Ok(pointer)
    }

    fn resolve(&self, pointer: &ContentPointer) -> String {
        format!("{}{}", self.gateway_base, pointer.as_str())
    }
}
