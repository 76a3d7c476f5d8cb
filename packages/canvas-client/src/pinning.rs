//! Client for the pinning proxy.
//!
//! The proxy holds the pinning-service credentials server-side and exposes
//! a narrow surface: signed upload URLs for browser-direct file uploads,
//! JSON pinning, and deletes. Content comes back addressed by CID; the
//! token URI embedded at mint time is the primary gateway form of that CID.

use crate::metrics::METRICS;
use canvas_types::NftMetadata;
use serde::Deserialize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tracing::{info, warn};

/// A pinned file: its content address plus the service-side id used for
/// deletion.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub cid: String,
    #[serde(rename = "id")]
    pub upload_id: String,
}

/// The wizard's view of the pinning service.
pub trait PinningGateway {
    fn upload_json(
        &self,
        metadata: &NftMetadata,
    ) -> impl std::future::Future<Output = Result<String, crate::Error>> + Send;

    /// Primary gateway URL for a CID.
    fn gateway_url(&self, cid: &str) -> String;

    /// Secondary gateway URL for a CID.
    fn fallback_gateway_url(&self, cid: &str) -> String;
}

pub struct PinningClient {
    http: reqwest::Client,
    api_base: String,
    gateway: String,
    fallback_gateway: String,
}

#[derive(Deserialize)]
struct SignedUrlResponse {
    url: String,
}

#[derive(Deserialize)]
struct JsonPinResponse {
    cid: String,
}

impl PinningClient {
    pub fn new(config: &crate::config::PinningConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            gateway: config.gateway.trim_end_matches('/').to_string(),
            fallback_gateway: config.fallback_gateway.trim_end_matches('/').to_string(),
        }
    }

    /// Short-lived signed URL for one direct file upload.
    pub async fn request_upload_url(&self) -> Result<String, crate::Error> {
        let resp = self
            .http
            .post(format!("{}/uploads/sign", self.api_base))
            .send()
            .await
            .map_err(|e| crate::Error::Pinning(format!("signed URL request failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(crate::Error::Pinning(format!(
                "signed URL request returned {}",
                resp.status()
            )));
        }
        let signed: SignedUrlResponse = resp
            .json()
            .await
            .map_err(|e| crate::Error::Pinning(format!("invalid signed URL response: {e}")))?;
        Ok(signed.url)
    }

    /// Upload raw file bytes to a previously signed URL.
    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        signed_url: &str,
    ) -> Result<UploadedFile, crate::Error> {
        METRICS.uploads_total.fetch_add(1, Ordering::Relaxed);
        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let resp = self
            .http
            .post(signed_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.upload_error(format!("file upload failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(self.upload_error(format!("file upload returned {}", resp.status())));
        }
        let uploaded: UploadedFile = resp
            .json()
            .await
            .map_err(|e| self.upload_error(format!("invalid upload response: {e}")))?;
        info!(cid = %uploaded.cid, "File pinned");
        Ok(uploaded)
    }

    /// Remove a pinned file, e.g. when the user replaces a dropped image.
    pub async fn delete_file(&self, upload_id: &str) -> Result<(), crate::Error> {
        let resp = self
            .http
            .delete(format!("{}/files/{upload_id}", self.api_base))
            .send()
            .await
            .map_err(|e| crate::Error::Pinning(format!("delete failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(crate::Error::Pinning(format!(
                "delete returned {}",
                resp.status()
            )));
        }
        Ok(())
    }

    fn upload_error(&self, msg: String) -> crate::Error {
        METRICS.upload_errors.fetch_add(1, Ordering::Relaxed);
        warn!(error = %msg, "Pinning upload failed");
        crate::Error::Pinning(msg)
    }
}

impl PinningGateway for PinningClient {
    async fn upload_json(&self, metadata: &NftMetadata) -> Result<String, crate::Error> {
        METRICS.uploads_total.fetch_add(1, Ordering::Relaxed);
        let resp = self
            .http
            .post(format!("{}/uploads/json", self.api_base))
            .json(metadata)
            .send()
            .await
            .map_err(|e| self.upload_error(format!("metadata upload failed: {e}")))?;
        if !resp.status().is_success() {
            return Err(self.upload_error(format!("metadata upload returned {}", resp.status())));
        }
        let pinned: JsonPinResponse = resp
            .json()
            .await
            .map_err(|e| self.upload_error(format!("invalid pin response: {e}")))?;
        info!(cid = %pinned.cid, "Metadata pinned");
        Ok(pinned.cid)
    }

    fn gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.gateway)
    }

    fn fallback_gateway_url(&self, cid: &str) -> String {
        format!("{}/ipfs/{cid}", self.fallback_gateway)
    }
}
