//! Media host client
//!
//! Binary files never touch local disk; they are forwarded to a
//! Cloudinary-compatible host which returns a retrieval URL and a globally
//! unique public id. The [`MediaHost`] trait is the seam the orchestrator
//! talks to, so tests can substitute an in-memory host.

use async_trait::async_trait;
use daisy_common::config::MediaHostSettings;
use daisy_common::ResourceKind;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use thiserror::Error;

const USER_AGENT: &str = concat!("daisy-portal/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Media host errors
#[derive(Debug, Error)]
pub enum MediaHostError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    /// Host answered but refused the operation (e.g. destroy result other than "ok")
    #[error("Rejected by media host: {0}")]
    Rejected(String),
}

/// File to store on the host
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub content: Vec<u8>,
    pub filename: String,
    /// Logical folder, e.g. `letters/A100`
    pub folder: String,
    pub resource: ResourceKind,
}

/// Host response for a stored file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedMedia {
    pub url: String,
    pub external_id: String,
}

#[async_trait]
pub trait MediaHost: Send + Sync {
    /// Store a file; returns its retrieval URL and external id
    async fn upload(&self, request: UploadRequest) -> Result<UploadedMedia, MediaHostError>;

    /// Delete a previously stored file
    async fn destroy(&self, external_id: &str, resource: ResourceKind) -> Result<(), MediaHostError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Cloudinary REST client (signed uploads, SHA-256 signatures)
pub struct CloudinaryClient {
    http_client: reqwest::Client,
    settings: MediaHostSettings,
}

impl CloudinaryClient {
    pub fn new(settings: MediaHostSettings) -> Result<Self, MediaHostError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MediaHostError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn endpoint(&self, resource: ResourceKind, action: &str) -> String {
        format!(
            "{}/v1_1/{}/{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.cloud_name,
            resource.as_str(),
            action
        )
    }

    /// Parameters every signed request carries: the signed ones plus credentials
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        params.push(("timestamp", timestamp.to_string()));

        let signature = sign_params(&params, &self.settings.api_secret);
        params.push(("api_key", self.settings.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }

    async fn read_body(response: reqwest::Response) -> Result<String, MediaHostError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| MediaHostError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(MediaHostError::Api(status.as_u16(), body));
        }
        Ok(body)
    }
}

/// Request signature: SHA-256 hex of the sorted `key=value` pairs joined
/// with `&`, immediately followed by the API secret.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{:x}", Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

#[async_trait]
impl MediaHost for CloudinaryClient {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedMedia, MediaHostError> {
        let params = self.signed_params(vec![("folder", request.folder.clone())]);

        let file_part = reqwest::multipart::Part::bytes(request.content)
            .file_name(request.filename.clone());
        let form = params
            .into_iter()
            .fold(reqwest::multipart::Form::new(), |form, (k, v)| form.text(k, v))
            .part("file", file_part);

        tracing::debug!(
            folder = %request.folder,
            filename = %request.filename,
            resource = %request.resource,
            "Uploading to media host"
        );

        let response = self
            .http_client
            .post(self.endpoint(request.resource, "upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaHostError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let parsed: UploadResponse =
            serde_json::from_str(&body).map_err(|e| MediaHostError::Parse(e.to_string()))?;

        Ok(UploadedMedia {
            url: parsed.secure_url,
            external_id: parsed.public_id,
        })
    }

    async fn destroy(&self, external_id: &str, resource: ResourceKind) -> Result<(), MediaHostError> {
        let params = self.signed_params(vec![("public_id", external_id.to_string())]);

        tracing::debug!(external_id, resource = %resource, "Destroying media host resource");

        let response = self
            .http_client
            .post(self.endpoint(resource, "destroy"))
            .form(&params)
            .send()
            .await
            .map_err(|e| MediaHostError::Network(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let parsed: DestroyResponse =
            serde_json::from_str(&body).map_err(|e| MediaHostError::Parse(e.to_string()))?;

        // "not found" means the resource is already gone remotely
        match parsed.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(MediaHostError::Rejected(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MediaHostSettings {
        MediaHostSettings {
            cloud_name: "daisy".to_string(),
            api_key: "123".to_string(),
            api_secret: "secret".to_string(),
            base_url: "https://api.example.com/".to_string(),
        }
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = sign_params(
            &[("timestamp", "1700000000".to_string()), ("folder", "gallery/A100".to_string())],
            "secret",
        );
        let b = sign_params(
            &[("folder", "gallery/A100".to_string()), ("timestamp", "1700000000".to_string())],
            "secret",
        );
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_matches_manual_digest() {
        let sig = sign_params(&[("public_id", "x".to_string()), ("timestamp", "1".to_string())], "s");
        let expected = format!("{:x}", Sha256::digest(b"public_id=x&timestamp=1s"));
        assert_eq!(sig, expected);
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let params = [("timestamp", "1".to_string())];
        assert_ne!(sign_params(&params, "a"), sign_params(&params, "b"));
    }

    #[test]
    fn test_endpoint_uses_resource_kind() {
        let client = CloudinaryClient::new(settings()).unwrap();
        assert_eq!(
            client.endpoint(ResourceKind::Raw, "destroy"),
            "https://api.example.com/v1_1/daisy/raw/destroy"
        );
        assert_eq!(
            client.endpoint(ResourceKind::Image, "upload"),
            "https://api.example.com/v1_1/daisy/image/upload"
        );
    }

    #[test]
    fn test_signed_params_carry_credentials_but_not_secret() {
        let client = CloudinaryClient::new(settings()).unwrap();
        let params = client.signed_params(vec![("folder", "letters/A100".to_string())]);
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert!(keys.contains(&"api_key"));
        assert!(keys.contains(&"signature"));
        assert!(keys.contains(&"timestamp"));
        assert!(params.iter().all(|(_, v)| v != "secret"));
    }
}
