//! Pinning client: uploads certificate bytes to a content-addressed
//! storage network through a hosted pinning provider.
//!
//! The returned CID is the only identity needed to retrieve the bytes
//! later via a public gateway. Network failures, bad credentials, and
//! provider-side rejections all collapse into a single pinning error; the
//! caller may re-invoke with the same input, and no retry happens here.

use crate::error::{CertError, Result};
use async_trait::async_trait;
use reqwest::multipart;
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;

/// Uploads file bytes to the pinning network, returning a CID.
///
/// Trait seam so workflows can run against an in-memory fake in tests.
#[async_trait]
pub trait Pinner: Send + Sync {
    async fn pin(&self, bytes: Vec<u8>, filename: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

/// HTTP client for a Pinata-style pinning provider.
pub struct PinningClient {
    http: reqwest::Client,
    api_base: String,
    jwt: SecretString,
}

impl PinningClient {
    pub fn new(api_base: impl Into<String>, jwt: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            jwt,
        }
    }

    /// Upload endpoint, tolerant of a trailing slash on the API base.
    fn pin_endpoint(&self) -> String {
        format!(
            "{}/pinning/pinFileToIPFS",
            self.api_base.trim_end_matches('/')
        )
    }
}

/// Resolve a CID to a public gateway URL.
pub fn gateway_url(gateway_base: &str, cid: &str) -> String {
    format!("{}/ipfs/{cid}", gateway_base.trim_end_matches('/'))
}

#[async_trait]
impl Pinner for PinningClient {
    async fn pin(&self, bytes: Vec<u8>, filename: &str) -> Result<String> {
        let part = multipart::Part::bytes(bytes).file_name(filename.to_owned());
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.pin_endpoint())
            .bearer_auth(self.jwt.expose_secret())
            .multipart(form)
            .send()
            .await
            .map_err(|e| CertError::Pinning(format!("Upload request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, body, "Pinning provider rejected upload");
            return Err(CertError::Pinning(format!(
                "Provider rejected upload with status {status}"
            )));
        }

        let parsed: PinResponse = response
            .json()
            .await
            .map_err(|e| CertError::Pinning(format!("Malformed provider response: {e}")))?;

        tracing::info!(cid = %parsed.ipfs_hash, filename, "File pinned");
        Ok(parsed.ipfs_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_url() {
        assert_eq!(
            gateway_url("https://gateway.pinata.cloud", "QmTestCid"),
            "https://gateway.pinata.cloud/ipfs/QmTestCid"
        );
    }

    #[test]
    fn test_gateway_url_trailing_slash() {
        assert_eq!(
            gateway_url("https://ipfs.io/", "QmTestCid"),
            "https://ipfs.io/ipfs/QmTestCid"
        );
    }

    #[test]
    fn test_pin_endpoint_trailing_slash() {
        let jwt = SecretString::new(String::new().into());
        let client = PinningClient::new("https://api.pinata.cloud/", jwt);
        assert_eq!(
            client.pin_endpoint(),
            "https://api.pinata.cloud/pinning/pinFileToIPFS"
        );
    }

    #[test]
    fn test_pin_response_field_name() {
        let parsed: PinResponse =
            serde_json::from_str(r#"{"IpfsHash":"QmTestCid","PinSize":42}"#).unwrap();
        assert_eq!(parsed.ipfs_hash, "QmTestCid");
    }
}
