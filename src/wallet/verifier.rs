//! Signature verification collaborator.
//!
//! The gateway never checks wallet signatures itself. It hands the signed
//! challenge to a [`SignatureVerifier`] and trusts its verdict. The binary
//! wires in [`HttpVerifier`], which delegates to a verification service.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::VerifierConfig;
use crate::wallet::types::ConnectionData;

const MAX_TOKEN_LEN: usize = 16 * 1024;
const MAX_ADDRESS_LEN: usize = 256;
const MAX_NAME_LEN: usize = 64;

/// Verdict returned by the verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub is_valid: bool,
    #[serde(default)]
    pub message: String,
}

impl VerificationOutcome {
    pub fn valid() -> Self {
        Self {
            is_valid: true,
            message: "Signature verified".to_string(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// The verifier could not produce a verdict.
#[derive(Debug, Error)]
pub enum VerifierError {
    #[error("verifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("verifier responded with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait SignatureVerifier: Send + Sync {
    /// Cheap structural check run before any verification work.
    fn validate_shape(&self, data: &ConnectionData) -> bool {
        has_valid_shape(data)
    }

    /// Check the wallet signature. May be slow; may fail.
    async fn verify_connection(
        &self,
        data: &ConnectionData,
    ) -> Result<VerificationOutcome, VerifierError>;
}

/// Bounds every connect payload must respect.
pub fn has_valid_shape(data: &ConnectionData) -> bool {
    let wallet = &data.data;
    !data.token.is_empty()
        && data.token.len() <= MAX_TOKEN_LEN
        && !wallet.address.is_empty()
        && wallet.address.len() <= MAX_ADDRESS_LEN
        && wallet
            .address
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && wallet.network_id >= 0
        && wallet
            .name
            .as_ref()
            .map_or(true, |name| name.chars().count() <= MAX_NAME_LEN)
}

/// Delegates verification to an HTTP service:
/// `POST {url}` with `{token, data}` → `{isValid, message}`.
#[derive(Debug, Clone)]
pub struct HttpVerifier {
    client: reqwest::Client,
    url: String,
}

impl HttpVerifier {
    pub fn new(config: &VerifierConfig) -> Result<Self, VerifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl SignatureVerifier for HttpVerifier {
    async fn verify_connection(
        &self,
        data: &ConnectionData,
    ) -> Result<VerificationOutcome, VerifierError> {
        let response = self.client.post(&self.url).json(data).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = %status, url = %self.url, "Verifier returned an error status");
            return Err(VerifierError::Status(status.as_u16()));
        }

        Ok(response.json::<VerificationOutcome>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wallet::types::WalletInfo;

    fn data(address: &str) -> ConnectionData {
        ConnectionData {
            token: "signed".into(),
            data: WalletInfo {
                address: address.into(),
                network_id: 1,
                name: Some("Eternl".into()),
            },
        }
    }

    #[test]
    fn test_shape_accepts_bech32_and_hex() {
        assert!(has_valid_shape(&data("addr1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh")));
        assert!(has_valid_shape(&data("addr_test1vz09v9yfxguvlp0zsnrpa3tdtm7el8xufp3m5lsm7qxzclgmzkket")));
        assert!(has_valid_shape(&data("01a2b3c4d5e6f7")));
    }

    #[test]
    fn test_shape_rejects_bad_input() {
        assert!(!has_valid_shape(&data("addr1 <script>")));
        assert!(!has_valid_shape(&data(&"a".repeat(MAX_ADDRESS_LEN + 1))));

        let mut negative = data("addr1");
        negative.data.network_id = -1;
        assert!(!has_valid_shape(&negative));

        let mut long_name = data("addr1");
        long_name.data.name = Some("n".repeat(MAX_NAME_LEN + 1));
        assert!(!has_valid_shape(&long_name));
    }

    #[test]
    fn test_outcome_wire_format() {
        let outcome: VerificationOutcome =
            serde_json::from_str(r#"{"isValid":false,"message":"bad signature"}"#).unwrap();
        assert_eq!(outcome, VerificationOutcome::rejected("bad signature"));

        let outcome: VerificationOutcome = serde_json::from_str(r#"{"isValid":true}"#).unwrap();
        assert!(outcome.is_valid);
        assert!(outcome.message.is_empty());
    }
}
