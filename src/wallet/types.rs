//! Wire types for the connect flow.

use serde::{Deserialize, Serialize};

use crate::http::response::GatewayError;

/// Name recorded when the wallet does not report one.
pub const DEFAULT_WALLET_NAME: &str = "Unknown Wallet";

/// `POST /wallet/connect` body. Every field is optional on the wire so that
/// missing fields surface as a 400 rather than a deserializer rejection.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub token: Option<String>,
    pub wallet: Option<WalletDescriptor>,
    pub return_url: Option<String>,
}

/// Wallet description as sent by the browser.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletDescriptor {
    pub address: Option<String>,
    pub network_id: Option<i64>,
    pub name: Option<String>,
}

/// Shape-checked wallet identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletInfo {
    pub address: String,
    pub network_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// What the signature verifier receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionData {
    pub token: String,
    pub data: WalletInfo,
}

impl ConnectionRequest {
    /// Require `token`, `wallet` and `wallet.address`; split off `returnUrl`.
    pub fn into_connection_data(self) -> Result<(ConnectionData, Option<String>), GatewayError> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or(GatewayError::MalformedRequest)?;
        let wallet = self.wallet.ok_or(GatewayError::MalformedRequest)?;
        let address = wallet
            .address
            .filter(|a| !a.trim().is_empty())
            .ok_or(GatewayError::MalformedRequest)?;

        let data = ConnectionData {
            token,
            data: WalletInfo {
                address,
                network_id: wallet.network_id.unwrap_or(0),
                name: wallet.name.filter(|n| !n.trim().is_empty()),
            },
        };
        Ok((data, self.return_url))
    }
}
