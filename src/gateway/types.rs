//! Wire and domain types for the wallet backend
//!
//! Two deployment variants share one domain model: the fiat backend reports a
//! decimal USD balance, the diamond backend reports diamond/coin balances and
//! a connected-account id. Snapshots are replaced wholesale on each fetch,
//! never partially mutated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time read of the user's spendable balance
#[derive(Debug, Clone, PartialEq)]
pub struct WalletSnapshot {
    /// Amount available for withdrawal, in the deployment's withdrawal unit
    pub spendable: f64,
    /// Secondary unit balance (coins in the diamond deployment, otherwise 0)
    pub secondary_units: u64,
    /// USD valuation of the spendable balance, when the backend reports one
    pub usd_value: Option<f64>,
    /// Whether the payout destination is fully configured for withdrawals
    pub payout_destination_configured: bool,
}

/// Bank account or connected payment-processor account receiving withdrawals
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PayoutDestination {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub routing_number: Option<String>,
}

impl PayoutDestination {
    /// Card-style masked rendering, keeping only the routing number's last 4
    pub fn masked_display(&self) -> String {
        match self.routing_number.as_deref() {
            Some(routing) if routing.len() >= 4 => {
                format!("**** **** **** {}", &routing[routing.len() - 4..])
            }
            _ => "**** **** **** ****".to_string(),
        }
    }
}

/// A validated withdrawal, ready for submission
#[derive(Debug, Clone, PartialEq)]
pub struct WithdrawalRequest {
    /// Destination identifier (first linked destination)
    pub destination_id: String,
    /// Amount in the deployment's withdrawal unit
    pub amount: f64,
    /// Amount rendered as the user saw it, used in notifications
    pub amount_text: String,
}

/// Acknowledgement of an accepted withdrawal request
#[derive(Debug, Clone)]
pub struct SubmitReceipt {
    /// Server-provided message, when the backend sends one
    pub message: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

// --- wire shapes -----------------------------------------------------------

/// Generic `{ data: ... }` response envelope
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub data: T,
}

/// `GET /api/withdrawal/account-status` payload (fiat deployment)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FiatWalletBody {
    #[serde(default)]
    pub dollars: f64,
    #[serde(default)]
    pub is_stripe_completed: bool,
}

impl From<FiatWalletBody> for WalletSnapshot {
    fn from(body: FiatWalletBody) -> Self {
        Self {
            spendable: body.dollars,
            secondary_units: 0,
            usd_value: Some(body.dollars),
            payout_destination_configured: body.is_stripe_completed,
        }
    }
}

/// `GET /api/inApp/getWallet` payload (diamond deployment)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DiamondWalletBody {
    #[serde(default)]
    pub diamonds: u64,
    #[serde(rename = "diamondsValueInUSD", default)]
    pub diamonds_value_in_usd: Option<f64>,
    #[serde(default)]
    pub coins: u64,
    #[serde(default)]
    pub stripe_connected_account_id: Option<String>,
}

impl From<DiamondWalletBody> for WalletSnapshot {
    fn from(body: DiamondWalletBody) -> Self {
        let configured = body
            .stripe_connected_account_id
            .as_deref()
            .is_some_and(|id| !id.is_empty());
        Self {
            spendable: body.diamonds as f64,
            secondary_units: body.coins,
            usd_value: body.diamonds_value_in_usd,
            payout_destination_configured: configured,
        }
    }
}

/// `POST /api/withdrawal/connect-account` payload
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConnectAccountBody {
    pub onboarding_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConnectAccountRequest<'a> {
    pub token: &'a str,
}

/// `POST /inapp/withdraw` request body (fiat deployment)
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FiatWithdrawRequest<'a> {
    pub bank_account: &'a str,
    pub amount: f64,
}

/// `POST /api/withdrawal/request` body (diamond deployment)
#[derive(Debug, Serialize)]
pub(crate) struct DiamondWithdrawRequest {
    pub diamonds: u64,
}

/// `POST /api/inApp/convertCoinsToDiamonds` body
#[derive(Debug, Serialize)]
pub(crate) struct ConvertCoinsRequest {
    pub coins: u64,
}

/// Message-bearing body used by withdraw acks and error responses
#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}
