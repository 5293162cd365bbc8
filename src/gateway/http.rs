//! reqwest implementation of the wallet gateway

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use crate::config::{ApiConfig, CurrencyVariant};
use crate::error::{Error, Result};
use crate::session::SessionContext;

use super::types::{
    ApiEnvelope, ConnectAccountBody, ConnectAccountRequest, ConvertCoinsRequest,
    DiamondWalletBody, DiamondWithdrawRequest, FiatWalletBody, FiatWithdrawRequest, MessageBody,
};
use super::{PayoutDestination, SubmitReceipt, WalletApi, WalletSnapshot, WithdrawalRequest};

/// HTTP client for the remote wallet/withdrawal API.
///
/// The session context is injected at construction; the token is mirrored
/// onto both an `Authorization: Bearer` header and a `token` cookie on every
/// request, matching the two auth transports the backend accepts.
pub struct HttpWalletApi {
    client: Client,
    base_url: String,
    timeout_ms: u64,
    variant: CurrencyVariant,
    ctx: SessionContext,
}

impl HttpWalletApi {
    pub fn new(api: &ApiConfig, variant: CurrencyVariant, ctx: SessionContext) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_millis(api.timeout_ms))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: api.base_url.trim_end_matches('/').to_string(),
            timeout_ms: api.timeout_ms,
            variant,
            ctx,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn token(&self) -> Result<&str> {
        self.ctx
            .token()
            .map(|t| t.as_str())
            .ok_or(Error::NotAuthenticated)
    }

    /// Attach the session token on both transports the backend accepts
    fn authorize(&self, builder: RequestBuilder) -> Result<RequestBuilder> {
        let token = self.token()?;
        Ok(builder
            .bearer_auth(token)
            .header(reqwest::header::COOKIE, format!("token={}", token)))
    }

    fn request_err(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout(self.timeout_ms)
        } else {
            Error::from(e)
        }
    }

    /// Turn a non-200 response into a rejection, surfacing the server's own
    /// message when the body carries one
    async fn rejection(response: Response) -> Error {
        let status = response.status();
        match response.json::<MessageBody>().await {
            Ok(MessageBody {
                message: Some(message),
            }) => Error::ServerRejection(message),
            _ => Error::Http(format!("request failed with status {}", status)),
        }
    }

    async fn get(&self, path: &str) -> Result<Response> {
        let response = self
            .authorize(self.client.get(self.url(path)))?
            .send()
            .await
            .map_err(|e| self.request_err(e))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response)
    }

    async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Response> {
        let response = self
            .authorize(self.client.post(self.url(path)))?
            .json(body)
            .send()
            .await
            .map_err(|e| self.request_err(e))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response)
    }
}

#[async_trait]
impl WalletApi for HttpWalletApi {
    async fn fetch_wallet(&self) -> Result<WalletSnapshot> {
        let snapshot = match self.variant {
            CurrencyVariant::Fiat => {
                let response = self.get("/api/withdrawal/account-status").await?;
                let envelope: ApiEnvelope<FiatWalletBody> =
                    response.json().await.map_err(|e| self.request_err(e))?;
                WalletSnapshot::from(envelope.data)
            }
            CurrencyVariant::Diamond => {
                let response = self.get("/api/inApp/getWallet").await?;
                let body: DiamondWalletBody =
                    response.json().await.map_err(|e| self.request_err(e))?;
                WalletSnapshot::from(body)
            }
        };
        debug!(
            spendable = snapshot.spendable,
            configured = snapshot.payout_destination_configured,
            "fetched wallet snapshot"
        );
        Ok(snapshot)
    }

    async fn fetch_destinations(&self) -> Result<Vec<PayoutDestination>> {
        let response = self.get("/inapp/bank").await?;
        let envelope: ApiEnvelope<Vec<PayoutDestination>> =
            response.json().await.map_err(|e| self.request_err(e))?;
        debug!(count = envelope.data.len(), "fetched payout destinations");
        Ok(envelope.data)
    }

    async fn connect_account(&self) -> Result<Option<String>> {
        // Always the resolved session token; the backend matches it against
        // the session before minting an onboarding link
        let body = ConnectAccountRequest {
            token: self.token()?,
        };
        let response = self
            .post_json("/api/withdrawal/connect-account", &body)
            .await?;
        let envelope: ApiEnvelope<ConnectAccountBody> =
            response.json().await.map_err(|e| self.request_err(e))?;

        if envelope.data.onboarding_url.is_some() {
            info!("payout destination not configured, onboarding required");
        }
        Ok(envelope.data.onboarding_url)
    }

    async fn submit_withdrawal(&self, request: &WithdrawalRequest) -> Result<SubmitReceipt> {
        info!(amount = %request.amount_text, "submitting withdrawal request");

        let response = match self.variant {
            CurrencyVariant::Fiat => {
                let body = FiatWithdrawRequest {
                    bank_account: &request.destination_id,
                    amount: request.amount,
                };
                self.post_json("/inapp/withdraw", &body).await?
            }
            CurrencyVariant::Diamond => {
                let body = DiamondWithdrawRequest {
                    diamonds: request.amount as u64,
                };
                self.post_json("/api/withdrawal/request", &body).await?
            }
        };

        // Ack bodies are not guaranteed to carry a message
        let message = response
            .json::<ApiEnvelope<MessageBody>>()
            .await
            .ok()
            .and_then(|envelope| envelope.data.message);

        Ok(SubmitReceipt {
            message,
            submitted_at: Utc::now(),
        })
    }

    async fn convert_coins(&self, coins: u64) -> Result<()> {
        if self.variant != CurrencyVariant::Diamond {
            return Err(Error::UnsupportedVariant("fiat".into()));
        }

        info!(coins, "converting coins to diamonds");
        self.post_json("/api/inApp/convertCoinsToDiamonds", &ConvertCoinsRequest { coins })
            .await?;
        Ok(())
    }
}
