//! Remote wallet/withdrawal API gateway
//!
//! Read operations (wallet snapshot, payout destinations) are idempotent and
//! safe to retry; the flow controller decides cadence. Every operation
//! requires a resolved session token and carries the configured timeout.

mod http;
mod types;

use async_trait::async_trait;

pub use http::HttpWalletApi;
pub use types::{PayoutDestination, SubmitReceipt, WalletSnapshot, WithdrawalRequest};

use crate::error::Result;

/// Seam between the flow controller and the remote wallet backend
#[async_trait]
pub trait WalletApi: Send + Sync {
    /// Fetch the current balance/eligibility snapshot
    async fn fetch_wallet(&self) -> Result<WalletSnapshot>;

    /// Fetch the linked payout destinations
    async fn fetch_destinations(&self) -> Result<Vec<PayoutDestination>>;

    /// Check payout-account onboarding. `Some(url)` means the caller must
    /// hand the URL to the presentation layer for a full navigation; `None`
    /// means the destination is already configured.
    async fn connect_account(&self) -> Result<Option<String>>;

    /// Submit a validated withdrawal request
    async fn submit_withdrawal(&self, request: &WithdrawalRequest) -> Result<SubmitReceipt>;

    /// Convert the coin balance into diamonds (diamond variant only)
    async fn convert_coins(&self, coins: u64) -> Result<()>;
}

#[async_trait]
impl<T: WalletApi + ?Sized> WalletApi for std::sync::Arc<T> {
    async fn fetch_wallet(&self) -> Result<WalletSnapshot> {
        (**self).fetch_wallet().await
    }

    async fn fetch_destinations(&self) -> Result<Vec<PayoutDestination>> {
        (**self).fetch_destinations().await
    }

    async fn connect_account(&self) -> Result<Option<String>> {
        (**self).connect_account().await
    }

    async fn submit_withdrawal(&self, request: &WithdrawalRequest) -> Result<SubmitReceipt> {
        (**self).submit_withdrawal(request).await
    }

    async fn convert_coins(&self, coins: u64) -> Result<()> {
        (**self).convert_coins(coins).await
    }
}
