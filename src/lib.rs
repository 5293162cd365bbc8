//! Client-side wallet withdrawal flow
//!
//! Mediates between a remote wallet/withdrawal API and a presentation layer:
//! resolves the session token, fetches balance and payout-destination data,
//! gates on payout-account onboarding, validates the withdrawal amount and
//! drives submission with at most one request in flight.
//!
//! Typical wiring:
//!
//! ```no_run
//! use payout_flow::{
//!     flow::{CurrencySpec, WithdrawalFlow},
//!     gateway::HttpWalletApi,
//!     notify::TracingNotifier,
//!     session::{resolve_session, FileTokenStore},
//!     Config,
//! };
//!
//! # async fn wire(initial_path: &str) -> anyhow::Result<()> {
//! let config = Config::load("payout.toml")?;
//! let mut store = FileTokenStore::new(&config.storage.token_path);
//! let ctx = resolve_session(initial_path, &mut store);
//!
//! let api = HttpWalletApi::new(&config.api, config.currency.variant, ctx.clone())?;
//! let currency = CurrencySpec::from_config(&config.currency);
//! let mut flow = WithdrawalFlow::new(ctx, currency, api, TracingNotifier);
//!
//! flow.start().await?;
//! flow.input_changed("30");
//! flow.submit().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod notify;
pub mod session;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
