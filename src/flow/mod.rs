//! Withdrawal session flow
//!
//! The state machine at the core of the crate: owns the amount draft,
//! validates against the wallet snapshot, gates on payout-account onboarding
//! and drives submission through the gateway.

mod controller;
mod currency;
mod view;

pub use controller::{Phase, RequestStatus, WithdrawalDraft, WithdrawalFlow};
pub use currency::CurrencySpec;
pub use view::ViewState;
