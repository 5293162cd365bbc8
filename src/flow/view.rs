//! Presentation snapshot
//!
//! The rendering layer is a pure function of this struct. It carries no
//! behavior; in particular, acting on `pending_redirect` (a full navigation
//! to the onboarding URL) is the presentation layer's job.

/// Read-only snapshot of the flow for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub authenticated: bool,
    /// Show the loading skeleton: pre-auth, or a wallet fetch in flight
    pub loading: bool,
    /// Masked destination line, all-masked placeholder when none is linked
    pub destination_display: String,
    /// Balance with unit label, `None` before the first successful fetch
    pub balance_display: Option<String>,
    /// The draft exactly as typed (post-clamp)
    pub amount_input: String,
    /// Unit label shown next to the input field
    pub unit_label: String,
    pub submit_enabled: bool,
    pub submitting: bool,
    /// Onboarding URL the presentation layer must navigate to, if any
    pub pending_redirect: Option<String>,
}
