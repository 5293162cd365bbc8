//! Withdrawal session controller
//!
//! States: `Idle → Validating → Submitting → {Success, Rejected}`, returning
//! to `Idle` after either terminal outcome. Success clears the draft;
//! rejection preserves it for correction. Validation runs in fixed order and
//! short-circuits on the first failure; while a submission is in flight the
//! submit transition is refused, so at most one withdrawal request per draft
//! ever reaches the network.

use tracing::{debug, info, warn};

use crate::config::CurrencyVariant;
use crate::error::{Error, Result};
use crate::gateway::{PayoutDestination, SubmitReceipt, WalletApi, WalletSnapshot, WithdrawalRequest};
use crate::notify::Notifier;
use crate::session::SessionContext;

use super::currency::CurrencySpec;
use super::view::ViewState;

/// Per-operation request status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Fetching,
    Submitting,
}

/// Overall flow phase
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Submitting,
    /// Onboarding requires a full navigation; the flow is parked until the
    /// user returns from the hosted onboarding page
    RedirectPending(String),
}

/// The user's in-progress, unsubmitted withdrawal amount
#[derive(Debug, Clone, Default)]
pub struct WithdrawalDraft {
    raw: String,
}

impl WithdrawalDraft {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    fn clear(&mut self) {
        self.raw.clear();
    }
}

/// The withdrawal session state machine
pub struct WithdrawalFlow<A: WalletApi, N: Notifier> {
    api: A,
    notifier: N,
    currency: CurrencySpec,
    ctx: SessionContext,

    wallet: Option<WalletSnapshot>,
    destinations: Vec<PayoutDestination>,
    draft: WithdrawalDraft,

    fetch_status: RequestStatus,
    submit_status: RequestStatus,
    phase: Phase,
}

impl<A: WalletApi, N: Notifier> WithdrawalFlow<A, N> {
    pub fn new(ctx: SessionContext, currency: CurrencySpec, api: A, notifier: N) -> Self {
        Self {
            api,
            notifier,
            currency,
            ctx,
            wallet: None,
            destinations: Vec::new(),
            draft: WithdrawalDraft::default(),
            fetch_status: RequestStatus::Idle,
            submit_status: RequestStatus::Idle,
            phase: Phase::Idle,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.ctx.is_authenticated()
    }

    pub fn wallet(&self) -> Option<&WalletSnapshot> {
        self.wallet.as_ref()
    }

    pub fn destinations(&self) -> &[PayoutDestination] {
        &self.destinations
    }

    pub fn draft(&self) -> &WithdrawalDraft {
        &self.draft
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_submitting(&self) -> bool {
        self.submit_status == RequestStatus::Submitting
    }

    /// Balance the controller currently knows about. Unknown reads as zero,
    /// which keeps every submission blocked until the first fetch lands.
    fn available_balance(&self) -> f64 {
        self.wallet.as_ref().map(|w| w.spendable).unwrap_or(0.0)
    }

    /// Initial data load, run once the session token is resolved.
    ///
    /// Without a token this is a no-op: dependent fetches stay suspended and
    /// the view keeps its skeleton. With one, the wallet snapshot and the
    /// destination list are fetched together (they are independent), then the
    /// onboarding gate runs if the snapshot says the destination is not yet
    /// configured.
    pub async fn start(&mut self) -> Result<()> {
        if !self.is_authenticated() {
            debug!("no session token, skipping initial fetches");
            return Ok(());
        }

        self.fetch_status = RequestStatus::Fetching;
        let (wallet, destinations) =
            tokio::join!(self.api.fetch_wallet(), self.api.fetch_destinations());
        self.fetch_status = RequestStatus::Idle;

        // Fetch failures keep prior data and stay off the notification
        // channel; the dashboard remains usable on stale reads
        match wallet {
            Ok(snapshot) => self.wallet = Some(snapshot),
            Err(e) => warn!("wallet fetch failed: {}", e),
        }
        match destinations {
            Ok(list) => self.destinations = list,
            Err(e) => warn!("destination fetch failed: {}", e),
        }

        self.ensure_onboarded().await
    }

    /// Re-fetch the wallet snapshot. The prior snapshot survives an error.
    pub async fn refresh_wallet(&mut self) -> Result<()> {
        if !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }

        self.fetch_status = RequestStatus::Fetching;
        let result = self.api.fetch_wallet().await;
        self.fetch_status = RequestStatus::Idle;

        match result {
            Ok(snapshot) => {
                self.wallet = Some(snapshot);
                Ok(())
            }
            Err(e) => {
                warn!("wallet refresh failed, keeping prior snapshot: {}", e);
                Err(e)
            }
        }
    }

    /// Re-fetch the linked payout destinations. Prior list survives an error.
    pub async fn refresh_destinations(&mut self) -> Result<()> {
        if !self.is_authenticated() {
            return Err(Error::NotAuthenticated);
        }

        match self.api.fetch_destinations().await {
            Ok(list) => {
                self.destinations = list;
                Ok(())
            }
            Err(e) => {
                warn!("destination refresh failed, keeping prior list: {}", e);
                Err(e)
            }
        }
    }

    /// Onboarding gate: only consulted while the snapshot reports the payout
    /// destination unconfigured, so already-configured users never see a
    /// redundant onboarding prompt. A returned URL parks the flow in
    /// [`Phase::RedirectPending`]; navigation itself is the presentation
    /// layer's responsibility.
    pub async fn ensure_onboarded(&mut self) -> Result<()> {
        let needs_onboarding = self
            .wallet
            .as_ref()
            .is_some_and(|w| !w.payout_destination_configured);
        if !needs_onboarding {
            return Ok(());
        }

        match self.api.connect_account().await {
            Ok(Some(url)) => {
                info!("onboarding redirect pending");
                self.phase = Phase::RedirectPending(url);
                Ok(())
            }
            Ok(None) => {
                // Backend says configured after all; trust it over the
                // snapshot, which may predate onboarding completion
                if let Some(wallet) = self.wallet.as_mut() {
                    wallet.payout_destination_configured = true;
                }
                Ok(())
            }
            Err(e) => {
                warn!("connect-account check failed: {}", e);
                Ok(())
            }
        }
    }

    /// Input transition. The parsed value is clamped to the known balance —
    /// over-balance entries become the maximum instead of being rejected, so
    /// a max-withdrawal is always one keystroke away. Non-numeric text is
    /// retained verbatim until submission. Input is frozen mid-submission.
    pub fn input_changed(&mut self, raw: &str) {
        if self.is_submitting() {
            return;
        }

        match self.currency.parse_amount(raw) {
            Some(value) if value > self.available_balance() => {
                self.draft.raw = self.currency.format_amount(self.available_balance());
            }
            _ => self.draft.raw = raw.to_string(),
        }
    }

    /// Guard and validate, entering `Submitting` on success.
    ///
    /// Validation order is fixed and short-circuits: amount parses positive
    /// (and whole, for whole-unit currencies), amount within the current
    /// balance, a configured destination on file. Each failure notifies with
    /// its own message and leaves the flow idle; the in-flight guard refuses
    /// silently, matching a disabled submit control.
    pub fn begin_submit(&mut self) -> Result<WithdrawalRequest> {
        if self.is_submitting() {
            return Err(Error::SubmissionInFlight);
        }

        match self.validate_draft() {
            Ok(request) => {
                self.submit_status = RequestStatus::Submitting;
                self.phase = Phase::Submitting;
                Ok(request)
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    fn validate_draft(&self) -> Result<WithdrawalRequest> {
        let amount = match self.currency.parse_amount(self.draft.raw()) {
            Some(v) if v > 0.0 && self.currency.is_whole_enough(v) => v,
            _ => return Err(Error::InvalidAmount),
        };

        // Defense in depth beyond the input clamp: the balance may have
        // moved since the last fetch
        let available = self.available_balance();
        if amount > available {
            return Err(Error::ExceedsBalance {
                available: self.currency.format_amount(available),
                label: self.currency.label.clone(),
            });
        }

        // Destination on file and onboarding resolved; until the first
        // destination fetch completes this blocks every submission
        let configured = self
            .wallet
            .as_ref()
            .is_some_and(|w| w.payout_destination_configured);
        let destination = self.destinations.first().filter(|_| configured);
        let Some(destination) = destination else {
            return Err(Error::NoDestination);
        };

        Ok(WithdrawalRequest {
            destination_id: destination.id.clone(),
            amount,
            amount_text: self.currency.format_amount(amount),
        })
    }

    /// Terminal transition back to `Idle`. Success announces the submitted
    /// amount and clears the draft; rejection surfaces the server's message
    /// (or the generic fallback) and preserves the draft for retry.
    pub fn complete_submit(
        &mut self,
        request: &WithdrawalRequest,
        outcome: Result<SubmitReceipt>,
    ) -> Result<SubmitReceipt> {
        self.submit_status = RequestStatus::Idle;
        self.phase = Phase::Idle;

        match outcome {
            Ok(receipt) => {
                self.notifier.success(&format!(
                    "You've requested to withdraw {}. Your request is now under review.",
                    request.amount_text
                ));
                self.draft.clear();
                Ok(receipt)
            }
            Err(e) => {
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Full submit transition: validate, send, settle, then refresh the
    /// wallet so the view reflects the pending-review balance.
    pub async fn submit(&mut self) -> Result<SubmitReceipt> {
        let request = self.begin_submit()?;
        let outcome = self.api.submit_withdrawal(&request).await;
        let receipt = self.complete_submit(&request, outcome)?;

        if let Err(e) = self.refresh_wallet().await {
            warn!("post-submit wallet refresh failed: {}", e);
        }
        Ok(receipt)
    }

    /// Convert the whole coin balance into diamonds, then refresh the wallet.
    pub async fn convert_coins(&mut self) -> Result<()> {
        if self.currency.variant != CurrencyVariant::Diamond {
            return Err(Error::UnsupportedVariant(self.currency.label.clone()));
        }

        let coins = self.wallet.as_ref().map(|w| w.secondary_units).unwrap_or(0);
        if coins == 0 {
            debug!("no coins to convert");
            return Ok(());
        }

        self.api.convert_coins(coins).await?;
        self.refresh_wallet().await
    }

    /// Presentation snapshot; rendering is a pure function of this value
    pub fn view(&self) -> ViewState {
        let parsed = self.currency.parse_amount(self.draft.raw());
        let submittable = parsed.is_some_and(|v| v > 0.0);

        ViewState {
            authenticated: self.is_authenticated(),
            loading: !self.is_authenticated() || self.fetch_status == RequestStatus::Fetching,
            destination_display: self
                .destinations
                .first()
                .map(PayoutDestination::masked_display)
                .unwrap_or_else(|| "**** **** **** ****".to_string()),
            balance_display: self
                .wallet
                .as_ref()
                .map(|w| self.currency.display_balance(w.spendable)),
            amount_input: self.draft.raw().to_string(),
            unit_label: self.currency.label.clone(),
            submit_enabled: submittable && !self.is_submitting(),
            submitting: self.is_submitting(),
            pending_redirect: match &self.phase {
                Phase::RedirectPending(url) => Some(url.clone()),
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::recording::RecordingNotifier;
    use crate::session::SessionToken;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum SubmitBehavior {
        Accept(Option<String>),
        Reject(String),
        NetworkFail,
    }

    struct MockApi {
        wallet: Mutex<Option<WalletSnapshot>>,
        destinations: Mutex<Vec<PayoutDestination>>,
        onboarding_url: Mutex<Option<String>>,
        submit_behavior: Mutex<SubmitBehavior>,
        wallet_calls: AtomicUsize,
        destination_calls: AtomicUsize,
        connect_calls: AtomicUsize,
        submit_calls: AtomicUsize,
        convert_calls: AtomicUsize,
    }

    impl MockApi {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                wallet: Mutex::new(None),
                destinations: Mutex::new(Vec::new()),
                onboarding_url: Mutex::new(None),
                submit_behavior: Mutex::new(SubmitBehavior::Accept(None)),
                wallet_calls: AtomicUsize::new(0),
                destination_calls: AtomicUsize::new(0),
                connect_calls: AtomicUsize::new(0),
                submit_calls: AtomicUsize::new(0),
                convert_calls: AtomicUsize::new(0),
            })
        }

        fn set_wallet(&self, spendable: f64, configured: bool) {
            *self.wallet.lock().unwrap() = Some(WalletSnapshot {
                spendable,
                secondary_units: 0,
                usd_value: Some(spendable),
                payout_destination_configured: configured,
            });
        }

        fn set_coins(&self, coins: u64) {
            if let Some(wallet) = self.wallet.lock().unwrap().as_mut() {
                wallet.secondary_units = coins;
            }
        }

        fn set_destination(&self, id: &str, routing: &str) {
            *self.destinations.lock().unwrap() = vec![PayoutDestination {
                id: id.to_string(),
                routing_number: Some(routing.to_string()),
            }];
        }

        fn break_wallet(&self) {
            *self.wallet.lock().unwrap() = None;
        }
    }

    #[async_trait]
    impl WalletApi for MockApi {
        async fn fetch_wallet(&self) -> Result<WalletSnapshot> {
            self.wallet_calls.fetch_add(1, Ordering::SeqCst);
            self.wallet
                .lock()
                .unwrap()
                .clone()
                .ok_or_else(|| Error::Http("wallet endpoint down".into()))
        }

        async fn fetch_destinations(&self) -> Result<Vec<PayoutDestination>> {
            self.destination_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.destinations.lock().unwrap().clone())
        }

        async fn connect_account(&self) -> Result<Option<String>> {
            self.connect_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.onboarding_url.lock().unwrap().clone())
        }

        async fn submit_withdrawal(&self, _request: &WithdrawalRequest) -> Result<SubmitReceipt> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            match self.submit_behavior.lock().unwrap().clone() {
                SubmitBehavior::Accept(message) => Ok(SubmitReceipt {
                    message,
                    submitted_at: Utc::now(),
                }),
                SubmitBehavior::Reject(message) => Err(Error::ServerRejection(message)),
                SubmitBehavior::NetworkFail => Err(Error::Http("connection reset".into())),
            }
        }

        async fn convert_coins(&self, _coins: u64) -> Result<()> {
            self.convert_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn authed_ctx() -> SessionContext {
        SessionContext::with_token(SessionToken::new("token-0123456789ab"))
    }

    fn flow_with(
        api: &Arc<MockApi>,
        notifier: &Arc<RecordingNotifier>,
        currency: CurrencySpec,
    ) -> WithdrawalFlow<Arc<MockApi>, Arc<RecordingNotifier>> {
        WithdrawalFlow::new(authed_ctx(), currency, Arc::clone(api), Arc::clone(notifier))
    }

    #[tokio::test]
    async fn test_input_clamped_to_available_balance() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("150");
        assert_eq!(flow.draft().raw(), "100");

        flow.input_changed("80");
        assert_eq!(flow.draft().raw(), "80");

        flow.input_changed("100");
        assert_eq!(flow.draft().raw(), "100");
    }

    #[tokio::test]
    async fn test_non_numeric_input_retained_verbatim() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("abc");
        assert_eq!(flow.draft().raw(), "abc");
    }

    #[tokio::test]
    async fn test_nonpositive_amount_rejected_without_network_call() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        for raw in ["", "0", "-5", "abc"] {
            flow.input_changed(raw);
            let err = flow.submit().await.unwrap_err();
            assert!(matches!(err, Error::InvalidAmount), "input {:?}", raw);
        }

        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            notifier.errors.lock().unwrap().last().unwrap(),
            "Please enter a valid amount."
        );
    }

    #[tokio::test]
    async fn test_submit_time_balance_check_catches_shrunk_balance() {
        let api = MockApi::new();
        api.set_wallet(50.0, true);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("30");

        // Balance moved under us between input and submit
        api.set_wallet(20.0, true);
        flow.refresh_wallet().await.unwrap();

        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, Error::ExceedsBalance { .. }));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            notifier.errors.lock().unwrap().last().unwrap(),
            "You cannot withdraw more than your available balance (20 USD)."
        );
        // Draft preserved for correction
        assert_eq!(flow.draft().raw(), "30");
    }

    #[tokio::test]
    async fn test_missing_destination_blocks_before_network() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("10");
        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, Error::NoDestination));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            notifier.errors.lock().unwrap().last().unwrap(),
            "No bank account linked."
        );
    }

    #[tokio::test]
    async fn test_unconfigured_destination_blocks_submission() {
        let api = MockApi::new();
        api.set_wallet(100.0, false);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        // Plain refreshes: the onboarding gate has not resolved yet
        flow.refresh_wallet().await.unwrap();
        flow.refresh_destinations().await.unwrap();

        flow.input_changed("10");
        let err = flow.submit().await.unwrap_err();

        // A destination on file does not count until onboarding is complete
        assert!(matches!(err, Error::NoDestination));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            notifier.errors.lock().unwrap().last().unwrap(),
            "No bank account linked."
        );
    }

    #[tokio::test]
    async fn test_submission_blocked_before_first_wallet_fetch() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        // No start(): configuration state is unknown and the balance reads
        // as zero, so the clamp floors the draft and validation rejects it

        flow.input_changed("10");
        assert_eq!(flow.draft().raw(), "0");

        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, Error::InvalidAmount));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_begin_submit_refuses_while_in_flight() {
        let api = MockApi::new();
        api.set_wallet(50.0, true);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("30");
        let request = flow.begin_submit().unwrap();
        assert!(flow.is_submitting());

        // Second trigger while in flight: refused, and silently (disabled
        // control, not an error toast)
        let err = flow.begin_submit().unwrap_err();
        assert!(matches!(err, Error::SubmissionInFlight));
        assert!(notifier.errors.lock().unwrap().is_empty());

        flow.complete_submit(
            &request,
            Ok(SubmitReceipt {
                message: None,
                submitted_at: Utc::now(),
            }),
        )
        .unwrap();
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn test_successful_submit_notifies_and_clears_draft() {
        let api = MockApi::new();
        api.set_wallet(50.0, true);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("30");
        flow.submit().await.unwrap();

        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 1);
        let successes = notifier.successes.lock().unwrap();
        assert_eq!(
            successes[0],
            "You've requested to withdraw 30. Your request is now under review."
        );
        assert_eq!(flow.draft().raw(), "");
        // Wallet refreshed to reflect the pending-review state
        assert!(api.wallet_calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_rejected_submit_surfaces_server_message_and_keeps_draft() {
        let api = MockApi::new();
        api.set_wallet(50.0, true);
        api.set_destination("dest-1", "021000021");
        *api.submit_behavior.lock().unwrap() =
            SubmitBehavior::Reject("Withdrawal limit reached".into());
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("30");
        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, Error::ServerRejection(_)));
        assert_eq!(
            notifier.errors.lock().unwrap().last().unwrap(),
            "Withdrawal limit reached"
        );
        assert_eq!(flow.draft().raw(), "30");
        assert!(!flow.is_submitting());
    }

    #[tokio::test]
    async fn test_network_failure_uses_generic_fallback() {
        let api = MockApi::new();
        api.set_wallet(50.0, true);
        api.set_destination("dest-1", "021000021");
        *api.submit_behavior.lock().unwrap() = SubmitBehavior::NetworkFail;
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        flow.input_changed("30");
        assert!(flow.submit().await.is_err());
        assert_eq!(
            notifier.errors.lock().unwrap().last().unwrap(),
            "Something went wrong with withdrawal."
        );
        assert_eq!(flow.draft().raw(), "30");
    }

    #[tokio::test]
    async fn test_unauthenticated_start_issues_no_fetches() {
        let api = MockApi::new();
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = WithdrawalFlow::new(
            SessionContext::unauthenticated(),
            CurrencySpec::fiat(),
            Arc::clone(&api),
            Arc::clone(&notifier),
        );

        flow.start().await.unwrap();

        assert_eq!(api.wallet_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.destination_calls.load(Ordering::SeqCst), 0);
        assert_eq!(api.connect_calls.load(Ordering::SeqCst), 0);

        let view = flow.view();
        assert!(!view.authenticated);
        assert!(view.loading);
    }

    #[tokio::test]
    async fn test_onboarding_gate_parks_flow_in_redirect_pending() {
        let api = MockApi::new();
        api.set_wallet(0.0, false);
        *api.onboarding_url.lock().unwrap() =
            Some("https://connect.example.com/onboard/abc".into());
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());

        flow.start().await.unwrap();

        assert_eq!(api.connect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            flow.phase(),
            &Phase::RedirectPending("https://connect.example.com/onboard/abc".into())
        );
        assert_eq!(
            flow.view().pending_redirect.as_deref(),
            Some("https://connect.example.com/onboard/abc")
        );
    }

    #[tokio::test]
    async fn test_onboarding_gate_skipped_when_already_configured() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());

        flow.start().await.unwrap();

        assert_eq!(api.connect_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.phase(), &Phase::Idle);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_prior_snapshot() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();
        assert_eq!(flow.wallet().unwrap().spendable, 100.0);

        api.break_wallet();
        assert!(flow.refresh_wallet().await.is_err());

        // Stale snapshot still shown, nothing surfaced to the user
        assert_eq!(flow.wallet().unwrap().spendable, 100.0);
        assert!(notifier.errors.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fractional_diamond_amount_is_invalid() {
        let api = MockApi::new();
        api.set_wallet(320.0, true);
        api.set_destination("dest-1", "021000021");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::diamond());
        flow.start().await.unwrap();

        flow.input_changed("12.5");
        let err = flow.submit().await.unwrap_err();
        assert!(matches!(err, Error::InvalidAmount));
        assert_eq!(api.submit_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_convert_coins_posts_balance_and_refreshes() {
        let api = MockApi::new();
        api.set_wallet(320.0, true);
        api.set_coins(1500);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::diamond());
        flow.start().await.unwrap();

        flow.convert_coins().await.unwrap();

        assert_eq!(api.convert_calls.load(Ordering::SeqCst), 1);
        assert!(api.wallet_calls.load(Ordering::SeqCst) >= 2);
    }

    #[tokio::test]
    async fn test_convert_coins_rejected_on_fiat_variant() {
        let api = MockApi::new();
        api.set_wallet(100.0, true);
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();

        let err = flow.convert_coins().await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedVariant(_)));
        assert_eq!(api.convert_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_view_renders_masked_destination_and_balance() {
        let api = MockApi::new();
        api.set_wallet(50.0, true);
        api.set_destination("dest-1", "110000123");
        let notifier = Arc::new(RecordingNotifier::default());
        let mut flow = flow_with(&api, &notifier, CurrencySpec::fiat());
        flow.start().await.unwrap();
        flow.input_changed("30");

        let view = flow.view();
        assert!(view.authenticated);
        assert!(!view.loading);
        assert_eq!(view.destination_display, "**** **** **** 0123");
        assert_eq!(view.balance_display.as_deref(), Some("50 USD"));
        assert_eq!(view.amount_input, "30");
        assert_eq!(view.unit_label, "USD");
        assert!(view.submit_enabled);
        assert!(!view.submitting);
    }
}
