//! Notification channel seam
//!
//! Submission outcomes reach the user as toast-style notifications. The
//! controller only decides *what* to announce; the embedder supplies the
//! channel by implementing [`Notifier`].

use tracing::{error, info};

/// Install a default tracing subscriber for embedders that have none.
///
/// Host applications with their own subscriber should skip this; a second
/// install attempt is ignored.
pub fn init_default_subscriber() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("payout_flow=info".parse().expect("static directive")),
        )
        .with_target(true)
        .try_init();
}

/// Sink for user-facing success/error notifications
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn success(&self, message: &str) {
        (**self).success(message)
    }

    fn error(&self, message: &str) {
        (**self).error(message)
    }
}

/// Default notifier that routes notifications to the tracing subscriber
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        info!(target: "payout_flow::notify", "{}", message);
    }

    fn error(&self, message: &str) {
        error!(target: "payout_flow::notify", "{}", message);
    }
}
