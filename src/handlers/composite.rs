use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::error::DeliveryError;
use crate::models::ledger::WalletUpdate;
use crate::session::SessionId;
use crate::traits::notifier::Notifier;

/// Composite notifier that fans an update out to several notifiers.
///
/// Every notifier is tried; the first failure is returned.
#[derive(Default)]
pub struct CompositeNotifier {
    notifiers: Vec<Arc<dyn Notifier>>,
}

impl CompositeNotifier {
    /// Create a new composite notifier
    pub fn new() -> Self {
        Self { notifiers: Vec::new() }
    }

    /// Add a notifier to the composite
    pub fn add_notifier(&mut self, notifier: Arc<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifiers.len()
    }
}

#[async_trait]
impl Notifier for CompositeNotifier {
    async fn notify(&self, session_id: SessionId, update: &WalletUpdate) -> Result<(), DeliveryError> {
        let mut first_error = None;
        for notifier in &self.notifiers {
            if let Err(e) = notifier.notify(session_id, update).await {
                warn!(session_id, "Notifier failed: {}", e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
