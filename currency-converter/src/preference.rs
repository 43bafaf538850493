//! Shopper display-currency preference with change notification.

use tokio::sync::watch;

use crate::CurrencyCode;

/// The currency prices are displayed in.
///
/// Components that render prices hold a receiver from [`subscribe`] and
/// re-convert when it changes.
///
/// [`subscribe`]: CurrencyPreference::subscribe
#[derive(Debug)]
pub struct CurrencyPreference {
    tx: watch::Sender<CurrencyCode>,
}

impl CurrencyPreference {
    pub fn new(initial: CurrencyCode) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn current(&self) -> CurrencyCode {
        self.tx.borrow().clone()
    }

    /// Switches the preference. Subscribers are notified only when the value
    /// actually changes; returns whether it did.
    pub fn set(&self, currency: CurrencyCode) -> bool {
        let changed = self.tx.send_if_modified(|current| {
            if *current == currency {
                return false;
            }
            *current = currency.clone();
            true
        });
        if changed {
            tracing::debug!(%currency, "Display currency changed");
        }
        changed
    }

    pub fn subscribe(&self) -> watch::Receiver<CurrencyCode> {
        self.tx.subscribe()
    }
}

impl Default for CurrencyPreference {
    fn default() -> Self {
        Self::new(CurrencyCode::default())
    }
}
