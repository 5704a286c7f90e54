//! Single-slot event delivered at most once
//!
//! Emitting overwrites any value nobody has taken yet. Taking a value clears
//! the slot, so a late observer never sees an event that was already handled.

use std::sync::{Mutex, PoisonError};
use tokio::sync::Notify;

/// One-shot event channel with a single pending slot
#[derive(Debug)]
pub struct SingleLiveEvent<T> {
    slot: Mutex<Option<T>>,
    notify: Notify,
}

impl<T> SingleLiveEvent<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(None),
            notify: Notify::new(),
        }
    }

    /// Publish a value, replacing any undelivered one
    pub fn emit(&self, value: T) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);
        self.notify.notify_one();
    }

    /// Take the pending value without waiting
    pub fn try_take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Wait for the next value and take it
    pub async fn next(&self) -> T {
        loop {
            let notified = self.notify.notified();
            if let Some(value) = self.try_take() {
                return value;
            }
            notified.await;
        }
    }
}

impl<T> Default for SingleLiveEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}
