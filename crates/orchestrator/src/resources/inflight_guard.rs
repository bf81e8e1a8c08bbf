//! RAII guard for the one-call-per-session rule.
//!
//! Holding an [`InFlightGuard`] marks a session as busy. Dropping it, on
//! success, error, cancellation or panic, releases the slot.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

type Slots = HashMap<Uuid, CancellationToken>;

/// Registry of sessions with a gateway call in flight.
#[derive(Clone, Default)]
pub struct InFlightRegistry {
    slots: Arc<Mutex<Slots>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot for `session_id`. Returns `None` if it is taken.
    ///
    /// The registered token is a child of `cancel`, so cancelling either the
    /// caller's token or the registry entry stops the call.
    pub fn acquire(&self, session_id: Uuid, cancel: &CancellationToken) -> Option<InFlightGuard> {
        let mut slots = self.lock();
        if slots.contains_key(&session_id) {
            return None;
        }

        let token = cancel.child_token();
        slots.insert(session_id, token.clone());
        debug!(session_id = %session_id, "In-flight slot acquired");

        Some(InFlightGuard {
            session_id,
            token,
            slots: self.slots.clone(),
        })
    }

    /// Cancels the in-flight call for `session_id`, if any.
    pub fn cancel(&self, session_id: Uuid) -> bool {
        match self.lock().get(&session_id) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    pub fn is_busy(&self, session_id: Uuid) -> bool {
        self.lock().contains_key(&session_id)
    }

    fn lock(&self) -> MutexGuard<'_, Slots> {
        // The map stays consistent across a panic: every mutation is a single insert or remove.
        self.slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub struct InFlightGuard {
    session_id: Uuid,
    token: CancellationToken,
    slots: Arc<Mutex<Slots>>,
}

impl InFlightGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if slots.remove(&self.session_id).is_none() {
            warn!(session_id = %self.session_id, "In-flight slot already released");
        }
        debug!(session_id = %self.session_id, "In-flight slot released");
    }
}
