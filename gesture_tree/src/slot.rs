//! Latest-value hand signal cell shared between the tracker thread and the
//! render loop.
//!
//! Last writer wins.  Reads return the whole signal together with the
//! sequence number it was published under, so the reader can tell a fresh
//! frame from one it has already consumed.

use std::sync::{Arc, Mutex, MutexGuard};

use hand_signal::HandSignal;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stamped {
    /// 0 until the first publish.
    pub seq:    u64,
    pub signal: HandSignal,
}

impl Default for Stamped {
    fn default() -> Self {
        Stamped { seq: 0, signal: HandSignal::ABSENT }
    }
}

#[derive(Clone, Default)]
pub struct SignalSlot {
    inner: Arc<Mutex<Stamped>>,
}

impl SignalSlot {
    pub fn new() -> Self { SignalSlot::default() }

    /// Replace the stored signal; returns its sequence number.
    pub fn publish(&self, signal: HandSignal) -> u64 {
        let mut cell = self.lock();
        cell.seq += 1;
        cell.signal = signal;
        cell.seq
    }

    pub fn latest(&self) -> Stamped {
        *self.lock()
    }

    // The cell is a plain `Copy` value; poisoning cannot leave it half-written.
    fn lock(&self) -> MutexGuard<'_, Stamped> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
