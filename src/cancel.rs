/*
 * SPDX-License-Identifier: MIT
 */

//! Cooperative cancellation for render loops.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// A cloneable flag a signal handler or another thread can raise to stop a
/// running [`render_loop`](crate::Strand::render_loop).
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_flag() {
        let token = CancelToken::new();
        let peer = token.clone();
        assert!(!peer.is_cancelled());

        let handle = std::thread::spawn(move || token.cancel());
        handle.join().unwrap();
        assert!(peer.is_cancelled());
    }
}
