//! Viewport sentinel.
//!
//! Watches one designated item (the last rendered post) and reports when it
//! scrolls into the visible window.  The sentinel is edge-triggered: it fires
//! once per transition from hidden to visible, never while the item merely
//! stays on screen.
//!
//! The sentinel only signals.  It knows nothing about loading state; the
//! [`FeedLoader`](crate::loader::FeedLoader) that owns it decides what a
//! signal means.

use std::ops::Range;

use crate::source::PostId;

/// The item a sentinel is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SentinelTarget {
    pub id: PostId,
    /// Position of the item in the feed.
    pub index: usize,
}

#[derive(Debug, Default)]
pub struct Sentinel {
    target: Option<SentinelTarget>,
    visible: bool,
}

impl Sentinel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Disconnect from the current target and attach to `target`.
    ///
    /// Re-arming against the target already observed keeps its visibility
    /// state, so a re-render that did not change the last item produces no
    /// duplicate signal.
    pub fn rearm(&mut self, target: Option<SentinelTarget>) {
        if self.target == target {
            return;
        }
        self.target = target;
        self.visible = false;
    }

    /// Stop observing.  No signal is produced until the next [`rearm`](Self::rearm).
    pub fn disconnect(&mut self) {
        self.rearm(None);
    }

    /// Forget that the target is on screen, keeping it attached.
    ///
    /// The next [`observe`](Self::observe) that sees the target fires again.
    pub fn reset(&mut self) {
        self.visible = false;
    }

    pub fn target(&self) -> Option<SentinelTarget> {
        self.target
    }

    /// Report the currently visible index window.
    ///
    /// Returns `true` exactly when the target has just entered `visible`.
    pub fn observe(&mut self, visible: &Range<usize>) -> bool {
        let Some(target) = self.target else {
            return false;
        };
        let now = visible.contains(&target.index);
        let entered = now && !self.visible;
        self.visible = now;
        entered
    }
}
