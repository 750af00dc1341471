//! Stable-interval button debouncer.
//!
//! A raw level change restarts the interval timer; the debounced level only
//! flips once the raw level has held unchanged for the full interval. Edge
//! flags describe the most recent `update` call and are cleared by the next.

use player_traits::PinId;

#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    pin: PinId,
    interval_ms: u64,
    stable: bool,
    unstable: bool,
    last_change_ms: u64,
    changed: bool,
}

impl ButtonDebouncer {
    pub fn new(pin: PinId, interval_ms: u64) -> Self {
        Self {
            pin,
            interval_ms,
            stable: false,
            unstable: false,
            last_change_ms: 0,
            changed: false,
        }
    }

    /// Seed the debouncer with the current line level. No edge is reported
    /// for the seeded level.
    pub fn attach(&mut self, level: bool, now_ms: u64) {
        self.stable = level;
        self.unstable = level;
        self.last_change_ms = now_ms;
        self.changed = false;
    }

    /// Feed one raw sample. Returns true when the debounced level flipped.
    pub fn update(&mut self, level: bool, now_ms: u64) -> bool {
        self.changed = false;
        if level != self.unstable {
            self.unstable = level;
            self.last_change_ms = now_ms;
        } else if now_ms.saturating_sub(self.last_change_ms) >= self.interval_ms
            && self.stable != self.unstable
        {
            self.stable = self.unstable;
            self.last_change_ms = now_ms;
            self.changed = true;
        }
        self.changed
    }

    /// Debounced level went high on the last update.
    pub fn rose(&self) -> bool {
        self.changed && self.stable
    }

    /// Debounced level went low on the last update.
    pub fn fell(&self) -> bool {
        self.changed && !self.stable
    }

    pub fn is_high(&self) -> bool {
        self.stable
    }

    pub fn pin(&self) -> PinId {
        self.pin
    }
}
