//! Momentum-style speed model.
//!
//! Debounced presses accumulate as hits inside a fixed window. When the
//! window elapses the current speed is decayed by friction first, then the
//! window's hits are added, and the result is clamped to `±max_speed`.

use crate::config::MotionCfg;

#[derive(Debug, Clone)]
pub struct SpeedModel {
    cfg: MotionCfg,
    speed: i16,
    up_hits: u32,
    down_hits: u32,
    window_start_ms: u64,
}

impl SpeedModel {
    pub fn new(cfg: MotionCfg) -> Self {
        Self {
            cfg,
            speed: 0,
            up_hits: 0,
            down_hits: 0,
            window_start_ms: 0,
        }
    }

    /// Zero speed and hit counters and open a fresh window at `now_ms`.
    pub fn restart(&mut self, now_ms: u64) {
        self.speed = 0;
        self.up_hits = 0;
        self.down_hits = 0;
        self.window_start_ms = now_ms;
    }

    /// Count rising edges seen this tick.
    pub fn record(&mut self, up: bool, down: bool) {
        if up {
            self.up_hits = self.up_hits.saturating_add(1);
        }
        if down {
            self.down_hits = self.down_hits.saturating_add(1);
        }
    }

    /// True once strictly more than one window length has passed.
    pub fn window_elapsed(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.window_start_ms) > self.cfg.hit_window_ms
    }

    /// Fold the window if it has elapsed. Returns the new speed when a fold
    /// happened.
    pub fn tick(&mut self, now_ms: u64) -> Option<i16> {
        if self.window_elapsed(now_ms) {
            Some(self.fold(now_ms))
        } else {
            None
        }
    }

    /// Decay, then accumulate, then clamp; resets the hit counters and
    /// restarts the window at `now_ms`.
    pub fn fold(&mut self, now_ms: u64) -> i16 {
        // i64 keeps saturated hit counts from overflowing before the clamp.
        let decayed = i64::from(self.speed) * i64::from(self.cfg.friction_pct) / 100;
        let net_hits = i64::from(self.up_hits) - i64::from(self.down_hits);
        let next = decayed.saturating_add(net_hits.saturating_mul(i64::from(self.cfg.acceleration)));
        self.speed = self.clamp(next);
        tracing::debug!(
            up_hits = self.up_hits,
            down_hits = self.down_hits,
            speed = self.speed,
            "hit window folded"
        );
        self.up_hits = 0;
        self.down_hits = 0;
        self.window_start_ms = now_ms;
        self.speed
    }

    pub fn speed(&self) -> i16 {
        self.speed
    }

    /// Overwrite the speed, clamped to the configured bound.
    pub fn set_speed(&mut self, speed: i16) {
        self.speed = self.clamp(i64::from(speed));
    }

    pub fn hits(&self) -> (u32, u32) {
        (self.up_hits, self.down_hits)
    }

    fn clamp(&self, v: i64) -> i16 {
        let max = i64::from(self.cfg.max_speed);
        let v = v.clamp(-max, max);
        i16::try_from(v).unwrap_or(if v < 0 { i16::MIN } else { i16::MAX })
    }
}
