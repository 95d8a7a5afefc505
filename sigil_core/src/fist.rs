//! Debounced fist detection and the break/recovery state machine.
//!
//! One [`FistMachine`] exists per hand index.  It consumes that hand's
//! openness and the tick timestamp, and reports whether this frame fired a
//! break or ended one.  Applying the consequences (parameter reset, shard
//! burst, sound) is left to the caller.
//!
//! ```text
//!            openness < threshold held ≥ hold duration
//!   Normal ─────────────────────────────────────────────▶ Broken
//!     ▲                                                     │
//!     └──── now > break_end  OR  openness > thr + margin ───┘
//! ```

use std::time::Duration;

use crate::classifier::Openness;
use crate::config::FistConfig;

// ════════════════════════════════════════════════════════════════════════════
// HoldTimer
// ════════════════════════════════════════════════════════════════════════════

/// Remembers when the current run of sub-threshold openness began.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HoldTimer {
    start: Option<Duration>,
}

impl HoldTimer {
    pub fn started_at(&self) -> Option<Duration> {
        self.start
    }

    /// Start timing if not already running; returns the start time.
    pub fn arm(&mut self, now: Duration) -> Duration {
        *self.start.get_or_insert(now)
    }

    pub fn clear(&mut self) {
        self.start = None;
    }

    /// True once the timer has been running for at least `hold`.
    pub fn elapsed_at_least(&self, now: Duration, hold: Duration) -> bool {
        self.start.is_some_and(|s| now.saturating_sub(s) >= hold)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FistState / Transition
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FistState {
    pub is_broken: bool,
    /// Only meaningful while `is_broken`.
    pub break_end: Duration,
}

/// What happened to a hand's state machine this frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    None,
    /// A sustained fist broke the circle.
    Break,
    /// The break ended, by timeout or by opening the hand.
    Recover,
}

// ════════════════════════════════════════════════════════════════════════════
// FistMachine
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FistMachine {
    state: FistState,
    timer: HoldTimer,
}

impl FistMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> FistState {
        self.state
    }

    pub fn timer(&self) -> HoldTimer {
        self.timer
    }

    pub fn is_broken(&self) -> bool {
        self.state.is_broken
    }

    /// Advance one frame.
    ///
    /// A recovery clears the hold timer and then falls through to the fist
    /// check, so a hand that is still clenched when the break times out
    /// starts timing a new hold on the same frame (it cannot re-break until
    /// a full hold has elapsed).
    ///
    /// An `Unknown` openness carries no gesture signal: the hold timer is
    /// left as it is and only the timeout can end a break.
    pub fn update(&mut self, openness: Openness, now: Duration, cfg: &FistConfig) -> Transition {
        let ratio = openness.ratio();
        let mut transition = Transition::None;

        if self.state.is_broken {
            let timed_out = now > self.state.break_end;
            let reopened  = ratio.is_some_and(|r| r > cfg.recovery_threshold());
            if timed_out || reopened {
                self.state.is_broken = false;
                self.timer.clear();
                transition = Transition::Recover;
            } else {
                return Transition::None;
            }
        }

        let Some(ratio) = ratio else { return transition; };

        if ratio < cfg.threshold {
            if self.timer.started_at().is_none() {
                self.timer.arm(now);
            } else if self.timer.elapsed_at_least(now, cfg.hold) {
                self.state = FistState {
                    is_broken: true,
                    break_end: now + cfg.break_duration,
                };
                self.timer.clear();
                transition = Transition::Break;
            }
        } else {
            self.timer.clear();
        }

        transition
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
