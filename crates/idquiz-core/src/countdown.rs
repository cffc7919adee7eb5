//! Per-trial countdown.
//!
//! A [`Countdown`] is a cancellable scheduled advance expressed in ticks. It is
//! armed for exactly one [`TrialToken`]; arming again with the same token is a
//! no-op, so redrawing a trial never restarts its clock. When the last tick
//! lands the countdown disarms itself and hands back the token it was armed
//! with. The caller passes that token to the session, which rejects it if the
//! trial has moved on in the meantime.

use crate::session::TrialToken;

/// Outcome of one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Not armed; nothing happened.
    Idle,
    /// Still counting; carries the value left to display.
    Running(u32),
    /// Ran out for this trial. The countdown is now disarmed.
    Expired(TrialToken),
}

#[derive(Debug, Clone)]
pub struct Countdown {
    ticks: u32,
    remaining: u32,
    armed: Option<TrialToken>,
}

impl Countdown {
    /// Countdown of `ticks` ticks per trial (at least one).
    pub fn new(ticks: u32) -> Self {
        let ticks = ticks.max(1);
        Self {
            ticks,
            remaining: ticks,
            armed: None,
        }
    }

    /// Start counting for `token`. Returns `false` without touching the
    /// counter when already armed for the same token.
    pub fn arm(&mut self, token: TrialToken) -> bool {
        if self.armed == Some(token) {
            return false;
        }
        self.armed = Some(token);
        self.remaining = self.ticks;
        true
    }

    /// Disarm. Returns the token that was pending, if any.
    pub fn cancel(&mut self) -> Option<TrialToken> {
        self.remaining = self.ticks;
        self.armed.take()
    }

    pub fn tick(&mut self) -> Tick {
        let Some(token) = self.armed else {
            return Tick::Idle;
        };
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.cancel();
            Tick::Expired(token)
        } else {
            Tick::Running(self.remaining)
        }
    }

    /// Value to display, `None` while disarmed.
    pub fn remaining(&self) -> Option<u32> {
        self.armed.map(|_| self.remaining)
    }

    pub fn armed_for(&self) -> Option<TrialToken> {
        self.armed
    }

    pub fn ticks(&self) -> u32 {
        self.ticks
    }
}
