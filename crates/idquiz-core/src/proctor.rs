//! Single entry point for both advance triggers.
//!
//! The [`Proctor`] owns a session and its countdown. Front-ends feed it
//! participant selections and clock ticks and never touch the session
//! directly, which keeps the two triggers mutually exclusive:
//!
//! - [`Proctor::select`] cancels the pending countdown before advancing;
//! - an expiring countdown hands its token to the session, which discards it
//!   if the trial already advanced.
//!
//! After every advance the countdown is re-armed for the new trial, or left
//! disarmed once the session is finished.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::catalog::{CatalogIndex, Person};
use crate::countdown::{Countdown, Tick};
use crate::error::Result;
use crate::scoring::{ScoreAxes, ScoreReport, TimeoutPolicy, score};
use crate::session::{Advance, QuizConfig, QuizSession, TrialRecord, TrialToken, TrialView};

/// What a clock tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No countdown pending (session finished).
    Idle,
    /// Counting; value left to display.
    Counting(u32),
    /// The active trial timed out and was recorded.
    TimedOut(Advance),
}

pub struct Proctor<R = StdRng> {
    session: QuizSession<R>,
    countdown: Countdown,
    policy: TimeoutPolicy,
    axes: ScoreAxes,
}

impl Proctor<StdRng> {
    /// Start a quiz on `catalog`, seeding the RNG from `config.seed` or the OS.
    pub fn start(catalog: CatalogIndex, config: &QuizConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::with_rng(catalog, config, rng)
    }
}

impl<R: Rng> Proctor<R> {
    pub fn with_rng(catalog: CatalogIndex, config: &QuizConfig, rng: R) -> Result<Self> {
        let axes = ScoreAxes::from_catalog(&catalog);
        let session = QuizSession::new(catalog, rng)?;
        let mut countdown = Countdown::new(config.countdown_ticks);
        countdown.arm(session.token());
        Ok(Self {
            session,
            countdown,
            policy: config.timeout_policy,
            axes,
        })
    }

    /// Participant picked `person` for the active trial. A rejected pick
    /// leaves the pending countdown where it was.
    pub fn select(&mut self, person: Person) -> Result<Advance> {
        let pending = self.countdown.clone();
        self.countdown.cancel();
        match self.session.respond(person) {
            Ok(advance) => {
                self.sync_countdown();
                Ok(advance)
            }
            Err(e) => {
                self.countdown = pending;
                Err(e)
            }
        }
    }

    /// Advance the clock by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        match self.countdown.tick() {
            Tick::Idle => TickOutcome::Idle,
            Tick::Running(left) => TickOutcome::Counting(left),
            Tick::Expired(token) => match self.expire(token) {
                Ok(advance) => TickOutcome::TimedOut(advance),
                Err(_) => TickOutcome::Idle,
            },
        }
    }

    /// Deliver a countdown expiry for `token`. Stale tokens are logged and
    /// rejected without touching the responses.
    pub fn expire(&mut self, token: TrialToken) -> Result<Advance> {
        let result = self.session.expire(token);
        if let Err(e) = &result {
            log::debug!("discarding countdown for trial {}: {e}", token.trial);
        }
        self.sync_countdown();
        result
    }

    fn sync_countdown(&mut self) {
        if self.session.is_finished() {
            self.countdown.cancel();
        } else {
            self.countdown.arm(self.session.token());
        }
    }

    // --- Accessors ---

    pub fn view(&self) -> Option<TrialView<'_>> {
        self.session.view()
    }

    /// Countdown value to display, `None` once finished.
    pub fn countdown(&self) -> Option<u32> {
        self.countdown.remaining()
    }

    /// Full countdown length per trial.
    pub fn countdown_ticks(&self) -> u32 {
        self.countdown.ticks()
    }

    pub fn token(&self) -> TrialToken {
        self.session.token()
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }

    pub fn responses(&self) -> &[TrialRecord] {
        self.session.responses()
    }

    pub fn session(&self) -> &QuizSession<R> {
        &self.session
    }

    pub fn timeout_policy(&self) -> TimeoutPolicy {
        self.policy
    }

    /// Final report, available once the last trial is closed.
    pub fn report(&self) -> Option<ScoreReport> {
        self.is_finished()
            .then(|| score(self.session.responses(), &self.axes, self.policy))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
