//! Trial session state machine.
//!
//! A [`QuizSession`] walks the reference images in catalog order. Each trial
//! pairs one reference with the next method in round-robin order and a fresh
//! option set. Exactly one response closes a trial, whether it comes from the
//! participant ([`QuizSession::respond`]) or from an expired countdown
//! ([`QuizSession::expire`]); both go through the same advance path.
//!
//! Invariant: `responses().len() == trial_index()` while active, and
//! `== total_trials()` once finished.

use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{AssetRecord, CatalogIndex, Method, Person};
use crate::error::{QuizError, Result};
use crate::sampler::{TrialOption, generate_options};
use crate::scoring::TimeoutPolicy;

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Settings for one quiz run.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Countdown length per trial, in ticks.
    pub countdown_ticks: u32,
    /// How timed-out trials are scored.
    pub timeout_policy: TimeoutPolicy,
    /// RNG seed for reproducible option sets; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            countdown_ticks: 5,
            timeout_policy: TimeoutPolicy::default(),
            seed: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Records and tokens
// ---------------------------------------------------------------------------

/// Lifecycle of a session. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Active,
    Finished,
}

/// Names one trial of one session. A countdown carries the token it was
/// armed for so a late expiry can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrialToken {
    pub session: Uuid,
    pub trial: usize,
}

/// One completed trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    pub original_person: Person,
    /// `None` when the countdown ran out.
    pub selected_person: Option<Person>,
    pub correct: bool,
    pub method: Method,
    pub intensity: Option<u32>,
}

impl TrialRecord {
    pub fn timed_out(&self) -> bool {
        self.selected_person.is_none()
    }
}

/// Result of closing a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// A new trial is active.
    Next(TrialToken),
    /// That was the last trial.
    Finished,
}

/// Everything a front-end needs to draw the active trial.
#[derive(Debug, Clone)]
pub struct TrialView<'a> {
    pub token: TrialToken,
    pub reference: &'a AssetRecord,
    pub method: Method,
    /// Intensity shown for the trial (that of the first option); `None` for mask.
    pub intensity: Option<u32>,
    pub options: &'a [TrialOption],
    /// 1-based trial number.
    pub position: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

pub struct QuizSession<R> {
    id: Uuid,
    catalog: CatalogIndex,
    rng: R,
    reference_index: usize,
    current_method: Method,
    current_options: Vec<TrialOption>,
    responses: Vec<TrialRecord>,
    phase: Phase,
}

impl<R: Rng> QuizSession<R> {
    /// Start a session on the first reference image and first method.
    ///
    /// Fails if any method pool lacks an image of some identity, since such a
    /// pool cannot always produce a full option set.
    pub fn new(catalog: CatalogIndex, mut rng: R) -> Result<Self> {
        if let Some(&(method, person)) = catalog.coverage_gaps(&Person::ALL).first() {
            return Err(QuizError::MissingCoverage { method, person });
        }

        let method = catalog.first_method();
        let current_options = {
            let reference = &catalog.reference_images()[0];
            let pool = catalog.pool(method).ok_or(QuizError::NoMethods)?;
            generate_options(reference, pool, &mut rng)?
        };

        let id = Uuid::new_v4();
        log::info!(
            "session {id} started: {} trials, methods [{}]",
            catalog.reference_images().len(),
            catalog
                .methods()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            id,
            catalog,
            rng,
            reference_index: 0,
            current_method: method,
            current_options,
            responses: Vec::new(),
            phase: Phase::Active,
        })
    }

    /// Participant picked `selected` for the active trial. Only a person
    /// among the current options can be picked.
    pub fn respond(&mut self, selected: Person) -> Result<Advance> {
        if self.phase == Phase::Finished {
            return Err(QuizError::SessionFinished);
        }
        if !self.current_options.iter().any(|o| o.person == selected) {
            return Err(QuizError::NotAnOption(selected));
        }
        self.close_trial(Some(selected))
    }

    /// The countdown armed with `token` ran out. Rejected unless `token`
    /// still names the active trial.
    pub fn expire(&mut self, token: TrialToken) -> Result<Advance> {
        if self.phase == Phase::Finished {
            return Err(QuizError::SessionFinished);
        }
        let current = self.token();
        if token != current {
            return Err(QuizError::StaleTimer {
                expected: current.trial,
                got: token.trial,
            });
        }
        self.close_trial(None)
    }

    /// Record the response for the active trial, then move to the next one
    /// or finish. The next option set is sampled before anything is
    /// committed, so a failure leaves the session untouched.
    fn close_trial(&mut self, selected: Option<Person>) -> Result<Advance> {
        if self.phase == Phase::Finished {
            return Err(QuizError::SessionFinished);
        }

        let reference = &self.catalog.reference_images()[self.reference_index];
        let correct_person = reference.person;
        let answered = selected.unwrap_or(correct_person);
        let intensity = self
            .current_options
            .iter()
            .find(|o| o.person == answered)
            .and_then(|o| o.intensity);
        let record = TrialRecord {
            original_person: correct_person,
            selected_person: selected,
            correct: selected == Some(correct_person),
            method: self.current_method,
            intensity,
        };

        let next_index = self.reference_index + 1;
        if next_index >= self.total_trials() {
            self.responses.push(record);
            self.phase = Phase::Finished;
            log::info!(
                "session {} finished after {} trials",
                self.id,
                self.responses.len()
            );
            return Ok(Advance::Finished);
        }

        let next_method = self.catalog.next_method(self.current_method);
        let next_options = {
            let reference = &self.catalog.reference_images()[next_index];
            let pool = self.catalog.pool(next_method).ok_or(QuizError::NoMethods)?;
            generate_options(reference, pool, &mut self.rng)?
        };

        log::debug!(
            "trial {} closed ({}): {} -> trial {} on {}",
            self.reference_index,
            match record.selected_person {
                Some(p) => p.to_string(),
                None => "timeout".to_string(),
            },
            if record.correct { "correct" } else { "incorrect" },
            next_index,
            next_method
        );

        self.responses.push(record);
        self.reference_index = next_index;
        self.current_method = next_method;
        self.current_options = next_options;
        Ok(Advance::Next(self.token()))
    }

    // --- Accessors ---

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Token of the active trial. Once finished it names the slot past the
    /// last trial, which no countdown is ever armed for.
    pub fn token(&self) -> TrialToken {
        let trial = match self.phase {
            Phase::Active => self.reference_index,
            Phase::Finished => self.total_trials(),
        };
        TrialToken {
            session: self.id,
            trial,
        }
    }

    /// Index of the active trial (equals `total_trials()` once finished).
    pub fn trial_index(&self) -> usize {
        self.token().trial
    }

    pub fn total_trials(&self) -> usize {
        self.catalog.reference_images().len()
    }

    pub fn current_options(&self) -> &[TrialOption] {
        &self.current_options
    }

    pub fn responses(&self) -> &[TrialRecord] {
        &self.responses
    }

    /// Snapshot of the active trial, `None` once finished.
    pub fn view(&self) -> Option<TrialView<'_>> {
        if self.phase == Phase::Finished {
            return None;
        }
        Some(TrialView {
            token: self.token(),
            reference: &self.catalog.reference_images()[self.reference_index],
            method: self.current_method,
            intensity: if self.current_method.has_intensity() {
                self.current_options.first().and_then(|o| o.intensity)
            } else {
                None
            },
            options: &self.current_options,
            position: self.reference_index + 1,
            total: self.total_trials(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    /// Catalog with one reference per listed person and full pools for every
    /// listed method (intensities 50 and 75 for graded methods).
    pub(crate) fn catalog(refs: &[Person], methods: &[Method]) -> CatalogIndex {
        let mut records = Vec::new();
        for &person in refs {
            records.push(AssetRecord {
                file: format!("{person}.jpg"),
                method: Method::Original,
                intensity: None,
                person,
            });
        }
        for &method in methods {
            for person in Person::ALL {
                let strengths: &[Option<u32>] = if method.has_intensity() {
                    &[Some(50), Some(75)]
                } else {
                    &[None]
                };
                for &intensity in strengths {
                    records.push(AssetRecord {
                        file: format!("{person}_{method}_{intensity:?}.jpg"),
                        method,
                        intensity,
                        person,
                    });
                }
            }
        }
        CatalogIndex::new(records).unwrap()
    }

    fn session(refs: &[Person], methods: &[Method]) -> QuizSession<StdRng> {
        QuizSession::new(catalog(refs, methods), StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn test_starts_on_first_reference_and_method() {
        let s = session(&[Person::P4, Person::P1], &[Method::Pixel, Method::Blur]);
        let view = s.view().unwrap();
        assert_eq!(view.reference.person, Person::P4);
        assert_eq!(view.method, Method::Pixel);
        assert_eq!(view.options.len(), 6);
        assert_eq!((view.position, view.total), (1, 2));
        assert_eq!(s.phase(), Phase::Active);
        assert!(s.responses().is_empty());
    }

    #[test]
    fn test_responses_track_trial_index() {
        let refs = [Person::P1, Person::P2, Person::P3, Person::P4, Person::P5];
        let mut s = session(&refs, &Method::PROCESSED);
        for i in 0..refs.len() {
            assert_eq!(s.responses().len(), s.trial_index());
            assert_eq!(s.trial_index(), i);
            let pick = s.current_options()[0].person;
            s.respond(pick).unwrap();
        }
        assert!(s.is_finished());
        assert_eq!(s.responses().len(), refs.len());
        assert_eq!(s.trial_index(), s.total_trials());
    }

    #[test]
    fn test_methods_cycle_round_robin() {
        let refs = [Person::P1, Person::P2, Person::P3, Person::P4, Person::P5];
        let mut s = session(&refs, &Method::PROCESSED);
        while !s.is_finished() {
            let pick = s.current_options()[0].person;
            s.respond(pick).unwrap();
        }
        let methods: Vec<Method> = s.responses().iter().map(|r| r.method).collect();
        assert_eq!(
            methods,
            vec![
                Method::Blur,
                Method::Mask,
                Method::Pixel,
                Method::Blur,
                Method::Mask
            ]
        );
    }

    #[test]
    fn test_record_correctness_and_intensity() {
        let mut s = session(&[Person::P3, Person::P6], &[Method::Blur]);
        let expected = s
            .current_options()
            .iter()
            .find(|o| o.person == Person::P3)
            .unwrap()
            .intensity;
        s.respond(Person::P3).unwrap();

        let wrong = s
            .current_options()
            .iter()
            .find(|o| o.person != Person::P6)
            .unwrap()
            .clone();
        s.respond(wrong.person).unwrap();

        let r = s.responses();
        assert_eq!(r[0].original_person, Person::P3);
        assert_eq!(r[0].selected_person, Some(Person::P3));
        assert!(r[0].correct);
        assert_eq!(r[0].intensity, expected);
        assert_eq!(r[1].original_person, Person::P6);
        assert!(!r[1].correct);
        assert_eq!(r[1].intensity, wrong.intensity);
    }

    #[test]
    fn test_respond_after_finish_is_rejected() {
        let mut s = session(&[Person::P1], &[Method::Mask]);
        assert_eq!(s.respond(Person::P1).unwrap(), Advance::Finished);
        let err = s.respond(Person::P1).unwrap_err();
        assert!(matches!(err, QuizError::SessionFinished));
        assert!(!err.is_configuration());
        assert_eq!(s.responses().len(), 1);
        assert!(s.view().is_none());
    }

    #[test]
    fn test_unoffered_person_is_rejected() {
        let mut s = session(&[Person::P1, Person::P2], &[Method::Blur]);
        let absent = Person::ALL
            .into_iter()
            .find(|p| s.current_options().iter().all(|o| o.person != *p))
            .unwrap();
        let token = s.token();

        let err = s.respond(absent).unwrap_err();
        assert!(matches!(err, QuizError::NotAnOption(p) if p == absent));
        assert!(!err.is_configuration());
        assert!(s.responses().is_empty());
        assert_eq!(s.token(), token);

        // The trial is still open to a valid answer.
        s.respond(Person::P1).unwrap();
        let r = &s.responses()[0];
        assert!(r.correct);
        assert!(r.intensity.is_some());
    }

    #[test]
    fn test_expire_records_timeout() {
        let mut s = session(&[Person::P2, Person::P5], &[Method::Blur]);
        let token = s.token();
        let advance = s.expire(token).unwrap();
        assert_eq!(advance, Advance::Next(s.token()));

        let r = &s.responses()[0];
        assert!(r.timed_out());
        assert!(!r.correct);
        assert_eq!(r.original_person, Person::P2);
        assert!(r.intensity.is_some());
    }

    #[test]
    fn test_stale_expire_is_discarded() {
        let mut s = session(&[Person::P2, Person::P5, Person::P7], &[Method::Blur]);
        let token = s.token();
        s.respond(Person::P2).unwrap();

        let err = s.expire(token).unwrap_err();
        assert!(matches!(
            err,
            QuizError::StaleTimer {
                expected: 1,
                got: 0
            }
        ));
        assert_eq!(s.responses().len(), 1);
        assert_eq!(s.trial_index(), 1);
    }

    #[test]
    fn test_token_from_other_session_is_stale() {
        let mut a = session(&[Person::P1, Person::P2], &[Method::Blur]);
        let b = session(&[Person::P1, Person::P2], &[Method::Blur]);
        assert!(a.expire(b.token()).is_err());
        assert!(a.responses().is_empty());
    }

    #[test]
    fn test_expire_after_finish() {
        let mut s = session(&[Person::P1], &[Method::Blur]);
        let token = s.token();
        s.respond(Person::P1).unwrap();
        assert!(matches!(s.expire(token), Err(QuizError::SessionFinished)));
        assert_eq!(s.responses().len(), 1);
    }

    #[test]
    fn test_mask_view_has_no_intensity() {
        let s = session(&[Person::P1], &[Method::Mask]);
        assert_eq!(s.view().unwrap().intensity, None);
        let s = session(&[Person::P1], &[Method::Blur]);
        assert!(s.view().unwrap().intensity.is_some());
    }

    #[test]
    fn test_coverage_gap_blocks_start() {
        let mut records = vec![AssetRecord {
            file: "p1.jpg".into(),
            method: Method::Original,
            intensity: None,
            person: Person::P1,
        }];
        for person in &Person::ALL[..7] {
            records.push(AssetRecord {
                file: format!("{person}_b.jpg"),
                method: Method::Blur,
                intensity: Some(50),
                person: *person,
            });
        }
        let index = CatalogIndex::new(records).unwrap();
        let err = QuizSession::new(index, StdRng::seed_from_u64(1))
            .err()
            .unwrap();
        assert!(matches!(
            err,
            QuizError::MissingCoverage {
                method: Method::Blur,
                person: Person::P8
            }
        ));
    }

    #[test]
    fn test_same_seed_same_session() {
        let a = QuizSession::new(
            catalog(&[Person::P1, Person::P2], &Method::PROCESSED),
            StdRng::seed_from_u64(9),
        )
        .unwrap();
        let b = QuizSession::new(
            catalog(&[Person::P1, Person::P2], &Method::PROCESSED),
            StdRng::seed_from_u64(9),
        )
        .unwrap();
        assert_eq!(a.current_options(), b.current_options());
        assert_ne!(a.id(), b.id());
    }
}
