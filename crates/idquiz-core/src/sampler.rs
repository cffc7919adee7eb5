//! Multiple-choice option sampling.
//!
//! A trial shows six candidates: the reference's own identity plus five
//! distractors drawn uniformly without replacement from the remaining
//! identities. The display order is an independent uniform shuffle, and each
//! candidate is represented by a uniformly chosen image from the method pool.

use rand::Rng;
use rand::seq::{IndexedRandom, SliceRandom};
use serde::Serialize;

use crate::catalog::{AssetRecord, MethodPool, Person};
use crate::error::{QuizError, Result};

/// Candidates shown per trial.
pub const OPTION_COUNT: usize = 6;

/// One candidate image in a trial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrialOption {
    pub person: Person,
    pub intensity: Option<u32>,
    pub file: String,
}

impl From<&AssetRecord> for TrialOption {
    fn from(record: &AssetRecord) -> Self {
        Self {
            person: record.person,
            intensity: record.intensity,
            file: record.file.clone(),
        }
    }
}

/// Build the option set for `reference` from `pool`, drawing distractors
/// from every known identity.
pub fn generate_options<R: Rng + ?Sized>(
    reference: &AssetRecord,
    pool: &MethodPool,
    rng: &mut R,
) -> Result<Vec<TrialOption>> {
    generate_options_from(&Person::ALL, reference, pool, rng)
}

/// Same as [`generate_options`] with an explicit identity set.
pub fn generate_options_from<R: Rng + ?Sized>(
    identities: &[Person],
    reference: &AssetRecord,
    pool: &MethodPool,
    rng: &mut R,
) -> Result<Vec<TrialOption>> {
    let correct = reference.person;
    let mut others: Vec<Person> = Vec::with_capacity(identities.len());
    for &p in identities {
        if p != correct && !others.contains(&p) {
            others.push(p);
        }
    }

    // The reference's own identity is a candidate whether or not
    // `identities` lists it.
    let candidate_pool = others.len() + 1;
    let distractors = OPTION_COUNT - 1;
    if candidate_pool < OPTION_COUNT {
        return Err(QuizError::TooFewIdentities {
            needed: OPTION_COUNT,
            available: candidate_pool,
        });
    }

    let mut candidates = Vec::with_capacity(OPTION_COUNT);
    candidates.push(correct);
    candidates.extend(others.choose_multiple(rng, distractors).copied());
    candidates.shuffle(rng);

    let mut options = Vec::with_capacity(OPTION_COUNT);
    for person in candidates {
        let images: Vec<&AssetRecord> =
            pool.images.iter().filter(|img| img.person == person).collect();
        let image = images
            .choose(rng)
            .ok_or(QuizError::MissingCoverage {
                method: pool.method,
                person,
            })?;
        options.push(TrialOption::from(*image));
    }
    Ok(options)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
