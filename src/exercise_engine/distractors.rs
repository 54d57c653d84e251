//! Bounded rejection sampling of wrong answers.
//!
//! A candidate is rejected when its string form equals the correct answer or
//! an already accepted candidate, or when it fails the validity predicate.
//! Structural candidates (the "classic mistakes" a topic knows about) are
//! tried first, then random perturbations drawn from the session until the
//! attempt budget runs out, then a deterministic fallback sequence.  Only if
//! that sequence is also exhausted does the caller see
//! `DistractorExhaustion`.

use std::collections::HashSet;
use std::fmt::Display;

use tracing::warn;

use crate::exercise_engine::{
    error::{EngineError, Result},
    session::PrngSession,
};

pub const DEFAULT_DISTRACTOR_COUNT: usize = 3;
pub const DEFAULT_MAX_ATTEMPTS: usize = 1000;

pub struct Distractors<T> {
    correct: T,
    count: usize,
    max_attempts: usize,
    structural: Vec<T>,
    valid: Box<dyn Fn(&T) -> bool>,
}

impl<T: Display + Clone + 'static> Distractors<T> {
    pub fn new(correct: T) -> Self {
        Distractors {
            correct,
            count: DEFAULT_DISTRACTOR_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            structural: Vec::new(),
            valid: Box::new(|_: &T| true),
        }
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = count;
        self
    }

    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Candidates tried, in order, before any random draw.
    pub fn structural(mut self, candidates: impl IntoIterator<Item = T>) -> Self {
        self.structural.extend(candidates);
        self
    }

    pub fn valid(mut self, predicate: impl Fn(&T) -> bool + 'static) -> Self {
        self.valid = Box::new(predicate);
        self
    }

    /// Run the sampler.
    ///
    /// `perturb` draws one random candidate; `fallback(i)` yields the `i`-th
    /// element of a deterministic sequence used once `max_attempts` draws
    /// have not produced enough candidates.  The sequence is walked for at
    /// most `max_attempts` steps as well.
    pub fn synthesize(
        self,
        session: &mut PrngSession,
        mut perturb: impl FnMut(&mut PrngSession) -> T,
        mut fallback: impl FnMut(usize) -> T,
    ) -> Result<Vec<T>> {
        let Distractors { correct, count, max_attempts, structural, valid } = self;

        let mut keys: HashSet<String> = HashSet::new();
        keys.insert(correct.to_string());
        let mut accepted: Vec<T> = Vec::with_capacity(count);

        let mut offer = |candidate: T, accepted: &mut Vec<T>| {
            if accepted.len() < count && valid(&candidate) && keys.insert(candidate.to_string()) {
                accepted.push(candidate);
            }
        };

        for candidate in structural {
            offer(candidate, &mut accepted);
        }

        let mut attempts = 0;
        while accepted.len() < count && attempts < max_attempts {
            let candidate = perturb(session);
            offer(candidate, &mut accepted);
            attempts += 1;
        }

        if accepted.len() < count {
            warn!(
                correct = %correct,
                found = accepted.len(),
                wanted = count,
                max_attempts,
                "distractor attempt budget exhausted, walking fallback sequence"
            );
            let mut step = 0;
            while accepted.len() < count && step < max_attempts {
                offer(fallback(step), &mut accepted);
                step += 1;
            }
        }

        if accepted.len() < count {
            return Err(EngineError::DistractorExhaustion {
                correct: correct.to_string(),
                wanted: count,
                found: accepted.len(),
            });
        }
        Ok(accepted)
    }
}

/// `+1, -1, +2, -2, ...` for step `0, 1, 2, 3, ...`.
pub fn outward_offset(step: usize) -> i64 {
    let magnitude = (step / 2 + 1) as i64;
    if step % 2 == 0 { magnitude } else { -magnitude }
}

/// Integer distractors within `±spread` of `correct` (zero delta excluded),
/// falling back to `correct ± 1, ± 2, ...`.
pub fn near_integers(
    session: &mut PrngSession,
    correct: i64,
    spread: i64,
    sampler: Distractors<i64>,
) -> Result<Vec<i64>> {
    let spread = spread.max(1);
    sampler.synthesize(
        session,
        |s| {
            let mut delta = s.int(-spread, spread);
            if delta == 0 {
                delta = spread;
            }
            correct.saturating_add(delta)
        },
        |step| correct.saturating_add(outward_offset(step)),
    )
}
