//! Weighted choice between generators.

use super::{Gen, RETRY_LIMIT};
use crate::error::{Error, Result};
use tracing::{debug, trace};

/// Slack allowed when checking that weights sum to at most 1.0.
const WEIGHT_EPSILON: f64 = 1e-9;

/// A generator paired with the probability of choosing it.
///
/// A weight of `0.0` means "unassigned": it receives an even share of
/// whatever probability the explicit weights leave over.
#[derive(Clone)]
pub struct Weighted<T> {
    gen: Gen<T>,
    weight: f64,
}

impl<T> Weighted<T> {
    pub fn new(gen: Gen<T>, weight: f64) -> Self {
        Weighted { gen, weight }
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }
}

impl<T> From<Gen<T>> for Weighted<T> {
    fn from(gen: Gen<T>) -> Self {
        Weighted::new(gen, 0.0)
    }
}

/// Shorthand for [`Weighted::new`].
pub fn weighted<T>(gen: Gen<T>, weight: f64) -> Weighted<T> {
    Weighted::new(gen, weight)
}

/// Validate weights and share the leftover probability among zero weights.
pub fn normalize_weights(weights: &[f64]) -> Result<Vec<f64>> {
    if weights.is_empty() {
        return Err(Error::NoCandidates);
    }
    for (index, &weight) in weights.iter().enumerate() {
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidWeight { index, weight });
        }
    }

    let sum: f64 = weights.iter().sum();
    if sum > 1.0 + WEIGHT_EPSILON {
        return Err(Error::WeightsExceedOne { sum });
    }

    let unassigned = weights.iter().filter(|&&w| w == 0.0).count();
    let share = if unassigned > 0 {
        (1.0 - sum).max(0.0) / unassigned as f64
    } else {
        0.0
    };
    let normalized: Vec<f64> = weights
        .iter()
        .map(|&w| if w == 0.0 { share } else { w })
        .collect();

    if normalized.iter().all(|&w| w == 0.0) {
        return Err(Error::NoCandidates);
    }
    Ok(normalized)
}

impl<T> Gen<T>
where
    T: Clone + 'static,
{
    /// Choose between generators by weight.
    ///
    /// Selection draws a uniform index and accepts it with probability equal
    /// to its weight, redrawing the index on rejection. If the accepted
    /// generator discards, the same generator is asked again.
    pub fn one_of<I, W>(choices: I) -> Result<Gen<T>>
    where
        I: IntoIterator<Item = W>,
        W: Into<Weighted<T>>,
    {
        let choices: Vec<Weighted<T>> = choices.into_iter().map(Into::into).collect();
        let raw: Vec<f64> = choices.iter().map(Weighted::weight).collect();
        let weights = normalize_weights(&raw)?;
        let gens: Vec<Gen<T>> = choices.into_iter().map(|choice| choice.gen).collect();

        Ok(Gen::new(move |random| {
            let index = loop {
                let candidate = random.size_in_range(0, gens.len());
                if random.boolean(weights[candidate]) {
                    break candidate;
                }
            };
            for attempt in 0..RETRY_LIMIT {
                match gens[index].generate(random) {
                    Err(error) if error.is_discard() => {
                        trace!(index, attempt, "chosen generator discarded, retrying it");
                    }
                    other => return other,
                }
            }
            debug!(index, limit = RETRY_LIMIT, "chosen generator kept discarding");
            Err(Error::Discard)
        }))
    }
}
