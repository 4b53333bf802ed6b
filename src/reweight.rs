//! Frequency reweighting against a reference wordlist.
//!
//! Words the reference corpus knows are pulled toward how rare they are there,
//! relative to the most frequent word of the analysed corpus, then dampened by
//! `blow`. Words it does not know are amplified by `boost`.

use crate::error::CloudError;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// Word → adjusted weight, ready for frequency-based cloud generation.
pub type Weights = HashMap<String, f64, ahash::RandomState>;

/// Check the static reweighting parameters.
pub fn validate_params(min_relative_freq: f64, boost: f64, blow: f64) -> Result<(), CloudError> {
    if !(0.0..=1.0).contains(&min_relative_freq) {
        return Err(CloudError::InvalidConfig(format!(
            "min_relative_freq must be within [0, 1], got {min_relative_freq}"
        )));
    }
    if !(boost.is_finite() && boost > 0.0) {
        return Err(CloudError::InvalidConfig(format!("boost must be a positive number, got {boost}")));
    }
    if !(blow.is_finite() && blow > 0.0) {
        return Err(CloudError::InvalidConfig(format!("blow must be a positive number, got {blow}")));
    }
    Ok(())
}

/// Reweight raw counts against `reference`.
///
/// Drops every word whose relative frequency (`count / total`) is below
/// `min_relative_freq`. Empty input yields an empty map.
pub fn reweight<S1, S2>(
    freqs: &HashMap<String, u64, S1>,
    reference: &HashMap<String, u64, S2>,
    min_relative_freq: f64,
    boost: f64,
    blow: f64,
) -> Result<Weights, CloudError>
where
    S1: BuildHasher,
    S2: BuildHasher,
{
    validate_params(min_relative_freq, boost, blow)?;

    let total: u64 = freqs.values().sum();
    if total == 0 {
        return Ok(Weights::default());
    }
    let max_freq = freqs.values().copied().max().unwrap_or(0) as f64;
    let total = total as f64;

    let mut out = Weights::with_capacity_and_hasher(freqs.len(), Default::default());
    for (word, &freq) in freqs {
        let freq = freq as f64;
        if freq / total < min_relative_freq {
            continue;
        }
        let adjusted = match reference.get(word) {
            Some(&ref_count) if ref_count > 0 => freq * (max_freq / ref_count as f64) / blow,
            _ => freq * boost,
        };
        out.insert(word.clone(), adjusted);
    }

    tracing::debug!(kept = out.len(), dropped = freqs.len() - out.len(), "reweighted word frequencies");
    Ok(out)
}
