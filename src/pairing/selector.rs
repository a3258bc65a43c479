use log::{debug, error};

use super::pair_key::CompletedPairs;
use super::random::RandomSource;
use crate::config::settings::PairingSettings;
use crate::rating::display::displayed_rating;
use crate::stats::StatsStore;

/// Choose the next pair to battle.
///
/// Returns `None` when fewer than two items are given or every pair of them
/// has already been battled.
pub fn select_pair<'a, S: AsRef<str>>(
    items: &'a [S],
    stats: &StatsStore,
    completed: &CompletedPairs,
    tuning: &PairingSettings,
    rng: &mut dyn RandomSource,
) -> Option<(&'a S, &'a S)> {
    select_pair_indexed(items, stats, completed, tuning, rng).map(|(i, j)| (&items[i], &items[j]))
}

/// Index-based variant of [`select_pair`]; the first index is the left side.
pub fn select_pair_indexed<S: AsRef<str>>(
    items: &[S],
    stats: &StatsStore,
    completed: &CompletedPairs,
    tuning: &PairingSettings,
    rng: &mut dyn RandomSource,
) -> Option<(usize, usize)> {
    let n = items.len();
    if n < 2 || completed.is_exhausted(items) {
        return None;
    }

    let names: Vec<&str> = items.iter().map(AsRef::as_ref).collect();
    let weights = exploration_weights(&names, stats, tuning.exploration_power);
    let displayed = displayed_ratings(&names, stats, tuning);

    for _ in 0..tuning.attempts {
        let i = sample_index(&weights, rng);
        let conditional = proximity_weights(i, &weights, &displayed, tuning);

        let mut j = sample_index(&conditional, rng);
        let mut retries = 0;
        while j == i && retries < tuning.collision_retries {
            j = sample_index(&conditional, rng);
            retries += 1;
        }
        if j == i {
            j = (i + 1) % n;
        }

        if !completed.contains(names[i], names[j]) {
            return Some((i, j));
        }
    }

    debug!("Sampling found no open pair in {} attempts, scanning", tuning.attempts);
    if let Some(pair) = scan_for_open_pair(&names, completed, rng) {
        return Some(pair);
    }

    debug_assert!(false, "pair space reported open but no open pair was found");
    error!("No open pair found among {} items although the pair space is not exhausted", n);
    None
}

/// `1 / (1 + battles)^power`: items with fewer battles are picked more often.
fn exploration_weights(names: &[&str], stats: &StatsStore, power: f64) -> Vec<f64> {
    names
        .iter()
        .map(|name| {
            let battles = stats.get(name).map_or(0, |state| state.battles);
            1.0 / (1.0 + battles as f64).powf(power)
        })
        .collect()
}

/// Displayed rating of every item, shrunk toward the configured base.
fn displayed_ratings(names: &[&str], stats: &StatsStore, tuning: &PairingSettings) -> Vec<f64> {
    names
        .iter()
        .map(|name| match stats.get(name) {
            Some(state) => displayed_rating(state, tuning.base_rating, tuning.prior_weight),
            None => tuning.base_rating,
        })
        .collect()
}

/// Exploration weights scaled by closeness in displayed rating to item `i`.
fn proximity_weights(
    i: usize,
    weights: &[f64],
    displayed: &[f64],
    tuning: &PairingSettings,
) -> Vec<f64> {
    weights
        .iter()
        .enumerate()
        .map(|(k, &w)| {
            if k == i {
                return 0.0;
            }
            let diff = (displayed[i] - displayed[k]).abs() / tuning.rating_diff_scale;
            let proximity = 1.0 / (1.0 + diff).powf(tuning.proximity_power);
            let base = if w.is_finite() && w > 0.0 { w } else { 1.0 };
            base * proximity
        })
        .collect()
}

/// Roulette-wheel sampling. Non-positive or non-finite weights count as
/// zero; with no usable weight at all the index is uniform.
fn sample_index(weights: &[f64], rng: &mut dyn RandomSource) -> usize {
    let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().copied().map(usable).sum();

    if !(total.is_finite() && total > 0.0) {
        let idx = (rng.next_f64() * weights.len() as f64).floor() as usize;
        return idx.min(weights.len().saturating_sub(1));
    }

    let mut r = rng.next_f64() * total;
    for (k, &w) in weights.iter().enumerate() {
        r -= usable(w);
        if r <= 0.0 {
            return k;
        }
    }
    weights.len() - 1
}

fn scan_for_open_pair(
    names: &[&str],
    completed: &CompletedPairs,
    rng: &mut dyn RandomSource,
) -> Option<(usize, usize)> {
    for i in 0..names.len() {
        for j in (i + 1)..names.len() {
            if names[i] != names[j] && !completed.contains(names[i], names[j]) {
                return if rng.next_f64() < 0.5 { Some((i, j)) } else { Some((j, i)) };
            }
        }
    }
    None
}
