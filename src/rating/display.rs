use super::types::RatingState;

/// Rating pulled toward `base` by `prior_weight` pseudo-battles.
///
/// Used for ranking display and pairing proximity only, never fed back into
/// the model.
pub fn displayed_rating(state: &RatingState, base: f64, prior_weight: f64) -> f64 {
    if state.battles == 0 {
        return base;
    }

    let battles = state.battles as f64;
    (state.rating * battles + base * prior_weight) / (battles + prior_weight)
}
