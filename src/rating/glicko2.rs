use std::f64::consts::PI;

use super::display::displayed_rating;
use super::types::{GlickoPoint, Opponent, PairOutcome, RatingState};
use super::volatility::{solve_volatility, VolatilityProblem};
use crate::config::settings::RatingSettings;
use crate::errors::RankingError;

/// g(φ): dampens the impact of an opponent with an uncertain rating.
pub fn g(phi: f64) -> f64 {
    1.0 / (1.0 + 3.0 * phi * phi / (PI * PI)).sqrt()
}

/// E(μ, μ_j, φ_j): expected score against an opponent.
pub fn expected_score(mu: f64, mu_j: f64, phi_j: f64) -> f64 {
    1.0 / (1.0 + (-g(phi_j) * (mu - mu_j)).exp())
}

/// Glicko-2 rating engine. Pure: the same inputs always give the same outputs,
/// which the wizard relies on when replaying history.
#[derive(Debug, Clone)]
pub struct Glicko2 {
    settings: RatingSettings,
}

impl Default for Glicko2 {
    fn default() -> Self {
        Self::new(RatingSettings::default())
    }
}

impl Glicko2 {
    pub fn new(settings: RatingSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &RatingSettings {
        &self.settings
    }

    pub fn scale(&self, rating: f64) -> f64 {
        (rating - self.settings.base_rating) / self.settings.scale_factor
    }

    pub fn unscale(&self, mu: f64) -> f64 {
        mu * self.settings.scale_factor + self.settings.base_rating
    }

    pub fn scale_rd(&self, rd: f64) -> f64 {
        rd / self.settings.scale_factor
    }

    pub fn unscale_rd(&self, phi: f64) -> f64 {
        phi * self.settings.scale_factor
    }

    pub fn to_point(&self, state: &RatingState) -> GlickoPoint {
        GlickoPoint {
            mu: self.scale(state.rating),
            phi: self.scale_rd(state.rd),
            sigma: state.volatility,
        }
    }

    /// Probability that `player` beats `opponent`.
    pub fn win_probability(&self, player: &RatingState, opponent: &RatingState) -> f64 {
        let player = self.to_point(player);
        let opponent = self.to_point(opponent);
        expected_score(player.mu, opponent.mu, opponent.phi)
    }

    pub fn displayed_rating(&self, state: &RatingState, prior_weight: f64) -> f64 {
        displayed_rating(state, self.settings.base_rating, prior_weight)
    }

    /// One Glicko-2 rating period for a single player.
    pub fn update_single(
        &self,
        player: GlickoPoint,
        opponents: &[Opponent],
    ) -> Result<GlickoPoint, RankingError> {
        let (v_inv, score_sum) = accumulate(player.mu, opponents);

        // Opponents that carry no information leave the player unchanged.
        if !(v_inv > 0.0 && v_inv.is_finite()) {
            return Ok(player);
        }

        let v = 1.0 / v_inv;
        let delta = v * score_sum;

        let problem = VolatilityProblem {
            sigma: player.sigma,
            phi: player.phi,
            v,
            delta,
            tau: self.settings.tau,
        };
        let sigma_new = solve_volatility(
            &problem,
            self.settings.epsilon,
            self.settings.max_solver_iterations,
        )?;

        let phi_star = (player.phi * player.phi + sigma_new * sigma_new).sqrt();
        let phi_new = 1.0 / (1.0 / (phi_star * phi_star) + 1.0 / v).sqrt();
        let mu_new = player.mu + phi_new * phi_new * score_sum;

        Ok(GlickoPoint {
            mu: mu_new,
            phi: phi_new,
            sigma: sigma_new,
        })
    }

    /// Rate a single battle as two isolated one-game periods.
    pub fn update_pair(
        &self,
        winner: &RatingState,
        loser: &RatingState,
    ) -> Result<PairOutcome, RankingError> {
        let w = self.to_point(winner);
        let l = self.to_point(loser);

        let new_winner = self.update_single(w, &[Opponent { mu: l.mu, phi: l.phi, score: 1.0 }])?;
        let new_loser = self.update_single(l, &[Opponent { mu: w.mu, phi: w.phi, score: 0.0 }])?;

        Ok(PairOutcome {
            new_winner_rating: self.unscale(new_winner.mu),
            new_winner_rd: self.unscale_rd(new_winner.phi),
            new_winner_volatility: new_winner.sigma,
            new_loser_rating: self.unscale(new_loser.mu),
            new_loser_rd: self.unscale_rd(new_loser.phi),
            new_loser_volatility: new_loser.sigma,
        })
    }
}

/// Returns (v⁻¹, Σ g(φ_j)(s_j − E_j)).
fn accumulate(mu: f64, opponents: &[Opponent]) -> (f64, f64) {
    opponents.iter().fold((0.0, 0.0), |(v_inv, score_sum), opp| {
        let g_phi = g(opp.phi);
        let e = expected_score(mu, opp.mu, opp.phi);
        (
            v_inv + g_phi * g_phi * e * (1.0 - e),
            score_sum + g_phi * (opp.score - e),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::types::BASE_RATING;

    fn engine() -> Glicko2 {
        Glicko2::default()
    }

    #[test]
    fn test_scale_round_trip() {
        let e = engine();
        assert_eq!(e.scale(1500.0), 0.0);
        assert!((e.unscale(e.scale(1733.2)) - 1733.2).abs() < 1e-9);
        assert!((e.unscale_rd(e.scale_rd(350.0)) - 350.0).abs() < 1e-9);
    }

    #[test]
    fn test_expected_score_even_match() {
        assert_eq!(expected_score(0.3, 0.3, 1.2), 0.5);
    }

    #[test]
    fn test_g_shrinks_with_uncertainty() {
        assert_eq!(g(0.0), 1.0);
        assert!(g(2.0) < g(0.5));
    }

    #[test]
    fn test_glickman_worked_example() {
        let e = engine();
        let player = e.to_point(&RatingState {
            rating: 1500.0,
            rd: 200.0,
            ..RatingState::default()
        });
        let games = [(1400.0, 30.0, 1.0), (1550.0, 100.0, 0.0), (1700.0, 300.0, 0.0)];
        let opponents: Vec<Opponent> = games
            .iter()
            .map(|&(rating, rd, score)| Opponent {
                mu: e.scale(rating),
                phi: e.scale_rd(rd),
                score,
            })
            .collect();

        let updated = e.update_single(player, &opponents).unwrap();

        assert!((e.unscale(updated.mu) - 1464.06).abs() < 0.1);
        assert!((e.unscale_rd(updated.phi) - 151.52).abs() < 0.1);
        assert!((updated.sigma - 0.05999).abs() < 1e-4);
    }

    #[test]
    fn test_first_battle_between_newcomers() {
        let e = engine();
        let a = RatingState::default();
        let b = RatingState::default();

        assert_eq!(e.win_probability(&a, &b), 0.5);

        let outcome = e.update_pair(&a, &b).unwrap();
        assert!(outcome.new_winner_rating > BASE_RATING);
        assert!(outcome.new_loser_rating < BASE_RATING);
        assert!(outcome.new_winner_rd < a.rd);
        assert!(outcome.new_loser_rd < b.rd);
        let gain = outcome.new_winner_rating - BASE_RATING;
        let loss = BASE_RATING - outcome.new_loser_rating;
        assert!((gain - loss).abs() < 1e-6);
    }

    #[test]
    fn test_update_pair_is_pure() {
        let e = engine();
        let a =
            RatingState { rating: 1620.0, rd: 120.0, volatility: 0.059, ..RatingState::default() };
        let b =
            RatingState { rating: 1480.0, rd: 210.0, volatility: 0.061, ..RatingState::default() };

        assert_eq!(e.update_pair(&a, &b).unwrap(), e.update_pair(&a, &b).unwrap());
    }

    #[test]
    fn test_no_opponents_leaves_player_unchanged() {
        let e = engine();
        let player = e.to_point(&RatingState::default());
        assert_eq!(e.update_single(player, &[]).unwrap(), player);
    }

    #[test]
    fn test_displayed_rating_shrinks_toward_base() {
        let e = engine();
        let state = RatingState { rating: 1800.0, battles: 6, wins: 6, ..RatingState::default() };
        assert_eq!(e.displayed_rating(&state, 6.0), 1650.0);
        assert_eq!(e.displayed_rating(&RatingState::with_rating(1900.0), 6.0), BASE_RATING);
    }
}
