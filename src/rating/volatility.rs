use crate::errors::RankingError;

/// Inputs of step 5 of the Glicko-2 update (all on the internal scale).
#[derive(Debug, Clone, Copy)]
pub struct VolatilityProblem {
    pub sigma: f64,
    pub phi: f64,
    pub v: f64,
    pub delta: f64,
    pub tau: f64,
}

impl VolatilityProblem {
    fn a(&self) -> f64 {
        (self.sigma * self.sigma).ln()
    }

    fn f(&self, x: f64) -> f64 {
        let ex = x.exp();
        let phi_sq = self.phi * self.phi;
        let denom = phi_sq + self.v + ex;
        let term1 = ex * (self.delta * self.delta - phi_sq - self.v - ex) / (2.0 * denom * denom);
        let term2 = (x - self.a()) / (self.tau * self.tau);
        term1 - term2
    }
}

/// Solve for σ' with the Illinois (modified regula falsi) method.
///
/// Both the bracket search and the main loop are bounded by `max_iterations`.
pub fn solve_volatility(
    problem: &VolatilityProblem,
    epsilon: f64,
    max_iterations: usize,
) -> Result<f64, RankingError> {
    let mut lower = problem.a();
    let mut upper = initial_upper_bound(problem, max_iterations)?;

    let mut f_lower = problem.f(lower);
    let mut f_upper = problem.f(upper);
    let mut iterations = 0;

    while (upper - lower).abs() > epsilon {
        if iterations >= max_iterations {
            return Err(non_convergence(max_iterations));
        }
        iterations += 1;

        let candidate = lower + (lower - upper) * f_lower / (f_upper - f_lower);
        if !candidate.is_finite() {
            return Err(non_convergence(iterations));
        }
        let f_candidate = problem.f(candidate);

        if f_candidate * f_upper <= 0.0 {
            lower = upper;
            f_lower = f_upper;
        } else {
            f_lower /= 2.0;
        }

        upper = candidate;
        f_upper = f_candidate;
    }

    Ok((lower / 2.0).exp())
}

fn initial_upper_bound(
    problem: &VolatilityProblem,
    max_iterations: usize,
) -> Result<f64, RankingError> {
    let delta_sq = problem.delta * problem.delta;
    let phi_sq = problem.phi * problem.phi;

    if delta_sq > phi_sq + problem.v {
        return Ok((delta_sq - phi_sq - problem.v).ln());
    }

    let a = problem.a();
    let mut k = 1.0;
    while problem.f(a - k * problem.tau) < 0.0 {
        if k as usize >= max_iterations {
            return Err(non_convergence(max_iterations));
        }
        k += 1.0;
    }

    Ok(a - k * problem.tau)
}

fn non_convergence(iterations: usize) -> RankingError {
    log::error!("Volatility solver gave up after {} iterations", iterations);
    RankingError::NumericNonConvergence { iterations }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glickman_worked_example_volatility() {
        // Values from step 3/4 of Glickman's Glicko-2 example.
        let problem = VolatilityProblem {
            sigma: 0.06,
            phi: 1.1513,
            v: 1.7785,
            delta: -0.4834,
            tau: 0.5,
        };

        let sigma = solve_volatility(&problem, 0.000001, 100).unwrap();
        assert!((sigma - 0.05999).abs() < 1e-4, "sigma = {}", sigma);
    }

    #[test]
    fn test_large_improvement_uses_log_bound() {
        let problem = VolatilityProblem {
            sigma: 0.06,
            phi: 0.2,
            v: 0.5,
            delta: 3.0,
            tau: 0.5,
        };

        let sigma = solve_volatility(&problem, 0.000001, 100).unwrap();
        assert!(sigma.is_finite());
        assert!(sigma > 0.06);
    }

    #[test]
    fn test_iteration_bound_reports_non_convergence() {
        let problem = VolatilityProblem {
            sigma: 0.06,
            phi: 1.1513,
            v: 1.7785,
            delta: -0.4834,
            tau: 0.5,
        };

        let err = solve_volatility(&problem, 0.0, 3).unwrap_err();
        assert_eq!(err, RankingError::NumericNonConvergence { iterations: 3 });
    }
}
