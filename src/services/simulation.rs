use log::{info, warn};

use super::session::{Part, Session, SimulationReport};
use crate::domain::SimulationProgress;
use crate::history::Side;
use crate::pairing::{select_pair, RandomSource};

impl Session {
    /// Play `count` battles without a user: pairs come from the selector and
    /// the left item wins with its expected score. Stops early once every
    /// pair has been battled. Everything is saved once at the end.
    pub fn simulate(&mut self, count: usize, rng: &mut dyn RandomSource) -> SimulationReport {
        let batch_size = self.history_settings.simulation_batch_size;
        let mut progress = SimulationProgress::new(count, batch_size);
        let mut exhausted = false;

        info!("Simulating {} battles in batches of {}", count, batch_size);

        for _ in 0..count {
            let completed = self.ledger.completed();
            let picked = select_pair(&self.items, &self.stats, completed, &self.tuning, rng);
            let Some((left, right)) = picked else {
                exhausted = true;
                break;
            };
            let (left, right) = (left.name.clone(), right.name.clone());

            let p_left = self.engine.win_probability(
                &self.stats.get_or_default(&left),
                &self.stats.get_or_default(&right),
            );
            let winner = if rng.next_f64() < p_left { Side::Left } else { Side::Right };

            match self.apply_battle(&left, &right, winner) {
                Ok(_) => progress.increment_resolved(),
                Err(e) => {
                    warn!("Skipping simulated battle: {:#}", e);
                    progress.increment_failed();
                }
            }
        }

        if exhausted {
            info!(
                "Every pair has been battled, stopped after {} battles",
                progress.current_count()
            );
        }

        // A simulated battle may have completed the pending one's pair.
        if let Some(pending) = &self.current {
            if self.ledger.completed().contains(&pending.left, &pending.right) {
                self.current = None;
            }
        }
        self.save(&Part::ALL);

        SimulationReport {
            requested: count,
            resolved: progress.resolved(),
            failed: progress.failed(),
            exhausted,
        }
    }
}
