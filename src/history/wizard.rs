use log::{debug, info};
use serde::Serialize;

use super::ledger::HistoryLedger;
use super::outcome::BattleOutcome;
use crate::errors::RankingError;
use crate::rating::glicko2::Glicko2;
use crate::stats::StatsStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WizardReport {
    pub iterations: usize,
    pub total_changes: usize,
    pub converged: bool,
}

impl HistoryLedger {
    /// Replay the whole history in order until a pass leaves every rank in
    /// place, or `max_iterations` passes have run.
    ///
    /// Every entry is replayed from its own stored before-values. Outcomes
    /// are computed before the first pass, so an engine failure leaves the
    /// stats and the ledger untouched.
    pub fn recompute_all(
        &mut self,
        stats: &mut StatsStore,
        engine: &Glicko2,
        max_iterations: usize,
    ) -> Result<WizardReport, RankingError> {
        if self.entries.is_empty() {
            info!("Wizard: no history to replay");
            return Ok(WizardReport {
                iterations: 0,
                total_changes: 0,
                converged: true,
            });
        }

        let outcomes = self
            .entries
            .iter()
            .map(|entry| {
                let winner = entry.winner_side();
                BattleOutcome::compute(
                    engine,
                    &entry.snapshot(winner).state_before(),
                    &entry.snapshot(winner.other()).state_before(),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!("Wizard: replaying {} battles", self.entries.len());

        let mut report = WizardReport {
            iterations: 0,
            total_changes: 0,
            converged: false,
        };

        while report.iterations < max_iterations {
            report.iterations += 1;
            let ranks_before = stats.ranks();

            for (entry, outcome) in self.entries.iter_mut().zip(&outcomes) {
                let winner_side = entry.winner_side();
                let (winner_after, loser_after) = outcome.after_states(
                    &stats.get_or_default(&entry.winner),
                    &stats.get_or_default(&entry.loser),
                );
                stats.set(&entry.winner, winner_after);
                stats.set(&entry.loser, loser_after);

                let ranks = stats.ranks();
                let winner_rank = ranks.get(&entry.winner).copied().unwrap_or(0);
                let loser_rank = ranks.get(&entry.loser).copied().unwrap_or(0);

                let mut winner_snapshot = *entry.snapshot(winner_side);
                let mut loser_snapshot = *entry.snapshot(winner_side.other());
                outcome.refresh(&mut winner_snapshot, &mut loser_snapshot, winner_rank, loser_rank);
                *entry.snapshot_mut(winner_side) = winner_snapshot;
                *entry.snapshot_mut(winner_side.other()) = loser_snapshot;
            }

            let ranks_after = stats.ranks();
            let changed = ranks_after
                .iter()
                .filter(|(name, rank)| ranks_before.get(*name) != Some(*rank))
                .count();
            report.total_changes += changed;

            debug!("Wizard pass {}: {} items moved", report.iterations, changed);
            if changed == 0 {
                report.converged = true;
                break;
            }
        }

        info!(
            "Wizard finished after {} passes with {} rank changes (converged: {})",
            report.iterations, report.total_changes, report.converged
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::HistorySettings;
    use crate::history::types::Side;

    fn played_ledger() -> (HistoryLedger, StatsStore, Glicko2) {
        let engine = Glicko2::default();
        let mut stats = StatsStore::initialize(["a", "b", "c", "d"]);
        let mut ledger = HistoryLedger::new(&HistorySettings::default());

        for (left, right, winner) in [
            ("a", "b", Side::Left),
            ("c", "d", Side::Right),
            ("a", "c", Side::Left),
            ("b", "d", Side::Left),
            ("a", "d", Side::Right),
        ] {
            ledger.record_battle(&mut stats, &engine, left, right, winner).unwrap();
        }
        (ledger, stats, engine)
    }

    #[test]
    fn test_empty_history_converges_immediately() {
        let mut ledger = HistoryLedger::new(&HistorySettings::default());
        let mut stats = StatsStore::new();
        let report = ledger.recompute_all(&mut stats, &Glicko2::default(), 50).unwrap();
        assert_eq!(report, WizardReport { iterations: 0, total_changes: 0, converged: true });
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let (mut ledger, mut stats, engine) = played_ledger();

        let first = ledger.recompute_all(&mut stats, &engine, 50).unwrap();
        assert!(first.converged);
        let entries = ledger.entries().to_vec();
        let ratings: Vec<f64> = stats.iter().map(|(_, s)| s.rating).collect();

        let second = ledger.recompute_all(&mut stats, &engine, 50).unwrap();
        assert_eq!(second.iterations, 1);
        assert_eq!(second.total_changes, 0);
        assert_eq!(ledger.entries(), entries.as_slice());
        assert_eq!(stats.iter().map(|(_, s)| s.rating).collect::<Vec<_>>(), ratings);
    }

    #[test]
    fn test_counts_are_untouched() {
        let (mut ledger, mut stats, engine) = played_ledger();
        let counts: Vec<(u32, u32, u32)> =
            stats.iter().map(|(_, s)| (s.battles, s.wins, s.losses)).collect();

        ledger.recompute_all(&mut stats, &engine, 50).unwrap();

        let after: Vec<(u32, u32, u32)> =
            stats.iter().map(|(_, s)| (s.battles, s.wins, s.losses)).collect();
        assert_eq!(counts, after);
    }

    #[test]
    fn test_zero_budget_reports_not_converged() {
        let (mut ledger, mut stats, engine) = played_ledger();
        let report = ledger.recompute_all(&mut stats, &engine, 0).unwrap();
        assert_eq!(report, WizardReport { iterations: 0, total_changes: 0, converged: false });
    }
}
