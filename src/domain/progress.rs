use log::info;

/// Track progress of a bulk simulation
pub struct SimulationProgress {
    total: usize,
    resolved: usize,
    failed: usize,
    milestone: usize,
}

impl SimulationProgress {
    pub fn new(total: usize, milestone: usize) -> Self {
        Self {
            total,
            resolved: 0,
            failed: 0,
            milestone: milestone.max(1),
        }
    }

    pub fn increment_resolved(&mut self) {
        self.resolved += 1;
        self.log_progress();
    }

    pub fn increment_failed(&mut self) {
        self.failed += 1;
        self.log_progress();
    }

    pub fn resolved(&self) -> usize {
        self.resolved
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn current_count(&self) -> usize {
        self.resolved + self.failed
    }

    fn log_progress(&self) {
        let current = self.current_count();
        if should_log(current, self.total, self.milestone) {
            info!(
                "  → Simulated {}/{} battles ({} failed)",
                current, self.total, self.failed
            );
        }
    }
}

fn should_log(current: usize, total: usize, milestone: usize) -> bool {
    is_milestone(current, milestone) || is_complete(current, total)
}

fn is_milestone(count: usize, milestone: usize) -> bool {
    count % milestone == 0
}

fn is_complete(current: usize, total: usize) -> bool {
    current == total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut progress = SimulationProgress::new(3, 200);
        progress.increment_resolved();
        progress.increment_failed();
        progress.increment_resolved();
        assert_eq!(progress.resolved(), 2);
        assert_eq!(progress.failed(), 1);
        assert_eq!(progress.current_count(), 3);
    }

    #[test]
    fn test_milestones() {
        assert!(should_log(200, 1000, 200));
        assert!(should_log(7, 7, 200));
        assert!(!should_log(7, 1000, 200));
    }
}
