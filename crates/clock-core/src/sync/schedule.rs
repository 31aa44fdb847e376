use super::clamp_interval;

pub const SYNC_BACKOFF_BASE_SECS: u32 = 2;
pub const SYNC_BACKOFF_MAX_SECS: u32 = 120;
const SYNC_BACKOFF_MAX_SHIFT: u8 = 6;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SyncOutcome {
    Succeeded,
    Failed,
}

/// Next-attempt policy for the sync task: the full interval after a
/// successful round trip, bounded exponential backoff after failures.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncSchedule {
    interval_secs: u32,
    consecutive_failures: u8,
}

impl SyncSchedule {
    pub const fn new(interval_secs: u32) -> Self {
        Self {
            interval_secs: clamp_interval(interval_secs),
            consecutive_failures: 0,
        }
    }

    pub const fn interval_secs(&self) -> u32 {
        self.interval_secs
    }

    pub const fn consecutive_failures(&self) -> u8 {
        self.consecutive_failures
    }

    /// Record a round trip and return the delay before the next one.
    pub fn record(&mut self, outcome: SyncOutcome) -> u32 {
        match outcome {
            SyncOutcome::Succeeded => {
                self.consecutive_failures = 0;
                self.interval_secs
            }
            SyncOutcome::Failed => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                self.backoff_secs()
            }
        }
    }

    fn backoff_secs(&self) -> u32 {
        let shift = self
            .consecutive_failures
            .saturating_sub(1)
            .min(SYNC_BACKOFF_MAX_SHIFT);
        let backoff = (SYNC_BACKOFF_BASE_SECS << shift).min(SYNC_BACKOFF_MAX_SECS);
        backoff.min(self.interval_secs)
    }
}

/// Schedule of one configured sync cycle, tagged with the request generation
/// that started it. Restarting the client bumps the generation, so a round
/// trip that finishes afterwards belongs to an abandoned cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SyncCycle {
    generation: u32,
    schedule: SyncSchedule,
}

impl SyncCycle {
    pub const fn new(generation: u32, interval_secs: u32) -> Self {
        Self {
            generation,
            schedule: SyncSchedule::new(interval_secs),
        }
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }

    pub const fn schedule(&self) -> &SyncSchedule {
        &self.schedule
    }

    /// Record a finished round trip and return the delay before the next
    /// one, or `None` when the cycle was restarted while it was in flight.
    /// A `None` result must not be reported as a completion.
    pub fn finish(&mut self, current_generation: u32, outcome: SyncOutcome) -> Option<u32> {
        if current_generation != self.generation {
            return None;
        }
        Some(self.schedule.record(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_back_off_exponentially_to_cap() {
        let mut schedule = SyncSchedule::new(86_400);
        let delays: std::vec::Vec<u32> = (0..9)
            .map(|_| schedule.record(SyncOutcome::Failed))
            .collect();
        assert_eq!(delays, [2, 4, 8, 16, 32, 64, 120, 120, 120]);
    }

    #[test]
    fn success_resets_to_interval() {
        let mut schedule = SyncSchedule::new(600);
        schedule.record(SyncOutcome::Failed);
        schedule.record(SyncOutcome::Failed);
        assert_eq!(schedule.record(SyncOutcome::Succeeded), 600);
        assert_eq!(schedule.consecutive_failures(), 0);
        assert_eq!(schedule.record(SyncOutcome::Failed), 2);
    }

    #[test]
    fn result_of_restarted_cycle_is_discarded() {
        let mut cycle = SyncCycle::new(1, 3_600);
        assert_eq!(cycle.finish(3, SyncOutcome::Succeeded), None);
        assert_eq!(cycle.finish(3, SyncOutcome::Failed), None);
        assert_eq!(cycle.schedule().consecutive_failures(), 0);
        assert_eq!(cycle.generation(), 1);
    }

    #[test]
    fn result_of_current_cycle_is_scheduled() {
        let mut cycle = SyncCycle::new(4, 3_600);
        assert_eq!(cycle.finish(4, SyncOutcome::Failed), Some(2));
        assert_eq!(cycle.finish(4, SyncOutcome::Succeeded), Some(3_600));
    }

    #[test]
    fn backoff_never_exceeds_short_interval() {
        let mut schedule = SyncSchedule::new(5);
        assert_eq!(schedule.interval_secs(), 15);
        for _ in 0..4 {
            schedule.record(SyncOutcome::Failed);
        }
        assert_eq!(schedule.record(SyncOutcome::Failed), 15);
    }
}
