//! Feedback selection: which analyzer item (if any) is escalated to the
//! coaching and speech collaborators for one frame.

use std::time::{Duration, Instant};

use crate::analysis::Feedback;

/// Pick the first item in check order, or `None` for an empty result.
///
/// At most one item per frame is escalated, which bounds coaching/speech
/// calls to one per analyzed frame.
pub fn select(feedback: &[Feedback]) -> Option<Feedback> {
    feedback.first().copied()
}

/// Per-session suppressor for repeated selections.
///
/// While a flaw persists the analyzers report it on every frame; this
/// filter lets the first report through and drops identical selections
/// until `cooldown` has elapsed. A different selection always passes and
/// restarts the window. A zero cooldown admits everything.
#[derive(Debug, Clone)]
pub struct RepeatFilter {
    cooldown: Duration,
    last: Option<(Feedback, Instant)>,
}

impl RepeatFilter {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown, last: None }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Decide whether `feedback` selected now should be dispatched.
    pub fn admit(&mut self, feedback: Feedback) -> bool {
        self.admit_at(feedback, Instant::now())
    }

    /// [`admit`](Self::admit) with an explicit clock reading.
    pub fn admit_at(&mut self, feedback: Feedback, now: Instant) -> bool {
        if !self.would_admit_at(feedback, now) {
            return false;
        }
        self.record_at(feedback, now);
        true
    }

    /// Check without committing. Pair with [`record_at`](Self::record_at)
    /// once the item has actually been delivered.
    pub fn would_admit_at(&self, feedback: Feedback, now: Instant) -> bool {
        match self.last {
            Some((prev, at)) => prev != feedback || now.saturating_duration_since(at) >= self.cooldown,
            None => true,
        }
    }

    /// Mark `feedback` as delivered at `now`, starting its cooldown window.
    pub fn record_at(&mut self, feedback: Feedback, now: Instant) {
        self.last = Some((feedback, now));
    }

    /// Forget the last dispatched item (e.g. after the shot type changes).
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_item_wins() {
        let items = [Feedback::StanceTooNarrow, Feedback::LowBacklift];
        assert_eq!(select(&items), Some(Feedback::StanceTooNarrow));
        assert_eq!(select(&[]), None);
    }

    #[test]
    fn repeat_suppressed_within_cooldown() {
        let t0 = Instant::now();
        let mut filter = RepeatFilter::new(Duration::from_secs(5));
        assert!(filter.admit_at(Feedback::LowBacklift, t0));
        assert!(!filter.admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(1)));
        assert!(!filter.admit_at(Feedback::LowBacklift, t0 + Duration::from_millis(4999)));
        assert!(filter.admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(5)));
    }

    #[test]
    fn different_item_passes_and_restarts_window() {
        let t0 = Instant::now();
        let mut filter = RepeatFilter::new(Duration::from_secs(5));
        assert!(filter.admit_at(Feedback::LowBacklift, t0));
        assert!(filter.admit_at(Feedback::HeadOffCentre, t0 + Duration::from_secs(1)));
        // Back to the first item: it is no longer the last one dispatched.
        assert!(filter.admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(2)));
        assert!(!filter.admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(3)));
    }

    #[test]
    fn zero_cooldown_admits_everything() {
        let t0 = Instant::now();
        let mut filter = RepeatFilter::new(Duration::ZERO);
        for _ in 0..3 {
            assert!(filter.admit_at(Feedback::DriveGood, t0));
        }
    }

    #[test]
    fn check_does_not_start_window() {
        let t0 = Instant::now();
        let mut filter = RepeatFilter::new(Duration::from_secs(5));
        assert!(filter.would_admit_at(Feedback::LowBacklift, t0));
        // Nothing recorded yet, so a second check still passes.
        assert!(filter.would_admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(1)));

        filter.record_at(Feedback::LowBacklift, t0 + Duration::from_secs(1));
        assert!(!filter.would_admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(2)));
        assert!(filter.would_admit_at(Feedback::HeadOffCentre, t0 + Duration::from_secs(2)));
        assert!(filter.would_admit_at(Feedback::LowBacklift, t0 + Duration::from_secs(6)));
    }

    #[test]
    fn reset_forgets_last() {
        let t0 = Instant::now();
        let mut filter = RepeatFilter::new(Duration::from_secs(60));
        assert!(filter.admit_at(Feedback::PullGood, t0));
        filter.reset();
        assert!(filter.admit_at(Feedback::PullGood, t0));
    }
}
