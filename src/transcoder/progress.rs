//! Progress reporting for column transcoding.
//!
//! Observers are passed explicitly to each call. Nothing here is global.

use std::fmt;

/// Which way a column is being transcoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Serialize,
    Deserialize,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Serialize => f.write_str("serialize"),
            Direction::Deserialize => f.write_str("deserialize"),
        }
    }
}

/// Receives per-column progress notifications.
///
/// `percent` is strictly increasing within one call and the final notification is
/// always `100`.
pub trait ProgressObserver {
    fn on_progress(&self, column: &str, direction: Direction, percent: u8);
}

impl<F> ProgressObserver for F
where
    F: Fn(&str, Direction, u8),
{
    fn on_progress(&self, column: &str, direction: Direction, percent: u8) {
        self(column, direction, percent)
    }
}

/// Turns row counts into step-aligned percentage notifications.
pub(crate) struct ProgressTracker<'a> {
    observer: Option<&'a dyn ProgressObserver>,
    column: &'a str,
    direction: Direction,
    total: usize,
    step: u8,
    next_threshold: u8,
    last_reported: Option<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(
        observer: Option<&'a dyn ProgressObserver>,
        column: &'a str,
        direction: Direction,
        total: usize,
        step_percent: u8,
    ) -> Self {
        let step = step_percent.clamp(1, 100);
        Self {
            observer,
            column,
            direction,
            total,
            step,
            next_threshold: step,
            last_reported: None,
        }
    }

    /// Records that `done` of `total` rows have been processed.
    pub(crate) fn advance(&mut self, done: usize) {
        if self.total == 0 {
            return;
        }
        let percent = ((done.min(self.total) * 100) / self.total) as u8;
        if percent >= self.next_threshold {
            let aligned = percent / self.step * self.step;
            self.report(aligned);
            self.next_threshold = aligned.saturating_add(self.step);
        }
    }

    pub(crate) fn finish(&mut self) {
        if self.last_reported != Some(100) {
            self.report(100);
        }
    }

    fn report(&mut self, percent: u8) {
        log::debug!(
            "{} column '{}': {}% done",
            self.direction,
            self.column,
            percent
        );
        if let Some(observer) = self.observer {
            observer.on_progress(self.column, self.direction, percent);
        }
        self.last_reported = Some(percent);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    fn collect(total: usize, step: u8) -> Vec<u8> {
        let seen = RefCell::new(Vec::new());
        let observer = |_: &str, _: Direction, p: u8| seen.borrow_mut().push(p);
        let mut tracker =
            ProgressTracker::new(Some(&observer), "c", Direction::Serialize, total, step);
        for done in 1..=total {
            tracker.advance(done);
        }
        tracker.finish();
        seen.into_inner()
    }

    #[test]
    fn test_reports_every_step_and_ends_at_100() {
        let seen = collect(100, 5);
        assert_eq!(seen.len(), 20);
        assert_eq!(seen.first(), Some(&5));
        assert_eq!(seen.last(), Some(&100));
    }

    #[test]
    fn test_small_columns_skip_steps_but_stay_monotonic() {
        let seen = collect(3, 5);
        assert_eq!(seen, vec![30, 65, 100]);
    }

    #[test]
    fn test_uneven_step_gets_final_100() {
        assert_eq!(collect(10, 30), vec![30, 60, 90, 100]);
    }

    #[test]
    fn test_empty_column_reports_only_completion() {
        assert_eq!(collect(0, 5), vec![100]);
    }
}
