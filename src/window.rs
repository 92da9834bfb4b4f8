//! A trailing window of monotonically non-decreasing timestamps.

use std::collections::VecDeque;

/// Records request arrival timestamps and trims everything older than
/// `size_seconds` relative to the most recent `trim` call.
///
/// Insertion is assumed to arrive in non-decreasing order (the caller only
/// ever appends "now"), so trimming is a single binary search over the
/// front of the deque rather than a linear scan, mirroring
/// `bisect.bisect_left` in the Python original.
#[derive(Debug, Clone)]
pub struct TimestampWindow {
    size_seconds: f64,
    timestamps: VecDeque<f64>,
}

impl TimestampWindow {
    pub fn new(size_seconds: f64) -> Self {
        Self {
            size_seconds,
            timestamps: VecDeque::new(),
        }
    }

    /// Records a batch of arrivals at `now` and trims the window.
    pub fn record(&mut self, now: f64, count: usize) {
        for _ in 0..count {
            self.timestamps.push_back(now);
        }
        self.trim(now);
    }

    /// Drops every timestamp older than `now - size_seconds`.
    pub fn trim(&mut self, now: f64) {
        let cutoff = now - self.size_seconds;
        let slice = self.timestamps.make_contiguous();
        let drop_count = slice.partition_point(|&ts| ts < cutoff);
        self.timestamps.drain(..drop_count);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Average arrivals per second over the configured window size.
    pub fn rate(&self) -> f64 {
        self.timestamps.len() as f64 / self.size_seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_entries_older_than_window() {
        let mut window = TimestampWindow::new(60.0);
        window.record(0.0, 5);
        window.record(30.0, 3);
        assert_eq!(window.len(), 8);
        window.trim(61.0);
        assert_eq!(window.len(), 3);
    }

    #[test]
    fn rate_divides_count_by_window_size() {
        let mut window = TimestampWindow::new(60.0);
        window.record(0.0, 120);
        assert_eq!(window.rate(), 2.0);
    }

    #[test]
    fn empty_window_has_zero_rate() {
        let window = TimestampWindow::new(60.0);
        assert_eq!(window.rate(), 0.0);
        assert!(window.is_empty());
    }
}
