//! Scan ranges and run filters
//!
//! [`ScanRange`] is a half-open `[start, end)` window over epoch
//! milliseconds, usually derived from a set of runs so a relation store scan
//! touches no more history than those runs span. [`RunFilter`] narrows a scan
//! further to an explicit set of runs.

use crate::entity::RunId;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Half-open time window `[start, end)` in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRange {
    /// Inclusive lower bound.
    pub start: u64,
    /// Exclusive upper bound.
    pub end: u64,
}

impl ScanRange {
    /// Creates a range from explicit bounds.
    pub fn new(start: u64, end: u64) -> Self {
        Self { start, end }
    }

    /// Minimal range covering the start times of `runs`.
    ///
    /// Empty input gives `[0, 0)`; otherwise `[min, max + 1)`, so the latest
    /// run still falls inside the half-open window.
    pub fn covering(runs: impl IntoIterator<Item = RunId>) -> Self {
        let mut bounds: Option<(u64, u64)> = None;
        for run in runs {
            let t = run.time_millis();
            bounds = Some(match bounds {
                None => (t, t),
                Some((lo, hi)) => (lo.min(t), hi.max(t)),
            });
        }
        match bounds {
            None => Self::new(0, 0),
            Some((lo, hi)) => Self::new(lo, hi + 1),
        }
    }

    /// Whether `time_millis` falls inside the window.
    pub fn contains(&self, time_millis: u64) -> bool {
        time_millis >= self.start && time_millis < self.end
    }

    /// Whether the window admits no timestamp at all.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for ScanRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Restricts a relation scan to a known set of runs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunFilter(Option<HashSet<RunId>>);

impl RunFilter {
    /// A filter that admits every run.
    pub fn any() -> Self {
        Self(None)
    }

    /// Admits only the given runs.
    pub fn among(runs: impl IntoIterator<Item = RunId>) -> Self {
        Self(Some(runs.into_iter().collect()))
    }

    /// Admits exactly one run.
    pub fn only(run: RunId) -> Self {
        Self::among([run])
    }

    /// Whether `run` passes the filter.
    pub fn allows(&self, run: &RunId) -> bool {
        self.0.as_ref().map_or(true, |set| set.contains(run))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering_spans_min_to_max_plus_one() {
        let runs = [500, 400, 600, 200, 700, 100].map(RunId::generate);
        let range = ScanRange::covering(runs);
        assert_eq!(range, ScanRange::new(100, 701));
    }

    #[test]
    fn test_covering_empty_is_zero_zero() {
        let range = ScanRange::covering([]);
        assert_eq!(range, ScanRange::new(0, 0));
        assert!(range.is_empty());
    }

    #[test]
    fn test_covering_single_run() {
        let range = ScanRange::covering([RunId::generate(100)]);
        assert_eq!(range, ScanRange::new(100, 101));
        assert!(range.contains(100));
    }

    #[test]
    fn test_contains_is_half_open() {
        let range = ScanRange::new(100, 200);
        assert!(range.contains(100));
        assert!(range.contains(199));
        assert!(!range.contains(200));
        assert!(!range.contains(99));
    }

    #[test]
    fn test_filter_any_allows_everything() {
        let run = RunId::generate(100);
        assert!(RunFilter::any().allows(&run));
        assert!(RunFilter::default().allows(&run));
    }

    #[test]
    fn test_filter_among_allows_only_members() {
        let inside = RunId::generate(100);
        let outside = RunId::generate(100);
        let filter = RunFilter::among([inside]);
        assert!(filter.allows(&inside));
        assert!(!filter.allows(&outside));
    }

    #[test]
    fn test_filter_only_is_single_run() {
        let run = RunId::generate(100);
        let other = RunId::generate(200);
        let filter = RunFilter::only(run);
        assert!(filter.allows(&run));
        assert!(!filter.allows(&other));
    }
}
