// statusmon - core/window.rs
//
// The look-back window. Computed once per run and never changed; both the
// per-file modification-time check and the per-line timestamp check read
// the same cutoff.

use chrono::{DateTime, Local, TimeZone, Utc};
use std::time::SystemTime;

/// Everything at or after `cutoff_epoch_secs` is in scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    cutoff_epoch_secs: i64,
}

impl TimeWindow {
    /// Window of `duration_secs` ending at the current wall-clock time.
    pub fn ending_now(duration_secs: i64) -> Self {
        Self::ending_at(Utc::now().timestamp(), duration_secs)
    }

    /// Window of `duration_secs` ending at `now_epoch_secs`.
    pub fn ending_at(now_epoch_secs: i64, duration_secs: i64) -> Self {
        Self {
            cutoff_epoch_secs: now_epoch_secs.saturating_sub(duration_secs),
        }
    }

    /// Window with an explicit cutoff.
    pub fn from_cutoff(cutoff_epoch_secs: i64) -> Self {
        Self { cutoff_epoch_secs }
    }

    pub fn cutoff_epoch_secs(&self) -> i64 {
        self.cutoff_epoch_secs
    }

    /// True when `timestamp_secs` is at or after the cutoff.
    pub fn in_scope(&self, timestamp_secs: i64) -> bool {
        timestamp_secs >= self.cutoff_epoch_secs
    }

    /// True when a file last modified at `mtime` may hold in-scope lines.
    pub fn admits_mtime(&self, mtime: SystemTime) -> bool {
        self.in_scope(DateTime::<Utc>::from(mtime).timestamp())
    }

    /// The cutoff in local time, for the run banner.
    pub fn cutoff_local(&self) -> Option<DateTime<Local>> {
        Local.timestamp_opt(self.cutoff_epoch_secs, 0).single()
    }

    /// Banner text in C `ctime` layout, e.g. `Sun Mar  5 14:15:30 2023`.
    pub fn cutoff_display(&self) -> String {
        match self.cutoff_local() {
            Some(local) => local.format("%a %b %e %H:%M:%S %Y").to_string(),
            None => format!("@{}", self.cutoff_epoch_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::constants::DEFAULT_WINDOW_SECS;
    use std::time::Duration;

    #[test]
    fn test_cutoff_is_now_minus_duration() {
        let w = TimeWindow::ending_at(1_000_000, DEFAULT_WINDOW_SECS);
        assert_eq!(w.cutoff_epoch_secs(), 1_000_000 - 864_000);
    }

    #[test]
    fn test_in_scope_is_inclusive_at_cutoff() {
        let w = TimeWindow::from_cutoff(500);
        assert!(w.in_scope(500));
        assert!(w.in_scope(501));
        assert!(!w.in_scope(499));
    }

    #[test]
    fn test_mtime_one_second_past_window_rejected() {
        let now = 1_700_000_000_i64;
        let w = TimeWindow::ending_at(now, DEFAULT_WINDOW_SECS);
        let old = SystemTime::UNIX_EPOCH + Duration::from_secs((now - DEFAULT_WINDOW_SECS - 1) as u64);
        let edge = SystemTime::UNIX_EPOCH + Duration::from_secs((now - DEFAULT_WINDOW_SECS) as u64);
        assert!(!w.admits_mtime(old));
        assert!(w.admits_mtime(edge));
    }

    #[test]
    fn test_cutoff_display_has_year() {
        let w = TimeWindow::from_cutoff(1_678_025_730);
        assert!(w.cutoff_display().ends_with("2023"));
    }
}
