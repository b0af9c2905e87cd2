// statusmon - core/filter.rs
//
// Pure admission rules: which entries each sink accepts, and which tree
// entries the walker skips. No I/O here; the sinks in `app::sink` call
// these before touching the console or the archive folder.

use crate::core::model::{ExcludeMode, ParsedEntry};
use crate::core::window::TimeWindow;
use std::collections::BTreeSet;

// =============================================================================
// Level set
// =============================================================================

/// Lower-cased level tokens of interest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelSet {
    levels: BTreeSet<String>,
}

impl LevelSet {
    pub fn new<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            levels: levels
                .into_iter()
                .map(|l| l.as_ref().trim().to_lowercase())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }

    /// `level` must already be lower-case (as `ParsedEntry::level` is).
    pub fn contains(&self, level: &str) -> bool {
        self.levels.contains(level)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.levels.iter().map(String::as_str)
    }
}

// =============================================================================
// Sink admission
// =============================================================================

/// Console admission: in scope and at a level of interest.
#[derive(Debug, Clone)]
pub struct ConsoleRule {
    pub window: TimeWindow,
    pub levels: LevelSet,
}

impl ConsoleRule {
    pub fn admits(&self, entry: &ParsedEntry) -> bool {
        self.window.in_scope(entry.timestamp_secs) && self.levels.contains(&entry.level)
    }
}

/// Archive admission: in scope and either at a level of interest or carrying
/// one of the marker substrings.
#[derive(Debug, Clone)]
pub struct ArchiveRule {
    pub window: TimeWindow,
    pub levels: LevelSet,
    pub markers: Vec<String>,
}

impl ArchiveRule {
    pub fn admits(&self, entry: &ParsedEntry) -> bool {
        if !self.window.in_scope(entry.timestamp_secs) {
            return false;
        }
        self.levels.contains(&entry.level)
            || self
                .markers
                .iter()
                .any(|m| entry.raw_line.contains(m.as_str()))
    }
}

// =============================================================================
// Tree exclusion
// =============================================================================

/// Decides which directory entries the walker never visits.
#[derive(Debug, Clone)]
pub struct NameExclusion {
    mode: ExcludeMode,
    name: String,
    pattern: Option<glob::Pattern>,
}

impl NameExclusion {
    /// Build an exclusion. An uncompilable glob falls back to exact matching.
    pub fn new(mode: ExcludeMode, name: &str) -> Self {
        let (mode, pattern) = match mode {
            ExcludeMode::Glob => match glob::Pattern::new(name) {
                Ok(p) => (ExcludeMode::Glob, Some(p)),
                Err(e) => {
                    tracing::warn!(
                        pattern = name,
                        error = %e,
                        "Invalid exclude glob; matching the name exactly instead"
                    );
                    (ExcludeMode::Exact, None)
                }
            },
            other => (other, None),
        };
        Self {
            mode,
            name: name.to_string(),
            pattern,
        }
    }

    /// True when a tree entry called `entry_name` must be skipped.
    ///
    /// An empty reserved name excludes nothing.
    pub fn excludes(&self, entry_name: &str) -> bool {
        if self.name.is_empty() {
            return false;
        }
        match self.mode {
            ExcludeMode::Substring => entry_name.contains(self.name.as_str()),
            ExcludeMode::Exact => entry_name == self.name,
            ExcludeMode::Glob => self
                .pattern
                .as_ref()
                .is_some_and(|p| p.matches(entry_name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(ts: i64, level: &str, line: &str) -> ParsedEntry {
        ParsedEntry {
            timestamp_secs: ts,
            level: level.to_string(),
            raw_line: line.to_string(),
            source_path: PathBuf::from("svc.log"),
        }
    }

    fn markers() -> Vec<String> {
        crate::util::constants::DEFAULT_ARCHIVE_MARKERS
            .iter()
            .map(|m| (*m).to_string())
            .collect()
    }

    #[test]
    fn test_level_set_normalises_case() {
        let set = LevelSet::new(["Error", " WARNING ", ""]);
        assert!(set.contains("error"));
        assert!(set.contains("warning"));
        assert_eq!(set.iter().count(), 2);
    }

    #[test]
    fn test_console_requires_scope_and_level() {
        let rule = ConsoleRule {
            window: TimeWindow::from_cutoff(100),
            levels: LevelSet::new(["error"]),
        };
        assert!(rule.admits(&entry(100, "error", "x")));
        assert!(!rule.admits(&entry(99, "error", "x")));
        assert!(!rule.admits(&entry(200, "info", "x")));
    }

    #[test]
    fn test_archive_admits_markers_regardless_of_level() {
        let rule = ArchiveRule {
            window: TimeWindow::from_cutoff(100),
            levels: LevelSet::new(["error"]),
            markers: markers(),
        };
        assert!(rule.admits(&entry(150, "info", "-1/1/2024-1:00:00::<Info> - Virtual Sync [x]")));
        assert!(rule.admits(&entry(150, "info", "::<Info> - VirtualFileSystem.PopulateFile a")));
        assert!(rule.admits(&entry(150, "info", "::<Info> - Started at 10:00")));
        assert!(rule.admits(&entry(150, "error", "anything")));
        assert!(!rule.admits(&entry(150, "info", "::<Info> - routine")));
    }

    #[test]
    fn test_archive_rejects_out_of_scope_markers() {
        let rule = ArchiveRule {
            window: TimeWindow::from_cutoff(100),
            levels: LevelSet::new(["error"]),
            markers: markers(),
        };
        assert!(!rule.admits(&entry(10, "info", "<Info> - Started at 10:00")));
        assert!(!rule.admits(&entry(10, "error", "boom")));
    }

    #[test]
    fn test_substring_exclusion() {
        let ex = NameExclusion::new(ExcludeMode::Substring, "splunk");
        assert!(ex.excludes("splunk"));
        assert!(ex.excludes("splunk_tmp"));
        assert!(ex.excludes("old-splunk-data"));
        assert!(!ex.excludes("alice"));
    }

    #[test]
    fn test_exact_exclusion() {
        let ex = NameExclusion::new(ExcludeMode::Exact, "splunk");
        assert!(ex.excludes("splunk"));
        assert!(!ex.excludes("splunk_tmp"));
    }

    #[test]
    fn test_glob_exclusion_and_fallback() {
        let ex = NameExclusion::new(ExcludeMode::Glob, "splunk*");
        assert!(ex.excludes("splunk_tmp"));
        assert!(!ex.excludes("old-splunk"));

        let bad = NameExclusion::new(ExcludeMode::Glob, "[splunk");
        assert!(bad.excludes("[splunk"));
        assert!(!bad.excludes("splunk"));
    }

    #[test]
    fn test_empty_reserved_name_excludes_nothing() {
        let ex = NameExclusion::new(ExcludeMode::Substring, "");
        assert!(!ex.excludes("anything"));
    }
}
