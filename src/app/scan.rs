// statusmon - app/scan.rs
//
// Walks the log tree and scans each file, feeding in-scope entries to the
// sink router.
//
//   - Files last modified before the window cutoff are skipped without
//     being opened.
//   - Each file is opened, read to the end in line order, and closed before
//     the next one is opened.
//   - A file that cannot be read is recorded as a warning; the walk goes on.
//   - Only a missing or unreadable root stops the walk.

use crate::app::sink::SinkRouter;
use crate::core::filter::NameExclusion;
use crate::core::model::HourConvention;
use crate::core::parser;
use crate::core::window::TimeWindow;
use crate::util::constants::MAX_WARNINGS;
use crate::util::error::{DiscoveryError, ScanError};
use crate::util::logging::preview;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

/// What the scanner needs to know, fixed for the run.
#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub window: TimeWindow,
    pub hour_convention: HourConvention,
    pub exclusion: NameExclusion,
}

/// How one file scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Modified before the cutoff; never opened.
    Stale,
    /// Read to the end.
    Scanned { lines: u64, entries_in_scope: u64 },
}

/// Totals for one walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    pub files_visited: u64,
    pub files_stale: u64,
    pub files_failed: u64,
    pub lines_read: u64,
    pub entries_in_scope: u64,
    /// Human-readable descriptions of non-fatal problems, capped at `MAX_WARNINGS`.
    pub warnings: Vec<String>,
    /// Warnings dropped after the cap was reached.
    pub warnings_suppressed: u64,
}

impl ScanSummary {
    fn warn(&mut self, msg: String) {
        if self.warnings.len() < MAX_WARNINGS {
            self.warnings.push(msg);
        } else {
            self.warnings_suppressed += 1;
        }
    }

    fn record(&mut self, outcome: FileOutcome) {
        self.files_visited += 1;
        match outcome {
            FileOutcome::Stale => self.files_stale += 1,
            FileOutcome::Scanned {
                lines,
                entries_in_scope,
            } => {
                self.lines_read += lines;
                self.entries_in_scope += entries_in_scope;
            }
        }
    }
}

// =============================================================================
// File scanner
// =============================================================================

/// Scan one log file.
///
/// Lines are split on `\n`, decoded lossily, and stripped of trailing
/// whitespace (which takes any `\r` with it) before parsing. Lines that do
/// not parse are dropped silently.
pub fn scan_file<W: Write>(
    path: &Path,
    options: &ScanOptions,
    router: &mut SinkRouter<W>,
) -> Result<FileOutcome, ScanError> {
    // Cheap short-circuit on mtime. An unreadable mtime fails open.
    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(mtime) if !options.window.admits_mtime(mtime) => {
            tracing::trace!(file = %path.display(), "Skipped: modified before window");
            return Ok(FileOutcome::Stale);
        }
        Ok(_) => {}
        Err(e) => {
            tracing::debug!(file = %path.display(), error = %e, "No mtime; scanning anyway");
        }
    }

    let file = File::open(path).map_err(|source| ScanError::Open {
        file: path.to_path_buf(),
        source,
    })?;
    let mut reader = BufReader::new(file);

    let mut routes = router.begin_file();
    let mut buf: Vec<u8> = Vec::new();
    let mut lines: u64 = 0;
    let mut entries_in_scope: u64 = 0;

    loop {
        buf.clear();
        let read = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| read_error(path, lines + 1, source))?;
        if read == 0 {
            break;
        }
        lines += 1;

        let text = String::from_utf8_lossy(&buf);
        let line = text.trim_end();

        let Some(entry) = parser::parse_line(line, path, options.hour_convention) else {
            continue;
        };
        if !options.window.in_scope(entry.timestamp_secs) {
            continue;
        }
        tracing::trace!(file = %path.display(), line = preview(line), "In scope");
        entries_in_scope += 1;
        router.route(&mut routes, &entry);
    }

    tracing::debug!(
        file = %path.display(),
        lines,
        entries_in_scope,
        "File scanned"
    );
    Ok(FileOutcome::Scanned {
        lines,
        entries_in_scope,
    })
}

fn read_error(path: &Path, line_number: u64, source: io::Error) -> ScanError {
    ScanError::Read {
        file: path.to_path_buf(),
        line_number,
        source,
    }
}

// =============================================================================
// Tree walker
// =============================================================================

/// Check that `root` exists and is a directory.
///
/// Uses `fs::metadata` rather than `Path::is_dir` so that access-denied is
/// reported as such instead of as "not found".
fn preflight(root: &Path) -> Result<(), DiscoveryError> {
    match std::fs::metadata(root) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(DiscoveryError::NotADirectory {
            path: root.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(DiscoveryError::PermissionDenied {
                path: root.to_path_buf(),
                source: e,
            })
        }
        Err(_) => Err(DiscoveryError::RootNotFound {
            path: root.to_path_buf(),
        }),
    }
}

/// Walk `root` recursively, scanning every file not excluded by name.
///
/// Excluded names prune whole subtrees. Entries are visited in file-name
/// order within each directory. Symbolic links are followed; a link cycle is
/// reported as a warning for that entry and not descended into.
pub fn walk_tree<W: Write>(
    root: &Path,
    options: &ScanOptions,
    router: &mut SinkRouter<W>,
) -> Result<ScanSummary, DiscoveryError> {
    preflight(root)?;

    tracing::debug!(root = %root.display(), "Walk starting");

    let mut summary = ScanSummary::default();
    let exclusion = &options.exclusion;

    let walker = walkdir::WalkDir::new(root)
        .min_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            if exclusion.excludes(&name) {
                tracing::trace!(path = %e.path().display(), "Excluded by reserved name");
                return false;
            }
            true
        });

    for entry_result in walker {
        let entry = match entry_result {
            Ok(e) => e,
            Err(e) => {
                let err = DiscoveryError::Traversal {
                    path: e
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| root.to_path_buf()),
                    source: e,
                };
                tracing::warn!(error = %err, "Walk warning");
                summary.warn(err.to_string());
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let path = entry.path();
        match scan_file(path, options, router) {
            Ok(outcome) => summary.record(outcome),
            Err(e) => {
                tracing::warn!(error = %e, "File skipped");
                summary.files_visited += 1;
                summary.files_failed += 1;
                summary.warn(e.to_string());
            }
        }
    }

    tracing::debug!(
        files = summary.files_visited,
        stale = summary.files_stale,
        failed = summary.files_failed,
        "Walk complete"
    );
    Ok(summary)
}
