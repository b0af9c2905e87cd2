// statusmon - app/sink.rs
//
// Destinations for admitted entries.
//
//   - `ConsoleSink` prints a blank line and the file path the first time a
//     file produces an entry, then each entry indented beneath it.
//   - `ArchiveSink` appends the raw line to `working_dir/<user>/<file name>`.
//
// Each sink keeps a small typed state per scanned file (`Sink::FileState`),
// created when the file scan starts and dropped when it ends. `SinkRouter`
// owns the sinks and fans each entry out to them.
//
// Failure policy:
//   - Console write failures are logged and counted; the run continues.
//   - The first archive failure disables the archive sink for the rest of
//     the run. Nothing already written is rolled back.

use crate::core::filter::{ArchiveRule, ConsoleRule};
use crate::core::identity;
use crate::core::model::ParsedEntry;
use crate::util::constants::CONSOLE_ENTRY_INDENT;
use crate::util::error::SinkError;
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A destination that decides for itself which entries it takes.
pub trait Sink {
    /// Per-file bookkeeping, fresh for every scanned file.
    type FileState: Default;

    /// Short name for diagnostics.
    fn name(&self) -> &'static str;

    /// Whether this sink wants `entry` at all.
    fn admits(&self, entry: &ParsedEntry) -> bool;

    /// Write an admitted entry.
    fn emit(&mut self, state: &mut Self::FileState, entry: &ParsedEntry) -> Result<(), SinkError>;

    /// `admits` then `emit`. Returns whether the entry was written.
    fn offer(&mut self, state: &mut Self::FileState, entry: &ParsedEntry) -> Result<bool, SinkError> {
        if !self.admits(entry) {
            return Ok(false);
        }
        self.emit(state, entry)?;
        Ok(true)
    }
}

// =============================================================================
// Console
// =============================================================================

/// Console bookkeeping for one file.
#[derive(Debug, Default)]
pub struct ConsoleFileState {
    header_printed: bool,
}

/// Operator-facing report.
pub struct ConsoleSink<W: Write> {
    rule: ConsoleRule,
    out: W,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(rule: ConsoleRule, out: W) -> Self {
        Self { rule, out }
    }

    /// Consume the sink and return its writer.
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Sink for ConsoleSink<W> {
    type FileState = ConsoleFileState;

    fn name(&self) -> &'static str {
        "console"
    }

    fn admits(&self, entry: &ParsedEntry) -> bool {
        self.rule.admits(entry)
    }

    fn emit(&mut self, state: &mut ConsoleFileState, entry: &ParsedEntry) -> Result<(), SinkError> {
        let write = |out: &mut W| -> io::Result<()> {
            if !state.header_printed {
                writeln!(out)?;
                writeln!(out, "{}", entry.source_path.display())?;
            }
            writeln!(out, "{CONSOLE_ENTRY_INDENT}{}", entry.raw_line)
        };
        write(&mut self.out).map_err(|source| SinkError::Console { source })?;
        state.header_printed = true;
        Ok(())
    }
}

// =============================================================================
// Archive
// =============================================================================

/// Archive bookkeeping for one file: where its lines go, once known.
#[derive(Debug, Default)]
pub struct ArchiveFileState {
    output_path: Option<PathBuf>,
}

/// Per-user rollup files under a working directory.
#[derive(Debug)]
pub struct ArchiveSink {
    rule: ArchiveRule,
    working_dir: PathBuf,
    /// Output files already started this run. A path is cleared of earlier
    /// content only the first time it is claimed.
    claimed: HashSet<PathBuf>,
}

impl ArchiveSink {
    pub fn new(rule: ArchiveRule, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            rule,
            working_dir: working_dir.into(),
            claimed: HashSet::new(),
        }
    }

    /// Output files written so far this run.
    #[cfg(test)]
    pub(crate) fn outputs(&self) -> impl Iterator<Item = &Path> {
        self.claimed.iter().map(PathBuf::as_path)
    }

    /// Resolve and prepare the output file for the entry's source.
    fn open_output(&mut self, source: &Path) -> Result<PathBuf, SinkError> {
        let output = identity::archive_output_path(&self.working_dir, source);

        if self.claimed.contains(&output) {
            return Ok(output);
        }

        if let Some(folder) = output.parent() {
            if !folder.is_dir() {
                std::fs::create_dir_all(folder).map_err(|source| SinkError::CreateDir {
                    path: folder.to_path_buf(),
                    source,
                })?;
            }
        }
        if output.is_file() {
            std::fs::remove_file(&output).map_err(|source| SinkError::RemoveStale {
                path: output.clone(),
                source,
            })?;
        }

        tracing::debug!(
            source = %source.display(),
            output = %output.display(),
            "Archive output claimed"
        );
        self.claimed.insert(output.clone());
        Ok(output)
    }
}

impl Sink for ArchiveSink {
    type FileState = ArchiveFileState;

    fn name(&self) -> &'static str {
        "archive"
    }

    fn admits(&self, entry: &ParsedEntry) -> bool {
        self.rule.admits(entry)
    }

    fn emit(&mut self, state: &mut ArchiveFileState, entry: &ParsedEntry) -> Result<(), SinkError> {
        let output = match state.output_path {
            Some(ref path) => path.clone(),
            None => {
                let path = self.open_output(&entry.source_path)?;
                state.output_path = Some(path.clone());
                path
            }
        };

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&output)
            .map_err(|source| SinkError::Append {
                path: output.clone(),
                source,
            })?;
        writeln!(file, "{}", entry.raw_line).map_err(|source| SinkError::Append {
            path: output,
            source,
        })
    }
}

// =============================================================================
// Router
// =============================================================================

/// Per-file state for every configured sink.
#[derive(Debug, Default)]
pub struct FileRoutes {
    console: ConsoleFileState,
    archive: ArchiveFileState,
}

/// Emission counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteStats {
    pub console_emitted: u64,
    pub console_errors: u64,
    pub archive_emitted: u64,
    /// Set once the archive sink has failed and stopped.
    pub archive_failed: bool,
}

/// Fans entries out to the console sink and, when enabled, the archive sink.
pub struct SinkRouter<W: Write> {
    console: ConsoleSink<W>,
    archive: Option<ArchiveSink>,
    stats: RouteStats,
}

impl<W: Write> SinkRouter<W> {
    pub fn new(console: ConsoleSink<W>, archive: Option<ArchiveSink>) -> Self {
        Self {
            console,
            archive,
            stats: RouteStats::default(),
        }
    }

    /// Fresh per-file state; call once at the start of each file.
    pub fn begin_file(&self) -> FileRoutes {
        FileRoutes::default()
    }

    /// Offer `entry` to every active sink.
    pub fn route(&mut self, routes: &mut FileRoutes, entry: &ParsedEntry) {
        match self.console.offer(&mut routes.console, entry) {
            Ok(true) => self.stats.console_emitted += 1,
            Ok(false) => {}
            Err(e) => {
                self.stats.console_errors += 1;
                tracing::warn!(sink = self.console.name(), error = %e, "Console write failed");
            }
        }

        let Some(archive) = self.archive.as_mut() else {
            return;
        };
        match archive.offer(&mut routes.archive, entry) {
            Ok(true) => self.stats.archive_emitted += 1,
            Ok(false) => {}
            Err(e) => {
                tracing::error!(
                    sink = archive.name(),
                    error = %e,
                    "Archive sink failed; no further entries will be archived this run"
                );
                self.stats.archive_failed = true;
                self.archive = None;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn stats(&self) -> RouteStats {
        self.stats
    }

    #[cfg(test)]
    pub(crate) fn archive(&self) -> Option<&ArchiveSink> {
        self.archive.as_ref()
    }

    /// Flush the console and hand back its writer.
    pub fn finish(mut self) -> (W, RouteStats) {
        if let Err(e) = self.console.out.flush() {
            tracing::warn!(error = %e, "Console flush failed");
        }
        (self.console.into_inner(), self.stats)
    }
}
