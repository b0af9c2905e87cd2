// statusmon - app/monitor.rs
//
// One complete run:
//   1. print the window banner
//   2. clear any stale archive working folder
//   3. walk the log tree, routing in-scope entries to the sinks
//   4. publish the working folder (replacing the published folder, which
//      is simply cleared when nothing was archived)
//
// Only a failure to walk the root aborts the run. Folder operations are
// best-effort and surface through `RunReport`.

use crate::app::publish::{self, DeleteOutcome, FolderPublisher, MoveOutcome, RetryPolicy};
use crate::app::scan::{self, ScanOptions, ScanSummary};
use crate::app::sink::{ArchiveSink, ConsoleSink, RouteStats, SinkRouter};
use crate::core::filter::{ArchiveRule, ConsoleRule, NameExclusion};
use crate::core::window::TimeWindow;
use crate::platform::config::MonitorConfig;
use crate::platform::fs::FolderOps;
use crate::util::error::{DiscoveryError, PublishError};
use std::io::Write;

/// What happened during a run.
#[derive(Debug)]
pub struct RunReport {
    pub window: TimeWindow,
    pub summary: ScanSummary,
    pub routes: RouteStats,
    pub stale_cleanup: Result<DeleteOutcome, PublishError>,
    /// `SourceMissing` when nothing was archived this run.
    pub publish: Result<MoveOutcome, PublishError>,
}

impl RunReport {
    /// True when every folder operation that was attempted succeeded.
    pub fn publish_ok(&self) -> bool {
        self.stale_cleanup.is_ok()
            && !matches!(self.publish, Err(_) | Ok(MoveOutcome::DestinationBlocked))
    }
}

/// Execute one run against `config` with the given window.
///
/// `console` receives the banner, the console sink's report, and folder
/// progress lines, in that order.
pub fn run<O: FolderOps, W: Write>(
    config: &MonitorConfig,
    window: TimeWindow,
    ops: O,
    mut console: W,
) -> Result<RunReport, DiscoveryError> {
    tracing::info!(
        root = %config.root.display(),
        cutoff = window.cutoff_epoch_secs(),
        levels = ?config.levels.iter().collect::<Vec<_>>(),
        archive = config.archive_enabled,
        "Run starting"
    );

    publish::console_line(
        &mut console,
        format_args!("Status from: {}", window.cutoff_display()),
    );

    let mut publisher = FolderPublisher::new(ops, RetryPolicy::new(config.retries, config.retry_delay));
    let stale_cleanup = publisher.delete_folder(&config.working_dir, &mut console);

    let options = ScanOptions {
        window,
        hour_convention: config.hour_convention,
        exclusion: NameExclusion::new(config.exclude_mode, &config.reserved_name),
    };
    let console_sink = ConsoleSink::new(
        ConsoleRule {
            window,
            levels: config.levels.clone(),
        },
        &mut console,
    );
    let archive_sink = config.archive_enabled.then(|| {
        ArchiveSink::new(
            ArchiveRule {
                window,
                levels: config.levels.clone(),
                markers: config.markers.clone(),
            },
            &config.working_dir,
        )
    });

    let mut router = SinkRouter::new(console_sink, archive_sink);
    let summary = scan::walk_tree(&config.root, &options, &mut router)?;
    let (_, routes) = router.finish();

    let publish = publisher.move_folder(&config.working_dir, &config.publish_dir, &mut console);

    if let Err(e) = console.flush() {
        tracing::debug!(error = %e, "Console flush failed");
    }

    tracing::info!(
        files = summary.files_visited,
        stale = summary.files_stale,
        failed = summary.files_failed,
        lines = summary.lines_read,
        in_scope = summary.entries_in_scope,
        console = routes.console_emitted,
        archived = routes.archive_emitted,
        "Run complete"
    );

    Ok(RunReport {
        window,
        summary,
        routes,
        stale_cleanup,
        publish,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::fs::NativeFolderOps;
    use std::fs;
    use std::time::Duration;

    fn config(root: &std::path::Path) -> MonitorConfig {
        let mut cfg = MonitorConfig::for_root(root);
        cfg.retry_delay = Duration::ZERO;
        cfg
    }

    #[test]
    fn test_run_without_archive_creates_no_folders() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        fs::create_dir_all(root.join("cat").join("u")).unwrap();
        fs::write(
            root.join("cat").join("u").join("svc.log"),
            "-1/2/2024-3:04:05::<Error> boom\n-1/2/2024-3:04:06::<Info> - Started at 1\n",
        )
        .unwrap();

        let cfg = config(root);
        let mut out = Vec::new();
        let report = run(&cfg, TimeWindow::from_cutoff(0), NativeFolderOps, &mut out).unwrap();

        assert_eq!(report.publish, Ok(MoveOutcome::SourceMissing));
        assert_eq!(report.stale_cleanup.unwrap(), DeleteOutcome::AlreadyAbsent);
        assert!(!cfg.working_dir.exists());
        assert!(!cfg.publish_dir.exists());
        assert_eq!(report.routes.console_emitted, 1);

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Status from: "));
        assert!(text.contains("   -1/2/2024-3:04:05::<Error> boom"));
        assert!(!text.contains("Moving"));
    }

    #[test]
    fn test_run_clears_stale_working_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let cfg = config(root);
        fs::create_dir_all(cfg.working_dir.join("old")).unwrap();

        let report = run(&cfg, TimeWindow::from_cutoff(0), NativeFolderOps, std::io::sink()).unwrap();
        assert_eq!(report.stale_cleanup.as_ref().unwrap(), &DeleteOutcome::Deleted { attempts: 1 });
        assert!(!cfg.working_dir.exists());
        assert!(report.publish_ok());
    }

    #[test]
    fn test_run_without_archive_clears_published_folder() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path();
        let cfg = config(root);
        fs::create_dir_all(cfg.publish_dir.join("olduser")).unwrap();
        fs::write(cfg.publish_dir.join("olduser").join("svc.log"), "stale\n").unwrap();

        let mut out = Vec::new();
        let report = run(&cfg, TimeWindow::from_cutoff(0), NativeFolderOps, &mut out).unwrap();

        assert_eq!(report.publish, Ok(MoveOutcome::SourceMissing));
        assert!(!cfg.publish_dir.exists());
        assert!(String::from_utf8(out).unwrap().contains("Removing: "));
        assert!(report.publish_ok());
    }

    #[test]
    fn test_run_missing_root_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = config(&tmp.path().join("missing"));
        let err = run(&cfg, TimeWindow::from_cutoff(0), NativeFolderOps, std::io::sink()).unwrap_err();
        assert!(matches!(err, DiscoveryError::RootNotFound { .. }));
    }
}
