// statusmon - main.rs
//
// Application entry point. Handles:
// 1. CLI argument parsing
// 2. config.toml loading and merge with CLI overrides
// 3. Logging initialisation (debug mode support)
// 4. One monitor run, then exit

use clap::Parser;
use statusmon::app::monitor::{self, RunReport};
use statusmon::core::model::{ExcludeMode, HourConvention};
use statusmon::core::window::TimeWindow;
use statusmon::platform::config::{self, MonitorConfig, PlatformPaths, Settings};
use statusmon::platform::fs::{FsBackend, NativeFolderOps, ShellFolderOps};
use statusmon::util::error::Result;
use statusmon::util::{self, constants};
use std::path::PathBuf;

/// statusmon - recent errors from a log tree, optionally archived for indexing.
///
/// Prints every error-level entry from the last ten days, grouped by file.
/// With --archive, also collects those entries (plus session markers) into
/// per-user files and publishes them to a folder for downstream indexing.
#[derive(Parser, Debug)]
#[command(name = "statusmon", version, about)]
struct Cli {
    /// Root of the log tree (overrides [scan] root).
    root: Option<PathBuf>,

    /// Config file to read instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Write matching entries to the archive and publish it.
    #[arg(short = 'a', long = "archive")]
    archive: bool,

    /// Archive working folder (default: <root>/splunk_tmp).
    #[arg(long = "working-dir")]
    working_dir: Option<PathBuf>,

    /// Archive publish folder (default: <root>/splunk).
    #[arg(long = "publish-dir")]
    publish_dir: Option<PathBuf>,

    /// Level of interest; repeat for several (default: error).
    #[arg(short = 'l', long = "level")]
    levels: Vec<String>,

    /// Look-back window in seconds.
    #[arg(
        long = "window-secs",
        conflicts_with = "window_days",
        value_parser = clap::value_parser!(i64).range(constants::MIN_WINDOW_SECS..=constants::MAX_WINDOW_SECS)
    )]
    window_secs: Option<i64>,

    /// Look-back window in days.
    #[arg(long = "window-days", value_parser = clap::value_parser!(i64).range(1..=3_650))]
    window_days: Option<i64>,

    /// Name excluded from the walk (default: splunk).
    #[arg(long = "exclude-name")]
    exclude_name: Option<String>,

    /// How the excluded name is matched: substring, exact or glob.
    #[arg(long = "exclude-mode", value_parser = parse_exclude_mode)]
    exclude_mode: Option<ExcludeMode>,

    /// Read 12 AM as midnight and 12 PM as noon.
    #[arg(long = "twelve-hour-clock")]
    twelve_hour_clock: bool,

    /// Attempts per folder delete/move.
    #[arg(
        long = "retries",
        value_parser = clap::value_parser!(u32).range(1..=i64::from(constants::MAX_PUBLISH_RETRIES))
    )]
    retries: Option<u32>,

    /// Pause between folder attempts, in milliseconds.
    #[arg(
        long = "retry-delay-ms",
        value_parser = clap::value_parser!(u64).range(0..=constants::MAX_PUBLISH_RETRY_DELAY_MS)
    )]
    retry_delay_ms: Option<u64>,

    /// Use std::fs for folder operations instead of OS commands.
    #[arg(long = "native-fs")]
    native_fs: bool,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn parse_exclude_mode(s: &str) -> std::result::Result<ExcludeMode, String> {
    ExcludeMode::from_name(s).ok_or_else(|| format!("expected substring, exact or glob, got '{s}'"))
}

impl Cli {
    /// Command-line values as settings; unset flags stay `None`.
    fn overrides(&self) -> Settings {
        Settings {
            root: self.root.clone(),
            window_secs: self
                .window_secs
                .or(self.window_days.map(|d| d * constants::SECONDS_PER_DAY)),
            levels: (!self.levels.is_empty()).then(|| self.levels.clone()),
            reserved_name: self.exclude_name.clone(),
            exclude_mode: self.exclude_mode,
            hour_convention: self.twelve_hour_clock.then_some(HourConvention::TwelveHour),
            archive_enabled: self.archive.then_some(true),
            working_dir: self.working_dir.clone(),
            publish_dir: self.publish_dir.clone(),
            markers: None,
            retries: self.retries,
            retry_delay_ms: self.retry_delay_ms,
            fs_backend: self.native_fs.then_some(FsBackend::Native),
            log_level: None,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Config is read before logging exists; its warnings are replayed below.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (file_settings, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, file_settings.log_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "statusmon starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }

    match execute(&cli, file_settings) {
        Ok(report) => {
            if !report.summary.warnings.is_empty() {
                tracing::warn!(
                    count = report.summary.warnings.len(),
                    suppressed = report.summary.warnings_suppressed,
                    "Some files could not be scanned"
                );
            }
            if !report.publish_ok() {
                tracing::warn!("Archive publish did not complete; see messages above");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Run aborted");
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Merge settings, fix the window, and run once against stdout.
fn execute(cli: &Cli, file_settings: Settings) -> Result<RunReport> {
    let config = MonitorConfig::from_settings(file_settings.overlay(cli.overrides()))?;
    let window = TimeWindow::ending_now(config.window_secs);

    let stdout = std::io::stdout();
    let console = stdout.lock();

    let report = match config.fs_backend {
        FsBackend::Shell => monitor::run(&config, window, ShellFolderOps, console)?,
        FsBackend::Native => monitor::run(&config, window, NativeFolderOps, console)?,
    };
    Ok(report)
}
