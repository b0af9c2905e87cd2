// statusmon - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.
// Every value here can be overridden from config.toml or the command line;
// these are only the starting points.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "statusmon";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "statusmon";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Time window
// =============================================================================

/// Seconds in one day.
pub const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Default look-back window: ten days.
pub const DEFAULT_WINDOW_SECS: i64 = SECONDS_PER_DAY * 10;

/// Smallest accepted window. A zero window would only match entries stamped
/// in the future.
pub const MIN_WINDOW_SECS: i64 = 1;

/// Largest accepted window (ten years).
pub const MAX_WINDOW_SECS: i64 = SECONDS_PER_DAY * 3_650;

// =============================================================================
// Entry filtering
// =============================================================================

/// Levels admitted by the console sink (lower-case).
pub const DEFAULT_LEVELS: &[&str] = &["error"];

/// Substrings that force archive admission regardless of level.
pub const DEFAULT_ARCHIVE_MARKERS: &[&str] = &[
    "<Info> - Virtual Sync [",
    "<Info> - VirtualFileSystem.PopulateFile",
    "<Info> - Started at",
];

/// Indent written before each entry line on the console.
pub const CONSOLE_ENTRY_INDENT: &str = "   ";

// =============================================================================
// Tree walk
// =============================================================================

/// Name of the reserved archive subtree; entries matching it are never walked.
pub const DEFAULT_RESERVED_NAME: &str = "splunk";

/// Working folder name (relative to the log root) the archive sink writes into.
pub const DEFAULT_WORKING_DIR_NAME: &str = "splunk_tmp";

/// Published folder name (relative to the log root).
pub const DEFAULT_PUBLISH_DIR_NAME: &str = "splunk";

/// Number of path segments counted back from the file name to find the user.
pub const USER_SEGMENT_FROM_END: usize = 4;

/// Archive bucket used when a path is too shallow to yield a user segment.
pub const FALLBACK_USER_BUCKET: &str = "_unknown_user";

// =============================================================================
// Folder publishing
// =============================================================================

/// Default number of attempts for a folder delete or move.
pub const DEFAULT_PUBLISH_RETRIES: u32 = 10;

/// Default pause between attempts (ms).
pub const DEFAULT_PUBLISH_RETRY_DELAY_MS: u64 = 1_000;

/// Hard upper bound on attempts (prevents a config typo stalling the job).
pub const MAX_PUBLISH_RETRIES: u32 = 1_000;

/// Hard upper bound on the pause between attempts (ms).
pub const MAX_PUBLISH_RETRY_DELAY_MS: u64 = 60_000;

// =============================================================================
// Logging
// =============================================================================

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Maximum number of characters of a log line included in debug output.
pub const DEBUG_MAX_LINE_PREVIEW: usize = 200;

/// Maximum number of non-fatal warnings retained in a scan summary.
pub const MAX_WARNINGS: usize = 1_000;

// =============================================================================
// Configuration
// =============================================================================

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";
