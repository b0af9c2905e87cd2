// statusmon - util/logging.rs
//
// Structured diagnostic logging with runtime-selectable debug mode.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug
//   - Config file: [logging] level = "debug"
//
// Output: stderr only. stdout is reserved for the console report so the two
// can be redirected separately.

use crate::util::constants::{APP_NAME, APP_VERSION, DEFAULT_LOG_LEVEL};
use tracing_subscriber::EnvFilter;

/// Filter directive used when RUST_LOG is absent or unparseable.
fn fallback_directive(debug_flag: bool, config_level: Option<&str>) -> &str {
    if debug_flag {
        "debug"
    } else {
        config_level.unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

/// Install the stderr subscriber.
///
/// Priority: RUST_LOG > `--debug` > `[logging] level` > "info". Source
/// locations are only attached in debug mode; a scheduled run's stderr
/// should stay one short line per event.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_directive(debug_flag, config_level)));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(debug_flag)
        .with_file(debug_flag)
        .with_line_number(debug_flag)
        .compact()
        .try_init();

    match installed {
        Ok(()) => tracing::debug!(app = APP_NAME, version = APP_VERSION, "Logging initialised"),
        // Already installed (library embedding or a second call); keep that one.
        Err(e) => tracing::debug!(error = %e, "Logging already initialised"),
    }
}

/// Shorten a log line for inclusion in debug output.
pub fn preview(line: &str) -> &str {
    let max = crate::util::constants::DEBUG_MAX_LINE_PREVIEW;
    match line.char_indices().nth(max) {
        Some((idx, _)) => &line[..idx],
        None => line,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_flag_beats_config_level() {
        assert_eq!(fallback_directive(true, Some("warn")), "debug");
        assert_eq!(fallback_directive(false, Some("warn")), "warn");
        assert_eq!(fallback_directive(false, None), "info");
    }

    #[test]
    fn test_preview_short_line_unchanged() {
        assert_eq!(preview("-1/2/2024-3:04:05::<Error> x"), "-1/2/2024-3:04:05::<Error> x");
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let line = "é".repeat(500);
        let p = preview(&line);
        assert_eq!(p.chars().count(), crate::util::constants::DEBUG_MAX_LINE_PREVIEW);
    }
}
