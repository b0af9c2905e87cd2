// statusmon - core/model.rs
//
// Core data model types. Pure data definitions with no I/O and no platform
// dependencies. These types are the shared vocabulary across all layers.

use std::path::PathBuf;

// =============================================================================
// Parsed entry (output of the timestamp parser)
// =============================================================================

/// One recognised log line.
///
/// Produced by `core::parser::parse_line` and never modified afterwards.
/// Lines that do not carry the `-M/D/YYYY-H:MM:SS[ AM|PM]::<Level>` prefix
/// never become entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Seconds since the Unix epoch, derived from the line's local-time stamp.
    pub timestamp_secs: i64,

    /// Level token from the `::<Level>` marker, lower-cased.
    pub level: String,

    /// The line exactly as emitted to sinks (trailing whitespace removed).
    pub raw_line: String,

    /// File the line was read from.
    pub source_path: PathBuf,
}

// =============================================================================
// Hour convention
// =============================================================================

/// How the optional `AM`/`PM` token adjusts the parsed hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HourConvention {
    /// `PM` adds 12 to the hour; anything else (including `AM`) adds nothing.
    ///
    /// This is what the producing service's logs have always been read with.
    /// `12 AM` stays at hour 12 and `12 PM` becomes hour 24, which rolls
    /// over to midnight of the following day.
    #[default]
    Literal,

    /// Conventional 12-hour clock: `12 AM` is hour 0 and `12 PM` is hour 12.
    TwelveHour,
}

impl HourConvention {
    /// Convert a parsed hour and optional period token to a 24-hour value.
    ///
    /// The result may exceed 23 under `Literal`; callers add it as an offset
    /// rather than constructing a time-of-day from it directly.
    pub fn to_24h(self, hour: u32, period: Option<&str>) -> u32 {
        match self {
            Self::Literal => {
                if period == Some("PM") {
                    hour.saturating_add(12)
                } else {
                    hour
                }
            }
            Self::TwelveHour => match (period, hour) {
                (Some("AM"), 12) => 0,
                (Some("PM"), 12) => 12,
                (Some("PM"), h) => h.saturating_add(12),
                (_, h) => h,
            },
        }
    }
}

// =============================================================================
// Tree walk exclusion
// =============================================================================

/// How the reserved archive folder name is matched against tree entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExcludeMode {
    /// Skip any entry whose name contains the reserved name.
    #[default]
    Substring,

    /// Skip only entries whose name equals the reserved name.
    Exact,

    /// Treat the reserved name as a glob pattern matched against entry names.
    Glob,
}

impl ExcludeMode {
    /// Parse a config/CLI spelling (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "substring" => Some(Self::Substring),
            "exact" => Some(Self::Exact),
            "glob" => Some(Self::Glob),
            _ => None,
        }
    }
}
