// statusmon - core/parser.rs
//
// Recognises the service log line prefix
//
//     -M/D/YYYY-H:MM:SS[ AM|PM]::<Level> ...
//
// and turns it into a `ParsedEntry`. Anything else (blank lines, stack
// traces, continuation lines) yields `None`; a miss is never an error.
// Core layer: operates on strings, never touches the filesystem.

use crate::core::model::{HourConvention, ParsedEntry};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

fn line_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Exercised by every test below; a typo fails the suite, not a run.
        Regex::new(
            r"^-(?P<mon>\d+)/(?P<day>\d+)/(?P<year>\d{4})-(?P<hour>\d+):(?P<min>\d+):(?P<sec>\d+)(?:\s(?P<period>AM|PM))?::<(?P<level>\w+)>",
        )
        .expect("parser: invalid line pattern")
    })
}

/// Parse one line (already stripped of its line ending).
///
/// Returns `None` when the line does not carry the timestamp prefix, or when
/// the date fields do not name a real calendar day (e.g. `2/30/2024`).
pub fn parse_line(line: &str, source: &Path, convention: HourConvention) -> Option<ParsedEntry> {
    let caps = line_pattern().captures(line)?;

    let field = |name: &str| -> Option<u32> { caps.name(name)?.as_str().parse().ok() };

    let year: i32 = caps.name("year")?.as_str().parse().ok()?;
    let month = field("mon")?;
    let day = field("day")?;
    let hour = convention.to_24h(field("hour")?, caps.name("period").map(|m| m.as_str()));
    let minute = field("min")?;
    let second = field("sec")?;

    let timestamp_secs = local_epoch_secs(year, month, day, hour, minute, second)?;

    Some(ParsedEntry {
        timestamp_secs,
        level: caps.name("level")?.as_str().to_lowercase(),
        raw_line: line.to_string(),
        source_path: source.to_path_buf(),
    })
}

/// Interpret a wall-clock reading in the local time zone.
///
/// Hour, minute and second are added as offsets from midnight so that
/// out-of-range values carry into the next unit (hour 24 is midnight of the
/// following day), the same normalisation C `mktime` performs. Month and day
/// must form a valid date.
///
/// Daylight-saving is resolved automatically: an ambiguous reading (clocks
/// going back) takes the earlier instant; a reading inside the spring-forward
/// gap is shifted forward by one hour.
pub fn local_epoch_secs(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
) -> Option<i64> {
    let midnight = NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)?;
    let offset = Duration::hours(i64::from(hour))
        + Duration::minutes(i64::from(minute))
        + Duration::seconds(i64::from(second));
    let naive = midnight.checked_add_signed(offset)?;
    resolve_local(&naive)
}

fn resolve_local(naive: &NaiveDateTime) -> Option<i64> {
    if let Some(dt) = Local.from_local_datetime(naive).earliest() {
        return Some(dt.timestamp());
    }
    let shifted = naive.checked_add_signed(Duration::hours(1))?;
    Local
        .from_local_datetime(&shifted)
        .earliest()
        .map(|dt| dt.timestamp())
}
