// statusmon - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// A line that does not parse is not an error (the parser returns `None`);
// everything below is a genuine failure of a file, folder, or sink.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Errors that end a run.
///
/// Per-file, per-sink and folder-publish failures never reach this type; they
/// are contained where they happen and surface through the run report.
#[derive(Debug)]
pub enum StatusMonError {
    /// No usable configuration could be assembled.
    Config(ConfigError),

    /// The log tree root could not be walked.
    Discovery(DiscoveryError),
}

impl fmt::Display for StatusMonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Discovery(e) => write!(f, "Discovery error: {e}"),
        }
    }
}

impl std::error::Error for StatusMonError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Discovery(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Discovery errors
// ---------------------------------------------------------------------------

/// Errors related to walking the log tree.
#[derive(Debug)]
pub enum DiscoveryError {
    /// The root scan path does not exist or is not accessible.
    RootNotFound { path: PathBuf },

    /// The root path is not a directory.
    NotADirectory { path: PathBuf },

    /// Permission denied accessing the root path.
    PermissionDenied { path: PathBuf, source: io::Error },

    /// Walkdir traversal error (wraps individual file/dir access failures).
    Traversal {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl fmt::Display for DiscoveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RootNotFound { path } => {
                write!(f, "Log root '{}' does not exist", path.display())
            }
            Self::NotADirectory { path } => {
                write!(f, "Log root '{}' is not a directory", path.display())
            }
            Self::PermissionDenied { path, source } => {
                write!(
                    f,
                    "Permission denied accessing '{}': {source}",
                    path.display()
                )
            }
            Self::Traversal { path, source } => {
                write!(f, "Error traversing '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for DiscoveryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::PermissionDenied { source, .. } => Some(source),
            Self::Traversal { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<DiscoveryError> for StatusMonError {
    fn from(e: DiscoveryError) -> Self {
        Self::Discovery(e)
    }
}

// ---------------------------------------------------------------------------
// Scan errors
// ---------------------------------------------------------------------------

/// A log file that could not be read. Always contained to that one file.
#[derive(Debug)]
pub enum ScanError {
    /// The file could not be opened.
    Open { file: PathBuf, source: io::Error },

    /// Reading failed part-way through the file.
    Read {
        file: PathBuf,
        line_number: u64,
        source: io::Error,
    },
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { file, source } => {
                write!(f, "Cannot open '{}': {source}", file.display())
            }
            Self::Read {
                file,
                line_number,
                source,
            } => write!(
                f,
                "'{}' line {line_number}: read failed: {source}",
                file.display()
            ),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Read { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors raised while emitting an entry to a sink.
#[derive(Debug)]
pub enum SinkError {
    /// Writing to the console stream failed.
    Console { source: io::Error },

    /// The archive output directory could not be created.
    CreateDir { path: PathBuf, source: io::Error },

    /// A stale archive output file from an earlier run could not be removed.
    RemoveStale { path: PathBuf, source: io::Error },

    /// Appending a line to an archive output file failed.
    Append { path: PathBuf, source: io::Error },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console { source } => write!(f, "Console write failed: {source}"),
            Self::CreateDir { path, source } => write!(
                f,
                "Cannot create archive folder '{}': {source}",
                path.display()
            ),
            Self::RemoveStale { path, source } => write!(
                f,
                "Cannot remove stale archive file '{}': {source}",
                path.display()
            ),
            Self::Append { path, source } => write!(
                f,
                "Cannot append to archive file '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Console { source }
            | Self::CreateDir { source, .. }
            | Self::RemoveStale { source, .. }
            | Self::Append { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

/// A folder operation that did not take effect within its attempt budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The folder still exists after every delete attempt.
    DeleteExhausted { path: PathBuf, attempts: u32 },

    /// The source folder was not moved into place after every attempt.
    MoveExhausted {
        source: PathBuf,
        destination: PathBuf,
        attempts: u32,
    },
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeleteExhausted { path, attempts } => write!(
                f,
                "'{}' still exists after {attempts} delete attempts",
                path.display()
            ),
            Self::MoveExhausted {
                source,
                destination,
                attempts,
            } => write!(
                f,
                "'{}' was not moved to '{}' after {attempts} attempts",
                source.display(),
                destination.display()
            ),
        }
    }
}

impl std::error::Error for PublishError {}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Neither the config file nor the command line names a log root.
    MissingRoot,

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::MissingRoot => write!(
                f,
                "No log root given. Pass ROOT on the command line or set [scan] root in config.toml"
            ),
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for StatusMonError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Convenience type alias for statusmon results.
pub type Result<T> = std::result::Result<T, StatusMonError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_discovery_error_keeps_io_source() {
        let err: StatusMonError = DiscoveryError::PermissionDenied {
            path: PathBuf::from("/logs"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        }
        .into();
        assert!(err.to_string().contains("/logs"));
        let discovery = err.source().expect("discovery error wrapped");
        assert!(discovery.source().is_some());
    }

    #[test]
    fn test_missing_root_message_is_direct() {
        let err: StatusMonError = ConfigError::MissingRoot.into();
        let msg = err.to_string();
        assert!(msg.contains("No log root given"), "{msg}");
        assert!(!msg.contains("out of range"));
    }

    #[test]
    fn test_publish_error_display_names_both_paths() {
        let err = PublishError::MoveExhausted {
            source: PathBuf::from("work"),
            destination: PathBuf::from("pub"),
            attempts: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("work") && msg.contains("pub") && msg.contains('3'));
    }
}
