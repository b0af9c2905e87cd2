// statusmon - platform/config.rs
//
// Platform config directory resolution, config.toml loading with startup
// validation, and the merge of file settings with command-line overrides
// into the one immutable `MonitorConfig` a run is driven by.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::filter::LevelSet;
use crate::core::model::{ExcludeMode, HourConvention};
use crate::platform::fs::FsBackend;
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Resolved platform paths for statusmon configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/statusmon/ or %APPDATA%\statusmon\)
    pub config_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            tracing::debug!(config = %config_dir.display(), "Platform paths resolved");
            Self { config_dir }
        } else {
            tracing::warn!("Could not determine platform directories, using current directory");
            Self {
                config_dir: PathBuf::from("."),
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml shape
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub scan: ScanSection,
    pub archive: ArchiveSection,
    pub publish: PublishSection,
    pub logging: LoggingSection,
}

/// `[scan]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ScanSection {
    /// Root of the log tree.
    pub root: Option<PathBuf>,
    /// Look-back window in seconds.
    pub window_seconds: Option<i64>,
    /// Levels of interest.
    pub levels: Option<Vec<String>>,
    /// Reserved name excluded from the walk.
    pub exclude_name: Option<String>,
    /// "substring", "exact" or "glob".
    pub exclude_mode: Option<String>,
    /// "literal" or "twelve_hour".
    pub hour_convention: Option<String>,
}

/// `[archive]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ArchiveSection {
    pub enabled: Option<bool>,
    pub working_dir: Option<PathBuf>,
    pub publish_dir: Option<PathBuf>,
    /// Substrings that force archive admission.
    pub markers: Option<Vec<String>>,
}

/// `[publish]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct PublishSection {
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    /// "shell" or "native".
    pub backend: Option<String>,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

// =============================================================================
// Validated settings
// =============================================================================

/// Optional settings, validated. Used both for config.toml values and for
/// command-line overrides; `None` means "not given here".
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub root: Option<PathBuf>,
    pub window_secs: Option<i64>,
    pub levels: Option<Vec<String>>,
    pub reserved_name: Option<String>,
    pub exclude_mode: Option<ExcludeMode>,
    pub hour_convention: Option<HourConvention>,
    pub archive_enabled: Option<bool>,
    pub working_dir: Option<PathBuf>,
    pub publish_dir: Option<PathBuf>,
    pub markers: Option<Vec<String>>,
    pub retries: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    pub fs_backend: Option<FsBackend>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Layer `overrides` on top of `self`; any value set in `overrides` wins.
    pub fn overlay(self, overrides: Settings) -> Settings {
        Settings {
            root: overrides.root.or(self.root),
            window_secs: overrides.window_secs.or(self.window_secs),
            levels: overrides.levels.or(self.levels),
            reserved_name: overrides.reserved_name.or(self.reserved_name),
            exclude_mode: overrides.exclude_mode.or(self.exclude_mode),
            hour_convention: overrides.hour_convention.or(self.hour_convention),
            archive_enabled: overrides.archive_enabled.or(self.archive_enabled),
            working_dir: overrides.working_dir.or(self.working_dir),
            publish_dir: overrides.publish_dir.or(self.publish_dir),
            markers: overrides.markers.or(self.markers),
            retries: overrides.retries.or(self.retries),
            retry_delay_ms: overrides.retry_delay_ms.or(self.retry_delay_ms),
            fs_backend: overrides.fs_backend.or(self.fs_backend),
            log_level: overrides.log_level.or(self.log_level),
        }
    }
}

/// Everything one run needs, fixed at startup.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub root: PathBuf,
    pub window_secs: i64,
    pub levels: LevelSet,
    pub reserved_name: String,
    pub exclude_mode: ExcludeMode,
    pub hour_convention: HourConvention,
    pub archive_enabled: bool,
    pub working_dir: PathBuf,
    pub publish_dir: PathBuf,
    pub markers: Vec<String>,
    pub retries: u32,
    pub retry_delay: Duration,
    pub fs_backend: FsBackend,
}

impl MonitorConfig {
    /// Defaults for a log tree rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            working_dir: root.join(constants::DEFAULT_WORKING_DIR_NAME),
            publish_dir: root.join(constants::DEFAULT_PUBLISH_DIR_NAME),
            root,
            window_secs: constants::DEFAULT_WINDOW_SECS,
            levels: LevelSet::new(constants::DEFAULT_LEVELS),
            reserved_name: constants::DEFAULT_RESERVED_NAME.to_string(),
            exclude_mode: ExcludeMode::default(),
            hour_convention: HourConvention::default(),
            archive_enabled: false,
            markers: constants::DEFAULT_ARCHIVE_MARKERS
                .iter()
                .map(|m| (*m).to_string())
                .collect(),
            retries: constants::DEFAULT_PUBLISH_RETRIES,
            retry_delay: Duration::from_millis(constants::DEFAULT_PUBLISH_RETRY_DELAY_MS),
            fs_backend: FsBackend::default(),
        }
    }

    /// Build from merged settings. Only a missing root is fatal.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let root = settings.root.ok_or(ConfigError::MissingRoot)?;
        let mut config = Self::for_root(root);

        if let Some(secs) = settings.window_secs {
            config.window_secs = secs;
        }
        if let Some(levels) = settings.levels {
            config.levels = LevelSet::new(levels);
        }
        if let Some(name) = settings.reserved_name {
            config.reserved_name = name;
        }
        if let Some(mode) = settings.exclude_mode {
            config.exclude_mode = mode;
        }
        if let Some(conv) = settings.hour_convention {
            config.hour_convention = conv;
        }
        if let Some(enabled) = settings.archive_enabled {
            config.archive_enabled = enabled;
        }
        if let Some(dir) = settings.working_dir {
            config.working_dir = dir;
        }
        if let Some(dir) = settings.publish_dir {
            config.publish_dir = dir;
        }
        if let Some(markers) = settings.markers {
            config.markers = markers;
        }
        if let Some(retries) = settings.retries {
            config.retries = retries;
        }
        if let Some(ms) = settings.retry_delay_ms {
            config.retry_delay = Duration::from_millis(ms);
        }
        if let Some(backend) = settings.fs_backend {
            config.fs_backend = backend;
        }

        Ok(config)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Load and validate `config_path`.
///
/// Returns validated settings and a list of non-fatal warnings. A missing
/// file yields empty settings with no warnings; an unreadable or unparseable
/// file yields empty settings with one warning. Individual out-of-range
/// values are dropped with a warning naming the field.
pub fn load_config(config_path: &Path) -> (Settings, Vec<String>) {
    let mut warnings: Vec<String> = Vec::new();

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "No config.toml found; using defaults");
        return (Settings::default(), warnings);
    }

    let content = match std::fs::read_to_string(config_path) {
        Ok(c) => c,
        Err(e) => {
            warnings.push(
                ConfigError::Io {
                    path: config_path.to_path_buf(),
                    source: e,
                }
                .to_string()
                    + ". Using defaults.",
            );
            return (Settings::default(), warnings);
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) => {
            warnings.push(
                ConfigError::TomlParse {
                    path: config_path.to_path_buf(),
                    source: e,
                }
                .to_string()
                    + ". Using defaults.",
            );
            return (Settings::default(), warnings);
        }
    };

    tracing::debug!(path = %config_path.display(), "Loaded config.toml");
    let settings = validate(raw, &mut warnings);
    (settings, warnings)
}

/// Validate a parsed config against the named bounds in `util::constants`.
pub fn validate(raw: RawConfig, warnings: &mut Vec<String>) -> Settings {
    let mut settings = Settings {
        root: raw.scan.root,
        archive_enabled: raw.archive.enabled,
        working_dir: raw.archive.working_dir,
        publish_dir: raw.archive.publish_dir,
        ..Settings::default()
    };

    // -- Scan: window_seconds --
    if let Some(secs) = raw.scan.window_seconds {
        if (constants::MIN_WINDOW_SECS..=constants::MAX_WINDOW_SECS).contains(&secs) {
            settings.window_secs = Some(secs);
        } else {
            warnings.push(format!(
                "[scan] window_seconds = {secs} is out of range ({}-{}). Using default ({}).",
                constants::MIN_WINDOW_SECS,
                constants::MAX_WINDOW_SECS,
                constants::DEFAULT_WINDOW_SECS,
            ));
        }
    }

    // -- Scan: levels --
    if let Some(levels) = raw.scan.levels {
        if LevelSet::new(&levels).is_empty() {
            warnings.push(
                "[scan] levels is empty; nothing would reach the console. Using default ([\"error\"])."
                    .to_string(),
            );
        } else {
            settings.levels = Some(levels);
        }
    }

    // -- Scan: exclude_name --
    if let Some(name) = raw.scan.exclude_name {
        if name.trim().is_empty() {
            warnings.push(format!(
                "[scan] exclude_name is empty; the archive folders would be rescanned. \
                 Using default (\"{}\").",
                constants::DEFAULT_RESERVED_NAME
            ));
        } else {
            settings.reserved_name = Some(name);
        }
    }

    // -- Scan: exclude_mode --
    if let Some(ref mode) = raw.scan.exclude_mode {
        match ExcludeMode::from_name(mode) {
            Some(m) => settings.exclude_mode = Some(m),
            None => warnings.push(format!(
                "[scan] exclude_mode = \"{mode}\" is not recognised. \
                 Expected \"substring\", \"exact\" or \"glob\". Using default (substring).",
            )),
        }
    }

    // -- Scan: hour_convention --
    if let Some(ref conv) = raw.scan.hour_convention {
        match conv.to_ascii_lowercase().as_str() {
            "literal" => settings.hour_convention = Some(HourConvention::Literal),
            "twelve_hour" => settings.hour_convention = Some(HourConvention::TwelveHour),
            other => warnings.push(format!(
                "[scan] hour_convention = \"{other}\" is not recognised. \
                 Expected \"literal\" or \"twelve_hour\". Using default (literal).",
            )),
        }
    }

    // -- Archive: markers --
    if let Some(markers) = raw.archive.markers {
        let kept: Vec<String> = markers.into_iter().filter(|m| !m.is_empty()).collect();
        settings.markers = Some(kept);
    }

    // -- Publish: retries --
    if let Some(retries) = raw.publish.retries {
        if (1..=constants::MAX_PUBLISH_RETRIES).contains(&retries) {
            settings.retries = Some(retries);
        } else {
            warnings.push(format!(
                "[publish] retries = {retries} is out of range (1-{}). Using default ({}).",
                constants::MAX_PUBLISH_RETRIES,
                constants::DEFAULT_PUBLISH_RETRIES,
            ));
        }
    }

    // -- Publish: retry_delay_ms --
    if let Some(ms) = raw.publish.retry_delay_ms {
        if ms <= constants::MAX_PUBLISH_RETRY_DELAY_MS {
            settings.retry_delay_ms = Some(ms);
        } else {
            warnings.push(format!(
                "[publish] retry_delay_ms = {ms} is out of range (0-{}). Using default ({}).",
                constants::MAX_PUBLISH_RETRY_DELAY_MS,
                constants::DEFAULT_PUBLISH_RETRY_DELAY_MS,
            ));
        }
    }

    // -- Publish: backend --
    if let Some(ref backend) = raw.publish.backend {
        match backend.to_ascii_lowercase().as_str() {
            "shell" => settings.fs_backend = Some(FsBackend::Shell),
            "native" => settings.fs_backend = Some(FsBackend::Native),
            other => warnings.push(format!(
                "[publish] backend = \"{other}\" is not recognised. \
                 Expected \"shell\" or \"native\". Using default (shell).",
            )),
        }
    }

    // -- Logging: level --
    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            settings.log_level = Some(level.clone());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    settings
}
