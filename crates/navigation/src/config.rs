use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Environment variable naming a JSON file with navigator settings.
pub const CONFIG_ENV_VAR: &str = "TERRA_NAV_CONFIG";

/// Whether dolly/magnification follows or opposes the wheel direction.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    WithScroll,
    #[default]
    AgainstScroll,
}

impl ScrollDirection {
    pub fn sign(self) -> f64 {
        match self {
            ScrollDirection::WithScroll => 1.0,
            ScrollDirection::AgainstScroll => -1.0,
        }
    }
}

/// Tuning constants for pointer handling and inertial scrolling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Per-axis pointer delta (device units) above which a move is treated
    /// as a re-acquisition jump and ignored.
    pub jump_threshold: f64,
    /// Smoothed drag velocity needed on release to start coasting.
    pub coast_velocity_threshold: f64,
    /// Initial coast amplitude as a fraction of the release velocity.
    pub coast_gain: f64,
    /// Weight of the newest speed sample in the velocity estimate.
    pub velocity_smoothing: f64,
    /// Exponential decay time constant of a coast (milliseconds).
    pub time_constant_ms: f64,
    /// Coasting stops once the per-tick drag falls to this magnitude.
    pub stop_delta: f64,
    pub scroll_direction: ScrollDirection,
    pub dolly_gain: f64,
    /// Pan distance or rotation angle of one discrete step.
    pub step_size: f64,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            jump_threshold: 100.0,
            coast_velocity_threshold: 10.0,
            coast_gain: 0.8,
            velocity_smoothing: 0.8,
            time_constant_ms: 325.0,
            stop_delta: 0.5,
            scroll_direction: ScrollDirection::default(),
            dolly_gain: 2.0,
            step_size: 1.0,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {source}", path.display())
            }
            ConfigError::Parse(e) => write!(f, "invalid navigator config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl NavigatorConfig {
    pub fn from_json_str(payload: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(payload).map_err(ConfigError::Parse)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let payload = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&payload)
    }

    /// Load from the file named by `TERRA_NAV_CONFIG`, or use defaults when
    /// the variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::load(PathBuf::from(path)),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use pretty_assertions::assert_eq;

    use super::{ConfigError, NavigatorConfig, ScrollDirection};

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = NavigatorConfig::from_json_str(
            r#"{ "time_constant_ms": 500.0, "scroll_direction": "with_scroll" }"#,
        )
        .expect("parse");
        assert_eq!(cfg.time_constant_ms, 500.0);
        assert_eq!(cfg.scroll_direction, ScrollDirection::WithScroll);
        assert_eq!(cfg.jump_threshold, 100.0);
        assert_eq!(cfg.stop_delta, 0.5);
    }

    #[test]
    fn default_scrolls_against_wheel() {
        assert_eq!(NavigatorConfig::default().scroll_direction.sign(), -1.0);
    }

    #[test]
    fn load_reads_file_and_reports_missing() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        write!(file, r#"{{ "dolly_gain": 4.0 }}"#).expect("write");
        let cfg = NavigatorConfig::load(file.path()).expect("load");
        assert_eq!(cfg.dolly_gain, 4.0);

        let err = NavigatorConfig::load(file.path().with_extension("missing"));
        assert!(matches!(err, Err(ConfigError::Io { .. })));
        let io = err
            .err()
            .and_then(|e| {
                std::error::Error::source(&e)
                    .and_then(|s| s.downcast_ref::<std::io::Error>())
                    .map(std::io::Error::kind)
            });
        assert_eq!(io, Some(std::io::ErrorKind::NotFound));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = NavigatorConfig::from_json_str("{ not json");
        assert!(matches!(err, Err(ConfigError::Parse(_))));
        let source = err.err().and_then(|e| {
            std::error::Error::source(&e).map(|s| s.is::<serde_json::Error>())
        });
        assert_eq!(source, Some(true));
    }
}
