//! Runner configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use card_table::board::BoardConfig;
use std::{net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

/// Complete runner configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    /// Board limits and per-task budget
    pub board: BoardConfig,
    /// Target frame interval
    pub tick: Duration,
    /// Control console bind address (console disabled when unset)
    pub console_bind: Option<SocketAddr>,
    /// JSON layout placed before the first frame
    pub layout_path: Option<PathBuf>,
    /// JSON atlas description replacing the standard card sheet
    pub assets_path: Option<PathBuf>,
    /// Stop after this many frames
    pub max_frames: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            tick: Duration::from_millis(16),
            console_bind: None,
            layout_path: None,
            assets_path: None,
            max_frames: None,
        }
    }
}

impl RunnerConfig {
    /// Load configuration from environment variables
    ///
    /// # Arguments
    ///
    /// * `console_override` - Optional console bind address (from CLI args)
    /// * `layout_override` - Optional layout path (from CLI args)
    /// * `assets_override` - Optional atlas path (from CLI args)
    /// * `max_frames_override` - Optional frame limit (from CLI args)
    ///
    /// # Errors
    ///
    /// Returns error if an optional variable is set but cannot be parsed
    pub fn from_env(
        console_override: Option<SocketAddr>,
        layout_override: Option<PathBuf>,
        assets_override: Option<PathBuf>,
        max_frames_override: Option<u64>,
    ) -> Result<Self, ConfigError> {
        let defaults = BoardConfig::default();
        let board = BoardConfig {
            capacity: parse_env_or("CARD_TABLE_CAPACITY", defaults.capacity)?,
            task_budget: parse_env_opt("CARD_TABLE_TASK_BUDGET_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.task_budget),
            cascade_limit: parse_env_or("CARD_TABLE_CASCADE_LIMIT", defaults.cascade_limit)?,
        };

        let console_bind = match console_override {
            Some(bind) => Some(bind),
            None => parse_env_opt("CARD_TABLE_CONSOLE_BIND")?,
        };

        let max_frames = match max_frames_override {
            Some(frames) => Some(frames),
            None => parse_env_opt("CARD_TABLE_MAX_FRAMES")?,
        };

        let tick = parse_env_opt("CARD_TABLE_TICK_MS")?
            .map(Duration::from_millis)
            .unwrap_or(RunnerConfig::default().tick);

        Ok(RunnerConfig {
            board,
            tick,
            console_bind,
            layout_path: layout_override.or_else(|| env_path("CARD_TABLE_LAYOUT")),
            assets_path: assets_override.or_else(|| env_path("CARD_TABLE_ASSETS")),
            max_frames,
        })
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate().map_err(|err| ConfigError::Invalid {
            var: "CARD_TABLE_*".to_string(),
            reason: err.to_string(),
        })?;

        if self.tick.is_zero() {
            return Err(ConfigError::Invalid {
                var: "CARD_TABLE_TICK_MS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.max_frames == Some(0) {
            return Err(ConfigError::Invalid {
                var: "CARD_TABLE_MAX_FRAMES".to_string(),
                reason: "Must be greater than 0 when set".to_string(),
            });
        }

        for (var, path) in [
            ("CARD_TABLE_LAYOUT", &self.layout_path),
            ("CARD_TABLE_ASSETS", &self.assets_path),
        ] {
            if let Some(path) = path
                && !path.is_file()
            {
                return Err(ConfigError::MissingRequired {
                    var: var.to_string(),
                    hint: format!("No such file: {}", path.display()),
                });
            }
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required file for {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Helper to parse environment variable with default fallback when unset
fn parse_env_or<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_env_opt(key)?.unwrap_or(default))
}

/// Helper to parse an optional environment variable, refusing garbage
fn parse_env_opt<T>(key: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_value(key, std::env::var(key).ok().as_deref())
}

/// Blank counts as unset; anything else must parse.
fn parse_value<T>(key: &str, raw: Option<&str>) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => {
            value.parse().map(Some).map_err(|err: T::Err| ConfigError::Invalid {
                var: key.to_string(),
                reason: format!("{value:?}: {err}"),
            })
        }
        _ => Ok(None),
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    std::env::var_os(key).map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::MissingRequired {
            var: "CARD_TABLE_LAYOUT".to_string(),
            hint: "No such file: layout.json".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("CARD_TABLE_LAYOUT"));
        assert!(msg.contains("layout.json"));
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = RunnerConfig::default();
        assert_eq!(config.tick, Duration::from_millis(16));
        assert_eq!(config.board.capacity, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_zero_tick() {
        let config = RunnerConfig {
            tick: Duration::ZERO,
            ..RunnerConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var, .. } if var == "CARD_TABLE_TICK_MS"));
    }

    #[test]
    fn test_config_validation_board_capacity() {
        let config = RunnerConfig {
            board: BoardConfig {
                capacity: 0,
                ..BoardConfig::default()
            },
            ..RunnerConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("capacity"));
    }

    #[test]
    fn test_config_validation_zero_frames() {
        let config = RunnerConfig {
            max_frames: Some(0),
            ..RunnerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_missing_layout() {
        let config = RunnerConfig {
            layout_path: Some(PathBuf::from("/definitely/not/here/layout.json")),
            ..RunnerConfig::default()
        };

        let err = config.validate().unwrap_err();
        assert!(
            matches!(err, ConfigError::MissingRequired { var, .. } if var == "CARD_TABLE_LAYOUT")
        );
    }

    #[test]
    fn test_overrides_win() {
        let bind: SocketAddr = "127.0.0.1:1337".parse().unwrap();
        let config = RunnerConfig::from_env(Some(bind), None, None, Some(3)).unwrap();
        assert_eq!(config.console_bind, Some(bind));
        assert_eq!(config.max_frames, Some(3));
    }

    #[test]
    fn test_unset_optional_is_none() {
        let parsed: Option<u64> = parse_env_opt("CARD_TABLE_TEST_SURELY_UNSET_VARIABLE").unwrap();
        assert!(parsed.is_none());
        assert_eq!(parse_env_or("CARD_TABLE_TEST_SURELY_UNSET_VARIABLE", 7u64).unwrap(), 7);
    }

    #[test]
    fn test_garbage_value_is_refused() {
        let err = parse_value::<usize>("CARD_TABLE_CAPACITY", Some("lots")).unwrap_err();
        assert!(matches!(&err, ConfigError::Invalid { var, .. } if var == "CARD_TABLE_CAPACITY"));
        assert!(err.to_string().contains("lots"));

        let negative = parse_value::<u64>("CARD_TABLE_TASK_BUDGET_MS", Some("-5"));
        assert!(negative.is_err());
    }

    #[test]
    fn test_blank_value_counts_as_unset() {
        assert_eq!(parse_value::<u64>("CARD_TABLE_TICK_MS", Some("  ")).unwrap(), None);
        assert_eq!(parse_value::<u64>("CARD_TABLE_TICK_MS", None).unwrap(), None);
        assert_eq!(parse_value::<u64>("CARD_TABLE_TICK_MS", Some(" 33 ")).unwrap(), Some(33));
    }
}
