//! Optional TOML configuration file.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use aim_trainer_core::{ParameterError, ParameterKind};
use aim_trainer_session::{SessionConfig, DEFAULT_NUDGE_STEP, DEFAULT_SETTINGS_TIMEOUT};
use serde::Deserialize;
use thiserror::Error;

/// Settings read from the configuration file. Every table is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    /// Seed for wave generation, overridden by `--seed`.
    pub(crate) seed: Option<u64>,
    /// Session timing and input tuning.
    pub(crate) session: SessionSection,
    /// Initial knob positions keyed by parameter name.
    pub(crate) sliders: BTreeMap<String, f32>,
}

/// The `[session]` table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionSection {
    /// Seconds the settings screen waits before starting the round.
    pub(crate) settings_timeout_secs: f32,
    /// Distance a slider moves per frame while an arrow key is held.
    pub(crate) nudge_step: f32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            settings_timeout_secs: DEFAULT_SETTINGS_TIMEOUT.as_secs_f32(),
            nudge_step: DEFAULT_NUDGE_STEP,
        }
    }
}

/// Problems found while loading or validating the configuration.
#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has unexpected keys.
    #[error("invalid configuration")]
    Parse(#[from] toml::de::Error),
    /// A `[sliders]` key does not name a parameter.
    #[error("unknown slider `{name}`")]
    UnknownSlider {
        name: String,
        #[source]
        source: ParameterError,
    },
    /// A knob position lies outside the slider's travel range.
    #[error("{kind} slider position {position} lies outside {min}..={max}")]
    PositionOutOfRange {
        kind: ParameterKind,
        position: f32,
        min: f32,
        max: f32,
    },
    /// A duration or distance is zero, negative or not finite.
    #[error("{field} must be positive (received {value})")]
    NonPositive { field: &'static str, value: f32 },
    /// A duration is too large to represent.
    #[error("{field} is out of range (received {value})")]
    OutOfRange { field: &'static str, value: f32 },
}

impl GameConfig {
    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
            .map_err(warn)?;
        Self::parse(&text)
    }

    /// Parses configuration text.
    pub(crate) fn parse(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|error| warn(ConfigError::from(error)))
    }

    /// Validates the file contents and builds the session configuration.
    pub(crate) fn session_config(&self) -> Result<SessionConfig, ConfigError> {
        self.build_session_config().map_err(warn)
    }

    fn build_session_config(&self) -> Result<SessionConfig, ConfigError> {
        let timeout = positive("settings_timeout_secs", self.session.settings_timeout_secs)?;
        let timeout = Duration::try_from_secs_f32(timeout).map_err(|_| ConfigError::OutOfRange {
            field: "settings_timeout_secs",
            value: timeout,
        })?;
        let nudge_step = positive("nudge_step", self.session.nudge_step)?;

        let mut config = SessionConfig::default()
            .with_settings_timeout(timeout)
            .with_nudge_step(nudge_step);

        for (name, position) in &self.sliders {
            let kind: ParameterKind = name.parse().map_err(|source| ConfigError::UnknownSlider {
                name: name.clone(),
                source,
            })?;
            let travel = kind.travel_range();
            if !travel.contains(*position) {
                return Err(ConfigError::PositionOutOfRange {
                    kind,
                    position: *position,
                    min: travel.min_x(),
                    max: travel.max_x(),
                });
            }
            config = config.with_initial_position(kind, *position);
        }

        Ok(config)
    }
}

fn positive(field: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

fn warn(error: ConfigError) -> ConfigError {
    log::warn!("configuration rejected: {error}");
    error
}
