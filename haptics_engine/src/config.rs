use haptics_shared::{HapticsError, HapticsResult, DEFAULT_TICK_RATE_HZ};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming an optional TOML config file
pub const CONFIG_ENV: &str = "HAPTICS_SDK_CONFIG";

pub const MAX_TICK_RATE_HZ: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub tick_rate_hz: u32,
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub log_filter: String,
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_rate_hz: DEFAULT_TICK_RATE_HZ,
            log_filter: "haptics_engine=info".to_string(),
            thread_name: "haptics-render".to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> HapticsResult<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| HapticsError::InitializationFailed(format!("invalid engine config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> HapticsResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            HapticsError::InitializationFailed(format!("cannot read engine config {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Reads the file named by `HAPTICS_SDK_CONFIG`, else returns defaults
    pub fn load() -> HapticsResult<Self> {
        Self::load_from(std::env::var_os(CONFIG_ENV))
    }

    fn load_from(path: Option<impl AsRef<Path>>) -> HapticsResult<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> HapticsResult<()> {
        if !(1..=MAX_TICK_RATE_HZ).contains(&self.tick_rate_hz) {
            return Err(HapticsError::InitializationFailed(format!(
                "tick_rate_hz must be between 1 and {}, got {}",
                MAX_TICK_RATE_HZ, self.tick_rate_hz
            )));
        }
        if self.thread_name.is_empty() || self.thread_name.contains('\0') {
            return Err(HapticsError::InitializationFailed(
                "thread_name must be a non-empty string without NUL bytes".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }
}
