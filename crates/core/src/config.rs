use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use yessplora_api_types::TASK_COLUMNS;
use yessplora_spots::DEFAULT_ACTIVATION_RADIUS_M;

/// Key the persisted snapshot lives under in local storage.
pub const STORAGE_KEY: &str = "yessplora25-game-state";

/// Runtime tunables for a hunt. Every field has a default so a partial JSON
/// file only needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    /// Fixed number of tasks the progress percentage is computed against
    pub total_tasks: u32,
    pub activation_radius_m: f64,
    /// Spots closer than this (but outside their activation radius) are "nearby"
    pub nearby_radius_m: f64,
    pub storage_key: String,
    /// One-shot permission probe timeout
    pub probe_timeout_ms: u64,
    pub backend: BackendConfig,
    /// Placeholder admin credentials. No credentials means no admin access.
    pub admin: Option<AdminCredentials>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            total_tasks: 9,
            activation_radius_m: DEFAULT_ACTIVATION_RADIUS_M,
            nearby_radius_m: 100.0,
            storage_key: STORAGE_KEY.to_string(),
            probe_timeout_ms: 10_000,
            backend: BackendConfig::default(),
            admin: None,
        }
    }
}

impl GameConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.total_tasks == 0 {
            return Err(ConfigError::Invalid("totalTasks must be at least 1".into()));
        }
        // Each completion is written to its own task column of the sheet
        if self.total_tasks as usize > TASK_COLUMNS {
            return Err(ConfigError::Invalid(format!(
                "totalTasks must not exceed {TASK_COLUMNS}"
            )));
        }
        if !(self.activation_radius_m.is_finite() && self.activation_radius_m > 0.0) {
            return Err(ConfigError::Invalid("activationRadiusM must be positive".into()));
        }
        if !self.nearby_radius_m.is_finite() {
            return Err(ConfigError::Invalid("nearbyRadiusM must be finite".into()));
        }
        if !(self.nearby_radius_m >= self.activation_radius_m) {
            return Err(ConfigError::Invalid(
                "nearbyRadiusM must not be smaller than activationRadiusM".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendConfig {
    pub spreadsheet_id: String,
    /// Read access to the sheet
    pub api_key: Option<String>,
    /// OAuth token for appends and cell updates; API keys cannot write
    pub access_token: Option<String>,
    pub base_url: String,
    /// Simulated latencies for the mock backend
    pub save_latency_ms: u64,
    pub list_latency_ms: u64,
    pub update_latency_ms: u64,
    pub leaderboard_latency_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            api_key: None,
            access_token: None,
            base_url: "https://sheets.googleapis.com/v4/spreadsheets".into(),
            save_latency_ms: 1000,
            list_latency_ms: 500,
            update_latency_ms: 800,
            leaderboard_latency_ms: 600,
        }
    }
}

#[derive(Clone, PartialEq, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_hunt_rules() {
        let config = GameConfig::default();
        assert_eq!(config.total_tasks, 9);
        assert_eq!(config.activation_radius_m, 20.0);
        assert_eq!(config.nearby_radius_m, 100.0);
        assert_eq!(config.storage_key, "yessplora25-game-state");
        assert_eq!(config.probe_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = GameConfig::from_json_str(
            r#"{ "totalTasks": 5, "admin": { "username": "ops", "password": "pw" } }"#,
        )
        .unwrap();

        assert_eq!(config.total_tasks, 5);
        assert_eq!(config.nearby_radius_m, 100.0);
        assert_eq!(config.backend.save_latency_ms, 1000);
        assert_eq!(config.admin.unwrap().username, "ops");
    }

    #[test]
    fn rejects_nonsense() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "totalTasks": 0 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "nearbyRadiusM": 5 }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GameConfig::from_json_str("not json"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn more_tasks_than_sheet_columns_is_rejected() {
        assert!(GameConfig::from_json_str(r#"{ "totalTasks": 9 }"#).is_ok());
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "totalTasks": 10 }"#),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn infinite_radii_are_rejected() {
        let config = GameConfig {
            activation_radius_m: f64::INFINITY,
            nearby_radius_m: f64::INFINITY,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = GameConfig {
            nearby_radius_m: f64::INFINITY,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let creds = AdminCredentials {
            username: "ops".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
