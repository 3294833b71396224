use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use chronocat_planner_core::{DayDate, PlannerError, PlannerResult};

const DEFAULT_CONFIG_NAME: &str = "planner.json";
const DEFAULT_DB_NAME: &str = "chronocat.sqlite";
pub const DEFAULT_DAY: &str = "2000-01-01";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum DatabaseConfig {
    Sqlite { path: Option<String> },
    Postgres { url: String },
    Mysql { url: String },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoolConfig {
    pub max_connections: Option<u32>,
    pub min_connections: Option<u32>,
    pub connect_timeout_ms: Option<u64>,
    pub acquire_timeout_ms: Option<u64>,
    pub idle_timeout_ms: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub database: DatabaseConfig,
    pub pool: Option<PoolConfig>,
    /// Date of the day that receives activities created without a scope.
    pub default_day: Option<String>,
    pub failpoints: Option<Vec<String>>,
}

impl PlannerConfig {
    pub fn default_sqlite(path: impl Into<String>) -> Self {
        Self {
            database: DatabaseConfig::Sqlite {
                path: Some(path.into()),
            },
            pool: None,
            default_day: Some(DEFAULT_DAY.to_string()),
            failpoints: None,
        }
    }

    /// Reads `planner.json` from `base_dir`, writing a SQLite default first
    /// when the file is missing. The default leaves the database path unset so
    /// it resolves next to the config.
    pub fn load_or_init(base_dir: &Path) -> PlannerResult<Self> {
        let config_path = base_dir.join(DEFAULT_CONFIG_NAME);
        if config_path.exists() {
            let raw = fs::read_to_string(&config_path)
                .map_err(|err| PlannerError::storage(format!("read config: {err}")))?;
            let config: PlannerConfig =
                serde_json::from_str(&raw).map_err(|err| PlannerError::invalid(err.to_string()))?;
            log::debug!("loaded planner config from {}", config_path.display());
            return Ok(config);
        }
        fs::create_dir_all(base_dir)
            .map_err(|err| PlannerError::storage(format!("create config dir: {err}")))?;
        let default = PlannerConfig {
            database: DatabaseConfig::Sqlite { path: None },
            pool: None,
            default_day: Some(DEFAULT_DAY.to_string()),
            failpoints: None,
        };
        let payload = serde_json::to_string_pretty(&default)
            .map_err(|err| PlannerError::storage(format!("serialize config: {err}")))?;
        fs::write(&config_path, payload)
            .map_err(|err| PlannerError::storage(format!("write config: {err}")))?;
        log::info!("wrote default planner config to {}", config_path.display());
        Ok(default)
    }

    pub fn sqlite_path(&self, base_dir: &Path) -> PlannerResult<PathBuf> {
        match &self.database {
            DatabaseConfig::Sqlite { path } => {
                let candidate = PathBuf::from(path.as_deref().unwrap_or(DEFAULT_DB_NAME));
                if candidate.is_absolute() {
                    Ok(candidate)
                } else {
                    Ok(base_dir.join(candidate))
                }
            }
            _ => Err(PlannerError::invalid("config is not sqlite backend")),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.database {
            DatabaseConfig::Sqlite { .. } => "sqlite",
            DatabaseConfig::Postgres { .. } => "postgres",
            DatabaseConfig::Mysql { .. } => "mysql",
        }
    }

    pub fn connection_url(&self) -> Option<&str> {
        match &self.database {
            DatabaseConfig::Sqlite { .. } => None,
            DatabaseConfig::Postgres { url } | DatabaseConfig::Mysql { url } => Some(url.as_str()),
        }
    }

    pub fn default_day_date(&self) -> PlannerResult<DayDate> {
        DayDate::parse(self.default_day.as_deref().unwrap_or(DEFAULT_DAY))
    }
}
