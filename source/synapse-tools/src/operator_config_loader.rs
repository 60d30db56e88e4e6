use std::path::Path;

use synapse_config::common_types::error::ConfigError;
use synapse_config::common_types::operator_config::OperatorConfig;

use crate::error::AppError;

/// `SYNAPSE_TOOLS_CONFIG_PATH` env var name (spec.md §6).
pub const CONFIG_PATH_ENV: &str = "SYNAPSE_TOOLS_CONFIG_PATH";

/// Default operator config path, used when the env var is unset.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/synapse/synapse-tools.conf.json";

/// `SOA_DIR` env var name (spec.md §6).
pub const SOA_DIR_ENV: &str = "SOA_DIR";

/// Default namespace-source directory, matching `paasta_tools`'s
/// `DEFAULT_SOA_DIR` in `original_source`.
pub const DEFAULT_SOA_DIR: &str = "/nail/etc/services";

/// Resolves the operator config path from the environment, per spec.md §6.
pub fn config_path() -> String {
    std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Resolves the namespace-source directory from the environment.
pub fn soa_dir() -> String {
    std::env::var(SOA_DIR_ENV).unwrap_or_else(|_| DEFAULT_SOA_DIR.to_string())
}

/// Reads and validates the operator config at `path`. IO failure and
/// validation failure are both fatal (spec.md §7).
pub fn load(path: &str) -> Result<OperatorConfig, AppError> {
    let raw = std::fs::read_to_string(Path::new(path)).map_err(|source| AppError::ReadFile {
        path: path.to_string(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_str(&raw).map_err(ConfigError::Deserialize)?;
    Ok(OperatorConfig::from_raw(value, path)?)
}
