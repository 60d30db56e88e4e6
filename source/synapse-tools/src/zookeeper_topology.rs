use serde::Deserialize;

use crate::error::AppError;

/// One `[host, port]` entry as the topology file encodes it.
#[derive(Debug, Deserialize)]
struct HostPort(String, u16);

/// Reads the discovery-registry topology file (spec.md §6: "structured,
/// list of `[host, port]` pairs") and renders it to `host:port` strings,
/// the form `DiscoveryDict::zookeeper`'s `hosts` field expects.
pub fn load(path: &str) -> Result<Vec<String>, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|source| AppError::ReadFile {
        path: path.to_string(),
        source,
    })?;
    let entries: Vec<HostPort> = serde_yaml::from_str(&raw).map_err(|source| AppError::ParseYaml {
        path: path.to_string(),
        source,
    })?;
    Ok(entries.into_iter().map(|HostPort(host, port)| format!("{host}:{port}")).collect())
}
