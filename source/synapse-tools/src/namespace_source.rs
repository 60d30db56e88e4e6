use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use synapse_config::common_types::error::NamespaceSourceError;
use synapse_config::common_types::namespace::Namespace;
use synapse_config::namespace_source::NamespaceSource;
use walkdir::WalkDir;

/// File name holding a service directory's namespace declarations, per
/// SPEC_FULL.md §6.
const SMARTSTACK_FILE: &str = "smartstack.yaml";

/// Reads `<soa_dir>/<service>/smartstack.yaml` for every service directory
/// under `soa_dir`: each file is a YAML mapping of instance name to
/// namespace declaration, keyed externally as `service.instance`.
pub struct SoaDirNamespaceSource {
    soa_dir: PathBuf,
}

impl SoaDirNamespaceSource {
    pub fn new(soa_dir: impl Into<PathBuf>) -> Self {
        SoaDirNamespaceSource { soa_dir: soa_dir.into() }
    }
}

impl NamespaceSource for SoaDirNamespaceSource {
    fn namespaces(&self) -> Result<Vec<(String, Namespace)>, NamespaceSourceError> {
        let mut out = Vec::new();

        if !self.soa_dir.is_dir() {
            return Ok(out);
        }

        for entry in WalkDir::new(&self.soa_dir).min_depth(1).max_depth(1).into_iter() {
            let entry = entry.map_err(|e| NamespaceSourceError::Io(e.to_string()))?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let service = entry.file_name().to_string_lossy().to_string();
            let smartstack_path = entry.path().join(SMARTSTACK_FILE);
            if !smartstack_path.is_file() {
                continue;
            }
            out.extend(read_service_file(&service, &smartstack_path)?);
        }

        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }
}

fn read_service_file(service: &str, path: &Path) -> Result<Vec<(String, Namespace)>, NamespaceSourceError> {
    let raw = std::fs::read_to_string(path).map_err(|e| NamespaceSourceError::Io(format!("{}: {e}", path.display())))?;
    let instances: BTreeMap<String, Namespace> =
        serde_yaml::from_str(&raw).map_err(|e| NamespaceSourceError::Parse {
            name: service.to_string(),
            message: e.to_string(),
        })?;
    Ok(instances
        .into_iter()
        .map(|(instance, namespace)| (format!("{service}.{instance}"), namespace))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reads_namespace_declarations_keyed_by_service_dot_instance() {
        let dir = tempfile::tempdir().unwrap();
        let svc_dir = dir.path().join("widgets");
        fs::create_dir(&svc_dir).unwrap();
        fs::write(
            svc_dir.join("smartstack.yaml"),
            "main:\n  proxy_port: 20001\n  discover: region\n",
        )
        .unwrap();

        let source = SoaDirNamespaceSource::new(dir.path());
        let namespaces = source.namespaces().unwrap();
        assert_eq!(namespaces.len(), 1);
        assert_eq!(namespaces[0].0, "widgets.main");
        assert_eq!(namespaces[0].1.proxy_port, Some(20001));
    }

    #[test]
    fn missing_soa_dir_yields_empty_list_not_an_error() {
        let source = SoaDirNamespaceSource::new("/no/such/directory");
        assert!(source.namespaces().unwrap().is_empty());
    }

    #[test]
    fn directories_without_smartstack_yaml_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("no_config_here")).unwrap();
        let source = SoaDirNamespaceSource::new(dir.path());
        assert!(source.namespaces().unwrap().is_empty());
    }
}
