use std::path::Path;

use super::ConfigPlugin;
use crate::common_types::namespace::Namespace;
use crate::common_types::operator_config::OperatorConfig;

/// Loads the request-logging Lua module and installs its backend hooks.
/// Enabled when either the namespace's own `plugins.logging.enabled` or the
/// operator-wide `logging.enabled` is set; the per-namespace block wins
/// when both are present.
pub struct Logging {
    lua_dir: String,
    enabled: bool,
    sample_rate: Option<String>,
}

impl Logging {
    pub fn new(namespace: &Namespace, operator_config: &OperatorConfig) -> Self {
        let global_enabled = operator_config
            .logging
            .get("enabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let svc_opts = namespace.plugin_options("logging");
        let svc_enabled = svc_opts
            .and_then(|opts| opts.get("enabled"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let sample_rate = if svc_enabled {
            svc_opts.and_then(|opts| opts.get("sample_rate"))
        } else if global_enabled {
            operator_config.logging.get("sample_rate")
        } else {
            None
        }
        .map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        Logging {
            lua_dir: operator_config.lua_dir.clone(),
            enabled: svc_enabled || global_enabled,
            sample_rate,
        }
    }
}

impl ConfigPlugin for Logging {
    fn global_options(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let lua_file = Path::new(&self.lua_dir).join("log_requests.lua");
        let mut opts = vec![format!("lua-load {}", lua_file.display())];
        if let Some(rate) = &self.sample_rate {
            opts.push(format!("setenv sample_rate {rate}"));
        }
        opts
    }

    fn backend_options(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        vec![
            "http-request lua.init_logging".to_string(),
            "http-request lua.log_provenance".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operator_config(json: serde_json::Value) -> OperatorConfig {
        OperatorConfig::from_raw(json, "test").unwrap()
    }

    #[test]
    fn disabled_by_default() {
        let ns = Namespace::default();
        let cfg = operator_config(serde_json::json!({}));
        let plugin = Logging::new(&ns, &cfg);
        assert!(plugin.global_options().is_empty());
        assert!(plugin.backend_options().is_empty());
    }

    #[test]
    fn per_namespace_enable_overrides_global_and_carries_sample_rate() {
        let ns: Namespace = serde_json::from_value(serde_json::json!({
            "plugins": {"logging": {"enabled": true, "sample_rate": 10}}
        }))
        .unwrap();
        let cfg = operator_config(serde_json::json!({"logging": {"enabled": false}}));
        let plugin = Logging::new(&ns, &cfg);
        assert_eq!(plugin.global_options().len(), 2);
        assert!(plugin.global_options()[1].contains("sample_rate 10"));
        assert_eq!(plugin.backend_options().len(), 2);
    }

    #[test]
    fn global_enable_applies_to_namespaces_without_override() {
        let ns = Namespace::default();
        let cfg = operator_config(serde_json::json!({"logging": {"enabled": true}}));
        let plugin = Logging::new(&ns, &cfg);
        assert_eq!(plugin.global_options().len(), 1);
    }
}
