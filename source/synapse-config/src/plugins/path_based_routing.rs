use std::path::Path;

use super::ConfigPlugin;
use crate::common_types::namespace::Namespace;
use crate::common_types::operator_config::OperatorConfig;

/// Routes requests to a backend computed from the request path by a Lua
/// module, rather than the static per-endpoint ACLs the compiler emits.
pub struct PathBasedRouting {
    lua_dir: String,
    enabled: bool,
}

impl PathBasedRouting {
    pub fn new(namespace: &Namespace, operator_config: &OperatorConfig) -> Self {
        let global_enabled = operator_config
            .path_based_routing
            .get("enabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        let svc_enabled = namespace
            .plugin_options("path_based_routing")
            .and_then(|opts| opts.get("enabled"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        PathBasedRouting {
            lua_dir: operator_config.lua_dir.clone(),
            enabled: svc_enabled || global_enabled,
        }
    }
}

impl ConfigPlugin for PathBasedRouting {
    fn global_options(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let lua_file = Path::new(&self.lua_dir).join("path_based_routing.lua");
        vec![format!("lua-load {}", lua_file.display())]
    }

    fn frontend_options(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        vec![
            "http-request set-var(txn.backend_name) lua.get_backend".to_string(),
            "use_backend %[var(txn.backend_name)]".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let ns = Namespace::default();
        let cfg = OperatorConfig::from_raw(serde_json::json!({}), "test").unwrap();
        let plugin = PathBasedRouting::new(&ns, &cfg);
        assert!(plugin.global_options().is_empty());
        assert!(plugin.frontend_options().is_empty());
    }

    #[test]
    fn enabled_installs_frontend_dispatch() {
        let ns: Namespace = serde_json::from_value(serde_json::json!({
            "plugins": {"path_based_routing": {"enabled": true}}
        }))
        .unwrap();
        let cfg = OperatorConfig::from_raw(serde_json::json!({}), "test").unwrap();
        let plugin = PathBasedRouting::new(&ns, &cfg);
        assert_eq!(plugin.frontend_options().len(), 2);
        assert_eq!(plugin.global_options().len(), 1);
    }
}
