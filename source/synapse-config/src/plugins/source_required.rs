use std::path::Path;

use super::{Block, ConfigPlugin};
use crate::common_types::namespace::Namespace;
use crate::common_types::operator_config::OperatorConfig;

/// Stamps an origin header on every backend request, ahead of anything
/// else the backend block does — hence the backend-block prepend.
pub struct SourceRequired {
    lua_dir: String,
    enabled: bool,
}

impl SourceRequired {
    pub fn new(namespace: &Namespace) -> Self {
        SourceRequired {
            lua_dir: String::new(),
            enabled: namespace
                .plugin_options("source_required")
                .and_then(|opts| opts.get("enabled"))
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
        }
    }

    /// Only the global `lua_dir` (shared with every plugin) needs the
    /// operator config; split out so `new` doesn't require borrowing both
    /// at construction when only the namespace is on hand in tests.
    pub fn with_lua_dir(namespace: &Namespace, operator_config: &OperatorConfig) -> Self {
        SourceRequired {
            lua_dir: operator_config.lua_dir.clone(),
            ..SourceRequired::new(namespace)
        }
    }
}

impl ConfigPlugin for SourceRequired {
    fn global_options(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        let lua_file = Path::new(&self.lua_dir).join("add_source_header.lua");
        vec![format!("lua-load {}", lua_file.display())]
    }

    fn backend_options(&self) -> Vec<String> {
        if !self.enabled {
            return Vec::new();
        }
        vec!["http-request lua.add_source_header".to_string()]
    }

    fn prepend(&self, block: Block) -> bool {
        block == Block::Backend
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_by_default() {
        let ns = Namespace::default();
        let plugin = SourceRequired::new(&ns);
        assert!(plugin.backend_options().is_empty());
    }

    #[test]
    fn enabled_prepends_backend_hook() {
        let ns: Namespace = serde_json::from_value(serde_json::json!({
            "plugins": {"source_required": {"enabled": true}}
        }))
        .unwrap();
        let plugin = SourceRequired::new(&ns);
        assert_eq!(plugin.backend_options(), vec!["http-request lua.add_source_header".to_string()]);
        assert!(plugin.prepend(Block::Backend));
        assert!(!plugin.prepend(Block::Frontend));
    }
}
