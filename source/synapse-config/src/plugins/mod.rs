mod fault_injection;
mod logging;
mod path_based_routing;
mod proxied_through;
mod source_required;

pub use fault_injection::FaultInjection;
pub use logging::Logging;
pub use path_based_routing::PathBasedRouting;
pub use proxied_through::ProxiedThrough;
pub use source_required::SourceRequired;

use crate::common_types::namespace::Namespace;
use crate::common_types::operator_config::OperatorConfig;

/// The configuration block a plugin contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Global,
    Defaults,
    Frontend,
    Backend,
}

/// A named transformation contributing directives to some subset of the
/// four configuration blocks, each either prepended or appended to the
/// block being assembled. Default methods return no contribution and
/// append-only, so a plugin only overrides what it actually uses.
pub trait ConfigPlugin {
    fn global_options(&self) -> Vec<String> {
        Vec::new()
    }
    fn defaults_options(&self) -> Vec<String> {
        Vec::new()
    }
    fn frontend_options(&self) -> Vec<String> {
        Vec::new()
    }
    fn backend_options(&self) -> Vec<String> {
        Vec::new()
    }
    fn prepend(&self, _block: Block) -> bool {
        false
    }
}

/// Builds the fixed, contract-relevant plugin list for one namespace. The
/// order is part of the external contract: it determines routing-rule
/// order when multiple plugins contribute frontend directives.
pub fn default_registry(
    service_name: &str,
    namespace: &Namespace,
    operator_config: &OperatorConfig,
) -> Vec<Box<dyn ConfigPlugin>> {
    vec![
        Box::new(FaultInjection::new(service_name)),
        Box::new(ProxiedThrough::new(service_name, namespace)),
        Box::new(Logging::new(namespace, operator_config)),
        Box::new(PathBasedRouting::new(namespace, operator_config)),
        Box::new(SourceRequired::with_lua_dir(namespace, operator_config)),
    ]
}

/// Applies `plugin`'s contribution to all four blocks: drops directives
/// already present, then prepends or appends per the plugin's flag for
/// that block. Mirrors `configure_synapse.py`'s `config_to_opts` loop.
pub fn apply_plugin(
    plugin: &dyn ConfigPlugin,
    global: &mut Vec<String>,
    defaults: &mut Vec<String>,
    frontend: &mut Vec<String>,
    backend: &mut Vec<String>,
) {
    apply_block(global, plugin.global_options(), plugin.prepend(Block::Global));
    apply_block(defaults, plugin.defaults_options(), plugin.prepend(Block::Defaults));
    apply_block(frontend, plugin.frontend_options(), plugin.prepend(Block::Frontend));
    apply_block(backend, plugin.backend_options(), plugin.prepend(Block::Backend));
}

fn apply_block(target: &mut Vec<String>, contributions: Vec<String>, prepend: bool) {
    let fresh: Vec<String> = contributions.into_iter().filter(|c| !target.contains(c)).collect();
    if fresh.is_empty() {
        return;
    }
    if prepend {
        let mut merged = fresh;
        merged.append(target);
        *target = merged;
    } else {
        target.extend(fresh);
    }
}
