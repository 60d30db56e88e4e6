use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Serialize;

/// One `label_filters` entry: `{label, value, condition}`.
#[derive(Debug, Clone, Serialize)]
pub struct LabelFilter {
    pub label: String,
    pub value: String,
    pub condition: String,
}

/// The discovery method + parameters a watcher uses to find servers.
///
/// `method` is `"zookeeper"` (the ordinary case, path + hosts populated),
/// or `"base"` (no discovery at all — used for the nginx listener watcher
/// and for the `fail=error_503` chaos override, both of which want an
/// always-empty server set).
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryDict {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_filters: Option<Vec<LabelFilter>>,
}

impl DiscoveryDict {
    pub fn zookeeper(service_name: &str, hosts: Vec<String>) -> Self {
        DiscoveryDict {
            method: "zookeeper".to_string(),
            path: Some(format!("/smartstack/global/{service_name}")),
            hosts: Some(hosts),
            label_filters: None,
        }
    }

    pub fn base() -> Self {
        DiscoveryDict {
            method: "base".to_string(),
            path: None,
            hosts: None,
            label_filters: None,
        }
    }
}

/// A default server entry, e.g. `{host: "unix", port: "<socket path>"}`.
#[derive(Debug, Clone, Serialize)]
pub struct DefaultServer {
    pub host: String,
    pub port: String,
}

/// The per-service HAProxy watcher section.
///
/// Either `disabled` is set (and every other field absent), or the full
/// watcher shape is populated. Modeled as a single struct with optional
/// fields rather than an enum so that building it incrementally (base
/// config, then chaos overrides, then listener fields) stays simple — the
/// `disabled` shortcut is applied last, mirroring the original's
/// `config['haproxy'] = {'disabled': True}` overwrite.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HaproxyServiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontend: Option<Vec<String>>,
    pub backend: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_name: Option<String>,
    pub server_options: String,
    pub listen: Vec<String>,
}

impl HaproxyServiceConfig {
    pub fn disabled() -> Self {
        HaproxyServiceConfig {
            disabled: Some(true),
            ..Default::default()
        }
    }
}

/// The per-service secondary-proxy (nginx) section.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NginxServiceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub listen_options: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<Vec<String>>,
}

impl NginxServiceConfig {
    pub fn disabled() -> Self {
        NginxServiceConfig {
            disabled: Some(true),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServiceFileOutput {
    pub disabled: bool,
}

/// One entry of `Document::services`: a single watcher configuration.
#[derive(Debug, Clone, Serialize)]
pub struct ServiceEntry {
    pub discovery: DiscoveryDict,
    pub default_servers: Vec<DefaultServer>,
    pub use_previous_backends: bool,
    pub haproxy: HaproxyServiceConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nginx: Option<NginxServiceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_output: Option<ServiceFileOutput>,
}

/// Extra named sections appended verbatim to the haproxy top level, e.g.
/// `listen stats`, `listen map.debug`.
pub type ExtraSections = IndexMap<String, Vec<String>>;

#[derive(Debug, Clone, Serialize)]
pub struct HaproxyTopLevel {
    pub bind_address: String,
    pub restart_interval: u64,
    pub restart_jitter: f64,
    pub state_file_path: String,
    pub state_file_ttl: u64,
    pub reload_command: String,
    pub socket_file_path: String,
    pub config_file_path: String,
    pub do_writes: bool,
    pub do_reloads: bool,
    pub do_socket: bool,
    pub server_order_seed: u64,
    pub global: Vec<String>,
    pub defaults: Vec<String>,
    pub extra_sections: ExtraSections,
}

#[derive(Debug, Clone, Serialize)]
pub struct NginxContexts {
    pub main: Vec<String>,
    pub stream: Vec<String>,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NginxTopLevel {
    pub contexts: NginxContexts,
    pub config_file_path: String,
    pub check_command: String,
    pub reload_command: String,
    pub start_command: String,
    pub do_writes: bool,
    pub do_reloads: bool,
    pub restart_interval: u64,
    pub restart_jitter: f64,
    pub listen_address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileOutput {
    pub output_directory: String,
}

/// The full proxy configuration document: the sole output of the compiler.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub services: IndexMap<String, ServiceEntry>,
    pub haproxy: HaproxyTopLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nginx: Option<NginxTopLevel>,
    pub file_output: FileOutput,
}

impl Document {
    /// An empty document: the result of a namespace violating invariant 1
    /// (`discover ∉ advertise`), or of a compile with zero namespaces.
    pub fn empty(haproxy: HaproxyTopLevel, file_output: FileOutput, nginx: Option<NginxTopLevel>) -> Self {
        Document {
            services: IndexMap::new(),
            haproxy,
            nginx,
            file_output,
        }
    }
}

/// Free-form template-rendering inputs not otherwise modeled; kept here so
/// call sites that need "the command-template fields of the operator
/// config" don't reach into `OperatorConfig`'s private representation.
pub type TemplateFields = HashMap<&'static str, String>;
