use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The synthetic endpoint name that stands for "no per-endpoint override".
///
/// Safe to use as a string constant because endpoint names must start with
/// `/`, so `"default"` can never collide with a declared endpoint.
pub const DEFAULT_ENDPOINT: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Http,
    Tcp,
}

impl Default for Mode {
    fn default() -> Self {
        Mode::Http
    }
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Http => "http",
            Mode::Tcp => "tcp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Balance {
    Leastconn,
    Roundrobin,
}

impl Balance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Balance::Leastconn => "leastconn",
            Balance::Roundrobin => "roundrobin",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailMode {
    Drop,
    Error503,
}

/// One grouping-value entry of a `chaos` block: `{fail: ..}` or `{delay: ..}`.
/// Both may be absent (an entry present only to be overridden by a future
/// host-matching key would be pointless but is not itself invalid).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaosEntry {
    #[serde(default)]
    pub fail: Option<FailMode>,
    #[serde(default)]
    pub delay: Option<String>,
}

/// A per-endpoint override of the backend's server timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointTimeout {
    /// Path prefix the frontend ACL matches against.
    pub path: String,
    /// Replacement `timeout server` value, in milliseconds.
    pub timeout_ms: u64,
}

/// Plugin-specific options, keyed by plugin name. Each plugin interprets
/// its own sub-map; this crate only passes it through unexamined except
/// for `enabled`, which every bundled plugin reads the same way.
pub type PluginOptions = IndexMap<String, serde_json::Value>;

/// A declared service namespace, keyed externally by `service.instance`.
///
/// All fields default: missing maps are empty, missing scalars are `None`
/// (not zero) so that the compiler can tell "unset" from "explicitly zero".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Namespace {
    pub proxy_port: Option<i64>,
    pub mode: Mode,
    pub discover: Option<String>,
    pub advertise: Vec<String>,
    pub healthcheck_uri: Option<String>,
    pub extra_headers: IndexMap<String, String>,
    pub extra_healthcheck_headers: IndexMap<String, String>,
    pub timeout_connect_ms: Option<u64>,
    pub timeout_client_ms: Option<u64>,
    pub timeout_server_ms: Option<u64>,
    pub retries: Option<u32>,
    pub balance: Option<Balance>,
    pub keepalive: bool,
    pub allredisp: Option<bool>,
    /// grouping-type -> grouping-value -> entry
    pub chaos: IndexMap<String, IndexMap<String, ChaosEntry>>,
    pub endpoint_timeouts: IndexMap<String, EndpointTimeout>,
    pub plugins: IndexMap<String, PluginOptions>,
    pub proxied_through: Option<String>,
    pub is_proxy: bool,
}

impl Namespace {
    /// `discover` defaults to `"region"` when unset, matching the
    /// original implementation's default.
    pub fn discover_type(&self) -> &str {
        self.discover.as_deref().unwrap_or("region")
    }

    /// `advertise` defaults to `["region"]` when empty.
    pub fn advertise_types(&self) -> Vec<String> {
        if self.advertise.is_empty() {
            vec!["region".to_string()]
        } else {
            self.advertise.clone()
        }
    }

    pub fn healthcheck_uri(&self) -> &str {
        self.healthcheck_uri.as_deref().unwrap_or("/status")
    }

    /// Whether a plugin's per-namespace `enabled` flag is set.
    pub fn plugin_enabled(&self, plugin_name: &str) -> bool {
        self.plugins
            .get(plugin_name)
            .and_then(|opts| opts.get("enabled"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    pub fn plugin_options(&self, plugin_name: &str) -> Option<&PluginOptions> {
        self.plugins.get(plugin_name)
    }
}
