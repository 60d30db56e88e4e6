use std::collections::{BTreeMap, HashMap};

use serde::Deserialize;
use serde_json::Value;

use super::error::ConfigError;

/// `(key, default value)` pairs applied to the raw JSON object before typed
/// deserialization. Mirrors `configure_synapse.py::set_defaults`'s table
/// verbatim, including the socket/path defaults that no longer have a
/// corresponding feature in this crate's Non-goals but still need to
/// round-trip so operator files written against the original tool keep
/// loading unchanged.
fn defaults() -> Vec<(&'static str, Value)> {
    vec![
        ("bind_addr", Value::from("0.0.0.0")),
        ("listen_with_haproxy", Value::from(true)),
        ("haproxy.defaults.inter", Value::from("10m")),
        ("haproxy_socket_file_path", Value::from("/var/run/synapse/haproxy.sock")),
        (
            "haproxy_captured_req_headers",
            Value::from("X-B3-SpanId,X-B3-TraceId,X-B3-ParentSpanId,X-B3-Flags:10,X-B3-Sampled:10"),
        ),
        ("haproxy_config_path", Value::from("/var/run/synapse/haproxy.cfg")),
        ("haproxy_path", Value::from("/usr/bin/haproxy-synapse")),
        ("haproxy_pid_file_path", Value::from("/var/run/synapse/haproxy.pid")),
        ("haproxy_state_file_path", Value::Null),
        ("haproxy_respect_allredisp", Value::from(true)),
        (
            "haproxy_reload_cmd_fmt",
            Value::from(
                "touch {haproxy_pid_file_path} && PID=$(cat {haproxy_pid_file_path}) && \
                 {haproxy_path} -f {haproxy_config_path} -p {haproxy_pid_file_path} -sf $PID",
            ),
        ),
        (
            "haproxy_service_sockets_path_fmt",
            Value::from("/var/run/synapse/sockets/{service_name}.sock"),
        ),
        (
            "haproxy_service_proxy_sockets_path_fmt",
            Value::from("/var/run/synapse/sockets/{service_name}.prxy"),
        ),
        ("haproxy_restart_interval_s", Value::from(60)),
        ("file_output_path", Value::from("/var/run/synapse/services")),
        ("maximum_connections", Value::from(10000)),
        ("maxconn_per_server", Value::from(50)),
        ("maxqueue_per_server", Value::from(10)),
        ("synapse_command", Value::from(vec!["service", "synapse"])),
        (
            "zookeeper_topology_path",
            Value::from("/nail/etc/zookeeper_discovery/infrastructure/local.yaml"),
        ),
        ("hacheck_port", Value::from(6666)),
        ("stats_port", Value::from(3212)),
        ("lua_dir", Value::from("/usr/share/synapse-tools/lua_scripts")),
        ("map_dir", Value::from("/var/run/synapse/maps/")),
        ("map_refresh_interval", Value::from(5)),
        ("enable_map_debug", Value::from(false)),
        ("map_debug_port", Value::from(3213)),
        ("logging", serde_json::json!({"enabled": false})),
        ("listen_with_nginx", Value::from(false)),
        ("nginx_path", Value::from("/usr/sbin/nginx")),
        ("nginx_prefix", Value::from("/var/run/synapse/nginx_temp")),
        ("nginx_config_path", Value::from("/var/run/synapse/nginx.cfg")),
        ("nginx_pid_file_path", Value::from("/var/run/synapse/nginx.pid")),
        (
            "nginx_reload_script",
            Value::from(
                "/bin/bash -c 'set -ue -o pipefail; q() { pidfile=$1; oldpid=$(cat $pidfile); \
                 kill -USR2 $oldpid; sleep 2; newpid=$(cat $pidfile); if [ $oldpid -eq $newpid ]; \
                 then return 1; fi; kill -WINCH $(cat $pidfile.oldbin); kill -QUIT $(cat $pidfile.oldbin); }; q $0'",
            ),
        ),
        ("nginx_proxy_proto", Value::from(false)),
        ("nginx_reload_cmd_fmt", Value::from("{nginx_reload_script} {nginx_pid_file_path}")),
        (
            "nginx_start_cmd_fmt",
            Value::from(
                "mkdir -p {nginx_prefix} && (kill -0 $(cat {nginx_pid_file_path}) || \
                 {nginx_path} -c {nginx_config_path} -p {nginx_prefix})",
            ),
        ),
        ("nginx_check_cmd_fmt", Value::from("{nginx_path} -t -c {nginx_config_path}")),
        ("nginx_restart_interval_s", Value::from(600)),
        ("nginx_log_error_target", Value::from("/dev/null")),
        ("nginx_log_error_level", Value::from("crit")),
        ("config_file", Value::from("/etc/synapse/synapse.conf")),
    ]
}

/// The operator-supplied options, defaulted and validated.
///
/// Deliberately untyped for the command-template fields (`*_cmd_fmt`):
/// they are rendered by simple `{name}` substitution against this same
/// struct's own fields, not parsed as format strings ahead of time.
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
    pub bind_addr: String,
    pub listen_with_haproxy: bool,
    pub listen_with_nginx: bool,
    pub maximum_connections: u64,
    pub maxconn_per_server: u64,
    pub maxqueue_per_server: u64,
    pub hacheck_port: u16,
    pub stats_port: u16,
    #[serde(rename = "haproxy.defaults.inter")]
    pub haproxy_defaults_inter: String,
    pub haproxy_respect_allredisp: bool,
    pub haproxy_captured_req_headers: String,
    pub haproxy_restart_interval_s: u64,
    pub haproxy_socket_file_path: String,
    pub haproxy_config_path: String,
    pub haproxy_path: String,
    pub haproxy_pid_file_path: String,
    pub haproxy_state_file_path: Option<String>,
    pub haproxy_reload_cmd_fmt: String,
    pub haproxy_service_sockets_path_fmt: String,
    pub haproxy_service_proxy_sockets_path_fmt: String,
    pub nginx_path: String,
    pub nginx_prefix: String,
    pub nginx_config_path: String,
    pub nginx_pid_file_path: String,
    pub nginx_reload_cmd_fmt: String,
    pub nginx_start_cmd_fmt: String,
    pub nginx_check_cmd_fmt: String,
    pub nginx_restart_interval_s: u64,
    pub nginx_proxy_proto: bool,
    pub nginx_log_error_target: String,
    pub nginx_log_error_level: String,
    pub enable_map_debug: bool,
    pub map_debug_port: u16,
    pub map_dir: String,
    pub map_refresh_interval: u64,
    pub lua_dir: String,
    pub file_output_path: String,
    pub zookeeper_topology_path: String,
    /// Where the writer puts the compiled document (spec.md §4.5).
    /// `original_source` reads this key with no matching `.setdefault`
    /// call, leaving it a silently-required key; this crate defaults it
    /// instead so a minimal operator file still produces a usable compile.
    pub config_file: String,
    /// Sorted so the generated `errorfile` directives come out in a fixed
    /// order regardless of the source JSON object's key order.
    #[serde(default)]
    pub errorfiles: BTreeMap<String, String>,
    pub synapse_command: Vec<String>,
    #[serde(default)]
    pub synapse_restart_command: Option<Vec<String>>,
    #[serde(default)]
    pub logging: serde_json::Map<String, Value>,
    #[serde(default)]
    pub path_based_routing: serde_json::Map<String, Value>,
}

impl OperatorConfig {
    /// Parses a raw JSON document: applies the legacy-key rewrite, merges
    /// in defaults for absent keys, then deserializes. A key present with
    /// an explicit `null` is left alone (so `haproxy_state_file_path: null`
    /// deserializes to `None`, distinct from the key being absent and
    /// therefore defaulted to `null` itself — same outcome here, but the
    /// distinction matters for keys whose default is non-null).
    pub fn from_raw(mut raw: Value, source_path: &str) -> Result<Self, ConfigError> {
        let obj = raw.as_object_mut().ok_or_else(|| ConfigError::NotAnObject {
            path: source_path.to_string(),
        })?;

        if let Some(legacy) = obj.remove("reload_cmd_fmt") {
            obj.entry("haproxy_reload_cmd_fmt").or_insert(legacy);
        }

        for (key, value) in defaults() {
            obj.entry(key).or_insert(value);
        }

        let config: OperatorConfig =
            serde_json::from_value(raw).map_err(ConfigError::Deserialize)?;
        config.validate_templates()?;
        Ok(config)
    }

    /// Renders a `{name}`-style command template against this config's own
    /// fields, the same substitution `str.format(**config)` performs in the
    /// original implementation.
    pub fn render_template(&self, template: &str) -> Result<String, ConfigError> {
        let fields = self.template_fields();
        render(template, &fields)
    }

    fn validate_templates(&self) -> Result<(), ConfigError> {
        for template in [
            &self.haproxy_reload_cmd_fmt,
            &self.nginx_reload_cmd_fmt,
            &self.nginx_start_cmd_fmt,
            &self.nginx_check_cmd_fmt,
        ] {
            self.render_template(template)?;
        }
        Ok(())
    }

    fn template_fields(&self) -> HashMap<&'static str, String> {
        let mut fields = HashMap::new();
        fields.insert("haproxy_pid_file_path", self.haproxy_pid_file_path.clone());
        fields.insert("haproxy_path", self.haproxy_path.clone());
        fields.insert("haproxy_config_path", self.haproxy_config_path.clone());
        fields.insert("nginx_reload_script", String::new());
        fields.insert("nginx_pid_file_path", self.nginx_pid_file_path.clone());
        fields.insert("nginx_prefix", self.nginx_prefix.clone());
        fields.insert("nginx_path", self.nginx_path.clone());
        fields.insert("nginx_config_path", self.nginx_config_path.clone());
        fields
    }
}

/// Renders `{name}` placeholders against `fields`, erroring on the first
/// unknown name (mirrors Python `str.format`'s `KeyError`).
fn render(template: &str, fields: &HashMap<&'static str, String>) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        let mut closed = false;
        for (_, c2) in chars.by_ref() {
            if c2 == '}' {
                closed = true;
                break;
            }
            name.push(c2);
        }
        if !closed {
            out.push('{');
            out.push_str(&name);
            continue;
        }
        match fields.get(name.as_str()) {
            Some(value) => out.push_str(value),
            None => {
                return Err(ConfigError::MissingTemplateParam {
                    template: template.to_string(),
                    missing: name,
                })
            }
        }
    }
    Ok(out)
}
