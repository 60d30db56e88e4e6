use indexmap::IndexMap;

use crate::common_types::document::{DefaultServer, DiscoveryDict, HaproxyServiceConfig, NginxServiceConfig, ServiceEntry, ServiceFileOutput};
use crate::common_types::namespace::Namespace;
use crate::common_types::operator_config::OperatorConfig;
use crate::host_coordinates::HostCoordinates;

use super::chaos::chaos_options;

/// Bumped 10s past the reaper's maximum connection age so the primary
/// proxy always errors a stalled connection before the nginx listener's
/// own timeout would. `DEFAULT_REAP_AGE_S` is not part of the retrieved
/// source; 300s is the conventional reaper default and is recorded as an
/// assumption.
const DEFAULT_REAP_AGE_S: u64 = 300;

/// Parses the comma-separated `haproxy_captured_req_headers` option into
/// `capture request header <name> len <n>` directives. A header entry may
/// carry an explicit length after a colon; absent, it defaults to 64.
pub fn captured_request_headers(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|pair| {
            let pair = pair.trim();
            let (name, len) = match pair.split_once(':') {
                Some((name, len)) => (name, len),
                None => (pair, ""),
            };
            let len = if len.is_empty() { "64" } else { len };
            format!("capture request header {name} len {len}")
        })
        .collect()
}

fn default_timeout(namespace: &Namespace) -> Option<u64> {
    match (namespace.timeout_client_ms, namespace.timeout_server_ms) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or(0).max(b.unwrap_or(0))),
    }
}

fn healthcheck_headers_string(headers: &IndexMap<String, String>) -> String {
    let mut out = String::new();
    if headers.is_empty() {
        return out;
    }
    out.push_str("HTTP/1.1");
    for (key, value) in headers {
        out.push_str(&format!("\\r\\n{key}:\\ {value}"));
    }
    out
}

/// Builds the watcher's `haproxy` section: server options, frontend
/// directives, and backend directives. Mirrors
/// `_generate_haproxy_for_watcher`.
pub fn generate_haproxy_for_watcher(service_name: &str, namespace: &Namespace, operator_config: &OperatorConfig) -> HaproxyServiceConfig {
    let mode = namespace.mode;
    let fallback_timeout = default_timeout(namespace);

    let server_options = format!(
        "check port {} observe layer{} maxconn {} maxqueue {}",
        operator_config.hacheck_port,
        if matches!(mode, crate::common_types::namespace::Mode::Http) { 7 } else { 4 },
        operator_config.maxconn_per_server,
        operator_config.maxqueue_per_server,
    );

    let mut frontend = Vec::new();
    let timeout_client_ms = namespace.timeout_client_ms.or(fallback_timeout);
    if let Some(ms) = timeout_client_ms {
        frontend.push(format!("timeout client {ms}ms"));
    }
    match mode {
        crate::common_types::namespace::Mode::Http => {
            frontend.extend(captured_request_headers(&operator_config.haproxy_captured_req_headers));
            frontend.push("option httplog".to_string());
        }
        crate::common_types::namespace::Mode::Tcp => {
            frontend.push("no option accept-invalid-http-request".to_string());
            frontend.push("option tcplog".to_string());
        }
    }

    let mut backend = Vec::new();
    if let Some(balance) = namespace.balance {
        backend.push(format!("balance {}", balance.as_str()));
    }
    if namespace.keepalive && matches!(mode, crate::common_types::namespace::Mode::Http) {
        backend.push("no option forceclose".to_string());
        backend.push("option http-keep-alive".to_string());
    }
    if matches!(mode, crate::common_types::namespace::Mode::Tcp) {
        frontend.push("mode tcp".to_string());
        backend.push("mode tcp".to_string());
    }

    for header in namespace.extra_headers.keys() {
        backend.push(format!("reqidel ^{header}:.*"));
    }
    for (header, value) in &namespace.extra_headers {
        backend.push(format!("reqadd {header}:\\ {value}"));
    }

    let headers_string = healthcheck_headers_string(&namespace.extra_healthcheck_headers);
    let healthcheck_string = format!(
        "option httpchk GET /{}/{}/0/{} {}",
        mode.as_str(),
        service_name,
        namespace.healthcheck_uri().trim_start_matches('/'),
        headers_string,
    );
    backend.push(healthcheck_string.trim_end().to_string());
    backend.push("http-check send-state".to_string());

    if let Some(retries) = namespace.retries {
        backend.push(format!("retries {retries}"));
    }

    if operator_config.haproxy_respect_allredisp {
        if let Some(true) = namespace.allredisp {
            backend.push("option allredisp".to_string());
        }
    }

    if let Some(ms) = namespace.timeout_connect_ms {
        backend.push(format!("timeout connect {ms}ms"));
    }

    let timeout_server_ms = namespace.timeout_server_ms.or(fallback_timeout);
    if let Some(ms) = timeout_server_ms {
        backend.push(format!("timeout server {ms}ms"));
    }

    HaproxyServiceConfig {
        disabled: None,
        port: None,
        frontend: Some(frontend),
        backend,
        bind_address: None,
        backend_name: None,
        server_options,
        listen: Vec::new(),
    }
}

/// Builds the base watcher entry for one namespace: zookeeper discovery
/// against the configured path, chaos overrides applied, and (if the
/// secondary proxy is enabled) an nginx section marked disabled (the
/// dynamic watcher shouldn't cause nginx reloads; only the dedicated
/// `<service>.nginx_listener` entry does).
pub fn base_watcher_cfg_for_service(
    service_name: &str,
    namespace: &Namespace,
    zookeeper_topology: &[String],
    operator_config: &OperatorConfig,
    resolver: &dyn HostCoordinates,
) -> ServiceEntry {
    let mut discovery = DiscoveryDict::zookeeper(service_name, zookeeper_topology.to_vec());
    let mut haproxy = generate_haproxy_for_watcher(service_name, namespace, operator_config);

    if !namespace.chaos.is_empty() {
        let (chaos_frontend, discovery_override) = chaos_options(&namespace.chaos, resolver);
        if let Some(frontend) = haproxy.frontend.as_mut() {
            frontend.extend(chaos_frontend);
        }
        if let Some(replacement) = discovery_override {
            discovery = replacement;
        }
    }

    ServiceEntry {
        discovery,
        default_servers: Vec::new(),
        use_previous_backends: false,
        haproxy,
        nginx: if operator_config.listen_with_nginx {
            Some(NginxServiceConfig::disabled())
        } else {
            None
        },
        file_output: None,
    }
}

/// Builds the dedicated `<service>.nginx_listener` entry: a static watcher
/// that terminates the client connection and forwards to the haproxy
/// unix socket.
pub fn generate_nginx_for_watcher(
    socket_path: String,
    proxy_port: i64,
    nginx_proxy_proto: bool,
    reuseport: bool,
) -> ServiceEntry {
    let timeout = DEFAULT_REAP_AGE_S + 10;
    let mut server = vec![format!("proxy_timeout {timeout}s")];
    if nginx_proxy_proto {
        server.push("proxy_protocol on".to_string());
    }
    ServiceEntry {
        discovery: DiscoveryDict::base(),
        default_servers: vec![DefaultServer {
            host: "unix".to_string(),
            port: socket_path,
        }],
        use_previous_backends: true,
        haproxy: HaproxyServiceConfig::disabled(),
        nginx: Some(NginxServiceConfig {
            disabled: None,
            listen_options: if reuseport { Some("reuseport".to_string()) } else { None },
            mode: Some("tcp".to_string()),
            port: Some(proxy_port),
            server: Some(server),
        }),
        file_output: Some(ServiceFileOutput { disabled: true }),
    }
}
