use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;

use crate::common_types::document::{
    Document, ExtraSections, FileOutput, HaproxyTopLevel, LabelFilter, NginxContexts, NginxTopLevel, ServiceEntry,
};
use crate::common_types::error::ConfigError;
use crate::common_types::namespace::{Namespace, DEFAULT_ENDPOINT};
use crate::common_types::operator_config::OperatorConfig;
use crate::host_coordinates::{advertise_types_by_specificity, HostCoordinates};

use super::acls::{backend_pairs, generate_acls_for_service};
use super::backend_id::backend_id;
use super::watcher::{base_watcher_cfg_for_service, generate_haproxy_for_watcher, generate_nginx_for_watcher};
use crate::plugins::{apply_plugin, default_registry};

/// A deterministic stand-in for the original's `md5(gethostname())`-derived
/// seed. The value only needs to be a stable function of the host's
/// identity across compiles of the same host — not byte-compatible with the
/// original hash — and this crate's dependency stack carries no hashing
/// crate, so `DefaultHasher` (stdlib) is used instead.
pub fn server_order_seed(hostname: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    hostname.hash(&mut hasher);
    hasher.finish()
}

fn format_socket_path(fmt: &str, service_name: &str) -> String {
    fmt.replace("{service_name}", service_name)
}

fn generate_nginx_top_level(operator_config: &OperatorConfig) -> Result<NginxTopLevel, ConfigError> {
    Ok(NginxTopLevel {
        contexts: NginxContexts {
            main: vec![
                "worker_processes 1".to_string(),
                format!("worker_rlimit_nofile {}", operator_config.maximum_connections * 4),
                format!("pid {}", operator_config.nginx_pid_file_path),
                format!("error_log {} {}", operator_config.nginx_log_error_target, operator_config.nginx_log_error_level),
            ],
            stream: vec!["tcp_nodelay on".to_string()],
            events: vec![
                format!("worker_connections {}", operator_config.maximum_connections),
                "multi_accept on".to_string(),
                "use epoll".to_string(),
            ],
        },
        config_file_path: operator_config.nginx_config_path.clone(),
        check_command: operator_config.render_template(&operator_config.nginx_check_cmd_fmt)?,
        reload_command: operator_config.render_template(&operator_config.nginx_reload_cmd_fmt)?,
        start_command: operator_config.render_template(&operator_config.nginx_start_cmd_fmt)?,
        do_writes: true,
        do_reloads: true,
        restart_interval: operator_config.nginx_restart_interval_s,
        restart_jitter: 0.1,
        listen_address: operator_config.bind_addr.clone(),
    })
}

fn generate_haproxy_top_level(operator_config: &OperatorConfig, seed: u64) -> Result<HaproxyTopLevel, ConfigError> {
    let mut global = vec![
        "daemon".to_string(),
        format!("maxconn {}", operator_config.maximum_connections),
        format!("stats socket {} level admin", operator_config.haproxy_socket_file_path),
        "tune.bufsize 32768".to_string(),
        "spread-checks 50".to_string(),
        "log 127.0.0.1:1514 daemon info".to_string(),
        "log-send-hostname".to_string(),
        "unix-bind mode 666".to_string(),
    ];

    let mut defaults = vec![
        "timeout connect 200ms".to_string(),
        "timeout client 1000ms".to_string(),
        "timeout server 1000ms".to_string(),
        "retries 1".to_string(),
        "option redispatch 1".to_string(),
        "balance leastconn".to_string(),
        "mode http".to_string(),
        "option forceclose".to_string(),
        "option accept-invalid-http-request".to_string(),
        "log global".to_string(),
        "option log-separate-errors".to_string(),
        format!(
            "default-server on-error fastinter error-limit 1 inter {} downinter 30s fastinter 30s rise 1 fall 2",
            operator_config.haproxy_defaults_inter
        ),
    ];

    let mut extra_sections: ExtraSections = IndexMap::new();
    extra_sections.insert(
        "listen stats".to_string(),
        vec![
            format!("bind :{}", operator_config.stats_port),
            "mode http".to_string(),
            "stats enable".to_string(),
            "stats uri /".to_string(),
            "stats refresh 1m".to_string(),
            "stats show-node".to_string(),
        ],
    );
    if operator_config.enable_map_debug {
        extra_sections.insert(
            "listen map.debug".to_string(),
            vec![format!("bind :{}", operator_config.map_debug_port), "http-request use-service lua.map-debug".to_string()],
        );
    }

    global.push(format!("setenv map_file {}ip_to_service.map", operator_config.map_dir));
    global.push(format!("setenv map_refresh_interval {}", operator_config.map_refresh_interval));

    if let Some(state_file_path) = &operator_config.haproxy_state_file_path {
        global.push(format!("server-state-file {state_file_path}"));
        defaults.push("load-server-state-from-file global".to_string());
    }

    for (error, errorfile) in &operator_config.errorfiles {
        defaults.push(format!("errorfile {error} {errorfile}"));
    }

    Ok(HaproxyTopLevel {
        bind_address: operator_config.bind_addr.clone(),
        restart_interval: operator_config.haproxy_restart_interval_s,
        restart_jitter: 0.1,
        state_file_path: "/var/run/synapse/state.json".to_string(),
        state_file_ttl: 30 * 60,
        reload_command: operator_config.render_template(&operator_config.haproxy_reload_cmd_fmt)?,
        socket_file_path: operator_config.haproxy_socket_file_path.clone(),
        config_file_path: operator_config.haproxy_config_path.clone(),
        do_writes: true,
        do_reloads: true,
        do_socket: true,
        server_order_seed: seed,
        global,
        defaults,
        extra_sections,
    })
}

/// Builds the document shell: top-level haproxy/nginx sections, empty
/// `services`. Mirrors `generate_base_config`.
pub fn generate_base_config(operator_config: &OperatorConfig, seed: u64) -> Result<Document, ConfigError> {
    let haproxy = generate_haproxy_top_level(operator_config, seed)?;
    let nginx = if operator_config.listen_with_nginx {
        Some(generate_nginx_top_level(operator_config)?)
    } else {
        None
    };
    Ok(Document::empty(
        haproxy,
        FileOutput {
            output_directory: operator_config.file_output_path.clone(),
        },
        nginx,
    ))
}

/// Compiles the full document for one batch of namespaces. Mirrors
/// `generate_configuration`'s per-namespace loop (spec.md §4.4, steps 1-8).
#[allow(clippy::too_many_arguments)]
pub fn generate_configuration(
    operator_config: &OperatorConfig,
    zookeeper_topology: &[String],
    namespaces: &[(String, Namespace)],
    resolver: &dyn HostCoordinates,
    seed: u64,
) -> Result<Document, ConfigError> {
    let mut document = generate_base_config(operator_config, seed)?;

    for (service_name, namespace) in namespaces {
        let Some(proxy_port) = namespace.proxy_port else {
            // `None` still wants discovery, just no load balancing; fall
            // through with `proxy_port = None` semantics below.
            compile_namespace(&mut document, service_name, namespace, None, zookeeper_topology, operator_config, resolver)?;
            continue;
        };
        if proxy_port < 0 {
            // Negative proxy_port: this namespace opts out of the mesh entirely.
            continue;
        }
        compile_namespace(&mut document, service_name, namespace, Some(proxy_port), zookeeper_topology, operator_config, resolver)?;
    }

    Ok(document)
}

#[allow(clippy::too_many_arguments)]
fn compile_namespace(
    document: &mut Document,
    service_name: &str,
    namespace: &Namespace,
    proxy_port: Option<i64>,
    zookeeper_topology: &[String],
    operator_config: &OperatorConfig,
    resolver: &dyn HostCoordinates,
) -> Result<(), ConfigError> {
    let discover_type = namespace.discover_type();
    let advertise_types = advertise_types_by_specificity(namespace, resolver);

    // Invariant 1: discover_type must be one of the (filtered) advertise
    // types. Violations yield an empty document, matching the original's
    // `return {}` short-circuit for this namespace's entire compile.
    if !advertise_types.iter().any(|t| t == discover_type) {
        return Ok(());
    }

    let base_watcher = base_watcher_cfg_for_service(service_name, namespace, zookeeper_topology, operator_config, resolver);

    let socket_path = format_socket_path(&operator_config.haproxy_service_sockets_path_fmt, service_name);
    let socket_proxy_path = format_socket_path(&operator_config.haproxy_service_proxy_sockets_path_fmt, service_name);

    for (advertise_type, endpoint_name) in backend_pairs(&advertise_types, &namespace.endpoint_timeouts) {
        let backend_identifier = backend_id(service_name, discover_type, &advertise_type, &endpoint_name);
        let mut entry: ServiceEntry = base_watcher.clone();

        let my_location = resolver.get_current_location(&advertise_type).unwrap_or_default();
        entry.discovery.label_filters = Some(vec![LabelFilter {
            label: format!("{advertise_type}:{my_location}"),
            value: String::new(),
            condition: "equals".to_string(),
        }]);

        if endpoint_name != DEFAULT_ENDPOINT {
            if let Some(endpoint_timeout) = namespace.endpoint_timeouts.get(&endpoint_name) {
                let line = format!("timeout server {}ms", endpoint_timeout.timeout_ms);
                match entry.haproxy.backend.iter_mut().find(|l| l.starts_with("timeout server ")) {
                    Some(existing) => *existing = line,
                    None => entry.haproxy.backend.push(line),
                }
            }
        }

        match proxy_port {
            None => {
                entry.haproxy = crate::common_types::document::HaproxyServiceConfig::disabled();
                if operator_config.listen_with_nginx {
                    entry.nginx = Some(crate::common_types::document::NginxServiceConfig::disabled());
                }
            }
            Some(port) => {
                if advertise_type == discover_type && endpoint_name == DEFAULT_ENDPOINT {
                    if operator_config.listen_with_haproxy {
                        entry.haproxy.port = Some(port.to_string());
                        if let Some(frontend) = entry.haproxy.frontend.as_mut() {
                            frontend.push(format!("bind {socket_path}"));
                            frontend.push(format!("bind {socket_proxy_path} accept-proxy"));
                        }
                    } else {
                        entry.haproxy.port = None;
                        entry.haproxy.bind_address = Some(socket_path.clone());
                        if let Some(frontend) = entry.haproxy.frontend.as_mut() {
                            frontend.push(format!("bind {socket_proxy_path} accept-proxy"));
                        }
                    }
                } else {
                    entry.haproxy.frontend = None;
                }
                entry.haproxy.backend_name = Some(backend_identifier.clone());
            }
        }

        document.services.insert(backend_identifier, entry);
    }

    let Some(proxy_port) = proxy_port else {
        return Ok(());
    };

    if operator_config.listen_with_nginx {
        let reuseport = operator_config.listen_with_haproxy && operator_config.listen_with_nginx;
        let nginx_socket = format_socket_path(
            if operator_config.nginx_proxy_proto {
                &operator_config.haproxy_service_proxy_sockets_path_fmt
            } else {
                &operator_config.haproxy_service_sockets_path_fmt
            },
            service_name,
        );
        document.services.insert(
            format!("{service_name}.nginx_listener"),
            generate_nginx_for_watcher(nginx_socket, proxy_port, operator_config.nginx_proxy_proto, reuseport),
        );
    }

    // Plugin contributions and routing ACLs only apply to the single
    // canonical entry (advertise == discover, default endpoint) — the one
    // holding the frontend that actually listens on `proxy_port`.
    if let Some(canonical) = document.services.get_mut(service_name) {
        let registry = default_registry(service_name, namespace, operator_config);
        let mut frontend = canonical.haproxy.frontend.take().unwrap_or_default();
        let mut backend = std::mem::take(&mut canonical.haproxy.backend);
        for plugin in &registry {
            apply_plugin(plugin.as_ref(), &mut document.haproxy.global, &mut document.haproxy.defaults, &mut frontend, &mut backend);
        }

        frontend.extend(generate_acls_for_service(
            service_name,
            discover_type,
            &advertise_types,
            &namespace.endpoint_timeouts,
            resolver,
        ));

        canonical.haproxy.backend = backend;
        canonical.haproxy.frontend = Some(frontend);
    }

    Ok(())
}
