use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use synapse_tools::error::AppError;
use synapse_tools::inventory::{container_runtime, k8s};
use synapse_tools::map_reconciler::{reconcile, AdminSocketClient};

/// Admin-socket path and default map-file location, unchanged from
/// `original_source`'s `HAPROXY_STATS_SOCKET` constant and `map_file`
/// positional default (spec.md §6).
const DEFAULT_HAPROXY_SOCKET: &str = "/var/run/synapse/haproxy.sock";
const DEFAULT_MAP_FILE: &str = "/var/run/synapse/maps/ip_to_service.map";

/// Dumps the identity map between container/pod IPs and task identities,
/// optionally reconciling it into the running proxy over its admin socket
/// (spec.md §6).
#[derive(Parser, Debug)]
#[command(name = "generate_container_ip_map", about = "Dump a map between container/pod IPs and task identities")]
struct Cli {
    /// Reconcile the map into the running proxy over its admin socket.
    #[arg(long = "update-haproxy", short = 'U')]
    update_haproxy: bool,

    /// Write timeout, in seconds, for admin-socket connections.
    #[arg(long = "haproxy-timeout", short = 'T', default_value_t = 1)]
    haproxy_timeout: u64,

    /// Collect from the orchestrator's node-local pod endpoint instead of
    /// the local container runtime.
    #[arg(long)]
    k8s: bool,

    /// Where to write the output map file.
    #[arg(default_value = DEFAULT_MAP_FILE)]
    map_file: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    if let Err(err) = run(&cli).await {
        tracing::error!(error = %err, "generate_container_ip_map failed");
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), AppError> {
    let entries = if cli.k8s {
        // A failure to contact the orchestrator endpoint is reported but
        // not fatal: exit 0 with no file changes (spec.md §6).
        match k8s::collect(&reqwest::Client::new()).await {
            Ok(entries) => entries,
            Err(err) => {
                eprintln!("{err}");
                return Ok(());
            }
        }
    } else {
        let docker = container_runtime::connect()?;
        container_runtime::collect(&docker).await?
    };

    let socket = AdminSocketClient::new(DEFAULT_HAPROXY_SOCKET, Duration::from_secs(cli.haproxy_timeout));
    reconcile(&socket, &cli.map_file, &entries, cli.update_haproxy).await?;

    Ok(())
}
