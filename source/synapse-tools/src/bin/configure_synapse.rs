use std::path::Path;

use clap::Parser;
use synapse_config::compiler::document_builder::{generate_configuration, server_order_seed};
use synapse_config::namespace_source::NamespaceSource;
use synapse_config::serialize::canonical_json;
use synapse_tools::error::AppError;
use synapse_tools::host_coordinates::{FileHostCoordinates, DEFAULT_COORDINATES_DIR};
use synapse_tools::namespace_source::SoaDirNamespaceSource;
use synapse_tools::{operator_config_loader, writer, zookeeper_topology};

/// Reads the operator config and the declared namespaces, compiles the
/// proxy configuration, and conditionally reloads the supervised proxy.
/// Takes no arguments; everything is driven by the environment (spec.md §6).
#[derive(Parser, Debug)]
#[command(name = "configure_synapse", about = "Compile and install the synapse proxy configuration")]
struct Cli;

fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    Cli::parse();

    if let Err(err) = run() {
        tracing::error!(error = %err, "configure_synapse failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let operator_config = operator_config_loader::load(&operator_config_loader::config_path())?;

    let zk_topology = zookeeper_topology::load(&operator_config.zookeeper_topology_path)?;

    let namespace_source = SoaDirNamespaceSource::new(operator_config_loader::soa_dir());
    let namespaces = namespace_source.namespaces()?;

    let resolver = FileHostCoordinates::load(DEFAULT_COORDINATES_DIR)?;
    let seed = server_order_seed(&synapse_tools::hostname());

    let document = generate_configuration(&operator_config, &zk_topology, &namespaces, &resolver, seed)?;
    let bytes = canonical_json(&document).map_err(AppError::Serialize)?;

    let changed = writer::write_config_atomic(Path::new(&operator_config.config_file), &bytes)?;
    if changed {
        tracing::info!(path = %operator_config.config_file, "configuration changed, reloading");
        writer::reload(&operator_config)?;
    } else {
        tracing::info!("configuration unchanged, skipping reload");
    }

    Ok(())
}
