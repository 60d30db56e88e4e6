//! Filesystem, network, and process collaborators for the `synapse-config`
//! compiler and map-diff engine. Everything here is the I/O the library
//! crate deliberately doesn't do: reading the operator config and the
//! namespace source, resolving host coordinates, talking to the admin
//! socket and the container/pod inventories, and writing the compiled
//! document out with an atomic swap and a conditional reload.

pub mod error;
pub mod host_coordinates;
pub mod inventory;
pub mod map_reconciler;
pub mod namespace_source;
pub mod operator_config_loader;
pub mod writer;
pub mod zookeeper_topology;

/// The current host's name, fed to `synapse_config`'s `server_order_seed`
/// (spec.md §4.4 doesn't name this field, but `original_source` derives it
/// from `socket.gethostname()`; see SPEC_FULL.md §4.4).
pub fn hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "localhost".to_string())
}
