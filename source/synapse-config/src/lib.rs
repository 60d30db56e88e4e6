//! Pure configuration compiler and identity-map diff engine for the
//! synapse-tools control plane. Every module here is deterministic and
//! I/O-free; the filesystem, zookeeper, the admin socket, and the process
//! reloader are all owned by the `synapse-tools` binary crate, which
//! supplies concrete [`namespace_source::NamespaceSource`] and
//! [`host_coordinates::HostCoordinates`] implementations.

pub mod common_types;
pub mod compiler;
pub mod host_coordinates;
pub mod map_diff;
pub mod namespace_source;
pub mod plugins;
pub mod serialize;
