use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for both binaries. Leaf errors from `synapse-config`
/// are wrapped rather than flattened so their own `Diagnostic` impls (help
/// text, source spans) survive through `miette::Result`'s reporting.
#[derive(Debug, Error, Diagnostic)]
pub enum AppError {
    #[error("failed to read {path}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML at {path}")]
    ParseYaml {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] synapse_config::common_types::error::ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    NamespaceSource(#[from] synapse_config::common_types::error::NamespaceSourceError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    HostCoordinate(#[from] synapse_config::common_types::error::HostCoordinateError),

    #[error("admin socket command '{command}' failed")]
    AdminSocket {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("reload command exited with a non-zero status")]
    ReloadFailed,

    #[error("failed to contact orchestrator node endpoint")]
    Inventory(#[source] reqwest::Error),

    #[error("failed to inspect container runtime")]
    ContainerRuntime(#[source] bollard::errors::Error),

    #[error("failed to serialize the compiled configuration")]
    Serialize(#[source] serde_json::Error),
}
