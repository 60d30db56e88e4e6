use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while loading or validating the operator configuration.
///
/// Per the error-handling design, these are always fatal: the caller must
/// abort without touching the on-disk proxy config.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read operator config at {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("operator config at {path} is not a JSON object")]
    NotAnObject { path: String },

    #[error("operator config failed to deserialize")]
    #[diagnostic(help("check the types of the keys listed in the loader's defaults table"))]
    Deserialize(#[source] serde_json::Error),

    #[error("command template '{template}' is missing parameter '{missing}'")]
    MissingTemplateParam { template: String, missing: String },
}

/// Errors raised by a [`crate::namespace_source::NamespaceSource`] implementation.
///
/// The source itself (SOA directory layout, YAML shape) is an external
/// collaborator; this crate only needs to know that loading can fail.
#[derive(Debug, Error, Diagnostic)]
pub enum NamespaceSourceError {
    #[error("failed to read namespace source: {0}")]
    Io(String),

    #[error("failed to parse namespace declaration for '{name}': {message}")]
    Parse { name: String, message: String },
}

/// Errors raised while resolving a topology type's current coordinate.
#[derive(Debug, Error, Diagnostic)]
pub enum HostCoordinateError {
    #[error("unknown topology type '{0}'")]
    UnknownType(String),

    #[error("failed to read coordinate source for topology type '{type_name}'")]
    Io {
        type_name: String,
        #[source]
        source: std::io::Error,
    },
}
