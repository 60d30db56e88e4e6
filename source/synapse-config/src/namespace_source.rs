use crate::common_types::error::NamespaceSourceError;
use crate::common_types::namespace::Namespace;

/// Enumerates the declared `(service.instance, Namespace)` pairs for one
/// compile. Kept as a trait, not a concrete reader, so the compiler in this
/// crate never touches a filesystem directly — matching the teacher's
/// `ConfigSource` boundary. The real implementation (`SOA_DIR` layout) lives
/// in `synapse-tools`.
pub trait NamespaceSource {
    fn namespaces(&self) -> Result<Vec<(String, Namespace)>, NamespaceSourceError>;
}

/// An in-memory source, useful for tests and for small embeddings of this
/// crate that don't want the `SOA_DIR` convention.
#[derive(Debug, Clone, Default)]
pub struct StaticNamespaceSource {
    entries: Vec<(String, Namespace)>,
}

impl StaticNamespaceSource {
    pub fn new(entries: Vec<(String, Namespace)>) -> Self {
        StaticNamespaceSource { entries }
    }
}

impl NamespaceSource for StaticNamespaceSource {
    fn namespaces(&self) -> Result<Vec<(String, Namespace)>, NamespaceSourceError> {
        Ok(self.entries.clone())
    }
}
