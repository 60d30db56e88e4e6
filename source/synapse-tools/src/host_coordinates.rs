use std::fs;
use std::path::{Path, PathBuf};

use synapse_config::common_types::error::HostCoordinateError;
use synapse_config::host_coordinates::HostCoordinates;

/// Default directory holding one coordinate file per topology type, plus
/// the sibling `order` file (spec.md §6: "one file per topology type under
/// a fixed directory"; the `order` file resolves the Open Question of how
/// depth itself is recorded — see DESIGN.md).
pub const DEFAULT_COORDINATES_DIR: &str = "/nail/etc/topology";

const ORDER_FILE: &str = "order";

/// Reads topology-type depth order and per-type coordinates from files
/// under a fixed directory: `<dir>/order` lists recognized types, broadest
/// first, one per line; `<dir>/<type>` holds the host's current coordinate
/// for that type, trimmed of surrounding whitespace.
pub struct FileHostCoordinates {
    dir: PathBuf,
    types: Vec<String>,
}

impl FileHostCoordinates {
    pub fn load(dir: impl Into<PathBuf>) -> Result<Self, HostCoordinateError> {
        let dir = dir.into();
        let order_path = dir.join(ORDER_FILE);
        let raw = fs::read_to_string(&order_path).map_err(|source| HostCoordinateError::Io {
            type_name: ORDER_FILE.to_string(),
            source,
        })?;
        let types = raw.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect();
        Ok(FileHostCoordinates { dir, types })
    }

    fn path_for(&self, location_type: &str) -> PathBuf {
        self.dir.join(location_type)
    }
}

impl HostCoordinates for FileHostCoordinates {
    fn available_location_types(&self) -> &[String] {
        &self.types
    }

    fn get_current_location(&self, location_type: &str) -> Result<String, HostCoordinateError> {
        if !self.types.iter().any(|t| t == location_type) {
            return Err(HostCoordinateError::UnknownType(location_type.to_string()));
        }
        let path = self.path_for(location_type);
        fs::read_to_string(&path)
            .map(|s| s.trim().to_string())
            .map_err(|source| HostCoordinateError::Io {
                type_name: location_type.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn order_file_sets_depth_broadest_first() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "order", "superregion\nregion\nhabitat\n");
        write(dir.path(), "region", "us-west-1\n");
        let resolver = FileHostCoordinates::load(dir.path()).unwrap();
        assert_eq!(resolver.depth_of("superregion"), Some(0));
        assert_eq!(resolver.depth_of("habitat"), Some(2));
        assert_eq!(resolver.get_current_location("region").unwrap(), "us-west-1");
    }

    #[test]
    fn unknown_type_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "order", "region\n");
        let resolver = FileHostCoordinates::load(dir.path()).unwrap();
        assert!(matches!(resolver.get_current_location("galaxy"), Err(HostCoordinateError::UnknownType(_))));
    }

    #[test]
    fn missing_order_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        assert!(FileHostCoordinates::load(dir.path()).is_err());
    }
}
