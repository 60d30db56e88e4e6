use std::collections::HashMap;

use synapse_config::common_types::error::HostCoordinateError;
use synapse_config::common_types::operator_config::OperatorConfig;
use synapse_config::host_coordinates::HostCoordinates;

/// A fixed-depth, fixed-coordinate resolver for scenario tests. The unit
/// tests scattered across `synapse-config` use a `cfg(test)`-only fake of
/// their own; this crate can't reach that one (it isn't part of the
/// published API), so it gets its own, built the same way.
pub struct FakeResolver {
    pub types: Vec<String>,
    pub coordinates: HashMap<String, String>,
}

impl FakeResolver {
    pub fn new(types: &[&str], coordinates: &[(&str, &str)]) -> Self {
        FakeResolver {
            types: types.iter().map(|s| s.to_string()).collect(),
            coordinates: coordinates.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        }
    }
}

impl HostCoordinates for FakeResolver {
    fn available_location_types(&self) -> &[String] {
        &self.types
    }

    fn get_current_location(&self, location_type: &str) -> Result<String, HostCoordinateError> {
        self.coordinates
            .get(location_type)
            .cloned()
            .ok_or_else(|| HostCoordinateError::UnknownType(location_type.to_string()))
    }
}

pub fn operator_config(extra: serde_json::Value) -> OperatorConfig {
    OperatorConfig::from_raw(extra, "test").unwrap()
}
