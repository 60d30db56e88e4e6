use crate::common_types::error::HostCoordinateError;
use crate::common_types::namespace::Namespace;

/// Resolves topology-type depth and the host's current coordinate for a
/// type. One implementation backs both spec.md §4.2's topology resolver
/// (used for `advertise`/`discover` depth comparisons) and §4.4 step 4's
/// chaos grouping lookup (`get_my_grouping`/`get_current_location` in
/// `original_source`) — both are "read the host's value for a named type
/// from a fixed per-type source".
pub trait HostCoordinates {
    /// All recognized topology types, broadest first. Index == depth.
    fn available_location_types(&self) -> &[String];

    /// The host's current coordinate for `location_type`, or an error if
    /// the type is unrecognized or the source can't be read.
    fn get_current_location(&self, location_type: &str) -> Result<String, HostCoordinateError>;

    fn depth_of(&self, location_type: &str) -> Option<usize> {
        self.available_location_types()
            .iter()
            .position(|t| t == location_type)
    }

    /// `compare_types(a, b)`: negative if `a` is shallower than `b`, zero
    /// if equal, positive if deeper. Mirrors `environment_tools.compare_types`.
    fn compare_types(&self, a: &str, b: &str) -> Option<i64> {
        let depth_a = self.depth_of(a)?;
        let depth_b = self.depth_of(b)?;
        Some(depth_a as i64 - depth_b as i64)
    }
}

/// Filters `namespace.advertise` to recognized types and sorts descending
/// by depth (most specific first), per spec.md §4.2. Empty `advertise`
/// defaults to `["region"]` before filtering, per [`Namespace::advertise_types`].
pub fn advertise_types_by_specificity(
    namespace: &Namespace,
    resolver: &dyn HostCoordinates,
) -> Vec<String> {
    let mut types: Vec<String> = namespace
        .advertise_types()
        .into_iter()
        .filter(|t| resolver.depth_of(t).is_some())
        .collect();
    types.sort_by_key(|t| std::cmp::Reverse(resolver.depth_of(t).unwrap_or(0)));
    types
}

#[cfg(test)]
pub mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// An in-memory `HostCoordinates` for unit tests throughout this crate.
    pub struct FakeHostCoordinates {
        pub types: Vec<String>,
        pub coordinates: HashMap<String, String>,
    }

    impl FakeHostCoordinates {
        pub fn new(types: &[&str], coordinates: &[(&str, &str)]) -> Self {
            FakeHostCoordinates {
                types: types.iter().map(|s| s.to_string()).collect(),
                coordinates: coordinates
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect(),
            }
        }
    }

    impl HostCoordinates for FakeHostCoordinates {
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
}
