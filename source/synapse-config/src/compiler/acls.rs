use indexmap::IndexMap;
use itertools::Itertools;

use crate::common_types::namespace::{EndpointTimeout, DEFAULT_ENDPOINT};
use crate::host_coordinates::HostCoordinates;

use super::backend_id::backend_id;

/// The Cartesian product of advertise types and endpoint names (declared
/// order, synthetic `default` last), the same enumeration the compiler
/// uses for both backend-descriptor generation (step 5) and frontend ACL
/// emission (step 8).
pub fn backend_pairs(
    advertise_types: &[String],
    endpoint_timeouts: &IndexMap<String, EndpointTimeout>,
) -> Vec<(String, String)> {
    let mut endpoint_names: Vec<String> = endpoint_timeouts.keys().cloned().collect();
    endpoint_names.push(DEFAULT_ENDPOINT.to_string());

    advertise_types
        .iter()
        .cloned()
        .cartesian_product(endpoint_names)
        .collect()
}

/// Emits the frontend routing tail for a namespace: for each
/// non-downcasting `(advertise_type, endpoint_name)` pair, an optional
/// path ACL (non-default endpoints only), a connection-slot ACL, and a
/// `use_backend` gated on both. A pair "downcasts" when its advertise
/// type is narrower (deeper) than `discover_type` — broader-or-equal
/// advertise types are always kept (see scenario a, where advertising at
/// the broader `superregion` while discovering at `region` is retained).
pub fn generate_acls_for_service(
    service_name: &str,
    discover_type: &str,
    advertise_types: &[String],
    endpoint_timeouts: &IndexMap<String, EndpointTimeout>,
    resolver: &dyn HostCoordinates,
) -> Vec<String> {
    let discover_depth = resolver.depth_of(discover_type);
    let mut acls = Vec::new();

    for (advertise_type, endpoint_name) in backend_pairs(advertise_types, endpoint_timeouts) {
        let advertise_depth = resolver.depth_of(&advertise_type);
        if let (Some(d), Some(a)) = (discover_depth, advertise_depth) {
            if a > d {
                continue;
            }
        }

        let backend_identifier = backend_id(service_name, discover_type, &advertise_type, &endpoint_name);

        let (path_acl_suffix, mut pair_acls) = if endpoint_name != DEFAULT_ENDPOINT {
            let path = endpoint_timeouts
                .get(&endpoint_name)
                .map(|t| t.path.clone())
                .unwrap_or_else(|| endpoint_name.clone());
            (
                format!(" {backend_identifier}_path"),
                vec![format!("acl {backend_identifier}_path path_beg {path}")],
            )
        } else {
            (String::new(), Vec::new())
        };

        pair_acls.push(format!("acl {backend_identifier}_has_connslots connslots({backend_identifier}) gt 0"));
        pair_acls.push(format!(
            "use_backend {backend_identifier} if {backend_identifier}_has_connslots{path_acl_suffix}"
        ));

        acls.extend(pair_acls);
    }

    acls
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common_types::namespace::EndpointTimeout;
    use crate::host_coordinates::test_support::FakeHostCoordinates;

    fn resolver() -> FakeHostCoordinates {
        FakeHostCoordinates::new(&["superregion", "region"], &[])
    }

    #[test]
    fn scenario_a_two_advertise_types_no_endpoint_timeouts() {
        let resolver = resolver();
        let advertise = vec!["region".to_string(), "superregion".to_string()];
        let endpoint_timeouts = IndexMap::new();
        let acls = generate_acls_for_service("test_service", "region", &advertise, &endpoint_timeouts, &resolver);
        assert_eq!(
            acls,
            vec![
                "acl test_service_has_connslots connslots(test_service) gt 0".to_string(),
                "use_backend test_service if test_service_has_connslots".to_string(),
                "acl test_service.superregion_has_connslots connslots(test_service.superregion) gt 0".to_string(),
                "use_backend test_service.superregion if test_service.superregion_has_connslots".to_string(),
            ]
        );
    }

    #[test]
    fn downcasting_pairs_are_skipped() {
        // habitat is narrower (deeper) than the region being discovered at:
        // advertising at habitat here would downcast and must be skipped.
        let resolver = FakeHostCoordinates::new(&["superregion", "region", "habitat"], &[]);
        let advertise = vec!["habitat".to_string()];
        let endpoint_timeouts = IndexMap::new();
        let acls = generate_acls_for_service("test_service", "region", &advertise, &endpoint_timeouts, &resolver);
        assert!(acls.is_empty());
    }

    #[test]
    fn broader_advertise_type_is_not_downcast() {
        // superregion is broader than the region being discovered at: this
        // mirrors scenario (a) and must NOT be skipped.
        let resolver = FakeHostCoordinates::new(&["superregion", "region", "habitat"], &[]);
        let advertise = vec!["superregion".to_string()];
        let endpoint_timeouts = IndexMap::new();
        let acls = generate_acls_for_service("test_service", "region", &advertise, &endpoint_timeouts, &resolver);
        assert!(!acls.is_empty());
    }

    #[test]
    fn per_endpoint_pair_gets_path_acl() {
        let resolver = resolver();
        let advertise = vec!["region".to_string()];
        let mut endpoint_timeouts = IndexMap::new();
        endpoint_timeouts.insert(
            "/v2".to_string(),
            EndpointTimeout {
                path: "/v2".to_string(),
                timeout_ms: 500,
            },
        );
        let acls = generate_acls_for_service("test_service", "region", &advertise, &endpoint_timeouts, &resolver);
        assert_eq!(acls.len(), 5);
        assert!(acls[0].contains("_path path_beg /v2"));
    }

    #[test]
    fn ordering_formula_matches_testable_property_3() {
        let resolver = resolver();
        let advertise = vec!["region".to_string(), "superregion".to_string()];
        let mut endpoint_timeouts = IndexMap::new();
        endpoint_timeouts.insert(
            "/a".to_string(),
            EndpointTimeout {
                path: "/a".to_string(),
                timeout_ms: 1,
            },
        );
        let acls = generate_acls_for_service("svc", "region", &advertise, &endpoint_timeouts, &resolver);
        // N=1 non-default endpoint, M=2 non-downcasting advertise types:
        // N*M (path+connslots+use per endpoint pair) + N (connslots+use for
        // default-endpoint superregion pair) + M (connslots+use for region
        // default pair) + 1 ... this crate counts lines, not pairs: each
        // endpoint pair contributes 3 lines, each default pair 2 lines.
        let endpoint_pairs = 2; // (region,/a) and (superregion,/a)
        let default_pairs = 2; // (region,default) and (superregion,default)
        assert_eq!(acls.len(), endpoint_pairs * 3 + default_pairs * 2);
    }
}
