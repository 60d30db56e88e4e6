use crate::common_types::namespace::DEFAULT_ENDPOINT;

/// Haproxy backend names can't contain `/`; endpoint names (which are path
/// prefixes, e.g. `/v2/widgets`) get their slashes doubled up instead.
fn endpoint_name_haproxy(endpoint_name: &str) -> String {
    endpoint_name.replace('/', "__")
}

/// The single backend-identifier formation rule: `service[.advertise_type][.endpoint_timeouts]`.
/// Every emission site (service-entry keys, `use_backend` targets, ACL names)
/// must be fed from this function — it's part of the external contract
/// because rules reference backends by this string.
pub fn backend_id(
    service_name: &str,
    discover_type: &str,
    advertise_type: &str,
    endpoint_name: &str,
) -> String {
    let endpoint_ext = if endpoint_name != DEFAULT_ENDPOINT {
        format!(".{}_timeouts", endpoint_name_haproxy(endpoint_name))
    } else {
        String::new()
    };
    let advertise_ext = if advertise_type != discover_type {
        format!(".{advertise_type}")
    } else {
        String::new()
    };
    format!("{service_name}{advertise_ext}{endpoint_ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_pair_has_bare_service_name() {
        assert_eq!(backend_id("test_service", "region", "region", DEFAULT_ENDPOINT), "test_service");
    }

    #[test]
    fn non_default_advertise_is_suffixed() {
        assert_eq!(backend_id("test_service", "region", "superregion", DEFAULT_ENDPOINT), "test_service.superregion");
    }

    #[test]
    fn non_default_endpoint_is_suffixed_and_slashes_doubled() {
        assert_eq!(
            backend_id("test_service", "region", "region", "/v2/widgets"),
            "test_service.__v2__widgets_timeouts"
        );
    }

    #[test]
    fn both_suffixes_combine_in_order() {
        assert_eq!(
            backend_id("test_service", "region", "superregion", "/v2"),
            "test_service.superregion.__v2_timeouts"
        );
    }
}
