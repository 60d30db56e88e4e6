use indexmap::IndexMap;

use crate::common_types::document::DiscoveryDict;
use crate::common_types::error::HostCoordinateError;
use crate::common_types::namespace::{ChaosEntry, FailMode};
use crate::host_coordinates::HostCoordinates;

/// Merges a namespace's `chaos` block down to the single entry that
/// applies on this host: for each grouping type, look up the host's
/// current value for that type and fold in whichever of `fail`/`delay`
/// that grouping-value's entry sets, later groupings overwriting earlier
/// ones field-by-field (mirrors `merge_dict_for_my_grouping`'s
/// `dict.update`). Grouping types this host has no coordinate for are
/// treated as simply not matching (skipped, not an error) — distinct from
/// an advertise/discover type comparison, since any string may be used
/// as a chaos grouping type.
pub fn merge_dict_for_my_grouping(
    chaos: &IndexMap<String, IndexMap<String, ChaosEntry>>,
    resolver: &dyn HostCoordinates,
) -> ChaosEntry {
    let mut result = ChaosEntry::default();
    for (grouping_type, grouping_dict) in chaos {
        let my_grouping = match resolver.get_current_location(grouping_type) {
            Ok(value) => value,
            Err(HostCoordinateError::UnknownType(_)) => continue,
            Err(_) => continue,
        };
        if let Some(entry) = grouping_dict.get(&my_grouping) {
            if entry.fail.is_some() {
                result.fail = entry.fail;
            }
            if entry.delay.is_some() {
                result.delay = entry.delay.clone();
            }
        }
    }
    result
}

/// Returns the additional frontend directives and, if the chaos override
/// replaces discovery entirely (`fail=error_503`), the replacement
/// discovery dict.
pub fn chaos_options(
    chaos: &IndexMap<String, IndexMap<String, ChaosEntry>>,
    resolver: &dyn HostCoordinates,
) -> (Vec<String>, Option<DiscoveryDict>) {
    let merged = merge_dict_for_my_grouping(chaos, resolver);

    if let Some(FailMode::Drop) = merged.fail {
        return (vec!["tcp-request content reject".to_string()], None);
    }
    if let Some(FailMode::Error503) = merged.fail {
        return (Vec::new(), Some(DiscoveryDict::base()));
    }
    if let Some(delay) = merged.delay {
        return (
            vec![
                format!("tcp-request inspect-delay {delay}"),
                "tcp-request content accept if WAIT_END".to_string(),
            ],
            None,
        );
    }
    (Vec::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host_coordinates::test_support::FakeHostCoordinates;

    fn resolver() -> FakeHostCoordinates {
        FakeHostCoordinates::new(&["region"], &[("ecosystem", "my_ecosystem")])
    }

    fn chaos_with(grouping: &str, value: &str, entry: ChaosEntry) -> IndexMap<String, IndexMap<String, ChaosEntry>> {
        let mut inner = IndexMap::new();
        inner.insert(value.to_string(), entry);
        let mut outer = IndexMap::new();
        outer.insert(grouping.to_string(), inner);
        outer
    }

    #[test]
    fn delay_adds_inspect_delay_directives() {
        let chaos = chaos_with(
            "ecosystem",
            "my_ecosystem",
            ChaosEntry {
                fail: None,
                delay: Some("300ms".to_string()),
            },
        );
        let (frontend, discovery) = chaos_options(&chaos, &resolver());
        assert_eq!(
            frontend,
            vec![
                "tcp-request inspect-delay 300ms".to_string(),
                "tcp-request content accept if WAIT_END".to_string(),
            ]
        );
        assert!(discovery.is_none());
    }

    #[test]
    fn fail_error_503_replaces_discovery_with_base() {
        let chaos = chaos_with(
            "ecosystem",
            "my_ecosystem",
            ChaosEntry {
                fail: Some(FailMode::Error503),
                delay: None,
            },
        );
        let (frontend, discovery) = chaos_options(&chaos, &resolver());
        assert!(frontend.is_empty());
        assert_eq!(discovery.unwrap().method, "base");
    }

    #[test]
    fn non_matching_grouping_value_is_ignored() {
        let chaos = chaos_with(
            "ecosystem",
            "other_ecosystem",
            ChaosEntry {
                fail: Some(FailMode::Drop),
                delay: None,
            },
        );
        let (frontend, discovery) = chaos_options(&chaos, &resolver());
        assert!(frontend.is_empty());
        assert!(discovery.is_none());
    }
}
