//! Scenario (f) and Testable Property 6: the identity-map diff emits
//! exactly the minimal add/set/del command set.

use std::collections::HashMap;

use synapse_config::map_diff::{IdentityMapDiff, MapOp};

fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn scenario_f_set_for_changed_add_for_new_nothing_for_unchanged() {
    let previous = map(&[("1.1.1.1", "A"), ("2.2.2.2", "B")]);
    let current = map(&[("1.1.1.1", "A"), ("2.2.2.2", "C"), ("3.3.3.3", "D")]);

    let mut ops = IdentityMapDiff::compute(&previous, &current);
    ops.sort_by_key(|op| match op {
        MapOp::Add { ip, .. } | MapOp::Set { ip, .. } | MapOp::Del { ip } => ip.clone(),
    });

    assert_eq!(
        ops,
        vec![
            MapOp::Set {
                ip: "2.2.2.2".to_string(),
                identity: "C".to_string(),
            },
            MapOp::Add {
                ip: "3.3.3.3".to_string(),
                identity: "D".to_string(),
            },
        ]
    );
}

#[test]
fn property_6_op_multiset_is_exactly_add_set_del_no_extras() {
    let previous = map(&[("1.1.1.1", "A"), ("2.2.2.2", "B"), ("4.4.4.4", "E")]);
    let current = map(&[("1.1.1.1", "A"), ("2.2.2.2", "B-changed"), ("3.3.3.3", "D")]);

    let ops = IdentityMapDiff::compute(&previous, &current);
    assert_eq!(ops.len(), 3, "exactly one op per changed/added/removed ip, none for the unchanged one");

    let adds: Vec<_> = ops.iter().filter(|op| matches!(op, MapOp::Add { .. })).collect();
    let sets: Vec<_> = ops.iter().filter(|op| matches!(op, MapOp::Set { .. })).collect();
    let dels: Vec<_> = ops.iter().filter(|op| matches!(op, MapOp::Del { .. })).collect();
    assert_eq!(adds.len(), 1);
    assert_eq!(sets.len(), 1);
    assert_eq!(dels.len(), 1);

    assert!(ops.contains(&MapOp::Add { ip: "3.3.3.3".to_string(), identity: "D".to_string() }));
    assert!(ops.contains(&MapOp::Set { ip: "2.2.2.2".to_string(), identity: "B-changed".to_string() }));
    assert!(ops.contains(&MapOp::Del { ip: "4.4.4.4".to_string() }));
}
