use std::collections::HashMap;

/// One admin-socket command the reconciler must issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOp {
    Add { ip: String, identity: String },
    Set { ip: String, identity: String },
    Del { ip: String },
}

/// The minimal admin-socket command set turning `previous` into `current`:
/// `Add` for IPs new to `current`, `Set` for IPs whose identity changed,
/// `Del` for IPs that dropped out of `current`. Unchanged entries produce
/// nothing. Modeled on the teacher's `diff_map`/`MapDiffState` shape,
/// specialized to the three-op admin-socket protocol instead of a general
/// `Added`/`Deleted`/`Modified`/`Unchanged` enum, since the reconciler only
/// ever needs the operations, never the unchanged values.
pub struct IdentityMapDiff;

impl IdentityMapDiff {
    pub fn compute(previous: &HashMap<String, String>, current: &HashMap<String, String>) -> Vec<MapOp> {
        let mut ops = Vec::new();

        for (ip, identity) in current {
            match previous.get(ip) {
                None => ops.push(MapOp::Add {
                    ip: ip.clone(),
                    identity: identity.clone(),
                }),
                Some(prev_identity) if prev_identity != identity => ops.push(MapOp::Set {
                    ip: ip.clone(),
                    identity: identity.clone(),
                }),
                Some(_) => {}
            }
        }

        for ip in previous.keys() {
            if !current.contains_key(ip) {
                ops.push(MapOp::Del { ip: ip.clone() });
            }
        }

        ops
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn scenario_f_reconciles_added_changed_and_unchanged() {
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
                    identity: "C".to_string()
                },
                MapOp::Add {
                    ip: "3.3.3.3".to_string(),
                    identity: "D".to_string()
                },
            ]
        );
    }

    #[test]
    fn deleted_ip_produces_del_op() {
        let previous = map(&[("1.1.1.1", "A"), ("2.2.2.2", "B")]);
        let current = map(&[("1.1.1.1", "A")]);
        let ops = IdentityMapDiff::compute(&previous, &current);
        assert_eq!(ops, vec![MapOp::Del { ip: "2.2.2.2".to_string() }]);
    }

    #[test]
    fn no_changes_produces_no_ops() {
        let previous = map(&[("1.1.1.1", "A")]);
        let current = map(&[("1.1.1.1", "A")]);
        assert!(IdentityMapDiff::compute(&previous, &current).is_empty());
    }

    #[test]
    fn empty_previous_adds_every_current_entry() {
        let previous = HashMap::new();
        let current = map(&[("1.1.1.1", "A")]);
        let ops = IdentityMapDiff::compute(&previous, &current);
        assert_eq!(ops, vec![MapOp::Add { ip: "1.1.1.1".to_string(), identity: "A".to_string() }]);
    }
}
