//! Pure data extractors producing an unordered set of `(ip, identity)`
//! pairs, one per workload (spec.md §2 "Inventory adapters", §4.6). Neither
//! adapter mutates anything; the map reconciler owns the diff and the
//! side effects.

pub mod container_runtime;
pub mod k8s;
