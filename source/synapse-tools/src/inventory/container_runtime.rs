use std::collections::HashMap;

use bollard::query_parameters::ListContainersOptionsBuilder;
use bollard::Docker;

use crate::error::AppError;

/// A container carrying this label is identified directly by its value.
const TASK_ID_LABEL: &str = "MESOS_TASK_ID";

/// Absent a direct task-id label, a service+instance label pair stands in
/// for one, joined per spec.md §9's normalization rule.
const SERVICE_LABEL: &str = "paasta_service";
const INSTANCE_LABEL: &str = "paasta_instance";

/// The bridge network name `original_source::extract_taskid_and_ip_mesos`
/// reads the container's address from.
const BRIDGE_NETWORK: &str = "bridge";

fn identity_from_labels(labels: &HashMap<String, String>) -> Option<String> {
    if let Some(task_id) = labels.get(TASK_ID_LABEL) {
        return Some(task_id.clone());
    }
    let service = labels.get(SERVICE_LABEL)?;
    let instance = labels.get(INSTANCE_LABEL)?;
    Some(format!("{service}.{instance}").replace('_', "--"))
}

/// Opens a connection to the local container runtime using its
/// platform-default transport (unix socket on Linux).
pub fn connect() -> Result<Docker, AppError> {
    Docker::connect_with_local_defaults().map_err(AppError::ContainerRuntime)
}

/// Collects `(ip, identity)` pairs from running, bridge-networked
/// containers carrying either label shape. Containers with neither an
/// identity nor a bridge-network address are silently skipped, matching
/// `original_source`'s `extract_taskid_and_ip_mesos`.
pub async fn collect(docker: &Docker) -> Result<Vec<(String, String)>, AppError> {
    let options = ListContainersOptionsBuilder::new().all(false).build();
    let containers = docker.list_containers(Some(options)).await.map_err(AppError::ContainerRuntime)?;

    let mut out = Vec::new();
    for container in containers {
        let Some(labels) = container.labels else { continue };
        let Some(identity) = identity_from_labels(&labels) else { continue };
        let Some(networks) = container.network_settings.and_then(|settings| settings.networks) else {
            continue;
        };
        let Some(bridge) = networks.get(BRIDGE_NETWORK) else { continue };
        let Some(ip) = bridge.ip_address.clone().filter(|ip| !ip.is_empty()) else { continue };
        out.push((ip, identity));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn task_id_label_wins_over_service_instance_pair() {
        let labels = labels(&[("MESOS_TASK_ID", "widgets.main.1234"), ("paasta_service", "widgets"), ("paasta_instance", "main")]);
        assert_eq!(identity_from_labels(&labels), Some("widgets.main.1234".to_string()));
    }

    #[test]
    fn service_instance_pair_joins_with_dot_and_replaces_underscores() {
        let labels = labels(&[("paasta_service", "my_service"), ("paasta_instance", "main_instance")]);
        assert_eq!(identity_from_labels(&labels), Some("my--service.main--instance".to_string()));
    }

    #[test]
    fn neither_label_shape_yields_none() {
        let labels = labels(&[("unrelated", "value")]);
        assert_eq!(identity_from_labels(&labels), None);
    }
}
