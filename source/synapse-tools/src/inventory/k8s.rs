use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AppError;

/// The orchestrator node-local pod endpoint (spec.md §6). The source
/// contains a stray-space variant of this URL in one revision; treated as
/// a bug per spec.md §9, so only the canonical form is ever used.
pub const NODE_POD_ENDPOINT: &str = "http://169.254.255.254:10255/pods/";

const SERVICE_LABEL: &str = "paasta.yelp.com/service";
const INSTANCE_LABEL: &str = "paasta.yelp.com/instance";
const FAILED_PHASE: &str = "Failed";

#[derive(Debug, Deserialize)]
struct PodList {
    items: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    metadata: PodMetadata,
    status: PodStatus,
}

#[derive(Debug, Deserialize)]
struct PodMetadata {
    #[serde(default)]
    labels: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PodStatus {
    phase: Option<String>,
    #[serde(rename = "podIP")]
    pod_ip: Option<String>,
}

/// Collects `(ip, identity)` pairs from the node's pod list: pods with both
/// service and instance labels, `phase != "Failed"`, and a populated
/// `podIP`. Mirrors `original_source::extract_taskid_and_ip_k8s`.
pub async fn collect(client: &reqwest::Client) -> Result<Vec<(String, String)>, AppError> {
    let pods: PodList = client
        .get(NODE_POD_ENDPOINT)
        .send()
        .await
        .map_err(AppError::Inventory)?
        .json()
        .await
        .map_err(AppError::Inventory)?;

    let mut out = Vec::new();
    for pod in pods.items {
        if pod.status.phase.as_deref() == Some(FAILED_PHASE) {
            continue;
        }
        let Some(pod_ip) = pod.status.pod_ip else { continue };
        let Some(service) = pod.metadata.labels.get(SERVICE_LABEL) else { continue };
        let Some(instance) = pod.metadata.labels.get(INSTANCE_LABEL) else { continue };
        let identity = format!("{service}.{instance}").replace('_', "--");
        out.push((pod_ip, identity));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pod_list_deserializes_and_skips_failed_and_missing_fields() {
        let raw = serde_json::json!({
            "items": [
                {
                    "metadata": {"labels": {"paasta.yelp.com/service": "widgets", "paasta.yelp.com/instance": "main"}},
                    "status": {"phase": "Running", "podIP": "10.0.0.1"}
                },
                {
                    "metadata": {"labels": {"paasta.yelp.com/service": "widgets", "paasta.yelp.com/instance": "canary"}},
                    "status": {"phase": "Failed", "podIP": "10.0.0.2"}
                },
                {
                    "metadata": {"labels": {}},
                    "status": {"phase": "Running", "podIP": "10.0.0.3"}
                },
                {
                    "metadata": {"labels": {"paasta.yelp.com/service": "widgets", "paasta.yelp.com/instance": "no_ip"}},
                    "status": {"phase": "Running"}
                }
            ]
        });
        let pods: PodList = serde_json::from_value(raw).unwrap();
        assert_eq!(pods.items.len(), 4);
    }
}
