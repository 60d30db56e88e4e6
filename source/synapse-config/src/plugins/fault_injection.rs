use super::ConfigPlugin;

const MAX_TARPIT_TIMEOUT: &str = "60s";
const TARPIT_HEADER: &str = "X-Ctx-Tarpit";

/// Always-on tarpit defense: a caller can mark a request for deliberate
/// stalling by setting `X-Ctx-Tarpit` to the target service name.
pub struct FaultInjection {
    service_name: String,
}

impl FaultInjection {
    pub fn new(service_name: &str) -> Self {
        FaultInjection {
            service_name: service_name.to_string(),
        }
    }
}

impl ConfigPlugin for FaultInjection {
    fn defaults_options(&self) -> Vec<String> {
        vec![format!("timeout tarpit {MAX_TARPIT_TIMEOUT}")]
    }

    fn backend_options(&self) -> Vec<String> {
        vec![
            format!("acl to_be_tarpitted hdr_sub({TARPIT_HEADER}) -i {}", self.service_name),
            "reqtarpit . if to_be_tarpitted".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tarpit_acl_matches_service_name() {
        let plugin = FaultInjection::new("test_service");
        assert_eq!(
            plugin.backend_options(),
            vec![
                "acl to_be_tarpitted hdr_sub(X-Ctx-Tarpit) -i test_service".to_string(),
                "reqtarpit . if to_be_tarpitted".to_string(),
            ]
        );
        assert_eq!(plugin.defaults_options(), vec!["timeout tarpit 60s".to_string()]);
    }
}
