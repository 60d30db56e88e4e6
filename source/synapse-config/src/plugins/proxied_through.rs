use super::ConfigPlugin;
use crate::common_types::namespace::Namespace;

/// Routes a namespace's traffic through a declared frontend proxy
/// namespace, and (on the proxy's own backend) stamps the source header
/// for traffic it forwards.
pub struct ProxiedThrough {
    service_name: String,
    proxied_through: Option<String>,
    healthcheck_uri: String,
    is_proxy: bool,
}

impl ProxiedThrough {
    pub fn new(service_name: &str, namespace: &Namespace) -> Self {
        ProxiedThrough {
            service_name: service_name.to_string(),
            proxied_through: namespace.proxied_through.clone(),
            healthcheck_uri: namespace.healthcheck_uri().to_string(),
            is_proxy: namespace.is_proxy,
        }
    }
}

impl ConfigPlugin for ProxiedThrough {
    fn frontend_options(&self) -> Vec<String> {
        let Some(proxied_through) = &self.proxied_through else {
            return Vec::new();
        };
        vec![
            format!("acl is_status_request path {}", self.healthcheck_uri),
            format!("acl request_from_proxy hdr_beg(X-Smartstack-Source) -i {proxied_through}"),
            format!("acl proxied_through_backend_has_connslots connslots({proxied_through}) gt 0"),
            format!(
                "http-request set-header X-Smartstack-Destination {} if !is_status_request !request_from_proxy proxied_through_backend_has_connslots",
                self.service_name
            ),
            format!(
                "use_backend {proxied_through} if !is_status_request !request_from_proxy proxied_through_backend_has_connslots"
            ),
        ]
    }

    fn backend_options(&self) -> Vec<String> {
        if !self.is_proxy {
            return Vec::new();
        }
        vec![
            format!("acl is_status_request path {}", self.healthcheck_uri),
            format!(
                "http-request set-header X-Smartstack-Source {} if !is_status_request",
                self.service_name
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_proxy_means_no_frontend_contribution() {
        let ns = Namespace::default();
        let plugin = ProxiedThrough::new("test_service", &ns);
        assert!(plugin.frontend_options().is_empty());
    }

    #[test]
    fn proxied_through_emits_destination_stamp_and_route() {
        let mut ns = Namespace::default();
        ns.proxied_through = Some("proxy_service".to_string());
        let plugin = ProxiedThrough::new("test_service", &ns);
        let opts = plugin.frontend_options();
        assert_eq!(opts.len(), 5);
        assert!(opts[3].contains("X-Smartstack-Destination test_service"));
        assert!(opts[4].starts_with("use_backend proxy_service if"));
    }

    #[test]
    fn is_proxy_stamps_source_on_backend() {
        let mut ns = Namespace::default();
        ns.is_proxy = true;
        let plugin = ProxiedThrough::new("proxy_service", &ns);
        let opts = plugin.backend_options();
        assert_eq!(
            opts,
            vec![
                "acl is_status_request path /status".to_string(),
                "http-request set-header X-Smartstack-Source proxy_service if !is_status_request"
                    .to_string(),
            ]
        );
    }
}
