use crate::fallback::FallbackKind;
use crate::upstream::BackendEndpoint;

/// Paths answered locally from the record store, never forwarded. This is
/// the availability guarantee: these endpoints work with every upstream
/// down.
pub const ATTRIBUTE_SURFACE: &[&str] = &[
    "/api/attribute-query",
    "/api/direct-count",
    "/api/chat-attribute",
];

/// Per-request routing outcome.
#[derive(Debug, Clone)]
pub enum RouteDecision {
    LocalAttribute,
    Forward(BackendEndpoint),
    Fallback(FallbackKind),
}

pub fn is_attribute_surface(path: &str) -> bool {
    ATTRIBUTE_SURFACE.contains(&path)
}

pub fn first_available(endpoints: &[BackendEndpoint]) -> Option<&BackendEndpoint> {
    endpoints.iter().find(|e| e.is_routable())
}

/// Picks the route for one inbound request: local attribute surface first,
/// then the highest-priority routable endpoint, then a synthesized fallback
/// keyed by path.
pub fn decide(path: &str, endpoints: &[BackendEndpoint]) -> RouteDecision {
    if is_attribute_surface(path) {
        return RouteDecision::LocalAttribute;
    }
    match first_available(endpoints) {
        Some(endpoint) => RouteDecision::Forward(endpoint.clone()),
        None => RouteDecision::Fallback(FallbackKind::for_path(path)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{BackendEndpoint, EndpointState};

    fn endpoint(name: &str, state: EndpointState) -> BackendEndpoint {
        BackendEndpoint {
            name: name.to_string(),
            base_url: format!("http://{}", name),
            state,
            last_checked_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn attribute_surface_is_always_local() {
        let all_down = vec![endpoint("main-app", EndpointState::Down)];
        for path in ATTRIBUTE_SURFACE {
            assert!(matches!(
                decide(path, &all_down),
                RouteDecision::LocalAttribute
            ));
        }
    }

    #[test]
    fn forwards_to_first_healthy_endpoint() {
        let endpoints = vec![
            endpoint("main-app", EndpointState::Down),
            endpoint("attribute-server", EndpointState::Healthy),
        ];
        match decide("/api/vehicles", &endpoints) {
            RouteDecision::Forward(e) => assert_eq!(e.name, "attribute-server"),
            other => panic!("expected forward, got {:?}", other),
        }
    }

    #[test]
    fn degraded_endpoints_are_not_forwarding_targets() {
        let endpoints = vec![
            endpoint("main-app", EndpointState::Degraded),
            endpoint("attribute-server", EndpointState::Down),
        ];
        assert!(matches!(
            decide("/api/vehicles", &endpoints),
            RouteDecision::Fallback(FallbackKind::Vehicles)
        ));
    }

    #[test]
    fn all_down_yields_path_keyed_fallback() {
        let endpoints = vec![endpoint("main-app", EndpointState::Down)];
        assert!(matches!(
            decide("/chat", &endpoints),
            RouteDecision::Fallback(FallbackKind::Chat)
        ));
        assert!(matches!(
            decide("/some/unknown/path", &endpoints),
            RouteDecision::Fallback(FallbackKind::Generic)
        ));
    }
}
