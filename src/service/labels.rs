//! Derivation of service descriptions from container routing labels.

use crate::container::domain::ContainerSnapshot;
use crate::service::domain::{LabelPrefix, ServiceDescription, ServiceId};

/// Label value that opts a service into a Connect sidecar.
const CONNECT_ENABLED: &str = "true";

/// Derives the registry description of a container from its labels and
/// port bindings.
///
/// Returns `None` when the container has no usable port: it publishes no
/// host port and does not qualify for the exposed-port fallback (which
/// requires `<prefix>.consulcatalog.connect=true`). When several router or
/// port labels match, the first one in label order wins.
#[must_use]
pub fn derive_service(
    container: &ContainerSnapshot,
    prefix: &LabelPrefix,
) -> Option<ServiceDescription> {
    let patterns = LabelPatterns::new(prefix);
    let routed: Vec<(&str, &str)> = container
        .labels()
        .iter()
        .filter(|(key, _)| prefix.matches(key))
        .map(|(key, value)| (key.as_str(), value.as_str()))
        .collect();

    let service_id = ServiceId::new(container.name()).ok()?;
    let service_name = routed
        .iter()
        .find_map(|(key, _)| patterns.router_name(key))
        .unwrap_or_else(|| service_id.as_str())
        .to_owned();
    let explicit_port = routed
        .iter()
        .find(|(key, _)| patterns.is_port_label(key))
        .and_then(|(_, value)| parse_port(value));
    let connect = routed
        .iter()
        .find(|(key, _)| patterns.is_connect_label(key))
        .is_some_and(|(_, value)| *value == CONNECT_ENABLED);

    let fallback_port = match container.lowest_host_port() {
        Some(port) => port,
        None if connect => container.lowest_exposed_port()?,
        None => return None,
    };

    let tags = routed
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect();

    ServiceDescription::new(
        service_id,
        service_name,
        explicit_port.unwrap_or(fallback_port),
        tags,
        connect,
    )
    .ok()
}

/// Key shapes recognised under a label prefix.
struct LabelPatterns {
    router_head: String,
    service_head: String,
    connect_key: String,
}

impl LabelPatterns {
    const ROUTER_TAIL: &'static str = ".rule";
    const PORT_TAIL: &'static str = ".loadbalancer.server.port";

    fn new(prefix: &LabelPrefix) -> Self {
        Self {
            router_head: format!("{prefix}.http.routers."),
            service_head: format!("{prefix}.http.services."),
            connect_key: format!("{prefix}.consulcatalog.connect"),
        }
    }

    /// `<prefix>.http.routers.<name>.rule` yields `<name>`.
    fn router_name<'a>(&self, key: &'a str) -> Option<&'a str> {
        capture_shortest(key, &self.router_head, Self::ROUTER_TAIL)
    }

    fn is_port_label(&self, key: &str) -> bool {
        capture_shortest(key, &self.service_head, Self::PORT_TAIL).is_some()
    }

    fn is_connect_label(&self, key: &str) -> bool {
        key.starts_with(&self.connect_key)
    }
}

/// Returns the shortest non-empty segment between `head` and the next
/// occurrence of `tail`. Anything after `tail` is ignored.
fn capture_shortest<'a>(key: &'a str, head: &str, tail: &str) -> Option<&'a str> {
    let rest = key.strip_prefix(head)?;
    rest.match_indices(tail)
        .map(|(index, _)| index)
        .find(|index| *index > 0)
        .and_then(|index| rest.get(..index))
}

fn parse_port(value: &str) -> Option<u16> {
    value.trim().parse::<u16>().ok().filter(|port| *port > 0)
}
