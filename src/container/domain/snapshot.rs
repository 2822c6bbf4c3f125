//! Runtime-neutral container inspection record.

use serde::{Deserialize, Serialize};

/// Protocol suffix of container-side port specs that may be routed.
const TCP_SUFFIX: &str = "tcp";

/// One container-side port and its first host binding, if published.
///
/// The container-side key keeps the engine's `<port>/<protocol>` form
/// (for example `80/tcp`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    container_port: String,
    host_port: Option<String>,
}

impl PortMapping {
    /// Creates an exposed port without a host binding.
    #[must_use]
    pub fn exposed(container_port: impl Into<String>) -> Self {
        Self {
            container_port: container_port.into(),
            host_port: None,
        }
    }

    /// Creates a port published on the given host port.
    #[must_use]
    pub fn published(container_port: impl Into<String>, host_port: impl Into<String>) -> Self {
        Self {
            container_port: container_port.into(),
            host_port: Some(host_port.into()),
        }
    }

    /// Returns the container-side port key.
    #[must_use]
    pub fn container_port(&self) -> &str {
        &self.container_port
    }

    /// Returns the raw host port binding, if any.
    #[must_use]
    pub fn raw_host_port(&self) -> Option<&str> {
        self.host_port.as_deref()
    }

    /// Returns the host port when it is bound to a positive port number.
    #[must_use]
    pub fn host_port(&self) -> Option<u16> {
        self.host_port
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u16>().ok())
            .filter(|port| *port > 0)
    }

    /// Returns the container-side port number for TCP ports.
    #[must_use]
    pub fn exposed_tcp_port(&self) -> Option<u16> {
        let (number, protocol) = self.container_port.split_once('/')?;
        if protocol != TCP_SUFFIX {
            return None;
        }
        number.parse::<u16>().ok().filter(|port| *port > 0)
    }
}

/// Inspection state of one container as needed for service derivation.
///
/// Labels keep the order reported by the runtime; derivation tie-breaks
/// depend on it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContainerSnapshot {
    name: String,
    labels: Vec<(String, String)>,
    ports: Vec<PortMapping>,
}

impl ContainerSnapshot {
    /// Creates a snapshot for a container name as reported by the runtime
    /// (usually with a leading `/`).
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            labels: Vec::new(),
            ports: Vec::new(),
        }
    }

    /// Appends a label.
    #[must_use]
    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.push((key.into(), value.into()));
        self
    }

    /// Appends labels in iteration order.
    #[must_use]
    pub fn with_labels<K, V>(mut self, labels: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.labels
            .extend(labels.into_iter().map(|(key, value)| (key.into(), value.into())));
        self
    }

    /// Appends a port mapping.
    #[must_use]
    pub fn with_port(mut self, port: PortMapping) -> Self {
        self.ports.push(port);
        self
    }

    /// Returns the raw container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns labels in runtime order.
    #[must_use]
    pub fn labels(&self) -> &[(String, String)] {
        &self.labels
    }

    /// Returns all known container ports.
    #[must_use]
    pub fn ports(&self) -> &[PortMapping] {
        &self.ports
    }

    /// Returns the smallest published host port.
    #[must_use]
    pub fn lowest_host_port(&self) -> Option<u16> {
        self.ports.iter().filter_map(PortMapping::host_port).min()
    }

    /// Returns the smallest exposed TCP port on the container side.
    #[must_use]
    pub fn lowest_exposed_port(&self) -> Option<u16> {
        self.ports
            .iter()
            .filter_map(PortMapping::exposed_tcp_port)
            .min()
    }
}
