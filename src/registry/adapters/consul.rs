//! Consul agent HTTP adapter for the service registry port.

use crate::registry::{
    domain::{RegisteredService, RegisteredServiceSet},
    ports::{RegistryOperation, ServiceRegistry, ServiceRegistryError, ServiceRegistryResult},
};
use crate::service::domain::{ServiceDescription, ServiceId};
use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default agent address.
pub const DEFAULT_CONSUL_ADDR: &str = "http://localhost:8500";

const TOKEN_HEADER: &str = "X-Consul-Token";
const REGISTER_PATH: &str = "v1/agent/service/register";
const DEREGISTER_PATH: &str = "v1/agent/service/deregister/";
const SERVICES_PATH: &str = "v1/agent/services";

/// Connection settings for a Consul agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsulConfig {
    address: String,
    token: Option<String>,
}

impl ConsulConfig {
    /// Creates settings for an agent address such as `http://localhost:8500`.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: None,
        }
    }

    /// Sets the ACL token sent with every request. Blank tokens are ignored.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        let normalized = token.into().trim().to_owned();
        self.token = (!normalized.is_empty()).then_some(normalized);
        self
    }

    /// Returns the configured agent address.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Returns the ACL token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

impl Default for ConsulConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CONSUL_ADDR)
    }
}

/// Service registry backed by the local Consul agent API.
#[derive(Debug, Clone)]
pub struct ConsulRegistry {
    http_client: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl ConsulRegistry {
    /// Creates a registry client.
    ///
    /// A missing scheme defaults to `http://`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceRegistryError::InvalidAddress`] when the address
    /// cannot be parsed as a base URL.
    pub fn new(config: &ConsulConfig) -> ServiceRegistryResult<Self> {
        Ok(Self {
            http_client: HttpClient::new(),
            base_url: parse_base_url(config.address())?,
            token: config.token().map(str::to_owned),
        })
    }

    /// Returns the normalized agent base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str, operation: RegistryOperation) -> ServiceRegistryResult<Url> {
        self.base_url
            .join(path)
            .map_err(|err| ServiceRegistryError::invalid_response(operation, err))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(TOKEN_HEADER, token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        operation: RegistryOperation,
    ) -> ServiceRegistryResult<Response> {
        self.authorize(request)
            .send()
            .await
            .map_err(|err| ServiceRegistryError::transport(operation, err))
    }
}

#[async_trait]
impl ServiceRegistry for ConsulRegistry {
    async fn register(&self, service: &ServiceDescription) -> ServiceRegistryResult<()> {
        let operation = RegistryOperation::Register;
        let url = self.endpoint(REGISTER_PATH, operation)?;
        let body = RegisterServiceBody::from(service);
        debug!(service_id = %service.service_id(), %url, "registering service");

        let response = self
            .send(self.http_client.put(url).json(&body), operation)
            .await?;
        ensure_success(response, operation).await
    }

    async fn deregister(&self, service_id: &ServiceId) -> ServiceRegistryResult<()> {
        let operation = RegistryOperation::Deregister;
        let mut url = self.endpoint(DEREGISTER_PATH, operation)?;
        url.path_segments_mut()
            .map_err(|()| ServiceRegistryError::InvalidAddress {
                address: self.base_url.to_string(),
                reason: "address cannot carry a path".to_owned(),
            })?
            .pop_if_empty()
            .push(service_id.as_str());
        debug!(%service_id, %url, "deregistering service");

        let response = self.send(self.http_client.put(url), operation).await?;
        if response.status() == StatusCode::NOT_FOUND {
            debug!(%service_id, "service already absent from registry");
            return Ok(());
        }
        ensure_success(response, operation).await
    }

    async fn list_registered(&self) -> ServiceRegistryResult<RegisteredServiceSet> {
        let operation = RegistryOperation::List;
        let url = self.endpoint(SERVICES_PATH, operation)?;

        let response = self.send(self.http_client.get(url), operation).await?;
        let response = check_status(response, operation).await?;
        let entries: HashMap<String, AgentServiceEntry> = response
            .json()
            .await
            .map_err(|err| ServiceRegistryError::invalid_response(operation, err))?;

        entries
            .into_values()
            .map(|entry| entry.into_registered(operation))
            .collect()
    }
}

fn parse_base_url(address: &str) -> ServiceRegistryResult<Url> {
    let trimmed = address.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_owned()
    } else {
        format!("http://{trimmed}")
    };
    let normalized = format!("{}/", with_scheme.trim_end_matches('/'));

    let url = Url::parse(&normalized).map_err(|err| ServiceRegistryError::InvalidAddress {
        address: address.to_owned(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ServiceRegistryError::InvalidAddress {
            address: address.to_owned(),
            reason: "address cannot be used as a base URL".to_owned(),
        });
    }
    Ok(url)
}

async fn check_status(
    response: Response,
    operation: RegistryOperation,
) -> ServiceRegistryResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response
        .text()
        .await
        .unwrap_or_else(|err| format!("<unreadable body: {err}>"));
    Err(ServiceRegistryError::Rejected {
        operation,
        status: status.as_u16(),
        message: message.trim().to_owned(),
    })
}

async fn ensure_success(response: Response, operation: RegistryOperation) -> ServiceRegistryResult<()> {
    check_status(response, operation).await.map(drop)
}

/// Body of `PUT /v1/agent/service/register`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct RegisterServiceBody<'a> {
    #[serde(rename = "ID")]
    id: &'a str,
    name: &'a str,
    tags: &'a [String],
    enable_tag_override: bool,
    port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    connect: Option<ConnectBody>,
}

#[derive(Debug, Serialize)]
struct ConnectBody {
    sidecar_service: SidecarServiceBody,
}

#[derive(Debug, Serialize)]
struct SidecarServiceBody {}

impl<'a> From<&'a ServiceDescription> for RegisterServiceBody<'a> {
    fn from(service: &'a ServiceDescription) -> Self {
        Self {
            id: service.service_id().as_str(),
            name: service.service_name(),
            tags: service.traefik_labels(),
            enable_tag_override: true,
            port: service.service_port(),
            connect: service.connect().then_some(ConnectBody {
                sidecar_service: SidecarServiceBody {},
            }),
        }
    }
}

/// One value of the `GET /v1/agent/services` map.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AgentServiceEntry {
    #[serde(rename = "ID")]
    id: String,
    service: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    port: u16,
    #[serde(default)]
    kind: Option<String>,
}

impl AgentServiceEntry {
    fn into_registered(self, operation: RegistryOperation) -> ServiceRegistryResult<RegisteredService> {
        let id = ServiceId::new(self.id)
            .map_err(|err| ServiceRegistryError::invalid_response(operation, err))?;
        let registered =
            RegisteredService::new(id, self.service, self.tags.unwrap_or_default(), self.port);
        Ok(match self.kind.filter(|kind| !kind.is_empty()) {
            Some(kind) => registered.with_kind(kind),
            None => registered,
        })
    }
}
