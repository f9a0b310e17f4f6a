//! FortiOS REST API client.
//!
//! Talks to `/api/v2` with a REST API administrator token. Plain HTTP is used
//! for ports 80 and 8080, HTTPS otherwise. Certificate verification is off
//! unless requested, since appliances ship with self-signed certificates.

use std::collections::BTreeSet;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::record::Category;
use crate::store::{ConnectionInfo, RemoteObjectStore, StoreError, StoreResponse};

pub const DEFAULT_PORT: u16 = 443;
pub const DEFAULT_VDOM: &str = "root";

const STATUS_TIMEOUT: Duration = Duration::from_secs(8);
const CMDB_TIMEOUT: Duration = Duration::from_secs(15);
/// Longest response body kept from a failed status check.
const STATUS_BODY_LEN: usize = 300;
/// Longest response body kept from a create or update call.
const WRITE_BODY_LEN: usize = 400;

/// Connection settings for one appliance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FortiGateConfig {
    pub host: String,
    pub port: u16,
    pub token: String,
    pub vdom: String,
    pub verify_tls: bool,
}

impl FortiGateConfig {
    pub fn new(host: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            token: token.into(),
            vdom: DEFAULT_VDOM.to_string(),
            verify_tls: false,
        }
    }

    pub fn scheme(&self) -> &'static str {
        if matches!(self.port, 80 | 8080) {
            "http"
        } else {
            "https"
        }
    }

    pub fn base_url(&self) -> String {
        format!("{}://{}:{}/api/v2", self.scheme(), self.host.trim(), self.port)
    }
}

pub struct FortiGateClient {
    config: FortiGateConfig,
    base: String,
    http: Client,
}

impl FortiGateClient {
    pub fn new(config: FortiGateConfig) -> Result<Self, StoreError> {
        let http = Client::builder()
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(CMDB_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(Self {
            base: config.base_url(),
            config,
            http,
        })
    }

    pub fn config(&self) -> &FortiGateConfig {
        &self.config
    }

    pub fn collection_url(&self, category: Category) -> Result<String, StoreError> {
        collection_url(&self.base, category)
    }

    pub fn object_url(&self, category: Category, name: &str) -> Result<String, StoreError> {
        Ok(format!(
            "{}/{}",
            self.collection_url(category)?,
            urlencoding::encode(name)
        ))
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .bearer_auth(self.config.token.trim())
            .query(&[("vdom", self.config.vdom.as_str())])
    }

    fn send(builder: RequestBuilder) -> Result<Response, StoreError> {
        builder
            .send()
            .map_err(|e| StoreError::Transport(e.to_string()))
    }

    fn write_response(response: Response) -> Result<StoreResponse, StoreError> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        Ok(StoreResponse {
            status,
            body: truncate(&body, WRITE_BODY_LEN),
        })
    }
}

fn collection_url(base: &str, category: Category) -> Result<String, StoreError> {
    let endpoint = category
        .endpoint()
        .ok_or(StoreError::Unsupported(category))?;
    Ok(format!("{base}/cmdb/{endpoint}"))
}

#[derive(Debug, Default, Deserialize)]
struct StatusBody {
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    results: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ListBody {
    #[serde(default)]
    results: Vec<NamedEntry>,
}

#[derive(Debug, Deserialize)]
struct NamedEntry {
    #[serde(default)]
    name: Option<String>,
}

/// Version and hostname from a `monitor/system/status` body.
fn connection_info(body: StatusBody) -> ConnectionInfo {
    let results = body.results.unwrap_or(Value::Null);
    let text = |key: &str| results.get(key).and_then(Value::as_str).map(str::to_string);
    ConnectionInfo {
        version: body
            .version
            .or_else(|| text("version"))
            .or_else(|| text("Version")),
        hostname: text("hostname"),
    }
}

fn truncate(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

impl RemoteObjectStore for FortiGateClient {
    fn test_connection(&mut self) -> Result<ConnectionInfo, StoreError> {
        let url = format!("{}/monitor/system/status", self.base);
        let response = Self::send(self.authorized(self.http.get(url)).timeout(STATUS_TIMEOUT))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| StoreError::Transport(e.to_string()))?;
        if status != 200 {
            return Err(StoreError::Status {
                status,
                body: truncate(&body, STATUS_BODY_LEN),
            });
        }
        let parsed: StatusBody =
            serde_json::from_str(&body).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(connection_info(parsed))
    }

    fn list_existing(&mut self, category: Category) -> Result<BTreeSet<String>, StoreError> {
        let url = self.collection_url(category)?;
        let response = Self::send(self.authorized(self.http.get(url)))?;
        let status = response.status().as_u16();
        if status != 200 {
            let body = response.text().unwrap_or_default();
            return Err(StoreError::Status {
                status,
                body: truncate(&body, STATUS_BODY_LEN),
            });
        }
        let parsed: ListBody = response
            .json()
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(parsed
            .results
            .into_iter()
            .filter_map(|entry| entry.name)
            .collect())
    }

    fn create(
        &mut self,
        category: Category,
        payload: &Value,
    ) -> Result<StoreResponse, StoreError> {
        let url = self.collection_url(category)?;
        let response = Self::send(self.authorized(self.http.post(url)).json(payload))?;
        Self::write_response(response)
    }

    fn update(
        &mut self,
        category: Category,
        name: &str,
        payload: &Value,
    ) -> Result<StoreResponse, StoreError> {
        let url = self.object_url(category, name)?;
        let response = Self::send(self.authorized(self.http.put(url)).json(payload))?;
        Self::write_response(response)
    }
}
