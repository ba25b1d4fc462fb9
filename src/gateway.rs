//! IPFS HTTP API Client
//!
//! Thin client for the gateway's command endpoints. Every operation is built
//! from a [`request::Request`], sent as a POST and classified into a
//! [`response::Outcome`] before decoding.

use crate::cancel::Cancellation;
use crate::config::GatewayConfig;
use crate::dag::{Cid, DagNode, Link};
use crate::error::ApiError;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::time::Duration;
use tracing::debug;

pub mod multipart;
pub mod request;
pub mod response;

pub use multipart::{Reader, RequestBody};
pub use request::Request;
pub use response::{Outcome, ResponseBody};

/// Gateway used when none is configured.
pub const DEFAULT_GATEWAY_URL: &str = "https://ipfs.infura.io:5001";

const GATEWAY_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of storing a file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AddResult {
    #[serde(rename = "Hash")]
    pub hash: String,
    /// Sent by the gateway as a quoted integer.
    #[serde(rename = "Size", deserialize_with = "deserialize_string_u64")]
    pub size: u64,
}

impl AddResult {
    pub fn cid(&self) -> Cid {
        Cid::from(self.hash.as_str())
    }

    /// Link to this result under `name`, carrying its size.
    pub fn to_link(&self, name: impl Into<String>) -> Link {
        self.cid().to_link(name, self.size)
    }
}

impl fmt::Display for AddResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash: {} Size: {}", self.hash, self.size)
    }
}

fn deserialize_string_u64<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(D::Error::custom)
}

/// Statistics of a DAG node as reported by `object/stat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectStat {
    pub hash: String,
    pub num_links: u64,
    pub block_size: u64,
    pub links_size: u64,
    pub data_size: u64,
    pub cumulative_size: u64,
}

#[derive(Deserialize)]
struct DagPutResponse {
    #[serde(rename = "Cid")]
    cid: Cid,
}

/// Storage operations the path adder needs from a gateway.
#[async_trait]
pub trait DagStore: Send + Sync {
    /// Store a byte stream as a file.
    async fn add(&self, data: Reader, cancel: &Cancellation) -> Result<AddResult, ApiError>;

    /// Materialize a directory node from `links`, keeping their order.
    async fn dag_put_links(&self, links: &[Link], cancel: &Cancellation) -> Result<Cid, ApiError>;

    /// Fetch node statistics for `path`.
    async fn object_stat(&self, path: &str, cancel: &Cancellation) -> Result<ObjectStat, ApiError>;
}

/// Client for one gateway.
#[derive(Debug, Clone)]
pub struct Gateway {
    url: String,
    client: Client,
}

impl Gateway {
    /// Create a client for `url` with default HTTP settings.
    pub fn new(url: &str) -> Result<Self, ApiError> {
        Ok(Self::with_client(url, build_http_client(GATEWAY_CONNECT_TIMEOUT)?))
    }

    pub fn from_config(config: &GatewayConfig) -> Result<Self, ApiError> {
        let client = build_http_client(Duration::from_secs(config.connect_timeout_secs))?;
        Ok(Self::with_client(&config.url, client))
    }

    /// Create a client that issues requests through `client`.
    pub fn with_client(url: &str, client: Client) -> Self {
        Self {
            url: normalize_base_url(url),
            client,
        }
    }

    /// Normalized base URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Start a request for `command` with positional `args`.
    pub fn request(&self, command: &str, args: &[&str]) -> Request {
        Request::new(self.client.clone(), &self.url, command, args)
    }

    /// Stream the content at `path` (a CID optionally followed by a
    /// sub-path). The body is returned unread.
    pub async fn cat(&self, path: &str, cancel: &Cancellation) -> Result<ResponseBody, ApiError> {
        let outcome = self.request("cat", &[path]).send(cancel).await?;
        Ok(outcome.into_result("cat")?)
    }
}

#[async_trait]
impl DagStore for Gateway {
    async fn add(&self, data: Reader, cancel: &Cancellation) -> Result<AddResult, ApiError> {
        self.request("add", &[])
            .option("progress", false)
            .option("pin", true)
            .body(RequestBody::Reader(data))
            .exec(cancel)
            .await
    }

    async fn dag_put_links(&self, links: &[Link], cancel: &Cancellation) -> Result<Cid, ApiError> {
        let payload = DagNode::directory(links).to_json()?;
        debug!(link_count = links.len(), "Putting directory node");

        let out: DagPutResponse = self
            .request("dag/put", &[])
            .option("format", "protobuf")
            .option("input-enc", "json")
            .option("pin", true)
            .body(RequestBody::Bytes(payload))
            .exec(cancel)
            .await?;
        Ok(out.cid)
    }

    async fn object_stat(&self, path: &str, cancel: &Cancellation) -> Result<ObjectStat, ApiError> {
        self.request("object/stat", &[path]).exec(cancel).await
    }
}

/// Ensure the base URL carries a scheme and no trailing slash.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    }
}

fn build_http_client(connect_timeout: Duration) -> Result<Client, ApiError> {
    Ok(Client::builder().connect_timeout(connect_timeout).build()?)
}
