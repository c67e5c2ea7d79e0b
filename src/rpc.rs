//! Generic JSON-over-HTTP RPC client
//!
//! External collaborator for the configuration-management inventory service
//! running on the host. Shares the fetch primitive with the metadata client;
//! the node map is fetched once and memoized for the client's lifetime.

use std::collections::BTreeMap;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::fetch::UrlFetcher;

/// Default local inventory RPC endpoint
pub const RPC_BASE_URL: &str = "http://localhost:8080/v2";

/// Client for the local node inventory RPC service
pub struct RpcClient {
    fetcher: UrlFetcher,
    base_url: String,
    nodes: RwLock<Option<BTreeMap<String, serde_json::Value>>>,
}

impl RpcClient {
    #[allow(dead_code)]
    pub fn new() -> Result<Self> {
        Self::with_base_url(RPC_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Result<Self> {
        Ok(Self {
            fetcher: UrlFetcher::new().map_err(Error::Fetch)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            nodes: RwLock::new(None),
        })
    }

    /// Call one RPC and parse the JSON response
    pub async fn call(&self, rpc: &str) -> Result<serde_json::Value> {
        let body = self
            .fetcher
            .fetch(&format!("{}/{}", self.base_url, rpc))
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Registered nodes keyed by name, fetched once per client lifetime
    pub async fn nodes(&self) -> Result<BTreeMap<String, serde_json::Value>> {
        if let Some(nodes) = self.nodes.read().await.as_ref() {
            return Ok(nodes.clone());
        }

        let response = self.call("nodes").await?;
        let list = response
            .as_array()
            .ok_or_else(|| Error::Other("nodes response is not a list".to_string()))?;

        let mut nodes = BTreeMap::new();
        for node in list {
            let Some(name) = node.get("name").and_then(|n| n.as_str()) else {
                log::warn!("skipping node without a name: {}", node);
                continue;
            };
            nodes.insert(name.to_string(), node.clone());
        }

        *self.nodes.write().await = Some(nodes.clone());
        Ok(nodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_call_parses_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/ping")
            .with_status(200)
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let client = RpcClient::with_base_url(format!("{}/v2", server.url())).unwrap();
        let value = client.call("ping").await.unwrap();
        assert_eq!(value["ok"], true);
    }

    #[tokio::test]
    async fn test_nodes_keyed_by_name_and_memoized() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/nodes")
            .with_status(200)
            .with_body(r#"[{"name": "web-1", "env": "prod"}, {"name": "db-1"}, {"env": "orphan"}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = RpcClient::with_base_url(format!("{}/v2", server.url())).unwrap();

        let nodes = client.nodes().await.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes["web-1"]["env"], "prod");
        assert!(nodes.contains_key("db-1"));

        // Second call is served from memory
        let again = client.nodes().await.unwrap();
        assert_eq!(again, nodes);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_service_is_error() {
        let client = RpcClient::with_base_url("http://127.0.0.1:1/v2".to_string()).unwrap();
        assert!(client.nodes().await.is_err());
    }
}
