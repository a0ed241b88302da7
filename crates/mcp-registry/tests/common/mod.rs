//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;

use anyhow::Result;
use serde_json::{Value, json};
use wiremock::MockServer;

use mcp_registry::Client;

/// A mock registry and a client pointed at it.
pub struct TestRegistry {
    /// The mock server.
    pub server: MockServer,
    /// Client configured for this server.
    pub client: Client,
}

impl TestRegistry {
    /// Start a new mock registry.
    pub async fn start() -> Result<Self> {
        let server = MockServer::start().await;
        let client = Client::builder()
            .base_url(server.uri())
            .user_agent("mcp-registry-tests")
            .build()?;
        Ok(Self { server, client })
    }

    /// Query parameters of every request received so far, in order.
    pub async fn received_queries(&self) -> Vec<HashMap<String, String>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.url.query_pairs().into_owned().collect())
            .collect()
    }

    /// Number of requests received so far.
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|r| r.len())
            .unwrap_or_default()
    }
}

/// Build an expected query map.
pub fn query(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// One list entry with registry metadata.
pub fn entry(name: &str, version: &str, status: &str) -> Value {
    json!({
        "server": { "name": name, "version": version },
        "_meta": {
            "io.modelcontextprotocol.registry/official": { "status": status }
        }
    })
}

/// A list response body.
pub fn page(entries: Vec<Value>, next_cursor: Option<&str>) -> Value {
    let metadata = match next_cursor {
        Some(cursor) => json!({ "nextCursor": cursor }),
        None => json!({}),
    };
    json!({ "servers": entries, "metadata": metadata })
}
