//! Request and response types for the MCP registry API.
//!
//! These types mirror the registry's `v0.1` wire schema. Fields the client
//! does not model are kept in `extra` maps so records survive a round trip.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key under `_meta` holding the registry's own metadata block.
pub const OFFICIAL_META_KEY: &str = "io.modelcontextprotocol.registry/official";

// ─────────────────────────────────────────────────────────────────────────────
// Servers
// ─────────────────────────────────────────────────────────────────────────────

/// One version of a server as published to the registry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerJson {
    /// JSON schema the record was published against.
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Namespaced server name, e.g. `io.github.owner/server`.
    #[serde(default)]
    pub name: String,
    /// Human readable description.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Version string, normally semantic.
    #[serde(default)]
    pub version: String,
    /// Source repository.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<Repository>,
    /// Project website.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website_url: Option<String>,
    /// Installable packages.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub packages: Vec<Package>,
    /// Hosted endpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remotes: Vec<Transport>,
    /// Publisher-supplied metadata.
    #[serde(rename = "_meta", default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
}

/// Source repository of a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Repository URL.
    #[serde(default)]
    pub url: String,
    /// Hosting service, e.g. `github`.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// Service-specific repository id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Path of the server inside a monorepo.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subfolder: Option<String>,
}

/// An installable package of a server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// Package registry kind, e.g. `npm`, `pypi`, `oci`.
    #[serde(default)]
    pub registry_type: String,
    /// Package identifier within that registry.
    #[serde(default)]
    pub identifier: String,
    /// Package version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// How clients talk to the installed server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<Transport>,
    /// Remaining package fields (arguments, environment, hashes...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Transport description for a package or remote.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transport {
    /// Transport kind: `stdio`, `streamable-http` or `sse`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Endpoint URL for network transports.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Remaining transport fields (headers...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status assigned by the registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServerStatus {
    /// Current and installable.
    Active,
    /// Still listed but superseded.
    Deprecated,
    /// Removed by the publisher or registry.
    Deleted,
    /// Any status this client does not know about, or none at all.
    #[default]
    #[serde(other)]
    Other,
}

/// Registry-maintained metadata for one server version.
///
/// Only list responses carry it; single-record fetches are unwrapped to a
/// bare [`ServerJson`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistryExtensions {
    /// Lifecycle status.
    #[serde(default)]
    pub status: ServerStatus,
    /// First publication time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    /// Last modification time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Whether this is the newest version of the server.
    #[serde(default)]
    pub is_latest: bool,
}

/// The `_meta` block attached to a server in list responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMeta {
    /// Registry metadata.
    #[serde(
        rename = "io.modelcontextprotocol.registry/official",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub official: Option<RegistryExtensions>,
}

/// A server record together with its registry metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    /// The server record.
    pub server: ServerJson,
    /// Registry metadata.
    #[serde(rename = "_meta", default)]
    pub meta: ResponseMeta,
}

impl ServerResponse {
    /// Registry status, or [`ServerStatus::Other`] when metadata is absent.
    pub fn status(&self) -> ServerStatus {
        self.meta
            .official
            .as_ref()
            .map(|o| o.status)
            .unwrap_or_default()
    }

    /// Check whether the registry marks this version active.
    pub fn is_active(&self) -> bool {
        self.status() == ServerStatus::Active
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Lists
// ─────────────────────────────────────────────────────────────────────────────

/// Pagination metadata of a list response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Cursor of the next page; empty on the last page.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub next_cursor: String,
    /// Number of items in this page, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

/// One page of servers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerListResponse {
    /// Servers in server order.
    #[serde(default)]
    pub servers: Vec<ServerResponse>,
    /// Pagination metadata.
    #[serde(default)]
    pub metadata: Metadata,
}

impl ServerListResponse {
    /// Flatten to bare server records, keeping order.
    pub fn into_servers(self) -> Vec<ServerJson> {
        self.servers.into_iter().map(|s| s.server).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_list_response_decodes_envelope() {
        let body = json!({
            "servers": [{
                "server": {
                    "name": "test-server",
                    "version": "1.0.0",
                    "description": "A test server",
                    "repository": { "url": "https://github.com/example/test-server" }
                },
                "_meta": {
                    "io.modelcontextprotocol.registry/official": {
                        "status": "active",
                        "publishedAt": "2024-01-01T00:00:00Z",
                        "updatedAt": "2024-01-01T00:00:00Z",
                        "isLatest": true
                    }
                }
            }],
            "metadata": { "nextCursor": "next123" }
        });

        let page: ServerListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(page.metadata.next_cursor, "next123");
        assert_eq!(page.servers.len(), 1);

        let entry = &page.servers[0];
        assert_eq!(entry.server.name, "test-server");
        assert_eq!(
            entry.server.repository.as_ref().map(|r| r.url.as_str()),
            Some("https://github.com/example/test-server")
        );
        let official = entry.meta.official.as_ref().unwrap();
        assert_eq!(official.status, ServerStatus::Active);
        assert!(official.is_latest);
        assert_eq!(
            official.updated_at,
            Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(entry.is_active());
    }

    #[test]
    fn test_missing_metadata_is_not_active() {
        let entry: ServerResponse =
            serde_json::from_value(json!({ "server": { "name": "a", "version": "1.0.0" } }))
                .unwrap();
        assert!(entry.meta.official.is_none());
        assert_eq!(entry.status(), ServerStatus::Other);
        assert!(!entry.is_active());
    }

    #[test]
    fn test_unknown_status_maps_to_other() {
        let meta: RegistryExtensions =
            serde_json::from_value(json!({ "status": "quarantined" })).unwrap();
        assert_eq!(meta.status, ServerStatus::Other);

        let meta: RegistryExtensions =
            serde_json::from_value(json!({ "status": "deprecated" })).unwrap();
        assert_eq!(meta.status, ServerStatus::Deprecated);
    }

    #[test]
    fn test_empty_metadata_has_no_cursor() {
        let page: ServerListResponse =
            serde_json::from_value(json!({ "servers": [], "metadata": {} })).unwrap();
        assert!(page.metadata.next_cursor.is_empty());
        assert!(page.into_servers().is_empty());
    }

    #[test]
    fn test_entry_without_name_does_not_fail_page() {
        let page: ServerListResponse = serde_json::from_value(json!({
            "servers": [
                { "server": { "version": "1.0.0" } },
                { "server": { "name": "b", "version": "2.0.0" } }
            ],
            "metadata": {}
        }))
        .unwrap();
        assert_eq!(page.servers.len(), 2);
        assert!(page.servers[0].server.name.is_empty());
        assert_eq!(page.servers[1].server.name, "b");
    }

    #[test]
    fn test_package_keeps_unknown_fields() {
        let pkg: Package = serde_json::from_value(json!({
            "registryType": "npm",
            "identifier": "@example/server",
            "version": "1.2.3",
            "transport": { "type": "stdio" },
            "runtimeHint": "npx"
        }))
        .unwrap();
        assert_eq!(pkg.registry_type, "npm");
        assert_eq!(pkg.transport.as_ref().map(|t| t.kind.as_str()), Some("stdio"));
        assert_eq!(pkg.extra.get("runtimeHint"), Some(&json!("npx")));

        let back = serde_json::to_value(&pkg).unwrap();
        assert_eq!(back["runtimeHint"], json!("npx"));
    }
}
