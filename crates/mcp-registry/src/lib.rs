//! HTTP client SDK for the MCP server registry.
//!
//! This crate provides a typed, read-only client for discovering servers in
//! a registry that speaks the `v0.1` API.
//!
//! # Example
//!
//! ```no_run
//! use mcp_registry::{Client, Context, Result};
//!
//! # async fn example() -> Result<()> {
//! let client = Client::builder()
//!     .base_url("https://registry.modelcontextprotocol.io")
//!     .build()?;
//! let ctx = Context::background();
//!
//! // Every page of servers
//! let (servers, response) = client.servers().list_all(&ctx, None).await?;
//! println!("{} servers, {} requests left", servers.len(), response.rate.remaining);
//!
//! // Exactly one name, resolved to its newest active version
//! let (latest, _) = client
//!     .servers()
//!     .get_by_name_latest_active_version(&ctx, "ai.waystation/gmail")
//!     .await?;
//! if let Some(server) = latest {
//!     println!("{} {}", server.name, server.version);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # API Coverage
//!
//! - **Listing**: single pages, every page, servers updated since a time
//! - **Lookup**: by name and version, or all versions of a name
//! - **Resolution**: exact-name search, registry latest, latest active by
//!   semantic version
//! - **Rate limits**: tracked per request path from response headers
//!
//! # Errors
//!
//! Every failure is an [`Error`]: configuration problems, API errors,
//! rate limiting, undecodable bodies, and transport failures (including a
//! canceled or expired [`Context`]).

pub mod api;
pub mod client;
pub mod config;
pub mod context;
pub mod error;
pub mod query;
pub mod rate;
pub mod resolve;
pub mod semver;
pub mod types;

pub use api::{DEFAULT_PAGE_SIZE, ServersApi};
pub use client::{Client, ClientBuilder, DEFAULT_BASE_URL, Response, parse_base_url};
pub use context::Context;
pub use error::{ApiError, Error, ErrorKind, FieldError, RateLimitError, Result, TransportError};
pub use query::{ListOptions, QueryParams, ServerGetOptions, ServerListOptions, append_query};
pub use rate::Rate;
pub use types::*;

// Re-exported so callers can build contexts from their own tokens.
pub use tokio_util::sync::CancellationToken;
