//! Servers API.

use chrono::{DateTime, Utc};
use reqwest::Method;

use crate::client::{Client, Response};
use crate::context::Context;
use crate::error::{Error, Result};
use crate::query::{ListOptions, ServerGetOptions, ServerListOptions, append_query};
use crate::resolve;
use crate::types::{ServerJson, ServerListResponse, ServerResponse};

/// Page size used when fetching every page or resolving a name.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

const SERVERS_PATH: &str = "v0.1/servers";

/// Servers API client.
pub struct ServersApi {
    client: Client,
}

impl ServersApi {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    async fn fetch<T>(&self, ctx: &Context, path: &str) -> Result<(T, Response)>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        let request = self.client.new_request::<()>(Method::GET, path, None)?;
        self.client.execute(Some(ctx), request).await
    }

    /// List one page of servers.
    ///
    /// The returned [`Response`] carries the page's next cursor.
    pub async fn list(
        &self,
        ctx: &Context,
        opts: Option<&ServerListOptions>,
    ) -> Result<(ServerListResponse, Response)> {
        let path = append_query(SERVERS_PATH, &opts)?;
        let (page, mut response): (ServerListResponse, Response) = self.fetch(ctx, &path).await?;
        response.next_cursor = page.metadata.next_cursor.clone();
        Ok((page, response))
    }

    /// Get one server by name, at `opts.version` or `latest`.
    ///
    /// Registry metadata is not part of the result.
    pub async fn get(
        &self,
        ctx: &Context,
        name: &str,
        opts: Option<&ServerGetOptions>,
    ) -> Result<(ServerJson, Response)> {
        let version = opts
            .and_then(|o| o.version.as_deref())
            .filter(|v| !v.is_empty())
            .unwrap_or("latest");
        let (entry, response): (ServerResponse, Response) =
            self.fetch(ctx, &version_path(name, version)).await?;
        Ok((entry.server, response))
    }

    /// List every version of a server, in server order.
    pub async fn list_versions_by_name(
        &self,
        ctx: &Context,
        name: &str,
    ) -> Result<(Vec<ServerJson>, Response)> {
        let path = format!("{}/{}/versions", SERVERS_PATH, urlencoding::encode(name));
        let (page, response): (ServerListResponse, Response) = self.fetch(ctx, &path).await?;
        Ok((page.into_servers(), response))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Pagination
    // ─────────────────────────────────────────────────────────────────────────

    /// Fetch every page of servers matching `opts`.
    ///
    /// Starts from the first page regardless of `opts.list.cursor` and
    /// follows next cursors until one is empty. Any failing page fails the
    /// whole call. The returned [`Response`] is the last page's.
    pub async fn list_all(
        &self,
        ctx: &Context,
        opts: Option<&ServerListOptions>,
    ) -> Result<(Vec<ServerJson>, Response)> {
        let mut opts = opts.cloned().unwrap_or_default();
        if opts.list.limit.is_none_or(|l| l == 0) {
            opts.list.limit = Some(DEFAULT_PAGE_SIZE);
        }
        opts.list.cursor = None;
        self.paginate(ctx, opts).await
    }

    /// Fetch every server updated at or after `since`.
    ///
    /// Filtering is done by the registry; results are not re-checked here.
    pub async fn list_by_updated_since(
        &self,
        ctx: &Context,
        since: DateTime<Utc>,
    ) -> Result<(Vec<ServerJson>, Response)> {
        let opts = ServerListOptions {
            list: ListOptions {
                cursor: None,
                limit: Some(DEFAULT_PAGE_SIZE),
            },
            updated_since: Some(since),
            ..Default::default()
        };
        self.paginate(ctx, opts).await
    }

    async fn paginate(
        &self,
        ctx: &Context,
        mut opts: ServerListOptions,
    ) -> Result<(Vec<ServerJson>, Response)> {
        let mut servers = Vec::new();
        let mut page_number = 0usize;

        loop {
            page_number += 1;
            let (page, response) = self.list(ctx, Some(&opts)).await?;
            tracing::debug!(
                page = page_number,
                count = page.servers.len(),
                next_cursor = %response.next_cursor,
                "fetched server page"
            );
            servers.extend(page.into_servers());

            if response.next_cursor.is_empty() {
                return Ok((servers, response));
            }
            opts.list.cursor = Some(response.next_cursor.clone());
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Name resolution
    // ─────────────────────────────────────────────────────────────────────────

    /// Search by name and keep the exact matches, with their metadata.
    async fn search_exact(
        &self,
        ctx: &Context,
        name: &str,
        version: Option<&str>,
    ) -> Result<(Vec<ServerResponse>, Response)> {
        let opts = ServerListOptions {
            list: ListOptions {
                cursor: None,
                limit: Some(DEFAULT_PAGE_SIZE),
            },
            search: Some(name.to_string()),
            version: version.map(str::to_string),
            ..Default::default()
        };
        let (page, response) = self.list(ctx, Some(&opts)).await?;
        Ok((resolve::exact_matches(page.servers, name), response))
    }

    /// All versions whose name is exactly `name`, in server order.
    ///
    /// Only the first [`DEFAULT_PAGE_SIZE`] search results are considered.
    pub async fn list_by_name(
        &self,
        ctx: &Context,
        name: &str,
    ) -> Result<(Vec<ServerJson>, Response)> {
        let (entries, response) = self.search_exact(ctx, name, None).await?;
        Ok((entries.into_iter().map(|e| e.server).collect(), response))
    }

    /// The version the registry reports as latest for exactly `name`.
    pub async fn get_by_name_latest(
        &self,
        ctx: &Context,
        name: &str,
    ) -> Result<(Option<ServerJson>, Response)> {
        let (entries, response) = self.search_exact(ctx, name, Some("latest")).await?;
        Ok((entries.into_iter().next().map(|e| e.server), response))
    }

    /// One specific version of `name`, or `None` if the registry answers 404.
    ///
    /// An unknown name and an unknown version both yield `None`. Other
    /// failures are returned as errors.
    pub async fn get_by_name_exact_version(
        &self,
        ctx: &Context,
        name: &str,
        version: &str,
    ) -> Result<(Option<ServerJson>, Response)> {
        match self
            .fetch::<ServerResponse>(ctx, &version_path(name, version))
            .await
        {
            Ok((entry, response)) => Ok((Some(entry.server), response)),
            Err(Error::Api(e)) if e.status() == 404 => {
                tracing::debug!(name, version, "server version not found");
                Ok((None, e.response))
            }
            Err(e) => Err(e),
        }
    }

    /// The highest active semantic version of exactly `name`.
    pub async fn get_by_name_latest_active_version(
        &self,
        ctx: &Context,
        name: &str,
    ) -> Result<(Option<ServerJson>, Response)> {
        let (entries, response) = self.search_exact(ctx, name, None).await?;
        Ok((resolve::latest_active(entries), response))
    }
}

fn version_path(name: &str, version: &str) -> String {
    format!(
        "{}/{}/versions/{}",
        SERVERS_PATH,
        urlencoding::encode(name),
        urlencoding::encode(version)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_path_escapes_segments() {
        assert_eq!(
            version_path("org.example/my-server", "1.5.0"),
            "v0.1/servers/org.example%2Fmy-server/versions/1.5.0"
        );
        assert_eq!(
            version_path("test/server", "latest"),
            "v0.1/servers/test%2Fserver/versions/latest"
        );
    }
}
