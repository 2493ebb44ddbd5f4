//! REST client for the GitHub API.

use super::models::{
    AuthenticatedUser, BranchRecord, CommitRecord, CreateRepositoryBody, ErrorBody,
    RepositoryDetailsRecord,
};
use super::pagination::{check_rate_limit, next_link};
use crate::config::MirrorConfig;
use crate::mirror::{
    domain::{
        Affiliation, NewRemoteRepository, RemoteBranch, RemoteRepository, RemoteRepositoryDetails,
        dedup_by_key,
    },
    ports::{RemoteHost, RemoteHostError, RemoteHostResult},
};
use async_trait::async_trait;
use mockable::Clock;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "x-github-api-version";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("repo-mirror/", env!("CARGO_PKG_VERSION"));

/// GitHub REST API client implementing [`RemoteHost`].
///
/// Every listing follows `Link` pagination to the last page. Each response
/// is checked for an exhausted rate limit before its body is read.
#[derive(Debug, Clone)]
pub struct GitHubClient<C>
where
    C: Clock + Send + Sync,
{
    http_client: HttpClient,
    api_url: Url,
    page_size: u8,
    clock: Arc<C>,
}

impl<C> GitHubClient<C>
where
    C: Clock + Send + Sync,
{
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError::Transport`] when the token is not a valid
    /// header value or the HTTP client cannot be built.
    pub fn new(config: &MirrorConfig, clock: Arc<C>) -> RemoteHostResult<Self> {
        let mut authorization =
            HeaderValue::from_str(&format!("Bearer {}", config.access_token()))
                .map_err(RemoteHostError::transport)?;
        authorization.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(ACCEPT, HeaderValue::from_static(MEDIA_TYPE));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        let http_client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout())
            .build()
            .map_err(RemoteHostError::transport)?;

        Ok(Self {
            http_client,
            api_url: config.api_url().clone(),
            page_size: config.page_size(),
            clock,
        })
    }

    /// Returns the API base URL.
    #[must_use]
    pub const fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// Fetches every page of a listing endpoint.
    ///
    /// The first request carries `per_page` and `params`; later requests
    /// follow the `rel="next"` link verbatim. Records carrying a numeric
    /// `id` are de-duplicated, keeping the first occurrence. A record that
    /// does not decode into `T` is logged and dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteHostError`] for transport failures, non-success
    /// statuses, an exhausted rate limit, or a page that is not a JSON
    /// array.
    pub async fn get_all_pages<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, String)],
    ) -> RemoteHostResult<Vec<T>> {
        let mut first_page = self.endpoint(segments)?;
        {
            let mut query = first_page.query_pairs_mut();
            query.append_pair("per_page", &self.page_size.to_string());
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }

        let mut records: Vec<Value> = Vec::new();
        let mut next_page = Some(first_page);
        while let Some(page_url) = next_page.take() {
            debug!(url = %page_url, "fetching page");
            let response = self.execute(self.http_client.get(page_url)).await?;
            next_page = next_link(response.headers());
            let page: Vec<Value> = decode(response).await?;
            records.extend(page);
        }

        let unique = dedup_by_key(records, |record| record.get("id").and_then(Value::as_u64));
        let decoded: Vec<T> = unique
            .into_iter()
            .filter_map(|record| {
                let id = record.get("id").and_then(Value::as_u64);
                serde_json::from_value(record)
                    .inspect_err(|err| {
                        warn!(
                            endpoint = %segments.join("/"),
                            record_id = id,
                            error = %err,
                            "skipping undecodable record"
                        );
                    })
                    .ok()
            })
            .collect();
        Ok(decoded)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> RemoteHostResult<T> {
        let url = self.endpoint(segments)?;
        let response = self.execute(self.http_client.get(url)).await?;
        decode(response).await
    }

    async fn commit_message(&self, full_name: &str, sha: &str) -> RemoteHostResult<Option<String>> {
        let mut segments = vec!["repos"];
        segments.extend(full_name.split('/'));
        segments.extend(["commits", sha]);
        let record: CommitRecord = self.get_json(&segments).await?;
        Ok(record.commit.message)
    }

    async fn execute(&self, request: RequestBuilder) -> RemoteHostResult<Response> {
        let response = request.send().await.map_err(RemoteHostError::transport)?;
        check_rate_limit(response.headers(), self.clock.utc())?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let resource = response.url().path().to_owned();
        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::UNAUTHORIZED => RemoteHostError::Unauthorized,
            StatusCode::NOT_FOUND => RemoteHostError::NotFound(resource),
            _ => RemoteHostError::Status {
                status: status.as_u16(),
                message: serde_json::from_str::<ErrorBody>(&body)
                    .map_or(body, |error| error.message),
            },
        })
    }

    fn endpoint(&self, segments: &[&str]) -> RemoteHostResult<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                RemoteHostError::transport(std::io::Error::other(format!(
                    "API URL cannot carry a path: {}",
                    self.api_url
                )))
            })?
            .pop_if_empty()
            .extend(segments.iter().filter(|segment| !segment.is_empty()));
        Ok(url)
    }
}

fn repository_segments(full_name: &str) -> Vec<&str> {
    std::iter::once("repos").chain(full_name.split('/')).collect()
}

async fn decode<T: DeserializeOwned>(response: Response) -> RemoteHostResult<T> {
    let bytes = response.bytes().await.map_err(RemoteHostError::transport)?;
    serde_json::from_slice(&bytes).map_err(RemoteHostError::decode)
}

#[async_trait]
impl<C> RemoteHost for GitHubClient<C>
where
    C: Clock + Send + Sync,
{
    async fn authenticated_login(&self) -> RemoteHostResult<String> {
        let user: AuthenticatedUser = self.get_json(&["user"]).await?;
        Ok(user.login)
    }

    async fn list_repositories(
        &self,
        affiliations: &[Affiliation],
    ) -> RemoteHostResult<Vec<RemoteRepository>> {
        let affiliation = affiliations
            .iter()
            .map(|value| value.as_str())
            .collect::<Vec<_>>()
            .join(",");
        self.get_all_pages(&["user", "repos"], &[("affiliation", affiliation)])
            .await
    }

    async fn list_starred(&self) -> RemoteHostResult<Vec<RemoteRepository>> {
        self.get_all_pages(&["user", "starred"], &[]).await
    }

    async fn list_user_repositories(
        &self,
        username: &str,
    ) -> RemoteHostResult<Vec<RemoteRepository>> {
        self.get_all_pages(&["users", username, "repos"], &[]).await
    }

    async fn list_branches(&self, full_name: &str) -> RemoteHostResult<Vec<RemoteBranch>> {
        let mut segments = repository_segments(full_name);
        segments.push("branches");
        let records: Vec<BranchRecord> = self.get_all_pages(&segments, &[]).await?;

        let mut branches = Vec::with_capacity(records.len());
        for record in records {
            let mut branch = RemoteBranch::new(record.name, record.commit.sha);
            match self.commit_message(full_name, &branch.commit_sha).await {
                Ok(message) => branch.commit_message = message,
                Err(
                    err @ (RemoteHostError::RateLimited { .. } | RemoteHostError::Unauthorized),
                ) => {
                    return Err(err);
                }
                Err(err) => {
                    warn!(
                        repository = full_name,
                        branch = %branch.name,
                        error = %err,
                        "could not resolve head commit message"
                    );
                }
            }
            branches.push(branch);
        }
        Ok(branches)
    }

    async fn create_repository(
        &self,
        request: &NewRemoteRepository,
    ) -> RemoteHostResult<RemoteRepository> {
        let url = self.endpoint(&["user", "repos"])?;
        let body = CreateRepositoryBody::from(request);
        let response = self
            .execute(self.http_client.post(url).json(&body))
            .await?;
        decode(response).await
    }

    async fn delete_repository(&self, full_name: &str) -> RemoteHostResult<()> {
        let url = self.endpoint(&repository_segments(full_name))?;
        self.execute(self.http_client.delete(url)).await?;
        Ok(())
    }

    async fn repository_details(
        &self,
        full_name: &str,
    ) -> RemoteHostResult<RemoteRepositoryDetails> {
        let record: RepositoryDetailsRecord =
            self.get_json(&repository_segments(full_name)).await?;
        Ok(record.into())
    }
}
