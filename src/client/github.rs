//! GitHub REST client with token rotation.
//!
//! Requests rejected with 403 or 429 are retried with the next token until
//! every token has been tried once. There is no sleep between attempts.

use crate::client::http::{url_with_segments, UpstreamResponse};
use crate::client::rotation::{token_fingerprint, TokenRotator};
use crate::protocol::github::GithubRepo;
use crate::AuditError;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use tracing::{debug, warn};

/// Media type GitHub's v3 API expects.
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// Whether a status means "this token is exhausted, try another".
fn is_retryable(status: u16) -> bool {
    status == 403 || status == 429
}

/// GitHub API client that spreads calls over several tokens.
pub struct GithubClient {
    client: Client,
    api_url: String,
    rotator: TokenRotator,
}

impl GithubClient {
    /// Create a client for the given API base URL.
    pub fn new(client: Client, api_url: impl Into<String>, tokens: Vec<String>) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            rotator: TokenRotator::new(tokens),
        }
    }

    /// GET a URL, rotating tokens on 403/429.
    ///
    /// Makes at most one attempt per token. Any non-retryable status returns
    /// immediately; if every attempt was rejected the last response is
    /// returned.
    ///
    /// # Errors
    /// - `NoCredentials` - no tokens are configured
    /// - `Upstream` - transport failure on any attempt
    pub async fn fetch(&self, url: &str) -> Result<UpstreamResponse, AuditError> {
        let mut last = None;

        for attempt in 1..=self.rotator.len() {
            let Some(token) = self.rotator.next() else {
                break;
            };
            let fingerprint = token_fingerprint(token);
            debug!(url, attempt, token = %fingerprint, "github request");

            let response = self
                .client
                .get(url)
                .header(AUTHORIZATION, format!("token {}", token))
                .header(ACCEPT, GITHUB_ACCEPT)
                .send()
                .await
                .map_err(|e| AuditError::upstream(format!("GitHub request to {} failed", url), e))?;
            let response = UpstreamResponse::from_response(response).await?;

            if !is_retryable(response.status) {
                return Ok(response);
            }
            warn!(
                url,
                attempt,
                status = response.status,
                token = %fingerprint,
                "github token rejected, rotating"
            );
            last = Some(response);
        }

        last.ok_or(AuditError::NoCredentials)
    }

    /// Whether `README.md` exists at the repository root.
    pub async fn readme_exists(&self, repo: &GithubRepo) -> Result<bool, AuditError> {
        let url = url_with_segments(&self.api_url, repo.contents_segments("README.md"))?;
        Ok(self.fetch(url.as_str()).await?.status == 200)
    }

    /// Whether the org/user that owns the repository exists.
    pub async fn owner_exists(&self, repo: &GithubRepo) -> Result<bool, AuditError> {
        let url = url_with_segments(&self.api_url, repo.owner_segments())?;
        Ok(self.fetch(url.as_str()).await?.status == 200)
    }
}
