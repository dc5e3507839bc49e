use crate::config::Upstream as UpstreamConfig;
use crate::graphql::{GraphQlRequest, GraphQlResponse};
use crate::metrics_defs::{
    UPSTREAM_FETCH_DURATION, UPSTREAM_FETCH_FAILED, UPSTREAM_FETCH_RECORDS, UPSTREAM_PAGE_FETCHED,
};
use crate::types::{Page, ServiceStatusRecord};
use async_trait::async_trait;
use http::StatusCode;
use std::time::Instant;
use url::Url;

#[derive(thiserror::Error, Debug)]
pub enum UpstreamError {
    #[error("GraphQL request failed: {status} {body}")]
    Transport { status: StatusCode, body: String },
    #[error("GraphQL request could not be sent: {0}")]
    Request(#[source] reqwest::Error),
    #[error("GraphQL query returned errors: {0}")]
    Query(serde_json::Value),
    #[error("could not decode GraphQL response: {0}")]
    Decode(#[source] reqwest::Error),
}

impl UpstreamError {
    /// True when the request to the upstream itself failed, as opposed to
    /// the upstream answering with something unusable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            UpstreamError::Transport { .. } | UpstreamError::Request(_)
        )
    }
}

/// Source of service status records for a caller's token.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn service_statuses(
        &self,
        token: &str,
    ) -> Result<Vec<ServiceStatusRecord>, UpstreamError>;
}

/// Client for the upstream GraphQL API. Holds no per-token state, the
/// caller's token is passed through on every request.
pub struct RailwayClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl RailwayClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        RailwayClient {
            client: reqwest::Client::new(),
            endpoint: config.url.clone(),
        }
    }

    /// Walks every page of projects visible to `token` and returns the
    /// flattened records in upstream order. Any failure aborts the whole
    /// traversal and discards the records collected so far.
    pub async fn fetch_service_statuses(
        &self,
        token: &str,
    ) -> Result<Vec<ServiceStatusRecord>, UpstreamError> {
        let started = Instant::now();

        match self.traverse(token).await {
            Ok(records) => {
                shared::histogram!(UPSTREAM_FETCH_DURATION).record(started.elapsed().as_secs_f64());
                shared::histogram!(UPSTREAM_FETCH_RECORDS).record(records.len() as f64);
                Ok(records)
            }
            Err(err) => {
                shared::counter!(UPSTREAM_FETCH_FAILED).increment(1);
                Err(err)
            }
        }
    }

    async fn traverse(&self, token: &str) -> Result<Vec<ServiceStatusRecord>, UpstreamError> {
        let mut records = Vec::new();
        let mut cursor: Option<String> = None;
        let mut page_fetches = 0;

        loop {
            let page = self.fetch_page(token, cursor.as_deref()).await?;
            page_fetches += 1;

            tracing::debug!(
                page = page_fetches,
                projects = page.project_count,
                records = page.records.len(),
                has_next_page = page.has_next_page,
                "Fetched project page"
            );

            // An empty page ends the traversal even if the upstream claims there is more.
            if page.project_count == 0 {
                break;
            }

            let Page {
                records: page_records,
                has_next_page,
                end_cursor,
                ..
            } = page;
            records.extend(page_records);

            match (has_next_page, end_cursor) {
                (true, Some(next)) => cursor = Some(next),
                (true, None) => {
                    tracing::warn!("Upstream reported more pages without a cursor, stopping");
                    break;
                }
                (false, _) => break,
            }
        }

        tracing::info!(
            pages = page_fetches,
            records = records.len(),
            "Fetched service statuses from upstream"
        );

        Ok(records)
    }

    async fn fetch_page(&self, token: &str, after: Option<&str>) -> Result<Page, UpstreamError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(token)
            .json(&GraphQlRequest::projects(after))
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(%status, body = %body, "GraphQL request failed");
            return Err(UpstreamError::Transport { status, body });
        }

        let mut payload = response
            .json::<GraphQlResponse>()
            .await
            .map_err(UpstreamError::Decode)?;

        if let Some(errors) = payload.take_errors() {
            tracing::error!(%errors, "GraphQL query returned errors");
            return Err(UpstreamError::Query(errors));
        }

        shared::counter!(UPSTREAM_PAGE_FETCHED).increment(1);

        Ok(payload.into_page())
    }
}

#[async_trait]
impl StatusSource for RailwayClient {
    async fn service_statuses(
        &self,
        token: &str,
    ) -> Result<Vec<ServiceStatusRecord>, UpstreamError> {
        self.fetch_service_statuses(token).await
    }
}
