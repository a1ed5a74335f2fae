use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::enrichment::{OrganizationEnrichment, RawOrganizationEnrichment};
use super::error::ApiError;
use super::types::{
    Ein, EnrichmentRequest, Organization, SearchFilters, SearchResponse,
};
use super::DonorApi;
use crate::config::ApiConfig;

/// `reqwest`-backed client for the donor API. Cheap to clone; clones share one
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpDonorApi {
    http: Client,
    base_url: String,
}

impl HttpDonorApi {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                path: config.base_url.clone(),
                source,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    /// Sends the request and turns any non-2xx answer into [`ApiError::Status`].
    async fn send(&self, path: &str, builder: RequestBuilder) -> Result<Response, ApiError> {
        let response = builder.send().await.map_err(|source| ApiError::Transport {
            path: path.to_string(),
            source,
        })?;

        let status = response.status();
        debug!(%path, status = status.as_u16(), "donor api responded");

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self.send(path, self.request(Method::GET, path)).await?;
        response.json::<T>().await.map_err(|source| ApiError::Decode {
            path: path.to_string(),
            source,
        })
    }
}

#[async_trait]
impl DonorApi for HttpDonorApi {
    async fn list_organizations(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Organization>, ApiError> {
        self.get_json(&format!("/organizations/?limit={limit}&offset={offset}"))
            .await
    }

    async fn get_organization(&self, ein: Ein) -> Result<Organization, ApiError> {
        self.get_json(&format!("/organizations/{ein}")).await
    }

    async fn get_organization_enrichment(
        &self,
        ein: Ein,
    ) -> Result<Option<OrganizationEnrichment>, ApiError> {
        match self
            .get_json::<RawOrganizationEnrichment>(&format!("/enrichment/organization/{ein}"))
            .await
        {
            Ok(raw) => Ok(Some(raw.sanitize())),
            Err(err) if err.is_not_found() => {
                debug!(%ein, "organization has not been enriched yet");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    async fn search_organizations(
        &self,
        filters: &SearchFilters,
    ) -> Result<SearchResponse, ApiError> {
        let query = filters.api_query_string();
        let path = if query.is_empty() {
            "/semantic-search/".to_string()
        } else {
            format!("/semantic-search/?{query}")
        };
        self.get_json(&path).await
    }

    async fn trigger_enrichment(&self, ein: Ein) -> Result<(), ApiError> {
        let path = format!("/enrichment/organization/{ein}");
        let builder = self
            .request(Method::POST, &path)
            .json(&EnrichmentRequest::standard());
        self.send(&path, builder).await?;
        Ok(())
    }
}
