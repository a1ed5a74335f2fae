//! Typed access to the remote donor API.

mod client;
pub mod enrichment;
mod error;
pub mod types;

use async_trait::async_trait;

pub use client::HttpDonorApi;
pub use enrichment::{
    CompanyProfile, ContactInfo, EnrichedContact, EnrichmentStatus, NewsItem,
    OrganizationEnrichment,
};
pub use error::ApiError;
pub use types::{
    Ein, EnrichmentRequest, Filing, InvalidEin, Organization, SearchFilters, SearchResponse,
    SearchResult, SearchType, DEFAULT_SEARCH_LIMIT,
};

/// Operations the directory needs from the remote service.
#[async_trait]
pub trait DonorApi: Send + Sync {
    async fn list_organizations(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Organization>, ApiError>;

    /// Organization with its filings. A missing EIN surfaces as a 404
    /// [`ApiError::Status`].
    async fn get_organization(&self, ein: Ein) -> Result<Organization, ApiError>;

    /// `Ok(None)` when the organization has not been enriched yet.
    async fn get_organization_enrichment(
        &self,
        ein: Ein,
    ) -> Result<Option<OrganizationEnrichment>, ApiError>;

    async fn search_organizations(
        &self,
        filters: &SearchFilters,
    ) -> Result<SearchResponse, ApiError>;

    /// Queue an enrichment job. The refreshed record is not returned; callers
    /// fetch it again afterwards.
    async fn trigger_enrichment(&self, ein: Ein) -> Result<(), ApiError>;
}
