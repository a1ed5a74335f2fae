use async_trait::async_trait;
use axum::response::Response;
use donor_finder::api::{
    ApiError, DonorApi, Ein, EnrichmentStatus, Filing, Organization, OrganizationEnrichment,
    SearchFilters, SearchResponse, SearchResult,
};
use std::collections::HashMap;
use std::sync::Mutex;

fn organization(ein: u64, name: &str) -> Organization {
    Organization {
        ein: Ein(ein),
        strein: None,
        name: name.to_string(),
        sub_name: None,
        address: "320 E 43rd St".to_string(),
        city: "New York".to_string(),
        state: "NY".to_string(),
        zipcode: "10017".to_string(),
        subseccd: Some(3),
        ntee_code: "T20".to_string(),
        guidestar_url: None,
        nccs_url: None,
        id: ein as i64,
        searchable_text: name.to_lowercase(),
        created_at: "2024-01-05T00:00:00Z".to_string(),
        updated_at: "2024-01-05T00:00:00Z".to_string(),
        irs_updated: None,
        filings: Vec::new(),
    }
}

fn filing(id: i64, year: i32, revenue: &str) -> Filing {
    Filing {
        ein: Ein(131684331),
        tax_prd: i64::from(year) * 100 + 12,
        tax_prd_yr: year,
        formtype: 2,
        pdf_url: None,
        totrevenue: revenue.to_string(),
        totfuncexpns: "900000".to_string(),
        totassetsend: "16000000000".to_string(),
        totliabend: "0".to_string(),
        pct_compnsatncurrofcr: "0".to_string(),
        id,
        organization_id: 1,
        created_at: String::new(),
        updated_at: None,
        irs_updated: "2024-03-01".to_string(),
    }
}

/// Fixed in-memory donor service for exercising the binary's surfaces.
pub(crate) struct StaticDonorApi {
    organizations: Vec<Organization>,
    enrichments: Mutex<HashMap<Ein, OrganizationEnrichment>>,
    calls: Mutex<Vec<String>>,
}

impl StaticDonorApi {
    pub(crate) fn sample() -> Self {
        let mut ford = organization(131684331, "Ford Foundation");
        ford.filings = vec![filing(1, 2021, "1000000"), filing(2, 2022, "1500000")];
        let mut organizations = vec![ford];
        organizations.extend((1..=14).map(|idx| organization(idx, &format!("Community Trust {idx}"))));

        Self {
            organizations,
            enrichments: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl DonorApi for StaticDonorApi {
    async fn list_organizations(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Organization>, ApiError> {
        self.record(format!("list:{limit}:{offset}"));
        Ok(self
            .organizations
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn get_organization(&self, ein: Ein) -> Result<Organization, ApiError> {
        self.record(format!("get:{ein}"));
        self.organizations
            .iter()
            .find(|organization| organization.ein == ein)
            .cloned()
            .ok_or_else(|| ApiError::Status {
                status: 404,
                status_text: "Not Found".to_string(),
            })
    }

    async fn get_organization_enrichment(
        &self,
        ein: Ein,
    ) -> Result<Option<OrganizationEnrichment>, ApiError> {
        Ok(self
            .enrichments
            .lock()
            .expect("enrichment mutex poisoned")
            .get(&ein)
            .cloned())
    }

    async fn search_organizations(
        &self,
        filters: &SearchFilters,
    ) -> Result<SearchResponse, ApiError> {
        self.record(format!("search:{}", filters.api_query_string()));
        let needle = filters.query_text().unwrap_or_default().to_lowercase();
        let results: Vec<SearchResult> = self
            .organizations
            .iter()
            .filter(|organization| organization.searchable_text.contains(&needle))
            .take(filters.effective_limit() as usize)
            .map(|organization| SearchResult {
                organization: organization.clone(),
                relevance_score: 0.8,
                match_type: "keyword".to_string(),
            })
            .collect();
        Ok(SearchResponse {
            total_results: results.len(),
            results,
            query: filters.q.clone().unwrap_or_default(),
            search_type: filters.search_type.unwrap_or_default(),
        })
    }

    async fn trigger_enrichment(&self, ein: Ein) -> Result<(), ApiError> {
        self.record(format!("trigger:{ein}"));
        self.enrichments
            .lock()
            .expect("enrichment mutex poisoned")
            .insert(
                ein,
                OrganizationEnrichment {
                    ein: Some(ein),
                    status: EnrichmentStatus::Pending,
                    company: None,
                    contacts: Vec::new(),
                    news: Vec::new(),
                    contact_info: Vec::new(),
                    last_enriched_at: None,
                },
            );
        Ok(())
    }
}

pub(crate) async fn read_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
