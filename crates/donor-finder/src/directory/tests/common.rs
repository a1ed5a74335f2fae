use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use tokio::sync::Notify;

use crate::api::{
    ApiError, DonorApi, Ein, EnrichmentStatus, Filing, Organization, OrganizationEnrichment,
    SearchFilters, SearchResponse, SearchResult,
};

pub(super) fn organization(ein: u64, name: &str) -> Organization {
    Organization {
        ein: Ein(ein),
        strein: None,
        name: name.to_string(),
        sub_name: None,
        address: "1 Main St".to_string(),
        city: "Springfield".to_string(),
        state: "IL".to_string(),
        zipcode: "62701".to_string(),
        subseccd: Some(3),
        ntee_code: "B20".to_string(),
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

pub(super) fn filing(id: i64, year: i32, revenue: &str) -> Filing {
    Filing {
        ein: Ein(1),
        tax_prd: i64::from(year) * 100 + 12,
        tax_prd_yr: year,
        formtype: 2,
        pdf_url: None,
        totrevenue: revenue.to_string(),
        totfuncexpns: "1000".to_string(),
        totassetsend: "2500000".to_string(),
        totliabend: "0".to_string(),
        pct_compnsatncurrofcr: "0".to_string(),
        id,
        organization_id: 1,
        created_at: String::new(),
        updated_at: None,
        irs_updated: "2024-03-01".to_string(),
    }
}

pub(super) fn organizations(count: u64) -> Vec<Organization> {
    (1..=count)
        .map(|idx| organization(100 + idx, &format!("Foundation {idx}")))
        .collect()
}

pub(super) fn search_hit(ein: u64, name: &str, score: f64) -> SearchResult {
    SearchResult {
        organization: organization(ein, name),
        relevance_score: score,
        match_type: "semantic".to_string(),
    }
}

pub(super) fn enrichment(ein: u64) -> OrganizationEnrichment {
    OrganizationEnrichment {
        ein: Some(Ein(ein)),
        status: EnrichmentStatus::Completed,
        company: None,
        contacts: Vec::new(),
        news: Vec::new(),
        contact_info: Vec::new(),
        last_enriched_at: None,
    }
}

fn status_error(status: u16, status_text: &str) -> ApiError {
    ApiError::Status {
        status,
        status_text: status_text.to_string(),
    }
}

/// In-memory stand-in for the donor service. Every call is recorded as a
/// short string such as `list:12:0` or `search:q=arts&limit=20`.
#[derive(Default)]
pub(super) struct FakeDonorApi {
    pub organizations: Vec<Organization>,
    pub search_results: Vec<SearchResult>,
    pub search_total: Option<usize>,
    pub enrichments: Mutex<HashMap<Ein, OrganizationEnrichment>>,
    pub fail_list: AtomicBool,
    pub fail_search: AtomicBool,
    pub fail_get: AtomicBool,
    pub fail_enrichment_fetch: AtomicBool,
    pub fail_trigger: AtomicBool,
    /// When set, triggers wait here after signalling `trigger_started`.
    pub hold_trigger: Option<Arc<Notify>>,
    pub trigger_started: Notify,
    pub calls: Mutex<Vec<String>>,
}

impl FakeDonorApi {
    pub(super) fn with_organizations(organizations: Vec<Organization>) -> Self {
        Self {
            organizations,
            ..Self::default()
        }
    }

    pub(super) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls mutex poisoned").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls mutex poisoned").push(call);
    }
}

#[async_trait]
impl DonorApi for FakeDonorApi {
    async fn list_organizations(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Organization>, ApiError> {
        self.record(format!("list:{limit}:{offset}"));
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(status_error(503, "Service Unavailable"));
        }
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
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(status_error(500, "Internal Server Error"));
        }
        self.organizations
            .iter()
            .find(|organization| organization.ein == ein)
            .cloned()
            .ok_or_else(|| status_error(404, "Not Found"))
    }

    async fn get_organization_enrichment(
        &self,
        ein: Ein,
    ) -> Result<Option<OrganizationEnrichment>, ApiError> {
        self.record(format!("enrichment:{ein}"));
        if self.fail_enrichment_fetch.load(Ordering::SeqCst) {
            return Err(status_error(500, "Internal Server Error"));
        }
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
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(status_error(502, "Bad Gateway"));
        }
        let results: Vec<SearchResult> = self
            .search_results
            .iter()
            .take(filters.effective_limit() as usize)
            .cloned()
            .collect();
        Ok(SearchResponse {
            total_results: self.search_total.unwrap_or(results.len()),
            results,
            query: filters.q.clone().unwrap_or_default(),
            search_type: filters.search_type.unwrap_or_default(),
        })
    }

    async fn trigger_enrichment(&self, ein: Ein) -> Result<(), ApiError> {
        self.record(format!("trigger:{ein}"));
        self.trigger_started.notify_one();
        if let Some(gate) = &self.hold_trigger {
            gate.notified().await;
        }
        if self.fail_trigger.load(Ordering::SeqCst) {
            return Err(status_error(500, "Internal Server Error"));
        }
        self.enrichments
            .lock()
            .expect("enrichment mutex poisoned")
            .insert(ein, enrichment(ein.0));
        Ok(())
    }
}

pub(super) async fn read_text_body(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    String::from_utf8(body.to_vec()).expect("utf-8 body")
}
