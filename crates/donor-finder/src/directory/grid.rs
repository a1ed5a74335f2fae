//! State behind the donor grid: browse vs. search mode, loading/error status,
//! and pagination.
//!
//! Every fetch is split into `begin_*` (state transition, returns a
//! [`GridRequest`]), [`GridRequest::execute`] (network), and
//! [`GridController::complete`]. Requests carry a ticket; only the most
//! recently issued ticket may change the state, so a slow response to an
//! older page or query can never overwrite a newer one.

use tracing::{debug, warn};

use super::pagination::PaginationView;
use crate::api::{
    ApiError, DonorApi, Organization, SearchFilters, SearchResponse, SearchResult, SearchType,
};

/// Cards per page in both modes.
pub const ITEMS_PER_PAGE: u32 = 12;

/// Highest page whose browse offset still fits the wire's `u32`.
pub const MAX_PAGE: u32 = u32::MAX / ITEMS_PER_PAGE;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridMode {
    /// Server-paginated organization list. The API exposes no total, so
    /// "more pages" is inferred from a full page.
    Browse,
    /// One search batch sliced client-side; the response total is
    /// authoritative.
    Search,
}

/// One card in the grid, tagged when the data is fetched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GridItem<'a> {
    Organization(&'a Organization),
    SearchHit(&'a SearchResult),
}

impl<'a> GridItem<'a> {
    pub fn organization(&self) -> &'a Organization {
        match self {
            GridItem::Organization(organization) => organization,
            GridItem::SearchHit(hit) => &hit.organization,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GridRequest {
    Browse {
        ticket: u64,
        page: u32,
        limit: u32,
        offset: u32,
    },
    Search {
        ticket: u64,
        filters: SearchFilters,
    },
}

impl GridRequest {
    pub fn ticket(&self) -> u64 {
        match self {
            GridRequest::Browse { ticket, .. } | GridRequest::Search { ticket, .. } => *ticket,
        }
    }

    pub async fn execute<A>(&self, api: &A) -> GridResponse
    where
        A: DonorApi + ?Sized,
    {
        let outcome = match self {
            GridRequest::Browse {
                page,
                limit,
                offset,
                ..
            } => api
                .list_organizations(*limit, *offset)
                .await
                .map(|organizations| GridPayload::Browse {
                    page: *page,
                    organizations,
                }),
            GridRequest::Search { filters, .. } => api
                .search_organizations(filters)
                .await
                .map(GridPayload::Search),
        };

        GridResponse {
            ticket: self.ticket(),
            outcome,
        }
    }
}

#[derive(Debug)]
pub struct GridResponse {
    pub ticket: u64,
    pub outcome: Result<GridPayload, ApiError>,
}

#[derive(Debug)]
pub enum GridPayload {
    Browse {
        page: u32,
        organizations: Vec<Organization>,
    },
    Search(SearchResponse),
}

#[derive(Debug, Clone, Default, PartialEq)]
struct SearchBatch {
    results: Vec<SearchResult>,
    total_results: usize,
    query: String,
    search_type: SearchType,
}

#[derive(Debug, Clone)]
pub struct GridController {
    mode: GridMode,
    filters: SearchFilters,
    page: u32,
    state: LoadState,
    organizations: Vec<Organization>,
    has_more: bool,
    search: SearchBatch,
    latest_ticket: u64,
}

impl Default for GridController {
    fn default() -> Self {
        Self::new()
    }
}

impl GridController {
    pub fn new() -> Self {
        Self {
            mode: GridMode::Browse,
            filters: SearchFilters::defaults(),
            page: 1,
            state: LoadState::Idle,
            organizations: Vec::new(),
            has_more: false,
            search: SearchBatch::default(),
            latest_ticket: 0,
        }
    }

    pub fn mode(&self) -> GridMode {
        self.mode
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    /// Filters of the search currently shown (or the defaults in browse mode).
    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn organizations(&self) -> &[Organization] {
        &self.organizations
    }

    pub fn search_results(&self) -> &[SearchResult] {
        &self.search.results
    }

    pub fn total_results(&self) -> usize {
        self.search.total_results
    }

    /// The query as echoed back by the search endpoint.
    pub fn search_query(&self) -> &str {
        &self.search.query
    }

    pub fn search_type(&self) -> SearchType {
        self.search.search_type
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Initial browse fetch, page 1.
    pub fn begin_load(&mut self) -> GridRequest {
        self.begin_browse(1)
    }

    /// Browse mode fetches the requested page. Search mode only re-slices the
    /// batch already held, so no request is returned.
    pub fn begin_page(&mut self, page: u32) -> Option<GridRequest> {
        let page = page.clamp(1, MAX_PAGE);
        match self.mode {
            GridMode::Browse => Some(self.begin_browse(page)),
            GridMode::Search => {
                self.page = page.min(self.total_pages());
                None
            }
        }
    }

    pub fn begin_next_page(&mut self) -> Option<GridRequest> {
        if !self.pagination().has_next {
            return None;
        }
        self.begin_page(self.page.saturating_add(1))
    }

    pub fn begin_previous_page(&mut self) -> Option<GridRequest> {
        if self.page <= 1 {
            return None;
        }
        self.begin_page(self.page - 1)
    }

    /// Enters search mode. Filters without a query are ignored.
    pub fn begin_search(&mut self, filters: SearchFilters) -> Option<GridRequest> {
        if !filters.has_query() {
            debug!("ignoring search submission without a query");
            return None;
        }

        let mut committed = filters;
        committed.limit = Some(committed.effective_limit());

        self.mode = GridMode::Search;
        self.page = 1;
        self.filters = committed;
        Some(self.begin_search_request())
    }

    /// Leaves search mode, drops every search result, and reloads browse page 1.
    pub fn begin_clear(&mut self) -> GridRequest {
        self.filters = SearchFilters::defaults();
        self.search = SearchBatch::default();
        self.begin_browse(1)
    }

    /// Re-issues the last operation of the current mode.
    pub fn begin_retry(&mut self) -> GridRequest {
        match self.mode {
            GridMode::Browse => self.begin_browse(self.page),
            GridMode::Search => self.begin_search_request(),
        }
    }

    /// Applies a finished request. Returns `false` when the response belongs
    /// to a request that has since been superseded and was discarded.
    pub fn complete(&mut self, response: GridResponse) -> bool {
        if response.ticket != self.latest_ticket {
            debug!(
                ticket = response.ticket,
                latest = self.latest_ticket,
                "discarding stale grid response"
            );
            return false;
        }

        match response.outcome {
            Ok(GridPayload::Browse {
                page,
                organizations,
            }) => {
                self.has_more = organizations.len() == ITEMS_PER_PAGE as usize;
                self.organizations = organizations;
                self.page = page;
                self.state = LoadState::Ready;
                debug!(page, count = self.organizations.len(), "browse page loaded");
            }
            Ok(GridPayload::Search(response)) => {
                self.search = SearchBatch {
                    results: response.results,
                    total_results: response.total_results,
                    query: response.query,
                    search_type: response.search_type,
                };
                self.page = self.page.min(self.total_pages()).max(1);
                self.state = LoadState::Ready;
                debug!(
                    total = self.search.total_results,
                    fetched = self.search.results.len(),
                    "search results loaded"
                );
            }
            Err(err) => {
                warn!(error = %err, mode = ?self.mode, "grid fetch failed");
                self.state = LoadState::Failed(err.to_string());
            }
        }
        true
    }

    pub async fn run<A>(&mut self, api: &A, request: GridRequest) -> bool
    where
        A: DonorApi + ?Sized,
    {
        let response = request.execute(api).await;
        self.complete(response)
    }

    pub async fn load<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        let request = self.begin_load();
        self.run(api, request).await;
    }

    pub async fn go_to_page<A>(&mut self, api: &A, page: u32)
    where
        A: DonorApi + ?Sized,
    {
        if let Some(request) = self.begin_page(page) {
            self.run(api, request).await;
        }
    }

    pub async fn next_page<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        if let Some(request) = self.begin_next_page() {
            self.run(api, request).await;
        }
    }

    pub async fn previous_page<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        if let Some(request) = self.begin_previous_page() {
            self.run(api, request).await;
        }
    }

    pub async fn search<A>(&mut self, api: &A, filters: SearchFilters)
    where
        A: DonorApi + ?Sized,
    {
        if let Some(request) = self.begin_search(filters) {
            self.run(api, request).await;
        }
    }

    pub async fn clear<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        let request = self.begin_clear();
        self.run(api, request).await;
    }

    pub async fn retry<A>(&mut self, api: &A)
    where
        A: DonorApi + ?Sized,
    {
        let request = self.begin_retry();
        self.run(api, request).await;
    }

    pub fn total_pages(&self) -> u32 {
        match self.mode {
            GridMode::Browse => self.page.max(1).saturating_add(u32::from(self.has_more)),
            GridMode::Search => {
                let available = self.search.total_results.min(self.search.results.len());
                let pages = available.div_ceil(ITEMS_PER_PAGE as usize);
                u32::try_from(pages).unwrap_or(u32::MAX).max(1)
            }
        }
    }

    pub fn pagination(&self) -> PaginationView {
        let total = self.total_pages();
        let has_next = match self.mode {
            GridMode::Browse => self.has_more && self.page < MAX_PAGE,
            GridMode::Search => self.page < total,
        };
        PaginationView::new(self.page, total, has_next)
    }

    /// Cards for the current page.
    pub fn items(&self) -> Vec<GridItem<'_>> {
        match self.mode {
            GridMode::Browse => self
                .organizations
                .iter()
                .map(GridItem::Organization)
                .collect(),
            GridMode::Search => {
                let per_page = ITEMS_PER_PAGE as usize;
                let start = (self.page.max(1) as usize - 1).saturating_mul(per_page);
                self.search
                    .results
                    .iter()
                    .skip(start)
                    .take(per_page)
                    .map(GridItem::SearchHit)
                    .collect()
            }
        }
    }

    /// Result-count line shown above search results.
    pub fn summary(&self) -> Option<String> {
        match (self.mode, &self.state) {
            (GridMode::Search, LoadState::Ready) => Some(format!(
                "Found {} results for \"{}\"",
                self.search.total_results, self.search.query
            )),
            _ => None,
        }
    }

    fn begin_browse(&mut self, page: u32) -> GridRequest {
        let page = page.clamp(1, MAX_PAGE);
        self.mode = GridMode::Browse;
        self.page = page;
        self.state = LoadState::Loading;
        let ticket = self.next_ticket();
        GridRequest::Browse {
            ticket,
            page,
            limit: ITEMS_PER_PAGE,
            offset: (page - 1).saturating_mul(ITEMS_PER_PAGE),
        }
    }

    fn begin_search_request(&mut self) -> GridRequest {
        self.state = LoadState::Loading;
        let ticket = self.next_ticket();
        GridRequest::Search {
            ticket,
            filters: self.filters.clone(),
        }
    }

    fn next_ticket(&mut self) -> u64 {
        self.latest_ticket += 1;
        self.latest_ticket
    }
}
