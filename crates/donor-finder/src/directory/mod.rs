//! View-state controllers for the donor directory and the routes that serve
//! them.

pub mod detail;
pub mod grid;
pub mod pagination;
pub mod router;
pub mod search;

#[cfg(test)]
mod tests;

pub use detail::{
    fetch_profile, request_enrichment, DetailController, DetailRequest, DetailResponse,
    DetailState, DonorProfile, EnrichmentClaim, EnrichmentTracker,
};
pub use grid::{
    GridController, GridItem, GridMode, GridPayload, GridRequest, GridResponse, LoadState,
    ITEMS_PER_PAGE, MAX_PAGE,
};
pub use pagination::{page_window, PaginationView, PAGE_WINDOW};
pub use router::{directory_router, GridQuery};
pub use search::{
    subsection_label, FilterChip, SearchCommand, SearchControls, SubsectionOption,
    EXAMPLE_QUERIES, SUBSECTION_OPTIONS,
};
