use super::common::*;
use std::sync::atomic::Ordering;

use crate::api::{SearchFilters, SearchType};
use crate::directory::{
    GridController, GridItem, GridMode, LoadState, ITEMS_PER_PAGE, MAX_PAGE,
};

fn education_search() -> SearchFilters {
    SearchFilters {
        q: Some("education".to_string()),
        subseccd: None,
        search_type: Some(SearchType::Keyword),
        limit: Some(20),
    }
}

fn search_api(hits: u64, total: usize) -> FakeDonorApi {
    FakeDonorApi {
        search_results: (1..=hits)
            .map(|idx| search_hit(500 + idx, &format!("Education Fund {idx}"), 0.9))
            .collect(),
        search_total: Some(total),
        ..FakeDonorApi::default()
    }
}

#[tokio::test]
async fn browse_loads_first_page_with_offset_paging() {
    let api = FakeDonorApi::with_organizations(organizations(30));
    let mut grid = GridController::new();

    grid.load(&api).await;

    assert_eq!(grid.state(), &LoadState::Ready);
    assert_eq!(grid.mode(), GridMode::Browse);
    assert_eq!(grid.items().len(), ITEMS_PER_PAGE as usize);
    assert!(grid.has_more());
    assert_eq!(grid.total_pages(), 2);
    assert_eq!(api.calls(), vec!["list:12:0"]);
}

#[tokio::test]
async fn short_page_ends_browsing() {
    let api = FakeDonorApi::with_organizations(organizations(30));
    let mut grid = GridController::new();

    grid.go_to_page(&api, 3).await;

    assert_eq!(grid.page(), 3);
    assert_eq!(grid.items().len(), 6);
    assert!(!grid.has_more());
    let pagination = grid.pagination();
    assert!(pagination.has_previous);
    assert!(!pagination.has_next);
    assert_eq!(pagination.total_pages, 3);
    assert_eq!(api.calls(), vec!["list:12:24"]);
}

#[tokio::test]
async fn next_page_is_a_no_op_without_more_results() {
    let api = FakeDonorApi::with_organizations(organizations(5));
    let mut grid = GridController::new();
    grid.load(&api).await;

    grid.next_page(&api).await;
    grid.previous_page(&api).await;

    assert_eq!(grid.page(), 1);
    assert_eq!(api.calls(), vec!["list:12:0"]);
}

#[tokio::test]
async fn search_sends_filters_and_echoes_query_in_summary() {
    let api = search_api(3, 3);
    let mut grid = GridController::new();

    grid.search(&api, education_search()).await;

    assert_eq!(grid.mode(), GridMode::Search);
    assert_eq!(
        api.calls(),
        vec!["search:q=education&search_type=keyword&limit=20"]
    );
    assert_eq!(
        grid.summary().as_deref(),
        Some("Found 3 results for \"education\"")
    );
    assert!(grid
        .items()
        .iter()
        .all(|item| matches!(item, GridItem::SearchHit(_))));
}

#[tokio::test]
async fn search_pages_are_sliced_locally() {
    let api = search_api(30, 45);
    let mut grid = GridController::new();
    grid.search(&api, education_search()).await;

    // 45 reported, 20 fetched: only the fetched batch is reachable.
    assert_eq!(grid.search_results().len(), 20);
    assert_eq!(grid.total_pages(), 2);
    assert_eq!(grid.items().len(), 12);

    grid.go_to_page(&api, 2).await;
    assert_eq!(grid.page(), 2);
    assert_eq!(grid.items().len(), 8);
    assert!(!grid.pagination().has_next);

    grid.go_to_page(&api, 9).await;
    assert_eq!(grid.page(), 2, "page clamps to the last slice");
    assert_eq!(api.calls().len(), 1, "paging a search never refetches");
}

#[tokio::test]
async fn blank_query_submission_is_ignored() {
    let api = FakeDonorApi::with_organizations(organizations(3));
    let mut grid = GridController::new();
    grid.load(&api).await;

    assert!(grid
        .begin_search(SearchFilters {
            q: Some("   ".to_string()),
            ..SearchFilters::defaults()
        })
        .is_none());
    assert_eq!(grid.mode(), GridMode::Browse);
    assert_eq!(api.calls(), vec!["list:12:0"]);
}

#[tokio::test]
async fn clearing_search_returns_to_browse_page_one() {
    let mut api = search_api(15, 15);
    api.organizations = organizations(4);
    let mut grid = GridController::new();
    grid.search(&api, education_search()).await;
    grid.go_to_page(&api, 2).await;

    grid.clear(&api).await;

    assert_eq!(grid.mode(), GridMode::Browse);
    assert_eq!(grid.page(), 1);
    assert!(grid.search_results().is_empty());
    assert_eq!(grid.total_results(), 0);
    assert_eq!(grid.filters(), &SearchFilters::defaults());
    assert!(grid.summary().is_none());
    assert_eq!(api.calls().last().map(String::as_str), Some("list:12:0"));
}

#[tokio::test]
async fn failure_surfaces_and_retry_reissues_last_operation() {
    let api = search_api(2, 2);
    api.fail_search.store(true, Ordering::SeqCst);
    let mut grid = GridController::new();

    grid.search(&api, education_search()).await;
    assert_eq!(
        grid.state(),
        &LoadState::Failed("API request failed: Bad Gateway".to_string())
    );
    assert!(grid.summary().is_none());

    api.fail_search.store(false, Ordering::SeqCst);
    grid.retry(&api).await;

    assert_eq!(grid.state(), &LoadState::Ready);
    assert_eq!(grid.search_results().len(), 2);
    assert_eq!(
        api.calls(),
        vec![
            "search:q=education&search_type=keyword&limit=20",
            "search:q=education&search_type=keyword&limit=20",
        ]
    );
}

#[tokio::test]
async fn browse_retry_refetches_the_same_page() {
    let api = FakeDonorApi::with_organizations(organizations(30));
    api.fail_list.store(true, Ordering::SeqCst);
    let mut grid = GridController::new();

    grid.go_to_page(&api, 2).await;
    assert!(matches!(grid.state(), LoadState::Failed(_)));

    api.fail_list.store(false, Ordering::SeqCst);
    grid.retry(&api).await;

    assert_eq!(grid.state(), &LoadState::Ready);
    assert_eq!(api.calls(), vec!["list:12:12", "list:12:12"]);
}

#[tokio::test]
async fn stale_response_is_discarded() {
    let api = FakeDonorApi::with_organizations(organizations(40));
    let mut grid = GridController::new();

    let slow = grid.begin_page(2).expect("browse issues a request");
    let fast = grid.begin_page(3).expect("browse issues a request");
    assert!(fast.ticket() > slow.ticket());

    let fast_response = fast.execute(&api).await;
    let slow_response = slow.execute(&api).await;

    assert!(grid.complete(fast_response));
    assert!(!grid.complete(slow_response));
    assert_eq!(grid.page(), 3);
    assert_eq!(grid.items()[0].organization().name, "Foundation 25");
}

#[tokio::test]
async fn late_browse_response_cannot_replace_search_results() {
    let mut api = search_api(5, 5);
    api.organizations = organizations(12);
    let mut grid = GridController::new();

    let browse = grid.begin_load();
    let search = grid
        .begin_search(education_search())
        .expect("query present");

    let search_response = search.execute(&api).await;
    assert!(grid.complete(search_response));
    let browse_response = browse.execute(&api).await;
    assert!(!grid.complete(browse_response));

    assert_eq!(grid.mode(), GridMode::Search);
    assert_eq!(grid.items().len(), 5);
}

#[tokio::test]
async fn last_addressable_page_stops_paging_forward() {
    let api = FakeDonorApi::with_organizations(organizations(30));
    let mut grid = GridController::new();

    grid.go_to_page(&api, u32::MAX).await;
    assert_eq!(grid.page(), MAX_PAGE);
    assert!(grid.items().is_empty());

    assert!(grid.begin_next_page().is_none());
    assert_eq!(grid.total_pages(), MAX_PAGE);
    assert_eq!(api.calls(), vec!["list:12:4294967280"]);
}
