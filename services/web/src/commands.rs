//! One-shot terminal commands. Unlike the interactive session, an API failure
//! here ends the command with an error.

use crate::terminal::{render_detail, render_grid};
use clap::Args;
use donor_finder::api::{DonorApi, Ein, SearchFilters, SearchType, DEFAULT_SEARCH_LIMIT};
use donor_finder::directory::{
    request_enrichment, DetailController, DetailRequest, DetailResponse, GridController,
    GridRequest, GridResponse,
};
use donor_finder::error::AppError;

#[derive(Args, Debug)]
pub(crate) struct ListArgs {
    /// Page of the directory to print (12 donors per page)
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Free-text query
    pub(crate) query: String,
    /// Ranking strategy: semantic, keyword or hybrid
    #[arg(long, default_value_t = SearchType::Semantic)]
    pub(crate) search_type: SearchType,
    /// Number of results to fetch
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT)]
    pub(crate) limit: u32,
    /// Page of the fetched results to print
    #[arg(long, default_value_t = 1)]
    pub(crate) page: u32,
}

impl SearchArgs {
    fn filters(&self) -> SearchFilters {
        SearchFilters {
            q: Some(self.query.clone()),
            subseccd: None,
            search_type: Some(self.search_type),
            limit: Some(self.limit),
        }
    }
}

async fn settle_grid<A>(
    grid: &mut GridController,
    api: &A,
    request: GridRequest,
) -> Result<(), AppError>
where
    A: DonorApi + ?Sized,
{
    let GridResponse { ticket, outcome } = request.execute(api).await;
    let payload = outcome?;
    grid.complete(GridResponse {
        ticket,
        outcome: Ok(payload),
    });
    Ok(())
}

async fn settle_detail<A>(
    controller: &mut DetailController,
    api: &A,
    request: DetailRequest,
) -> Result<(), AppError>
where
    A: DonorApi + ?Sized,
{
    let DetailResponse { ticket, outcome } = request.execute(api).await;
    let profile = outcome?;
    controller.complete(DetailResponse {
        ticket,
        outcome: Ok(profile),
    });
    Ok(())
}

pub(crate) async fn run_list<A>(api: &A, args: ListArgs) -> Result<(), AppError>
where
    A: DonorApi + ?Sized,
{
    let mut grid = GridController::new();
    if let Some(request) = grid.begin_page(args.page) {
        settle_grid(&mut grid, api, request).await?;
    }
    print!("{}", render_grid(&grid));
    Ok(())
}

pub(crate) async fn run_search<A>(api: &A, args: SearchArgs) -> Result<(), AppError>
where
    A: DonorApi + ?Sized,
{
    let mut grid = GridController::new();
    let Some(request) = grid.begin_search(args.filters()) else {
        println!("Enter a search query.");
        return Ok(());
    };
    settle_grid(&mut grid, api, request).await?;
    grid.begin_page(args.page);
    print!("{}", render_grid(&grid));
    Ok(())
}

pub(crate) async fn run_show<A>(api: &A, ein: Ein) -> Result<(), AppError>
where
    A: DonorApi + ?Sized,
{
    let mut controller = DetailController::new(ein);
    let request = controller.begin_load();
    settle_detail(&mut controller, api, request).await?;
    print!("{}", render_detail(&controller));
    Ok(())
}

pub(crate) async fn run_enrich<A>(api: &A, ein: Ein) -> Result<(), AppError>
where
    A: DonorApi + ?Sized,
{
    request_enrichment(api, ein).await?;
    println!("Enrichment requested for EIN {ein}.\n");
    run_show(api, ein).await
}
