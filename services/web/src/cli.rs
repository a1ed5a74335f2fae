use crate::commands::{run_enrich, run_list, run_search, run_show, ListArgs, SearchArgs};
use crate::infra::{build_api, load_config};
use crate::server;
use crate::session::run_browse;
use clap::{Args, Parser, Subcommand};
use donor_finder::api::Ein;
use donor_finder::error::AppError;
use donor_finder::telemetry::{self, LogSink};

#[derive(Parser, Debug)]
#[command(
    name = "Donor Finder",
    about = "Browse, search and enrich nonprofit donor profiles from the web or the terminal",
    version
)]
struct Cli {
    /// Override the donor API base URL (defaults to DONOR_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP front end (default command)
    Serve(ServeArgs),
    /// Print one page of the donor directory
    List(ListArgs),
    /// Search donors and print one page of results
    Search(SearchArgs),
    /// Print a donor profile with filings and enrichment data
    Show {
        /// Employer Identification Number (digits or NN-NNNNNNN)
        ein: Ein,
    },
    /// Queue an enrichment job for a donor and print the refreshed profile
    Enrich {
        /// Employer Identification Number (digits or NN-NNNNNNN)
        ein: Ein,
    },
    /// Interactive session for paging, searching and opening profiles
    Browse,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));
    let config = load_config(cli.api_url.as_deref())?;

    if let Command::Serve(args) = command {
        return server::run(config, args).await;
    }

    telemetry::init(&config.telemetry, LogSink::Stderr)?;
    let api = build_api(&config.api)?;

    match command {
        Command::List(args) => run_list(api.as_ref(), args).await,
        Command::Search(args) => run_search(api.as_ref(), args).await,
        Command::Show { ein } => run_show(api.as_ref(), ein).await,
        Command::Enrich { ein } => run_enrich(api.as_ref(), ein).await,
        Command::Browse => run_browse(api).await,
        Command::Serve(_) => Ok(()),
    }
}
