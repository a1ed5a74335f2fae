//! Line-oriented interactive browser over the same controllers the web pages
//! use. Failures stay on screen with a retry hint instead of ending the
//! session.

use crate::terminal::{render_detail, render_draft, render_grid};
use donor_finder::api::{ApiError, DonorApi, Ein, SearchType};
use donor_finder::directory::{
    request_enrichment, DetailController, EnrichmentClaim, EnrichmentTracker, FilterChip,
    GridController, SearchCommand, SearchControls, EXAMPLE_QUERIES,
};
use donor_finder::error::AppError;
use std::str::FromStr;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

const PROMPT: &str = "> ";

const HELP: &str = "\
Commands:
  next | prev | page N        move through the directory or the results
  search [TEXT]               search for TEXT, or submit the current draft
  type semantic|keyword|hybrid
  subsection N | subsection all
  limit N                     number of results a search fetches
  example N                   run one of the example queries
  unset query|subsection      drop a filter from the draft
  clear                       leave search and return to the directory
  retry                       repeat the last failed request
  open EIN                    show a donor profile
  enrich                      request enrichment for the open profile
  back                        close the profile
  help | quit
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SessionCommand {
    Next,
    Previous,
    Page(u32),
    Search(Option<String>),
    SearchType(SearchType),
    Subsection(Option<i32>),
    Limit(u32),
    Example(usize),
    UnsetQuery,
    UnsetSubsection,
    Clear,
    Retry,
    Open(Ein),
    Enrich,
    Back,
    Help,
    Quit,
}

fn number<T: FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid {what}", raw.trim()))
}

impl FromStr for SessionCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map(|(word, rest)| (word, rest.trim()))
            .unwrap_or((line, ""));

        let command = match (word.to_ascii_lowercase().as_str(), rest) {
            ("next" | "n", "") => Self::Next,
            ("prev" | "p", "") => Self::Previous,
            ("page", page) if !page.is_empty() => Self::Page(number(page, "page number")?),
            ("search" | "s", "") => Self::Search(None),
            ("search" | "s", text) => Self::Search(Some(text.to_string())),
            ("type", mode) if !mode.is_empty() => Self::SearchType(mode.parse()?),
            ("subsection", "all") => Self::Subsection(None),
            ("subsection", code) if !code.is_empty() => {
                Self::Subsection(Some(number(code, "subsection code")?))
            }
            ("limit", limit) if !limit.is_empty() => Self::Limit(number(limit, "limit")?),
            ("example", index) if !index.is_empty() => {
                let index: usize = number(index, "example number")?;
                if index == 0 || index > EXAMPLE_QUERIES.len() {
                    return Err(format!(
                        "choose an example between 1 and {}",
                        EXAMPLE_QUERIES.len()
                    ));
                }
                Self::Example(index - 1)
            }
            ("unset", "query") => Self::UnsetQuery,
            ("unset", "subsection") => Self::UnsetSubsection,
            ("clear", "") => Self::Clear,
            ("retry", "") => Self::Retry,
            ("open", ein) if !ein.is_empty() => {
                Self::Open(ein.parse().map_err(|err| format!("{err}"))?)
            }
            ("enrich", "") => Self::Enrich,
            ("back", "") => Self::Back,
            ("help" | "?", "") => Self::Help,
            ("quit" | "exit" | "q", "") => Self::Quit,
            _ => return Err(format!("unknown command '{line}', type `help` for a list")),
        };
        Ok(command)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Flow {
    Continue(String),
    Quit,
}

/// A background enrichment trigger that has settled. The claim keeps the EIN
/// marked as in flight until the session has applied the result.
#[derive(Debug)]
pub(crate) struct EnrichmentFinished {
    claim: EnrichmentClaim,
    result: Result<(), ApiError>,
}

pub(crate) struct BrowseSession {
    api: Arc<dyn DonorApi>,
    grid: GridController,
    controls: SearchControls,
    detail: Option<DetailController>,
    enrichments: EnrichmentTracker,
    finished: mpsc::UnboundedSender<EnrichmentFinished>,
}

impl BrowseSession {
    pub(crate) fn new(
        api: Arc<dyn DonorApi>,
        finished: mpsc::UnboundedSender<EnrichmentFinished>,
    ) -> Self {
        Self {
            api,
            grid: GridController::new(),
            controls: SearchControls::new(),
            detail: None,
            enrichments: EnrichmentTracker::new(),
            finished,
        }
    }

    pub(crate) async fn start(&mut self) -> String {
        self.grid.load(self.api.as_ref()).await;
        render_grid(&self.grid)
    }

    pub(crate) async fn handle(&mut self, command: SessionCommand) -> Flow {
        let output = match command {
            SessionCommand::Next => {
                self.detail = None;
                self.grid.next_page(self.api.as_ref()).await;
                render_grid(&self.grid)
            }
            SessionCommand::Previous => {
                self.detail = None;
                self.grid.previous_page(self.api.as_ref()).await;
                render_grid(&self.grid)
            }
            SessionCommand::Page(page) => {
                self.detail = None;
                self.grid.go_to_page(self.api.as_ref(), page).await;
                render_grid(&self.grid)
            }
            SessionCommand::Search(text) => {
                if let Some(text) = text {
                    self.controls.set_query(text);
                }
                let submitted = self.controls.submit();
                self.apply(submitted).await
            }
            SessionCommand::SearchType(search_type) => {
                self.controls.set_search_type(search_type);
                render_draft(&self.controls)
            }
            SessionCommand::Subsection(code) => {
                self.controls.set_subsection(code);
                render_draft(&self.controls)
            }
            SessionCommand::Limit(limit) => {
                self.controls.set_limit(limit);
                render_draft(&self.controls)
            }
            SessionCommand::Example(index) => {
                let chosen = self.controls.choose_example(index);
                self.apply(chosen).await
            }
            SessionCommand::UnsetQuery => {
                self.remove_chip(|chip| matches!(chip, FilterChip::Query(_)));
                render_draft(&self.controls)
            }
            SessionCommand::UnsetSubsection => {
                self.remove_chip(|chip| matches!(chip, FilterChip::Subsection(_)));
                render_draft(&self.controls)
            }
            SessionCommand::Clear => {
                let cleared = self.controls.clear_all();
                self.apply(Some(cleared)).await
            }
            SessionCommand::Retry => match self.detail.as_mut() {
                Some(detail) => {
                    detail.retry(self.api.as_ref()).await;
                    render_detail(detail)
                }
                None => {
                    self.grid.retry(self.api.as_ref()).await;
                    render_grid(&self.grid)
                }
            },
            SessionCommand::Open(ein) => {
                let mut detail = DetailController::new(ein);
                if self.enrichments.is_running(ein) {
                    detail.begin_enrichment();
                }
                detail.load(self.api.as_ref()).await;
                let output = render_detail(&detail);
                self.detail = Some(detail);
                output
            }
            SessionCommand::Enrich => self.enrich(),
            SessionCommand::Back => {
                self.detail = None;
                self.grid.retry(self.api.as_ref()).await;
                render_grid(&self.grid)
            }
            SessionCommand::Help => HELP.to_string(),
            SessionCommand::Quit => return Flow::Quit,
        };
        Flow::Continue(output)
    }

    async fn apply(&mut self, command: Option<SearchCommand>) -> String {
        self.detail = None;
        match command {
            Some(SearchCommand::Search(filters)) => {
                self.grid.search(self.api.as_ref(), filters).await
            }
            Some(SearchCommand::Clear) => self.grid.clear(self.api.as_ref()).await,
            None => return "Enter a search query first.\n".to_string(),
        }
        render_grid(&self.grid)
    }

    fn remove_chip(&mut self, wanted: impl Fn(&FilterChip) -> bool) {
        if let Some(chip) = self.controls.active_chips().into_iter().find(|chip| wanted(chip)) {
            self.controls.remove_chip(&chip);
        }
    }

    /// Starts an enrichment trigger in the background. The profile shows
    /// "Enriching..." until [`BrowseSession::finish_enrichment`] applies the
    /// result.
    fn enrich(&mut self) -> String {
        let Some(detail) = self.detail.as_mut() else {
            return "Open a donor with `open EIN` before enriching.\n".to_string();
        };
        let ein = detail.ein();
        let Some(claim) = self.enrichments.claim(ein) else {
            return "Enrichment is already in progress.\n".to_string();
        };
        detail.begin_enrichment();

        let api = Arc::clone(&self.api);
        let finished = self.finished.clone();
        tokio::spawn(async move {
            let result = request_enrichment(api.as_ref(), ein).await;
            if finished.send(EnrichmentFinished { claim, result }).is_err() {
                debug!(%ein, "session closed before enrichment finished");
            }
        });

        format!(
            "Enrichment requested for EIN {ein}.\n\n{}",
            render_detail(detail)
        )
    }

    pub(crate) async fn finish_enrichment(&mut self, finished: EnrichmentFinished) -> String {
        let EnrichmentFinished { claim, result } = finished;
        let ein = claim.ein();
        drop(claim);

        let Some(detail) = self.detail.as_mut().filter(|detail| detail.ein() == ein) else {
            return match result {
                Ok(()) => format!("Enrichment queued for EIN {ein}. Type `open {ein}` to view it.\n"),
                Err(err) => format!("Enrichment request for EIN {ein} failed: {err}\n"),
            };
        };

        match detail.finish_enrichment(result) {
            Some(reload) => {
                let response = reload.execute(self.api.as_ref()).await;
                detail.complete(response);
                format!("Enrichment queued for EIN {ein}.\n\n{}", render_detail(detail))
            }
            None => format!(
                "Enrichment request for EIN {ein} failed. Type `enrich` to try again.\n\n{}",
                render_detail(detail)
            ),
        }
    }
}

pub(crate) async fn run_browse(api: Arc<dyn DonorApi>) -> Result<(), AppError> {
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let (finished_tx, mut finished_rx) = mpsc::unbounded_channel();
    let mut session = BrowseSession::new(api, finished_tx);

    let intro = session.start().await;
    stdout.write_all(intro.as_bytes()).await?;

    loop {
        stdout.write_all(PROMPT.as_bytes()).await?;
        stdout.flush().await?;

        let output = tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<SessionCommand>() {
                    Ok(command) => {
                        debug!(?command, "session command");
                        match session.handle(command).await {
                            Flow::Continue(output) => output,
                            Flow::Quit => break,
                        }
                    }
                    Err(message) => format!("{message}\n"),
                }
            }
            Some(finished) = finished_rx.recv() => {
                format!("\n{}", session.finish_enrichment(finished).await)
            }
        };
        stdout.write_all(output.as_bytes()).await?;
    }

    stdout.flush().await?;
    Ok(())
}
