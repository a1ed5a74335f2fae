//! Plain-text renderings of the directory views for terminal commands.

use donor_finder::directory::{
    DetailController, DetailState, GridController, GridItem, LoadState, SearchControls,
    ITEMS_PER_PAGE,
};
use donor_finder::presentation::{
    DonorCardView, DonorDetailView, EnrichmentView, SearchCardView, MAX_STARS,
};
use std::fmt::Write;

const RETRY_HINT: &str = "Type `retry` to try again.";

fn stars(filled: u8) -> String {
    let filled = usize::from(filled.min(MAX_STARS));
    format!(
        "{}{}",
        "*".repeat(filled),
        ".".repeat(usize::from(MAX_STARS) - filled)
    )
}

fn card_lines(out: &mut String, number: usize, title: &str, card: &DonorCardView) {
    let _ = writeln!(out, "{number:>3}. {title} (EIN {})", card.ein);
    let mut detail = card.location.clone();
    if let Some(ntee) = &card.ntee_code {
        let _ = write!(detail, " | NTEE {ntee}");
    }
    let _ = writeln!(out, "     {detail} | updated {}", card.updated_label);
}

pub(crate) fn render_grid(grid: &GridController) -> String {
    let mut out = String::new();
    match grid.state() {
        LoadState::Failed(message) => {
            let _ = writeln!(out, "Error: {message}");
            out.push_str(RETRY_HINT);
            out.push('\n');
            return out;
        }
        LoadState::Idle | LoadState::Loading => return "Loading...\n".to_string(),
        LoadState::Ready => {}
    }

    if let Some(summary) = grid.summary() {
        let _ = writeln!(out, "{summary}");
    }

    let items = grid.items();
    if items.is_empty() {
        out.push_str("No organizations found.\n");
        return out;
    }

    let query = grid.filters().query_text();
    let first = (grid.page().max(1) as usize - 1) * ITEMS_PER_PAGE as usize;
    for (idx, item) in items.iter().enumerate() {
        let number = first + idx + 1;
        match item {
            GridItem::Organization(organization) => {
                let card = DonorCardView::from_organization(organization);
                card_lines(&mut out, number, &card.name, &card);
            }
            GridItem::SearchHit(hit) => {
                let view = SearchCardView::from_result(hit, query);
                let title: String = view
                    .name_segments
                    .iter()
                    .map(|segment| {
                        if segment.matched {
                            format!("[{}]", segment.text)
                        } else {
                            segment.text.clone()
                        }
                    })
                    .collect();
                card_lines(&mut out, number, &title, &view.card);
                let _ = writeln!(
                    out,
                    "     {} {} {}",
                    stars(view.stars),
                    view.relevance_label,
                    view.match_type
                );
            }
        }
    }

    let pagination = grid.pagination();
    let pages: Vec<String> = pagination
        .pages
        .iter()
        .map(|page| {
            if *page == pagination.current {
                format!("[{page}]")
            } else {
                page.to_string()
            }
        })
        .collect();
    let _ = writeln!(
        out,
        "Page {} of {}: {}{}{}",
        pagination.current,
        pagination.total_pages,
        pages.join(" "),
        if pagination.has_previous { "  < prev" } else { "" },
        if pagination.has_next { "  next >" } else { "" },
    );
    out
}

/// The search form's pending state, shown after edits that do not search.
pub(crate) fn render_draft(controls: &SearchControls) -> String {
    let draft = controls.draft();
    let chips: Vec<String> = controls
        .active_chips()
        .iter()
        .map(|chip| chip.label())
        .collect();
    let filters = if chips.is_empty() {
        "no filters".to_string()
    } else {
        chips.join(", ")
    };
    format!(
        "Draft: {filters} | search type {} | limit {}\n",
        draft.search_type.unwrap_or_default(),
        draft.effective_limit()
    )
}

pub(crate) fn render_detail(controller: &DetailController) -> String {
    let mut out = String::new();
    let profile = match controller.state() {
        DetailState::Ready(profile) => profile,
        DetailState::NotFound => {
            return "Donor Not Found\nThe donor you're looking for doesn't exist or may have been removed.\n"
                .to_string();
        }
        DetailState::Failed(message) => {
            let _ = writeln!(out, "Error: {message}");
            out.push_str(RETRY_HINT);
            out.push('\n');
            return out;
        }
        DetailState::Idle | DetailState::Loading => return "Loading...\n".to_string(),
    };

    let view = DonorDetailView::new(&profile.organization, profile.enrichment.as_ref());
    let _ = writeln!(out, "{}", view.heading);
    if let Some(sub_name) = &view.sub_name {
        let _ = writeln!(out, "{sub_name}");
    }
    let _ = writeln!(out, "{}", view.address);
    let _ = writeln!(out, "{}", view.location_line);
    let _ = write!(out, "EIN {}", view.ein);
    if let Some(ntee) = &view.ntee_code {
        let _ = write!(out, " | NTEE {ntee}");
    }
    out.push('\n');
    for (label, link) in [("GuideStar", &view.guidestar_url), ("NCCS", &view.nccs_url)] {
        if let Some(link) = link {
            let _ = writeln!(out, "{label}: {link}");
        }
    }
    let _ = writeln!(out, "Last updated {}", view.updated_label);

    if let Some(latest) = &view.latest_filing {
        let _ = write!(
            out,
            "\nLatest filing: tax year {} (Form {})",
            latest.tax_year, latest.form_label
        );
        if let Some(pdf) = &latest.pdf_url {
            let _ = write!(out, " {pdf}");
        }
        out.push('\n');
    }

    for metric in &view.financials {
        let _ = writeln!(
            out,
            "  {:<18} {:>8}  ({})",
            metric.label, metric.value.headline, metric.value.exact
        );
    }

    if !view.history.is_empty() {
        let _ = writeln!(out, "\nFiling history ({} filings)", view.history.len());
        for entry in &view.history {
            let _ = write!(out, "  {} Form {}", entry.tax_year, entry.form_label);
            if entry.is_latest {
                out.push_str(" [Latest]");
            }
            let _ = write!(
                out,
                " | revenue {} | assets {} | expenses {} | liabilities {}",
                entry.revenue.headline,
                entry.assets.headline,
                entry.expenses.headline,
                entry.liabilities.headline
            );
            if let Some(change) = &entry.revenue_change {
                let arrow = if change.is_positive { "up" } else { "down" };
                let _ = write!(out, " | {arrow} {}", change.label());
            }
            out.push('\n');
        }
    }

    out.push_str("\nEnrichment\n");
    match &view.enrichment {
        EnrichmentView::NotEnriched => {
            out.push_str("  Not enriched yet. Type `enrich` to request it.\n");
        }
        EnrichmentView::Enriched {
            status_label,
            company,
            contacts,
            news,
            contact_info,
            last_enriched_label,
        } => {
            let _ = write!(out, "  Status: {status_label}");
            if let Some(label) = last_enriched_label {
                let _ = write!(out, " (last enriched {label})");
            }
            out.push('\n');
            if let Some(company) = company {
                let name = company.name.as_deref().unwrap_or("Company");
                let _ = write!(out, "  {name}");
                if let Some(industry) = &company.industry {
                    let _ = write!(out, " | {industry}");
                }
                if let Some(location) = company.location() {
                    let _ = write!(out, " | {location}");
                }
                out.push('\n');
            }
            for contact in contacts {
                let parts: Vec<&str> = [
                    contact.name.as_deref(),
                    contact.title.as_deref(),
                    contact.email.as_deref(),
                ]
                .into_iter()
                .flatten()
                .collect();
                let _ = writeln!(out, "  Contact: {}", parts.join(", "));
            }
            for item in news {
                let _ = writeln!(out, "  News: {}", item.title);
            }
            for info in contact_info {
                let _ = writeln!(out, "  {}: {}", info.kind, info.value);
            }
        }
    }

    if controller.is_enriching() {
        out.push_str("Enriching...\n");
    }
    out
}
