//! Server-rendered pages for the directory.

use url::form_urlencoded;

use super::relevance::MAX_STARS;
use super::views::{
    DonorCardView, DonorDetailView, EnrichmentView, FilingHistoryEntry, MoneyView, SearchCardView,
};
use crate::api::{Ein, SearchFilters, SearchType};
use crate::directory::{
    DetailController, DetailState, GridController, GridItem, GridMode, LoadState, SearchControls,
    EXAMPLE_QUERIES, SUBSECTION_OPTIONS,
};

const STYLE: &str = "body{font-family:system-ui,sans-serif;margin:0;color:#111}\
header,main{max-width:1200px;margin:0 auto;padding:1rem 1.5rem}\
.grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(260px,1fr));gap:1rem}\
.card{border:1px solid #ddd;border-radius:8px;padding:1rem}\
.muted{color:#666}.badge{display:inline-block;border-radius:999px;padding:0 .5rem;background:#eee;margin-right:.25rem}\
.pagination a,.pagination span{margin:0 .25rem}.disabled{opacity:.5;pointer-events:none}\
.error{color:#b91c1c}.up{color:#15803d}.down{color:#b91c1c}mark{background:#fde68a}";

/// HTML-escapes text for element bodies and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Link to the grid showing `filters` at `page`. Browse mode carries only the
/// page number.
pub fn grid_href(filters: &SearchFilters, page: u32) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    if let Some(q) = filters.query_text() {
        query.append_pair("q", q);
        if let Some(search_type) = filters.search_type {
            query.append_pair("search_type", search_type.as_str());
        }
        if let Some(code) = filters.subseccd {
            query.append_pair("subseccd", &code.to_string());
        }
        if let Some(limit) = filters.limit.filter(|limit| *limit > 0) {
            query.append_pair("limit", &limit.to_string());
        }
    }
    if page > 1 {
        query.append_pair("page", &page.to_string());
    }

    let query = query.finish();
    if query.is_empty() {
        "/".to_string()
    } else {
        format!("/?{query}")
    }
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
<title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<header><h1><a href=\"/\">Donor Finder</a></h1>\
<p class=\"muted\">Discover foundations and grantmakers to support your nonprofit mission</p></header>\n\
<main>\n{body}</main>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

/// The browse/search page.
pub fn render_home(grid: &GridController, controls: &SearchControls) -> String {
    let mut body = String::new();
    body.push_str(&search_panel(controls));

    match grid.state() {
        LoadState::Failed(message) => {
            body.push_str(&format!(
                "<div class=\"error-panel\"><p class=\"error\">Error: {}</p>\
<a class=\"button\" href=\"{}\">Try Again</a></div>\n",
                escape_html(message),
                escape_html(&grid_href(grid.filters(), grid.page())),
            ));
        }
        LoadState::Idle | LoadState::Loading => {
            body.push_str("<p class=\"muted\">Loading...</p>\n");
        }
        LoadState::Ready => {
            if let Some(summary) = grid.summary() {
                body.push_str(&format!(
                    "<p class=\"summary\">{}</p>\n",
                    escape_html(&summary)
                ));
            }
            body.push_str(&grid_section(grid));
        }
    }

    layout("Donor Finder", &body)
}

fn search_panel(controls: &SearchControls) -> String {
    let draft = controls.draft();
    let mut html = String::from("<section class=\"search\"><h2>Search Donors</h2>\n");
    html.push_str("<form method=\"get\" action=\"/\">\n");
    html.push_str(&format!(
        "<input type=\"search\" name=\"q\" value=\"{}\" \
placeholder=\"Try: 'foundations supporting early childhood education in California'\">\n",
        escape_html(draft.q.as_deref().unwrap_or_default()),
    ));

    html.push_str(if controls.filters_open() {
        "<details class=\"filters\" open><summary>Filters</summary>\n"
    } else {
        "<details class=\"filters\"><summary>Filters</summary>\n"
    });
    html.push_str("<label>Organization Type <select name=\"subseccd\">");
    html.push_str(&option_tag("", "All types", draft.subseccd.is_none()));
    for option in SUBSECTION_OPTIONS {
        html.push_str(&option_tag(
            &option.code.to_string(),
            option.label,
            draft.subseccd == Some(option.code),
        ));
    }
    html.push_str("</select></label>\n");

    let selected_type = draft.search_type.unwrap_or_default();
    html.push_str("<label>Search Type <select name=\"search_type\">");
    for search_type in SearchType::ALL {
        html.push_str(&option_tag(
            search_type.as_str(),
            search_type.label(),
            search_type == selected_type,
        ));
    }
    html.push_str("</select></label>\n</details>\n");

    html.push_str(&format!(
        "<input type=\"hidden\" name=\"limit\" value=\"{}\">\n<button type=\"submit\">Search</button>\n</form>\n",
        draft.effective_limit()
    ));

    if !draft.has_query() {
        html.push_str("<p class=\"muted\">Try these examples:</p><p>");
        for example in EXAMPLE_QUERIES {
            let filters = SearchFilters {
                q: Some(example.to_string()),
                ..draft.clone()
            };
            html.push_str(&format!(
                "<a class=\"badge\" href=\"{}\">{}</a>",
                escape_html(&grid_href(&filters, 1)),
                escape_html(example),
            ));
        }
        html.push_str("</p>\n");
    }

    let chips = controls.active_chips();
    if !chips.is_empty() {
        html.push_str("<p class=\"chips\"><span class=\"muted\">Active filters:</span> ");
        for chip in &chips {
            let mut remaining = controls.clone();
            remaining.remove_chip(chip);
            html.push_str(&format!(
                "<span class=\"badge\">{} <a href=\"{}\" aria-label=\"Remove\">&times;</a></span>",
                escape_html(&chip.label()),
                escape_html(&grid_href(remaining.draft(), 1)),
            ));
        }
        html.push_str("<a href=\"/\">Clear all</a></p>\n");
    }

    html.push_str("</section>\n");
    html
}

fn option_tag(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label),
    )
}

fn grid_section(grid: &GridController) -> String {
    let items = grid.items();
    if items.is_empty() {
        return match grid.mode() {
            GridMode::Browse => "<p class=\"muted empty\">No organizations found.</p>\n".to_string(),
            GridMode::Search => {
                "<p class=\"muted empty\">No organizations matched your search.</p>\n".to_string()
            }
        };
    }

    let query = grid.filters().query_text();
    let mut html = String::from("<div class=\"grid\">\n");
    for item in items {
        match item {
            GridItem::Organization(organization) => {
                html.push_str(&donor_card(&DonorCardView::from_organization(organization)));
            }
            GridItem::SearchHit(hit) => {
                html.push_str(&search_card(&SearchCardView::from_result(hit, query)));
            }
        }
    }
    html.push_str("</div>\n");
    html.push_str(&pagination(grid));
    html
}

fn card_body(card: &DonorCardView, title_html: &str) -> String {
    let mut html = format!(
        "<h3><a href=\"{}\">{}</a></h3>\n",
        escape_html(&card.href),
        title_html
    );
    if let Some(sub_name) = &card.sub_name {
        html.push_str(&format!("<p class=\"muted\">{}</p>\n", escape_html(sub_name)));
    }
    html.push_str(&format!(
        "<p>{}</p>\n<p class=\"muted\">{}</p>\n",
        escape_html(&card.location),
        escape_html(&card.address)
    ));
    html.push_str(&format!("<p class=\"muted\">EIN: {}</p>\n", card.ein));
    if let Some(ntee) = &card.ntee_code {
        html.push_str(&format!("<span class=\"badge\">{}</span>\n", escape_html(ntee)));
    }
    html.push_str(&format!(
        "<p class=\"muted\">Updated {}</p>\n",
        escape_html(&card.updated_label)
    ));
    html
}

fn donor_card(card: &DonorCardView) -> String {
    format!(
        "<article class=\"card\">\n{}</article>\n",
        card_body(card, &escape_html(&card.name))
    )
}

fn search_card(view: &SearchCardView) -> String {
    let title: String = view
        .name_segments
        .iter()
        .map(|segment| {
            if segment.matched {
                format!("<mark>{}</mark>", escape_html(&segment.text))
            } else {
                escape_html(&segment.text)
            }
        })
        .collect();

    let filled = usize::from(view.stars);
    let stars = format!(
        "{}{}",
        "&#9733;".repeat(filled),
        "&#9734;".repeat(usize::from(MAX_STARS).saturating_sub(filled))
    );

    format!(
        "<article class=\"card search-hit\">\n{}<p class=\"relevance\"><span aria-label=\"{} of {} stars\">{}</span> \
<span class=\"muted\">{}</span> <span class=\"badge\">{}</span></p>\n</article>\n",
        card_body(&view.card, &title),
        view.stars,
        MAX_STARS,
        stars,
        escape_html(&view.relevance_label),
        escape_html(&view.match_type),
    )
}

fn pagination(grid: &GridController) -> String {
    let view = grid.pagination();
    let filters = grid.filters();
    let link = |page: u32, label: &str, enabled: bool| {
        if enabled {
            format!(
                "<a href=\"{}\">{}</a>",
                escape_html(&grid_href(filters, page)),
                label
            )
        } else {
            format!("<span class=\"disabled\">{label}</span>")
        }
    };

    let mut html = String::from("<nav class=\"pagination\">");
    html.push_str(&link(
        view.current.saturating_sub(1).max(1),
        "Previous",
        view.has_previous,
    ));
    for page in &view.pages {
        if *page == view.current {
            html.push_str(&format!("<span aria-current=\"page\"><strong>{page}</strong></span>"));
        } else {
            html.push_str(&link(*page, &page.to_string(), true));
        }
    }
    html.push_str(&link(view.current.saturating_add(1), "Next", view.has_next));
    html.push_str("</nav>\n");
    html
}

/// The profile page, or the not-found/error page the controller's state calls for.
pub fn render_detail(controller: &DetailController) -> String {
    match controller.state() {
        DetailState::Ready(profile) => {
            let view = DonorDetailView::new(&profile.organization, profile.enrichment.as_ref());
            render_profile(&view, controller.is_enriching())
        }
        DetailState::NotFound => render_not_found(),
        DetailState::Failed(message) => render_detail_error(controller.ein(), message),
        DetailState::Idle | DetailState::Loading => {
            layout("Donor Finder", "<p class=\"muted\">Loading...</p>\n")
        }
    }
}

pub fn render_not_found() -> String {
    layout(
        "Donor Not Found",
        "<section class=\"card not-found\"><h2>Donor Not Found</h2>\n\
<p class=\"muted\">The donor you're looking for doesn't exist or may have been removed.</p>\n\
<a href=\"/\">Browse All Donors</a></section>\n",
    )
}

fn render_detail_error(ein: Ein, message: &str) -> String {
    let body = format!(
        "<p><a href=\"/\">Back to Donors</a></p>\n<div class=\"error-panel\"><p class=\"error\">Error: {}</p>\
<a class=\"button\" href=\"/donor/{ein}\">Try Again</a></div>\n",
        escape_html(message)
    );
    layout("Donor Finder", &body)
}

fn money_card(label: &str, money: &MoneyView) -> String {
    format!(
        "<div class=\"card metric\"><p class=\"muted\">{}</p><p class=\"headline\">{}</p>\
<p class=\"muted\">{}</p></div>\n",
        escape_html(label),
        escape_html(&money.headline),
        escape_html(&money.exact)
    )
}

fn external_link(href: &str, label: &str) -> String {
    format!(
        "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">{}</a>",
        escape_html(href),
        escape_html(label)
    )
}

fn render_profile(view: &DonorDetailView, enriching: bool) -> String {
    let mut body = String::from("<p><a href=\"/\">Back to Donors</a></p>\n");

    body.push_str(&format!("<h2>{}</h2>\n", escape_html(&view.heading)));
    if let Some(sub_name) = &view.sub_name {
        body.push_str(&format!("<p class=\"muted\">{}</p>\n", escape_html(sub_name)));
    }

    let (button_label, disabled) = if enriching {
        ("Enriching...", " disabled")
    } else {
        ("Enrich Data", "")
    };
    body.push_str(&format!(
        "<form method=\"post\" action=\"/donor/{}/enrich\"><button type=\"submit\"{disabled}>{button_label}</button></form>\n",
        view.ein
    ));

    body.push_str("<section class=\"card\"><h3>Organization Details</h3>\n");
    body.push_str(&format!(
        "<p>{}</p>\n<p>{}</p>\n<p>EIN: {}</p>\n",
        escape_html(&view.address),
        escape_html(&view.location_line),
        view.ein
    ));
    if let Some(ntee) = &view.ntee_code {
        body.push_str(&format!("<span class=\"badge\">{}</span>\n", escape_html(ntee)));
    }
    let links: Vec<String> = [
        view.guidestar_url.as_deref().map(|url| external_link(url, "GuideStar")),
        view.nccs_url.as_deref().map(|url| external_link(url, "NCCS")),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !links.is_empty() {
        body.push_str(&format!("<p>{}</p>\n", links.join(" ")));
    }
    body.push_str("</section>\n");

    body.push_str(&format!(
        "<section class=\"card\"><h3>Last Updated</h3><p>{}</p></section>\n",
        escape_html(&view.updated_label)
    ));

    if let Some(latest) = &view.latest_filing {
        body.push_str(&format!(
            "<section class=\"card\"><h3>Latest Filing</h3><p>Tax Year {}</p><p>Form {}</p>",
            latest.tax_year,
            escape_html(&latest.form_label)
        ));
        if let Some(pdf) = &latest.pdf_url {
            body.push_str(&external_link(pdf, "Download PDF"));
        }
        body.push_str("</section>\n");
    }

    if !view.financials.is_empty() {
        body.push_str("<section class=\"financials grid\">\n");
        for metric in &view.financials {
            body.push_str(&money_card(metric.label, &metric.value));
        }
        body.push_str("</section>\n");
    }

    body.push_str(&filing_history_section(&view.history));
    body.push_str(&enrichment_section(&view.enrichment));

    layout(&view.heading, &body)
}

fn filing_history_section(history: &[FilingHistoryEntry]) -> String {
    if history.is_empty() {
        return String::new();
    }

    let mut html = format!(
        "<section class=\"history\"><h3>Filing History</h3><p class=\"muted\">{} filing{}</p>\n",
        history.len(),
        if history.len() == 1 { "" } else { "s" }
    );
    for entry in history {
        html.push_str(&format!(
            "<article class=\"card filing\"><h4>Tax Year {} <span class=\"badge\">{}</span>",
            entry.tax_year,
            escape_html(&entry.form_label)
        ));
        if entry.is_latest {
            html.push_str(" <span class=\"badge\">Latest</span>");
        }
        html.push_str("</h4>\n");

        if let Some(change) = &entry.revenue_change {
            let class = if change.is_positive { "up" } else { "down" };
            html.push_str(&format!(
                "<p class=\"{class}\">{} revenue vs. prior year</p>\n",
                escape_html(&change.label())
            ));
        }

        for (label, money) in [
            ("Revenue", &entry.revenue),
            ("Assets", &entry.assets),
            ("Expenses", &entry.expenses),
            ("Liabilities", &entry.liabilities),
        ] {
            html.push_str(&format!(
                "<p>{label}: <strong>{}</strong> <span class=\"muted\">{}</span></p>\n",
                escape_html(&money.headline),
                escape_html(&money.exact)
            ));
        }

        html.push_str(&format!(
            "<p class=\"muted\">Tax period {} &middot; IRS updated {}</p>\n",
            entry.tax_period,
            escape_html(&entry.irs_updated_label)
        ));
        if let Some(pdf) = &entry.pdf_url {
            html.push_str(&external_link(pdf, "PDF"));
        }
        html.push_str("</article>\n");
    }
    html.push_str("</section>\n");
    html
}

fn enrichment_section(enrichment: &EnrichmentView) -> String {
    let mut html = String::from("<section class=\"card enrichment\"><h3>Enrichment</h3>\n");
    match enrichment {
        EnrichmentView::NotEnriched => {
            html.push_str("<p class=\"muted\">This organization has not been enriched yet.</p>\n");
        }
        EnrichmentView::Enriched {
            status_label,
            company,
            contacts,
            news,
            contact_info,
            last_enriched_label,
        } => {
            html.push_str(&format!(
                "<p>Status: <span class=\"badge\">{}</span></p>\n",
                escape_html(status_label)
            ));
            if let Some(label) = last_enriched_label {
                html.push_str(&format!(
                    "<p class=\"muted\">Last enriched {}</p>\n",
                    escape_html(label)
                ));
            }

            if let Some(company) = company {
                html.push_str("<h4>Company</h4>\n");
                for (label, value) in [
                    ("Name", company.name.clone()),
                    ("Industry", company.industry.clone()),
                    ("Employees", company.employee_count.map(|count| count.to_string())),
                    ("Annual Revenue", company.annual_revenue.clone()),
                    ("Founded", company.founded_year.map(|year| year.to_string())),
                    ("Location", company.location()),
                ] {
                    if let Some(value) = value {
                        html.push_str(&format!("<p>{label}: {}</p>\n", escape_html(&value)));
                    }
                }
                if let Some(description) = &company.description {
                    html.push_str(&format!("<p>{}</p>\n", escape_html(description)));
                }
                let links: Vec<String> = [
                    company.website_url.as_deref().map(|url| external_link(url, "Website")),
                    company.linkedin_url.as_deref().map(|url| external_link(url, "LinkedIn")),
                ]
                .into_iter()
                .flatten()
                .collect();
                if !links.is_empty() {
                    html.push_str(&format!("<p>{}</p>\n", links.join(" ")));
                }
            }

            if !contacts.is_empty() {
                html.push_str("<h4>Contacts</h4><ul>\n");
                for contact in contacts {
                    let parts: Vec<String> = [
                        contact.name.as_deref(),
                        contact.title.as_deref(),
                        contact.email.as_deref(),
                        contact.phone.as_deref(),
                    ]
                    .into_iter()
                    .flatten()
                    .map(escape_html)
                    .collect();
                    html.push_str(&format!("<li>{}</li>\n", parts.join(" &middot; ")));
                }
                html.push_str("</ul>\n");
            }

            if !news.is_empty() {
                html.push_str("<h4>News</h4><ul>\n");
                for item in news {
                    let headline = match item.url.as_deref() {
                        Some(url) => external_link(url, &item.title),
                        None => escape_html(&item.title),
                    };
                    html.push_str(&format!("<li>{headline}"));
                    if let Some(source) = &item.source {
                        html.push_str(&format!(" <span class=\"muted\">{}</span>", escape_html(source)));
                    }
                    if let Some(published) = &item.published_at {
                        html.push_str(&format!(
                            " <span class=\"muted\">{}</span>",
                            escape_html(published)
                        ));
                    }
                    html.push_str("</li>\n");
                }
                html.push_str("</ul>\n");
            }

            if !contact_info.is_empty() {
                html.push_str("<h4>Contact Info</h4><ul>\n");
                for info in contact_info {
                    html.push_str(&format!(
                        "<li>{}: {}</li>\n",
                        escape_html(&info.kind),
                        escape_html(&info.value)
                    ));
                }
                html.push_str("</ul>\n");
            }
        }
    }
    html.push_str("</section>\n");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn grid_href_keeps_search_filters() {
        let filters = SearchFilters {
            q: Some("arts & culture".into()),
            subseccd: Some(3),
            search_type: Some(SearchType::Keyword),
            limit: Some(20),
        };
        assert_eq!(
            grid_href(&filters, 2),
            "/?q=arts+%26+culture&search_type=keyword&subseccd=3&limit=20&page=2"
        );
    }

    #[test]
    fn grid_href_in_browse_mode_is_page_only() {
        assert_eq!(grid_href(&SearchFilters::defaults(), 1), "/");
        assert_eq!(grid_href(&SearchFilters::defaults(), 3), "/?page=3");
    }

    #[test]
    fn not_found_page_links_back_to_browse() {
        let page = render_not_found();
        assert!(page.contains("Donor Not Found"));
        assert!(page.contains("Browse All Donors"));
    }
}
