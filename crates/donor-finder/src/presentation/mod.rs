//! Display formatting, derived view models and HTML pages.

pub mod format;
pub mod html;
pub mod relevance;
pub mod trend;
pub mod views;

pub use format::{
    form_type_name, format_currency, format_currency_value, format_date_label,
    format_large_number, format_large_number_value, parse_amount,
};
pub use html::{escape_html, grid_href, render_detail, render_home, render_not_found};
pub use relevance::{highlight_segments, star_rating, HighlightSegment, MAX_STARS};
pub use trend::{filings_with_trend, revenue_change, RevenueChange};
pub use views::{
    donor_href, filing_history, DonorCardView, DonorDetailView, EnrichmentView,
    FilingHistoryEntry, FinancialMetricView, LatestFilingView, MoneyView, SearchCardView,
};
