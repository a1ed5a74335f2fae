use super::format::{
    format_currency, format_date_label, format_large_number, form_type_name,
};
use super::relevance::{highlight_segments, star_rating, HighlightSegment};
use super::trend::{filings_with_trend, RevenueChange};
use crate::api::{
    CompanyProfile, ContactInfo, Ein, EnrichedContact, Filing, NewsItem, Organization,
    OrganizationEnrichment, SearchResult,
};

pub fn donor_href(ein: Ein) -> String {
    format!("/donor/{ein}")
}

#[derive(Debug, Clone)]
pub struct DonorCardView {
    pub ein: Ein,
    pub href: String,
    pub name: String,
    pub sub_name: Option<String>,
    pub location: String,
    pub address: String,
    pub ntee_code: Option<String>,
    pub updated_label: String,
}

impl DonorCardView {
    pub fn from_organization(organization: &Organization) -> Self {
        Self {
            ein: organization.ein,
            href: donor_href(organization.ein),
            name: organization.name.clone(),
            sub_name: non_blank(organization.sub_name.as_deref()),
            location: organization.location(),
            address: organization.address.clone(),
            ntee_code: non_blank(Some(&organization.ntee_code)),
            updated_label: format_date_label(&organization.updated_at),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchCardView {
    pub card: DonorCardView,
    pub name_segments: Vec<HighlightSegment>,
    pub stars: u8,
    pub relevance_label: String,
    pub match_type: String,
}

impl SearchCardView {
    pub fn from_result(result: &SearchResult, query: Option<&str>) -> Self {
        Self {
            card: DonorCardView::from_organization(&result.organization),
            name_segments: highlight_segments(&result.organization.name, query),
            stars: star_rating(result.relevance_score),
            relevance_label: format!("{:.2}", result.relevance_score),
            match_type: result.match_type.clone(),
        }
    }
}

/// A money field shown abbreviated with the exact amount underneath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoneyView {
    pub headline: String,
    pub exact: String,
}

impl MoneyView {
    pub fn from_raw(raw: &str) -> Self {
        Self {
            headline: format_large_number(raw),
            exact: format_currency(raw),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FinancialMetricView {
    pub label: &'static str,
    pub value: MoneyView,
}

#[derive(Debug, Clone)]
pub struct LatestFilingView {
    pub tax_year: i32,
    pub form_label: String,
    pub pdf_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FilingHistoryEntry {
    pub id: i64,
    pub tax_year: i32,
    pub form_label: String,
    pub is_latest: bool,
    pub revenue: MoneyView,
    pub assets: MoneyView,
    pub expenses: MoneyView,
    pub liabilities: MoneyView,
    pub revenue_change: Option<RevenueChange>,
    pub pdf_url: Option<String>,
    pub tax_period: i64,
    pub irs_updated_label: String,
}

pub fn filing_history(filings: &[Filing]) -> Vec<FilingHistoryEntry> {
    filings_with_trend(filings)
        .into_iter()
        .enumerate()
        .map(|(idx, (filing, revenue_change))| FilingHistoryEntry {
            id: filing.id,
            tax_year: filing.tax_prd_yr,
            form_label: form_type_name(filing.formtype),
            is_latest: idx == 0,
            revenue: MoneyView::from_raw(&filing.totrevenue),
            assets: MoneyView::from_raw(&filing.totassetsend),
            expenses: MoneyView::from_raw(&filing.totfuncexpns),
            liabilities: MoneyView::from_raw(&filing.totliabend),
            revenue_change,
            pdf_url: non_blank(filing.pdf_url.as_deref()),
            tax_period: filing.tax_prd,
            irs_updated_label: format_date_label(&filing.irs_updated),
        })
        .collect()
}

#[derive(Debug, Clone)]
pub enum EnrichmentView {
    NotEnriched,
    Enriched {
        status_label: String,
        company: Option<CompanyProfile>,
        contacts: Vec<EnrichedContact>,
        news: Vec<NewsItem>,
        contact_info: Vec<ContactInfo>,
        last_enriched_label: Option<String>,
    },
}

impl EnrichmentView {
    pub fn from_record(enrichment: Option<&OrganizationEnrichment>) -> Self {
        match enrichment {
            None => Self::NotEnriched,
            Some(record) => Self::Enriched {
                status_label: record.status.label().to_string(),
                company: record.company.clone(),
                contacts: record.contacts.clone(),
                news: record.news.clone(),
                contact_info: record.contact_info.clone(),
                last_enriched_label: record.last_enriched_at.as_deref().map(format_date_label),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct DonorDetailView {
    pub ein: Ein,
    pub heading: String,
    pub sub_name: Option<String>,
    pub address: String,
    pub location_line: String,
    pub ntee_code: Option<String>,
    pub guidestar_url: Option<String>,
    pub nccs_url: Option<String>,
    pub updated_label: String,
    pub latest_filing: Option<LatestFilingView>,
    pub financials: Vec<FinancialMetricView>,
    pub history: Vec<FilingHistoryEntry>,
    pub enrichment: EnrichmentView,
}

impl DonorDetailView {
    pub fn new(organization: &Organization, enrichment: Option<&OrganizationEnrichment>) -> Self {
        let latest = organization.latest_filing();
        let financials = latest
            .map(|filing| {
                vec![
                    FinancialMetricView {
                        label: "Total Revenue",
                        value: MoneyView::from_raw(&filing.totrevenue),
                    },
                    FinancialMetricView {
                        label: "Total Assets",
                        value: MoneyView::from_raw(&filing.totassetsend),
                    },
                    FinancialMetricView {
                        label: "Total Expenses",
                        value: MoneyView::from_raw(&filing.totfuncexpns),
                    },
                    FinancialMetricView {
                        label: "Total Liabilities",
                        value: MoneyView::from_raw(&filing.totliabend),
                    },
                ]
            })
            .unwrap_or_default();

        let location_line = [organization.location(), organization.zipcode.clone()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Self {
            ein: organization.ein,
            heading: organization.name.clone(),
            sub_name: non_blank(organization.sub_name.as_deref()),
            address: organization.address.clone(),
            location_line,
            ntee_code: non_blank(Some(&organization.ntee_code)),
            guidestar_url: non_blank(organization.guidestar_url.as_deref()),
            nccs_url: non_blank(organization.nccs_url.as_deref()),
            updated_label: format_date_label(&organization.updated_at),
            latest_filing: latest.map(|filing| LatestFilingView {
                tax_year: filing.tax_prd_yr,
                form_label: form_type_name(filing.formtype),
                pdf_url: non_blank(filing.pdf_url.as_deref()),
            }),
            financials,
            history: filing_history(&organization.filings),
            enrichment: EnrichmentView::from_record(enrichment),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}
