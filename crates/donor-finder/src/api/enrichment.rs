//! Third-party enrichment records.
//!
//! The service produces these asynchronously and every nested field may be
//! missing, null, or blank. [`RawOrganizationEnrichment`] mirrors the wire
//! shape permissively; [`OrganizationEnrichment`] is the sanitized record the
//! rest of the crate works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::types::{web_link, Ein};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrichmentStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
    /// A label the service sent that this client does not know yet.
    Other(String),
}

impl EnrichmentStatus {
    fn from_label(raw: Option<&str>) -> Self {
        let Some(label) = raw.map(str::trim).filter(|label| !label.is_empty()) else {
            return Self::Pending;
        };
        match label.to_ascii_lowercase().replace([' ', '-'], "_").as_str() {
            "pending" | "queued" => Self::Pending,
            "in_progress" | "processing" | "running" => Self::InProgress,
            "completed" | "complete" | "success" | "done" => Self::Completed,
            "failed" | "error" => Self::Failed,
            _ => Self::Other(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Other(label) => label,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyProfile {
    pub name: Option<String>,
    pub industry: Option<String>,
    pub description: Option<String>,
    pub website_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub employee_count: Option<u64>,
    pub annual_revenue: Option<String>,
    pub founded_year: Option<i32>,
    pub city: Option<String>,
    pub state: Option<String>,
}

impl CompanyProfile {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn location(&self) -> Option<String> {
        let parts: Vec<&str> = [self.city.as_deref(), self.state.as_deref()]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join(", "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedContact {
    pub name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewsItem {
    pub title: String,
    pub url: Option<String>,
    pub source: Option<String>,
    pub published_at: Option<String>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub kind: String,
    pub value: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrganizationEnrichment {
    pub ein: Option<Ein>,
    pub status: EnrichmentStatus,
    pub company: Option<CompanyProfile>,
    pub contacts: Vec<EnrichedContact>,
    pub news: Vec<NewsItem>,
    pub contact_info: Vec<ContactInfo>,
    pub last_enriched_at: Option<String>,
}

impl OrganizationEnrichment {
    pub fn has_data(&self) -> bool {
        self.company.is_some()
            || !self.contacts.is_empty()
            || !self.news.is_empty()
            || !self.contact_info.is_empty()
    }
}

/// Wire shape of the enrichment endpoint. Nothing here is trusted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawOrganizationEnrichment {
    #[serde(default)]
    pub ein: Option<Ein>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "apollo_data", alias = "company_data")]
    pub company: Option<RawCompany>,
    #[serde(default)]
    pub contacts: Option<Vec<Option<RawContact>>>,
    #[serde(default, alias = "news_articles")]
    pub news: Option<Vec<Option<RawNewsItem>>>,
    #[serde(default)]
    pub contact_info: Option<Vec<Option<RawContactInfo>>>,
    #[serde(default, alias = "updated_at")]
    pub last_enriched_at: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCompany {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default, alias = "short_description")]
    pub description: Option<String>,
    #[serde(default, alias = "website")]
    pub website_url: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default, alias = "estimated_num_employees")]
    pub employee_count: Option<Value>,
    #[serde(default)]
    pub annual_revenue: Option<Value>,
    #[serde(default)]
    pub founded_year: Option<Value>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContact {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawNewsItem {
    #[serde(default, alias = "headline")]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "date")]
    pub published_at: Option<String>,
    #[serde(default, alias = "snippet")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawContactInfo {
    #[serde(default, rename = "type", alias = "kind")]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl RawOrganizationEnrichment {
    pub fn sanitize(self) -> OrganizationEnrichment {
        let company = self
            .company
            .map(RawCompany::sanitize)
            .filter(|company| !company.is_empty());

        OrganizationEnrichment {
            ein: self.ein,
            status: EnrichmentStatus::from_label(self.status.as_deref()),
            company,
            contacts: present(self.contacts)
                .filter_map(RawContact::sanitize)
                .collect(),
            news: present(self.news).filter_map(RawNewsItem::sanitize).collect(),
            contact_info: present(self.contact_info)
                .filter_map(RawContactInfo::sanitize)
                .collect(),
            last_enriched_at: clean(self.last_enriched_at),
        }
    }
}

impl RawCompany {
    fn sanitize(self) -> CompanyProfile {
        CompanyProfile {
            name: clean(self.name),
            industry: clean(self.industry),
            description: clean(self.description),
            website_url: web_link(self.website_url),
            linkedin_url: web_link(self.linkedin_url),
            employee_count: self.employee_count.as_ref().and_then(value_as_u64),
            annual_revenue: self.annual_revenue.as_ref().and_then(value_as_text),
            founded_year: self
                .founded_year
                .as_ref()
                .and_then(value_as_u64)
                .and_then(|year| i32::try_from(year).ok()),
            city: clean(self.city),
            state: clean(self.state),
        }
    }
}

impl RawContact {
    fn sanitize(self) -> Option<EnrichedContact> {
        let name = clean(self.name).or_else(|| {
            let joined = [clean(self.first_name), clean(self.last_name)]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ");
            (!joined.is_empty()).then_some(joined)
        });
        let contact = EnrichedContact {
            name,
            title: clean(self.title),
            email: clean(self.email),
            phone: clean(self.phone),
            linkedin_url: web_link(self.linkedin_url),
        };

        let identifiable = contact.name.is_some()
            || contact.email.is_some()
            || contact.phone.is_some()
            || contact.linkedin_url.is_some();
        identifiable.then_some(contact)
    }
}

impl RawNewsItem {
    fn sanitize(self) -> Option<NewsItem> {
        let url = web_link(self.url);
        let title = clean(self.title).or_else(|| url.clone())?;
        Some(NewsItem {
            title,
            url,
            source: clean(self.source),
            published_at: clean(self.published_at),
            summary: clean(self.summary),
        })
    }
}

impl RawContactInfo {
    fn sanitize(self) -> Option<ContactInfo> {
        let value = clean(self.value)?;
        Some(ContactInfo {
            kind: clean(self.kind).unwrap_or_else(|| "contact".to_string()),
            value,
            source: clean(self.source),
        })
    }
}

fn present<T>(items: Option<Vec<Option<T>>>) -> impl Iterator<Item = T> {
    items.unwrap_or_default().into_iter().flatten()
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| number.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(text) => text.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => clean(Some(text.clone())),
        _ => None,
    }
}
