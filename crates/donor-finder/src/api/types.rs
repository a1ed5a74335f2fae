use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Result count requested by a search when the form does not pick one.
pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

/// Employer Identification Number, the stable external key of an organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ein(pub u64);

impl fmt::Display for Ein {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a valid EIN")]
pub struct InvalidEin(pub String);

impl FromStr for Ein {
    type Err = InvalidEin;

    /// Accepts plain digits or the dashed `NN-NNNNNNN` form.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        let digits: String = trimmed.chars().filter(|c| *c != '-').collect();
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidEin(raw.to_string()));
        }
        digits
            .parse::<u64>()
            .map(Ein)
            .map_err(|_| InvalidEin(raw.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub ein: Ein,
    #[serde(default)]
    pub strein: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sub_name: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub address: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub city: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub state: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub zipcode: String,
    #[serde(default)]
    pub subseccd: Option<i32>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub ntee_code: String,
    #[serde(default, deserialize_with = "web_link_or_none")]
    pub guidestar_url: Option<String>,
    #[serde(default, deserialize_with = "web_link_or_none")]
    pub nccs_url: Option<String>,
    pub id: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub searchable_text: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub created_at: String,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub updated_at: String,
    #[serde(default)]
    pub irs_updated: Option<String>,
    #[serde(default, deserialize_with = "list_or_empty")]
    pub filings: Vec<Filing>,
}

impl Organization {
    /// "City, ST" with missing parts skipped.
    pub fn location(&self) -> String {
        [self.city.as_str(), self.state.as_str()]
            .into_iter()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Filing with the highest tax year, if any.
    pub fn latest_filing(&self) -> Option<&Filing> {
        self.filings.iter().max_by_key(|filing| filing.tax_prd_yr)
    }
}

/// One annual 990-family disclosure. Money fields keep the service's decimal
/// text untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filing {
    pub ein: Ein,
    #[serde(default)]
    pub tax_prd: i64,
    pub tax_prd_yr: i32,
    #[serde(default)]
    pub formtype: i32,
    #[serde(default, deserialize_with = "web_link_or_none")]
    pub pdf_url: Option<String>,
    #[serde(default, deserialize_with = "money_text")]
    pub totrevenue: String,
    #[serde(default, deserialize_with = "money_text")]
    pub totfuncexpns: String,
    #[serde(default, deserialize_with = "money_text")]
    pub totassetsend: String,
    #[serde(default, deserialize_with = "money_text")]
    pub totliabend: String,
    #[serde(default, deserialize_with = "money_text")]
    pub pct_compnsatncurrofcr: String,
    pub id: i64,
    #[serde(default)]
    pub organization_id: i64,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub irs_updated: String,
}

/// An organization as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub organization: Organization,
    pub relevance_score: f64,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub match_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
    #[serde(default)]
    pub total_results: usize,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub query: String,
    #[serde(default)]
    pub search_type: SearchType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    #[default]
    Semantic,
    Keyword,
    Hybrid,
}

impl SearchType {
    pub const ALL: [SearchType; 3] = [SearchType::Semantic, SearchType::Hybrid, SearchType::Keyword];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Semantic => "semantic",
            Self::Keyword => "keyword",
            Self::Hybrid => "hybrid",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Semantic => "Semantic (Recommended)",
            Self::Keyword => "Keyword",
            Self::Hybrid => "Hybrid",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "semantic" => Ok(Self::Semantic),
            "keyword" => Ok(Self::Keyword),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!(
                "unknown search type '{other}' (expected semantic, keyword or hybrid)"
            )),
        }
    }
}

/// Query form state handed to the search endpoint.
///
/// `subseccd` is a form-side filter only; the search endpoint never receives it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subseccd: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_type: Option<SearchType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchFilters {
    /// The state the form returns to after "Clear all".
    pub fn defaults() -> Self {
        Self {
            q: None,
            subseccd: None,
            search_type: Some(SearchType::Semantic),
            limit: Some(DEFAULT_SEARCH_LIMIT),
        }
    }

    pub fn keyword(query: impl Into<String>) -> Self {
        Self {
            q: Some(query.into()),
            ..Self::defaults()
        }
    }

    /// The free-text query, if it holds anything besides whitespace.
    pub fn query_text(&self) -> Option<&str> {
        self.q.as_deref().filter(|q| !q.trim().is_empty())
    }

    pub fn has_query(&self) -> bool {
        self.query_text().is_some()
    }

    pub fn effective_limit(&self) -> u32 {
        self.limit.filter(|limit| *limit > 0).unwrap_or(DEFAULT_SEARCH_LIMIT)
    }

    /// Parameters understood by the search endpoint, in wire order. Absent,
    /// blank or zero values are left out entirely.
    pub fn api_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(3);
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("q", q.to_string()));
        }
        if let Some(search_type) = self.search_type {
            pairs.push(("search_type", search_type.as_str().to_string()));
        }
        if let Some(limit) = self.limit.filter(|limit| *limit > 0) {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    pub fn api_query_string(&self) -> String {
        let mut serializer = url::form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.api_query_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }
}

/// Fixed payload sent when requesting enrichment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentRequest {
    pub force_refresh: bool,
    pub include_website_scraping: bool,
    pub include_apollo_enrichment: bool,
}

impl EnrichmentRequest {
    pub const fn standard() -> Self {
        Self {
            force_refresh: false,
            include_website_scraping: true,
            include_apollo_enrichment: true,
        }
    }
}

/// Keeps a link only when it is an absolute `http`/`https` URL, so that
/// rendered `href`s never carry `javascript:` or other schemes.
pub fn web_link(value: Option<String>) -> Option<String> {
    let text = value?.trim().to_string();
    let parsed = url::Url::parse(&text).ok()?;
    matches!(parsed.scheme(), "http" | "https").then_some(text)
}

fn web_link_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(web_link(Option::<String>::deserialize(deserializer)?))
}

fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn list_or_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Money arrives as decimal text, but some rows carry bare JSON numbers.
fn money_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected decimal text for money field, found {other}"
        ))),
    }
}
