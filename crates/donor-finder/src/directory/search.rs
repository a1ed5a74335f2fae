//! The search form: a draft of filters the user edits, committed to the grid
//! only on submit.

use crate::api::{SearchFilters, SearchType};

/// Sample queries offered under the search box.
pub const EXAMPLE_QUERIES: [&str; 3] = [
    "foundations supporting education",
    "environmental organizations",
    "disaster relief nonprofits",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubsectionOption {
    pub code: i32,
    pub label: &'static str,
}

/// IRS 501(c) subsections selectable as "Organization Type".
pub const SUBSECTION_OPTIONS: [SubsectionOption; 5] = [
    SubsectionOption {
        code: 3,
        label: "501(c)(3) - Charitable",
    },
    SubsectionOption {
        code: 4,
        label: "501(c)(4) - Social Welfare",
    },
    SubsectionOption {
        code: 5,
        label: "501(c)(5) - Labor/Agricultural",
    },
    SubsectionOption {
        code: 6,
        label: "501(c)(6) - Business League",
    },
    SubsectionOption {
        code: 7,
        label: "501(c)(7) - Social/Recreation",
    },
];

pub fn subsection_label(code: i32) -> String {
    SUBSECTION_OPTIONS
        .iter()
        .find(|option| option.code == code)
        .map(|option| option.label.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// What the grid should do in response to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchCommand {
    Search(SearchFilters),
    Clear,
}

/// A removable badge for one active filter in the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChip {
    Query(String),
    Subsection(i32),
}

impl FilterChip {
    pub fn label(&self) -> String {
        match self {
            FilterChip::Query(q) => format!("Query: {q}"),
            FilterChip::Subsection(code) => format!("Type: {}", subsection_label(*code)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchControls {
    draft: SearchFilters,
    filters_open: bool,
}

impl Default for SearchControls {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchControls {
    pub fn new() -> Self {
        Self::from_filters(SearchFilters::defaults())
    }

    /// Seeds the draft from the filters the grid is currently showing.
    pub fn from_filters(filters: SearchFilters) -> Self {
        Self {
            draft: filters,
            filters_open: false,
        }
    }

    pub fn draft(&self) -> &SearchFilters {
        &self.draft
    }

    pub fn filters_open(&self) -> bool {
        self.filters_open
    }

    pub fn toggle_filters(&mut self) {
        self.filters_open = !self.filters_open;
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.draft.q = if text.is_empty() { None } else { Some(text) };
    }

    /// Empties the text box. Does not search.
    pub fn clear_query_field(&mut self) {
        self.draft.q = None;
    }

    pub fn set_search_type(&mut self, search_type: SearchType) {
        self.draft.search_type = Some(search_type);
    }

    /// `None` selects "All types".
    pub fn set_subsection(&mut self, code: Option<i32>) {
        self.draft.subseccd = code;
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.draft.limit = Some(limit).filter(|limit| *limit > 0);
    }

    /// Commits the draft. A draft without a query does not search.
    pub fn submit(&self) -> Option<SearchCommand> {
        self.draft
            .has_query()
            .then(|| SearchCommand::Search(self.draft.clone()))
    }

    /// Puts the chosen example in the query and searches right away.
    pub fn choose_example(&mut self, index: usize) -> Option<SearchCommand> {
        let example = EXAMPLE_QUERIES.get(index)?;
        self.set_query(*example);
        self.submit()
    }

    pub fn active_chips(&self) -> Vec<FilterChip> {
        let mut chips = Vec::new();
        if let Some(q) = self.draft.q.as_deref().filter(|q| !q.is_empty()) {
            chips.push(FilterChip::Query(q.to_string()));
        }
        if let Some(code) = self.draft.subseccd {
            chips.push(FilterChip::Subsection(code));
        }
        chips
    }

    /// Drops one filter from the draft without searching.
    pub fn remove_chip(&mut self, chip: &FilterChip) {
        match chip {
            FilterChip::Query(_) => self.draft.q = None,
            FilterChip::Subsection(_) => self.draft.subseccd = None,
        }
    }

    pub fn clear_all(&mut self) -> SearchCommand {
        self.draft = SearchFilters::defaults();
        SearchCommand::Clear
    }
}
