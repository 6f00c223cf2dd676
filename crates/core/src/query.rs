//! Page queries sent to the collection gateway.
//!
//! A [`PageQuery`] is an immutable value. Every sort, filter or keyword change
//! produces a new query positioned at page 0, so pagination can never carry
//! over from one result set into another.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Pagination defaults
// ---------------------------------------------------------------------------

/// Default number of entities per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Maximum number of entities per page accepted by the collection service.
pub const MAX_PAGE_SIZE: u32 = 100;

// ---------------------------------------------------------------------------
// Sort / filter
// ---------------------------------------------------------------------------

/// Server-side ordering of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Relevance,
    NameAsc,
    NameDesc,
    LevelAsc,
    LevelDesc,
    RecentlyBookmarked,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Relevance => "relevance",
            SortOrder::NameAsc => "name_asc",
            SortOrder::NameDesc => "name_desc",
            SortOrder::LevelAsc => "level_asc",
            SortOrder::LevelDesc => "level_desc",
            SortOrder::RecentlyBookmarked => "recently_bookmarked",
        }
    }
}

/// Filter selection from a filter sheet.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListFilter {
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    #[serde(default)]
    pub job_ids: Vec<i64>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
}

impl ListFilter {
    pub fn is_empty(&self) -> bool {
        self.min_level.is_none()
            && self.max_level.is_none()
            && self.job_ids.is_empty()
            && self.category_ids.is_empty()
    }

    pub fn level_range(min_level: i32, max_level: i32) -> Self {
        Self {
            min_level: Some(min_level),
            max_level: Some(max_level),
            ..Default::default()
        }
    }
}

// ---------------------------------------------------------------------------
// PageQuery
// ---------------------------------------------------------------------------

/// Everything the collection gateway needs to produce one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageQuery {
    pub keyword: Option<String>,
    pub sort: Option<SortOrder>,
    pub min_level: Option<i32>,
    pub max_level: Option<i32>,
    #[serde(default)]
    pub job_ids: Vec<i64>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    pub page: u32,
    pub page_size: u32,
}

impl PageQuery {
    /// An unfiltered, unsorted query for the first page.
    pub fn first_page(page_size: u32) -> Self {
        Self {
            keyword: None,
            sort: None,
            min_level: None,
            max_level: None,
            job_ids: Vec::new(),
            category_ids: Vec::new(),
            page: 0,
            page_size,
        }
    }

    /// Replace the keyword and rewind to page 0.
    ///
    /// Blank keywords are normalized to `None`.
    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.page = 0;
        self
    }

    /// Replace the sort order and rewind to page 0.
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = Some(sort);
        self.page = 0;
        self
    }

    /// Replace every filter field and rewind to page 0.
    pub fn with_filter(mut self, filter: ListFilter) -> Self {
        self.min_level = filter.min_level;
        self.max_level = filter.max_level;
        self.job_ids = filter.job_ids;
        self.category_ids = filter.category_ids;
        self.page = 0;
        self
    }

    /// Same query positioned at another page.
    pub fn at_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// Zero-based offset of the first entity on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.page_size)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.page_size == 0 {
            return Err(CoreError::Validation(
                "page_size must be greater than zero".to_string(),
            ));
        }
        if self.page_size > MAX_PAGE_SIZE {
            return Err(CoreError::Validation(format!(
                "page_size {} exceeds the maximum of {MAX_PAGE_SIZE}",
                self.page_size
            )));
        }
        if let (Some(min), Some(max)) = (self.min_level, self.max_level) {
            if min > max {
                return Err(CoreError::Validation(format!(
                    "min_level {min} is greater than max_level {max}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_SIZE)
    }
}
