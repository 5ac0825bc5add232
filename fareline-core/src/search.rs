use fareline_shared::FlightResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

use crate::pagination::Paginator;
use crate::{CoreError, CoreResult};

pub const DEFAULT_ITEMS_PER_PAGE: i64 = 20;

/// Sentinel `page` value meaning "no pagination requested".
const ALL_PAGES: i64 = -1;

// ============================================================================
// Result Set
// ============================================================================

/// Merged provider results, sorted ascending by agony.
///
/// Ties keep their input order, so results sharing an agony value appear in
/// provider enumeration order and then in each provider's own order. The
/// backing slice is frozen once sorted; clones share it.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultSet {
    results: Arc<[FlightResult]>,
}

impl ResultSet {
    pub fn from_unsorted(mut results: Vec<FlightResult>) -> Self {
        // `sort_by` is stable.
        results.sort_by(|a, b| a.agony_score().total_cmp(&b.agony_score()));
        Self {
            results: results.into(),
        }
    }

    pub fn empty() -> Self {
        Self::from_unsorted(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn as_slice(&self) -> &[FlightResult] {
        &self.results
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlightResult> {
        self.results.iter()
    }

    /// Borrow the window selected by `spec`. Never panics on out-of-range pages.
    pub fn page(&self, spec: PageSpec) -> &[FlightResult] {
        &self.results[Paginator::slice(self.len(), spec)]
    }
}

impl Serialize for ResultSet {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.results.iter())
    }
}

impl<'de> Deserialize<'de> for ResultSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Re-sort on the way in so a stored value can never break ordering.
        Vec::<FlightResult>::deserialize(deserializer).map(Self::from_unsorted)
    }
}

// ============================================================================
// Page Spec
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSpec {
    /// Everything from index 0 through the end.
    #[default]
    All,
    /// Zero-based `page` of `items` results.
    Page { page: usize, items: usize },
}

impl PageSpec {
    /// Build from raw `page` / `items` query values.
    ///
    /// Missing values fall back to `page=-1` and `items=20`. `page=-1` selects
    /// [`PageSpec::All`]; `items` must still be numeric in that case.
    pub fn from_query(page: Option<&str>, items: Option<&str>) -> CoreResult<Self> {
        let page_raw = parse_param("page", page, ALL_PAGES)?;
        let items_raw = parse_param("items", items, DEFAULT_ITEMS_PER_PAGE)?;

        if page_raw == ALL_PAGES {
            return Ok(PageSpec::All);
        }

        let page = usize::try_from(page_raw).map_err(|_| CoreError::InvalidQueryParameter {
            name: "page",
            value: page_raw.to_string(),
        })?;
        let items = usize::try_from(items_raw)
            .ok()
            .filter(|n| *n > 0)
            .ok_or_else(|| CoreError::InvalidQueryParameter {
                name: "items",
                value: items_raw.to_string(),
            })?;

        Ok(PageSpec::Page { page, items })
    }
}

fn parse_param(name: &'static str, raw: Option<&str>, default: i64) -> CoreResult<i64> {
    match raw {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map_err(|_| CoreError::InvalidQueryParameter {
                name,
                value: value.to_string(),
            }),
    }
}
