use std::ops::Range;

use crate::search::PageSpec;

/// Maps a [`PageSpec`] onto a half-open index window over `total` results.
pub struct Paginator;

impl Paginator {
    /// Both bounds clamp to `total`, so a page past the end yields the empty
    /// range `total..total` rather than an error.
    pub fn slice(total: usize, spec: PageSpec) -> Range<usize> {
        match spec {
            PageSpec::All => 0..total,
            PageSpec::Page { page, items } => {
                let start = page.saturating_mul(items).min(total);
                let end = start.saturating_add(items).min(total);
                start..end
            }
        }
    }
}
