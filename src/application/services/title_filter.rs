//! Client-side title search over the loaded feed.

use std::borrow::Cow;

use crate::domain::entities::PhotoRecord;

/// Returns the records whose title contains `query`, in their original order.
///
/// An empty query borrows `items` as-is; otherwise the matches are cloned out.
/// Matching is a case-sensitive substring test.
#[must_use]
pub fn filter_by_title<'a>(items: &'a [PhotoRecord], query: &str) -> Cow<'a, [PhotoRecord]> {
    if query.is_empty() {
        return Cow::Borrowed(items);
    }

    Cow::Owned(
        items
            .iter()
            .filter(|record| record.title_contains(query))
            .cloned()
            .collect(),
    )
}
