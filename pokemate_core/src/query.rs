//! Filtered, ranked reads over the shop index.

use crate::listing::{ListingRecord, ShopIndex};

/// Hard cap on records returned per query.
pub const MAX_RESULTS: usize = 10;

/// The four supported query shapes. All of them start from an exact key
/// lookup; the shape only changes the filter and the reply wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShopQuery {
    /// Every listing under the key.
    ByName,
    /// Listings flagged shiny.
    ShinyOnly,
    /// Listings flagged Gigantamax.
    GmaxOnly,
    /// Listings at or under a price ceiling.
    MaxPrice(u32),
}

impl ShopQuery {
    fn matches(self, record: &ListingRecord) -> bool {
        match self {
            Self::ByName => true,
            Self::ShinyOnly => record.shiny,
            Self::GmaxOnly => record.gmax,
            Self::MaxPrice(ceiling) => record.price <= ceiling,
        }
    }

    /// Title for a result block, built from the folded key.
    #[must_use]
    pub fn title(self, name: &str) -> String {
        match self {
            Self::ByName => name.to_string(),
            Self::ShinyOnly => format!("Shiny {name}"),
            Self::GmaxOnly => format!("G-Max {name}"),
            Self::MaxPrice(ceiling) => format!("{name} ≤ {ceiling}"),
        }
    }

    /// Reply when nothing matched, built from the name exactly as the
    /// user typed it.
    #[must_use]
    pub fn empty_message(self, raw_name: &str) -> String {
        match self {
            Self::ByName => format!("❌ No **{raw_name}** found."),
            Self::ShinyOnly => format!("✨ No shiny **{raw_name}** found."),
            Self::GmaxOnly => format!("💠 No Gigantamax **{raw_name}** found."),
            Self::MaxPrice(ceiling) => format!("❌ No **{raw_name}** under `{ceiling}`."),
        }
    }
}

/// Run a query: exact key lookup, shape filter, stable ascending sort by
/// price, then cap at [`MAX_RESULTS`].
///
/// A key that was never indexed and a key whose records all fail the
/// filter produce the same empty result.
#[must_use]
pub fn run(index: &ShopIndex, key: &str, query: ShopQuery) -> Vec<ListingRecord> {
    let mut hits: Vec<ListingRecord> = index
        .lookup(key)
        .iter()
        .filter(|record| query.matches(record))
        .cloned()
        .collect();
    // Stable sort, so equal prices keep arrival order.
    hits.sort_by_key(|record| record.price);
    hits.truncate(MAX_RESULTS);
    hits
}
