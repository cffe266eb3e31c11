//! Typed category-to-record lookup with explicit, injectable randomness.

use std::collections::HashMap;

use rand::Rng;

use crate::catalog::model::{Category, GarmentRecord, OutfitRecommendation};

/// One display slot of a recommended outfit: the recommended category and
/// the concrete record chosen for it, if the catalog had one.
#[derive(Debug, Clone)]
pub struct OutfitSlot {
    pub category: Category,
    pub item: Option<GarmentRecord>,
}

/// Catalog snapshot keyed by category, insertion order preserved within
/// each category.
pub struct CategoryLookup {
    by_category: HashMap<Category, Vec<GarmentRecord>>,
}

impl CategoryLookup {
    pub fn from_records(records: &[GarmentRecord]) -> Self {
        let mut by_category: HashMap<Category, Vec<GarmentRecord>> = HashMap::new();
        for record in records {
            by_category
                .entry(record.category)
                .or_default()
                .push(record.clone());
        }
        Self { by_category }
    }

    /// Uniform random choice over the category's records. `None` when the
    /// category holds no records.
    pub fn pick<R: Rng + ?Sized>(&self, category: Category, rng: &mut R) -> Option<&GarmentRecord> {
        let items = self.by_category.get(&category)?;
        if items.is_empty() {
            return None;
        }
        items.get(rng.gen_range(0..items.len()))
    }
}

/// Resolves each recommended category to a concrete record. A category with
/// no records yields an unfilled slot, not a failure; slot order follows
/// the recommendation.
pub fn pick_outfit_items<R: Rng + ?Sized>(
    recommendation: &OutfitRecommendation,
    lookup: &CategoryLookup,
    rng: &mut R,
) -> Vec<OutfitSlot> {
    recommendation
        .items
        .iter()
        .map(|&category| OutfitSlot {
            category,
            item: lookup.pick(category, rng).cloned(),
        })
        .collect()
}
