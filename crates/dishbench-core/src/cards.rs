use serde::{Deserialize, Serialize};

/// A dish card from the delivery search surface, flattened and defaulted.
///
/// Only cards that pass the rating quality gate are kept past normalization,
/// so every value seen by the analytics carries a non-empty aggregated rating
/// and non-zero rating counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedCard {
    pub restaurant_name: String,
    /// CDN image id as delivered, e.g. `"a1b2c3/dish.jpg"`. May be empty.
    pub image_id: String,
    /// Dish price in currency minor units (paise). `None` when the source
    /// price was missing or not numeric.
    pub price: Option<i64>,
    pub locality: String,
    /// Delivery time as text; the upstream sends minutes as a number.
    pub delivery_time: String,
    /// Restaurant-level average rating as text, e.g. `"4.3"` or `"--"`.
    pub avg_rating_restaurant: String,
    /// Dish-level aggregated rating exactly as delivered, e.g. `"4.5"`.
    pub aggregated_rating: String,
    pub rating_count: u64,
    pub rating_count_v2: u64,
    /// Last-mile travel distance in kilometres.
    pub last_mile_travel: f64,
}

impl NormalizedCard {
    /// Returns the aggregated rating as a number, if it parses to a finite value.
    #[must_use]
    pub fn rating_value(&self) -> Option<f64> {
        self.aggregated_rating
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|r| r.is_finite())
    }

    /// Returns `true` when the rating trio is complete.
    ///
    /// An empty or zero aggregated rating, or a zero count, fails the gate.
    #[must_use]
    pub fn has_complete_ratings(&self) -> bool {
        let rating = self.aggregated_rating.trim();
        !rating.is_empty()
            && self.rating_value() != Some(0.0)
            && self.rating_count != 0
            && self.rating_count_v2 != 0
    }
}
