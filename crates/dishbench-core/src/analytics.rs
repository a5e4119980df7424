//! Output contract of the price benchmark.
//!
//! Field names follow the JSON shape the menu dashboard already consumes
//! (`avgPrice`, `priceVSrating`, ...), so the serde renames here are part of
//! the contract.

use serde::{Deserialize, Serialize};

/// Summary of the cheapest or most expensive card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceExtreme {
    pub name: String,
    pub price: Option<i64>,
    pub locality: String,
    pub delivery_time: String,
    pub avg_rating: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVsRating {
    pub price: Option<i64>,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceVsDistance {
    pub price: Option<i64>,
    pub distance: f64,
}

/// Aggregate statistics over a non-empty set of normalized cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsResult {
    pub min: PriceExtreme,
    pub max: PriceExtreme,
    #[serde(rename = "avgPrice")]
    pub avg_price: f64,
    /// Unsorted; ordering is left to the presentation layer.
    #[serde(rename = "priceVSrating")]
    pub price_vs_rating: Vec<PriceVsRating>,
    #[serde(rename = "priceVSdistance")]
    pub price_vs_distance: Vec<PriceVsDistance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardRatings {
    pub rating: String,
    pub rating_count: u64,
    pub rating_count_v2: u64,
}

/// A highly rated card ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopCard {
    pub name: String,
    /// Fully qualified CDN URL, despite the field name.
    #[serde(rename = "imageId")]
    pub image_url: String,
    pub price: Option<i64>,
    pub ratings: CardRatings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub analytics: AnalyticsResult,
    pub cards: Vec<TopCard>,
}
