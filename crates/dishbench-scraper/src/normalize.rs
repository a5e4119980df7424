//! Normalization from raw search cards to [`dishbench_core::NormalizedCard`].
//!
//! Runs in three steps:
//! 1. read the raw JSON into a [`PartialCard`], rejecting cards that are not
//!    dishes or lack their info/restaurant objects;
//! 2. fill defaults in one place, [`PartialCard::fill_defaults`];
//! 3. apply the rating quality gate.
//!
//! Rejected cards are counted in [`DropCounts`], never reported as errors.

use dishbench_core::NormalizedCard;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{RawCardEnvelope, RawDishCard, Scalar};

/// Why a raw card was left out of the normalized batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRejection {
    /// The card's shape could not be read at all.
    Malformed,
    NotADish,
    MissingInfo,
    MissingRestaurant,
    /// Aggregated rating, rating count or rating count v2 missing or zero.
    IncompleteRatings,
}

/// Per-gate counters for cards dropped during normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropCounts {
    pub malformed: usize,
    pub not_a_dish: usize,
    pub missing_info: usize,
    pub missing_restaurant: usize,
    pub incomplete_ratings: usize,
}

impl DropCounts {
    fn record(&mut self, rejection: CardRejection) {
        match rejection {
            CardRejection::Malformed => self.malformed += 1,
            CardRejection::NotADish => self.not_a_dish += 1,
            CardRejection::MissingInfo => self.missing_info += 1,
            CardRejection::MissingRestaurant => self.missing_restaurant += 1,
            CardRejection::IncompleteRatings => self.incomplete_ratings += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.malformed
            + self.not_a_dish
            + self.missing_info
            + self.missing_restaurant
            + self.incomplete_ratings
    }
}

/// Cards that survived normalization plus the count of those that did not.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedBatch {
    pub cards: Vec<NormalizedCard>,
    pub drops: DropCounts,
}

/// Every value normalization reads from a dish card, before defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialCard {
    pub restaurant_name: Option<String>,
    pub image_id: Option<String>,
    pub price: Option<Scalar>,
    pub locality: Option<String>,
    pub delivery_time: Option<Scalar>,
    pub avg_rating_restaurant: Option<Scalar>,
    pub aggregated_rating: Option<Scalar>,
    pub rating_count: Option<Scalar>,
    pub rating_count_v2: Option<Scalar>,
    pub last_mile_travel: Option<Scalar>,
}

impl PartialCard {
    /// Reads a raw `DISH.cards` entry.
    ///
    /// # Errors
    ///
    /// Returns the [`CardRejection`] explaining why the card is not a usable
    /// dish card.
    pub fn from_raw(raw: &Value) -> Result<Self, CardRejection> {
        let envelope =
            RawCardEnvelope::deserialize(raw).map_err(|_| CardRejection::Malformed)?;
        let dish = envelope
            .card
            .and_then(|wrapper| wrapper.card)
            .unwrap_or_default();
        Self::from_dish(dish)
    }

    fn from_dish(dish: RawDishCard) -> Result<Self, CardRejection> {
        if !dish
            .type_url
            .as_deref()
            .is_some_and(|t| t.contains("Dish"))
        {
            return Err(CardRejection::NotADish);
        }
        let info = dish.info.ok_or(CardRejection::MissingInfo)?;
        let restaurant = dish
            .restaurant
            .and_then(|r| r.info)
            .ok_or(CardRejection::MissingRestaurant)?;

        let aggregated = info.ratings.and_then(|r| r.aggregated_rating);
        let (aggregated_rating, rating_count, rating_count_v2) = match aggregated {
            Some(a) => (a.rating, a.rating_count, a.rating_count_v2),
            None => (None, None, None),
        };
        let (delivery_time, last_mile_travel) = match restaurant.sla {
            Some(sla) => (sla.delivery_time, sla.last_mile_travel),
            None => (None, None),
        };

        Ok(Self {
            restaurant_name: restaurant.name,
            image_id: info.image_id,
            price: info.price,
            locality: restaurant.locality,
            delivery_time,
            avg_rating_restaurant: restaurant.avg_rating,
            aggregated_rating,
            rating_count,
            rating_count_v2,
            last_mile_travel,
        })
    }

    /// The default policy for missing data: empty text, zero counts and
    /// distance, and an absent price when the source price is missing or
    /// not an integer amount.
    #[must_use]
    pub fn fill_defaults(self) -> NormalizedCard {
        NormalizedCard {
            restaurant_name: self.restaurant_name.unwrap_or_default(),
            image_id: self.image_id.unwrap_or_default(),
            price: self.price.as_ref().and_then(Scalar::as_i64),
            locality: self.locality.unwrap_or_default(),
            delivery_time: text_or_empty(self.delivery_time.as_ref()),
            avg_rating_restaurant: text_or_empty(self.avg_rating_restaurant.as_ref()),
            aggregated_rating: text_or_empty(self.aggregated_rating.as_ref()),
            rating_count: self
                .rating_count
                .as_ref()
                .and_then(Scalar::as_count)
                .unwrap_or(0),
            rating_count_v2: self
                .rating_count_v2
                .as_ref()
                .and_then(Scalar::as_count)
                .unwrap_or(0),
            last_mile_travel: self
                .last_mile_travel
                .as_ref()
                .and_then(Scalar::as_f64)
                .unwrap_or(0.0),
        }
    }
}

fn text_or_empty(value: Option<&Scalar>) -> String {
    value.map(Scalar::to_text).unwrap_or_default()
}

/// Normalizes one raw card, applying the quality gate.
///
/// # Errors
///
/// Returns the [`CardRejection`] for cards that are dropped.
pub fn normalize_card(raw: &Value) -> Result<NormalizedCard, CardRejection> {
    let card = PartialCard::from_raw(raw)?.fill_defaults();
    if !card.has_complete_ratings() {
        return Err(CardRejection::IncompleteRatings);
    }
    Ok(card)
}

/// Normalizes a batch of raw cards. One bad card never aborts the batch.
#[must_use]
pub fn normalize_cards(raw_cards: &[Value]) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for raw in raw_cards {
        match normalize_card(raw) {
            Ok(card) => batch.cards.push(card),
            Err(rejection) => batch.drops.record(rejection),
        }
    }

    if batch.drops.total() > 0 {
        tracing::debug!(
            kept = batch.cards.len(),
            malformed = batch.drops.malformed,
            not_a_dish = batch.drops.not_a_dish,
            missing_info = batch.drops.missing_info,
            missing_restaurant = batch.drops.missing_restaurant,
            incomplete_ratings = batch.drops.incomplete_ratings,
            "dropped cards during normalization"
        );
    }
    batch
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
