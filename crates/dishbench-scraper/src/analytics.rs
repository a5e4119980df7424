//! Price statistics and the top-rated card list.

use std::cmp::Ordering;

use dishbench_core::{
    AnalyticsResult, CardRatings, NormalizedCard, PriceExtreme, PriceVsDistance, PriceVsRating,
    TopCard,
};

/// Computes price statistics over `cards`.
///
/// Returns `None` for an empty slice; min/max are undefined there and the
/// pipeline reports "no cards" before reaching this point.
#[must_use]
pub fn aggregate(cards: &[NormalizedCard]) -> Option<AnalyticsResult> {
    let first = cards.first()?;
    let (min_card, max_card) = price_extremes(cards).unwrap_or((first, first));

    let price_vs_rating = cards
        .iter()
        .filter_map(|card| {
            card.rating_value().map(|rating| PriceVsRating {
                price: card.price,
                rating,
            })
        })
        .collect();

    let price_vs_distance = cards
        .iter()
        .map(|card| PriceVsDistance {
            price: card.price,
            distance: card.last_mile_travel,
        })
        .collect();

    Some(AnalyticsResult {
        min: summarize(min_card),
        max: summarize(max_card),
        avg_price: average_price(cards),
        price_vs_rating,
        price_vs_distance,
    })
}

/// A price that takes part in min/max/avg: present and positive.
fn listed_price(card: &NormalizedCard) -> Option<i64> {
    card.price.filter(|price| *price > 0)
}

/// Linear scan for the cheapest and most expensive card among those with a
/// listed price. Ties keep the first card encountered.
fn price_extremes(cards: &[NormalizedCard]) -> Option<(&NormalizedCard, &NormalizedCard)> {
    let mut priced = cards
        .iter()
        .filter_map(|card| listed_price(card).map(|price| (price, card)));
    let (first_price, first_card) = priced.next()?;

    let (mut min_price, mut min_card) = (first_price, first_card);
    let (mut max_price, mut max_card) = (first_price, first_card);
    for (price, card) in priced {
        if price < min_price {
            min_price = price;
            min_card = card;
        }
        if price > max_price {
            max_price = price;
            max_card = card;
        }
    }
    Some((min_card, max_card))
}

/// Mean of the positive prices. Missing and non-positive prices are left
/// out of both the sum and the count; returns 0 when none remain.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn average_price(cards: &[NormalizedCard]) -> f64 {
    let (sum, count) = cards
        .iter()
        .filter_map(listed_price)
        .fold((0_i128, 0_u64), |(sum, count), price| {
            (sum + i128::from(price), count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// The extreme's price is the listed price only, so a fallback card without
/// one reports no price rather than a value below the average.
fn summarize(card: &NormalizedCard) -> PriceExtreme {
    PriceExtreme {
        name: card.restaurant_name.clone(),
        price: listed_price(card),
        locality: card.locality.clone(),
        delivery_time: card.delivery_time.clone(),
        avg_rating: card.avg_rating_restaurant.clone(),
    }
}

/// Returns the `limit` highest-rated cards, best first, with image ids
/// rewritten into CDN URLs under `image_cdn_base`.
///
/// The sort is stable and an unparseable rating sorts as 0.
#[must_use]
pub fn top_rated(cards: &[NormalizedCard], limit: usize, image_cdn_base: &str) -> Vec<TopCard> {
    let mut ranked: Vec<&NormalizedCard> = cards.iter().collect();
    ranked.sort_by(|a, b| {
        let (a, b) = (a.rating_value().unwrap_or(0.0), b.rating_value().unwrap_or(0.0));
        b.partial_cmp(&a).unwrap_or(Ordering::Equal)
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|card| TopCard {
            name: card.restaurant_name.clone(),
            image_url: format!("{image_cdn_base}{}", card.image_id),
            price: card.price,
            ratings: CardRatings {
                rating: card.aggregated_rating.clone(),
                rating_count: card.rating_count,
                rating_count_v2: card.rating_count_v2,
            },
        })
        .collect()
}
