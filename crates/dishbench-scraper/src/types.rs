//! Raw shapes of the delivery search API, as seen in replayed responses.
//!
//! ## Observed shape
//!
//! The dish cards live at
//! `data.cards[i].groupedCard.cardGroupMap.DISH.cards[j]`, and each entry
//! nests the payload one level deeper than it looks: `card.card`.
//!
//! ```text
//! { "card": { "card": {
//!     "@type": "type.googleapis.com/swiggy.presentation.food.v2.Dish",
//!     "info": { "price": 34900, "imageId": "...",
//!               "ratings": { "aggregatedRating": {
//!                   "rating": "4.4", "ratingCount": "52 ratings", "ratingCountV2": "52" } } },
//!     "restaurant": { "info": { "name": "...", "locality": "...", "avgRating": 4.2,
//!                               "sla": { "deliveryTime": 31, "lastMileTravel": 2.3 } } }
//! } } }
//! ```
//!
//! ### Scalars
//! Numbers and strings are used interchangeably across responses: ratings
//! are strings, `price` is usually an integer but has been seen as a float or
//! string, and `avgRating` is a float or `"--"`. Every scalar is modeled as
//! [`Scalar`] and interpreted during normalization.
//!
//! ### Missing data
//! Any level may be absent. All fields are `Option` with `#[serde(default)]`;
//! a value of the wrong *kind* (an object where a scalar is expected) fails
//! deserialization for that card only.

use std::collections::BTreeMap;

use serde::Deserialize;

/// A network request observed while the search page loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub url: String,
    pub method: String,
    /// Header names are lower-cased, so each name appears once regardless of
    /// the casing the browser reported.
    pub headers: BTreeMap<String, String>,
}

impl CapturedRequest {
    pub fn new<I, K, V>(url: impl Into<String>, method: impl Into<String>, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let headers = headers
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_ascii_lowercase(), v.into()))
            .collect();
        Self {
            url: url.into(),
            method: method.into(),
            headers,
        }
    }

    /// Looks up a header by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// A JSON scalar whose type varies between responses.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

/// Outer wrapper of one entry in the `DISH.cards` array.
#[derive(Debug, Default, Deserialize)]
pub struct RawCardEnvelope {
    #[serde(default)]
    pub card: Option<RawCardWrapper>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawCardWrapper {
    #[serde(default)]
    pub card: Option<RawDishCard>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawDishCard {
    /// Protobuf type URL, e.g. `"type.googleapis.com/swiggy.presentation.food.v2.Dish"`.
    #[serde(rename = "@type", default)]
    pub type_url: Option<String>,
    #[serde(default)]
    pub info: Option<RawDishInfo>,
    #[serde(default)]
    pub restaurant: Option<RawRestaurantWrapper>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDishInfo {
    #[serde(default)]
    pub image_id: Option<String>,
    #[serde(default)]
    pub price: Option<Scalar>,
    #[serde(default)]
    pub ratings: Option<RawRatings>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRatings {
    #[serde(default)]
    pub aggregated_rating: Option<RawAggregatedRating>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAggregatedRating {
    #[serde(default)]
    pub rating: Option<Scalar>,
    #[serde(default)]
    pub rating_count: Option<Scalar>,
    #[serde(default, rename = "ratingCountV2")]
    pub rating_count_v2: Option<Scalar>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawRestaurantWrapper {
    #[serde(default)]
    pub info: Option<RawRestaurantInfo>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRestaurantInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub avg_rating: Option<Scalar>,
    #[serde(default)]
    pub sla: Option<RawSla>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSla {
    #[serde(default)]
    pub delivery_time: Option<Scalar>,
    #[serde(default)]
    pub last_mile_travel: Option<Scalar>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captured_request_lowercases_header_names() {
        let captured = CapturedRequest::new(
            "https://example.com/api/v3?lat=1",
            "GET",
            [("User-Agent", "HeadlessChrome"), ("X-Build", "42")],
        );
        assert_eq!(captured.header("user-agent"), Some("HeadlessChrome"));
        assert_eq!(captured.header("X-BUILD"), Some("42"));
        assert!(captured.headers.contains_key("x-build"));
    }

    #[test]
    fn captured_request_later_duplicate_header_wins() {
        let captured = CapturedRequest::new(
            "https://example.com/api/v3?",
            "GET",
            [("Accept", "text/html"), ("accept", "application/json")],
        );
        assert_eq!(captured.headers.len(), 1);
        assert_eq!(captured.header("accept"), Some("application/json"));
    }

    #[test]
    fn scalar_accepts_numbers_and_text() {
        let values: Vec<Scalar> = serde_json::from_str(r#"[349, 4.5, "4.4", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                Scalar::Int(349),
                Scalar::Float(4.5),
                Scalar::Text("4.4".to_owned()),
                Scalar::Bool(true)
            ]
        );
    }

    #[test]
    fn dish_card_ignores_unknown_fields() {
        let raw = serde_json::json!({
            "card": { "card": {
                "@type": "type.googleapis.com/swiggy.presentation.food.v2.Dish",
                "info": { "id": "123", "name": "Chicken Biryani", "price": 34900 },
                "restaurant": { "info": { "name": "Paradise", "cuisines": ["Biryani"] } },
                "hideRestaurantDetails": false
            } }
        });
        let envelope: RawCardEnvelope = serde_json::from_value(raw).unwrap();
        let dish = envelope.card.unwrap().card.unwrap();
        assert!(dish.type_url.unwrap().ends_with("Dish"));
        assert_eq!(dish.info.unwrap().price, Some(Scalar::Int(34_900)));
    }
}
