//! Locating the dish card array inside a search API payload.
//!
//! The position of the `DISH` group inside `data.cards` is not stable, so
//! extraction tries an ordered list of named strategies and stops at the
//! first one that yields an array.

use serde_json::Value;

/// Path from a `data.cards` element to the dish card array.
const DISH_GROUP_POINTER: &str = "/groupedCard/cardGroupMap/DISH/cards";

/// One way of finding the dish card array in a payload.
pub struct ExtractionStrategy {
    pub name: &'static str,
    pub locate: fn(&Value) -> Option<&Vec<Value>>,
}

/// Strategies in the order they are attempted.
pub const STRATEGIES: &[ExtractionStrategy] = &[
    ExtractionStrategy {
        name: "fixed_index",
        locate: locate_fixed_index,
    },
    ExtractionStrategy {
        name: "group_scan",
        locate: locate_by_group_scan,
    },
];

/// Result of running the strategies over a payload.
#[derive(Debug, Clone, Copy)]
pub struct Extraction<'a> {
    pub cards: &'a [Value],
    /// Name of the strategy that matched, or `None` when nothing did.
    pub strategy: Option<&'static str>,
}

/// The `DISH` group sits at `data.cards[1]` in most responses.
fn locate_fixed_index(payload: &Value) -> Option<&Vec<Value>> {
    payload
        .pointer(&format!("/data/cards/1{DISH_GROUP_POINTER}"))
        .and_then(Value::as_array)
}

fn locate_by_group_scan(payload: &Value) -> Option<&Vec<Value>> {
    payload
        .pointer("/data/cards")
        .and_then(Value::as_array)?
        .iter()
        .find_map(|group| group.pointer(DISH_GROUP_POINTER).and_then(Value::as_array))
}

/// Returns the dish cards of `payload`, or an empty slice when no strategy
/// finds them. An empty result is a normal outcome: the search may simply
/// have no dishes for the query.
#[must_use]
pub fn extract_cards(payload: &Value) -> Extraction<'_> {
    for strategy in STRATEGIES {
        if let Some(cards) = (strategy.locate)(payload) {
            tracing::debug!(
                strategy = strategy.name,
                count = cards.len(),
                "located dish cards"
            );
            return Extraction {
                cards: cards.as_slice(),
                strategy: Some(strategy.name),
            };
        }
    }

    tracing::debug!("no extraction strategy matched the payload");
    Extraction {
        cards: &[],
        strategy: None,
    }
}
