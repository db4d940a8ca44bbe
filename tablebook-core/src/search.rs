use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What the user typed into the search form. Rebuilt on every submission.
/// Date and time stay as wire strings; the server validates the format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchCriteria {
    pub date: String,
    pub time: String,
    pub people: u32,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
}

/// One raw availability row: a bookable (time, table) at one restaurant.
/// The search endpoint returns a flat list of these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    pub restaurant_id: i64,
    pub restaurant_name: String,
    pub city: String,
    pub cuisine: String,
    pub cost_rating: i32,
    pub rating: f64,
    pub available_time: String,
    pub table_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimeSlot {
    pub time: String,
    pub table_id: i64,
}

/// Per-restaurant view of the flat slot rows, as rendered to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestaurantCard {
    pub restaurant_id: i64,
    pub name: String,
    pub city: String,
    pub cuisine: String,
    pub cost_rating: i32,
    pub rating: f64,
    pub slots: Vec<TimeSlot>,
}

impl RestaurantCard {
    fn shell(row: &AvailabilitySlot) -> Self {
        Self {
            restaurant_id: row.restaurant_id,
            name: row.restaurant_name.clone(),
            city: row.city.clone(),
            cuisine: row.cuisine.clone(),
            cost_rating: row.cost_rating,
            rating: row.rating,
            slots: Vec::new(),
        }
    }
}

/// Group flat availability rows into per-restaurant cards.
///
/// Single pass keyed by restaurant id: the first row for a restaurant fixes
/// the restaurant-level fields, every row contributes its (time, table)
/// slot. Restaurants keep the order of their first appearance. An empty
/// input is an empty result, not an error.
pub fn group_availability(rows: &[AvailabilitySlot]) -> Vec<RestaurantCard> {
    let mut cards: Vec<RestaurantCard> = Vec::new();
    let mut index: HashMap<i64, usize> = HashMap::new();

    for row in rows {
        let at = *index.entry(row.restaurant_id).or_insert_with(|| {
            cards.push(RestaurantCard::shell(row));
            cards.len() - 1
        });
        cards[at].slots.push(TimeSlot {
            time: row.available_time.clone(),
            table_id: row.table_id,
        });
    }

    cards
}
