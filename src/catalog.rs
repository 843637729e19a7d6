//! The fixed read statements over `restaurants` and `dishes`.
//!
//! Every function issues exactly one statement with bound parameters. Values
//! taken from the request are bound as text exactly as received; SQLite's
//! column affinity coerces them (`"1"` matches an INTEGER `id` of 1).
//! Absent filter values bind `NULL`, which never compares equal, so an
//! incomplete filter yields no rows rather than a wider match.

use crate::store::{Bind, Row, Store, StoreError};

const ALL_RESTAURANTS: &str = "SELECT * FROM restaurants";
const RESTAURANT_BY_ID: &str = "SELECT * FROM restaurants WHERE id = ?";
const RESTAURANT_BY_CUISINE: &str = "SELECT * FROM restaurants WHERE cuisine = ?";
const RESTAURANTS_FILTERED: &str =
    "SELECT * FROM restaurants WHERE isVeg = ? AND hasOutdoorSeating = ? AND isLuxury = ?";
const RESTAURANTS_BY_RATING: &str = "SELECT * FROM restaurants ORDER BY rating DESC";

const ALL_DISHES: &str = "SELECT * FROM dishes";
const DISH_BY_ID: &str = "SELECT * FROM dishes WHERE id = ?";
const DISHES_BY_VEG: &str = "SELECT * FROM dishes WHERE isVeg = ?";
const DISHES_BY_PRICE: &str = "SELECT * FROM dishes ORDER BY price";

/// Flag values for `/restaurants/filter`, as raw query-string text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestaurantFilter {
    pub is_veg: Option<String>,
    pub has_outdoor_seating: Option<String>,
    pub is_luxury: Option<String>,
}

impl RestaurantFilter {
    fn binds(&self) -> Vec<Bind> {
        vec![
            self.is_veg.clone(),
            self.has_outdoor_seating.clone(),
            self.is_luxury.clone(),
        ]
    }
}

pub async fn restaurants(store: &Store) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(ALL_RESTAURANTS, Vec::new()).await
}

pub async fn restaurant_by_id(store: &Store, id: &str) -> Result<Option<Row>, StoreError> {
    store.fetch_one(RESTAURANT_BY_ID, vec![Some(id.to_owned())]).await
}

/// First restaurant serving `cuisine`; later matches are not returned.
pub async fn restaurant_by_cuisine(store: &Store, cuisine: &str) -> Result<Option<Row>, StoreError> {
    store.fetch_one(RESTAURANT_BY_CUISINE, vec![Some(cuisine.to_owned())]).await
}

pub async fn restaurants_filtered(
    store: &Store,
    filter: &RestaurantFilter,
) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(RESTAURANTS_FILTERED, filter.binds()).await
}

/// Highest rating first.
pub async fn restaurants_by_rating(store: &Store) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(RESTAURANTS_BY_RATING, Vec::new()).await
}

pub async fn dishes(store: &Store) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(ALL_DISHES, Vec::new()).await
}

/// Dishes with `id`, as a list (at most one row for a unique id).
pub async fn dishes_by_id(store: &Store, id: &str) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(DISH_BY_ID, vec![Some(id.to_owned())]).await
}

pub async fn dishes_by_veg(store: &Store, is_veg: Option<&str>) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(DISHES_BY_VEG, vec![is_veg.map(str::to_owned)]).await
}

/// Cheapest first.
pub async fn dishes_by_price(store: &Store) -> Result<Vec<Row>, StoreError> {
    store.fetch_all(DISHES_BY_PRICE, Vec::new()).await
}
