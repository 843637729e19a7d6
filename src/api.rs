//! JSON endpoints over the catalog.
//!
//! | Route | Body on success |
//! |---|---|
//! | `GET /restaurants` | `{"restaurants": [..]}` |
//! | `GET /restaurants/details/{id}` | `{"restaurants": {..}}` |
//! | `GET /restaurants/cuisine/{cuisine}` | `{"restaurants": {..}}` |
//! | `GET /restaurants/filter?isVeg=&hasOutdoorSeating=&isLuxury=` | `{"restaurants": [..]}` |
//! | `GET /restaurants/sort-by-rating` | `{"restaurants": [..]}` |
//! | `GET /dishes` | `{"dishes": [..]}` |
//! | `GET /dishes/details/{id}` | `{"dishes": [..]}` |
//! | `GET /dishes/filter?isVeg=` | `{"dishes": [..]}` |
//! | `GET /dishes/sort-by-price` | `{"dishes": [..]}` |
//!
//! An empty result is `404 {"message": ..}`, never an empty 200. A failed
//! statement is `500 {"error": <driver message>}`. An uninstalled store is
//! `500 {"error": "Database not initialized yet"}`.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::warn;

use crate::catalog::{self, RestaurantFilter};
use crate::handler::with_state;
use crate::health;
use crate::method::Method;
use crate::request::Request;
use crate::response::{IntoResponse, Response};
use crate::router::Router;
use crate::status::Status;
use crate::store::{NotReady, Row, SharedStore, StoreError};

const RESTAURANTS: &str = "restaurants";
const DISHES: &str = "dishes";

const NO_RESTAURANTS: &str = "No Restaurants found";
const NO_RESTAURANT: &str = "No Restaurant found";
const NO_DISHES: &str = "No dishes found";

/// Builds the full route table over `db`, including health probes.
pub fn routes(db: SharedStore) -> Router {
    Router::new()
        .on(Method::Get, "/restaurants",                    with_state(db.clone(), list_restaurants))
        .on(Method::Get, "/restaurants/details/{id}",       with_state(db.clone(), restaurant_by_id))
        .on(Method::Get, "/restaurants/cuisine/{cuisine}",  with_state(db.clone(), restaurant_by_cuisine))
        .on(Method::Get, "/restaurants/filter",             with_state(db.clone(), filter_restaurants))
        .on(Method::Get, "/restaurants/sort-by-rating",     with_state(db.clone(), restaurants_by_rating))
        .on(Method::Get, "/dishes",                         with_state(db.clone(), list_dishes))
        .on(Method::Get, "/dishes/details/{id}",            with_state(db.clone(), dish_by_id))
        .on(Method::Get, "/dishes/filter",                  with_state(db.clone(), filter_dishes))
        .on(Method::Get, "/dishes/sort-by-price",           with_state(db.clone(), dishes_by_price))
        .on(Method::Get, "/healthz",                        health::liveness)
        .on(Method::Get, "/readyz",                         with_state(db, health::readiness))
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Why a query endpoint did not answer 200.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    NotReady(#[from] NotReady),
    #[error("{0}")]
    NotFound(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::NotFound(message) => (Status::NotFound, json!({ "message": message })),
            Self::NotReady(_) | Self::Store(_) => {
                warn!(error = %self, "query failed");
                (Status::InternalServerError, json!({ "error": self.to_string() }))
            }
        };
        json_response(status, &body)
    }
}

fn json_response(status: Status, body: &Value) -> Response {
    // Serializing a `Value` cannot fail: map keys are always strings.
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    Response::builder().status(status).json(bytes)
}

/// `200 {"<key>": <payload>}`.
fn found(key: &'static str, payload: impl Into<Value>) -> Response {
    let mut body = serde_json::Map::with_capacity(1);
    body.insert(key.to_owned(), payload.into());
    json_response(Status::Ok, &Value::Object(body))
}

fn non_empty(rows: Vec<Row>, message: &'static str) -> Result<Vec<Row>, ApiError> {
    if rows.is_empty() {
        return Err(ApiError::NotFound(message));
    }
    Ok(rows)
}

fn rows_value(rows: Vec<Row>) -> Value {
    Value::Array(rows.into_iter().map(Value::Object).collect())
}

// ── Restaurants ───────────────────────────────────────────────────────────────

async fn list_restaurants(db: SharedStore, _req: Request) -> Result<Response, ApiError> {
    let rows = catalog::restaurants(db.get()?).await?;
    Ok(found(RESTAURANTS, rows_value(non_empty(rows, NO_RESTAURANTS)?)))
}

async fn restaurant_by_id(db: SharedStore, req: Request) -> Result<Response, ApiError> {
    let id = req.param("id").unwrap_or_default();
    let row = catalog::restaurant_by_id(db.get()?, id)
        .await?
        .ok_or(ApiError::NotFound(NO_RESTAURANTS))?;
    Ok(found(RESTAURANTS, row))
}

async fn restaurant_by_cuisine(db: SharedStore, req: Request) -> Result<Response, ApiError> {
    let cuisine = req.param("cuisine").unwrap_or_default();
    let row = catalog::restaurant_by_cuisine(db.get()?, cuisine)
        .await?
        .ok_or(ApiError::NotFound(NO_RESTAURANT))?;
    Ok(found(RESTAURANTS, row))
}

async fn filter_restaurants(db: SharedStore, req: Request) -> Result<Response, ApiError> {
    let filter = RestaurantFilter {
        is_veg: req.query("isVeg").map(str::to_owned),
        has_outdoor_seating: req.query("hasOutdoorSeating").map(str::to_owned),
        is_luxury: req.query("isLuxury").map(str::to_owned),
    };
    let rows = catalog::restaurants_filtered(db.get()?, &filter).await?;
    Ok(found(RESTAURANTS, rows_value(non_empty(rows, NO_RESTAURANT)?)))
}

async fn restaurants_by_rating(db: SharedStore, _req: Request) -> Result<Response, ApiError> {
    let rows = catalog::restaurants_by_rating(db.get()?).await?;
    Ok(found(RESTAURANTS, rows_value(non_empty(rows, NO_RESTAURANT)?)))
}

// ── Dishes ────────────────────────────────────────────────────────────────────

async fn list_dishes(db: SharedStore, _req: Request) -> Result<Response, ApiError> {
    let rows = catalog::dishes(db.get()?).await?;
    Ok(found(DISHES, rows_value(non_empty(rows, NO_DISHES)?)))
}

async fn dish_by_id(db: SharedStore, req: Request) -> Result<Response, ApiError> {
    let id = req.param("id").unwrap_or_default();
    let rows = catalog::dishes_by_id(db.get()?, id).await?;
    Ok(found(DISHES, rows_value(non_empty(rows, NO_DISHES)?)))
}

async fn filter_dishes(db: SharedStore, req: Request) -> Result<Response, ApiError> {
    let rows = catalog::dishes_by_veg(db.get()?, req.query("isVeg")).await?;
    Ok(found(DISHES, rows_value(non_empty(rows, NO_DISHES)?)))
}

async fn dishes_by_price(db: SharedStore, _req: Request) -> Result<Response, ApiError> {
    let rows = catalog::dishes_by_price(db.get()?).await?;
    Ok(found(DISHES, rows_value(non_empty(rows, NO_DISHES)?)))
}
