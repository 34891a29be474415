//! Request extractors whose rejections use the `AppError` envelope.

use async_trait::async_trait;
use axum::{
    extract::{FromRequest, FromRequestParts, Query},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::AppError;

/// `axum::Json`, rejecting with `AppError` instead of plain text.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor that tolerates repeated keys.
///
/// The first occurrence of a key wins; later ones are ignored. Values reach
/// `T` as strings.
#[derive(Debug)]
pub struct ApiQuery<T>(pub T);

fn first_values(pairs: Vec<(String, String)>) -> Map<String, Value> {
    let mut map = Map::new();
    for (key, value) in pairs {
        map.entry(key).or_insert(Value::String(value));
    }
    map
}

#[async_trait]
impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
            .map_err(|e| AppError::BadRequest(e.body_text()))?;

        let value = serde_json::from_value(Value::Object(first_values(pairs)))
            .map_err(|e| AppError::BadRequest(format!("Invalid query string: {e}")))?;
        Ok(ApiQuery(value))
    }
}
