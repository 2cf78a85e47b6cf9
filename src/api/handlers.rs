//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

use super::AppState;
use super::types::{CalculateRequest, ErrorResponse, NewPropertyRequest, OwnerQuery, SaveBillRequest};
use crate::billing::engine::{SystemStamper, calculate_bill_with};
use crate::billing::types::BillRecord;
use crate::property::{RentalProperty, RoomTemplate};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::BadRequest(_) | Self::Body(_) | Self::Path(_) | Self::Query(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Store(StoreError::BillNotFound(_) | StoreError::PropertyNotFound(_)) => {
                StatusCode::NOT_FOUND
            }
            Self::Store(StoreError::Poisoned) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

fn require_owner(query: OwnerQuery) -> Result<String, ApiError> {
    query
        .owner
        .filter(|o| !o.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("missing `owner` query parameter".to_string()))
}

fn compute(req: &CalculateRequest) -> BillRecord {
    let input = req.to_allocation_input();
    let malformed = input.malformed_readings();
    if !malformed.is_empty() {
        tracing::warn!(fields = ?malformed, "readings coerced to zero");
    }
    let record = calculate_bill_with(&input, &SystemStamper);
    let record = match (&req.property_id, &req.property_name) {
        (Some(id), name) => {
            let name = name.clone().unwrap_or_default();
            record.with_property(id.clone(), name)
        }
        (None, Some(name)) => record.with_property_name(name.clone()),
        (None, None) => record,
    };
    if record.submeter_excess() > 0.0 {
        tracing::warn!(
            bill = %record.id,
            excess_kwh = record.submeter_excess(),
            "submeters exceed main meter; excess not redistributed"
        );
    }
    record
}

/// `GET /health` → 200 `{"status":"ok"}`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Allocates a bill without saving it.
///
/// `POST /calculate` → 200 + `BillRecord` JSON
pub async fn calculate(
    payload: Result<Json<CalculateRequest>, JsonRejection>,
) -> Result<Json<BillRecord>, ApiError> {
    let Json(req) = payload?;
    let record = compute(&req);
    tracing::debug!(bill = %record.id, rooms = record.rooms.len(), "calculated bill");
    Ok(Json(record))
}

/// Allocates a bill and saves it for `owner`.
///
/// `POST /bills` → 201 + `BillRecord` JSON
pub async fn save_bill(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveBillRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BillRecord>), ApiError> {
    let Json(req) = payload?;
    if req.owner.trim().is_empty() {
        return Err(ApiError::BadRequest("`owner` must not be empty".to_string()));
    }
    let record = compute(&req.bill);
    state.store.save_bill(record.clone(), &req.owner)?;
    tracing::info!(bill = %record.id, owner = %req.owner, "saved bill");
    Ok((StatusCode::CREATED, Json(record)))
}

/// `GET /bills?owner=X` → 200 + newest-first `Vec<BillRecord>`
pub async fn list_bills(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<BillRecord>>, ApiError> {
    let Query(query) = query?;
    let owner = require_owner(query)?;
    Ok(Json(state.store.bills(&owner)?))
}

/// `DELETE /bills/{id}` → 204, or 404 if unknown
pub async fn delete_bill(
    State(state): State<Arc<AppState>>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    state.store.delete_bill(id)?;
    tracing::info!(bill = %id, "deleted bill");
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /properties?owner=X` → 200 + newest-first `Vec<RentalProperty>`
pub async fn list_properties(
    State(state): State<Arc<AppState>>,
    query: Result<Query<OwnerQuery>, QueryRejection>,
) -> Result<Json<Vec<RentalProperty>>, ApiError> {
    let Query(query) = query?;
    let owner = require_owner(query)?;
    Ok(Json(state.store.properties(&owner)?))
}

/// `POST /properties` → 201 + `RentalProperty`
pub async fn create_property(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewPropertyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RentalProperty>), ApiError> {
    let Json(req) = payload?;
    if req.name.trim().is_empty() || req.owner.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "`name` and `owner` must not be empty".to_string(),
        ));
    }
    let mut property = RentalProperty::new(req.name, req.owner);
    if !req.rooms.is_empty() {
        property.rooms = req.rooms.into_iter().map(RoomTemplate::new).collect();
    }
    state.store.save_property(property.clone())?;
    Ok((StatusCode::CREATED, Json(property)))
}

/// `PUT /properties/{id}/rooms` with a `Vec<RoomTemplate>` body → 204
pub async fn replace_rooms(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Vec<RoomTemplate>>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(rooms) = payload?;
    state.store.update_property_rooms(&id, rooms)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /properties/{id}` → 204, or 404 if unknown
pub async fn delete_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_property(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
