//! Raw medicine endpoints: listing, grouping, promotion, and bulk replacement.

use crate::{
    api::{
        AppState,
        error::{ApiJson, ApiQuery, ApiResult},
    },
    core::{
        promotion::{self, PromotionRequest},
        raw_medicine::{self, PendingGroup},
        valid_name::ValidNameView,
    },
    storage::RawMedicine,
};
use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

/// Query for GET /api/raw-medicines
#[derive(Debug, Default, Deserialize)]
pub struct RawListQuery {
    /// Only return records not yet promoted
    #[serde(default)]
    pub pending: bool,
}

/// Body of PUT /api/raw-medicines/validate
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    /// Promotion parameters
    #[serde(alias = "medicineName")]
    pub medicineattributes: PromotionRequest,
}

/// Response of PUT /api/raw-medicines/validate
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    /// Human-readable outcome
    pub message: String,
    /// The created valid name
    pub valid_name: ValidNameView,
}

/// Response of PUT /api/raw-medicines
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceResponse {
    /// Human-readable outcome
    pub message: String,
    /// All valid names after the update
    pub valid_names: Vec<ValidNameView>,
}

/// GET /api/raw-medicines
pub async fn list_raw_medicines(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RawListQuery>,
) -> ApiResult<Json<Vec<RawMedicine>>> {
    let records = raw_medicine::list_raw_medicines(&state.raw_medicines, query.pending).await?;
    Ok(Json(records))
}

/// GET /api/raw-medicines/pending
pub async fn list_pending_groups(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PendingGroup>>> {
    let groups = raw_medicine::pending_groups(&state.db, &state.raw_medicines).await?;
    Ok(Json(groups))
}

/// PUT /api/raw-medicines/validate
pub async fn validate_raw_medicine(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ValidateRequest>,
) -> ApiResult<Json<ValidateResponse>> {
    let valid_name =
        promotion::promote(&state.db, &state.raw_medicines, body.medicineattributes).await?;
    Ok(Json(ValidateResponse {
        message: "Medicine validated successfully".to_string(),
        valid_name,
    }))
}

/// PUT /api/raw-medicines
pub async fn replace_raw_medicines(
    State(state): State<AppState>,
    ApiJson(records): ApiJson<Vec<RawMedicine>>,
) -> ApiResult<Json<ReplaceResponse>> {
    let valid_names =
        raw_medicine::replace_raw_medicines(&state.db, &state.raw_medicines, records).await?;
    Ok(Json(ReplaceResponse {
        message: "Raw medicines updated successfully".to_string(),
        valid_names,
    }))
}
