//! Valid name endpoints: CRUD and image upload.

use crate::{
    api::{
        AppState,
        error::{ApiError, ApiJson, ApiPath, ApiQuery, ApiResult},
    },
    core::valid_name::{self, ValidNameUpdate, ValidNameView},
    storage::ImageUpload,
};
use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

/// Multipart field carrying the image
const IMAGE_FIELD: &str = "image";

/// Query for GET /api/valid-names
#[derive(Debug, Default, Deserialize)]
pub struct ValidNameQuery {
    /// Case-insensitive substring filter on the name
    #[serde(default)]
    pub search: Option<String>,
}

/// Body of POST /api/valid-names
#[derive(Debug, Deserialize)]
pub struct CreateValidNameRequest {
    /// Canonical spelling
    #[serde(default)]
    pub name: String,
    /// Initial unit list
    #[serde(default)]
    pub units: Option<Vec<String>>,
}

/// Response of DELETE /api/valid-names/:id
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteValidNameResponse {
    /// Human-readable outcome
    pub message: String,
    /// The valid name as it was before deletion
    pub valid_name: ValidNameView,
}

/// GET /api/valid-names
pub async fn list_valid_names(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ValidNameQuery>,
) -> ApiResult<Json<Vec<ValidNameView>>> {
    let names = valid_name::list_valid_names(&state.db, query.search.as_deref()).await?;
    Ok(Json(names))
}

/// GET /api/valid-names/:id
pub async fn get_valid_name(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<ValidNameView>> {
    Ok(Json(valid_name::get_valid_name(&state.db, id).await?))
}

/// POST /api/valid-names
pub async fn create_valid_name(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateValidNameRequest>,
) -> ApiResult<(StatusCode, Json<ValidNameView>)> {
    let created =
        valid_name::create_valid_name(&state.db, body.name, body.units.unwrap_or_default()).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// PUT /api/valid-names/:id
pub async fn update_valid_name(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(update): ApiJson<ValidNameUpdate>,
) -> ApiResult<Json<ValidNameView>> {
    Ok(Json(valid_name::update_valid_name(&state.db, id, update).await?))
}

/// DELETE /api/valid-names/:id
pub async fn delete_valid_name(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Json<DeleteValidNameResponse>> {
    let deleted = valid_name::delete_valid_name(&state.db, state.images.as_ref(), id).await?;
    Ok(Json(DeleteValidNameResponse {
        message: "Valid name deleted".to_string(),
        valid_name: deleted,
    }))
}

/// Body limits surface as 413; anything else in the multipart stream is a bad request.
fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(format!("Multipart error: {}", err.body_text()))
    }
}

/// Pulls the `image` field out of a multipart body.
async fn read_image(mut multipart: Multipart) -> ApiResult<ImageUpload> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(multipart_error)?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        return Ok(ImageUpload {
            file_name,
            content_type,
            bytes: bytes.to_vec(),
        });
    }
    Err(ApiError::BadRequest("No image provided".to_string()))
}

/// PUT or POST /api/valid-names/:id/upload
pub async fn upload_image(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<ValidNameView>> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let upload = read_image(multipart).await?;
    let updated = valid_name::attach_image(&state.db, state.images.as_ref(), id, upload).await?;
    Ok(Json(updated))
}
