//! `POST /api/medicine/lookup`: identify a medicine from a package photo.
//!
//! The image is validated here and forwarded to the lookup worker; the
//! reply is split into the generic-name field and brand attributes.

use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::remote::{LookupRequest, MedicineLookup};

pub async fn lookup(
    State(ctx): State<ApiContext>,
    Json(request): Json<LookupRequest>,
) -> Result<Json<MedicineLookup>, ApiError> {
    request
        .validate(ctx.core.config.max_image_bytes)
        .map_err(ApiError::BadRequest)?;

    tracing::info!(mime = %request.mime, bytes = request.image.len(), "Medicine lookup");
    let result = ctx.core.lookup().lookup(&request).await?;
    Ok(Json(result))
}
