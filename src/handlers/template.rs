// src/handlers/template.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError, models::template::TemplateListParams, state::AppState, utils::jwt::Claims,
};

/// Keyset-paginated template listing.
/// Admin only; the cursor must match the requested ordering.
pub async fn list_templates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<TemplateListParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = params.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let page = state.listing.templates(&claims, params).await?;
    Ok(Json(page))
}
