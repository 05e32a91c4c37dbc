// src/handlers/questionnaire.rs

use axum::{
    Extension, Json,
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    error::AppError, models::questionnaire::DashboardParams, state::AppState, utils::jwt::Claims,
};

/// Offset-paginated dashboard listing for the calling user.
/// Requires: Login. Non-privileged callers only see their own rows.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<DashboardParams>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = params.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let page = state.listing.dashboard(&claims, params).await?;
    Ok(Json(page))
}
