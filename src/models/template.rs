// src/models/template.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::pagination::Order;

/// Read-only projection of a questionnaire template for admin listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSummary {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub last_updated: chrono::DateTime<chrono::Utc>,
}

/// Query parameters for the keyset-paginated template listing endpoint.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListParams {
    /// Items per page, default 5.
    pub page_size: Option<i64>,

    /// Sort order, default newest first.
    #[serde(default)]
    pub order: Order,

    /// Case-insensitive substring match on the template title.
    #[validate(length(max = 100, message = "Title filter must be at most 100 characters."))]
    pub title: Option<String>,

    /// Exact match on a template id.
    pub id: Option<String>,

    /// Cursor from the previous page. Must have been issued under the same
    /// `order` as this request.
    pub query_cursor: Option<String>,
}
