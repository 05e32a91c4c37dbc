// src/models/questionnaire.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::listing::SearchType;

/// Read-only projection of an active questionnaire for listings.
/// Built per response, never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireListItem {
    pub id: String,
    pub title: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub student_finished_at: Option<chrono::DateTime<chrono::Utc>>,
    pub teacher_finished_at: Option<chrono::DateTime<chrono::Utc>>,

    /// The student of record. Populated only for privileged callers;
    /// a student browsing their own dashboard does not get it echoed back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentRef>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: String,
    pub full_name: String,
}

/// Query parameters for the dashboard listing endpoint.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    #[validate(length(max = 100, message = "Search term must be at most 100 characters."))]
    pub search_term: Option<String>,

    /// 'name' (default) or 'id'.
    #[serde(default)]
    pub search_type: SearchType,

    /// 1-based page number, default 1.
    pub current_page: Option<i64>,

    /// Items per page, default 5.
    pub page_size: Option<i64>,

    #[serde(default)]
    pub filter_student_completed: bool,

    #[serde(default)]
    pub filter_teacher_completed: bool,

    /// Restrict to one student's questionnaires. Students may only pass
    /// their own id here.
    pub student_id: Option<String>,
}
