// src/store/mod.rs

pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::listing::{QuestionnaireQuery, TemplateQuery};
use crate::pagination::{Order, SortKey};

pub use postgres::PgStore;

/// Failure of the backing store. Surfaced to callers as 503.
#[derive(Debug)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "store unavailable: {}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// A questionnaire row joined with its template title and the display names
/// of the student and teacher of record.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionnaireRow {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub student_finished_at: Option<DateTime<Utc>>,
    pub teacher_finished_at: Option<DateTime<Utc>>,
    pub student_id: String,
    pub teacher_id: String,
    pub student_name: String,
    pub teacher_name: String,
}

impl QuestionnaireRow {
    pub fn sort_key(&self, order: Order) -> SortKey {
        if order.sorts_by_title() {
            SortKey::Title(self.title.clone())
        } else {
            SortKey::CreatedAt(self.created_at)
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct TemplateRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl TemplateRow {
    pub fn sort_key(&self, order: Order) -> SortKey {
        if order.sorts_by_title() {
            SortKey::Title(self.title.clone())
        } else {
            SortKey::CreatedAt(self.created_at)
        }
    }
}

/// Store-access collaborator for the listing service. Implementations must
/// return rows in the query's order, bounded by its page bound; the service
/// never re-sorts.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn fetch_questionnaires(
        &self,
        query: &QuestionnaireQuery,
    ) -> Result<Vec<QuestionnaireRow>, StoreError>;

    /// Count of rows matching the query's filter and scope, ignoring the
    /// page bound. Only needed by the offset variant.
    async fn count_questionnaires(&self, query: &QuestionnaireQuery) -> Result<i64, StoreError>;

    async fn fetch_templates(&self, query: &TemplateQuery) -> Result<Vec<TemplateRow>, StoreError>;
}
