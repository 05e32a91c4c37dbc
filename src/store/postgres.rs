// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::listing::{
    PageBound, QuestionnaireQuery, Scope, SearchType, TemplateQuery, escape_like,
};
use crate::pagination::{Order, SortKey};

use super::{ListingStore, QuestionnaireRow, StoreError, TemplateRow};

/// Postgres-backed listing store. Queries are assembled at runtime with
/// `sqlx::QueryBuilder`; the keyset bound uses a row-value comparison so the
/// composite index on (created_at, id) is usable.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingStore for PgStore {
    async fn fetch_questionnaires(
        &self,
        query: &QuestionnaireQuery,
    ) -> Result<Vec<QuestionnaireRow>, StoreError> {
        let mut builder = questionnaire_select(query);
        builder
            .build_query_as::<QuestionnaireRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch questionnaires: {:?}", e);
                StoreError(e.to_string())
            })
    }

    async fn count_questionnaires(&self, query: &QuestionnaireQuery) -> Result<i64, StoreError> {
        let mut builder = questionnaire_count(query);
        builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count questionnaires: {:?}", e);
                StoreError(e.to_string())
            })
    }

    async fn fetch_templates(&self, query: &TemplateQuery) -> Result<Vec<TemplateRow>, StoreError> {
        let mut builder = template_select(query);
        builder
            .build_query_as::<TemplateRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch templates: {:?}", e);
                StoreError(e.to_string())
            })
    }
}

const QUESTIONNAIRE_FROM: &str = r#"
FROM active_questionnaires aq
JOIN question_templates t ON t.id = aq.template_reference_id
JOIN users s ON s.id = aq.student_id
JOIN users te ON te.id = aq.teacher_id
WHERE 1 = 1"#;

fn questionnaire_select(query: &QuestionnaireQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(
        "SELECT aq.id, t.title, aq.created_at, aq.student_finished_at, \
         aq.teacher_finished_at, aq.student_id, aq.teacher_id, \
         s.full_name AS student_name, te.full_name AS teacher_name",
    );
    qb.push(QUESTIONNAIRE_FROM);
    push_questionnaire_predicates(&mut qb, query);

    if let PageBound::Keyset { after: Some(bound), .. } = &query.page {
        qb.push(" AND ");
        qb.push(keyset_columns(query.order));
        qb.push(if query.order.is_descending() { " < (" } else { " > (" });
        push_sort_key(&mut qb, &bound.key);
        qb.push(", ");
        qb.push_bind(bound.id.clone());
        qb.push(")");
    }

    qb.push(" ORDER BY ");
    qb.push(order_by_clause(query.order));

    match &query.page {
        PageBound::Offset { offset, limit } => {
            qb.push(" LIMIT ");
            qb.push_bind(*limit);
            qb.push(" OFFSET ");
            qb.push_bind(*offset);
        }
        PageBound::Keyset { limit, .. } => {
            qb.push(" LIMIT ");
            qb.push_bind(*limit);
        }
    }

    qb
}

fn questionnaire_count(query: &QuestionnaireQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new("SELECT COUNT(*)");
    qb.push(QUESTIONNAIRE_FROM);
    push_questionnaire_predicates(&mut qb, query);
    qb
}

/// Scope first, then user-supplied filters. The scope predicate is not
/// overridable by anything the client sends.
fn push_questionnaire_predicates(qb: &mut QueryBuilder<'static, Postgres>, query: &QuestionnaireQuery) {
    if let Scope::User(user_id) = &query.scope {
        qb.push(" AND (aq.student_id = ");
        qb.push_bind(user_id.clone());
        qb.push(" OR aq.teacher_id = ");
        qb.push_bind(user_id.clone());
        qb.push(")");
    }

    if let Some(term) = &query.filter.search_term {
        match query.filter.search_type {
            SearchType::Id => {
                qb.push(" AND aq.id = ");
                qb.push_bind(term.clone());
            }
            SearchType::Name => {
                let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
                qb.push(" AND (LOWER(s.full_name) LIKE ");
                qb.push_bind(pattern.clone());
                qb.push(" ESCAPE '\\' OR LOWER(te.full_name) LIKE ");
                qb.push_bind(pattern);
                qb.push(" ESCAPE '\\')");
            }
        }
    }

    if query.filter.student_done {
        qb.push(" AND aq.student_finished_at IS NOT NULL");
    }
    if query.filter.teacher_done {
        qb.push(" AND aq.teacher_finished_at IS NOT NULL");
    }

    if let Some(student_id) = &query.filter.student_id {
        qb.push(" AND aq.student_id = ");
        qb.push_bind(student_id.clone());
    }
}

fn template_select(query: &TemplateQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb: QueryBuilder<'static, Postgres> = QueryBuilder::new(
        "SELECT t.id, t.title, t.description, t.created_at, t.last_updated \
         FROM question_templates t WHERE 1 = 1",
    );

    if let Some(id) = &query.id {
        qb.push(" AND t.id = ");
        qb.push_bind(id.clone());
    }

    if let Some(title) = &query.title {
        let pattern = format!("%{}%", escape_like(&title.to_lowercase()));
        qb.push(" AND LOWER(t.title) LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\'");
    }

    if let Some(bound) = &query.after {
        qb.push(" AND ");
        qb.push(template_keyset_columns(query.order));
        qb.push(if query.order.is_descending() { " < (" } else { " > (" });
        push_sort_key(&mut qb, &bound.key);
        qb.push(", ");
        qb.push_bind(bound.id.clone());
        qb.push(")");
    }

    qb.push(" ORDER BY ");
    qb.push(template_order_by_clause(query.order));
    qb.push(" LIMIT ");
    qb.push_bind(query.limit);

    qb
}

fn push_sort_key(qb: &mut QueryBuilder<'static, Postgres>, key: &SortKey) {
    match key {
        SortKey::CreatedAt(ts) => {
            qb.push_bind(*ts);
        }
        SortKey::Title(title) => {
            qb.push_bind(title.clone());
        }
    }
}

fn keyset_columns(order: Order) -> &'static str {
    if order.sorts_by_title() {
        "(t.title, aq.id)"
    } else {
        "(aq.created_at, aq.id)"
    }
}

fn order_by_clause(order: Order) -> &'static str {
    match order {
        Order::CreatedAtDesc => "aq.created_at DESC, aq.id DESC",
        Order::CreatedAtAsc => "aq.created_at ASC, aq.id ASC",
        Order::TitleAsc => "t.title ASC, aq.id ASC",
        Order::TitleDesc => "t.title DESC, aq.id DESC",
    }
}

fn template_keyset_columns(order: Order) -> &'static str {
    if order.sorts_by_title() {
        "(t.title, t.id)"
    } else {
        "(t.created_at, t.id)"
    }
}

fn template_order_by_clause(order: Order) -> &'static str {
    match order {
        Order::CreatedAtDesc => "t.created_at DESC, t.id DESC",
        Order::CreatedAtAsc => "t.created_at ASC, t.id ASC",
        Order::TitleAsc => "t.title ASC, t.id ASC",
        Order::TitleDesc => "t.title DESC, t.id DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{KeysetBound, ListingFilter};
    use chrono::{TimeZone, Utc};

    fn base_query(page: PageBound) -> QuestionnaireQuery {
        QuestionnaireQuery {
            filter: ListingFilter::default(),
            scope: Scope::All,
            order: Order::CreatedAtDesc,
            page,
        }
    }

    #[test]
    fn offset_select_orders_and_bounds() {
        let query = base_query(PageBound::Offset { offset: 10, limit: 5 });
        let qb = questionnaire_select(&query);
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY aq.created_at DESC, aq.id DESC"));
        assert!(sql.contains("LIMIT $1 OFFSET $2"));
    }

    #[test]
    fn keyset_select_uses_row_value_comparison() {
        let bound = KeysetBound {
            key: SortKey::CreatedAt(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            id: "abc".to_string(),
        };
        let query = base_query(PageBound::Keyset { after: Some(bound), limit: 6 });
        let qb = questionnaire_select(&query);
        let sql = qb.sql();
        assert!(sql.contains("(aq.created_at, aq.id) < ($1, $2)"));
    }

    #[test]
    fn ascending_title_order_flips_the_comparison() {
        let bound = KeysetBound {
            key: SortKey::Title("B".to_string()),
            id: "abc".to_string(),
        };
        let mut query = base_query(PageBound::Keyset { after: Some(bound), limit: 6 });
        query.order = Order::TitleAsc;
        let qb = questionnaire_select(&query);
        let sql = qb.sql();
        assert!(sql.contains("(t.title, aq.id) > ($1, $2)"));
        assert!(sql.contains("ORDER BY t.title ASC, aq.id ASC"));
    }

    #[test]
    fn scope_predicate_comes_before_filters() {
        let mut query = base_query(PageBound::Offset { offset: 0, limit: 5 });
        query.scope = Scope::User("u1".to_string());
        query.filter.search_term = Some("larsen".to_string());
        let qb = questionnaire_select(&query);
        let sql = qb.sql();

        let scope_pos = sql
            .find("(aq.student_id = $1 OR aq.teacher_id = $2)")
            .expect("scope predicate missing");
        let search_pos = sql
            .find("LOWER(s.full_name) LIKE $3")
            .expect("search predicate missing");
        assert!(scope_pos < search_pos);
    }

    #[test]
    fn completion_filters_require_non_null_timestamps() {
        let mut query = base_query(PageBound::Offset { offset: 0, limit: 5 });
        query.filter.student_done = true;
        query.filter.teacher_done = true;
        let sql_owned = {
            let qb = questionnaire_select(&query);
            qb.sql().to_string()
        };
        assert!(sql_owned.contains("aq.student_finished_at IS NOT NULL"));
        assert!(sql_owned.contains("aq.teacher_finished_at IS NOT NULL"));
    }

    #[test]
    fn id_search_is_exact_match() {
        let mut query = base_query(PageBound::Offset { offset: 0, limit: 5 });
        query.filter.search_term = Some("aB3dE5fG7h".to_string());
        query.filter.search_type = SearchType::Id;
        let qb = questionnaire_select(&query);
        assert!(qb.sql().contains("aq.id = $1"));
    }

    #[test]
    fn count_query_has_no_page_bound() {
        let query = base_query(PageBound::Offset { offset: 10, limit: 5 });
        let qb = questionnaire_count(&query);
        let sql = qb.sql();
        assert!(sql.starts_with("SELECT COUNT(*)"));
        assert!(!sql.contains("LIMIT"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn template_select_filters_and_orders() {
        let query = TemplateQuery {
            title: Some("trivsel".to_string()),
            id: None,
            order: Order::TitleAsc,
            after: None,
            limit: 6,
        };
        let qb = template_select(&query);
        let sql = qb.sql();
        assert!(sql.contains("LOWER(t.title) LIKE $1"));
        assert!(sql.contains("ORDER BY t.title ASC, t.id ASC"));
        assert!(sql.contains("LIMIT $2"));
    }
}
