// src/services/listing.rs
//
// Read-only listing service: validates the request, computes the
// non-overridable role scope, builds the query and assembles page results.
// Two pagination styles coexist on purpose: the dashboard needs a total page
// count (offset), the admin/template listings page by cursor (keyset).

use crate::error::AppError;
use crate::listing::{
    KeysetBound, ListingFilter, PageBound, QuestionnaireQuery, Scope, TemplateQuery,
};
use crate::models::questionnaire::{DashboardParams, QuestionnaireListItem, StudentRef};
use crate::models::template::{TemplateListParams, TemplateSummary};
use crate::pagination::{KeysetPage, OffsetPage, Order, decode_cursor, encode_cursor};
use crate::store::{ListingStore, QuestionnaireRow};
use crate::utils::jwt::Claims;

pub const DEFAULT_PAGE_SIZE: i64 = 5;

#[derive(Clone)]
pub struct ListingService<S> {
    store: S,
    max_page_size: i64,
}

impl<S: ListingStore> ListingService<S> {
    pub fn new(store: S, max_page_size: i64) -> Self {
        Self {
            store,
            max_page_size,
        }
    }

    /// Offset-paginated dashboard listing for the calling user.
    /// Newest questionnaires first.
    pub async fn dashboard(
        &self,
        claims: &Claims,
        params: DashboardParams,
    ) -> Result<OffsetPage<QuestionnaireListItem>, AppError> {
        let page_size = self.resolve_page_size(params.page_size)?;
        let current_page = params.current_page.unwrap_or(1);
        if current_page < 1 {
            return Err(AppError::BadRequest(
                "currentPage must be at least 1".to_string(),
            ));
        }
        // Checked math: a huge page number is a bad request, not a panic.
        let offset = current_page
            .checked_sub(1)
            .and_then(|page| page.checked_mul(page_size))
            .ok_or_else(|| AppError::BadRequest("currentPage is out of range".to_string()))?;

        let filter = ListingFilter {
            search_term: normalize_term(params.search_term),
            search_type: params.search_type,
            student_done: params.filter_student_completed,
            teacher_done: params.filter_teacher_completed,
            student_id: resolve_student_filter(claims, params.student_id)?,
        };

        let query = QuestionnaireQuery {
            filter,
            scope: scope_for(claims),
            order: Order::CreatedAtDesc,
            page: PageBound::Offset {
                offset,
                limit: page_size,
            },
        };

        let total = self.store.count_questionnaires(&query).await?;
        let rows = self.store.fetch_questionnaires(&query).await?;

        let include_student = is_privileged(claims);
        Ok(OffsetPage {
            items: rows
                .into_iter()
                .map(|row| to_item(row, include_student))
                .collect(),
            current_page,
            total_pages: total_pages(total, page_size),
        })
    }

    /// Keyset-paginated questionnaire listing. Fetches one row beyond the
    /// page to detect whether more exist, so no count query is needed; a
    /// short final page therefore already reports `has_more = false`.
    pub async fn questionnaires(
        &self,
        claims: &Claims,
        mut filter: ListingFilter,
        order: Order,
        page_size: Option<i64>,
        cursor: Option<&str>,
    ) -> Result<KeysetPage<QuestionnaireListItem>, AppError> {
        let page_size = self.resolve_page_size(page_size)?;
        filter.student_id = resolve_student_filter(claims, filter.student_id.take())?;

        let after = decode_bound(cursor, order)?;
        let query = QuestionnaireQuery {
            filter,
            scope: scope_for(claims),
            order,
            page: PageBound::Keyset {
                after,
                limit: page_size + 1,
            },
        };

        let mut rows = self.store.fetch_questionnaires(&query).await?;
        let has_more = rows.len() as i64 > page_size;
        rows.truncate(page_size as usize);

        let next_cursor = if has_more {
            rows.last()
                .map(|row| encode_cursor(order, &row.sort_key(order), &row.id))
        } else {
            None
        };

        let include_student = is_privileged(claims);
        Ok(KeysetPage {
            items: rows
                .into_iter()
                .map(|row| to_item(row, include_student))
                .collect(),
            next_cursor,
            has_more,
        })
    }

    /// Keyset-paginated template listing. Admin only; the role check lives
    /// here so it is enforced even if the route middleware is bypassed.
    pub async fn templates(
        &self,
        claims: &Claims,
        params: TemplateListParams,
    ) -> Result<KeysetPage<TemplateSummary>, AppError> {
        if claims.role != "admin" {
            return Err(AppError::Unauthorized(
                "Template listings are admin only".to_string(),
            ));
        }

        let page_size = self.resolve_page_size(params.page_size)?;
        let after = decode_bound(params.query_cursor.as_deref(), params.order)?;

        let query = TemplateQuery {
            title: normalize_term(params.title),
            id: params.id,
            order: params.order,
            after,
            limit: page_size + 1,
        };

        let mut rows = self.store.fetch_templates(&query).await?;
        let has_more = rows.len() as i64 > page_size;
        rows.truncate(page_size as usize);

        let next_cursor = if has_more {
            rows.last()
                .map(|row| encode_cursor(params.order, &row.sort_key(params.order), &row.id))
        } else {
            None
        };

        Ok(KeysetPage {
            items: rows
                .into_iter()
                .map(|row| TemplateSummary {
                    id: row.id,
                    title: row.title,
                    description: row.description,
                    created_at: row.created_at,
                    last_updated: row.last_updated,
                })
                .collect(),
            next_cursor,
            has_more,
        })
    }

    fn resolve_page_size(&self, requested: Option<i64>) -> Result<i64, AppError> {
        let size = requested.unwrap_or(DEFAULT_PAGE_SIZE);
        if size <= 0 || size > self.max_page_size {
            return Err(AppError::InvalidPageSize(format!(
                "pageSize must be between 1 and {}",
                self.max_page_size
            )));
        }
        Ok(size)
    }
}

/// Row visibility for the caller. Admins and teachers may list across all
/// rows; everyone else only sees rows where they are the student or teacher
/// of record.
fn scope_for(claims: &Claims) -> Scope {
    if is_privileged(claims) {
        Scope::All
    } else {
        Scope::User(claims.sub.clone())
    }
}

fn is_privileged(claims: &Claims) -> bool {
    matches!(claims.role.as_str(), "admin" | "teacher")
}

/// A student asking for another student's dashboard by id is rejected
/// outright rather than served an empty page.
fn resolve_student_filter(
    claims: &Claims,
    requested: Option<String>,
) -> Result<Option<String>, AppError> {
    match requested {
        None => Ok(None),
        Some(student_id) if is_privileged(claims) || student_id == claims.sub => {
            Ok(Some(student_id))
        }
        Some(_) => Err(AppError::Unauthorized(
            "You may only request your own dashboard".to_string(),
        )),
    }
}

fn decode_bound(cursor: Option<&str>, order: Order) -> Result<Option<KeysetBound>, AppError> {
    match cursor {
        None => Ok(None),
        Some(raw) => {
            let (key, id) = decode_cursor(raw, order)?;
            Ok(Some(KeysetBound { key, id }))
        }
    }
}

fn normalize_term(term: Option<String>) -> Option<String> {
    term.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 {
        0
    } else {
        (total + page_size - 1) / page_size
    }
}

fn to_item(row: QuestionnaireRow, include_student: bool) -> QuestionnaireListItem {
    QuestionnaireListItem {
        id: row.id,
        title: row.title,
        created_at: row.created_at,
        student_finished_at: row.student_finished_at,
        teacher_finished_at: row.teacher_finished_at,
        student: include_student.then_some(StudentRef {
            id: row.student_id,
            full_name: row.student_name,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(sub: &str, role: &str) -> Claims {
        Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: 0,
        }
    }

    #[test]
    fn students_are_scoped_to_their_own_rows() {
        assert_eq!(
            scope_for(&claims("u1", "student")),
            Scope::User("u1".to_string())
        );
        assert_eq!(scope_for(&claims("u2", "teacher")), Scope::All);
        assert_eq!(scope_for(&claims("u3", "admin")), Scope::All);
        // Unknown roles fall back to least privilege.
        assert_eq!(
            scope_for(&claims("u4", "auditor")),
            Scope::User("u4".to_string())
        );
    }

    #[test]
    fn student_filter_rejects_foreign_dashboards() {
        let student = claims("u1", "student");
        assert_eq!(
            resolve_student_filter(&student, Some("u1".to_string())).unwrap(),
            Some("u1".to_string())
        );
        let err = resolve_student_filter(&student, Some("u2".to_string())).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let teacher = claims("t1", "teacher");
        assert_eq!(
            resolve_student_filter(&teacher, Some("u2".to_string())).unwrap(),
            Some("u2".to_string())
        );
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(1, 5), 1);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(6, 5), 2);
        assert_eq!(total_pages(12, 5), 3);
    }

    #[test]
    fn blank_search_terms_are_dropped() {
        assert_eq!(normalize_term(Some("  ".to_string())), None);
        assert_eq!(
            normalize_term(Some(" Larsen ".to_string())),
            Some("Larsen".to_string())
        );
        assert_eq!(normalize_term(None), None);
    }
}
