// src/listing/mod.rs
//
// Filter and query-building layer shared by the offset (dashboard) and
// keyset (template/admin) listing variants. The structs here are the
// "built query" handed to a `ListingStore`; the Postgres store translates
// them to SQL, test stores evaluate them directly.

use std::cmp::Ordering;

use serde::Deserialize;

use crate::pagination::{Order, SortKey};

/// How a search term is interpreted.
///
/// Policy (asserted in tests): `Id` is an exact match on the row id; `Name`
/// is a case-insensitive substring match over the display names joined from
/// the users table (for templates, over the title).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    #[default]
    Name,
    Id,
}

/// User-supplied filters for the questionnaire listings.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub search_term: Option<String>,
    pub search_type: SearchType,
    /// Keep only rows the student has completed.
    pub student_done: bool,
    /// Keep only rows the teacher has completed.
    pub teacher_done: bool,
    /// Restrict to a single student of record. Subject to role scoping.
    pub student_id: Option<String>,
}

/// Row visibility for the requesting user. Computed server-side from the
/// authenticated claims, never from client input, and applied before any
/// user-supplied filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Privileged caller: no row restriction.
    All,
    /// Restricted to rows where the user is the student or teacher of record.
    User(String),
}

/// Position of the last row of the previous page.
#[derive(Debug, Clone)]
pub struct KeysetBound {
    pub key: SortKey,
    pub id: String,
}

impl KeysetBound {
    /// Whether a row at (`key`, `id`) lies strictly after this bound in the
    /// given order. This is the keyset predicate `(key, id) > (bound.key,
    /// bound.id)` lexicographically, flipped for descending orders.
    pub fn admits(&self, key: &SortKey, id: &str, order: Order) -> bool {
        let relative = self
            .key
            .compare(key)
            .then_with(|| self.id.as_str().cmp(id));
        if order.is_descending() {
            relative == Ordering::Greater
        } else {
            relative == Ordering::Less
        }
    }
}

/// Pagination bound of a built query.
#[derive(Debug, Clone)]
pub enum PageBound {
    Offset { offset: i64, limit: i64 },
    Keyset { after: Option<KeysetBound>, limit: i64 },
}

/// Built query against the active questionnaire listing.
#[derive(Debug, Clone)]
pub struct QuestionnaireQuery {
    pub filter: ListingFilter,
    pub scope: Scope,
    pub order: Order,
    pub page: PageBound,
}

/// Built query against the template listing.
#[derive(Debug, Clone)]
pub struct TemplateQuery {
    /// Case-insensitive substring match on the template title.
    pub title: Option<String>,
    /// Exact match on the template id.
    pub id: Option<String>,
    pub order: Order,
    pub after: Option<KeysetBound>,
    pub limit: i64,
}

/// Escapes LIKE metacharacters so a search term is matched literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
