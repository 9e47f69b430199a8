//! Filtered-listing query construction.
//!
//! A [`ListFilter`] carries the four optional listing parameters and folds
//! them into bound predicates of a parameterized query. Composition is
//! AND-only; an absent or empty parameter contributes no predicate. Every
//! value goes through `push_bind`, never into the query text itself.

use sqlx::{QueryBuilder, Sqlite};

/// Optional listing parameters, one predicate each.
///
/// Case-insensitive matches rely on SQLite's `lower()`, which folds ASCII
/// letters only; non-ASCII input matches case-sensitively.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    /// Case-insensitive exact tag equality
    pub tag: Option<String>,
    /// Case-insensitive substring of the creator email
    pub created_by: Option<String>,
    /// UTC calendar day of creation, `YYYY-MM-DD`, exact equality
    pub date: Option<String>,
    /// Case-insensitive substring of the name, or substring of the phone digits
    pub q: Option<String>,
}

/// A single bound predicate derived from one listing parameter.
#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    TagEquals(String),
    CreatorContains(String),
    CreatedOn(String),
    Search(String),
}

impl Predicate {
    /// Appends this predicate's SQL fragment with its parameters bound.
    fn push_onto(self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Predicate::TagEquals(value) => {
                qb.push("lower(tag) = lower(");
                qb.push_bind(value);
                qb.push(")");
            }
            Predicate::CreatorContains(value) => {
                qb.push("lower(created_by_email) LIKE '%' || lower(");
                qb.push_bind(value);
                qb.push(") || '%'");
            }
            Predicate::CreatedOn(value) => {
                qb.push("strftime('%Y-%m-%d', created_at) = ");
                qb.push_bind(value);
            }
            Predicate::Search(value) => {
                qb.push("(lower(name) LIKE '%' || lower(");
                qb.push_bind(value.clone());
                qb.push(") || '%' OR phone LIKE '%' || ");
                qb.push_bind(value);
                qb.push(" || '%')");
            }
        }
    }
}

impl ListFilter {
    pub fn with_tag(self, tag: impl Into<String>) -> Self {
        Self { tag: Some(tag.into()), ..self }
    }

    pub fn with_created_by(self, created_by: impl Into<String>) -> Self {
        Self { created_by: Some(created_by.into()), ..self }
    }

    pub fn with_date(self, date: impl Into<String>) -> Self {
        Self { date: Some(date.into()), ..self }
    }

    pub fn with_q(self, q: impl Into<String>) -> Self {
        Self { q: Some(q.into()), ..self }
    }

    /// Collects the non-empty parameters into predicates, in a fixed order.
    fn predicates(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();
        if let Some(tag) = self.tag.as_deref().filter(|v| !v.is_empty()) {
            predicates.push(Predicate::TagEquals(tag.to_string()));
        }
        if let Some(created_by) = self.created_by.as_deref().filter(|v| !v.is_empty()) {
            predicates.push(Predicate::CreatorContains(created_by.to_string()));
        }
        if let Some(date) = self.date.as_deref().filter(|v| !v.is_empty()) {
            predicates.push(Predicate::CreatedOn(date.to_string()));
        }
        if let Some(q) = self.q.as_deref().filter(|v| !v.is_empty()) {
            predicates.push(Predicate::Search(q.to_string()));
        }
        predicates
    }

    /// Folds the predicates into `qb` as a `WHERE` clause.
    ///
    /// Appends nothing when every parameter is absent or empty.
    pub fn apply(&self, qb: &mut QueryBuilder<'_, Sqlite>) {
        for (i, predicate) in self.predicates().into_iter().enumerate() {
            qb.push(if i == 0 { " WHERE " } else { " AND " });
            predicate.push_onto(qb);
        }
    }
}
