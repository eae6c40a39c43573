//! Query composition: filters, ordering, and paging over code-declared columns.

use super::builder::{quoted, QueryBuf};
use super::params::PgBindValue;

/// A predicate over columns. Column names are `'static` so they can only come from code.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq(&'static str, PgBindValue),
    Ne(&'static str, PgBindValue),
    IsNull(&'static str),
    IsNotNull(&'static str),
    In(&'static str, Vec<PgBindValue>),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<PgBindValue>) -> Self {
        Filter::Eq(column, value.into())
    }

    pub fn ne(column: &'static str, value: impl Into<PgBindValue>) -> Self {
        Filter::Ne(column, value.into())
    }

    pub fn and(self, other: Filter) -> Self {
        match self {
            Filter::And(mut parts) => {
                parts.push(other);
                Filter::And(parts)
            }
            first => Filter::And(vec![first, other]),
        }
    }

    /// Combine optional filters with AND. `None` when nothing was given.
    pub fn all(filters: impl IntoIterator<Item = Filter>) -> Option<Filter> {
        let mut parts: Vec<Filter> = filters.into_iter().collect();
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Filter::And(parts)),
        }
    }

    /// Render as a SQL boolean expression, pushing bound values onto `q`.
    pub(crate) fn render(&self, q: &mut QueryBuf) -> String {
        match self {
            Filter::Eq(col, v) => format!("{} = ${}", quoted(col), q.push_param(v.clone())),
            Filter::Ne(col, v) => format!("{} <> ${}", quoted(col), q.push_param(v.clone())),
            Filter::IsNull(col) => format!("{} IS NULL", quoted(col)),
            Filter::IsNotNull(col) => format!("{} IS NOT NULL", quoted(col)),
            Filter::In(_, values) if values.is_empty() => "FALSE".to_string(),
            Filter::In(col, values) => {
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| format!("${}", q.push_param(v.clone())))
                    .collect();
                format!("{} IN ({})", quoted(col), placeholders.join(", "))
            }
            Filter::And(parts) => join(parts, " AND ", "TRUE", q),
            Filter::Or(parts) => join(parts, " OR ", "FALSE", q),
            Filter::Not(inner) => format!("NOT ({})", inner.render(q)),
        }
    }
}

fn join(parts: &[Filter], sep: &str, empty: &str, q: &mut QueryBuf) -> String {
    if parts.is_empty() {
        return empty.to_string();
    }
    let rendered: Vec<String> = parts.iter().map(|p| format!("({})", p.render(q))).collect();
    rendered.join(sep)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderBy {
    pub column: &'static str,
    pub descending: bool,
}

impl OrderBy {
    pub fn asc(column: &'static str) -> Self {
        OrderBy { column, descending: false }
    }

    pub fn desc(column: &'static str) -> Self {
        OrderBy { column, descending: true }
    }

    pub(crate) fn render(&self) -> String {
        format!("{} {}", quoted(self.column), if self.descending { "DESC" } else { "ASC" })
    }
}

/// Most-recently-updated first.
pub const DEFAULT_ORDER: [OrderBy; 1] = [OrderBy { column: "updated_at", descending: true }];

/// Arguments to a list query. Offset and limit apply after filter and order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListQuery {
    pub filter: Option<Filter>,
    pub order_by: Option<Vec<OrderBy>>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl ListQuery {
    pub fn filtered(filter: Filter) -> Self {
        ListQuery {
            filter: Some(filter),
            ..Default::default()
        }
    }

    pub fn page(mut self, offset: Option<i64>, limit: Option<i64>) -> Self {
        self.offset = offset;
        self.limit = limit;
        self
    }
}
