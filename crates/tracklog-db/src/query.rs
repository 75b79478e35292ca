//! Filter and pagination compiler
//!
//! Turns declarative filter values into parameterized SQL fragments. Columns
//! are always `&'static str` supplied by this crate's entity modules; caller
//! values only ever become bound arguments. A [`WhereClause`] is the single
//! source for both the page query and its COUNT(*) twin, so the two always
//! agree on the predicate.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::executor::{SqlArg, Statement};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl SortDir {
    /// SQL keyword for this direction
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDir {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// An ORDER BY clause with a deterministic tie-break.
///
/// Ties on the sort column are broken by the primary key so pagination is
/// stable: stepping through pages never duplicates or drops a row whose sort
/// value equals its neighbors'.
#[derive(Debug, Clone)]
pub struct OrderBy {
    column: &'static str,
    direction: SortDir,
    tie_break: &'static str,
}

impl OrderBy {
    /// Order by `column`, breaking ties on `tie_break` (the primary key)
    pub fn new(column: &'static str, direction: SortDir, tie_break: &'static str) -> Self {
        Self {
            column,
            direction,
            tie_break,
        }
    }

    pub(crate) fn render(&self) -> String {
        if self.column == self.tie_break {
            format!("ORDER BY {} {}", self.column, self.direction.as_sql())
        } else {
            format!(
                "ORDER BY {} {}, {} {}",
                self.column,
                self.direction.as_sql(),
                self.tie_break,
                self.direction.as_sql()
            )
        }
    }
}

/// Default and maximum page size for one endpoint family
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_limit: i64,
    pub max_limit: i64,
}

impl PageLimits {
    /// Clamp a requested limit into [1, max], falling back to the default
    pub fn clamp_limit(&self, requested: Option<i64>) -> i64 {
        requested
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit)
    }
}

/// Per-endpoint page size configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
    pub locations: PageLimits,
    pub activities: PageLimits,
    pub track_points: PageLimits,
    pub unified: PageLimits,
    pub nearby: PageLimits,
    pub daily_summary: PageLimits,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            locations: PageLimits {
                default_limit: 50,
                max_limit: 1000,
            },
            activities: PageLimits {
                default_limit: 50,
                max_limit: 1000,
            },
            track_points: PageLimits {
                default_limit: 500,
                max_limit: 25000,
            },
            unified: PageLimits {
                default_limit: 100,
                max_limit: 5000,
            },
            nearby: PageLimits {
                default_limit: 100,
                max_limit: 5000,
            },
            daily_summary: PageLimits {
                default_limit: 30,
                max_limit: 365,
            },
        }
    }
}

/// Resolved paging parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub limit: i64,
    pub offset: i64,
}

impl PageParams {
    /// Apply defaults and bounds from configuration
    pub fn clamp(limit: Option<i64>, offset: Option<i64>, limits: &PageLimits) -> Self {
        Self {
            limit: limits.clamp_limit(limit),
            offset: offset.unwrap_or(0).max(0),
        }
    }
}

/// Escape LIKE/ILIKE metacharacters in a caller-supplied pattern fragment
fn escape_like(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Conjunction builder for WHERE clauses.
///
/// Only filters that were actually supplied contribute a conjunct; an
/// omitted filter adds nothing (never an implicit `IS NULL`). Placeholders
/// are numbered in the order arguments are pushed.
#[derive(Debug, Clone, Default)]
pub struct WhereClause {
    conjuncts: Vec<String>,
    args: Vec<SqlArg>,
}

impl WhereClause {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind(&mut self, arg: SqlArg) -> usize {
        self.args.push(arg);
        self.args.len()
    }

    /// `column = $n`
    pub fn eq(&mut self, column: &'static str, arg: SqlArg) {
        let n = self.bind(arg);
        self.conjuncts.push(format!("{column} = ${n}"));
    }

    /// `column >= $n`
    pub fn gte(&mut self, column: &'static str, arg: SqlArg) {
        let n = self.bind(arg);
        self.conjuncts.push(format!("{column} >= ${n}"));
    }

    /// `column <= $n`
    pub fn lte(&mut self, column: &'static str, arg: SqlArg) {
        let n = self.bind(arg);
        self.conjuncts.push(format!("{column} <= ${n}"));
    }

    /// `column < $n`
    pub fn lt(&mut self, column: &'static str, arg: SqlArg) {
        let n = self.bind(arg);
        self.conjuncts.push(format!("{column} < ${n}"));
    }

    /// Case-insensitive prefix match
    pub fn prefix(&mut self, column: &'static str, value: &str) {
        let n = self.bind(SqlArg::Text(format!("{}%", escape_like(value))));
        self.conjuncts.push(format!("{column} ILIKE ${n}"));
    }

    /// Case-insensitive substring match
    pub fn contains(&mut self, column: &'static str, value: &str) {
        let n = self.bind(SqlArg::Text(format!("%{}%", escape_like(value))));
        self.conjuncts.push(format!("{column} ILIKE ${n}"));
    }

    /// `column = ANY($n)`
    pub fn in_set(&mut self, column: &'static str, values: Vec<String>) {
        let n = self.bind(SqlArg::TextArray(values));
        self.conjuncts.push(format!("{column} = ANY(${n})"));
    }

    /// Timestamp column falls on or after the given calendar date
    pub fn date_on_or_after(&mut self, column: &'static str, date: chrono::NaiveDate) {
        let n = self.bind(SqlArg::Date(date));
        self.conjuncts.push(format!("{column} >= ${n}"));
    }

    /// Timestamp column falls strictly before the day after the given date,
    /// making a date-to filter inclusive of the whole end day
    pub fn date_before_next_day(&mut self, column: &'static str, date: chrono::NaiveDate) {
        let n = self.bind(SqlArg::Date(date));
        self.conjuncts
            .push(format!("{column} < (${n} + INTERVAL '1 day')"));
    }

    /// Timestamp column falls on exactly the given calendar date
    pub fn date_eq(&mut self, column: &'static str, date: chrono::NaiveDate) {
        let n = self.bind(SqlArg::Date(date));
        self.conjuncts.push(format!("DATE({column}) = ${n}"));
    }

    /// A fixed predicate with no arguments (e.g. `geog IS NOT NULL`)
    pub fn raw(&mut self, fragment: &'static str) {
        self.conjuncts.push(fragment.to_string());
    }

    /// Whether any conjunct was added
    pub fn is_empty(&self) -> bool {
        self.conjuncts.is_empty()
    }

    /// Arguments in placeholder order
    pub fn args(&self) -> &[SqlArg] {
        &self.args
    }

    /// Render `"WHERE a AND b"`, or an empty string when no filter applies
    pub fn render(&self) -> String {
        if self.conjuncts.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", self.conjuncts.join(" AND "))
        }
    }

    fn into_args(self) -> Vec<SqlArg> {
        self.args
    }
}

/// Assignment builder for partial UPDATEs
#[derive(Debug, Clone, Default)]
pub struct SetClause {
    assignments: Vec<String>,
    args: Vec<SqlArg>,
}

impl SetClause {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column = $n`
    pub fn set(&mut self, column: &'static str, arg: SqlArg) {
        self.args.push(arg);
        let n = self.args.len();
        self.assignments.push(format!("{column} = ${n}"));
    }

    /// A fixed assignment with no argument (e.g. `updated_at = NOW()`)
    pub fn raw(&mut self, assignment: &'static str) {
        self.assignments.push(assignment.to_string());
    }

    /// Whether any assignment binds an argument
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Number of bound arguments so far; the next free placeholder is this + 1
    pub fn args_len(&self) -> usize {
        self.args.len()
    }

    /// Render `"SET a = $1, b = $2"`
    pub fn render(&self) -> String {
        format!("SET {}", self.assignments.join(", "))
    }

    /// Consume into the bound arguments
    pub fn into_args(self) -> Vec<SqlArg> {
        self.args
    }
}

/// A compiled page query plus its matching COUNT(*) query.
///
/// Both statements share the same WHERE clause and argument prefix; the page
/// statement appends LIMIT/OFFSET as its two final placeholders.
#[derive(Debug, Clone)]
pub struct PagedQuery {
    pub items: Statement,
    pub items_args: Vec<SqlArg>,
    pub count: Statement,
    pub count_args: Vec<SqlArg>,
    pub page: PageParams,
}

/// Compile a paged SELECT and its COUNT twin from one filter
pub fn paged(
    label: &'static str,
    select_list: &'static str,
    from: &'static str,
    filter: WhereClause,
    order: &OrderBy,
    page: PageParams,
) -> PagedQuery {
    let where_sql = filter.render();
    let count_sql = if where_sql.is_empty() {
        format!("SELECT COUNT(*) FROM {from}")
    } else {
        format!("SELECT COUNT(*) FROM {from} {where_sql}")
    };

    let n = filter.args().len();
    let items_sql = if where_sql.is_empty() {
        format!(
            "SELECT {select_list} FROM {from} {} LIMIT ${} OFFSET ${}",
            order.render(),
            n + 1,
            n + 2
        )
    } else {
        format!(
            "SELECT {select_list} FROM {from} {where_sql} {} LIMIT ${} OFFSET ${}",
            order.render(),
            n + 1,
            n + 2
        )
    };

    let count_args = filter.args().to_vec();
    let mut items_args = filter.into_args();
    items_args.push(SqlArg::Int(page.limit));
    items_args.push(SqlArg::Int(page.offset));

    PagedQuery {
        items: Statement::compiled(label, items_sql),
        items_args,
        count: Statement::compiled(label, count_sql),
        count_args,
        page,
    }
}

/// Run a compiled page query: items plus the matching COUNT(*).
///
/// A failed count fails the whole operation; there is no partial page.
pub(crate) async fn fetch_page<T, F>(
    executor: &crate::executor::Executor,
    pq: PagedQuery,
    map: F,
) -> crate::error::DbResult<tracklog_core::Page<T>>
where
    F: Fn(&sqlx::postgres::PgRow) -> crate::error::DbResult<T>,
{
    let total = executor
        .fetch_scalar::<i64>(&pq.count, &pq.count_args)
        .await?
        .unwrap_or(0);

    let rows = executor.fetch_all(&pq.items, &pq.items_args).await?;
    let items = rows.iter().map(map).collect::<crate::error::DbResult<Vec<T>>>()?;

    Ok(tracklog_core::Page::new(
        items,
        total,
        pq.page.limit,
        pq.page.offset,
    ))
}
