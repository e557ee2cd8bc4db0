//! Filtering, sorting and pagination of task listings.
//!
//! A listing is described by three independent values: a [`TaskFilter`], a
//! [`TaskSort`] and a [`PageRequest`]. [`TaskQueryBuilder`] turns the filter
//! into a single SeaORM [`Condition`]; the store applies sort and window.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::extension::sqlite::SqliteExpr;
use sea_orm::sea_query::{Expr, ExprTrait, Func, LikeExpr};
use sea_orm::{ColumnTrait, Condition, DbBackend, Order};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::entity::{self, to_db_time};
use crate::error::{TaskError, TaskResult};
use crate::models::{Task, TaskPriority, TaskStatus};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Optional, AND-combined listing criteria.
///
/// Date bounds: `*_after` is exclusive, `*_before` is inclusive.
/// Text criteria match case-insensitive substrings; blank text is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<TaskPriority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_after: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_before: Option<DateTime<Utc>>,
    /// Matches title or description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_due_date: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_overdue: Option<bool>,
}

impl TaskFilter {
    /// Trims text criteria and drops the blank ones.
    pub fn normalized(mut self) -> Self {
        self.assigned_to = non_blank(self.assigned_to);
        self.search = non_blank(self.search);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// In-memory evaluation of the same predicate the store runs.
    pub fn matches(&self, task: &Task, now: DateTime<Utc>) -> bool {
        let contains = |haystack: Option<&str>, needle: &str| {
            haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
        };

        self.status.is_none_or(|s| task.status == s)
            && self.priority.is_none_or(|p| task.priority == p)
            && non_blank_ref(&self.assigned_to)
                .is_none_or(|a| contains(task.assigned_to.as_deref(), a))
            && self.created_after.is_none_or(|t| task.created_at > t)
            && self.created_before.is_none_or(|t| task.created_at <= t)
            && self
                .due_after
                .is_none_or(|t| task.due_date.is_some_and(|due| due > t))
            && self
                .due_before
                .is_none_or(|t| task.due_date.is_some_and(|due| due <= t))
            && non_blank_ref(&self.search).is_none_or(|term| {
                contains(Some(&task.title), term) || contains(task.description.as_deref(), term)
            })
            && self
                .has_due_date
                .is_none_or(|has| task.due_date.is_some() == has)
            && self
                .is_overdue
                .is_none_or(|overdue| task.is_overdue(now) == overdue)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn non_blank_ref(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Sortable task columns
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskSortField {
    Id,
    Title,
    Description,
    Status,
    Priority,
    CreatedAt,
    UpdatedAt,
    DueDate,
    AssignedTo,
}

impl TaskSortField {
    pub fn column(self) -> entity::Column {
        match self {
            Self::Id => entity::Column::Id,
            Self::Title => entity::Column::Title,
            Self::Description => entity::Column::Description,
            Self::Status => entity::Column::Status,
            Self::Priority => entity::Column::Priority,
            Self::CreatedAt => entity::Column::CreatedAt,
            Self::UpdatedAt => entity::Column::UpdatedAt,
            Self::DueDate => entity::Column::DueDate,
            Self::AssignedTo => entity::Column::AssignedTo,
        }
    }

    /// Nullable columns sort their NULLs last in both directions.
    pub fn is_nullable(self) -> bool {
        matches!(
            self,
            Self::Description | Self::UpdatedAt | Self::DueDate | Self::AssignedTo
        )
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl From<SortOrder> for Order {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => Order::Asc,
            SortOrder::Desc => Order::Desc,
        }
    }
}

/// Sort directive. Ties are always broken by ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub order: SortOrder,
}

impl TaskSort {
    pub const DEFAULT: TaskSort = TaskSort {
        field: TaskSortField::CreatedAt,
        order: SortOrder::Desc,
    };

    pub fn new(field: TaskSortField, order: SortOrder) -> Self {
        Self { field, order }
    }

    /// Parses request values; a missing field or order takes the default.
    pub fn parse(field: Option<&str>, order: Option<&str>) -> TaskResult<Self> {
        let field = match field {
            None => Self::DEFAULT.field,
            Some(raw) => raw
                .parse()
                .map_err(|_| TaskError::Validation(format!("Unknown sort field '{raw}'")))?,
        };
        let order = match order {
            None => Self::DEFAULT.order,
            Some(raw) => raw.parse().map_err(|_| {
                TaskError::Validation(format!("Sort order must be 'asc' or 'desc', got '{raw}'"))
            })?,
        };
        Ok(Self { field, order })
    }
}

impl Default for TaskSort {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Either addressing mode for a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Offset { offset: i64, limit: i64 },
    /// 1-based page number
    Page { page: i64, page_size: i64 },
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Page {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Resolves the request to a row window, rejecting negative or oversized values.
    pub fn window(self) -> TaskResult<PageWindow> {
        let (offset, limit) = match self {
            PageRequest::Offset { offset, limit } => {
                if offset < 0 {
                    return Err(TaskError::Validation(format!(
                        "offset must not be negative, got {offset}"
                    )));
                }
                (offset, checked_limit("limit", limit)?)
            }
            PageRequest::Page { page, page_size } => {
                if page < 1 {
                    return Err(TaskError::Validation(format!(
                        "page must be at least 1, got {page}"
                    )));
                }
                let page_size = checked_limit("page_size", page_size)?;
                let offset = (page - 1).checked_mul(page_size).ok_or_else(|| {
                    TaskError::Validation(format!("page {page} is out of range"))
                })?;
                (offset, page_size)
            }
        };

        Ok(PageWindow {
            offset: offset as u64,
            limit: limit as u64,
        })
    }
}

fn checked_limit(name: &str, value: i64) -> TaskResult<i64> {
    if !(0..=MAX_PAGE_SIZE).contains(&value) {
        return Err(TaskError::Validation(format!(
            "{name} must be between 0 and {MAX_PAGE_SIZE}, got {value}"
        )));
    }
    Ok(value)
}

/// Row window resolved from a [`PageRequest`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

/// Pagination metadata, derived only from the window and the total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    /// Rows matching the filter, ignoring the window
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
    pub page: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    pub fn new(window: PageWindow, total: u64) -> Self {
        let PageWindow { offset, limit } = window;
        let (page, total_pages) = if limit == 0 {
            (1, 0)
        } else {
            (offset / limit + 1, total.div_ceil(limit))
        };

        Self {
            total,
            offset,
            limit,
            page,
            total_pages,
            has_next: offset.saturating_add(limit) < total,
            has_previous: offset > 0,
        }
    }
}

/// One page of a task listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskPage {
    pub items: Vec<Task>,
    #[serde(flatten)]
    pub meta: PageMeta,
    /// The criteria that constrained this listing
    pub filters_applied: TaskFilter,
    pub sort: TaskSort,
}

/// Everything the store needs to produce one page.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskQuery {
    pub filter: TaskFilter,
    pub sort: TaskSort,
    pub window: PageWindow,
    /// Reference time for `is_overdue`
    pub now: DateTime<Utc>,
}

impl TaskQuery {
    pub fn condition(&self, backend: DbBackend) -> Condition {
        TaskQueryBuilder::from_filter(&self.filter, backend, self.now).build()
    }
}

/// Narrows a task query one criterion at a time.
///
/// Every step takes an optional value and is a no-op when it is `None`, so
/// callers can chain all steps unconditionally. Order of steps does not
/// affect the result.
///
/// Text criteria are rendered per backend: `LOWER(col) LIKE` on PostgreSQL,
/// a case-widened `GLOB` on SQLite, whose `LOWER` only folds ASCII.
///
/// ```ignore
/// let condition = TaskQueryBuilder::new(DbBackend::Postgres, Utc::now())
///     .by_status(Some(TaskStatus::Pending))
///     .search_text(Some("invoice"))
///     .is_overdue(Some(true))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct TaskQueryBuilder {
    backend: DbBackend,
    now: DateTime<Utc>,
    condition: Condition,
}

impl TaskQueryBuilder {
    pub fn new(backend: DbBackend, now: DateTime<Utc>) -> Self {
        Self {
            backend,
            now,
            condition: Condition::all(),
        }
    }

    pub fn from_filter(filter: &TaskFilter, backend: DbBackend, now: DateTime<Utc>) -> Self {
        Self::new(backend, now)
            .by_status(filter.status)
            .by_priority(filter.priority)
            .by_assignee(filter.assigned_to.as_deref())
            .created_between(filter.created_after, filter.created_before)
            .due_between(filter.due_after, filter.due_before)
            .search_text(filter.search.as_deref())
            .has_due_date(filter.has_due_date)
            .is_overdue(filter.is_overdue)
    }

    pub fn by_status(mut self, status: Option<TaskStatus>) -> Self {
        if let Some(status) = status {
            self.condition = self.condition.add(entity::Column::Status.eq(status));
        }
        self
    }

    pub fn by_priority(mut self, priority: Option<TaskPriority>) -> Self {
        if let Some(priority) = priority {
            self.condition = self.condition.add(entity::Column::Priority.eq(priority));
        }
        self
    }

    pub fn by_assignee(mut self, assignee: Option<&str>) -> Self {
        if let Some(term) = trimmed(assignee) {
            let matches = contains_text(self.backend, entity::Column::AssignedTo, term);
            self.condition = self.condition.add(matches);
        }
        self
    }

    pub fn created_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        if let Some(after) = after {
            self.condition = self
                .condition
                .add(entity::Column::CreatedAt.gt(to_db_time(after)));
        }
        if let Some(before) = before {
            self.condition = self
                .condition
                .add(entity::Column::CreatedAt.lte(to_db_time(before)));
        }
        self
    }

    pub fn due_between(
        mut self,
        after: Option<DateTime<Utc>>,
        before: Option<DateTime<Utc>>,
    ) -> Self {
        if let Some(after) = after {
            self.condition = self
                .condition
                .add(entity::Column::DueDate.gt(to_db_time(after)));
        }
        if let Some(before) = before {
            self.condition = self
                .condition
                .add(entity::Column::DueDate.lte(to_db_time(before)));
        }
        self
    }

    /// Matches the term in the title or the description.
    pub fn search_text(mut self, term: Option<&str>) -> Self {
        if let Some(term) = trimmed(term) {
            let matches = Condition::any()
                .add(contains_text(self.backend, entity::Column::Title, term))
                .add(contains_text(self.backend, entity::Column::Description, term));
            self.condition = self.condition.add(matches);
        }
        self
    }

    pub fn has_due_date(mut self, has_due_date: Option<bool>) -> Self {
        match has_due_date {
            Some(true) => self.condition = self.condition.add(entity::Column::DueDate.is_not_null()),
            Some(false) => self.condition = self.condition.add(entity::Column::DueDate.is_null()),
            None => {}
        }
        self
    }

    /// `Some(false)` selects the exact complement of `Some(true)`.
    pub fn is_overdue(mut self, overdue: Option<bool>) -> Self {
        let now = to_db_time(self.now);
        match overdue {
            Some(true) => {
                self.condition = self.condition.add(
                    Condition::all()
                        .add(entity::Column::DueDate.is_not_null())
                        .add(entity::Column::DueDate.lt(now))
                        .add(entity::Column::Status.is_not_in(TaskStatus::TERMINAL)),
                );
            }
            Some(false) => {
                self.condition = self.condition.add(
                    Condition::any()
                        .add(entity::Column::DueDate.is_null())
                        .add(entity::Column::DueDate.gte(now))
                        .add(entity::Column::Status.is_in(TaskStatus::TERMINAL)),
                );
            }
            None => {}
        }
        self
    }

    pub fn build(self) -> Condition {
        self.condition
    }
}

fn trimmed(term: Option<&str>) -> Option<&str> {
    term.map(str::trim).filter(|t| !t.is_empty())
}

/// Case-insensitive substring match of `term` against `column`.
fn contains_text(backend: DbBackend, column: entity::Column, term: &str) -> Expr {
    match backend {
        DbBackend::Sqlite => Expr::col((entity::Entity, column)).glob(glob_pattern(term)),
        _ => Expr::expr(Func::lower(Expr::col((entity::Entity, column))))
            .like(LikeExpr::new(like_pattern(term)).escape('\\')),
    }
}

/// `%term%`, lowercased, with LIKE wildcards escaped.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// `*term*` for GLOB: every cased character becomes a `[xX]` class and the
/// GLOB metacharacters are bracketed so they match literally.
fn glob_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() * 4 + 2);
    pattern.push('*');
    for ch in term.chars() {
        let mut variants = vec![ch];
        for folded in [single_char(ch.to_lowercase()), single_char(ch.to_uppercase())]
            .into_iter()
            .flatten()
        {
            if !variants.contains(&folded) {
                variants.push(folded);
            }
        }

        if variants.len() > 1 || matches!(ch, '*' | '?' | '[') {
            pattern.push('[');
            pattern.extend(variants);
            pattern.push(']');
        } else {
            pattern.push(ch);
        }
    }
    pattern.push('*');
    pattern
}

fn single_char(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    chars.next().is_none().then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sea_orm::{DbBackend, EntityTrait, QueryFilter, QueryTrait};

    fn sql(condition: Condition) -> String {
        entity::Entity::find()
            .filter(condition)
            .build(DbBackend::Postgres)
            .to_string()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_builder_adds_no_predicates() {
        let condition = TaskQueryBuilder::new(DbBackend::Postgres, now())
            .by_status(None)
            .by_assignee(Some("   "))
            .search_text(Some(""))
            .build();
        let sql = sql(condition);

        let clause = sql.split_once(" WHERE ").map_or("", |(_, clause)| clause);
        assert!(clause.is_empty() || clause == "TRUE", "{sql}");
    }

    #[test]
    fn test_status_and_priority_are_and_combined() {
        let sql = sql(TaskQueryBuilder::new(DbBackend::Postgres, now())
            .by_status(Some(TaskStatus::InProgress))
            .by_priority(Some(TaskPriority::High))
            .build());
        assert!(sql.contains("\"status\" = 'in_progress'"), "{sql}");
        assert!(sql.contains("AND"), "{sql}");
        assert!(sql.contains("\"priority\" = 'high'"), "{sql}");
    }

    #[test]
    fn test_search_is_case_insensitive_over_title_or_description() {
        let sql = sql(TaskQueryBuilder::new(DbBackend::Postgres, now()).search_text(Some("Invoice")).build());
        assert!(sql.contains("LOWER(\"tasks\".\"title\")"), "{sql}");
        assert!(sql.contains("LOWER(\"tasks\".\"description\")"), "{sql}");
        assert!(sql.contains(" OR "), "{sql}");
        assert!(sql.contains("%invoice%"), "{sql}");
    }

    #[test]
    fn test_date_bounds_exclusive_after_inclusive_before() {
        let sql = sql(TaskQueryBuilder::new(DbBackend::Postgres, now())
            .created_between(Some(now() - Duration::days(1)), Some(now()))
            .build());
        assert!(sql.contains("\"created_at\" >"), "{sql}");
        assert!(!sql.contains("\"created_at\" >="), "{sql}");
        assert!(sql.contains("\"created_at\" <="), "{sql}");
    }

    #[test]
    fn test_overdue_true_and_false_shapes() {
        let overdue = sql(TaskQueryBuilder::new(DbBackend::Postgres, now()).is_overdue(Some(true)).build());
        assert!(overdue.contains("\"due_date\" IS NOT NULL"), "{overdue}");
        assert!(overdue.contains("NOT IN ('completed', 'cancelled')"), "{overdue}");

        let not_overdue = sql(TaskQueryBuilder::new(DbBackend::Postgres, now()).is_overdue(Some(false)).build());
        assert!(not_overdue.contains("\"due_date\" IS NULL"), "{not_overdue}");
        assert!(not_overdue.contains(" OR "), "{not_overdue}");
        assert!(not_overdue.contains("IN ('completed', 'cancelled')"), "{not_overdue}");
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("Ana"), "%ana%");
        assert_eq!(like_pattern("ÄPFEL"), "%äpfel%");
        assert_eq!(trimmed(Some(" ")), None);
        assert_eq!(trimmed(None), None);
    }

    #[test]
    fn test_glob_pattern_widens_case_and_brackets_metacharacters() {
        assert_eq!(glob_pattern("äpfel"), "*[äÄ][pP][fF][eE][lL]*");
        assert_eq!(glob_pattern("Äp"), "*[Ää][pP]*");
        assert_eq!(glob_pattern("a*1?[2]"), "*[aA][*]1[?][[]2]*");
        assert_eq!(glob_pattern("50%_"), "*50%_*");
    }

    #[test]
    fn test_sqlite_search_renders_glob() {
        let sql = entity::Entity::find()
            .filter(
                TaskQueryBuilder::new(DbBackend::Sqlite, now())
                    .search_text(Some("Äpfel"))
                    .build(),
            )
            .build(DbBackend::Sqlite)
            .to_string();

        assert!(sql.contains("\"title\" GLOB '*[Ää][pP][fF][eE][lL]*'"), "{sql}");
        assert!(sql.contains("\"description\" GLOB"), "{sql}");
        assert!(!sql.contains("LIKE"), "{sql}");
    }

    #[test]
    fn test_sort_parse_defaults_and_errors() {
        assert_eq!(TaskSort::parse(None, None).unwrap(), TaskSort::DEFAULT);
        assert_eq!(
            TaskSort::parse(Some("due_date"), Some("ASC")).unwrap(),
            TaskSort::new(TaskSortField::DueDate, SortOrder::Asc)
        );
        assert!(matches!(
            TaskSort::parse(Some("popularity"), None),
            Err(TaskError::Validation(_))
        ));
        assert!(matches!(
            TaskSort::parse(None, Some("sideways")),
            Err(TaskError::Validation(_))
        ));
    }

    #[test]
    fn test_sort_field_nullability() {
        assert!(TaskSortField::DueDate.is_nullable());
        assert!(!TaskSortField::CreatedAt.is_nullable());
        assert_eq!(TaskSortField::AssignedTo.to_string(), "assigned_to");
    }

    #[test]
    fn test_page_request_windows() {
        assert_eq!(
            PageRequest::default().window().unwrap(),
            PageWindow { offset: 0, limit: 10 }
        );
        assert_eq!(
            PageRequest::Page { page: 3, page_size: 20 }.window().unwrap(),
            PageWindow { offset: 40, limit: 20 }
        );
        assert_eq!(
            PageRequest::Offset { offset: 7, limit: 0 }.window().unwrap(),
            PageWindow { offset: 7, limit: 0 }
        );
    }

    #[test]
    fn test_page_request_rejects_bad_values() {
        for request in [
            PageRequest::Offset { offset: -1, limit: 10 },
            PageRequest::Offset { offset: 0, limit: -5 },
            PageRequest::Offset { offset: 0, limit: 101 },
            PageRequest::Page { page: 0, page_size: 10 },
            PageRequest::Page { page: -2, page_size: 10 },
            PageRequest::Page { page: 1, page_size: 500 },
            PageRequest::Page { page: i64::MAX, page_size: 100 },
        ] {
            assert!(
                matches!(request.window(), Err(TaskError::Validation(_))),
                "{request:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_page_meta() {
        let meta = PageMeta::new(PageWindow { offset: 0, limit: 10 }, 25);
        assert_eq!((meta.page, meta.total_pages), (1, 3));
        assert!(meta.has_next);
        assert!(!meta.has_previous);

        let meta = PageMeta::new(PageWindow { offset: 20, limit: 10 }, 25);
        assert_eq!(meta.page, 3);
        assert!(!meta.has_next);
        assert!(meta.has_previous);

        let past_end = PageMeta::new(PageWindow { offset: 100, limit: 10 }, 25);
        assert!(!past_end.has_next);
        assert_eq!(past_end.total, 25);

        let zero = PageMeta::new(PageWindow { offset: 0, limit: 0 }, 25);
        assert_eq!((zero.page, zero.total_pages), (1, 0));
    }

    #[test]
    fn test_filter_normalized_drops_blank_text() {
        let filter = TaskFilter {
            assigned_to: Some("  ".into()),
            search: Some(" report ".into()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filter.assigned_to, None);
        assert_eq!(filter.search.as_deref(), Some("report"));
        assert!(TaskFilter::default().is_empty());
        assert!(!filter.is_empty());
    }

    #[test]
    fn test_filters_applied_serializes_only_present_criteria() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Pending),
            is_overdue: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            serde_json::json!({"status": "pending", "is_overdue": false})
        );
    }

    #[test]
    fn test_filter_matches_in_memory() {
        let task = Task {
            id: 1,
            title: "Quarterly report".into(),
            description: Some("Send the INVOICE".into()),
            status: TaskStatus::Pending,
            priority: TaskPriority::High,
            due_date: Some(now() - Duration::hours(2)),
            assigned_to: Some("Maria Lopez".into()),
            created_at: now() - Duration::days(3),
            updated_at: None,
        };

        let hit = TaskFilter {
            search: Some("invoice".into()),
            assigned_to: Some("lopez".into()),
            is_overdue: Some(true),
            created_before: Some(now() - Duration::days(3)),
            ..Default::default()
        };
        assert!(hit.matches(&task, now()));

        let miss = TaskFilter {
            created_after: Some(task.created_at),
            ..Default::default()
        };
        assert!(!miss.matches(&task, now()));
    }
}
