use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::TaskResult;
use crate::models::{BulkDeleteResult, BulkUpdateResult, CreateTask, Task, TaskId, UpdateTask};
use crate::query::{TaskFilter, TaskQuery, TaskSort};

/// Repository trait for Task persistence
///
/// Implementations receive already validated input. Bulk methods receive
/// ascending, de-duplicated, non-empty id lists.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Insert a new task stamped with `now` as its creation time
    async fn create(&self, input: CreateTask, now: DateTime<Utc>) -> TaskResult<Task>;

    async fn get_by_id(&self, id: TaskId) -> TaskResult<Option<Task>>;

    /// Apply a non-empty patch; `None` when the task does not exist
    async fn update(
        &self,
        id: TaskId,
        patch: UpdateTask,
        now: DateTime<Utc>,
    ) -> TaskResult<Option<Task>>;

    /// Returns false when nothing was deleted
    async fn delete(&self, id: TaskId) -> TaskResult<bool>;

    /// One page of matching tasks plus the total match count
    async fn list(&self, query: TaskQuery) -> TaskResult<(Vec<Task>, u64)>;

    /// Every matching task, unpaginated
    async fn list_all(
        &self,
        filter: TaskFilter,
        sort: TaskSort,
        now: DateTime<Utc>,
    ) -> TaskResult<Vec<Task>>;

    async fn count(&self, filter: TaskFilter, now: DateTime<Utc>) -> TaskResult<u64>;

    /// Patch every existing task in `ids` inside one transaction
    async fn bulk_update(
        &self,
        ids: Vec<TaskId>,
        patch: UpdateTask,
        now: DateTime<Utc>,
    ) -> TaskResult<BulkUpdateResult>;

    /// Delete every existing task in `ids` inside one transaction
    async fn bulk_delete(&self, ids: Vec<TaskId>) -> TaskResult<BulkDeleteResult>;
}
