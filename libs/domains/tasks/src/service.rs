use chrono::{DateTime, SubsecRound, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{TaskError, TaskResult};
use crate::models::{
    BulkDeleteResult, BulkUpdateResult, CreateTask, Task, TaskId, TaskPriority, TaskStatus,
    UpdateTask,
};
use crate::query::{
    PageMeta, PageRequest, SortOrder, TaskFilter, TaskPage, TaskQuery, TaskSort, TaskSortField,
};
use crate::repository::TaskRepository;

/// Service layer for Task business logic
#[derive(Clone)]
pub struct TaskService<R: TaskRepository> {
    repository: Arc<R>,
}

/// Current time at the precision every store keeps.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn ensure_future(due_date: Option<&DateTime<Utc>>, now: DateTime<Utc>) -> TaskResult<()> {
    match due_date {
        Some(due) if *due <= now => Err(TaskError::Validation(format!(
            "due_date must be in the future, got {due}"
        ))),
        _ => Ok(()),
    }
}

/// Ascending, de-duplicated ids; an empty set is rejected.
fn unique_ids(ids: Vec<TaskId>) -> TaskResult<Vec<TaskId>> {
    let ids: Vec<TaskId> = ids.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
    if ids.is_empty() {
        return Err(TaskError::EmptyRequest("task_ids must not be empty".into()));
    }
    Ok(ids)
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new task with validation
    #[instrument(skip(self, input), fields(task_title = %input.title))]
    pub async fn create_task(&self, mut input: CreateTask) -> TaskResult<Task> {
        input.normalize();
        input.validate()?;

        let now = now();
        ensure_future(input.due_date.as_ref(), now)?;

        self.repository.create(input, now).await
    }

    #[instrument(skip(self), fields(task_id = id))]
    pub async fn get_task(&self, id: TaskId) -> TaskResult<Task> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    /// Apply a partial update. An empty patch returns the task unchanged.
    #[instrument(skip(self, patch), fields(task_id = id))]
    pub async fn update_task(&self, id: TaskId, mut patch: UpdateTask) -> TaskResult<Task> {
        patch.normalize();
        patch.validate()?;

        if patch.is_empty() {
            return self.get_task(id).await;
        }

        let now = now();
        ensure_future(patch.due_date.as_set(), now)?;

        self.repository
            .update(id, patch, now)
            .await?
            .ok_or(TaskError::NotFound(id))
    }

    #[instrument(skip(self), fields(task_id = id))]
    pub async fn delete_task(&self, id: TaskId) -> TaskResult<()> {
        let deleted = self.repository.delete(id).await?;

        if !deleted {
            return Err(TaskError::NotFound(id));
        }

        Ok(())
    }

    /// Filtered, sorted, paginated listing
    #[instrument(skip(self, filter))]
    pub async fn list_tasks(
        &self,
        filter: TaskFilter,
        sort: TaskSort,
        page: PageRequest,
    ) -> TaskResult<TaskPage> {
        let window = page.window()?;
        let filter = filter.normalized();

        let (items, total) = self
            .repository
            .list(TaskQuery {
                filter: filter.clone(),
                sort,
                window,
                now: now(),
            })
            .await?;

        Ok(TaskPage {
            items,
            meta: PageMeta::new(window, total),
            filters_applied: filter,
            sort,
        })
    }

    /// All tasks in `status`, by ascending id
    pub async fn list_by_status(&self, status: TaskStatus) -> TaskResult<Vec<Task>> {
        let filter = TaskFilter {
            status: Some(status),
            ..Default::default()
        };
        self.repository
            .list_all(filter, TaskSort::new(TaskSortField::Id, SortOrder::Asc), now())
            .await
    }

    /// All tasks with `priority`, by ascending id
    pub async fn list_by_priority(&self, priority: TaskPriority) -> TaskResult<Vec<Task>> {
        let filter = TaskFilter {
            priority: Some(priority),
            ..Default::default()
        };
        self.repository
            .list_all(filter, TaskSort::new(TaskSortField::Id, SortOrder::Asc), now())
            .await
    }

    /// Patch every listed task that exists; absent ids are reported, not failed.
    #[instrument(skip(self, ids, patch), fields(requested = ids.len()))]
    pub async fn bulk_update(
        &self,
        ids: Vec<TaskId>,
        mut patch: UpdateTask,
    ) -> TaskResult<BulkUpdateResult> {
        let ids = unique_ids(ids)?;

        patch.normalize();
        patch.validate()?;
        if patch.is_empty() {
            return Err(TaskError::Validation(
                "update_data must set at least one field".into(),
            ));
        }

        let now = now();
        ensure_future(patch.due_date.as_set(), now)?;

        self.repository.bulk_update(ids, patch, now).await
    }

    /// Delete every listed task that exists; absent ids are reported, not failed.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn bulk_delete(&self, ids: Vec<TaskId>) -> TaskResult<BulkDeleteResult> {
        let ids = unique_ids(ids)?;
        self.repository.bulk_delete(ids).await
    }

    /// Count all tasks
    pub async fn count_tasks(&self) -> TaskResult<u64> {
        self.repository.count(TaskFilter::default(), now()).await
    }
}
