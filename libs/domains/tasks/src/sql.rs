use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::NullOrdering;
use sea_orm::{
    AccessMode, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    DatabaseTransaction, DbBackend, DbErr, EntityTrait, IsolationLevel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, TransactionTrait,
};

use crate::entity;
use crate::error::TaskResult;
use crate::models::{BulkDeleteResult, BulkUpdateResult, CreateTask, Task, TaskId, UpdateTask};
use crate::query::{TaskFilter, TaskQuery, TaskQueryBuilder, TaskSort, TaskSortField};
use crate::repository::TaskRepository;

/// Upper bound on ids bound into one `IN (...)` list. SQLite builds before
/// 3.32 accept at most 999 parameters per statement.
pub const ID_CHUNK_SIZE: usize = 500;

/// SeaORM-backed task store. Works against PostgreSQL and SQLite.
#[derive(Clone)]
pub struct SqlTaskRepository {
    db: DatabaseConnection,
}

impl SqlTaskRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    /// Snapshot for reads that issue more than one statement. SQLite
    /// transactions are already serializable.
    async fn begin_read(&self) -> Result<DatabaseTransaction, DbErr> {
        match self.backend() {
            DbBackend::Sqlite => self.db.begin().await,
            _ => {
                self.db
                    .begin_with_config(
                        Some(IsolationLevel::RepeatableRead),
                        Some(AccessMode::ReadOnly),
                    )
                    .await
            }
        }
    }
}

/// Applies the sort directive followed by the `id ASC` tie-break.
fn ordered(select: Select<entity::Entity>, sort: TaskSort) -> Select<entity::Entity> {
    let column = sort.field.column();
    let order: Order = sort.order.into();

    let select = if sort.field.is_nullable() {
        select.order_by_with_nulls(column, order, NullOrdering::Last)
    } else {
        select.order_by(column, order)
    };

    if sort.field == TaskSortField::Id {
        select
    } else {
        select.order_by_asc(entity::Column::Id)
    }
}

/// Existing ids among the ascending `ids`, ascending. Rows are locked on PostgreSQL.
async fn existing_ids(txn: &DatabaseTransaction, ids: &[TaskId]) -> Result<Vec<TaskId>, DbErr> {
    let mut found = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(ID_CHUNK_SIZE) {
        let mut select = entity::Entity::find()
            .select_only()
            .column(entity::Column::Id)
            .filter(entity::Column::Id.is_in(chunk.iter().copied()))
            .order_by_asc(entity::Column::Id);

        if txn.get_database_backend() == DbBackend::Postgres {
            select = select.lock_exclusive();
        }

        found.extend(select.into_tuple::<TaskId>().all(txn).await?);
    }

    Ok(found)
}

fn missing_ids(requested: &[TaskId], found: &[TaskId]) -> Vec<TaskId> {
    requested
        .iter()
        .copied()
        .filter(|id| found.binary_search(id).is_err())
        .collect()
}

#[async_trait]
impl TaskRepository for SqlTaskRepository {
    async fn create(&self, input: CreateTask, now: DateTime<Utc>) -> TaskResult<Task> {
        let model = entity::ActiveModel::for_insert(input, now)
            .insert(&self.db)
            .await?;

        tracing::info!(task_id = model.id, "Created task");
        Ok(model.into())
    }

    async fn get_by_id(&self, id: TaskId) -> TaskResult<Option<Task>> {
        let model = entity::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Into::into))
    }

    async fn update(
        &self,
        id: TaskId,
        patch: UpdateTask,
        now: DateTime<Utc>,
    ) -> TaskResult<Option<Task>> {
        let txn = self.db.begin().await?;

        let result = entity::Entity::update_many()
            .set(entity::ActiveModel::from_patch(patch, now))
            .filter(entity::Column::Id.eq(id))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let model = entity::Entity::find_by_id(id).one(&txn).await?;
        txn.commit().await?;

        tracing::info!(task_id = id, "Updated task");
        Ok(model.map(Into::into))
    }

    async fn delete(&self, id: TaskId) -> TaskResult<bool> {
        let result = entity::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected > 0 {
            tracing::info!(task_id = id, "Deleted task");
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn list(&self, query: TaskQuery) -> TaskResult<(Vec<Task>, u64)> {
        let condition = query.condition(self.backend());

        // Count and page read the same snapshot.
        let txn = self.begin_read().await?;

        let total = entity::Entity::find()
            .filter(condition.clone())
            .count(&txn)
            .await?;

        let models = if query.window.limit == 0 || query.window.offset >= total {
            Vec::new()
        } else {
            ordered(entity::Entity::find().filter(condition), query.sort)
                .offset(query.window.offset)
                .limit(query.window.limit)
                .all(&txn)
                .await?
        };

        txn.commit().await?;

        Ok((models.into_iter().map(Into::into).collect(), total))
    }

    async fn list_all(
        &self,
        filter: TaskFilter,
        sort: TaskSort,
        now: DateTime<Utc>,
    ) -> TaskResult<Vec<Task>> {
        let condition = TaskQueryBuilder::from_filter(&filter, self.backend(), now).build();
        let models = ordered(entity::Entity::find().filter(condition), sort)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn count(&self, filter: TaskFilter, now: DateTime<Utc>) -> TaskResult<u64> {
        let condition = TaskQueryBuilder::from_filter(&filter, self.backend(), now).build();
        let count = entity::Entity::find()
            .filter(condition)
            .count(&self.db)
            .await?;

        Ok(count)
    }

    async fn bulk_update(
        &self,
        ids: Vec<TaskId>,
        patch: UpdateTask,
        now: DateTime<Utc>,
    ) -> TaskResult<BulkUpdateResult> {
        let txn = self.db.begin().await?;

        let found = existing_ids(&txn, &ids).await?;
        let missing = missing_ids(&ids, &found);

        if found.is_empty() {
            txn.rollback().await?;
            tracing::debug!(?missing, "Bulk update matched no tasks");
            return Ok(BulkUpdateResult {
                missing,
                ..Default::default()
            });
        }

        let changes = entity::ActiveModel::from_patch(patch, now);
        let mut tasks: Vec<Task> = Vec::with_capacity(found.len());

        for chunk in found.chunks(ID_CHUNK_SIZE) {
            entity::Entity::update_many()
                .set(changes.clone())
                .filter(entity::Column::Id.is_in(chunk.iter().copied()))
                .exec(&txn)
                .await?;

            let models = entity::Entity::find()
                .filter(entity::Column::Id.is_in(chunk.iter().copied()))
                .order_by_asc(entity::Column::Id)
                .all(&txn)
                .await?;
            tasks.extend(models.into_iter().map(Task::from));
        }

        txn.commit().await?;

        let updated = tasks.iter().map(|task| task.id).collect();

        tracing::info!(updated = tasks.len(), missing = missing.len(), "Bulk updated tasks");
        if !missing.is_empty() {
            tracing::debug!(?missing, "Bulk update skipped missing tasks");
        }

        Ok(BulkUpdateResult {
            updated,
            missing,
            tasks,
        })
    }

    async fn bulk_delete(&self, ids: Vec<TaskId>) -> TaskResult<BulkDeleteResult> {
        let txn = self.db.begin().await?;

        let found = existing_ids(&txn, &ids).await?;
        let missing = missing_ids(&ids, &found);

        for chunk in found.chunks(ID_CHUNK_SIZE) {
            entity::Entity::delete_many()
                .filter(entity::Column::Id.is_in(chunk.iter().copied()))
                .exec(&txn)
                .await?;
        }

        txn.commit().await?;

        tracing::info!(deleted = found.len(), missing = missing.len(), "Bulk deleted tasks");
        if !missing.is_empty() {
            tracing::debug!(?missing, "Bulk delete skipped missing tasks");
        }

        Ok(BulkDeleteResult {
            deleted: found,
            missing,
        })
    }
}
