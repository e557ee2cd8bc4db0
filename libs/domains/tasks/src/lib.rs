//! Tasks Domain
//!
//! Task CRUD with filtered listings and transactional bulk mutations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← axum router, OpenAPI
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, id normalization, page metadata
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← TaskRepository trait + SqlTaskRepository
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │    Query    │  ← TaskFilter / TaskSort / PageRequest → Condition
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_tasks::{SqlTaskRepository, TaskService};
//! use sea_orm::Database;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("postgres://...").await?;
//!
//! let repository = SqlTaskRepository::new(db);
//! let service = TaskService::new(repository);
//! let app = domain_tasks::handlers::router(service);
//! # Ok(())
//! # }
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod patch;
pub mod query;
pub mod repository;
pub mod service;
pub mod sql;

pub use error::{TaskError, TaskResult};
pub use handlers::TasksApiDoc;
pub use models::{
    BulkDeleteResult, BulkUpdateResult, CreateTask, Task, TaskId, TaskPriority, TaskStatus,
    UpdateTask,
};
pub use patch::Patch;
pub use query::{
    PageMeta, PageRequest, PageWindow, SortOrder, TaskFilter, TaskPage, TaskQuery,
    TaskQueryBuilder, TaskSort, TaskSortField,
};
pub use repository::TaskRepository;
pub use service::TaskService;
pub use sql::SqlTaskRepository;
