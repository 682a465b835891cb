pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use api::{router, AppState};
pub use config::{AppConfig, CookieConfig, Environment};
pub use error::{ServiceError, ServiceResult};
pub use model::task::{ChecklistItem, Priority, Task, TaskId, TaskStatus, TaskSummary};
pub use model::user::{PublicUser, User, UserId};
pub use repository::{
    FileTaskRepository, FileUserRepository, MemoryTaskRepository, MemoryUserRepository, TaskRepository,
    UserRepository,
};
pub use service::task_service::TaskService;
pub use service::user_service::UserService;
pub use time::TimeFrame;
