mod blocking;
pub mod envelope;
pub mod extract;
mod task_handlers;
mod user_handlers;

use std::sync::Arc;

use axum::routing::{delete, get, patch, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::auth::{SessionError, SessionSigner};
use crate::config::{AppConfig, CookieConfig};
use crate::repository::{TaskRepository, UserRepository};
use crate::service::task_service::TaskService;
use crate::service::user_service::UserService;

pub use envelope::{ApiError, ApiResponse};
pub use extract::CurrentUser;

pub type SharedTaskService = Arc<TaskService<Arc<dyn TaskRepository>>>;
pub type SharedUserService = Arc<UserService<Arc<dyn UserRepository>>>;

#[derive(Clone)]
pub struct AppState {
    pub tasks: SharedTaskService,
    pub users: SharedUserService,
    pub cookies: CookieConfig,
}

impl AppState {
    pub fn new(
        tasks: Arc<dyn TaskRepository>,
        users: Arc<dyn UserRepository>,
        config: &AppConfig,
    ) -> Result<Self, SessionError> {
        let signer = SessionSigner::new(config.session.secret.as_bytes(), config.session.ttl)?;
        Ok(Self {
            tasks: Arc::new(TaskService::new(tasks)),
            users: Arc::new(UserService::new(users, signer)),
            cookies: config.cookie.clone(),
        })
    }
}

/// All routes under `/api/v1`, plus the 404 fallback.
pub fn router(state: AppState) -> Router {
    let task_routes = Router::new()
        .route("/newTask", post(task_handlers::create_task))
        .route("/editTask/{taskId}", patch(task_handlers::edit_task))
        .route("/deleteTask/{taskId}", delete(task_handlers::delete_task))
        .route(
            "/toggleCheck/{taskId}/{checklistId}",
            patch(task_handlers::toggle_checklist_item),
        )
        .route("/change-status/{taskId}", patch(task_handlers::change_task_status))
        .route("/sort", get(task_handlers::get_tasks))
        .route("/status", get(task_handlers::get_tasks_by_status))
        .route("/priority", get(task_handlers::get_tasks_by_priority))
        .route("/all/dueTasks", get(task_handlers::get_overdue_tasks_count))
        .route("/{taskId}", get(task_handlers::get_task_by_id));

    let user_routes = Router::new()
        .route("/signup", post(user_handlers::signup))
        .route("/login", post(user_handlers::login))
        .route("/update-profile", patch(user_handlers::update_profile))
        .route("/logout", post(user_handlers::logout))
        .route("/profile", get(user_handlers::profile));

    let api_v1 = Router::new()
        .route("/check", get(user_handlers::check_session))
        .nest("/task", task_routes)
        .nest("/user", user_routes);

    Router::new()
        .nest("/api/v1", api_v1)
        .fallback(|| async { ApiError::not_found_route() })
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
