mod config;
mod report;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use clap::Parser;
use taskdeck_core::model::user::normalize_email;
use taskdeck_core::{
    router, AppState, FileTaskRepository, FileUserRepository, MemoryTaskRepository, MemoryUserRepository,
    Priority, TaskRepository, TaskService, TaskStatus, User, UserRepository,
};
use tower_http::cors::CorsLayer;

use crate::config::{CliArgs, Config, StorageBackend};

#[derive(Parser)]
#[command(name = "taskdeck", version)]
#[command(about = "Task tracking API with per-user analytics", long_about = None)]
struct Cli {
    #[command(flatten)]
    args: CliArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Run the HTTP API (default)
    Serve,
    /// Print a user's tasks created in the current day, week or month
    Tasks {
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "today")]
        time_frame: String,
    },
    /// Print a user's task counts by status and priority, plus overdue tasks
    Summary {
        #[arg(long)]
        email: String,
    },
}

struct Repositories {
    tasks: Arc<dyn TaskRepository>,
    users: Arc<dyn UserRepository>,
}

fn open_repositories(config: &Config) -> Result<Repositories> {
    let repos = match config.storage {
        StorageBackend::File => Repositories {
            tasks: Arc::new(FileTaskRepository::new(config.data_dir.clone())?),
            users: Arc::new(FileUserRepository::new(config.data_dir.clone())?),
        },
        StorageBackend::Memory => Repositories {
            tasks: Arc::new(MemoryTaskRepository::new()),
            users: Arc::new(MemoryUserRepository::new()),
        },
    };
    Ok(repos)
}

fn find_user(users: &dyn UserRepository, email: &str) -> Result<User> {
    users
        .find_by_email(&normalize_email(email))?
        .with_context(|| format!("no user registered with email '{}'", email))
}

fn cors_layer(origin: &str) -> Result<CorsLayer> {
    let origin: HeaderValue = origin
        .parse()
        .with_context(|| format!("invalid frontend origin '{}'", origin))?;
    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]))
}

async fn serve(config: &Config) -> Result<()> {
    let app_config = config.app_config()?;
    let repos = open_repositories(config)?;
    let state = AppState::new(repos.tasks, repos.users, &app_config)?;

    let mut app = router(state);
    if let Some(origin) = &config.frontend_url {
        app = app.layer(cors_layer(origin)?);
    }

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!(
        addr = %listener.local_addr()?,
        environment = %config.environment,
        storage = ?config.storage,
        "taskdeck listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for ctrl-c");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.args)?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(&config).await?,
        Commands::Tasks { email, time_frame } => {
            let repos = open_repositories(&config)?;
            let user = find_user(repos.users.as_ref(), &email)?;
            let tasks = TaskService::new(repos.tasks).get_tasks(&user.id, Some(&time_frame))?;
            report::show_tasks(&tasks);
        }
        Commands::Summary { email } => {
            let repos = open_repositories(&config)?;
            let user = find_user(repos.users.as_ref(), &email)?;
            let service = TaskService::new(repos.tasks);

            let by_status = TaskStatus::ALL
                .into_iter()
                .map(|status| Ok((status, service.get_tasks_by_status(&user.id, Some(status.as_str()))?)))
                .collect::<Result<Vec<_>>>()?;
            let by_priority = Priority::ALL
                .into_iter()
                .map(|priority| Ok((priority, service.get_tasks_by_priority(&user.id, Some(priority.as_str()))?)))
                .collect::<Result<Vec<_>>>()?;
            let overdue = service.get_overdue_tasks_count(&user.id)?;

            println!("Summary for {} <{}>", user.name, user.email);
            println!("{}", report::summary_table(&by_status, &by_priority, overdue));
        }
    }

    Ok(())
}
