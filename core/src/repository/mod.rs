pub mod file;
mod json_file;
pub mod memory;
pub mod traits;

// Re-export
pub use file::{FileTaskRepository, FileUserRepository};
pub use memory::{MemoryTaskRepository, MemoryUserRepository};
pub use traits::{DuplicateEmail, TaskRepository, UserRepository};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::task::{Task, TaskField, TaskId, TaskSummary};
use crate::model::user::{User, UserId};

// Query semantics shared by every backend that holds tasks as a list.

fn scan_window(
    tasks: &[Task],
    owner: &UserId,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<TaskSummary> {
    tasks
        .iter()
        .filter(|t| t.is_owned_by(owner) && t.created_within(start, end))
        .map(Task::summary)
        .collect()
}

fn count_field(tasks: &[Task], owner: &UserId, field: TaskField, value: &str) -> u64 {
    tasks
        .iter()
        .filter(|t| t.is_owned_by(owner) && t.field_matches(field, value))
        .count() as u64
}

fn count_overdue(tasks: &[Task], owner: &UserId, as_of: NaiveDate) -> u64 {
    tasks
        .iter()
        .filter(|t| t.is_owned_by(owner) && t.is_overdue(as_of))
        .count() as u64
}

fn replace_task(tasks: &mut [Task], mut task: Task) -> Result<Task> {
    let slot = tasks
        .iter_mut()
        .find(|t| t.id == task.id)
        .ok_or_else(|| anyhow::anyhow!("Task with ID {} not found", task.id))?;
    task.updated_at = Utc::now();
    *slot = task.clone();
    Ok(task)
}

fn remove_task(tasks: &mut Vec<Task>, id: &TaskId) -> Result<()> {
    let initial_len = tasks.len();
    tasks.retain(|t| t.id != *id);
    if tasks.len() == initial_len {
        return Err(anyhow::anyhow!("Task with ID {} not found", id));
    }
    Ok(())
}

fn push_user(users: &mut Vec<User>, user: User) -> Result<User> {
    if users.iter().any(|u| u.email == user.email) {
        return Err(DuplicateEmail(user.email.clone()).into());
    }
    users.push(user.clone());
    Ok(user)
}

fn replace_user(users: &mut [User], mut user: User) -> Result<User> {
    let slot = users
        .iter_mut()
        .find(|u| u.id == user.id)
        .ok_or_else(|| anyhow::anyhow!("User with ID {} not found", user.id))?;
    user.updated_at = Utc::now();
    *slot = user.clone();
    Ok(user)
}
