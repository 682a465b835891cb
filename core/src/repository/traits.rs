use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};

use crate::model::task::{Task, TaskField, TaskId, TaskSummary};
use crate::model::user::{User, UserId};

/// Data access over stored tasks. No authorization happens at this layer.
pub trait TaskRepository: Send + Sync {
    fn insert(&self, task: Task) -> Result<Task>;
    fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>>;
    /// Full replace; refreshes `updated_at`.
    fn update(&self, task: Task) -> Result<Task>;
    fn delete_by_id(&self, id: &TaskId) -> Result<()>;
    /// Tasks of `owner` created within `[start, end]`.
    fn scan_by_owner_and_window(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskSummary>>;
    fn count_by_owner_and_field(&self, owner: &UserId, field: TaskField, value: &str) -> Result<u64>;
    fn count_overdue(&self, owner: &UserId, as_of: NaiveDate) -> Result<u64>;
}

pub trait UserRepository: Send + Sync {
    /// Fails with [`DuplicateEmail`] when the email is already registered.
    fn insert(&self, user: User) -> Result<User>;
    fn find_by_id(&self, id: &UserId) -> Result<Option<User>>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    fn update(&self, user: User) -> Result<User>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("a user with email {0} already exists")]
pub struct DuplicateEmail(pub String);

impl<T: TaskRepository + ?Sized> TaskRepository for Arc<T> {
    fn insert(&self, task: Task) -> Result<Task> {
        (**self).insert(task)
    }

    fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>> {
        (**self).find_by_id(id)
    }

    fn update(&self, task: Task) -> Result<Task> {
        (**self).update(task)
    }

    fn delete_by_id(&self, id: &TaskId) -> Result<()> {
        (**self).delete_by_id(id)
    }

    fn scan_by_owner_and_window(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskSummary>> {
        (**self).scan_by_owner_and_window(owner, start, end)
    }

    fn count_by_owner_and_field(&self, owner: &UserId, field: TaskField, value: &str) -> Result<u64> {
        (**self).count_by_owner_and_field(owner, field, value)
    }

    fn count_overdue(&self, owner: &UserId, as_of: NaiveDate) -> Result<u64> {
        (**self).count_overdue(owner, as_of)
    }
}

impl<T: UserRepository + ?Sized> UserRepository for Arc<T> {
    fn insert(&self, user: User) -> Result<User> {
        (**self).insert(user)
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        (**self).find_by_id(id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        (**self).find_by_email(email)
    }

    fn update(&self, user: User) -> Result<User> {
        (**self).update(user)
    }
}
