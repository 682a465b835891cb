use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::RwLock;

use crate::model::task::{Task, TaskField, TaskId, TaskSummary};
use crate::model::user::{User, UserId};
use crate::repository::traits::{TaskRepository, UserRepository};

/// Keeps tasks in insertion order in process memory.
#[derive(Default)]
pub struct MemoryTaskRepository {
    tasks: RwLock<Vec<Task>>,
}

impl MemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TaskRepository for MemoryTaskRepository {
    fn insert(&self, task: Task) -> Result<Task> {
        self.tasks.write().push(task.clone());
        Ok(task)
    }

    fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>> {
        Ok(self.tasks.read().iter().find(|t| t.id == *id).cloned())
    }

    fn update(&self, task: Task) -> Result<Task> {
        super::replace_task(&mut self.tasks.write(), task)
    }

    fn delete_by_id(&self, id: &TaskId) -> Result<()> {
        super::remove_task(&mut self.tasks.write(), id)
    }

    fn scan_by_owner_and_window(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskSummary>> {
        Ok(super::scan_window(&self.tasks.read(), owner, start, end))
    }

    fn count_by_owner_and_field(&self, owner: &UserId, field: TaskField, value: &str) -> Result<u64> {
        Ok(super::count_field(&self.tasks.read(), owner, field, value))
    }

    fn count_overdue(&self, owner: &UserId, as_of: NaiveDate) -> Result<u64> {
        Ok(super::count_overdue(&self.tasks.read(), owner, as_of))
    }
}

#[derive(Default)]
pub struct MemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserRepository for MemoryUserRepository {
    fn insert(&self, user: User) -> Result<User> {
        super::push_user(&mut self.users.write(), user)
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.id == *id).cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.read().iter().find(|u| u.email == email).cloned())
    }

    fn update(&self, user: User) -> Result<User> {
        super::replace_user(&mut self.users.write(), user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::model::task::{ChecklistItem, Priority, TaskStatus};

    fn task(owner: UserId, priority: Priority, status: TaskStatus, due: Option<NaiveDate>) -> Task {
        let mut task = Task::new(
            "t".to_string(),
            priority,
            vec![ChecklistItem::new("x".to_string())],
            due,
            owner,
        );
        task.status = status;
        task
    }

    #[test]
    fn test_scan_filters_owner_and_window() {
        let repo = MemoryTaskRepository::new();
        let alice = UserId::new();
        let bob = UserId::new();

        let mut old = task(alice, Priority::Low, TaskStatus::Todo, None);
        old.created_at = Utc::now() - Duration::days(40);
        repo.insert(old).unwrap();
        let recent = repo.insert(task(alice, Priority::Low, TaskStatus::Todo, None)).unwrap();
        repo.insert(task(bob, Priority::Low, TaskStatus::Todo, None)).unwrap();

        let start = Utc::now() - Duration::days(1);
        let end = Utc::now() + Duration::days(1);
        let found = repo.scan_by_owner_and_window(&alice, start, end).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, recent.id);
    }

    #[test]
    fn test_window_bounds_are_inclusive() {
        let repo = MemoryTaskRepository::new();
        let owner = UserId::new();
        let t = repo.insert(task(owner, Priority::High, TaskStatus::Todo, None)).unwrap();

        let found = repo.scan_by_owner_and_window(&owner, t.created_at, t.created_at).unwrap();
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_counts_are_owner_scoped() {
        let repo = MemoryTaskRepository::new();
        let alice = UserId::new();
        let bob = UserId::new();
        repo.insert(task(alice, Priority::High, TaskStatus::Done, None)).unwrap();
        repo.insert(task(alice, Priority::High, TaskStatus::Todo, None)).unwrap();
        repo.insert(task(bob, Priority::High, TaskStatus::Done, None)).unwrap();

        assert_eq!(repo.count_by_owner_and_field(&alice, TaskField::Priority, "high").unwrap(), 2);
        assert_eq!(repo.count_by_owner_and_field(&alice, TaskField::Status, "done").unwrap(), 1);
        assert_eq!(repo.count_by_owner_and_field(&alice, TaskField::Status, "archived").unwrap(), 0);
    }

    #[test]
    fn test_count_overdue_excludes_done() {
        let repo = MemoryTaskRepository::new();
        let owner = UserId::new();
        let past = NaiveDate::from_ymd_opt(2024, 1, 1);
        let as_of = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        repo.insert(task(owner, Priority::Low, TaskStatus::Todo, past)).unwrap();
        repo.insert(task(owner, Priority::Low, TaskStatus::Progress, past)).unwrap();
        repo.insert(task(owner, Priority::Low, TaskStatus::Done, past)).unwrap();
        repo.insert(task(owner, Priority::Low, TaskStatus::Todo, Some(as_of))).unwrap();
        repo.insert(task(owner, Priority::Low, TaskStatus::Todo, None)).unwrap();

        assert_eq!(repo.count_overdue(&owner, as_of).unwrap(), 2);
        assert_eq!(repo.count_overdue(&UserId::new(), as_of).unwrap(), 0);
    }

    #[test]
    fn test_update_unknown_task_fails() {
        let repo = MemoryTaskRepository::new();
        let result = repo.update(task(UserId::new(), Priority::Low, TaskStatus::Todo, None));
        assert!(result.is_err());
    }
}
