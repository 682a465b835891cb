use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;

use crate::model::task::{Task, TaskField, TaskId, TaskSummary};
use crate::model::user::{User, UserId};
use crate::repository::json_file::{data_dir, JsonFile};
use crate::repository::traits::{TaskRepository, UserRepository};

const TASKS_FILE_NAME: &str = "tasks.json";
const USERS_FILE_NAME: &str = "users.json";

/// Tasks stored as a JSON array in `<data dir>/tasks.json`.
///
/// Every call reads the whole file; writes hold the lock across read-modify-write so
/// two requests in this process cannot interleave.
pub struct FileTaskRepository {
    file: Mutex<JsonFile<Task>>,
}

impl FileTaskRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let dir = data_dir(base_dir)?;
        let file = JsonFile::open(&dir, TASKS_FILE_NAME)?;
        Ok(FileTaskRepository {
            file: Mutex::new(file),
        })
    }

    pub fn file_path(&self) -> PathBuf {
        self.file.lock().path().to_path_buf()
    }
}

impl TaskRepository for FileTaskRepository {
    fn insert(&self, task: Task) -> Result<Task> {
        let file = self.file.lock();
        let mut tasks = file.read_all()?;
        tasks.push(task.clone());
        file.write_all(&tasks)?;
        Ok(task)
    }

    fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>> {
        let tasks = self.file.lock().read_all()?;
        Ok(tasks.into_iter().find(|t| t.id == *id))
    }

    fn update(&self, task: Task) -> Result<Task> {
        let file = self.file.lock();
        let mut tasks = file.read_all()?;
        let saved = super::replace_task(&mut tasks, task)?;
        file.write_all(&tasks)?;
        Ok(saved)
    }

    fn delete_by_id(&self, id: &TaskId) -> Result<()> {
        let file = self.file.lock();
        let mut tasks = file.read_all()?;
        super::remove_task(&mut tasks, id)?;
        file.write_all(&tasks)
    }

    fn scan_by_owner_and_window(
        &self,
        owner: &UserId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TaskSummary>> {
        let tasks = self.file.lock().read_all()?;
        Ok(super::scan_window(&tasks, owner, start, end))
    }

    fn count_by_owner_and_field(&self, owner: &UserId, field: TaskField, value: &str) -> Result<u64> {
        let tasks = self.file.lock().read_all()?;
        Ok(super::count_field(&tasks, owner, field, value))
    }

    fn count_overdue(&self, owner: &UserId, as_of: NaiveDate) -> Result<u64> {
        let tasks = self.file.lock().read_all()?;
        Ok(super::count_overdue(&tasks, owner, as_of))
    }
}

/// Accounts stored as a JSON array in `<data dir>/users.json`.
pub struct FileUserRepository {
    file: Mutex<JsonFile<User>>,
}

impl FileUserRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let dir = data_dir(base_dir)?;
        Self::in_dir(&dir)
    }

    fn in_dir(dir: &Path) -> Result<Self> {
        let file = JsonFile::open(dir, USERS_FILE_NAME)?;
        Ok(FileUserRepository {
            file: Mutex::new(file),
        })
    }
}

impl UserRepository for FileUserRepository {
    fn insert(&self, user: User) -> Result<User> {
        let file = self.file.lock();
        let mut users = file.read_all()?;
        let user = super::push_user(&mut users, user)?;
        file.write_all(&users)?;
        Ok(user)
    }

    fn find_by_id(&self, id: &UserId) -> Result<Option<User>> {
        let users = self.file.lock().read_all()?;
        Ok(users.into_iter().find(|u| u.id == *id))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self.file.lock().read_all()?;
        Ok(users.into_iter().find(|u| u.email == email))
    }

    fn update(&self, user: User) -> Result<User> {
        let file = self.file.lock();
        let mut users = file.read_all()?;
        let saved = super::replace_user(&mut users, user)?;
        file.write_all(&users)?;
        Ok(saved)
    }
}
