use std::collections::HashSet;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::require_owner;
use crate::error::{ServiceError, ServiceResult};
use crate::model::task::{ChecklistItem, Priority, Task, TaskField, TaskId, TaskStatus, TaskSummary};
use crate::model::user::UserId;
use crate::repository::TaskRepository;
use crate::service::dto::{
    ChangeStatusInput, ChecklistInput, CreateTaskInput, EditTaskInput, OverdueCount, TaskCount,
};
use crate::time::{current_window, parse_due_date, start_of_today, InvalidTimeFrame, TimeFrame};

const TASK_NOT_FOUND: &str = "Task not found";

pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_task(&self, actor: &UserId, input: CreateTaskInput) -> ServiceResult<Task> {
        let title = non_blank(input.title.as_deref())
            .ok_or_else(|| ServiceError::validation("Title is required"))?;
        let priority = non_blank(input.priority.as_deref())
            .ok_or_else(|| ServiceError::validation("Priority is required"))
            .and_then(parse_priority)?;
        let checklists = build_checklists(input.checklists.as_deref())?;
        let due_date = parse_optional_due_date(input.due_date.as_deref())?;

        let task = Task::new(title.to_string(), priority, checklists, due_date, *actor);
        let created = self.repo.insert(task)?;
        tracing::info!(task_id = %created.id, user_id = %actor, "task created");
        Ok(created)
    }

    pub fn edit_task(&self, actor: &UserId, task_id: &str, input: EditTaskInput) -> ServiceResult<Task> {
        let mut task = self.load_owned(actor, task_id, "edit")?;

        let checklists = match input.checklists.as_deref() {
            Some(items) => Some(build_checklists(Some(items))?),
            None => None,
        };
        let priority = non_blank(input.priority.as_deref())
            .map(parse_priority)
            .transpose()?;
        let due_date = parse_optional_due_date(input.due_date.as_deref())?;

        if let Some(title) = non_blank(input.title.as_deref()) {
            task.title = title.to_string();
        }
        if let Some(priority) = priority {
            task.priority = priority;
        }
        if let Some(checklists) = checklists {
            task.checklists = checklists;
        }
        if let Some(due_date) = due_date {
            task.due_date = Some(due_date);
        }

        let saved = self.repo.update(task)?;
        tracing::info!(task_id = %saved.id, user_id = %actor, "task edited");
        Ok(saved)
    }

    pub fn delete_task(&self, actor: &UserId, task_id: &str) -> ServiceResult<()> {
        let task = self.load_owned(actor, task_id, "delete")?;
        self.repo.delete_by_id(&task.id)?;
        tracing::info!(task_id = %task.id, user_id = %actor, "task deleted");
        Ok(())
    }

    pub fn toggle_checklist_item(
        &self,
        actor: &UserId,
        task_id: &str,
        checklist_id: &str,
        is_completed: Option<bool>,
    ) -> ServiceResult<Task> {
        let mut task = self.load_owned(actor, task_id, "update")?;
        let is_completed =
            is_completed.ok_or_else(|| ServiceError::validation("isCompleted is required"))?;

        let item = Uuid::parse_str(checklist_id.trim())
            .ok()
            .and_then(|id| task.checklist_item_mut(&id))
            .ok_or_else(|| ServiceError::not_found("Checklist item not found"))?;
        item.is_completed = is_completed;
        let item_id = item.id;

        let saved = self.repo.update(task)?;
        tracing::info!(task_id = %saved.id, user_id = %actor, checklist_id = %item_id, is_completed, "checklist item toggled");
        Ok(saved)
    }

    /// `from_status` is only compared with `to_status`, never with the stored status.
    pub fn change_task_status(
        &self,
        actor: &UserId,
        task_id: &str,
        input: ChangeStatusInput,
    ) -> ServiceResult<Task> {
        let (Some(from), Some(to)) = (
            non_blank(input.from_status.as_deref()),
            non_blank(input.to_status.as_deref()),
        ) else {
            return Err(ServiceError::validation("Status is required"));
        };
        if from == to {
            return Err(ServiceError::validation("Status must be different"));
        }
        let to_status: TaskStatus = to.parse().map_err(|_| {
            ServiceError::validation("Status must be one of backlog, todo, progress, done")
        })?;

        let mut task = self.load_owned(actor, task_id, "edit")?;
        task.status = to_status;

        let saved = self.repo.update(task)?;
        tracing::info!(task_id = %saved.id, user_id = %actor, from, to, "task status changed");
        Ok(saved)
    }

    pub fn get_tasks(&self, actor: &UserId, time_frame: Option<&str>) -> ServiceResult<Vec<TaskSummary>> {
        let frame: TimeFrame = time_frame.ok_or(InvalidTimeFrame)?.parse()?;
        let (start, end) = current_window(frame);
        Ok(self.repo.scan_by_owner_and_window(actor, start, end)?)
    }

    /// Unknown or missing status values simply count zero.
    pub fn get_tasks_by_status(&self, actor: &UserId, status: Option<&str>) -> ServiceResult<TaskCount> {
        self.count_field(actor, TaskField::Status, status)
    }

    pub fn get_tasks_by_priority(&self, actor: &UserId, priority: Option<&str>) -> ServiceResult<TaskCount> {
        self.count_field(actor, TaskField::Priority, priority)
    }

    pub fn get_overdue_tasks_count(&self, actor: &UserId) -> ServiceResult<OverdueCount> {
        self.overdue_count_as_of(actor, start_of_today())
    }

    fn overdue_count_as_of(&self, actor: &UserId, as_of: NaiveDate) -> ServiceResult<OverdueCount> {
        let overdue_tasks = self.repo.count_overdue(actor, as_of)?;
        Ok(OverdueCount { overdue_tasks })
    }

    // No ownership check here: any caller that knows the id can read the task.
    pub fn get_task_by_id(&self, task_id: &str) -> ServiceResult<Task> {
        if task_id.trim().is_empty() {
            return Err(ServiceError::validation("Task id is required"));
        }
        let id = TaskId::parse(task_id).ok_or_else(|| ServiceError::not_found("No task found"))?;
        self.repo
            .find_by_id(&id)?
            .ok_or_else(|| ServiceError::not_found("No task found"))
    }

    fn count_field(&self, actor: &UserId, field: TaskField, value: Option<&str>) -> ServiceResult<TaskCount> {
        let total_task = match value {
            Some(value) => self.repo.count_by_owner_and_field(actor, field, value)?,
            None => 0,
        };
        Ok(TaskCount { total_task })
    }

    /// Fetches a task and checks that `actor` owns it before any mutation.
    fn load_owned(&self, actor: &UserId, task_id: &str, action: &str) -> ServiceResult<Task> {
        let id = TaskId::parse(task_id).ok_or_else(|| ServiceError::not_found(TASK_NOT_FOUND))?;
        let task = self
            .repo
            .find_by_id(&id)?
            .ok_or_else(|| ServiceError::not_found(TASK_NOT_FOUND))?;
        require_owner(&task.created_by, actor, action)?;
        Ok(task)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn parse_priority(raw: &str) -> ServiceResult<Priority> {
    raw.parse()
        .map_err(|_| ServiceError::validation("Priority must be one of high, moderate, low"))
}

fn parse_optional_due_date(raw: Option<&str>) -> ServiceResult<Option<NaiveDate>> {
    match non_blank(raw) {
        Some(raw) => Ok(Some(parse_due_date(raw)?)),
        None => Ok(None),
    }
}

fn build_checklists(inputs: Option<&[ChecklistInput]>) -> ServiceResult<Vec<ChecklistItem>> {
    let inputs = inputs
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ServiceError::validation("At least one checklist item is required"))?;

    let mut seen = HashSet::new();
    inputs
        .iter()
        .enumerate()
        .map(|(i, input)| {
            let name = non_blank(input.name.as_deref()).ok_or_else(|| {
                ServiceError::Validation(format!("Checklist {} name is required", i + 1))
            })?;
            // Item ids must stay unique within a task.
            let id = input.id.unwrap_or_else(Uuid::new_v4);
            if !seen.insert(id) {
                return Err(ServiceError::Validation(format!(
                    "Checklist {} reuses the id of another item",
                    i + 1
                )));
            }
            Ok(ChecklistItem {
                id,
                name: name.to_string(),
                is_completed: input.is_completed.unwrap_or(false),
            })
        })
        .collect()
}
