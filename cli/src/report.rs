use chrono::{DateTime, Local};
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use taskdeck_core::service::dto::{OverdueCount, TaskCount};
use taskdeck_core::{Priority, TaskStatus, TaskSummary};

#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Checklist")]
    checklist: String,
    #[tabled(rename = "Due")]
    due: String,
    #[tabled(rename = "Created")]
    created: String,
}

#[derive(Tabled)]
struct CountRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Value")]
    value: String,
    #[tabled(rename = "Tasks")]
    tasks: u64,
}

pub fn task_table(tasks: &[TaskSummary]) -> String {
    let rows: Vec<TaskRow> = tasks
        .iter()
        .map(|task| {
            let done = task.checklists.iter().filter(|item| item.is_completed).count();
            let created: DateTime<Local> = DateTime::from(task.created_at);
            TaskRow {
                id: task.id.to_string()[..8].to_string(),
                title: task.title.clone(),
                priority: task.priority.to_string(),
                status: task.status.to_string(),
                checklist: format!("{}/{}", done, task.checklists.len()),
                due: task
                    .due_date
                    .map(|d| d.format("%d/%m/%Y").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                created: created.format("%Y-%m-%d %H:%M").to_string(),
            }
        })
        .collect();
    styled(Table::new(rows))
}

pub fn show_tasks(tasks: &[TaskSummary]) {
    if tasks.is_empty() {
        println!("No tasks found.");
        return;
    }
    println!("{}", task_table(tasks));
}

/// Per-status and per-priority counts followed by the overdue count.
pub fn summary_table(
    by_status: &[(TaskStatus, TaskCount)],
    by_priority: &[(Priority, TaskCount)],
    overdue: OverdueCount,
) -> String {
    let mut rows: Vec<CountRow> = by_status
        .iter()
        .map(|(status, count)| CountRow {
            group: "status".to_string(),
            value: status.to_string(),
            tasks: count.total_task,
        })
        .collect();
    rows.extend(by_priority.iter().map(|(priority, count)| CountRow {
        group: "priority".to_string(),
        value: priority.to_string(),
        tasks: count.total_task,
    }));
    rows.push(CountRow {
        group: "due".to_string(),
        value: "overdue".to_string(),
        tasks: overdue.overdue_tasks,
    });
    styled(Table::new(rows))
}

fn styled(mut table: Table) -> String {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}
