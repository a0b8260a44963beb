//! Task list view.

#[cfg(test)]
#[path = "tasks_test.rs"]
mod tests;

use crate::net::types::Task;

pub const EMPTY_MESSAGE: &str = "No hay tareas.";

/// One line per task: completion marker, id, priority, title and due date.
#[must_use]
pub fn render(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return EMPTY_MESSAGE.to_owned();
    }
    let mut out = String::new();
    for (i, task) in tasks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(&render_line(task));
    }
    out
}

pub(crate) fn render_line(task: &Task) -> String {
    let mark = if task.completed { 'x' } else { ' ' };
    let mut line = format!("[{mark}] #{:<4} {:<5} {}", task.id, task.priority.as_str(), task.title);
    if let Some(due) = task.due_date.as_deref().filter(|d| !d.is_empty()) {
        line.push_str(&format!("  (vence {due})"));
    }
    line
}
