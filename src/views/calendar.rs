//! Calendar view: tasks grouped by due date.
//!
//! Dates come from the API as `YYYY-MM-DD`, sometimes with a time suffix.
//! Tasks without a parseable due date are listed last under
//! [`UNDATED_HEADING`].

#[cfg(test)]
#[path = "calendar_test.rs"]
mod tests;

use std::collections::BTreeMap;

use time::Date;
use time::macros::format_description;

use super::tasks::render_line;
use crate::net::types::Task;

pub const UNDATED_HEADING: &str = "sin fecha";

/// Tasks bucketed by due date, ascending, plus the undated remainder.
#[derive(Debug, Default)]
pub struct Agenda<'a> {
    pub days: BTreeMap<Date, Vec<&'a Task>>,
    pub undated: Vec<&'a Task>,
}

impl<'a> Agenda<'a> {
    #[must_use]
    pub fn build(tasks: &'a [Task]) -> Self {
        let mut agenda = Self::default();
        for task in tasks {
            match task.due_date.as_deref().and_then(parse_due_date) {
                Some(date) => agenda.days.entry(date).or_default().push(task),
                None => agenda.undated.push(task),
            }
        }
        agenda
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.undated.is_empty()
    }
}

/// Parse the date part of an API due date.
///
/// Anything after `YYYY-MM-DD` must be a time suffix starting with `T` or a
/// space.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<Date> {
    let trimmed = raw.trim();
    let (day, rest) = (trimmed.get(..10)?, trimmed.get(10..)?);
    if !(rest.is_empty() || rest.starts_with(['T', ' '])) {
        tracing::debug!(raw, "due date has trailing garbage");
        return None;
    }
    match Date::parse(day, format_description!("[year]-[month]-[day]")) {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::debug!(raw, error = %e, "unparseable due date");
            None
        }
    }
}

#[must_use]
pub fn render(tasks: &[Task]) -> String {
    let agenda = Agenda::build(tasks);
    if agenda.is_empty() {
        return super::tasks::EMPTY_MESSAGE.to_owned();
    }

    let mut sections = Vec::new();
    for (date, day_tasks) in &agenda.days {
        sections.push(render_section(&heading(*date), day_tasks));
    }
    if !agenda.undated.is_empty() {
        sections.push(render_section(UNDATED_HEADING, &agenda.undated));
    }
    sections.join("\n\n")
}

fn heading(date: Date) -> String {
    let day = date
        .format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| date.to_string());
    format!("{day} ({})", date.weekday())
}

fn render_section(heading: &str, tasks: &[&Task]) -> String {
    let mut out = format!("{heading}\n");
    let lines: Vec<String> = tasks.iter().map(|t| format!("  {}", render_line(t))).collect();
    out.push_str(&lines.join("\n"));
    out
}
