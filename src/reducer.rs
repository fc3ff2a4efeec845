//! Pure state transitions for a single [`Task`].
//!
//! Every function here takes the current task by reference and returns a new
//! value. Fresh ids and the current moment are inputs, so the same arguments
//! always produce the same task.

use chrono::{DateTime, Utc};

use crate::models::{BaseTask, HistoryEntry, Periodicity, Task};
use crate::recurrence::next_due;

/// Fields for a task that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub key: String,
    pub title: String,
    pub note: String,
    pub periodicity: Periodicity,
    pub is_active: bool,
}

impl TaskDraft {
    /// A user-defined task; `key` should carry the `custom_` prefix.
    pub fn custom(key: impl Into<String>, title: impl Into<String>) -> Self {
        TaskDraft {
            key: key.into(),
            title: title.into(),
            note: String::new(),
            periodicity: Periodicity::default(),
            is_active: true,
        }
    }
}

impl From<&BaseTask> for TaskDraft {
    fn from(base: &BaseTask) -> Self {
        TaskDraft {
            key: base.key.to_string(),
            title: base.title.to_string(),
            note: base.note.to_string(),
            periodicity: base.periodicity,
            is_active: base.is_active,
        }
    }
}

/// Partial update of a task. `None` leaves the field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskEdit {
    pub title: Option<String>,
    pub note: Option<String>,
    pub periodicity: Option<Periodicity>,
    pub is_active: Option<bool>,
    /// Manual due date. Ignored when the periodicity changes in the same edit.
    pub next_due_date: Option<DateTime<Utc>>,
}

impl TaskEdit {
    pub fn is_empty(&self) -> bool {
        *self == TaskEdit::default()
    }
}

/// Something that happened to an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskEvent {
    Edit {
        edit: TaskEdit,
        now: DateTime<Utc>,
    },
    Complete {
        entry_id: String,
        date: DateTime<Utc>,
        note: Option<String>,
    },
    DeleteHistoryEntry {
        entry_id: String,
        now: DateTime<Utc>,
    },
}

/// Builds a new task with an empty history, due one period after `now`.
pub fn create_task(draft: TaskDraft, id: impl Into<String>, now: DateTime<Utc>) -> Task {
    Task {
        id: id.into(),
        key: draft.key,
        title: draft.title,
        note: draft.note,
        next_due_date: Some(next_due(now, &draft.periodicity)),
        periodicity: draft.periodicity,
        last_completed: None,
        is_active: draft.is_active,
        history: Vec::new(),
    }
}

/// Applies `event` to `task` and returns the resulting task.
pub fn apply(task: &Task, event: TaskEvent) -> Task {
    match event {
        TaskEvent::Edit { edit, now } => edit_task(task, edit, now),
        TaskEvent::Complete { entry_id, date, note } => complete_task(task, entry_id, date, note),
        TaskEvent::DeleteHistoryEntry { entry_id, now } => {
            delete_history_entry(task, &entry_id, now)
        }
    }
}

fn edit_task(task: &Task, edit: TaskEdit, now: DateTime<Utc>) -> Task {
    let mut next = task.clone();
    if let Some(title) = edit.title {
        next.title = title;
    }
    if let Some(note) = edit.note {
        next.note = note;
    }
    if let Some(active) = edit.is_active {
        next.is_active = active;
    }
    if let Some(due) = edit.next_due_date {
        next.next_due_date = Some(due);
    }
    if let Some(periodicity) = edit.periodicity {
        next.periodicity = periodicity;
    }
    if next.periodicity != task.periodicity {
        let basis = next.last_completed.unwrap_or(now);
        next.next_due_date = Some(next_due(basis, &next.periodicity));
    }
    next
}

fn complete_task(
    task: &Task,
    entry_id: String,
    date: DateTime<Utc>,
    note: Option<String>,
) -> Task {
    let note = note
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let mut history = Vec::with_capacity(task.history.len() + 1);
    history.push(HistoryEntry { id: entry_id, date, note });
    history.extend(task.history.iter().cloned());
    sort_history(&mut history);

    let mut next = Task { history, ..task.clone() };
    // A back-dated completion must not displace a later entry as the basis.
    rederive_schedule(&mut next, date);
    next
}

fn delete_history_entry(task: &Task, entry_id: &str, now: DateTime<Utc>) -> Task {
    if !task.history.iter().any(|h| h.id == entry_id) {
        return task.clone();
    }
    let mut next = task.clone();
    next.history.retain(|h| h.id != entry_id);
    rederive_schedule(&mut next, now);
    next
}

/// Recomputes `last_completed` from history and `next_due_date` from it,
/// using `fallback` as the basis when history is empty.
fn rederive_schedule(task: &mut Task, fallback: DateTime<Utc>) {
    task.last_completed = task.latest_entry().map(|h| h.date);
    let basis = task.last_completed.unwrap_or(fallback);
    task.next_due_date = Some(next_due(basis, &task.periodicity));
}

/// Orders entries newest first; equal dates fall back to id, also descending.
pub fn sort_history(history: &mut [HistoryEntry]) {
    history.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
}
