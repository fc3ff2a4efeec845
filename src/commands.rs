use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::catalog::{task_icon, BASE_TASKS};
use crate::models::{Dog, HistoryEntry, Periodicity, PeriodicityUnit, Task};
use crate::prefs::{FilePreferences, PreferenceStore};
use crate::reducer::{TaskDraft, TaskEdit};
use crate::storage::{JsonStore, TaskStore};
use crate::tracker::{custom_key, Tracker};
use crate::urgency::{classify, Urgency, UrgencyBucket};

/// Tracker over the JSON database and the preferences file next to it.
pub type App = Tracker<JsonStore, FilePreferences>;

/// Opens the tracker at `db`, or at [`JsonStore::from_env`] when no path is given.
pub fn open_app(db: Option<PathBuf>) -> App {
    let store = db.map(JsonStore::new).unwrap_or_else(JsonStore::from_env);
    let prefs = FilePreferences::beside(store.path());
    Tracker::load(store, prefs)
}

/// Parses a `YYYY-MM-DD` date as midnight UTC.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        .map_err(|e| format!("Invalid date '{}': {}. Use YYYY-MM-DD.", s, e))
}

/// Keeps the id prefix and the first eight characters after it.
fn short_id(id: &str) -> &str {
    let Some((prefix, rest)) = id.split_once('_') else {
        return id;
    };
    match rest.char_indices().nth(8) {
        Some((end, _)) => &id[..prefix.len() + 1 + end],
        None => id,
    }
}

fn format_date(d: Option<DateTime<Utc>>) -> String {
    d.map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Finds the dog named by `selector` (id, id prefix or case-insensitive name),
/// or the selected dog when no selector is given.
fn resolve_dog<'a, S, P>(
    app: &'a Tracker<S, P>,
    selector: Option<&str>,
) -> Result<&'a Dog, String>
where
    S: TaskStore,
    P: PreferenceStore,
{
    match selector {
        None => app
            .active_dog()
            .ok_or_else(|| "No dog registered yet. Use `add-dog` first.".to_string()),
        Some(sel) => {
            if let Some(d) = app.dog(sel) {
                return Ok(d);
            }
            let matches: Vec<&Dog> = app
                .dogs()
                .iter()
                .filter(|d| d.id.starts_with(sel) || d.name.eq_ignore_ascii_case(sel))
                .collect();
            match matches.as_slice() {
                [d] => Ok(*d),
                [] => Err(format!("Dog '{}' not found.", sel)),
                _ => Err(format!("'{}' matches more than one dog.", sel)),
            }
        }
    }
}

/// Finds a task by id, unique id prefix or catalog key.
fn resolve_task<'a>(dog: &'a Dog, selector: &str) -> Result<&'a Task, String> {
    if let Some(t) = dog.task(selector) {
        return Ok(t);
    }
    let matches: Vec<&Task> = dog
        .tasks
        .iter()
        .filter(|t| t.id.starts_with(selector) || t.key == selector)
        .collect();
    match matches.as_slice() {
        [t] => Ok(*t),
        [] => Err(format!("Task '{}' not found for {}.", selector, dog.name)),
        _ => Err(format!("'{}' matches more than one task.", selector)),
    }
}

/// Finds a history entry by exact id, or by a prefix shared with no other entry.
fn resolve_entry<'a>(task: &'a Task, selector: &str) -> Option<&'a HistoryEntry> {
    if let Some(h) = task.history.iter().find(|h| h.id == selector) {
        return Some(h);
    }
    let matches: Vec<&HistoryEntry> = task
        .history
        .iter()
        .filter(|h| h.id.starts_with(selector))
        .collect();
    match matches.as_slice() {
        [h] => Some(*h),
        _ => None,
    }
}

fn resolve_ids<S, P>(
    app: &Tracker<S, P>,
    dog: Option<&str>,
    task: &str,
) -> Result<(String, String), String>
where
    S: TaskStore,
    P: PreferenceStore,
{
    let d = resolve_dog(app, dog)?;
    let t = resolve_task(d, task)?;
    Ok((d.id.clone(), t.id.clone()))
}

fn urgency_color(u: &Urgency) -> Color {
    match u.bucket {
        UrgencyBucket::Overdue | UrgencyBucket::Urgent => Color::Red,
        UrgencyBucket::Soon => Color::Rgb { r: 234, g: 88, b: 12 },
        UrgencyBucket::Upcoming => Color::Yellow,
        UrgencyBucket::Normal => Color::Reset,
        UrgencyBucket::Unscheduled => Color::Grey,
    }
}

/// Registers a new dog with the starter task list.
pub fn cmd_add_dog<S, P>(
    app: &mut Tracker<S, P>,
    name: String,
    years: u32,
    months: u32,
    now: DateTime<Utc>,
    silent: bool,
) where
    S: TaskStore,
    P: PreferenceStore,
{
    match app.add_dog(&name, years, months, now) {
        Ok(dog) => {
            if !silent {
                println!(
                    "Dog '{}' added (id = {}) with {} tasks.",
                    dog.name,
                    short_id(&dog.id),
                    dog.tasks.len()
                );
            }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to add dog: {}", e); }
        }
    }
}

/// Selects the dog used when `--dog` is omitted.
pub fn cmd_select<S, P>(app: &mut Tracker<S, P>, dog: String, silent: bool)
where
    S: TaskStore,
    P: PreferenceStore,
{
    let id = match resolve_dog(app, Some(&dog)) {
        Ok(d) => d.id.clone(),
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    match app.select_dog(&id) {
        Ok(()) => {
            if !silent { println!("Now tracking {}.", dog); }
        }
        Err(e) => {
            if !silent { eprintln!("{}", e); }
        }
    }
}

/// Lists all registered dogs.
pub fn cmd_dogs<S, P>(app: &Tracker<S, P>, today: NaiveDate)
where
    S: TaskStore,
    P: PreferenceStore,
{
    if app.dogs().is_empty() {
        println!("No dogs registered. Use `add-dog <NAME>` to start.");
        return;
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["", "ID", "Name", "Age", "Tasks", "Next"]);
    for dog in app.dogs() {
        let marker = if app.active_dog_id() == Some(dog.id.as_str()) { "*" } else { "" };
        let (active, _) = dog.agenda();
        let next = active
            .first()
            .map(|t| format!("{} ({})", t.title, classify(t.next_due_date, today)))
            .unwrap_or_else(|| "-".into());
        table.add_row(vec![
            marker.to_string(),
            short_id(&dog.id).to_string(),
            dog.name.clone(),
            dog.age_label(),
            active.len().to_string(),
            next,
        ]);
    }
    println!("{table}");
}

/// Lists a dog's tasks, soonest due first.
///
/// Inactive tasks are hidden unless `all` is true.
pub fn cmd_list<S, P>(app: &Tracker<S, P>, dog: Option<String>, all: bool, today: NaiveDate)
where
    S: TaskStore,
    P: PreferenceStore,
{
    let dog = match resolve_dog(app, dog.as_deref()) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let (active, inactive) = dog.agenda();
    if active.is_empty() && (!all || inactive.is_empty()) {
        println!("No tasks for {}.", dog.name);
        return;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("ID").add_attribute(Attribute::Bold),
            Cell::new("").add_attribute(Attribute::Bold),
            Cell::new("Task").add_attribute(Attribute::Bold),
            Cell::new("Every").add_attribute(Attribute::Bold),
            Cell::new("Next").add_attribute(Attribute::Bold),
            Cell::new("Status").add_attribute(Attribute::Bold),
            Cell::new("Last").add_attribute(Attribute::Bold),
        ]);

    let inactive_shown = if all { inactive.len() } else { 0 };
    let shown = active.iter().chain(inactive.iter().take(inactive_shown));
    for t in shown {
        let urgency = classify(t.next_due_date, today);
        let status = if t.is_active { urgency.label() } else { "inactive".to_string() };
        let color = if t.is_active { urgency_color(&urgency) } else { Color::Grey };
        let mut status_cell = Cell::new(status).fg(color);
        if t.is_active && urgency.is_highlighted() {
            status_cell = status_cell.add_attribute(Attribute::Bold);
        }
        table.add_row(vec![
            Cell::new(short_id(&t.id)),
            Cell::new(task_icon(&t.key)),
            Cell::new(&t.title),
            Cell::new(t.periodicity),
            Cell::new(format_date(t.next_due_date)),
            status_cell,
            Cell::new(format_date(t.last_completed)),
        ]);
    }

    println!("{} ({})", dog.name, dog.age_label());
    println!("{table}");
}

/// Adds a custom task to a dog.
#[allow(clippy::too_many_arguments)]
pub fn cmd_add<S, P>(
    app: &mut Tracker<S, P>,
    dog: Option<String>,
    title: String,
    note: Option<String>,
    every: Option<u32>,
    unit: Option<PeriodicityUnit>,
    inactive: bool,
    now: DateTime<Utc>,
    silent: bool,
) where
    S: TaskStore,
    P: PreferenceStore,
{
    let dog_id = match resolve_dog(app, dog.as_deref()) {
        Ok(d) => d.id.clone(),
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let mut draft = TaskDraft::custom(custom_key(), title);
    draft.note = note.unwrap_or_default();
    draft.periodicity =
        Periodicity::new(every.unwrap_or(1), unit.unwrap_or(PeriodicityUnit::Months));
    draft.is_active = !inactive;

    match app.create_task(&dog_id, draft, now) {
        Ok(t) => {
            if !silent {
                println!(
                    "Task added (id = {}), next due {}.",
                    short_id(&t.id),
                    format_date(t.next_due_date)
                );
            }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to add task: {}", e); }
        }
    }
}

/// Edits a task's details.
///
/// Changing `every` or `unit` reschedules the task from its last completion.
#[allow(clippy::too_many_arguments)]
pub fn cmd_edit<S, P>(
    app: &mut Tracker<S, P>,
    dog: Option<String>,
    task: String,
    title: Option<String>,
    note: Option<String>,
    every: Option<u32>,
    unit: Option<PeriodicityUnit>,
    active: Option<bool>,
    due: Option<String>,
    now: DateTime<Utc>,
    silent: bool,
) where
    S: TaskStore,
    P: PreferenceStore,
{
    let (dog_id, task_id) = match resolve_ids(app, dog.as_deref(), &task) {
        Ok(ids) => ids,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let next_due_date = match due.as_deref().map(parse_date).transpose() {
        Ok(d) => d,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let periodicity = if every.is_some() || unit.is_some() {
        let current = app
            .dog(&dog_id)
            .and_then(|d| d.task(&task_id))
            .map(|t| t.periodicity)
            .unwrap_or_default();
        Some(Periodicity::new(every.unwrap_or(current.value), unit.unwrap_or(current.unit)))
    } else {
        None
    };
    let edit = TaskEdit { title, note, periodicity, is_active: active, next_due_date };
    if edit.is_empty() {
        if !silent { eprintln!("Nothing to change."); }
        return;
    }

    match app.edit_task(&dog_id, &task_id, edit, now) {
        Ok(t) => {
            if !silent {
                println!(
                    "Task {} updated, next due {}.",
                    short_id(&t.id),
                    format_date(t.next_due_date)
                );
            }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to save task: {}", e); }
        }
    }
}

/// Marks a task as done on `date` (default: today) and reschedules it.
pub fn cmd_done<S, P>(
    app: &mut Tracker<S, P>,
    dog: Option<String>,
    task: String,
    date: Option<String>,
    note: Option<String>,
    now: DateTime<Utc>,
    silent: bool,
) where
    S: TaskStore,
    P: PreferenceStore,
{
    let (dog_id, task_id) = match resolve_ids(app, dog.as_deref(), &task) {
        Ok(ids) => ids,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let completed_on = match date {
        Some(d) => match parse_date(&d) {
            Ok(d) => d,
            Err(e) => {
                if !silent { eprintln!("{}", e); }
                return;
            }
        },
        None => now.date_naive().and_time(NaiveTime::MIN).and_utc(),
    };

    match app.complete_task(&dog_id, &task_id, completed_on, note) {
        Ok(t) => {
            if !silent {
                let next = format_date(t.next_due_date);
                println!("'{}' marked as done. Next due {}.", t.title, next);
            }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to mark task as done: {}", e); }
        }
    }
}

/// Shows the completion history of a task, newest first.
pub fn cmd_history<S, P>(app: &Tracker<S, P>, dog: Option<String>, task: String)
where
    S: TaskStore,
    P: PreferenceStore,
{
    let t = match resolve_dog(app, dog.as_deref()).and_then(|d| resolve_task(d, &task)) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    println!("{} ({})", t.title, t.periodicity);
    if t.history.is_empty() {
        println!("Not done yet.");
        return;
    }
    let mut entries: Vec<_> = t.history.clone();
    crate::reducer::sort_history(&mut entries);
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Entry", "Date", "Note"]);
    for h in entries {
        table.add_row(vec![
            short_id(&h.id).to_string(),
            h.date.format("%d %B %Y").to_string(),
            h.note.unwrap_or_default(),
        ]);
    }
    println!("{table}");
}

/// Removes one history entry and reschedules the task.
pub fn cmd_undo<S, P>(
    app: &mut Tracker<S, P>,
    dog: Option<String>,
    task: String,
    entry: String,
    now: DateTime<Utc>,
    silent: bool,
) where
    S: TaskStore,
    P: PreferenceStore,
{
    let (dog_id, task_id) = match resolve_ids(app, dog.as_deref(), &task) {
        Ok(ids) => ids,
        Err(e) => {
            if !silent { eprintln!("{}", e); }
            return;
        }
    };
    let entry_id = app
        .dog(&dog_id)
        .and_then(|d| d.task(&task_id))
        .and_then(|t| resolve_entry(t, &entry))
        .map(|h| h.id.clone());
    let Some(entry_id) = entry_id else {
        if !silent { eprintln!("History entry '{}' not found.", entry); }
        return;
    };

    match app.delete_history_entry(&dog_id, &task_id, &entry_id, now) {
        Ok(t) => {
            if !silent { println!("Entry removed. Next due {}.", format_date(t.next_due_date)); }
        }
        Err(e) => {
            if !silent { eprintln!("Failed to delete history entry: {}", e); }
        }
    }
}

/// Lists the starter task catalog.
pub fn cmd_templates() {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Title", "Every", "Active", "Note"]);
    for b in BASE_TASKS {
        table.add_row(vec![
            b.key.to_string(),
            b.title.to_string(),
            b.periodicity.to_string(),
            if b.is_active { "yes" } else { "no" }.to_string(),
            b.note.to_string(),
        ]);
    }
    println!("{table}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ids_keep_prefix_and_eight_chars() {
        assert_eq!(short_id("task_0123456789abcdef"), "task_01234567");
        assert_eq!(short_id("task_1"), "task_1");
        assert_eq!(short_id("plain"), "plain");
    }

    #[test]
    fn short_ids_cut_on_char_boundaries() {
        assert_eq!(short_id("task_aéééé"), "task_aéééé");
        assert_eq!(short_id("task_éééééééééé"), "task_éééééééé");
        assert_eq!(short_id("perro_ñandú_1234567"), "perro_ñandú_12");
    }

    #[test]
    fn exact_entry_id_wins_over_longer_ids_sharing_it() {
        use chrono::TimeZone;
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let entry = |id: &str| HistoryEntry { id: id.into(), date: at, note: None };
        let task = Task {
            id: "task_1".into(),
            key: "custom_1".into(),
            title: "Bath".into(),
            note: String::new(),
            periodicity: Periodicity::default(),
            last_completed: Some(at),
            next_due_date: None,
            is_active: true,
            history: vec![entry("h1"), entry("h10"), entry("h20")],
        };
        assert_eq!(resolve_entry(&task, "h1").map(|h| h.id.as_str()), Some("h1"));
        assert_eq!(resolve_entry(&task, "h2").map(|h| h.id.as_str()), Some("h20"));
        assert!(resolve_entry(&task, "h").is_none());
        assert!(resolve_entry(&task, "x").is_none());
    }

    #[test]
    fn parse_date_is_midnight_utc() {
        let d = parse_date("2024-03-10").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-03-10T00:00:00+00:00");
        assert!(parse_date("10/03/2024").is_err());
    }
}
