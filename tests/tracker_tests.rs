use std::io;

use chrono::{DateTime, TimeZone, Utc};
use pawcare::catalog::BASE_TASKS;
use pawcare::error::{StoreError, TrackerError};
use pawcare::models::{Dog, Periodicity, Task};
use pawcare::prefs::PreferenceStore;
use pawcare::reducer::{TaskDraft, TaskEdit};
use pawcare::storage::TaskStore;
use pawcare::tracker::{custom_key, Tracker};

#[derive(Default)]
struct MemoryStore {
    dogs: Vec<Dog>,
    fail_writes: bool,
    fail_reads: bool,
    writes: usize,
}

impl TaskStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Dog>, StoreError> {
        if self.fail_reads {
            return Err(StoreError::Unavailable("offline".into()));
        }
        Ok(self.dogs.clone())
    }

    fn create_dog(
        &mut self,
        name: &str,
        age_years: u32,
        age_months: u32,
        initial_tasks: Vec<Task>,
    ) -> Result<Dog, StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("read-only".into()));
        }
        let dog = Dog {
            id: format!("dog_{}", self.dogs.len() + 1),
            name: name.into(),
            age_years,
            age_months,
            tasks: initial_tasks,
        };
        self.dogs.push(dog.clone());
        self.writes += 1;
        Ok(dog)
    }

    fn replace_tasks(&mut self, dog_id: &str, tasks: &[Task]) -> Result<(), StoreError> {
        if self.fail_writes {
            return Err(StoreError::Write("read-only".into()));
        }
        let dog = self
            .dogs
            .iter_mut()
            .find(|d| d.id == dog_id)
            .ok_or_else(|| StoreError::Write("unknown dog".into()))?;
        dog.tasks = tasks.to_vec();
        self.writes += 1;
        Ok(())
    }
}

#[derive(Default)]
struct MemoryPrefs {
    active: Option<String>,
    broken: bool,
}

impl PreferenceStore for MemoryPrefs {
    fn active_dog_id(&self) -> Option<String> {
        self.active.clone()
    }

    fn set_active_dog_id(&mut self, dog_id: &str) -> io::Result<()> {
        if self.broken {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"));
        }
        self.active = Some(dog_id.into());
        Ok(())
    }
}

fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn tracker_with_dog() -> (Tracker<MemoryStore, MemoryPrefs>, String) {
    let mut tracker = Tracker::load(MemoryStore::default(), MemoryPrefs::default());
    let id = tracker.add_dog("Rocky", 3, 4, at(2024, 1, 1)).unwrap().id.clone();
    (tracker, id)
}

#[test]
fn test_unavailable_store_means_no_dogs() {
    let store = MemoryStore { fail_reads: true, ..MemoryStore::default() };
    let tracker = Tracker::load(store, MemoryPrefs::default());
    assert!(tracker.dogs().is_empty());
    assert!(tracker.active_dog().is_none());
}

#[test]
fn test_add_dog_uses_catalog_and_selects_it() {
    let (tracker, id) = tracker_with_dog();
    let dog = tracker.active_dog().unwrap();
    assert_eq!(dog.id, id);
    assert_eq!(dog.tasks.len(), BASE_TASKS.len());
    assert_eq!(tracker.store().dogs[0].tasks.len(), BASE_TASKS.len());
}

#[test]
fn test_add_dog_rejects_blank_name_and_clamps_months() {
    let mut tracker = Tracker::load(MemoryStore::default(), MemoryPrefs::default());
    let err = tracker.add_dog("   ", 1, 0, at(2024, 1, 1)).unwrap_err();
    assert!(matches!(err, TrackerError::Validation(_)));
    assert_eq!(tracker.store().writes, 0);

    let dog = tracker.add_dog(" Luna ", 0, 14, at(2024, 1, 1)).unwrap();
    assert_eq!(dog.name, "Luna");
    assert_eq!(dog.age_months, 11);
}

#[test]
fn test_saved_selection_is_restored_or_falls_back_to_first() {
    let store = MemoryStore {
        dogs: vec![
            Dog { id: "a".into(), name: "A".into(), age_years: 1, age_months: 0, tasks: vec![] },
            Dog { id: "b".into(), name: "B".into(), age_years: 2, age_months: 0, tasks: vec![] },
        ],
        ..MemoryStore::default()
    };
    let prefs = MemoryPrefs { active: Some("b".into()), broken: false };
    let tracker = Tracker::load(store, prefs);
    assert_eq!(tracker.active_dog_id(), Some("b"));

    let store = MemoryStore { dogs: tracker.dogs().to_vec(), ..MemoryStore::default() };
    let prefs = MemoryPrefs { active: Some("gone".into()), broken: false };
    let tracker = Tracker::load(store, prefs);
    assert_eq!(tracker.active_dog_id(), Some("a"));
}

#[test]
fn test_select_ignores_preference_write_failure() {
    let store = MemoryStore {
        dogs: vec![Dog {
            id: "a".into(),
            name: "A".into(),
            age_years: 1,
            age_months: 0,
            tasks: vec![],
        }],
        ..MemoryStore::default()
    };
    let mut tracker = Tracker::load(store, MemoryPrefs { active: None, broken: true });
    tracker.select_dog("a").unwrap();
    assert_eq!(tracker.active_dog_id(), Some("a"));
    assert!(matches!(tracker.select_dog("zzz"), Err(TrackerError::DogNotFound(_))));
}

#[test]
fn test_complete_and_delete_round_trip_through_store() {
    let (mut tracker, dog_id) = tracker_with_dog();
    let mut draft = TaskDraft::custom(custom_key(), "Ear cleaning");
    draft.periodicity = Periodicity::weeks(2);
    let task_id = tracker.create_task(&dog_id, draft, at(2024, 3, 1)).unwrap().id.clone();

    let task = tracker
        .complete_task(&dog_id, &task_id, at(2024, 3, 10), Some("both ears".into()))
        .unwrap();
    assert_eq!(task.next_due_date, Some(at(2024, 3, 24)));
    let entry_id = task.history[0].id.clone();
    assert!(entry_id.starts_with("hist_"));

    let stored = tracker.store().dogs[0].task(&task_id).unwrap().clone();
    assert_eq!(stored.last_completed, Some(at(2024, 3, 10)));

    let task = tracker.delete_history_entry(&dog_id, &task_id, &entry_id, at(2024, 4, 1)).unwrap();
    assert_eq!(task.last_completed, None);
    assert_eq!(task.next_due_date, Some(at(2024, 4, 15)));
}

#[test]
fn test_failed_write_leaves_memory_untouched() {
    let (mut tracker, dog_id) = tracker_with_dog();
    let before = tracker.active_dog().unwrap().clone();
    let task_id = before.tasks[0].id.clone();

    let mut broken = Tracker::load(
        MemoryStore { dogs: vec![before.clone()], fail_writes: true, ..MemoryStore::default() },
        MemoryPrefs::default(),
    );
    let err = broken.complete_task(&dog_id, &task_id, at(2024, 2, 1), None).unwrap_err();
    assert!(matches!(err, TrackerError::Store(StoreError::Write(_))));
    assert_eq!(broken.dog(&dog_id), Some(&before));

    let err = broken
        .create_task(&dog_id, TaskDraft::custom(custom_key(), "Bath"), at(2024, 2, 1))
        .unwrap_err();
    assert!(matches!(err, TrackerError::Store(_)));
    assert_eq!(broken.dog(&dog_id).unwrap().tasks.len(), before.tasks.len());

    assert!(broken.add_dog("Max", 1, 0, at(2024, 2, 1)).is_err());
    assert_eq!(broken.dogs().len(), 1);

    tracker.complete_task(&dog_id, &task_id, at(2024, 2, 1), None).unwrap();
    assert_ne!(tracker.dog(&dog_id), Some(&before));
}

#[test]
fn test_edit_validates_and_reports_unknown_ids() {
    let (mut tracker, dog_id) = tracker_with_dog();
    let task_id = tracker.active_dog().unwrap().tasks[0].id.clone();

    let blank = TaskEdit { title: Some(" ".into()), ..TaskEdit::default() };
    assert!(matches!(
        tracker.edit_task(&dog_id, &task_id, blank, at(2024, 1, 2)),
        Err(TrackerError::Validation(_))
    ));
    assert!(matches!(
        tracker.edit_task(&dog_id, "task_nope", TaskEdit::default(), at(2024, 1, 2)),
        Err(TrackerError::TaskNotFound(_))
    ));
    assert!(matches!(
        tracker.complete_task("dog_nope", &task_id, at(2024, 1, 2), None),
        Err(TrackerError::DogNotFound(_))
    ));

    let edit = TaskEdit { periodicity: Some(Periodicity::days(9)), ..TaskEdit::default() };
    let t = tracker.edit_task(&dog_id, &task_id, edit, at(2024, 5, 1)).unwrap();
    assert_eq!(t.next_due_date, Some(at(2024, 5, 10)));
}
