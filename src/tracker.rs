//! Application service tying the reducer to the task and preference stores.
//!
//! Every mutation is computed on a copy, written through the [`TaskStore`],
//! and only then swapped into memory. A failed write leaves the tracker
//! exactly as it was.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::starter_tasks;
use crate::error::{Result, StoreError, TrackerError};
use crate::models::{Dog, Task};
use crate::prefs::PreferenceStore;
use crate::reducer::{apply, create_task, TaskDraft, TaskEdit, TaskEvent};
use crate::storage::TaskStore;

/// Generates a prefixed random id such as `task_3f2c...`.
pub fn new_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

/// Key for a task that does not come from the catalog.
pub fn custom_key() -> String {
    new_id("custom")
}

pub struct Tracker<S, P> {
    store: S,
    prefs: P,
    dogs: Vec<Dog>,
    active_dog_id: Option<String>,
}

impl<S: TaskStore, P: PreferenceStore> Tracker<S, P> {
    /// Loads all dogs and restores the last selection.
    ///
    /// An unavailable store yields a tracker with no dogs.
    pub fn load(store: S, prefs: P) -> Self {
        let dogs = match store.load_all() {
            Ok(dogs) => dogs,
            Err(e) => {
                warn!("starting with no dogs: {}", e);
                Vec::new()
            }
        };
        let saved = prefs.active_dog_id();
        let active_dog_id = saved
            .filter(|id| dogs.iter().any(|d| &d.id == id))
            .or_else(|| dogs.first().map(|d| d.id.clone()));
        debug!(dogs = dogs.len(), active = ?active_dog_id, "tracker loaded");
        Tracker { store, prefs, dogs, active_dog_id }
    }

    pub fn dogs(&self) -> &[Dog] {
        &self.dogs
    }

    pub fn dog(&self, dog_id: &str) -> Option<&Dog> {
        self.dogs.iter().find(|d| d.id == dog_id)
    }

    pub fn active_dog_id(&self) -> Option<&str> {
        self.active_dog_id.as_deref()
    }

    pub fn active_dog(&self) -> Option<&Dog> {
        self.active_dog_id.as_deref().and_then(|id| self.dog(id))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Makes `dog_id` the selected dog and remembers it; a failure to remember is ignored.
    pub fn select_dog(&mut self, dog_id: &str) -> Result<()> {
        if self.dog(dog_id).is_none() {
            return Err(TrackerError::DogNotFound(dog_id.to_string()));
        }
        self.active_dog_id = Some(dog_id.to_string());
        self.remember_selection(dog_id);
        Ok(())
    }

    fn remember_selection(&mut self, dog_id: &str) {
        if let Err(e) = self.prefs.set_active_dog_id(dog_id) {
            debug!("could not save selected dog: {}", e);
        }
    }

    /// Registers a dog with the catalog's starter tasks and selects it.
    pub fn add_dog(
        &mut self,
        name: &str,
        age_years: u32,
        age_months: u32,
        now: DateTime<Utc>,
    ) -> Result<&Dog> {
        let name = name.trim();
        if name.is_empty() {
            return Err(TrackerError::Validation("dog name is required".into()));
        }
        let tasks = starter_tasks(now, || new_id("task"));
        let dog = self
            .store
            .create_dog(name, age_years, age_months.min(11), tasks)
            .inspect_err(|e| warn!("add dog '{}' failed: {}", name, e))?;
        info!(dog = %dog.id, name = %dog.name, tasks = dog.tasks.len(), "dog added");
        let dog_id = dog.id.clone();
        self.dogs.push(dog);
        self.active_dog_id = Some(dog_id.clone());
        self.remember_selection(&dog_id);
        Ok(&self.dogs[self.dogs.len() - 1])
    }

    /// Adds a new task to a dog, scheduled one period after `now`.
    pub fn create_task(
        &mut self,
        dog_id: &str,
        draft: TaskDraft,
        now: DateTime<Utc>,
    ) -> Result<&Task> {
        require_title(&draft.title)?;
        let idx = self.dog_index(dog_id)?;
        let task = create_task(draft, new_id("task"), now);
        let task_id = task.id.clone();
        let mut tasks = self.dogs[idx].tasks.clone();
        tasks.push(task);
        self.commit(idx, tasks)?;
        info!(dog = dog_id, task = %task_id, "task created");
        self.task_ref(idx, &task_id)
    }

    pub fn edit_task(
        &mut self,
        dog_id: &str,
        task_id: &str,
        edit: TaskEdit,
        now: DateTime<Utc>,
    ) -> Result<&Task> {
        if let Some(title) = &edit.title {
            require_title(title)?;
        }
        self.apply_event(dog_id, task_id, TaskEvent::Edit { edit, now })
    }

    /// Records a completion on `date` and reschedules the task from it.
    pub fn complete_task(
        &mut self,
        dog_id: &str,
        task_id: &str,
        date: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<&Task> {
        let event = TaskEvent::Complete { entry_id: new_id("hist"), date, note };
        self.apply_event(dog_id, task_id, event)
    }

    pub fn delete_history_entry(
        &mut self,
        dog_id: &str,
        task_id: &str,
        entry_id: &str,
        now: DateTime<Utc>,
    ) -> Result<&Task> {
        let event = TaskEvent::DeleteHistoryEntry { entry_id: entry_id.to_string(), now };
        self.apply_event(dog_id, task_id, event)
    }

    fn apply_event(&mut self, dog_id: &str, task_id: &str, event: TaskEvent) -> Result<&Task> {
        let idx = self.dog_index(dog_id)?;
        let tasks: Vec<Task> = {
            let current = &self.dogs[idx].tasks;
            let pos = current
                .iter()
                .position(|t| t.id == task_id)
                .ok_or_else(|| TrackerError::TaskNotFound(task_id.to_string()))?;
            let mut tasks = current.clone();
            tasks[pos] = apply(&current[pos], event);
            tasks
        };
        self.commit(idx, tasks)?;
        debug!(dog = dog_id, task = task_id, "task updated");
        self.task_ref(idx, task_id)
    }

    /// Persists the new list first and adopts it only if the write succeeded.
    fn commit(&mut self, idx: usize, tasks: Vec<Task>) -> std::result::Result<(), StoreError> {
        let dog_id = self.dogs[idx].id.clone();
        if let Err(e) = self.store.replace_tasks(&dog_id, &tasks) {
            warn!(dog = %dog_id, "change not saved: {}", e);
            return Err(e);
        }
        self.dogs[idx].tasks = tasks;
        Ok(())
    }

    fn dog_index(&self, dog_id: &str) -> Result<usize> {
        self.dogs
            .iter()
            .position(|d| d.id == dog_id)
            .ok_or_else(|| TrackerError::DogNotFound(dog_id.to_string()))
    }

    fn task_ref(&self, idx: usize, task_id: &str) -> Result<&Task> {
        self.dogs[idx]
            .task(task_id)
            .ok_or_else(|| TrackerError::TaskNotFound(task_id.to_string()))
    }
}

fn require_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(TrackerError::Validation("task title is required".into()));
    }
    Ok(())
}
