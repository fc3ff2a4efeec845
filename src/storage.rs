use std::fs::{self, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Dog, Task};

/// Persistence boundary for dogs and their tasks.
///
/// Implementations either apply a write completely or report an error;
/// callers rely on that to keep their in-memory copy in step.
pub trait TaskStore {
    /// Loads every dog with its tasks.
    fn load_all(&self) -> Result<Vec<Dog>, StoreError>;

    /// Persists a new dog and returns it with its assigned id.
    fn create_dog(
        &mut self,
        name: &str,
        age_years: u32,
        age_months: u32,
        initial_tasks: Vec<Task>,
    ) -> Result<Dog, StoreError>;

    /// Overwrites the whole task list of one dog.
    fn replace_tasks(&mut self, dog_id: &str, tasks: &[Task]) -> Result<(), StoreError>;
}

/// Returns the path to the dogs database file (`dogs.json`).
///
/// The path is determined in the following order:
/// 1. `PAWCARE_DB` environment variable.
/// 2. `~/.local/share/pawcare/dogs.json` (on Linux).
/// 3. `./dogs.json` (fallback).
pub fn db_path() -> PathBuf {
    std::env::var("PAWCARE_DB").map(PathBuf::from).unwrap_or_else(|_| {
        let mut p = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        p.push("pawcare");
        p.push("dogs.json");
        p
    })
}

/// Task store backed by a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonStore { path: path.into() }
    }

    /// Store at [`db_path`].
    pub fn from_env() -> Self {
        JsonStore::new(db_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling `.tmp` file and renames it over the database,
    /// so a failed write leaves the previous contents in place.
    fn write_dogs(&self, dogs: &[Dog]) -> Result<(), StoreError> {
        let s =
            serde_json::to_string_pretty(dogs).map_err(|e| StoreError::Write(e.to_string()))?;
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| write_error(&self.path, e))?;
        }
        let tmp = self.tmp_path();
        let written = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)
            .and_then(|mut f| {
                f.write_all(s.as_bytes())?;
                f.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(write_error(&self.path, e));
        }
        debug!(path = %self.path.display(), dogs = dogs.len(), "saved dogs");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Reads the current file for a read-modify-write cycle.
    fn load_for_write(&self) -> Result<Vec<Dog>, StoreError> {
        self.load_all()
            .map_err(|e| StoreError::Write(format!("cannot read existing data: {}", e)))
    }
}

fn write_error(path: &Path, e: std::io::Error) -> StoreError {
    StoreError::Write(format!("{}: {}", path.display(), e))
}

impl TaskStore for JsonStore {
    /// A missing file is an empty collection; unreadable or malformed content is an error.
    fn load_all(&self) -> Result<Vec<Dog>, StoreError> {
        if !self.path.exists() {
            debug!(path = %self.path.display(), "no database yet");
            return Ok(Vec::new());
        }
        let unavailable = |e: std::io::Error| {
            StoreError::Unavailable(format!("{}: {}", self.path.display(), e))
        };
        let mut f = OpenOptions::new().read(true).open(&self.path).map_err(unavailable)?;
        let mut s = String::new();
        f.read_to_string(&mut s).map_err(unavailable)?;
        if s.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&s).map_err(|e| {
            StoreError::Unavailable(format!("{} is not valid: {}", self.path.display(), e))
        })
    }

    fn create_dog(
        &mut self,
        name: &str,
        age_years: u32,
        age_months: u32,
        initial_tasks: Vec<Task>,
    ) -> Result<Dog, StoreError> {
        let mut dogs = self.load_for_write()?;
        let dog = Dog {
            id: Uuid::new_v4().simple().to_string(),
            name: name.to_string(),
            age_years,
            age_months,
            tasks: initial_tasks,
        };
        dogs.push(dog.clone());
        self.write_dogs(&dogs)?;
        Ok(dog)
    }

    fn replace_tasks(&mut self, dog_id: &str, tasks: &[Task]) -> Result<(), StoreError> {
        let mut dogs = self.load_for_write()?;
        let dog = dogs
            .iter_mut()
            .find(|d| d.id == dog_id)
            .ok_or_else(|| StoreError::Write(format!("no stored dog with id '{}'", dog_id)))?;
        dog.tasks = tasks.to_vec();
        self.write_dogs(&dogs)
    }
}
