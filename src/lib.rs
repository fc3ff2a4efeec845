//! # PawCare
//!
//! Keeps track of recurring care for your dogs: vaccines, deworming,
//! antiparasitics, grooming, checkups. Each dog gets a starter list of tasks
//! from a fixed catalog; every task has a periodicity and a history of
//! completions, from which its next due date is derived.
//!
//! ## Features
//!
//! *   **Calendar-aware scheduling**: days, weeks, months and years, with month-end
//!     overflow (Jan 31 + 1 month lands in early March).
//! *   **History**: completions can be back-dated and removed; the schedule is always
//!     re-derived from the most recent remaining completion.
//! *   **Urgency buckets**: overdue, urgent (within a week), soon, upcoming and normal.
//! *   **Data Persistence**: Dogs are stored in standard XDG data directories (JSON format).
//!
//! ## Usage
//!
//! ```bash
//! pawcare add-dog Rocky --years 3 --months 4
//! pawcare list
//! pawcare done task_1a2b3c4d --date 2024-03-10 --note "brand X pipette"
//! pawcare edit task_1a2b3c4d --every 2 --unit weeks
//! pawcare history task_1a2b3c4d
//! pawcare undo task_1a2b3c4d hist_9f8e7d6c
//! ```
//!
//! ## Data Storage
//!
//! Dogs are saved in your local data directory:
//! *   Linux: `~/.local/share/pawcare/dogs.json`
//! *   macOS: `~/Library/Application Support/pawcare/dogs.json`
//! *   Windows: `%APPDATA%\pawcare\dogs.json`
//!
//! You can override this by setting the `PAWCARE_DB` environment variable or
//! passing `--db`. The last selected dog is remembered in `prefs.json` next to it.

pub mod catalog;
pub mod commands;
pub mod error;
pub mod models;
pub mod prefs;
pub mod recurrence;
pub mod reducer;
pub mod storage;
pub mod tracker;
pub mod urgency;

pub use error::{StoreError, TrackerError};
pub use models::{BaseTask, Dog, HistoryEntry, Periodicity, PeriodicityUnit, Task};
pub use recurrence::next_due;
pub use reducer::{apply, create_task, TaskDraft, TaskEdit, TaskEvent};
pub use tracker::Tracker;
pub use urgency::{classify, Urgency, UrgencyBucket};
