use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Calendar unit of a [`Periodicity`].
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PeriodicityUnit {
    Days,
    Weeks,
    Months,
    Years,
}

impl PeriodicityUnit {
    /// Unit assumed when a stored unit cannot be recognised.
    pub const FALLBACK: PeriodicityUnit = PeriodicityUnit::Months;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Days => "days",
            Self::Weeks => "weeks",
            Self::Months => "months",
            Self::Years => "years",
        }
    }

    fn singular(&self) -> &'static str {
        match self {
            Self::Days => "day",
            Self::Weeks => "week",
            Self::Months => "month",
            Self::Years => "year",
        }
    }
}

impl FromStr for PeriodicityUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "d" | "day" | "days" => Ok(Self::Days),
            "w" | "week" | "weeks" => Ok(Self::Weeks),
            "m" | "month" | "months" => Ok(Self::Months),
            "y" | "year" | "years" => Ok(Self::Years),
            other => Err(format!(
                "unknown periodicity unit '{}'. Supported: days, weeks, months, years.",
                other
            )),
        }
    }
}

impl<'de> Deserialize<'de> for PeriodicityUnit {
    /// Unrecognised units load as [`PeriodicityUnit::FALLBACK`] instead of failing the whole
    /// document.
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse::<Self>().unwrap_or_else(|e: String| {
            tracing::warn!("{}; using '{}'", e, Self::FALLBACK);
            Self::FALLBACK
        }))
    }
}

impl fmt::Display for PeriodicityUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interval between two consecutive occurrences of a task.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Periodicity {
    /// Number of units; always at least 1 when built through [`Periodicity::new`].
    pub value: u32,
    pub unit: PeriodicityUnit,
}

impl Periodicity {
    pub fn new(value: u32, unit: PeriodicityUnit) -> Self {
        Periodicity { value: value.max(1), unit }
    }

    pub const fn days(value: u32) -> Self {
        Periodicity { value, unit: PeriodicityUnit::Days }
    }

    pub const fn weeks(value: u32) -> Self {
        Periodicity { value, unit: PeriodicityUnit::Weeks }
    }

    pub const fn months(value: u32) -> Self {
        Periodicity { value, unit: PeriodicityUnit::Months }
    }

    pub const fn years(value: u32) -> Self {
        Periodicity { value, unit: PeriodicityUnit::Years }
    }
}

impl Default for Periodicity {
    fn default() -> Self {
        Periodicity::months(1)
    }
}

impl fmt::Display for Periodicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value <= 1 {
            write!(f, "every {}", self.unit.singular())
        } else {
            write!(f, "every {} {}", self.value, self.unit)
        }
    }
}

/// One recorded completion of a task.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub id: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

fn default_active() -> bool {
    true
}

/// A recurring care task attached to a dog.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Unique within the owning dog.
    pub id: String,
    /// Catalog key the task was created from, or `custom_*`.
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub note: String,
    pub periodicity: Periodicity,
    /// Date of the most recent history entry.
    #[serde(default)]
    pub last_completed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub next_due_date: Option<DateTime<Utc>>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Task {
    /// The entry with the latest date; ties go to the greater id.
    pub fn latest_entry(&self) -> Option<&HistoryEntry> {
        self.history
            .iter()
            .max_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)))
    }

    pub fn is_custom(&self) -> bool {
        self.key.starts_with("custom_")
    }
}

/// A dog and the care tasks it owns.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Dog {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub age_years: u32,
    #[serde(default)]
    pub age_months: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Dog {
    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    /// Splits the tasks into the active agenda and the inactive rest.
    ///
    /// Active tasks come soonest-due first, with unscheduled ones last;
    /// inactive tasks are ordered by title.
    pub fn agenda(&self) -> (Vec<&Task>, Vec<&Task>) {
        let (mut active, mut inactive): (Vec<&Task>, Vec<&Task>) =
            self.tasks.iter().partition(|t| t.is_active);
        active.sort_by_key(|t| (t.next_due_date.is_none(), t.next_due_date));
        inactive.sort_by(|a, b| a.title.cmp(&b.title));
        (active, inactive)
    }

    pub fn age_label(&self) -> String {
        match (self.age_years, self.age_months) {
            (0, m) => format!("{}m", m),
            (y, 0) => format!("{}y", y),
            (y, m) => format!("{}y {}m", y, m),
        }
    }
}

/// Starter task definition from the template catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseTask {
    pub key: &'static str,
    pub title: &'static str,
    pub note: &'static str,
    pub periodicity: Periodicity,
    pub is_active: bool,
}
