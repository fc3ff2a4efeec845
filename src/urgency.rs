use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

/// How pressing a due date is, from most to least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UrgencyBucket {
    Overdue,
    Urgent,
    Soon,
    Upcoming,
    Normal,
    Unscheduled,
}

/// Result of [`classify`]: the bucket plus the whole-day distance to the due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Urgency {
    pub bucket: UrgencyBucket,
    /// Days from today until the due date; negative when late, `None` when unscheduled.
    pub days_offset: Option<i64>,
}

/// Classifies a due date relative to `today`.
///
/// Both sides are reduced to calendar days before differencing, so the
/// time of day never shifts a task between buckets. The cut points are:
/// - **Overdue**: before today.
/// - **Urgent**: today up to 7 days ahead.
/// - **Soon**: 8 to 15 days.
/// - **Upcoming**: 16 to 30 days.
/// - **Normal**: beyond 30 days.
pub fn classify(due: Option<DateTime<Utc>>, today: NaiveDate) -> Urgency {
    let Some(due) = due else {
        return Urgency { bucket: UrgencyBucket::Unscheduled, days_offset: None };
    };
    let days = (due.date_naive() - today).num_days();
    let bucket = match days {
        d if d < 0 => UrgencyBucket::Overdue,
        0..=7 => UrgencyBucket::Urgent,
        8..=15 => UrgencyBucket::Soon,
        16..=30 => UrgencyBucket::Upcoming,
        _ => UrgencyBucket::Normal,
    };
    Urgency { bucket, days_offset: Some(days) }
}

impl Urgency {
    /// Days late, when overdue.
    pub fn overdue_by(&self) -> Option<i64> {
        match (self.bucket, self.days_offset) {
            (UrgencyBucket::Overdue, Some(d)) => Some(-d),
            _ => None,
        }
    }

    /// Whether the task deserves visual emphasis in a listing.
    pub fn is_highlighted(&self) -> bool {
        !matches!(self.bucket, UrgencyBucket::Normal | UrgencyBucket::Unscheduled)
    }

    /// Short human-facing description, e.g. `tomorrow` or `3 days overdue`.
    pub fn label(&self) -> String {
        match (self.bucket, self.days_offset) {
            (UrgencyBucket::Unscheduled, _) | (_, None) => "no due date".to_string(),
            (UrgencyBucket::Overdue, Some(d)) => match -d {
                1 => "1 day overdue".to_string(),
                late => format!("{} days overdue", late),
            },
            (_, Some(0)) => "today".to_string(),
            (_, Some(1)) => "tomorrow".to_string(),
            (_, Some(d)) => format!("in {} days", d),
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}
