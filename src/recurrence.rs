//! Due-date arithmetic for recurring tasks.
//!
//! Month and year steps follow calendar overflow: when the target month is
//! shorter than the basis day-of-month, the surplus days spill into the
//! following month (Jan 31 + 1 month = Mar 2 in a leap year, Mar 3 otherwise;
//! Feb 29 + 1 year = Mar 1). Dates are never clamped to month end.

use chrono::{DateTime, Datelike, Days, NaiveDate, TimeDelta, Utc};

use crate::models::{Periodicity, PeriodicityUnit};

/// Returns the moment a task with `periodicity` is next due, counting from `basis`.
///
/// Time of day is carried over from `basis`. A zero `value` counts as one unit.
pub fn next_due(basis: DateTime<Utc>, periodicity: &Periodicity) -> DateTime<Utc> {
    let n = periodicity.value.max(1);
    let next = match periodicity.unit {
        PeriodicityUnit::Days => basis.checked_add_signed(TimeDelta::days(i64::from(n))),
        PeriodicityUnit::Weeks => basis.checked_add_signed(TimeDelta::weeks(i64::from(n))),
        PeriodicityUnit::Months => add_months(basis, u64::from(n)),
        PeriodicityUnit::Years => add_months(basis, u64::from(n) * 12),
    };
    next.unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn add_months(basis: DateTime<Utc>, months: u64) -> Option<DateTime<Utc>> {
    let date = basis.date_naive();
    let total = u64::from(date.month0()) + months;
    let year = i32::try_from(i64::from(date.year()) + i64::try_from(total / 12).ok()?).ok()?;
    let month = (total % 12) as u32 + 1;
    let target = NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_days(Days::new(u64::from(date.day0())))?;
    Some(target.and_time(basis.time()).and_utc())
}
