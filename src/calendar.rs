//! Active (worked) day computation for a report month.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};

use crate::model::{Present, TargetMonth};

/// Ordered set of the days counted as worked within one month.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveDays {
    month: TargetMonth,
    days: BTreeSet<NaiveDate>,
}

impl ActiveDays {
    pub fn month(&self) -> TargetMonth {
        self.month
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    /// Active days in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.days.iter().copied()
    }
}

fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Computes the active days of `month`.
///
/// A non-empty `work_days` list is authoritative: its entries inside the month
/// are kept as given, weekends included, and `days_off` is not consulted.
/// Otherwise every Monday to Friday not listed in `days_off` counts. Dates
/// outside the month are ignored in both lists.
pub fn business_days(
    month: TargetMonth,
    work_days: &[NaiveDate],
    days_off: &[NaiveDate],
) -> ActiveDays {
    let days = if work_days.is_present() {
        work_days
            .iter()
            .copied()
            .filter(|date| month.contains(*date))
            .collect()
    } else {
        let excluded: BTreeSet<NaiveDate> = days_off.iter().copied().collect();
        month
            .days()
            .filter(|date| is_weekday(*date) && !excluded.contains(date))
            .collect()
    };

    ActiveDays { month, days }
}
