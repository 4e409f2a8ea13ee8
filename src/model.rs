//! Data structures describing the content of an activity report.
//!
//! The types in this module are produced by the data sources (remote JSON
//! exports, local git history) and consumed read-only by the layout engine.
//! They avoid referencing the rendering crates so they can be built and
//! inspected in isolation.

use std::fmt;
use std::path::PathBuf;

use chrono::{Datelike, Local, NaiveDate};

/// "Not missing and not empty", applied explicitly where optional or
/// possibly-empty values decide what gets rendered.
pub trait Present {
    /// Returns `true` when the value carries content.
    fn is_present(&self) -> bool;
}

impl Present for str {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Present for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Present for [T] {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T> Present for Vec<T> {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl<T: Present> Present for Option<T> {
    fn is_present(&self) -> bool {
        self.as_ref().map_or(false, |value| value.is_present())
    }
}

/// Sortable identifier of a work item: a pull request/issue number or a short
/// commit hash.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ItemNumber {
    /// Numeric identifier (pull requests, issues).
    Int(u64),
    /// Short textual identifier (abbreviated commit hashes).
    Short(String),
}

impl fmt::Display for ItemNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(number) => write!(f, "{number}"),
            Self::Short(id) => f.write_str(id),
        }
    }
}

impl From<u64> for ItemNumber {
    fn from(number: u64) -> Self {
        Self::Int(number)
    }
}

impl From<&str> for ItemNumber {
    fn from(id: &str) -> Self {
        Self::Short(id.to_string())
    }
}

impl From<String> for ItemNumber {
    fn from(id: String) -> Self {
        Self::Short(id)
    }
}

/// Ticket-like item: carries a status label and the people assigned to it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket {
    pub number: ItemNumber,
    pub title: String,
    pub link: String,
    pub state: String,
    pub assignees: Vec<String>,
}

/// Change-like item (pull request or commit): carries raw RFC 3339
/// timestamps. A missing `closed_at` means the change is still open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    pub number: ItemNumber,
    pub title: String,
    pub link: String,
    pub created_at: String,
    pub closed_at: Option<String>,
}

/// A single entry rendered in one of the report columns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorkItem {
    Ticket(Ticket),
    Change(Change),
}

impl WorkItem {
    /// Creates a ticket-like item without assignees.
    pub fn ticket(
        number: impl Into<ItemNumber>,
        title: impl Into<String>,
        link: impl Into<String>,
        state: impl Into<String>,
    ) -> Self {
        Self::Ticket(Ticket {
            number: number.into(),
            title: title.into(),
            link: link.into(),
            state: state.into(),
            assignees: Vec::new(),
        })
    }

    /// Creates a change-like item that is still open.
    pub fn change(
        number: impl Into<ItemNumber>,
        title: impl Into<String>,
        link: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self::Change(Change {
            number: number.into(),
            title: title.into(),
            link: link.into(),
            created_at: created_at.into(),
            closed_at: None,
        })
    }

    /// Sets the assignees of a ticket; no-op for changes.
    pub fn with_assignees<I, S>(mut self, assignees: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Self::Ticket(ticket) = &mut self {
            ticket.assignees = assignees.into_iter().map(Into::into).collect();
        }
        self
    }

    /// Sets the closing timestamp of a change; no-op for tickets.
    pub fn with_closed_at(mut self, closed_at: impl Into<Option<String>>) -> Self {
        if let Self::Change(change) = &mut self {
            change.closed_at = closed_at.into();
        }
        self
    }

    pub fn number(&self) -> &ItemNumber {
        match self {
            Self::Ticket(ticket) => &ticket.number,
            Self::Change(change) => &change.number,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Ticket(ticket) => &ticket.title,
            Self::Change(change) => &change.title,
        }
    }

    /// Returns the link target: a URL, or a short identifier when no web
    /// location is known.
    pub fn link(&self) -> &str {
        match self {
            Self::Ticket(ticket) => &ticket.link,
            Self::Change(change) => &change.link,
        }
    }

    /// Number of metadata lines rendered below the title line.
    pub fn metadata_line_count(&self) -> usize {
        match self {
            Self::Ticket(ticket) if ticket.assignees.is_present() => 2,
            Self::Ticket(_) => 1,
            Self::Change(change) if change.closed_at.is_present() => 3,
            Self::Change(_) => 1,
        }
    }
}

/// A labelled group of items laid out as one column.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Section {
    title: String,
    items: Vec<WorkItem>,
}

impl Section {
    /// Creates an empty section with the provided title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Appends an item and returns the updated section.
    pub fn with_item(mut self, item: WorkItem) -> Self {
        self.items.push(item);
        self
    }

    /// Extends the section with additional items and returns the updated instance.
    pub fn with_items<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = WorkItem>,
    {
        self.items.extend(items);
        self
    }

    /// Returns the items ordered by ascending number; equal numbers keep
    /// their input order.
    pub fn sorted_items(&self) -> Vec<&WorkItem> {
        let mut items: Vec<&WorkItem> = self.items.iter().collect();
        items.sort_by(|a, b| a.number().cmp(b.number()));
        items
    }
}

/// Where the report data came from; selects header wording and one metadata
/// label.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    /// Items fetched from a hosted code-review/issue tracker.
    #[default]
    Remote,
    /// Commits read from local repositories.
    Local,
}

/// Calendar month a report covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetMonth {
    year: i32,
    month: u32,
}

impl TargetMonth {
    /// Returns `None` when `month` is outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Self { year, month })
    }

    /// The month preceding the one containing `today`.
    pub fn previous(today: NaiveDate) -> Self {
        if today.month() == 1 {
            Self {
                year: today.year() - 1,
                month: 12,
            }
        } else {
            Self {
                year: today.year(),
                month: today.month() - 1,
            }
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// First day of the following month (exclusive upper bound).
    pub fn next_first_day(&self) -> NaiveDate {
        let (year, month) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MAX)
    }

    pub fn last_day(&self) -> NaiveDate {
        self.next_first_day().pred_opt().unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every calendar date of the month in chronological order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = *self;
        self.first_day()
            .iter_days()
            .take_while(move |date| month.contains(*date))
    }

    /// English month name, e.g. `June`.
    pub fn name(&self) -> String {
        self.first_day().format("%B").to_string()
    }
}

/// Everything needed to generate one report.
#[derive(Clone, Debug)]
pub struct ReportRequest {
    month: TargetMonth,
    contributor: String,
    subject: String,
    sections: [Section; 2],
    work_days: Vec<NaiveDate>,
    days_off: Vec<NaiveDate>,
    font_path: Option<PathBuf>,
    output_dir: PathBuf,
    mode: Mode,
    title: Option<String>,
    generated_on: NaiveDate,
}

impl ReportRequest {
    /// Creates a request with empty sections, the current directory as output
    /// directory and today as generation date.
    pub fn new(
        month: TargetMonth,
        subject: impl Into<String>,
        contributor: impl Into<String>,
        mode: Mode,
    ) -> Self {
        Self {
            month,
            contributor: contributor.into(),
            subject: subject.into(),
            sections: [Section::default(), Section::default()],
            work_days: Vec::new(),
            days_off: Vec::new(),
            font_path: None,
            output_dir: PathBuf::from("."),
            mode,
            title: None,
            generated_on: Local::now().date_naive(),
        }
    }

    pub fn with_sections(mut self, first: Section, second: Section) -> Self {
        self.sections = [first, second];
        self
    }

    /// Explicit list of worked days; when non-empty it replaces the weekday rule.
    pub fn with_work_days(mut self, days: impl Into<Vec<NaiveDate>>) -> Self {
        self.work_days = days.into();
        self
    }

    /// Days removed from the weekday rule.
    pub fn with_days_off(mut self, days: impl Into<Vec<NaiveDate>>) -> Self {
        self.days_off = days.into();
        self
    }

    pub fn with_font_path(mut self, path: impl Into<Option<PathBuf>>) -> Self {
        self.font_path = path.into();
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Replaces the generated header title.
    pub fn with_title(mut self, title: impl Into<Option<String>>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = date;
        self
    }

    pub fn month(&self) -> TargetMonth {
        self.month
    }

    pub fn contributor(&self) -> &str {
        &self.contributor
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn sections(&self) -> &[Section; 2] {
        &self.sections
    }

    pub fn work_days(&self) -> &[NaiveDate] {
        &self.work_days
    }

    pub fn days_off(&self) -> &[NaiveDate] {
        &self.days_off
    }

    pub fn font_path(&self) -> Option<&PathBuf> {
        self.font_path.as_ref()
    }

    pub fn output_dir(&self) -> &PathBuf {
        &self.output_dir
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn generated_on(&self) -> NaiveDate {
        self.generated_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn presence_follows_content() {
        assert!(!Option::<String>::None.is_present());
        assert!(!Some(String::new()).is_present());
        assert!(Some("2025-06-05T15:00:00Z".to_string()).is_present());
        assert!(!Vec::<String>::new().is_present());
    }

    #[test]
    fn numbers_sort_numerically_before_short_ids() {
        let mut numbers = vec![
            ItemNumber::from("abc1234"),
            ItemNumber::Int(10),
            ItemNumber::Int(9),
        ];
        numbers.sort();
        assert_eq!(
            numbers,
            vec![
                ItemNumber::Int(9),
                ItemNumber::Int(10),
                ItemNumber::from("abc1234")
            ]
        );
    }

    #[test]
    fn metadata_line_count_depends_on_variant() {
        let bare = WorkItem::ticket(1u64, "t", "l", "open");
        let assigned = bare.clone().with_assignees(["ana"]);
        let open = WorkItem::change(2u64, "c", "l", "2025-06-01T10:00:00Z");
        let closed = open
            .clone()
            .with_closed_at(Some("2025-06-05T15:00:00Z".to_string()));

        assert_eq!(bare.metadata_line_count(), 1);
        assert_eq!(assigned.metadata_line_count(), 2);
        assert_eq!(open.metadata_line_count(), 1);
        assert_eq!(closed.metadata_line_count(), 3);
    }

    #[test]
    fn target_month_bounds() {
        let feb = TargetMonth::new(2024, 2).unwrap();
        assert_eq!(feb.last_day(), date(2024, 2, 29));
        assert_eq!(feb.days().count(), 29);

        let dec = TargetMonth::new(2025, 12).unwrap();
        assert_eq!(dec.next_first_day(), date(2026, 1, 1));
        assert_eq!(dec.name(), "December");

        assert!(TargetMonth::new(2025, 13).is_none());
        assert!(TargetMonth::new(2025, 0).is_none());
    }

    #[test]
    fn previous_month_wraps_year() {
        assert_eq!(
            TargetMonth::previous(date(2026, 1, 15)),
            TargetMonth::new(2025, 12).unwrap()
        );
        assert_eq!(
            TargetMonth::previous(date(2026, 7, 1)),
            TargetMonth::new(2026, 6).unwrap()
        );
    }

    #[test]
    fn sorted_items_orders_by_number() {
        let section = Section::new("s").with_items([
            WorkItem::ticket(3u64, "c", "l", "open"),
            WorkItem::ticket(1u64, "a", "l", "open"),
            WorkItem::ticket(2u64, "b", "l", "open"),
        ]);
        let titles: Vec<_> = section.sorted_items().iter().map(|i| i.title()).collect();
        assert_eq!(titles, ["a", "b", "c"]);
    }
}
