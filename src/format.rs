//! Text formatting of work items.
//!
//! Formatting is a pure function of the item, the report [`Mode`] and the
//! column the item lands in; the layout engine only decides where the lines go.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::RekapError;
use crate::model::{Change, Mode, Present, Ticket, WorkItem};

/// Titles longer than this many characters are shortened.
pub const MAX_TITLE_LENGTH: usize = 46;
const ELLIPSIS: &str = "...";

/// Column an item is rendered in; the link separator differs per side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnSide {
    #[default]
    Left,
    Right,
}

impl ColumnSide {
    fn separator(self) -> &'static str {
        match self {
            Self::Left => " - ",
            Self::Right => " ",
        }
    }
}

/// Rendered text of one item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormattedItem {
    /// `#<number><separator><title>`.
    pub link_text: String,
    /// Target of the title link.
    pub link_target: String,
    pub metadata: Vec<String>,
}

/// Collapses every run of whitespace into a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalises whitespace, then shortens titles above [`MAX_TITLE_LENGTH`]
/// characters so that the result including `...` is exactly that long.
pub fn truncate_title(title: &str) -> String {
    let normalized = normalize_whitespace(title);
    if normalized.chars().count() <= MAX_TITLE_LENGTH {
        return normalized;
    }

    let keep = MAX_TITLE_LENGTH - ELLIPSIS.len();
    let mut truncated: String = normalized.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>, RekapError> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|err| RekapError::timestamp(value, err))
}

/// Calendar date of an RFC 3339 timestamp, in the timestamp's own offset.
pub fn date_only(value: &str) -> Result<NaiveDate, RekapError> {
    parse_timestamp(value).map(|timestamp| timestamp.date_naive())
}

/// Whole days between two timestamps, truncated toward zero.
pub fn days_open(created_at: &str, closed_at: &str) -> Result<i64, RekapError> {
    let created = parse_timestamp(created_at)?;
    let closed = parse_timestamp(closed_at)?;
    Ok((closed - created).num_days())
}

fn ticket_metadata(ticket: &Ticket) -> Vec<String> {
    let mut lines = vec![format!("state: {}", ticket.state)];
    if ticket.assignees.is_present() {
        lines.push(format!("assignees: {}", ticket.assignees.join(", ")));
    }
    lines
}

fn change_metadata(change: &Change, mode: Mode) -> Result<Vec<String>, RekapError> {
    let label = match mode {
        Mode::Remote => "date of opening",
        Mode::Local => "commit date",
    };
    let mut lines = vec![format!("{}: {}", label, date_only(&change.created_at)?)];

    if let Some(closed_at) = change.closed_at.as_deref().filter(|value| value.is_present()) {
        lines.push(format!("date of closing: {}", date_only(closed_at)?));
        lines.push(format!(
            "time stayed open: {} days",
            days_open(&change.created_at, closed_at)?
        ));
    }

    Ok(lines)
}

/// Formats `item` for the given mode and column.
pub fn format_item(
    item: &WorkItem,
    mode: Mode,
    side: ColumnSide,
) -> Result<FormattedItem, RekapError> {
    let metadata = match item {
        WorkItem::Ticket(ticket) => ticket_metadata(ticket),
        WorkItem::Change(change) => change_metadata(change, mode)?,
    };

    Ok(FormattedItem {
        link_text: format!(
            "#{}{}{}",
            item.number(),
            side.separator(),
            truncate_title(item.title())
        ),
        link_target: item.link().to_string(),
        metadata,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_at_limit_passes_through() {
        let title = "a".repeat(MAX_TITLE_LENGTH);
        assert_eq!(truncate_title(&title), title);
    }

    #[test]
    fn long_title_is_cut_with_ellipsis() {
        let title = "b".repeat(50);
        let truncated = truncate_title(&title);
        assert_eq!(truncated.chars().count(), MAX_TITLE_LENGTH);
        assert_eq!(truncated, format!("{}...", "b".repeat(43)));
    }

    #[test]
    fn whitespace_collapses_before_measuring() {
        // 46 visible characters once the double spaces and newline collapse.
        let title = format!("{}  {}\n{}", "x".repeat(20), "y".repeat(12), "z".repeat(12));
        let truncated = truncate_title(&title);
        assert_eq!(truncated.chars().count(), MAX_TITLE_LENGTH);
        assert!(!truncated.ends_with(ELLIPSIS));
        assert_eq!(normalize_whitespace("  fix \t the\n\nbug "), "fix the bug");
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let title = "é".repeat(47);
        let truncated = truncate_title(&title);
        assert_eq!(truncated.chars().count(), MAX_TITLE_LENGTH);
    }

    #[test]
    fn ticket_metadata_lists_assignees_when_present() {
        let item = WorkItem::ticket(2u64, "Broken build", "https://x/issues/2", "open")
            .with_assignees(["user1", "user2"]);
        let formatted = format_item(&item, Mode::Remote, ColumnSide::Left).unwrap();
        assert_eq!(formatted.link_text, "#2 - Broken build");
        assert_eq!(formatted.link_target, "https://x/issues/2");
        assert_eq!(formatted.metadata, ["state: open", "assignees: user1, user2"]);

        let bare = WorkItem::ticket(2u64, "Broken build", "l", "closed");
        let formatted = format_item(&bare, Mode::Remote, ColumnSide::Right).unwrap();
        assert_eq!(formatted.link_text, "#2 Broken build");
        assert_eq!(formatted.metadata, ["state: closed"]);
    }

    #[test]
    fn closed_change_reports_truncated_duration() {
        let item = WorkItem::change(1u64, "Test PR", "l", "2025-06-01T10:00:00Z")
            .with_closed_at(Some("2025-06-05T15:00:00Z".to_string()));
        let formatted = format_item(&item, Mode::Remote, ColumnSide::Left).unwrap();
        assert_eq!(
            formatted.metadata,
            [
                "date of opening: 2025-06-01",
                "date of closing: 2025-06-05",
                "time stayed open: 4 days"
            ]
        );
    }

    #[test]
    fn local_mode_labels_commit_date() {
        let item = WorkItem::change("abc1234", "Initial commit", "abc1234", "2025-06-15T10:00:00+02:00");
        let formatted = format_item(&item, Mode::Local, ColumnSide::Left).unwrap();
        assert_eq!(formatted.link_text, "#abc1234 - Initial commit");
        assert_eq!(formatted.metadata, ["commit date: 2025-06-15"]);
    }

    #[test]
    fn empty_closing_timestamp_counts_as_open() {
        let item = WorkItem::change(1u64, "PR", "l", "2025-06-01T10:00:00Z")
            .with_closed_at(Some(String::new()));
        let formatted = format_item(&item, Mode::Remote, ColumnSide::Left).unwrap();
        assert_eq!(formatted.metadata.len(), 1);
    }

    #[test]
    fn malformed_timestamp_is_an_error() {
        let item = WorkItem::change(1u64, "PR", "l", "yesterday");
        let err = format_item(&item, Mode::Remote, ColumnSide::Left).unwrap_err();
        assert!(matches!(err, RekapError::Timestamp { ref value, .. } if value == "yesterday"));
    }

    #[test]
    fn negative_durations_truncate_toward_zero() {
        assert_eq!(
            days_open("2025-06-05T15:00:00Z", "2025-06-01T16:00:00Z").unwrap(),
            -3
        );
    }
}
