//! Pull requests and issues read from a pre-fetched JSON document.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::error::RekapError;
use crate::format::date_only;
use crate::model::{Section, TargetMonth, WorkItem};

#[derive(Debug, Deserialize)]
struct RemoteItems {
    #[serde(default)]
    pull_requests: Vec<PullRequestRecord>,
    #[serde(default)]
    issues: Vec<IssueRecord>,
}

#[derive(Debug, Deserialize)]
struct PullRequestRecord {
    number: u64,
    title: String,
    html_url: String,
    created_at: String,
    #[serde(default)]
    closed_at: Option<String>,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    merged_by: Option<UserRef>,
    #[serde(default)]
    reviews: Vec<ReviewRecord>,
}

#[derive(Debug, Deserialize)]
struct ReviewRecord {
    #[serde(default)]
    user: Option<UserRef>,
}

#[derive(Debug, Deserialize)]
struct IssueRecord {
    number: u64,
    title: String,
    html_url: String,
    state: String,
    created_at: String,
    #[serde(default)]
    user: Option<UserRef>,
    #[serde(default)]
    assignees: Vec<UserRef>,
}

/// Either a bare login or a GitHub user object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum UserRef {
    Login(String),
    User { login: String },
}

impl UserRef {
    fn login(&self) -> &str {
        match self {
            Self::Login(login) | Self::User { login } => login,
        }
    }

    fn into_login(self) -> String {
        match self {
            Self::Login(login) | Self::User { login } => login,
        }
    }
}

/// Keeps the records created in `month` that involve `login`.
///
/// A pull request involves the user when they opened, merged or reviewed it;
/// an issue when they opened it or are assigned to it.  Logins compare
/// case-insensitively.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteFilter {
    month: TargetMonth,
    login: String,
}

impl RemoteFilter {
    pub fn new(month: TargetMonth, login: impl Into<String>) -> Self {
        Self {
            month,
            login: login.into(),
        }
    }

    fn is_user(&self, user: Option<&UserRef>) -> bool {
        user.is_some_and(|user| user.login().eq_ignore_ascii_case(&self.login))
    }

    fn created_in_month(&self, created_at: &str) -> Result<bool, RekapError> {
        Ok(self.month.contains(date_only(created_at)?))
    }

    fn keeps_pull_request(&self, record: &PullRequestRecord) -> Result<bool, RekapError> {
        let involved = self.is_user(record.user.as_ref())
            || self.is_user(record.merged_by.as_ref())
            || record
                .reviews
                .iter()
                .any(|review| self.is_user(review.user.as_ref()));
        Ok(involved && self.created_in_month(&record.created_at)?)
    }

    fn keeps_issue(&self, record: &IssueRecord) -> Result<bool, RekapError> {
        let involved = self.is_user(record.user.as_ref())
            || record.assignees.iter().any(|assignee| self.is_user(Some(assignee)));
        Ok(involved && self.created_in_month(&record.created_at)?)
    }
}

impl From<PullRequestRecord> for WorkItem {
    fn from(record: PullRequestRecord) -> Self {
        WorkItem::change(record.number, record.title, record.html_url, record.created_at)
            .with_closed_at(record.closed_at)
    }
}

impl From<IssueRecord> for WorkItem {
    fn from(record: IssueRecord) -> Self {
        WorkItem::ticket(record.number, record.title, record.html_url, record.state)
            .with_assignees(record.assignees.into_iter().map(UserRef::into_login))
    }
}

fn retain<T>(
    records: Vec<T>,
    mut keep: impl FnMut(&T) -> Result<bool, RekapError>,
) -> Result<Vec<T>, RekapError> {
    let mut kept = Vec::with_capacity(records.len());
    for record in records {
        if keep(&record)? {
            kept.push(record);
        }
    }
    Ok(kept)
}

/// Parses `{"pull_requests": [...], "issues": [...]}` into the pull request
/// section and the ticket section, in that order, keeping only the records
/// accepted by `filter`.
pub fn parse_remote_sections(
    json: &str,
    filter: &RemoteFilter,
) -> Result<[Section; 2], RekapError> {
    let items: RemoteItems = serde_json::from_str(json)
        .map_err(|err| RekapError::source_failure(format!("invalid remote items: {}", err)))?;
    let (pull_total, issue_total) = (items.pull_requests.len(), items.issues.len());

    let pulls = retain(items.pull_requests, |record| filter.keeps_pull_request(record))?;
    let issues = retain(items.issues, |record| filter.keeps_issue(record))?;
    debug!(
        "remote items for {}: {}/{} pull request(s), {}/{} issue(s)",
        filter.login,
        pulls.len(),
        pull_total,
        issues.len(),
        issue_total
    );

    let pulls: Vec<WorkItem> = pulls.into_iter().map(WorkItem::from).collect();
    let issues: Vec<WorkItem> = issues.into_iter().map(WorkItem::from).collect();

    Ok([
        Section::new(format!("> pull requests opened ({})", pulls.len())).with_items(pulls),
        Section::new(format!("> tickets processed ({})", issues.len())).with_items(issues),
    ])
}

/// Reads and parses the JSON document at `path`.
pub fn load_remote_sections(
    path: impl AsRef<Path>,
    filter: &RemoteFilter,
) -> Result<[Section; 2], RekapError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|err| {
        RekapError::source_failure(format!("reading {}: {}", path.display(), err))
    })?;
    parse_remote_sections(&json, filter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemNumber;

    const DOCUMENT: &str = r#"{
        "pull_requests": [
            {
                "number": 12,
                "title": "Add histogram",
                "html_url": "https://github.com/o/r/pull/12",
                "created_at": "2026-06-01T10:00:00Z",
                "closed_at": "2026-06-05T15:00:00Z",
                "user": {"login": "JDoe"}
            },
            {
                "number": 14,
                "title": "Draft",
                "html_url": "https://github.com/o/r/pull/14",
                "created_at": "2026-06-08T10:00:00Z",
                "user": "someone",
                "reviews": [{"user": {"login": "jdoe"}}]
            },
            {
                "number": 15,
                "title": "Merged for someone else",
                "html_url": "https://github.com/o/r/pull/15",
                "created_at": "2026-06-09T10:00:00Z",
                "user": "someone",
                "merged_by": {"login": "jdoe"}
            },
            {
                "number": 11,
                "title": "Last month",
                "html_url": "https://github.com/o/r/pull/11",
                "created_at": "2026-05-03T10:00:00Z",
                "user": "jdoe"
            },
            {
                "number": 16,
                "title": "Not mine",
                "html_url": "https://github.com/o/r/pull/16",
                "created_at": "2026-06-10T10:00:00Z",
                "user": "someone",
                "reviews": [{"user": {"login": "other"}}, {}]
            }
        ],
        "issues": [
            {
                "number": 7,
                "title": "Crash on empty month",
                "html_url": "https://github.com/o/r/issues/7",
                "state": "closed",
                "created_at": "2026-06-02T08:00:00Z",
                "user": "reporter",
                "assignees": ["jdoe", {"login": "asmith", "id": 3}]
            },
            {
                "number": 8,
                "title": "Unassigned",
                "html_url": "https://github.com/o/r/issues/8",
                "state": "open",
                "created_at": "2026-06-03T08:00:00Z",
                "user": "reporter"
            }
        ]
    }"#;

    fn june_for(login: &str) -> RemoteFilter {
        RemoteFilter::new(TargetMonth::new(2026, 6).unwrap(), login)
    }

    #[test]
    fn document_maps_to_pull_request_and_ticket_sections() {
        let [pulls, tickets] = parse_remote_sections(DOCUMENT, &june_for("jdoe")).unwrap();
        assert_eq!(pulls.title(), "> pull requests opened (3)");
        assert_eq!(tickets.title(), "> tickets processed (1)");

        assert_eq!(pulls.items()[0].metadata_line_count(), 3);
        assert_eq!(pulls.items()[1].metadata_line_count(), 1);

        match &tickets.items()[0] {
            WorkItem::Ticket(ticket) => {
                assert_eq!(ticket.number, ItemNumber::Int(7));
                assert_eq!(ticket.assignees, ["jdoe", "asmith"]);
            }
            other => panic!("expected ticket, got {:?}", other),
        }
    }

    #[test]
    fn records_outside_the_month_are_dropped() {
        let [pulls, _] = parse_remote_sections(DOCUMENT, &june_for("jdoe")).unwrap();
        let numbers: Vec<_> = pulls.items().iter().map(|item| item.number().clone()).collect();
        assert!(!numbers.contains(&ItemNumber::Int(11)));

        let may = RemoteFilter::new(TargetMonth::new(2026, 5).unwrap(), "jdoe");
        let [pulls, tickets] = parse_remote_sections(DOCUMENT, &may).unwrap();
        assert_eq!(pulls.title(), "> pull requests opened (1)");
        assert_eq!(pulls.items()[0].number(), &ItemNumber::Int(11));
        assert!(tickets.is_empty());
    }

    #[test]
    fn records_without_involvement_are_dropped() {
        let [pulls, tickets] = parse_remote_sections(DOCUMENT, &june_for("jdoe")).unwrap();
        let numbers: Vec<_> = pulls.items().iter().map(|item| item.number().clone()).collect();
        assert_eq!(
            numbers,
            [ItemNumber::Int(12), ItemNumber::Int(14), ItemNumber::Int(15)]
        );
        assert!(tickets
            .items()
            .iter()
            .all(|item| item.number() != &ItemNumber::Int(8)));

        let [pulls, tickets] = parse_remote_sections(DOCUMENT, &june_for("reporter")).unwrap();
        assert!(pulls.is_empty());
        assert_eq!(tickets.title(), "> tickets processed (2)");
    }

    #[test]
    fn missing_lists_are_empty_sections() {
        let [pulls, tickets] = parse_remote_sections("{}", &june_for("jdoe")).unwrap();
        assert!(pulls.is_empty());
        assert_eq!(tickets.title(), "> tickets processed (0)");
    }

    #[test]
    fn malformed_creation_date_is_a_timestamp_error() {
        let json = r#"{"issues": [{"number": 1, "title": "t", "html_url": "u",
            "state": "open", "created_at": "last week", "user": "jdoe"}]}"#;
        let err = parse_remote_sections(json, &june_for("jdoe")).unwrap_err();
        assert!(matches!(err, RekapError::Timestamp { .. }));
    }

    #[test]
    fn malformed_document_is_a_source_error() {
        let err =
            parse_remote_sections(r#"{"issues": [{"number": "x"}]}"#, &june_for("jdoe")).unwrap_err();
        assert!(matches!(err, RekapError::Source(_)));
    }

    #[test]
    fn missing_file_is_a_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_remote_sections(dir.path().join("items.json"), &june_for("jdoe")).unwrap_err();
        assert!(matches!(err, RekapError::Source(_)));
    }
}
