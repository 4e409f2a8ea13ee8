//! Work item sources feeding the report sections.
//!
//! Fetching happens before layout: local mode reads commits through a
//! [`CommitSource`], remote mode reads a JSON document of pull requests and
//! issues prepared by an external fetcher.

mod git;
mod remote;

pub use git::{commit_url, parse_log_line, GitCli, LogEntry};
pub use remote::{load_remote_sections, parse_remote_sections, RemoteFilter};

use log::debug;

use crate::error::RekapError;
use crate::model::{Section, TargetMonth, WorkItem};

/// Number of hash characters used as a commit's item number.
pub const SHORT_HASH_LEN: usize = 7;

/// Repository whose commit history feeds a local-mode report.
pub trait CommitSource {
    /// Display name of the repository, used in section titles.
    fn repository_name(&self) -> String;

    /// Commits by `author` dated within `month`, as change-like items.
    fn list_commits(&self, author: &str, month: TargetMonth) -> Result<Vec<WorkItem>, RekapError>;

    /// Web link of a commit, or its short hash when the repository has no
    /// known web location.
    fn resolve_commit_url(&self, hash: &str) -> String;

    /// Human name recorded for `author`; the local part of the address when
    /// no commit carries one.
    fn author_name(&self, author: &str) -> String {
        fallback_author_name(author)
    }
}

pub(crate) fn fallback_author_name(author: &str) -> String {
    author.split('@').next().unwrap_or(author).to_string()
}

pub(crate) fn short_hash(hash: &str) -> String {
    hash.chars().take(SHORT_HASH_LEN).collect()
}

fn commits_title(repository: &str, suffix: &str, count: usize) -> String {
    format!("> {} commits{} ({})", repository, suffix, count)
}

/// Builds the two sections of a local-mode report.
///
/// With a second repository each repository gets its own section.  With a
/// single repository its commits are split in two halves, the first half
/// taking the extra commit, so that both columns carry content; the split
/// follows the order the source returned and carries no meaning.
pub fn local_sections<S: CommitSource + ?Sized>(
    author: &str,
    month: TargetMonth,
    primary: &S,
    secondary: Option<&S>,
) -> Result<[Section; 2], RekapError> {
    let name = primary.repository_name();
    let commits = primary.list_commits(author, month)?;
    debug!("{}: {} commit(s) by {}", name, commits.len(), author);

    if let Some(secondary) = secondary {
        let other_name = secondary.repository_name();
        let other = secondary.list_commits(author, month)?;
        debug!("{}: {} commit(s) by {}", other_name, other.len(), author);
        return Ok([
            Section::new(commits_title(&name, "", commits.len())).with_items(commits),
            Section::new(commits_title(&other_name, "", other.len())).with_items(other),
        ]);
    }

    let mut left = commits;
    let right = left.split_off((left.len() + 1) / 2);
    Ok([
        Section::new(commits_title(&name, "", left.len())).with_items(left),
        Section::new(commits_title(&name, " continued", right.len())).with_items(right),
    ])
}
