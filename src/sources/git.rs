//! Commit history read through the `git` command line.

use std::cell::OnceCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;

use log::{debug, warn};
use regex::Regex;

use super::{fallback_author_name, short_hash, CommitSource};
use crate::error::RekapError;
use crate::model::{Present, TargetMonth, WorkItem};

const LOG_FORMAT: &str = "--format=%H|%s|%aI";
const GITHUB_REMOTE: &str = r"github\.com[/:](.+?)(\.git)?$";

static GITHUB_REMOTE_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn github_remote_pattern() -> Option<&'static Regex> {
    GITHUB_REMOTE_PATTERN
        .get_or_init(|| Regex::new(GITHUB_REMOTE).ok())
        .as_ref()
}

/// One line of `git log --format=%H|%s|%aI`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub hash: String,
    pub subject: String,
    pub authored_at: String,
}

/// Splits a log line into hash, subject and author date.  The subject may
/// itself contain `|`.
pub fn parse_log_line(line: &str) -> Option<LogEntry> {
    let line = line.trim();
    let (hash, rest) = line.split_once('|')?;
    let (subject, authored_at) = rest.rsplit_once('|')?;
    if !hash.is_present() || !authored_at.is_present() {
        return None;
    }
    Some(LogEntry {
        hash: hash.to_string(),
        subject: subject.to_string(),
        authored_at: authored_at.to_string(),
    })
}

/// Web link of `hash` when `remote` is a GitHub remote (HTTPS or SSH form),
/// otherwise the short hash.
pub fn commit_url(remote: Option<&str>, hash: &str) -> String {
    let path = remote.and_then(|remote| {
        let captures = github_remote_pattern()?.captures(remote.trim())?;
        captures.get(1).map(|path| path.as_str().to_string())
    });

    match path {
        Some(path) => format!("https://github.com/{}/commit/{}", path, hash),
        None => short_hash(hash),
    }
}

/// A local repository queried by running `git -C <path> ...`.
pub struct GitCli {
    path: PathBuf,
    remote: OnceCell<Option<String>>,
}

impl GitCli {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            remote: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(&self, args: &[&str]) -> Result<String, RekapError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.path)
            .args(args)
            .output()
            .map_err(|err| {
                RekapError::source_failure(format!("spawning git {:?}: {}", args, err))
            })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RekapError::source_failure(format!(
                "git {:?} failed in {}: {}",
                args,
                self.path.display(),
                stderr.trim()
            )))
        }
    }

    fn remote_url(&self) -> Option<&str> {
        self.remote
            .get_or_init(|| match self.run(&["config", "--get", "remote.origin.url"]) {
                Ok(url) if url.trim().is_present() => Some(url.trim().to_string()),
                Ok(_) => None,
                Err(err) => {
                    debug!("no origin remote: {}", err);
                    None
                }
            })
            .as_deref()
    }
}

impl CommitSource for GitCli {
    fn repository_name(&self) -> String {
        let resolved = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        resolved
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| resolved.display().to_string())
    }

    fn list_commits(&self, author: &str, month: TargetMonth) -> Result<Vec<WorkItem>, RekapError> {
        let author_arg = format!("--author={}", author);
        let since = format!("--since={}T00:00:00", month.first_day());
        let until = format!("--until={}T00:00:00", month.next_first_day());
        let stdout = self.run(&["log", &author_arg, &since, &until, LOG_FORMAT])?;

        let mut items = Vec::new();
        for line in stdout.lines().filter(|line| line.trim().is_present()) {
            let Some(entry) = parse_log_line(line) else {
                warn!("skipping unreadable git log line: {}", line);
                continue;
            };
            let link = self.resolve_commit_url(&entry.hash);
            items.push(WorkItem::change(
                short_hash(&entry.hash),
                entry.subject,
                link,
                entry.authored_at,
            ));
        }
        Ok(items)
    }

    fn resolve_commit_url(&self, hash: &str) -> String {
        commit_url(self.remote_url(), hash)
    }

    fn author_name(&self, author: &str) -> String {
        let author_arg = format!("--author={}", author);
        match self.run(&["log", &author_arg, "-1", "--format=%an"]) {
            Ok(name) if name.trim().is_present() => name.trim().to_string(),
            _ => fallback_author_name(author),
        }
    }
}
