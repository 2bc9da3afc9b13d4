//! Interpretation of human-readable `git status` output.
//!
//! The git server only returns prose, so files are classified by matching
//! line patterns. Callers only see [`RepositoryStatus`]; the parsing strategy
//! is picked with [`StatusParser`].

use std::sync::LazyLock;

use clap::ValueEnum;
use regex_lite::Regex;
use serde::{Deserialize, Serialize};

/// Branch reported when no "On branch" line can be found.
pub const DEFAULT_BRANCH: &str = "main";

const STAGED_HEADER: &str = "Changes to be committed:";
const UNSTAGED_HEADER: &str = "Changes not staged for commit:";
const UNTRACKED_HEADER: &str = "Untracked files:";
const UNMERGED_HEADER: &str = "Unmerged paths:";

static STAGED_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(new file|modified|deleted):\s+(.+)$").expect("staged pattern is valid")
});

static MODIFIED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+modified:\s+(.+)$").expect("modified pattern is valid"));

static INDENTED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s+(.+)$").expect("indented pattern is valid"));

static ENTRY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(new file|modified|deleted|renamed|typechange|both modified):\s+(.+)$")
        .expect("entry pattern is valid")
});

static BRANCH_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"On branch (.+)").expect("branch pattern is valid"));

/// Branch name and the three file-change categories of a working tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryStatus {
    pub branch: String,
    pub staged: Vec<String>,
    pub unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

impl Default for RepositoryStatus {
    fn default() -> Self {
        Self {
            branch: DEFAULT_BRANCH.to_string(),
            staged: Vec::new(),
            unstaged: Vec::new(),
            untracked: Vec::new(),
        }
    }
}

impl RepositoryStatus {
    /// Whether there is nothing staged, unstaged, or untracked.
    pub fn is_clean(&self) -> bool {
        self.staged.is_empty() && self.unstaged.is_empty() && self.untracked.is_empty()
    }
}

/// Strategy used to turn status prose into a [`RepositoryStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum StatusParser {
    /// Line patterns only. Every `modified:` line is reported as staged,
    /// so the unstaged list stays empty.
    Legacy,
    /// Tracks the section headers so entries under "Changes not staged for
    /// commit" are reported as unstaged.
    #[default]
    Sectioned,
}

impl StatusParser {
    /// Parse status text, taking the branch from `log_text` first and
    /// falling back to the status text itself.
    pub fn parse(self, status_text: &str, log_text: &str) -> RepositoryStatus {
        let mut status = match self {
            StatusParser::Legacy => parse_status(status_text),
            StatusParser::Sectioned => parse_status_sectioned(status_text),
        };
        status.branch = extract_branch(&[log_text, status_text]);
        status
    }
}

/// Classify the lines of `git status` output using the legacy line rules.
///
/// Never fails: unrecognized input yields empty lists and the default branch.
pub fn parse_status(raw: &str) -> RepositoryStatus {
    let mut status = RepositoryStatus {
        branch: extract_branch(&[raw]),
        ..Default::default()
    };

    for line in raw.lines() {
        if line.trim().is_empty() || is_section_header(line) {
            continue;
        }

        if let Some(caps) = STAGED_LINE.captures(line) {
            status.staged.push(caps[2].trim().to_string());
        } else if let Some(caps) = MODIFIED_LINE.captures(line) {
            // Unreachable in practice: STAGED_LINE already matches every
            // `modified:` line. Kept so Legacy stays output-compatible.
            let path = caps[1].trim().to_string();
            if !status.staged.contains(&path) {
                status.unstaged.push(path);
            }
        } else if let Some(path) = untracked_path(line) {
            status.untracked.push(path);
        }
    }

    status
}

/// Classify `git status` output by section.
///
/// Entries before any header, or under "Changes to be committed", are staged;
/// entries under "Changes not staged for commit" or "Unmerged paths" are
/// unstaged. Bare paths are untracked, and entry lines inside the untracked
/// section are skipped. Renames record the destination path.
pub fn parse_status_sectioned(raw: &str) -> RepositoryStatus {
    #[derive(Clone, Copy, PartialEq)]
    enum Section {
        Staged,
        Unstaged,
        Unmerged,
        Untracked,
    }

    let mut status = RepositoryStatus {
        branch: extract_branch(&[raw]),
        ..Default::default()
    };
    let mut section = Section::Staged;

    for line in raw.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if line.contains(STAGED_HEADER) {
            section = Section::Staged;
            continue;
        }
        if line.contains(UNSTAGED_HEADER) {
            section = Section::Unstaged;
            continue;
        }
        if line.contains(UNMERGED_HEADER) {
            section = Section::Unmerged;
            continue;
        }
        if line.contains(UNTRACKED_HEADER) {
            section = Section::Untracked;
            continue;
        }

        if let Some(caps) = ENTRY_LINE.captures(line) {
            let path = entry_path(&caps[1], caps[2].trim());
            match section {
                Section::Staged => status.staged.push(path),
                Section::Unstaged | Section::Unmerged => status.unstaged.push(path),
                Section::Untracked => {}
            }
        } else if let Some(path) = untracked_path(line) {
            status.untracked.push(path);
        }
    }

    status
}

/// Find the first "On branch <name>" across `sources`, in order.
pub fn extract_branch(sources: &[&str]) -> String {
    sources
        .iter()
        .find_map(|text| BRANCH_LINE.captures(text))
        .map(|caps| caps[1].trim().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_BRANCH.to_string())
}

fn is_section_header(line: &str) -> bool {
    line.contains(STAGED_HEADER) || line.contains(UNSTAGED_HEADER) || line.contains(UNTRACKED_HEADER)
}

/// An indented line without a colon that is not a `(use "git ...")` hint.
fn untracked_path(line: &str) -> Option<String> {
    if line.contains(':') || !INDENTED_LINE.is_match(line) {
        return None;
    }
    let path = line.trim();
    if path.is_empty() || path.starts_with('(') {
        return None;
    }
    Some(path.to_string())
}

fn entry_path(kind: &str, raw_path: &str) -> String {
    if kind == "renamed"
        && let Some((_, to)) = raw_path.split_once(" -> ")
    {
        return to.trim().to_string();
    }
    raw_path.to_string()
}
