//! In-process git backend using git2-rs.
//!
//! Answers the same named tools as the MCP git server with git-compatible
//! text, and additionally provides a structured status straight from the
//! index so no prose needs to be parsed.

use std::path::Path;

use async_trait::async_trait;
use git2::{Diff, DiffFormat, ErrorCode, Repository, Sort, Status, StatusOptions, Tree};
use serde_json::Value;
use tracing::debug;

use crate::error::GitError;
use crate::git::session::{Connector, ToolArguments, ToolSession};
use crate::git::status::RepositoryStatus;

/// Opens the repository in-process; no subprocess is spawned.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalConnector;

#[async_trait]
impl Connector for LocalConnector {
    async fn connect(&self, repo: &Path) -> Result<Box<dyn ToolSession>, GitError> {
        let repository = Repository::open(repo).map_err(GitError::OpenRepository)?;
        Ok(Box::new(LocalSession {
            repo: Some(repository),
        }))
    }
}

struct LocalSession {
    repo: Option<Repository>,
}

impl LocalSession {
    fn repo(&self) -> Result<&Repository, GitError> {
        self.repo.as_ref().ok_or(GitError::SessionClosed)
    }
}

#[async_trait]
impl ToolSession for LocalSession {
    async fn call_tool(
        &mut self,
        tool: &str,
        arguments: ToolArguments,
    ) -> Result<String, GitError> {
        let repo = self.repo()?;
        debug!("Local git tool {tool}");

        match tool {
            "git_status" => render_status(repo),
            "git_log" => {
                let max_count = arguments
                    .get("max_count")
                    .and_then(Value::as_u64)
                    .unwrap_or(10) as usize;
                render_log(repo, max_count)
            }
            "git_diff_staged" => {
                let head = head_tree(repo)?;
                let diff = repo
                    .diff_tree_to_index(head.as_ref(), None, None)
                    .map_err(GitError::Local)?;
                patch_text(&diff)
            }
            "git_diff_unstaged" => {
                let diff = repo
                    .diff_index_to_workdir(None, None)
                    .map_err(GitError::Local)?;
                patch_text(&diff)
            }
            "git_commit" => {
                let message = arguments
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or_default();
                if message.trim().is_empty() {
                    return Err(GitError::EmptyMessage);
                }
                let oid = commit_index(repo, message)?;
                Ok(format!("Changes committed successfully with hash {oid}"))
            }
            other => Err(GitError::UnknownTool(other.to_string())),
        }
    }

    async fn structured_status(&mut self) -> Result<Option<RepositoryStatus>, GitError> {
        let repo = self.repo()?;
        let entries = collect_entries(repo)?;

        let mut status = RepositoryStatus {
            branch: branch_name(repo)?.unwrap_or_else(|| RepositoryStatus::default().branch),
            ..Default::default()
        };
        for entry in entries {
            if entry.staged.is_some() {
                status.staged.push(entry.path.clone());
            }
            if entry.unstaged.is_some() {
                status.unstaged.push(entry.path.clone());
            }
            if entry.untracked {
                status.untracked.push(entry.path);
            }
        }
        Ok(Some(status))
    }

    async fn close(&mut self) -> Result<(), GitError> {
        self.repo.take();
        Ok(())
    }
}

/// One path from `git status`, with its index and worktree change kinds.
struct StatusEntry {
    path: String,
    staged: Option<&'static str>,
    unstaged: Option<&'static str>,
    untracked: bool,
}

fn collect_entries(repo: &Repository) -> Result<Vec<StatusEntry>, GitError> {
    let mut opts = StatusOptions::new();
    opts.include_untracked(true)
        .recurse_untracked_dirs(true)
        .include_ignored(false);

    let statuses = repo.statuses(Some(&mut opts)).map_err(GitError::Local)?;

    let entries = statuses
        .iter()
        .filter_map(|entry| {
            let path = entry.path()?.to_string();
            let flags = entry.status();
            Some(StatusEntry {
                path,
                staged: index_kind(flags),
                unstaged: worktree_kind(flags),
                untracked: flags.contains(Status::WT_NEW),
            })
        })
        .collect();

    Ok(entries)
}

fn index_kind(flags: Status) -> Option<&'static str> {
    if flags.contains(Status::INDEX_NEW) {
        Some("new file")
    } else if flags.contains(Status::INDEX_MODIFIED) {
        Some("modified")
    } else if flags.contains(Status::INDEX_DELETED) {
        Some("deleted")
    } else if flags.contains(Status::INDEX_RENAMED) {
        Some("renamed")
    } else if flags.contains(Status::INDEX_TYPECHANGE) {
        Some("typechange")
    } else {
        None
    }
}

fn worktree_kind(flags: Status) -> Option<&'static str> {
    if flags.contains(Status::WT_MODIFIED) {
        Some("modified")
    } else if flags.contains(Status::WT_DELETED) {
        Some("deleted")
    } else if flags.contains(Status::WT_RENAMED) {
        Some("renamed")
    } else if flags.contains(Status::WT_TYPECHANGE) {
        Some("typechange")
    } else {
        None
    }
}

/// Current branch name, `None` for a detached HEAD.
///
/// Works on unborn branches by reading the symbolic HEAD target.
fn branch_name(repo: &Repository) -> Result<Option<String>, GitError> {
    match repo.head() {
        Ok(head) if head.is_branch() => Ok(head.shorthand().map(str::to_string)),
        Ok(_) => Ok(None),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            let head = repo.find_reference("HEAD").map_err(GitError::Local)?;
            Ok(head
                .symbolic_target()
                .map(|target| target.trim_start_matches("refs/heads/").to_string()))
        }
        Err(e) => Err(GitError::Local(e)),
    }
}

/// Resolve the HEAD tree; `None` for a repository without commits.
fn head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    match repo.head() {
        Ok(head) => head.peel_to_tree().map(Some).map_err(GitError::Local),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            Ok(None)
        }
        Err(e) => Err(GitError::Local(e)),
    }
}

/// Render status prose in the layout `git status` prints.
fn render_status(repo: &Repository) -> Result<String, GitError> {
    let entries = collect_entries(repo)?;
    let mut out = String::from("Repository status:\n");

    match branch_name(repo)? {
        Some(branch) => out.push_str(&format!("On branch {branch}\n")),
        None => out.push_str("HEAD detached\n"),
    }

    let staged: Vec<_> = entries
        .iter()
        .filter_map(|e| e.staged.map(|kind| (kind, e.path.as_str())))
        .collect();
    let unstaged: Vec<_> = entries
        .iter()
        .filter_map(|e| e.unstaged.map(|kind| (kind, e.path.as_str())))
        .collect();
    let untracked: Vec<_> = entries
        .iter()
        .filter(|e| e.untracked)
        .map(|e| e.path.as_str())
        .collect();

    if !staged.is_empty() {
        out.push_str("Changes to be committed:\n");
        out.push_str("  (use \"git restore --staged <file>...\" to unstage)\n");
        for (kind, path) in &staged {
            out.push_str(&format!("\t{:<12}{path}\n", format!("{kind}:")));
        }
        out.push('\n');
    }

    if !unstaged.is_empty() {
        out.push_str("Changes not staged for commit:\n");
        out.push_str("  (use \"git add <file>...\" to update what will be committed)\n");
        for (kind, path) in &unstaged {
            out.push_str(&format!("\t{:<12}{path}\n", format!("{kind}:")));
        }
        out.push('\n');
    }

    if !untracked.is_empty() {
        out.push_str("Untracked files:\n");
        out.push_str("  (use \"git add <file>...\" to include in what will be committed)\n");
        for path in &untracked {
            out.push_str(&format!("\t{path}\n"));
        }
        out.push('\n');
    }

    if entries.is_empty() {
        out.push_str("nothing to commit, working tree clean\n");
    }

    Ok(out)
}

/// Render the most recent commits, newest first.
fn render_log(repo: &Repository, max_count: usize) -> Result<String, GitError> {
    let mut out = String::from("Commit history:\n");

    if head_tree(repo)?.is_none() {
        return Ok(out);
    }

    let mut revwalk = repo.revwalk().map_err(GitError::Local)?;
    revwalk.set_sorting(Sort::TIME).map_err(GitError::Local)?;
    revwalk.push_head().map_err(GitError::Local)?;

    for oid in revwalk.take(max_count) {
        let oid = oid.map_err(GitError::Local)?;
        let commit = repo.find_commit(oid).map_err(GitError::Local)?;
        let author = commit.author();
        out.push_str(&format!("Commit: {oid}\n"));
        out.push_str(&format!(
            "Author: {} <{}>\n",
            author.name().unwrap_or(""),
            author.email().unwrap_or("")
        ));
        out.push_str(&format!("Date: {}\n", commit.time().seconds()));
        out.push_str(&format!("Message: {}\n", commit.message().unwrap_or("").trim_end()));
        out.push('\n');
    }

    Ok(out)
}

/// Unified patch text for a diff.
fn patch_text(diff: &Diff<'_>) -> Result<String, GitError> {
    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        let origin = line.origin();
        if origin == '+' || origin == '-' || origin == ' ' {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::Local)?;
    Ok(text)
}

/// Commit whatever is in the index on top of HEAD.
fn commit_index(repo: &Repository, message: &str) -> Result<git2::Oid, GitError> {
    let mut index = repo.index().map_err(GitError::Local)?;
    let tree_id = index.write_tree().map_err(GitError::Local)?;
    let tree = repo.find_tree(tree_id).map_err(GitError::Local)?;

    let parent = match repo.head() {
        Ok(head) => Some(head.peel_to_commit().map_err(GitError::Local)?),
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => None,
        Err(e) => return Err(GitError::Local(e)),
    };

    let unchanged = match &parent {
        Some(parent) => parent.tree_id() == tree_id,
        None => tree.len() == 0,
    };
    if unchanged {
        return Err(GitError::NothingToCommit);
    }

    let sig = repo.signature().map_err(GitError::Signature)?;
    let parents: Vec<&git2::Commit> = parent.iter().collect();

    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
        .map_err(GitError::Local)
}
