//! Commit message drafting from a diff and changed-file listing.

pub mod message;
pub mod prompt;

pub use message::draft_commit_message;
pub use prompt::{MAX_DIFF_CHARS, SYSTEM_PROMPT, TRUNCATION_MARKER, build_commit_prompt};
