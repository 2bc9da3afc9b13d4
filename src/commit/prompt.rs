//! Prompt construction for drafted commit messages.

/// Diff budget, in characters, embedded in the prompt.
pub const MAX_DIFF_CHARS: usize = 3000;

/// Appended after the diff when it was cut to [`MAX_DIFF_CHARS`].
pub const TRUNCATION_MARKER: &str = "\n... (truncated)";

/// Instruction sent ahead of every prompt.
pub const SYSTEM_PROMPT: &str = r#"You are an expert at writing clear, concise git commit messages following best practices.

Guidelines:
- Use conventional commits format: type(scope): description
- Types: feat, fix, docs, style, refactor, test, chore
- Keep the first line under 72 characters
- Use imperative mood ("add" not "added")
- Be specific about what changed and why
- If there are breaking changes, mention them

Analyze the git diff and file changes to generate a meaningful commit message."#;

/// Build the user prompt from the changed-file listing and the diff.
pub fn build_commit_prompt(diff: &str, files: &str) -> String {
    let (diff, truncated) = truncate_diff(diff);
    let marker = if truncated { TRUNCATION_MARKER } else { "" };

    format!(
        "Generate a commit message for these changes:\n\n\
         Files changed:\n{files}\n\n\
         Diff:\n{diff}{marker}\n\n\
         Provide only the commit message, no explanations."
    )
}

/// Cut `diff` to at most [`MAX_DIFF_CHARS`] characters.
///
/// Counts `char`s, so multibyte text is never split mid-character.
pub fn truncate_diff(diff: &str) -> (&str, bool) {
    match diff.char_indices().nth(MAX_DIFF_CHARS) {
        Some((end, _)) => (&diff[..end], true),
        None => (diff, false),
    }
}
