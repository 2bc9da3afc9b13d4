//! Commit message drafting.

use tracing::{debug, info};

use crate::commit::prompt::{SYSTEM_PROMPT, build_commit_prompt};
use crate::llm::router::{LlmError, LlmRouter};

/// Draft a commit message for `diff` and the changed-file listing `files`.
///
/// Returns the first non-empty message from the configured providers.
pub async fn draft_commit_message(
    router: &LlmRouter,
    diff: &str,
    files: &str,
) -> Result<String, LlmError> {
    let prompt = build_commit_prompt(diff, files);
    debug!(
        "Drafting commit message ({} diff chars, {} prompt chars)",
        diff.chars().count(),
        prompt.chars().count()
    );

    let completion = router.generate(SYSTEM_PROMPT, &prompt).await?;
    info!("Commit message drafted by {}", completion.provider);

    Ok(completion.output)
}
