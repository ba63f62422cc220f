//! Deciding whether an interpretation triggers a custom command.

use advocate_types::command::{CommandSet, CustomCommand};
use tracing::debug;

use crate::flows::InterpretationResult;

/// Interpretations at or below this confidence never trigger a command.
pub const CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Resolve the custom command an interpretation points at.
///
/// Requires an action other than `"unknown"` and confidence strictly above
/// [`CONFIDENCE_THRESHOLD`]. The command's phrase must then equal, ignoring
/// case and surrounding whitespace, either the raw utterance or the
/// reported `matchedPhrase`. Commands are scanned in registration order
/// and the first one matching either string wins.
pub fn resolve_custom_command<'a>(
    result: &InterpretationResult,
    utterance: &str,
    commands: &'a CommandSet,
) -> Option<&'a CustomCommand> {
    if result.action == "unknown" || result.confidence <= CONFIDENCE_THRESHOLD {
        return None;
    }

    let candidates: Vec<&str> = [Some(utterance), result.matched_phrase()]
        .into_iter()
        .flatten()
        .filter(|c| !c.trim().is_empty())
        .collect();
    let found = commands
        .iter()
        .find(|command| candidates.iter().any(|c| command.matches(c)))?;

    let sharing = commands.phrase_count(&found.phrase);
    if sharing > 1 {
        debug!(
            phrase = %found.phrase,
            count = sharing,
            chosen = %found.id,
            "several custom commands share this phrase; using the first registered"
        );
    }
    Some(found)
}
