//! Once-per-stack retry with failure isolation.
//!
//! Every stack gets one attempt. Stacks that failed are logged, then retried
//! exactly once, in their original order. A second failure aborts with
//! [`SyncError::RetryExhausted`]; stacks that succeeded the first time are
//! never touched again.

use dashpub_core::{Stack, StackSlug};

use crate::error::SyncError;
use crate::reconciler::StackReport;

/// Final state of one stack after at most two attempts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackOutcome {
    pub slug: StackSlug,
    pub attempts: u32,
    pub report: StackReport,
}

impl StackOutcome {
    pub fn retried(&self) -> bool {
        self.attempts > 1
    }
}

/// Run `attempt` for every stack, retrying failures once.
///
/// Outcomes are returned in the order of `stacks`.
pub fn run_with_retry<F>(stacks: &[Stack], mut attempt: F) -> Result<Vec<StackOutcome>, SyncError>
where
    F: FnMut(&Stack) -> Result<StackReport, SyncError>,
{
    let mut outcomes: Vec<Option<StackOutcome>> = Vec::with_capacity(stacks.len());
    let mut failed: Vec<(usize, SyncError)> = Vec::new();

    for (index, stack) in stacks.iter().enumerate() {
        match attempt(stack) {
            Ok(report) => outcomes.push(Some(StackOutcome {
                slug: stack.slug.clone(),
                attempts: 1,
                report,
            })),
            Err(err) => {
                outcomes.push(None);
                failed.push((index, err));
            }
        }
    }

    if failed.is_empty() {
        return Ok(outcomes.into_iter().flatten().collect());
    }

    tracing::warn!(count = failed.len(), "number of failed stacks: {}", failed.len());
    for (index, err) in &failed {
        tracing::error!(stack = %stacks[*index].slug, error = %err, "stack sync failed");
    }
    tracing::info!("retrying...");

    for (index, _) in failed {
        let stack = &stacks[index];
        let report = attempt(stack).map_err(|source| SyncError::RetryExhausted {
            stack: stack.slug.clone(),
            source: Box::new(source),
        })?;
        tracing::info!(stack = %stack.slug, "retry succeeded");
        outcomes[index] = Some(StackOutcome {
            slug: stack.slug.clone(),
            attempts: 2,
            report,
        });
    }

    Ok(outcomes.into_iter().flatten().collect())
}
