//! Stack selection: which stacks receive shared and custom dashboards.

use dashpub_core::{ExclusionSet, Stack, Stacks};

use crate::error::SyncError;

/// Run mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishMode {
    /// Shared dashboards go to every non-excluded stack, custom dashboards to
    /// the configured custom stack.
    AllStacks,
    /// Everything goes to the configured test stack only.
    TestStack,
}

impl PublishMode {
    pub fn from_all_flag(all: bool) -> Self {
        if all {
            PublishMode::AllStacks
        } else {
            PublishMode::TestStack
        }
    }
}

/// Target stacks for one binding class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Targets {
    Stacks(Vec<Stack>),
    /// The configured stack name matched no candidate stack.
    Unresolved(String),
}

impl Targets {
    /// The stacks, or [`SyncError::UnknownStack`] for an unresolved name.
    pub fn stacks(&self) -> Result<&[Stack], SyncError> {
        match self {
            Targets::Stacks(stacks) => Ok(stacks.as_slice()),
            Targets::Unresolved(name) => Err(SyncError::UnknownStack { name: name.clone() }),
        }
    }

    pub fn contains(&self, stack: &Stack) -> bool {
        matches!(self, Targets::Stacks(stacks) if stacks.iter().any(|s| s.slug == stack.slug))
    }
}

/// Disjoint working sets for the two binding classes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetSets {
    pub shared: Targets,
    pub custom: Targets,
}

/// Drop every stack whose slug is excluded.
pub fn filter_excluded(stacks: Stacks, exclusions: &ExclusionSet) -> Stacks {
    stacks
        .into_iter()
        .filter(|stack| {
            let excluded = exclusions.contains(&stack.slug);
            if excluded {
                tracing::info!(stack = %stack.slug, "is excluded, skipping");
            } else {
                tracing::info!(stack = %stack.slug, "is not excluded, adding it to the candidates");
            }
            !excluded
        })
        .collect()
}

/// The single candidate whose slug equals `name`.
pub fn stack_by_slug(stacks: &[Stack], name: &str) -> Targets {
    match stacks.iter().find(|s| s.slug.as_str() == name) {
        Some(stack) => Targets::Stacks(vec![stack.clone()]),
        None => Targets::Unresolved(name.to_string()),
    }
}

/// Split the enumerated stacks into shared and custom targets for `mode`.
pub fn select(
    stacks: Stacks,
    exclusions: &ExclusionSet,
    mode: PublishMode,
    test_stack: &str,
    custom_stack: &str,
) -> TargetSets {
    let candidates = filter_excluded(stacks, exclusions);
    match mode {
        PublishMode::AllStacks => {
            tracing::info!("syncing all stacks");
            let custom = stack_by_slug(&candidates, custom_stack);
            TargetSets {
                shared: Targets::Stacks(candidates),
                custom,
            }
        }
        PublishMode::TestStack => {
            tracing::info!("syncing only {test_stack} stack");
            let test = stack_by_slug(&candidates, test_stack);
            TargetSets {
                shared: test.clone(),
                custom: test,
            }
        }
    }
}
