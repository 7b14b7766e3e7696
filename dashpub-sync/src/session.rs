//! Scoped stack sessions.

use std::ops::Deref;

use dashpub_client::{CloudApi, StackSession};
use dashpub_core::{Stack, StackSlug};

use crate::error::SyncError;

/// Owns a [`StackSession`] and releases it on every exit path.
///
/// Cleanup failures are logged, never propagated: they must not mask the
/// outcome of the work done with the session.
pub struct SessionGuard {
    slug: StackSlug,
    session: Box<dyn StackSession>,
}

impl SessionGuard {
    pub fn open<C: CloudApi + ?Sized>(cloud: &C, stack: &Stack) -> Result<Self, SyncError> {
        let session = cloud
            .open_session(stack)
            .map_err(|source| SyncError::Session {
                stack: stack.slug.clone(),
                source,
            })?;
        Ok(Self {
            slug: stack.slug.clone(),
            session,
        })
    }
}

impl Deref for SessionGuard {
    type Target = dyn StackSession;

    fn deref(&self) -> &Self::Target {
        self.session.as_ref()
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Err(err) = self.session.cleanup() {
            tracing::warn!(stack = %self.slug, error = %err, "session cleanup failed");
        }
    }
}
