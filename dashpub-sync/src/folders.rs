//! Destination folder resolution.

use dashpub_client::StackSession;
use dashpub_core::Folder;

use crate::error::SyncError;

/// Ensure `root/.../name` exists on the stack and return the leaf folder.
///
/// Each segment is fetched-or-created inside the previous one, so running
/// this twice yields the same folder.
pub fn resolve_folder<S: StackSession + ?Sized>(
    session: &S,
    root: &[String],
    name: &str,
) -> Result<Folder, SyncError> {
    let mut parent: Option<Folder> = None;
    for segment in root {
        parent = Some(ensure(session, parent.as_ref(), segment)?);
    }
    ensure(session, parent.as_ref(), name)
}

fn ensure<S: StackSession + ?Sized>(
    session: &S,
    parent: Option<&Folder>,
    name: &str,
) -> Result<Folder, SyncError> {
    let folder = session
        .ensure_folder(parent, name)
        .map_err(|source| SyncError::Folder {
            folder: name.to_string(),
            source,
        })?;
    tracing::debug!(folder = %folder.title, uid = %folder.uid, "folder ready");
    Ok(folder)
}
