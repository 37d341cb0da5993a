//! Loading medication drafts from a JSON file.
//!
//! The file holds a JSON array of drafts in the same shape the `add`
//! command builds. Files are only ever read.

use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::medication::{MedicationDraft, MedicationId};
use crate::registry::MedicationRegistry;

/// Read and parse a draft file without registering anything.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a JSON array of drafts.
pub fn load_drafts(path: impl AsRef<Path>) -> Result<Vec<MedicationDraft>> {
    let path = path.as_ref();
    debug!("Reading medication drafts from {}", path.display());

    let contents = std::fs::read_to_string(path)?;
    let drafts: Vec<MedicationDraft> = serde_json::from_str(&contents)?;
    Ok(drafts)
}

/// Register every draft in `path` into `registry`.
///
/// Either all drafts are registered or none are: work happens on a copy that
/// replaces `registry` only once every draft has been accepted.
///
/// # Errors
///
/// Returns [`Error::Import`] naming the first rejected draft, or the read or
/// parse error from [`load_drafts`].
pub fn import_drafts(
    registry: &mut MedicationRegistry,
    path: impl AsRef<Path>,
) -> Result<Vec<MedicationId>> {
    let path = path.as_ref();
    let drafts = load_drafts(path)?;

    let mut staged = registry.clone();
    let mut ids = Vec::with_capacity(drafts.len());
    for (index, draft) in drafts.into_iter().enumerate() {
        let id = staged.register(draft).map_err(|source| Error::Import {
            path: path.to_path_buf(),
            index,
            source: Box::new(source),
        })?;
        ids.push(id);
    }

    *registry = staged;
    info!(count = ids.len(), "Imported medications from {}", path.display());
    Ok(ids)
}
