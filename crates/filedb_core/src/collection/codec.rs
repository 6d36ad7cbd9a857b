//! JSON array codec for collection blobs.

use crate::document::{Document, DocumentId};
use crate::error::{CoreError, CoreResult};
use std::collections::HashSet;
use tracing::trace;

/// Encodes the document array exactly as it is written to storage.
///
/// The output is compact, with no trailing newline.
pub(crate) fn encode(documents: &[Document]) -> CoreResult<Vec<u8>> {
    Ok(serde_json::to_vec(documents)?)
}

/// Decodes a stored blob. Blank content decodes as an empty collection.
///
/// # Errors
///
/// Returns an error if the blob is not a JSON array of documents, or if two
/// documents share an id.
pub(crate) fn decode(bytes: &[u8]) -> CoreResult<Vec<Document>> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    let mut documents: Vec<Document> = serde_json::from_slice(bytes)?;
    documents.iter_mut().for_each(Document::normalize);

    let mut seen = HashSet::with_capacity(documents.len());
    for document in &documents {
        if document.id().is_empty() {
            return Err(CoreError::invalid_document("document with empty id"));
        }
        if !seen.insert(document.id()) {
            return Err(CoreError::invalid_document(format!(
                "duplicate id {}",
                document.id()
            )));
        }
    }

    Ok(documents)
}

/// Draws `count` ids from `generate`, none of which collide with `existing`
/// or with each other. Empty ids are treated as collisions.
pub(crate) fn assign_ids<F>(existing: &[Document], count: usize, mut generate: F) -> Vec<DocumentId>
where
    F: FnMut() -> DocumentId,
{
    let mut taken: HashSet<DocumentId> = existing.iter().map(|d| d.id().clone()).collect();
    let mut ids = Vec::with_capacity(count);

    while ids.len() < count {
        let id = generate();
        if id.is_empty() || taken.contains(&id) {
            trace!(id = %id, "id collision, regenerating");
            continue;
        }
        taken.insert(id.clone());
        ids.push(id);
    }

    ids
}
