//! Collection implementation.

use crate::collection::codec;
use crate::dataset::Dataset;
use crate::document::{timestamp, Document, DocumentId};
use crate::error::CoreResult;
use crate::query::{Selector, Updater};
use filedb_storage::StorageBackend;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// A named, file-backed array of documents.
///
/// The in-memory array is the source of truth; the storage blob is a
/// snapshot refreshed by [`save`](Self::save), or after every mutation when
/// the backend has autosave enabled.
///
/// # Querying
///
/// Every query is a full linear scan. Reads return owned copies, so results
/// never observe later mutations:
///
/// ```rust
/// use filedb_core::{Collection, InMemoryBackend, Selector};
/// use serde_json::json;
/// use std::sync::Arc;
///
/// let users = Collection::open("users", Arc::new(InMemoryBackend::new())).unwrap();
/// users.insert_one(&json!({ "username": "foo", "age": 30 })).unwrap();
///
/// let adults = users
///     .find_many(Selector::predicate(|u| u.field("age").and_then(|a| a.as_i64()) >= Some(18)))
///     .select(&["username"])
///     .value();
/// assert_eq!(adults, vec![json!({ "username": "foo" })]);
/// ```
///
/// # Consistency
///
/// Mutations hold the collection's write lock from the in-memory change
/// through encoding and the autosave write, so a write never races a later
/// mutation of the same array. Different collections do not block each other.
///
/// Predicates and transforms run with no lock held and may call back into the
/// collection. An update or delete whose matched documents change before it
/// commits is recomputed against the current documents.
pub struct Collection {
    /// Collection name; also the storage blob name.
    name: String,
    /// Shared storage backend.
    backend: Arc<dyn StorageBackend>,
    /// The documents, in insertion order.
    documents: RwLock<Vec<Document>>,
}

impl Collection {
    /// Opens a collection, registering and loading its blob.
    ///
    /// The blob is created if missing, its contents are loaded (blank content
    /// loads as an empty collection), and the loaded array is written straight
    /// back so the blob always holds a valid array afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be registered, read or written, or
    /// if its contents are not a valid document array.
    pub fn open(name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> CoreResult<Self> {
        let name = name.into();

        backend.ensure_exists(&name)?;
        let documents = codec::decode(&backend.read(&name)?)?;
        backend.write(&name, &codec::encode(&documents)?)?;

        debug!(collection = %name, documents = documents.len(), "opened collection");
        Ok(Self {
            name,
            backend,
            documents: RwLock::new(documents),
        })
    }

    /// Returns the collection name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the number of documents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.read().len()
    }

    /// Returns true if the collection holds no documents.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.read().is_empty()
    }

    /// Returns a copy of every document, in insertion order.
    #[must_use]
    pub fn documents(&self) -> Vec<Document> {
        self.documents.read().clone()
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Returns every matching document as a [`Dataset`].
    #[must_use]
    pub fn find_many(&self, selector: impl Into<Selector>) -> Dataset {
        let matched = self.matching(&selector.into(), usize::MAX);
        Dataset::from_documents(&matched)
    }

    /// Returns the first matching document, if any.
    #[must_use]
    pub fn find_one(&self, selector: impl Into<Selector>) -> Option<Document> {
        self.matching(&selector.into(), 1).into_iter().next()
    }

    /// Returns the document with the given id, if any.
    #[must_use]
    pub fn find_by_id(&self, id: &DocumentId) -> Option<Document> {
        self.documents
            .read()
            .iter()
            .find(|d| d.id() == id)
            .cloned()
    }

    // ========================================================================
    // Writes
    // ========================================================================

    /// Inserts one document and returns it as stored.
    ///
    /// The document gets a fresh unique `id` and `createdAt`/`updatedAt` set
    /// to now; any reserved keys in the payload are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `document` does not serialize to a JSON object or
    /// the autosave write fails. A failed autosave leaves the document in
    /// memory.
    pub fn insert_one<T: Serialize + ?Sized>(&self, document: &T) -> CoreResult<Document> {
        let mut inserted = self.insert_many([document])?;
        Ok(inserted.remove(0))
    }

    /// Inserts a batch of documents, preserving their order.
    ///
    /// Every payload is validated before any document is added, so an invalid
    /// payload leaves the collection untouched.
    ///
    /// # Errors
    ///
    /// Returns an error if any payload is not a JSON object or the autosave
    /// write fails.
    pub fn insert_many<I, T>(&self, documents: I) -> CoreResult<Vec<Document>>
    where
        I: IntoIterator<Item = T>,
        T: Serialize,
    {
        let payloads = documents
            .into_iter()
            .map(|d| Document::fields_from(&d))
            .collect::<CoreResult<Vec<_>>>()?;

        let mut documents = self.documents.write();
        let ids = codec::assign_ids(&documents, payloads.len(), DocumentId::generate);
        let now = timestamp::now();

        let start = documents.len();
        documents.extend(
            ids.into_iter()
                .zip(payloads)
                .map(|(id, fields)| Document::create(id, fields, now)),
        );
        let inserted = documents[start..].to_vec();

        trace!(collection = %self.name, count = inserted.len(), "inserted documents");
        self.autosave_locked(&documents)?;
        Ok(inserted)
    }

    /// Updates the first matching document and returns its new state.
    ///
    /// Returns `Ok(None)` without touching storage if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if a patch updater is not a JSON object or the
    /// autosave write fails.
    pub fn update_one(
        &self,
        selector: impl Into<Selector>,
        updater: impl Into<Updater>,
    ) -> CoreResult<Option<Document>> {
        let updater = updater.into();
        updater.validate()?;

        let changes = self.modify(&selector.into(), 1, |d| updater.apply(d).map(Some))?;
        Ok(changes.into_iter().find_map(|c| c.replacement))
    }

    /// Updates every matching document and returns their new states.
    ///
    /// All updates are computed before any is applied.
    ///
    /// # Errors
    ///
    /// Returns an error if a patch updater is not a JSON object or the
    /// autosave write fails.
    pub fn update_many(
        &self,
        selector: impl Into<Selector>,
        updater: impl Into<Updater>,
    ) -> CoreResult<Dataset> {
        let updater = updater.into();
        updater.validate()?;

        let changes = self.modify(&selector.into(), usize::MAX, |d| updater.apply(d).map(Some))?;
        Ok(Dataset::from_documents(
            changes.iter().filter_map(|c| c.replacement.as_ref()),
        ))
    }

    /// Removes the first matching document and returns its id.
    ///
    /// Only that one document is removed, even when others hold identical
    /// values. Returns `Ok(None)` without touching storage if nothing matches.
    ///
    /// # Errors
    ///
    /// Returns an error if the autosave write fails.
    pub fn delete_one(&self, selector: impl Into<Selector>) -> CoreResult<Option<DocumentId>> {
        let changes = self.modify(&selector.into(), 1, |_| Ok(None))?;
        Ok(changes.into_iter().next().map(|c| c.original.id().clone()))
    }

    /// Removes every matching document and returns their ids in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the autosave write fails.
    pub fn delete_many(&self, selector: impl Into<Selector>) -> CoreResult<Vec<DocumentId>> {
        let changes = self.modify(&selector.into(), usize::MAX, |_| Ok(None))?;
        Ok(changes.iter().map(|c| c.original.id().clone()).collect())
    }

    /// Up to `limit` matching documents, in order.
    ///
    /// Patterns are tested under the read lock. Predicates are user code, so
    /// they run over a snapshot with no lock held and may call back into this
    /// collection.
    fn matching(&self, selector: &Selector, limit: usize) -> Vec<Document> {
        match selector {
            Selector::Pattern(_) => self
                .documents
                .read()
                .iter()
                .filter(|d| selector.matches(d))
                .take(limit)
                .cloned()
                .collect(),
            Selector::Predicate(_) => self
                .documents()
                .into_iter()
                .filter(|d| selector.matches(d))
                .take(limit)
                .collect(),
        }
    }

    /// Plans a change per matching document, then commits the plan.
    ///
    /// `plan` returns the replacement for a document, or `None` to remove it.
    /// Selection and planning run without the lock, so user closures may call
    /// back into this collection. The commit holds the write lock through the
    /// autosave write. If a planned document changed or disappeared in between,
    /// the whole plan is rebuilt.
    fn modify<F>(&self, selector: &Selector, limit: usize, mut plan: F) -> CoreResult<Vec<Change>>
    where
        F: FnMut(&Document) -> CoreResult<Option<Document>>,
    {
        loop {
            let changes = self
                .matching(selector, limit)
                .into_iter()
                .map(|original| {
                    let replacement = plan(&original)?;
                    Ok(Change {
                        original,
                        replacement,
                    })
                })
                .collect::<CoreResult<Vec<_>>>()?;

            if changes.is_empty() {
                return Ok(changes);
            }

            let mut documents = self.documents.write();
            let Some(positions) = locate(&documents, &changes) else {
                trace!(collection = %self.name, "documents changed while planning, retrying");
                continue;
            };

            let mut removed = Vec::new();
            for (change, &position) in changes.iter().zip(&positions) {
                match &change.replacement {
                    Some(replacement) => documents[position] = replacement.clone(),
                    None => removed.push(position),
                }
            }
            removed.sort_unstable_by(|a, b| b.cmp(a));
            for position in removed {
                documents.remove(position);
            }

            self.autosave_locked(&documents)?;
            return Ok(changes);
        }
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    /// Writes the whole collection to storage, regardless of autosave.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or the write fails.
    pub fn save(&self) -> CoreResult<()> {
        let documents = self.documents.write();
        self.backend
            .write(&self.name, &codec::encode(&documents)?)?;

        debug!(collection = %self.name, documents = documents.len(), "saved collection");
        Ok(())
    }

    /// Writes the collection if the backend has autosave enabled.
    ///
    /// With autosave disabled this is a successful no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if autosave is enabled and the write fails.
    pub fn autosave(&self) -> CoreResult<()> {
        let documents = self.documents.write();
        self.autosave_locked(&documents)
    }

    /// Autosave with the write lock already held by the caller.
    fn autosave_locked(&self, documents: &[Document]) -> CoreResult<()> {
        // Checked up front so a disabled autosave never pays for encoding.
        if !self.backend.autosave_enabled() {
            trace!(collection = %self.name, "autosave disabled, skipping write");
            return Ok(());
        }

        self.backend
            .autowrite(&self.name, &codec::encode(documents)?)?;
        Ok(())
    }
}

/// One planned change to a document.
struct Change {
    /// The document as it was when the change was planned.
    original: Document,
    /// The new version, or `None` for a removal.
    replacement: Option<Document>,
}

/// Positions of every change's original, or `None` if any of them is no
/// longer present unchanged.
fn locate(documents: &[Document], changes: &[Change]) -> Option<Vec<usize>> {
    let index: HashMap<&DocumentId, usize> = documents
        .iter()
        .enumerate()
        .map(|(position, d)| (d.id(), position))
        .collect();

    changes
        .iter()
        .map(|change| {
            index
                .get(change.original.id())
                .copied()
                .filter(|&position| documents[position] == change.original)
        })
        .collect()
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("name", &self.name)
            .field("documents", &self.len())
            .field("autosave", &self.backend.autosave_enabled())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use filedb_storage::{FileBackend, InMemoryBackend, StorageError};
    use serde_json::{json, Value};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Runs `f` on another thread and fails instead of hanging if it blocks.
    fn within_timeout<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || tx.send(f()));
        rx.recv_timeout(Duration::from_secs(5))
            .expect("operation blocked on the collection lock")
    }

    fn memory(autosave: bool) -> (Arc<InMemoryBackend>, Collection) {
        let backend = Arc::new(InMemoryBackend::with_autosave(autosave));
        let collection = Collection::open("users", backend.clone()).unwrap();
        (backend, collection)
    }

    fn stored(backend: &InMemoryBackend) -> Vec<Value> {
        serde_json::from_slice(&backend.blob("users").unwrap()).unwrap()
    }

    #[test]
    fn open_establishes_blob() {
        let (backend, collection) = memory(false);
        assert!(collection.is_empty());
        assert_eq!(backend.blob("users"), Some(b"[]".to_vec()));
    }

    #[test]
    fn open_rejects_corrupt_blob() {
        let backend = Arc::new(InMemoryBackend::new());
        backend.write("users", b"{not json").unwrap();

        let result = Collection::open("users", backend.clone());
        assert!(matches!(result, Err(CoreError::Json(_))));
        assert_eq!(backend.blob("users"), Some(b"{not json".to_vec()));
    }

    #[test]
    fn insert_and_find() {
        let (_, users) = memory(false);
        let user = users
            .insert_one(&json!({ "username": "foo", "favourites": ["Apple", "Pear"] }))
            .unwrap();

        assert_eq!(users.find_many(Selector::all()).value().len(), 1);

        let found = users.find_one(json!({ "username": "foo" })).unwrap();
        assert_eq!(found, user);
        assert_eq!(found.field("username"), Some(&json!("foo")));
        assert_eq!(found.created_at(), found.updated_at());
    }

    #[test]
    fn find_by_id_round_trips_fields() {
        let (_, users) = memory(false);
        let payload = json!({ "username": "foo", "tags": { "a": [1, 2] } });
        let user = users.insert_one(&payload).unwrap();

        let found = users.find_one(user.id()).unwrap();
        assert_eq!(Value::Object(found.fields().clone()), payload);
        assert_eq!(users.find_by_id(user.id()), Some(found));
    }

    #[test]
    fn find_one_missing_is_none() {
        let (_, users) = memory(false);
        users.insert_one(&json!({ "username": "foo" })).unwrap();
        assert!(users.find_one(json!({ "username": "bar" })).is_none());
    }

    #[test]
    fn insert_ignores_reserved_fields() {
        let (_, users) = memory(false);
        let user = users
            .insert_one(&json!({ "id": "mine", "updatedAt": "never", "username": "foo" }))
            .unwrap();

        assert_ne!(user.id(), "mine");
        assert!(user.field("updatedAt").is_none());
    }

    #[test]
    fn insert_rejects_non_object() {
        let (_, users) = memory(false);
        let result = users.insert_many(vec![json!({ "ok": true }), json!(3)]);

        assert!(matches!(result, Err(CoreError::InvalidDocument { .. })));
        assert!(users.is_empty());
    }

    #[test]
    fn insert_many_preserves_order_and_unique_ids() {
        let (_, users) = memory(false);
        users.insert_one(&json!({ "n": 0 })).unwrap();
        let batch = users
            .insert_many((1..=20).map(|n| json!({ "n": n })))
            .unwrap();

        let ns: Vec<i64> = batch
            .iter()
            .filter_map(|d| d.field("n").and_then(Value::as_i64))
            .collect();
        assert_eq!(ns, (1..=20).collect::<Vec<_>>());

        let ids: HashSet<_> = users.documents().iter().map(|d| d.id().clone()).collect();
        assert_eq!(ids.len(), 21);
    }

    #[test]
    fn insert_typed_struct() {
        #[derive(Serialize)]
        struct User<'a> {
            username: &'a str,
            favourites: Vec<&'a str>,
        }

        let (_, users) = memory(false);
        let user = users
            .insert_one(&User {
                username: "foo",
                favourites: vec!["Apple"],
            })
            .unwrap();
        assert_eq!(user.field("favourites"), Some(&json!(["Apple"])));
    }

    #[test]
    fn autosave_disabled_does_not_write() {
        let (backend, users) = memory(false);
        users.insert_one(&json!({ "username": "foo" })).unwrap();
        users.autosave().unwrap();
        assert!(stored(&backend).is_empty());

        users.save().unwrap();
        assert_eq!(stored(&backend).len(), 1);
    }

    #[test]
    fn autosave_enabled_writes_every_mutation() {
        let (backend, users) = memory(true);

        let user = users.insert_one(&json!({ "username": "foo" })).unwrap();
        assert_eq!(stored(&backend)[0]["username"], json!("foo"));

        users.update_one(user.id(), json!({ "username": "bar" })).unwrap();
        assert_eq!(stored(&backend)[0]["username"], json!("bar"));

        users.delete_one(user.id()).unwrap();
        assert!(stored(&backend).is_empty());
    }

    #[test]
    fn autosave_failure_propagates() {
        let (backend, users) = memory(true);
        backend.deregister_all().unwrap();

        let err = users.insert_one(&json!({ "username": "foo" })).unwrap_err();
        assert!(err.as_storage().is_some_and(StorageError::is_not_found));
    }

    #[test]
    fn update_one_patch() {
        let (_, users) = memory(false);
        let user = users.insert_one(&json!({ "firstName": "fancy", "lastName": "foo" })).unwrap();

        let updated = users
            .update_one(json!({ "firstName": "fancy" }), json!({ "lastName": "bar", "id": "x" }))
            .unwrap()
            .unwrap();

        assert_eq!(updated.id(), user.id());
        assert_eq!(updated.created_at(), user.created_at());
        assert!(updated.updated_at() >= user.updated_at());
        assert_eq!(updated.field("lastName"), Some(&json!("bar")));
        assert_eq!(users.find_by_id(user.id()), Some(updated));
    }

    #[test]
    fn update_one_without_match_is_noop() {
        let (backend, users) = memory(true);
        users.insert_one(&json!({ "username": "foo" })).unwrap();
        let before = backend.blob("users");

        let result = users.update_one(json!({ "username": "bar" }), json!({ "x": 1 })).unwrap();
        assert!(result.is_none());
        assert_eq!(backend.blob("users"), before);
    }

    #[test]
    fn update_rejects_non_object_patch() {
        let (_, users) = memory(false);
        users.insert_one(&json!({ "username": "foo" })).unwrap();

        let result = users.update_many(Selector::all(), json!([1]));
        assert!(matches!(result, Err(CoreError::InvalidDocument { .. })));
    }

    #[test]
    fn update_many_with_null_pattern() {
        let (_, users) = memory(false);
        users
            .insert_many(vec![
                json!({ "firstName": "fancy", "favourites": ["Apple"] }),
                json!({ "firstName": "betty" }),
                json!({ "firstName": "benson", "favourites": null }),
            ])
            .unwrap();

        let mut updated = users
            .update_many(json!({ "favourites": null }), json!({ "favourites": ["Banana"] }))
            .unwrap();
        let names: Vec<Value> = updated.select(&["firstName"]).value();
        assert_eq!(names, vec![json!({ "firstName": "betty" }), json!({ "firstName": "benson" })]);

        let bananas = users.find_many(json!({ "favourites": ["Banana"] }));
        assert_eq!(bananas.len(), 2);
    }

    #[test]
    fn update_transform_is_trusted() {
        let (_, users) = memory(false);
        let user = users.insert_one(&json!({ "count": 1 })).unwrap();

        let updated = users
            .update_one(
                user.id(),
                Updater::transform(|mut d| {
                    let count = d.field("count").and_then(Value::as_i64).unwrap_or(0);
                    d.insert("count", json!(count + 1));
                    d
                }),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.field("count"), Some(&json!(2)));
        assert_eq!(updated.updated_at(), user.updated_at());
    }

    #[test]
    fn numbers_match_by_value_and_store_as_integers() {
        let (backend, users) = memory(false);
        users.insert_one(&json!({ "username": "foo", "score": 2.0 })).unwrap();

        assert!(users.find_one(json!({ "score": 2 })).is_some());
        assert!(users.find_one(json!({ "score": 2.0 })).is_some());
        assert!(users.find_one(json!({ "score": 2.5 })).is_none());

        users.update_many(json!({ "score": 2 }), json!({ "rank": 1.0 })).unwrap();
        users.save().unwrap();

        let text = String::from_utf8(backend.blob("users").unwrap()).unwrap();
        assert!(text.contains(r#""score":2,"rank":1}"#), "{text}");
    }

    #[test]
    fn transform_may_read_the_same_collection() {
        let (_, users) = memory(true);
        let users = Arc::new(users);
        let user = users.insert_one(&json!({ "username": "foo" })).unwrap();

        let inner = Arc::clone(&users);
        let id = user.id().clone();
        let updated = within_timeout(move || {
            let outer = Arc::clone(&inner);
            outer
                .update_one(
                    &id,
                    Updater::transform(move |mut d| {
                        d.insert("siblings", json!(inner.len()));
                        d
                    }),
                )
                .unwrap()
        });

        assert_eq!(updated.unwrap().field("siblings"), Some(&json!(1)));
    }

    #[test]
    fn predicate_may_read_the_same_collection() {
        let (_, users) = memory(false);
        let users = Arc::new(users);
        users
            .insert_many(vec![json!({ "n": 1 }), json!({ "n": 2 })])
            .unwrap();

        let inner = Arc::clone(&users);
        let (found, removed) = within_timeout(move || {
            let outer = Arc::clone(&inner);
            let selector = move || {
                let inner = Arc::clone(&inner);
                Selector::predicate(move |d| {
                    d.field("n").and_then(Value::as_u64) == Some(inner.len() as u64)
                })
            };
            let found = outer.find_many(selector()).len();
            let removed = outer.delete_many(selector()).unwrap();
            (found, removed.len())
        });

        assert_eq!((found, removed), (1, 1));
        assert_eq!(users.find_many(Selector::all()).len(), 1);
    }

    #[test]
    fn transform_writing_its_own_target_is_recomputed() {
        let (_, users) = memory(false);
        let users = Arc::new(users);
        let user = users.insert_one(&json!({ "count": 0 })).unwrap();

        let inner = Arc::clone(&users);
        let id = user.id().clone();
        let first_call = Arc::new(AtomicBool::new(true));
        let updated = within_timeout(move || {
            let outer = Arc::clone(&inner);
            let target = id.clone();
            outer
                .update_one(
                    &id,
                    Updater::transform(move |mut d| {
                        if first_call.swap(false, Ordering::SeqCst) {
                            inner.update_one(&target, json!({ "touched": true })).unwrap();
                        }
                        let count = d.field("count").and_then(Value::as_i64).unwrap_or(0);
                        d.insert("count", json!(count + 1));
                        d
                    }),
                )
                .unwrap()
        })
        .unwrap();

        assert_eq!(updated.field("count"), Some(&json!(1)));
        assert_eq!(updated.field("touched"), Some(&json!(true)));
        assert_eq!(users.find_by_id(user.id()), Some(updated));
    }

    #[test]
    fn delete_one_removes_only_first_of_identical() {
        let (_, users) = memory(false);
        let inserted = users
            .insert_many(vec![json!({ "v": 1 }), json!({ "v": 1 }), json!({ "v": 1 })])
            .unwrap();

        let removed = users.delete_one(json!({ "v": 1 })).unwrap();
        assert_eq!(removed.as_ref(), Some(inserted[0].id()));

        let remaining: Vec<_> = users.documents().iter().map(|d| d.id().clone()).collect();
        assert_eq!(remaining, vec![inserted[1].id().clone(), inserted[2].id().clone()]);
    }

    #[test]
    fn delete_one_without_match_is_none() {
        let (_, users) = memory(false);
        assert!(users.delete_one(Selector::all()).unwrap().is_none());
    }

    #[test]
    fn delete_many() {
        let (_, users) = memory(false);
        let inserted = users
            .insert_many(vec![json!({ "keep": false }), json!({ "keep": true }), json!({ "keep": false })])
            .unwrap();

        let removed = users.delete_many(json!({ "keep": false })).unwrap();
        assert_eq!(removed, vec![inserted[0].id().clone(), inserted[2].id().clone()]);
        assert_eq!(users.len(), 1);

        assert_eq!(users.delete_many(Selector::all()).unwrap().len(), 1);
        assert!(users.is_empty());
    }

    #[test]
    fn save_and_reopen_round_trip() {
        let dir = tempdir().unwrap();
        let backend: Arc<dyn StorageBackend> =
            Arc::new(FileBackend::open(dir.path().join("db"), false).unwrap());

        let users = Collection::open("users", Arc::clone(&backend)).unwrap();
        users
            .insert_many(vec![
                json!({ "username": "foo", "favourites": ["Apple", "Pear"] }),
                json!({ "username": "bar", "score": 1.5 }),
            ])
            .unwrap();
        users.update_one(json!({ "username": "bar" }), json!({ "score": 2 })).unwrap();
        users.save().unwrap();

        let reopened = Collection::open("users", backend).unwrap();
        assert_eq!(reopened.documents(), users.documents());
    }

    #[test]
    fn unsaved_changes_are_not_persisted() {
        let backend: Arc<dyn StorageBackend> = Arc::new(InMemoryBackend::new());
        let users = Collection::open("users", Arc::clone(&backend)).unwrap();
        users.insert_one(&json!({ "username": "foo" })).unwrap();

        let reopened = Collection::open("users", backend).unwrap();
        assert!(reopened.is_empty());
    }
}
