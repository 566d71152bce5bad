//! In-process `DocumentStore` adapter.
//!
//! Collections are ordered maps keyed by [`DocumentId`], so range scans are
//! plain `BTreeMap` ranges. Each call takes the store lock once, which makes
//! every single-document write atomic; nothing spans calls. Inserts mint
//! their identifier while holding the write lock, so documents become visible
//! in identifier order. Unique fields are checked under the same lock.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};
use serde_json::{Map, Value};
use tracing::debug;

use crate::domain::DocumentId;
use crate::domain::ports::{DeleteAck, DocumentStore, DocumentStoreError, Filter, ID_FIELD, Query};

use super::id_minter::IdMinter;

type Collections = HashMap<String, BTreeMap<DocumentId, Value>>;

/// Document store kept entirely in memory.
///
/// # Examples
/// ```
/// use blog_backend::domain::ports::{DocumentStore, Query};
/// use blog_backend::outbound::memory::InMemoryDocumentStore;
/// use serde_json::{Map, json};
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = InMemoryDocumentStore::default();
/// let mut doc = Map::new();
/// doc.insert("title".into(), json!("Rust"));
/// let stored = store.insert("articles", doc, &[]).await.unwrap();
/// assert!(stored.get("_id").is_some());
/// assert_eq!(store.find("articles", &Query::default()).await.unwrap().len(), 1);
/// # }
/// ```
pub struct InMemoryDocumentStore {
    collections: RwLock<Collections>,
    ids: IdMinter,
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryDocumentStore {
    /// Empty store minting identifiers from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
            ids: IdMinter::new(clock),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>, DocumentStoreError> {
        self.collections
            .read()
            .map_err(|_| DocumentStoreError::connection("in-memory store lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>, DocumentStoreError> {
        self.collections
            .write()
            .map_err(|_| DocumentStoreError::connection("in-memory store lock poisoned"))
    }
}

fn lower_bound(after: Option<DocumentId>) -> Bound<DocumentId> {
    after.map_or(Bound::Unbounded, Bound::Excluded)
}

/// First `unique` field whose value in `candidate` is already held by a
/// document other than `own_id`.
fn duplicated_field(
    documents: &BTreeMap<DocumentId, Value>,
    candidate: &Map<String, Value>,
    unique: &[&'static str],
    own_id: Option<DocumentId>,
) -> Option<&'static str> {
    unique.iter().copied().find(|field| {
        candidate.get(*field).is_some_and(|value| {
            documents
                .iter()
                .filter(|(id, _)| Some(**id) != own_id)
                .any(|(_, document)| document.get(*field) == Some(value))
        })
    })
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn find_one(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<Value>, DocumentStoreError> {
        let collections = self.read()?;
        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(&id))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<Value>, DocumentStoreError> {
        let collections = self.read()?;
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        let matching = documents
            .range((lower_bound(query.after), Bound::Unbounded))
            .map(|(_, document)| document)
            .filter(|document| query.filter.matches(document))
            .cloned();
        Ok(match query.limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    async fn insert(
        &self,
        collection: &str,
        mut document: Map<String, Value>,
        unique: &[&'static str],
    ) -> Result<Value, DocumentStoreError> {
        let mut collections = self.write()?;
        let documents = collections.entry(collection.to_owned()).or_default();
        if let Some(field) = duplicated_field(documents, &document, unique, None) {
            return Err(DocumentStoreError::conflict(collection, field));
        }

        let id = self
            .ids
            .mint()
            .ok_or_else(|| DocumentStoreError::connection("identifier sequence lock poisoned"))?;
        let encoded_id = serde_json::to_value(id)
            .map_err(|err| DocumentStoreError::serialization(err.to_string()))?;
        document.insert(ID_FIELD.to_owned(), encoded_id);
        let stored = Value::Object(document);
        documents.insert(id, stored.clone());
        debug!(collection, %id, "document inserted");
        Ok(stored)
    }

    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        mut set: Map<String, Value>,
        unique: &[&'static str],
    ) -> Result<Option<Value>, DocumentStoreError> {
        set.remove(ID_FIELD);
        let mut collections = self.write()?;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };
        if !documents.contains_key(&id) {
            return Ok(None);
        }
        if let Some(field) = duplicated_field(documents, &set, unique, Some(id)) {
            return Err(DocumentStoreError::conflict(collection, field));
        }
        let Some(Value::Object(existing)) = documents.get_mut(&id) else {
            return Ok(None);
        };
        existing.extend(set);
        Ok(Some(Value::Object(existing.clone())))
    }

    async fn delete(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<DeleteAck, DocumentStoreError> {
        let removed = self
            .write()?
            .get_mut(collection)
            .and_then(|documents| documents.remove(&id))
            .is_some();
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: u64::from(removed),
        })
    }

    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteAck, DocumentStoreError> {
        let mut collections = self.write()?;
        let Some(documents) = collections.get_mut(collection) else {
            return Ok(DeleteAck {
                acknowledged: true,
                deleted_count: 0,
            });
        };
        let before = documents.len();
        documents.retain(|_, document| !filter.matches(document));
        let deleted_count = u64::try_from(before - documents.len())
            .map_err(|err| DocumentStoreError::query(err.to_string()))?;
        debug!(collection, deleted_count, "documents deleted by filter");
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }
}
