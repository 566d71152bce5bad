//! Typed access to document store collections.
//!
//! [`Document`] describes how an entity is stored: its collection name, its
//! identifier type, the draft written on insert and the patch merged on
//! update, and which fields must stay unique. [`Collection`] wraps the untyped
//! [`DocumentStore`] port with serde encoding and maps adapter failures into
//! domain [`Error`]s.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use super::ports::{DeleteAck, DocumentStore, DocumentStoreError, Filter, Query};
use super::{DocumentId, Error};

/// Storage descriptor implemented by every persisted entity.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Typed identifier, convertible to and from the store identifier.
    type Id: Copy
        + Eq
        + fmt::Debug
        + fmt::Display
        + From<DocumentId>
        + Into<DocumentId>
        + Send
        + Sync
        + 'static;
    /// Payload written on insert, before the store assigns `_id`.
    type Draft: Serialize + Send + Sync;
    /// Partial update; unset fields must be skipped during serialisation.
    type Patch: Serialize + Send + Sync;

    /// Collection holding documents of this kind.
    const COLLECTION: &'static str;
    /// Singular noun used in client-facing messages ("Invalid article id").
    const NOUN: &'static str;
    /// Fields no two documents of this kind may share.
    const UNIQUE_FIELDS: &'static [&'static str] = &[];

    /// Identifier of this document.
    fn id(&self) -> Self::Id;

    /// Error reported when a write would duplicate a unique `field`.
    fn duplicate(field: &str) -> Error {
        Error::invalid_input(format!("{} {field} is already in use", Self::NOUN))
    }
}

/// Typed handle to one collection of the document store.
pub struct Collection<D> {
    store: Arc<dyn DocumentStore>,
    _marker: PhantomData<fn() -> D>,
}

impl<D> Clone for Collection<D> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<D: Document> Collection<D> {
    /// Bind the collection for `D` on `store`.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Point lookup.
    pub async fn find(&self, id: D::Id) -> Result<Option<D>, Error> {
        self.store
            .find_one(D::COLLECTION, id.into())
            .await
            .map_err(map_store_error)?
            .map(decode::<D>)
            .transpose()
    }

    /// Ordered scan.
    pub async fn find_where(&self, query: &Query) -> Result<Vec<D>, Error> {
        self.store
            .find(D::COLLECTION, query)
            .await
            .map_err(map_store_error)?
            .into_iter()
            .map(decode::<D>)
            .collect()
    }

    /// Insert a draft and return the stored document.
    pub async fn insert(&self, draft: &D::Draft) -> Result<D, Error> {
        let document = encode::<D, _>(draft)?;
        let stored = self
            .store
            .insert(D::COLLECTION, document, D::UNIQUE_FIELDS)
            .await
            .map_err(map_write_error::<D>)?;
        decode(stored)
    }

    /// Merge a patch; `None` when the identifier is unknown.
    pub async fn update(&self, id: D::Id, patch: &D::Patch) -> Result<Option<D>, Error> {
        let set = encode::<D, _>(patch)?;
        self.store
            .update(D::COLLECTION, id.into(), set, D::UNIQUE_FIELDS)
            .await
            .map_err(map_write_error::<D>)?
            .map(decode::<D>)
            .transpose()
    }

    /// Delete one document.
    pub async fn delete(&self, id: D::Id) -> Result<DeleteAck, Error> {
        self.store
            .delete(D::COLLECTION, id.into())
            .await
            .map_err(map_store_error)
    }

    /// Delete every document matching `filter`.
    pub async fn delete_where(&self, filter: &Filter) -> Result<DeleteAck, Error> {
        self.store
            .delete_many(D::COLLECTION, filter)
            .await
            .map_err(map_store_error)
    }
}

fn encode<D: Document, T: Serialize>(payload: &T) -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(Error::internal(format!(
            "{} payload must encode as an object, got {other}",
            D::COLLECTION
        ))),
        Err(err) => Err(Error::internal(format!(
            "failed to encode {} payload: {err}",
            D::COLLECTION
        ))),
    }
}

fn decode<D: Document>(value: Value) -> Result<D, Error> {
    serde_json::from_value(value).map_err(|err| {
        warn!(collection = D::COLLECTION, error = %err, "stored document failed to decode");
        Error::internal(format!("failed to decode {} document: {err}", D::COLLECTION))
    })
}

/// Map adapter failures onto domain errors.
pub(crate) fn map_store_error(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Connection { message } => {
            Error::service_unavailable(format!("document store unavailable: {message}"))
        }
        DocumentStoreError::Query { message } => {
            Error::internal(format!("document store error: {message}"))
        }
        DocumentStoreError::Serialization { message } => {
            Error::internal(format!("document store serialisation failed: {message}"))
        }
        DocumentStoreError::Conflict { collection, field } => {
            Error::invalid_input(format!("duplicate {field} in {collection}"))
        }
    }
}

fn map_write_error<D: Document>(error: DocumentStoreError) -> Error {
    match error {
        DocumentStoreError::Conflict { field, .. } => D::duplicate(&field),
        other => map_store_error(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockDocumentStore;
    use rstest::rstest;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        #[serde(rename = "_id")]
        id: DocumentId,
        body: String,
    }

    impl Document for Note {
        type Id = DocumentId;
        type Draft = Value;
        type Patch = Value;

        const COLLECTION: &'static str = "notes";
        const NOUN: &'static str = "note";

        fn id(&self) -> Self::Id {
            self.id
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct UniqueNote {
        #[serde(rename = "_id")]
        id: DocumentId,
        body: String,
    }

    impl Document for UniqueNote {
        type Id = DocumentId;
        type Draft = Value;
        type Patch = Value;

        const COLLECTION: &'static str = "notes";
        const NOUN: &'static str = "unique note";
        const UNIQUE_FIELDS: &'static [&'static str] = &["body"];

        fn id(&self) -> Self::Id {
            self.id
        }
    }

    fn note_id() -> DocumentId {
        DocumentId::parse("0190c9a4-0000-7000-8000-000000000001").expect("valid id")
    }

    #[rstest]
    #[tokio::test]
    async fn find_decodes_stored_documents() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .times(1)
            .return_once(|_, id| Ok(Some(json!({ "_id": id, "body": "hi" }))));
        let notes = Collection::<Note>::new(Arc::new(store));

        let found = notes.find(note_id()).await.expect("lookup succeeds");
        assert_eq!(
            found,
            Some(Note {
                id: note_id(),
                body: "hi".to_owned()
            })
        );
    }

    #[rstest]
    #[case(DocumentStoreError::connection("refused"), ErrorCode::ServiceUnavailable)]
    #[case(DocumentStoreError::query("timeout"), ErrorCode::InternalError)]
    #[case(DocumentStoreError::serialization("bad"), ErrorCode::InternalError)]
    #[tokio::test]
    async fn store_failures_map_to_domain_codes(
        #[case] failure: DocumentStoreError,
        #[case] expected: ErrorCode,
    ) {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .times(1)
            .return_once(move |_, _| Err(failure));
        let notes = Collection::<Note>::new(Arc::new(store));

        let err = notes.find(note_id()).await.expect_err("lookup fails");
        assert_eq!(err.code(), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn undecodable_documents_are_internal_errors() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find()
            .times(1)
            .return_once(|_, _| Ok(vec![json!({ "_id": "nope" })]));
        let notes = Collection::<Note>::new(Arc::new(store));

        let err = notes
            .find_where(&Query::default())
            .await
            .expect_err("decode fails");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }

    #[rstest]
    #[tokio::test]
    async fn writes_declare_unique_fields_and_report_conflicts_as_bad_input() {
        let mut store = MockDocumentStore::new();
        store
            .expect_insert()
            .withf(|collection, _, unique| {
                collection.contains("notes") && unique.len() == 1 && unique.first() == Some(&"body")
            })
            .times(1)
            .return_once(|_, _, _| Err(DocumentStoreError::conflict("notes", "body")));
        let notes = Collection::<UniqueNote>::new(Arc::new(store));

        let err = notes
            .insert(&json!({ "body": "hi" }))
            .await
            .expect_err("duplicate body");
        assert_eq!(err.code(), ErrorCode::InvalidInput);
        assert_eq!(err.message(), "unique note body is already in use");
    }

    #[rstest]
    #[tokio::test]
    async fn non_object_payloads_are_rejected_before_writing() {
        let store = MockDocumentStore::new();
        let notes = Collection::<Note>::new(Arc::new(store));

        let err = notes.insert(&json!("bare")).await.expect_err("insert fails");
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
