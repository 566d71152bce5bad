//! Port abstraction for the document store holding users, articles and
//! comments.
//!
//! Documents cross the port as JSON objects. The store owns the `_id` field:
//! it mints a time-ordered [`DocumentId`] on insert and keeps every collection
//! sorted by it, so scans come back in insertion order. A document becomes
//! visible only once every document with a smaller `_id` is visible, so a
//! scan resumed after a cursor never skips a record.
//!
//! Writes name the fields that must stay unique across the collection; the
//! store rejects a write that would duplicate one with
//! [`DocumentStoreError::Conflict`].

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::DocumentId;

use super::define_port_error;

/// Name of the identifier field on every stored document.
pub const ID_FIELD: &str = "_id";

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// The store could not be reached.
        Connection { message: String } => "document store connection failed: {message}",
        /// A read or write failed while executing.
        Query { message: String } => "document store query failed: {message}",
        /// The document could not be encoded or decoded.
        Serialization { message: String } => "document store serialisation failed: {message}",
        /// The write would duplicate a unique field.
        Conflict { collection: String, field: String } => "duplicate {field} in {collection}",
    }
}

/// Match applied to a single top-level field.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Field equals the value exactly.
    Equals(Value),
    /// Field is a string containing the needle, ignoring case.
    ///
    /// Containment is one-directional: a stored `"Rust"` does not match the
    /// needle `"Rust in Action"`.
    ContainsIgnoreCase(String),
}

impl Predicate {
    /// Evaluate the predicate against a field value (`None` when absent).
    #[must_use]
    pub fn matches(&self, field: Option<&Value>) -> bool {
        match (self, field) {
            (Self::Equals(expected), Some(actual)) => expected == actual,
            (Self::ContainsIgnoreCase(needle), Some(Value::String(haystack))) => haystack
                .to_lowercase()
                .contains(needle.to_lowercase().as_str()),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Condition {
    field: String,
    predicate: Predicate,
}

/// Conjunction of field conditions. The empty filter matches everything.
///
/// # Examples
/// ```
/// use blog_backend::domain::ports::Filter;
/// use serde_json::json;
///
/// let filter = Filter::new().contains_ignore_case("title", "rust");
/// assert!(filter.matches(&json!({ "title": "Learning Rust" })));
/// assert!(!filter.matches(&json!({ "title": "Go" })));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    /// Match-all filter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `field` to equal `value`.
    #[must_use]
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate: Predicate::Equals(value.into()),
        });
        self
    }

    /// Require `field` to contain `needle`, ignoring case.
    #[must_use]
    pub fn contains_ignore_case(
        mut self,
        field: impl Into<String>,
        needle: impl Into<String>,
    ) -> Self {
        self.conditions.push(Condition {
            field: field.into(),
            predicate: Predicate::ContainsIgnoreCase(needle.into()),
        });
        self
    }

    /// Evaluate every condition against a document.
    #[must_use]
    pub fn matches(&self, document: &Value) -> bool {
        self.conditions
            .iter()
            .all(|condition| condition.predicate.matches(document.get(condition.field.as_str())))
    }
}

/// Ordered scan over a collection.
///
/// Results are ascending by `_id`. `after` is an exclusive lower bound and
/// `limit` caps the number of documents returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub after: Option<DocumentId>,
    pub limit: Option<usize>,
}

impl Query {
    /// Scan matching `filter` with no bound or limit.
    #[must_use]
    pub fn matching(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    /// Start strictly after `id`, if given.
    #[must_use]
    pub fn after(mut self, id: Option<DocumentId>) -> Self {
        self.after = id;
        self
    }

    /// Return at most `limit` documents.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Write acknowledgement for delete operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteAck {
    /// The store accepted and applied the write.
    pub acknowledged: bool,
    /// Number of documents removed.
    pub deleted_count: u64,
}

impl DeleteAck {
    /// `true` when exactly one acknowledged document was removed.
    #[must_use]
    pub fn removed_one(&self) -> bool {
        self.acknowledged && self.deleted_count == 1
    }
}

/// Driven port for the document database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document by identifier.
    async fn find_one(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<Value>, DocumentStoreError>;

    /// Scan documents matching `query`, ascending by identifier.
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Value>, DocumentStoreError>;

    /// Insert a new document; the store assigns `_id` and returns the stored
    /// document. No other document may share a value for any `unique` field.
    async fn insert(
        &self,
        collection: &str,
        document: Map<String, Value>,
        unique: &[&'static str],
    ) -> Result<Value, DocumentStoreError>;

    /// Merge `set` into an existing document, leaving absent keys untouched.
    /// The merged document must keep every `unique` field distinct.
    ///
    /// Returns the updated document, or `None` when `id` is unknown.
    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        set: Map<String, Value>,
        unique: &[&'static str],
    ) -> Result<Option<Value>, DocumentStoreError>;

    /// Delete one document by identifier.
    async fn delete(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<DeleteAck, DocumentStoreError>;

    /// Delete every document matching `filter`.
    async fn delete_many(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<DeleteAck, DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("great", true)]
    #[case("GREAT CONTENT", true)]
    #[case("Great content, really", false)]
    #[case("missing", false)]
    fn contains_ignore_case_is_one_directional(#[case] needle: &str, #[case] expected: bool) {
        let predicate = Predicate::ContainsIgnoreCase(needle.to_owned());
        assert_eq!(predicate.matches(Some(&json!("Great content"))), expected);
    }

    #[rstest]
    fn predicates_never_match_absent_fields() {
        assert!(!Predicate::Equals(json!("x")).matches(None));
        assert!(!Predicate::ContainsIgnoreCase("x".to_owned()).matches(None));
    }

    #[rstest]
    fn contains_ignores_non_string_fields() {
        assert!(!Predicate::ContainsIgnoreCase("1".to_owned()).matches(Some(&json!(1))));
    }

    #[rstest]
    fn filter_requires_every_condition() {
        let filter = Filter::new()
            .eq("author", "u1")
            .contains_ignore_case("title", "rust");
        assert!(filter.matches(&json!({ "author": "u1", "title": "Rust" })));
        assert!(!filter.matches(&json!({ "author": "u2", "title": "Rust" })));
    }

    #[rstest]
    #[case(DeleteAck { acknowledged: true, deleted_count: 1 }, true)]
    #[case(DeleteAck { acknowledged: true, deleted_count: 0 }, false)]
    #[case(DeleteAck { acknowledged: false, deleted_count: 1 }, false)]
    fn removed_one_requires_acknowledged_single_delete(
        #[case] ack: DeleteAck,
        #[case] expected: bool,
    ) {
        assert_eq!(ack.removed_one(), expected);
    }
}
