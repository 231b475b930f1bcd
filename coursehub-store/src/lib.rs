//! Contracts for the two external storage collaborators: a document-oriented
//! record store (collections of JSON documents, equality-filtered queries,
//! atomic list mutations) and a blob store addressed by retrievable url.
//!
//! The in-memory implementations back the test suites and the dev server;
//! a production deployment plugs a real backend in behind the same traits.

pub mod error;
pub mod fs_blob;
pub mod memory;

use core::fmt;

use async_trait::async_trait;
use bytes::Bytes;
pub use error::{BlobError, StoreError};
pub use fs_blob::FsBlobStore;
pub use memory::{MemoryBlobStore, MemoryRecordStore};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Courses,
    Enrollments,
    Quizzes,
    QuizResults,
}

impl Collection {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Courses => "courses",
            Self::Enrollments => "enrollments",
            Self::Quizzes => "quizzes",
            Self::QuizResults => "quizResults",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A conjunction of field equality predicates. The record store contract
/// supports no other query shape.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    #[must_use]
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            clauses: vec![(name.into(), value.into())],
        }
    }

    #[must_use]
    pub fn and(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn matches(&self, fields: &Value) -> bool {
        self.clauses
            .iter()
            .all(|(name, value)| fields.get(name) == Some(value))
    }
}

/// A stored document together with its store-assigned identifier.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub fields: Value,
}

impl Record {
    /// Deserializes the document into a typed model, injecting the record
    /// identifier as the model's `id` field.
    pub fn decode<T: DeserializeOwned>(mut self) -> Result<T, StoreError> {
        if let Value::Object(map) = &mut self.fields {
            map.insert("id".to_owned(), Value::String(self.id));
        }
        Ok(serde_json::from_value(self.fields)?)
    }
}

/// Outcome of a conditional insert.
#[derive(Debug)]
pub enum CreateOutcome {
    Created(String),
    Exists(Record),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Stores a new document and returns its generated identifier.
    async fn create(&self, collection: Collection, fields: Value) -> Result<String, StoreError>;

    /// Stores a new document only if no existing document matches `filter`.
    /// The check and the insert are atomic with respect to concurrent callers.
    async fn create_if_absent(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Value,
    ) -> Result<CreateOutcome, StoreError>;

    /// Stores a document under a caller-chosen identifier, replacing any
    /// existing document with that identifier. Used for records keyed by an
    /// identity issued elsewhere (user records keyed by the gateway's id).
    async fn put(&self, collection: Collection, id: &str, fields: Value)
        -> Result<(), StoreError>;

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Record>, StoreError>;

    async fn find(&self, collection: Collection, filter: &Filter)
        -> Result<Vec<Record>, StoreError>;

    /// Sets a single scalar field. Fails with `NotFound` if the record is absent.
    async fn update_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Deleting an absent record is a no-op, not an error.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError>;

    /// Set-union append to a list field: an element equal to an existing one
    /// is not appended twice. Atomic with respect to concurrent callers.
    async fn list_append(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;

    /// Set-difference removal from a list field: removes every element equal
    /// to `value`. Atomic with respect to concurrent callers.
    async fn list_remove(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError>;
}

/// Outcome of a blob deletion. Deleting an object that is already gone is
/// success, but callers may want to log the difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    AlreadyAbsent,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores the binary content under `path` and returns a retrievable url.
    async fn put(&self, path: &str, content: Bytes) -> Result<String, BlobError>;

    async fn get(&self, url: &str) -> Result<Option<Bytes>, BlobError>;

    async fn delete(&self, url: &str) -> Result<DeleteOutcome, BlobError>;
}
