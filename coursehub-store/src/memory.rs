//! In-memory implementations of the store contracts. A single write lock per
//! store makes the list mutations and the conditional insert atomic, which
//! the registry and enrollment workflows rely on.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;
use tokio::sync::RwLock;

use crate::error::{BlobError, StoreError};
use crate::{BlobStore, Collection, CreateOutcome, DeleteOutcome, Filter, Record, RecordStore};

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(20)
        .map(char::from)
        .collect()
}

#[derive(Default)]
pub struct MemoryRecordStore {
    collections: RwLock<HashMap<Collection, HashMap<String, Value>>>,
}

impl MemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create(&self, collection: Collection, fields: Value) -> Result<String, StoreError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();
        let id = generate_id();
        records.insert(id.clone(), fields);
        Ok(id)
    }

    async fn create_if_absent(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Value,
    ) -> Result<CreateOutcome, StoreError> {
        let mut collections = self.collections.write().await;
        let records = collections.entry(collection).or_default();
        if let Some((id, existing)) = records
            .iter()
            .find(|(_, fields)| filter.matches(fields))
        {
            return Ok(CreateOutcome::Exists(Record {
                id: id.clone(),
                fields: existing.clone(),
            }));
        }
        let id = generate_id();
        records.insert(id.clone(), fields);
        Ok(CreateOutcome::Created(id))
    }

    async fn put(
        &self,
        collection: Collection,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .insert(id.to_owned(), fields);
        Ok(())
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Record>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|records| records.get(id))
            .map(|fields| Record {
                id: id.to_owned(),
                fields: fields.clone(),
            }))
    }

    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> Result<Vec<Record>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|(_, fields)| filter.matches(fields))
                    .map(|(id, fields)| Record {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let fields = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        let Value::Object(map) = fields else {
            return Err(StoreError::Corrupt {
                collection,
                id: id.to_owned(),
            });
        };
        map.insert(field.to_owned(), value);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(records) = collections.get_mut(&collection) {
            records.remove(id);
        }
        Ok(())
    }

    async fn list_append(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let fields = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        let Value::Object(map) = fields else {
            return Err(StoreError::Corrupt {
                collection,
                id: id.to_owned(),
            });
        };
        let list = map
            .entry(field.to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(elements) = list else {
            return Err(StoreError::Corrupt {
                collection,
                id: id.to_owned(),
            });
        };
        if !elements.contains(&value) {
            elements.push(value);
        }
        Ok(())
    }

    async fn list_remove(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let fields = collections
            .get_mut(&collection)
            .and_then(|records| records.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection,
                id: id.to_owned(),
            })?;
        let Value::Object(map) = fields else {
            return Err(StoreError::Corrupt {
                collection,
                id: id.to_owned(),
            });
        };
        match map.get_mut(field) {
            Some(Value::Array(elements)) => {
                elements.retain(|element| element != &value);
                Ok(())
            }
            // absent field: nothing to remove
            None => Ok(()),
            Some(_) => Err(StoreError::Corrupt {
                collection,
                id: id.to_owned(),
            }),
        }
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryBlobStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, path: &str, content: Bytes) -> Result<String, BlobError> {
        let url = format!("memory://{path}");
        self.blobs.write().await.insert(url.clone(), content);
        Ok(url)
    }

    async fn get(&self, url: &str) -> Result<Option<Bytes>, BlobError> {
        Ok(self.blobs.read().await.get(url).cloned())
    }

    async fn delete(&self, url: &str) -> Result<DeleteOutcome, BlobError> {
        if !url.starts_with("memory://") {
            return Err(BlobError::ForeignUrl(url.to_owned()));
        }
        match self.blobs.write().await.remove(url) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::AlreadyAbsent),
        }
    }
}
