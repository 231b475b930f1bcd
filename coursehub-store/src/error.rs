use thiserror::Error;

use crate::Collection;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("record {id} not found in {collection}")]
    NotFound { collection: Collection, id: String },
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("record {id} in {collection} is not an object")]
    Corrupt { collection: Collection, id: String },
    #[error("record store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug)]
pub enum BlobError {
    #[error("blob io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid blob path: {0}")]
    InvalidPath(String),
    #[error("url {0} does not belong to this blob store")]
    ForeignUrl(String),
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}
