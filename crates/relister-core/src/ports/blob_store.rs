//! BlobStore port - 画像などの Blob を key で取得

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob {0:?} not found")]
    NotFound(String),

    #[error("blob key {0:?} is not allowed")]
    InvalidKey(String),

    #[error("blob store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Bytes, BlobError>;
}
