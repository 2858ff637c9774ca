use thiserror::Error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Credential secret is not valid JSON: {0}")]
    CredentialJson(#[from] serde_json::Error),

    #[error("Credential secret is not valid base64: {0}")]
    CredentialBase64(#[from] base64::DecodeError),

    #[error("Decoded credential secret is not valid UTF-8")]
    CredentialUtf8,

    #[error("Store operation failed: {0}")]
    Store(#[from] StoreError),
}

pub type Result<T> = std::result::Result<T, SinkError>;
