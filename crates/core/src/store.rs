use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Store rejected the request ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Sheet {title} already exists")]
    SheetExists { title: String },

    #[error("Authentication failed: {reason}")]
    Auth { reason: String },

    #[error("JWT signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// The external tabular store, reduced to the three RPCs the sink needs.
///
/// Implementations interpret values as raw data, never as formulas, and the
/// sink never inspects a response payload beyond success or failure.
#[async_trait]
pub trait SpreadsheetStore: Send + Sync {
    /// Append one row under the given column range.
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<Value>,
    ) -> Result<(), StoreError>;

    /// Overwrite the given fixed range with one row. Used for idempotent
    /// header installation.
    async fn overwrite_row(
        &self,
        spreadsheet_id: &str,
        range: &str,
        row: Vec<Value>,
    ) -> Result<(), StoreError>;

    /// Create a named sheet. Returns [`StoreError::SheetExists`] when the
    /// sheet is already present.
    async fn add_sheet(&self, spreadsheet_id: &str, title: &str) -> Result<(), StoreError>;
}
