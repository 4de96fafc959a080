use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::models::RecordVariant;

/// 存储层错误
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("unique constraint violated on {field} = {value}")]
    Conflict { field: &'static str, value: String },

    #[error("statement timed out after {0}s")]
    Timeout(u64),
}

/// PDF 读取 / 合成错误
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unreadable document: {0}")]
    Unreadable(#[from] lopdf::Error),

    #[error("document has no pages")]
    NoPages,

    #[error("malformed page structure: {0}")]
    Malformed(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 导入流水线错误 (行级跳过与类型默认值不属于错误)
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("file unreadable: {0}")]
    FileUnreadable(String),

    #[error("{variant} {id} not found")]
    NotFound { variant: RecordVariant, id: i64 },

    #[error("persistence failure: {0}")]
    Persistence(#[from] StoreError),

    #[error("document processing failed: {0}")]
    Document(#[from] DocumentError),

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    fn kind(&self) -> &'static str {
        match self {
            ImportError::FileUnreadable(_) => "FILE_UNREADABLE",
            ImportError::NotFound { .. } => "NOT_FOUND",
            ImportError::Persistence(_) => "PERSISTENCE_FAILURE",
            ImportError::Document(_) => "DOCUMENT_UNREADABLE",
            ImportError::BadRequest(_) => "BAD_REQUEST",
            ImportError::Io(_) => "IO",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ImportError::FileUnreadable(_)
            | ImportError::Document(_)
            | ImportError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ImportError::NotFound { .. } => StatusCode::NOT_FOUND,
            ImportError::Persistence(_) | ImportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// 错误响应体: { error, detail }
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub detail: String,
}

impl IntoResponse for ImportError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }
        let body = ErrorBody {
            error: self.kind(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_client_and_server_statuses() {
        assert_eq!(
            ImportError::FileUnreadable("zip".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ImportError::NotFound { variant: RecordVariant::Inventory, id: 7 }.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ImportError::Persistence(StoreError::Timeout(30)).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_message_names_the_variant() {
        let err = ImportError::NotFound { variant: RecordVariant::VendorClient, id: 3 };
        assert_eq!(err.to_string(), "vendor client 3 not found");
    }
}
