pub mod handlers;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post, put};
use axum::Router;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::service::{ImportService, InvoicePipeline};

pub use handlers::*;

/// 共享状态: 表格导入服务与发票流水线
#[derive(Clone)]
pub struct AppState {
    pub imports: Arc<ImportService>,
    pub invoices: Arc<InvoicePipeline>,
}

/// 构建路由
pub fn router(state: AppState, export_dir: &Path, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // 表格导入
        .route("/api/medicines/upload", post(upload_medicines))
        .route("/api/medicines/:id", put(update_medicine))
        .route("/api/vendors/clients/upload", post(upload_vendor_clients))
        .route("/api/vendors/clients/:id", patch(update_vendor_client))
        .route("/api/vendors/upload-ledger", post(upload_ledger))
        // 发票
        .route("/api/invoices/upload", post(upload_invoice))
        .route("/api/invoices/upload-multiple", post(upload_invoices))
        // 产物下载
        .nest_service("/exports", ServeDir::new(export_dir))
        .nest_service("/api/invoices/exports", ServeDir::new(export_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .with_state(state)
}
