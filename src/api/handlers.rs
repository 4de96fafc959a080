use axum::{
    extract::{Json, Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::AppState;
use crate::error::ImportError;
use crate::models::{
    FailedInvoice, ImportReport, InventoryItem, ProcessedInvoice, RecordVariant, SkippedRow, VendorClient,
};
use crate::service::{InvoiceUpload, LedgerParams};

/// 表格导入响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub message: String,
    pub processed_count: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportResponse {
    fn from_report(variant: RecordVariant, report: ImportReport) -> Self {
        Self {
            message: format!("Imported {} {} records", report.committed_count, variant),
            processed_count: report.committed_count,
            created: report.created,
            updated: report.updated,
            skipped: report.skipped,
        }
    }
}

/// 单个发票上传响应体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceResponse {
    pub message: String,
    pub artifact_url: String,
    pub file_name: String,
    pub parsed_text: String,
}

/// 批量发票上传响应体 (失败的文件不出现在 files 中)
#[derive(Debug, Serialize)]
pub struct InvoiceBatchResponse {
    pub message: String,
    pub files: Vec<ProcessedInvoice>,
    pub failed: Vec<FailedInvoice>,
}

/// multipart 中的一个部分
struct Part {
    name: String,
    file_name: Option<String>,
    bytes: Vec<u8>,
}

impl Part {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).trim().to_string()
    }

    fn upload_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| self.name.clone())
    }
}

async fn read_parts(mut multipart: Multipart) -> Result<Vec<Part>, ImportError> {
    let mut parts = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ImportError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ImportError::BadRequest(e.to_string()))?;
        parts.push(Part {
            name,
            file_name,
            bytes: bytes.to_vec(),
        });
    }
    Ok(parts)
}

/// 取第一个同名且非空的文件部分
fn take_file(parts: &mut Vec<Part>, name: &str) -> Result<Part, ImportError> {
    let position = parts
        .iter()
        .position(|p| p.name == name && !p.bytes.is_empty())
        .ok_or_else(|| ImportError::BadRequest(format!("no file uploaded in part '{}'", name)))?;
    Ok(parts.swap_remove(position))
}

fn text_field(parts: &[Part], name: &str) -> Option<String> {
    parts.iter().find(|p| p.name == name).map(Part::text)
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 库存表导入
pub async fn upload_medicines(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ImportError> {
    let mut parts = read_parts(multipart).await?;
    let file = take_file(&mut parts, "file")?;
    let report = state.imports.import_inventory(&file.upload_name(), file.bytes).await?;
    Ok(Json(ImportResponse::from_report(RecordVariant::Inventory, report)))
}

/// 客户表导入
pub async fn upload_vendor_clients(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ImportError> {
    let mut parts = read_parts(multipart).await?;
    let file = take_file(&mut parts, "file")?;
    let report = state.imports.import_vendors(&file.upload_name(), file.bytes).await?;
    Ok(Json(ImportResponse::from_report(RecordVariant::VendorClient, report)))
}

/// 台账导入 (hospitalId / from / to 为表单字段)
pub async fn upload_ledger(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ImportResponse>, ImportError> {
    let mut parts = read_parts(multipart).await?;
    let params = LedgerParams::parse(
        text_field(&parts, "hospitalId").as_deref(),
        text_field(&parts, "from").as_deref(),
        text_field(&parts, "to").as_deref(),
    )?;
    let file = take_file(&mut parts, "file")?;
    let report = state
        .imports
        .import_ledger(&file.upload_name(), file.bytes, &params)
        .await?;
    Ok(Json(ImportResponse::from_report(RecordVariant::Ledger, report)))
}

pub async fn update_medicine(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(item): Json<InventoryItem>,
) -> Result<Json<InventoryItem>, ImportError> {
    Ok(Json(state.imports.update_inventory(id, item).await?))
}

pub async fn update_vendor_client(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(client): Json<VendorClient>,
) -> Result<Json<VendorClient>, ImportError> {
    Ok(Json(state.imports.update_vendor(id, client).await?))
}

/// 单个发票上传
pub async fn upload_invoice(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<InvoiceResponse>, ImportError> {
    let mut parts = read_parts(multipart).await?;
    let file = take_file(&mut parts, "invoice")?;
    let upload = InvoiceUpload::new(file.upload_name(), file.bytes);

    let processed = state.invoices.process_single(upload).await?;
    Ok(Json(InvoiceResponse {
        message: "Invoice processed".to_string(),
        artifact_url: processed.artifact_url,
        file_name: processed.file_name,
        parsed_text: processed.parsed_text,
    }))
}

/// 批量发票上传: 空文件忽略, 单个失败不影响其他文件
pub async fn upload_invoices(State(state): State<AppState>, multipart: Multipart) -> Response {
    let parts = match read_parts(multipart).await {
        Ok(parts) => parts,
        Err(e) => return e.into_response(),
    };
    let uploads: Vec<InvoiceUpload> = parts
        .into_iter()
        .filter(|p| p.name == "invoices" && !p.bytes.is_empty())
        .map(|p| InvoiceUpload::new(p.upload_name(), p.bytes))
        .collect();
    if uploads.is_empty() {
        return ImportError::BadRequest("no files uploaded in part 'invoices'".to_string()).into_response();
    }

    let total = uploads.len();
    let batch = state.invoices.process_batch(uploads).await;
    let response = InvoiceBatchResponse {
        message: format!("Processed {} of {} invoices", batch.processed.len(), total),
        files: batch.processed,
        failed: batch.failed,
    };
    (StatusCode::OK, Json(response)).into_response()
}
