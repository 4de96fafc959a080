use chrono::Utc;
use lopdf::Document;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

use super::compositor::composite_to_file;
use super::extractor::{artifact_file_name, FieldExtractor};
use super::normalizer::normalize_document;
use crate::error::{DocumentError, ImportError};
use crate::models::{FailedInvoice, InvoiceBatch, ProcessedInvoice};

/// 上传的发票文件
#[derive(Debug, Clone)]
pub struct InvoiceUpload {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

impl InvoiceUpload {
    pub fn new(original_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            original_name: original_name.into(),
            bytes,
        }
    }
}

/// 发票流水线: 文本规范化 -> 字段提取 -> 模板叠加
pub struct InvoicePipeline {
    template_path: PathBuf,
    export_dir: PathBuf,
    url_prefix: String,
    extractor: FieldExtractor,
}

impl InvoicePipeline {
    pub fn new(
        template_path: impl Into<PathBuf>,
        export_dir: impl Into<PathBuf>,
        century_pivot: Option<u8>,
    ) -> Self {
        Self {
            template_path: template_path.into(),
            export_dir: export_dir.into(),
            url_prefix: "/exports".to_string(),
            extractor: FieldExtractor::new(century_pivot),
        }
    }

    /// 单个上传; 同一机构同一天重复上传会覆盖同名产物
    pub async fn process_single(&self, upload: InvoiceUpload) -> Result<ProcessedInvoice, ImportError> {
        self.process(upload, None).await
    }

    /// 批量上传: 逐个串行处理, 单个失败记录后继续下一个
    pub async fn process_batch(&self, uploads: Vec<InvoiceUpload>) -> InvoiceBatch {
        let total = uploads.len();
        let mut batch = InvoiceBatch::default();

        for (idx, upload) in uploads.into_iter().enumerate() {
            let original_name = upload.original_name.clone();
            let suffix = format!(
                "{}-{}",
                Utc::now().timestamp_millis(),
                &Uuid::new_v4().simple().to_string()[..8]
            );
            match self.process(upload, Some(suffix)).await {
                Ok(processed) => batch.processed.push(processed),
                Err(e) => {
                    tracing::warn!("✗ 发票 {} 处理失败 ({}/{}): {}", original_name, idx + 1, total, e);
                    batch.failed.push(FailedInvoice {
                        original_name,
                        detail: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "批量发票处理完成: 成功 {}, 失败 {}",
            batch.processed.len(),
            batch.failed.len()
        );
        batch
    }

    async fn process(&self, upload: InvoiceUpload, suffix: Option<String>) -> Result<ProcessedInvoice, ImportError> {
        let start_time = Instant::now();
        let template_bytes = tokio::fs::read(&self.template_path).await?;

        let InvoiceUpload { original_name, bytes } = upload;
        let source_name = original_name.clone();
        let export_dir = self.export_dir.clone();
        let extractor = self.extractor;

        let (parsed_text, fields, file_name) = tokio::task::spawn_blocking(move || {
            let content = Document::load_mem(&bytes).map_err(DocumentError::from)?;
            let parsed_text = normalize_document(&content)?;
            let fields = extractor.extract(&parsed_text, &source_name);
            let file_name = artifact_file_name(&fields, suffix.as_deref());

            let template = Document::load_mem(&template_bytes).map_err(DocumentError::from)?;
            let pages = composite_to_file(template, content, &export_dir.join(&file_name))?;
            tracing::debug!("{} 合成 {} 页", file_name, pages);
            Ok::<_, ImportError>((parsed_text, fields, file_name))
        })
        .await
        .map_err(|e| ImportError::Io(std::io::Error::other(e)))??;

        tracing::info!(
            "✓ 发票 {} -> {} ({}, {}), 耗时: {:?}",
            original_name,
            file_name,
            fields.organization_name,
            fields.transaction_date,
            start_time.elapsed()
        );

        Ok(ProcessedInvoice {
            original_name,
            artifact_url: format!("{}/{}", self.url_prefix, file_name),
            file_name,
            parsed_text,
            fields,
        })
    }
}
