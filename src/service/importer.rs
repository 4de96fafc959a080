use chrono::NaiveDate;
use dashmap::DashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;

use super::columns::{InventorySchema, LedgerSchema, RowOutcome, SheetSchema, VendorSchema};
use super::dates::DateHeuristic;
use super::resolver::PendingBatch;
use super::sheet::{read_sheet, SheetRow};
use super::staging;
use crate::config::ImportConfig;
use crate::db::{RecordStore, RecordStores};
use crate::error::ImportError;
use crate::models::{
    BusinessRecord, ImportReport, InventoryItem, RecordVariant, SkipReason, VendorClient,
};

/// 台账导入的请求参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerParams {
    pub hospital_id: String,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl LedgerParams {
    /// 校验请求参数: hospitalId 必填, from/to 为 YYYY-MM-DD
    pub fn parse(
        hospital_id: Option<&str>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Result<Self, ImportError> {
        let hospital_id = hospital_id
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or_else(|| ImportError::BadRequest("hospitalId is required".to_string()))?;

        let parse_day = |name: &str, raw: Option<&str>| -> Result<Option<NaiveDate>, ImportError> {
            match raw.map(str::trim).filter(|r| !r.is_empty()) {
                None => Ok(None),
                Some(r) => NaiveDate::parse_from_str(r, "%Y-%m-%d").map(Some).map_err(|_| {
                    ImportError::BadRequest(format!("{name} must be YYYY-MM-DD, got {r:?}"))
                }),
            }
        };
        let from = parse_day("from", from)?;
        let to = parse_day("to", to)?;
        if let (Some(f), Some(t)) = (from, to) {
            if f > t {
                return Err(ImportError::BadRequest(format!("from {f} is after to {t}")));
            }
        }

        Ok(Self {
            hospital_id: hospital_id.to_string(),
            from,
            to,
        })
    }
}

/// 表格导入服务
///
/// 同一记录类型的导入 (身份解析 + 提交) 串行执行; 存储层唯一约束兜底。
pub struct ImportService {
    stores: RecordStores,
    dates: DateHeuristic,
    upload_dir: PathBuf,
    locks: DashMap<RecordVariant, Arc<Mutex<()>>>,
}

impl ImportService {
    pub fn new(stores: RecordStores, config: &ImportConfig, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            stores,
            dates: DateHeuristic::from_config(config),
            upload_dir: upload_dir.into(),
            locks: DashMap::new(),
        }
    }

    pub fn stores(&self) -> &RecordStores {
        &self.stores
    }

    fn lock_for(&self, variant: RecordVariant) -> Arc<Mutex<()>> {
        self.locks.entry(variant).or_default().clone()
    }

    pub async fn import_inventory(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImportReport, ImportError> {
        let rows = self.load_rows(file_name, bytes).await?;
        self.import_sheet(self.stores.inventory.as_ref(), &InventorySchema, rows).await
    }

    pub async fn import_vendors(&self, file_name: &str, bytes: Vec<u8>) -> Result<ImportReport, ImportError> {
        let rows = self.load_rows(file_name, bytes).await?;
        self.import_sheet(self.stores.vendors.as_ref(), &VendorSchema, rows).await
    }

    /// 台账只追加; from/to 仅做校验, 不过滤行
    pub async fn import_ledger(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
        params: &LedgerParams,
    ) -> Result<ImportReport, ImportError> {
        let rows = self.load_rows(file_name, bytes).await?;
        tracing::info!(
            "台账导入 hospital={} range={:?}..{:?}",
            params.hospital_id,
            params.from,
            params.to
        );
        let schema = LedgerSchema::new(params.hospital_id.clone());
        self.import_sheet(self.stores.ledger.as_ref(), &schema, rows).await
    }

    /// 暂存 -> 读取首个工作表; 暂存文件在任何出口都会删除
    async fn load_rows(&self, file_name: &str, bytes: Vec<u8>) -> Result<Vec<SheetRow>, ImportError> {
        let upload_dir = self.upload_dir.clone();
        let file_name = file_name.to_string();
        tokio::task::spawn_blocking(move || {
            let staged = staging::stage(&upload_dir, &file_name, &bytes)?;
            read_sheet(staged.path())
        })
        .await
        .map_err(|e| ImportError::Io(std::io::Error::other(e)))?
    }

    /// 按固定列位映射逐行处理, 最后一次性提交
    pub async fn import_sheet<S: SheetSchema>(
        &self,
        store: &dyn RecordStore<S::Record>,
        schema: &S,
        rows: Vec<SheetRow>,
    ) -> Result<ImportReport, ImportError> {
        let variant = S::Record::VARIANT;
        let lock = self.lock_for(variant);
        let _guard = lock.lock().await;

        let start_time = Instant::now();
        let mut report = ImportReport::default();
        let mut batch = PendingBatch::new();

        // 表头按绝对行号判断: 工作表首行为空时, 读取结果从第 1 行起
        for row in rows.iter().filter(|r| r.index >= schema.header_rows()) {
            if row.is_blank() {
                continue;
            }
            match schema.map_row(row, &self.dates) {
                RowOutcome::Record(record) => {
                    let (_, is_new) = batch.resolve(store, record).await?;
                    tracing::debug!("行 {} 解析完成 (new={})", row.index, is_new);
                }
                RowOutcome::Skip(reason) => {
                    if reason == SkipReason::NonDataRow {
                        tracing::debug!("行 {} 非数据行, 跳过", row.index);
                    } else {
                        tracing::warn!("行 {} 跳过: {:?}", row.index, reason);
                    }
                    report.skip(row.index, reason);
                }
            }
        }

        report.created = batch.created();
        report.updated = batch.updated();
        let saved = store.save_all(batch.into_records()).await?;
        report.committed_count = saved.len();

        tracing::info!(
            "{} 导入完成: 提交 {} (新增 {}, 更新 {}), 跳过 {} (错误 {}), 耗时: {:?}",
            variant,
            report.committed_count,
            report.created,
            report.updated,
            report.skipped.len(),
            report.error_count(),
            start_time.elapsed()
        );
        Ok(report)
    }

    pub async fn update_inventory(&self, id: i64, incoming: InventoryItem) -> Result<InventoryItem, ImportError> {
        self.update_by_id(self.stores.inventory.as_ref(), id, incoming).await
    }

    pub async fn update_vendor(&self, id: i64, incoming: VendorClient) -> Result<VendorClient, ImportError> {
        self.update_by_id(self.stores.vendors.as_ref(), id, incoming).await
    }

    /// 按 id 覆盖全部非键字段; 键字段保持不变
    async fn update_by_id<R: BusinessRecord>(
        &self,
        store: &dyn RecordStore<R>,
        id: i64,
        incoming: R,
    ) -> Result<R, ImportError> {
        let lock = self.lock_for(R::VARIANT);
        let _guard = lock.lock().await;

        let mut existing = store
            .find_by_id(id)
            .await?
            .ok_or(ImportError::NotFound { variant: R::VARIANT, id })?;
        existing.merge_from(&incoming);

        let saved = store.save_all(vec![existing]).await?;
        saved
            .into_iter()
            .next()
            .ok_or(ImportError::NotFound { variant: R::VARIANT, id })
    }
}
