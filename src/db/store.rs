use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use super::memory::MemoryStore;
use super::queries::PgStore;
use crate::error::StoreError;
use crate::models::{BusinessRecord, InventoryItem, KeyValue, LedgerEntry, VendorClient};

/// 按记录类型的存储抽象
///
/// 身份解析只依赖 `find_by_key`; 提交走 `save_all`:
/// 无 id 的记录插入并分配 id, 有 id 的记录整体覆盖。
/// 台账类型 (`CommitMode::Atomic`) 要么全部写入, 要么全部回滚。
#[async_trait]
pub trait RecordStore<R: BusinessRecord>: Send + Sync {
    /// 候选键精确匹配, 命中多条时取任意一条
    async fn find_by_key(&self, field: &'static str, value: &KeyValue)
        -> Result<Option<R>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, StoreError>;

    /// 返回写入后的记录 (含 id); 先已有记录、后新记录, 不保证与输入同序
    async fn save_all(&self, records: Vec<R>) -> Result<Vec<R>, StoreError>;

    async fn count(&self) -> Result<usize, StoreError>;
}

/// 三类记录的存储集合
#[derive(Clone)]
pub struct RecordStores {
    pub inventory: Arc<dyn RecordStore<InventoryItem>>,
    pub vendors: Arc<dyn RecordStore<VendorClient>>,
    pub ledger: Arc<dyn RecordStore<LedgerEntry>>,
}

impl RecordStores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            inventory: Arc::new(PgStore::<InventoryItem>::new(pool.clone())),
            vendors: Arc::new(PgStore::<VendorClient>::new(pool.clone())),
            ledger: Arc::new(PgStore::<LedgerEntry>::new(pool)),
        }
    }

    pub fn memory() -> Self {
        Self {
            inventory: Arc::new(MemoryStore::<InventoryItem>::new()),
            vendors: Arc::new(MemoryStore::<VendorClient>::new()),
            ledger: Arc::new(MemoryStore::<LedgerEntry>::new()),
        }
    }
}
