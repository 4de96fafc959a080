use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::store::RecordStore;
use crate::error::StoreError;
use crate::models::{BusinessRecord, CommitMode, KeyValue};

/// 进程内存储, 与 Postgres 实现保持相同的唯一约束与提交语义
pub struct MemoryStore<R> {
    table: RwLock<MemoryTable<R>>,
}

#[derive(Clone)]
struct MemoryTable<R> {
    next_id: i64,
    rows: BTreeMap<i64, R>,
}

impl<R: BusinessRecord> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            table: RwLock::new(MemoryTable {
                next_id: 1,
                rows: BTreeMap::new(),
            }),
        }
    }

    /// 按 id 升序返回全部记录
    pub async fn snapshot(&self) -> Vec<R> {
        self.table.read().await.rows.values().cloned().collect()
    }
}

impl<R: BusinessRecord> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: BusinessRecord> MemoryTable<R> {
    fn find_by_key(&self, field: &str, value: &KeyValue) -> Option<&R> {
        self.rows
            .values()
            .find(|r| r.key_value(field).as_ref() == Some(value))
    }

    fn check_unique(&self, record: &R, own_id: Option<i64>) -> Result<(), StoreError> {
        for key in R::candidate_keys().iter().filter(|k| k.unique) {
            let Some(value) = record.key_value(key.field) else {
                continue;
            };
            let clash = self
                .rows
                .values()
                .any(|r| r.id() != own_id && r.key_value(key.field).as_ref() == Some(&value));
            if clash {
                return Err(StoreError::Conflict {
                    field: key.field,
                    value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    fn upsert_row(&mut self, mut record: R) -> Result<R, StoreError> {
        if record.id().is_none() {
            // 与 ON CONFLICT (主候选键) DO UPDATE 一致: 并发插入同键时并入已有记录
            let primary = R::candidate_keys().first();
            let existing = primary.and_then(|key| {
                let value = record.key_value(key.field)?;
                self.find_by_key(key.field, &value).cloned()
            });
            if let Some(mut existing) = existing {
                existing.merge_from(&record);
                record = existing;
            }
        }

        self.check_unique(&record, record.id())?;

        let id = match record.id() {
            Some(id) => id,
            None => {
                let id = self.next_id;
                record.set_id(id);
                id
            }
        };
        self.next_id = self.next_id.max(id + 1);
        self.rows.insert(id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl<R: BusinessRecord> RecordStore<R> for MemoryStore<R> {
    async fn find_by_key(
        &self,
        field: &'static str,
        value: &KeyValue,
    ) -> Result<Option<R>, StoreError> {
        Ok(self.table.read().await.find_by_key(field, value).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<R>, StoreError> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn save_all(&self, records: Vec<R>) -> Result<Vec<R>, StoreError> {
        let mut table = self.table.write().await;
        match R::VARIANT.commit_mode() {
            CommitMode::Atomic => {
                let mut staged = table.clone();
                let saved = records
                    .into_iter()
                    .map(|r| staged.upsert_row(r))
                    .collect::<Result<Vec<_>, _>>()?;
                *table = staged;
                Ok(saved)
            }
            CommitMode::BestEffort => records.into_iter().map(|r| table.upsert_row(r)).collect(),
        }
    }

    async fn count(&self) -> Result<usize, StoreError> {
        Ok(self.table.read().await.rows.len())
    }
}
