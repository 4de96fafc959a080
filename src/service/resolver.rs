use std::collections::HashMap;

use crate::db::RecordStore;
use crate::error::StoreError;
use crate::models::{BusinessRecord, KeyValue};

/// 待提交批次: 同一次导入内解析出的目标记录
///
/// 同一候选键值只对应一个待提交记录, 因此一个表格内重复的行
/// 合并到同一目标 (后出现的行覆盖先出现的行)。
pub struct PendingBatch<R> {
    records: Vec<R>,
    is_new: Vec<bool>,
    by_key: HashMap<(&'static str, KeyValue), usize>,
    by_id: HashMap<i64, usize>,
}

impl<R: BusinessRecord> PendingBatch<R> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            is_new: Vec::new(),
            by_key: HashMap::new(),
            by_id: HashMap::new(),
        }
    }

    /// 身份解析 + 替换式合并, 返回 (目标记录, 是否新建)
    ///
    /// 候选键按声明顺序逐个尝试: 先查本批次, 再查存储; 首个命中即为目标。
    /// 全部未命中时以该行本身作为新记录。
    pub async fn resolve(
        &mut self,
        store: &dyn RecordStore<R>,
        row: R,
    ) -> Result<(&R, bool), StoreError> {
        for key in R::candidate_keys() {
            let Some(value) = row.key_value(key.field) else {
                continue;
            };

            if let Some(&idx) = self.by_key.get(&(key.field, value.clone())) {
                self.records[idx].merge_from(&row);
                return Ok((&self.records[idx], false));
            }

            if let Some(mut existing) = store.find_by_key(key.field, &value).await? {
                // 同一存储记录可能经由不同的键再次命中
                if let Some(&idx) = existing.id().and_then(|id| self.by_id.get(&id)) {
                    self.records[idx].merge_from(&row);
                    return Ok((&self.records[idx], false));
                }
                existing.merge_from(&row);
                let idx = self.push(existing, false);
                return Ok((&self.records[idx], false));
            }
        }

        let idx = self.push(row, true);
        Ok((&self.records[idx], true))
    }

    fn push(&mut self, record: R, is_new: bool) -> usize {
        let idx = self.records.len();
        for key in R::candidate_keys() {
            if let Some(value) = record.key_value(key.field) {
                self.by_key.entry((key.field, value)).or_insert(idx);
            }
        }
        if let Some(id) = record.id() {
            self.by_id.insert(id, idx);
        }
        self.records.push(record);
        self.is_new.push(is_new);
        idx
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn created(&self) -> usize {
        self.is_new.iter().filter(|n| **n).count()
    }

    pub fn updated(&self) -> usize {
        self.len() - self.created()
    }

    pub fn into_records(self) -> Vec<R> {
        self.records
    }
}

impl<R: BusinessRecord> Default for PendingBatch<R> {
    fn default() -> Self {
        Self::new()
    }
}
