use serde::{Deserialize, Serialize};
use std::fmt;

/// 业务记录类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordVariant {
    Inventory,
    VendorClient,
    Ledger,
}

/// 批量提交方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitMode {
    /// 全部成功或全部回滚
    Atomic,
    /// 分块写入, 无显式事务边界
    BestEffort,
}

impl RecordVariant {
    pub fn commit_mode(self) -> CommitMode {
        match self {
            RecordVariant::Ledger => CommitMode::Atomic,
            RecordVariant::Inventory | RecordVariant::VendorClient => CommitMode::BestEffort,
        }
    }
}

impl fmt::Display for RecordVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordVariant::Inventory => "inventory item",
            RecordVariant::VendorClient => "vendor client",
            RecordVariant::Ledger => "ledger entry",
        };
        f.write_str(name)
    }
}

/// 候选键: (字段名, 是否要求唯一), 按声明顺序决定优先级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateKey {
    pub field: &'static str,
    pub unique: bool,
}

impl CandidateKey {
    pub const fn unique(field: &'static str) -> Self {
        Self { field, unique: true }
    }
}

/// 候选键取值
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Text(String),
    Int(i64),
}

impl KeyValue {
    /// 空白文本不作为键值
    pub fn text(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| KeyValue::Text(trimmed.to_string()))
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Text(s) => f.write_str(s),
            KeyValue::Int(i) => write!(f, "{}", i),
        }
    }
}

/// 持久化业务记录的公共接口
///
/// `candidate_keys()` 为空表示只追加、从不合并 (如台账)。
pub trait BusinessRecord: Clone + Send + Sync + 'static {
    const VARIANT: RecordVariant;

    fn candidate_keys() -> &'static [CandidateKey];

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// 字段为空时返回 None
    fn key_value(&self, field: &str) -> Option<KeyValue>;

    /// 用 `incoming` 整体覆盖全部非键字段 (替换式合并, 非字段级 diff)
    fn merge_from(&mut self, incoming: &Self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_ledger_commits_atomically() {
        assert_eq!(RecordVariant::Ledger.commit_mode(), CommitMode::Atomic);
        assert_eq!(RecordVariant::Inventory.commit_mode(), CommitMode::BestEffort);
        assert_eq!(RecordVariant::VendorClient.commit_mode(), CommitMode::BestEffort);
    }

    #[test]
    fn blank_text_is_not_a_key() {
        assert_eq!(KeyValue::text("   "), None);
        assert_eq!(KeyValue::text(" A-01 "), Some(KeyValue::Text("A-01".into())));
    }
}
