use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::record::{BusinessRecord, CandidateKey, KeyValue, RecordVariant};

/// 交易台账 (vendor_ledger_entries), 只追加
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    pub id: Option<i64>,
    pub hospital_id: String,
    pub entry_date: NaiveDate,
    pub order_id: String,
    pub qty: i32,
    pub unit_price: BigDecimal,
    pub amount: BigDecimal,
    pub remarks: String,
}

impl BusinessRecord for LedgerEntry {
    const VARIANT: RecordVariant = RecordVariant::Ledger;

    fn candidate_keys() -> &'static [CandidateKey] {
        &[]
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key_value(&self, _field: &str) -> Option<KeyValue> {
        None
    }

    fn merge_from(&mut self, incoming: &Self) {
        *self = Self {
            id: self.id,
            ..incoming.clone()
        };
    }
}
