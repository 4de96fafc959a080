use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::record::{BusinessRecord, CandidateKey, KeyValue, RecordVariant};

/// 库存药品 (medicines)
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InventoryItem {
    pub id: Option<i64>,
    #[serde(rename = "no")]
    pub sequence_no: i32,       // 序号 No (唯一)
    pub supplier: String,       // 入库处
    pub manufacturer: String,   // 制造商
    pub code: String,           // 代码 (唯一)
    pub name: String,           // 品名
    pub spec: String,           // 规格
    pub base_price: f64,        // 基准价
    pub location: String,       // 库存位置
    pub prev_stock: f64,
    pub prev_amount: f64,
    pub in_qty: f64,
    pub in_amount: f64,
    pub out_qty: f64,
    pub out_amount: f64,
    pub stock_qty: f64,
    pub purchased_qty: f64,
    pub unit_price: f64,
    pub base_price_percent: f64,
    pub stock_amount: f64,
    pub base_price_code: String,
    pub remarks: String,
    pub standard_code: String,
    pub product_location: String,
}

const INVENTORY_KEYS: &[CandidateKey] = &[
    CandidateKey::unique("code"),
    CandidateKey::unique("sequence_no"),
];

impl BusinessRecord for InventoryItem {
    const VARIANT: RecordVariant = RecordVariant::Inventory;

    fn candidate_keys() -> &'static [CandidateKey] {
        INVENTORY_KEYS
    }

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    fn key_value(&self, field: &str) -> Option<KeyValue> {
        match field {
            "code" => KeyValue::text(&self.code),
            "sequence_no" => Some(KeyValue::Int(i64::from(self.sequence_no))),
            _ => None,
        }
    }

    fn merge_from(&mut self, incoming: &Self) {
        // id / sequence_no / code 保持不变
        *self = Self {
            id: self.id,
            sequence_no: self.sequence_no,
            code: self.code.clone(),
            ..incoming.clone()
        };
    }
}
