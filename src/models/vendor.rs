use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::record::{BusinessRecord, CandidateKey, KeyValue, RecordVariant};

/// 往来客户 (vendor_clients)
#[derive(Debug, Clone, Default, PartialEq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VendorClient {
    pub id: Option<i64>,
    pub classification: String,
    pub code: String, // 客户代码 (唯一)
    pub name_internal: String,
    pub name_original: String,
    pub representative: String,
    pub dob: Option<NaiveDate>,
    pub business_number: String,
    pub phone: String,
    pub fax: String,
    pub zip: String,
    pub address: String,
    pub sales_rep: String,
    pub dept_head: String,
    pub price_apply: String,
    pub stock_apply: String,
    pub invoice_issue: bool,
    pub business_type: String,
    pub item: String,
    pub client_type: String,
    pub client_group: String,
    pub contract_type: String,
    pub delivery_type: String,
    pub pharmacist: String,
    pub license_no: String,
    pub care_no: String,
    pub narcotics_id: String,
    pub device_client: String,
    pub contact: String,
    pub email: String,
    pub invoice_manager: String,
    pub manager_phone: String,
    pub credit_limit: f64,
    pub max_turn_days: i32,
    pub monthly_estimate: i32,
    pub start_date: Option<NaiveDate>,
    pub note1: String,
    pub note2: String,
    pub active: bool,
    pub e_invoice: bool,
    pub invoice_system: String,
    pub external_exclude: bool,
    pub pre_payment: bool,
}

const VENDOR_KEYS: &[CandidateKey] = &[CandidateKey::unique("code")];

impl BusinessRecord for VendorClient {
    const VARIANT: RecordVariant = RecordVariant::VendorClient;

    fn candidate_keys() -> &'static [CandidateKey] {
        VENDOR_KEYS
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
            _ => None,
        }
    }

    fn merge_from(&mut self, incoming: &Self) {
        *self = Self {
            id: self.id,
            code: self.code.clone(),
            ..incoming.clone()
        };
    }
}
