use sqlx::postgres::PgRow;
use sqlx::query_builder::Separated;
use sqlx::{FromRow, Postgres};

use crate::models::{BusinessRecord, InventoryItem, LedgerEntry, VendorClient};

/// 记录类型到数据表的映射
///
/// `COLUMNS` 不含 id, 顺序必须与 `push_columns` 绑定顺序一致。
pub trait PgRecord: BusinessRecord + for<'r> FromRow<'r, PgRow> + Unpin {
    const TABLE: &'static str;
    const COLUMNS: &'static [&'static str];

    fn push_columns(&self, row: &mut Separated<'_, '_, Postgres, &'static str>);
}

impl PgRecord for InventoryItem {
    const TABLE: &'static str = "medicines";
    const COLUMNS: &'static [&'static str] = &[
        "sequence_no", "supplier", "manufacturer", "code", "name", "spec",
        "base_price", "location", "prev_stock", "prev_amount", "in_qty", "in_amount",
        "out_qty", "out_amount", "stock_qty", "purchased_qty", "unit_price",
        "base_price_percent", "stock_amount", "base_price_code", "remarks",
        "standard_code", "product_location",
    ];

    fn push_columns(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.sequence_no)
            .push_bind(self.supplier.clone())
            .push_bind(self.manufacturer.clone())
            .push_bind(self.code.clone())
            .push_bind(self.name.clone())
            .push_bind(self.spec.clone())
            .push_bind(self.base_price)
            .push_bind(self.location.clone())
            .push_bind(self.prev_stock)
            .push_bind(self.prev_amount)
            .push_bind(self.in_qty)
            .push_bind(self.in_amount)
            .push_bind(self.out_qty)
            .push_bind(self.out_amount)
            .push_bind(self.stock_qty)
            .push_bind(self.purchased_qty)
            .push_bind(self.unit_price)
            .push_bind(self.base_price_percent)
            .push_bind(self.stock_amount)
            .push_bind(self.base_price_code.clone())
            .push_bind(self.remarks.clone())
            .push_bind(self.standard_code.clone())
            .push_bind(self.product_location.clone());
    }
}

impl PgRecord for VendorClient {
    const TABLE: &'static str = "vendor_clients";
    const COLUMNS: &'static [&'static str] = &[
        "classification", "code", "name_internal", "name_original", "representative",
        "dob", "business_number", "phone", "fax", "zip", "address", "sales_rep",
        "dept_head", "price_apply", "stock_apply", "invoice_issue", "business_type",
        "item", "client_type", "client_group", "contract_type", "delivery_type",
        "pharmacist", "license_no", "care_no", "narcotics_id", "device_client",
        "contact", "email", "invoice_manager", "manager_phone", "credit_limit",
        "max_turn_days", "monthly_estimate", "start_date", "note1", "note2", "active",
        "e_invoice", "invoice_system", "external_exclude", "pre_payment",
    ];

    fn push_columns(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.classification.clone())
            .push_bind(self.code.clone())
            .push_bind(self.name_internal.clone())
            .push_bind(self.name_original.clone())
            .push_bind(self.representative.clone())
            .push_bind(self.dob)
            .push_bind(self.business_number.clone())
            .push_bind(self.phone.clone())
            .push_bind(self.fax.clone())
            .push_bind(self.zip.clone())
            .push_bind(self.address.clone())
            .push_bind(self.sales_rep.clone())
            .push_bind(self.dept_head.clone())
            .push_bind(self.price_apply.clone())
            .push_bind(self.stock_apply.clone())
            .push_bind(self.invoice_issue)
            .push_bind(self.business_type.clone())
            .push_bind(self.item.clone())
            .push_bind(self.client_type.clone())
            .push_bind(self.client_group.clone())
            .push_bind(self.contract_type.clone())
            .push_bind(self.delivery_type.clone())
            .push_bind(self.pharmacist.clone())
            .push_bind(self.license_no.clone())
            .push_bind(self.care_no.clone())
            .push_bind(self.narcotics_id.clone())
            .push_bind(self.device_client.clone())
            .push_bind(self.contact.clone())
            .push_bind(self.email.clone())
            .push_bind(self.invoice_manager.clone())
            .push_bind(self.manager_phone.clone())
            .push_bind(self.credit_limit)
            .push_bind(self.max_turn_days)
            .push_bind(self.monthly_estimate)
            .push_bind(self.start_date)
            .push_bind(self.note1.clone())
            .push_bind(self.note2.clone())
            .push_bind(self.active)
            .push_bind(self.e_invoice)
            .push_bind(self.invoice_system.clone())
            .push_bind(self.external_exclude)
            .push_bind(self.pre_payment);
    }
}

impl PgRecord for LedgerEntry {
    const TABLE: &'static str = "vendor_ledger_entries";
    const COLUMNS: &'static [&'static str] = &[
        "hospital_id", "entry_date", "order_id", "qty", "unit_price", "amount", "remarks",
    ];

    fn push_columns(&self, row: &mut Separated<'_, '_, Postgres, &'static str>) {
        row.push_bind(self.hospital_id.clone())
            .push_bind(self.entry_date)
            .push_bind(self.order_id.clone())
            .push_bind(self.qty)
            .push_bind(self.unit_price.clone())
            .push_bind(self.amount.clone())
            .push_bind(self.remarks.clone());
    }
}
