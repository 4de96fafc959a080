use super::coerce::{coerce_bool, coerce_decimal, coerce_int, coerce_number, coerce_string, Cell};
use super::dates::{DateHeuristic, DateParse};
use super::sheet::SheetRow;
use crate::models::{BusinessRecord, InventoryItem, LedgerEntry, SkipReason, VendorClient};

/// 单行映射结果
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome<R> {
    Record(R),
    Skip(SkipReason),
}

/// 固定列位到字段的映射 (按记录类型)
pub trait SheetSchema: Send + Sync {
    type Record: BusinessRecord;

    /// 表头行数, 这些行不参与导入
    fn header_rows(&self) -> usize {
        1
    }

    /// 必填键列为空时直接跳过, 不读取其他列
    fn map_row(&self, row: &SheetRow, dates: &DateHeuristic) -> RowOutcome<Self::Record>;
}

/// 库存表: col0 序号 (数字), col3 代码
#[derive(Debug, Clone, Copy, Default)]
pub struct InventorySchema;

fn sequence_number(cell: &Cell) -> Option<Result<i32, ()>> {
    match cell {
        Cell::Number(n) if n.is_finite() => Some(Ok(*n as i32)),
        Cell::Text(s) if !s.trim().is_empty() => Some(
            s.trim()
                .replace(',', "")
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| n as i32)
                .ok_or(()),
        ),
        Cell::Empty | Cell::Text(_) => None,
        _ => Some(Err(())),
    }
}

impl SheetSchema for InventorySchema {
    type Record = InventoryItem;

    fn map_row(&self, row: &SheetRow, _dates: &DateHeuristic) -> RowOutcome<InventoryItem> {
        let sequence_no = match sequence_number(row.cell(0)) {
            Some(Ok(no)) => no,
            // 序号列为非数字文本: 合计行、备注行
            Some(Err(())) => return RowOutcome::Skip(SkipReason::NonDataRow),
            None => return RowOutcome::Skip(SkipReason::MissingKey),
        };
        let code = coerce_string(row.cell(3));
        if code.is_empty() {
            return RowOutcome::Skip(SkipReason::MissingKey);
        }

        let s = |col| coerce_string(row.cell(col));
        let n = |col| coerce_number(row.cell(col));
        RowOutcome::Record(InventoryItem {
            id: None,
            sequence_no,
            supplier: s(1),
            manufacturer: s(2),
            code,
            name: s(4),
            spec: s(5),
            base_price: n(6),
            location: s(7),
            prev_stock: n(8),
            prev_amount: n(9),
            in_qty: n(10),
            in_amount: n(11),
            out_qty: n(12),
            out_amount: n(13),
            stock_qty: n(14),
            purchased_qty: n(15),
            unit_price: n(16),
            base_price_percent: n(17),
            stock_amount: n(18),
            base_price_code: s(19),
            remarks: s(20),
            standard_code: s(21),
            product_location: s(22),
        })
    }
}

/// 客户表: col1 客户代码
#[derive(Debug, Clone, Copy, Default)]
pub struct VendorSchema;

impl SheetSchema for VendorSchema {
    type Record = VendorClient;

    fn map_row(&self, row: &SheetRow, dates: &DateHeuristic) -> RowOutcome<VendorClient> {
        let code = coerce_string(row.cell(1));
        if code.is_empty() {
            return RowOutcome::Skip(SkipReason::MissingKey);
        }

        let s = |col| coerce_string(row.cell(col));
        let b = |col| coerce_bool(row.cell(col));
        // 日期列非必填: 解析失败留空
        let d = |col| dates.parse(row.cell(col)).date();
        RowOutcome::Record(VendorClient {
            id: None,
            classification: s(0),
            code,
            name_internal: s(2),
            name_original: s(3),
            representative: s(4),
            dob: d(5),
            business_number: s(6),
            phone: s(7),
            fax: s(8),
            zip: s(9),
            address: s(10),
            sales_rep: s(11),
            dept_head: s(12),
            price_apply: s(13),
            stock_apply: s(14),
            invoice_issue: b(15),
            business_type: s(16),
            item: s(17),
            client_type: s(18),
            client_group: s(19),
            contract_type: s(20),
            delivery_type: s(21),
            pharmacist: s(22),
            license_no: s(23),
            care_no: s(24),
            narcotics_id: s(25),
            device_client: s(26),
            contact: s(27),
            email: s(28),
            invoice_manager: s(29),
            manager_phone: s(30),
            credit_limit: coerce_number(row.cell(31)),
            max_turn_days: coerce_int(row.cell(32)),
            monthly_estimate: coerce_int(row.cell(33)),
            start_date: d(34),
            note1: s(35),
            note2: s(36),
            active: b(37),
            e_invoice: b(38),
            invoice_system: s(39),
            external_exclude: b(40),
            pre_payment: b(41),
        })
    }
}

/// 台账: col1 日期 (必填); 医院 id 来自请求参数
#[derive(Debug, Clone)]
pub struct LedgerSchema {
    pub hospital_id: String,
}

impl LedgerSchema {
    pub fn new(hospital_id: impl Into<String>) -> Self {
        Self {
            hospital_id: hospital_id.into(),
        }
    }
}

impl SheetSchema for LedgerSchema {
    type Record = LedgerEntry;

    fn map_row(&self, row: &SheetRow, dates: &DateHeuristic) -> RowOutcome<LedgerEntry> {
        let date_cell = row.cell(1);
        if date_cell.is_blank() {
            return RowOutcome::Skip(SkipReason::MissingKey);
        }
        let entry_date = match dates.parse(date_cell) {
            DateParse::Parsed(date) => date,
            DateParse::Skip => return RowOutcome::Skip(SkipReason::NonDataRow),
            DateParse::Fail => return RowOutcome::Skip(SkipReason::UnparsableDate),
        };

        RowOutcome::Record(LedgerEntry {
            id: None,
            hospital_id: self.hospital_id.clone(),
            entry_date,
            order_id: coerce_string(row.cell(2)),
            qty: coerce_int(row.cell(5)),
            unit_price: coerce_decimal(row.cell(7)),
            amount: coerce_decimal(row.cell(8)),
            remarks: coerce_string(row.cell(13)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bigdecimal::BigDecimal;
    use chrono::NaiveDate;

    fn row(cells: &[&str]) -> SheetRow {
        SheetRow::new(
            1,
            cells
                .iter()
                .map(|c| if c.is_empty() { Cell::Empty } else { Cell::text(*c) })
                .collect(),
        )
    }

    #[test]
    fn inventory_requires_numeric_sequence_and_code() {
        let dates = DateHeuristic::default();
        let full = row(&["7", "Acme", "Maker", "A-1", "Aspirin", "100T", "1,500"]);
        let RowOutcome::Record(item) = InventorySchema.map_row(&full, &dates) else {
            panic!("expected a record");
        };
        assert_eq!(item.sequence_no, 7);
        assert_eq!(item.code, "A-1");
        assert_eq!(item.base_price, 1500.0);
        assert_eq!(item.product_location, "");

        assert_eq!(
            InventorySchema.map_row(&row(&["", "Acme", "", "A-1"]), &dates),
            RowOutcome::Skip(SkipReason::MissingKey)
        );
        assert_eq!(
            InventorySchema.map_row(&row(&["합계", "", "", "A-1"]), &dates),
            RowOutcome::Skip(SkipReason::NonDataRow)
        );
        assert_eq!(
            InventorySchema.map_row(&row(&["8", "Acme", "", " "]), &dates),
            RowOutcome::Skip(SkipReason::MissingKey)
        );
    }

    #[test]
    fn vendor_dates_and_flags_are_lenient() {
        let dates = DateHeuristic::default();
        let mut cells = vec![""; 42];
        cells[1] = "V-01";
        cells[5] = "850412";
        cells[15] = "TRUE";
        cells[34] = "someday";
        cells[37] = "yes";
        let RowOutcome::Record(client) = VendorSchema.map_row(&row(&cells), &dates) else {
            panic!("expected a record");
        };
        assert_eq!(client.dob, NaiveDate::from_ymd_opt(2085, 4, 12));
        assert_eq!(client.start_date, None);
        assert!(client.invoice_issue);
        assert!(!client.active);
    }

    #[test]
    fn ledger_routes_date_outcomes() {
        let schema = LedgerSchema::new("H-9");
        let dates = DateHeuristic::default();

        let good = row(&["", "2024/03/05", "ORD-1", "", "", "3", "", "1,000", "3000"]);
        let RowOutcome::Record(entry) = schema.map_row(&good, &dates) else {
            panic!("expected a record");
        };
        assert_eq!(entry.hospital_id, "H-9");
        assert_eq!(entry.qty, 3);
        assert_eq!(entry.unit_price, BigDecimal::from(1000));

        assert_eq!(
            schema.map_row(&row(&["", "소계"]), &dates),
            RowOutcome::Skip(SkipReason::NonDataRow)
        );
        assert_eq!(
            schema.map_row(&row(&["", "03.05"]), &dates),
            RowOutcome::Skip(SkipReason::UnparsableDate)
        );
        assert_eq!(
            schema.map_row(&row(&["x", ""]), &dates),
            RowOutcome::Skip(SkipReason::MissingKey)
        );
    }
}
