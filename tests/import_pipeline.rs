mod common;

use common::{csv_bytes, harness, row_with, Harness};
use medsupply_intake::models::{KeyValue, SkipReason};
use medsupply_intake::service::LedgerParams;
use medsupply_intake::ImportError;

fn inventory_sheet(name: &'static str, stock: &'static str) -> Vec<u8> {
    csv_bytes(&[
        row_with(23, &[(0, "No"), (1, "입고처"), (3, "코드"), (4, "품명")]),
        row_with(23, &[(0, "1"), (1, "Acme"), (3, "A-100"), (4, name), (14, stock)]),
        row_with(23, &[(0, "2"), (1, "Acme"), (3, "B-200"), (4, "Bandage"), (6, "1,250")]),
    ])
}

fn vendor_sheet(phone: &'static str) -> Vec<u8> {
    csv_bytes(&[
        row_with(42, &[(0, "구분"), (1, "코드")]),
        row_with(
            42,
            &[
                (1, "V-01"),
                (2, "한빛의원"),
                (5, "850412"),
                (7, phone),
                (15, "TRUE"),
                (31, "1,000,000"),
                (32, "30"),
                (34, "2024-03-05"),
                (37, "true"),
            ],
        ),
        row_with(42, &[(0, "no code here"), (2, "orphan")]),
    ])
}

fn ledger_sheet() -> Vec<u8> {
    csv_bytes(&[
        row_with(14, &[(1, "일자"), (2, "주문번호")]),
        row_with(14, &[(1, "2024-03-05"), (2, "ORD-1"), (5, "3"), (7, "1,000"), (8, "3,000")]),
        row_with(14, &[(1, "2024/03/06"), (2, "ORD-2"), (5, "1"), (7, "500"), (8, "500"), (13, "반품")]),
        row_with(14, &[(1, "소계"), (8, "3,500")]),
        row_with(14, &[(1, "someday"), (2, "ORD-3")]),
    ])
}

fn upload_dir_is_empty(h: &Harness) -> bool {
    std::fs::read_dir(h.upload_dir())
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(true)
}

#[tokio::test]
async fn inventory_reimport_updates_in_place() {
    let h = harness();

    let first = h
        .state
        .imports
        .import_inventory("stock.csv", inventory_sheet("Aspirin", "10"))
        .await
        .unwrap();
    assert_eq!(first.committed_count, 2);
    assert_eq!(first.created, 2);
    assert!(first.skipped.is_empty());

    let second = h
        .state
        .imports
        .import_inventory("stock.csv", inventory_sheet("Aspirin Plus", "12"))
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 2);

    assert_eq!(h.stores.inventory.count().await.unwrap(), 2);
    let item = h
        .stores
        .inventory
        .find_by_key("code", &KeyValue::Text("A-100".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(item.name, "Aspirin Plus");
    assert_eq!(item.stock_qty, 12.0);
    assert_eq!(item.sequence_no, 1);
    assert!(upload_dir_is_empty(&h));
}

#[tokio::test]
async fn vendor_reimport_keeps_one_record_per_code() {
    let h = harness();

    let report = h
        .state
        .imports
        .import_vendors("clients.csv", vendor_sheet("02-111-2222"))
        .await
        .unwrap();
    assert_eq!(report.committed_count, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row_index, 2);
    assert_eq!(report.skipped[0].reason, SkipReason::MissingKey);

    h.state
        .imports
        .import_vendors("clients.csv", vendor_sheet("02-333-4444"))
        .await
        .unwrap();

    assert_eq!(h.stores.vendors.count().await.unwrap(), 1);
    let client = h
        .stores
        .vendors
        .find_by_key("code", &KeyValue::Text("V-01".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(client.phone, "02-333-4444");
    assert_eq!(client.name_internal, "한빛의원");
    assert_eq!(client.credit_limit, 1_000_000.0);
    assert_eq!(client.max_turn_days, 30);
    assert!(client.invoice_issue);
    assert!(client.active);
    assert!(!client.e_invoice);
    assert_eq!(client.start_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 5));
    assert_eq!(client.dob, chrono::NaiveDate::from_ymd_opt(2085, 4, 12));
}

#[tokio::test]
async fn ledger_reimport_appends_every_time() {
    let h = harness();
    let params = LedgerParams::parse(Some("H-001"), Some("2024-03-01"), Some("2024-03-31")).unwrap();

    let report = h
        .state
        .imports
        .import_ledger("ledger.csv", ledger_sheet(), &params)
        .await
        .unwrap();
    assert_eq!(report.committed_count, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.skipped[0].reason, SkipReason::NonDataRow);
    assert_eq!(report.skipped[1].reason, SkipReason::UnparsableDate);
    assert_eq!(report.error_count(), 1);

    h.state
        .imports
        .import_ledger("ledger.csv", ledger_sheet(), &params)
        .await
        .unwrap();
    assert_eq!(h.stores.ledger.count().await.unwrap(), 4);
}

// 工作表首行为空, 序号与金额为数值单元格, 第二行的代码是数值 880123
#[tokio::test]
async fn inventory_workbook_with_typed_cells() {
    let h = harness();
    let bytes = include_bytes!("fixtures/inventory.xlsx").to_vec();

    let report = h.state.imports.import_inventory("stock.xlsx", bytes).await.unwrap();
    assert_eq!(report.committed_count, 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].row_index, 3);
    assert_eq!(report.skipped[0].reason, SkipReason::NonDataRow);

    let aspirin = h
        .stores
        .inventory
        .find_by_key("code", &KeyValue::Text("A-100".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(aspirin.sequence_no, 1);
    assert_eq!(aspirin.base_price, 1250.5);
    assert_eq!(aspirin.stock_qty, 10.0);

    let bandage = h
        .stores
        .inventory
        .find_by_key("code", &KeyValue::Text("880123".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bandage.sequence_no, 2);
    assert_eq!(bandage.name, "Bandage");
    assert!(upload_dir_is_empty(&h));
}

// 分类列 (第 0 列) 为空, 数据区从 B 列开始; 日期为日期格式单元格, 布尔为布尔单元格
#[tokio::test]
async fn vendor_workbook_with_date_and_bool_cells() {
    let h = harness();
    let bytes = include_bytes!("fixtures/vendors.xlsx").to_vec();

    let report = h.state.imports.import_vendors("clients.xlsx", bytes).await.unwrap();
    assert_eq!(report.committed_count, 1);
    assert!(report.skipped.is_empty());

    let client = h
        .stores
        .vendors
        .find_by_key("code", &KeyValue::Text("V-01".into()))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(client.classification, "");
    assert_eq!(client.name_internal, "한빛의원");
    assert_eq!(client.phone, "02-111-2222");
    assert_eq!(client.dob, chrono::NaiveDate::from_ymd_opt(1985, 4, 12));
    assert_eq!(client.start_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 5));
    assert!(client.invoice_issue);
    assert!(client.active);
    assert!(!client.e_invoice);
    assert_eq!(client.credit_limit, 1_000_000.0);
    assert_eq!(client.max_turn_days, 30);
}

// 1904 日期系统的工作簿: 序列号 43894 即 2024-03-05
#[tokio::test]
async fn ledger_workbook_on_the_1904_date_system() {
    let h = harness();
    let params = LedgerParams::parse(Some("H-001"), None, None).unwrap();
    let bytes = include_bytes!("fixtures/ledger_1904.xlsx").to_vec();

    let report = h
        .state
        .imports
        .import_ledger("ledger.xlsx", bytes, &params)
        .await
        .unwrap();
    assert_eq!(report.committed_count, 2);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!((report.skipped[0].row_index, report.skipped[0].reason), (3, SkipReason::NonDataRow));
    assert_eq!((report.skipped[1].row_index, report.skipped[1].reason), (4, SkipReason::UnparsableDate));

    let mut entries = Vec::new();
    for id in 1..=2 {
        entries.push(h.stores.ledger.find_by_id(id).await.unwrap().unwrap());
    }
    entries.sort_by(|a, b| a.order_id.cmp(&b.order_id));
    assert_eq!(entries[0].entry_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
    assert_eq!(entries[0].qty, 3);
    assert_eq!(entries[1].entry_date, chrono::NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
    assert_eq!(entries[1].remarks, "반품");
}

#[tokio::test]
async fn unreadable_container_aborts_and_cleans_up() {
    let h = harness();

    let err = h
        .state
        .imports
        .import_inventory("stock.xlsx", b"PK\x03\x04 truncated".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::FileUnreadable(_)));
    assert_eq!(h.stores.inventory.count().await.unwrap(), 0);
    assert!(upload_dir_is_empty(&h));
}

#[tokio::test]
async fn concurrent_imports_of_one_sheet_do_not_duplicate() {
    let h = harness();
    let imports = h.state.imports.clone();
    let other = h.state.imports.clone();

    let (a, b) = tokio::join!(
        imports.import_inventory("a.csv", inventory_sheet("Aspirin", "1")),
        other.import_inventory("b.csv", inventory_sheet("Aspirin", "2")),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(h.stores.inventory.count().await.unwrap(), 2);
}
