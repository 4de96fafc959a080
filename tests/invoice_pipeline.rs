mod common;

use common::{harness, page_count, pdf_bytes};
use medsupply_intake::service::InvoiceUpload;
use medsupply_intake::ImportError;

#[tokio::test]
async fn single_upload_is_bounded_by_content_pages() {
    let h = harness();
    let content = pdf_bytes(&[&["ORDER SHEET", "Issued 2024-03-05", "ORDER SHEET", "Total 3,000"]]);

    let processed = h
        .state
        .invoices
        .process_single(InvoiceUpload::new("report.pdf", content))
        .await
        .unwrap();

    assert_eq!(processed.fields.organization_name, "report");
    assert_eq!(processed.fields.transaction_date, "20240305");
    assert_eq!(processed.file_name, "report_20240305.pdf");
    assert_eq!(processed.artifact_url, "/exports/report_20240305.pdf");
    assert_eq!(processed.parsed_text, "ORDER SHEET\nIssued 2024-03-05\nTotal 3,000");

    let output = h.export_dir().join(&processed.file_name);
    assert!(output.exists());
    // 模板 3 页, 内容 1 页
    assert_eq!(page_count(&output), 1);
}

#[tokio::test]
async fn text_without_dates_falls_back_to_a_timestamp() {
    let h = harness();
    let content = pdf_bytes(&[&["no dates anywhere"], &["page two"]]);

    let processed = h
        .state
        .invoices
        .process_single(InvoiceUpload::new("scan 01.PDF", content))
        .await
        .unwrap();

    assert_eq!(processed.fields.organization_name, "scan 01");
    assert!(processed.fields.transaction_date.chars().all(|c| c.is_ascii_digit()));
    assert!(processed.file_name.starts_with("scan01_"));
    assert_eq!(page_count(&h.export_dir().join(&processed.file_name)), 2);
}

#[tokio::test]
async fn batch_skips_unreadable_files_and_continues() {
    let h = harness();
    let uploads = vec![
        InvoiceUpload::new("first.pdf", pdf_bytes(&[&["Order 2024/01/02"]])),
        InvoiceUpload::new("broken.pdf", b"not a pdf".to_vec()),
        InvoiceUpload::new("third.pdf", pdf_bytes(&[&["Order 24/02/03"]])),
    ];

    let batch = h.state.invoices.process_batch(uploads).await;

    let names: Vec<_> = batch.processed.iter().map(|p| p.original_name.as_str()).collect();
    assert_eq!(names, vec!["first.pdf", "third.pdf"]);
    assert_eq!(batch.failed.len(), 1);
    assert_eq!(batch.failed[0].original_name, "broken.pdf");

    assert_eq!(batch.processed[0].fields.transaction_date, "20240102");
    assert_eq!(batch.processed[1].fields.transaction_date, "20240203");
    // 批量模式带唯一后缀
    assert!(batch.processed[0].file_name.starts_with("first_20240102_"));
    for processed in &batch.processed {
        assert!(h.export_dir().join(&processed.file_name).exists());
    }
}

#[tokio::test]
async fn unreadable_single_upload_is_a_client_error() {
    let h = harness();
    let err = h
        .state
        .invoices
        .process_single(InvoiceUpload::new("x.pdf", b"garbage".to_vec()))
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Document(_)));
    assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
}
