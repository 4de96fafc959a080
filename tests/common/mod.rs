#![allow(dead_code)]

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use medsupply_intake::config::ImportConfig;
use medsupply_intake::{AppState, ImportService, InvoicePipeline, RecordStores};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// 生成 PDF: 每页若干行 ASCII 文本 (Courier, StandardEncoding)
pub fn pdf_bytes(pages: &[&[&str]]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });

    let mut kids = Vec::new();
    for lines in pages {
        let mut operations = Vec::new();
        for (i, line) in lines.iter().enumerate() {
            operations.push(Operation::new("BT", vec![]));
            operations.push(Operation::new("Tf", vec!["F1".into(), 12.into()]));
            operations.push(Operation::new("Td", vec![50.into(), (750 - 20 * i as i64).into()]));
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
            operations.push(Operation::new("ET", vec![]));
        }
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

pub fn page_count(path: &Path) -> usize {
    Document::load(path).unwrap().get_pages().len()
}

/// 生成 CSV 表格 (第一行为表头)
pub fn csv_bytes(rows: &[Vec<&str>]) -> Vec<u8> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in rows {
        writer.write_record(row).unwrap();
    }
    writer.into_inner().unwrap()
}

/// 按列位填充一行, 其余列为空
pub fn row_with(width: usize, cells: &[(usize, &'static str)]) -> Vec<&'static str> {
    let mut row = vec![""; width];
    for (col, value) in cells {
        row[*col] = *value;
    }
    row
}

pub struct Harness {
    pub dir: TempDir,
    pub stores: RecordStores,
    pub state: AppState,
}

impl Harness {
    pub fn upload_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn export_dir(&self) -> PathBuf {
        self.dir.path().join("exports")
    }
}

/// 内存存储 + 临时目录 + 3 页发票模板
pub fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let template_path = dir.path().join("template.pdf");
    std::fs::write(
        &template_path,
        pdf_bytes(&[&["TEMPLATE PAGE 1"], &["TEMPLATE PAGE 2"], &["TEMPLATE PAGE 3"]]),
    )
    .unwrap();

    let stores = RecordStores::memory();
    let state = AppState {
        imports: Arc::new(ImportService::new(
            stores.clone(),
            &ImportConfig::default(),
            dir.path().join("uploads"),
        )),
        invoices: Arc::new(InvoicePipeline::new(template_path, dir.path().join("exports"), None)),
    };
    Harness { dir, stores, state }
}
