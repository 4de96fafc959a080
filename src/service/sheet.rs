use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

use super::coerce::Cell;
use crate::error::ImportError;

/// 一行单元格; `index` 为工作表内的绝对行号 (0 起)
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRow {
    pub index: usize,
    pub cells: Vec<Cell>,
}

static EMPTY: Cell = Cell::Empty;

impl SheetRow {
    pub fn new(index: usize, cells: Vec<Cell>) -> Self {
        Self { index, cells }
    }

    /// 越界列视为空单元格
    pub fn cell(&self, column: usize) -> &Cell {
        self.cells.get(column).unwrap_or(&EMPTY)
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Cell::is_blank)
    }
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Float(f) => Cell::Number(*f),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        // 换算交给 calamine, 它知道工作簿是否为 1904 日期系统
        Data::DateTime(dt) => dt.as_datetime().map(Cell::Date).unwrap_or(Cell::Number(dt.as_f64())),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// 读取第一个工作表的全部行 (含表头)
///
/// `.csv` 走 csv 解析 (全部为文本单元格), 其余扩展名交给 calamine 识别。
pub fn read_sheet(path: &Path) -> Result<Vec<SheetRow>, ImportError> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));

    if is_csv {
        read_csv(path)
    } else {
        read_workbook(path)
    }
}

fn read_workbook(path: &Path) -> Result<Vec<SheetRow>, ImportError> {
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ImportError::FileUnreadable(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ImportError::FileUnreadable("workbook has no sheets".to_string()))?
        .map_err(|e| ImportError::FileUnreadable(e.to_string()))?;

    let Some((first_row, first_col)) = range.start() else {
        return Ok(Vec::new());
    };

    let rows = range
        .rows()
        .enumerate()
        .map(|(offset, row)| {
            let mut cells = vec![Cell::Empty; first_col as usize];
            cells.extend(row.iter().map(cell_from_data));
            SheetRow::new(first_row as usize + offset, cells)
        })
        .collect();
    Ok(rows)
}

fn read_csv(path: &Path) -> Result<Vec<SheetRow>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ImportError::FileUnreadable(e.to_string()))?;

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record.map_err(csv_error)?;
        let cells = record
            .iter()
            .map(|field| if field.is_empty() { Cell::Empty } else { Cell::text(field) })
            .collect();
        rows.push(SheetRow::new(index, cells));
    }
    Ok(rows)
}

/// 非 UTF-8 (常见于另存为 CP949 的 CSV) 单独给出可操作的提示
fn csv_error(error: csv::Error) -> ImportError {
    match error.kind() {
        csv::ErrorKind::Utf8 { pos, .. } => {
            let line = pos.as_ref().map_or(0, |p| p.line());
            ImportError::FileUnreadable(format!(
                "csv is not valid UTF-8 (line {line}); re-save it as \"CSV UTF-8\" or upload the .xlsx"
            ))
        }
        _ => ImportError::FileUnreadable(error.to_string()),
    }
}
