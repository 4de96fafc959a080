use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use std::str::FromStr;

use super::dates::date_to_serial;

/// 表格单元格的原始取值
///
/// `Date` 是读取端按工作簿日期系统换算好的时间; 未标日期格式的序列号仍是 `Number`。
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// 数字转文本: 整数值不带小数部分 (1234.0 -> "1234")
fn render_number(n: f64) -> String {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

pub fn coerce_string(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => render_number(*n),
        Cell::Bool(b) => b.to_string(),
        Cell::Date(at) => at.format("%Y-%m-%d").to_string(),
    }
}

/// 文本去掉千分位后解析, 失败取 0.0
pub fn coerce_number(cell: &Cell) -> f64 {
    match cell {
        Cell::Number(n) => *n,
        Cell::Date(at) => date_to_serial(*at),
        Cell::Text(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            cleaned
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .unwrap_or(0.0)
        }
        Cell::Empty | Cell::Bool(_) => 0.0,
    }
}

/// 整数列: 截断小数, 超界饱和
pub fn coerce_int(cell: &Cell) -> i32 {
    coerce_number(cell) as i32
}

/// 金额列, 文本按原样精度解析
pub fn coerce_decimal(cell: &Cell) -> BigDecimal {
    let parsed = match cell {
        Cell::Text(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();
            BigDecimal::from_str(&cleaned).ok()
        }
        Cell::Number(n) if n.is_finite() => BigDecimal::from_str(&n.to_string()).ok(),
        _ => None,
    };
    parsed.unwrap_or_else(|| BigDecimal::from(0))
}

/// 只认 "true" (不区分大小写)
pub fn coerce_bool(cell: &Cell) -> bool {
    match cell {
        Cell::Bool(b) => *b,
        Cell::Text(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
