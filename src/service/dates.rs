use chrono::{Days, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use super::coerce::Cell;
use crate::config::ImportConfig;

static SEPARATED_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})([-/])(\d{1,2})([-/])(\d{1,2})(?:[ T].*)?$").expect("valid date regex")
});
static COMPACT_SHORT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2})(\d{2})(\d{2})$").expect("valid yymmdd regex"));

/// 日期解析的三态结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateParse {
    Parsed(NaiveDate),
    /// 非数据行 (小计、结转), 整行丢弃但不计错误
    Skip,
    Fail,
}

impl DateParse {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateParse::Parsed(d) => Some(d),
            _ => None,
        }
    }
}

/// 两位年份补全世纪
pub fn expand_year(yy: u32, century_pivot: Option<u8>) -> i32 {
    match century_pivot {
        Some(pivot) if yy > u32::from(pivot) => 1900 + yy as i32,
        _ => 2000 + yy as i32,
    }
}

/// 1900 日期系统序列号转日期
///
/// 序列号 1 = 1900-01-01; 60 是不存在的 1900-02-29, 按 1900-02-28 处理。
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 {
        return None;
    }
    let days = serial.floor() as u64;
    match days {
        1..=59 => NaiveDate::from_ymd_opt(1899, 12, 31)?.checked_add_days(Days::new(days)),
        60 => NaiveDate::from_ymd_opt(1900, 2, 28),
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(days)),
    }
}

/// 时间换回 1900 日期系统序列号 (1900-03-01 之前不保证与 Excel 一致)
pub fn date_to_serial(at: NaiveDateTime) -> f64 {
    NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|epoch| epoch.and_hms_opt(0, 0, 0))
        .map_or(0.0, |epoch| (at - epoch).num_seconds() as f64 / 86_400.0)
}

/// 日期启发式解析器
#[derive(Debug, Clone)]
pub struct DateHeuristic {
    non_data_markers: Vec<String>,
    century_pivot: Option<u8>,
}

impl DateHeuristic {
    pub fn new(non_data_markers: Vec<String>, century_pivot: Option<u8>) -> Self {
        Self {
            non_data_markers,
            century_pivot,
        }
    }

    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(config.non_data_markers.clone(), config.century_pivot)
    }

    pub fn parse(&self, cell: &Cell) -> DateParse {
        match cell {
            Cell::Date(at) => DateParse::Parsed(at.date()),
            Cell::Number(serial) => excel_serial_to_date(*serial)
                .map(DateParse::Parsed)
                .unwrap_or(DateParse::Fail),
            Cell::Text(text) => self.parse_str(text),
            Cell::Empty | Cell::Bool(_) => DateParse::Fail,
        }
    }

    pub fn parse_str(&self, raw: &str) -> DateParse {
        let text = raw.trim();
        if text.is_empty() {
            return DateParse::Fail;
        }

        if let Some(caps) = SEPARATED_DATE.captures(text) {
            // 两个分隔符必须一致
            if caps[2] != caps[4] {
                return DateParse::Fail;
            }
            return ymd(caps[1].parse().ok(), caps[3].parse().ok(), caps[5].parse().ok());
        }

        if let Some(caps) = COMPACT_SHORT_DATE.captures(text) {
            let year = caps[1].parse().ok().map(|yy| expand_year(yy, self.century_pivot));
            return ymd(year, caps[2].parse().ok(), caps[3].parse().ok());
        }

        if self
            .non_data_markers
            .iter()
            .any(|marker| !marker.is_empty() && text.contains(marker.as_str()))
        {
            return DateParse::Skip;
        }

        DateParse::Fail
    }
}

impl Default for DateHeuristic {
    fn default() -> Self {
        Self::from_config(&ImportConfig::default())
    }
}

fn ymd(year: Option<i32>, month: Option<u32>, day: Option<u32>) -> DateParse {
    match (year, month, day) {
        (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y, m, d)
            .map(DateParse::Parsed)
            .unwrap_or(DateParse::Fail),
        _ => DateParse::Fail,
    }
}
