use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::sync::LazyLock;

use super::dates::expand_year;
use crate::models::ExtractedFields;

/// 可选括号前缀 + 韩文字符串 + 机构类型后缀
static ORGANIZATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\([^)]*\)\s*)?([가-힣]+(?:의원|병원|클리닉|정형외과|내과|이비인후과))")
        .expect("valid organization regex")
});
static FULL_YEAR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{4})[-/](\d{2})[-/](\d{2})").expect("valid date regex"));
static SHORT_YEAR_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{2})/(\d{2})/(\d{2})").expect("valid short date regex"));
static COMPACT_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\D)(\d{8})(?:\D|$)").expect("valid compact date regex"));

/// 文件名回退时去掉的扩展名
const KNOWN_EXTENSIONS: &[&str] = &["pdf"];

/// 机构名; 无匹配时回退到去扩展名的原文件名
pub fn extract_organization(text: &str, original_filename: &str) -> String {
    if let Some(caps) = ORGANIZATION.captures(text) {
        return caps[1].to_string();
    }

    let base = original_filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_filename);
    match base.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && KNOWN_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)) =>
        {
            stem.to_string()
        }
        _ => base.to_string(),
    }
}

/// 交易日期 (YYYYMMDD); 四位年份 -> 两位年份 -> 8 位紧凑日期, 均无时返回 None
pub fn extract_date(text: &str, century_pivot: Option<u8>) -> Option<String> {
    if let Some(caps) = FULL_YEAR_DATE.captures(text) {
        return Some(format!("{}{}{}", &caps[1], &caps[2], &caps[3]));
    }

    if let Some(caps) = SHORT_YEAR_DATE.captures(text) {
        let year = caps[1]
            .parse()
            .map(|yy| expand_year(yy, century_pivot))
            .unwrap_or(2000);
        return Some(format!("{}{}{}", year, &caps[2], &caps[3]));
    }

    COMPACT_DATE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .find(|token| NaiveDate::parse_from_str(token, "%Y%m%d").is_ok())
}

/// 字段提取器, 纯函数, 不访问文件或存储
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldExtractor {
    pub century_pivot: Option<u8>,
}

impl FieldExtractor {
    pub fn new(century_pivot: Option<u8>) -> Self {
        Self { century_pivot }
    }

    /// `fallback_millis` 为日期全部未命中时使用的接收时间戳
    pub fn extract_at(&self, text: &str, original_filename: &str, fallback_millis: i64) -> ExtractedFields {
        ExtractedFields {
            organization_name: extract_organization(text, original_filename),
            transaction_date: extract_date(text, self.century_pivot)
                .unwrap_or_else(|| fallback_millis.to_string()),
        }
    }

    pub fn extract(&self, text: &str, original_filename: &str) -> ExtractedFields {
        self.extract_at(text, original_filename, Utc::now().timestamp_millis())
    }
}

pub fn extract_fields(text: &str, original_filename: &str) -> ExtractedFields {
    FieldExtractor::default().extract(text, original_filename)
}

fn is_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-' || ('가'..='힣').contains(&c)
}

/// 文件名安全化: 只保留韩文音节、ASCII 字母数字、下划线与连字符
pub fn sanitize(name: &str) -> String {
    let cleaned: String = name.chars().filter(|c| is_allowed(*c)).collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

/// 输出文件名: 机构_日期[_唯一后缀].pdf
pub fn artifact_file_name(fields: &ExtractedFields, unique_suffix: Option<&str>) -> String {
    let mut name = format!(
        "{}_{}",
        sanitize(&fields.organization_name),
        sanitize(&fields.transaction_date)
    );
    if let Some(suffix) = unique_suffix {
        name.push('_');
        name.push_str(&sanitize(suffix));
    }
    name.push_str(".pdf");
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn organization_prefers_text_then_filename() {
        assert_eq!(
            extract_organization("거래명세서\n(주) 서울정형외과 귀하", "scan.pdf"),
            "서울정형외과"
        );
        assert_eq!(extract_organization("no suffix here", "report.pdf"), "report");
        assert_eq!(extract_organization("", "REPORT.PDF"), "REPORT");
        assert_eq!(extract_organization("", "notes.txt"), "notes.txt");
        assert_eq!(extract_organization("", "C:\\scans\\한빛의원.pdf"), "한빛의원");
    }

    #[test]
    fn date_fallback_chain() {
        assert_eq!(extract_date("발행일 2024-03-05", None).as_deref(), Some("20240305"));
        assert_eq!(extract_date("issued 2024/03/05", None).as_deref(), Some("20240305"));
        assert_eq!(extract_date("issued 24/03/05", None).as_deref(), Some("20240305"));
        assert_eq!(extract_date("issued 98/03/05", Some(50)).as_deref(), Some("19980305"));
        assert_eq!(extract_date("order no 20240305 total", None).as_deref(), Some("20240305"));
        // 9 位数字不是紧凑日期, 8 位无效日期也不算
        assert_eq!(extract_date("tel 020240305 / 20241340", None), None);
    }

    #[test]
    fn fields_always_resolve() {
        let extractor = FieldExtractor::default();
        let fields = extractor.extract_at("plain text", "report.pdf", 1_709_600_000_000);
        assert_eq!(fields.organization_name, "report");
        assert_eq!(fields.transaction_date, "1709600000000");

        let live = extract_fields("nothing", "x.pdf");
        assert!(!live.transaction_date.is_empty());
        assert!(live.transaction_date.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn sanitize_keeps_the_allow_list() {
        assert_eq!(sanitize("(주) 서울의원!"), "주서울의원");
        assert_eq!(sanitize("a b/c..d_e-f"), "abcd_e-f");
        assert_eq!(sanitize("***"), "unknown");

        let fields = ExtractedFields {
            organization_name: "한빛 의원".into(),
            transaction_date: "20240305".into(),
        };
        assert_eq!(artifact_file_name(&fields, None), "한빛의원_20240305.pdf");
        assert_eq!(artifact_file_name(&fields, Some("17")), "한빛의원_20240305_17.pdf");
    }
}
