use indexmap::IndexSet;
use lopdf::Document;

use crate::error::DocumentError;

/// 行去重: 去首尾空白、丢弃空行, 保留首次出现的顺序
pub fn normalize_lines<'a, I>(lines: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let unique: IndexSet<&str> = lines
        .into_iter()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    unique.into_iter().collect::<Vec<_>>().join("\n")
}

pub fn normalize_text(text: &str) -> String {
    normalize_lines(text.lines())
}

/// 按页序提取文本, 每页一个字符串
///
/// 单页提取失败只记日志并按空页处理, 不影响其他页。
pub fn extract_pages(doc: &Document) -> Result<Vec<String>, DocumentError> {
    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(DocumentError::NoPages);
    }

    let texts = pages
        .keys()
        .map(|&page_no| match doc.extract_text(&[page_no]) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("第 {} 页文本提取失败: {}", page_no, e);
                String::new()
            }
        })
        .collect();
    Ok(texts)
}

/// 文档文本规范化: 全部页的行合并后去重
pub fn normalize_document(doc: &Document) -> Result<String, DocumentError> {
    let pages = extract_pages(doc)?;
    Ok(normalize_lines(pages.iter().flat_map(|page| page.lines())))
}
