use serde::{Deserialize, Serialize};

/// 从发票文本中提取的字段, 两者总有值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFields {
    pub organization_name: String,
    /// 8 位日期串 (YYYYMMDD) 或毫秒时间戳
    pub transaction_date: String,
}

/// 单个发票处理结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedInvoice {
    pub original_name: String,
    pub file_name: String,
    pub artifact_url: String,
    pub parsed_text: String,
    pub fields: ExtractedFields,
}

/// 批量上传中失败的文件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedInvoice {
    pub original_name: String,
    pub detail: String,
}

/// 批量上传汇总
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceBatch {
    pub processed: Vec<ProcessedInvoice>,
    pub failed: Vec<FailedInvoice>,
}
