use serde::{Deserialize, Serialize};

/// 行被跳过的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// 必填键列为空
    MissingKey,
    /// 必填日期无法解析
    UnparsableDate,
    /// 小计 / 结转等非数据行
    NonDataRow,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedRow {
    pub row_index: usize,
    pub reason: SkipReason,
}

/// 一次表格导入的结果清单
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub committed_count: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    pub fn skip(&mut self, row_index: usize, reason: SkipReason) {
        self.skipped.push(SkippedRow { row_index, reason });
    }

    /// 计入错误的跳过数 (非数据行不算错误)
    pub fn error_count(&self) -> usize {
        self.skipped
            .iter()
            .filter(|s| s.reason != SkipReason::NonDataRow)
            .count()
    }
}
