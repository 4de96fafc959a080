use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// 暂存上传文件; 返回值析构时删除文件 (成功、跳过、出错都一样)
///
/// 保留原扩展名, 表格读取依赖扩展名判断容器格式。
pub fn stage(upload_dir: &Path, original_name: &str, bytes: &[u8]) -> io::Result<NamedTempFile> {
    std::fs::create_dir_all(upload_dir)?;

    let suffix = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default();

    let mut file = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(upload_dir)?;
    file.write_all(bytes)?;
    file.flush()?;
    tracing::debug!("暂存上传文件 {} -> {:?}", original_name, file.path());
    Ok(file)
}
