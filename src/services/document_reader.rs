//! 需求文档读取 - 业务能力层
//!
//! 从上传的 PDF 中逐页提取文本

use lopdf::Document;
use tracing::{debug, info};

use crate::error::DocumentError;

/// 提取 PDF 中的全部文本
///
/// 每页文本后追加换行，没有可提取文本的页面直接跳过
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let document =
        Document::load_mem(bytes).map_err(|e| DocumentError::Unreadable(e.to_string()))?;

    let pages = document.get_pages();
    let mut text = String::new();

    for page_number in pages.keys() {
        match document.extract_text(&[*page_number]) {
            Ok(page_text) if !page_text.trim().is_empty() => {
                text.push_str(page_text.trim_end());
                text.push('\n');
            }
            Ok(_) => debug!("第 {} 页没有文本", page_number),
            Err(e) => debug!("第 {} 页提取失败: {}", page_number, e),
        }
    }

    if text.trim().is_empty() {
        return Err(DocumentError::NoText);
    }

    info!("📄 PDF 共 {} 页，提取 {} 个字符", pages.len(), text.chars().count());
    Ok(text)
}
