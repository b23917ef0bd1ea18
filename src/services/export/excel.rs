//! Excel 导出

use std::borrow::Cow;

use rust_xlsxwriter::{Format, Workbook};
use tracing::{debug, warn};

use crate::error::ExportError;
use crate::models::Batch;

/// 判定列的列名
pub const VERDICT_COLUMN: &str = "Pass";

/// 工作表名称的最大长度
const MAX_SHEET_NAME_LEN: usize = 31;

/// 单元格字符数上限
pub const MAX_CELL_CHARS: usize = 32_767;

/// 导出为单个工作表的 xlsx
///
/// 第一行是表头，之后按原顺序写入每条记录；存在判定结果时追加一列
pub fn export_to_excel(batch: &Batch, sheet_title: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sanitize_sheet_name(sheet_title))?;

    let verdict_col = batch.header().len() as u16;
    for (col, name) in batch.header().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, fit_cell(name), &header_format)?;
        worksheet.set_column_width(col as u16, 28)?;
    }
    if batch.verdicts().is_some() {
        worksheet.write_string_with_format(0, verdict_col, VERDICT_COLUMN, &header_format)?;
    }

    for index in 0..batch.len() {
        let row = index as u32 + 1;
        for (col, value) in batch.row(index).unwrap_or_default().into_iter().enumerate() {
            worksheet.write_string(row, col as u16, fit_cell(value))?;
        }
        if let Some(&verdict) = batch.verdicts().and_then(|v| v.get(index)) {
            worksheet.write_boolean(row, verdict_col, verdict)?;
        }
    }

    let buffer = workbook.save_to_buffer()?;
    debug!("Excel 导出完成: {} 行, {} 字节", batch.len() + 1, buffer.len());
    Ok(buffer)
}

/// 超长的值按字符截断到单元格上限
fn fit_cell(value: &str) -> Cow<'_, str> {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!("单元格内容过长，已截断: {} 字符", value.chars().count());
            Cow::Owned(value[..cut].to_string())
        }
        None => Cow::Borrowed(value),
    }
}

/// 清理 Excel 不允许的工作表名称字符
pub fn sanitize_sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| !matches!(c, '[' | ']' | ':' | '*' | '?' | '/' | '\\'))
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim();

    if cleaned.is_empty() {
        "TestCases".to_string()
    } else {
        cleaned.to_string()
    }
}
