//! 导出 - 业务能力层
//!
//! 把一批用例序列化为内存中的文件，不落盘

pub mod excel;
pub mod pdf;

pub use excel::export_to_excel;
pub use pdf::export_to_pdf;

/// Excel 的 MIME 类型
pub const EXCEL_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
/// PDF 的 MIME 类型
pub const PDF_MIME: &str = "application/pdf";
/// PDF 导出的文件名
pub const PDF_FILE_NAME: &str = "test_cases.pdf";
