//! PDF 导出
//!
//! US Letter 版面，每条记录最多写 6 行，纵向空间不足时换页

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tracing::debug;

use crate::error::ExportError;
use crate::models::{Batch, TestCase};
use crate::utils::truncate_text;

const PAGE_WIDTH: i64 = 612;
const PAGE_HEIGHT: i64 = 792;
const LEFT_MARGIN: i64 = 30;
const TOP_OFFSET: i64 = 40;
const BOTTOM_LIMIT: i64 = 50;
const LINE_STEP: i64 = 15;
const RECORD_GAP: i64 = 15;
const TITLE_GAP: i64 = 30;
const MAX_LINES_PER_RECORD: usize = 6;
const MAX_LINE_CHARS: usize = 110;

/// 合并到首行显示的字段
const SUMMARY_FIELDS: [&str; 3] = ["ID", "Module", "Priority"];

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// 导出为分页 PDF
pub fn export_to_pdf(batch: &Batch) -> Result<Vec<u8>, ExportError> {
    let mut layout = PageLayout::new();
    layout.title("Generated Test Cases");

    for (index, record) in batch.records().iter().enumerate() {
        let verdict = batch.verdicts().and_then(|v| v.get(index)).copied();
        let lines = record_lines(batch.header(), record, verdict);
        layout.record(&lines);
    }

    let pages = layout.finish();
    debug!("PDF 排版完成: {} 页", pages.len());
    render(pages)
}

/// 生成单条记录要写的文本行
pub fn record_lines(header: &[String], record: &TestCase, verdict: Option<bool>) -> Vec<String> {
    let summary: Vec<String> = SUMMARY_FIELDS
        .iter()
        .filter(|field| header.iter().any(|h| h == *field))
        .map(|field| format!("{}: {}", field, record.get(field).unwrap_or_default()))
        .collect();

    let mut lines = Vec::new();
    if !summary.is_empty() {
        lines.push(summary.join(", "));
    }
    lines.extend(
        header
            .iter()
            .filter(|name| !SUMMARY_FIELDS.contains(&name.as_str()))
            .map(|name| format!("{}: {}", name, record.get(name).unwrap_or_default())),
    );
    lines.truncate(MAX_LINES_PER_RECORD);

    if let (Some(first), Some(verdict)) = (lines.first_mut(), verdict) {
        first.push_str(if verdict { " [PASS]" } else { " [FAIL]" });
    }

    lines
        .into_iter()
        .map(|line| truncate_text(&line.replace(['\r', '\n'], " "), MAX_LINE_CHARS))
        .collect()
}

/// 纵向排版状态
struct PageLayout {
    pages: Vec<Vec<Operation>>,
    current: Vec<Operation>,
    y: i64,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: Vec::new(),
            y: PAGE_HEIGHT - TOP_OFFSET,
        }
    }

    fn title(&mut self, text: &str) {
        self.text(BOLD_FONT, 14, text);
        self.y -= TITLE_GAP;
    }

    fn record(&mut self, lines: &[String]) {
        let needed = lines.len() as i64 * LINE_STEP;
        if self.y - needed < BOTTOM_LIMIT && !self.current.is_empty() {
            self.new_page();
        }
        for line in lines {
            self.text(REGULAR_FONT, 10, line);
            self.y -= LINE_STEP;
        }
        self.y -= RECORD_GAP;
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.y = PAGE_HEIGHT - TOP_OFFSET;
    }

    fn text(&mut self, font: &str, size: i64, text: &str) {
        self.current.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
            ),
            Operation::new(
                "Td",
                vec![Object::Integer(LEFT_MARGIN), Object::Integer(self.y)],
            ),
            Operation::new("Tj", vec![Object::string_literal(to_latin1(text))]),
            Operation::new("ET", vec![]),
        ]);
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.pages.push(self.current);
        }
        self.pages
    }
}

/// 标准字体只支持单字节编码，其余字符替换为 `?`
fn to_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn render(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations }
            .encode()
            .map_err(|e| ExportError::Document(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Document(e.to_string()))?;
    Ok(buffer)
}
