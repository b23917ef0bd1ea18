//! 响应解析 - 业务能力层
//!
//! 把模型返回的自由文本转换为表头加有序记录。
//! 支持两种形态：竖线分隔的 markdown 表格、代码块包裹的 JSON 数组。
//! 纯文本变换，不做任何 I/O，也从不向调用方抛错。

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::models::{Batch, ResponseShape, TestCase};
use crate::utils::truncate_text;

/// 解析结果
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    /// 得到了规整的表格
    Parsed(Batch),
    /// 没有任何有效行，调用方应直接展示原文
    Unparsed { raw_text: String },
}

impl ParseOutcome {
    pub fn batch(&self) -> Option<&Batch> {
        match self {
            ParseOutcome::Parsed(batch) => Some(batch),
            ParseOutcome::Unparsed { .. } => None,
        }
    }
}

/// 按要求的形态解析模型输出
///
/// `expected_columns` 仅用于 JSON 解析失败时构造兜底记录
pub fn parse_response(text: &str, shape: ResponseShape, expected_columns: &[&str]) -> ParseOutcome {
    let outcome = match shape {
        ResponseShape::MarkdownTable => parse_markdown_table(text),
        ResponseShape::JsonArray => parse_json_array(text, expected_columns),
    };

    match &outcome {
        ParseOutcome::Parsed(batch) => {
            debug!("解析完成: {} 列, {} 条记录", batch.header().len(), batch.len());
        }
        ParseOutcome::Unparsed { raw_text } => {
            warn!("未能解析出表格，原文: {}", truncate_text(raw_text, 80));
        }
    }
    outcome
}

// ========== markdown 表格 ==========

/// 解析竖线分隔的表格
///
/// 第一条非分隔行作为表头，列数与表头不一致的行直接丢弃。
/// 重复的列名依次加上 ` (2)`、` (3)` 后缀
pub fn parse_markdown_table(text: &str) -> ParseOutcome {
    let mut rows = text
        .lines()
        .filter(|line| line.contains('|'))
        .filter(|line| !is_separator_row(line))
        .map(split_row);

    let Some(header) = rows.next().map(unique_header) else {
        return unparsed(text);
    };

    let mut records = Vec::new();
    for cells in rows {
        if cells.len() != header.len() {
            debug!("丢弃列数不匹配的行: {} != {}", cells.len(), header.len());
            continue;
        }
        records.push(header.iter().cloned().zip(cells).collect::<TestCase>());
    }

    if records.is_empty() {
        return unparsed(text);
    }
    ParseOutcome::Parsed(Batch::new(header, records))
}

fn is_separator_row(line: &str) -> bool {
    line.chars()
        .all(|c| matches!(c, '-' | ':' | '|') || c.is_whitespace())
}

fn unique_header(names: Vec<String>) -> Vec<String> {
    let mut header: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let mut candidate = name.clone();
        let mut n = 1;
        while header.contains(&candidate) {
            n += 1;
            candidate = format!("{} ({})", name, n);
        }
        header.push(candidate);
    }
    header
}

fn split_row(line: &str) -> Vec<String> {
    let mut cells: Vec<String> = line.split('|').map(|cell| cell.trim().to_string()).collect();
    if cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
    if cells.first().is_some_and(|cell| cell.is_empty()) {
        cells.remove(0);
    }
    cells
}

// ========== JSON 数组 ==========

fn fence_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^```json|^```|```$").expect("valid fence regex"))
}

fn array_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("valid array regex"))
}

/// 解析代码块中的 JSON 数组
///
/// 解析失败时返回一条标记错误的兜底记录
pub fn parse_json_array(text: &str, expected_columns: &[&str]) -> ParseOutcome {
    let cleaned = fence_regex().replace_all(text, "").trim().to_string();
    let json_str = array_regex()
        .find(&cleaned)
        .map(|m| m.as_str())
        .unwrap_or(&cleaned);

    let records = match serde_json::from_str::<JsonValue>(json_str) {
        Ok(JsonValue::Array(items)) => items
            .into_iter()
            .map(object_to_record)
            .collect::<Option<Vec<_>>>(),
        Ok(_) => None,
        Err(e) => {
            warn!("JSON 解析失败: {}", e);
            None
        }
    };

    let Some(records) = records else {
        return ParseOutcome::Parsed(error_batch(expected_columns, &cleaned));
    };
    if records.is_empty() {
        return unparsed(text);
    }

    let mut header: Vec<String> = Vec::new();
    for record in &records {
        for name in record.field_names() {
            if !header.iter().any(|h| h == name) {
                header.push(name.to_string());
            }
        }
    }
    ParseOutcome::Parsed(Batch::new(header, records))
}

fn object_to_record(item: JsonValue) -> Option<TestCase> {
    match item {
        JsonValue::Object(map) => Some(
            map.into_iter()
                .map(|(key, value)| (key, value_to_text(value)))
                .collect(),
        ),
        _ => None,
    }
}

fn value_to_text(value: JsonValue) -> String {
    match value {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s,
        JsonValue::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// 构造解析失败时的兜底记录
fn error_batch(expected_columns: &[&str], raw_text: &str) -> Batch {
    // 少于两列时原文没有位置可放，改用 ID / Description
    let columns: Vec<String> = if expected_columns.len() < 2 {
        vec!["ID".to_string(), "Description".to_string()]
    } else {
        expected_columns.iter().map(|c| c.to_string()).collect()
    };

    let description_column = columns
        .iter()
        .position(|c| c.contains("Description"))
        .unwrap_or(columns.len() - 1);

    let record: TestCase = columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let value = if idx == 0 {
                "ERR-1"
            } else if idx == description_column {
                raw_text
            } else if name == "Module" {
                "Parsing"
            } else if name == "Title" {
                "Error parsing response"
            } else {
                "N/A"
            };
            (name.clone(), value.to_string())
        })
        .collect();

    Batch::new(columns, vec![record])
}

fn unparsed(text: &str) -> ParseOutcome {
    ParseOutcome::Unparsed {
        raw_text: text.trim().to_string(),
    }
}
