//! 页面渲染
//!
//! 单页表单加结果区域，全部由服务端拼接 HTML

use std::fmt::Write;

use crate::models::{
    Batch, GenerationRequest, ModelVariant, TestCaseCategory, DEFAULT_CASE_COUNT, MAX_CASE_COUNT,
    MIN_CASE_COUNT,
};
use crate::workflow::{Generation, Session};

/// 无法解析时的提示
pub const RAW_TEXT_WARNING: &str = "⚠️ Could not format table, displaying raw text.";

/// 页面顶部的提示条
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Warning(String),
    Error(String),
}

impl Notice {
    fn css_class(&self) -> &'static str {
        match self {
            Notice::Success(_) => "notice success",
            Notice::Warning(_) => "notice warning",
            Notice::Error(_) => "notice error",
        }
    }

    fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Warning(text) | Notice::Error(text) => text,
        }
    }
}

/// 渲染完整页面
pub fn render_page(session: &Session, notices: &[Notice]) -> String {
    let mut body = String::new();
    body.push_str(HEADER_HTML);
    render_form(&mut body, session.request());

    for notice in notices {
        let _ = write!(
            body,
            r#"<div class="{}">{}</div>"#,
            notice.css_class(),
            escape_html(notice.text())
        );
    }

    match session.generation() {
        Some(Generation::Table(batch)) => render_table(&mut body, batch),
        Some(Generation::RawText(text)) => {
            let _ = write!(
                body,
                r#"<pre class="raw">{}</pre><div class="notice warning">{}</div>"#,
                escape_html(text),
                RAW_TEXT_WARNING
            );
        }
        None => {}
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Manual Testing AI Agent</title>
<style>{}</style>
</head>
<body>
{}
</body>
</html>"#,
        STYLE, body
    )
}

fn render_form(out: &mut String, previous: Option<&GenerationRequest>) {
    let category = previous.map(|r| r.category).unwrap_or(TestCaseCategory::Functional);
    let model = previous.map(|r| r.model).unwrap_or_default();
    let module_name = previous.map(|r| r.module_name.as_str()).unwrap_or("");
    let case_count = previous.map(|r| r.case_count).unwrap_or(DEFAULT_CASE_COUNT);
    let with_verdicts = previous.is_some_and(|r| r.with_verdicts);

    out.push_str(r#"<form method="post" action="/generate" enctype="multipart/form-data">"#);

    out.push_str(r#"<h3>📌 Choose What to Generate</h3><details><summary>ℹ️ Test Case Types Explained</summary><ul>"#);
    for c in TestCaseCategory::ALL {
        let _ = write!(out, "<li><b>{}</b>: {}</li>", c.label(), escape_html(c.help()));
    }
    out.push_str("</ul></details>");

    out.push_str(r#"<label>Select test case type: <select name="category">"#);
    for c in TestCaseCategory::ALL {
        let _ = write!(
            out,
            r#"<option value="{0}"{1}>{0}</option>"#,
            c.label(),
            selected(c == category)
        );
    }
    out.push_str("</select></label>");

    out.push_str(r#"<label>🤖 Gemini Model <select name="model">"#);
    for m in ModelVariant::ALL {
        let _ = write!(
            out,
            r#"<option value="{0}"{1}>{0}</option>"#,
            m.model_name(),
            selected(m == model)
        );
    }
    out.push_str("</select></label>");

    let _ = write!(
        out,
        r#"<label>🔍 Enter Module or Feature to Test: <input type="text" name="module_name" value="{}"></label>"#,
        escape_html(module_name)
    );
    let _ = write!(
        out,
        r#"<label>🧮 Number of Test Cases <input type="range" name="case_count" min="{}" max="{}" value="{}" oninput="this.nextElementSibling.value=this.value"><output>{}</output></label>"#,
        MIN_CASE_COUNT, MAX_CASE_COUNT, case_count, case_count
    );
    let _ = write!(
        out,
        r#"<label><input type="checkbox" name="with_verdicts"{}> Add editable pass/fail column</label>"#,
        if with_verdicts { " checked" } else { "" }
    );
    out.push_str(r#"<label>📄 Upload PDF Requirement Document (optional) <input type="file" name="document" accept="application/pdf,.pdf"></label>"#);
    out.push_str(r#"<button type="submit">🚀 Generate Test Cases</button></form>"#);
    out.push_str(r#"<form method="post" action="/reset"><button type="submit">🔄 Reset Inputs</button></form>"#);
}

fn render_table(out: &mut String, batch: &Batch) {
    let verdicts = batch.verdicts();

    let _ = write!(
        out,
        r#"<h3>🧪 Generated Test Cases</h3><p class="meta">{} test cases · generated {}</p>"#,
        batch.len(),
        batch.generated_at().format("%Y-%m-%d %H:%M:%S")
    );
    out.push_str(r#"<form method="post" action="/verdicts"><table><thead><tr>"#);
    for name in batch.header() {
        let _ = write!(out, "<th>{}</th>", escape_html(name));
    }
    if verdicts.is_some() {
        out.push_str("<th>Pass</th>");
    }
    out.push_str("</tr></thead><tbody>");

    for index in 0..batch.len() {
        out.push_str("<tr>");
        for value in batch.row(index).unwrap_or_default() {
            let _ = write!(out, "<td>{}</td>", escape_html(value).replace('\n', "<br>"));
        }
        if let Some(&checked) = verdicts.and_then(|v| v.get(index)) {
            let _ = write!(
                out,
                r#"<td><input type="checkbox" name="verdict" value="{}"{}></td>"#,
                index,
                if checked { " checked" } else { "" }
            );
        }
        out.push_str("</tr>");
    }
    out.push_str("</tbody></table>");
    if verdicts.is_some() {
        out.push_str(r#"<button type="submit">💾 Save verdicts</button>"#);
    }
    out.push_str("</form>");

    out.push_str(r#"<p class="downloads"><a href="/export/xlsx">⬇️ Download Test Cases as Excel</a> <a href="/export/pdf">⬇️ Download Test Cases as PDF</a></p>"#);
}

fn selected(is_selected: bool) -> &'static str {
    if is_selected {
        " selected"
    } else {
        ""
    }
}

/// 转义 HTML 特殊字符
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const HEADER_HTML: &str = r#"<h1>🧪 Manual Testing AI Agent</h1>
<p>👋 <b>Welcome!</b> This AI-powered tool helps you generate structured manual test cases for any module or feature.</p>
<ul>
<li>✅ Select the type of test cases you want (Functional, Regression, Security)</li>
<li>✍️ Enter the feature/module name, or 📄 upload a PDF requirement document</li>
<li>🔢 Choose how many test cases to generate</li>
<li>📊 View them as a table or 📥 download as Excel or PDF</li>
</ul>"#;

const STYLE: &str = "body{font-family:sans-serif;max-width:1100px;margin:2em auto;background:#f8f9fa}\
label{display:block;margin:.6em 0}\
button{background:#4F8BF9;color:#fff;border:0;padding:.5em 1em;margin:.4em 0;border-radius:4px}\
table{border-collapse:collapse;width:100%;background:#fff}\
th,td{border:1px solid #ddd;padding:.4em;vertical-align:top;text-align:left}\
.notice{padding:.6em;margin:.6em 0;border-radius:4px}\
.success{background:#e6f4ea}.warning{background:#fff4e5}.error{background:#fdecea}\
pre.raw{white-space:pre-wrap;background:#fff;padding:1em}";
