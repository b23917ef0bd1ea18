use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::Form;
use tracing::{error, info, warn};

use crate::error::{AppError, BusinessError};
use crate::models::{GenerationRequest, ModelVariant, TestCaseCategory, DEFAULT_CASE_COUNT};
use crate::services::document_reader;
use crate::services::export::{self, EXCEL_MIME, PDF_FILE_NAME, PDF_MIME};
use crate::web::view::{render_page, Notice};
use crate::web::AppState;
use crate::workflow::Generation;

/// 生成成功的提示
pub const GENERATED_MESSAGE: &str = "✅ Test cases generated!";

/// 生成表单提交的原始字段
#[derive(Debug, Default)]
pub struct GenerateForm {
    pub category: Option<String>,
    pub model: Option<String>,
    pub module_name: String,
    pub case_count: Option<String>,
    pub with_verdicts: bool,
    pub document: Option<Vec<u8>>,
}

impl GenerateForm {
    /// 读取 multipart 表单
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, BusinessError> {
        let mut form = GenerateForm::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| BusinessError::InvalidForm(e.to_string()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "document" {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| BusinessError::InvalidForm(e.to_string()))?;
                if !bytes.is_empty() {
                    form.document = Some(bytes.to_vec());
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| BusinessError::InvalidForm(e.to_string()))?;
            match name.as_str() {
                "category" => form.category = Some(value),
                "model" => form.model = Some(value),
                "module_name" => form.module_name = value,
                "case_count" => form.case_count = Some(value),
                "with_verdicts" => form.with_verdicts = true,
                other => warn!("忽略未知表单字段: {}", other),
            }
        }
        Ok(form)
    }

    /// 转换为生成请求
    ///
    /// 提供了文档文本时走文档模式，否则按模块名称生成
    pub fn into_request(self, document_text: Option<String>) -> Result<GenerationRequest, BusinessError> {
        let category = match self.category.as_deref() {
            Some(label) => TestCaseCategory::from_label(label)?,
            None => TestCaseCategory::Functional,
        };
        let model = match self.model.as_deref() {
            Some(name) => ModelVariant::from_name(name)?,
            None => ModelVariant::default(),
        };
        let case_count = match self.case_count.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => raw
                .parse()
                .map_err(|_| BusinessError::InvalidForm(format!("case_count: {}", raw)))?,
            _ => DEFAULT_CASE_COUNT,
        };

        let mut request = match document_text {
            Some(text) => GenerationRequest::for_document(text),
            None => GenerationRequest::for_module(category, "", case_count),
        };
        // 文档模式下也保留表单中的其他选项，便于回显
        request.category = category;
        request.case_count = case_count;
        request.module_name = self.module_name;

        Ok(request.with_model(model).with_verdicts(self.with_verdicts))
    }
}

/// 首页
pub async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let session = state.session.read().await;
    Html(render_page(&session, &[]))
}

/// 生成用例
pub async fn generate(State(state): State<Arc<AppState>>, multipart: Multipart) -> Response {
    // 新的生成开始时丢弃旧结果
    state.session.write().await.reset();

    let notice = match run_generation(&state, multipart).await {
        Ok(_) => Notice::Success(GENERATED_MESSAGE.to_string()),
        Err(e) => {
            if e.is_quota_exhausted() {
                warn!("🚫 配额已耗尽: {}", e);
            } else {
                error!("❌ 生成失败: {}", e);
            }
            Notice::Error(e.user_message())
        }
    };

    let session = state.session.read().await;
    let status = match notice {
        Notice::Error(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    };
    (status, Html(render_page(&session, &[notice]))).into_response()
}

async fn run_generation(state: &AppState, multipart: Multipart) -> Result<Generation, AppError> {
    let mut form = GenerateForm::from_multipart(multipart).await?;

    let document_text = match form.document.take() {
        Some(bytes) => {
            info!("🔍 正在从 PDF 提取文本 ({} 字节)...", bytes.len());
            Some(document_reader::extract_text(&bytes)?)
        }
        None => None,
    };

    let request = form.into_request(document_text)?;
    let generation = state.flow.run(&request).await?;

    state
        .session
        .write()
        .await
        .replace(request, generation.clone());
    Ok(generation)
}

/// 重置表单和结果
pub async fn reset(State(state): State<Arc<AppState>>) -> Redirect {
    state.session.write().await.reset();
    info!("🔄 会话已重置");
    Redirect::to("/")
}

/// 保存用户勾选的判定
pub async fn save_verdicts(
    State(state): State<Arc<AppState>>,
    Form(fields): Form<Vec<(String, String)>>,
) -> Redirect {
    let mut session = state.session.write().await;
    let len = session
        .generation()
        .and_then(Generation::batch)
        .map(|batch| batch.len())
        .unwrap_or(0);

    let mut checked = vec![false; len];
    for (name, value) in fields {
        if name != "verdict" {
            continue;
        }
        if let Some(slot) = value.parse::<usize>().ok().and_then(|i| checked.get_mut(i)) {
            *slot = true;
        }
    }

    if session.override_verdicts(&checked) {
        info!("💾 已更新判定结果");
    }
    Redirect::to("/")
}

/// 导出 Excel
pub async fn export_excel(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    let result = session.exportable().and_then(|(request, batch)| {
        let bytes = export::export_to_excel(batch, &request.sheet_title())?;
        Ok((request.excel_file_name(), bytes))
    });

    match result {
        Ok((file_name, bytes)) => attachment(EXCEL_MIME, &file_name, bytes),
        Err(e) => export_failed(&session, e),
    }
}

/// 导出 PDF
pub async fn export_pdf(State(state): State<Arc<AppState>>) -> Response {
    let session = state.session.read().await;
    let result = session
        .exportable()
        .and_then(|(_, batch)| export::export_to_pdf(batch).map_err(AppError::from));

    match result {
        Ok(bytes) => attachment(PDF_MIME, PDF_FILE_NAME, bytes),
        Err(e) => export_failed(&session, e),
    }
}

fn attachment(mime: &'static str, file_name: &str, bytes: Vec<u8>) -> Response {
    info!("📥 导出 {} ({} 字节)", file_name, bytes.len());
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file_name.replace(['"', '\r', '\n'], "_")
    );
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

fn export_failed(session: &crate::workflow::Session, e: AppError) -> Response {
    warn!("导出被拒绝: {}", e);
    let status = match e {
        AppError::Business(BusinessError::NothingToExport) => StatusCode::CONFLICT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Html(render_page(session, &[Notice::Error(e.user_message())]))).into_response()
}
