//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use tracing::info;

use crate::config::Config;
use crate::models::GenerationRequest;

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🧪 Manual Testing Agent 启动");
    info!("🌐 监听地址: http://{}", config.bind_addr);
    info!("🤖 LLM 端点: {}", config.llm_api_base_url);
    info!("{}", "=".repeat(60));
}

/// 记录一次生成请求
pub fn log_generation_start(request: &GenerationRequest) {
    match &request.document_text {
        Some(text) => info!(
            "📄 按需求文档生成用例 (模型: {}, 文档 {} 字符)",
            request.model.model_name(),
            text.chars().count()
        ),
        None => info!(
            "🔍 生成 {} 条「{}」用例，模块: {} (模型: {})",
            request.case_count,
            request.category.label(),
            truncate_text(request.module_name.trim(), 40),
            request.model.model_name()
        ),
    }
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
