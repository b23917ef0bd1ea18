//! LLM 服务 - 业务能力层
//!
//! 只负责"把提示词发给模型并拿回文本"，不关心返回内容的形态
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 走 Gemini 的 OpenAI 兼容接口，端点和密钥来自 `Config`
//! - 不做重试，失败只区分"配额耗尽"和"其他错误"

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::models::ModelVariant;

/// 文本生成能力
///
/// 生产环境由 `LlmService` 实现，测试中可替换为固定回复
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// 发送一次提示词，返回模型的原始文本
    async fn generate(&self, prompt: &str, model: ModelVariant) -> Result<String, LlmError>;
}

/// LLM 服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    temperature: f32,
    max_tokens: u32,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        Self {
            client: Client::with_config(openai_config),
            temperature: config.llm_temperature,
            max_tokens: config.llm_max_tokens,
        }
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str, model: ModelVariant) -> Result<String, LlmError> {
        let model_name = model.model_name();
        debug!("调用 LLM API，模型: {}", model_name);
        debug!("提示词长度: {} 字符", prompt.len());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| LlmError::RequestBuildFailed(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| LlmError::RequestBuildFailed(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            let message = e.to_string();
            warn!("LLM API 调用失败: {}", message);
            classify_failure(model_name, message)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: model_name.to_string(),
            })?;

        Ok(content.trim().to_string())
    }
}

/// 区分配额耗尽与其他上游错误
fn classify_failure(model: &str, message: String) -> LlmError {
    let lower = message.to_lowercase();
    let exhausted = lower.contains("429")
        || lower.contains("resource_exhausted")
        || lower.contains("resource exhausted")
        || lower.contains("quota")
        || lower.contains("rate limit");

    if exhausted {
        LlmError::QuotaExhausted {
            model: model.to_string(),
            message,
        }
    } else {
        LlmError::ApiCallFailed {
            model: model.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quota_failures() {
        let err = classify_failure(
            "gemini-1.5-flash",
            "status 429: RESOURCE_EXHAUSTED You exceeded your current quota".to_string(),
        );
        assert!(matches!(err, LlmError::QuotaExhausted { .. }));
    }

    #[test]
    fn test_classify_generic_failure() {
        let err = classify_failure("gemini-pro", "invalid api key".to_string());
        match err {
            LlmError::ApiCallFailed { model, message } => {
                assert_eq!(model, "gemini-pro");
                assert_eq!(message, "invalid api key");
            }
            other => panic!("不应判为配额错误: {:?}", other),
        }
    }

    /// 测试真实 API 连通性
    ///
    /// 运行方式：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_live_generate -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_live_generate() {
        let _ = tracing_subscriber::fmt::try_init();

        let config = Config::from_env().expect("需要 GEMINI_API_KEY");
        let service = LlmService::new(&config);

        let response = service
            .generate(
                "Hello, can you confirm my Gemini API key is working?",
                ModelVariant::GeminiFlash,
            )
            .await
            .expect("LLM 调用失败");

        println!("✅ Gemini replied: {}", response);
        assert!(!response.is_empty());
    }
}
