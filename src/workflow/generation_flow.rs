//! 用例生成流程 - 流程层
//!
//! 核心职责：定义"一次生成"的完整处理流程
//!
//! 流程顺序：
//! 1. 校验表单输入
//! 2. 构建提示词
//! 3. 调用模型（只调用一次，不重试）
//! 4. 按请求的形态解析
//! 5. 勾选模式下计算通过/失败标记

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AppResult;
use crate::models::{Batch, GenerationRequest};
use crate::services::prompt::build_prompt;
use crate::services::response_parser::{parse_response, ParseOutcome};
use crate::services::verdict::classify_batch;
use crate::services::TextGenerator;
use crate::utils::logging::log_generation_start;

/// 一次生成的结果
#[derive(Debug, Clone)]
pub enum Generation {
    /// 解析成功的表格
    Table(Batch),
    /// 无法解析，展示原文并提示
    RawText(String),
}

impl Generation {
    pub fn batch(&self) -> Option<&Batch> {
        match self {
            Generation::Table(batch) => Some(batch),
            Generation::RawText(_) => None,
        }
    }
}

/// 用例生成流程
///
/// - 不持有任何会话状态
/// - 只依赖文本生成能力
pub struct GenerationFlow {
    generator: Arc<dyn TextGenerator>,
}

impl GenerationFlow {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    pub async fn run(&self, request: &GenerationRequest) -> AppResult<Generation> {
        request.validate()?;
        log_generation_start(request);

        let prompt = build_prompt(request);
        let output = self.generator.generate(&prompt, request.model).await?;
        info!("✅ 模型返回 {} 个字符", output.chars().count());

        let generation = match parse_response(&output, request.shape(), request.expected_columns()) {
            ParseOutcome::Parsed(mut batch) => {
                if request.with_verdicts {
                    let verdicts = classify_batch(&batch);
                    batch.set_verdicts(verdicts);
                }
                info!("📊 解析得到 {} 条用例", batch.len());
                Generation::Table(batch)
            }
            ParseOutcome::Unparsed { raw_text } => {
                warn!("⚠️ 无法格式化为表格，展示原文");
                Generation::RawText(raw_text)
            }
        };

        Ok(generation)
    }
}
