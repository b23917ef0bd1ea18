//! # Manual Testing Agent
//!
//! 根据模块名称或需求文档，调用 LLM 生成手工测试用例，
//! 以表格展示，并可导出为 Excel 或 PDF。
//!
//! ## 架构设计
//!
//! ### ① 能力层（Services）
//! - `services/` - 描述"我能做什么"，每个能力互不依赖
//! - `LlmService` - 调用模型生成文本
//! - `response_parser` - 把模型输出解析为表格
//! - `verdict` - 按关键字计算通过/失败
//! - `export` - 导出 Excel / PDF
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一次生成"的完整流程
//! - `GenerationFlow` - 校验 → 提示词 → 调用 → 解析 → 判定
//! - `Session` - 当前交互的结果
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/` - 应用生命周期
//! - `web/` - 表单页面与导出接口
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod web;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Batch, GenerationRequest, TestCase};
pub use orchestrator::App;
pub use services::{parse_response, LlmService, ParseOutcome, TextGenerator};
pub use workflow::{Generation, GenerationFlow, Session};
