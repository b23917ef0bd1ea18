//! 编排层（Orchestration Layer）
//!
//! 负责应用生命周期：读取配置后创建服务、组装路由、启动监听。
//!
//! ```text
//! orchestrator::App (启动 / 监听)
//!     ↓
//! web (表单与导出接口)
//!     ↓
//! workflow::GenerationFlow / Session (一次生成)
//!     ↓
//! services (能力层：prompt / llm / parser / verdict / export)
//! ```

pub mod app;

pub use app::App;
