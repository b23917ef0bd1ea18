//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建 LLM 服务和共享状态
//! 2. **服务启动**：绑定监听地址，运行 Web 表单
//!
//! 启动后配置不再变化，LLM 服务在进程生命周期内只创建一次

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::Config;
use crate::services::LlmService;
use crate::utils::logging::log_startup;
use crate::web::{self, AppState};

/// 应用主结构
pub struct App {
    config: Config,
    router: Router,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        let generator = Arc::new(LlmService::new(&config));
        let state = Arc::new(AppState::new(generator));
        let router = web::router(state);

        Ok(Self { config, router })
    }

    /// 运行 Web 服务，直到进程退出
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("无法监听地址: {}", self.config.bind_addr))?;

        info!("🚀 服务已启动: http://{}", self.config.bind_addr);

        axum::serve(listener, self.router)
            .await
            .context("Web 服务异常退出")?;

        Ok(())
    }
}
