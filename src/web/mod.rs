//! Web 表单层
//!
//! 一个页面、几个动作：生成、重置、修改判定、导出

pub mod handlers;
pub mod view;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;

use crate::services::TextGenerator;
use crate::workflow::{GenerationFlow, Session};

/// 上传文件大小上限
const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// 所有请求共享的状态
pub struct AppState {
    pub flow: GenerationFlow,
    pub session: RwLock<Session>,
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            flow: GenerationFlow::new(generator),
            session: RwLock::new(Session::new()),
        }
    }
}

/// 构建路由
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/generate", post(handlers::generate))
        .route("/reset", post(handlers::reset))
        .route("/verdicts", post(handlers::save_verdicts))
        .route("/export/xlsx", get(handlers::export_excel))
        .route("/export/pdf", get(handlers::export_pdf))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
