use thiserror::Error;

/// 超出配额时展示给用户的提示
pub const QUOTA_EXHAUSTED_MESSAGE: &str = "🚫 You’ve reached your Gemini API quota for today. Please try again after 24 hours or upgrade your plan.";

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// LLM 服务错误
    #[error("LLM错误: {0}")]
    Llm(#[from] LlmError),
    /// 需求文档读取错误
    #[error("文档错误: {0}")]
    Document(#[from] DocumentError),
    /// 导出错误
    #[error("导出错误: {0}")]
    Export(#[from] ExportError),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// 配额或频率限制耗尽
    #[error("LLM 配额已耗尽 (模型: {model}): {message}")]
    QuotaExhausted { model: String, message: String },
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {message}")]
    ApiCallFailed { model: String, message: String },
    /// 请求构建失败
    #[error("LLM 请求构建失败: {0}")]
    RequestBuildFailed(String),
    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },
}

/// 需求文档（PDF）读取错误
#[derive(Debug, Error)]
pub enum DocumentError {
    /// 无法加载 PDF
    #[error("无法读取PDF: {0}")]
    Unreadable(String),
    /// PDF 中没有可提取的文本
    #[error("PDF 中没有可提取的文本")]
    NoText,
}

/// 导出错误
#[derive(Debug, Error)]
pub enum ExportError {
    /// 表格写入失败
    #[error("Excel 写入失败: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),
    /// PDF 写入失败
    #[error("PDF 写入失败: {0}")]
    Document(String),
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 模块名称为空且没有上传文档
    #[error("模块名称为空，且没有上传需求文档")]
    MissingInput,
    /// 用例数量超出范围
    #[error("用例数量 {count} 超出范围 [{min}, {max}]")]
    CaseCountOutOfRange { count: u32, min: u32, max: u32 },
    /// 未知的用例类型
    #[error("未知的用例类型: {0}")]
    UnknownCategory(String),
    /// 未知的模型
    #[error("未知的模型: {0}")]
    UnknownModel(String),
    /// 没有可导出的用例
    #[error("没有可导出的测试用例")]
    NothingToExport,
    /// 表单解析失败
    #[error("表单解析失败: {0}")]
    InvalidForm(String),
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 缺少 API 密钥
    #[error("缺少 API 密钥 {var_name}（环境变量或 secrets 文件）")]
    MissingCredential { var_name: String },
    /// secrets 文件解析失败
    #[error("secrets 文件 {path} 解析失败: {source}")]
    SecretsParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl AppError {
    /// 转换为展示给用户的提示
    ///
    /// 配额耗尽使用固定提示，其余错误原样透出
    pub fn user_message(&self) -> String {
        match self {
            AppError::Llm(LlmError::QuotaExhausted { .. }) => QUOTA_EXHAUSTED_MESSAGE.to_string(),
            AppError::Llm(LlmError::ApiCallFailed { message, .. }) => {
                format!("❌ Unexpected error: {}", message)
            }
            AppError::Document(DocumentError::NoText) => {
                "❌ No text could be extracted from the PDF. Please check your file.".to_string()
            }
            AppError::Document(DocumentError::Unreadable(msg)) => {
                format!("Error reading PDF: {}", msg)
            }
            AppError::Business(BusinessError::MissingInput) => {
                "👆 Enter a module name or upload a PDF file to begin.".to_string()
            }
            AppError::Business(BusinessError::NothingToExport) => {
                "⚠️ There are no parsed test cases to export. Generate a table first.".to_string()
            }
            AppError::Business(BusinessError::CaseCountOutOfRange { min, max, .. }) => {
                format!("⚠️ Number of test cases must be between {} and {}.", min, max)
            }
            other => format!("❌ Unexpected error: {}", other),
        }
    }

    /// 是否为配额耗尽
    pub fn is_quota_exhausted(&self) -> bool {
        matches!(self, AppError::Llm(LlmError::QuotaExhausted { .. }))
    }
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
