use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ConfigError;

/// Gemini 的 OpenAI 兼容接口
const GEMINI_OPENAI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// 程序配置
///
/// 启动时读取一次，之后不再修改
#[derive(Clone, Debug)]
pub struct Config {
    /// 监听地址
    pub bind_addr: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// secrets 文件路径
    pub secrets_file: String,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    /// 生成温度
    pub llm_temperature: f32,
    /// 单次回复的最大 token 数
    pub llm_max_tokens: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8501".to_string(),
            verbose_logging: false,
            secrets_file: ".streamlit/secrets.toml".to_string(),
            llm_api_key: String::new(),
            llm_api_base_url: GEMINI_OPENAI_BASE_URL.to_string(),
            llm_temperature: 0.7,
            llm_max_tokens: 8192,
        }
    }
}

/// secrets 文件内容
#[derive(Debug, Default, Deserialize)]
struct Secrets {
    #[serde(rename = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,
}

impl Config {
    /// 依次合并默认值、secrets 文件和环境变量
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 使用自定义的变量来源构建配置
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default = Self::default();
        let secrets_file = lookup("SECRETS_FILE").unwrap_or(default.secrets_file);
        let secrets = load_secrets(Path::new(&secrets_file))?;

        let llm_api_key = lookup("GEMINI_API_KEY")
            .or(secrets.gemini_api_key)
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingCredential {
                var_name: "GEMINI_API_KEY".to_string(),
            })?;

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or(default.bind_addr),
            verbose_logging: parse_var(&lookup, "VERBOSE_LOGGING", "bool")?
                .unwrap_or(default.verbose_logging),
            secrets_file,
            llm_api_key,
            llm_api_base_url: lookup("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_temperature: parse_var(&lookup, "LLM_TEMPERATURE", "f32")?
                .unwrap_or(default.llm_temperature),
            llm_max_tokens: parse_var(&lookup, "LLM_MAX_TOKENS", "u32")?
                .unwrap_or(default.llm_max_tokens),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var_name: &str,
    expected_type: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}

fn load_secrets(path: &Path) -> Result<Secrets, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!("未读取 secrets 文件 {}: {}", path.display(), e);
            return Ok(Secrets::default());
        }
    };

    toml::from_str(&content).map_err(|source| {
        warn!("secrets 文件解析失败: {}", path.display());
        ConfigError::SecretsParseFailed {
            path: path.display().to_string(),
            source,
        }
    })
}
