use phf::phf_map;
use serde::{Deserialize, Serialize};

use crate::error::BusinessError;

/// 用例数量下限
pub const MIN_CASE_COUNT: u32 = 5;
/// 用例数量上限
pub const MAX_CASE_COUNT: u32 = 20;
/// 默认用例数量
pub const DEFAULT_CASE_COUNT: u32 = 10;

/// 需求文档模式下要求返回的字段
pub const DOCUMENT_COLUMNS: [&str; 9] = [
    "ID",
    "Module",
    "Title",
    "Description",
    "Precondition",
    "Test Steps",
    "Expected Result",
    "Priority",
    "Test Type",
];

/// 用例类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestCaseCategory {
    /// 功能测试
    Functional,
    /// 回归测试
    Regression,
    /// 安全测试
    Security,
}

static CATEGORY_LABELS: phf::Map<&'static str, TestCaseCategory> = phf_map! {
    "Functional Test Cases" => TestCaseCategory::Functional,
    "Regression Scenarios" => TestCaseCategory::Regression,
    "Security Test Cases" => TestCaseCategory::Security,
};

impl TestCaseCategory {
    pub const ALL: [TestCaseCategory; 3] = [
        TestCaseCategory::Functional,
        TestCaseCategory::Regression,
        TestCaseCategory::Security,
    ];

    /// 表单中显示的名称
    pub fn label(self) -> &'static str {
        match self {
            TestCaseCategory::Functional => "Functional Test Cases",
            TestCaseCategory::Regression => "Regression Scenarios",
            TestCaseCategory::Security => "Security Test Cases",
        }
    }

    /// 表单中的说明文字
    pub fn help(self) -> &'static str {
        match self {
            TestCaseCategory::Functional => "Basic tests that check if the module works as expected (e.g., Login should succeed with correct credentials).",
            TestCaseCategory::Regression => "Tests that ensure new changes don’t break existing features.",
            TestCaseCategory::Security => "Tests that check for potential vulnerabilities or unauthorized access attempts.",
        }
    }

    /// 提示词中要求的表格列
    pub fn columns(self) -> &'static [&'static str] {
        match self {
            TestCaseCategory::Functional => &[
                "Test Case ID",
                "Description",
                "Preconditions",
                "Steps",
                "Expected Result",
            ],
            TestCaseCategory::Regression => &[
                "Test Case ID",
                "Area Affected",
                "Description",
                "Steps",
                "Expected Outcome",
            ],
            TestCaseCategory::Security => {
                &["Test ID", "Risk Type", "Test Description", "Expected Result"]
            }
        }
    }

    pub fn from_label(label: &str) -> Result<Self, BusinessError> {
        CATEGORY_LABELS
            .get(label.trim())
            .copied()
            .ok_or_else(|| BusinessError::UnknownCategory(label.to_string()))
    }
}

/// 可选的模型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModelVariant {
    #[default]
    GeminiFlash,
    GeminiPro,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 2] = [ModelVariant::GeminiFlash, ModelVariant::GeminiPro];

    /// 上游使用的模型名称
    pub fn model_name(self) -> &'static str {
        match self {
            ModelVariant::GeminiFlash => "gemini-1.5-flash",
            ModelVariant::GeminiPro => "gemini-pro",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, BusinessError> {
        Self::ALL
            .into_iter()
            .find(|variant| variant.model_name() == name.trim())
            .ok_or_else(|| BusinessError::UnknownModel(name.to_string()))
    }
}

/// 提示词要求的返回形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseShape {
    /// 竖线分隔的 markdown 表格
    MarkdownTable,
    /// 代码块包裹的 JSON 数组
    JsonArray,
}

/// 一次生成请求
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub category: TestCaseCategory,
    pub model: ModelVariant,
    /// 模块或功能名称
    pub module_name: String,
    pub case_count: u32,
    /// 上传的需求文档文本，存在时走文档模式
    pub document_text: Option<String>,
    /// 是否附加可勾选的通过/失败列
    pub with_verdicts: bool,
}

impl GenerationRequest {
    /// 按模块名称生成
    pub fn for_module(category: TestCaseCategory, module_name: impl Into<String>, case_count: u32) -> Self {
        Self {
            category,
            model: ModelVariant::default(),
            module_name: module_name.into(),
            case_count,
            document_text: None,
            with_verdicts: false,
        }
    }

    /// 按需求文档生成
    pub fn for_document(document_text: impl Into<String>) -> Self {
        Self {
            category: TestCaseCategory::Functional,
            model: ModelVariant::default(),
            module_name: String::new(),
            case_count: DEFAULT_CASE_COUNT,
            document_text: Some(document_text.into()),
            with_verdicts: false,
        }
    }

    pub fn with_model(mut self, model: ModelVariant) -> Self {
        self.model = model;
        self
    }

    pub fn with_verdicts(mut self, enabled: bool) -> Self {
        self.with_verdicts = enabled;
        self
    }

    pub fn shape(&self) -> ResponseShape {
        if self.document_text.is_some() {
            ResponseShape::JsonArray
        } else {
            ResponseShape::MarkdownTable
        }
    }

    /// 要求模型返回的字段
    pub fn expected_columns(&self) -> &'static [&'static str] {
        match self.shape() {
            ResponseShape::JsonArray => &DOCUMENT_COLUMNS,
            ResponseShape::MarkdownTable => self.category.columns(),
        }
    }

    /// 校验表单输入
    pub fn validate(&self) -> Result<(), BusinessError> {
        if self.document_text.is_some() {
            return Ok(());
        }
        if self.module_name.trim().is_empty() {
            return Err(BusinessError::MissingInput);
        }
        if !(MIN_CASE_COUNT..=MAX_CASE_COUNT).contains(&self.case_count) {
            return Err(BusinessError::CaseCountOutOfRange {
                count: self.case_count,
                min: MIN_CASE_COUNT,
                max: MAX_CASE_COUNT,
            });
        }
        Ok(())
    }

    /// 导出时使用的工作表名称
    pub fn sheet_title(&self) -> String {
        match self.shape() {
            ResponseShape::JsonArray => "TestCases".to_string(),
            ResponseShape::MarkdownTable => format!("{} Test Cases", self.module_name.trim()),
        }
    }

    /// 导出 Excel 时使用的文件名
    pub fn excel_file_name(&self) -> String {
        match self.shape() {
            ResponseShape::JsonArray => "test_cases.xlsx".to_string(),
            ResponseShape::MarkdownTable => format!(
                "{}_{}.xlsx",
                self.module_name.trim(),
                self.category.label().replace(' ', "_")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_label() {
        assert_eq!(
            TestCaseCategory::from_label("Regression Scenarios").unwrap(),
            TestCaseCategory::Regression
        );
        assert!(TestCaseCategory::from_label("Load Tests").is_err());
        for category in TestCaseCategory::ALL {
            assert_eq!(TestCaseCategory::from_label(category.label()).unwrap(), category);
        }
    }

    #[test]
    fn test_model_from_name() {
        assert_eq!(ModelVariant::from_name("gemini-pro").unwrap(), ModelVariant::GeminiPro);
        assert!(ModelVariant::from_name("gpt-4").is_err());
    }

    #[test]
    fn test_validate_case_count_bounds() {
        let ok = GenerationRequest::for_module(TestCaseCategory::Functional, "Login", 5);
        assert!(ok.validate().is_ok());

        let too_many = GenerationRequest::for_module(TestCaseCategory::Functional, "Login", 21);
        assert!(matches!(
            too_many.validate(),
            Err(BusinessError::CaseCountOutOfRange { count: 21, .. })
        ));

        let blank = GenerationRequest::for_module(TestCaseCategory::Security, "   ", 10);
        assert!(matches!(blank.validate(), Err(BusinessError::MissingInput)));
    }

    #[test]
    fn test_document_mode_uses_json_shape() {
        let request = GenerationRequest::for_document("The system shall ...");
        assert_eq!(request.shape(), ResponseShape::JsonArray);
        assert_eq!(request.expected_columns(), &DOCUMENT_COLUMNS);
        assert_eq!(request.excel_file_name(), "test_cases.xlsx");
    }

    #[test]
    fn test_module_file_name() {
        let request = GenerationRequest::for_module(TestCaseCategory::Security, "Payments", 10);
        assert_eq!(request.excel_file_name(), "Payments_Security_Test_Cases.xlsx");
        assert_eq!(request.sheet_title(), "Payments Test Cases");
    }
}
