//! 提示词构建

use crate::models::{GenerationRequest, TestCaseCategory, DOCUMENT_COLUMNS};

/// 根据请求构建提示词
pub fn build_prompt(request: &GenerationRequest) -> String {
    match &request.document_text {
        Some(text) => build_document_prompt(text),
        None => build_module_prompt(
            request.category,
            request.module_name.trim(),
            request.case_count,
        ),
    }
}

/// 按模块名称生成 markdown 表格
pub fn build_module_prompt(category: TestCaseCategory, module_name: &str, case_count: u32) -> String {
    let columns = category.columns().join(", ");
    match category {
        TestCaseCategory::Functional => format!(
            "Generate {} functional manual test cases for the '{}' module. Format as markdown table: {}.",
            case_count, module_name, columns
        ),
        TestCaseCategory::Regression => format!(
            "List {} regression test scenarios for the '{}' module in markdown table format: {}.",
            case_count, module_name, columns
        ),
        TestCaseCategory::Security => format!(
            "Create {} security test cases for the '{}' feature in markdown table format: {}.",
            case_count, module_name, columns
        ),
    }
}

/// 按需求文档生成 JSON 数组
pub fn build_document_prompt(requirements_text: &str) -> String {
    let field_hint = |field: &str| match field {
        "Module" => " (Admin, HR, API, Security, Performance, Database, etc.)",
        "Priority" => " (High, Medium, Low)",
        "Test Type" => " (Functional, Regression, Security, Negative, Performance)",
        _ => "",
    };
    let fields = DOCUMENT_COLUMNS
        .iter()
        .map(|field| format!("    - {}{}", field, field_hint(field)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
    You are a professional QA Test Engineer. Based on the following requirement document,
    generate as many comprehensive test cases as needed (module-wise) in JSON format with these fields:

{}

    Document:
    {}

    Return only JSON array. No explanations.
    "#,
        fields, requirements_text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_functional_prompt() {
        let prompt = build_module_prompt(TestCaseCategory::Functional, "Login", 5);
        assert_eq!(
            prompt,
            "Generate 5 functional manual test cases for the 'Login' module. Format as markdown table: Test Case ID, Description, Preconditions, Steps, Expected Result."
        );
    }

    #[test]
    fn test_security_prompt_mentions_feature() {
        let prompt = build_module_prompt(TestCaseCategory::Security, "Checkout", 12);
        assert!(prompt.starts_with("Create 12 security test cases for the 'Checkout' feature"));
        assert!(prompt.ends_with("Test ID, Risk Type, Test Description, Expected Result."));
    }

    #[test]
    fn test_document_prompt_lists_fields_and_text() {
        let request = GenerationRequest::for_document("Users can reset passwords by email.");
        let prompt = build_prompt(&request);
        assert!(prompt.contains("- Priority (High, Medium, Low)"));
        assert!(prompt.contains("- Test Steps\n"));
        assert!(prompt.contains("Users can reset passwords by email."));
        assert!(prompt.contains("Return only JSON array. No explanations."));
    }

    #[test]
    fn test_module_name_is_trimmed() {
        let request = GenerationRequest::for_module(TestCaseCategory::Regression, "  Cart ", 7);
        assert!(build_prompt(&request).contains("for the 'Cart' module"));
    }
}
