//! 通过/失败判定
//!
//! 按关键字在预期结果中做大小写无关的匹配。
//! 先查通过列表，再查失败列表，都不命中时判为失败（未勾选）。
//! 通过关键字按整词匹配，紧跟在否定词之后的不算命中。
//! 关键字只覆盖英文，其他语言或含糊的描述一律落到默认值。

use std::sync::OnceLock;

use regex::Regex;

use crate::models::Batch;

/// 表示通过的关键字
const PASS_KEYWORDS: &[&str] = &[
    "success",
    "successful",
    "successfully",
    "succeed",
    "succeeds",
    "succeeded",
    "should be able",
    "is able to",
    "is displayed",
    "are displayed",
    "is shown",
    "redirected",
    "logged in",
    "is saved",
    "is created",
    "is updated",
    "is accepted",
    "works as expected",
    "completes",
];

/// 表示失败的关键字
const FAIL_KEYWORDS: &[&str] = &[
    "fail",
    "unsuccessful",
    "error",
    "invalid",
    "denied",
    "rejected",
    "not allowed",
    "blocked",
    "unable",
    "should not",
    "cannot",
    "unauthorized",
    "locked",
];

/// 使紧随其后的通过关键字失效的否定词
const NEGATIONS: &[&str] = &[
    "not", "never", "cannot", "can't", "won't", "doesn't", "didn't", "isn't",
];

/// 可选的否定词前缀加整词匹配的通过关键字
fn pass_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = |words: &[&str]| -> String {
            words
                .iter()
                .map(|w| regex::escape(w))
                .collect::<Vec<_>>()
                .join("|")
        };
        let pattern = format!(
            r"\b(?:({})\s+)?({})\b",
            alternation(NEGATIONS),
            alternation(PASS_KEYWORDS)
        );
        Regex::new(&pattern).expect("valid pass keyword regex")
    })
}

fn has_pass_keyword(text: &str) -> bool {
    pass_regex()
        .captures_iter(text)
        .any(|caps| caps.get(1).is_none())
}

/// 判定单条预期结果
pub fn classify(expected_result: &str) -> bool {
    keyword_verdict(expected_result).unwrap_or(false)
}

/// 关键字命中结果，`None` 表示两个列表都没命中
pub fn keyword_verdict(expected_result: &str) -> Option<bool> {
    let text = expected_result.to_lowercase();
    if has_pass_keyword(&text) {
        Some(true)
    } else if FAIL_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        Some(false)
    } else {
        None
    }
}

/// 找到预期结果所在的列
///
/// 兼容 `Expected Result` / `Expected Outcome` 等写法
pub fn expected_result_field(header: &[String]) -> Option<&str> {
    header
        .iter()
        .map(String::as_str)
        .find(|name| name.trim().to_lowercase().starts_with("expected"))
}

/// 为整批记录计算判定结果
///
/// 没有预期结果列时全部为失败
pub fn classify_batch(batch: &Batch) -> Vec<bool> {
    let field = expected_result_field(batch.header());
    batch
        .records()
        .iter()
        .map(|record| {
            field
                .and_then(|name| record.get(name))
                .map(classify)
                .unwrap_or(false)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TestCase;

    #[test]
    fn test_classify_examples() {
        assert!(classify("Login successful"));
        assert!(!classify("Login should fail"));
        assert!(!classify(""));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert!(classify("LOGIN SUCCESSFUL"));
        assert!(classify("User is REDIRECTED to the dashboard"));
        assert!(!classify("ACCESS DENIED"));
    }

    #[test]
    fn test_negated_success_is_fail() {
        assert!(!classify("Login unsuccessful"));
        assert!(!classify("Login should not succeed"));
        assert!(!classify("User is never redirected"));
        assert_eq!(keyword_verdict("Login unsuccessful"), Some(false));
    }

    #[test]
    fn test_success_word_forms_still_pass() {
        assert!(classify("Payment succeeded"));
        assert!(classify("Data saved successfully"));
        assert!(classify("Success banner appears"));
    }

    #[test]
    fn test_pass_list_wins_ties() {
        assert!(classify("Error message is displayed"));
    }

    #[test]
    fn test_unmatched_defaults_to_fail() {
        assert_eq!(keyword_verdict("Something happens"), None);
        assert_eq!(keyword_verdict("Request rejected"), Some(false));
        assert!(!classify("El usuario inicia sesión"));
        assert!(!classify("Something happens"));
    }

    #[test]
    fn test_expected_result_field_lookup() {
        let header = vec!["Test Case ID".to_string(), "Expected Outcome".to_string()];
        assert_eq!(expected_result_field(&header), Some("Expected Outcome"));
        assert_eq!(expected_result_field(&["ID".to_string()]), None);
    }

    #[test]
    fn test_classify_batch() {
        let header = vec!["ID".to_string(), "Expected Result".to_string()];
        let records = vec![
            [("ID", "1"), ("Expected Result", "Login successful")].into_iter().collect::<TestCase>(),
            [("ID", "2"), ("Expected Result", "Access denied")].into_iter().collect(),
        ];
        let batch = Batch::new(header, records);
        assert_eq!(classify_batch(&batch), vec![true, false]);
    }
}
