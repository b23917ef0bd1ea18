use std::io::Cursor;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use calamine::{open_workbook_from_rs, Reader, Xlsx};
use http_body_util::BodyExt;
use manual_testing_agent::error::LlmError;
use manual_testing_agent::models::{ModelVariant, TestCaseCategory};
use manual_testing_agent::services::export::export_to_excel;
use manual_testing_agent::web::{router, AppState};
use manual_testing_agent::{Generation, GenerationFlow, GenerationRequest, TextGenerator};
use tower::ServiceExt;

const BOUNDARY: &str = "----agent-test-boundary";

/// 按模型名构造错误
type FailureFn = fn(&str) -> LlmError;

/// 返回固定回复的模型
struct MockGenerator {
    reply: Result<String, FailureFn>,
    prompts: Mutex<Vec<String>>,
}

impl MockGenerator {
    fn with_reply(reply: Result<String, FailureFn>) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    fn replying(reply: impl Into<String>) -> Arc<Self> {
        Self::with_reply(Ok(reply.into()))
    }

    fn quota_exhausted() -> Arc<Self> {
        Self::with_reply(Err(|model| LlmError::QuotaExhausted {
            model: model.to_string(),
            message: "429 RESOURCE_EXHAUSTED".to_string(),
        }))
    }

    fn api_failure() -> Arc<Self> {
        Self::with_reply(Err(|model| LlmError::ApiCallFailed {
            model: model.to_string(),
            message: "connection reset by peer".to_string(),
        }))
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str, model: ModelVariant) -> Result<String, LlmError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(failure) => Err(failure(model.model_name())),
        }
    }
}

fn login_table(rows: usize) -> String {
    let mut text = String::from(
        "Sure, here are the test cases:\n\n\
         | Test Case ID | Description | Preconditions | Steps | Expected Result |\n\
         |---|---|---|---|---|\n",
    );
    for i in 1..=rows {
        text.push_str(&format!(
            "| TC-{0:02} | Login check {0} | User registered | Enter credentials {0} | Login successful |\n",
            i
        ));
    }
    text
}

fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
            BOUNDARY, name, value
        ));
    }
    body.push_str(&format!("--{}--\r\n", BOUNDARY));
    body
}

fn generate_request(fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(fields)))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

fn app(generator: Arc<MockGenerator>) -> Router {
    router(Arc::new(AppState::new(generator)))
}

fn read_sheet(bytes: Vec<u8>) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range_at(0).unwrap().unwrap();
    range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect()
}

#[tokio::test]
async fn test_login_scenario_end_to_end() {
    let generator = MockGenerator::replying(login_table(5));
    let flow = GenerationFlow::new(generator.clone());
    let request = GenerationRequest::for_module(TestCaseCategory::Functional, "Login", 5);

    let generation = flow.run(&request).await.unwrap();
    let Generation::Table(batch) = generation else {
        panic!("应该得到表格");
    };
    assert_eq!(batch.len(), 5);

    let prompt = generator.prompts.lock().unwrap()[0].clone();
    assert!(prompt.contains("Generate 5 functional manual test cases for the 'Login' module"));
    assert!(prompt.contains("Test Case ID, Description, Preconditions, Steps, Expected Result"));

    let rows = read_sheet(export_to_excel(&batch, &request.sheet_title()).unwrap());
    assert_eq!(rows.len(), 6);
    assert_eq!(
        rows[0],
        vec!["Test Case ID", "Description", "Preconditions", "Steps", "Expected Result"]
    );
    for (i, row) in rows.iter().skip(1).enumerate() {
        assert_eq!(row[0], format!("TC-{:02}", i + 1));
        assert_eq!(row[3], format!("Enter credentials {}", i + 1));
    }
}

#[tokio::test]
async fn test_generate_then_export_over_http() {
    let app = app(MockGenerator::replying(login_table(5)));

    let response = app
        .clone()
        .oneshot(generate_request(&[
            ("category", "Functional Test Cases"),
            ("model", "gemini-1.5-flash"),
            ("module_name", "Login"),
            ("case_count", "5"),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Test cases generated!"));
    assert!(html.contains("<td>TC-05</td>"));

    let response = app.clone().oneshot(get("/export/xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
    assert!(disposition.contains("Login_Functional_Test_Cases.xlsx"));
    assert_eq!(read_sheet(body_bytes(response).await).len(), 6);

    let response = app.oneshot(get("/export/pdf")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_export_without_batch_is_rejected() {
    let app = app(MockGenerator::replying(login_table(1)));

    let response = app.clone().oneshot(get("/export/xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.oneshot(get("/export/pdf")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unparseable_reply_shows_raw_text_and_blocks_export() {
    let app = app(MockGenerator::replying("I am unable to format that as a table."));

    let response = app
        .clone()
        .oneshot(generate_request(&[("module_name", "Search"), ("case_count", "6")]))
        .await
        .unwrap();
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("I am unable to format that as a table."));
    assert!(html.contains("Could not format table, displaying raw text."));

    let response = app.oneshot(get("/export/xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_quota_error_message() {
    let app = app(MockGenerator::quota_exhausted());

    let response = app
        .oneshot(generate_request(&[("module_name", "Login"), ("case_count", "5")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("reached your Gemini API quota"));
}

#[tokio::test]
async fn test_generic_api_error_message() {
    let app = app(MockGenerator::api_failure());

    let response = app
        .oneshot(generate_request(&[("module_name", "Login"), ("case_count", "5")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Unexpected error: connection reset by peer"));
    assert!(!html.contains("reached your Gemini API quota"));
}

#[tokio::test]
async fn test_missing_module_name_withholds_generation() {
    let generator = MockGenerator::replying(login_table(5));
    let app = app(generator.clone());

    let response = app
        .oneshot(generate_request(&[("module_name", "  "), ("case_count", "5")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_verdict_override_and_reset() {
    let app = app(MockGenerator::replying(login_table(3)));

    app.clone()
        .oneshot(generate_request(&[
            ("module_name", "Login"),
            ("case_count", "5"),
            ("with_verdicts", "on"),
        ]))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/verdicts")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("verdict=1"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let response = app.clone().oneshot(get("/export/xlsx")).await.unwrap();
    let rows = read_sheet(body_bytes(response).await);
    let verdicts: Vec<&str> = rows.iter().skip(1).map(|row| row[5].as_str()).collect();
    assert_eq!(verdicts, vec!["false", "true", "false"]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reset")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_redirection());

    let response = app.oneshot(get("/export/xlsx")).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_unreadable_pdf_upload_is_reported() {
    let generator = MockGenerator::replying("[]");
    let app = app(generator.clone());

    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"document\"; filename=\"req.pdf\"\r\n\
         Content-Type: application/pdf\r\n\r\nnot a pdf\r\n--{b}--\r\n",
        b = BOUNDARY
    );
    let request = Request::builder()
        .method("POST")
        .uri("/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Error reading PDF"));
    assert!(generator.prompts.lock().unwrap().is_empty());
}
