//! Mock image host server for testing
//!
//! Simulates an ImgBB-style upload API with wiremock.

use serde_json::json;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};
use EventHub::config::ImageHostConfig;

pub const UPLOAD_PATH: &str = "/1/upload";
pub const TEST_API_KEY: &str = "test-image-key";

/// Mock image host server
pub struct ImageHostMockServer {
    pub server: MockServer,
}

impl ImageHostMockServer {
    pub async fn new() -> Self {
        Self { server: MockServer::start().await }
    }

    /// Client configuration pointing at this server
    pub fn config(&self) -> ImageHostConfig {
        ImageHostConfig {
            api_url: format!("{}{}", self.server.uri(), UPLOAD_PATH),
            api_key: TEST_API_KEY.to_string(),
            timeout_seconds: 5,
        }
    }

    /// Accept uploads and answer with `url`
    pub async fn mock_upload_success(&self, url: &str) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .and(query_param("key", TEST_API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": { "url": url },
                "success": true,
                "status": 200
            })))
            .expect(1)
            .mount(&self.server)
            .await;
    }

    /// Reject uploads with `status`
    pub async fn mock_upload_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(status).set_body_json(json!({
                "success": false,
                "error": { "message": "Invalid API key" }
            })))
            .mount(&self.server)
            .await;
    }

    /// Answer 200 but report failure in the body
    pub async fn mock_upload_without_url(&self) {
        Mock::given(method("POST"))
            .and(path(UPLOAD_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": false })))
            .mount(&self.server)
            .await;
    }
}
