//! File upload

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl ApiClient {
    /// `POST /api/upload` as `multipart/form-data` with a single `file` part
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<UploadedFile> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        self.send_multipart("/api/upload", Form::new().part("file", part)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_upload_sends_multipart() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "data": {"url": "/uploads/a.txt", "filename": "a.txt", "size": 5}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let file = client.upload("a.txt", b"hello".to_vec()).await.unwrap();
        assert_eq!(file.size, Some(5));

        let requests = server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
        assert!(content_type.starts_with("multipart/form-data"));
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("filename=\"a.txt\""));
        assert!(body.contains("hello"));
    }
}
