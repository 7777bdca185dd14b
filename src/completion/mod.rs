//! 远程文本补全接口客户端

pub mod prompt;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;
use crate::error::AppError;

pub use prompt::{sonnet_prompt, translate_prompt};

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

/// 远端错误响应，兼容 `{"detail": ..}` 和 `{"error": {"message": ..}}` 两种格式。
/// `detail` 可以是任意 JSON，非字符串时按 JSON 文本返回
#[derive(Deserialize)]
struct UpstreamErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
    error: Option<UpstreamErrorDetail>,
}

#[derive(Deserialize)]
struct UpstreamErrorDetail {
    message: Option<String>,
}

impl UpstreamErrorBody {
    fn message(self) -> Option<String> {
        let detail = match self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(text) => Some(text),
            other => Some(other.to_string()),
        };
        detail
            .or_else(|| self.error.and_then(|e| e.message))
            .filter(|m| !m.trim().is_empty())
    }
}

pub struct CompletionClient {
    http: Client,
    config: CompletionConfig,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig) -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .connect_timeout(config.timeout())
            .timeout(config.timeout())
            .build()?;

        Ok(Self { http, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// 调用补全接口，返回去掉首尾空白的生成文本
    pub async fn complete(&self, prompt: &str) -> Result<String, AppError> {
        let api_key = self.config.api_key.as_deref().ok_or(AppError::MissingApiKey)?;

        let body = CompletionRequest {
            model: &self.config.model,
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
        };

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown error").to_string();
            let message = response
                .json::<UpstreamErrorBody>()
                .await
                .ok()
                .and_then(UpstreamErrorBody::message)
                .unwrap_or(reason);
            tracing::warn!(status = status.as_u16(), "Completion API returned error: {}", message);
            return Err(AppError::Upstream(message));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let text = result
            .choices
            .into_iter()
            .next()
            .ok_or(AppError::EmptyCompletion)?
            .text;

        Ok(text.trim().to_string())
    }

    fn map_transport_error(&self, e: reqwest::Error) -> AppError {
        if e.is_timeout() {
            tracing::warn!("Completion API timed out after {}s", self.config.timeout_secs);
            AppError::UpstreamTimeout(self.config.timeout_secs)
        } else {
            tracing::warn!("Completion API request failed: {}", e);
            AppError::Transport(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config_for(server: &mockito::ServerGuard) -> CompletionConfig {
        CompletionConfig {
            api_key: Some("test-key".into()),
            api_url: format!("{}/v1/completions", server.url()),
            timeout_secs: 5,
            ..CompletionConfig::default()
        }
    }

    #[tokio::test]
    async fn returns_trimmed_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "prompt": "say hi",
                "max_tokens": 1000,
                "model": crate::config::DEFAULT_COMPLETION_MODEL,
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"text":"\n  Good morrow!  \n"},{"text":"ignored"}]}"#)
            .create_async()
            .await;

        let client = CompletionClient::new(config_for(&server)).unwrap();
        assert_eq!(client.complete("say hi").await.unwrap(), "Good morrow!");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/completions")
            .expect(0)
            .create_async()
            .await;

        let config = CompletionConfig {
            api_key: None,
            ..config_for(&server)
        };
        let client = CompletionClient::new(config).unwrap();
        let err = client.complete("anything").await.unwrap_err();
        assert!(matches!(err, AppError::MissingApiKey));
        assert_eq!(err.to_string(), "Completion API key not configured");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upstream_detail_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"Invalid API key"}"#)
            .create_async()
            .await;

        let client = CompletionClient::new(config_for(&server)).unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Completion API error: Invalid API key");
    }

    #[tokio::test]
    async fn structured_detail_is_surfaced_as_json() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":[{"loc":["body","prompt"],"msg":"field required"}]}"#)
            .create_async()
            .await;

        let client = CompletionClient::new(config_for(&server)).unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Completion API error: [{"loc":["body","prompt"],"msg":"field required"}]"#
        );
    }

    #[tokio::test]
    async fn nested_error_message_is_surfaced() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"model not found"}}"#)
            .create_async()
            .await;

        let client = CompletionClient::new(config_for(&server)).unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Completion API error: model not found");
    }

    #[tokio::test]
    async fn non_json_error_falls_back_to_status_text() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(503)
            .with_body("upstream overloaded")
            .create_async()
            .await;

        let client = CompletionClient::new(config_for(&server)).unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert_eq!(err.to_string(), "Completion API error: Service Unavailable");
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = CompletionClient::new(config_for(&server)).unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert!(matches!(err, AppError::EmptyCompletion));
    }

    #[tokio::test]
    async fn hung_upstream_times_out() {
        // 只接受连接，从不响应
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = CompletionConfig {
            api_key: Some("test-key".into()),
            api_url: format!("http://{}/v1/completions", addr),
            timeout_secs: 1,
            ..CompletionConfig::default()
        };
        let client = CompletionClient::new(config).unwrap();
        let err = client.complete("x").await.unwrap_err();
        assert!(matches!(err, AppError::UpstreamTimeout(1)));
    }
}
