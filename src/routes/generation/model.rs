use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    cache::{RequestLogEntry, RequestLogOperations, ResultCacheOperations, keys},
    completion::{sonnet_prompt, translate_prompt},
    config::AuditLogMode,
    error::AppError,
};

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
}

#[derive(Debug, Deserialize)]
pub struct SonnetRequest {
    pub topic: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SonnetResponse {
    pub sonnet: String,
}

/// 两种生成操作，只在字段名、缓存键、提示词和响应结构上不同
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generation {
    Translate,
    Sonnet,
}

impl Generation {
    /// 校验错误信息中使用的字段名
    pub fn field(self) -> &'static str {
        match self {
            Generation::Translate => "Text",
            Generation::Sonnet => "Topic",
        }
    }

    pub fn endpoint(self) -> &'static str {
        match self {
            Generation::Translate => "/translate",
            Generation::Sonnet => "/sonnet",
        }
    }

    pub fn cache_key(self, input: &str) -> String {
        match self {
            Generation::Translate => keys::translate_key(input),
            Generation::Sonnet => keys::sonnet_key(input),
        }
    }

    pub fn prompt(self, input: &str) -> String {
        match self {
            Generation::Translate => translate_prompt(input),
            Generation::Sonnet => sonnet_prompt(input),
        }
    }

    fn log_payload(self, input: &str) -> serde_json::Value {
        match self {
            Generation::Translate => serde_json::json!({ "text": input }),
            Generation::Sonnet => serde_json::json!({ "topic": input }),
        }
    }

    fn encode_output(self, output: String) -> Result<String, serde_json::Error> {
        match self {
            Generation::Translate => serde_json::to_string(&TranslateResponse {
                translated_text: output,
            }),
            Generation::Sonnet => serde_json::to_string(&SonnetResponse { sonnet: output }),
        }
    }

    /// 处理一次生成请求：校验 -> 查缓存 -> 记录日志 -> 调用补全接口 -> 写缓存
    pub async fn run(
        self,
        state: &AppState,
        client_ip: &str,
        input: Option<String>,
    ) -> Result<Response, AppError> {
        let input = input
            .filter(|value| !value.trim().is_empty())
            .ok_or(AppError::MissingField(self.field()))?;

        // 先查缓存，命中时原样返回
        let cache_key = self.cache_key(&input);
        if let Some(cached) = ResultCacheOperations::get_cached(&state.store, &cache_key).await? {
            return Ok(json_body(cached));
        }

        self.log_request(state, client_ip, &input).await?;

        let output = state.completion.complete(&self.prompt(&input)).await?;
        let payload = self.encode_output(output)?;

        ResultCacheOperations::store(
            &state.store,
            &cache_key,
            &payload,
            state.config.cache_ttl_secs,
        )
        .await?;

        Ok(json_body(payload))
    }

    async fn log_request(
        self,
        state: &AppState,
        client_ip: &str,
        input: &str,
    ) -> Result<(), AppError> {
        let entry = RequestLogEntry::new(client_ip, self.endpoint(), self.log_payload(input));
        let capacity = state.config.request_log_capacity;

        match state.config.audit_log_mode {
            AuditLogMode::Inline => {
                RequestLogOperations::log_request(&state.store, &entry, capacity).await?;
            }
            AuditLogMode::Background => {
                let store = state.store.clone();
                tokio::spawn(async move {
                    if let Err(e) = RequestLogOperations::log_request(&store, &entry, capacity).await
                    {
                        tracing::warn!("Failed to write request log for {}: {}", entry.endpoint, e);
                    }
                });
            }
        }

        Ok(())
    }
}

/// 直接使用已经序列化好的 JSON 作为响应体
fn json_body(payload: String) -> Response {
    ([(CONTENT_TYPE, "application/json")], payload).into_response()
}
