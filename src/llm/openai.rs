use crate::llm::client::{LLMClient, LLMResponse, RequestOptions, TokenUsage, ToolChoice};
use crate::types::{
    AppError, ConversationMessage, ExecutionErrorKind, MessageRole, Result, ToolCall,
    ToolDefinition,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};

/// Chat-completions client for OpenAI and Azure OpenAI endpoints.
pub struct OpenAIClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    model: String,
    default_temperature: Option<f32>,
}

enum Endpoint {
    OpenAI {
        api_base: String,
        api_key: String,
    },
    Azure {
        endpoint: String,
        api_key: String,
        api_version: String,
    },
}

impl OpenAIClient {
    pub fn new(api_key: String, api_base: String, model: String) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            endpoint: Endpoint::OpenAI { api_base, api_key },
            model,
            default_temperature: None,
        })
    }

    pub fn azure(
        api_key: String,
        endpoint: String,
        deployment: String,
        api_version: String,
    ) -> Result<Self> {
        Ok(Self {
            http: build_http()?,
            endpoint: Endpoint::Azure {
                endpoint,
                api_key,
                api_version,
            },
            model: deployment,
            default_temperature: None,
        })
    }

    /// Temperature sent when a request does not set its own
    pub fn with_default_temperature(mut self, temperature: Option<f32>) -> Self {
        self.default_temperature = temperature;
        self
    }

    fn request(&self) -> reqwest::RequestBuilder {
        match &self.endpoint {
            Endpoint::OpenAI { api_base, api_key } => self
                .http
                .post(format!("{}/chat/completions", api_base.trim_end_matches('/')))
                .bearer_auth(api_key),
            Endpoint::Azure {
                endpoint,
                api_key,
                api_version,
            } => self
                .http
                .post(format!(
                    "{}/openai/deployments/{}/chat/completions",
                    endpoint.trim_end_matches('/'),
                    self.model
                ))
                .query(&[("api-version", api_version.as_str())])
                .header("api-key", api_key),
        }
    }

    fn build_body(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
        options: &RequestOptions,
    ) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": messages.iter().map(message_to_wire).collect::<Vec<_>>(),
        });

        if !tools.is_empty() {
            body["tools"] = tools
                .iter()
                .map(|tool| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": tool.name,
                            "description": tool.description,
                            "parameters": tool.parameters,
                        }
                    })
                })
                .collect();
            body["tool_choice"] = json!(match options.tool_choice {
                ToolChoice::Auto => "auto",
                ToolChoice::Required => "required",
                ToolChoice::None => "none",
            });
        }

        if let Some(format) = &options.response_format {
            body["response_format"] = json!({
                "type": "json_schema",
                "json_schema": {
                    "name": format.name,
                    "schema": format.schema,
                    "strict": false,
                }
            });
        }

        if let Some(temperature) = options.temperature.or(self.default_temperature) {
            body["temperature"] = json!(temperature);
        }

        body
    }
}

fn build_http() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))
}

fn message_to_wire(message: &ConversationMessage) -> Value {
    match message.role {
        MessageRole::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id.clone().unwrap_or_default(),
            "content": message.content,
        }),
        MessageRole::Assistant if !message.tool_calls.is_empty() => {
            let calls: Vec<Value> = message
                .tool_calls
                .iter()
                .map(|call| {
                    json!({
                        "id": call.id,
                        "type": "function",
                        "function": {
                            "name": call.name,
                            "arguments": call.arguments.to_string(),
                        }
                    })
                })
                .collect();
            let content = if message.content.is_empty() {
                Value::Null
            } else {
                Value::String(message.content.clone())
            };
            json!({ "role": "assistant", "content": content, "tool_calls": calls })
        }
        role => json!({ "role": role.as_str(), "content": message.content }),
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[async_trait]
impl LLMClient for OpenAIClient {
    async fn generate_with_tools_and_history(
        &self,
        messages: &[ConversationMessage],
        tools: &[ToolDefinition],
        options: &RequestOptions,
    ) -> Result<LLMResponse> {
        let body = self.build_body(messages, tools, options);

        let response = self.request().json(&body).send().await.map_err(|e| {
            let kind = if e.is_timeout() {
                ExecutionErrorKind::Timeout
            } else {
                ExecutionErrorKind::Transport
            };
            AppError::execution(kind, format!("Request to model endpoint failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            let kind = match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    ExecutionErrorKind::Authentication
                }
                _ => ExecutionErrorKind::Model,
            };
            return Err(AppError::execution(
                kind,
                format!("Model endpoint returned {}: {}", status, detail),
            ));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::execution(
                ExecutionErrorKind::Model,
                format!("Malformed completion response: {}", e),
            )
        })?;

        let choice = completion.choices.into_iter().next().ok_or_else(|| {
            AppError::execution(ExecutionErrorKind::Model, "No choices in completion response")
        })?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: serde_json::from_str(&call.function.arguments)
                    .unwrap_or_else(|_| json!({})),
            })
            .collect();

        Ok(LLMResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            usage: completion
                .usage
                .map(|u| TokenUsage::new(u.prompt_tokens, u.completion_tokens)),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::ResponseFormat;

    fn client() -> OpenAIClient {
        OpenAIClient::new(
            "sk-test".to_string(),
            "https://api.openai.com/v1".to_string(),
            "gpt-4o-mini".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_body_omits_tools_when_none_offered() {
        let body = client().build_body(
            &[ConversationMessage::user("hi")],
            &[],
            &RequestOptions::default(),
        );
        assert!(body.get("tools").is_none());
        assert!(body.get("tool_choice").is_none());
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn test_body_carries_schema_and_required_choice() {
        let tools = vec![ToolDefinition {
            name: "web_search".to_string(),
            description: "Search".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        }];
        let options = RequestOptions {
            tool_choice: ToolChoice::Required,
            response_format: Some(ResponseFormat {
                name: "Report".to_string(),
                schema: json!({"type": "object"}),
            }),
            temperature: Some(0.2),
        };
        let body = client().build_body(&[ConversationMessage::user("hi")], &tools, &options);
        assert_eq!(body["tool_choice"], "required");
        assert_eq!(body["tools"][0]["function"]["name"], "web_search");
        assert_eq!(body["response_format"]["json_schema"]["name"], "Report");
    }

    #[test]
    fn test_default_temperature_yields_to_request() {
        let client = client().with_default_temperature(Some(0.5));
        let messages = [ConversationMessage::user("hi")];

        let body = client.build_body(&messages, &[], &RequestOptions::default());
        assert_eq!(body["temperature"], 0.5);

        let options = RequestOptions {
            temperature: Some(1.0),
            ..RequestOptions::default()
        };
        let body = client.build_body(&messages, &[], &options);
        assert_eq!(body["temperature"], 1.0);
    }

    #[test]
    fn test_assistant_tool_call_wire_shape() {
        let msg = ConversationMessage::assistant(
            "",
            vec![ToolCall {
                id: "call_1".to_string(),
                name: "get_weather".to_string(),
                arguments: json!({"city": "Oslo"}),
            }],
        );
        let wire = message_to_wire(&msg);
        assert!(wire["content"].is_null());
        assert_eq!(wire["tool_calls"][0]["function"]["name"], "get_weather");
        assert!(wire["tool_calls"][0]["function"]["arguments"].is_string());

        let result = message_to_wire(&ConversationMessage::tool_result("call_1", &json!("ok")));
        assert_eq!(result["tool_call_id"], "call_1");
    }
}
