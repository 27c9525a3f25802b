//! Concept extraction over a streamed chat completion.

use super::{collect_fragments, parse_concepts, ConceptExtractor};
use crate::config::{ChatSettings, Prompts, Settings};
use crate::error::{OrgSearchError, Result};
use crate::openai::create_client;
use crate::retry::{retry_with_backoff, RetryPolicy};
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use futures::StreamExt;
use tracing::{debug, info, instrument};

/// Extracts concepts by streaming a chat completion from an OpenAI-compatible API.
pub struct ChatConceptExtractor {
    client: Client<OpenAIConfig>,
    settings: ChatSettings,
    prompts: Prompts,
    retry: RetryPolicy,
}

impl ChatConceptExtractor {
    /// Create an extractor from chat settings. Requires an API key.
    pub fn new(settings: ChatSettings) -> Result<Self> {
        let client = create_client(&settings)?;
        Ok(Self::with_client(client, settings))
    }

    /// Create an extractor with the configured prompts and retry policy.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompt_dir().as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self::new(settings.chat.clone())?
            .with_prompts(prompts)
            .with_retry(RetryPolicy::from(&settings.retry)))
    }

    /// Create an extractor around an existing client.
    pub fn with_client(client: Client<OpenAIConfig>, settings: ChatSettings) -> Self {
        Self {
            client,
            settings,
            prompts: Prompts::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[allow(deprecated)]
    fn build_request(&self, text: &str) -> Result<CreateChatCompletionRequest> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.prompts.concept_system())
                .build()
                .map_err(|e| OrgSearchError::ChatCompletion(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(text)
                .build()
                .map_err(|e| OrgSearchError::ChatCompletion(e.to_string()))?
                .into(),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.settings.model)
            .messages(messages)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .top_p(self.settings.top_p)
            .stream(true)
            .build()
            .map_err(|e| OrgSearchError::ChatCompletion(e.to_string()))
    }

    /// Open the stream and drain it into one buffer.
    async fn stream_response(&self, request: CreateChatCompletionRequest) -> Result<String> {
        let stream = self
            .client
            .chat()
            .create_stream(request)
            .await
            .map_err(|e| OrgSearchError::ChatCompletion(e.to_string()))?;

        let fragments = stream.map(|chunk| {
            chunk
                .map(|response| {
                    response
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .unwrap_or_default()
                })
                .map_err(|e| OrgSearchError::ChatCompletion(e.to_string()))
        });

        collect_fragments(fragments).await
    }
}

#[async_trait]
impl ConceptExtractor for ChatConceptExtractor {
    #[instrument(skip(self, text))]
    async fn extract(&self, text: &str) -> Result<String> {
        if text.trim().is_empty() {
            return Err(OrgSearchError::InvalidInput("Missing query text".to_string()));
        }

        let request = self.build_request(text)?;

        let buffer = retry_with_backoff(&self.retry, "chat completion", || {
            self.stream_response(request.clone())
        })
        .await?;

        debug!(
            "Concept response: {}",
            buffer.chars().take(500).collect::<String>()
        );

        let concepts = parse_concepts(&buffer)?;
        info!("Extracted concepts: {}", concepts);
        Ok(concepts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chunk(content: &str) -> String {
        let payload = serde_json::json!({
            "id": "chatcmpl-1",
            "object": "chat.completion.chunk",
            "created": 1_700_000_000u32,
            "model": "llama-3.3-70b-versatile",
            "choices": [{
                "index": 0,
                "delta": { "content": content },
                "finish_reason": null
            }]
        });
        format!("data: {}\n\n", payload)
    }

    fn sse_body(fragments: &[&str]) -> String {
        let mut body: String = fragments.iter().map(|f| chunk(f)).collect();
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn extractor(server: &MockServer) -> ChatConceptExtractor {
        let settings = ChatSettings {
            api_base: server.uri(),
            api_key: Some("gsk_test".to_string()),
            ..ChatSettings::default()
        };
        ChatConceptExtractor::new(settings)
            .unwrap()
            .with_retry(RetryPolicy::new(3, Duration::from_millis(1)))
    }

    #[test]
    fn test_request_carries_sampling_parameters() {
        let settings = ChatSettings {
            api_key: Some("gsk_test".to_string()),
            ..ChatSettings::default()
        };
        let extractor = ChatConceptExtractor::new(settings).unwrap();
        let request = extractor.build_request("What is torque?").unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["max_tokens"], 4096);
        assert_eq!(json["stream"], true);
        assert!(json.get("stop").is_none());
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "What is torque?");
    }

    #[test]
    fn test_from_settings_uses_custom_prompts_and_retry() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("concepts.toml"),
            "system = \"List the {{subject}} concepts as JSON.\"\n",
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.chat.api_key = Some("gsk_test".to_string());
        settings.prompts.custom_dir = Some(dir.path().to_string_lossy().into_owned());
        settings
            .prompts
            .variables
            .insert("subject".to_string(), "physics".to_string());
        settings.retry.max_attempts = 2;

        let extractor = ChatConceptExtractor::from_settings(&settings).unwrap();
        assert_eq!(extractor.retry.max_attempts, 2);

        let json = serde_json::to_value(extractor.build_request("What is torque?").unwrap()).unwrap();
        assert_eq!(json["messages"][0]["content"], "List the physics concepts as JSON.");
    }

    #[test]
    fn test_from_settings_requires_api_key() {
        let err = ChatConceptExtractor::from_settings(&Settings::default())
            .err()
            .unwrap();
        assert!(matches!(err, OrgSearchError::Config(_)));
    }

    #[tokio::test]
    async fn test_extract_from_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(serde_json::json!({ "stream": true })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse_body(&["```json\n{\"concepts\": ", "\"derivatives of functions\"}", "\n```"]),
                "text/event-stream",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let concepts = extractor(&server)
            .extract("What is the derivative of a function?")
            .await
            .unwrap();
        assert_eq!(concepts, "derivatives of functions");
    }

    #[tokio::test]
    async fn test_retries_failed_stream() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse_body(&["{\"concepts\": \"Ohm's Law\"}"]),
                "text/event-stream",
            ))
            .mount(&server)
            .await;

        let concepts = extractor(&server).extract("What is resistance?").await.unwrap();
        assert_eq!(concepts, "Ohm's Law");
    }

    #[tokio::test]
    async fn test_prose_answer_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                sse_body(&["Sorry, I can only help with STEM questions."]),
                "text/event-stream",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let err = extractor(&server).extract("Tell me a joke").await.unwrap_err();
        assert!(matches!(err, OrgSearchError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_blank_text_makes_no_call() {
        let server = MockServer::start().await;
        let err = extractor(&server).extract("   ").await.unwrap_err();
        assert!(matches!(err, OrgSearchError::InvalidInput(_)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
