use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::{LlmConfig, RulesConfig};
use crate::engine::content::{ContentGenerator, GenerationError};
use crate::engine::prompt_builder::PromptBuilder;
use crate::model::character::Character;
use crate::model::llm_decode::{decode_mission, decode_scenario};
use crate::model::mission::Mission;
use crate::model::scenario::Scenario;

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

#[derive(Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    pub fn first_content(self) -> Result<String, GenerationError> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(GenerationError::EmptyCompletion)
    }
}

/// Runs `op` up to `max_attempts` times, sleeping `backoff * attempt`
/// between retryable failures.
pub fn with_retries<T>(
    max_attempts: u32,
    backoff: Duration,
    mut op: impl FnMut(u32) -> Result<T, GenerationError>,
) -> Result<T, GenerationError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                log::debug!("attempt {}/{} failed: {}", attempt, max_attempts, e);
                thread::sleep(backoff * attempt);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

/// Content generator backed by an OpenAI-compatible chat completions server
/// (LM Studio, llama.cpp server, hosted APIs).
pub struct LlmContentGenerator {
    client: Client,
    config: LlmConfig,
    rules: RulesConfig,
}

impl LlmContentGenerator {
    pub fn new(config: LlmConfig, rules: RulesConfig) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config, rules })
    }

    pub fn build_request(&self, system: String, user: String) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            response_format: ResponseFormat {
                kind: "json_object".into(),
            },
            messages: vec![
                ChatMessage {
                    role: "system".into(),
                    content: system,
                },
                ChatMessage {
                    role: "user".into(),
                    content: user,
                },
            ],
        }
    }

    fn call_once(&self, req: &ChatCompletionRequest) -> Result<String, GenerationError> {
        let mut builder = self.client.post(&self.config.endpoint).json(req);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // A 200 with a body that isn't a completion (proxy pages, truncated
        // output) is bad content, not a transport failure.
        let body = resp.text()?;
        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| GenerationError::Malformed(format!("completion envelope: {}", e)))?;
        let content = parsed.first_content()?;
        log::trace!("completion: {} bytes", content.len());
        Ok(content)
    }

    fn complete(&self, user_prompt: String) -> Result<String, GenerationError> {
        let system = PromptBuilder::new(&self.rules).system_prompt();
        let req = self.build_request(system, user_prompt);
        log::trace!("prompt: {} bytes", req.messages[1].content.len());

        with_retries(
            self.config.max_attempts,
            Duration::from_millis(self.config.retry_backoff_ms),
            |_| self.call_once(&req),
        )
    }
}

impl ContentGenerator for LlmContentGenerator {
    fn generate_mission(
        &self,
        character: &Character,
        player_name: &str,
        turn_count: u32,
    ) -> Result<Mission, GenerationError> {
        let prompt = PromptBuilder::new(&self.rules).mission_prompt(character, player_name, turn_count);
        let content = self.complete(prompt)?;
        decode_mission(&content, turn_count)
    }

    fn generate_scenario(
        &self,
        character: &Character,
        player_name: &str,
        mission: &Mission,
        suspicion: f64,
        turn_count: u32,
    ) -> Result<Scenario, GenerationError> {
        let prompt = PromptBuilder::new(&self.rules).scenario_prompt(
            character,
            player_name,
            mission,
            suspicion,
            turn_count,
        );
        let content = self.complete(prompt)?;
        decode_scenario(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serves every connection with a fixed 200 response and counts requests.
    fn serve_ok(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                counter.fetch_add(1, Ordering::SeqCst);
                read_request(&mut stream);
                let resp = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                let _ = stream.write_all(resp.as_bytes());
                let _ = stream.flush();
            }
        });

        (format!("http://{}/v1/chat/completions", addr), hits)
    }

    fn read_request(stream: &mut std::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let Ok(n) = stream.read(&mut chunk) else { return };
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let text = String::from_utf8_lossy(&buf);
            let Some(header_end) = text.find("\r\n\r\n") else { continue };
            let content_length = text[..header_end]
                .lines()
                .filter_map(|l| l.split_once(':'))
                .find(|(k, _)| k.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, v)| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                return;
            }
        }
    }

    fn generator_for(endpoint: String, max_attempts: u32) -> LlmContentGenerator {
        let config = LlmConfig {
            endpoint,
            max_attempts,
            retry_backoff_ms: 0,
            timeout_secs: 5,
            ..LlmConfig::default()
        };
        LlmContentGenerator::new(config, RulesConfig::default()).unwrap()
    }

    #[test]
    fn non_json_body_is_malformed_and_not_retried() {
        let (endpoint, hits) = serve_ok("<html>proxy error page</html>");
        let generator = generator_for(endpoint, 3);

        let err = generator.complete("hello".into()).unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)), "got {:?}", err);
        assert!(!err.is_retryable());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn completion_content_is_returned() {
        let (endpoint, hits) =
            serve_ok(r#"{"choices":[{"message":{"content":"{\"title\":\"x\"}"}}]}"#);
        let generator = generator_for(endpoint, 3);

        assert_eq!(generator.complete("hello".into()).unwrap(), r#"{"title":"x"}"#);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn request_shape() {
        let generator =
            LlmContentGenerator::new(LlmConfig::default(), RulesConfig::default()).unwrap();
        let req = generator.build_request("sys".into(), "user".into());
        let json = serde_json::to_value(&req).unwrap();

        assert_eq!(json["model"], "local-model");
        assert_eq!(json["response_format"]["type"], "json_object");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "user");
    }

    #[test]
    fn first_content_rejects_empty_completions() {
        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":"{\"a\":1}"}}]}"#).unwrap();
        assert_eq!(resp.first_content().unwrap(), "{\"a\":1}");

        let resp: ChatCompletionResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(resp.first_content(), Err(GenerationError::EmptyCompletion)));

        let resp: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap();
        assert!(matches!(resp.first_content(), Err(GenerationError::EmptyCompletion)));
    }

    #[test]
    fn retries_only_retryable_errors() {
        let mut calls = 0;
        let result: Result<(), _> = with_retries(3, Duration::ZERO, |_| {
            calls += 1;
            Err(GenerationError::EmptyCompletion)
        });
        assert!(result.is_err());
        assert_eq!(calls, 3);

        let mut calls = 0;
        let result: Result<(), _> = with_retries(3, Duration::ZERO, |_| {
            calls += 1;
            Err(GenerationError::Malformed("bad".into()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn retry_recovers() {
        let result = with_retries(2, Duration::ZERO, |attempt| {
            if attempt == 1 {
                Err(GenerationError::Status {
                    status: 502,
                    body: String::new(),
                })
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn zero_attempts_still_tries_once() {
        let mut calls = 0;
        let _ = with_retries(0, Duration::ZERO, |_| -> Result<(), GenerationError> {
            calls += 1;
            Err(GenerationError::EmptyCompletion)
        });
        assert_eq!(calls, 1);
    }
}
