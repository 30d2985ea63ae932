//! LLM backends.
//!
//! Every supported provider exposes an OpenAI-compatible chat completions
//! endpoint, so one HTTP client covers them all; only the base URL and the
//! API key variable differ.
//!
//! | Provider | Prefix | Key variable |
//! |----------|--------|--------------|
//! | OpenAI | `openai:` (default) | `OPENAI_API_KEY` |
//! | Google Gemini | `gemini:` | `GOOGLE_API_KEY` |
//! | OpenRouter | `openrouter:` | `OPENROUTER_API_KEY` |
//! | Ollama | `ollama:` | none, URL from `OLLAMA_API_URL` |
//! | Groq | `groq:` | `GROQ_API_KEY` |
//! | DeepSeek | `deepseek:` | `DEEPSEEK_API_KEY` |
//!
//! The HTTP client needs the `network` feature. Without it, anything
//! implementing [`Classifier`] can still drive the runner.

use crate::{Error, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Variables read for provider credentials and endpoints.
pub const ENV_VARS: [&str; 7] = [
    "OPENAI_API_KEY",
    "GROQ_API_KEY",
    "ANTHROPIC_API_KEY",
    "GOOGLE_API_KEY",
    "DEEPSEEK_API_KEY",
    "OPENROUTER_API_KEY",
    "OLLAMA_API_URL",
];

const OLLAMA_DEFAULT_URL: &str = "http://localhost:11434/v1";

/// An OpenAI-compatible API host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// api.openai.com
    OpenAI,
    /// Google's OpenAI-compatible Gemini endpoint.
    Gemini,
    /// openrouter.ai, rate limited.
    OpenRouter,
    /// Self-hosted Ollama.
    Ollama,
    /// api.groq.com
    Groq,
    /// api.deepseek.com
    DeepSeek,
}

impl Provider {
    /// Prefix used in model identifiers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAI => "openai",
            Provider::Gemini => "gemini",
            Provider::OpenRouter => "openrouter",
            Provider::Ollama => "ollama",
            Provider::Groq => "groq",
            Provider::DeepSeek => "deepseek",
        }
    }

    /// Variable holding the API key, if the provider needs one.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAI => Some("OPENAI_API_KEY"),
            Provider::Gemini => Some("GOOGLE_API_KEY"),
            Provider::OpenRouter => Some("OPENROUTER_API_KEY"),
            Provider::Ollama => None,
            Provider::Groq => Some("GROQ_API_KEY"),
            Provider::DeepSeek => Some("DEEPSEEK_API_KEY"),
        }
    }

    /// Base URL of the chat completions API, without a trailing slash.
    pub fn base_url(&self) -> String {
        match self {
            Provider::OpenAI => "https://api.openai.com/v1".to_string(),
            Provider::Gemini => {
                "https://generativelanguage.googleapis.com/v1beta/openai".to_string()
            }
            Provider::OpenRouter => "https://openrouter.ai/api/v1".to_string(),
            Provider::Ollama => std::env::var("OLLAMA_API_URL")
                .unwrap_or_else(|_| OLLAMA_DEFAULT_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            Provider::Groq => "https://api.groq.com/openai/v1".to_string(),
            Provider::DeepSeek => "https://api.deepseek.com/v1".to_string(),
        }
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "gemini" => Ok(Provider::Gemini),
            "openrouter" => Ok(Provider::OpenRouter),
            "ollama" => Ok(Provider::Ollama),
            "groq" => Ok(Provider::Groq),
            "deepseek" => Ok(Provider::DeepSeek),
            other => Err(Error::invalid_input(format!(
                "unknown provider '{}'; expected one of openai, gemini, openrouter, ollama, groq, deepseek",
                other
            ))),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `provider:model` identifier, as used for result-file keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelId {
    raw: String,
    provider: Provider,
    model: String,
}

impl ModelId {
    /// Parse an identifier. Without a `provider:` prefix the provider is OpenAI.
    ///
    /// ```rust
    /// use c3pa_eval::infer::client::{ModelId, Provider};
    ///
    /// let id = ModelId::parse("gemini:gemini-2.0-flash").unwrap();
    /// assert_eq!(id.provider(), Provider::Gemini);
    /// assert_eq!(id.model(), "gemini-2.0-flash");
    /// assert_eq!(ModelId::parse("gpt-4.1").unwrap().provider(), Provider::OpenAI);
    /// ```
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (provider, model) = match raw.split_once(':') {
            Some((prefix, model)) => (prefix.parse()?, model),
            None => (Provider::OpenAI, raw),
        };
        if model.is_empty() {
            return Err(Error::invalid_input(format!("model id '{}' has no model name", raw)));
        }
        Ok(Self {
            raw: raw.to_string(),
            provider,
            model: model.to_string(),
        })
    }

    /// The identifier exactly as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Provider part.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Model name sent to the provider.
    pub fn model(&self) -> &str {
        &self.model
    }
}

impl FromStr for ModelId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Split a comma-separated model list, skipping blanks.
pub fn parse_model_list(list: &str) -> Result<Vec<ModelId>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ModelId::parse)
        .collect()
}

/// Names of credential variables that are not set.
pub fn missing_env_vars() -> Vec<&'static str> {
    ENV_VARS
        .iter()
        .copied()
        .filter(|var| std::env::var_os(var).is_none())
        .collect()
}

/// Something that assigns a label to a prompt pair.
///
/// Implementations are shared across worker threads.
pub trait Classifier: Send + Sync {
    /// Identifier used as the result-set key.
    fn model_id(&self) -> &str;

    /// Raw model answer for one system and user prompt.
    fn classify(&self, system_prompt: &str, user_prompt: &str) -> Result<String>;
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn model_id(&self) -> &str {
        (**self).model_id()
    }

    fn classify(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
        (**self).classify(system_prompt, user_prompt)
    }
}

/// Scripted classifier for tests and dry runs.
///
/// Answers with the first rule whose key occurs in the user prompt, else the
/// default answer.
///
/// ```rust
/// use c3pa_eval::infer::client::{Classifier, MockClassifier};
///
/// let mock = MockClassifier::new("mock:echo", "Updated Privacy Policy")
///     .with_rule("delete", "Description of Right to Delete");
/// assert_eq!(mock.classify("", "you may delete it").unwrap(), "Description of Right to Delete");
/// assert_eq!(mock.calls(), 1);
/// ```
#[derive(Debug)]
pub struct MockClassifier {
    id: String,
    default: String,
    rules: Vec<(String, String)>,
    fail_after: Option<usize>,
    calls: AtomicUsize,
}

impl MockClassifier {
    /// Mock answering `default` to everything.
    #[must_use]
    pub fn new(id: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            default: default.into(),
            rules: Vec::new(),
            fail_after: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer `answer` when `needle` occurs in the user prompt.
    #[must_use]
    pub fn with_rule(mut self, needle: impl Into<String>, answer: impl Into<String>) -> Self {
        self.rules.push((needle.into(), answer.into()));
        self
    }

    /// Fail every call after the first `n`.
    #[must_use]
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    /// Calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Classifier for MockClassifier {
    fn model_id(&self) -> &str {
        &self.id
    }

    fn classify(&self, _system_prompt: &str, user_prompt: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| n >= limit) {
            return Err(Error::inference(format!("{}: scripted failure on call {}", self.id, n + 1)));
        }
        let answer = self
            .rules
            .iter()
            .find(|(needle, _)| user_prompt.contains(needle.as_str()))
            .map_or(&self.default, |(_, answer)| answer);
        Ok(answer.clone())
    }
}

#[cfg(feature = "network")]
pub use http::ChatClient;

#[cfg(feature = "network")]
mod http {
    use super::{Classifier, ModelId, Provider};
    use crate::infer::rate_limit::FixedWindowLimiter;
    use crate::{Error, Result};
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    const MAX_RETRIES: u32 = 5;
    const TIMEOUT: Duration = Duration::from_secs(120);

    #[derive(Serialize)]
    struct ChatRequest<'a> {
        model: &'a str,
        messages: [Message<'a>; 2],
        temperature: f32,
    }

    #[derive(Serialize)]
    struct Message<'a> {
        role: &'static str,
        content: &'a str,
    }

    #[derive(Deserialize)]
    struct ChatResponse {
        choices: Vec<Choice>,
    }

    #[derive(Deserialize)]
    struct Choice {
        message: ResponseMessage,
    }

    #[derive(Deserialize)]
    struct ResponseMessage {
        #[serde(default)]
        content: Option<String>,
    }

    /// Blocking chat completions client for one model.
    pub struct ChatClient {
        id: ModelId,
        endpoint: String,
        api_key: Option<String>,
        limiter: Option<FixedWindowLimiter>,
        agent: ureq::Agent,
    }

    impl ChatClient {
        /// Client for `id`, with the key taken from the provider's variable.
        ///
        /// # Errors
        ///
        /// Fails if the provider needs a key and its variable is unset.
        pub fn new(id: ModelId) -> Result<Self> {
            let provider = id.provider();
            let api_key = match provider.api_key_var() {
                Some(var) => Some(std::env::var(var).map_err(|_| {
                    Error::backend(format!("{} requires {} to be set", id, var))
                })?),
                None => None,
            };
            Ok(Self::with_key(id, api_key))
        }

        /// Client for `id` with an explicit key.
        pub fn with_key(id: ModelId, api_key: Option<String>) -> Self {
            let provider = id.provider();
            let limiter = (provider == Provider::OpenRouter).then(FixedWindowLimiter::openrouter);
            Self {
                endpoint: format!("{}/chat/completions", provider.base_url()),
                api_key,
                limiter,
                agent: ureq::AgentBuilder::new().timeout(TIMEOUT).build(),
                id,
            }
        }

        fn send(&self, request: &ChatRequest<'_>) -> Result<ChatResponse> {
            let mut attempt = 0;
            loop {
                if let Some(limiter) = &self.limiter {
                    limiter.acquire();
                }
                let mut call = self.agent.post(&self.endpoint);
                if let Some(key) = &self.api_key {
                    call = call.set("Authorization", &format!("Bearer {}", key));
                }
                let retryable = match call.send_json(request) {
                    Ok(response) => {
                        return response.into_json().map_err(|e| {
                            Error::backend(format!("{}: malformed response: {}", self.id, e))
                        })
                    }
                    Err(ureq::Error::Status(code, response)) => {
                        let body = response.into_string().unwrap_or_default();
                        if code != 429 && code < 500 {
                            return Err(Error::backend(format!(
                                "{}: HTTP {}: {}",
                                self.id, code, body
                            )));
                        }
                        format!("HTTP {}", code)
                    }
                    Err(e) => e.to_string(),
                };

                attempt += 1;
                if attempt > MAX_RETRIES {
                    return Err(Error::backend(format!(
                        "{}: giving up after {} attempts: {}",
                        self.id, attempt, retryable
                    )));
                }
                let backoff = Duration::from_secs(1 << attempt.min(5));
                log::warn!("[{}] {}; retrying in {:?}", self.id, retryable, backoff);
                std::thread::sleep(backoff);
            }
        }
    }

    impl Classifier for ChatClient {
        fn model_id(&self) -> &str {
            self.id.as_str()
        }

        fn classify(&self, system_prompt: &str, user_prompt: &str) -> Result<String> {
            let request = ChatRequest {
                model: self.id.model(),
                messages: [
                    Message {
                        role: "system",
                        content: system_prompt,
                    },
                    Message {
                        role: "user",
                        content: user_prompt,
                    },
                ],
                temperature: 0.0,
            };
            let response = self.send(&request)?;
            response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .map(|content| content.trim().to_string())
                .ok_or_else(|| Error::inference(format!("{}: response has no content", self.id)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_model_ids() {
        let id = ModelId::parse("openrouter:meta-llama/llama-3-70b:free").unwrap();
        assert_eq!(id.provider(), Provider::OpenRouter);
        assert_eq!(id.model(), "meta-llama/llama-3-70b:free");
        assert_eq!(id.to_string(), "openrouter:meta-llama/llama-3-70b:free");

        let id: ModelId = "OLLAMA:llama2".parse().unwrap();
        assert_eq!(id.provider(), Provider::Ollama);
        assert!(Provider::Ollama.api_key_var().is_none());
    }

    #[test]
    fn test_unknown_provider_rejected() {
        let err = ModelId::parse("acme:model-1").unwrap_err();
        assert!(err.to_string().contains("unknown provider 'acme'"));
        assert!(ModelId::parse("openai:").is_err());
    }

    #[test]
    fn test_parse_model_list() {
        let ids = parse_model_list(" openai:gpt-4.1-mini, ,gemini:gemini-2.0-flash,").unwrap();
        let names: Vec<_> = ids.iter().map(ModelId::as_str).collect();
        assert_eq!(names, vec!["openai:gpt-4.1-mini", "gemini:gemini-2.0-flash"]);
    }

    #[test]
    fn test_base_urls_have_no_trailing_slash() {
        for provider in [
            Provider::OpenAI,
            Provider::Gemini,
            Provider::OpenRouter,
            Provider::Groq,
            Provider::DeepSeek,
        ] {
            assert!(!provider.base_url().ends_with('/'), "{}", provider);
        }
    }

    #[test]
    fn test_mock_failure() {
        let mock = MockClassifier::new("m", "X").failing_after(1);
        assert!(mock.classify("", "").is_ok());
        assert!(matches!(mock.classify("", ""), Err(Error::Inference(_))));
        assert_eq!(mock.calls(), 2);
    }
}
