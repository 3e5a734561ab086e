use anyhow::{bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth;
use crate::config::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Anthropic,
    OpenAI,
}

impl Provider {
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    pub fn key_prefix(&self) -> &'static str {
        match self {
            Provider::Anthropic => "sk-ant-",
            Provider::OpenAI => "sk-",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::Anthropic => "https://api.anthropic.com",
            Provider::OpenAI => "https://api.openai.com",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Provider::Anthropic => "anthropic",
            Provider::OpenAI => "openai",
        })
    }
}

impl FromStr for Provider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => bail!("unknown llm provider: {other} (expected openai or anthropic)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub provider: Provider,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LlmConfig {
    pub fn from_section(section: &LlmSection) -> Result<Self> {
        let provider: Provider = section.provider.parse()?;
        let base_url = section
            .base_url
            .clone()
            .unwrap_or_else(|| provider.default_base_url().to_string());
        Ok(Self {
            provider,
            model: section.model.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
            temperature: section.temperature,
            max_tokens: section.max_tokens,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Anything that can answer a system prompt plus conversation turns.
pub trait ChatBackend {
    fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String>;
}

/// Provider HTTP APIs over reqwest
pub struct HttpBackend {
    config: LlmConfig,
    api_key: String,
}

impl HttpBackend {
    pub fn new(config: LlmConfig, api_key: String) -> Self {
        Self { config, api_key }
    }

    /// Resolve the key for the configured provider from env or auth.json.
    pub fn from_config(config: LlmConfig) -> Result<Self> {
        let api_key = auth::api_key(config.provider)?;
        Ok(Self::new(config, api_key))
    }
}

impl ChatBackend for HttpBackend {
    fn complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        // Called from inside #[tokio::main]; a nested runtime would panic there.
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            tokio::task::block_in_place(|| handle.block_on(self.complete_async(system, turns)))
        } else {
            let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
            rt.block_on(self.complete_async(system, turns))
        }
    }
}

impl HttpBackend {
    async fn complete_async(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        tracing::debug!(
            provider = %self.config.provider,
            model = %self.config.model,
            turns = turns.len(),
            "sending chat request"
        );
        match self.config.provider {
            Provider::Anthropic => self.anthropic_complete(system, turns).await,
            Provider::OpenAI => self.openai_complete(system, turns).await,
        }
    }

    async fn anthropic_complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: u32,
            temperature: f32,
            system: &'a str,
            messages: &'a [ChatTurn],
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            system,
            messages: turns,
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(&self.api_key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/v1/messages", self.config.base_url))
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s)
    }

    async fn openai_complete(&self, system: &str, turns: &[ChatTurn]) -> Result<String> {
        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<ChatTurn>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let mut messages = Vec::with_capacity(turns.len() + 1);
        messages.push(ChatTurn {
            role: "system".to_string(),
            content: system.to_string(),
        });
        messages.extend(turns.iter().cloned());

        let body = Req {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
        };

        let client = reqwest::Client::new();
        let resp = client
            .post(format!("{}/v1/chat/completions", self.config.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        Ok(out
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default())
    }
}
