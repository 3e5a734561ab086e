use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::llm::Provider;
use crate::state::ensure_tally_home;

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AuthState {
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl AuthState {
    pub fn key_for(&self, provider: Provider) -> Option<&str> {
        match provider {
            Provider::OpenAI => self.openai_api_key.as_deref(),
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
        }
    }

    pub fn set_key(&mut self, provider: Provider, key: String) {
        match provider {
            Provider::OpenAI => self.openai_api_key = Some(key),
            Provider::Anthropic => self.anthropic_api_key = Some(key),
        }
    }
}

fn auth_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("auth.json"))
}

pub fn load_auth_from(p: &Path) -> Result<AuthState> {
    if !p.exists() {
        return Ok(AuthState::default());
    }
    let s = fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parse {}", p.display()))
}

pub fn save_auth_to(auth: &AuthState, p: &Path) -> Result<()> {
    let s = serde_json::to_string_pretty(auth)?;
    fs::write(p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

/// API key for `provider`: the environment wins over `auth.json`.
pub fn api_key(provider: Provider) -> Result<String> {
    if let Ok(key) = std::env::var(provider.env_var()) {
        if !key.trim().is_empty() {
            return Ok(key.trim().to_string());
        }
    }
    let auth = load_auth_from(&auth_path()?)?;
    match auth.key_for(provider) {
        Some(k) if !k.is_empty() => Ok(k.to_string()),
        _ => bail!(
            "{provider} API key not set. Export {} or run: tally auth set-key --provider {provider}",
            provider.env_var()
        ),
    }
}

fn prompt_secret(label: &str) -> Result<String> {
    print!("{}: ", label);
    io::stdout().flush().ok();
    let mut s = String::new();
    io::stdin().read_line(&mut s)?;
    Ok(s.trim().to_string())
}

/// Store a key in `auth.json`, prompting on stdin when `key` is not given.
pub fn set_key(provider: Provider, key: Option<String>) -> Result<()> {
    let key = match key {
        Some(k) => k.trim().to_string(),
        None => prompt_secret(&format!("Paste {provider} API key"))?,
    };
    if key.is_empty() {
        bail!("empty API key");
    }
    if !key.starts_with(provider.key_prefix()) {
        bail!(
            "key didn't look like a {provider} key (expected prefix {})",
            provider.key_prefix()
        );
    }

    let p = auth_path()?;
    let mut auth = load_auth_from(&p)?;
    auth.set_key(provider, key);
    save_auth_to(&auth, &p)?;
    println!("Saved {provider} API key to {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_auth_file_roundtrip() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("auth.json");
        assert_eq!(load_auth_from(&p).unwrap(), AuthState::default());

        let mut auth = AuthState::default();
        auth.set_key(Provider::Anthropic, "sk-ant-test".to_string());
        save_auth_to(&auth, &p).unwrap();

        let loaded = load_auth_from(&p).unwrap();
        assert_eq!(loaded.key_for(Provider::Anthropic), Some("sk-ant-test"));
        assert_eq!(loaded.key_for(Provider::OpenAI), None);
    }
}
