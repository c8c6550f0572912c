//! Sources of document body text.

use crate::config::TextConfig;
use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Produces the body text for a prompt.
pub trait TextService {
    /// Generate text for `prompt`.
    fn generate(&mut self, prompt: &str) -> Result<String, Error>;
}

impl<F> TextService for F
where
    F: FnMut(&str) -> Result<String, String>,
{
    fn generate(&mut self, prompt: &str) -> Result<String, Error> {
        self(prompt).map_err(Error::ExternalService)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    text: String,
}

/// A client for an OpenAI compatible `/v1/completions` endpoint, such as
/// the one served by vLLM.
#[derive(Debug, Clone)]
pub struct OpenAiCompletions {
    client: reqwest::blocking::Client,
    config: TextConfig,
}

impl OpenAiCompletions {
    /// Create a client. No request is made until the first generation.
    pub fn new(config: TextConfig) -> Result<Self, Error> {
        if config.endpoint.trim().is_empty() || config.model.trim().is_empty() {
            return Err(Error::InvalidParameter(
                "the text endpoint and model must be set".to_string(),
            ));
        }

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::ExternalService(e.to_string()))?;

        Ok(Self { client, config })
    }
}

impl TextService for OpenAiCompletions {
    fn generate(&mut self, prompt: &str) -> Result<String, Error> {
        let request = CompletionRequest {
            model: &self.config.model,
            prompt,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        let response: CompletionResponse = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .and_then(|r| r.error_for_status())
            .and_then(|r| r.json())
            .map_err(|e| Error::ExternalService(format!("{}: {e}", self.config.endpoint)))?;

        let text = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.text.trim().to_string())
            .ok_or_else(|| Error::ExternalService("the completion has no choices".to_string()))?;
        log::debug!("received {} characters of text", text.chars().count());

        Ok(text)
    }
}

/// Reads body text from the `*.txt` files of a directory, in name order,
/// starting over after the last file.
#[derive(Debug, Clone)]
pub struct TextDirectory {
    files: Vec<PathBuf>,
    next: usize,
}

impl TextDirectory {
    /// Collect the text files of `dir`.
    pub fn open(dir: &Path) -> Result<Self, Error> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|e| e == "txt") {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(Error::InvalidParameter(format!(
                "no .txt files in {}",
                dir.display()
            )));
        }

        Ok(Self { files, next: 0 })
    }
}

impl TextService for TextDirectory {
    fn generate(&mut self, _prompt: &str) -> Result<String, Error> {
        let path = &self.files[self.next];
        self.next = (self.next + 1) % self.files.len();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ExternalService(format!("{}: {e}", path.display())))?;
        Ok(text.trim().to_string())
    }
}
