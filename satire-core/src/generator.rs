//! Story generation with remote model and local fallback.
//!
//! `StoryGenerator::generate` is total: it always returns text. The remote
//! model is tried first under a bounded timeout; any failure degrades to the
//! deterministic local renderer in [`crate::fallback`]. Which path ran is
//! preserved in [`Generation`] for diagnostics, but callers only need
//! [`Generation::into_text`].

use crate::fallback;
use gemini::{Gemini, Request};
use std::time::Duration;
use tracing::{info, warn};

/// Instruction sent alongside every prompt on the remote path.
const SATIRE_INSTRUCTION: &str = "\
You write satirical news stories in the style of a parody newspaper. \
Every story should read like it came from a real news desk, with an official \
tone, invented quotes, and named-but-fictional sources. Make the story absurd \
enough to be recognizable as satire, yet plausible enough that a careless \
reader might not notice. Write one complete story for the prompt you are \
given, body text only.";

const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(8);
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2048;

/// Configuration for the story generator.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Model override (defaults to the client's model).
    pub model: Option<String>,

    /// Temperature for remote generation.
    pub temperature: Option<f32>,

    /// Cap on remote output length.
    pub max_output_tokens: u32,

    /// How long to wait for the remote model before falling back.
    pub remote_timeout: Duration,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: None,
            temperature: Some(0.9),
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            remote_timeout: DEFAULT_REMOTE_TIMEOUT,
        }
    }
}

impl GeneratorConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }

    pub fn with_remote_timeout(mut self, remote_timeout: Duration) -> Self {
        self.remote_timeout = remote_timeout;
        self
    }
}

/// Why generation fell back to the local renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No remote client was configured.
    Offline,
    /// The remote call failed (network, API, or decode error).
    RemoteError,
    /// The remote call exceeded the configured timeout.
    Timeout,
    /// The remote call succeeded but returned no usable text.
    EmptyResponse,
}

/// Outcome of a generation attempt. The public contract is just text; the
/// variant records which path produced it.
#[derive(Debug, Clone)]
pub enum Generation {
    Remote(String),
    Fallback {
        text: String,
        reason: FallbackReason,
    },
}

impl Generation {
    /// The generated story text.
    pub fn text(&self) -> &str {
        match self {
            Generation::Remote(text) => text,
            Generation::Fallback { text, .. } => text,
        }
    }

    /// Consume the outcome, keeping only the text.
    pub fn into_text(self) -> String {
        match self {
            Generation::Remote(text) => text,
            Generation::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Generation::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            Generation::Remote(_) => None,
            Generation::Fallback { reason, .. } => Some(*reason),
        }
    }
}

/// Turns prompts into satirical stories.
#[derive(Clone)]
pub struct StoryGenerator {
    client: Option<Gemini>,
    config: GeneratorConfig,
}

impl StoryGenerator {
    /// Create a generator backed by the given remote client.
    pub fn new(client: Gemini) -> Self {
        Self {
            client: Some(client),
            config: GeneratorConfig::default(),
        }
    }

    /// Create a generator from the environment. When no usable API key is
    /// present the generator runs offline and every call uses the local
    /// renderer; construction itself never fails.
    pub fn from_env() -> Self {
        match Gemini::from_env() {
            Ok(client) => Self::new(client),
            Err(e) => {
                warn!(error = %e, "remote model unavailable, generator running offline");
                Self::offline()
            }
        }
    }

    /// Create a generator with no remote client.
    pub fn offline() -> Self {
        Self {
            client: None,
            config: GeneratorConfig::default(),
        }
    }

    /// Configure the generator.
    pub fn with_config(mut self, config: GeneratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Whether a remote client is configured.
    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    /// Generate a story for a non-empty prompt. Never fails: any remote
    /// problem degrades to the local renderer.
    pub async fn generate(&self, prompt: &str) -> Generation {
        let Some(client) = &self.client else {
            return self.fall_back(prompt, FallbackReason::Offline);
        };

        let mut request = Request::user(prompt)
            .with_system(SATIRE_INSTRUCTION)
            .with_max_output_tokens(self.config.max_output_tokens);

        if let Some(ref model) = self.config.model {
            request = request.with_model(model);
        }

        if let Some(temperature) = self.config.temperature {
            request = request.with_temperature(temperature);
        }

        match tokio::time::timeout(self.config.remote_timeout, client.generate(request)).await {
            Err(_) => {
                warn!(prompt = %preview(prompt), "remote generation timed out");
                self.fall_back(prompt, FallbackReason::Timeout)
            }
            Ok(Err(e)) => {
                warn!(prompt = %preview(prompt), error = %e, "remote generation failed");
                self.fall_back(prompt, FallbackReason::RemoteError)
            }
            Ok(Ok(response)) => {
                let text = response.text();
                if text.trim().is_empty() {
                    warn!(prompt = %preview(prompt), "remote generation returned no text");
                    self.fall_back(prompt, FallbackReason::EmptyResponse)
                } else {
                    info!(prompt = %preview(prompt), "generated story remotely");
                    Generation::Remote(text)
                }
            }
        }
    }

    fn fall_back(&self, prompt: &str, reason: FallbackReason) -> Generation {
        info!(prompt = %preview(prompt), ?reason, "generated story via local renderer");
        Generation::Fallback {
            text: fallback::render(prompt),
            reason,
        }
    }
}

/// First few words of a prompt, for log lines.
fn preview(prompt: &str) -> String {
    if prompt.chars().count() <= 50 {
        prompt.to_string()
    } else {
        prompt.chars().take(50).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_generator_falls_back() {
        let generator = StoryGenerator::offline();
        let generation = generator.generate("Squirrels demand representation").await;

        assert!(generation.is_fallback());
        assert_eq!(generation.fallback_reason(), Some(FallbackReason::Offline));
        assert!(generation
            .text()
            .contains("squirrels demand representation"));
    }

    #[tokio::test]
    async fn test_generation_is_never_empty() {
        let generator = StoryGenerator::offline();
        let text = generator.generate("anything at all").await.into_text();
        assert!(!text.trim().is_empty());
    }

    #[test]
    fn test_config_builder() {
        let config = GeneratorConfig::default()
            .with_model("gemini-2.5-pro")
            .with_temperature(0.5)
            .with_max_output_tokens(512)
            .with_remote_timeout(Duration::from_secs(3));

        assert_eq!(config.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(config.temperature, Some(0.5));
        assert_eq!(config.max_output_tokens, 512);
        assert_eq!(config.remote_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_preview_truncates_long_prompts() {
        let long = "x".repeat(200);
        assert_eq!(preview(&long).chars().count(), 50);
        assert_eq!(preview("short"), "short");
    }
}
