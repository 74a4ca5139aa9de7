//! StoryService - the primary public API.
//!
//! Orchestrates the generator and the store: validates input, builds a Story
//! from a prompt, persists it, and exposes the read/vote operations. All
//! user-visible failures are [`ServiceError`] variants; raw provider errors
//! never cross this boundary.

use crate::generator::{GeneratorConfig, StoryGenerator};
use crate::store::{StoreError, StoryStore};
use crate::story::Story;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from StoryService operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("prompt must not be empty")]
    InvalidPrompt,

    #[error("story id must not be empty")]
    InvalidId,

    #[error("no story with id {id}")]
    NotFound { id: String },

    /// The story was generated but could not be persisted. Carries the
    /// generated text so the work is not silently lost.
    #[error("story was generated but could not be saved: {source}")]
    SaveFailed {
        text: String,
        #[source]
        source: StoreError,
    },

    #[error("store {op} failed: {source}")]
    Store {
        op: &'static str,
        #[source]
        source: StoreError,
    },
}

fn store_error(op: &'static str, source: StoreError) -> ServiceError {
    match source {
        StoreError::NotFound { id } => ServiceError::NotFound { id },
        source => ServiceError::Store { op, source },
    }
}

/// Configuration for creating a story service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory backing the story store.
    pub data_dir: PathBuf,

    /// Generator settings.
    pub generator: GeneratorConfig,
}

impl ServiceConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            generator: GeneratorConfig::default(),
        }
    }

    pub fn with_generator(mut self, generator: GeneratorConfig) -> Self {
        self.generator = generator;
        self
    }
}

/// The satirical story service.
#[derive(Clone)]
pub struct StoryService {
    generator: StoryGenerator,
    store: StoryStore,
}

impl StoryService {
    /// Create a service from injected collaborators.
    pub fn new(generator: StoryGenerator, store: StoryStore) -> Self {
        Self { generator, store }
    }

    /// Wire up a service from the environment: a generator that runs offline
    /// when no API key is present, and a store at the configured directory.
    pub async fn from_env(config: ServiceConfig) -> Result<Self, StoreError> {
        let generator = StoryGenerator::from_env().with_config(config.generator);
        let store = StoryStore::open(config.data_dir).await?;
        Ok(Self::new(generator, store))
    }

    pub fn generator(&self) -> &StoryGenerator {
        &self.generator
    }

    pub fn store(&self) -> &StoryStore {
        &self.store
    }

    /// Generate and persist a story for the given prompt.
    ///
    /// Generation is total and never aborts the call; only validation and
    /// persistence can fail. A persistence failure carries the generated
    /// text out to the caller.
    pub async fn create_story(&self, prompt: &str) -> Result<Story, ServiceError> {
        if prompt.trim().is_empty() {
            return Err(ServiceError::InvalidPrompt);
        }

        let generation = self.generator.generate(prompt).await;
        if let Some(reason) = generation.fallback_reason() {
            info!(?reason, "story produced by local renderer");
        }

        let text = generation.into_text();
        let story = Story::new(prompt, text.clone());

        match self.store.save(story).await {
            Ok(saved) => {
                info!(id = %saved.id, "story created");
                Ok(saved)
            }
            Err(source) => {
                warn!(error = %source, "generated story could not be persisted");
                Err(ServiceError::SaveFailed { text, source })
            }
        }
    }

    /// All stored stories.
    pub async fn list_stories(&self) -> Result<Vec<Story>, ServiceError> {
        self.store.list().await.map_err(|e| store_error("list", e))
    }

    /// The highest-scoring stories, best first.
    pub async fn top_stories(&self, limit: usize) -> Result<Vec<Story>, ServiceError> {
        self.store
            .top(limit)
            .await
            .map_err(|e| store_error("top", e))
    }

    /// Fetch one story by id.
    pub async fn get_story(&self, id: &str) -> Result<Story, ServiceError> {
        validate_id(id)?;
        self.store.get(id).await.map_err(|e| store_error("get", e))
    }

    /// Record an upvote for the story with the given id.
    pub async fn upvote(&self, id: &str) -> Result<Story, ServiceError> {
        validate_id(id)?;
        self.store
            .upvote(id)
            .await
            .map_err(|e| store_error("upvote", e))
    }

    /// Record a downvote for the story with the given id.
    pub async fn downvote(&self, id: &str) -> Result<Story, ServiceError> {
        validate_id(id)?;
        self.store
            .downvote(id)
            .await
            .map_err(|e| store_error("downvote", e))
    }
}

fn validate_id(id: &str) -> Result<(), ServiceError> {
    if id.trim().is_empty() {
        Err(ServiceError::InvalidId)
    } else {
        Ok(())
    }
}
