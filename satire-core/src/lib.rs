//! Satirical news story engine.
//!
//! This crate provides:
//! - AI-powered story generation with a deterministic local fallback
//! - A durable, schema-tolerant story store with linearizable vote counters
//! - A service layer tying the two together
//!
//! # Quick Start
//!
//! ```ignore
//! use satire_core::{ServiceConfig, StoryService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = StoryService::from_env(ServiceConfig::new("./stories")).await?;
//!
//!     let story = service
//!         .create_story("Local bakery replaces flour with sawdust")
//!         .await?;
//!     println!("{}", story.text);
//!
//!     service.upvote(&story.id).await?;
//!     Ok(())
//! }
//! ```

pub mod fallback;
pub mod generator;
pub mod service;
pub mod store;
pub mod story;
pub mod testing;

// Primary public API
pub use generator::{FallbackReason, Generation, GeneratorConfig, StoryGenerator};
pub use service::{ServiceConfig, ServiceError, StoryService};
pub use store::{StoreError, StoryStore};
pub use story::Story;
