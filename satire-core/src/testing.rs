//! Testing utilities.
//!
//! Helpers for integration tests: an offline service wired to a directory,
//! seeding helpers for store state, and assertion helpers for vote counts.
//! The offline generator makes every test deterministic and network-free.

use crate::generator::StoryGenerator;
use crate::service::StoryService;
use crate::store::{StoreError, StoryStore};
use crate::story::Story;
use std::path::Path;
use tokio::fs;

/// Build a service with an offline generator over a store at `dir`.
pub async fn offline_service(dir: impl AsRef<Path>) -> Result<StoryService, StoreError> {
    let store = StoryStore::open(dir.as_ref()).await?;
    Ok(StoryService::new(StoryGenerator::offline(), store))
}

/// Save a story with fixed content, returning the stored record.
pub async fn seed_story(
    store: &StoryStore,
    prompt: &str,
    text: &str,
) -> Result<Story, StoreError> {
    store.save(Story::new(prompt, text)).await
}

/// Write a document in the pre-voting schema (no counters, no id field)
/// directly into the store directory, bypassing the store's save path.
pub async fn write_legacy_document(
    store: &StoryStore,
    id: &str,
    prompt: &str,
    text: &str,
) -> std::io::Result<()> {
    let content = serde_json::json!({ "prompt": prompt, "story": text });
    fs::write(
        store.dir().join(format!("{id}.json")),
        content.to_string(),
    )
    .await
}

/// Assert a story's vote counters.
#[track_caller]
pub fn assert_counts(story: &Story, upvotes: u64, downvotes: u64) {
    assert_eq!(
        (story.upvotes, story.downvotes),
        (upvotes, downvotes),
        "expected {upvotes}/{downvotes} votes on story {}, got {}/{}",
        story.id,
        story.upvotes,
        story.downvotes
    );
}

/// Assert that a listing contains the id exactly once.
#[track_caller]
pub fn assert_listed_once(stories: &[Story], id: &str) {
    let count = stories.iter().filter(|s| s.id == id).count();
    assert_eq!(count, 1, "expected id {id} exactly once, found {count}");
}
