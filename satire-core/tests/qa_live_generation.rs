//! QA tests against the live Gemini API.
//!
//! These verify the remote path produces usable stories and that the
//! end-to-end pipeline prefers it when a key is configured.
//!
//! Run with: `GEMINI_API_KEY=$GEMINI_API_KEY cargo test -p satire-core qa_live -- --ignored --nocapture`

use satire_core::{Generation, GeneratorConfig, StoryGenerator, StoryService, StoryStore};
use std::time::Duration;
use tempfile::TempDir;

/// Load environment variables from .env file and enable log output.
fn setup() {
    let _ = dotenvy::dotenv();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "satire_core=info".into()),
        )
        .try_init();
}

/// Check if API key is available
fn has_api_key() -> bool {
    std::env::var("GEMINI_API_KEY").is_ok()
}

#[tokio::test]
#[ignore]
async fn test_remote_generation_produces_text() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let generator = StoryGenerator::from_env()
        .with_config(GeneratorConfig::default().with_remote_timeout(Duration::from_secs(30)));
    assert!(generator.is_online());

    let generation = generator
        .generate("Town council votes to rename every street after the mayor's dog")
        .await;

    match generation {
        Generation::Remote(text) => {
            println!("--- remote story ---\n{text}");
            assert!(!text.trim().is_empty());
        }
        Generation::Fallback { reason, .. } => {
            panic!("expected remote generation, fell back: {reason:?}");
        }
    }
}

#[tokio::test]
#[ignore]
async fn test_live_create_story_persists_remote_text() {
    setup();
    if !has_api_key() {
        eprintln!("Skipping test: GEMINI_API_KEY not set");
        return;
    }

    let dir = TempDir::new().expect("create temp dir");
    let store = StoryStore::open(dir.path()).await.expect("open store");
    let generator = StoryGenerator::from_env()
        .with_config(GeneratorConfig::default().with_remote_timeout(Duration::from_secs(30)));
    let service = StoryService::new(generator, store);

    let story = service
        .create_story("Scientists confirm weekends are a scam")
        .await
        .expect("create story");

    println!("Created story {} ({} chars)", story.id, story.text.len());
    assert!(!story.id.is_empty());
    assert!(!story.text.trim().is_empty());

    let fetched = service.get_story(&story.id).await.expect("get");
    assert_eq!(fetched.text, story.text);
}
