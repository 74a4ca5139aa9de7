//! Durable story store.
//!
//! One canonical backend: each story is a JSON document named `<id>.json`
//! under the store directory. Reads tolerate missing fields (counters
//! default to zero), so documents written before voting existed stay
//! readable. Vote increments are read-modify-write cycles serialized per id
//! through a lock registry, so concurrent votes on one story are never lost
//! while votes on different stories proceed in parallel.

use crate::story::Story;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no story with id {id}")]
    NotFound { id: String },

    #[error("id {id} cannot name a stored record")]
    InvalidId { id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Decode(#[from] serde_json::Error),
}

enum Vote {
    Up,
    Down,
}

/// A handle to the story collection. Cheap to clone; all clones share the
/// same directory and lock registry. Initialize once per process and inject.
#[derive(Clone)]
pub struct StoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    dir: PathBuf,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl StoryStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            inner: Arc::new(Inner {
                dir,
                locks: Mutex::new(HashMap::new()),
            }),
        })
    }

    /// The directory backing this store.
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// Persist a story, assigning a fresh id when the incoming one is empty.
    /// Returns the stored record including its final id.
    pub async fn save(&self, mut story: Story) -> Result<Story, StoreError> {
        if story.id.is_empty() {
            story.id = Uuid::new_v4().to_string();
        }

        let path = self
            .document_path(&story.id)
            .ok_or_else(|| StoreError::InvalidId {
                id: story.id.clone(),
            })?;

        let lock = self.key_lock(&story.id).await;
        let _guard = lock.lock().await;

        write_document(&path, &story).await?;

        Ok(story)
    }

    /// Fetch a single story by id.
    pub async fn get(&self, id: &str) -> Result<Story, StoreError> {
        let path = self.document_path(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;
        load_document(&path, id).await
    }

    /// All stored stories, in no particular order. Documents that fail to
    /// decode are skipped with a warning rather than failing the listing.
    pub async fn list(&self) -> Result<Vec<Story>, StoreError> {
        let mut stories = Vec::new();
        let mut entries = fs::read_dir(&self.inner.dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let id = path
                    .file_stem()
                    .map(|s| s.to_string_lossy().to_string())
                    .unwrap_or_default();

                match load_document(&path, &id).await {
                    Ok(story) => stories.push(story),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "skipping undecodable story document");
                    }
                }
            }
        }

        Ok(stories)
    }

    /// Stories sorted by net score, best first, truncated to `limit`.
    pub async fn top(&self, limit: usize) -> Result<Vec<Story>, StoreError> {
        let mut stories = self.list().await?;
        stories.sort_by(|a, b| b.score().cmp(&a.score()).then_with(|| a.id.cmp(&b.id)));
        stories.truncate(limit);
        Ok(stories)
    }

    /// Increment a story's upvote counter by one.
    pub async fn upvote(&self, id: &str) -> Result<Story, StoreError> {
        self.increment(id, Vote::Up).await
    }

    /// Increment a story's downvote counter by one.
    pub async fn downvote(&self, id: &str) -> Result<Story, StoreError> {
        self.increment(id, Vote::Down).await
    }

    async fn increment(&self, id: &str, vote: Vote) -> Result<Story, StoreError> {
        let path = self.document_path(id).ok_or_else(|| StoreError::NotFound {
            id: id.to_string(),
        })?;

        // Hold the key lock across the whole read-modify-write cycle.
        let lock = self.key_lock(id).await;
        let _guard = lock.lock().await;

        let mut story = load_document(&path, id).await?;
        match vote {
            Vote::Up => story.upvotes += 1,
            Vote::Down => story.downvotes += 1,
        }

        write_document(&path, &story).await?;

        Ok(story)
    }

    fn document_path(&self, id: &str) -> Option<PathBuf> {
        valid_id(id).then(|| self.inner.dir.join(format!("{id}.json")))
    }

    async fn key_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.inner.locks.lock().await;
        locks
            .entry(id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// Write via a temp file and rename, so readers never see a half-written
/// document.
async fn write_document(path: &Path, story: &Story) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    let content = serde_json::to_string_pretty(story)?;
    fs::write(&tmp, content).await?;
    fs::rename(&tmp, path).await?;
    Ok(())
}

async fn load_document(path: &Path, id: &str) -> Result<Story, StoreError> {
    let content = match fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StoreError::NotFound { id: id.to_string() })
        }
        Err(e) => return Err(e.into()),
    };

    let mut story: Story = serde_json::from_str(&content)?;
    if story.id.is_empty() {
        // Older documents carried no id field; the file name is the key.
        story.id = id.to_string();
    }
    Ok(story)
}

/// Ids become file names, so anything outside this set cannot name a record.
fn valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open_store() -> (TempDir, StoryStore) {
        let dir = TempDir::new().expect("create temp dir");
        let store = StoryStore::open(dir.path()).await.expect("open store");
        (dir, store)
    }

    #[tokio::test]
    async fn test_save_assigns_id() {
        let (_dir, store) = open_store().await;

        let saved = store
            .save(Story::new("a prompt", "a story"))
            .await
            .expect("save");

        assert!(!saved.id.is_empty());
        assert_eq!(saved.upvotes, 0);
        assert_eq!(saved.downvotes, 0);

        let fetched = store.get(&saved.id).await.expect("get");
        assert_eq!(fetched, saved);
    }

    #[tokio::test]
    async fn test_save_keeps_explicit_id() {
        let (_dir, store) = open_store().await;

        let saved = store
            .save(Story::new("p", "t").with_id("fixed-id"))
            .await
            .expect("save");

        assert_eq!(saved.id, "fixed-id");
        assert_eq!(store.get("fixed-id").await.expect("get").id, "fixed-id");
    }

    #[tokio::test]
    async fn test_save_rejects_unstorable_id() {
        let (_dir, store) = open_store().await;

        let result = store.save(Story::new("p", "t").with_id("../escape")).await;
        assert!(matches!(result, Err(StoreError::InvalidId { .. })));
    }

    #[tokio::test]
    async fn test_get_unknown_id() {
        let (_dir, store) = open_store().await;

        assert!(matches!(
            store.get("nope").await,
            Err(StoreError::NotFound { .. })
        ));
        // Ids that cannot name a file are just as unknown.
        assert!(matches!(
            store.get("../../etc/passwd").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_votes_increment_independently() {
        let (_dir, store) = open_store().await;
        let saved = store.save(Story::new("p", "t")).await.expect("save");

        let after_up = store.upvote(&saved.id).await.expect("upvote");
        assert_eq!(after_up.upvotes, 1);
        assert_eq!(after_up.downvotes, 0);

        let after_down = store.downvote(&saved.id).await.expect("downvote");
        assert_eq!(after_down.upvotes, 1);
        assert_eq!(after_down.downvotes, 1);
    }

    #[tokio::test]
    async fn test_vote_unknown_id() {
        let (_dir, store) = open_store().await;

        assert!(matches!(
            store.upvote("missing").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.downvote("missing").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_legacy_document_reads_with_zero_counters() {
        let (_dir, store) = open_store().await;

        // A record from before vote counters existed: no id field either.
        let legacy = r#"{"prompt": "old prompt", "story": "old story"}"#;
        fs::write(store.dir().join("legacy-1.json"), legacy)
            .await
            .expect("write legacy doc");

        let fetched = store.get("legacy-1").await.expect("get");
        assert_eq!(fetched.id, "legacy-1");
        assert_eq!(fetched.upvotes, 0);
        assert_eq!(fetched.downvotes, 0);

        // And it can be voted on like any other record.
        let voted = store.upvote("legacy-1").await.expect("upvote");
        assert_eq!(voted.upvotes, 1);
    }

    #[tokio::test]
    async fn test_list_skips_undecodable_documents() {
        let (_dir, store) = open_store().await;

        store.save(Story::new("p1", "t1")).await.expect("save");
        store.save(Story::new("p2", "t2")).await.expect("save");
        fs::write(store.dir().join("broken.json"), "{not json")
            .await
            .expect("write broken doc");

        let stories = store.list().await.expect("list");
        assert_eq!(stories.len(), 2);
    }

    #[tokio::test]
    async fn test_top_orders_by_score() {
        let (_dir, store) = open_store().await;

        let low = store.save(Story::new("low", "t")).await.expect("save");
        let high = store.save(Story::new("high", "t")).await.expect("save");
        let sunk = store.save(Story::new("sunk", "t")).await.expect("save");

        for _ in 0..3 {
            store.upvote(&high.id).await.expect("upvote");
        }
        store.upvote(&low.id).await.expect("upvote");
        store.downvote(&sunk.id).await.expect("downvote");

        let top = store.top(2).await.expect("top");
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].id, high.id);
        assert_eq!(top[1].id, low.id);
    }

    #[tokio::test]
    async fn test_concurrent_upvotes_are_not_lost() {
        let (_dir, store) = open_store().await;
        let saved = store.save(Story::new("p", "t")).await.expect("save");

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            let id = saved.id.clone();
            handles.push(tokio::spawn(async move { store.upvote(&id).await }));
        }
        for handle in handles {
            handle.await.expect("join").expect("upvote");
        }

        let fetched = store.get(&saved.id).await.expect("get");
        assert_eq!(fetched.upvotes, 20);
    }
}
