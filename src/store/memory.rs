use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::models::{Post, PostPayload, MAX_TITLE_LEN};

use super::{PostStore, StoreError};

/// In-memory post store, used by the test suite and handy for hacking on the
/// API without a database. Enforces the same document constraints as the
/// Postgres schema so both layers of validation stay observable.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    posts: Vec<Entry>,
    next_seq: u64,
}

struct Entry {
    // Insertion sequence breaks created_at ties in the newest-first ordering.
    seq: u64,
    post: Post,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_document(payload: &PostPayload) -> Result<(), StoreError> {
        if payload.title.is_empty() || payload.content.is_empty() || payload.author.is_empty() {
            return Err(StoreError::Rejected(
                "title, content and author must be non-empty".to_string(),
            ));
        }
        if payload.title.chars().count() > MAX_TITLE_LEN {
            return Err(StoreError::Rejected(format!(
                "title cannot be more than {MAX_TITLE_LEN} characters"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let inner = self.inner.lock();
        let mut entries: Vec<(u64, Post)> = inner
            .posts
            .iter()
            .map(|e| (e.seq, e.post.clone()))
            .collect();
        entries.sort_by(|a, b| (b.1.created_at, b.0).cmp(&(a.1.created_at, a.0)));
        Ok(entries.into_iter().map(|(_, post)| post).collect())
    }

    async fn create(&self, payload: &PostPayload) -> Result<Post, StoreError> {
        Self::check_document(payload)?;
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            title: payload.title.clone(),
            content: payload.content.clone(),
            author: payload.author.clone(),
            created_at: now,
            updated_at: now,
        };
        let mut inner = self.inner.lock();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.posts.push(Entry {
            seq,
            post: post.clone(),
        });
        Ok(post)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Post>, StoreError> {
        let inner = self.inner.lock();
        Ok(inner
            .posts
            .iter()
            .find(|e| e.post.id == id)
            .map(|e| e.post.clone()))
    }

    async fn update(&self, id: Uuid, payload: &PostPayload) -> Result<Option<Post>, StoreError> {
        Self::check_document(payload)?;
        let mut inner = self.inner.lock();
        let Some(entry) = inner.posts.iter_mut().find(|e| e.post.id == id) else {
            return Ok(None);
        };
        entry.post.title = payload.title.clone();
        entry.post.content = payload.content.clone();
        entry.post.author = payload.author.clone();
        entry.post.updated_at = Utc::now();
        Ok(Some(entry.post.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut inner = self.inner.lock();
        let before = inner.posts.len();
        inner.posts.retain(|e| e.post.id != id);
        Ok(inner.posts.len() < before)
    }
}
