use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::db::repositories::LexiconRepository;
use crate::error::AppError;
use crate::lexicon::compiler;
use crate::models::lexicon::CompiledLexicon;

struct CacheEntry {
    lexicon: Arc<CompiledLexicon>,
    expires_at: Instant,
}

/// Shared, TTL'd view of compiled lexicons (C4). The only process-shared mutable state
/// in the service; readers take an atomic snapshot (`DashMap::get` clones the `Arc`) and
/// writers mutate by replacing the whole entry, never in place.
pub struct LexiconCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl LexiconCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: Duration::from_secs(ttl_secs.max(1)),
        }
    }

    /// On cache miss (or expiry), loads and compiles from the database directly. A failure
    /// to populate the cache after a successful compile is only logged: callers still get
    /// their result, which is what "cache unavailability is non-fatal" means in practice.
    pub async fn get_or_compile(
        &self,
        repository: &LexiconRepository,
        lexicon_id: &str,
    ) -> Result<Arc<CompiledLexicon>, AppError> {
        if let Some(entry) = self.entries.get(lexicon_id) {
            if entry.expires_at > Instant::now() {
                return Ok(entry.lexicon.clone());
            }
        }

        let compiled = Arc::new(compiler::compile(repository, lexicon_id).await?);
        self.entries.insert(
            lexicon_id.to_string(),
            CacheEntry {
                lexicon: compiled.clone(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(compiled)
    }

    /// Invalidates a single lexicon id. Called on every successful CRUD mutation, always
    /// before the mutating request returns, so the next read can never observe a stale entry.
    pub fn invalidate(&self, lexicon_id: &str) {
        self.entries.remove(lexicon_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_removes_entry() {
        let cache = LexiconCache::new(3600);
        cache.entries.insert(
            "radiology".to_string(),
            CacheEntry {
                lexicon: Arc::new(CompiledLexicon {
                    lexicon_id: "radiology".to_string(),
                    entries: vec![],
                }),
                expires_at: Instant::now() + Duration::from_secs(60),
            },
        );
        assert!(cache.entries.contains_key("radiology"));
        cache.invalidate("radiology");
        assert!(!cache.entries.contains_key("radiology"));
    }
}
