use agri_core::AgriResult;
use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use crate::records::as_number;
use crate::store::DocumentStore;

/// [`DocumentStore`] over in-process collections.
///
/// Filters are plain equality per key; numbers compare by value regardless
/// of their BSON width, as they do in MongoDB.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, collection: &str, document: Document) {
        self.collections
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .entry(collection.to_string())
            .or_default()
            .push(document);
    }

    /// Number of `find` calls served so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

fn values_match(stored: &Bson, wanted: &Bson) -> bool {
    match (as_number(stored), as_number(wanted)) {
        (Some(a), Some(b)) => a == b,
        _ => stored == wanted,
    }
}

fn matches_filter(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, wanted)| {
        document
            .get(key)
            .map(|stored| values_match(stored, wanted))
            .unwrap_or(false)
    })
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(&self, collection: &str, filter: Document) -> AgriResult<Vec<Document>> {
        self.queries.fetch_add(1, Ordering::SeqCst);

        let collections = self
            .collections
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        Ok(collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| matches_filter(document, &filter))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}
