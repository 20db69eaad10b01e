use agri_core::AgriResult;
use async_trait::async_trait;
use mongodb::bson::Document;

/// Read-only access to a document database.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` matching every key/value pair of `filter`.
    async fn find(&self, collection: &str, filter: Document) -> AgriResult<Vec<Document>>;
}
