use agri_core::{AgriError, AgriResult};
use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::Document;
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use std::time::Duration;

use crate::store::DocumentStore;

const STORE_TIMEOUT: Duration = Duration::from_secs(10);

fn store_error(e: mongodb::error::Error) -> AgriError {
    AgriError::Store(e.to_string())
}

/// MongoDB-backed [`DocumentStore`] bound to one database.
#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Parses `url` and prepares a client. The driver connects lazily, so an
    /// unreachable server surfaces on the first query, not here.
    pub async fn connect(url: &str, database: &str) -> AgriResult<Self> {
        let mut options = ClientOptions::parse(url).await.map_err(store_error)?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(STORE_TIMEOUT);
        options.server_selection_timeout = Some(STORE_TIMEOUT);

        let client = Client::with_options(options).map_err(store_error)?;
        tracing::info!("MongoDB client ready (database: {})", database);

        Ok(Self {
            database: client.database(database),
        })
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find(&self, collection: &str, filter: Document) -> AgriResult<Vec<Document>> {
        let cursor = self
            .database
            .collection::<Document>(collection)
            .find(filter)
            .await
            .map_err(|e| {
                tracing::error!("Query on {} failed: {}", collection, e);
                store_error(e)
            })?;

        cursor.try_collect().await.map_err(store_error)
    }
}
