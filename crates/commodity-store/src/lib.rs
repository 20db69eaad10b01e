//! Commodity production data backed by a document store.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`store`] | `DocumentStore` trait |
//! | [`mongo`] | MongoDB implementation |
//! | [`memory`] | In-memory implementation for tests and local runs |
//! | [`records`] | Document -> response shape mapping |

pub mod memory;
pub mod mongo;
pub mod records;
pub mod store;

pub use memory::MemoryStore;
pub use mongodb::bson;
pub use mongo::MongoStore;
pub use store::DocumentStore;

use agri_core::{AgriResult, ExistingRecord, ForecastRecord};
use mongodb::bson::doc;
use std::sync::Arc;

pub const EXISTING_COLLECTION: &str = "horticulture_national_existing";
pub const FORECAST_COLLECTION: &str = "horticulture_national_forecast";

/// Reads historical and forecast production per commodity.
///
/// Results come back in the store's natural order; nothing is sorted.
#[derive(Clone)]
pub struct CommodityRepository {
    store: Arc<dyn DocumentStore>,
}

impl CommodityRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Historical figures for `komoditas`, without years that have no data.
    pub async fn existing(&self, komoditas: i64) -> AgriResult<Vec<ExistingRecord>> {
        let documents = self
            .store
            .find(EXISTING_COLLECTION, doc! { "komoditas": komoditas })
            .await?;

        let mut records = Vec::with_capacity(documents.len());
        for document in &documents {
            let record = records::existing_from_document(document)?;
            if !record.is_empty() {
                records.push(record);
            }
        }

        tracing::debug!(
            "komoditas {}: {} existing records ({} stored)",
            komoditas,
            records.len(),
            documents.len()
        );
        Ok(records)
    }

    /// Forecast production for `komoditas`. All-zero years are kept.
    pub async fn forecast(&self, komoditas: i64) -> AgriResult<Vec<ForecastRecord>> {
        let documents = self
            .store
            .find(FORECAST_COLLECTION, doc! { "item_id": komoditas })
            .await?;

        documents.iter().map(records::forecast_from_document).collect()
    }
}
