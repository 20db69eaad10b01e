use agri_core::{AgriError, AgriResult, ExistingRecord, ForecastRecord};
use chrono::{DateTime, Datelike, Utc};
use mongodb::bson::{Bson, Document};

fn missing(field: &str) -> AgriError {
    AgriError::InvalidRecord(format!("document has no usable '{}' field", field))
}

/// Numeric value of a BSON scalar, whatever width it was stored with.
pub fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Double(v) => Some(*v),
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        _ => None,
    }
}

/// A present null is `None`; an absent or non-numeric field is invalid.
fn number(document: &Document, field: &str) -> AgriResult<Option<f64>> {
    match document.get(field) {
        Some(Bson::Null) => Ok(None),
        Some(value) => as_number(value).map(Some).ok_or_else(|| missing(field)),
        None => Err(missing(field)),
    }
}

/// Calendar year (UTC) of a BSON datetime field.
fn year(document: &Document, field: &str) -> AgriResult<i32> {
    match document.get(field) {
        Some(Bson::DateTime(dt)) => DateTime::<Utc>::from_timestamp_millis(dt.timestamp_millis())
            .map(|dt| dt.year())
            .ok_or_else(|| missing(field)),
        _ => Err(missing(field)),
    }
}

pub fn existing_from_document(document: &Document) -> AgriResult<ExistingRecord> {
    Ok(ExistingRecord {
        tahun: year(document, "tahun")?,
        produksi: number(document, "produksi")?,
        produktivitas: number(document, "produktivitas")?,
        tanaman_menghasilkan: number(document, "tanaman_menghasilkan")?,
    })
}

pub fn forecast_from_document(document: &Document) -> AgriResult<ForecastRecord> {
    Ok(ForecastRecord {
        tahun: year(document, "timestamp")?,
        produksi: number(document, "mean")?,
    })
}
