//! Commodity Routes
//!
//! Historical (`/existing`) and forecast (`/forecast`) production per
//! commodity, read straight from the document store.

use agri_core::{ExistingRecord, ForecastRecord};
use axum::{extract::State, routing::post, Json, Router};
use serde::{de, Deserialize, Deserializer};

use crate::{AppError, AppState};

/// Request body shared by both endpoints.
#[derive(Debug, Deserialize)]
pub struct CommodityRequest {
    #[serde(deserialize_with = "lenient_int")]
    pub komoditas: i64,
}

/// Accepts `7`, `7.0` or `"7"` for an integer field.
fn lenient_int<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(v) => Ok(v),
        Raw::Float(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(v as i64),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("komoditas is not an integer: {:?}", s))),
        Raw::Float(v) => Err(de::Error::custom(format!(
            "komoditas is not an integer: {}",
            v
        ))),
    }
}

pub fn commodity_routes() -> Router<AppState> {
    Router::new()
        .route("/existing", post(get_existing_data))
        .route("/forecast", post(get_forecast_data))
}

async fn get_existing_data(
    State(state): State<AppState>,
    Json(request): Json<CommodityRequest>,
) -> Result<Json<Vec<ExistingRecord>>, AppError> {
    let records = state.commodities.existing(request.komoditas).await?;
    Ok(Json(records))
}

async fn get_forecast_data(
    State(state): State<AppState>,
    Json(request): Json<CommodityRequest>,
) -> Result<Json<Vec<ForecastRecord>>, AppError> {
    let records = state.commodities.forecast(request.komoditas).await?;
    Ok(Json(records))
}
