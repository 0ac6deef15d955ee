use axum::{extract::State, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use shipquote_core::{CartLine, DeliveryMode, QuoteSet, ServiceLevel, ShippingLineItem};
use shipquote_engine::{RegionalPricing, WeightBand};

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(super) struct QuoteRequest {
    /// `pickup`, `economy`, `express` or a legacy alias.
    pub mode: String,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub items: Vec<CartLine>,
}

#[derive(Debug, Serialize)]
pub(super) struct QuoteResponse {
    #[serde(flatten)]
    quote: QuoteSet,
    /// Amount to bill for the requested mode.
    price: Decimal,
    lead_time_days: u32,
    destination_label: Option<String>,
    line_item: Option<ShippingLineItem>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct LeadTimes {
    economy: u32,
    express: u32,
}

#[derive(Debug, Serialize)]
pub(super) struct RatesResponse {
    bands: Vec<WeightBand>,
    ceiling_grams: u32,
    surcharge_per_100g: Decimal,
    lead_time_days: LeadTimes,
    regional: Option<RegionalPricing>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

pub(super) async fn create_quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let mode: DeliveryMode = body
        .mode
        .parse()
        .map_err(|e: shipquote_core::CoreError| {
            ApiError::new(req_id.0.clone(), "validation_error", e.to_string())
        })?;

    let outcome = state
        .quoter
        .quote(body.items, mode, body.postal_code.as_deref())
        .await;

    tracing::info!(
        request_id = %req_id.0,
        %mode,
        total_grams = outcome.quote.total_grams,
        price = %outcome.quote.price(),
        warnings = outcome.warnings.len(),
        "shipping quote served"
    );

    let quote = outcome.quote;
    Ok(Json(ApiResponse {
        data: QuoteResponse {
            price: quote.price(),
            lead_time_days: quote.lead_time_days(),
            destination_label: quote.destination.as_ref().map(|d| d.label()),
            line_item: quote.line_item(),
            quote,
            warnings: outcome.warnings,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_rates(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<RatesResponse>> {
    let engine = state.quoter.engine();
    let table = engine.rate_table();

    Json(ApiResponse {
        data: RatesResponse {
            bands: table.bands().to_vec(),
            ceiling_grams: table.ceiling_grams(),
            surcharge_per_100g: table.surcharge_per_100g(),
            lead_time_days: LeadTimes {
                economy: table.lead_time_days(ServiceLevel::Economy),
                express: table.lead_time_days(ServiceLevel::Express),
            },
            regional: engine.regional().cloned(),
        },
        meta: ResponseMeta::new(req_id.0),
    })
}
