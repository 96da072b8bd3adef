//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use currency_types::{
    AppError, ConversionQuery, CreateCurrencyRequest, CurrencyRepository, RateHistoryQuery,
    RateProviderClient, RateStore, RecordRateRequest, UpdateCurrencyRequest,
};

use crate::CurrencyService;
use crate::openapi::ApiDoc;

/// Application state shared across handlers.
pub struct AppState<R, P> {
    pub service: Arc<CurrencyService<R, P>>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::RateUnavailable(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

/// OpenAPI document.
pub async fn openapi_json() -> impl IntoResponse {
    use utoipa::OpenApi;
    Json(ApiDoc::openapi())
}

// ─────────────────────────────────────────────────────────────────────────────
// Currencies
// ─────────────────────────────────────────────────────────────────────────────

/// List all currencies.
#[tracing::instrument(skip(state))]
pub async fn list_currencies<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let currencies = state.service.list_currencies().await?;
    Ok(Json(currencies))
}

/// Get currency by code.
#[tracing::instrument(skip(state))]
pub async fn get_currency<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let currency = state.service.get_currency(&code).await?;
    Ok(Json(currency))
}

#[tracing::instrument(skip(state), fields(code = %req.code))]
pub async fn create_currency<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Json(req): Json<CreateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let currency = state.service.create_currency(req).await?;
    Ok((StatusCode::CREATED, Json(currency)))
}

#[tracing::instrument(skip(state))]
pub async fn update_currency<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
    Json(req): Json<UpdateCurrencyRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let currency = state.service.update_currency(&code, req).await?;
    Ok(Json(currency))
}

/// Run the catalog sync now.
#[tracing::instrument(skip(state))]
pub async fn sync_catalog<R, P>(State(state): State<Arc<AppState<R, P>>>) -> impl IntoResponse
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    Json(state.service.sync_catalog().await)
}

// ─────────────────────────────────────────────────────────────────────────────
// Exchange rates
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip(state))]
pub async fn list_rates<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let rates = state.service.list_rates().await?;
    Ok(Json(rates))
}

#[tracing::instrument(skip(state), fields(code = %req.currency_code))]
pub async fn record_rate<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Json(req): Json<RecordRateRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let rate = state.service.record_rate(req).await?;
    Ok((StatusCode::CREATED, Json(rate)))
}

/// Run a rate refresh now.
#[tracing::instrument(skip(state))]
pub async fn refresh_rates<R, P>(State(state): State<Arc<AppState<R, P>>>) -> impl IntoResponse
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    Json(state.service.refresh_rates().await)
}

#[tracing::instrument(skip(state))]
pub async fn latest_rate<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let rate = state.service.latest_rate(&code).await?;
    Ok(Json(rate))
}

#[tracing::instrument(skip(state))]
pub async fn rate_history<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(code): Path<String>,
    Query(query): Query<RateHistoryQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let rates = state.service.rate_history(&code, query).await?;
    Ok(Json(rates))
}

/// Convert an amount between two currencies.
#[tracing::instrument(skip(state))]
pub async fn convert<R, P>(
    State(state): State<Arc<AppState<R, P>>>,
    Query(query): Query<ConversionQuery>,
) -> Result<impl IntoResponse, ApiError>
where
    R: CurrencyRepository + RateStore,
    P: RateProviderClient,
{
    let result = state.service.convert(query).await?;
    Ok(Json(result))
}
