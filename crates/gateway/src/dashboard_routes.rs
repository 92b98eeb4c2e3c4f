use {
    axum::{
        Json, Router,
        extract::{Query, State, rejection::QueryRejection},
        response::IntoResponse,
        routing::get,
    },
    chrono::Utc,
    serde::Deserialize,
    serde_json::json,
    servicegenius_salesforce::{Analytics, ComparisonMetric, DateRange, Interval},
    tracing::error,
};

use crate::{
    api_error::{ApiError, query_params},
    auth_middleware::AuthSession,
    server::AppState,
};

/// Routes nested under `/api/dashboard`.
pub fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/metrics", get(metrics))
        .route("/tickets", get(tickets))
        .route("/agents", get(agents))
        .route("/categories", get(categories))
        .route("/ticket-volume", get(ticket_volume))
        .route("/ai-comparison", get(ai_comparison))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RangeQuery {
    start_date: Option<String>,
    end_date: Option<String>,
    #[serde(default)]
    interval: Interval,
    #[serde(default)]
    metric: ComparisonMetric,
}

impl RangeQuery {
    /// Missing bounds default to the last 30 days, ending today (UTC).
    fn range(&self) -> DateRange {
        DateRange::resolve(
            self.start_date.clone(),
            self.end_date.clone(),
            Utc::now().date_naive(),
        )
    }
}

/// Headline numbers. A Salesforce failure is reported as 503 so the UI can
/// switch to sample data.
async fn metrics(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let metrics = Analytics::new(&api).dashboard_metrics().await.map_err(|e| {
        error!(error = %e, "error fetching dashboard metrics from Salesforce");
        ApiError::salesforce_unavailable()
    })?;
    Ok(Json(metrics))
}

async fn tickets(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.gateway.salesforce.session(Some(&user));
    let metrics = Analytics::new(&api)
        .ticket_metrics(&query.range())
        .await
        .map_err(state.facade_error("Failed to fetch ticket metrics"))?;
    Ok(Json(metrics))
}

async fn agents(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.gateway.salesforce.session(Some(&user));
    let agents = Analytics::new(&api)
        .agent_metrics(&query.range())
        .await
        .map_err(state.facade_error("Failed to fetch agent metrics"))?;
    Ok(Json(json!({ "agents": agents })))
}

async fn categories(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.gateway.salesforce.session(Some(&user));
    let categories = Analytics::new(&api)
        .category_metrics(&query.range())
        .await
        .map_err(state.facade_error("Failed to fetch category metrics"))?;
    Ok(Json(json!({ "categories": categories })))
}

async fn ticket_volume(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.gateway.salesforce.session(Some(&user));
    let data = Analytics::new(&api)
        .ticket_volume(&query.range(), query.interval)
        .await
        .map_err(state.facade_error("Failed to fetch ticket volume data"))?;
    Ok(Json(json!({ "data": data })))
}

async fn ai_comparison(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let query = query_params(query)?;
    let api = state.gateway.salesforce.session(Some(&user));
    let data = Analytics::new(&api)
        .ai_comparison(&query.range(), query.metric)
        .await
        .map_err(state.facade_error("Failed to fetch AI comparison data"))?;
    Ok(Json(json!({ "data": data })))
}
