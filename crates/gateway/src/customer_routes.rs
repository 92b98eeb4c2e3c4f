use {
    axum::{
        Json, Router,
        extract::{
            Path, Query, State,
            rejection::{JsonRejection, QueryRejection},
        },
        response::IntoResponse,
        routing::{get, post},
    },
    serde::Deserialize,
    serde_json::json,
    servicegenius_salesforce::{
        Case, Contact, CustomerService, ReturnItem, customer_service::DEFAULT_PAGE_SIZE,
    },
    tracing::debug,
};

use crate::{
    api_error::{ApiError, json_body, query_params},
    auth_middleware::AuthSession,
    server::AppState,
};

/// Routes nested under `/api/customer-service`.
pub fn customer_router() -> Router<AppState> {
    Router::new()
        .route("/cases", get(list_cases).post(create_case))
        .route("/cases/{id}", get(get_case).patch(update_case))
        .route("/orders", get(list_orders))
        .route("/orders/{id}", get(get_order))
        .route("/returns", post(create_return))
        .route("/customers/{id}", get(get_customer).patch(update_customer))
}

const INVALID_BODY: &str = "Invalid request body";

#[derive(Debug, Default, Deserialize)]
struct Paging {
    limit: Option<u32>,
    offset: Option<u32>,
}

impl Paging {
    fn resolve(&self) -> (u32, u32) {
        (
            self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            self.offset.unwrap_or(0),
        )
    }
}

// ── Cases ────────────────────────────────────────────────────────────────────

async fn list_cases(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    paging: Result<Query<Paging>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let paging = query_params(paging)?;
    let (limit, offset) = paging.resolve();
    let api = state.gateway.salesforce.session(Some(&user));
    let cases = CustomerService::new(&api)
        .list_cases(limit, offset)
        .await
        .map_err(state.facade_error("Failed to fetch cases"))?;
    Ok(Json(json!({ "cases": cases })))
}

async fn create_case(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    payload: Result<Json<Case>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let case = json_body(payload, INVALID_BODY)?;
    let api = state.gateway.salesforce.session(Some(&user));
    let id = CustomerService::new(&api)
        .create_case(&case)
        .await
        .map_err(state.facade_error("Failed to create case"))?;
    Ok(Json(json!({ "id": id, "success": true })))
}

async fn get_case(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let case = CustomerService::new(&api)
        .get_case(&id)
        .await
        .map_err(state.facade_error("Failed to fetch case"))?;
    Ok(Json(case))
}

async fn update_case(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
    payload: Result<Json<Case>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = json_body(payload, INVALID_BODY)?;
    let api = state.gateway.salesforce.session(Some(&user));
    CustomerService::new(&api)
        .update_case(&id, &changes)
        .await
        .map_err(state.facade_error("Failed to update case"))?;
    Ok(Json(json!({ "success": true })))
}

// ── Orders ───────────────────────────────────────────────────────────────────

async fn list_orders(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    paging: Result<Query<Paging>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let paging = query_params(paging)?;
    let (limit, offset) = paging.resolve();
    let api = state.gateway.salesforce.session(Some(&user));
    let orders = CustomerService::new(&api)
        .list_orders(limit, offset)
        .await
        .map_err(state.facade_error("Failed to fetch orders"))?;
    Ok(Json(json!({ "orders": orders })))
}

/// An order (by number or id) together with its line items.
async fn get_order(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let service = CustomerService::new(&api);
    let order = service
        .get_order(&id)
        .await
        .map_err(state.facade_error("Failed to fetch order"))?;
    let order_id = order.id.clone().unwrap_or(id);
    let items = service
        .get_order_items(&order_id)
        .await
        .map_err(state.facade_error("Failed to fetch order"))?;
    Ok(Json(json!({ "order": order, "items": items })))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReturnRequest {
    #[serde(default)]
    order_id: Option<String>,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    items: Option<Vec<ReturnItem>>,
}

async fn create_return(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    payload: Result<Json<ReturnRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const INVALID_RETURN: &str = "Invalid return request data";
    let request = json_body(payload, INVALID_RETURN)?;
    let (Some(order_id), Some(reason), Some(items)) = (
        request.order_id.filter(|v| !v.is_empty()),
        request.reason.filter(|v| !v.is_empty()),
        request.items,
    ) else {
        debug!("return request missing order, reason or items");
        return Err(ApiError::bad_request(INVALID_RETURN));
    };

    let api = state.gateway.salesforce.session(Some(&user));
    let confirmation = CustomerService::new(&api)
        .create_return_request(&order_id, &reason, &items)
        .await
        .map_err(state.facade_error("Failed to create return request"))?;
    Ok(Json(confirmation))
}

// ── Customers ────────────────────────────────────────────────────────────────

async fn get_customer(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id_or_email): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let customer = CustomerService::new(&api)
        .get_customer(&id_or_email)
        .await
        .map_err(state.facade_error("Failed to fetch customer"))?;
    Ok(Json(customer))
}

async fn update_customer(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
    payload: Result<Json<Contact>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let changes = json_body(payload, INVALID_BODY)?;
    let api = state.gateway.salesforce.session(Some(&user));
    CustomerService::new(&api)
        .update_customer(&id, &changes)
        .await
        .map_err(state.facade_error("Failed to update customer"))?;
    Ok(Json(json!({ "success": true })))
}
