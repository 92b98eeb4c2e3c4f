use {
    axum::{
        Json, Router,
        extract::{Path, State, rejection::JsonRejection},
        response::IntoResponse,
        routing::{get, post},
    },
    serde::Deserialize,
    serde_json::json,
    servicegenius_auth::Role,
    servicegenius_salesforce::{Agent, AgentBuilder, AgentUpdate, CustomAction, KnowledgeSource},
};

use crate::{
    api_error::{ApiError, json_body},
    auth_middleware::AuthSession,
    server::AppState,
};

/// Routes nested under `/api/agents`.
pub fn agent_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_agents).post(create_agent))
        .route(
            "/{id}",
            get(get_agent).patch(update_agent).delete(delete_agent),
        )
        .route("/{id}/deploy", post(deploy_agent))
        .route("/{id}/test", post(test_agent))
        .route("/{id}/actions", get(list_actions).post(create_action))
        .route("/{id}/knowledge", get(list_knowledge).post(connect_knowledge))
}

const INVALID_BODY: &str = "Invalid request body";

// ── Agents ───────────────────────────────────────────────────────────────────

async fn list_agents(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let agents = AgentBuilder::new(&api)
        .list_agents()
        .await
        .map_err(state.facade_error("Failed to fetch agents"))?;
    Ok(Json(json!({ "agents": agents })))
}

async fn create_agent(
    State(state): State<AppState>,
    session: AuthSession,
    payload: Result<Json<Agent>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::AGENT_EDITORS)?;
    let agent = json_body(payload, INVALID_BODY)?;
    let api = state.gateway.salesforce.session(Some(&session.0));
    let id = AgentBuilder::new(&api)
        .create_agent(&agent)
        .await
        .map_err(state.facade_error("Failed to create agent"))?;
    Ok(Json(json!({ "id": id, "success": true })))
}

async fn get_agent(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let agent = AgentBuilder::new(&api)
        .get_agent(&id)
        .await
        .map_err(state.facade_error("Failed to fetch agent"))?;
    Ok(Json(agent))
}

async fn update_agent(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    payload: Result<Json<AgentUpdate>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::AGENT_EDITORS)?;
    let update = AgentUpdate {
        id: Some(id),
        ..json_body(payload, INVALID_BODY)?
    };
    let api = state.gateway.salesforce.session(Some(&session.0));
    AgentBuilder::new(&api)
        .update_agent(&update)
        .await
        .map_err(state.facade_error("Failed to update agent"))?;
    Ok(Json(json!({ "success": true })))
}

async fn delete_agent(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::AGENT_OWNERS)?;
    let api = state.gateway.salesforce.session(Some(&session.0));
    AgentBuilder::new(&api)
        .delete_agent(&id)
        .await
        .map_err(state.facade_error("Failed to delete agent"))?;
    Ok(Json(json!({ "success": true })))
}

async fn deploy_agent(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::AGENT_EDITORS)?;
    let api = state.gateway.salesforce.session(Some(&session.0));
    let deployment = AgentBuilder::new(&api)
        .deploy_agent(&id)
        .await
        .map_err(state.facade_error("Failed to deploy agent"))?;
    Ok(Json(deployment))
}

#[derive(Deserialize)]
struct TestRequest {
    #[serde(default)]
    message: Option<String>,
}

async fn test_agent(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
    payload: Result<Json<TestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let message = json_body(payload, "Message is required")?
        .message
        .filter(|m| !m.is_empty())
        .ok_or_else(|| ApiError::bad_request("Message is required"))?;
    let api = state.gateway.salesforce.session(Some(&user));
    let reply = AgentBuilder::new(&api)
        .test_agent(&id, &message)
        .await
        .map_err(state.facade_error("Failed to test agent"))?;
    Ok(Json(reply))
}

// ── Custom actions ───────────────────────────────────────────────────────────

async fn list_actions(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let actions = AgentBuilder::new(&api)
        .list_custom_actions(&id)
        .await
        .map_err(state.facade_error("Failed to fetch custom actions"))?;
    Ok(Json(json!({ "actions": actions })))
}

async fn create_action(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    payload: Result<Json<CustomAction>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::AGENT_EDITORS)?;
    let action = json_body(payload, INVALID_BODY)?;
    let api = state.gateway.salesforce.session(Some(&session.0));
    let action_id = AgentBuilder::new(&api)
        .create_custom_action(&id, &action)
        .await
        .map_err(state.facade_error("Failed to create custom action"))?;
    Ok(Json(json!({ "id": action_id, "success": true })))
}

// ── Knowledge sources ────────────────────────────────────────────────────────

async fn list_knowledge(
    State(state): State<AppState>,
    AuthSession(user): AuthSession,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let api = state.gateway.salesforce.session(Some(&user));
    let sources = AgentBuilder::new(&api)
        .list_knowledge_sources(&id)
        .await
        .map_err(state.facade_error("Failed to fetch knowledge sources"))?;
    Ok(Json(json!({ "knowledgeSources": sources })))
}

async fn connect_knowledge(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    payload: Result<Json<KnowledgeSource>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    session.require_role(Role::AGENT_EDITORS)?;
    let source = json_body(payload, INVALID_BODY)?;
    let api = state.gateway.salesforce.session(Some(&session.0));
    let source_id = AgentBuilder::new(&api)
        .connect_knowledge_source(&id, &source)
        .await
        .map_err(state.facade_error("Failed to connect knowledge source"))?;
    Ok(Json(json!({ "id": source_id, "success": true })))
}
