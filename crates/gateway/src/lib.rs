//! HTTP gateway: session gate, auth routes and the Salesforce-backed JSON API.

pub mod agent_routes;
pub mod api_error;
pub mod auth_middleware;
pub mod auth_routes;
pub mod customer_routes;
pub mod dashboard_routes;
pub mod server;
pub mod state;

pub use {
    api_error::ApiError,
    server::{AppState, api_router, build_gateway_app, start_gateway},
    state::GatewayState,
};
