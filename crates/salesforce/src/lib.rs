//! Salesforce access for the gateway.
//!
//! - [`SalesforceConnector`] is built once per process and picks, per
//!   request, between the caller's own token and the shared
//!   [`ServiceAccountAuth`].
//! - [`SalesforceApi`] is the bearer-authenticated REST/SOQL proxy.
//! - [`AgentBuilder`], [`CustomerService`] and [`Analytics`] map domain
//!   operations onto specific queries and REST paths.

pub mod agent_builder;
pub mod analytics;
pub mod client;
pub mod credentials;
pub mod customer_service;
pub mod error;
pub mod service_account;
pub mod soql;

pub use {
    agent_builder::{
        Agent, AgentBuilder, AgentUpdate, CustomAction, Deployment, InputParameter,
        KnowledgeSource, OutputParameter, TestReply,
    },
    analytics::{
        AgentMetrics, Analytics, CategoryMetrics, ComparisonMetric, ComparisonPoint,
        DashboardMetrics, DateRange, Interval, TicketMetrics, TimeSeriesPoint,
    },
    client::{CreateResult, QueryResult, SalesforceApi, SalesforceConnector},
    credentials::{BearerCredential, CredentialSource},
    customer_service::{
        Case, Contact, CustomerService, Order, OrderItem, Product, ReturnConfirmation, ReturnItem,
    },
    error::{Error, Result},
    service_account::{REFRESH_BUFFER_SECS, ServiceAccountAuth},
};
