//! Dashboard analytics served by the org's `/analytics/*` endpoints.

use {
    chrono::{Duration, NaiveDate},
    serde::{Deserialize, Serialize},
    tracing::error,
};

use crate::{Result, client::SalesforceApi};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketMetrics {
    pub total_tickets: u64,
    pub open_tickets: u64,
    pub resolved_tickets: u64,
    pub average_response_time: f64,
    pub average_resolution_time: f64,
    pub customer_satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMetrics {
    pub agent_id: String,
    pub agent_name: String,
    pub tickets_handled: u64,
    pub average_response_time: f64,
    pub resolution_rate: f64,
    pub customer_satisfaction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMetrics {
    pub category: String,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub date: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonPoint {
    pub date: String,
    #[serde(rename = "withAI")]
    pub with_ai: f64,
    #[serde(rename = "withoutAI")]
    pub without_ai: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    pub total_tickets: u64,
    pub average_response_time: f64,
    pub active_agents: u64,
    pub customer_satisfaction: f64,
}

/// Bucket size for time-series endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    #[default]
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

/// Metric compared between AI-assisted and unassisted tickets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonMetric {
    #[default]
    ResponseTime,
    ResolutionTime,
    Satisfaction,
}

impl ComparisonMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ResponseTime => "responseTime",
            Self::ResolutionTime => "resolutionTime",
            Self::Satisfaction => "satisfaction",
        }
    }
}

/// Inclusive reporting window, sent as `YYYY-MM-DD` strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

/// Days covered by [`DateRange::resolve`] when no start date is given.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

impl DateRange {
    /// Fill missing bounds: end defaults to `today`, start to
    /// [`DEFAULT_WINDOW_DAYS`] before `today`.
    pub fn resolve(start: Option<String>, end: Option<String>, today: NaiveDate) -> Self {
        let start = start
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format_date(today - Duration::days(DEFAULT_WINDOW_DAYS)));
        let end = end
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| format_date(today));
        Self { start, end }
    }

    fn params(&self) -> [(&'static str, &str); 2] {
        [("startDate", self.start.as_str()), ("endDate", self.end.as_str())]
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[derive(Deserialize)]
struct AgentsEnvelope {
    #[serde(default)]
    agents: Vec<AgentMetrics>,
}

#[derive(Deserialize)]
struct CategoriesEnvelope {
    #[serde(default)]
    categories: Vec<CategoryMetrics>,
}

#[derive(Deserialize)]
struct DataEnvelope<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
}

pub struct Analytics<'a> {
    api: &'a SalesforceApi,
}

impl<'a> Analytics<'a> {
    pub fn new(api: &'a SalesforceApi) -> Self {
        Self { api }
    }

    pub async fn ticket_metrics(&self, range: &DateRange) -> Result<TicketMetrics> {
        self.api
            .get_with(&self.api.data_path("analytics/tickets"), &range.params())
            .await
            .inspect_err(|e| error!(error = %e, "error fetching ticket metrics"))
    }

    pub async fn agent_metrics(&self, range: &DateRange) -> Result<Vec<AgentMetrics>> {
        self.api
            .get_with::<AgentsEnvelope>(&self.api.data_path("analytics/agents"), &range.params())
            .await
            .map(|env| env.agents)
            .inspect_err(|e| error!(error = %e, "error fetching agent metrics"))
    }

    pub async fn category_metrics(&self, range: &DateRange) -> Result<Vec<CategoryMetrics>> {
        self.api
            .get_with::<CategoriesEnvelope>(
                &self.api.data_path("analytics/categories"),
                &range.params(),
            )
            .await
            .map(|env| env.categories)
            .inspect_err(|e| error!(error = %e, "error fetching category metrics"))
    }

    pub async fn ticket_volume(
        &self,
        range: &DateRange,
        interval: Interval,
    ) -> Result<Vec<TimeSeriesPoint>> {
        let [start, end] = range.params();
        self.api
            .get_with::<DataEnvelope<TimeSeriesPoint>>(
                &self.api.data_path("analytics/ticketVolume"),
                &[start, end, ("interval", interval.as_str())],
            )
            .await
            .map(|env| env.data)
            .inspect_err(|e| error!(error = %e, "error fetching ticket volume time series"))
    }

    pub async fn ai_comparison(
        &self,
        range: &DateRange,
        metric: ComparisonMetric,
    ) -> Result<Vec<ComparisonPoint>> {
        let [start, end] = range.params();
        self.api
            .get_with::<DataEnvelope<ComparisonPoint>>(
                &self.api.data_path("analytics/aiComparison"),
                &[start, end, ("metric", metric.as_str())],
            )
            .await
            .map(|env| env.data)
            .inspect_err(|e| error!(error = %e, "error fetching AI comparison data"))
    }

    /// Real-time headline numbers; takes no date range.
    pub async fn dashboard_metrics(&self) -> Result<DashboardMetrics> {
        self.api
            .get(&self.api.data_path("analytics/dashboard"))
            .await
            .inspect_err(|e| error!(error = %e, "error fetching dashboard metrics"))
    }
}
