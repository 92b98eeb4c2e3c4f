//! Agent builder facade over the `Agent__c`, `CustomAction__c` and
//! `KnowledgeSource__c` custom objects.

use {
    chrono::Utc,
    serde::{Deserialize, Serialize},
    serde_json::json,
    tracing::error,
};

use crate::{
    Error, Result,
    client::{CreateResult, SalesforceApi},
    soql,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

/// Partial edit of an agent. Fields left `None` keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdate {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub instructions: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub capabilities: Option<Vec<String>>,
}

/// `Agent__c` columns written by an [`AgentUpdate`].
#[derive(Debug, Serialize)]
struct AgentChanges<'a> {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(rename = "Description__c", skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(rename = "Instructions__c", skip_serializing_if = "Option::is_none")]
    instructions: Option<&'a str>,
    #[serde(rename = "Type__c", skip_serializing_if = "Option::is_none")]
    kind: Option<&'a str>,
    #[serde(rename = "Capabilities__c", skip_serializing_if = "Option::is_none")]
    capabilities: Option<String>,
}

impl AgentUpdate {
    fn changes(&self) -> AgentChanges<'_> {
        AgentChanges {
            name: self.name.as_deref(),
            description: self.description.as_deref(),
            instructions: self.instructions.as_deref(),
            kind: self.kind.as_deref(),
            capabilities: self.capabilities.as_ref().map(|c| c.join(",")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub input_parameters: Vec<InputParameter>,
    #[serde(default)]
    pub output_parameters: Vec<OutputParameter>,
    #[serde(default)]
    pub api_name: String,
    #[serde(default)]
    pub implementation: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub last_synced: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub deployment_id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestReply {
    pub response: String,
}

// ── Remote record shapes ────────────────────────────────────────────────────

#[derive(Deserialize)]
struct AgentRecord {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Description__c", default)]
    description: Option<String>,
    #[serde(rename = "Instructions__c", default)]
    instructions: Option<String>,
    #[serde(rename = "Type__c", default)]
    kind: Option<String>,
    #[serde(rename = "Capabilities__c", default)]
    capabilities: Option<String>,
}

impl From<AgentRecord> for Agent {
    fn from(r: AgentRecord) -> Self {
        Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            instructions: r.instructions.unwrap_or_default(),
            kind: r.kind.unwrap_or_default(),
            capabilities: split_capabilities(r.capabilities.as_deref()),
        }
    }
}

#[derive(Deserialize)]
struct CustomActionRecord {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Description__c", default)]
    description: Option<String>,
    #[serde(rename = "InputParameters__c", default)]
    input_parameters: Option<String>,
    #[serde(rename = "OutputParameters__c", default)]
    output_parameters: Option<String>,
    #[serde(rename = "ApiName__c", default)]
    api_name: Option<String>,
    #[serde(rename = "Implementation__c", default)]
    implementation: Option<String>,
}

impl TryFrom<CustomActionRecord> for CustomAction {
    type Error = Error;

    fn try_from(r: CustomActionRecord) -> Result<Self> {
        Ok(Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            input_parameters: parse_parameters(r.input_parameters.as_deref())?,
            output_parameters: parse_parameters(r.output_parameters.as_deref())?,
            api_name: r.api_name.unwrap_or_default(),
            implementation: r.implementation.unwrap_or_default(),
        })
    }
}

#[derive(Deserialize)]
struct KnowledgeSourceRecord {
    #[serde(rename = "Id")]
    id: Option<String>,
    #[serde(rename = "Name", default)]
    name: Option<String>,
    #[serde(rename = "Description__c", default)]
    description: Option<String>,
    #[serde(rename = "Type__c", default)]
    kind: Option<String>,
    #[serde(rename = "SourceUrl__c", default)]
    source_url: Option<String>,
    #[serde(rename = "LastSynced__c", default)]
    last_synced: Option<String>,
}

impl From<KnowledgeSourceRecord> for KnowledgeSource {
    fn from(r: KnowledgeSourceRecord) -> Self {
        Self {
            id: r.id,
            name: r.name.unwrap_or_default(),
            description: r.description.unwrap_or_default(),
            kind: r.kind.unwrap_or_default(),
            source_url: r.source_url.unwrap_or_default(),
            last_synced: r.last_synced.unwrap_or_default(),
        }
    }
}

fn split_capabilities(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(s) if !s.is_empty() => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn parse_parameters<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Result<Vec<T>> {
    match raw {
        Some(s) if !s.trim().is_empty() => {
            serde_json::from_str(s).map_err(|e| Error::Decode(format!("action parameters: {e}")))
        },
        _ => Ok(Vec::new()),
    }
}

/// Parameter lists are stored as JSON text in long-text fields.
fn stringify<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| Error::Decode(e.to_string()))
}

fn agent_fields(agent: &Agent) -> serde_json::Value {
    json!({
        "Name": agent.name,
        "Description__c": agent.description,
        "Instructions__c": agent.instructions,
        "Type__c": agent.kind,
        "Capabilities__c": agent.capabilities.join(","),
    })
}

fn created(result: CreateResult, failure: &str) -> Result<String> {
    if result.success {
        Ok(result.id)
    } else {
        Err(Error::OperationFailed(failure.to_string()))
    }
}

// ── Facade ──────────────────────────────────────────────────────────────────

pub struct AgentBuilder<'a> {
    api: &'a SalesforceApi,
}

impl<'a> AgentBuilder<'a> {
    pub fn new(api: &'a SalesforceApi) -> Self {
        Self { api }
    }

    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        let page = self
            .api
            .query::<AgentRecord>(
                "SELECT Id, Name, Description__c, Instructions__c, Type__c, Capabilities__c FROM Agent__c",
            )
            .await
            .inspect_err(|e| error!(error = %e, "error fetching agents"))?;
        Ok(page.records.into_iter().map(Agent::from).collect())
    }

    pub async fn get_agent(&self, id: &str) -> Result<Agent> {
        self.api
            .get::<AgentRecord>(&self.api.sobject_path("Agent__c", Some(id)))
            .await
            .map(Agent::from)
            .inspect_err(|e| error!(agent_id = id, error = %e, "error fetching agent"))
    }

    /// Create an agent and return its new id.
    pub async fn create_agent(&self, agent: &Agent) -> Result<String> {
        self.api
            .post::<CreateResult, _>(&self.api.sobject_path("Agent__c", None), &agent_fields(agent))
            .await
            .and_then(|r| created(r, "Failed to create agent"))
            .inspect_err(|e| error!(error = %e, "error creating agent"))
    }

    /// Write the supplied fields of `update` to its agent.
    pub async fn update_agent(&self, update: &AgentUpdate) -> Result<()> {
        let Some(id) = update.id.as_deref().filter(|id| !id.is_empty()) else {
            return Err(Error::InvalidInput("Agent ID is required for update".into()));
        };
        self.api
            .patch(&self.api.sobject_path("Agent__c", Some(id)), &update.changes())
            .await
            .inspect_err(|e| error!(agent_id = id, error = %e, "error updating agent"))
    }

    pub async fn delete_agent(&self, id: &str) -> Result<()> {
        self.api
            .delete(&self.api.sobject_path("Agent__c", Some(id)))
            .await
            .inspect_err(|e| error!(agent_id = id, error = %e, "error deleting agent"))
    }

    pub async fn list_custom_actions(&self, agent_id: &str) -> Result<Vec<CustomAction>> {
        let soql = format!(
            "SELECT Id, Name, Description__c, InputParameters__c, OutputParameters__c, ApiName__c, Implementation__c FROM CustomAction__c WHERE Agent__c = {}",
            soql::quote(agent_id)
        );
        self.api
            .query::<CustomActionRecord>(&soql)
            .await
            .and_then(|page| page.records.into_iter().map(CustomAction::try_from).collect())
            .inspect_err(|e| error!(agent_id, error = %e, "error fetching custom actions"))
    }

    pub async fn create_custom_action(&self, agent_id: &str, action: &CustomAction) -> Result<String> {
        let body = json!({
            "Name": action.name,
            "Description__c": action.description,
            "InputParameters__c": stringify(&action.input_parameters)?,
            "OutputParameters__c": stringify(&action.output_parameters)?,
            "ApiName__c": action.api_name,
            "Implementation__c": action.implementation,
            "Agent__c": agent_id,
        });
        self.api
            .post::<CreateResult, _>(&self.api.sobject_path("CustomAction__c", None), &body)
            .await
            .and_then(|r| created(r, "Failed to create custom action"))
            .inspect_err(|e| error!(agent_id, error = %e, "error creating custom action"))
    }

    pub async fn list_knowledge_sources(&self, agent_id: &str) -> Result<Vec<KnowledgeSource>> {
        let soql = format!(
            "SELECT Id, Name, Description__c, Type__c, SourceUrl__c, LastSynced__c FROM KnowledgeSource__c WHERE Agent__c = {}",
            soql::quote(agent_id)
        );
        let page = self
            .api
            .query::<KnowledgeSourceRecord>(&soql)
            .await
            .inspect_err(|e| error!(agent_id, error = %e, "error fetching knowledge sources"))?;
        Ok(page.records.into_iter().map(KnowledgeSource::from).collect())
    }

    /// Attach a knowledge source, stamping it as synced now.
    pub async fn connect_knowledge_source(
        &self,
        agent_id: &str,
        source: &KnowledgeSource,
    ) -> Result<String> {
        let body = json!({
            "Name": source.name,
            "Description__c": source.description,
            "Type__c": source.kind,
            "SourceUrl__c": source.source_url,
            "LastSynced__c": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            "Agent__c": agent_id,
        });
        self.api
            .post::<CreateResult, _>(&self.api.sobject_path("KnowledgeSource__c", None), &body)
            .await
            .and_then(|r| created(r, "Failed to connect knowledge source"))
            .inspect_err(|e| error!(agent_id, error = %e, "error connecting knowledge source"))
    }

    pub async fn deploy_agent(&self, agent_id: &str) -> Result<Deployment> {
        let path = format!("{}/deploy", self.api.sobject_path("Agent__c", Some(agent_id)));
        self.api
            .post(&path, &json!({}))
            .await
            .inspect_err(|e| error!(agent_id, error = %e, "error deploying agent"))
    }

    pub async fn test_agent(&self, agent_id: &str, message: &str) -> Result<TestReply> {
        let path = format!("{}/test", self.api.sobject_path("Agent__c", Some(agent_id)));
        self.api
            .post(&path, &json!({ "message": message }))
            .await
            .inspect_err(|e| error!(agent_id, error = %e, "error testing agent"))
    }
}
