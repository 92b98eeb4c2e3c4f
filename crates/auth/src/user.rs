use serde::{Deserialize, Serialize};

/// Coarse authorization level carried in every session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Agent,
}

impl Role {
    /// Roles allowed to create, update and deploy agents.
    pub const AGENT_EDITORS: &'static [Role] = &[Role::Admin, Role::Manager];
    /// Roles allowed to delete agents.
    pub const AGENT_OWNERS: &'static [Role] = &[Role::Admin];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Manager => "manager",
            Self::Agent => "agent",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity embedded in a session token.
///
/// Salesforce users also carry the bearer token and instance URL obtained at
/// login, so their requests hit Salesforce as themselves.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesforce_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salesforce_instance_url: Option<String>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field(
                "salesforce_token",
                &self.salesforce_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("salesforce_instance_url", &self.salesforce_instance_url)
            .finish()
    }
}

/// Fixed id of the demo identity.
pub const DEMO_USER_ID: &str = "demo-user";

impl User {
    /// The identity handed out by demo-mode logins and Salesforce fallbacks.
    pub fn demo() -> Self {
        Self {
            id: DEMO_USER_ID.into(),
            name: "Demo User".into(),
            email: "demo@servicegenius.com".into(),
            role: Role::Admin,
            salesforce_token: None,
            salesforce_instance_url: None,
        }
    }

    pub fn is_demo(&self) -> bool {
        self.id == DEMO_USER_ID
    }

    /// Whether this user's role is one of `allowed`.
    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }

    /// The embedded Salesforce credential, if both halves are present.
    pub fn salesforce_credential(&self) -> Option<(&str, &str)> {
        match (&self.salesforce_token, &self.salesforce_instance_url) {
            (Some(token), Some(url)) if !token.is_empty() && !url.is_empty() => {
                Some((token.as_str(), url.as_str()))
            },
            _ => None,
        }
    }

    /// Copy without the Salesforce credential, safe to return to the browser.
    pub fn public(&self) -> Self {
        Self {
            salesforce_token: None,
            salesforce_instance_url: None,
            ..self.clone()
        }
    }
}
