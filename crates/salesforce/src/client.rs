use std::sync::Arc;

use {
    reqwest::{Method, RequestBuilder, Response, header::CONTENT_TYPE},
    secrecy::ExposeSecret,
    serde::{Deserialize, Serialize, de::DeserializeOwned},
    servicegenius_auth::User,
    servicegenius_config::SalesforceConfig,
    tracing::{debug, warn},
};

use crate::{
    Error, Result,
    credentials::CredentialSource,
    service_account::ServiceAccountAuth,
};

/// Page of records returned by the SOQL `query` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    #[serde(default = "Vec::new")]
    pub records: Vec<T>,
    #[serde(default)]
    pub total_size: u64,
    #[serde(default)]
    pub done: bool,
}

/// Body returned by sobject creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateResult {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub success: bool,
}

/// Process-wide entry point to Salesforce.
///
/// Holds the HTTP client and the service-account fallback; hands out a
/// [`SalesforceApi`] bound to the right credential for each request.
#[derive(Debug, Clone)]
pub struct SalesforceConnector {
    client: reqwest::Client,
    fallback: CredentialSource,
    api_version: String,
}

impl SalesforceConnector {
    pub fn new(
        client: reqwest::Client,
        fallback: CredentialSource,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            fallback,
            api_version: api_version.into(),
        }
    }

    /// Connector whose fallback is the configured service account, or
    /// [`CredentialSource::Unconfigured`] when its settings are incomplete.
    pub fn from_config(config: &SalesforceConfig) -> Self {
        let client = reqwest::Client::new();
        let fallback = match ServiceAccountAuth::from_config(config, client.clone()) {
            Ok(auth) => CredentialSource::ServiceAccount(Arc::new(auth)),
            Err(Error::MissingConfig(missing)) => {
                debug!(missing = ?missing, "service account not configured");
                CredentialSource::Unconfigured(missing)
            },
            Err(e) => {
                warn!(error = %e, "service account unavailable");
                CredentialSource::Unconfigured(Vec::new())
            },
        };
        Self::new(client, fallback, config.api_version.clone())
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn http_client(&self) -> &reqwest::Client {
        &self.client
    }

    /// REST handle for one request: the user's embedded token if the session
    /// carries one, else the service account.
    pub fn session(&self, user: Option<&User>) -> SalesforceApi {
        SalesforceApi {
            client: self.client.clone(),
            credentials: CredentialSource::for_user(user, &self.fallback),
            api_version: self.api_version.clone(),
        }
    }

    /// Whether the service account can currently authenticate.
    pub async fn is_connected(&self) -> bool {
        match self.fallback.resolve().await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "Salesforce connection check failed");
                false
            },
        }
    }
}

/// Bearer-authenticated REST calls against one org instance.
#[derive(Debug, Clone)]
pub struct SalesforceApi {
    client: reqwest::Client,
    credentials: CredentialSource,
    api_version: String,
}

impl SalesforceApi {
    pub fn new(
        client: reqwest::Client,
        credentials: CredentialSource,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            client,
            credentials,
            api_version: api_version.into(),
        }
    }

    /// `/services/data/{version}/{suffix}`
    pub fn data_path(&self, suffix: &str) -> String {
        format!(
            "/services/data/{}/{}",
            self.api_version,
            suffix.trim_start_matches('/')
        )
    }

    /// `/services/data/{version}/sobjects/{object}[/{id}]`
    pub fn sobject_path(&self, object: &str, id: Option<&str>) -> String {
        match id {
            Some(id) => self.data_path(&format!("sobjects/{object}/{}", urlencoding::encode(id))),
            None => self.data_path(&format!("sobjects/{object}")),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self.send(Method::GET, path, |req| req).await?;
        decode(resp).await
    }

    /// GET with query parameters appended to `path`.
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let resp = self
            .send(Method::GET, path, |req| req.query(params))
            .await?;
        decode(resp).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let resp = self
            .send(Method::POST, path, |req| req.json(body))
            .await?;
        decode(resp).await
    }

    /// PATCH `body`; Salesforce answers sobject updates with an empty 204.
    pub async fn patch<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<()> {
        self.send(Method::PATCH, path, |req| req.json(body))
            .await
            .map(drop)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send(Method::DELETE, path, |req| req).await.map(drop)
    }

    /// Run a SOQL query through `/services/data/{version}/query`.
    pub async fn query<T: DeserializeOwned>(&self, soql: &str) -> Result<QueryResult<T>> {
        let path = self.data_path(&format!("query?q={}", urlencoding::encode(soql)));
        self.get(&path).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        build: impl FnOnce(RequestBuilder) -> RequestBuilder,
    ) -> Result<Response> {
        let credential = self.credentials.resolve().await?;
        let url = format!("{}{path}", credential.instance_url.trim_end_matches('/'));
        debug!(%method, path, per_user = self.credentials.is_per_user(), "Salesforce request");

        let req = self
            .client
            .request(method.clone(), &url)
            .bearer_auth(credential.access_token.expose_secret())
            .header(CONTENT_TYPE, "application/json");
        let resp = build(req).send().await?;

        let status = resp.status();
        if !status.is_success() {
            warn!(%method, path, status = status.as_u16(), "Salesforce API error");
            return Err(Error::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }
        Ok(resp)
    }
}

async fn decode<T: DeserializeOwned>(resp: Response) -> Result<T> {
    resp.json::<T>()
        .await
        .map_err(|e| Error::Decode(e.to_string()))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, crate::credentials::BearerCredential, secrecy::Secret};

    fn api() -> SalesforceApi {
        SalesforceApi::new(
            reqwest::Client::new(),
            CredentialSource::PerUser(BearerCredential {
                access_token: Secret::new("t".into()),
                instance_url: "https://x".into(),
            }),
            "v58.0",
        )
    }

    #[test]
    fn paths_are_versioned() {
        let api = api();
        assert_eq!(api.data_path("analytics/dashboard"), "/services/data/v58.0/analytics/dashboard");
        assert_eq!(api.data_path("/query"), "/services/data/v58.0/query");
        assert_eq!(
            api.sobject_path("Agent__c", Some("a00xx")),
            "/services/data/v58.0/sobjects/Agent__c/a00xx"
        );
        assert_eq!(api.sobject_path("Case", None), "/services/data/v58.0/sobjects/Case");
    }

    #[test]
    fn sobject_ids_are_path_encoded() {
        assert_eq!(
            api().sobject_path("Order", Some("a/b")),
            "/services/data/v58.0/sobjects/Order/a%2Fb"
        );
    }

    #[test]
    fn query_result_tolerates_missing_fields() {
        let page: QueryResult<serde_json::Value> =
            serde_json::from_str(r#"{"records":[{"Id":"1"}]}"#).unwrap();
        assert_eq!(page.records.len(), 1);
        assert_eq!(page.total_size, 0);
        assert!(!page.done);
    }
}
