#![allow(clippy::unwrap_used, clippy::expect_used)]
use {
    mockito::{Matcher, Server, ServerGuard},
    secrecy::Secret,
    serde_json::json,
    servicegenius_salesforce::{
        Agent, AgentBuilder, AgentUpdate, Analytics, BearerCredential, Case, ComparisonMetric,
        CredentialSource, CustomerService, DateRange, Error, Interval, KnowledgeSource,
        ReturnItem, SalesforceApi,
    },
};

const QUERY_PATH: &str = "/services/data/v58.0/query";

async fn setup() -> (ServerGuard, SalesforceApi) {
    let server = Server::new_async().await;
    let api = SalesforceApi::new(
        reqwest::Client::new(),
        CredentialSource::PerUser(BearerCredential {
            access_token: Secret::new("user-token".into()),
            instance_url: server.url(),
        }),
        "v58.0",
    );
    (server, api)
}

fn soql(q: &str) -> Matcher {
    Matcher::UrlEncoded("q".into(), q.into())
}

fn page(records: serde_json::Value) -> String {
    let size = records.as_array().map_or(0, Vec::len);
    json!({ "totalSize": size, "done": true, "records": records }).to_string()
}

// ── Customer service ────────────────────────────────────────────────────────

#[tokio::test]
async fn order_number_resolves_via_query() {
    let (mut server, api) = setup().await;
    let query = server
        .mock("GET", QUERY_PATH)
        .match_query(soql(
            "SELECT Id, OrderNumber, Status, EffectiveDate, AccountId, TotalAmount FROM Order WHERE OrderNumber = 'ORD-001'",
        ))
        .match_header("authorization", "Bearer user-token")
        .with_body(page(json!([{
            "Id": "801xx000003GYk1AAG",
            "OrderNumber": "ORD-001",
            "Status": "Activated",
            "EffectiveDate": "2024-03-01",
            "AccountId": "001xx",
            "TotalAmount": 129.99,
        }])))
        .expect(1)
        .create_async()
        .await;
    let direct = server
        .mock("GET", Matcher::Regex(r"^/services/data/v58.0/sobjects/Order/".into()))
        .expect(0)
        .create_async()
        .await;

    let order = CustomerService::new(&api).get_order("ORD-001").await.unwrap();
    assert_eq!(order.order_number.as_deref(), Some("ORD-001"));
    assert_eq!(order.total_amount, Some(129.99));
    query.assert_async().await;
    direct.assert_async().await;
}

#[tokio::test]
async fn record_id_falls_back_to_direct_fetch() {
    let (mut server, api) = setup().await;
    let id = "801xx000003GYk1AAG";
    let query = server
        .mock("GET", QUERY_PATH)
        .match_query(soql(&format!(
            "SELECT Id, OrderNumber, Status, EffectiveDate, AccountId, TotalAmount FROM Order WHERE OrderNumber = '{id}'"
        )))
        .with_body(page(json!([])))
        .expect(1)
        .create_async()
        .await;
    let direct = server
        .mock("GET", format!("/services/data/v58.0/sobjects/Order/{id}").as_str())
        .with_body(json!({ "Id": id, "OrderNumber": "00000100", "Status": "Draft" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let order = CustomerService::new(&api).get_order(id).await.unwrap();
    assert_eq!(order.id.as_deref(), Some(id));
    assert_eq!(order.order_number.as_deref(), Some("00000100"));
    query.assert_async().await;
    direct.assert_async().await;
}

#[tokio::test]
async fn email_resolves_via_contact_query() {
    let (mut server, api) = setup().await;
    let query = server
        .mock("GET", QUERY_PATH)
        .match_query(soql(
            "SELECT Id, FirstName, LastName, Email, Phone, AccountId FROM Contact WHERE Email = 'a@b.com'",
        ))
        .with_body(page(json!([{ "Id": "003xx", "Email": "a@b.com", "LastName": "B" }])))
        .expect(1)
        .create_async()
        .await;

    let contact = CustomerService::new(&api).get_customer("a@b.com").await.unwrap();
    assert_eq!(contact.id.as_deref(), Some("003xx"));
    query.assert_async().await;
}

#[tokio::test]
async fn contact_id_skips_email_query() {
    let (mut server, api) = setup().await;
    let query = server
        .mock("GET", QUERY_PATH)
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;
    let direct = server
        .mock("GET", "/services/data/v58.0/sobjects/Contact/003xx0000004TmiEAE")
        .with_body(json!({ "Id": "003xx0000004TmiEAE", "FirstName": "Ada" }).to_string())
        .expect(1)
        .create_async()
        .await;

    let contact = CustomerService::new(&api)
        .get_customer("003xx0000004TmiEAE")
        .await
        .unwrap();
    assert_eq!(contact.first_name.as_deref(), Some("Ada"));
    query.assert_async().await;
    direct.assert_async().await;
}

#[tokio::test]
async fn cases_are_paged_newest_first() {
    let (mut server, api) = setup().await;
    server
        .mock("GET", QUERY_PATH)
        .match_query(soql(
            "SELECT Id, CaseNumber, Subject, Description, Status, Priority, Origin, ContactId, CreatedDate, LastModifiedDate FROM Case ORDER BY CreatedDate DESC LIMIT 5 OFFSET 10",
        ))
        .with_body(page(json!([{ "Id": "500xx", "CaseNumber": "00001026", "Subject": "Late" }])))
        .create_async()
        .await;

    let cases = CustomerService::new(&api).list_cases(5, 10).await.unwrap();
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].case_number.as_deref(), Some("00001026"));
}

#[tokio::test]
async fn rejected_case_creation_is_operation_failure() {
    let (mut server, api) = setup().await;
    server
        .mock("POST", "/services/data/v58.0/sobjects/Case")
        .match_body(Matcher::PartialJson(json!({ "Subject": "Broken zipper" })))
        .with_status(201)
        .with_body(r#"{"id":"","success":false,"errors":[]}"#)
        .create_async()
        .await;

    let case = Case {
        subject: Some("Broken zipper".into()),
        ..Default::default()
    };
    let err = CustomerService::new(&api).create_case(&case).await.unwrap_err();
    assert!(matches!(err, Error::OperationFailed(ref m) if m == "Failed to create case"));
}

#[tokio::test]
async fn return_request_posts_custom_action() {
    let (mut server, api) = setup().await;
    let action = server
        .mock("POST", "/services/data/v58.0/actions/custom/return/createReturn")
        .match_body(Matcher::Json(json!({
            "OrderId": "801xx",
            "Reason": "Damaged",
            "Items": [{ "productId": "01txx", "quantity": 2 }],
        })))
        .with_body(r#"{"returnId":"RET-1","returnLabel":"https://labels/RET-1.pdf"}"#)
        .expect(1)
        .create_async()
        .await;

    let items = [ReturnItem {
        product_id: "01txx".into(),
        quantity: 2,
    }];
    let confirmation = CustomerService::new(&api)
        .create_return_request("801xx", "Damaged", &items)
        .await
        .unwrap();
    assert_eq!(confirmation.return_id, "RET-1");
    action.assert_async().await;
}

#[tokio::test]
async fn quotes_in_identifiers_are_escaped() {
    let (mut server, api) = setup().await;
    let query = server
        .mock("GET", QUERY_PATH)
        .match_query(soql(
            r"SELECT Id, FirstName, LastName, Email, Phone, AccountId FROM Contact WHERE Email = 'o\'neil@example.com'",
        ))
        .with_body(page(json!([{ "Id": "003xx" }])))
        .expect(1)
        .create_async()
        .await;

    CustomerService::new(&api)
        .get_customer("o'neil@example.com")
        .await
        .unwrap();
    query.assert_async().await;
}

// ── Agent builder ───────────────────────────────────────────────────────────

#[tokio::test]
async fn agents_are_listed_with_split_capabilities() {
    let (mut server, api) = setup().await;
    server
        .mock("GET", QUERY_PATH)
        .match_query(soql(
            "SELECT Id, Name, Description__c, Instructions__c, Type__c, Capabilities__c FROM Agent__c",
        ))
        .with_body(page(json!([{
            "Id": "a00xx",
            "Name": "Returns bot",
            "Description__c": "Handles returns",
            "Instructions__c": "Be brief",
            "Type__c": "service",
            "Capabilities__c": "returns,refunds",
        }])))
        .create_async()
        .await;

    let agents = AgentBuilder::new(&api).list_agents().await.unwrap();
    assert_eq!(agents.len(), 1);
    assert_eq!(agents[0].capabilities, vec!["returns", "refunds"]);
}

#[tokio::test]
async fn create_agent_sends_custom_fields() {
    let (mut server, api) = setup().await;
    let create = server
        .mock("POST", "/services/data/v58.0/sobjects/Agent__c")
        .match_body(Matcher::Json(json!({
            "Name": "Returns bot",
            "Description__c": "Handles returns",
            "Instructions__c": "Be brief",
            "Type__c": "service",
            "Capabilities__c": "returns,refunds",
        })))
        .with_status(201)
        .with_body(r#"{"id":"a00xx","success":true,"errors":[]}"#)
        .expect(1)
        .create_async()
        .await;

    let agent = Agent {
        id: None,
        name: "Returns bot".into(),
        description: "Handles returns".into(),
        instructions: "Be brief".into(),
        kind: "service".into(),
        capabilities: vec!["returns".into(), "refunds".into()],
    };
    let id = AgentBuilder::new(&api).create_agent(&agent).await.unwrap();
    assert_eq!(id, "a00xx");
    create.assert_async().await;
}

#[tokio::test]
async fn update_without_id_is_invalid_input() {
    let (_server, api) = setup().await;
    let err = AgentBuilder::new(&api)
        .update_agent(&AgentUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
}

#[tokio::test]
async fn update_and_delete_accept_empty_responses() {
    let (mut server, api) = setup().await;
    let patch = server
        .mock("PATCH", "/services/data/v58.0/sobjects/Agent__c/a00xx")
        .match_body(Matcher::Json(json!({ "Name": "Renamed" })))
        .with_status(204)
        .expect(1)
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/services/data/v58.0/sobjects/Agent__c/a00xx")
        .with_status(204)
        .expect(1)
        .create_async()
        .await;

    let builder = AgentBuilder::new(&api);
    let update = AgentUpdate {
        id: Some("a00xx".into()),
        name: Some("Renamed".into()),
        ..Default::default()
    };
    builder.update_agent(&update).await.unwrap();
    builder.delete_agent("a00xx").await.unwrap();
    patch.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn upstream_status_is_carried_not_body() {
    let (mut server, api) = setup().await;
    server
        .mock("GET", "/services/data/v58.0/sobjects/Agent__c/missing")
        .with_status(404)
        .with_body(r#"[{"errorCode":"NOT_FOUND","message":"The requested resource does not exist"}]"#)
        .create_async()
        .await;

    let err = AgentBuilder::new(&api).get_agent("missing").await.unwrap_err();
    match err {
        Error::Api {
            status,
            status_text,
        } => {
            assert_eq!(status, 404);
            assert_eq!(status_text, "Not Found");
        },
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn knowledge_source_is_stamped_with_sync_time() {
    let (mut server, api) = setup().await;
    let create = server
        .mock("POST", "/services/data/v58.0/sobjects/KnowledgeSource__c")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(json!({
                "Name": "FAQ",
                "Type__c": "website",
                "SourceUrl__c": "https://example.com/faq",
                "Agent__c": "a00xx",
            })),
            Matcher::Regex(r#""LastSynced__c":"\d{4}-\d{2}-\d{2}T"#.into()),
        ]))
        .with_body(r#"{"id":"a02xx","success":true}"#)
        .expect(1)
        .create_async()
        .await;

    let source = KnowledgeSource {
        name: "FAQ".into(),
        kind: "website".into(),
        source_url: "https://example.com/faq".into(),
        ..Default::default()
    };
    let id = AgentBuilder::new(&api)
        .connect_knowledge_source("a00xx", &source)
        .await
        .unwrap();
    assert_eq!(id, "a02xx");
    create.assert_async().await;
}

#[tokio::test]
async fn deploy_and_test_hit_agent_actions() {
    let (mut server, api) = setup().await;
    server
        .mock("POST", "/services/data/v58.0/sobjects/Agent__c/a00xx/deploy")
        .match_body(Matcher::Json(json!({})))
        .with_body(r#"{"deploymentId":"dep-1","status":"Queued"}"#)
        .create_async()
        .await;
    server
        .mock("POST", "/services/data/v58.0/sobjects/Agent__c/a00xx/test")
        .match_body(Matcher::Json(json!({ "message": "Where is my order?" })))
        .with_body(r#"{"response":"It shipped yesterday."}"#)
        .create_async()
        .await;

    let builder = AgentBuilder::new(&api);
    let deployment = builder.deploy_agent("a00xx").await.unwrap();
    assert_eq!(deployment.deployment_id, "dep-1");
    let reply = builder.test_agent("a00xx", "Where is my order?").await.unwrap();
    assert_eq!(reply.response, "It shipped yesterday.");
}

#[tokio::test]
async fn custom_actions_filter_by_agent() {
    let (mut server, api) = setup().await;
    server
        .mock("GET", QUERY_PATH)
        .match_query(soql(
            "SELECT Id, Name, Description__c, InputParameters__c, OutputParameters__c, ApiName__c, Implementation__c FROM CustomAction__c WHERE Agent__c = 'a00xx'",
        ))
        .with_body(page(json!([{
            "Id": "a01xx",
            "Name": "Lookup order",
            "InputParameters__c": r#"[{"name":"orderId","type":"string","required":true}]"#,
            "OutputParameters__c": r#"[{"name":"status","type":"string"}]"#,
            "ApiName__c": "lookup_order",
        }])))
        .create_async()
        .await;

    let actions = AgentBuilder::new(&api)
        .list_custom_actions("a00xx")
        .await
        .unwrap();
    assert_eq!(actions[0].output_parameters[0].name, "status");
    assert_eq!(actions[0].api_name, "lookup_order");
}

// ── Analytics ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn analytics_pass_date_range_and_unwrap_envelopes() {
    let (mut server, api) = setup().await;
    let range = DateRange {
        start: "2024-01-01".into(),
        end: "2024-01-31".into(),
    };
    server
        .mock("GET", "/services/data/v58.0/analytics/ticketVolume")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("startDate".into(), "2024-01-01".into()),
            Matcher::UrlEncoded("endDate".into(), "2024-01-31".into()),
            Matcher::UrlEncoded("interval".into(), "week".into()),
        ]))
        .with_body(r#"{"data":[{"date":"1/1","value":120}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/services/data/v58.0/analytics/aiComparison")
        .match_query(Matcher::UrlEncoded("metric".into(), "satisfaction".into()))
        .with_body(r#"{"data":[{"date":"1/1","withAI":90,"withoutAI":80}]}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/services/data/v58.0/analytics/categories")
        .match_query(Matcher::UrlEncoded("startDate".into(), "2024-01-01".into()))
        .with_body(r#"{"categories":[{"category":"Billing","count":35,"percentage":35}]}"#)
        .create_async()
        .await;

    let analytics = Analytics::new(&api);
    let volume = analytics.ticket_volume(&range, Interval::Week).await.unwrap();
    assert_eq!(volume[0].value, 120.0);
    let comparison = analytics
        .ai_comparison(&range, ComparisonMetric::Satisfaction)
        .await
        .unwrap();
    assert_eq!(comparison[0].with_ai, 90.0);
    let categories = analytics.category_metrics(&range).await.unwrap();
    assert_eq!(categories[0].category, "Billing");
}
