//! Integration tests for the ARM HTTP client using wiremock
//!
//! These tests verify status code, header and error envelope handling
//! against mocked endpoints, then drive a full create/read/delete cycle.

use std::time::Duration;

use azurerm_core::identifier::ResourceIdentifier;
use azurerm_core::provider::{ErrorKind, OperationContext, Provider};
use azurerm_core::resource::{Resource, ResourceAddress};
use azurerm_provider::client::{OperationHandle, OperationStatus, PollKind, Submitted};
use azurerm_provider::{ArmClient, ArmHttpClient, AzurermProvider, ProviderConfig, RemoteError, RemoteResource};
use serde_json::json;
use wiremock::matchers::{bearer_token, body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COUNTER_PATH: &str = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.OperationalInsights/workspaces/ws-01/dataSources/cpu";
const COUNTER_API_VERSION: &str = "2015-11-01-preview";

fn config(server: &MockServer) -> ProviderConfig {
    ProviderConfig::new("sub1", "test-token")
        .with_endpoint(server.uri())
        .with_poll_interval(Duration::from_secs(1))
}

fn client(server: &MockServer) -> ArmHttpClient {
    ArmHttpClient::new(&config(server)).unwrap()
}

fn counter_id() -> ResourceIdentifier {
    ResourceIdentifier::parse(COUNTER_PATH).unwrap()
}

fn counter_document() -> serde_json::Value {
    json!({
        "id": COUNTER_PATH,
        "name": "cpu",
        "type": "Microsoft.OperationalInsights/workspaces/dataSources",
        "kind": "WindowsPerformanceCounter",
        "properties": {
            "counterName": "% Processor Time",
            "instanceName": "_Total",
            "intervalSeconds": 60,
            "objectName": "Processor"
        }
    })
}

fn counter_resource() -> Resource {
    Resource::new("log_analytics_datasource_windows_performance_counter", "cpu")
        .with_attribute("name", "cpu")
        .with_attribute("resource_group_name", "rg1")
        .with_attribute("workspace_name", "ws-01")
        .with_attribute("counter_name", "% Processor Time")
        .with_attribute("instance_name", "_Total")
        .with_attribute("interval_seconds", 60)
        .with_attribute("object_name", "Processor")
}

mod http_client_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_resource_success() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .and(query_param("api-version", COUNTER_API_VERSION))
            .and(bearer_token("test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(counter_document()))
            .expect(1)
            .mount(&server)
            .await;

        let resource = client(&server)
            .get(&counter_id(), COUNTER_API_VERSION)
            .await
            .unwrap();
        assert_eq!(resource.id.as_deref(), Some(COUNTER_PATH));
        assert_eq!(resource.kind.as_deref(), Some("WindowsPerformanceCounter"));
        assert_eq!(resource.properties["intervalSeconds"], 60);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": {"code": "ResourceNotFound", "message": "not found"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .get(&counter_id(), COUNTER_API_VERSION)
            .await
            .unwrap_err();
        assert_eq!(err, RemoteError::NotFound);
    }

    #[tokio::test]
    async fn test_error_envelope_is_parsed() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "InvalidParameter", "message": "intervalSeconds is invalid"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .put(&counter_id(), COUNTER_API_VERSION, &RemoteResource::default())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RemoteError::Api {
                status: 400,
                code: "InvalidParameter".to_string(),
                message: "intervalSeconds is invalid".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_error_without_envelope_keeps_status() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let err = client(&server)
            .get(&counter_id(), COUNTER_API_VERSION)
            .await
            .unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(
            err,
            RemoteError::Api { status: 503, ref message, .. } if message == "upstream unavailable"
        ));
    }

    #[tokio::test]
    async fn test_put_sends_body_and_returns_document() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path(COUNTER_PATH))
            .and(body_json(json!({
                "kind": "WindowsPerformanceCounter",
                "properties": {"counterName": "x"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(counter_document()))
            .expect(1)
            .mount(&server)
            .await;

        let body = RemoteResource {
            kind: Some("WindowsPerformanceCounter".to_string()),
            properties: json!({"counterName": "x"}),
            ..Default::default()
        };
        let submitted = client(&server)
            .put(&counter_id(), COUNTER_API_VERSION, &body)
            .await
            .unwrap();
        assert!(matches!(submitted, Submitted::Done(Some(r)) if r.name.as_deref() == Some("cpu")));
    }

    #[tokio::test]
    async fn test_accepted_with_async_operation_header() {
        let server = MockServer::start().await;
        let operation_url = format!("{}/operations/op1", server.uri());

        Mock::given(method("PUT"))
            .and(path(COUNTER_PATH))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("Azure-AsyncOperation", operation_url.as_str())
                    .insert_header("Retry-After", "5")
                    .set_body_json(counter_document()),
            )
            .mount(&server)
            .await;

        let submitted = client(&server)
            .put(&counter_id(), COUNTER_API_VERSION, &RemoteResource::default())
            .await
            .unwrap();
        assert_eq!(
            submitted,
            Submitted::Accepted(OperationHandle {
                url: operation_url,
                kind: PollKind::AsyncOperation,
                retry_after: Some(Duration::from_secs(5)),
            })
        );
    }

    #[tokio::test]
    async fn test_reserved_characters_in_name_are_encoded() {
        let server = MockServer::start().await;
        let workspace = "/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.OperationalInsights/workspaces/ws-01/dataSources";

        Mock::given(method("GET"))
            .and(path(format!("{}/cpu%231", workspace)))
            .and(query_param("api-version", COUNTER_API_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_json(counter_document()))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(format!("{}/cpu%3Fx=1", workspace)))
            .and(query_param("api-version", COUNTER_API_VERSION))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(counter_document()))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(204))
            .expect(0)
            .mount(&server)
            .await;

        let client = client(&server);
        let hashed = ResourceIdentifier::parse(&format!("{}/cpu#1", workspace)).unwrap();
        client.get(&hashed, COUNTER_API_VERSION).await.unwrap();

        let queried = ResourceIdentifier::parse(&format!("{}/cpu?x=1", workspace)).unwrap();
        let deleted = client.delete(&queried, COUNTER_API_VERSION).await.unwrap();
        assert_eq!(deleted, Submitted::Done(None));
    }

    #[tokio::test]
    async fn test_delete_no_content_and_location() {
        let server = MockServer::start().await;
        let location = format!("{}/operationResults/op2", server.uri());

        Mock::given(method("DELETE"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(204))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(202).insert_header("Location", location.as_str()))
            .mount(&server)
            .await;

        let client = client(&server);
        let first = client.delete(&counter_id(), COUNTER_API_VERSION).await.unwrap();
        assert_eq!(first, Submitted::Done(None));

        let second = client.delete(&counter_id(), COUNTER_API_VERSION).await.unwrap();
        assert!(matches!(
            second,
            Submitted::Accepted(OperationHandle { kind: PollKind::Location, .. })
        ));
    }

    #[tokio::test]
    async fn test_poll_async_operation_statuses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/operations/running"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Retry-After", "3")
                    .set_body_json(json!({"status": "InProgress"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/failed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "Failed",
                "error": {"code": "QuotaExceeded", "message": "too many data sources"}
            })))
            .mount(&server)
            .await;

        let client = client(&server);
        let handle = |p: &str| OperationHandle {
            url: format!("{}{}", server.uri(), p),
            kind: PollKind::AsyncOperation,
            retry_after: None,
        };

        assert_eq!(
            client.poll(&handle("/operations/running")).await.unwrap(),
            OperationStatus::InProgress {
                retry_after: Some(Duration::from_secs(3))
            }
        );
        assert_eq!(
            client.poll(&handle("/operations/failed")).await.unwrap(),
            OperationStatus::Failed("QuotaExceeded: too many data sources".to_string())
        );
    }

    #[tokio::test]
    async fn test_poll_location_statuses() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/operationResults/op3"))
            .respond_with(ResponseTemplate::new(202))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operationResults/op3"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = client(&server);
        let handle = OperationHandle {
            url: format!("{}/operationResults/op3", server.uri()),
            kind: PollKind::Location,
            retry_after: None,
        };
        assert_eq!(
            client.poll(&handle).await.unwrap(),
            OperationStatus::InProgress { retry_after: None }
        );
        assert_eq!(client.poll(&handle).await.unwrap(), OperationStatus::Succeeded);
    }
}

mod provider_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_read_delete_cycle() {
        let server = MockServer::start().await;
        let operation_url = format!("{}/operations/create", server.uri());

        // existence check, then the final read
        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(404))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(counter_document()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(COUNTER_PATH))
            .and(query_param("api-version", COUNTER_API_VERSION))
            .and(body_json(json!({
                "kind": "WindowsPerformanceCounter",
                "properties": {
                    "counterName": "% Processor Time",
                    "instanceName": "_Total",
                    "intervalSeconds": 60,
                    "objectName": "Processor"
                }
            })))
            .respond_with(
                ResponseTemplate::new(201).insert_header("Azure-AsyncOperation", operation_url.as_str()),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/operations/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "Succeeded"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let provider = AzurermProvider::connect(config(&server)).unwrap();
        let ctx = OperationContext::default();

        let state = provider.create(&counter_resource(), &ctx).await.unwrap();
        assert_eq!(state.identifier.as_deref(), Some(COUNTER_PATH));
        assert_eq!(state.get_int("interval_seconds"), Some(60));

        let read = provider
            .read(&state.address, state.identifier.as_deref(), &ctx)
            .await
            .unwrap();
        assert!(read.exists);
        assert_eq!(read.get_str("counter_name"), Some("% Processor Time"));

        provider
            .delete(&state.address, COUNTER_PATH, &ctx)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_create_against_existing_resource() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(counter_document()))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = AzurermProvider::connect(config(&server)).unwrap();
        let err = provider
            .create(&counter_resource(), &OperationContext::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyExists);
        assert!(err.to_string().contains(COUNTER_PATH));
    }

    #[tokio::test]
    async fn test_read_missing_resource() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path(COUNTER_PATH))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let provider = AzurermProvider::connect(config(&server)).unwrap();
        let address = ResourceAddress::new("log_analytics_datasource_windows_performance_counter", "cpu");
        let state = provider
            .read(&address, Some(COUNTER_PATH), &OperationContext::default())
            .await
            .unwrap();
        assert!(!state.exists);
    }
}
