//! HTTP implementation of [`ArmClient`] for the Azure Resource Manager REST API

use std::time::Duration;

use async_trait::async_trait;
use azurerm_core::identifier::ResourceIdentifier;
use reqwest::header::{HeaderMap, LOCATION, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;

use crate::client::{
    ArmClient, OperationHandle, OperationStatus, PollKind, RemoteError, RemoteResource,
    RemoteResult, Submitted,
};
use crate::config::ProviderConfig;

const AZURE_ASYNC_OPERATION: &str = "azure-asyncoperation";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Truncate a response body and drop control characters before logging it
fn sanitize_for_log(body: &str) -> String {
    let cleaned: String = body
        .chars()
        .filter(|c| c.is_ascii_graphic() || *c == ' ')
        .collect();
    if cleaned.len() > MAX_LOG_BODY_LENGTH {
        let head: String = cleaned.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        cleaned
    }
}

/// `{"error": {"code": "...", "message": "..."}}`
#[derive(Debug, Default, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    error: Option<ErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Body of an `Azure-AsyncOperation` status URL
#[derive(Debug, Deserialize)]
struct AsyncOperationBody {
    status: String,
    #[serde(default)]
    error: Option<ErrorBody>,
}

/// HTTP client wrapper for ARM API calls
#[derive(Clone)]
pub struct ArmHttpClient {
    client: Client,
    endpoint: String,
    token: String,
}

impl ArmHttpClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("azurerm-provider/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            token: config.access_token.clone(),
        })
    }

    /// Resource URL with every segment percent-encoded
    fn url(&self, id: &ResourceIdentifier, api_version: &str) -> RemoteResult<Url> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| RemoteError::Transport(format!("invalid endpoint {:?}: {}", self.endpoint, e)))?;
        url.path_segments_mut()
            .map_err(|_| RemoteError::Transport(format!("invalid endpoint {:?}", self.endpoint)))?
            .pop_if_empty()
            .extend(id.segments());
        url.query_pairs_mut().append_pair("api-version", api_version);
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> RemoteResult<Response> {
        request
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))
    }

    /// Map a PUT/DELETE response onto [`Submitted`]
    async fn submitted(response: Response) -> RemoteResult<Submitted> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        if (status == StatusCode::CREATED || status == StatusCode::ACCEPTED)
            && let Some(handle) = operation_handle(response.headers())
        {
            log::debug!("{} accepted, polling {}", status, handle.url);
            return Ok(Submitted::Accepted(handle));
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(Submitted::Done(None));
        }

        let body = read_body(response).await?;
        if body.trim().is_empty() {
            return Ok(Submitted::Done(None));
        }
        let resource = serde_json::from_str(&body)
            .map_err(|e| RemoteError::Decode(format!("{}: {}", e, sanitize_for_log(&body))))?;
        Ok(Submitted::Done(Some(resource)))
    }
}

#[async_trait]
impl ArmClient for ArmHttpClient {
    async fn get(&self, id: &ResourceIdentifier, api_version: &str) -> RemoteResult<RemoteResource> {
        let url = self.url(id, api_version)?;
        log::debug!("GET {}", url);

        let response = self.send(self.client.get(url)).await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        let body = read_body(response).await?;
        serde_json::from_str(&body)
            .map_err(|e| RemoteError::Decode(format!("{}: {}", e, sanitize_for_log(&body))))
    }

    async fn put(
        &self,
        id: &ResourceIdentifier,
        api_version: &str,
        body: &RemoteResource,
    ) -> RemoteResult<Submitted> {
        let url = self.url(id, api_version)?;
        log::debug!("PUT {}", url);

        let response = self.send(self.client.put(url).json(body)).await?;
        Self::submitted(response).await
    }

    async fn delete(&self, id: &ResourceIdentifier, api_version: &str) -> RemoteResult<Submitted> {
        let url = self.url(id, api_version)?;
        log::debug!("DELETE {}", url);

        let response = self.send(self.client.delete(url)).await?;
        Self::submitted(response).await
    }

    async fn poll(&self, handle: &OperationHandle) -> RemoteResult<OperationStatus> {
        log::debug!("GET {}", handle.url);

        let response = self.send(self.client.get(&handle.url)).await?;
        let status = response.status();
        let retry_after = retry_after(response.headers());
        if status == StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound);
        }
        if !status.is_success() {
            return Err(api_error(response).await);
        }

        match handle.kind {
            PollKind::Location => {
                if status == StatusCode::ACCEPTED {
                    Ok(OperationStatus::InProgress { retry_after })
                } else {
                    Ok(OperationStatus::Succeeded)
                }
            }
            PollKind::AsyncOperation => {
                let body = read_body(response).await?;
                let operation: AsyncOperationBody = serde_json::from_str(&body).map_err(|e| {
                    RemoteError::Decode(format!("{}: {}", e, sanitize_for_log(&body)))
                })?;
                Ok(match operation.status.to_ascii_lowercase().as_str() {
                    "succeeded" => OperationStatus::Succeeded,
                    "failed" => OperationStatus::Failed(
                        operation
                            .error
                            .map(|e| format!("{}: {}", e.code, e.message))
                            .unwrap_or_else(|| "operation failed".to_string()),
                    ),
                    "canceled" | "cancelled" => OperationStatus::Canceled,
                    _ => OperationStatus::InProgress { retry_after },
                })
            }
        }
    }
}

async fn read_body(response: Response) -> RemoteResult<String> {
    response
        .text()
        .await
        .map_err(|e| RemoteError::Transport(format!("failed to read response body: {}", e)))
}

/// Build [`RemoteError::Api`] from the ARM error envelope
async fn api_error(response: Response) -> RemoteError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    log::debug!("API error: {} - {}", status, sanitize_for_log(&body));

    let envelope: ErrorEnvelope = serde_json::from_str(&body).unwrap_or_default();
    let error = envelope.error.unwrap_or_default();
    RemoteError::Api {
        status: status.as_u16(),
        code: if error.code.is_empty() {
            status.canonical_reason().unwrap_or("Unknown").to_string()
        } else {
            error.code
        },
        message: if error.message.is_empty() {
            sanitize_for_log(&body)
        } else {
            error.message
        },
    }
}

fn operation_handle(headers: &HeaderMap) -> Option<OperationHandle> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let (url, kind) = match header(AZURE_ASYNC_OPERATION) {
        Some(url) => (url, PollKind::AsyncOperation),
        None => (header(LOCATION.as_str())?, PollKind::Location),
    };
    Some(OperationHandle {
        url,
        kind,
        retry_after: retry_after(headers),
    })
}

/// `Retry-After` in seconds; HTTP dates are ignored
fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.starts_with(&"x".repeat(200)));
        assert!(sanitized.ends_with("[truncated, 500 bytes total]"));
        assert_eq!(sanitize_for_log("line\nbreak"), "linebreak");
    }

    #[test]
    fn async_operation_header_wins_over_location() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://example/location"));
        headers.insert(
            AZURE_ASYNC_OPERATION,
            HeaderValue::from_static("https://example/async"),
        );
        headers.insert(RETRY_AFTER, HeaderValue::from_static("15"));

        let handle = operation_handle(&headers).unwrap();
        assert_eq!(handle.url, "https://example/async");
        assert_eq!(handle.kind, PollKind::AsyncOperation);
        assert_eq!(handle.retry_after, Some(Duration::from_secs(15)));
    }

    #[test]
    fn location_header_alone() {
        let mut headers = HeaderMap::new();
        headers.insert(LOCATION, HeaderValue::from_static("https://example/location"));
        let handle = operation_handle(&headers).unwrap();
        assert_eq!(handle.kind, PollKind::Location);
        assert!(handle.retry_after.is_none());
    }

    #[test]
    fn no_headers_no_handle() {
        assert!(operation_handle(&HeaderMap::new()).is_none());
    }

    #[test]
    fn url_includes_api_version() {
        let config = ProviderConfig::new("sub1", "token").with_endpoint("http://localhost:1234/");
        let client = ArmHttpClient::new(&config).unwrap();
        let id = ResourceIdentifier::new("sub1", "rg1", "Microsoft.RecoveryServices")
            .child("vaults", "v1")
            .child("replicationFabrics", "f1");
        assert_eq!(
            client.url(&id, "2018-01-10").unwrap().as_str(),
            "http://localhost:1234/subscriptions/sub1/resourceGroups/rg1/providers/Microsoft.RecoveryServices/vaults/v1/replicationFabrics/f1?api-version=2018-01-10"
        );
    }

    #[test]
    fn url_encodes_reserved_characters_in_names() {
        let config = ProviderConfig::new("sub1", "token").with_endpoint("http://localhost:1234");
        let client = ArmHttpClient::new(&config).unwrap();
        let workspace = ResourceIdentifier::new("sub1", "rg1", "Microsoft.OperationalInsights")
            .child("workspaces", "ws-01");

        let url = client
            .url(&workspace.clone().child("dataSources", "cpu#1"), "2015-11-01-preview")
            .unwrap();
        assert_eq!(url.fragment(), None);
        assert!(url.path().ends_with("/workspaces/ws-01/dataSources/cpu%231"));

        let url = client
            .url(&workspace.clone().child("dataSources", "cpu?x=1"), "2015-11-01-preview")
            .unwrap();
        assert!(url.path().ends_with("/dataSources/cpu%3Fx=1"));
        assert_eq!(url.query(), Some("api-version=2015-11-01-preview"));

        let url = client
            .url(&workspace.child("dataSources", "a/b"), "2015-11-01-preview")
            .unwrap();
        assert!(url.path().ends_with("/dataSources/a%2Fb"));
    }
}
