//! HTTP transport to an entry registry
//!
//! Speaks JSON to the registry's `POST /v1/entry/{method}` surface. The
//! caller's timeout is applied to the request and forwarded in the
//! `x-spire-timeout-ms` header. Failures never trigger a retry.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use spire_registry::api::error::ErrorResponse;
use spire_registry::api::{entry_route, method};
use spire_registry::types::{
    BatchCreateEntryRequest, BatchCreateEntryResponse, BatchDeleteEntryRequest,
    BatchDeleteEntryResponse, BatchUpdateEntryRequest, BatchUpdateEntryResponse, Entry,
    GetEntryRequest, ListEntriesRequest, ListEntriesResponse,
};
use spire_registry::{CallContext, EntryService, Status, TIMEOUT_HEADER};
use tracing::{debug, warn};

use crate::config::{validate_endpoint, ConfigError};

/// Entry service reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for a registry base URL
    pub fn new(endpoint: &str) -> Result<Self, ConfigError> {
        validate_endpoint(endpoint)?;

        let http_client = reqwest::Client::builder()
            .build()
            .map_err(|e| ConfigError::Client(e.to_string()))?;

        Ok(Self {
            base_url: endpoint.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    /// Registry base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn call<Req, Resp>(&self, ctx: &CallContext, name: &str, request: &Req) -> Result<Resp, Status>
    where
        Req: Serialize + Sync,
        Resp: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, entry_route(name));
        debug!(url = %url, timeout = ?ctx.timeout(), "Calling registry");

        let mut builder = self.http_client.post(&url).json(request);
        if let Some(timeout) = ctx.timeout() {
            builder = builder
                .timeout(timeout)
                .header(TIMEOUT_HEADER, timeout.as_millis().to_string());
        }

        let response = builder.send().await.map_err(status_from_http)?;
        let http_status = response.status();

        if http_status.is_success() {
            return response
                .json::<Resp>()
                .await
                .map_err(|e| Status::internal(format!("invalid registry response: {}", e)));
        }

        match response.json::<ErrorResponse>().await {
            Ok(body) => Err(body.into()),
            Err(_) => {
                warn!(url = %url, status = %http_status, "Registry returned a non-API error");
                Err(Status::unavailable(format!("registry returned HTTP {}", http_status)))
            }
        }
    }
}

fn status_from_http(err: reqwest::Error) -> Status {
    if err.is_timeout() {
        Status::deadline_exceeded(err.to_string())
    } else {
        Status::unavailable(err.to_string())
    }
}

#[async_trait]
impl EntryService for HttpTransport {
    async fn list_entries(
        &self,
        ctx: &CallContext,
        request: ListEntriesRequest,
    ) -> Result<ListEntriesResponse, Status> {
        self.call(ctx, method::LIST, &request).await
    }

    async fn get_entry(&self, ctx: &CallContext, request: GetEntryRequest) -> Result<Entry, Status> {
        self.call(ctx, method::GET, &request).await
    }

    async fn batch_create_entry(
        &self,
        ctx: &CallContext,
        request: BatchCreateEntryRequest,
    ) -> Result<BatchCreateEntryResponse, Status> {
        self.call(ctx, method::BATCH_CREATE, &request).await
    }

    async fn batch_update_entry(
        &self,
        ctx: &CallContext,
        request: BatchUpdateEntryRequest,
    ) -> Result<BatchUpdateEntryResponse, Status> {
        self.call(ctx, method::BATCH_UPDATE, &request).await
    }

    async fn batch_delete_entry(
        &self,
        ctx: &CallContext,
        request: BatchDeleteEntryRequest,
    ) -> Result<BatchDeleteEntryResponse, Status> {
        self.call(ctx, method::BATCH_DELETE, &request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_normalized() {
        let transport = HttpTransport::new("http://127.0.0.1:8081/").unwrap();
        assert_eq!(transport.base_url(), "http://127.0.0.1:8081");
    }

    #[test]
    fn test_rejects_unix_socket() {
        assert!(matches!(
            HttpTransport::new("unix:/tmp/spire-server/private/api.sock"),
            Err(ConfigError::UnsupportedEndpoint(_))
        ));
    }
}
