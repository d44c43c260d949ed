//! Provider entry point
//!
//! `configure` resolves the provider block, opens the registry connection
//! once, and hands the same handle to every resource and data source.

use std::sync::Arc;

use spire_registry::{CallContext, EntryService};
use tracing::info;

use crate::client::RegistryClient;
use crate::config::ProviderConfig;
use crate::data_source::EntryDataSource;
use crate::diagnostics::Diagnostic;
use crate::model::ProviderConfigModel;
use crate::reconciler::EntryReconciler;
use crate::resource::EntryResource;
use crate::transport::HttpTransport;

/// The `spire` provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpireProvider {
    version: String,
}

impl Default for SpireProvider {
    fn default() -> Self {
        Self::new(crate::VERSION)
    }
}

impl SpireProvider {
    pub const TYPE_NAME: &'static str = "spire";

    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
        }
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Resolve configuration and connect to the registry over HTTP
    pub fn configure(&self, model: &ProviderConfigModel) -> Result<ProviderData, Diagnostic> {
        let config = ProviderConfig::resolve(model)?;
        let transport = HttpTransport::new(&config.endpoint)?;

        info!(
            endpoint = %config.endpoint,
            timeout = ?config.timeout,
            version = %self.version,
            "Configured registry client"
        );

        Ok(self.configure_with_service(&config, Arc::new(transport)))
    }

    /// Configure around an already established registry handle
    pub fn configure_with_service(
        &self,
        config: &ProviderConfig,
        service: Arc<dyn EntryService>,
    ) -> ProviderData {
        ProviderData {
            client: RegistryClient::new(service),
            ctx: config.call_context(),
        }
    }
}

/// Shared state handed to resources and data sources after configuration
#[derive(Debug, Clone)]
pub struct ProviderData {
    client: RegistryClient,
    ctx: CallContext,
}

impl ProviderData {
    pub fn client(&self) -> &RegistryClient {
        &self.client
    }

    pub fn call_context(&self) -> CallContext {
        self.ctx
    }

    pub fn entry_resource(&self) -> EntryResource {
        EntryResource::new(EntryReconciler::new(self.client.clone()), self.ctx)
    }

    pub fn entry_data_source(&self) -> EntryDataSource {
        EntryDataSource::new(EntryReconciler::new(self.client.clone()), self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spire_registry::MemoryRegistry;
    use std::time::Duration;

    #[test]
    fn test_components_share_one_handle() {
        let registry: Arc<dyn EntryService> = Arc::new(MemoryRegistry::new());
        let data = SpireProvider::default()
            .configure_with_service(&ProviderConfig::default(), registry.clone());

        let first = data.clone();
        assert!(Arc::ptr_eq(first.client().service(), &registry));
        assert!(Arc::ptr_eq(data.client().service(), first.client().service()));
        assert_eq!(data.call_context().timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_bad_endpoint_is_diagnostic() {
        let model = ProviderConfigModel {
            endpoint: Some("127.0.0.1:8081".into()),
            timeout_secs: None,
        };

        let diag = SpireProvider::default().configure(&model).unwrap_err();
        assert!(diag.is_error());
        assert_eq!(diag.summary, "Failed to configure registry client");
    }

    #[test]
    fn test_configure_over_http() {
        let model = ProviderConfigModel {
            endpoint: Some("http://127.0.0.1:9".into()),
            timeout_secs: Some(0),
        };

        let data = SpireProvider::new("1.2.3").configure(&model).unwrap();
        assert_eq!(data.call_context().timeout(), None);
    }
}
