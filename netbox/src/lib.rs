pub mod api;
pub mod binding;
pub mod config;
pub mod data_sources;
pub mod provider_data;
pub mod resources;

pub use provider_data::NetboxProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfplug::context::Context;
use tfplug::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, DataSourceFactory, Provider,
    ProviderMetadataRequest, ProviderMetadataResponse, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory, ValidateProviderConfigRequest,
    ValidateProviderConfigResponse,
};
use tfplug::data_source::DataSourceWithConfigure;
use tfplug::resource::ProviderResource;
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::Diagnostic;
use tfplug::validator::NumberRangeValidator;
use tracing::info;

use config::ProviderConfig;
use data_sources::{
    ConsolePortsDataSource, ConsoleServerPortsDataSource, ManufacturerDataSource,
    PowerOutletsDataSource,
};
use resources::{
    ConsolePortTemplateResource, ConsoleServerPortTemplateResource, ManufacturerResource,
    PowerOutletTemplateResource, PowerPortTemplateResource,
};

/// Leaves the global tracing subscriber alone; the host process installs
/// one with [`tfplug::logging::init_from_env`] before serving.
#[derive(Default)]
pub struct NetboxProvider;

impl NetboxProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Provider for NetboxProvider {
    fn type_name(&self) -> &str {
        "netbox"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse {
        ProviderMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages NetBox device type components")
            .attribute(
                AttributeBuilder::new("server_url", AttributeType::String)
                    .description("NetBox base URL. Falls back to NETBOX_SERVER_URL")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_token", AttributeType::String)
                    .description("NetBox API token. Falls back to NETBOX_API_TOKEN")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("allow_insecure_https", AttributeType::Bool)
                    .description("Skip TLS certificate verification")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("request_timeout", AttributeType::Number)
                    .description("Per-request timeout in seconds (default 10)")
                    .optional()
                    .validator(NumberRangeValidator::at_least(1.0))
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let failed = |diagnostics: Vec<Diagnostic>| ConfigureProviderResponse {
            diagnostics,
            provider_data: None,
        };

        let config = match ProviderConfig::from_config(&request.config) {
            Ok(config) => config,
            Err(diagnostics) => return failed(diagnostics),
        };

        let client = match api::Client::with_timeout(
            &config.server_url,
            &config.api_token,
            config.allow_insecure_https,
            config.request_timeout,
        ) {
            Ok(client) => client,
            Err(e) => {
                return failed(vec![Diagnostic::error(
                    "Failed to create API client",
                    e.to_string(),
                )])
            }
        };
        info!(
            server_url = %config.server_url,
            insecure = config.allow_insecure_https,
            "configured NetBox client"
        );

        ConfigureProviderResponse {
            diagnostics: vec![],
            provider_data: Some(Arc::new(NetboxProviderData::new(client))),
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse {
        ValidateProviderConfigResponse {
            diagnostics: vec![],
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut resources: HashMap<String, ResourceFactory> = HashMap::new();
        resources.insert(
            "netbox_console_port_template".to_string(),
            Box::new(|| Box::new(ConsolePortTemplateResource::new()) as Box<dyn ProviderResource>),
        );
        resources.insert(
            "netbox_console_server_port_template".to_string(),
            Box::new(|| Box::new(ConsoleServerPortTemplateResource::new()) as Box<dyn ProviderResource>),
        );
        resources.insert(
            "netbox_power_port_template".to_string(),
            Box::new(|| Box::new(PowerPortTemplateResource::new()) as Box<dyn ProviderResource>),
        );
        resources.insert(
            "netbox_power_outlet_template".to_string(),
            Box::new(|| Box::new(PowerOutletTemplateResource::new()) as Box<dyn ProviderResource>),
        );
        resources.insert(
            "netbox_manufacturer".to_string(),
            Box::new(|| Box::new(ManufacturerResource::new()) as Box<dyn ProviderResource>),
        );
        resources
    }

    fn data_sources(&self) -> HashMap<String, DataSourceFactory> {
        let mut data_sources: HashMap<String, DataSourceFactory> = HashMap::new();
        data_sources.insert(
            "netbox_console_ports".to_string(),
            Box::new(|| Box::new(ConsolePortsDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        data_sources.insert(
            "netbox_console_server_ports".to_string(),
            Box::new(|| Box::new(ConsoleServerPortsDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        data_sources.insert(
            "netbox_device_power_outlets".to_string(),
            Box::new(|| Box::new(PowerOutletsDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        data_sources.insert(
            "netbox_manufacturer".to_string(),
            Box::new(|| Box::new(ManufacturerDataSource::new()) as Box<dyn DataSourceWithConfigure>),
        );
        data_sources
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfplug::data_source::{DataSource, DataSourceMetadataRequest};
    use tfplug::resource::{Resource, ResourceMetadataRequest};
    use tfplug::types::{AttributePath, DynamicValue};

    fn provider_block(url: &str) -> DynamicValue {
        let mut config = DynamicValue::empty_object();
        config
            .set_string(&AttributePath::new("server_url"), url.to_string())
            .unwrap();
        config
            .set_string(&AttributePath::new("api_token"), "secret".to_string())
            .unwrap();
        config
    }

    #[tokio::test]
    #[serial]
    async fn configure_hands_out_provider_data() {
        let mut provider = NetboxProvider::new();

        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: provider_block("https://netbox.example.com/"),
                },
            )
            .await;

        assert!(response.diagnostics.is_empty());
        let data = response.provider_data.unwrap();
        let data = data.downcast_ref::<NetboxProviderData>().unwrap();
        assert_eq!(data.client.base_url(), "https://netbox.example.com");
    }

    #[tokio::test]
    #[serial]
    async fn configure_rejects_bad_url() {
        let mut provider = NetboxProvider::new();

        let response = provider
            .configure(
                Context::new(),
                ConfigureProviderRequest {
                    config: provider_block("ftp://netbox.example.com"),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Failed to create API client");
        assert!(response.provider_data.is_none());
    }

    #[tokio::test]
    async fn factory_keys_match_type_names() {
        let provider = NetboxProvider::new();

        for (name, factory) in provider.resources() {
            let resource = factory();
            let metadata = resource
                .metadata(Context::new(), ResourceMetadataRequest)
                .await;
            assert_eq!(metadata.type_name, name);
            assert_eq!(resource.type_name(), name);
        }
        for (name, factory) in provider.data_sources() {
            let data_source = factory();
            let metadata = data_source
                .metadata(Context::new(), DataSourceMetadataRequest)
                .await;
            assert_eq!(metadata.type_name, name);
        }
        assert_eq!(provider.resources().len(), 5);
        assert_eq!(provider.data_sources().len(), 4);
    }

    #[test]
    fn constructing_leaves_global_subscriber_unset() {
        let _provider = NetboxProvider::new();

        assert!(!tracing::dispatcher::has_been_set());
    }

    #[tokio::test]
    async fn api_token_is_sensitive() {
        let provider = NetboxProvider::new();
        let schema = provider
            .schema(Context::new(), ProviderSchemaRequest)
            .await
            .schema;

        let token = schema.block.attribute("api_token").unwrap();
        assert!(token.sensitive);
        assert!(!schema.block.attribute("server_url").unwrap().required);
    }
}
