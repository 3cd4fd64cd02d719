//! Manufacturer data source

use async_trait::async_trait;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::dcim::{Manufacturer, ManufacturerListParams};
use crate::binding::query::lookup_one;
use crate::binding::BindingError;
use crate::NetboxProviderData;

#[derive(Default)]
pub struct ManufacturerDataSource {
    provider_data: Option<NetboxProviderData>,
}

impl ManufacturerDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    fn to_state(manufacturer: &Manufacturer) -> tfplug::Result<DynamicValue> {
        let mut state = DynamicValue::empty_object();
        state.set_string(&AttributePath::new("id"), manufacturer.id.to_string())?;
        state.set_string(&AttributePath::new("name"), manufacturer.name.clone())?;
        state.set_string(&AttributePath::new("slug"), manufacturer.slug.clone())?;
        state.set_list(
            &AttributePath::new("tags"),
            manufacturer
                .tags
                .iter()
                .map(|t| Dynamic::String(t.name.clone()))
                .collect(),
        )?;
        Ok(state)
    }
}

#[async_trait]
impl DataSource for ManufacturerDataSource {
    fn type_name(&self) -> &str {
        "netbox_manufacturer"
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: DataSourceMetadataRequest,
    ) -> DataSourceMetadataResponse {
        DataSourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: DataSourceSchemaRequest,
    ) -> DataSourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Looks up a single manufacturer")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Exact manufacturer name to look up")
                    .optional()
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("slug", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("tags", AttributeType::Set(Box::new(AttributeType::String)))
                    .description("Names of the tags on the manufacturer")
                    .computed()
                    .build(),
            )
            .build();

        DataSourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        _request: ValidateDataSourceConfigRequest,
    ) -> ValidateDataSourceConfigResponse {
        ValidateDataSourceConfigResponse {
            diagnostics: vec![],
        }
    }

    async fn read(&self, ctx: Context, request: ReadDataSourceRequest) -> ReadDataSourceResponse {
        let provider_data = match &self.provider_data {
            Some(data) => data,
            None => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error(
                        "Provider not configured",
                        "Provider data was not properly configured",
                    )],
                };
            }
        };

        let name = match request
            .config
            .get_optional_string(&AttributePath::new("name"))
        {
            Ok(name) => name.filter(|n| !n.is_empty()),
            Err(e) => {
                return ReadDataSourceResponse {
                    state: DynamicValue::null(),
                    diagnostics: vec![Diagnostic::error("Invalid name", e.to_string())
                        .with_attribute(AttributePath::new("name"))],
                };
            }
        };

        let params = ManufacturerListParams {
            name,
            ..Default::default()
        };
        let manufacturers = provider_data.client.dcim().manufacturers();
        let lookup = lookup_one(&manufacturers, params, "manufacturer");
        let Some(result) = ctx.run(lookup).await else {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Diagnostic::error(
                    "Operation cancelled",
                    "Reading netbox_manufacturer was cancelled",
                )],
            };
        };

        let diagnostic = match result {
            Ok(manufacturer) => match Self::to_state(&manufacturer) {
                Ok(state) => {
                    return ReadDataSourceResponse {
                        state,
                        diagnostics: vec![],
                    }
                }
                Err(e) => Diagnostic::error("Failed to store manufacturer", e.to_string()),
            },
            Err(BindingError::NoResult) => Diagnostic::error(
                "Failed to read manufacturer",
                "no manufacturer found matching filter",
            ),
            Err(e) => e.to_diagnostic("Failed to read manufacturer"),
        };

        ReadDataSourceResponse {
            state: DynamicValue::null(),
            diagnostics: vec![diagnostic],
        }
    }
}

#[async_trait]
impl DataSourceWithConfigure for ManufacturerDataSource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureDataSourceRequest,
    ) -> ConfigureDataSourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<NetboxProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract NetboxProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the data source",
            ));
        }

        ConfigureDataSourceResponse { diagnostics }
    }
}
