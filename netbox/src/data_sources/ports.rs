//! List data sources for device ports
//!
//! `netbox_console_ports`, `netbox_console_server_ports` and
//! `netbox_device_power_outlets` share one shape: `filter` blocks, an
//! optional `limit` and `name_regex`, and a computed list of results.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::data_source::{
    ConfigureDataSourceRequest, ConfigureDataSourceResponse, DataSource, DataSourceMetadataRequest,
    DataSourceMetadataResponse, DataSourceSchemaRequest, DataSourceSchemaResponse,
    DataSourceWithConfigure, ReadDataSourceRequest, ReadDataSourceResponse,
    ValidateDataSourceConfigRequest, ValidateDataSourceConfigResponse,
};
use tfplug::schema::{AttributeBuilder, AttributeType, NestedBlock, NestingMode, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use tfplug::validator::{NumberRangeValidator, RegexIsValidValidator};

use crate::api::dcim::{
    ConsolePort, ConsolePortKind, ConsolePortListParams, ConsoleServerPortKind, PowerOutlet,
    PowerOutletKind, PowerOutletListParams,
};
use crate::api::{Endpoint, ListableKind, Named};
use crate::binding::codec::{choice, non_empty, ref_id, tag_ids};
use crate::binding::filter::{FilterSet, Setter};
use crate::binding::query::{ListQuery, ListRequest};
use crate::NetboxProviderData;

const CONSOLE_PORT_SETTERS: &[(&str, Setter<ConsolePortListParams>)] = &[
    ("name", |p, v| p.name = Some(v.to_string())),
    ("tag", |p, v| p.tag.push(v.to_string())),
    ("device_id", |p, v| p.device_id = Some(v.to_string())),
];

const POWER_OUTLET_SETTERS: &[(&str, Setter<PowerOutletListParams>)] = &[
    ("name", |p, v| p.name = Some(v.to_string())),
    ("tag", |p, v| p.tag.push(v.to_string())),
    ("device_id", |p, v| p.device_id = Some(v.to_string())),
    ("type", |p, v| p.outlet_type = Some(v.to_string())),
];

pub static CONSOLE_PORT_FILTERS: FilterSet<ConsolePortListParams> =
    FilterSet::new(CONSOLE_PORT_SETTERS);

pub static POWER_OUTLET_FILTERS: FilterSet<PowerOutletListParams> =
    FilterSet::new(POWER_OUTLET_SETTERS);

/// One list data source: where it lists from and how a result is shaped
pub trait Listing: Send + Sync + 'static {
    const TYPE_NAME: &'static str;
    /// Name of the computed list attribute
    const RESULTS: &'static str;
    const DESCRIPTION: &'static str;

    type Entity: Named + DeserializeOwned + Send;
    type Kind: ListableKind<Entity = Self::Entity>;

    fn filters() -> &'static FilterSet<<Self::Kind as ListableKind>::Params>;

    fn element_type() -> HashMap<String, AttributeType>;

    fn element(entity: &Self::Entity) -> Dynamic;
}

fn object(entries: Vec<(&str, Dynamic)>) -> Dynamic {
    Dynamic::Map(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn object_type(entries: &[(&str, AttributeType)]) -> HashMap<String, AttributeType> {
    entries
        .iter()
        .map(|(k, t)| (k.to_string(), t.clone()))
        .collect()
}

fn console_port_element_type() -> HashMap<String, AttributeType> {
    object_type(&[
        ("id", AttributeType::Number),
        ("name", AttributeType::String),
        ("description", AttributeType::String),
        ("tag_ids", AttributeType::List(Box::new(AttributeType::Number))),
        ("device_id", AttributeType::Number),
        ("module_id", AttributeType::Number),
        ("type", AttributeType::String),
        ("occupied", AttributeType::Bool),
        ("mark_connected", AttributeType::Bool),
    ])
}

fn console_port_element(port: &ConsolePort) -> Dynamic {
    object(vec![
        ("id", Dynamic::Number(port.id as f64)),
        ("name", Dynamic::String(port.name.clone())),
        ("description", non_empty(&port.description).into()),
        ("tag_ids", Dynamic::List(tag_ids(&port.tags))),
        ("device_id", ref_id(&port.device).into()),
        ("module_id", ref_id(&port.module).into()),
        ("type", choice(&port.port_type).into()),
        ("occupied", Dynamic::Bool(port.occupied)),
        ("mark_connected", Dynamic::Bool(port.mark_connected)),
    ])
}

pub struct ConsolePortListing;

impl Listing for ConsolePortListing {
    const TYPE_NAME: &'static str = "netbox_console_ports";
    const RESULTS: &'static str = "console_ports";
    const DESCRIPTION: &'static str = "Lists console ports matching the given filters";

    type Entity = ConsolePort;
    type Kind = ConsolePortKind;

    fn filters() -> &'static FilterSet<ConsolePortListParams> {
        &CONSOLE_PORT_FILTERS
    }

    fn element_type() -> HashMap<String, AttributeType> {
        console_port_element_type()
    }

    fn element(entity: &ConsolePort) -> Dynamic {
        console_port_element(entity)
    }
}

pub struct ConsoleServerPortListing;

impl Listing for ConsoleServerPortListing {
    const TYPE_NAME: &'static str = "netbox_console_server_ports";
    const RESULTS: &'static str = "console_server_ports";
    const DESCRIPTION: &'static str = "Lists console server ports matching the given filters";

    type Entity = ConsolePort;
    type Kind = ConsoleServerPortKind;

    fn filters() -> &'static FilterSet<ConsolePortListParams> {
        &CONSOLE_PORT_FILTERS
    }

    fn element_type() -> HashMap<String, AttributeType> {
        console_port_element_type()
    }

    fn element(entity: &ConsolePort) -> Dynamic {
        console_port_element(entity)
    }
}

pub struct PowerOutletListing;

impl Listing for PowerOutletListing {
    const TYPE_NAME: &'static str = "netbox_device_power_outlets";
    const RESULTS: &'static str = "power_outlets";
    const DESCRIPTION: &'static str = "Lists device power outlets matching the given filters";

    type Entity = PowerOutlet;
    type Kind = PowerOutletKind;

    fn filters() -> &'static FilterSet<PowerOutletListParams> {
        &POWER_OUTLET_FILTERS
    }

    fn element_type() -> HashMap<String, AttributeType> {
        object_type(&[
            ("id", AttributeType::Number),
            ("name", AttributeType::String),
            ("description", AttributeType::String),
            ("tag_ids", AttributeType::List(Box::new(AttributeType::Number))),
            ("device_id", AttributeType::Number),
            ("module_id", AttributeType::Number),
            ("type", AttributeType::String),
            ("power_port_id", AttributeType::Number),
            ("feed_leg", AttributeType::String),
            ("mark_connected", AttributeType::Bool),
        ])
    }

    fn element(outlet: &PowerOutlet) -> Dynamic {
        object(vec![
            ("id", Dynamic::Number(outlet.id as f64)),
            ("name", Dynamic::String(outlet.name.clone())),
            ("description", non_empty(&outlet.description).into()),
            ("tag_ids", Dynamic::List(tag_ids(&outlet.tags))),
            ("device_id", ref_id(&outlet.device).into()),
            ("module_id", ref_id(&outlet.module).into()),
            ("type", choice(&outlet.outlet_type).into()),
            ("power_port_id", ref_id(&outlet.power_port).into()),
            ("feed_leg", choice(&outlet.feed_leg).into()),
            ("mark_connected", Dynamic::Bool(outlet.mark_connected)),
        ])
    }
}

pub type ConsolePortsDataSource = ListDataSource<ConsolePortListing>;
pub type ConsoleServerPortsDataSource = ListDataSource<ConsoleServerPortListing>;
pub type PowerOutletsDataSource = ListDataSource<PowerOutletListing>;

pub struct ListDataSource<L: Listing> {
    provider_data: Option<NetboxProviderData>,
    schema: Schema,
    listing: PhantomData<fn() -> L>,
}

impl<L: Listing> Default for ListDataSource<L> {
    fn default() -> Self {
        Self {
            provider_data: None,
            schema: Self::build_schema(),
            listing: PhantomData,
        }
    }
}

impl<L: Listing> ListDataSource<L> {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_schema() -> Schema {
        let filter = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description(&format!(
                        "One of [{}]",
                        L::filters().names().collect::<Vec<_>>().join(", ")
                    ))
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("value", AttributeType::String)
                    .description("Filter value")
                    .required()
                    .build(),
            )
            .build();

        SchemaBuilder::new()
            .version(0)
            .description(L::DESCRIPTION)
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("Unique id generated on every read")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("limit", AttributeType::Number)
                    .description("The limit of objects to return from the API lookup.")
                    .optional()
                    .validator(NumberRangeValidator::at_least(1.0))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name_regex", AttributeType::String)
                    .description("Only keep results whose name matches this regular expression")
                    .optional()
                    .validator(RegexIsValidValidator)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new(
                    L::RESULTS,
                    AttributeType::List(Box::new(AttributeType::Object(L::element_type()))),
                )
                .computed()
                .build(),
            )
            .block(NestedBlock::new("filter", NestingMode::Set, filter))
            .build()
    }

    fn cancelled() -> Diagnostic {
        Diagnostic::error(
            "Operation cancelled",
            format!("Reading {} was cancelled", L::TYPE_NAME),
        )
    }

    async fn list(&self, ctx: &Context, config: &DynamicValue) -> Result<DynamicValue, Diagnostic> {
        let data = self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })?;
        let summary = format!("Failed to read {}", L::TYPE_NAME);

        let request = ListRequest::from_config(config)
            .map_err(|e| Diagnostic::error(summary.clone(), e.to_string()))?;
        let query = ListQuery::new(Endpoint::<L::Kind>::new(&data.client), L::filters());
        let entities = ctx
            .run(query.run(&request))
            .await
            .ok_or_else(Self::cancelled)?
            .map_err(|e| e.to_diagnostic(&summary))?;

        tracing::debug!("{} returned {} result(s)", L::TYPE_NAME, entities.len());

        let mut state = config.clone();
        let set = state
            .set_string(&AttributePath::new("id"), uuid::Uuid::new_v4().to_string())
            .and_then(|_| {
                state.set_list(
                    &AttributePath::new(L::RESULTS),
                    entities.iter().map(L::element).collect(),
                )
            });
        set.map_err(|e| Diagnostic::error(summary, e.to_string()))?;
        Ok(state)
    }
}

#[async_trait]
impl<L: Listing> DataSource for ListDataSource<L> {
    fn type_name(&self) -> &str {
        L::TYPE_NAME
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
        DataSourceSchemaResponse {
            schema: self.schema.clone(),
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
        if ctx.is_cancelled() {
            return ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![Self::cancelled()],
            };
        }

        match self.list(&ctx, &request.config).await {
            Ok(state) => ReadDataSourceResponse {
                state,
                diagnostics: vec![],
            },
            Err(diag) => ReadDataSourceResponse {
                state: DynamicValue::null(),
                diagnostics: vec![diag],
            },
        }
    }
}

#[async_trait]
impl<L: Listing> DataSourceWithConfigure for ListDataSource<L> {
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
                tracing::error!("Failed to downcast provider data to NetboxProviderData");
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
