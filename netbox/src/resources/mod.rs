//! Resource implementations
//!
//! Every resource is a [`BindingResource`] over a codec: the codec owns the
//! schema and field mapping, the binding resource drives the lifecycle.

pub mod console_port_template;
pub mod console_server_port_template;
pub mod manufacturer;
pub mod power_outlet_template;
pub mod power_port_template;

use async_trait::async_trait;
use std::future::Future;
use std::marker::PhantomData;
use tfplug::context::Context;
use tfplug::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ReadResourceRequest,
    ReadResourceResponse, Resource, ResourceMetadataRequest, ResourceMetadataResponse,
    ResourceSchemaRequest, ResourceSchemaResponse, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest, UpdateResourceResponse,
    ValidateResourceConfigRequest, ValidateResourceConfigResponse,
};
use tfplug::schema::Schema;
use tfplug::types::{AttributePath, Diagnostic, DynamicValue};
use tfplug::import_state_passthrough_id;

use crate::api::{Endpoint, WritableKind};
use crate::binding::codec::{parse_id, parse_id_str, FieldCodec};
use crate::binding::record::{ReadOutcome, RecordBinding};
use crate::binding::BindingError;
use crate::NetboxProviderData;

pub use console_port_template::ConsolePortTemplateCodec;
pub use console_server_port_template::ConsoleServerPortTemplateCodec;
pub use manufacturer::ManufacturerCodec;
pub use power_outlet_template::PowerOutletTemplateCodec;
pub use power_port_template::PowerPortTemplateCodec;

pub type ConsolePortTemplateResource = BindingResource<ConsolePortTemplateCodec>;
pub type ConsoleServerPortTemplateResource = BindingResource<ConsoleServerPortTemplateCodec>;
pub type PowerPortTemplateResource = BindingResource<PowerPortTemplateCodec>;
pub type PowerOutletTemplateResource = BindingResource<PowerOutletTemplateCodec>;
pub type ManufacturerResource = BindingResource<ManufacturerCodec>;

/// A codec that is also a Terraform resource type
pub trait ResourceKind: FieldCodec {
    const TYPE_NAME: &'static str;

    type Kind: WritableKind<Entity = Self::Entity, Writable = Self::Writable>;

    fn schema() -> Schema;
}

pub struct BindingResource<K: ResourceKind> {
    provider_data: Option<NetboxProviderData>,
    schema: Schema,
    kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind> Default for BindingResource<K> {
    fn default() -> Self {
        Self {
            provider_data: None,
            schema: K::schema(),
            kind: PhantomData,
        }
    }
}

impl<K: ResourceKind> BindingResource<K> {
    pub fn new() -> Self {
        Self::default()
    }

    fn binding(&self) -> Result<RecordBinding<K, Endpoint<'_, K::Kind>>, Diagnostic> {
        let data = self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })?;
        Ok(RecordBinding::new(Endpoint::new(&data.client)))
    }

    fn decode(&self, value: &DynamicValue) -> Result<K::Fields, Diagnostic> {
        K::decode(value).map_err(|e| {
            Diagnostic::error(format!("Invalid {} configuration", K::LABEL), e.to_string())
        })
    }

    /// A fresh state holding the remote values and the id
    fn state_from(entity: &K::Entity) -> Result<DynamicValue, Diagnostic> {
        let mut state = DynamicValue::empty_object();
        state
            .set_string(&AttributePath::new("id"), K::entity_id(entity).to_string())
            .and_then(|_| K::populate(entity, &mut state))
            .map_err(|e| {
                Diagnostic::error(format!("Failed to store {} state", K::LABEL), e.to_string())
            })?;
        Ok(state)
    }

    fn api_error(action: &str, err: BindingError) -> Diagnostic {
        err.to_diagnostic(&format!("Failed to {} {}", action, K::LABEL))
    }

    fn cancelled() -> Diagnostic {
        Diagnostic::error(
            "Operation cancelled",
            format!("The {} operation was cancelled", K::TYPE_NAME),
        )
    }

    fn check_cancelled(ctx: &Context) -> Result<(), Diagnostic> {
        if ctx.is_cancelled() {
            return Err(Self::cancelled());
        }
        Ok(())
    }

    /// Runs a NetBox call that is abandoned as soon as `ctx` is done
    async fn until_cancelled<T>(ctx: &Context, call: impl Future<Output = T>) -> Result<T, Diagnostic> {
        ctx.run(call).await.ok_or_else(Self::cancelled)
    }
}

#[async_trait]
impl<K: ResourceKind> Resource for BindingResource<K> {
    fn type_name(&self) -> &str {
        K::TYPE_NAME
    }

    async fn metadata(
        &self,
        _ctx: Context,
        _request: ResourceMetadataRequest,
    ) -> ResourceMetadataResponse {
        ResourceMetadataResponse {
            type_name: self.type_name().to_string(),
        }
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        ResourceSchemaResponse {
            schema: self.schema.clone(),
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        ValidateResourceConfigResponse {
            diagnostics: self.schema.validate(&request.config),
        }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let result = async {
            Self::check_cancelled(&ctx)?;
            let binding = self.binding()?;
            let fields = self.decode(&request.planned_state)?;
            let entity = Self::until_cancelled(&ctx, binding.create(&fields))
                .await?
                .map_err(|e| Self::api_error("create", e))?;
            Self::state_from(&entity)
        }
        .await;

        match result {
            Ok(new_state) => CreateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn read(&self, ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let result = async {
            Self::check_cancelled(&ctx)?;
            let binding = self.binding()?;
            let id = parse_id(&request.current_state).map_err(|e| {
                Diagnostic::error(format!("Invalid {} state", K::LABEL), e.to_string())
            })?;
            match Self::until_cancelled(&ctx, binding.read(id))
                .await?
                .map_err(|e| Self::api_error("read", e))?
            {
                ReadOutcome::Present(entity) => Self::state_from(&entity).map(Some),
                ReadOutcome::Absent => Ok(None),
            }
        }
        .await;

        match result {
            Ok(new_state) => ReadResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => ReadResourceResponse {
                new_state: Some(request.current_state),
                diagnostics: vec![diag],
            },
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let result = async {
            Self::check_cancelled(&ctx)?;
            let binding = self.binding()?;
            let id = parse_id(&request.prior_state).map_err(|e| {
                Diagnostic::error(format!("Invalid {} state", K::LABEL), e.to_string())
            })?;
            let prior = self.decode(&request.prior_state)?;
            let planned = self.decode(&request.planned_state)?;
            let entity = Self::until_cancelled(&ctx, binding.update(id, &prior, &planned))
                .await?
                .map_err(|e| Self::api_error("update", e))?;
            Self::state_from(&entity)
        }
        .await;

        match result {
            Ok(new_state) => UpdateResourceResponse {
                new_state,
                diagnostics: vec![],
            },
            Err(diag) => UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: vec![diag],
            },
        }
    }

    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let result = async {
            Self::check_cancelled(&ctx)?;
            let binding = self.binding()?;
            let id = parse_id(&request.prior_state).map_err(|e| {
                Diagnostic::error(format!("Invalid {} state", K::LABEL), e.to_string())
            })?;
            Self::until_cancelled(&ctx, binding.delete(id))
                .await?
                .map_err(|e| Self::api_error("delete", e))
        }
        .await;

        DeleteResourceResponse {
            diagnostics: result.err().into_iter().collect(),
        }
    }
}

#[async_trait]
impl<K: ResourceKind> ResourceWithConfigure for BindingResource<K> {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
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
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl<K: ResourceKind> ResourceWithImportState for BindingResource<K> {
    /// Imports by numeric NetBox id; the next read fills in the rest
    async fn import_state(
        &self,
        ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut response = ImportResourceStateResponse {
            imported_resources: vec![],
            diagnostics: vec![],
        };

        if let Err(e) = parse_id_str(&request.id) {
            response.diagnostics.push(
                Diagnostic::error(format!("Cannot import {}", K::LABEL), e.to_string())
                    .with_attribute(AttributePath::new("id")),
            );
            return response;
        }

        import_state_passthrough_id(&ctx, AttributePath::new("id"), &request, &mut response);
        response
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::Client;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    async fn configured<K: ResourceKind>(url: &str) -> BindingResource<K> {
        let mut resource = BindingResource::<K>::new();
        let data = NetboxProviderData::new(Client::new(url, "secret", false).unwrap());
        let response = resource
            .configure(
                Context::new(),
                ConfigureResourceRequest {
                    provider_data: Some(Arc::new(data)),
                },
            )
            .await;
        assert!(response.diagnostics.is_empty());
        resource
    }

    fn import(id: &str) -> ImportResourceStateRequest {
        ImportResourceStateRequest {
            type_name: "netbox_console_port_template".to_string(),
            id: id.to_string(),
        }
    }

    #[tokio::test]
    async fn import_accepts_numeric_ids_only() {
        let resource = ConsolePortTemplateResource::new();

        let imported = resource.import_state(Context::new(), import("42")).await;
        assert!(imported.diagnostics.is_empty());
        assert_eq!(
            imported.imported_resources[0]
                .state
                .get_string(&AttributePath::new("id"))
                .unwrap(),
            "42"
        );

        let rejected = resource.import_state(Context::new(), import("con0")).await;
        assert!(rejected.imported_resources.is_empty());
        assert_eq!(
            rejected.diagnostics[0].summary,
            "Cannot import console port template"
        );
    }

    #[tokio::test]
    async fn unconfigured_resource_reports_diagnostic() {
        let resource = ManufacturerResource::new();
        let mut state = DynamicValue::empty_object();
        state
            .set_string(&AttributePath::new("id"), "7".to_string())
            .unwrap();

        let response = resource
            .read(
                Context::new(),
                ReadResourceRequest {
                    type_name: "netbox_manufacturer".to_string(),
                    current_state: state.clone(),
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Provider not configured");
        assert_eq!(response.new_state, Some(state));
    }

    #[tokio::test]
    async fn manufacturer_create_derives_slug() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/dcim/manufacturers/")
            .match_body(Matcher::Json(json!({
                "name": "Acme Corp",
                "slug": "acme-corp",
                "description": ""
            })))
            .with_status(201)
            .with_body(r#"{"id": 7, "name": "Acme Corp", "slug": "acme-corp", "description": ""}"#)
            .create_async()
            .await;
        let resource = configured::<ManufacturerCodec>(&server.url()).await;

        let mut planned = DynamicValue::empty_object();
        planned
            .set_string(&AttributePath::new("name"), "Acme Corp".to_string())
            .unwrap();
        let response = resource
            .create(
                Context::new(),
                CreateResourceRequest {
                    type_name: "netbox_manufacturer".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert!(response.diagnostics.is_empty(), "{:?}", response.diagnostics);
        assert_eq!(
            response
                .new_state
                .get_string(&AttributePath::new("slug"))
                .unwrap(),
            "acme-corp"
        );
        assert_eq!(
            response.new_state.get(&AttributePath::new("description")),
            Some(&tfplug::types::Dynamic::Null)
        );
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn failed_delete_keeps_diagnostic() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/api/dcim/power-port-templates/5/")
            .with_status(409)
            .with_body(r#"{"detail": "protected"}"#)
            .create_async()
            .await;
        let resource = configured::<PowerPortTemplateCodec>(&server.url()).await;
        let mut state = DynamicValue::empty_object();
        state
            .set_string(&AttributePath::new("id"), "5".to_string())
            .unwrap();

        let response = resource
            .delete(
                Context::new(),
                DeleteResourceRequest {
                    type_name: "netbox_power_port_template".to_string(),
                    prior_state: state,
                },
            )
            .await;

        assert_eq!(
            response.diagnostics[0].summary,
            "Failed to delete power port template"
        );
        assert!(response.diagnostics[0].detail.contains("protected"));
    }

    #[tokio::test]
    async fn cancelled_context_skips_netbox() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let resource = configured::<ManufacturerCodec>(&server.url()).await;
        let ctx = Context::new();
        ctx.cancel();

        let mut planned = DynamicValue::empty_object();
        planned
            .set_string(&AttributePath::new("name"), "Acme".to_string())
            .unwrap();
        let response = resource
            .create(
                ctx,
                CreateResourceRequest {
                    type_name: "netbox_manufacturer".to_string(),
                    planned_state: planned.clone(),
                    config: planned,
                },
            )
            .await;

        assert_eq!(response.diagnostics[0].summary, "Operation cancelled");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn cancel_abandons_request_in_flight() {
        // accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        let resource = configured::<ManufacturerCodec>(&format!("http://{}", addr)).await;

        let ctx = Context::new();
        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let mut state = DynamicValue::empty_object();
        state
            .set_string(&AttributePath::new("id"), "1".to_string())
            .unwrap();
        let response = tokio::time::timeout(
            Duration::from_secs(5),
            resource.read(
                ctx,
                ReadResourceRequest {
                    type_name: "netbox_manufacturer".to_string(),
                    current_state: state.clone(),
                },
            ),
        )
        .await
        .expect("read should stop once cancelled");

        assert_eq!(response.diagnostics.len(), 1);
        assert_eq!(response.diagnostics[0].summary, "Operation cancelled");
        assert_eq!(response.new_state, Some(state));
    }
}
