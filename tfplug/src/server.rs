//! In-process provider server
//!
//! Drives a Provider through the same lifecycle Terraform does: configure the
//! provider once, then for every operation create a fresh resource or data
//! source from its factory, hand it the provider data, validate and run it.
//! A wire protocol layer only has to translate messages into these calls.

use crate::context::Context;
use crate::data_source::{
    ConfigureDataSourceRequest, DataSourceSchemaRequest, DataSourceWithConfigure,
    ReadDataSourceRequest, ValidateDataSourceConfigRequest,
};
use crate::error::{Result, TfplugError};
use crate::plan::{plan_resource_change, PlanResult};
use crate::provider::{ConfigureProviderRequest, Provider, ProviderSchemaRequest};
use crate::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ImportedResource, ProviderResource, ReadResourceRequest,
    ResourceSchemaRequest, UpdateResourceRequest, ValidateResourceConfigRequest,
};
use crate::types::{has_errors, Diagnostic, DynamicValue};
use std::any::Any;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// Result of applying a planned change
#[derive(Debug, Clone)]
pub struct ApplyResult {
    /// Null after a destroy
    pub new_state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of refreshing a resource; None when the remote object is gone
#[derive(Debug, Clone)]
pub struct RefreshResult {
    pub new_state: Option<DynamicValue>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Result of importing an existing remote object by id
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported: Vec<ImportedResource>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct DataSourceResult {
    pub state: DynamicValue,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ProviderServer<P: Provider> {
    provider: Arc<RwLock<P>>,
    provider_data: RwLock<Option<Arc<dyn Any + Send + Sync>>>,
}

impl<P: Provider + 'static> ProviderServer<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(RwLock::new(provider)),
            provider_data: RwLock::new(None),
        }
    }

    /// Validates the provider block against its schema, then configures
    pub async fn configure(&self, ctx: Context, config: DynamicValue) -> Vec<Diagnostic> {
        let mut provider = self.provider.write().await;

        let schema = provider
            .schema(ctx.clone(), ProviderSchemaRequest)
            .await
            .schema;
        let diagnostics = schema.validate(&config);
        if has_errors(&diagnostics) {
            return diagnostics;
        }

        let response = provider
            .configure(ctx, ConfigureProviderRequest { config })
            .await;
        debug!(
            provider = provider.type_name(),
            errors = has_errors(&response.diagnostics),
            "provider configured"
        );

        if !has_errors(&response.diagnostics) {
            *self.provider_data.write().await = response.provider_data;
        }
        response.diagnostics
    }

    pub async fn validate_resource_config(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> Vec<Diagnostic> {
        let resource = match self.new_resource(type_name).await {
            Ok(resource) => resource,
            Err(e) => return vec![Diagnostic::error("Unknown resource type", e.to_string())],
        };
        resource
            .validate(
                ctx,
                ValidateResourceConfigRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await
            .diagnostics
    }

    pub async fn plan_resource_change(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: DynamicValue,
        config: DynamicValue,
    ) -> PlanResult {
        let failed = |diagnostics: Vec<Diagnostic>| PlanResult {
            planned_state: DynamicValue::null(),
            requires_replace: Vec::new(),
            diagnostics,
        };

        let resource = match self.new_resource(type_name).await {
            Ok(resource) => resource,
            Err(e) => return failed(vec![Diagnostic::error("Unknown resource type", e.to_string())]),
        };
        let schema = resource.schema(ctx, ResourceSchemaRequest).await.schema;

        if !config.is_null() {
            let diagnostics = schema.validate(&config);
            if has_errors(&diagnostics) {
                return failed(diagnostics);
            }
        }

        plan_resource_change(&schema, &prior_state, &config)
    }

    /// Create when there is no prior state, delete when the plan is null,
    /// update otherwise
    pub async fn apply_resource_change(
        &self,
        ctx: Context,
        type_name: &str,
        prior_state: DynamicValue,
        planned_state: DynamicValue,
        config: DynamicValue,
    ) -> ApplyResult {
        let resource = match self.configured_resource(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ApplyResult {
                    new_state: prior_state,
                    diagnostics,
                }
            }
        };

        if planned_state.is_null() {
            debug!(type_name, "deleting resource");
            let response = resource
                .delete(
                    ctx,
                    DeleteResourceRequest {
                        type_name: type_name.to_string(),
                        prior_state: prior_state.clone(),
                    },
                )
                .await;
            let new_state = if has_errors(&response.diagnostics) {
                prior_state
            } else {
                DynamicValue::null()
            };
            return ApplyResult {
                new_state,
                diagnostics: response.diagnostics,
            };
        }

        if prior_state.is_null() {
            debug!(type_name, "creating resource");
            let response = resource
                .create(
                    ctx,
                    CreateResourceRequest {
                        type_name: type_name.to_string(),
                        planned_state,
                        config,
                    },
                )
                .await;
            return ApplyResult {
                new_state: response.new_state,
                diagnostics: response.diagnostics,
            };
        }

        debug!(type_name, "updating resource");
        let response = resource
            .update(
                ctx,
                UpdateResourceRequest {
                    type_name: type_name.to_string(),
                    prior_state,
                    planned_state,
                    config,
                },
            )
            .await;
        ApplyResult {
            new_state: response.new_state,
            diagnostics: response.diagnostics,
        }
    }

    pub async fn read_resource(
        &self,
        ctx: Context,
        type_name: &str,
        current_state: DynamicValue,
    ) -> RefreshResult {
        let resource = match self.configured_resource(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return RefreshResult {
                    new_state: Some(current_state),
                    diagnostics,
                }
            }
        };

        let response = resource
            .read(
                ctx,
                ReadResourceRequest {
                    type_name: type_name.to_string(),
                    current_state,
                },
            )
            .await;
        RefreshResult {
            new_state: response.new_state,
            diagnostics: response.diagnostics,
        }
    }

    /// The imported state is usually partial; refresh it with
    /// [`ProviderServer::read_resource`]
    pub async fn import_resource_state(&self, ctx: Context, type_name: &str, id: &str) -> ImportResult {
        let resource = match self.configured_resource(ctx.clone(), type_name).await {
            Ok(resource) => resource,
            Err(diagnostics) => {
                return ImportResult {
                    imported: Vec::new(),
                    diagnostics,
                }
            }
        };

        debug!(type_name, id, "importing resource");
        let response = resource
            .import_state(
                ctx,
                ImportResourceStateRequest {
                    type_name: type_name.to_string(),
                    id: id.to_string(),
                },
            )
            .await;
        ImportResult {
            imported: response.imported_resources,
            diagnostics: response.diagnostics,
        }
    }

    pub async fn read_data_source(
        &self,
        ctx: Context,
        type_name: &str,
        config: DynamicValue,
    ) -> DataSourceResult {
        let failed = |diagnostics: Vec<Diagnostic>| DataSourceResult {
            state: DynamicValue::null(),
            diagnostics,
        };

        let data_source = match self.configured_data_source(ctx.clone(), type_name).await {
            Ok(data_source) => data_source,
            Err(diagnostics) => return failed(diagnostics),
        };

        let schema = data_source
            .schema(ctx.clone(), DataSourceSchemaRequest)
            .await
            .schema;
        let mut diagnostics = schema.validate(&config);
        diagnostics.extend(
            data_source
                .validate(
                    ctx.clone(),
                    ValidateDataSourceConfigRequest {
                        type_name: type_name.to_string(),
                        config: config.clone(),
                    },
                )
                .await
                .diagnostics,
        );
        if has_errors(&diagnostics) {
            return failed(diagnostics);
        }

        let response = data_source
            .read(
                ctx,
                ReadDataSourceRequest {
                    type_name: type_name.to_string(),
                    config,
                },
            )
            .await;
        diagnostics.extend(response.diagnostics);
        DataSourceResult {
            state: response.state,
            diagnostics,
        }
    }

    async fn new_resource(&self, type_name: &str) -> Result<Box<dyn ProviderResource>> {
        let provider = self.provider.read().await;
        let factories = provider.resources();
        let factory = factories
            .get(type_name)
            .ok_or_else(|| TfplugError::UnknownResourceType(type_name.to_string()))?;
        Ok(factory())
    }

    async fn configured_resource(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn ProviderResource>, Vec<Diagnostic>> {
        let mut resource = self
            .new_resource(type_name)
            .await
            .map_err(|e| vec![Diagnostic::error("Unknown resource type", e.to_string())])?;
        let provider_data = self.provider_data.read().await.clone();
        let response = resource
            .configure(ctx, ConfigureResourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(resource)
    }

    async fn configured_data_source(
        &self,
        ctx: Context,
        type_name: &str,
    ) -> std::result::Result<Box<dyn DataSourceWithConfigure>, Vec<Diagnostic>> {
        let mut data_source = {
            let provider = self.provider.read().await;
            let factories = provider.data_sources();
            let factory = factories.get(type_name).ok_or_else(|| {
                vec![Diagnostic::error(
                    "Unknown data source type",
                    TfplugError::UnknownDataSourceType(type_name.to_string()).to_string(),
                )]
            })?;
            factory()
        };
        let provider_data = self.provider_data.read().await.clone();
        let response = data_source
            .configure(ctx, ConfigureDataSourceRequest { provider_data })
            .await;
        if has_errors(&response.diagnostics) {
            return Err(response.diagnostics);
        }
        Ok(data_source)
    }
}
