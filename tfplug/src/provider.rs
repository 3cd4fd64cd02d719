//! Provider trait and related types
//!
//! A provider owns the configuration shared by its resources and data
//! sources. Resources and data sources are created fresh for every operation
//! through factories and receive the provider data via `configure`.

use crate::context::Context;
use crate::data_source::DataSourceWithConfigure;
use crate::resource::ProviderResource;
use crate::schema::Schema;
use crate::types::{Diagnostic, DynamicValue};
use async_trait::async_trait;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// Factory producing a fresh resource instance per operation
pub type ResourceFactory = Box<dyn Fn() -> Box<dyn ProviderResource> + Send + Sync>;

/// Factory producing a fresh data source instance per operation
pub type DataSourceFactory = Box<dyn Fn() -> Box<dyn DataSourceWithConfigure> + Send + Sync>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Provider name, the prefix of every resource type (e.g. "netbox")
    fn type_name(&self) -> &str;

    async fn metadata(
        &self,
        ctx: Context,
        request: ProviderMetadataRequest,
    ) -> ProviderMetadataResponse;

    async fn schema(&self, ctx: Context, request: ProviderSchemaRequest) -> ProviderSchemaResponse;

    /// Called once before any resource or data source operation
    /// The returned provider_data is handed to every configure call
    async fn configure(
        &mut self,
        ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse;

    async fn validate(
        &self,
        ctx: Context,
        request: ValidateProviderConfigRequest,
    ) -> ValidateProviderConfigResponse;

    /// Keys MUST match each resource's type_name()
    fn resources(&self) -> HashMap<String, ResourceFactory>;

    /// Keys MUST match each data source's type_name()
    fn data_sources(&self) -> HashMap<String, DataSourceFactory>;
}

pub struct ProviderMetadataRequest;

pub struct ProviderMetadataResponse {
    pub type_name: String,
}

pub struct ProviderSchemaRequest;

pub struct ProviderSchemaResponse {
    pub schema: Schema,
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ValidateProviderConfigRequest {
    pub config: DynamicValue,
}

pub struct ValidateProviderConfigResponse {
    pub diagnostics: Vec<Diagnostic>,
}

pub struct ConfigureProviderRequest {
    pub config: DynamicValue,
}

pub struct ConfigureProviderResponse {
    pub diagnostics: Vec<Diagnostic>,
    /// Shared with resources and data sources through their configure call
    pub provider_data: Option<Arc<dyn Any + Send + Sync>>,
}
