//! Provider plumbing shared by the netbox provider: the dynamic value model,
//! schemas that validate config and drive planning, the async provider,
//! resource and data source traits, and an in-process [`ProviderServer`]
//! that runs them through their lifecycle.

pub mod context;
pub mod data_source;
pub mod error;
pub mod import;
pub mod logging;
pub mod plan;
pub mod plan_modifier;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod server;
pub mod types;
pub mod validator;

pub use context::Context;
pub use data_source::{DataSource, DataSourceWithConfigure};
pub use error::{Result, TfplugError};
pub use import::import_state_passthrough_id;
pub use provider::{DataSourceFactory, Provider, ResourceFactory};
pub use resource::{ProviderResource, Resource, ResourceWithConfigure, ResourceWithImportState};
pub use schema::{AttributeBuilder, AttributeType, NestedBlock, NestingMode, Schema, SchemaBuilder};
pub use server::ProviderServer;
pub use types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
