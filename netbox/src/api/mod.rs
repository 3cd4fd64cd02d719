pub mod client;
pub mod collection;
pub mod common;
pub mod dcim;
pub mod error;

pub use client::Client;
pub use collection::{
    Endpoint, EntityKind, ListCollection, ListParams, ListableKind, Listing, Named,
    RemoteCollection, WritableKind,
};
pub use common::{ApiQueryParams, ChoiceValue, NestedRef, NestedTag, PaginatedResponse};
pub use error::ApiError;
