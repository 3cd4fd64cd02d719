//! Collection traits over NetBox REST endpoints
//!
//! Every NetBox object type lives under a collection path such as
//! `/api/dcim/console-ports/`. A kind marker names the path and the types
//! that go over the wire; `Endpoint` turns a kind into the list and CRUD
//! operations the binding layer works against.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

use super::client::Client;
use super::common::ApiQueryParams;
use super::error::ApiError;

/// Result of a list call: the remote total and the returned records in
/// remote order
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<E> {
    pub count: i64,
    pub results: Vec<E>,
}

/// Typed query parameters for a list endpoint
pub trait ListParams: Default + Clone + Send + Sync + 'static {
    fn set_limit(&mut self, limit: i64);

    fn limit(&self) -> Option<i64>;

    fn to_query(&self) -> ApiQueryParams;
}

#[async_trait]
pub trait ListCollection: Send + Sync {
    type Entity: Send;
    type Params: ListParams;

    async fn list(&self, params: &Self::Params) -> Result<Listing<Self::Entity>, ApiError>;
}

/// CRUD over one entity kind; read and delete report a missing id as
/// `ApiError::NotFound`
#[async_trait]
pub trait RemoteCollection: Send + Sync {
    type Entity: Send;
    type Writable: Send + Sync;

    async fn create(&self, body: &Self::Writable) -> Result<Self::Entity, ApiError>;

    async fn read(&self, id: i64) -> Result<Self::Entity, ApiError>;

    /// Partial update (PATCH)
    async fn update(&self, id: i64, body: &Self::Writable) -> Result<Self::Entity, ApiError>;

    async fn delete(&self, id: i64) -> Result<(), ApiError>;
}

/// Entities that can be filtered by name_regex
pub trait Named {
    fn name(&self) -> &str;
}

pub trait EntityKind: Send + Sync + 'static {
    /// Collection path with leading and trailing slash
    const PATH: &'static str;
    /// Human readable name used in error messages
    const LABEL: &'static str;

    type Entity: DeserializeOwned + Send;
}

pub trait ListableKind: EntityKind {
    type Params: ListParams;
}

pub trait WritableKind: EntityKind {
    type Writable: Serialize + Send + Sync;
}

/// A kind's collection on a particular client
pub struct Endpoint<'a, K> {
    client: &'a Client,
    kind: PhantomData<fn() -> K>,
}

impl<'a, K: EntityKind> Endpoint<'a, K> {
    pub fn new(client: &'a Client) -> Self {
        Self {
            client,
            kind: PhantomData,
        }
    }

    fn item_path(id: i64) -> String {
        format!("{}{}/", K::PATH, id)
    }
}

#[async_trait]
impl<K: ListableKind> ListCollection for Endpoint<'_, K> {
    type Entity = K::Entity;
    type Params = K::Params;

    /// With a limit only the first page is fetched; without one every page is
    async fn list(&self, params: &K::Params) -> Result<Listing<K::Entity>, ApiError> {
        let query = params.to_query();
        let page = if params.limit().is_some() {
            self.client.list_page(K::PATH, &query).await?
        } else {
            self.client.list_all(K::PATH, &query).await?
        };

        tracing::debug!(
            "Listed {}: count={} returned={}",
            K::LABEL,
            page.count,
            page.results.len()
        );
        Ok(Listing {
            count: page.count,
            results: page.results,
        })
    }
}

#[async_trait]
impl<K: WritableKind> RemoteCollection for Endpoint<'_, K> {
    type Entity = K::Entity;
    type Writable = K::Writable;

    async fn create(&self, body: &K::Writable) -> Result<K::Entity, ApiError> {
        self.client.post(K::PATH, body).await
    }

    async fn read(&self, id: i64) -> Result<K::Entity, ApiError> {
        self.client.get(&Self::item_path(id)).await
    }

    async fn update(&self, id: i64, body: &K::Writable) -> Result<K::Entity, ApiError> {
        self.client.patch(&Self::item_path(id), body).await
    }

    async fn delete(&self, id: i64) -> Result<(), ApiError> {
        self.client.delete(&Self::item_path(id)).await
    }
}
