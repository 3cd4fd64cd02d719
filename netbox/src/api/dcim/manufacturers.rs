use serde::{Deserialize, Serialize};

use crate::api::collection::{EntityKind, ListParams, ListableKind, Named, WritableKind};
use crate::api::common::{ApiQueryParams, NestedTag};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Manufacturer {
    pub id: i64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
}

impl Named for Manufacturer {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WritableManufacturer {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManufacturerListParams {
    pub name: Option<String>,
    pub limit: Option<i64>,
}

impl ListParams for ManufacturerListParams {
    fn set_limit(&mut self, limit: i64) {
        self.limit = Some(limit);
    }

    fn limit(&self) -> Option<i64> {
        self.limit
    }

    fn to_query(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional("name", self.name.as_deref())
            .add_optional("limit", self.limit)
    }
}

pub struct ManufacturerKind;

impl EntityKind for ManufacturerKind {
    const PATH: &'static str = "/api/dcim/manufacturers/";
    const LABEL: &'static str = "manufacturer";
    type Entity = Manufacturer;
}

impl ListableKind for ManufacturerKind {
    type Params = ManufacturerListParams;
}

impl WritableKind for ManufacturerKind {
    type Writable = WritableManufacturer;
}
