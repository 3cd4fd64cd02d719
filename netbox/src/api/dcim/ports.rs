//! Device console ports, console server ports and power outlets

use serde::Deserialize;

use crate::api::collection::{EntityKind, ListParams, ListableKind, Named};
use crate::api::common::{ApiQueryParams, ChoiceValue, NestedRef, NestedTag};

/// A console port on a device. Console server ports share the same shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsolePort {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub device: Option<NestedRef>,
    #[serde(default)]
    pub module: Option<NestedRef>,
    #[serde(rename = "type", default)]
    pub port_type: Option<ChoiceValue>,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(rename = "_occupied", alias = "occupied", default)]
    pub occupied: bool,
    #[serde(default)]
    pub mark_connected: bool,
}

pub type ConsoleServerPort = ConsolePort;

impl Named for ConsolePort {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerOutlet {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub device: Option<NestedRef>,
    #[serde(default)]
    pub module: Option<NestedRef>,
    #[serde(rename = "type", default)]
    pub outlet_type: Option<ChoiceValue>,
    #[serde(default)]
    pub power_port: Option<NestedRef>,
    #[serde(default)]
    pub feed_leg: Option<ChoiceValue>,
    #[serde(default)]
    pub tags: Vec<NestedTag>,
    #[serde(default)]
    pub mark_connected: bool,
}

impl Named for PowerOutlet {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Filters accepted by the console port list endpoints
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsolePortListParams {
    pub name: Option<String>,
    /// Tag slugs; a record must carry every listed tag
    pub tag: Vec<String>,
    pub device_id: Option<String>,
    pub limit: Option<i64>,
}

impl ListParams for ConsolePortListParams {
    fn set_limit(&mut self, limit: i64) {
        self.limit = Some(limit);
    }

    fn limit(&self) -> Option<i64> {
        self.limit
    }

    fn to_query(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional("name", self.name.as_deref())
            .add_all("tag", &self.tag)
            .add_optional("device_id", self.device_id.as_deref())
            .add_optional("limit", self.limit)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerOutletListParams {
    pub name: Option<String>,
    pub tag: Vec<String>,
    pub device_id: Option<String>,
    pub outlet_type: Option<String>,
    pub limit: Option<i64>,
}

impl ListParams for PowerOutletListParams {
    fn set_limit(&mut self, limit: i64) {
        self.limit = Some(limit);
    }

    fn limit(&self) -> Option<i64> {
        self.limit
    }

    fn to_query(&self) -> ApiQueryParams {
        ApiQueryParams::new()
            .add_optional("name", self.name.as_deref())
            .add_all("tag", &self.tag)
            .add_optional("device_id", self.device_id.as_deref())
            .add_optional("type", self.outlet_type.as_deref())
            .add_optional("limit", self.limit)
    }
}

pub struct ConsolePortKind;

impl EntityKind for ConsolePortKind {
    const PATH: &'static str = "/api/dcim/console-ports/";
    const LABEL: &'static str = "console port";
    type Entity = ConsolePort;
}

impl ListableKind for ConsolePortKind {
    type Params = ConsolePortListParams;
}

pub struct ConsoleServerPortKind;

impl EntityKind for ConsoleServerPortKind {
    const PATH: &'static str = "/api/dcim/console-server-ports/";
    const LABEL: &'static str = "console server port";
    type Entity = ConsoleServerPort;
}

impl ListableKind for ConsoleServerPortKind {
    type Params = ConsolePortListParams;
}

pub struct PowerOutletKind;

impl EntityKind for PowerOutletKind {
    const PATH: &'static str = "/api/dcim/power-outlets/";
    const LABEL: &'static str = "power outlet";
    type Entity = PowerOutlet;
}

impl ListableKind for PowerOutletKind {
    type Params = PowerOutletListParams;
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;

    #[test]
    fn console_port_deserializes_netbox_payload() {
        let json = r#"{
            "id": 12,
            "url": "http://netbox.local/api/dcim/console-ports/12/",
            "display": "con0",
            "device": {"id": 4, "display": "rtr01", "name": "rtr01"},
            "module": null,
            "name": "con0",
            "label": "",
            "type": {"value": "rj-45", "label": "RJ-45"},
            "speed": null,
            "description": "serial",
            "mark_connected": false,
            "tags": [{"id": 3, "name": "Edge", "slug": "edge", "color": "9e9e9e"}],
            "_occupied": true
        }"#;

        let port: ConsolePort = serde_json::from_str(json).unwrap();

        assert_eq!(port.id, 12);
        assert_eq!(port.device.as_ref().map(|d| d.id), Some(4));
        assert!(port.module.is_none());
        assert_eq!(
            port.port_type.and_then(|t| t.value).as_deref(),
            Some("rj-45")
        );
        assert_eq!(port.tags[0].id, 3);
        assert!(port.occupied);
    }

    #[test]
    fn power_outlet_tolerates_null_choices() {
        let json = r#"{
            "id": 5,
            "name": "outlet1",
            "device": {"id": 4},
            "type": null,
            "power_port": null,
            "feed_leg": {"value": "A", "label": "A"}
        }"#;

        let outlet: PowerOutlet = serde_json::from_str(json).unwrap();

        assert!(outlet.outlet_type.is_none());
        assert!(outlet.power_port.is_none());
        assert_eq!(outlet.feed_leg.and_then(|f| f.value).as_deref(), Some("A"));
        assert!(outlet.tags.is_empty());
        assert_eq!(outlet.description, "");
    }

    #[test]
    fn list_params_render_repeated_tags() {
        let params = PowerOutletListParams {
            name: Some("outlet1".to_string()),
            tag: vec!["edge".to_string(), "core".to_string()],
            device_id: Some("4".to_string()),
            outlet_type: Some("iec-60320-c13".to_string()),
            limit: Some(10),
        };

        assert_eq!(
            params.to_query().to_query_string(),
            "?name=outlet1&tag=edge&tag=core&device_id=4&type=iec-60320-c13&limit=10"
        );
    }
}
