//! Component templates attached to device types and module types

use serde::{Deserialize, Serialize};

use crate::api::collection::{EntityKind, WritableKind};
use crate::api::common::{ChoiceValue, NestedRef};

/// Console port template. Console server port templates share the same shape.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConsolePortTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub port_type: Option<ChoiceValue>,
    #[serde(default)]
    pub device_type: Option<NestedRef>,
    #[serde(default)]
    pub module_type: Option<NestedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WritableConsolePortTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerPortTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub port_type: Option<ChoiceValue>,
    #[serde(default)]
    pub maximum_draw: Option<i64>,
    #[serde(default)]
    pub allocated_draw: Option<i64>,
    #[serde(default)]
    pub device_type: Option<NestedRef>,
    #[serde(default)]
    pub module_type: Option<NestedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WritablePowerPortTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub port_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_draw: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_draw: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PowerOutletTemplate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub outlet_type: Option<ChoiceValue>,
    #[serde(default)]
    pub power_port: Option<NestedRef>,
    #[serde(default)]
    pub feed_leg: Option<ChoiceValue>,
    #[serde(default)]
    pub device_type: Option<NestedRef>,
    #[serde(default)]
    pub module_type: Option<NestedRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WritablePowerOutletTemplate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub outlet_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed_leg: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_type: Option<i64>,
}

pub struct ConsolePortTemplateKind;

impl EntityKind for ConsolePortTemplateKind {
    const PATH: &'static str = "/api/dcim/console-port-templates/";
    const LABEL: &'static str = "console port template";
    type Entity = ConsolePortTemplate;
}

impl WritableKind for ConsolePortTemplateKind {
    type Writable = WritableConsolePortTemplate;
}

pub struct ConsoleServerPortTemplateKind;

impl EntityKind for ConsoleServerPortTemplateKind {
    const PATH: &'static str = "/api/dcim/console-server-port-templates/";
    const LABEL: &'static str = "console server port template";
    type Entity = ConsolePortTemplate;
}

impl WritableKind for ConsoleServerPortTemplateKind {
    type Writable = WritableConsolePortTemplate;
}

pub struct PowerPortTemplateKind;

impl EntityKind for PowerPortTemplateKind {
    const PATH: &'static str = "/api/dcim/power-port-templates/";
    const LABEL: &'static str = "power port template";
    type Entity = PowerPortTemplate;
}

impl WritableKind for PowerPortTemplateKind {
    type Writable = WritablePowerPortTemplate;
}

pub struct PowerOutletTemplateKind;

impl EntityKind for PowerOutletTemplateKind {
    const PATH: &'static str = "/api/dcim/power-outlet-templates/";
    const LABEL: &'static str = "power outlet template";
    type Entity = PowerOutletTemplate;
}

impl WritableKind for PowerOutletTemplateKind {
    type Writable = WritablePowerOutletTemplate;
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn writable_template_skips_unset_fields() {
        let body = WritablePowerOutletTemplate {
            name: "outlet1".to_string(),
            feed_leg: Some("A".to_string()),
            device_type: Some(3),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"name": "outlet1", "feed_leg": "A", "device_type": 3})
        );
    }

    #[test]
    fn writable_template_keeps_empty_strings() {
        let body = WritableConsolePortTemplate {
            name: "con0".to_string(),
            description: Some(String::new()),
            label: Some(String::new()),
            port_type: Some(String::new()),
            module_type: Some(8),
            ..Default::default()
        };

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({"name": "con0", "description": "", "label": "", "type": "", "module_type": 8})
        );
    }

    #[test]
    fn power_port_template_deserializes() {
        let json = r#"{
            "id": 21,
            "device_type": {"id": 3, "display": "ASR-1001"},
            "module_type": null,
            "name": "PSU1",
            "label": "",
            "type": {"value": "iec-60320-c14", "label": "C14"},
            "maximum_draw": 750,
            "allocated_draw": null,
            "description": ""
        }"#;

        let tmpl: PowerPortTemplate = serde_json::from_str(json).unwrap();

        assert_eq!(tmpl.device_type.map(|d| d.id), Some(3));
        assert_eq!(tmpl.maximum_draw, Some(750));
        assert_eq!(tmpl.allocated_draw, None);
    }
}
