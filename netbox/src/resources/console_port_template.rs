//! Console port template resource
//!
//! Console port and console server port templates share one wire shape, so
//! the field mapping here serves both.

use tfplug::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::{StringInSliceValidator, StringLengthValidator};

use super::ResourceKind;
use crate::api::dcim::{ConsolePortTemplate, ConsolePortTemplateKind, WritableConsolePortTemplate};
use crate::binding::codec::{
    choice, non_empty, ref_id, EmptyPolicy, FieldCodec, FieldReader, TemplateParent,
};
use crate::binding::ValidationError;

pub const CONSOLE_PORT_TYPES: &[&str] = &[
    "de-9",
    "db-25",
    "rj-11",
    "rj-12",
    "rj-45",
    "mini-din-8",
    "usb-a",
    "usb-b",
    "usb-c",
    "usb-mini-a",
    "usb-mini-b",
    "usb-micro-a",
    "usb-micro-b",
    "usb-micro-ab",
    "other",
];

pub(crate) const CONSOLE_TEMPLATE_KEYS: &[&str] = &[
    "id",
    "name",
    "description",
    "label",
    "type",
    "device_type_id",
    "module_type_id",
];

#[derive(Debug, Clone, PartialEq)]
pub struct ConsoleTemplateFields {
    pub name: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub port_type: Option<String>,
    pub parent: TemplateParent,
}

pub(crate) fn console_template_schema(description: &str) -> Schema {
    SchemaBuilder::new()
        .version(0)
        .description(description)
        .attribute(
            AttributeBuilder::new("id", AttributeType::String)
                .description("NetBox id of the template")
                .computed()
                .plan_modifier(UseStateForUnknown)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("name", AttributeType::String)
                .required()
                .validator(StringLengthValidator::between(1, 64))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("description", AttributeType::String)
                .optional()
                .validator(StringLengthValidator::at_least(1))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("label", AttributeType::String)
                .optional()
                .validator(StringLengthValidator::at_least(1))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("type", AttributeType::String)
                .description(&format!("One of [{}]", CONSOLE_PORT_TYPES.join(", ")))
                .optional()
                .validator(StringInSliceValidator::new(CONSOLE_PORT_TYPES.iter().copied()))
                .build(),
        )
        .attribute(
            AttributeBuilder::new("device_type_id", AttributeType::Number)
                .optional()
                .plan_modifier(RequiresReplaceIfChanged)
                .build(),
        )
        .attribute(
            AttributeBuilder::new("module_type_id", AttributeType::Number)
                .optional()
                .plan_modifier(RequiresReplaceIfChanged)
                .build(),
        )
        .exactly_one_of(&["device_type_id", "module_type_id"])
        .build()
}

pub(crate) fn decode_console_template(
    value: &DynamicValue,
) -> Result<ConsoleTemplateFields, ValidationError> {
    let reader = FieldReader::strict(value, CONSOLE_TEMPLATE_KEYS)?;
    Ok(ConsoleTemplateFields {
        name: reader.required_string("name")?,
        description: reader.optional_string("description")?,
        label: reader.optional_string("label")?,
        port_type: reader.optional_string("type")?,
        parent: reader.template_parent()?,
    })
}

fn scalar_body(fields: &ConsoleTemplateFields) -> WritableConsolePortTemplate {
    WritableConsolePortTemplate {
        name: fields.name.clone(),
        description: EmptyPolicy::Send.apply(fields.description.as_deref()),
        label: EmptyPolicy::Send.apply(fields.label.as_deref()),
        port_type: EmptyPolicy::Send.apply(fields.port_type.as_deref()),
        device_type: None,
        module_type: None,
    }
}

pub(crate) fn encode_console_template(fields: &ConsoleTemplateFields) -> WritableConsolePortTemplate {
    WritableConsolePortTemplate {
        device_type: fields.parent.device_type_id(),
        module_type: fields.parent.module_type_id(),
        ..scalar_body(fields)
    }
}

pub(crate) fn encode_console_template_update(
    prior: &ConsoleTemplateFields,
    planned: &ConsoleTemplateFields,
) -> WritableConsolePortTemplate {
    let (device_type, module_type) = TemplateParent::changed_ids(&prior.parent, &planned.parent);
    WritableConsolePortTemplate {
        device_type,
        module_type,
        ..scalar_body(planned)
    }
}

pub(crate) fn populate_console_template(
    tmpl: &ConsolePortTemplate,
    state: &mut DynamicValue,
) -> tfplug::Result<()> {
    state.set_string(&AttributePath::new("name"), tmpl.name.clone())?;
    state.set_optional_string(
        &AttributePath::new("description"),
        non_empty(&tmpl.description),
    )?;
    state.set_optional_string(&AttributePath::new("label"), non_empty(&tmpl.label))?;
    state.set_optional_string(&AttributePath::new("type"), choice(&tmpl.port_type))?;
    state.set_optional_i64(
        &AttributePath::new("device_type_id"),
        ref_id(&tmpl.device_type),
    )?;
    state.set_optional_i64(
        &AttributePath::new("module_type_id"),
        ref_id(&tmpl.module_type),
    )?;
    Ok(())
}

pub struct ConsolePortTemplateCodec;

impl FieldCodec for ConsolePortTemplateCodec {
    const LABEL: &'static str = "console port template";
    const KEYS: &'static [&'static str] = CONSOLE_TEMPLATE_KEYS;

    type Fields = ConsoleTemplateFields;
    type Entity = ConsolePortTemplate;
    type Writable = WritableConsolePortTemplate;

    fn decode(value: &DynamicValue) -> Result<Self::Fields, ValidationError> {
        decode_console_template(value)
    }

    fn encode(fields: &Self::Fields) -> Self::Writable {
        encode_console_template(fields)
    }

    fn encode_update(prior: &Self::Fields, planned: &Self::Fields) -> Self::Writable {
        encode_console_template_update(prior, planned)
    }

    fn populate(entity: &Self::Entity, state: &mut DynamicValue) -> tfplug::Result<()> {
        populate_console_template(entity, state)
    }

    fn entity_id(entity: &Self::Entity) -> i64 {
        entity.id
    }
}

impl ResourceKind for ConsolePortTemplateCodec {
    const TYPE_NAME: &'static str = "netbox_console_port_template";

    type Kind = ConsolePortTemplateKind;

    fn schema() -> Schema {
        console_template_schema(
            "A template for a console port that will be created on all instantiations of the parent device type",
        )
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::api::{ChoiceValue, NestedRef};
    use serde_json::json;
    use std::collections::HashMap;
    use tfplug::plan::plan_resource_change;
    use tfplug::plan_modifier::values_equal;
    use tfplug::types::Dynamic;

    fn config(entries: &[(&str, Dynamic)]) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        ))
    }

    fn fields() -> ConsoleTemplateFields {
        ConsoleTemplateFields {
            name: "con0".to_string(),
            description: Some("serial".to_string()),
            label: None,
            port_type: Some("rj-45".to_string()),
            parent: TemplateParent::DeviceType(3),
        }
    }

    #[test]
    fn schema_declares_exactly_the_codec_keys() {
        let schema = ConsolePortTemplateCodec::schema();
        let mut names: Vec<&str> = schema
            .block
            .attributes
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        names.sort();
        let mut keys = CONSOLE_TEMPLATE_KEYS.to_vec();
        keys.sort();

        assert_eq!(names, keys);
    }

    #[test]
    fn decodes_config() {
        let value = config(&[
            ("id", Dynamic::Unknown),
            ("name", Dynamic::String("con0".to_string())),
            ("description", Dynamic::String("serial".to_string())),
            ("label", Dynamic::Null),
            ("type", Dynamic::String("rj-45".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
            ("module_type_id", Dynamic::Null),
        ]);

        assert_eq!(ConsolePortTemplateCodec::decode(&value).unwrap(), fields());
    }

    #[test]
    fn decode_rejects_two_parents() {
        let value = config(&[
            ("name", Dynamic::String("con0".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
            ("module_type_id", Dynamic::Number(8.0)),
        ]);

        let err = ConsolePortTemplateCodec::decode(&value).unwrap_err();
        assert_eq!(
            err.to_string(),
            "exactly one of `device_type_id,module_type_id` must be specified"
        );
    }

    #[test]
    fn create_body_sends_empty_strings_and_parent() {
        let body = ConsolePortTemplateCodec::encode(&fields());

        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "name": "con0",
                "description": "serial",
                "label": "",
                "type": "rj-45",
                "device_type": 3
            })
        );
    }

    #[test]
    fn update_body_omits_unchanged_parent() {
        let prior = fields();
        let mut planned = fields();
        planned.name = "con1".to_string();

        let body = ConsolePortTemplateCodec::encode_update(&prior, &planned);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["name"], "con1");
        assert!(json.get("device_type").is_none());
        assert!(json.get("module_type").is_none());
    }

    #[test]
    fn populate_nulls_empty_and_missing_values() {
        let tmpl = ConsolePortTemplate {
            id: 7,
            name: "con0".to_string(),
            description: String::new(),
            label: "Console".to_string(),
            port_type: Some(ChoiceValue {
                value: None,
                label: None,
            }),
            device_type: None,
            module_type: Some(NestedRef {
                id: 8,
                display: None,
                name: None,
            }),
        };
        let mut state = DynamicValue::empty_object();

        ConsolePortTemplateCodec::populate(&tmpl, &mut state).unwrap();

        assert_eq!(state.get(&AttributePath::new("description")), Some(&Dynamic::Null));
        assert_eq!(state.get(&AttributePath::new("type")), Some(&Dynamic::Null));
        assert_eq!(state.get(&AttributePath::new("device_type_id")), Some(&Dynamic::Null));
        assert_eq!(
            state.get_optional_i64(&AttributePath::new("module_type_id")).unwrap(),
            Some(8)
        );
        assert_eq!(
            state.get_string(&AttributePath::new("label")).unwrap(),
            "Console"
        );
    }

    #[test]
    fn blank_remote_text_plans_no_change() {
        let tmpl = ConsolePortTemplate {
            id: 11,
            name: "con0".to_string(),
            description: String::new(),
            label: String::new(),
            port_type: Some(ChoiceValue {
                value: Some("rj-45".to_string()),
                label: Some("RJ-45".to_string()),
            }),
            device_type: Some(NestedRef {
                id: 3,
                display: None,
                name: None,
            }),
            module_type: None,
        };
        let mut state = DynamicValue::empty_object();
        state.set_string(&AttributePath::new("id"), "11".to_string()).unwrap();
        ConsolePortTemplateCodec::populate(&tmpl, &mut state).unwrap();

        let schema = ConsolePortTemplateCodec::schema();
        let omitted = config(&[
            ("name", Dynamic::String("con0".to_string())),
            ("type", Dynamic::String("rj-45".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
        ]);
        let plan = plan_resource_change(&schema, &state, &omitted);

        assert!(plan.diagnostics.is_empty());
        assert!(plan.requires_replace.is_empty());
        assert!(values_equal(&plan.planned_state.value, &state.value));

        let mut blank = omitted.clone();
        blank
            .set_string(&AttributePath::new("description"), String::new())
            .unwrap();
        let diags = schema.validate(&blank);
        assert_eq!(diags.len(), 1);
        assert!(diags[0].summary.contains("minimum length"));
        assert_eq!(diags[0].attribute, Some(AttributePath::new("description")));
    }

    #[test]
    fn decode_encode_keeps_scalar_values() {
        let value = config(&[
            ("name", Dynamic::String("con0".to_string())),
            ("description", Dynamic::String("serial".to_string())),
            ("label", Dynamic::String("Console".to_string())),
            ("type", Dynamic::String("usb-c".to_string())),
            ("module_type_id", Dynamic::Number(8.0)),
        ]);

        let body = ConsolePortTemplateCodec::encode(&ConsolePortTemplateCodec::decode(&value).unwrap());

        assert_eq!(body.name, "con0");
        assert_eq!(body.description.as_deref(), Some("serial"));
        assert_eq!(body.label.as_deref(), Some("Console"));
        assert_eq!(body.port_type.as_deref(), Some("usb-c"));
        assert_eq!(body.module_type, Some(8));
    }
}
