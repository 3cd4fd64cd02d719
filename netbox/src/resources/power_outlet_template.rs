//! Power outlet template resource

use tfplug::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::{StringInSliceValidator, StringLengthValidator};

use super::ResourceKind;
use crate::api::dcim::{PowerOutletTemplate, PowerOutletTemplateKind, WritablePowerOutletTemplate};
use crate::binding::codec::{
    choice, non_empty, ref_id, EmptyPolicy, FieldCodec, FieldReader, TemplateParent,
};
use crate::binding::ValidationError;

pub const FEED_LEGS: &[&str] = &["A", "B", "C"];

#[derive(Debug, Clone, PartialEq)]
pub struct PowerOutletTemplateFields {
    pub name: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub outlet_type: Option<String>,
    pub power_port_id: Option<i64>,
    pub feed_leg: Option<String>,
    pub parent: TemplateParent,
}

pub struct PowerOutletTemplateCodec;

impl PowerOutletTemplateCodec {
    /// The remote tells unset from empty on every optional string here
    fn scalar_body(fields: &PowerOutletTemplateFields) -> WritablePowerOutletTemplate {
        WritablePowerOutletTemplate {
            name: fields.name.clone(),
            description: EmptyPolicy::Omit.apply(fields.description.as_deref()),
            label: EmptyPolicy::Omit.apply(fields.label.as_deref()),
            outlet_type: EmptyPolicy::Omit.apply(fields.outlet_type.as_deref()),
            power_port: fields.power_port_id,
            feed_leg: EmptyPolicy::Omit.apply(fields.feed_leg.as_deref()),
            device_type: None,
            module_type: None,
        }
    }
}

impl FieldCodec for PowerOutletTemplateCodec {
    const LABEL: &'static str = "power outlet template";
    const KEYS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "label",
        "type",
        "power_port_id",
        "feed_leg",
        "device_type_id",
        "module_type_id",
    ];

    type Fields = PowerOutletTemplateFields;
    type Entity = PowerOutletTemplate;
    type Writable = WritablePowerOutletTemplate;

    fn decode(value: &DynamicValue) -> Result<Self::Fields, ValidationError> {
        let reader = FieldReader::strict(value, Self::KEYS)?;
        Ok(PowerOutletTemplateFields {
            name: reader.required_string("name")?,
            description: reader.optional_string("description")?,
            label: reader.optional_string("label")?,
            outlet_type: reader.optional_string("type")?,
            power_port_id: reader.optional_i64("power_port_id")?,
            feed_leg: reader.optional_string("feed_leg")?,
            parent: reader.template_parent()?,
        })
    }

    fn encode(fields: &Self::Fields) -> Self::Writable {
        WritablePowerOutletTemplate {
            device_type: fields.parent.device_type_id(),
            module_type: fields.parent.module_type_id(),
            ..Self::scalar_body(fields)
        }
    }

    fn encode_update(prior: &Self::Fields, planned: &Self::Fields) -> Self::Writable {
        let (device_type, module_type) =
            TemplateParent::changed_ids(&prior.parent, &planned.parent);
        WritablePowerOutletTemplate {
            device_type,
            module_type,
            ..Self::scalar_body(planned)
        }
    }

    fn populate(entity: &Self::Entity, state: &mut DynamicValue) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new("name"), entity.name.clone())?;
        state.set_optional_string(
            &AttributePath::new("description"),
            non_empty(&entity.description),
        )?;
        state.set_optional_string(&AttributePath::new("label"), non_empty(&entity.label))?;
        state.set_optional_string(&AttributePath::new("type"), choice(&entity.outlet_type))?;
        state.set_optional_string(&AttributePath::new("feed_leg"), choice(&entity.feed_leg))?;
        state.set_optional_i64(
            &AttributePath::new("power_port_id"),
            ref_id(&entity.power_port),
        )?;
        state.set_optional_i64(
            &AttributePath::new("device_type_id"),
            ref_id(&entity.device_type),
        )?;
        state.set_optional_i64(
            &AttributePath::new("module_type_id"),
            ref_id(&entity.module_type),
        )?;
        Ok(())
    }

    fn entity_id(entity: &Self::Entity) -> i64 {
        entity.id
    }
}

impl ResourceKind for PowerOutletTemplateCodec {
    const TYPE_NAME: &'static str = "netbox_power_outlet_template";

    type Kind = PowerOutletTemplateKind;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(
                "A template for a power outlet that will be created on all instantiations of the parent device type",
            )
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
                    .description("Power outlet connector type, e.g. iec-60320-c13 or nema-5-15r")
                    .optional()
                    .validator(StringLengthValidator::at_least(1))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("power_port_id", AttributeType::Number)
                    .description("Power port template feeding this outlet")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("feed_leg", AttributeType::String)
                    .description("One of [A, B, C]")
                    .optional()
                    .validator(StringInSliceValidator::new(FEED_LEGS.iter().copied()))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .optional()
                    .validator(StringLengthValidator::at_least(1))
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
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use tfplug::types::Dynamic;

    #[test]
    fn empty_strings_are_omitted() {
        let fields = PowerOutletTemplateFields {
            name: "outlet1".to_string(),
            description: Some(String::new()),
            label: None,
            outlet_type: Some("iec-60320-c13".to_string()),
            power_port_id: Some(21),
            feed_leg: Some(String::new()),
            parent: TemplateParent::DeviceType(3),
        };

        assert_eq!(
            serde_json::to_value(PowerOutletTemplateCodec::encode(&fields)).unwrap(),
            json!({
                "name": "outlet1",
                "type": "iec-60320-c13",
                "power_port": 21,
                "device_type": 3
            })
        );
    }

    #[test]
    fn schema_rejects_unknown_feed_leg() {
        let config = DynamicValue::new(Dynamic::Map(HashMap::from([
            ("name".to_string(), Dynamic::String("outlet1".to_string())),
            ("feed_leg".to_string(), Dynamic::String("D".to_string())),
            ("device_type_id".to_string(), Dynamic::Number(3.0)),
        ])));

        let diagnostics = PowerOutletTemplateCodec::schema().validate(&config);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "feed_leg must be one of [A, B, C]");
    }

    #[test]
    fn schema_requires_a_parent() {
        let config = DynamicValue::new(Dynamic::Map(HashMap::from([(
            "name".to_string(),
            Dynamic::String("outlet1".to_string()),
        )])));

        let diagnostics = PowerOutletTemplateCodec::schema().validate(&config);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Invalid combination of arguments");
    }
}
