//! Power port template resource

use tfplug::plan_modifier::{RequiresReplaceIfChanged, UseStateForUnknown};
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::{StringInSliceValidator, StringLengthValidator};

use super::ResourceKind;
use crate::api::dcim::{PowerPortTemplate, PowerPortTemplateKind, WritablePowerPortTemplate};
use crate::binding::codec::{
    choice, non_empty, positive, ref_id, EmptyPolicy, FieldCodec, FieldReader, TemplateParent,
};
use crate::binding::ValidationError;

/// Connector types NetBox accepts for a power port
pub const POWER_PORT_TYPES: &[&str] = &[
    "iec-60320-c6",
    "iec-60320-c8",
    "iec-60320-c14",
    "iec-60320-c16",
    "iec-60320-c20",
    "iec-60320-c22",
    "iec-60309-p-n-e-4h",
    "iec-60309-p-n-e-6h",
    "iec-60309-p-n-e-9h",
    "iec-60309-2p-e-4h",
    "iec-60309-2p-e-6h",
    "iec-60309-2p-e-9h",
    "iec-60309-3p-e-4h",
    "iec-60309-3p-e-6h",
    "iec-60309-3p-e-9h",
    "iec-60309-3p-n-e-4h",
    "iec-60309-3p-n-e-6h",
    "iec-60309-3p-n-e-9h",
    "nema-1-15p",
    "nema-5-15p",
    "nema-5-20p",
    "nema-5-30p",
    "nema-5-50p",
    "nema-6-15p",
    "nema-6-20p",
    "nema-6-30p",
    "nema-6-50p",
    "nema-10-30p",
    "nema-10-50p",
    "nema-14-20p",
    "nema-14-30p",
    "nema-14-50p",
    "nema-14-60p",
    "nema-15-15p",
    "nema-15-20p",
    "nema-15-30p",
    "nema-15-50p",
    "nema-15-60p",
    "nema-l1-15p",
    "nema-l5-15p",
    "nema-l5-20p",
    "nema-l5-30p",
    "nema-l5-50p",
    "nema-l6-15p",
    "nema-l6-20p",
    "nema-l6-30p",
    "nema-l6-50p",
    "nema-l10-30p",
    "nema-l14-20p",
    "nema-l14-30p",
    "nema-l14-50p",
    "nema-l14-60p",
    "nema-l15-20p",
    "nema-l15-30p",
    "nema-l15-50p",
    "nema-l15-60p",
    "nema-l21-20p",
    "nema-l21-30p",
    "nema-l22-30p",
    "cs6361c",
    "cs6365c",
    "cs8165c",
    "cs8265c",
    "cs8365c",
    "cs8465c",
    "ita-c",
    "ita-e",
    "ita-f",
    "ita-ef",
    "ita-g",
    "ita-h",
    "ita-i",
    "ita-j",
    "ita-k",
    "ita-l",
    "ita-m",
    "ita-n",
    "ita-o",
    "usb-a",
    "usb-b",
    "usb-c",
    "usb-mini-a",
    "usb-mini-b",
    "usb-micro-a",
    "usb-micro-b",
    "usb-micro-ab",
    "usb-3-b",
    "usb-3-micro-b",
    "dc-terminal",
    "saf-d-grid",
    "neutrik-powercon-20",
    "neutrik-powercon-32",
    "neutrik-powercon-true1",
    "neutrik-powercon-true1-top",
    "ubiquiti-smartpower",
    "hardwired",
    "other",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PowerPortTemplateFields {
    pub name: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub port_type: String,
    pub maximum_draw: Option<i64>,
    pub allocated_draw: Option<i64>,
    pub parent: TemplateParent,
}

pub struct PowerPortTemplateCodec;

impl PowerPortTemplateCodec {
    fn scalar_body(fields: &PowerPortTemplateFields) -> WritablePowerPortTemplate {
        WritablePowerPortTemplate {
            name: fields.name.clone(),
            description: EmptyPolicy::Send.apply(fields.description.as_deref()),
            label: EmptyPolicy::Send.apply(fields.label.as_deref()),
            port_type: Some(fields.port_type.clone()),
            maximum_draw: positive(fields.maximum_draw),
            allocated_draw: positive(fields.allocated_draw),
            device_type: None,
            module_type: None,
        }
    }
}

impl FieldCodec for PowerPortTemplateCodec {
    const LABEL: &'static str = "power port template";
    const KEYS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "label",
        "type",
        "maximum_draw",
        "allocated_draw",
        "device_type_id",
        "module_type_id",
    ];

    type Fields = PowerPortTemplateFields;
    type Entity = PowerPortTemplate;
    type Writable = WritablePowerPortTemplate;

    fn decode(value: &DynamicValue) -> Result<Self::Fields, ValidationError> {
        let reader = FieldReader::strict(value, Self::KEYS)?;
        Ok(PowerPortTemplateFields {
            name: reader.required_string("name")?,
            description: reader.optional_string("description")?,
            label: reader.optional_string("label")?,
            port_type: reader.required_string("type")?,
            maximum_draw: reader.optional_i64("maximum_draw")?,
            allocated_draw: reader.optional_i64("allocated_draw")?,
            parent: reader.template_parent()?,
        })
    }

    fn encode(fields: &Self::Fields) -> Self::Writable {
        WritablePowerPortTemplate {
            device_type: fields.parent.device_type_id(),
            module_type: fields.parent.module_type_id(),
            ..Self::scalar_body(fields)
        }
    }

    fn encode_update(prior: &Self::Fields, planned: &Self::Fields) -> Self::Writable {
        let (device_type, module_type) =
            TemplateParent::changed_ids(&prior.parent, &planned.parent);
        WritablePowerPortTemplate {
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
        state.set_optional_string(&AttributePath::new("type"), choice(&entity.port_type))?;
        state.set_optional_i64(&AttributePath::new("maximum_draw"), entity.maximum_draw)?;
        state.set_optional_i64(&AttributePath::new("allocated_draw"), entity.allocated_draw)?;
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

impl ResourceKind for PowerPortTemplateCodec {
    const TYPE_NAME: &'static str = "netbox_power_port_template";

    type Kind = PowerPortTemplateKind;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description(
                "A template for a power port that will be created on all instantiations of the parent device type",
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
                    .description(&format!("One of [{}]", POWER_PORT_TYPES.join(", ")))
                    .required()
                    .validator(StringInSliceValidator::new(POWER_PORT_TYPES.iter().copied()))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("maximum_draw", AttributeType::Number)
                    .description("Maximum power draw in watts; only sent when positive")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("allocated_draw", AttributeType::Number)
                    .description("Allocated power draw in watts; only sent when positive")
                    .optional()
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
