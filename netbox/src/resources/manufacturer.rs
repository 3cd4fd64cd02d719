//! Manufacturer resource

use tfplug::plan_modifier::UseStateForUnknown;
use tfplug::schema::{AttributeBuilder, AttributeType, Schema, SchemaBuilder};
use tfplug::types::{AttributePath, DynamicValue};
use tfplug::validator::StringLengthValidator;

use super::ResourceKind;
use crate::api::dcim::{Manufacturer, ManufacturerKind, WritableManufacturer};
use crate::binding::codec::{non_empty, EmptyPolicy, FieldCodec, FieldReader};
use crate::binding::ValidationError;

#[derive(Debug, Clone, PartialEq)]
pub struct ManufacturerFields {
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Lowercase, with every run of characters outside `[a-z0-9_]` collapsed to
/// a single dash
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() || c == '_' {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_end_matches('-').to_string()
}

pub struct ManufacturerCodec;

impl FieldCodec for ManufacturerCodec {
    const LABEL: &'static str = "manufacturer";
    const KEYS: &'static [&'static str] = &["id", "name", "slug", "description"];

    type Fields = ManufacturerFields;
    type Entity = Manufacturer;
    type Writable = WritableManufacturer;

    fn decode(value: &DynamicValue) -> Result<Self::Fields, ValidationError> {
        let reader = FieldReader::strict(value, Self::KEYS)?;
        let name = reader.required_string("name")?;
        let slug = reader
            .optional_string("slug")?
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&name));
        Ok(ManufacturerFields {
            name,
            slug,
            description: reader.optional_string("description")?,
        })
    }

    fn encode(fields: &Self::Fields) -> Self::Writable {
        WritableManufacturer {
            name: fields.name.clone(),
            slug: fields.slug.clone(),
            description: EmptyPolicy::Send.apply(fields.description.as_deref()),
        }
    }

    fn populate(entity: &Self::Entity, state: &mut DynamicValue) -> tfplug::Result<()> {
        state.set_string(&AttributePath::new("name"), entity.name.clone())?;
        state.set_string(&AttributePath::new("slug"), entity.slug.clone())?;
        state.set_optional_string(
            &AttributePath::new("description"),
            non_empty(&entity.description),
        )
    }

    fn entity_id(entity: &Self::Entity) -> i64 {
        entity.id
    }
}

impl ResourceKind for ManufacturerCodec {
    const TYPE_NAME: &'static str = "netbox_manufacturer";

    type Kind = ManufacturerKind;

    fn schema() -> Schema {
        SchemaBuilder::new()
            .version(0)
            .description("Manages a device manufacturer")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .plan_modifier(UseStateForUnknown)
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .validator(StringLengthValidator::between(1, 100))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("slug", AttributeType::String)
                    .description("Derived from the name when not set")
                    .optional()
                    .computed()
                    .validator(StringLengthValidator::between(1, 100))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("description", AttributeType::String)
                    .optional()
                    .validator(StringLengthValidator::at_least(1))
                    .build(),
            )
            .build()
    }
}
