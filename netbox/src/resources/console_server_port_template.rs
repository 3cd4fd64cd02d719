//! Console server port template resource

use tfplug::schema::Schema;
use tfplug::types::DynamicValue;

use super::console_port_template::{
    console_template_schema, decode_console_template, encode_console_template,
    encode_console_template_update, populate_console_template, ConsoleTemplateFields,
    CONSOLE_TEMPLATE_KEYS,
};
use super::ResourceKind;
use crate::api::dcim::{
    ConsolePortTemplate, ConsoleServerPortTemplateKind, WritableConsolePortTemplate,
};
use crate::binding::codec::FieldCodec;
use crate::binding::ValidationError;

pub struct ConsoleServerPortTemplateCodec;

impl FieldCodec for ConsoleServerPortTemplateCodec {
    const LABEL: &'static str = "console server port template";
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

impl ResourceKind for ConsoleServerPortTemplateCodec {
    const TYPE_NAME: &'static str = "netbox_console_server_port_template";

    type Kind = ConsoleServerPortTemplateKind;

    fn schema() -> Schema {
        console_template_schema(
            "A template for a console server port that will be created on all instantiations of the parent device type",
        )
    }
}
