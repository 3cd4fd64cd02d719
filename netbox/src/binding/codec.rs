//! Field codecs
//!
//! A codec is the single place where one entity kind's Terraform attributes
//! are turned into typed fields, typed fields into a request body, and a
//! response body back into state.

use std::collections::HashSet;
use std::fmt::Debug;

use tfplug::types::{AttributePath, Dynamic, DynamicValue};

use super::ValidationError;
use crate::api::{ChoiceValue, NestedRef, NestedTag};

pub trait FieldCodec: Send + Sync + 'static {
    /// Human readable entity name used in diagnostics
    const LABEL: &'static str;
    /// Every attribute name the resource schema declares
    const KEYS: &'static [&'static str];

    type Fields: Clone + Debug + Send + Sync;
    type Entity: Send;
    type Writable: Send + Sync;

    fn decode(value: &DynamicValue) -> Result<Self::Fields, ValidationError>;

    /// Request body for a create
    fn encode(fields: &Self::Fields) -> Self::Writable;

    /// Request body for an update. Defaults to a full re-send.
    fn encode_update(prior: &Self::Fields, planned: &Self::Fields) -> Self::Writable {
        let _ = prior;
        Self::encode(planned)
    }

    /// Write every attribute except `id` from a response into state
    fn populate(entity: &Self::Entity, state: &mut DynamicValue) -> tfplug::Result<()>;

    fn entity_id(entity: &Self::Entity) -> i64;
}

/// How an optional string is put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    /// Unset and empty are both left out of the body
    Omit,
    /// Always sent; unset goes out as the empty string
    Send,
}

impl EmptyPolicy {
    pub fn apply(self, value: Option<&str>) -> Option<String> {
        match self {
            EmptyPolicy::Omit => value.filter(|v| !v.is_empty()).map(str::to_string),
            EmptyPolicy::Send => Some(value.unwrap_or_default().to_string()),
        }
    }
}

/// Draw style numbers: zero and negatives mean unset
pub fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|v| *v > 0)
}

/// Project an enum wrapper down to its value; a missing wrapper, missing
/// value or empty value all read as None
pub fn choice(value: &Option<ChoiceValue>) -> Option<String> {
    value
        .as_ref()
        .and_then(|c| c.value.clone())
        .filter(|v| !v.is_empty())
}

pub fn ref_id(value: &Option<NestedRef>) -> Option<i64> {
    value.as_ref().map(|r| r.id)
}

pub fn tag_ids(tags: &[NestedTag]) -> Vec<Dynamic> {
    tags.iter().map(|t| Dynamic::Number(t.id as f64)).collect()
}

/// Empty remote strings are stored as null
pub fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Parse the string `id` attribute of a state into a NetBox id
pub fn parse_id(value: &DynamicValue) -> Result<i64, ValidationError> {
    let raw = value
        .get_optional_string(&AttributePath::new("id"))
        .map_err(|e| invalid("id", e))?
        .ok_or_else(|| ValidationError::MissingAttribute("id".to_string()))?;
    parse_id_str(&raw)
}

pub fn parse_id_str(raw: &str) -> Result<i64, ValidationError> {
    raw.parse::<i64>().map_err(|_| ValidationError::InvalidAttribute {
        attribute: "id".to_string(),
        message: format!("expected a numeric id, got {:?}", raw),
    })
}

/// The parent a component template hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateParent {
    DeviceType(i64),
    ModuleType(i64),
}

impl TemplateParent {
    pub const ATTRIBUTES: &'static str = "device_type_id,module_type_id";

    pub fn from_ids(
        device_type: Option<i64>,
        module_type: Option<i64>,
    ) -> Result<Self, ValidationError> {
        match (device_type, module_type) {
            (Some(id), None) => Ok(TemplateParent::DeviceType(id)),
            (None, Some(id)) => Ok(TemplateParent::ModuleType(id)),
            _ => Err(ValidationError::ExactlyOneOf(Self::ATTRIBUTES)),
        }
    }

    pub fn device_type_id(&self) -> Option<i64> {
        match self {
            TemplateParent::DeviceType(id) => Some(*id),
            TemplateParent::ModuleType(_) => None,
        }
    }

    pub fn module_type_id(&self) -> Option<i64> {
        match self {
            TemplateParent::ModuleType(id) => Some(*id),
            TemplateParent::DeviceType(_) => None,
        }
    }

    /// Only the side whose id differs from `prior` is returned
    pub fn changed_ids(prior: &Self, planned: &Self) -> (Option<i64>, Option<i64>) {
        let device_type = planned
            .device_type_id()
            .filter(|_| prior.device_type_id() != planned.device_type_id());
        let module_type = planned
            .module_type_id()
            .filter(|_| prior.module_type_id() != planned.module_type_id());
        (device_type, module_type)
    }
}

/// Typed reads over an object value that rejects attributes it does not know
pub struct FieldReader<'a> {
    value: &'a DynamicValue,
}

impl<'a> FieldReader<'a> {
    pub fn strict(value: &'a DynamicValue, keys: &[&str]) -> Result<Self, ValidationError> {
        let Some(map) = value.value.as_map() else {
            return Err(ValidationError::InvalidAttribute {
                attribute: "(root)".to_string(),
                message: format!("expected an object, got {}", value.value.type_name()),
            });
        };

        let allowed: HashSet<&str> = keys.iter().copied().collect();
        let mut names: Vec<&String> = map.keys().collect();
        names.sort();
        if let Some(unknown) = names.into_iter().find(|n| !allowed.contains(n.as_str())) {
            return Err(ValidationError::UnsupportedAttribute(unknown.clone()));
        }

        Ok(Self { value })
    }

    pub fn required_string(&self, name: &str) -> Result<String, ValidationError> {
        self.optional_string(name)?
            .ok_or_else(|| ValidationError::MissingAttribute(name.to_string()))
    }

    pub fn optional_string(&self, name: &str) -> Result<Option<String>, ValidationError> {
        self.value
            .get_optional_string(&AttributePath::new(name))
            .map_err(|e| invalid(name, e))
    }

    pub fn optional_i64(&self, name: &str) -> Result<Option<i64>, ValidationError> {
        self.value
            .get_optional_i64(&AttributePath::new(name))
            .map_err(|e| invalid(name, e))
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>, ValidationError> {
        self.value
            .get_optional_bool(&AttributePath::new(name))
            .map_err(|e| invalid(name, e))
    }

    pub fn template_parent(&self) -> Result<TemplateParent, ValidationError> {
        TemplateParent::from_ids(
            self.optional_i64("device_type_id")?,
            self.optional_i64("module_type_id")?,
        )
    }
}

fn invalid(name: &str, err: tfplug::TfplugError) -> ValidationError {
    ValidationError::InvalidAttribute {
        attribute: name.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn object(entries: &[(&str, Dynamic)]) -> DynamicValue {
        let map: HashMap<String, Dynamic> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        DynamicValue::new(Dynamic::Map(map))
    }

    #[test]
    fn empty_policy_omit_drops_empty_and_unset() {
        assert_eq!(EmptyPolicy::Omit.apply(None), None);
        assert_eq!(EmptyPolicy::Omit.apply(Some("")), None);
        assert_eq!(EmptyPolicy::Omit.apply(Some("A")), Some("A".to_string()));
    }

    #[test]
    fn empty_policy_send_always_sends() {
        assert_eq!(EmptyPolicy::Send.apply(None), Some(String::new()));
        assert_eq!(EmptyPolicy::Send.apply(Some("")), Some(String::new()));
        assert_eq!(EmptyPolicy::Send.apply(Some("x")), Some("x".to_string()));
    }

    #[test]
    fn positive_keeps_only_values_above_zero() {
        assert_eq!(positive(Some(750)), Some(750));
        assert_eq!(positive(Some(0)), None);
        assert_eq!(positive(Some(-1)), None);
        assert_eq!(positive(None), None);
    }

    #[test]
    fn choice_without_value_is_none() {
        assert_eq!(choice(&None), None);
        assert_eq!(
            choice(&Some(ChoiceValue {
                value: None,
                label: Some("RJ-45".to_string()),
            })),
            None
        );
        assert_eq!(
            choice(&Some(ChoiceValue {
                value: Some("rj-45".to_string()),
                label: None,
            })),
            Some("rj-45".to_string())
        );
    }

    #[test]
    fn template_parent_requires_exactly_one() {
        assert_eq!(
            TemplateParent::from_ids(Some(3), None).unwrap(),
            TemplateParent::DeviceType(3)
        );
        assert_eq!(
            TemplateParent::from_ids(None, Some(8)).unwrap(),
            TemplateParent::ModuleType(8)
        );
        assert!(matches!(
            TemplateParent::from_ids(Some(3), Some(8)),
            Err(ValidationError::ExactlyOneOf(_))
        ));
        assert!(matches!(
            TemplateParent::from_ids(None, None),
            Err(ValidationError::ExactlyOneOf(_))
        ));
    }

    #[test]
    fn changed_ids_only_report_the_changed_side() {
        let prior = TemplateParent::DeviceType(3);
        assert_eq!(TemplateParent::changed_ids(&prior, &prior), (None, None));
        assert_eq!(
            TemplateParent::changed_ids(&prior, &TemplateParent::DeviceType(4)),
            (Some(4), None)
        );
        assert_eq!(
            TemplateParent::changed_ids(&prior, &TemplateParent::ModuleType(9)),
            (None, Some(9))
        );
    }

    #[test]
    fn strict_reader_rejects_unknown_attributes() {
        let value = object(&[
            ("name", Dynamic::String("con0".to_string())),
            ("colour", Dynamic::String("red".to_string())),
        ]);

        let err = FieldReader::strict(&value, &["name"]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "an argument named `colour` is not expected here"
        );
    }

    #[test]
    fn strict_reader_reads_typed_values() {
        let value = object(&[
            ("name", Dynamic::String("con0".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
            ("module_type_id", Dynamic::Null),
            ("label", Dynamic::Unknown),
        ]);
        let reader =
            FieldReader::strict(&value, &["name", "device_type_id", "module_type_id", "label"])
                .unwrap();

        assert_eq!(reader.required_string("name").unwrap(), "con0");
        assert_eq!(reader.optional_string("label").unwrap(), None);
        assert_eq!(
            reader.template_parent().unwrap(),
            TemplateParent::DeviceType(3)
        );
        assert!(matches!(
            reader.required_string("label"),
            Err(ValidationError::MissingAttribute(_))
        ));
        assert!(matches!(
            reader.optional_i64("name"),
            Err(ValidationError::InvalidAttribute { .. })
        ));
    }

    #[test]
    fn parse_id_requires_a_number() {
        let good = object(&[("id", Dynamic::String("42".to_string()))]);
        let bad = object(&[("id", Dynamic::String("abc".to_string()))]);

        assert_eq!(parse_id(&good).unwrap(), 42);
        assert!(parse_id(&bad).is_err());
        assert!(matches!(
            parse_id(&DynamicValue::empty_object()),
            Err(ValidationError::MissingAttribute(_))
        ));
    }
}
