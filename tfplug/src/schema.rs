//! Schema types and builders for tfplug
//!
//! This module provides the schema system for defining provider, resource and
//! data source schemas, and validates configuration values against them.

use crate::plan_modifier::PlanModifier;
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use crate::validator::Validator;
use std::collections::HashMap;
use std::sync::Arc;

/// AttributeType defines the type system for Terraform attributes
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeType {
    String,
    Number, // Always f64
    Bool,
    List(Box<AttributeType>),               // Ordered, allows duplicates
    Set(Box<AttributeType>),                // Unordered, no duplicates
    Map(Box<AttributeType>),                // String keys only
    Object(HashMap<String, AttributeType>), // Fixed structure
}

impl AttributeType {
    /// Null and unknown are accepted for every type
    pub fn accepts(&self, value: &Dynamic) -> bool {
        match (self, value) {
            (_, Dynamic::Null) | (_, Dynamic::Unknown) => true,
            (AttributeType::String, Dynamic::String(_)) => true,
            (AttributeType::Number, Dynamic::Number(_)) => true,
            (AttributeType::Bool, Dynamic::Bool(_)) => true,
            (AttributeType::List(inner), Dynamic::List(items))
            | (AttributeType::Set(inner), Dynamic::List(items)) => {
                items.iter().all(|item| inner.accepts(item))
            }
            (AttributeType::Map(inner), Dynamic::Map(entries)) => {
                entries.values().all(|entry| inner.accepts(entry))
            }
            (AttributeType::Object(fields), Dynamic::Map(entries)) => entries
                .iter()
                .all(|(k, v)| fields.get(k).is_some_and(|t| t.accepts(v))),
            _ => false,
        }
    }
}

/// Schema is returned by providers/resources/data sources
/// Version is used for state migration
#[derive(Debug, Clone)]
pub struct Schema {
    pub version: i64,
    pub block: Block,
}

/// Top-level attributes and nested blocks of a schema
#[derive(Debug, Clone)]
pub struct Block {
    pub version: i64,
    pub attributes: Vec<Attribute>,
    pub block_types: Vec<NestedBlock>,
    pub description: String,
    /// Groups of attribute names where exactly one must be set
    pub exactly_one_of: Vec<Vec<String>>,
}

impl Block {
    fn empty() -> Self {
        Self {
            version: 0,
            attributes: Vec::new(),
            block_types: Vec::new(),
            description: String::new(),
            exactly_one_of: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn nested_block(&self, name: &str) -> Option<&NestedBlock> {
        self.block_types.iter().find(|b| b.type_name == name)
    }

    /// Validates an object value against this block, appending diagnostics
    pub fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        let entries = match value {
            Dynamic::Null | Dynamic::Unknown => return,
            Dynamic::Map(entries) => entries,
            other => {
                diagnostics.push(at(
                    Diagnostic::error(
                        "Invalid block value",
                        format!("expected an object, got {}", other.type_name()),
                    ),
                    path,
                ));
                return;
            }
        };

        let mut names: Vec<&String> = entries.keys().collect();
        names.sort();
        for name in names {
            if self.attribute(name).is_none() && self.nested_block(name).is_none() {
                diagnostics.push(at(
                    Diagnostic::error(
                        "Unsupported argument",
                        format!("An argument named \"{}\" is not expected here.", name),
                    ),
                    &child(path, name),
                ));
            }
        }

        for attr in &self.attributes {
            let attr_path = child(path, &attr.name);
            let attr_value = entries.get(&attr.name).unwrap_or(&Dynamic::Null);
            attr.validate(attr_value, &attr_path, diagnostics);
        }

        for nested in &self.block_types {
            let nested_path = child(path, &nested.type_name);
            let nested_value = entries.get(&nested.type_name).unwrap_or(&Dynamic::Null);
            nested.validate(nested_value, &nested_path, diagnostics);
        }

        for group in &self.exactly_one_of {
            let values: Vec<&Dynamic> = group
                .iter()
                .map(|name| entries.get(name).unwrap_or(&Dynamic::Null))
                .collect();
            if values.iter().any(|v| v.is_unknown()) {
                continue;
            }
            let set = values.iter().filter(|v| !v.is_null()).count();
            if set != 1 {
                diagnostics.push(at(
                    Diagnostic::error(
                        "Invalid combination of arguments",
                        format!("exactly one of `{}` must be specified", group.join(",")),
                    ),
                    path,
                ));
            }
        }
    }
}

impl Schema {
    /// Validates a full configuration against the root block
    pub fn validate(&self, config: &DynamicValue) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        self.block
            .validate(&config.value, &AttributePath::root(), &mut diagnostics);
        diagnostics
    }
}

/// Attribute represents a single configuration attribute
#[derive(Clone)]
pub struct Attribute {
    pub name: String,
    pub r#type: AttributeType,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub sensitive: bool,
    pub validators: Vec<Arc<dyn Validator>>,
    pub plan_modifiers: Vec<Arc<dyn PlanModifier>>,
}

impl Attribute {
    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if value.is_null() {
            if self.required {
                diagnostics.push(at(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required, but no definition was found.", self.name),
                    ),
                    path,
                ));
            }
            return;
        }

        if self.computed && !self.optional && !self.required {
            diagnostics.push(at(
                Diagnostic::error(
                    "Value for unconfigurable attribute",
                    format!("Can't configure a value for \"{}\": its value will be decided automatically.", self.name),
                ),
                path,
            ));
            return;
        }

        if !self.r#type.accepts(value) {
            diagnostics.push(at(
                Diagnostic::error(
                    "Incorrect attribute value type",
                    format!("\"{}\" cannot hold a {} value", self.name, value.type_name()),
                ),
                path,
            ));
            return;
        }

        if value.is_unknown() {
            return;
        }

        for validator in &self.validators {
            validator.validate(value, path, diagnostics);
        }
    }
}

impl std::fmt::Debug for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attribute")
            .field("name", &self.name)
            .field("type", &self.r#type)
            .field("description", &self.description)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("sensitive", &self.sensitive)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field(
                "plan_modifiers",
                &format!("{} plan modifiers", self.plan_modifiers.len()),
            )
            .finish()
    }
}

/// NestedBlock represents a nested configuration block
#[derive(Debug, Clone)]
pub struct NestedBlock {
    pub type_name: String,
    pub block: Block,
    pub nesting: NestingMode,
    pub min_items: i64,
    pub max_items: i64,
}

impl NestedBlock {
    /// A repeatable block; `max_items` of 0 means unbounded
    pub fn new(type_name: &str, nesting: NestingMode, schema: Schema) -> Self {
        Self {
            type_name: type_name.to_string(),
            block: schema.block,
            nesting,
            min_items: 0,
            max_items: 0,
        }
    }

    pub fn with_min_items(mut self, min: i64) -> Self {
        self.min_items = min;
        self
    }

    pub fn with_max_items(mut self, max: i64) -> Self {
        self.max_items = max;
        self
    }

    fn validate(&self, value: &Dynamic, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        match (self.nesting, value) {
            (_, Dynamic::Unknown) => {}
            (NestingMode::Single, single) => self.block.validate(single, path, diagnostics),
            (_, Dynamic::Null) => self.check_count(0, path, diagnostics),
            (NestingMode::List | NestingMode::Set, Dynamic::List(items)) => {
                self.check_count(items.len() as i64, path, diagnostics);
                for (idx, item) in items.iter().enumerate() {
                    self.block
                        .validate(item, &path.clone().index(idx as i64), diagnostics);
                }
            }
            (_, other) => diagnostics.push(at(
                Diagnostic::error(
                    "Invalid block value",
                    format!("expected a list of \"{}\" blocks, got {}", self.type_name, other.type_name()),
                ),
                path,
            )),
        }
    }

    fn check_count(&self, count: i64, path: &AttributePath, diagnostics: &mut Vec<Diagnostic>) {
        if count < self.min_items {
            diagnostics.push(at(
                Diagnostic::error(
                    "Insufficient blocks",
                    format!("At least {} \"{}\" blocks are required.", self.min_items, self.type_name),
                ),
                path,
            ));
        }
        if self.max_items > 0 && count > self.max_items {
            diagnostics.push(at(
                Diagnostic::error(
                    "Too many blocks",
                    format!("No more than {} \"{}\" blocks are allowed.", self.max_items, self.type_name),
                ),
                path,
            ));
        }
    }
}

/// NestingMode defines how nested blocks are structured
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NestingMode {
    Single,
    List,
    Set,
}

fn child(path: &AttributePath, name: &str) -> AttributePath {
    path.clone().attribute(name)
}

fn at(diagnostic: Diagnostic, path: &AttributePath) -> Diagnostic {
    if path.steps.is_empty() {
        diagnostic
    } else {
        diagnostic.with_attribute(path.clone())
    }
}

/// AttributeBuilder provides fluent API for building attributes
/// ALWAYS use this instead of constructing Attribute directly
pub struct AttributeBuilder {
    attribute: Attribute,
}

impl AttributeBuilder {
    pub fn new(name: &str, type_: AttributeType) -> Self {
        Self {
            attribute: Attribute {
                name: name.to_string(),
                r#type: type_,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                sensitive: false,
                validators: Vec::new(),
                plan_modifiers: Vec::new(),
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.attribute.description = desc.to_string();
        self
    }

    pub fn required(mut self) -> Self {
        self.attribute.required = true;
        self.attribute.optional = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.attribute.optional = true;
        self.attribute.required = false;
        self
    }

    pub fn computed(mut self) -> Self {
        self.attribute.computed = true;
        self
    }

    /// Mark as sensitive (hidden)
    pub fn sensitive(mut self) -> Self {
        self.attribute.sensitive = true;
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.attribute.validators.push(Arc::new(validator));
        self
    }

    pub fn plan_modifier(mut self, modifier: impl PlanModifier + 'static) -> Self {
        self.attribute.plan_modifiers.push(Arc::new(modifier));
        self
    }

    pub fn build(self) -> Attribute {
        self.attribute
    }
}

/// Every schema in the provider is assembled through this builder
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self {
            schema: Schema {
                version: 0,
                block: Block::empty(),
            },
        }
    }

    /// Set schema version
    pub fn version(mut self, version: i64) -> Self {
        self.schema.version = version;
        self.schema.block.version = version;
        self
    }

    pub fn attribute(mut self, attr: Attribute) -> Self {
        self.schema.block.attributes.push(attr);
        self
    }

    pub fn block(mut self, block: NestedBlock) -> Self {
        self.schema.block.block_types.push(block);
        self
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.block.description = desc.to_string();
        self
    }

    /// Exactly one of the named attributes must be set
    pub fn exactly_one_of(mut self, names: &[&str]) -> Self {
        self.schema
            .block
            .exactly_one_of
            .push(names.iter().map(|n| n.to_string()).collect());
        self
    }

    pub fn build(self) -> Schema {
        self.schema
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::validator::StringLengthValidator;

    fn template_schema() -> Schema {
        SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .validator(StringLengthValidator::between(1, 64))
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("device_type_id", AttributeType::Number)
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("module_type_id", AttributeType::Number)
                    .optional()
                    .build(),
            )
            .exactly_one_of(&["device_type_id", "module_type_id"])
            .build()
    }

    fn config(entries: &[(&str, Dynamic)]) -> DynamicValue {
        DynamicValue::new(Dynamic::Map(
            entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        ))
    }

    #[test]
    fn attribute_builder_creates_required_string() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .description("The name of the template")
            .required()
            .build();

        assert_eq!(attr.name, "name");
        assert!(matches!(attr.r#type, AttributeType::String));
        assert!(attr.required);
        assert!(!attr.optional);
        assert_eq!(attr.description, "The name of the template");
    }

    #[test]
    fn cloned_attribute_keeps_validators() {
        let attr = AttributeBuilder::new("name", AttributeType::String)
            .validator(StringLengthValidator::between(1, 64))
            .build();

        assert_eq!(attr.clone().validators.len(), 1);
    }

    #[test]
    fn valid_config_has_no_diagnostics() {
        let diags = template_schema().validate(&config(&[
            ("name", Dynamic::String("con0".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
        ]));

        assert!(diags.is_empty(), "{:?}", diags);
    }

    #[test]
    fn missing_required_and_unknown_keys_are_reported() {
        let diags = template_schema().validate(&config(&[
            ("device_type_id", Dynamic::Number(3.0)),
            ("colour", Dynamic::String("red".to_string())),
        ]));

        let summaries: Vec<&str> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Unsupported argument"));
        assert!(summaries.contains(&"Missing required argument"));
    }

    #[test]
    fn computed_only_attribute_cannot_be_configured() {
        let diags = template_schema().validate(&config(&[
            ("id", Dynamic::String("1".to_string())),
            ("name", Dynamic::String("con0".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
        ]));

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Value for unconfigurable attribute");
    }

    #[test]
    fn exactly_one_of_rejects_both_and_neither() {
        let both = template_schema().validate(&config(&[
            ("name", Dynamic::String("con0".to_string())),
            ("device_type_id", Dynamic::Number(3.0)),
            ("module_type_id", Dynamic::Number(4.0)),
        ]));
        assert_eq!(both.len(), 1);
        assert!(both[0].detail.contains("device_type_id,module_type_id"));

        let neither =
            template_schema().validate(&config(&[("name", Dynamic::String("con0".to_string()))]));
        assert_eq!(neither.len(), 1);
    }

    #[test]
    fn exactly_one_of_waits_for_unknown_values() {
        let diags = template_schema().validate(&config(&[
            ("name", Dynamic::String("con0".to_string())),
            ("device_type_id", Dynamic::Unknown),
        ]));

        assert!(diags.is_empty());
    }

    #[test]
    fn type_mismatch_and_validator_failures() {
        let diags = template_schema().validate(&config(&[
            ("name", Dynamic::String(String::new())),
            ("device_type_id", Dynamic::String("three".to_string())),
        ]));

        let summaries: Vec<&str> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert!(summaries.contains(&"Incorrect attribute value type"));
        assert!(summaries.iter().any(|s| s.contains("minimum length")));
    }

    #[test]
    fn nested_blocks_are_validated_per_element() {
        let filter = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("value", AttributeType::String)
                    .required()
                    .build(),
            )
            .build();
        let schema = SchemaBuilder::new()
            .block(NestedBlock::new("filter", NestingMode::Set, filter))
            .build();

        let diags = schema.validate(&config(&[(
            "filter",
            Dynamic::List(vec![Dynamic::Map(HashMap::from([(
                "name".to_string(),
                Dynamic::String("tag".to_string()),
            )]))]),
        )]));

        assert_eq!(diags.len(), 1);
        assert_eq!(diags[0].summary, "Missing required argument");
        assert_eq!(
            diags[0].attribute,
            Some(AttributePath::new("filter").index(0).attribute("value"))
        );
    }

    #[test]
    fn object_type_accepts_matching_fields() {
        let object_type = AttributeType::Object(HashMap::from([
            ("id".to_string(), AttributeType::Number),
            ("name".to_string(), AttributeType::String),
        ]));

        assert!(object_type.accepts(&Dynamic::Map(HashMap::from([(
            "id".to_string(),
            Dynamic::Number(1.0)
        )]))));
        assert!(!object_type.accepts(&Dynamic::Map(HashMap::from([(
            "id".to_string(),
            Dynamic::String("1".to_string())
        )]))));
    }

    #[test]
    fn block_count_limits() {
        let item = SchemaBuilder::new()
            .attribute(
                AttributeBuilder::new("value", AttributeType::String)
                    .optional()
                    .build(),
            )
            .build();
        let schema = SchemaBuilder::new()
            .block(
                NestedBlock::new("filter", NestingMode::List, item)
                    .with_min_items(1)
                    .with_max_items(2),
            )
            .build();
        let filters = |n: usize| {
            config(&[(
                "filter",
                Dynamic::List(vec![Dynamic::Map(HashMap::new()); n]),
            )])
        };

        assert_eq!(
            schema.validate(&DynamicValue::empty_object())[0].summary,
            "Insufficient blocks"
        );
        assert!(schema.validate(&filters(2)).is_empty());
        assert_eq!(schema.validate(&filters(3))[0].summary, "Too many blocks");
    }
}
