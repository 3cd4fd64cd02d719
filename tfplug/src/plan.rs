//! Resource planning
//!
//! Computes the planned new state for a resource from its prior state and
//! configuration, the way Terraform expects a provider to answer a plan
//! request: configured values win, computed values without configuration
//! are kept or marked unknown, and plan modifiers run last.

use crate::plan_modifier::{values_equal, PlanModifyRequest};
use crate::schema::Schema;
use crate::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PlanResult {
    pub planned_state: DynamicValue,
    /// Attributes whose change forces the resource to be replaced
    pub requires_replace: Vec<AttributePath>,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn plan_resource_change(
    schema: &Schema,
    prior_state: &DynamicValue,
    config: &DynamicValue,
) -> PlanResult {
    // Destroy
    if config.is_null() {
        return PlanResult {
            planned_state: DynamicValue::null(),
            requires_replace: Vec::new(),
            diagnostics: Vec::new(),
        };
    }

    let creating = prior_state.is_null();
    let prior = |name: &str| -> Dynamic {
        prior_state
            .get(&AttributePath::new(name))
            .cloned()
            .unwrap_or(Dynamic::Null)
    };
    let configured = |name: &str| -> Dynamic {
        config
            .get(&AttributePath::new(name))
            .cloned()
            .unwrap_or(Dynamic::Null)
    };

    let mut proposed = HashMap::new();
    for attr in &schema.block.attributes {
        let value = match configured(&attr.name) {
            Dynamic::Null if attr.computed => prior(&attr.name),
            value => value,
        };
        proposed.insert(attr.name.clone(), value);
    }
    for nested in &schema.block.block_types {
        proposed.insert(nested.type_name.clone(), configured(&nested.type_name));
    }

    let changed = creating || !values_equal(&Dynamic::Map(proposed.clone()), &prior_state.value);
    if changed {
        for attr in &schema.block.attributes {
            if attr.computed && configured(&attr.name).is_null() {
                proposed.insert(attr.name.clone(), Dynamic::Unknown);
            }
        }
    }

    let mut requires_replace = Vec::new();
    let mut diagnostics = Vec::new();

    for attr in &schema.block.attributes {
        if attr.plan_modifiers.is_empty() {
            continue;
        }
        let path = AttributePath::new(&attr.name);
        let state_value = prior(&attr.name);
        let config_value = configured(&attr.name);
        let mut plan_value = proposed.remove(&attr.name).unwrap_or(Dynamic::Null);
        let mut replace = false;

        for modifier in &attr.plan_modifiers {
            let response = modifier.modify_plan(PlanModifyRequest {
                state: state_value.clone(),
                plan: plan_value,
                config: config_value.clone(),
                attribute_path: path.clone(),
            });
            plan_value = response.plan_value;
            replace |= response.requires_replace;
            diagnostics.extend(response.diagnostics);
        }

        if replace && !creating {
            requires_replace.push(path);
        }
        proposed.insert(attr.name.clone(), plan_value);
    }

    PlanResult {
        planned_state: DynamicValue::new(Dynamic::Map(proposed)),
        requires_replace,
        diagnostics,
    }
}
